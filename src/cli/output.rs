// Terminal rendering for stages, leads, the kanban board, navigation and weeks

use std::io::IsTerminal;
use chrono::{Local, TimeZone};
use crate::models::{progress_dots, Lead, Stage};
use crate::nav::Route;
use crate::pipeline::{MoveOutcome, PipelineState};
use crate::utils::{local_date, WeekBuckets};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// Narrowest board column that still shows a useful name
const MIN_COLUMN_WIDTH: usize = 14;

/// Check if stdout is a terminal (TTY)
pub fn is_tty() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width dynamically
///
/// Uses the `terminal_size` crate, falling back to the COLUMNS environment
/// variable and then a fixed default.
pub fn get_terminal_width() -> usize {
    if let Some((terminal_size::Width(w), _)) = terminal_size::terminal_size() {
        if w > 0 {
            return w as usize;
        }
    }

    if let Ok(cols) = std::env::var("COLUMNS") {
        if let Ok(width) = cols.parse::<usize>() {
            if width > 0 && width < 10000 {
                return width;
            }
        }
    }

    120
}

fn bold_if_tty(text: &str, is_tty: bool) -> String {
    if is_tty {
        format!("{}{}{}", ANSI_BOLD, text, ANSI_RESET)
    } else {
        text.to_string()
    }
}

/// Truncate to `width` characters, marking the cut with '…'
fn fit(text: &str, width: usize) -> String {
    let count = text.chars().count();
    if count <= width {
        format!("{:<width$}", text, width = width)
    } else if width == 0 {
        String::new()
    } else {
        let cut: String = text.chars().take(width - 1).collect();
        format!("{}…", cut)
    }
}

/// Format date for display (date only, no time)
pub fn format_date(ts: i64) -> String {
    Local.timestamp_opt(ts, 0)
        .single()
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Short lead id as shown in tables
pub fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

pub fn format_stage_list(stages: &[Stage], is_tty: bool) -> String {
    let mut out = String::new();
    out.push_str(&bold_if_tty(&format!("{:<4} {:<20} {:<24} {}", "Pos", "Id", "Name", "Slug"), is_tty));
    out.push('\n');
    for stage in stages {
        out.push_str(&format!(
            "{:<4} {:<20} {:<24} {}\n",
            stage.position,
            stage.id,
            stage.name,
            stage.slug.as_deref().unwrap_or("-"),
        ));
    }
    out
}

pub fn format_lead_table(state: &PipelineState, is_tty: bool) -> String {
    if state.leads.is_empty() {
        return "No leads.\n".to_string();
    }
    let mut out = String::new();
    out.push_str(&bold_if_tty(
        &format!("{:<8} {:<24} {:<20} {:<8} {:<10} {}", "Id", "Name", "Stage", "Progress", "Follow-up", "Source"),
        is_tty,
    ));
    out.push('\n');
    for lead in &state.leads {
        let stage_name = state.stage(&lead.stage_id).map_or(lead.stage_id.as_str(), |s| s.name.as_str());
        out.push_str(&format!(
            "{:<8} {} {} {:<8} {:<10} {}\n",
            short_id(&lead.id),
            fit(&lead.name, 24),
            fit(stage_name, 20),
            progress_dots(&state.stages, &lead.stage_id),
            lead.next_follow_up_ts.map(format_date).unwrap_or_else(|| "-".to_string()),
            lead.source,
        ));
    }
    out
}

/// Render the kanban board: one column per visible stage in position order
pub fn format_board(state: &PipelineState, hidden_slugs: &[String], width: usize, is_tty: bool) -> String {
    let stages = state.visible_stages(hidden_slugs);
    if stages.is_empty() {
        return "No stages to show.\n".to_string();
    }
    let column_width = (width.saturating_sub(stages.len() - 1) / stages.len()).max(MIN_COLUMN_WIDTH);

    let columns: Vec<Vec<&Lead>> = stages
        .iter()
        .map(|s| state.leads_in_stage(&s.id).collect())
        .collect();
    let depth = columns.iter().map(Vec::len).max().unwrap_or(0);

    let mut out = String::new();
    let header: Vec<String> = stages
        .iter()
        .zip(&columns)
        .map(|(s, leads)| fit(&format!("{} ({})", s.name, leads.len()), column_width))
        .collect();
    out.push_str(&bold_if_tty(header.join(" ").trim_end(), is_tty));
    out.push('\n');
    out.push_str(&vec!["-".repeat(column_width); stages.len()].join(" "));
    out.push('\n');

    for row in 0..depth {
        let cells: Vec<String> = columns
            .iter()
            .map(|leads| match leads.get(row) {
                Some(lead) => fit(&format!("{} {}", short_id(&lead.id), lead.name), column_width),
                None => " ".repeat(column_width),
            })
            .collect();
        out.push_str(cells.join(" ").trim_end());
        out.push('\n');
    }
    out
}

pub fn format_move_outcome(outcome: &MoveOutcome, state: &PipelineState) -> String {
    match outcome {
        MoveOutcome::Unchanged => "Lead is already in that stage.".to_string(),
        MoveOutcome::Moved(intent) => {
            let name = |id: &str| state.stage(id).map_or(id.to_string(), |s| s.name.clone());
            format!(
                "Moved lead {} from {} to {}",
                short_id(&intent.lead_id),
                name(&intent.from_stage_id),
                name(&intent.to_stage_id),
            )
        }
    }
}

pub fn format_routes(routes: &[&Route], is_tty: bool) -> String {
    let mut out = String::new();
    out.push_str(&bold_if_tty(&format!("{:<12} {}", "Menu", "Path"), is_tty));
    out.push('\n');
    for route in routes {
        out.push_str(&format!("{:<12} {}\n", route.label, route.path));
    }
    out
}

pub fn format_week(buckets: &WeekBuckets<&Lead>, is_tty: bool) -> String {
    let mut out = String::new();
    out.push_str(&bold_if_tty(
        &format!("Follow-ups {} .. {}", buckets.range.start, buckets.range.end),
        is_tty,
    ));
    out.push('\n');
    if !buckets.overdue.is_empty() {
        out.push_str(&format!("Overdue ({})\n", buckets.overdue.len()));
        for lead in &buckets.overdue {
            let date = lead.next_follow_up_ts.and_then(local_date).map(|d| d.to_string()).unwrap_or_default();
            out.push_str(&format!("  {} {} ({})\n", short_id(&lead.id), lead.name, date));
        }
    }
    for (day, leads) in buckets.range.days().zip(buckets.days.iter()) {
        out.push_str(&format!("{} ({})\n", day.format("%a %Y-%m-%d"), leads.len()));
        for lead in leads {
            out.push_str(&format!("  {} {}\n", short_id(&lead.id), lead.name));
        }
    }
    out
}
