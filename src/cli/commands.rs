use clap::{Parser, Subcommand};
use rusqlite::Connection;
use anyhow::{Context, Result};
use crate::cli::error::{validate_non_empty, validate_phone};
use crate::cli::output::{
    format_board, format_lead_table, format_move_outcome, format_routes, format_stage_list,
    format_week, get_terminal_width, is_tty,
};
use crate::config::Config;
use crate::db::DbConnection;
use crate::models::{LeadFilter, NewLead};
use crate::nav::{visible_routes, NavContext, Role};
use crate::pipeline::{
    MoveOrchestrator, PipelineAction, PipelineBackend, PipelineState, PipelineStore, SqliteBackend,
};
use crate::repo::{LeadRepo, StageRepo};
use crate::utils::{bucket_by_day, local_date, parse_date, parse_date_expr, WeekRange};

#[derive(Parser)]
#[command(name = "vant")]
#[command(about = "VANT - sales lead pipeline with kanban board and optimistic stage moves")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List pipeline stages in order
    Stages {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// List leads
    Leads {
        /// Lead filter: active (default), all, or stage:<id>
        filter: Option<String>,
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
    /// Add a new lead (always placed in the new-contacts stage)
    Add {
        /// Lead name
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        /// Stage selected when adding; new leads still start in the default stage
        #[arg(long)]
        stage: Option<String>,
        /// Where the lead came from
        #[arg(long, default_value = "manual")]
        source: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Next follow-up date (e.g. 2026-11-02, tomorrow, +3d)
        #[arg(long = "follow-up")]
        follow_up: Option<String>,
    },
    /// Move a lead to another stage
    Move {
        /// Lead id or unique id prefix
        lead: String,
        /// Destination stage id or slug
        stage: String,
    },
    /// Show the pipeline as a kanban board
    Board {
        /// Lead filter: active (default), all, or stage:<id>
        filter: Option<String>,
    },
    /// Show navigation visible to a role
    Nav {
        /// Role (defaults to user.role from config)
        #[arg(long)]
        role: Option<String>,
        /// The user has direct reports
        #[arg(long)]
        team: bool,
    },
    /// Show follow-ups for the week containing DATE (default today)
    Week {
        date: Option<String>,
        /// Show the week before
        #[arg(long, conflicts_with = "next")]
        prev: bool,
        /// Show the week after
        #[arg(long)]
        next: bool,
    },
}

/// Entry point for the command line
pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    log::debug!("Loaded config: {:?}", config);

    let conn = DbConnection::connect(&config)?;
    let backend = SqliteBackend::new(&conn, config.pipeline.clone());

    match cli.command {
        Commands::Stages { json } => handle_stages(&backend, json),
        Commands::Leads { filter, json } => handle_leads(&backend, filter.as_deref(), json),
        Commands::Add { name, phone, email, stage, source, notes, follow_up } => {
            let fields = build_new_lead(&name.join(" "), phone, email, stage, source, notes, follow_up)?;
            handle_add(&backend, fields)
        }
        Commands::Move { lead, stage } => handle_move(&conn, &backend, &lead, &stage),
        Commands::Board { filter } => handle_board(&backend, filter.as_deref(), &config),
        Commands::Nav { role, team } => handle_nav(role.as_deref(), team, &config),
        Commands::Week { date, prev, next } => handle_week(&backend, date.as_deref(), prev, next),
    }
}

fn parse_filter(filter: Option<&str>) -> Result<LeadFilter> {
    match filter {
        None => Ok(LeadFilter::default()),
        Some(s) => LeadFilter::parse(s)
            .with_context(|| format!("Unknown filter '{}'. Use active, all, or stage:<id>.", s)),
    }
}

fn load_store<B: PipelineBackend>(backend: &B, filter: LeadFilter) -> Result<PipelineStore> {
    let orchestrator = MoveOrchestrator::new(backend).with_filter(filter);
    let mut store = PipelineStore::new();
    orchestrator.load(&mut store)?;
    Ok(store)
}

fn handle_stages<B: PipelineBackend>(backend: &B, json: bool) -> Result<()> {
    let store = load_store(backend, LeadFilter::All)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&store.state().stages)?);
    } else {
        print!("{}", format_stage_list(&store.state().stages, is_tty()));
    }
    Ok(())
}

fn handle_leads<B: PipelineBackend>(backend: &B, filter: Option<&str>, json: bool) -> Result<()> {
    let store = load_store(backend, parse_filter(filter)?)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&store.state().leads)?);
    } else {
        print!("{}", format_lead_table(store.state(), is_tty()));
    }
    Ok(())
}

fn build_new_lead(
    name: &str,
    phone: Option<String>,
    email: Option<String>,
    stage: Option<String>,
    source: String,
    notes: String,
    follow_up: Option<String>,
) -> Result<NewLead> {
    validate_non_empty(name, "Lead name").map_err(anyhow::Error::msg)?;
    if let Some(p) = phone.as_deref() {
        validate_phone(p).map_err(anyhow::Error::msg)?;
    }
    let next_follow_up_ts = follow_up.as_deref().map(parse_date_expr).transpose()?;
    Ok(NewLead {
        name: name.to_string(),
        phone,
        email,
        stage_id: stage,
        notes,
        source,
        next_follow_up_ts,
    })
}

fn handle_add<B: PipelineBackend>(backend: &B, fields: NewLead) -> Result<()> {
    let orchestrator = MoveOrchestrator::new(backend).with_filter(LeadFilter::All);
    let mut store = PipelineStore::new();
    orchestrator.load(&mut store)?;
    let lead = orchestrator.create_lead(&mut store, fields)?;

    let stage_name = store
        .state()
        .stage(&lead.stage_id)
        .map_or(lead.stage_id.clone(), |s| s.name.clone());
    println!("Created lead {} ({}) in {}", lead.id, lead.name, stage_name);
    Ok(())
}

/// Resolve a lead argument: exact id first, then a unique id prefix
fn resolve_lead_id(conn: &Connection, arg: &str) -> Result<String> {
    if let Some(lead) = LeadRepo::get_by_id(conn, arg)? {
        return Ok(lead.id);
    }
    let matches = LeadRepo::find_by_prefix(conn, arg)?;
    match matches.as_slice() {
        [] => anyhow::bail!("Lead '{}' not found", arg),
        [lead] => Ok(lead.id.clone()),
        _ => anyhow::bail!("Lead id prefix '{}' is ambiguous ({} matches)", arg, matches.len()),
    }
}

fn handle_move(conn: &Connection, backend: &SqliteBackend, lead: &str, stage: &str) -> Result<()> {
    let lead_id = resolve_lead_id(conn, lead)?;
    let stage = StageRepo::resolve(conn, stage)?
        .with_context(|| format!("Stage '{}' not found", stage))?;

    let orchestrator = MoveOrchestrator::new(backend).with_filter(LeadFilter::All);
    let mut store = PipelineStore::new();
    orchestrator.load(&mut store)?;
    store.subscribe(Box::new(|action: &PipelineAction, state: &PipelineState| match action {
        PipelineAction::MoveOptimistic { lead_id, to_stage_id } => {
            log::info!("Lead {} shown in {} pending confirmation", lead_id, to_stage_id);
        }
        PipelineAction::MoveRollback { from_stage_id, .. } => {
            let name = state.stage(from_stage_id).map_or(from_stage_id.as_str(), |s| s.name.as_str());
            eprintln!("Move rolled back; lead is back in {}", name);
        }
        _ => {}
    }));

    let outcome = orchestrator.move_lead(&mut store, &lead_id, &stage.id)?;
    println!("{}", format_move_outcome(&outcome, store.state()));
    if let Some(err) = &store.state().error {
        eprintln!("Warning: pipeline reload failed: {}", err);
    }
    Ok(())
}

fn handle_board<B: PipelineBackend>(backend: &B, filter: Option<&str>, config: &Config) -> Result<()> {
    let store = load_store(backend, parse_filter(filter)?)?;
    print!(
        "{}",
        format_board(store.state(), &config.pipeline.hidden_stages, get_terminal_width(), is_tty())
    );
    Ok(())
}

fn handle_nav(role: Option<&str>, team: bool, config: &Config) -> Result<()> {
    let role = match role {
        Some(r) => Role::from_str(r).with_context(|| {
            let known: Vec<&str> = Role::ALL.iter().map(|r| r.as_str()).collect();
            format!("Unknown role '{}'. Known roles: {}", r, known.join(", "))
        })?,
        None => config.role,
    };
    let routes = visible_routes(role, &NavContext { has_team: team });
    print!("{}", format_routes(&routes, is_tty()));
    Ok(())
}

fn handle_week<B: PipelineBackend>(backend: &B, date: Option<&str>, prev: bool, next: bool) -> Result<()> {
    let today = chrono::Local::now().date_naive();
    let anchor = match date {
        Some(expr) => parse_date(expr, today)?,
        None => today,
    };
    let mut range = WeekRange::containing(anchor);
    if prev {
        range = range.previous();
    } else if next {
        range = range.next();
    }
    let store = load_store(backend, LeadFilter::Active)?;
    let buckets = bucket_by_day(range, store.state().leads.iter(), |lead| {
        lead.next_follow_up_ts.and_then(local_date)
    });
    print!("{}", format_week(&buckets, is_tty()));
    Ok(())
}
