// Date expression parsing for follow-up dates and week selection

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use anyhow::{Context, Result};

/// Parse a date expression into a local calendar date.
/// Supports `YYYY-MM-DD`, `today`, `tomorrow`, `yesterday` and `+Nd` / `-Nd`.
pub fn parse_date(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let expr = expr.trim();
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    match expr {
        "today" => Ok(today),
        "tomorrow" => Ok(today + Duration::days(1)),
        "yesterday" => Ok(today - Duration::days(1)),
        _ => {
            let offset = expr
                .strip_suffix('d')
                .filter(|n| n.starts_with('+') || n.starts_with('-'))
                .and_then(|n| n.parse::<i64>().ok())
                .with_context(|| format!("Unsupported date expression: '{}'", expr))?;
            Ok(today + Duration::days(offset))
        }
    }
}

/// Parse a date or `YYYY-MM-DDTHH:MM` expression into a Unix timestamp
/// (local time; dates resolve to midnight)
pub fn parse_date_expr(expr: &str) -> Result<i64> {
    if let Ok(datetime) = NaiveDateTime::parse_from_str(expr.trim(), "%Y-%m-%dT%H:%M") {
        return local_timestamp(datetime);
    }

    let date = parse_date(expr, Local::now().date_naive())?;
    let midnight = date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| anyhow::anyhow!("Invalid date"))?;
    local_timestamp(midnight)
}

fn local_timestamp(datetime: NaiveDateTime) -> Result<i64> {
    let local_dt = Local.from_local_datetime(&datetime)
        .earliest()
        .ok_or_else(|| anyhow::anyhow!("Nonexistent local time: {}", datetime))?;
    Ok(local_dt.timestamp())
}

/// Local calendar date of a Unix timestamp
pub fn local_date(ts: i64) -> Option<NaiveDate> {
    Local.timestamp_opt(ts, 0).single().map(|dt| dt.date_naive())
}
