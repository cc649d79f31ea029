// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, anyhow};
use chrono::NaiveDateTime;
use comfy_table::{Cell, Color, Table, presets::UTF8_FULL};
use rust_decimal::Decimal;

use crate::aggregate::budget::UsageLevel;
use crate::alerts::Severity;
use crate::models::flexible_datetime;

/// Accepts `YYYY-MM-DD` (midnight) or a full ISO date-time.
pub fn parse_datetime(s: &str) -> Result<NaiveDateTime> {
    flexible_datetime::parse(s)
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS", s))
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    s.trim()
        .parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Fetches an argument clap already enforces as required.
pub fn required<'a>(m: &'a clap::ArgMatches, id: &str) -> Result<&'a String> {
    m.get_one::<String>(id)
        .ok_or_else(|| anyhow!("Missing required argument '{}'", id))
}

pub fn optional(m: &clap::ArgMatches, id: &str) -> Option<String> {
    m.get_one::<String>(id)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

pub fn parse_id(m: &clap::ArgMatches, id: &str) -> Result<i64> {
    let raw = required(m, id)?;
    raw.trim()
        .parse::<i64>()
        .with_context(|| format!("Invalid id '{}'", raw))
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    styled_table(
        headers,
        rows.into_iter()
            .map(|r| r.into_iter().map(Cell::new).collect())
            .collect(),
    )
}

pub fn styled_table(headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r);
    }
    t
}

pub fn usage_cell(text: String, level: UsageLevel) -> Cell {
    match level {
        UsageLevel::Critical => Cell::new(text).fg(Color::Red),
        UsageLevel::Approaching => Cell::new(text).fg(Color::Yellow),
        UsageLevel::Healthy => Cell::new(text),
    }
}

pub fn severity_cell(s: Severity) -> Cell {
    let c = Cell::new(s.label());
    match s {
        Severity::Error => c.fg(Color::Red),
        Severity::Warning => c.fg(Color::Yellow),
        Severity::Info => c.fg(Color::Cyan),
    }
}

pub fn gain_cell(text: String, value: Decimal) -> Cell {
    if value > Decimal::ZERO {
        Cell::new(text).fg(Color::Green)
    } else if value < Decimal::ZERO {
        Cell::new(text).fg(Color::Red)
    } else {
        Cell::new(text)
    }
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn fmt_date(dt: &NaiveDateTime) -> String {
    dt.format("%Y-%m-%d").to_string()
}
