//! Terminal rendering of session state.
//!
//! Every function here returns a `String` so the CLI and the tests share one
//! code path; the caller decides where it is printed.

use chrono::{DateTime, NaiveDate, TimeZone};
use shift_lookup_core::grid::MatchResult;
use shift_lookup_core::history::group_by_day;
use shift_lookup_core::models::{DisplayResult, HistoryEntry};
use shift_lookup_core::session::{Phase, SessionState};
use std::fmt::Write;

/// Card header: 1-based position out of the total shift count.
pub fn card_title(index: usize, total: usize) -> String {
    format!("Ca {} (trong tổng {} ca làm trong ngày)", index + 1, total)
}

pub fn results(results: &[DisplayResult]) -> String {
    let mut out = String::new();
    for (i, r) in results.iter().enumerate() {
        let _ = writeln!(out, "{}", card_title(i, results.len()));
        let _ = writeln!(out, "  {}", r.formatted);
    }
    out
}

pub fn not_found(term: &str) -> String {
    format!("Không tìm thấy kết quả nào cho \"{}\"", term)
}

/// Everything below the input box for the current phase.
pub fn search_outcome(state: &SessionState) -> String {
    match &state.phase {
        Phase::Idle => String::new(),
        Phase::Rejected(e) => format!("{}\n", e),
        Phase::Querying { .. } => "Đang tra cứu...\n".to_string(),
        Phase::Found if state.results.is_empty() => format!("{}\n", not_found(&state.input)),
        Phase::Found => results(&state.results),
        Phase::NotFound => format!("{}\n", not_found(&state.input)),
        Phase::ConnectionError => format!("{}\n", state.status_message().unwrap_or_default()),
    }
}

/// Grouped history list, newest day first.
pub fn history<Tz: TimeZone>(entries: &[HistoryEntry], today: NaiveDate, tz: &Tz) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    for group in group_by_day(entries, today, tz) {
        let _ = writeln!(out, "{}", group.label.to_string().to_uppercase());
        for entry in group.entries {
            let time = DateTime::from_timestamp_millis(entry.timestamp)
                .map(|t| t.with_timezone(tz).format("%H:%M").to_string())
                .unwrap_or_default();
            let _ = writeln!(out, "  {} #{}", time, entry.term);
            if entry.saved_results.is_empty() {
                let _ = writeln!(out, "    Không có kết quả");
            }
            for r in &entry.saved_results {
                let _ = writeln!(out, "    {}", r);
            }
        }
    }
    out
}

pub fn matches(found: &[MatchResult]) -> String {
    let mut out = String::new();
    for m in found {
        let _ = writeln!(
            out,
            "[{},{}] {}",
            m.coordinates.row, m.coordinates.col, m.formatted
        );
    }
    out
}
