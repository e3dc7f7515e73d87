//! Calendar-day grouping for the history list.

use std::fmt;

use chrono::{DateTime, Days, NaiveDate, TimeZone};

use crate::models::HistoryEntry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayLabel {
    Today,
    Yesterday,
    Date(NaiveDate),
}

impl DayLabel {
    pub fn for_date(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            DayLabel::Today
        } else if today.checked_sub_days(Days::new(1)) == Some(date) {
            DayLabel::Yesterday
        } else {
            DayLabel::Date(date)
        }
    }
}

impl fmt::Display for DayLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DayLabel::Today => f.write_str("Hôm nay"),
            DayLabel::Yesterday => f.write_str("Hôm qua"),
            DayLabel::Date(d) => write!(f, "{}", d.format("%-d/%-m/%Y")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryGroup<'a> {
    pub label: DayLabel,
    pub entries: Vec<&'a HistoryEntry>,
}

/// Local calendar date of an entry's millisecond timestamp in `tz`.
pub fn entry_date<Tz: TimeZone>(entry: &HistoryEntry, tz: &Tz) -> Option<NaiveDate> {
    DateTime::from_timestamp_millis(entry.timestamp).map(|utc| utc.with_timezone(tz).date_naive())
}

/// Fold a newest-first history list into day buckets.
///
/// Buckets appear in the order their label is first encountered, so a
/// newest-first input yields newest-day-first groups. Entries keep their
/// relative order inside each bucket. Entries with an unrepresentable
/// timestamp are skipped.
pub fn group_by_day<'a, Tz: TimeZone>(
    entries: &'a [HistoryEntry],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<HistoryGroup<'a>> {
    let mut groups: Vec<HistoryGroup<'a>> = Vec::new();

    for entry in entries {
        let Some(date) = entry_date(entry, tz) else {
            continue;
        };
        let label = DayLabel::for_date(date, today);
        match groups.iter_mut().find(|g| g.label == label) {
            Some(group) => group.entries.push(entry),
            None => groups.push(HistoryGroup {
                label,
                entries: vec![entry],
            }),
        }
    }

    groups
}
