use anyhow::{Result, bail};
use chrono::{Datelike, Duration, Locale, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::models::DailyEntry;

/// Reporting window kind for period analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    Week,
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Self; 3] = [Self::Week, Self::Month, Self::Year];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
            Self::Year => "year",
        }
    }

    /// Italian period label used in prompts and export filenames.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Week => "settimanale",
            Self::Month => "mensile",
            Self::Year => "annuale",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lower = input.to_lowercase();
        for granularity in Self::ALL {
            if granularity.as_str() == lower {
                return Ok(granularity);
            }
        }
        bail!(
            "Invalid period '{input}'. Must be one of: {}",
            Self::ALL.map(Self::as_str).join(", ")
        )
    }
}

/// Inclusive window endpoints for the period containing `reference`.
///
/// Weekly is the trailing 7-day window ending on the reference day; monthly
/// and yearly cover the whole calendar month/year.
#[must_use]
pub fn window(reference: NaiveDate, granularity: Granularity) -> (NaiveDate, NaiveDate) {
    match granularity {
        Granularity::Week => (reference - Duration::days(6), reference),
        Granularity::Month => (first_of_month(reference), last_of_month(reference)),
        Granularity::Year => (
            reference.with_ordinal(1).unwrap_or(reference),
            NaiveDate::from_ymd_opt(reference.year(), 12, 31).unwrap_or(reference),
        ),
    }
}

/// Select the entries whose date falls in the period around `reference`.
///
/// Monthly and yearly membership is calendar equality (same year+month /
/// same year), not a day offset. Entries with an unparseable date are left
/// out. Order is store order; an empty result is a valid outcome, not an
/// error.
#[must_use]
pub fn filter_entries(
    entries: &[DailyEntry],
    reference: NaiveDate,
    granularity: Granularity,
) -> Vec<DailyEntry> {
    entries
        .iter()
        .filter(|entry| {
            NaiveDate::parse_from_str(&entry.date, "%Y-%m-%d")
                .is_ok_and(|date| in_window(date, reference, granularity))
        })
        .cloned()
        .collect()
}

fn in_window(date: NaiveDate, reference: NaiveDate, granularity: Granularity) -> bool {
    match granularity {
        Granularity::Week => {
            let start = reference - Duration::days(6);
            date >= start && date <= reference
        }
        Granularity::Month => {
            date.year() == reference.year() && date.month() == reference.month()
        }
        Granularity::Year => date.year() == reference.year(),
    }
}

/// Heading shown above a period report, e.g. "Report Mensile: marzo 2024".
#[must_use]
pub fn report_title(reference: NaiveDate, granularity: Granularity) -> String {
    match granularity {
        Granularity::Week => {
            let (start, end) = window(reference, granularity);
            format!(
                "Report Settimanale: {} - {}",
                start.format("%d/%m/%Y"),
                end.format("%d/%m/%Y")
            )
        }
        Granularity::Month => format!(
            "Report Mensile: {}",
            reference.format_localized("%B %Y", Locale::it_IT)
        ),
        Granularity::Year => format!("Report Annuale: {}", reference.year()),
    }
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

fn last_of_month(date: NaiveDate) -> NaiveDate {
    let next_month = if date.month() == 12 {
        NaiveDate::from_ymd_opt(date.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(date.year(), date.month() + 1, 1)
    };
    next_month.and_then(|d| d.pred_opt()).unwrap_or(date)
}
