use anyhow::Result;
use std::process;

use mangia_core::models::DailyEntry;
use mangia_core::service::DiaryService;

use super::helpers::{json_error, parse_date};

pub(crate) fn cmd_log(
    service: &DiaryService,
    date: Option<String>,
    meals: Option<String>,
    activity: Option<String>,
    day_off: Option<bool>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let mut entry = service.entry_or_blank(&date.to_string())?;

    // Only the flags given on the command line touch the stored entry.
    if let Some(meals) = meals {
        entry.meals = meals;
    }
    if let Some(activity) = activity {
        entry.activity = activity;
    }
    if let Some(day_off) = day_off {
        entry.is_non_working_day = day_off;
    }

    let stored = service.save_entry(&entry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stored)?);
    } else {
        println!("Saved entry for {date}");
        print_entry(&stored);
    }
    Ok(())
}

pub(crate) fn cmd_show(service: &DiaryService, date: Option<String>, json: bool) -> Result<()> {
    let date = parse_date(date)?;
    let Some(entry) = service.entry(&date.to_string())? else {
        let msg = format!("No entry for {date}");
        if json {
            println!("{}", json_error(&msg));
        } else {
            eprintln!("{msg}");
        }
        process::exit(2);
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        print_entry(&entry);
    }
    Ok(())
}

fn print_entry(entry: &DailyEntry) {
    let marker = if entry.is_non_working_day {
        " (non-working day)"
    } else {
        ""
    };
    println!("Date: {}{marker}", entry.date);
    println!("Meals: {}", field_or_none(&entry.meals));
    println!("Activity: {}", field_or_none(&entry.activity));
}

fn field_or_none(value: &str) -> &str {
    if value.trim().is_empty() { "(none)" } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_log_creates_entry() {
        let service = DiaryService::open_in_memory().unwrap();
        cmd_log(
            &service,
            Some("2024-03-04".to_string()),
            Some("Pasta al pesto".to_string()),
            None,
            None,
            false,
        )
        .unwrap();

        let entry = service.entry("2024-03-04").unwrap().unwrap();
        assert_eq!(entry.meals, "Pasta al pesto");
        assert_eq!(entry.activity, "");
        assert!(!entry.is_non_working_day);
    }

    #[test]
    fn test_cmd_log_merges_partial_updates() {
        let service = DiaryService::open_in_memory().unwrap();
        cmd_log(
            &service,
            Some("2024-03-04".to_string()),
            Some("Minestrone".to_string()),
            None,
            None,
            false,
        )
        .unwrap();
        cmd_log(
            &service,
            Some("2024-03-04".to_string()),
            None,
            Some("Corsa 5 km".to_string()),
            Some(true),
            false,
        )
        .unwrap();

        let entry = service.entry("2024-03-04").unwrap().unwrap();
        assert_eq!(entry.meals, "Minestrone");
        assert_eq!(entry.activity, "Corsa 5 km");
        assert!(entry.is_non_working_day);
    }

    #[test]
    fn test_cmd_log_rejects_bad_date() {
        let service = DiaryService::open_in_memory().unwrap();
        let result = cmd_log(
            &service,
            Some("04/03/2024".to_string()),
            Some("Pizza".to_string()),
            None,
            None,
            false,
        );
        assert!(result.is_err());
        assert!(service.entries().unwrap().is_empty());
    }

    #[test]
    fn test_field_or_none() {
        assert_eq!(field_or_none(""), "(none)");
        assert_eq!(field_or_none("  "), "(none)");
        assert_eq!(field_or_none("Pranzo"), "Pranzo");
    }
}
