use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

pub(crate) fn parse_date(date_str: Option<String>) -> Result<NaiveDate> {
    match date_str {
        None => Ok(Local::now().date_naive()),
        Some(s) => match s.as_str() {
            "today" => Ok(Local::now().date_naive()),
            "yesterday" => Ok(Local::now().date_naive() - chrono::Duration::days(1)),
            "tomorrow" => Ok(Local::now().date_naive() + chrono::Duration::days(1)),
            _ => NaiveDate::parse_from_str(&s, "%Y-%m-%d").with_context(|| {
                format!("Invalid date '{s}'. Use YYYY-MM-DD or today/yesterday/tomorrow")
            }),
        },
    }
}

/// Accepts the usual Italian and English spellings of "yes".
pub(crate) fn parse_confirmation(input: &str) -> bool {
    matches!(
        input.trim().to_lowercase().as_str(),
        "s" | "si" | "sì" | "y" | "yes"
    )
}

/// Ask on stderr, read one line from stdin. Anything but a yes is a no.
pub(crate) fn confirm(message: &str) -> Result<bool> {
    eprint!("{message} [s/N] ");
    io::stderr().flush()?;
    let stdin = io::stdin();
    let line = stdin.lock().lines().next().context("No input")??;
    Ok(parse_confirmation(&line))
}

pub(crate) fn json_error(message: &str) -> String {
    #[derive(Serialize)]
    struct CliError<'a> {
        error: &'a str,
    }
    serde_json::to_string(&CliError { error: message })
        .unwrap_or_else(|_| format!("{{\"error\":\"{message}\"}}"))
}

pub(crate) fn write_artifact(dir: &Path, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
    let path = dir.join(filename);
    std::fs::write(&path, bytes)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(path)
}
