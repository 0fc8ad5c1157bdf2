use anyhow::{Result, bail};
use chrono::Local;
use std::path::PathBuf;

use mangia_core::export::{csv_filename, entries_csv, entries_pdf, pdf_filename};
use mangia_core::service::DiaryService;

use super::helpers::{parse_date, write_artifact};

pub(crate) fn cmd_export(
    service: &DiaryService,
    format: &str,
    from: Option<String>,
    to: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let start = match from {
        Some(s) => parse_date(Some(s))?,
        None => Local::now().date_naive() - chrono::Duration::days(30),
    };
    let end = parse_date(to)?;
    if start > end {
        bail!("Start date {start} is after end date {end}");
    }

    let entries = service.entries_between(start, end)?;
    let profile = service.profile()?;

    let (filename, bytes) = match format {
        "csv" => (csv_filename(start, end), entries_csv(&entries)?),
        "pdf" => (
            pdf_filename(start, end),
            entries_pdf(&entries, &profile, start, end)?,
        ),
        other => bail!("Invalid format '{other}'. Must be one of: csv, pdf"),
    };

    let dir = out.unwrap_or_else(|| PathBuf::from("."));
    let path = write_artifact(&dir, &filename, &bytes)?;
    println!("Exported {} entries to {}", entries.len(), path.display());
    Ok(())
}
