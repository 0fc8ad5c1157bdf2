use anyhow::Result;
use std::path::PathBuf;

use mangia_core::export::{daily_analysis_filename, daily_analysis_text};
use mangia_core::gateway::AnalysisProvider;
use mangia_core::service::DiaryService;

use super::helpers::{parse_date, write_artifact};

pub(crate) fn cmd_analyze(
    service: &DiaryService,
    provider: &dyn AnalysisProvider,
    date: Option<String>,
    save: bool,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let date = parse_date(date)?;
    let analysis = service.analyze_day(provider, &date.to_string())?;
    let text = daily_analysis_text(date, &analysis);

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{text}");
    }

    if save {
        let dir = out.unwrap_or_else(|| PathBuf::from("."));
        let path = write_artifact(&dir, &daily_analysis_filename(date), text.as_bytes())?;
        eprintln!("Saved: {}", path.display());
    }
    Ok(())
}
