use anyhow::Result;
use std::path::PathBuf;

use mangia_core::export::{period_report_filename, period_report_text};
use mangia_core::gateway::{AnalysisProvider, PeriodReport};
use mangia_core::period::Granularity;
use mangia_core::service::DiaryService;

use super::helpers::{parse_date, write_artifact};

pub(crate) fn cmd_report(
    service: &DiaryService,
    provider: &dyn AnalysisProvider,
    period: &str,
    date: Option<String>,
    save: bool,
    out: Option<PathBuf>,
    json: bool,
) -> Result<()> {
    let granularity = Granularity::parse(period)?;
    let reference = parse_date(date)?;

    let analysis = match service.period_report(provider, reference, granularity)? {
        PeriodReport::NoData(message) => {
            // An empty period is an answer, not an error.
            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({ "noData": message }))?
                );
            } else {
                println!("{message}");
            }
            return Ok(());
        }
        PeriodReport::Analysis(analysis) => analysis,
    };

    let text = period_report_text(&analysis, granularity, reference);
    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
    } else {
        println!("{text}");
    }

    if save {
        let dir = out.unwrap_or_else(|| PathBuf::from("."));
        let path = write_artifact(
            &dir,
            &period_report_filename(granularity, reference),
            text.as_bytes(),
        )?;
        eprintln!("Saved: {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use chrono::NaiveDate;
    use mangia_core::models::DailyEntry;
    use serde_json::Value;

    struct CannedProvider;

    impl AnalysisProvider for CannedProvider {
        fn generate(&self, _prompt: &str, _schema: Option<&Value>) -> Result<String> {
            Ok(r#"{
                "summary": "Settimana varia.",
                "strengths": "Tante verdure.",
                "improvements": "Poca acqua.",
                "suggestions": "Bevi di più.",
                "encouragement": "Continua così!"
            }"#
            .to_string())
        }
    }

    struct UnreachableProvider;

    impl AnalysisProvider for UnreachableProvider {
        fn generate(&self, _prompt: &str, _schema: Option<&Value>) -> Result<String> {
            panic!("provider must not be called for an empty period");
        }
    }

    #[test]
    fn test_cmd_report_empty_period_is_ok() {
        let service = DiaryService::open_in_memory().unwrap();
        let result = cmd_report(
            &service,
            &UnreachableProvider,
            "week",
            Some("2024-03-04".to_string()),
            false,
            None,
            false,
        );
        assert!(result.is_ok());
    }

    #[test]
    fn test_cmd_report_saves_artifact() {
        let service = DiaryService::open_in_memory().unwrap();
        service
            .save_entry(&DailyEntry {
                meals: "Insalata di farro".to_string(),
                ..DailyEntry::blank("2024-03-04")
            })
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        cmd_report(
            &service,
            &CannedProvider,
            "week",
            Some("2024-03-04".to_string()),
            true,
            Some(dir.path().to_path_buf()),
            false,
        )
        .unwrap();

        let reference = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        let saved = std::fs::read_to_string(
            dir.path()
                .join(period_report_filename(Granularity::Week, reference)),
        )
        .unwrap();
        assert!(saved.contains("Report Settimanale"));
        assert!(saved.contains("Continua così!"));
    }

    #[test]
    fn test_cmd_report_rejects_unknown_period() {
        let service = DiaryService::open_in_memory().unwrap();
        let result = cmd_report(&service, &CannedProvider, "decade", None, false, None, false);
        assert!(result.is_err());
    }
}
