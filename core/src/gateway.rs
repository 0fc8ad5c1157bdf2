//! Analysis orchestration: validates input, builds the prompt and schema,
//! calls the configured provider and parses what comes back.
//!
//! The provider is behind a trait so the CLI can plug in the real Gemini
//! client while tests run against an in-process mock.

use anyhow::{Context, Result, bail};
use serde_json::Value;

use crate::error::{
    DAILY_ANALYSIS_UNAVAILABLE, DiaryError, EMPTY_MEALS, PERIOD_ANALYSIS_UNAVAILABLE,
};
use crate::gemini::{parse_nutrient_analysis, parse_period_analysis};
use crate::models::{DailyEntry, NutrientAnalysis, PeriodAnalysis, UserProfile};
use crate::period::Granularity;
use crate::prompt::{self, NO_DATA_MESSAGE};

/// A text-generation backend. `schema` constrains the response to JSON of
/// that shape when given.
pub trait AnalysisProvider: Send + Sync {
    fn generate(&self, prompt: &str, schema: Option<&Value>) -> Result<String>;
}

/// Outcome of a period report request. An empty period is a normal outcome,
/// not an error, and costs no provider call.
#[derive(Debug, Clone, PartialEq)]
pub enum PeriodReport {
    NoData(String),
    Analysis(PeriodAnalysis),
}

/// Analyze one day's meals and activity against the profile.
///
/// Fails with [`DiaryError::Validation`] before any provider call when the
/// meals text is blank; provider and parse failures surface as
/// [`DiaryError::Service`] with the cause attached underneath.
pub fn analyze_daily_meals(
    provider: &dyn AnalysisProvider,
    entry: &DailyEntry,
    profile: &UserProfile,
) -> Result<NutrientAnalysis> {
    if entry.meals.trim().is_empty() {
        bail!(DiaryError::Validation(EMPTY_MEALS.to_string()));
    }
    let prompt_text = prompt::daily_prompt(entry, profile);
    let schema = prompt::daily_schema();
    provider
        .generate(&prompt_text, Some(&schema))
        .and_then(|text| parse_nutrient_analysis(&text))
        .context(DiaryError::Service(DAILY_ANALYSIS_UNAVAILABLE.to_string()))
}

/// Build the structured report for an already-filtered period.
pub fn generate_period_analysis(
    provider: &dyn AnalysisProvider,
    entries: &[DailyEntry],
    granularity: Granularity,
    profile: &UserProfile,
) -> Result<PeriodReport> {
    if entries.is_empty() {
        return Ok(PeriodReport::NoData(NO_DATA_MESSAGE.to_string()));
    }
    let prompt_text = prompt::period_prompt(entries, granularity, profile);
    let schema = prompt::period_schema(granularity);
    let analysis = provider
        .generate(&prompt_text, Some(&schema))
        .and_then(|text| parse_period_analysis(&text))
        .context(DiaryError::Service(PERIOD_ANALYSIS_UNAVAILABLE.to_string()))?;
    Ok(PeriodReport::Analysis(analysis))
}
