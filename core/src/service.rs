use std::path::Path;

use anyhow::Result;
use chrono::NaiveDate;

use crate::db::Database;
use crate::gateway::{self, AnalysisProvider, PeriodReport};
use crate::models::{DailyEntry, NutrientAnalysis, UserProfile};
use crate::period::{self, Granularity};

/// High-level diary API. Wraps the database and the analysis gateway so
/// callers see one surface for logging, profile and reports.
pub struct DiaryService {
    db: Database,
}

impl DiaryService {
    pub fn open(db_path: &Path) -> Result<Self> {
        let db = Database::open(db_path)?;
        Ok(Self { db })
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory()?;
        Ok(Self { db })
    }

    // --- Entries ---

    /// Insert or replace the entry for its date. Returns the stored form.
    pub fn save_entry(&self, entry: &DailyEntry) -> Result<DailyEntry> {
        self.db.upsert_entry(entry)
    }

    pub fn entry(&self, date: &str) -> Result<Option<DailyEntry>> {
        self.db.entry(date)
    }

    /// Entry for `date`, or a blank one when nothing has been logged yet.
    pub fn entry_or_blank(&self, date: &str) -> Result<DailyEntry> {
        Ok(self
            .db
            .entry(date)?
            .unwrap_or_else(|| DailyEntry::blank(date)))
    }

    pub fn entries(&self) -> Result<Vec<DailyEntry>> {
        self.db.entries()
    }

    pub fn entries_between(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyEntry>> {
        self.db.entries_between(&start.to_string(), &end.to_string())
    }

    /// Entries falling in the period containing `reference`.
    pub fn entries_for_period(
        &self,
        reference: NaiveDate,
        granularity: Granularity,
    ) -> Result<Vec<DailyEntry>> {
        let entries = self.db.entries()?;
        Ok(period::filter_entries(&entries, reference, granularity))
    }

    // --- Profile ---

    pub fn profile(&self) -> Result<UserProfile> {
        self.db.profile()
    }

    pub fn save_profile(&self, profile: &UserProfile) -> Result<()> {
        self.db.save_profile(profile)
    }

    // --- Analysis (orchestrated through the provider) ---

    /// Analyze the stored entry for `date`. A date with nothing logged
    /// analyzes as a blank entry and fails meal validation, so no provider
    /// call is made for it.
    pub fn analyze_day(
        &self,
        provider: &dyn AnalysisProvider,
        date: &str,
    ) -> Result<NutrientAnalysis> {
        let entry = self.entry_or_blank(date)?;
        let profile = self.db.profile()?;
        gateway::analyze_daily_meals(provider, &entry, &profile)
    }

    /// Structured report over the period containing `reference`.
    pub fn period_report(
        &self,
        provider: &dyn AnalysisProvider,
        reference: NaiveDate,
        granularity: Granularity,
    ) -> Result<PeriodReport> {
        let entries = self.entries_for_period(reference, granularity)?;
        let profile = self.db.profile()?;
        gateway::generate_period_analysis(provider, &entries, granularity, &profile)
    }
}
