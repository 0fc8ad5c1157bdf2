use thiserror::Error;

/// User-facing failure taxonomy for analysis operations.
///
/// An empty period is deliberately not a variant: it is a valid result
/// (`PeriodReport::NoData`), not a failure. Everything else propagates as
/// plain `anyhow` errors; these two variants stay downcastable through the
/// chain so callers can tell a rejected input from a failed remote call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DiaryError {
    /// Input rejected before any remote call was made.
    #[error("{0}")]
    Validation(String),
    /// The remote analysis call failed or returned unusable output.
    #[error("{0}")]
    Service(String),
}

/// Shown when analysis is requested for a day with no meal text.
pub const EMPTY_MEALS: &str = "La descrizione dei pasti non può essere vuota.";

/// Shown when the daily analysis call fails or returns garbage.
pub const DAILY_ANALYSIS_UNAVAILABLE: &str =
    "Impossibile ottenere l'analisi nutrizionale. Il modello AI potrebbe essere temporaneamente non disponibile.";

/// Shown when the period analysis call fails or returns garbage.
pub const PERIOD_ANALYSIS_UNAVAILABLE: &str =
    "Impossibile generare l'analisi del periodo. Il modello AI potrebbe essere temporaneamente non disponibile.";
