//! Interactive session state: current date, active view and the
//! unsaved-changes flag, driven through a single update function.
//!
//! Navigation away from a dirty daily view is gated: `update` answers
//! [`Outcome::NeedsConfirmation`] and leaves the state untouched; the caller
//! asks the user and re-issues the action through [`Session::force`].

use anyhow::{Result, bail};
use chrono::NaiveDate;

use crate::period::Granularity;

pub const CONFIRM_DATE_CHANGE: &str =
    "Hai delle modifiche non salvate. Sei sicuro di voler cambiare data? Le modifiche andranno perse.";
pub const CONFIRM_VIEW_CHANGE: &str =
    "Hai delle modifiche non salvate. Sei sicuro di voler cambiare vista? Le modifiche andranno perse.";
pub const CONFIRM_QUIT: &str =
    "Hai delle modifiche non salvate. Sei sicuro di voler uscire? Le modifiche andranno perse.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewMode {
    Daily,
    Weekly,
    Monthly,
    Annual,
}

impl ViewMode {
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Annual];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Annual => "annual",
        }
    }

    /// Italian label, as shown in the session header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Daily => "giornaliera",
            Self::Weekly => "settimanale",
            Self::Monthly => "mensile",
            Self::Annual => "annuale",
        }
    }

    /// The report granularity behind this view; the daily view has none.
    #[must_use]
    pub fn granularity(self) -> Option<Granularity> {
        match self {
            Self::Daily => None,
            Self::Weekly => Some(Granularity::Week),
            Self::Monthly => Some(Granularity::Month),
            Self::Annual => Some(Granularity::Year),
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lower = input.to_lowercase();
        for view in Self::ALL {
            if view.as_str() == lower {
                return Ok(view);
            }
        }
        bail!(
            "Invalid view '{input}'. Must be one of: {}",
            Self::ALL.map(Self::as_str).join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    GoTo(NaiveDate),
    Switch(ViewMode),
    MarkDirty,
    Saved,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    NeedsConfirmation,
    Quit,
}

/// Prompt text for an action that came back [`Outcome::NeedsConfirmation`].
#[must_use]
pub fn confirmation_message(action: &Action) -> &'static str {
    match action {
        Action::GoTo(_) => CONFIRM_DATE_CHANGE,
        Action::Switch(_) => CONFIRM_VIEW_CHANGE,
        _ => CONFIRM_QUIT,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    date: NaiveDate,
    view: ViewMode,
    dirty: bool,
}

impl Session {
    #[must_use]
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            view: ViewMode::Daily,
            dirty: false,
        }
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn view(&self) -> ViewMode {
        self.view
    }

    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Only an unsaved daily view gates navigation; edits are impossible in
    /// the report views.
    fn gated(&self) -> bool {
        self.dirty && self.view == ViewMode::Daily
    }

    /// Apply `action`, or report that the caller must confirm it first.
    pub fn update(&mut self, action: Action) -> Outcome {
        match action {
            Action::MarkDirty => {
                self.dirty = true;
                Outcome::Applied
            }
            Action::Saved => {
                self.dirty = false;
                Outcome::Applied
            }
            // Re-selecting the current view is a no-op before any gating.
            Action::Switch(view) if view == self.view => Outcome::Applied,
            Action::GoTo(_) | Action::Switch(_) | Action::Quit if self.gated() => {
                Outcome::NeedsConfirmation
            }
            Action::GoTo(date) => {
                self.date = date;
                Outcome::Applied
            }
            Action::Switch(view) => {
                self.view = view;
                if view != ViewMode::Daily {
                    self.dirty = false;
                }
                Outcome::Applied
            }
            Action::Quit => Outcome::Quit,
        }
    }

    /// Apply a confirmed action, discarding unsaved changes.
    pub fn force(&mut self, action: Action) -> Outcome {
        self.dirty = false;
        self.update(action)
    }
}
