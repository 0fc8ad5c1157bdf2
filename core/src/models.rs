use anyhow::{Result, bail};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One diary day, keyed by ISO date. At most one entry exists per date.
///
/// The attached analysis is a transient projection: it is regenerated on
/// demand and never serialized, so persisted entries always carry
/// `analysis: None`. Serialized field names follow the original camelCase
/// wire format (`isNonWorkingDay`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyEntry {
    /// Calendar day in `YYYY-MM-DD` form; the unique key.
    pub date: String,
    #[serde(default)]
    pub meals: String,
    #[serde(default)]
    pub activity: String,
    #[serde(default)]
    pub is_non_working_day: bool,
    // Serialization boundary: analyses never reach storage.
    #[serde(default, skip_serializing)]
    pub analysis: Option<NutrientAnalysis>,
}

impl DailyEntry {
    /// A blank entry for `date`, as the daily form starts out when nothing
    /// has been logged yet.
    #[must_use]
    pub fn blank(date: &str) -> Self {
        Self {
            date: date.to_string(),
            meals: String::new(),
            activity: String::new(),
            is_non_working_day: false,
            analysis: None,
        }
    }

    /// The entry as it is persisted: same payload, analysis dropped.
    #[must_use]
    pub fn without_analysis(&self) -> Self {
        Self {
            analysis: None,
            ..self.clone()
        }
    }
}

/// Per-day nutrient estimate returned by the model. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutrientAnalysis {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub summary: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micronutrients: Option<Vec<String>>,
}

/// Structured period report returned by the model. Derived, never persisted.
/// `micronutrients_analysis` is only requested for monthly and annual
/// periods.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodAnalysis {
    pub summary: String,
    pub strengths: String,
    pub improvements: String,
    pub suggestions: String,
    pub encouragement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub micronutrients_analysis: Option<String>,
}

// --- Profile types ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    pub const ALL: [Self; 3] = [Self::Male, Self::Female, Self::Other];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
            Self::Other => "other",
        }
    }

    /// Italian display label, as shown in the profile table.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Male => "Maschio",
            Self::Female => "Femmina",
            Self::Other => "Altro",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lower = input.to_lowercase();
        for gender in Self::ALL {
            if gender.as_str() == lower {
                return Ok(gender);
            }
        }
        bail!(
            "Invalid gender '{input}'. Must be one of: {}",
            Self::ALL.map(Self::as_str).join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifestyle {
    Sedentary,
    ModeratelyActive,
    Active,
}

impl Lifestyle {
    pub const ALL: [Self; 3] = [Self::Sedentary, Self::ModeratelyActive, Self::Active];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Sedentary => "sedentary",
            Self::ModeratelyActive => "moderately_active",
            Self::Active => "active",
        }
    }

    /// Italian display label, as shown in the profile table.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentario",
            Self::ModeratelyActive => "Moderatamente Attivo",
            Self::Active => "Attivo",
        }
    }

    /// Richer wording used when describing the profile to the model.
    #[must_use]
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::Sedentary => "Sedentario (impiegato)",
            Self::ModeratelyActive => "Moderatamente attivo (commesso, cameriere)",
            Self::Active => "Attivo (muratore, contadino)",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lower = input.to_lowercase();
        for lifestyle in Self::ALL {
            if lifestyle.as_str() == lower {
                return Ok(lifestyle);
            }
        }
        bail!(
            "Invalid lifestyle '{input}'. Must be one of: {}",
            Self::ALL.map(Self::as_str).join(", ")
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Goal {
    LoseWeight,
    GainMuscle,
    MaintainWeight,
    ImprovePerformance,
    EatHealthier,
    IdentifyIssues,
}

impl Goal {
    pub const ALL: [Self; 6] = [
        Self::LoseWeight,
        Self::GainMuscle,
        Self::MaintainWeight,
        Self::ImprovePerformance,
        Self::EatHealthier,
        Self::IdentifyIssues,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::LoseWeight => "lose_weight",
            Self::GainMuscle => "gain_muscle",
            Self::MaintainWeight => "maintain_weight",
            Self::ImprovePerformance => "improve_performance",
            Self::EatHealthier => "eat_healthier",
            Self::IdentifyIssues => "identify_issues",
        }
    }

    /// Italian display label, as shown in the profile table.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::LoseWeight => "Perdere peso",
            Self::GainMuscle => "Aumentare massa muscolare",
            Self::MaintainWeight => "Mantenere il peso",
            Self::ImprovePerformance => "Migliorare performance",
            Self::EatHealthier => "Mangiare più sano",
            Self::IdentifyIssues => "Identificare cibi problematici",
        }
    }

    /// Richer wording used when describing the profile to the model.
    #[must_use]
    pub fn prompt_label(self) -> &'static str {
        match self {
            Self::LoseWeight => "Perdere peso (deficit calorico)",
            Self::GainMuscle => "Aumentare la massa muscolare (surplus calorico, focus proteico)",
            Self::MaintainWeight => "Mantenere il peso",
            Self::ImprovePerformance => "Migliorare la performance sportiva",
            Self::EatHealthier => "Mangiare in modo più sano e consapevole",
            Self::IdentifyIssues => "Identificare cibi che causano problemi",
        }
    }

    pub fn parse(input: &str) -> Result<Self> {
        let lower = input.to_lowercase();
        for goal in Self::ALL {
            if goal.as_str() == lower {
                return Ok(goal);
            }
        }
        bail!(
            "Invalid goal '{input}'. Must be one of: {}",
            Self::ALL.map(Self::as_str).join(", ")
        )
    }
}

/// Singleton profile record. Every field is optional and the whole record is
/// overwritten on save.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    /// Centimetres.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Kilograms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<Lifestyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goal: Option<Goal>,
    /// Allergies, intolerances, medical conditions, diet choices.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditions: Option<String>,
}

impl UserProfile {
    /// True when no field carries a value. The prompt builder then reports
    /// that no profile was provided.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.age.is_none()
            && self.gender.is_none()
            && self.height.is_none()
            && self.weight.is_none()
            && self.lifestyle.is_none()
            && self.goal.is_none()
            && self.conditions.as_deref().is_none_or(|c| c.trim().is_empty())
    }
}

/// Validate a diary date key: strict `YYYY-MM-DD`.
pub fn validate_entry_date(date: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| anyhow::anyhow!("Invalid entry date '{date}'. Must be YYYY-MM-DD"))
}

/// Render a numeric profile field without a trailing `.0`.
#[must_use]
pub fn format_quantity(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.0}")
    } else {
        value.to_string()
    }
}
