use anyhow::Result;
use tabled::{Table, Tabled, settings::Style};

use mangia_core::models::{Gender, Goal, Lifestyle, UserProfile, format_quantity};
use mangia_core::service::DiaryService;

#[allow(clippy::too_many_arguments)]
pub(crate) fn cmd_profile_set(
    service: &DiaryService,
    age: Option<u32>,
    gender: Option<String>,
    height: Option<f64>,
    weight: Option<f64>,
    lifestyle: Option<String>,
    goal: Option<String>,
    conditions: Option<String>,
    json: bool,
) -> Result<()> {
    // Start from what is stored so unset flags keep their value.
    let mut profile = service.profile()?;

    if let Some(age) = age {
        profile.age = Some(age);
    }
    if let Some(gender) = gender {
        profile.gender = Some(Gender::parse(&gender)?);
    }
    if let Some(height) = height {
        profile.height = Some(height);
    }
    if let Some(weight) = weight {
        profile.weight = Some(weight);
    }
    if let Some(lifestyle) = lifestyle {
        profile.lifestyle = Some(Lifestyle::parse(&lifestyle)?);
    }
    if let Some(goal) = goal {
        profile.goal = Some(Goal::parse(&goal)?);
    }
    if let Some(conditions) = conditions {
        profile.conditions = Some(conditions);
    }

    service.save_profile(&profile)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        println!("Profile saved.");
        print_profile(&profile);
    }
    Ok(())
}

pub(crate) fn cmd_profile_show(service: &DiaryService, json: bool) -> Result<()> {
    let profile = service.profile()?;
    if json {
        println!("{}", serde_json::to_string_pretty(&profile)?);
    } else {
        print_profile(&profile);
    }
    Ok(())
}

fn print_profile(profile: &UserProfile) {
    #[derive(Tabled)]
    struct ProfileRow {
        #[tabled(rename = "Field")]
        field: &'static str,
        #[tabled(rename = "Value")]
        value: String,
    }

    let rows = vec![
        ProfileRow {
            field: "Age",
            value: profile.age.map_or("-".into(), |v| v.to_string()),
        },
        ProfileRow {
            field: "Gender",
            value: profile.gender.map_or("-".into(), |v| v.label().to_string()),
        },
        ProfileRow {
            field: "Height (cm)",
            value: profile.height.map_or("-".into(), format_quantity),
        },
        ProfileRow {
            field: "Weight (kg)",
            value: profile.weight.map_or("-".into(), format_quantity),
        },
        ProfileRow {
            field: "Lifestyle",
            value: profile
                .lifestyle
                .map_or("-".into(), |v| v.label().to_string()),
        },
        ProfileRow {
            field: "Goal",
            value: profile.goal.map_or("-".into(), |v| v.label().to_string()),
        },
        ProfileRow {
            field: "Conditions",
            value: profile.conditions.clone().unwrap_or_else(|| "-".into()),
        },
    ];

    let table = Table::new(&rows).with(Style::rounded()).to_string();
    println!("{table}");
}
