//! Italian prompt and response-schema builders for the analysis calls.
//!
//! The wording is product copy: it is what the model is instructed with, so
//! it stays Italian and stable. Schemas use the Gemini REST type names
//! (`OBJECT`, `NUMBER`, ...).

use serde_json::{Value, json};

use crate::models::{DailyEntry, Gender, Goal, Lifestyle, UserProfile, format_quantity};
use crate::period::Granularity;

/// Fixed text returned for an empty period; no remote call is made then.
pub const NO_DATA_MESSAGE: &str =
    "Nessun dato disponibile per questo periodo per generare un'analisi.";

const NON_WORKING_DAY_INSTRUCTION: &str = r#"ATTENZIONE: Questa è una GIORNATA NON LAVORATIVA. Lo "Stile di vita lavorativo" del profilo non si applica. Considera il livello di attività base di oggi come 'Sedentario'. L'analisi del dispendio energetico deve basarsi SOLO sull'attività fisica esplicitamente registrata."#;

const WORKING_DAY_INSTRUCTION: &str = r#"IMPORTANTE: Nel calcolare il fabbisogno calorico e nel formulare il riassunto, considera lo "Stile di vita lavorativo" del profilo utente come il livello di attività di base per una giornata tipo. L'"Attività fisica" registrata per il giorno è un'aggiunta (o una specificazione) a quel livello di base. Ad esempio, uno "Stile di vita: Attivo" implica un alto dispendio energetico di base, e l'attività del giorno (anche se "Nulla") si considera in aggiunta a quello."#;

/// Profile section shared by the daily and period prompts.
#[must_use]
pub fn profile_block(profile: &UserProfile) -> String {
    if profile.is_empty() {
        return "Nessun profilo utente fornito.".to_string();
    }

    let age = profile
        .age
        .map_or_else(|| "Non specificata".to_string(), |a| a.to_string());
    let gender = profile.gender.map_or("Non specificato", Gender::label);
    let height = profile
        .height
        .map_or_else(|| "Non specificata".to_string(), format_quantity);
    let weight = profile
        .weight
        .map_or_else(|| "Non specificata".to_string(), format_quantity);
    let lifestyle = profile
        .lifestyle
        .map_or("Non specificato", Lifestyle::prompt_label);
    let goal = profile.goal.map_or("Non specificato", Goal::prompt_label);
    let conditions = profile
        .conditions
        .as_deref()
        .filter(|c| !c.trim().is_empty())
        .unwrap_or("Nessuna");

    format!(
        "- Età: {age}\n\
         - Sesso: {gender}\n\
         - Altezza: {height} cm\n\
         - Peso: {weight} kg\n\
         - Stile di vita lavorativo: {lifestyle}\n\
         - Obiettivo: {goal}\n\
         - Condizioni mediche/diete: {conditions}"
    )
}

/// Prompt for the per-day nutrient analysis.
#[must_use]
pub fn daily_prompt(entry: &DailyEntry, profile: &UserProfile) -> String {
    let activity_instruction = if entry.is_non_working_day {
        NON_WORKING_DAY_INSTRUCTION
    } else {
        WORKING_DAY_INSTRUCTION
    };
    let activity = if entry.activity.trim().is_empty() {
        "Nessuna attività fisica registrata."
    } else {
        entry.activity.as_str()
    };

    format!(
        "Analizza i seguenti pasti e attività fisica in base al profilo utente fornito.\n\
         La tua analisi deve essere in ITALIANO e strettamente personalizzata.\n\
         Fornisci un'analisi nutrizionale dettagliata in formato JSON.\n\n\
         {activity_instruction}\n\n\
         Nel campo 'summary', commenta la giornata alimentare in relazione all'attività fisica *complessiva* (stile di vita di base + attività del giorno) e, soprattutto, in relazione agli obiettivi e alle condizioni dell'utente (es. se è in linea con l'obiettivo di perdita peso, se rispetta le restrizioni vegane, etc.). Sii incoraggiante e offri un consiglio specifico basato sui dati.\n\n\
         Profilo Utente:\n\
         {profile}\n\n\
         Dati del giorno:\n\
         Pasti: {meals}\n\
         Attività fisica: {activity}",
        profile = profile_block(profile),
        meals = entry.meals,
    )
}

/// Response schema for the daily analysis: four required numerics plus the
/// summary; micronutrients are optional.
#[must_use]
pub fn daily_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "calories": { "type": "NUMBER", "description": "Stima delle calorie totali" },
            "protein": { "type": "NUMBER", "description": "Stima delle proteine totali in grammi" },
            "carbs": { "type": "NUMBER", "description": "Stima dei carboidrati totali in grammi" },
            "fats": { "type": "NUMBER", "description": "Stima dei grassi totali in grammi" },
            "summary": { "type": "STRING", "description": "Un breve riassunto incoraggiante dell'assunzione giornaliera, tenendo conto dell'attività fisica e valutando se l'apporto è adeguato in base al profilo e agli obiettivi dell'utente." },
            "micronutrients": {
                "type": "ARRAY",
                "description": "Elenco dei principali micronutrienti presenti nei pasti.",
                "items": { "type": "STRING" }
            }
        },
        "required": ["calories", "protein", "carbs", "fats", "summary"]
    })
}

/// One paragraph per entry, the way the period prompt sees the diary. Days
/// flagged as non-working carry the marker the prompt instructions refer to.
#[must_use]
pub fn aggregate_entries(entries: &[DailyEntry]) -> String {
    entries
        .iter()
        .map(|entry| {
            let non_working = if entry.is_non_working_day {
                " (GIORNATA NON LAVORATIVA)"
            } else {
                ""
            };
            let meals = if entry.meals.is_empty() {
                "Nessuno"
            } else {
                entry.meals.as_str()
            };
            let activity = if entry.activity.is_empty() {
                "Nessuna"
            } else {
                entry.activity.as_str()
            };
            let micronutrients = entry
                .analysis
                .as_ref()
                .and_then(|a| a.micronutrients.as_ref())
                .filter(|m| !m.is_empty())
                .map_or_else(
                    || "Nessuna analisi AI per questo giorno.".to_string(),
                    |m| m.join(", "),
                );
            format!(
                "Data: {date}{non_working}\nPasti: {meals}\nAttività fisica: {activity}\nMicronutrienti Rilevati: {micronutrients}",
                date = entry.date,
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Monthly and annual reports also request the micronutrient-balance field;
/// weekly reports do not.
#[must_use]
pub fn requests_micronutrient_balance(granularity: Granularity) -> bool {
    matches!(granularity, Granularity::Month | Granularity::Year)
}

/// Prompt for the period report. The numbered sections map one-to-one onto
/// the fields of [`crate::models::PeriodAnalysis`].
#[must_use]
pub fn period_prompt(
    entries: &[DailyEntry],
    granularity: Granularity,
    profile: &UserProfile,
) -> String {
    let micronutrient_point = if requests_micronutrient_balance(granularity) {
        "\n6. Bilancio dei micronutrienti chiave (campo 'micronutrientsAnalysis'): basandoti sui dati dei \"Micronutrienti Rilevati\" giorno per giorno, crea un'analisi specifica. Valuta, in funzione del profilo utente (es. sesso, età, obiettivi), se emergono possibili carenze o eccessi ricorrenti (es. poco Ferro, troppo Sodio). Fornisci un breve paragrafo con osservazioni e consigli pratici. Se i dati sui micronutrienti sono scarsi o assenti, menzionalo e incoraggia l'utente a usare più spesso l'analisi giornaliera."
    } else {
        ""
    };

    format!(
        "Basandoti sul seguente diario alimentare e sul profilo utente, fornisci un'analisi {period} dettagliata, costruttiva e personalizzata in ITALIANO, in formato JSON.\n\n\
         Profilo Utente:\n\
         {profile}\n\n\
         IMPORTANTE: Quando analizzi l'attività fisica, presta attenzione ai giorni segnati come \"(GIORNATA NON LAVORATIVA)\". In questi giorni, lo \"Stile di vita lavorativo\" del profilo NON si applica e il livello di attività di base è da considerarsi sedentario. L'analisi deve tenere conto di questa variabilità per valutare la coerenza complessiva dell'attività fisica rispetto agli obiettivi dell'utente.\n\n\
         Nel tuo report, includi i seguenti punti in ordine:\n\
         1. Un riassunto generale delle abitudini alimentari e di attività fisica (considerando la differenza tra giorni lavorativi e non) in relazione agli obiettivi (campo 'summary').\n\
         2. Punti di forza (es. buon apporto proteico, costanza nell'attività fisica nei giorni di riposo) (campo 'strengths').\n\
         3. Aree di miglioramento (es. eccesso di calorie nei weekend che rema contro la perdita di peso) (campo 'improvements').\n\
         4. Suggerimenti pratici e personalizzati per il prossimo periodo (campo 'suggestions').\n\
         5. Una nota incoraggiante finale che motivi l'utente a continuare (campo 'encouragement').{micronutrient_point}\n\n\
         Diario del periodo:\n\
         {diary}",
        period = granularity.label(),
        profile = profile_block(profile),
        diary = aggregate_entries(entries),
    )
}

/// Response schema for the period report. The `micronutrientsAnalysis`
/// field exists only in the monthly/annual variant.
#[must_use]
pub fn period_schema(granularity: Granularity) -> Value {
    let mut properties = json!({
        "summary": { "type": "STRING", "description": "Riassunto generale delle abitudini alimentari e di attività fisica in relazione agli obiettivi." },
        "strengths": { "type": "STRING", "description": "Punti di forza del periodo." },
        "improvements": { "type": "STRING", "description": "Aree di miglioramento del periodo." },
        "suggestions": { "type": "STRING", "description": "Suggerimenti pratici e personalizzati per il prossimo periodo." },
        "encouragement": { "type": "STRING", "description": "Nota incoraggiante finale che motivi l'utente a continuare." }
    });
    if requests_micronutrient_balance(granularity) {
        properties["micronutrientsAnalysis"] = json!({
            "type": "STRING",
            "description": "Bilancio dei micronutrienti chiave del periodo, con osservazioni e consigli pratici."
        });
    }
    json!({
        "type": "OBJECT",
        "properties": properties,
        "required": ["summary", "strengths", "improvements", "suggestions", "encouragement"]
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_profile() -> UserProfile {
        UserProfile {
            age: Some(34),
            gender: Some(Gender::Female),
            height: Some(168.0),
            weight: Some(62.5),
            lifestyle: Some(Lifestyle::ModeratelyActive),
            goal: Some(Goal::LoseWeight),
            conditions: Some("Intollerante al lattosio".to_string()),
        }
    }

    #[test]
    fn test_profile_block_empty_profile() {
        assert_eq!(
            profile_block(&UserProfile::default()),
            "Nessun profilo utente fornito."
        );
    }

    #[test]
    fn test_profile_block_full_profile() {
        let block = profile_block(&full_profile());
        assert!(block.contains("- Età: 34"));
        assert!(block.contains("- Sesso: Femmina"));
        assert!(block.contains("- Altezza: 168 cm"));
        assert!(block.contains("- Peso: 62.5 kg"));
        assert!(block.contains("Moderatamente attivo (commesso, cameriere)"));
        assert!(block.contains("Perdere peso (deficit calorico)"));
        assert!(block.contains("- Condizioni mediche/diete: Intollerante al lattosio"));
    }

    #[test]
    fn test_profile_block_partial_profile_uses_placeholders() {
        let profile = UserProfile {
            age: Some(50),
            ..UserProfile::default()
        };
        let block = profile_block(&profile);
        assert!(block.contains("- Età: 50"));
        assert!(block.contains("- Sesso: Non specificato"));
        assert!(block.contains("- Altezza: Non specificata cm"));
        assert!(block.contains("- Obiettivo: Non specificato"));
        assert!(block.contains("- Condizioni mediche/diete: Nessuna"));
    }

    #[test]
    fn test_daily_prompt_day_type_instruction() {
        let mut entry = DailyEntry::blank("2024-03-10");
        entry.meals = "Pranzo: pasta".to_string();

        let working = daily_prompt(&entry, &UserProfile::default());
        assert!(working.contains("IMPORTANTE: Nel calcolare il fabbisogno calorico"));
        assert!(!working.contains("GIORNATA NON LAVORATIVA"));

        entry.is_non_working_day = true;
        let day_off = daily_prompt(&entry, &UserProfile::default());
        assert!(day_off.contains("ATTENZIONE: Questa è una GIORNATA NON LAVORATIVA"));
        assert!(!day_off.contains("IMPORTANTE: Nel calcolare"));
    }

    #[test]
    fn test_daily_prompt_includes_day_data() {
        let mut entry = DailyEntry::blank("2024-03-10");
        entry.meals = "Colazione: yogurt greco".to_string();
        let prompt = daily_prompt(&entry, &full_profile());
        assert!(prompt.contains("Pasti: Colazione: yogurt greco"));
        assert!(prompt.contains("Attività fisica: Nessuna attività fisica registrata."));
        assert!(prompt.contains("Profilo Utente:\n- Età: 34"));
    }

    #[test]
    fn test_daily_schema_required_fields() {
        let schema = daily_schema();
        assert_eq!(
            schema["required"],
            json!(["calories", "protein", "carbs", "fats", "summary"])
        );
        assert_eq!(schema["properties"]["micronutrients"]["type"], json!("ARRAY"));
    }

    #[test]
    fn test_aggregate_entries_markers_and_fallbacks() {
        let mut rest_day = DailyEntry::blank("2024-03-09");
        rest_day.is_non_working_day = true;

        let mut logged = DailyEntry::blank("2024-03-10");
        logged.meals = "Pranzo: riso".to_string();
        logged.activity = "Camminata".to_string();
        logged.analysis = Some(crate::models::NutrientAnalysis {
            calories: 1800.0,
            protein: 80.0,
            carbs: 200.0,
            fats: 60.0,
            summary: "ok".to_string(),
            micronutrients: Some(vec!["Ferro".to_string(), "Calcio".to_string()]),
        });

        let block = aggregate_entries(&[rest_day, logged]);
        assert!(block.contains("Data: 2024-03-09 (GIORNATA NON LAVORATIVA)"));
        assert!(block.contains("Pasti: Nessuno"));
        assert!(block.contains("Attività fisica: Nessuna"));
        assert!(block.contains("Micronutrienti Rilevati: Nessuna analisi AI per questo giorno."));
        assert!(block.contains("Data: 2024-03-10\n"));
        assert!(block.contains("Micronutrienti Rilevati: Ferro, Calcio"));
    }

    #[test]
    fn test_period_prompt_micronutrient_point_varies() {
        let mut entry = DailyEntry::blank("2024-03-10");
        entry.meals = "Pranzo: riso".to_string();
        let entries = vec![entry];
        let profile = UserProfile::default();

        let weekly = period_prompt(&entries, Granularity::Week, &profile);
        assert!(weekly.contains("analisi settimanale"));
        assert!(!weekly.contains("micronutrientsAnalysis"));

        let monthly = period_prompt(&entries, Granularity::Month, &profile);
        assert!(monthly.contains("analisi mensile"));
        assert!(monthly.contains("6. Bilancio dei micronutrienti chiave"));

        let annual = period_prompt(&entries, Granularity::Year, &profile);
        assert!(annual.contains("analisi annuale"));
        assert!(annual.contains("Diario del periodo:\nData: 2024-03-10"));
    }

    #[test]
    fn test_period_schema_varies_by_granularity() {
        let weekly = period_schema(Granularity::Week);
        assert!(weekly["properties"].get("micronutrientsAnalysis").is_none());

        for granularity in [Granularity::Month, Granularity::Year] {
            let schema = period_schema(granularity);
            assert_eq!(
                schema["properties"]["micronutrientsAnalysis"]["type"],
                json!("STRING")
            );
            // Still optional: never part of the required list.
            assert_eq!(
                schema["required"],
                json!(["summary", "strengths", "improvements", "suggestions", "encouragement"])
            );
        }
    }
}
