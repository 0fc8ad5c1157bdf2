//! Request and response types for the Gemini `generateContent` endpoint,
//! plus parsing of the structured JSON the model returns.

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{NutrientAnalysis, PeriodAnalysis};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub response_mime_type: String,
    pub response_schema: Value,
}

#[derive(Debug, Deserialize)]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<Part>,
}

/// Request body for a free-text generation.
#[must_use]
pub fn text_request(prompt: &str) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![Content {
            parts: vec![Part {
                text: prompt.to_string(),
            }],
        }],
        generation_config: None,
    }
}

/// Request body for a generation constrained to a JSON response schema.
#[must_use]
pub fn structured_request(prompt: &str, schema: Value) -> GenerateContentRequest {
    GenerateContentRequest {
        generation_config: Some(GenerationConfig {
            response_mime_type: "application/json".to_string(),
            response_schema: schema,
        }),
        ..text_request(prompt)
    }
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate, if the response has any.
    #[must_use]
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        if parts.is_empty() {
            return None;
        }
        Some(
            parts
                .iter()
                .map(|p| p.text.as_str())
                .collect::<Vec<_>>()
                .join(""),
        )
    }
}

/// Some models wrap JSON answers in a Markdown code fence even when asked
/// for `application/json`. Strip it before parsing.
#[must_use]
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Parse the model's daily analysis. The typed deserialization doubles as
/// the shape check: missing required fields fail here.
pub fn parse_nutrient_analysis(text: &str) -> Result<NutrientAnalysis> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        bail!("Model returned an empty response");
    }
    serde_json::from_str(body).context("Model response is not a valid daily analysis")
}

/// Parse the model's period report.
pub fn parse_period_analysis(text: &str) -> Result<PeriodAnalysis> {
    let body = strip_code_fences(text);
    if body.is_empty() {
        bail!("Model returned an empty response");
    }
    serde_json::from_str(body).context("Model response is not a valid period report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_request_serializes_camel_case() {
        let request = structured_request("ciao", json!({"type": "OBJECT"}));
        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["contents"][0]["parts"][0]["text"], json!("ciao"));
        assert_eq!(
            body["generationConfig"]["responseMimeType"],
            json!("application/json")
        );
        assert_eq!(
            body["generationConfig"]["responseSchema"]["type"],
            json!("OBJECT")
        );
    }

    #[test]
    fn test_text_request_omits_generation_config() {
        let body = serde_json::to_value(text_request("ciao")).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [
                { "content": { "parts": [{ "text": "primo " }, { "text": "secondo" }] } },
                { "content": { "parts": [{ "text": "ignorato" }] } }
            ]
        }))
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("primo secondo"));
    }

    #[test]
    fn test_response_text_handles_empty_candidates() {
        let empty: GenerateContentResponse = serde_json::from_value(json!({})).unwrap();
        assert!(empty.text().is_none());

        let no_parts: GenerateContentResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": { "parts": [] } }] }))
                .unwrap();
        assert!(no_parts.text().is_none());
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_nutrient_analysis() {
        let analysis = parse_nutrient_analysis(
            r#"```json
            {
                "calories": 1850,
                "protein": 92.5,
                "carbs": 210,
                "fats": 61,
                "summary": "Ottima giornata!",
                "micronutrients": ["Ferro", "Vitamina C"]
            }
            ```"#,
        )
        .unwrap();
        assert_eq!(analysis.calories, 1850.0);
        assert_eq!(analysis.protein, 92.5);
        assert_eq!(analysis.summary, "Ottima giornata!");
        assert_eq!(
            analysis.micronutrients.as_deref(),
            Some(["Ferro".to_string(), "Vitamina C".to_string()].as_slice())
        );
    }

    #[test]
    fn test_parse_nutrient_analysis_missing_field_fails() {
        let result = parse_nutrient_analysis(r#"{"calories": 1850, "summary": "ok"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_nutrient_analysis_empty_fails() {
        assert!(parse_nutrient_analysis("").is_err());
        assert!(parse_nutrient_analysis("```json\n```").is_err());
    }

    #[test]
    fn test_parse_period_analysis() {
        let report = parse_period_analysis(
            r#"{
                "summary": "Settimana equilibrata",
                "strengths": "Buon apporto proteico",
                "improvements": "Più verdure",
                "suggestions": "Prova i legumi",
                "encouragement": "Continua così!",
                "micronutrientsAnalysis": "Ferro adeguato"
            }"#,
        )
        .unwrap();
        assert_eq!(report.summary, "Settimana equilibrata");
        assert_eq!(
            report.micronutrients_analysis.as_deref(),
            Some("Ferro adeguato")
        );
    }

    #[test]
    fn test_parse_period_analysis_without_micronutrients_field() {
        let report = parse_period_analysis(
            r#"{
                "summary": "s", "strengths": "f", "improvements": "m",
                "suggestions": "c", "encouragement": "e"
            }"#,
        )
        .unwrap();
        assert!(report.micronutrients_analysis.is_none());
    }
}
