use anyhow::{Context, Result, bail};
use serde_json::Value;

use mangia_core::gateway::AnalysisProvider;
use mangia_core::gemini::{
    DEFAULT_MODEL, GenerateContentResponse, structured_request, text_request,
};

const BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    model: String,
    rt: tokio::runtime::Handle,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        let client = reqwest::Client::builder()
            .user_agent(format!("mangia-cli/{} (food diary)", env!("CARGO_PKG_VERSION")))
            .timeout(std::time::Duration::from_secs(60))
            .connect_timeout(std::time::Duration::from_secs(5))
            .build()
            .expect("Failed to build HTTP client");
        Self {
            client,
            api_key,
            model: DEFAULT_MODEL.to_string(),
            rt: tokio::runtime::Handle::current(),
        }
    }

    pub async fn generate_async(&self, prompt: &str, schema: Option<&Value>) -> Result<String> {
        let url = format!("{BASE_URL}/{}:generateContent", self.model);
        let body = match schema {
            Some(schema) => structured_request(prompt, schema.clone()),
            None => text_request(prompt),
        };

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .context("Failed to reach the Gemini API")?;

        let status = resp.status();
        if !status.is_success() {
            let detail = resp.text().await.unwrap_or_default();
            bail!("Gemini API returned {status}: {}", snippet(&detail));
        }

        let data: GenerateContentResponse = resp
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        data.text().context("Gemini response contained no text")
    }
}

impl AnalysisProvider for GeminiClient {
    fn generate(&self, prompt: &str, schema: Option<&Value>) -> Result<String> {
        // The caller sits on a worker thread of the multi-thread runtime.
        tokio::task::block_in_place(|| self.rt.block_on(self.generate_async(prompt, schema)))
    }
}

/// First part of an error body, enough to diagnose without flooding stderr.
fn snippet(body: &str) -> &str {
    let trimmed = body.trim();
    match trimmed.char_indices().nth(300) {
        Some((idx, _)) => &trimmed[..idx],
        None => trimmed,
    }
}
