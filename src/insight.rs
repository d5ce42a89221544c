//! Optional language-model endpoint that writes a short blurb about a title.
//!
//! Every failure is turned into a readable message for the details page; the
//! only error this client ever returns is [`ApiError::Cancelled`].
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::ApiError;
use crate::tmdb::build_http_client;

#[derive(Debug, Clone)]
pub struct InsightClient {
    client: Client,
    endpoint: Option<String>,
}

#[derive(Debug, Deserialize)]
struct InsightResponse {
    answer: String,
}

impl InsightClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        Ok(Self {
            client: build_http_client(config.request_timeout)?,
            endpoint: config.llm_endpoint.clone(),
        })
    }

    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some()
    }

    pub async fn ask(&self, title: &str, cancel: &CancellationToken) -> Result<String, ApiError> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            return Ok(unconfigured_message(title));
        };

        let body = json!({ "query": prompt(title) });
        debug!(title = %title, "Requesting AI insight");
        let request = async {
            let res = match self.client.post(endpoint).json(&body).send().await {
                Ok(res) => res,
                Err(e) => {
                    warn!("AI insight request failed: {}", e);
                    return "AI insight service is unreachable. Try again later.".to_string();
                }
            };
            let status = res.status();
            if !status.is_success() {
                warn!(status = status.as_u16(), "AI insight endpoint returned an error");
                return format!("AI insight request failed ({}). Try again later.", status.as_u16());
            }
            match res.json::<InsightResponse>().await {
                Ok(data) => data.answer,
                Err(e) => {
                    warn!("AI insight response was malformed: {}", e);
                    "AI insight response could not be read. Try again later.".to_string()
                }
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            answer = request => Ok(answer),
        }
    }
}

fn prompt(title: &str) -> String {
    format!("What should I know about the title \"{title}\"? Keep it concise for a quick read.")
}

fn unconfigured_message(title: &str) -> String {
    format!(
        "No AI endpoint configured. Set LLM_ENDPOINT to enable this feature.\n\nRequested title: {title}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_quotes_title() {
        assert_eq!(
            prompt("Dune"),
            "What should I know about the title \"Dune\"? Keep it concise for a quick read."
        );
    }

    #[tokio::test]
    async fn unconfigured_endpoint_answers_locally() {
        let client = InsightClient::new(&Config::default()).unwrap();
        assert!(!client.is_configured());
        let answer = client
            .ask("Arrival", &CancellationToken::new())
            .await
            .unwrap();
        assert!(answer.contains("Arrival"));
    }
}
