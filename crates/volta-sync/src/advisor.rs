//! # Advisor
//!
//! Product and installation questions answered by a generative-AI endpoint.
//!
//! ```text
//! ask(prompt, lang)
//!   ├── no API key ────────────────► AdvisorUnavailable text
//!   ├── POST {endpoint}/models/{model}:generateContent
//!   │     (key in the x-goog-api-key header, never in the URL or logs)
//!   │     ├── 2xx + candidate text ─► answer
//!   │     └── anything else ───────► AdvisorApology text
//!   └── never returns an error
//! ```

use std::time::Duration;

use serde_json::{json, Value};
use tracing::{debug, warn};
use url::Url;
use volta_core::{Label, Language};

use crate::config::AdvisorSettings;

const MAX_PROMPT_CHARS: usize = 2000;
const API_KEY_HEADER: &str = "x-goog-api-key";

pub struct Advisor {
    settings: AdvisorSettings,
    client: Option<reqwest::Client>,
}

impl Advisor {
    pub fn new(settings: AdvisorSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .inspect_err(|err| warn!(%err, "Failed to create advisor HTTP client"))
            .ok();
        Advisor { settings, client }
    }

    pub fn is_configured(&self) -> bool {
        self.settings.api_key.as_deref().is_some_and(|key| !key.is_empty())
    }

    /// Answers `prompt` in `lang`, or a localized fallback.
    pub async fn ask(&self, prompt: &str, lang: Language) -> String {
        let Some(key) = self.settings.api_key.as_deref().filter(|key| !key.is_empty()) else {
            debug!("Advisor has no API key");
            return Label::AdvisorUnavailable.text(lang).to_string();
        };
        let prompt: String = prompt.trim().chars().take(MAX_PROMPT_CHARS).collect();
        if prompt.is_empty() {
            return Label::AdvisorApology.text(lang).to_string();
        }

        match self.generate(key, &prompt, lang).await {
            Some(answer) => answer,
            None => Label::AdvisorApology.text(lang).to_string(),
        }
    }

    fn build_request(
        &self,
        client: &reqwest::Client,
        key: &str,
        prompt: &str,
        lang: Language,
    ) -> Option<reqwest::Request> {
        let url = Url::parse(&format!(
            "{}/models/{}:generateContent",
            self.settings.endpoint.trim_end_matches('/'),
            self.settings.model
        ))
        .inspect_err(|err| warn!(%err, "Invalid advisor endpoint"))
        .ok()?;

        let body = json!({
            "systemInstruction": { "parts": [{ "text": instruction(lang) }] },
            "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        });

        client
            .post(url)
            .header(API_KEY_HEADER, key)
            .json(&body)
            .build()
            .map_err(reqwest::Error::without_url)
            .inspect_err(|err| warn!(%err, "Failed to build advisor request"))
            .ok()
    }

    async fn generate(&self, key: &str, prompt: &str, lang: Language) -> Option<String> {
        let client = self.client.as_ref()?;
        let request = self.build_request(client, key, prompt, lang)?;

        let response = client
            .execute(request)
            .await
            .map_err(reqwest::Error::without_url)
            .inspect_err(|err| warn!(%err, "Advisor request failed"))
            .ok()?;
        if !response.status().is_success() {
            warn!(status = %response.status(), "Advisor returned an error status");
            return None;
        }
        let payload: Value = response
            .json()
            .await
            .map_err(reqwest::Error::without_url)
            .inspect_err(|err| warn!(%err, "Advisor response was not JSON"))
            .ok()?;
        let answer = candidate_text(&payload);
        if answer.is_none() {
            warn!("Advisor response had no text candidate");
        }
        answer
    }
}

fn instruction(lang: Language) -> &'static str {
    match lang {
        Language::En => {
            "You are a helpful sales assistant of an electrical and solar equipment shop \
             in Bangladesh. Answer briefly in English. Prices are in Taka."
        }
        Language::Bn => {
            "আপনি বাংলাদেশের একটি ইলেকট্রিক ও সোলার সরঞ্জামের দোকানের সহায়ক বিক্রয় সহকারী। \
             সংক্ষেপে বাংলায় উত্তর দিন। দাম টাকায়।"
        }
    }
}

/// Concatenated text parts of the first candidate.
fn candidate_text(payload: &Value) -> Option<String> {
    let parts = payload
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_gives_fallback() {
        let advisor = Advisor::new(AdvisorSettings::default());
        assert!(!advisor.is_configured());
        assert_eq!(
            advisor.ask("Which inverter for 4 fans?", Language::Bn).await,
            Label::AdvisorUnavailable.text(Language::Bn)
        );
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_gives_apology() {
        let advisor = Advisor::new(AdvisorSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: Some("test-key".to_string()),
            timeout_secs: 2,
            ..AdvisorSettings::default()
        });
        assert_eq!(
            advisor.ask("hello", Language::En).await,
            Label::AdvisorApology.text(Language::En)
        );
    }

    #[test]
    fn test_api_key_stays_out_of_the_url() {
        let advisor = Advisor::new(AdvisorSettings {
            endpoint: "http://127.0.0.1:9/".to_string(),
            model: "m".to_string(),
            api_key: Some("SECRET-KEY-123".to_string()),
            ..AdvisorSettings::default()
        });
        let client = advisor.client.as_ref().unwrap();
        let request = advisor
            .build_request(client, "SECRET-KEY-123", "hello", Language::En)
            .unwrap();

        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:9/models/m:generateContent"
        );
        assert_eq!(request.headers()[API_KEY_HEADER], "SECRET-KEY-123");
    }

    #[tokio::test]
    async fn test_transport_error_text_omits_the_key() {
        let advisor = Advisor::new(AdvisorSettings {
            endpoint: "http://127.0.0.1:9".to_string(),
            api_key: Some("SECRET-KEY-123".to_string()),
            timeout_secs: 2,
            ..AdvisorSettings::default()
        });
        let client = advisor.client.as_ref().unwrap();
        let request = advisor
            .build_request(client, "SECRET-KEY-123", "hello", Language::En)
            .unwrap();

        let err = client.execute(request).await.unwrap_err().without_url();
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }

    #[test]
    fn test_candidate_text() {
        let payload = json!({
            "candidates": [{ "content": { "parts": [{ "text": "Use a " }, { "text": "1000VA IPS." }] } }]
        });
        assert_eq!(candidate_text(&payload).as_deref(), Some("Use a 1000VA IPS."));
        assert!(candidate_text(&json!({ "candidates": [] })).is_none());
    }
}
