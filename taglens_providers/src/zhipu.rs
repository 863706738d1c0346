use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;
use taglens_core::{ChatMessage, LLMProvider, LLMResponse, Usage};
use tracing::info;

use crate::retry::retry_with_backoff;

#[derive(Clone)]
pub struct ZhipuProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ZhipuProvider {
    #[must_use]
    pub fn new(api_key: String) -> Self {
        info!("Creating ZhipuProvider");
        Self {
            client: Client::new(),
            api_key,
            base_url: "https://open.bigmodel.cn/api/paas/v4".to_string(),
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Helper method to send a single request
    async fn try_send(&self, request: &serde_json::Value) -> anyhow::Result<LLMResponse> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?
            .error_for_status()?
            .json::<serde_json::Value>()
            .await?;

        parse_completion(&response)
    }
}

fn parse_completion(response: &serde_json::Value) -> anyhow::Result<LLMResponse> {
    let content = response["choices"][0]["message"]["content"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Invalid response format: missing content"))?
        .to_string();

    let count = |value: &serde_json::Value| {
        value
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .unwrap_or(0)
    };
    let usage = &response["usage"];
    let usage = usage.is_object().then(|| Usage {
        prompt_tokens: count(&usage["prompt_tokens"]),
        completion_tokens: count(&usage["completion_tokens"]),
        total_tokens: count(&usage["total_tokens"]),
    });

    Ok(LLMResponse { content, usage })
}

#[async_trait]
impl LLMProvider for ZhipuProvider {
    async fn chat(&self, messages: &[ChatMessage], model: &str) -> anyhow::Result<LLMResponse> {
        let request = json!({
            "model": model,
            "messages": messages,
        });

        info!("Sending request to Zhipu API: model={}", model);

        // 2s, 4s, 6s, 8s, then 10s x 3
        let base_delays = [2, 4, 6, 8].map(Duration::from_secs);
        let response = retry_with_backoff(
            || self.try_send(&request),
            &base_delays,
            3,
            Duration::from_secs(10),
        )
        .await?;

        info!("Received response from Zhipu API");
        Ok(response)
    }

    fn get_default_model(&self) -> &'static str {
        "glm-4-flash"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_content_and_usage() {
        let body = json!({
            "choices": [{"message": {"role": "assistant", "content": "<think>hi</think>你好"}}],
            "usage": {"prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17}
        });

        let response = parse_completion(&body).unwrap();
        assert_eq!(response.content, "<think>hi</think>你好");
        assert_eq!(response.usage.map(|u| u.total_tokens), Some(17));
    }

    #[test]
    fn test_missing_content_is_an_error() {
        let body = json!({"choices": []});
        assert!(parse_completion(&body).is_err());
    }

    #[test]
    fn test_usage_is_optional() {
        let body = json!({"choices": [{"message": {"content": "ok"}}]});
        assert!(parse_completion(&body).unwrap().usage.is_none());
    }
}
