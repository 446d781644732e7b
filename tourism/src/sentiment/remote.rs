use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{EmotionModel, LabelScore, SentimentModel};
use crate::config::SentimentModelConfig;
use crate::error::{Result, TourismError};

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
}

/// Inference endpoints answer either `[[{label, score}]]` or `[{label, score}]`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum InferenceResponse {
    Nested(Vec<Vec<LabelScore>>),
    Flat(Vec<LabelScore>),
}

impl InferenceResponse {
    fn into_scores(self) -> Vec<LabelScore> {
        match self {
            Self::Nested(mut outer) => {
                if outer.is_empty() {
                    Vec::new()
                } else {
                    outer.swap_remove(0)
                }
            }
            Self::Flat(scores) => scores,
        }
    }
}

/// Text classifier served over HTTP by a Hugging Face style inference endpoint.
#[derive(Clone)]
pub struct HostedClassifier {
    client: Client,
    url: String,
    api_key: Option<String>,
}

impl HostedClassifier {
    pub fn new(url: impl Into<String>, api_key: Option<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            TourismError::DependencyUnavailable(format!("Failed to create HTTP client: {e}"))
        })?;

        Ok(Self {
            client,
            url: url.into(),
            api_key,
        })
    }

    /// Sentiment classifier from config, if an endpoint is configured.
    pub fn sentiment_from_config(config: &SentimentModelConfig) -> Result<Option<Self>> {
        config
            .model_url
            .as_ref()
            .map(|url| Self::new(url, config.api_key.clone(), Duration::from_secs(config.timeout_secs)))
            .transpose()
    }

    /// Emotion classifier from config, if an endpoint is configured.
    pub fn emotion_from_config(config: &SentimentModelConfig) -> Result<Option<Self>> {
        config
            .emotion_model_url
            .as_ref()
            .map(|url| Self::new(url, config.api_key.clone(), Duration::from_secs(config.timeout_secs)))
            .transpose()
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn infer(&self, text: &str) -> Result<Vec<LabelScore>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = self.api_key {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {api_key}")).map_err(|e| {
                    TourismError::DependencyUnavailable(format!("Invalid API key header: {e}"))
                })?,
            );
        }

        let response = self
            .client
            .post(&self.url)
            .headers(headers)
            .json(&InferenceRequest { inputs: text })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TourismError::DependencyUnavailable(format!(
                "Classifier error {status}: {body}"
            )));
        }

        let body: InferenceResponse = response.json().await.map_err(|e| {
            TourismError::DependencyUnavailable(format!("Failed to parse classifier response: {e}"))
        })?;

        Ok(body.into_scores())
    }
}

#[async_trait]
impl SentimentModel for HostedClassifier {
    async fn classify(&self, text: &str) -> Result<Vec<LabelScore>> {
        self.infer(text).await
    }
}

#[async_trait]
impl EmotionModel for HostedClassifier {
    async fn emotions(&self, text: &str) -> Result<Vec<LabelScore>> {
        self.infer(text).await
    }
}
