use async_trait::async_trait;
use std::fmt;
use crate::Result;

/// A single chat-style request to a generative text model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system: String,
    pub prompt: String,
    /// Ask the provider for a JSON object response.
    pub json: bool,
    pub temperature: Option<f32>,
}

impl CompletionRequest {
    pub fn new(system: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            prompt: prompt.into(),
            json: false,
            temperature: None,
        }
    }

    pub fn json(mut self) -> Self {
        self.json = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[async_trait]
pub trait TextModel: Send + Sync + fmt::Debug {
    /// Returns the name of the model provider
    fn name(&self) -> &str;

    /// Sends one request and returns the raw text of the reply
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}
