use crate::prelude::*;
use deedscan_core::ExtractionRequest;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers::openai;

/// Free-text completion service. One blocking call per request, no retries.
pub trait CompletionModel {
    async fn complete(&self, request: &ExtractionRequest) -> Result<String>;
}

/// OpenAI-compatible chat model through rig.
pub struct OpenAi {
    client: openai::Client,
}

impl OpenAi {
    /// Build a client. An empty key still builds; the service rejects the
    /// request later.
    pub fn new(api_key: &str, base_url: Option<&str>) -> Result<Self> {
        if api_key.is_empty() {
            warn!("OPENAI_API_KEY is not set; requests will be unauthenticated");
        }

        let mut builder = openai::Client::builder().api_key(api_key);
        if let Some(url) = base_url {
            builder = builder.base_url(url);
        }

        let client = builder
            .build()
            .map_err(|e| eyre!("Failed to create OpenAI client: {}", e))?;

        Ok(OpenAi { client })
    }
}

impl CompletionModel for OpenAi {
    async fn complete(&self, request: &ExtractionRequest) -> Result<String> {
        let agent = self
            .client
            .agent(&request.model)
            .preamble(&request.preamble)
            .temperature(request.temperature)
            .build();

        let response = agent
            .prompt(&request.prompt)
            .await
            .map_err(|e| Error::Completion(e.to_string()))?;

        debug!("Model returned {} chars", response.len());
        Ok(response)
    }
}
