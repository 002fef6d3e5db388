//! Suggestion service
//!
//! The single control flow of the application: resolve the place, build the
//! prompt, await the model and recover a batch from its text.

use std::sync::Arc;

use tracing::{error, info, instrument};

use crate::config::CloseEscapeConfig;
use crate::llm::{CompletionModel, GeminiClient};
use crate::location_resolver::LocationResolver;
use crate::models::{SuggestionBatch, SuggestionRequest};
use crate::prompt::PromptBuilder;
use crate::recovery::ResponseRecoverer;
use crate::{CloseEscapeError, Result};

/// Stateless per call; shared read-only between requests
pub struct SuggestionService {
    model: Option<Arc<dyn CompletionModel>>,
    resolver: Option<LocationResolver>,
    prompt_builder: PromptBuilder,
    recoverer: ResponseRecoverer,
}

impl SuggestionService {
    #[must_use]
    pub fn new(model: Option<Arc<dyn CompletionModel>>) -> Self {
        Self {
            model,
            resolver: None,
            prompt_builder: PromptBuilder::default(),
            recoverer: ResponseRecoverer::default(),
        }
    }

    /// Wire the service from configuration.
    ///
    /// A missing API key is reported here, once, and leaves the service
    /// without a model; every call then fails with a configuration error.
    pub fn from_config(config: &CloseEscapeConfig) -> anyhow::Result<Self> {
        let model: Option<Arc<dyn CompletionModel>> = if config.gemini.api_key.is_some() {
            Some(Arc::new(GeminiClient::new(&config.gemini)?))
        } else {
            error!(
                "Gemini API key is missing; set GEMINI_API_KEY or CLOSEESCAPE_GEMINI__API_KEY. Suggestion calls will fail."
            );
            None
        };

        let suggestions = &config.suggestions;
        let mut service = Self::new(model)
            .with_prompt_builder(PromptBuilder::new(
                suggestions.count,
                suggestions.currency_symbol.clone(),
            ))
            .with_recoverer(ResponseRecoverer::new(suggestions.currency_symbol.clone()));

        if config.geocoding.enabled {
            service = service.with_resolver(LocationResolver::new(&config.geocoding)?);
        }

        Ok(service)
    }

    #[must_use]
    pub fn with_resolver(mut self, resolver: LocationResolver) -> Self {
        self.resolver = Some(resolver);
        self
    }

    #[must_use]
    pub fn with_prompt_builder(mut self, prompt_builder: PromptBuilder) -> Self {
        self.prompt_builder = prompt_builder;
        self
    }

    #[must_use]
    pub fn with_recoverer(mut self, recoverer: ResponseRecoverer) -> Self {
        self.recoverer = recoverer;
        self
    }

    /// Whether a model is configured
    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    /// Produce suggestions for one request.
    ///
    /// Only configuration and upstream failures are returned as errors;
    /// unusable model output turns into fallback suggestions.
    #[instrument(skip(self), fields(budget = request.budget, distance = request.distance))]
    pub async fn suggest(&self, mut request: SuggestionRequest) -> Result<SuggestionBatch> {
        let Some(model) = &self.model else {
            error!("Suggestion requested without a configured model");
            return Err(CloseEscapeError::config("Gemini API key is missing"));
        };

        if let Some(resolver) = &self.resolver {
            request.place = resolver.resolve_place(request.place).await;
        }

        let prompt = self.prompt_builder.build(&request);
        info!(
            "Requesting {} suggestions near {} from {}",
            self.prompt_builder.count(),
            request.place.describe(),
            model.name()
        );

        let text = model.complete(&prompt).await.inspect_err(|e| {
            error!("Model call failed: {}", e);
        })?;

        Ok(self.recoverer.recover(&text, &request))
    }
}
