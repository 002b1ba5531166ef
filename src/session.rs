use crate::prompt::{build_prompt, missing_sections};
use crate::upload::UploadedImage;
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Warning shown when the form is submitted with neither an image nor text.
pub const MISSING_INPUT_MESSAGE: &str =
    "Please provide an image or enter a prompt to generate the description.";

/// Informational message shown when the model returns no usable text.
pub const NO_CONTENT_MESSAGE: &str =
    "No content generated. Try a clearer image or add more context in the prompt.";

/// One ordered element of a generation request.
#[derive(Debug, Clone, PartialEq)]
pub enum ContentPart {
    /// Raw image bytes with their MIME type.
    Image { mime_type: String, data: Vec<u8> },
    /// Plain text.
    Text(String),
}

/// Trait for providers that turn ordered content parts into text.
///
/// Implementors issue exactly one call per invocation: no retry and no
/// streaming. The session decides what to do with the result.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    /// The error type that can be returned by the provider.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Generates text from the given parts.
    async fn generate(&self, parts: &[ContentPart]) -> Result<String, Self::Error>;

    /// Identifier of the underlying model, reported alongside descriptions.
    fn model_name(&self) -> &str;
}

/// What the user submitted.
#[derive(Debug, Clone, Default)]
pub struct SessionInput {
    pub prompt: Option<String>,
    pub image: Option<UploadedImage>,
}

impl SessionInput {
    pub fn new(prompt: Option<String>, image: Option<UploadedImage>) -> Self {
        Self {
            prompt: prompt.filter(|p| !p.is_empty()),
            image,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.prompt.is_none() && self.image.is_none()
    }

    /// Image first (if any), then the composed prompt.
    pub fn content_parts(&self) -> Vec<ContentPart> {
        let mut parts = Vec::with_capacity(2);
        if let Some(image) = &self.image {
            parts.push(ContentPart::Image {
                mime_type: image.mime_type().to_string(),
                data: image.data().to_vec(),
            });
        }
        parts.push(ContentPart::Text(build_prompt(self.prompt.as_deref())));
        parts
    }
}

/// A successful, non-empty description.
#[derive(Debug, Clone, PartialEq)]
pub struct Description {
    /// Response text, trimmed, otherwise untouched.
    pub text: String,
    /// Model that produced it.
    pub model: String,
    /// Wall time of the generation call.
    pub duration: Duration,
}

/// Result of one button press.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionOutcome {
    /// Nothing was submitted; no call was made.
    MissingInput,
    /// The provider returned text.
    Described(Description),
    /// The provider succeeded but returned no text.
    NoContent,
    /// The provider failed; carries a user-facing message.
    Failed(String),
    /// The submission itself was unusable (bad upload, unreadable form); no
    /// call was made.
    Rejected(String),
}

impl SessionOutcome {
    /// Short status tag used by the JSON API.
    pub fn status(&self) -> &'static str {
        match self {
            SessionOutcome::MissingInput => "warning",
            SessionOutcome::Described(_) => "success",
            SessionOutcome::NoContent => "no_content",
            SessionOutcome::Failed(_) => "error",
            SessionOutcome::Rejected(_) => "rejected",
        }
    }

    /// Message for every outcome that is not a description.
    pub fn message(&self) -> Option<&str> {
        match self {
            SessionOutcome::MissingInput => Some(MISSING_INPUT_MESSAGE),
            SessionOutcome::Described(_) => None,
            SessionOutcome::NoContent => Some(NO_CONTENT_MESSAGE),
            SessionOutcome::Failed(message) | SessionOutcome::Rejected(message) => {
                Some(message.as_str())
            }
        }
    }

    /// Wraps any error as the user-visible failure message.
    pub fn failed(error: impl std::fmt::Display) -> Self {
        SessionOutcome::Failed(format!("Generation failed: {error}"))
    }

    /// Reports an unusable submission without blaming the generator.
    pub fn rejected(error: impl std::fmt::Display) -> Self {
        SessionOutcome::Rejected(error.to_string())
    }
}

/// Turns form submissions into single generation calls.
///
/// The generator is supplied at construction; the session keeps no state
/// between submissions, so one instance can be shared by every request.
pub struct Session<G: ContentGenerator> {
    generator: G,
}

impl<G: ContentGenerator> Session<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Runs one submission. Never returns an error: every failure is folded
    /// into [`SessionOutcome::Failed`].
    pub async fn describe(&self, input: &SessionInput) -> SessionOutcome {
        if input.is_empty() {
            log::debug!("Rejected submission without image or prompt");
            return SessionOutcome::MissingInput;
        }

        let parts = input.content_parts();
        log::info!(
            "Generating description with {} (image: {}, prompt: {})",
            self.generator.model_name(),
            input.image.is_some(),
            input.prompt.is_some()
        );

        let start_time = Instant::now();
        let result = self.generator.generate(&parts).await;
        let duration = start_time.elapsed();

        match result {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    log::warn!("Generation returned no text after {duration:?}");
                    return SessionOutcome::NoContent;
                }

                let missing = missing_sections(text);
                if !missing.is_empty() {
                    log::warn!("Description is missing sections: {}", missing.join(", "));
                }
                log::info!("Generation completed in {duration:?}");

                SessionOutcome::Described(Description {
                    text: text.to_string(),
                    model: self.generator.model_name().to_string(),
                    duration,
                })
            }
            Err(e) => {
                log::error!("Generation failed after {duration:?}: {e}");
                SessionOutcome::failed(e)
            }
        }
    }
}
