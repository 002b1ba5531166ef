//! Artifact curator: describe historical artifacts with a hosted multimodal
//! model.
//!
//! A [`Session`] turns one form submission (optional prompt text, optional
//! JPEG/PNG upload) into a single call on a [`ContentGenerator`], and folds
//! every result into a [`SessionOutcome`] the page can render directly.
//! [`GeminiClient`] is the generator used in production; it also lists the
//! models available to the configured key.
//!
//! ```no_run
//! use artifact_curator::{Config, GeminiClient, Session, SessionInput};
//!
//! #[tokio::main]
//! async fn main() -> artifact_curator::Result<()> {
//!     let session = Session::new(GeminiClient::new(Config::from_env()?));
//!     let input = SessionInput::new(Some("Roman coin found in Italy".into()), None);
//!     let outcome = session.describe(&input).await;
//!     println!("{}", outcome.status());
//!     Ok(())
//! }
//! ```

mod config;
mod error;
pub mod gemini;
pub mod messages;
pub mod page;
pub mod prompt;
pub mod server;
mod session;
pub mod upload;

pub use config::{Config, DEFAULT_API_BASE, DEFAULT_MODEL};
pub use error::{CuratorError, Result};
pub use gemini::{GeminiClient, ModelInfo};
pub use prompt::build_prompt;
pub use session::{
    ContentGenerator, ContentPart, Description, MISSING_INPUT_MESSAGE, NO_CONTENT_MESSAGE,
    Session, SessionInput, SessionOutcome,
};
pub use upload::UploadedImage;
