//! HTTP surface: the form page, its submission handler and a JSON twin.

use crate::error::{CuratorError, Result};
use crate::messages::DescribeResponse;
use crate::page::{PageView, render_page};
use crate::session::{ContentGenerator, Session, SessionInput, SessionOutcome};
use crate::upload::{MAX_UPLOAD_BYTES, UploadedImage};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartError},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::{get, post},
};
use std::sync::Arc;

// room for the prompt field and multipart framing on top of the image
const FORM_OVERHEAD_BYTES: usize = 1024 * 1024;

/// Raw fields of a submitted form, before image validation.
#[derive(Debug, Default)]
pub struct SubmittedForm {
    pub prompt: Option<String>,
    pub upload: Option<(String, Vec<u8>)>,
}

/// Builds the application router around a shared session.
pub fn router<G: ContentGenerator + 'static>(session: Arc<Session<G>>) -> Router {
    router_with_body_limit(session, MAX_UPLOAD_BYTES + FORM_OVERHEAD_BYTES)
}

/// Same as [`router`] with an explicit request body ceiling in bytes.
pub fn router_with_body_limit<G: ContentGenerator + 'static>(
    session: Arc<Session<G>>,
    body_limit: usize,
) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/describe", post(post_describe::<G>))
        .route("/api/describe", post(post_api_describe::<G>))
        .route("/healthz", get(get_health))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(session)
}

async fn get_index() -> Html<String> {
    Html(render_page(&PageView::default()))
}

async fn get_health() -> StatusCode {
    StatusCode::OK
}

async fn post_describe<G: ContentGenerator + 'static>(
    State(session): State<Arc<Session<G>>>,
    multipart: Multipart,
) -> Html<String> {
    let (prompt, image, outcome) = submit(&session, multipart).await;
    Html(render_page(&PageView {
        prompt: prompt.as_deref(),
        image: image.as_ref(),
        outcome: Some(&outcome),
    }))
}

async fn post_api_describe<G: ContentGenerator + 'static>(
    State(session): State<Arc<Session<G>>>,
    multipart: Multipart,
) -> impl IntoResponse {
    let (_, _, outcome) = submit(&session, multipart).await;
    let status = match outcome {
        SessionOutcome::Described(_) | SessionOutcome::NoContent => StatusCode::OK,
        SessionOutcome::MissingInput | SessionOutcome::Rejected(_) => StatusCode::BAD_REQUEST,
        SessionOutcome::Failed(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(DescribeResponse::from(&outcome)))
}

/// Reads the form, validates the upload and runs the session once.
///
/// Returns the echoed prompt and image alongside the outcome so the page can
/// be re-rendered with the user's input intact.
pub async fn submit<G: ContentGenerator>(
    session: &Session<G>,
    multipart: Multipart,
) -> (Option<String>, Option<UploadedImage>, SessionOutcome) {
    let mut form = SubmittedForm::default();
    if let Err(e) = read_form(multipart, &mut form).await {
        log::warn!("Rejected form: {e}");
        return (form.prompt, None, SessionOutcome::rejected(e));
    }

    let image = match form.upload {
        Some((file_name, data)) => match UploadedImage::from_upload(file_name, data) {
            Ok(image) => Some(image),
            Err(e) => {
                log::warn!("Rejected upload: {e}");
                let outcome =
                    SessionOutcome::Rejected(format!("Could not read the uploaded image: {e}"));
                return (form.prompt, None, outcome);
            }
        },
        None => None,
    };

    let input = SessionInput::new(form.prompt, image);
    let outcome = session.describe(&input).await;
    (input.prompt, input.image, outcome)
}

/// Collects the `prompt` and `image` fields into `form`. An empty file field
/// means no image was chosen. Fields read before an error stay in `form`.
pub async fn read_form(mut multipart: Multipart, form: &mut SubmittedForm) -> Result<()> {
    while let Some(field) = multipart.next_field().await.map_err(form_error)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("prompt") => {
                let text = field.text().await.map_err(form_error)?;
                form.prompt = Some(text).filter(|t| !t.is_empty());
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(form_error)?;
                if !file_name.is_empty() || !data.is_empty() {
                    form.upload = Some((file_name, data.to_vec()));
                }
            }
            other => log::debug!("Ignoring form field {other:?}"),
        }
    }

    Ok(())
}

fn form_error(e: MultipartError) -> CuratorError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        CuratorError::FormTooLarge
    } else {
        CuratorError::InvalidForm(e.body_text())
    }
}
