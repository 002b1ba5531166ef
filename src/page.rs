//! HTML rendering for the single-page form.

use crate::session::SessionOutcome;
use crate::upload::UploadedImage;
use pulldown_cmark::{Event, Parser, Tag, TagEnd, html};

pub const PAGE_TITLE: &str = "Gemini Historical Artifact Description";
pub const HEADER: &str = "🏺 Gemini Historical Artifact Description App";
pub const OUTPUT_HEADING: &str = "📜 Description of the Artifact:";

const STYLES: &str = r#"
.stApp, body {
    background: linear-gradient(180deg, #0b0f1a 0%, #111827 100%);
    color: #e5e7eb;
    font-family: system-ui, sans-serif;
    min-height: 100vh;
    margin: 0;
}
main { max-width: 730px; margin: 0 auto; padding: 48px 16px; }
.title { font-size: 34px; font-weight: 700; margin-bottom: 10px; }
.label { font-weight: 600; margin-top: 12px; margin-bottom: 6px; }
input[type=text] {
    width: 100%; box-sizing: border-box; padding: 10px 12px;
    background: #0f172a; color: #e5e7eb; border: 1px solid #374151; border-radius: 8px;
}
.upload-card {
    background: #0f172a;
    border: 1px dashed #374151;
    border-radius: 14px;
    padding: 16px;
}
.hint { color: #9ca3af; font-size: 13px; margin-top: 8px; }
.preview img { width: 100%; border-radius: 8px; margin-top: 14px; }
.preview figcaption { color: #9ca3af; font-size: 13px; text-align: center; }
button {
    width: 100%; margin-top: 18px;
    background: transparent;
    border: 2px solid #f59e0b;
    color: #f59e0b;
    border-radius: 12px;
    padding: 10px 18px;
    font-weight: 600;
    cursor: pointer;
}
button:hover { background: #f59e0b; color: #111827; }
.output-card {
    background: #0f172a;
    border: 1px solid #374151;
    border-radius: 16px;
    padding: 18px 20px;
    margin-top: 14px;
}
.output-card .text { line-height: 1.5; }
.alert { border-radius: 8px; padding: 12px 16px; margin-top: 14px; }
.alert.warning { background: #3b2f0b; color: #fde68a; }
.alert.info { background: #0c2a4a; color: #bfdbfe; }
.alert.error { background: #3f1212; color: #fecaca; }
ul { margin-top: 6px; }
li { margin-bottom: 6px; }
"#;

/// Everything the page shows for one request.
#[derive(Debug, Default)]
pub struct PageView<'a> {
    /// Prompt text echoed back into the input.
    pub prompt: Option<&'a str>,
    /// Uploaded image to preview.
    pub image: Option<&'a UploadedImage>,
    /// Result of the last submission, if any.
    pub outcome: Option<&'a SessionOutcome>,
}

/// Escapes text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn render_page(view: &PageView<'_>) -> String {
    let prompt = escape_html(view.prompt.unwrap_or_default());

    let preview = view
        .image
        .map(|image| {
            format!(
                r#"<figure class="preview"><img src="{}" alt="{}"><figcaption>{}</figcaption></figure>"#,
                image.data_uri(),
                escape_html(image.file_name()),
                escape_html(&image.caption()),
            )
        })
        .unwrap_or_default();

    let outcome = view.outcome.map(render_outcome).unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{PAGE_TITLE}</title>
<style>{STYLES}</style>
</head>
<body class="stApp">
<main>
<div class="title">{HEADER}</div>
<form method="post" action="/describe" enctype="multipart/form-data"
      onsubmit="this.querySelector('button').textContent = 'Generating description...'">
<div class="label">Input Prompt:</div>
<input type="text" name="prompt" placeholder="Describe the artifact..." value="{prompt}">
<div class="label">Choose an image of an artifact...</div>
<div class="upload-card">
<input type="file" name="image" accept=".jpg,.jpeg,.png,image/jpeg,image/png">
<div class="hint">Drag and drop file here (Limit 200MB per file) - JPG, JPEG, PNG</div>
</div>
{preview}
<button type="submit">🚀 Generate Artifact Description</button>
</form>
{outcome}
</main>
</body>
</html>
"#
    )
}

fn render_outcome(outcome: &SessionOutcome) -> String {
    match outcome {
        SessionOutcome::Described(description) => format!(
            r#"<div class="output-card"><p>{OUTPUT_HEADING}</p><div class="text">{}</div></div>"#,
            render_markdown(&description.text)
        ),
        SessionOutcome::NoContent => format!(
            r#"<div class="output-card"><p>{OUTPUT_HEADING}</p>{}</div>"#,
            alert("info", outcome)
        ),
        SessionOutcome::MissingInput => alert("warning", outcome),
        SessionOutcome::Failed(_) | SessionOutcome::Rejected(_) => alert("error", outcome),
    }
}

/// Renders the model's markdown reply. Raw HTML is shown as text and links
/// or images collapse to their text, so the reply cannot inject markup.
pub fn render_markdown(text: &str) -> String {
    let events = Parser::new(text).filter_map(|event| match event {
        Event::Html(raw) | Event::InlineHtml(raw) => Some(Event::Text(raw)),
        Event::Start(Tag::Link { .. } | Tag::Image { .. })
        | Event::End(TagEnd::Link | TagEnd::Image) => None,
        other => Some(other),
    });

    let mut rendered = String::with_capacity(text.len() * 3 / 2);
    html::push_html(&mut rendered, events);
    rendered
}

fn alert(kind: &str, outcome: &SessionOutcome) -> String {
    format!(
        r#"<div class="alert {kind}">{}</div>"#,
        escape_html(outcome.message().unwrap_or_default())
    )
}
