//! Uploaded artifact images.

use crate::error::{CuratorError, Result};
use base64::Engine;
use image::{ImageFormat, ImageReader};
use std::io::Cursor;

/// Largest accepted upload, matching the 200MB per-file limit shown in the form.
pub const MAX_UPLOAD_BYTES: usize = 200 * 1024 * 1024;

/// File extensions offered by the upload filter.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// A validated JPEG or PNG upload, kept as the original bytes.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    file_name: String,
    format: ImageFormat,
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl UploadedImage {
    /// Validates an upload: accepted extension, size ceiling, and a decodable
    /// JPEG/PNG header.
    pub fn from_upload(file_name: impl Into<String>, data: Vec<u8>) -> Result<Self> {
        let file_name = file_name.into();

        let extension = std::path::Path::new(&file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .ok_or_else(|| CuratorError::UnsupportedImage(file_name.clone()))?;
        if !ACCEPTED_EXTENSIONS.contains(&extension.as_str()) {
            return Err(CuratorError::UnsupportedImage(format!(".{extension}")));
        }

        if data.len() > MAX_UPLOAD_BYTES {
            return Err(CuratorError::ImageTooLarge {
                size: data.len(),
                limit: MAX_UPLOAD_BYTES,
            });
        }

        let reader = ImageReader::new(Cursor::new(data.as_slice()))
            .with_guessed_format()
            .map_err(|e| CuratorError::InvalidImage(e.to_string()))?;
        let format = match reader.format() {
            Some(format @ (ImageFormat::Jpeg | ImageFormat::Png)) => format,
            Some(other) => {
                return Err(CuratorError::UnsupportedImage(format!(
                    "{} content",
                    other.extensions_str().first().copied().unwrap_or("unknown")
                )));
            }
            None => {
                return Err(CuratorError::InvalidImage(format!(
                    "{file_name} is not a JPEG or PNG image"
                )));
            }
        };
        let (width, height) = reader
            .into_dimensions()
            .map_err(|e| CuratorError::InvalidImage(e.to_string()))?;

        log::debug!("Accepted upload {file_name} ({width}x{height}, {} bytes)", data.len());

        Ok(Self {
            file_name,
            format,
            width,
            height,
            data,
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.to_mime_type()
    }

    /// Caption shown under the preview: `<name> • <size> KB`.
    pub fn caption(&self) -> String {
        let kb = (self.data.len() as f64 / 1024.0 * 10.0).round() / 10.0;
        format!("{} • {kb:.1} KB", self.file_name)
    }

    /// `data:` URI used to preview the original bytes.
    pub fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.data)
        )
    }
}
