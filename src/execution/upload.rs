//! Multipart upload forms.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use tokio_util::io::ReaderStream;

use crate::error::ClientError;
use crate::utils::mime::guess_mime;

/// Builder for a `multipart/form-data` upload.
///
/// Every part has a known size, so reqwest declares a `Content-Length` for
/// the whole form unless the client forces chunked transfer.
#[derive(Debug)]
pub struct UploadForm {
    form: Form,
}

impl Default for UploadForm {
    fn default() -> Self {
        Self::new()
    }
}

impl UploadForm {
    pub fn new() -> Self {
        Self { form: Form::new() }
    }

    /// Add a plain text field.
    pub fn text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.form = self.form.text(name.into(), value.into());
        self
    }

    /// Add an in-memory file. The MIME type is guessed from `file_name`.
    pub fn bytes(
        mut self,
        name: impl Into<String>,
        file_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Result<Self, ClientError> {
        let file_name = file_name.into();
        let part = Part::bytes(data.into())
            .file_name(file_name.clone())
            .mime_str(&guess_mime(&file_name))
            .map_err(|e| ClientError::InvalidInput(format!("Invalid MIME type: {e}")))?;
        self.form = self.form.part(name.into(), part);
        Ok(self)
    }

    /// Add a file from disk. It is streamed, not read into memory; its length
    /// comes from the file metadata.
    pub async fn file(
        mut self,
        name: impl Into<String>,
        path: impl AsRef<Path>,
    ) -> Result<Self, ClientError> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let length = file.metadata().await?.len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ClientError::InvalidInput(format!("Not a file path: {}", path.display()))
            })?;

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let part = Part::stream_with_length(body, length)
            .file_name(file_name.clone())
            .mime_str(&guess_mime(&file_name))
            .map_err(|e| ClientError::InvalidInput(format!("Invalid MIME type: {e}")))?;
        self.form = self.form.part(name.into(), part);
        Ok(self)
    }

    pub fn boundary(&self) -> &str {
        self.form.boundary()
    }

    pub fn into_form(self) -> Form {
        self.form
    }
}

impl From<UploadForm> for Form {
    fn from(form: UploadForm) -> Self {
        form.into_form()
    }
}
