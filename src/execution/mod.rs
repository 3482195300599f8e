//! Request execution: HTTP plumbing and upload forms.

pub mod http;
pub mod upload;

pub use upload::UploadForm;
