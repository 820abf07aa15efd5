//! Error types for inpainting service operations

use thiserror::Error;

/// Result type alias for inpainting service operations
pub type Result<T> = std::result::Result<T, InpaintError>;

/// Error types for the upload → lookup → process workflow
#[derive(Error, Debug)]
pub enum InpaintError {
    /// Input/output errors (file not found, permission denied, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Image encoding or decoding errors
    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    /// Transport failures while talking to the service
    #[error("Network error: {context}: {source}")]
    Network {
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a body of unexpected shape
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// No record in the image list carries the requested file name
    #[error("No uploaded image named '{file_name}' was found")]
    RecordNotFound { file_name: String },

    /// Invalid configuration or parameters
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed data URI or form body
    #[error("Encoding error: {0}")]
    Encoding(String),
}

impl InpaintError {
    /// Create a new invalid configuration error
    pub fn invalid_config<S: Into<String>>(msg: S) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create a new invalid response error
    pub fn invalid_response<S: Into<String>>(msg: S) -> Self {
        Self::InvalidResponse(msg.into())
    }

    /// Create a new encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Create a record-not-found error for a remote file name
    pub fn record_not_found<S: Into<String>>(file_name: S) -> Self {
        Self::RecordNotFound {
            file_name: file_name.into(),
        }
    }

    /// Wrap a transport error with the request it belongs to
    pub fn network_error<S: Into<String>>(context: S, source: reqwest::Error) -> Self {
        Self::Network {
            context: context.into(),
            source,
        }
    }

    /// Create file I/O error with operation context
    pub fn file_io_error<P: AsRef<std::path::Path>>(
        operation: &str,
        path: P,
        error: &std::io::Error,
    ) -> Self {
        let path_display = path.as_ref().display();
        Self::Io(std::io::Error::new(
            error.kind(),
            format!("Failed to {} '{}': {}", operation, path_display, error),
        ))
    }

    /// Create a response-shape error naming the endpoint and what was missing
    pub fn response_shape_error(endpoint: &str, details: &str) -> Self {
        Self::InvalidResponse(format!(
            "Unexpected response shape from '{}': {}",
            endpoint, details
        ))
    }
}
