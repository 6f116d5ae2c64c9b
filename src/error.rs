// Service errors. Everything the remote call can go wrong with collapses
// into one of these two kinds; nothing is retried.

use thiserror::Error;

/// Underlying cause of a remote failure: a transport error from reqwest or
/// a decode error from serde_json.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum VisionError {
    /// The service rejected the key/endpoint pair, or the pair could not
    /// be turned into a request at all.
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    /// Network failure, an unreachable or undecodable image, or any other
    /// error status returned by the service.
    #[error("Image analysis failed: {message}")]
    RemoteAnalysis {
        status: Option<u16>,
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl VisionError {
    pub fn authentication(message: impl Into<String>) -> Self {
        VisionError::Authentication {
            message: message.into(),
        }
    }

    pub fn remote(status: Option<u16>, message: impl Into<String>) -> Self {
        VisionError::RemoteAnalysis {
            status,
            message: message.into(),
            source: None,
        }
    }

    pub fn remote_with_source(
        status: Option<u16>,
        message: impl Into<String>,
        source: impl Into<BoxError>,
    ) -> Self {
        VisionError::RemoteAnalysis {
            status,
            message: message.into(),
            source: Some(source.into()),
        }
    }

    /// Process exit code used by the binary for this failure.
    pub fn exit_code(&self) -> u8 {
        match self {
            VisionError::Authentication { .. } => 3,
            VisionError::RemoteAnalysis { .. } => 4,
        }
    }
}

/// Exit code for any failure reaching the top level: the service error
/// kinds get their own codes, everything else (config, I/O) exits with 1.
pub fn exit_code_for(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<VisionError>()
        .map(VisionError::exit_code)
        .unwrap_or(1)
}
