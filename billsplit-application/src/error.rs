use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum ImageError {
    #[error("Image data is empty")]
    Empty,
    #[error("Failed to decode image")]
    Decode(#[source] BoxError),
    #[error("Failed to encode image")]
    Encode(#[source] BoxError),
}

/// Failure of the transport underneath the vision model.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Vision service returned status {status}")]
    Status { status: u16, body: String },
    #[error("Vision service unreachable: {0}")]
    Network(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Extraction timed out after {}s", after.as_secs())]
    Timeout { after: Duration },
    #[error("Extraction request failed")]
    Transport(#[source] TransportError),
    #[error("Vision service returned an empty response")]
    EmptyResponse,
    #[error("Could not decode extraction response")]
    Decode(#[source] BoxError),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error(transparent)]
    Image(#[from] ImageError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("Scan task failed")]
    Task(#[from] tokio::task::JoinError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn scan_error_keeps_the_source_chain() {
        let err = ScanError::from(ExtractionError::Transport(TransportError::Status {
            status: 503,
            body: String::new(),
        }));

        assert_eq!(err.to_string(), "Extraction request failed");
        let source = err.source().expect("transport source");
        assert_eq!(source.to_string(), "Vision service returned status 503");
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = ExtractionError::Timeout {
            after: Duration::from_secs(30),
        };
        assert_eq!(err.to_string(), "Extraction timed out after 30s");
    }
}
