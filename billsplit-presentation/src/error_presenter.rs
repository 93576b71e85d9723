use billsplit_application::{ExtractionError, ScanError};
use billsplit_i18n as i18n;

/// Every scan failure reads the same to the user; the cause goes to the log.
pub fn format_scan_error(error: &ScanError) -> String {
    let cause = match error {
        ScanError::Image(_) => "image",
        ScanError::Extraction(ExtractionError::Timeout { .. }) => "timeout",
        ScanError::Extraction(_) => "extraction",
        ScanError::Task(_) => "task",
    };
    tracing::warn!(cause, error = %error, "Receipt scan failed");
    i18n::SCAN_FAILED.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use billsplit_application::ImageError;
    use rstest::rstest;
    use std::time::Duration;

    #[rstest]
    #[case::empty_image(ScanError::Image(ImageError::Empty))]
    #[case::timeout(ScanError::Extraction(ExtractionError::Timeout {
        after: Duration::from_secs(30),
    }))]
    #[case::empty_response(ScanError::Extraction(ExtractionError::EmptyResponse))]
    fn every_failure_reads_the_same(#[case] error: ScanError) {
        assert_eq!(format_scan_error(&error), i18n::SCAN_FAILED);
    }
}
