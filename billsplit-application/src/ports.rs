use billsplit_domain::{ExtractedReceipt, Money, ReceiptHeadline};

use crate::error::{ExtractionError, ImageError};

/// Photo bytes exactly as captured.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub content_type: Option<String>,
}

/// Upload-ready image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedImage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub content_type: String,
}

/// Turns a captured photo into an image suitable for upload.
pub trait ImageNormalizer: Send + Sync + 'static {
    fn normalize(&self, raw: &RawImage) -> Result<NormalizedImage, ImageError>;
}

/// Best-effort structured reading of a receipt photo.
pub trait ReceiptExtractor: Send + Sync + 'static {
    /// Fast pass: merchant and total only.
    fn extract_headline(
        &self,
        image: &NormalizedImage,
    ) -> impl Future<Output = Result<ReceiptHeadline, ExtractionError>> + Send;

    /// Slow pass: line items and charges, seeded with the total from the
    /// fast pass when one was found.
    fn extract_details(
        &self,
        image: &NormalizedImage,
        known_total: Option<Money>,
    ) -> impl Future<Output = Result<ExtractedReceipt, ExtractionError>> + Send;
}
