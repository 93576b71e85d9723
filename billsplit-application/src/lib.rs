#![warn(clippy::uninlined_format_args)]

pub mod config;
pub mod error;
pub mod ports;
pub mod scan;

pub use config::AppConfig;
pub use error::{ExtractionError, ImageError, ScanError, TransportError};
pub use ports::{ImageNormalizer, NormalizedImage, RawImage, ReceiptExtractor};
pub use scan::{DetailsOutcome, ScanHeadline, ScanSession};
