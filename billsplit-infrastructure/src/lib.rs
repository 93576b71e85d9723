#![warn(clippy::uninlined_format_args)]

pub mod extractor;
pub mod image_normalizer;
pub mod repair;
pub mod share_link;
pub mod wire;

pub use extractor::{ExtractorSettings, VisionReceiptExtractor, VisionRequest, VisionTransport};
pub use image_normalizer::ReceiptImageNormalizer;
pub use repair::{RepairStep, Repaired, repair};
pub use share_link::{
    PAYLOAD_VERSION, ShareLinkError, SharePayload, decode_payload, decode_share_url,
    encode_payload, share_url,
};
