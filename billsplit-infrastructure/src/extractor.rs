use std::time::Duration;

use base64::{Engine, engine::general_purpose::STANDARD};
use billsplit_application::{
    AppConfig, ExtractionError, NormalizedImage, ReceiptExtractor, TransportError,
};
use billsplit_domain::{ExtractedReceipt, Money, ReceiptHeadline};
use serde::de::DeserializeOwned;

use crate::{
    repair::repair,
    wire::{DetailsDto, HeadlineDto},
};

const HEADLINE_PROMPT: &str = "Read this receipt photo. Reply with JSON only: \
{\"merchant\": string|null, \"total\": number|null}. Amounts are in dollars.";

const DETAILS_PROMPT: &str = "Read this receipt photo. Reply with JSON only: \
{\"merchant\": string|null, \"subtotal\": number|null, \"tax\": number|null, \
\"fees\": number|null, \"tip\": number|null, \"discount\": number|null, \
\"total\": number|null, \"items\": [{\"name\": string, \"quantity\": number, \
\"price\": number}], \"issues\": [string]}. Item prices are line totals in dollars.";

/// One call to the vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionRequest {
    pub prompt: String,
    pub image: NormalizedImage,
    pub max_output_tokens: u32,
}

impl VisionRequest {
    /// `data:` URL carrying the image, for transports that inline it.
    pub fn image_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.image.content_type,
            STANDARD.encode(&self.image.bytes)
        )
    }
}

/// Whatever actually talks to the model.
pub trait VisionTransport: Send + Sync + 'static {
    fn complete(
        &self,
        request: VisionRequest,
    ) -> impl Future<Output = Result<String, TransportError>> + Send;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractorSettings {
    pub timeout: Duration,
    pub max_output_tokens: u32,
    pub retry_output_tokens: u32,
}

impl From<&AppConfig> for ExtractorSettings {
    fn from(config: &AppConfig) -> Self {
        Self {
            timeout: config.request_timeout,
            max_output_tokens: config.max_output_tokens,
            retry_output_tokens: config.retry_output_tokens,
        }
    }
}

/// [`ReceiptExtractor`] backed by a vision model.
///
/// Every request is bounded by `timeout`. An empty reply is retried once with
/// `retry_output_tokens`.
pub struct VisionReceiptExtractor<T> {
    transport: T,
    settings: ExtractorSettings,
}

impl<T: VisionTransport> VisionReceiptExtractor<T> {
    pub fn new(transport: T, settings: ExtractorSettings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    async fn request(
        &self,
        prompt: String,
        image: &NormalizedImage,
    ) -> Result<String, ExtractionError> {
        let mut request = VisionRequest {
            prompt,
            image: image.clone(),
            max_output_tokens: self.settings.max_output_tokens,
        };

        let first = self.attempt(request.clone()).await?;
        if !first.trim().is_empty() {
            return Ok(first);
        }

        tracing::warn!(
            retry_output_tokens = self.settings.retry_output_tokens,
            "Empty extraction response; retrying with a larger budget"
        );
        request.max_output_tokens = self.settings.retry_output_tokens;
        let second = self.attempt(request).await?;
        if second.trim().is_empty() {
            return Err(ExtractionError::EmptyResponse);
        }
        Ok(second)
    }

    async fn attempt(&self, request: VisionRequest) -> Result<String, ExtractionError> {
        let after = self.settings.timeout;
        let max_output_tokens = request.max_output_tokens;
        match tokio::time::timeout(after, self.transport.complete(request)).await {
            Ok(Ok(text)) => {
                tracing::debug!(max_output_tokens, chars = text.len(), "Vision response received");
                Ok(text)
            }
            Ok(Err(err)) => Err(ExtractionError::Transport(err)),
            Err(_) => {
                tracing::warn!(timeout_secs = after.as_secs(), "Vision request timed out");
                Err(ExtractionError::Timeout { after })
            }
        }
    }
}

fn decode<D: DeserializeOwned>(raw: &str) -> Result<D, ExtractionError> {
    let repaired = repair(raw);
    if !repaired.applied.is_empty() {
        tracing::warn!(steps = ?repaired.applied, "Repaired extraction response");
    }
    serde_json::from_str(&repaired.text).map_err(|err| ExtractionError::Decode(Box::new(err)))
}

impl<T: VisionTransport> ReceiptExtractor for VisionReceiptExtractor<T> {
    async fn extract_headline(
        &self,
        image: &NormalizedImage,
    ) -> Result<ReceiptHeadline, ExtractionError> {
        let text = self.request(HEADLINE_PROMPT.to_owned(), image).await?;
        let dto: HeadlineDto = decode(&text)?;
        Ok(dto.into_headline())
    }

    async fn extract_details(
        &self,
        image: &NormalizedImage,
        known_total: Option<Money>,
    ) -> Result<ExtractedReceipt, ExtractionError> {
        let prompt = match known_total {
            Some(total) => format!("{DETAILS_PROMPT} The total is {total}."),
            None => DETAILS_PROMPT.to_owned(),
        };
        let text = self.request(prompt, image).await?;
        let dto: DetailsDto = decode(&text)?;
        Ok(dto.into_extracted(known_total))
    }
}
