use std::sync::Arc;

use billsplit_domain::{ExtractedReceipt, ReceiptHeadline};
use tokio::task::JoinHandle;

use crate::{
    error::{ExtractionError, ScanError},
    ports::{ImageNormalizer, RawImage, ReceiptExtractor},
};

/// Result of phase 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHeadline {
    pub generation: u64,
    pub headline: ReceiptHeadline,
}

/// Result of phase 2. A failure here leaves the phase-1 headline valid.
#[derive(Debug)]
pub enum DetailsOutcome {
    Ready(ExtractedReceipt),
    Failed(ExtractionError),
}

struct PendingDetails {
    generation: u64,
    handle: JoinHandle<Result<ExtractedReceipt, ExtractionError>>,
}

/// Two-phase receipt scan.
///
/// Phase 1 is awaited by [`ScanSession::capture`]; phase 2 runs in the
/// background and is collected with [`ScanSession::details`]. A new capture or
/// a reset aborts any phase 2 still running, and each capture is tagged with a
/// generation so stale results are never handed out.
pub struct ScanSession<N, E> {
    normalizer: Arc<N>,
    extractor: Arc<E>,
    generation: u64,
    pending: Option<PendingDetails>,
}

impl<N, E> ScanSession<N, E>
where
    N: ImageNormalizer,
    E: ReceiptExtractor,
{
    pub fn new(normalizer: N, extractor: E) -> Self {
        Self {
            normalizer: Arc::new(normalizer),
            extractor: Arc::new(extractor),
            generation: 0,
            pending: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_pending_details(&self) -> bool {
        self.pending.is_some()
    }

    pub async fn capture(&mut self, raw: RawImage) -> Result<ScanHeadline, ScanError> {
        self.cancel_details();
        self.generation += 1;
        let generation = self.generation;
        tracing::info!(generation, bytes = raw.bytes.len(), "Receipt scan started");

        let normalizer = Arc::clone(&self.normalizer);
        let image = tokio::task::spawn_blocking(move || normalizer.normalize(&raw)).await??;
        let image = Arc::new(image);
        tracing::debug!(
            generation,
            width = image.width,
            height = image.height,
            bytes = image.bytes.len(),
            "Image normalized"
        );

        let headline = match self.extractor.extract_headline(&image).await {
            Ok(headline) => headline,
            Err(err) => {
                tracing::error!(generation, error = %err, "Headline extraction failed");
                return Err(err.into());
            }
        };
        tracing::info!(
            generation,
            has_merchant = headline.merchant.is_some(),
            total = headline.total.map(|total| total.cents()),
            "Headline extracted"
        );

        let extractor = Arc::clone(&self.extractor);
        let known_total = headline.total;
        let handle = tokio::spawn(async move {
            extractor.extract_details(&image, known_total).await
        });
        self.pending = Some(PendingDetails { generation, handle });

        Ok(ScanHeadline {
            generation,
            headline,
        })
    }

    /// Waits for the current phase 2. `None` when nothing is pending or the
    /// task did not complete.
    pub async fn details(&mut self) -> Option<DetailsOutcome> {
        let pending = self.pending.take()?;
        if pending.generation != self.generation {
            pending.handle.abort();
            return None;
        }

        match pending.handle.await {
            Ok(Ok(receipt)) => {
                tracing::info!(
                    generation = pending.generation,
                    items = receipt.items.len(),
                    "Receipt details extracted"
                );
                Some(DetailsOutcome::Ready(receipt))
            }
            Ok(Err(err)) => {
                tracing::warn!(
                    generation = pending.generation,
                    error = %err,
                    "Detail extraction failed; keeping headline"
                );
                Some(DetailsOutcome::Failed(err))
            }
            Err(err) if err.is_cancelled() => None,
            Err(err) => {
                tracing::warn!(generation = pending.generation, error = %err, "Detail task panicked");
                None
            }
        }
    }

    /// Drops any in-flight phase 2 and invalidates earlier generations.
    pub fn reset(&mut self) {
        self.cancel_details();
        self.generation += 1;
    }

    fn cancel_details(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            tracing::debug!(generation = pending.generation, "Cancelled pending detail extraction");
        }
    }
}

impl<N, E> Drop for ScanSession<N, E> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
        }
    }
}
