use billsplit_application::{
    DetailsOutcome, ExtractionError, ImageError, ImageNormalizer, NormalizedImage, RawImage,
    ReceiptExtractor, ScanError, ScanSession,
};
use billsplit_domain::{ExtractedReceipt, Money, ReceiptHeadline};

struct PassThroughNormalizer;

impl ImageNormalizer for PassThroughNormalizer {
    fn normalize(&self, raw: &RawImage) -> Result<NormalizedImage, ImageError> {
        if raw.bytes.is_empty() {
            return Err(ImageError::Empty);
        }
        Ok(NormalizedImage {
            bytes: raw.bytes.clone(),
            width: 640,
            height: 480,
            content_type: "image/jpeg".to_owned(),
        })
    }
}

/// Reads the image bytes as a merchant name. `slow` never finishes phase 2,
/// `broken` fails phase 2, `unreadable` fails phase 1.
struct ScriptedExtractor;

impl ReceiptExtractor for ScriptedExtractor {
    async fn extract_headline(
        &self,
        image: &NormalizedImage,
    ) -> Result<ReceiptHeadline, ExtractionError> {
        let merchant = String::from_utf8_lossy(&image.bytes).into_owned();
        if merchant == "unreadable" {
            return Err(ExtractionError::EmptyResponse);
        }
        Ok(ReceiptHeadline {
            merchant: Some(merchant),
            total: Some(Money::from_cents(4200)),
        })
    }

    async fn extract_details(
        &self,
        image: &NormalizedImage,
        known_total: Option<Money>,
    ) -> Result<ExtractedReceipt, ExtractionError> {
        let merchant = String::from_utf8_lossy(&image.bytes).into_owned();
        match merchant.as_str() {
            "slow" => std::future::pending().await,
            "broken" => Err(ExtractionError::EmptyResponse),
            _ => Ok(ExtractedReceipt {
                merchant: Some(merchant),
                total: known_total,
                ..ExtractedReceipt::default()
            }),
        }
    }
}

fn session() -> ScanSession<PassThroughNormalizer, ScriptedExtractor> {
    ScanSession::new(PassThroughNormalizer, ScriptedExtractor)
}

fn photo(name: &str) -> RawImage {
    RawImage {
        bytes: name.as_bytes().to_vec(),
        content_type: Some("image/heic".to_owned()),
    }
}

fn ready_merchant(outcome: Option<DetailsOutcome>) -> Option<String> {
    match outcome {
        Some(DetailsOutcome::Ready(receipt)) => receipt.merchant,
        _ => None,
    }
}

#[tokio::test]
async fn capture_returns_headline_then_details() {
    let mut session = session();

    let headline = session.capture(photo("Taqueria")).await.expect("phase 1");

    assert_eq!(headline.generation, 1);
    assert_eq!(headline.headline.merchant.as_deref(), Some("Taqueria"));
    assert!(session.has_pending_details());

    match session.details().await {
        Some(DetailsOutcome::Ready(receipt)) => {
            assert_eq!(receipt.merchant.as_deref(), Some("Taqueria"));
            assert_eq!(receipt.total, Some(Money::from_cents(4200)));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(session.details().await.is_none());
}

#[tokio::test]
async fn new_capture_cancels_previous_details() {
    let mut session = session();

    session.capture(photo("slow")).await.expect("first phase 1");
    let second = session.capture(photo("Diner")).await.expect("second phase 1");

    assert_eq!(second.generation, 2);
    assert_eq!(ready_merchant(session.details().await).as_deref(), Some("Diner"));
}

#[tokio::test]
async fn reset_discards_pending_details() {
    let mut session = session();
    session.capture(photo("slow")).await.expect("phase 1");

    session.reset();

    assert!(!session.has_pending_details());
    assert!(session.details().await.is_none());
    assert_eq!(session.generation(), 2);
}

#[tokio::test]
async fn headline_failure_commits_nothing() {
    let mut session = session();

    let err = session
        .capture(photo("unreadable"))
        .await
        .expect_err("phase 1 should fail");

    assert!(matches!(
        err,
        ScanError::Extraction(ExtractionError::EmptyResponse)
    ));
    assert!(!session.has_pending_details());
}

#[tokio::test]
async fn details_failure_keeps_headline() {
    let mut session = session();

    let headline = session.capture(photo("broken")).await.expect("phase 1");

    assert_eq!(headline.headline.total, Some(Money::from_cents(4200)));
    assert!(matches!(
        session.details().await,
        Some(DetailsOutcome::Failed(ExtractionError::EmptyResponse))
    ));
}

#[tokio::test]
async fn normalization_failure_is_reported() {
    let mut session = session();

    let err = session.capture(photo("")).await.expect_err("empty image");

    assert!(matches!(err, ScanError::Image(ImageError::Empty)));
}
