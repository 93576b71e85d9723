use billsplit_infrastructure::{decode_payload, decode_share_url, repair};
use proptest::prelude::*;

proptest! {
    #[test]
    fn decoding_arbitrary_text_never_panics(text in ".{0,256}") {
        let _ = decode_payload(Some(&text));
        let _ = decode_share_url(&format!("https://billsplit.invalid/s?p={text}"));
    }

    #[test]
    fn decoding_arbitrary_base64_alphabet_never_panics(text in "[A-Za-z0-9_-]{0,512}") {
        let _ = decode_payload(Some(&text));
    }

    #[test]
    fn repair_is_idempotent(text in ".{0,256}") {
        let once = repair(&text);
        let twice = repair(&once.text);
        prop_assert_eq!(twice.text, once.text);
    }
}
