#[cfg(all(feature = "ja", feature = "en"))]
compile_error!("Cannot enable both 'ja' and 'en' features at the same time");

#[cfg(feature = "ja")]
pub mod strings {
    pub const ME: &str = "自分";
    pub const PARTICIPANT: &str = "メンバー";
    pub const OWES: &str = "支払額";
    pub const SHARE: &str = "割合";
    pub const ITEM: &str = "品目";
    pub const PRICE: &str = "金額";
    pub const SHARED_BY: &str = "担当";
    pub const PAID_MARKER: &str = "(立替)";
    pub const EXCLUDED_MARKER: &str = "(対象外)";
    pub const UNALLOCATED: &str = "未割り当て";
    pub const UNASSIGNED: &str = "担当者なし";
    pub const TOTAL: &str = "合計";
    pub const EVERYONE: &str = "全員";
    pub const MODE_EQUALLY: &str = "均等";
    pub const MODE_CUSTOM: &str = "金額指定";
    pub const MODE_BY_ITEMS: &str = "品目別";
    pub const SCAN_FAILED: &str =
        "レシートを読み取れませんでした。もう一度撮影するか、手入力してください。";
}

#[cfg(feature = "en")]
pub mod strings {
    pub const ME: &str = "Me";
    pub const PARTICIPANT: &str = "Participant";
    pub const OWES: &str = "Owes";
    pub const SHARE: &str = "Share";
    pub const ITEM: &str = "Item";
    pub const PRICE: &str = "Price";
    pub const SHARED_BY: &str = "Shared by";
    pub const PAID_MARKER: &str = "(paid)";
    pub const EXCLUDED_MARKER: &str = "(not splitting)";
    pub const UNALLOCATED: &str = "Unallocated";
    pub const UNASSIGNED: &str = "Unassigned";
    pub const TOTAL: &str = "Total";
    pub const EVERYONE: &str = "Everyone";
    pub const MODE_EQUALLY: &str = "equally";
    pub const MODE_CUSTOM: &str = "by custom amounts";
    pub const MODE_BY_ITEMS: &str = "by items";
    pub const SCAN_FAILED: &str =
        "Couldn't read the receipt. Try another photo or enter it manually.";
}

#[cfg(not(any(feature = "ja", feature = "en")))]
pub mod strings {
    pub const ME: &str = "Me";
    pub const PARTICIPANT: &str = "Participant";
    pub const OWES: &str = "Owes";
    pub const SHARE: &str = "Share";
    pub const ITEM: &str = "Item";
    pub const PRICE: &str = "Price";
    pub const SHARED_BY: &str = "Shared by";
    pub const PAID_MARKER: &str = "(paid)";
    pub const EXCLUDED_MARKER: &str = "(not splitting)";
    pub const UNALLOCATED: &str = "Unallocated";
    pub const UNASSIGNED: &str = "Unassigned";
    pub const TOTAL: &str = "Total";
    pub const EVERYONE: &str = "Everyone";
    pub const MODE_EQUALLY: &str = "equally";
    pub const MODE_CUSTOM: &str = "by custom amounts";
    pub const MODE_BY_ITEMS: &str = "by items";
    pub const SCAN_FAILED: &str =
        "Couldn't read the receipt. Try another photo or enter it manually.";
}

pub use strings::*;

pub struct GuestLabel {
    position: usize,
}

pub struct SplitCaption<'a> {
    title: &'a str,
    total: &'a str,
    mode: &'a str,
}

/// Fallback name for an unnamed guest at a 1-based roster position.
pub fn guest_label(position: usize) -> GuestLabel {
    GuestLabel { position }
}

pub fn split_caption<'a>(title: &'a str, total: &'a str, mode: &'a str) -> SplitCaption<'a> {
    SplitCaption { title, total, mode }
}

#[cfg(feature = "ja")]
impl std::fmt::Display for GuestLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ゲスト{}", self.position)
    }
}

#[cfg(feature = "ja")]
impl std::fmt::Display for SplitCaption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} を{}で割り勘", self.title, self.total, self.mode)
    }
}

#[cfg(not(feature = "ja"))]
impl std::fmt::Display for GuestLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Guest {}", self.position)
    }
}

#[cfg(not(feature = "ja"))]
impl std::fmt::Display for SplitCaption<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {} split {}", self.title, self.total, self.mode)
    }
}
