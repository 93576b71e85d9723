#![warn(clippy::uninlined_format_args)]

pub mod draft;
pub mod model;
pub mod money;
pub mod services;

pub use draft::{DraftConfig, DraftEvent, SplitDraft, SplitSummary, SummaryParticipant};
pub use model::{
    Extras, ExtrasPolicy, Item, ItemId, Participant, ParticipantId, Receipt, SplitMode,
    SplitPolicy, UnassignedPolicy, complete_item_total,
};
pub use money::{Money, format_cents, parse_to_cents};
pub use services::{
    Allocation, ByItemsAllocation, DialDrag, ExtractedItem, ExtractedReceipt, ManualEntry,
    ParticipantShare, ReceiptHeadline, TIP_PRESETS, TipOption, allocate_by_items, equal_split,
    item_shares, item_subtotals, percentage_of, share_percentages, tip_for_percentage, tip_options,
};
