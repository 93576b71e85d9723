pub mod custom_allocator;
pub mod distribution;
pub mod item_allocator;
pub mod reconciliation;
pub mod tip;

pub use custom_allocator::{Allocation, DialDrag};
pub use distribution::{equal_split, prorate, split_evenly};
pub use item_allocator::{
    ByItemsAllocation, ItemSubtotals, ParticipantShare, allocate_by_items, item_shares,
    item_subtotals, percentage_of, share_percentages,
};
pub use reconciliation::{ExtractedItem, ExtractedReceipt, ManualEntry, ReceiptHeadline};
pub use tip::{TIP_PRESETS, TipOption, tip_for_percentage, tip_options};
