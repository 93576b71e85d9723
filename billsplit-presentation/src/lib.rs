#![warn(clippy::uninlined_format_args)]

pub mod error_presenter;
pub mod labels;
pub mod summary_presenter;
pub mod svg_table;

pub use error_presenter::format_scan_error;
pub use labels::{Labelled, participant_label};
pub use summary_presenter::{SummaryPresenter, SummaryView};
