#![warn(clippy::uninlined_format_args)]

pub mod notification_presenter;
pub mod settlement_presenter;
pub mod text_table;

pub use notification_presenter::NotificationPresenter;
pub use settlement_presenter::{SettlementPresenter, SettlementView};
