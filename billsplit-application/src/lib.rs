#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod ports;
pub mod settlement_cache;
pub mod settlement_service;

pub use error::{ServiceError, SinkError, SourceError};
pub use model::{
    BillParticipantRecord, BillRecord, EventBalanceRecord, EventRecord, LedgerSnapshot,
    MemberRecord, SettlementRecord, SettlementReport,
};
pub use ports::{LedgerSource, MemberDirectory, SettlementSink};
pub use settlement_cache::{LedgerChange, SettlementCache};
pub use settlement_service::SettlementService;
