use billsplit_domain::{SettlementError, ValidationError, model::EventId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    #[error("event {0} not found")]
    EventNotFound(EventId),
    #[error("malformed ledger snapshot: {0}")]
    Malformed(String),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("failed to store settlements for event {event}: {reason}")]
    Rejected { event: EventId, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Source(#[from] SourceError),
    #[error(transparent)]
    Sink(#[from] SinkError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
}
