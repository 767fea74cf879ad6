use thiserror::Error;

use crate::{
    model::{BillId, EventId, MemberId, Money},
    services::SettlementRoundingError,
};

/// Malformed ledger input. Nothing is computed when one of these is raised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("member {member} is listed more than once")]
    DuplicateMember { member: MemberId },
    #[error("bill {bill} is listed more than once")]
    DuplicateBill { bill: BillId },
    #[error("member {member} participates in bill {bill} more than once")]
    DuplicateParticipant { bill: BillId, member: MemberId },
    #[error("bill {bill} references unknown participant {member}")]
    UnknownMember { bill: BillId, member: MemberId },
    #[error("bill {bill} is paid by unknown member {member}")]
    UnknownPayer { bill: BillId, member: MemberId },
    #[error("key payer {member} is not a member of the event")]
    UnknownKeyPayer { member: MemberId },
    #[error("member {member} cannot settle up: not a member of the event")]
    UnknownSettleMember { member: MemberId },
    #[error("participant share references unknown bill {bill}")]
    UnknownBill { bill: BillId },
    #[error("bill {bill} belongs to event {event}")]
    ForeignBill { bill: BillId, event: EventId },
    #[error("bill {bill} has non-positive amount {amount}")]
    NonPositiveBillAmount { bill: BillId, amount: Money },
    #[error("member {member} has negative share {amount} in bill {bill}")]
    NegativeShare {
        bill: BillId,
        member: MemberId,
        amount: Money,
    },
    #[error("amounts of bill {bill} exceed the supported event total")]
    AmountOverflow { bill: BillId },
    #[error("bill {bill} has no participants")]
    BillWithoutParticipants { bill: BillId },
    #[error("bill {bill} amount {amount} has more than {scale} decimal places")]
    ExcessPrecision {
        bill: BillId,
        amount: Money,
        scale: u32,
    },
}

/// Participant shares that disagree with their bill.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("shares of bill {bill} sum to {share_total}, expected {amount}")]
    ShareMismatch {
        bill: BillId,
        amount: Money,
        share_total: Money,
    },
    #[error("shares of bill {bill} cannot be scaled to its amount")]
    UnnormalizableShares { bill: BillId },
    #[error("shares of bill {bill} overflow when summed")]
    ShareOverflow { bill: BillId },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    InvariantViolation(#[from] InvariantViolation),
    #[error(transparent)]
    Rounding(#[from] SettlementRoundingError),
}
