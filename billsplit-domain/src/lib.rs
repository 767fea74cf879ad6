#![warn(clippy::uninlined_format_args)]

pub mod error;
pub mod model;
pub mod services;

pub use error::{InvariantViolation, SettlementError, ValidationError};
pub use model::{
    BalanceAccumulator, Bill, BillParticipant, EventBalance, EventLedger, EventSettlement,
    Member, MemberBalances, Money, RemainderPolicy, Settlement, SettlementOutcome, Transfer,
};
pub use services::{
    SettleUpPolicy, SettlementCalculator, SettlementContext, SettlementEngine, SharePolicy,
    ShareReconciler,
};
