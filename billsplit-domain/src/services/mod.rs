pub mod settle_up_policy;
pub mod settlement_calculator;
pub mod settlement_engine;
pub mod settlement_rounding;
pub mod share_reconciler;

pub use settle_up_policy::SettleUpPolicy;
pub use settlement_calculator::SettlementCalculator;
pub use settlement_engine::SettlementEngine;
pub use settlement_rounding::{
    FairnessPolicy, MAX_SETTLEMENT_SCALE, RoundingMode, SettlementContext,
    SettlementRoundingError, quantize_balances, quantize_balances_with_preferred_members,
};
pub use share_reconciler::{SharePolicy, ShareReconciler};
