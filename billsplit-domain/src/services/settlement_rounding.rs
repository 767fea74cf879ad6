//! Zero-sum quantization of member balances.
//!
//! Raw balances come out of share arithmetic with arbitrary precision. Before
//! any transfer is proposed they are rounded to the atomic unit of the
//! settlement currency (e.g. 0.01 for scale 2), and the fewest possible
//! one-unit corrections are applied so that the rounded balances still sum to
//! exactly zero:
//! 1. The raw total must already be zero within a tiny epsilon.
//! 2. Each balance is rounded independently with the configured mode.
//! 3. `|Σ units|` corrections go to the members who gained most from rounding,
//!    with preferred members (the event's key payer) ranked first.

use crate::model::{MemberBalances, MemberId, Money};
use fxhash::FxHashSet;
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Rounding mode for settlement quantization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RoundingMode {
    /// Round half away from zero (0.005 -> 0.01, -0.005 -> -0.01).
    #[default]
    HalfUp,
    /// Banker's rounding.
    HalfEven,
}

impl RoundingMode {
    pub(crate) fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
        }
    }
}

/// Policy for deterministic rounding-adjustment assignment.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum FairnessPolicy {
    /// Minimize the total absolute deviation from the unrounded balances.
    #[default]
    ZeroSumMinimalAdjustment,
}

/// Scale, rounding mode and fairness policy used to quantize balances.
///
/// # Example
/// ```
/// use billsplit_domain::services::{FairnessPolicy, RoundingMode, SettlementContext};
///
/// let ctx = SettlementContext {
///     scale: 0, // VND has no minor unit
///     rounding_mode: RoundingMode::HalfUp,
///     fairness_policy: FairnessPolicy::ZeroSumMinimalAdjustment,
/// };
/// assert_eq!(ctx, SettlementContext::whole_units());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SettlementContext {
    /// Number of decimal places of the atomic unit.
    pub scale: u32,
    pub rounding_mode: RoundingMode,
    pub fairness_policy: FairnessPolicy,
}

impl Default for SettlementContext {
    fn default() -> Self {
        Self::with_scale(2)
    }
}

impl SettlementContext {
    pub fn with_scale(scale: u32) -> Self {
        Self {
            scale,
            rounding_mode: RoundingMode::default(),
            fairness_policy: FairnessPolicy::default(),
        }
    }

    /// Context for currencies without a minor unit.
    pub fn whole_units() -> Self {
        Self::with_scale(0)
    }

    pub fn validate(self) -> Result<(), SettlementRoundingError> {
        if self.scale <= MAX_SETTLEMENT_SCALE {
            return Ok(());
        }
        Err(SettlementRoundingError::UnsupportedScale {
            scale: self.scale,
            max_supported: MAX_SETTLEMENT_SCALE,
        })
    }

    pub fn atomic_unit(self) -> Result<Decimal, SettlementRoundingError> {
        self.validate()?;
        Ok(Decimal::new(1, self.scale))
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SettlementRoundingError {
    /// Raw balances do not cancel out; upstream arithmetic is broken.
    #[error("balances sum to {0} instead of zero")]
    ImbalancedTotal(Money),
    #[error("zero-sum repair needs more adjustments than there are members")]
    InvalidAdjustmentCount,
    #[error("quantized balances failed to restore an exact zero sum")]
    ZeroSumInvariantViolation,
    #[error("balance cannot be expressed in whole atomic units")]
    NonIntegral,
    #[error("scale {scale} exceeds the supported maximum of {max_supported}")]
    UnsupportedScale { scale: u32, max_supported: u32 },
}

pub const MAX_SETTLEMENT_SCALE: u32 = 22;
const STABLE_KEY_FORMAT_VERSION: u8 = 1;
const EPSILON_OP_COUNT_BUDGET: i64 = 1_000_000;
const EPSILON_SAFETY_FACTOR: i64 = 100;

struct QuantizedEntry {
    member: MemberId,
    units: i128,
    diff: Decimal,
}

/// Quantizes member balances to the atomic unit with an exact zero-sum result.
///
/// # Example
/// ```
/// use billsplit_domain::{MemberBalances, Money, model::MemberId};
/// use billsplit_domain::services::{SettlementContext, quantize_balances};
///
/// let mut balances = MemberBalances::new();
/// balances.insert(MemberId(1), Money::new(20, 0));
/// balances.insert(MemberId(2), Money::new(-10, 0));
/// balances.insert(MemberId(3), Money::new(-10, 0));
///
/// let rounded = quantize_balances(&balances, SettlementContext::default()).unwrap();
/// assert!(rounded.values().sum::<Money>().is_zero());
/// ```
pub fn quantize_balances(
    balances: &MemberBalances,
    context: SettlementContext,
) -> Result<MemberBalances, SettlementRoundingError> {
    quantize_balances_with_preferred_members(balances, context, &[])
}

/// Quantizes member balances, steering rounding adjustments to preferred members.
///
/// Adjustment candidates are ranked lexicographically:
/// 1. preferred members first
/// 2. rounding gain (`Σ units > 0`: largest upward rounding first; `< 0`: largest downward)
/// 3. a SHA-256 stable key over member and context, then member id
pub fn quantize_balances_with_preferred_members(
    balances: &MemberBalances,
    context: SettlementContext,
    preferred_members: &[MemberId],
) -> Result<MemberBalances, SettlementRoundingError> {
    let atomic_unit = context.atomic_unit()?;
    match context.fairness_policy {
        FairnessPolicy::ZeroSumMinimalAdjustment => {}
    }

    let epsilon = settlement_epsilon(context.scale);
    let original_sum: Money = balances.values().sum();
    if original_sum.abs().as_decimal() > epsilon {
        tracing::error!(
            reject_reason = "input_imbalance",
            member_count = balances.len(),
            atomic_unit = %atomic_unit,
            epsilon = %epsilon,
            sum_original = %original_sum,
            "Settlement quantization rejected due to input imbalance"
        );
        return Err(SettlementRoundingError::ImbalancedTotal(original_sum));
    }

    let strategy = context.rounding_mode.strategy();
    let mut entries = balances
        .iter()
        .map(|(member, money)| {
            let original = money.as_decimal();
            let units = quantize_to_int(original, atomic_unit, strategy)?;
            Ok(QuantizedEntry {
                member: *member,
                units,
                diff: Decimal::from(units) * atomic_unit - original,
            })
        })
        .collect::<Result<Vec<_>, SettlementRoundingError>>()?;

    let unit_sum = sum_units(&entries)?;
    tracing::debug!(
        scale = context.scale,
        rounding_mode = ?context.rounding_mode,
        member_count = entries.len(),
        preferred_member_count = preferred_members.len(),
        unit_sum,
        "Settlement quantization started"
    );

    if unit_sum != 0 {
        repair_zero_sum(&mut entries, unit_sum, context, preferred_members, epsilon)?;
        if sum_units(&entries)? != 0 {
            tracing::error!(
                reject_reason = "zero_sum_invariant_violation",
                member_count = entries.len(),
                "Settlement quantization failed zero-sum invariant check"
            );
            return Err(SettlementRoundingError::ZeroSumInvariantViolation);
        }
    }

    Ok(entries
        .into_iter()
        .map(|entry| {
            (
                entry.member,
                Money::from_decimal(Decimal::from(entry.units) * atomic_unit),
            )
        })
        .collect())
}

fn repair_zero_sum(
    entries: &mut [QuantizedEntry],
    unit_sum: i128,
    context: SettlementContext,
    preferred_members: &[MemberId],
    epsilon: Decimal,
) -> Result<(), SettlementRoundingError> {
    let adjustment_count = usize::try_from(unit_sum.unsigned_abs())
        .map_err(|_| SettlementRoundingError::InvalidAdjustmentCount)?;

    let atomic_unit = Decimal::new(1, context.scale);
    let epsilon_units = (epsilon / atomic_unit)
        .ceil()
        .to_i128()
        .ok_or(SettlementRoundingError::InvalidAdjustmentCount)?;
    let (
        theoretical_upper_bound,
        operational_upper_bound,
        exceeds_theoretical,
        exceeds_operational,
    ) = bound_diagnostics(unit_sum.unsigned_abs() as i128, entries.len(), epsilon_units);

    if exceeds_theoretical {
        tracing::info!(
            adjustment_count,
            theoretical_upper_bound,
            member_count = entries.len(),
            "Nearest-rounding theoretical bound exceeded during settlement quantization"
        );
    }
    if exceeds_operational {
        tracing::warn!(
            adjustment_count,
            operational_upper_bound,
            epsilon_units,
            member_count = entries.len(),
            "Operational nearest-rounding bound exceeded during settlement quantization"
        );
    }

    if adjustment_count > entries.len() {
        tracing::error!(
            reject_reason = "k_gt_n",
            adjustment_count,
            member_count = entries.len(),
            "Adjustment count exceeds participant count during settlement quantization"
        );
        return Err(SettlementRoundingError::InvalidAdjustmentCount);
    }

    let preferred: FxHashSet<MemberId> = preferred_members.iter().copied().collect();
    // Positive unit sum: take back from those rounded up the most.
    let score_sign = if unit_sum > 0 {
        Decimal::ONE
    } else {
        Decimal::NEGATIVE_ONE
    };

    let mut ranked: Vec<(usize, bool, Decimal, [u8; 32], MemberId)> = entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            (
                idx,
                preferred.contains(&entry.member),
                entry.diff * score_sign,
                stable_key(entry.member, context),
                entry.member,
            )
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.1.cmp(&a.1)
            .then_with(|| b.2.cmp(&a.2))
            .then_with(|| a.3.cmp(&b.3))
            .then_with(|| a.4.cmp(&b.4))
    });

    let step: i128 = if unit_sum > 0 { -1 } else { 1 };
    let selected: Vec<usize> = ranked
        .iter()
        .take(adjustment_count)
        .map(|(idx, ..)| *idx)
        .collect();
    for idx in &selected {
        entries[*idx].units += step;
    }

    tracing::debug!(
        unit_sum,
        adjustment_count,
        selected_members = ?selected.iter().map(|idx| entries[*idx].member.0).collect::<Vec<_>>(),
        preferred_hit_count = selected
            .iter()
            .filter(|idx| preferred.contains(&entries[**idx].member))
            .count(),
        "Settlement quantization adjustments applied"
    );

    Ok(())
}

fn sum_units(entries: &[QuantizedEntry]) -> Result<i128, SettlementRoundingError> {
    entries.iter().try_fold(0_i128, |acc, entry| {
        acc.checked_add(entry.units)
            .ok_or(SettlementRoundingError::InvalidAdjustmentCount)
    })
}

fn settlement_epsilon(scale: u32) -> Decimal {
    let baseline = Decimal::new(1, scale + 6);
    let epsilon_min = Decimal::from(EPSILON_SAFETY_FACTOR * EPSILON_OP_COUNT_BUDGET)
        * Decimal::from_i128_with_scale(1, 28);
    baseline.max(epsilon_min)
}

fn stable_key(member_id: MemberId, context: SettlementContext) -> [u8; 32] {
    let rounding_mode_tag = match context.rounding_mode {
        RoundingMode::HalfUp => 0_u8,
        RoundingMode::HalfEven => 1_u8,
    };
    let fairness_policy_tag = match context.fairness_policy {
        FairnessPolicy::ZeroSumMinimalAdjustment => 0_u8,
    };

    let mut framed = [0_u8; 15];
    framed[0] = STABLE_KEY_FORMAT_VERSION;
    framed[1..9].copy_from_slice(&member_id.0.to_be_bytes());
    framed[9..13].copy_from_slice(&context.scale.to_be_bytes());
    framed[13] = rounding_mode_tag;
    framed[14] = fairness_policy_tag;

    let digest = Sha256::digest(framed);
    let mut out = [0_u8; 32];
    out.copy_from_slice(&digest);
    out
}

fn quantize_to_int(
    original: Decimal,
    atomic_unit: Decimal,
    strategy: RoundingStrategy,
) -> Result<i128, SettlementRoundingError> {
    let Some(shifted) = original.checked_div(atomic_unit) else {
        tracing::warn!(
            reject_reason = "quantize_failure",
            original = %original,
            atomic_unit = %atomic_unit,
            "Balance overflowed while shifting to atomic units"
        );
        return Err(SettlementRoundingError::NonIntegral);
    };
    let rounded = shifted.round_dp_with_strategy(0, strategy);
    rounded.to_i128().ok_or_else(|| {
        tracing::warn!(
            reject_reason = "quantize_failure",
            original = %original,
            rounded_units = %rounded,
            "Quantization unit conversion failed"
        );
        SettlementRoundingError::NonIntegral
    })
}

fn bound_diagnostics(
    adjustment_count: i128,
    member_count: usize,
    epsilon_units: i128,
) -> (i128, i128, bool, bool) {
    let theoretical_upper_bound = (member_count / 2) as i128;
    let operational_upper_bound = theoretical_upper_bound + epsilon_units;
    (
        theoretical_upper_bound,
        operational_upper_bound,
        adjustment_count > theoretical_upper_bound,
        adjustment_count > operational_upper_bound,
    )
}
