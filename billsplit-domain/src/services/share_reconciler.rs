use crate::{
    error::InvariantViolation,
    model::{Bill, BillParticipant, MemberId, Money},
};

/// What to do with a bill whose shares do not add up to its amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SharePolicy {
    /// Refuse the bill.
    #[default]
    Reject,
    /// The payer's own share absorbs the difference.
    PayerAbsorbs,
    /// Scale every share proportionally to the bill amount.
    Normalize,
}

/// Turns a bill's participant rows into shares that sum exactly to the bill amount.
///
/// Differences up to `tolerance` are treated as rounding residue and always
/// land on the payer; larger ones are handled according to `policy`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ShareReconciler {
    pub policy: SharePolicy,
    pub tolerance: Money,
}

impl Default for ShareReconciler {
    fn default() -> Self {
        Self {
            policy: SharePolicy::default(),
            tolerance: Money::new(1, 2),
        }
    }
}

impl ShareReconciler {
    pub fn new(policy: SharePolicy, tolerance: Money) -> Self {
        Self {
            policy,
            tolerance: tolerance.abs(),
        }
    }

    pub fn reconcile(
        &self,
        bill: &Bill,
        participants: &[BillParticipant],
    ) -> Result<Vec<(MemberId, Money)>, InvariantViolation> {
        let mut shares: Vec<(MemberId, Money)> = participants
            .iter()
            .map(|p| (p.member_id, p.share_amount))
            .collect();
        let overflow = InvariantViolation::ShareOverflow { bill: bill.id };
        let share_total = Money::checked_sum(shares.iter().map(|(_, amount)| *amount))
            .ok_or_else(|| overflow.clone())?;
        let residual = bill.amount.checked_sub(share_total).ok_or(overflow)?;

        if residual.is_zero() {
            return Ok(shares);
        }

        if residual.abs() <= self.tolerance {
            tracing::debug!(
                bill_id = bill.id.0,
                residual = %residual,
                payer = bill.payer.0,
                "Share residue within tolerance assigned to payer"
            );
            assign_to_payer(&mut shares, bill.payer, residual);
            return Ok(shares);
        }

        match self.policy {
            SharePolicy::Reject => {
                tracing::warn!(
                    bill_id = bill.id.0,
                    amount = %bill.amount,
                    share_total = %share_total,
                    "Bill rejected: shares do not sum to amount"
                );
                Err(InvariantViolation::ShareMismatch {
                    bill: bill.id,
                    amount: bill.amount,
                    share_total,
                })
            }
            SharePolicy::PayerAbsorbs => {
                tracing::warn!(
                    bill_id = bill.id.0,
                    residual = %residual,
                    payer = bill.payer.0,
                    "Share mismatch absorbed by payer"
                );
                assign_to_payer(&mut shares, bill.payer, residual);
                Ok(shares)
            }
            SharePolicy::Normalize => {
                let normalized = normalize(bill, &shares, share_total)?;
                tracing::warn!(
                    bill_id = bill.id.0,
                    amount = %bill.amount,
                    share_total = %share_total,
                    "Shares normalized to bill amount"
                );
                Ok(normalized)
            }
        }
    }
}

/// Adds `residual` to the payer's share.
///
/// A negative residual is taken from the payer's own share first, then from
/// the largest remaining shares (input order on ties), so no share drops
/// below zero.
fn assign_to_payer(shares: &mut Vec<(MemberId, Money)>, payer: MemberId, residual: Money) {
    let payer_idx = shares.iter().position(|(member, _)| *member == payer);
    if !residual.is_negative() {
        match payer_idx {
            Some(idx) => shares[idx].1 += residual,
            None => shares.push((payer, residual)),
        }
        return;
    }

    let mut others: Vec<usize> = (0..shares.len())
        .filter(|idx| Some(*idx) != payer_idx)
        .collect();
    others.sort_by(|a, b| shares[*b].1.cmp(&shares[*a].1));

    let mut excess = -residual;
    for idx in payer_idx.into_iter().chain(others) {
        let taken = excess.min(shares[idx].1);
        shares[idx].1 -= taken;
        excess -= taken;
        if excess.is_zero() {
            break;
        }
    }
}

fn normalize(
    bill: &Bill,
    shares: &[(MemberId, Money)],
    share_total: Money,
) -> Result<Vec<(MemberId, Money)>, InvariantViolation> {
    let unnormalizable = InvariantViolation::UnnormalizableShares { bill: bill.id };
    if share_total.is_zero() {
        return Err(unnormalizable);
    }

    let amount = bill.amount.as_decimal();
    let total = share_total.as_decimal();
    let mut normalized = shares
        .iter()
        .map(|(member, share)| {
            share
                .as_decimal()
                .checked_mul(amount)
                .and_then(|scaled| scaled.checked_div(total))
                .map(|value| (*member, Money::from_decimal(value)))
                .ok_or_else(|| unnormalizable.clone())
        })
        .collect::<Result<Vec<_>, _>>()?;

    // Division residue goes to the largest share; the first one wins ties.
    let residue = bill.amount - normalized.iter().map(|(_, amount)| *amount).sum::<Money>();
    if !residue.is_zero() {
        let largest = normalized
            .iter()
            .enumerate()
            .rev()
            .max_by_key(|(_, (_, amount))| *amount)
            .map(|(idx, _)| idx);
        if let Some(idx) = largest {
            normalized[idx].1 += residue;
        }
    }

    Ok(normalized)
}
