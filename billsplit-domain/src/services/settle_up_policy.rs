use std::cmp::Reverse;

use fxhash::FxHashSet;
use rust_decimal::Decimal;

use crate::model::{MemberBalances, MemberId, Money, SettlementOutcome, Transfer};

/// Clears the balances of a chosen subset of members.
///
/// Each listed member is matched against counterparties of the opposite
/// sign: other listed members first, then everyone else, largest absolute
/// balance first and smaller member id on ties. Balances of members that
/// were not listed are adjusted but not necessarily cleared.
pub struct SettleUpPolicy;

impl SettleUpPolicy {
    pub fn settle<I>(
        mut balances: MemberBalances,
        all_members: I,
        settle_members: &[MemberId],
    ) -> SettlementOutcome
    where
        I: IntoIterator<Item = MemberId>,
    {
        for member in all_members {
            balances.entry(member).or_insert(Money::zero());
        }

        let settle_lookup: FxHashSet<MemberId> = settle_members.iter().copied().collect();
        let mut transfers = Vec::new();

        for &member in settle_members {
            let balance = match balances.get(&member).copied() {
                Some(b) if !b.is_zero() => b,
                _ => continue,
            };
            let sign = balance.signum();
            let mut remaining = balance.abs();

            for other in counterparties(&balances, member, sign, &settle_lookup) {
                let Some(other_balance) = balances.get_mut(&other) else {
                    continue;
                };
                let amount = remaining.min(other_balance.abs());
                if amount.is_zero() {
                    continue;
                }

                *other_balance += amount * Decimal::from(sign);
                remaining -= amount;
                transfers.push(if sign > 0 {
                    Transfer {
                        from: other,
                        to: member,
                        amount,
                    }
                } else {
                    Transfer {
                        from: member,
                        to: other,
                        amount,
                    }
                });

                if remaining.is_zero() {
                    break;
                }
            }

            if !remaining.is_zero() {
                tracing::warn!(
                    member_id = member.0,
                    remaining = %remaining,
                    "Settle-up could not fully clear member balance"
                );
            }
            if let Some(member_balance) = balances.get_mut(&member) {
                *member_balance = remaining * Decimal::from(sign);
            }
        }

        SettlementOutcome {
            new_balances: balances,
            transfers,
        }
    }
}

fn counterparties(
    balances: &MemberBalances,
    member: MemberId,
    sign: i64,
    settle_lookup: &FxHashSet<MemberId>,
) -> Vec<MemberId> {
    let mut candidates: Vec<(bool, Money, MemberId)> = balances
        .iter()
        .filter(|(other, balance)| **other != member && balance.signum() == -sign)
        .map(|(other, balance)| (settle_lookup.contains(other), balance.abs(), *other))
        .collect();
    candidates.sort_by_key(|(listed, amount, id)| (Reverse(*listed), Reverse(*amount), *id));
    candidates.into_iter().map(|(_, _, id)| id).collect()
}
