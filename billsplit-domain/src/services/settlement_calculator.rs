use std::{cmp::Reverse, collections::BinaryHeap};

use crate::model::{MemberBalances, MemberId, Money, Transfer};

/// Greedy largest-creditor / largest-debtor matching.
pub struct SettlementCalculator;

impl SettlementCalculator {
    /// Produces transfers that clear every balance.
    ///
    /// The largest creditor is repeatedly paired with the largest debtor and
    /// `min(credit, debt)` moves from the debtor to the creditor. Ties on
    /// amount go to the smaller member id. Balances are expected to sum to
    /// zero; whatever cannot be matched is left out and logged.
    pub fn calculate(&self, balances: &MemberBalances) -> Vec<Transfer> {
        let mut creditors: BinaryHeap<(Money, Reverse<MemberId>)> = BinaryHeap::new();
        let mut debtors: BinaryHeap<(Money, Reverse<MemberId>)> = BinaryHeap::new();
        for (&member, &balance) in balances {
            if balance.is_positive() {
                creditors.push((balance, Reverse(member)));
            } else if balance.is_negative() {
                debtors.push((balance.abs(), Reverse(member)));
            }
        }

        let mut transfers = Vec::with_capacity(creditors.len() + debtors.len());
        while let (Some((credit, Reverse(creditor))), Some((debt, Reverse(debtor)))) =
            (creditors.pop(), debtors.pop())
        {
            let amount = credit.min(debt);
            transfers.push(Transfer {
                from: debtor,
                to: creditor,
                amount,
            });

            let credit_left = credit - amount;
            if credit_left.is_positive() {
                creditors.push((credit_left, Reverse(creditor)));
            }
            let debt_left = debt - amount;
            if debt_left.is_positive() {
                debtors.push((debt_left, Reverse(debtor)));
            }
        }

        if !creditors.is_empty() || !debtors.is_empty() {
            let unmatched_credit: Money = creditors.iter().map(|(amount, _)| *amount).sum();
            let unmatched_debt: Money = debtors.iter().map(|(amount, _)| *amount).sum();
            tracing::warn!(
                unmatched_credit = %unmatched_credit,
                unmatched_debt = %unmatched_debt,
                "Balances do not sum to zero; residue left unsettled"
            );
        }

        transfers
    }
}
