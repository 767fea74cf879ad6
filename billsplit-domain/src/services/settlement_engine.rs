use crate::{
    error::{SettlementError, ValidationError},
    model::{
        BalanceAccumulator, EventBalance, EventLedger, EventSettlement, MemberBalances, MemberId,
        Money, Settlement,
    },
    services::{
        SettleUpPolicy, SettlementCalculator, SettlementContext, ShareReconciler,
        quantize_balances_with_preferred_members,
    },
};

/// Pure function from an event's bills and shares to balances and transfers.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SettlementEngine {
    pub context: SettlementContext,
    pub reconciler: ShareReconciler,
}

struct ComputedBalances {
    rows: Vec<EventBalance>,
    quantized: MemberBalances,
}

impl SettlementEngine {
    pub fn new(context: SettlementContext, reconciler: ShareReconciler) -> Self {
        Self {
            context,
            reconciler,
        }
    }

    /// Per-member balances of the event, ordered by member id.
    pub fn compute_balances(
        &self,
        ledger: &EventLedger,
    ) -> Result<Vec<EventBalance>, SettlementError> {
        self.balances(ledger).map(|computed| computed.rows)
    }

    /// Balances plus the greedy transfers that clear them.
    pub fn compute(&self, ledger: &EventLedger) -> Result<EventSettlement, SettlementError> {
        let ComputedBalances { rows, quantized } = self.balances(ledger)?;
        let event_id = ledger.event_id();

        let settlements: Vec<Settlement> = SettlementCalculator
            .calculate(&quantized)
            .into_iter()
            .map(|transfer| Settlement::from_transfer(event_id, transfer))
            .collect();

        tracing::debug!(
            event_id = event_id.0,
            members = rows.len(),
            bills = ledger.bills().len(),
            settlements = settlements.len(),
            "Computed event settlement"
        );

        Ok(EventSettlement {
            event_id,
            balances: rows,
            settlements,
        })
    }

    /// Clears only the listed members; the returned balances reflect the transfers.
    pub fn settle_up(
        &self,
        ledger: &EventLedger,
        settle_members: &[MemberId],
    ) -> Result<EventSettlement, SettlementError> {
        if let Some(member) = settle_members
            .iter()
            .find(|member| !ledger.contains_member(**member))
        {
            return Err(ValidationError::UnknownSettleMember { member: *member }.into());
        }

        let ComputedBalances {
            mut rows,
            quantized,
        } = self.balances(ledger)?;
        let event_id = ledger.event_id();
        let outcome = SettleUpPolicy::settle(quantized, ledger.member_ids(), settle_members);

        for transfer in &outcome.transfers {
            for row in rows
                .iter_mut()
                .filter(|row| row.member_id == transfer.from || row.member_id == transfer.to)
            {
                row.apply_transfer(transfer);
            }
        }
        debug_assert!(rows.iter().all(|row| {
            outcome
                .new_balances
                .get(&row.member_id)
                .is_none_or(|balance| *balance == row.balance)
        }));

        tracing::debug!(
            event_id = event_id.0,
            settle_members = ?settle_members,
            transfers = outcome.transfers.len(),
            "Settled up members"
        );

        Ok(EventSettlement {
            event_id,
            balances: rows,
            settlements: outcome
                .transfers
                .into_iter()
                .map(|transfer| Settlement::from_transfer(event_id, transfer))
                .collect(),
        })
    }

    fn balances(&self, ledger: &EventLedger) -> Result<ComputedBalances, SettlementError> {
        self.context.validate()?;
        let scale = self.context.scale;

        let mut accumulator = BalanceAccumulator::new_with_members(ledger.member_ids());
        for (bill, participants) in ledger.bills_with_shares() {
            if bill.amount.exceeds_scale(scale) {
                return Err(ValidationError::ExcessPrecision {
                    bill: bill.id,
                    amount: bill.amount,
                    scale,
                }
                .into());
            }

            let shares = self.reconciler.reconcile(bill, participants)?;
            accumulator.record_payment(bill.payer, bill.amount);
            for (member, share) in shares {
                accumulator.record_share(member, share);
            }
        }

        let raw = accumulator.balances();
        let preferred: Vec<MemberId> = ledger.event().key_payer.into_iter().collect();
        let quantized = quantize_balances_with_preferred_members(&raw, self.context, &preferred)?;

        let rows = accumulator
            .into_totals()
            .into_iter()
            .map(|(member_id, totals)| {
                let balance = quantized.get(&member_id).copied().unwrap_or(Money::ZERO);
                EventBalance {
                    event_id: ledger.event_id(),
                    member_id,
                    paid: totals.paid,
                    should_pay: totals.paid - balance,
                    balance,
                }
            })
            .collect();

        Ok(ComputedBalances { rows, quantized })
    }
}
