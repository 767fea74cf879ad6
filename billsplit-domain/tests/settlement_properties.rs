use std::collections::BTreeMap;

use billsplit_domain::{
    Bill, BillParticipant, EventLedger, InvariantViolation, Member, Money, RemainderPolicy,
    SettlementEngine, SettlementError,
    model::{BillId, Event, EventId, MemberId},
};
use chrono::{DateTime, Utc};
use proptest::prelude::*;
use rust_decimal::Decimal;

fn member(id: u64) -> Member {
    Member {
        id: MemberId(id),
        display_name: format!("member-{id}"),
    }
}

fn event() -> Event {
    Event {
        id: EventId(7),
        name: "Weekend".to_string(),
        team_id: None,
        key_payer: None,
    }
}

fn bill(id: u64, amount: Money, payer: u64) -> Bill {
    Bill {
        id: BillId(id),
        event_id: EventId(7),
        name: format!("bill-{id}"),
        amount,
        payer: MemberId(payer),
        created_at: DateTime::<Utc>::UNIX_EPOCH,
    }
}

fn share(bill: u64, member: u64, amount: Money) -> BillParticipant {
    BillParticipant {
        bill_id: BillId(bill),
        member_id: MemberId(member),
        share_amount: amount,
    }
}

/// How a generated bill is divided between its sharers.
#[derive(Clone, Copy, Debug)]
enum Split {
    /// Whole cents that sum exactly to the bill amount.
    Cents,
    /// `amount / n` at full precision, leaving sub-cent residue for reconciliation
    /// and fractional balances for quantization.
    Fractional,
}

/// Builds a ledger where each bill is split evenly between the members selected by its mask.
fn random_ledger(
    member_count: usize,
    amounts: &[i64],
    payer_indexes: &[usize],
    participant_masks: &[usize],
    split: Split,
) -> EventLedger {
    let members = (1..=member_count as u64).map(member).collect();
    let mut bills = Vec::with_capacity(amounts.len());
    let mut participants = Vec::new();

    for (idx, cents) in amounts.iter().enumerate() {
        let bill_id = idx as u64 + 1;
        let payer = payer_indexes.get(idx).copied().unwrap_or(0) % member_count + 1;
        let mask = participant_masks.get(idx).copied().unwrap_or(0);
        let mut sharers: Vec<u64> = (0..member_count)
            .filter(|bit| mask & (1 << bit) != 0)
            .map(|bit| bit as u64 + 1)
            .collect();
        if sharers.is_empty() {
            sharers.push(payer as u64);
        }

        let amount = Money::new(*cents, 2);
        bills.push(bill(bill_id, amount, payer as u64));
        let splits = match split {
            Split::Cents => amount.split_even(sharers.len(), RemainderPolicy::FrontLoad, 2),
            Split::Fractional => {
                let part = amount.as_decimal() / Decimal::from(sharers.len() as u64);
                vec![Money::from_decimal(part); sharers.len()]
            }
        };
        for (sharer, split) in sharers.into_iter().zip(splits) {
            participants.push(share(bill_id, sharer, split));
        }
    }

    EventLedger::try_new(event(), members, bills, participants).expect("generated ledger is valid")
}

fn ledger_strategy() -> impl Strategy<Value = EventLedger> {
    (
        1usize..=6,
        prop::collection::vec(1i64..=1_000_000, 0..=20),
        prop::collection::vec(0usize..=5, 20),
        prop::collection::vec(0usize..=63, 20),
        prop_oneof![Just(Split::Cents), Just(Split::Fractional)],
    )
        .prop_map(|(member_count, amounts, payers, masks, split)| {
            random_ledger(member_count, &amounts, &payers, &masks, split)
        })
}

fn fractional_ledger_strategy() -> impl Strategy<Value = EventLedger> {
    (
        2usize..=6,
        prop::collection::vec(1i64..=1_000_000, 1..=20),
        prop::collection::vec(0usize..=5, 20),
        prop::collection::vec(0usize..=63, 20),
    )
        .prop_map(|(member_count, amounts, payers, masks)| {
            random_ledger(member_count, &amounts, &payers, &masks, Split::Fractional)
        })
}

proptest! {
    #[test]
    fn balances_sum_to_zero(ledger in ledger_strategy()) {
        let result = SettlementEngine::default().compute(&ledger).expect("settlement failed");

        let total: Money = result.balances.iter().map(|b| b.balance).sum();
        prop_assert!(total.is_zero());
        for row in &result.balances {
            prop_assert_eq!(row.balance, row.paid - row.should_pay);
        }
    }

    #[test]
    fn transfers_clear_every_balance(ledger in ledger_strategy()) {
        let result = SettlementEngine::default().compute(&ledger).expect("settlement failed");

        let mut received: BTreeMap<MemberId, Money> = BTreeMap::new();
        let mut sent: BTreeMap<MemberId, Money> = BTreeMap::new();
        for settlement in &result.settlements {
            prop_assert!(settlement.amount.is_positive());
            prop_assert_ne!(settlement.from_member, settlement.to_member);
            *received.entry(settlement.to_member).or_default() += settlement.amount;
            *sent.entry(settlement.from_member).or_default() += settlement.amount;
        }

        for row in &result.balances {
            let got = received.get(&row.member_id).copied().unwrap_or_default();
            let gave = sent.get(&row.member_id).copied().unwrap_or_default();
            if row.balance.is_positive() {
                prop_assert_eq!(got, row.balance);
                prop_assert!(gave.is_zero());
            } else if row.balance.is_negative() {
                prop_assert_eq!(gave, row.balance.abs());
                prop_assert!(got.is_zero());
            } else {
                prop_assert!(got.is_zero() && gave.is_zero());
            }
        }

        let nonzero = result.balances.iter().filter(|b| !b.balance.is_zero()).count();
        prop_assert!(result.settlements.len() <= nonzero.saturating_sub(1));
    }

    #[test]
    fn fractional_shares_quantize_to_whole_cents(ledger in fractional_ledger_strategy()) {
        let result = SettlementEngine::default().compute(&ledger).expect("settlement failed");

        let total: Money = result.balances.iter().map(|b| b.balance).sum();
        prop_assert!(total.is_zero());
        for row in &result.balances {
            prop_assert!(!row.balance.exceeds_scale(2));
        }
        for settlement in &result.settlements {
            prop_assert!(!settlement.amount.exceeds_scale(2));
        }

        let paid: Money = result.balances.iter().map(|b| b.paid).sum();
        let billed: Money = ledger.bills().iter().map(|b| b.amount).sum();
        prop_assert_eq!(paid, billed);
    }

    #[test]
    fn computation_is_idempotent(ledger in ledger_strategy()) {
        let engine = SettlementEngine::default();
        let first = engine.compute(&ledger).expect("settlement failed");
        let second = engine.compute(&ledger).expect("settlement failed");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn settle_up_zeroes_selected_members(
        ledger in ledger_strategy(),
        settle_mask in 1usize..=63,
    ) {
        let settle_members: Vec<MemberId> = ledger
            .member_ids()
            .enumerate()
            .filter(|(idx, _)| settle_mask & (1 << idx) != 0)
            .map(|(_, id)| id)
            .collect();

        let result = SettlementEngine::default()
            .settle_up(&ledger, &settle_members)
            .expect("settle up failed");

        let total: Money = result.balances.iter().map(|b| b.balance).sum();
        prop_assert!(total.is_zero());
        for row in &result.balances {
            if settle_members.contains(&row.member_id) {
                prop_assert!(row.balance.is_zero());
            }
            prop_assert_eq!(row.balance, row.paid - row.should_pay);
        }
    }
}

#[test]
fn self_paid_bill_nets_to_zero() {
    let ledger = EventLedger::try_new(
        event(),
        vec![member(1), member(2)],
        vec![bill(1, Money::from_i64(250), 1)],
        vec![share(1, 1, Money::from_i64(250))],
    )
    .expect("valid ledger");

    let result = SettlementEngine::default()
        .compute(&ledger)
        .expect("settlement failed");

    assert!(result.balances.iter().all(|b| b.balance.is_zero()));
    assert!(result.settlements.is_empty());
}

#[test]
fn three_member_trip_settles_to_first_payer() {
    let ledger = EventLedger::try_new(
        event(),
        vec![member(1), member(2), member(3)],
        vec![
            bill(1, Money::from_i64(300), 1),
            bill(2, Money::from_i64(90), 2),
        ],
        vec![
            share(1, 1, Money::from_i64(100)),
            share(1, 2, Money::from_i64(100)),
            share(1, 3, Money::from_i64(100)),
            share(2, 1, Money::from_i64(30)),
            share(2, 2, Money::from_i64(30)),
            share(2, 3, Money::from_i64(30)),
        ],
    )
    .expect("valid ledger");

    let result = SettlementEngine::default()
        .compute(&ledger)
        .expect("settlement failed");

    let rows: Vec<(MemberId, Money, Money, Money)> = result
        .balances
        .iter()
        .map(|b| (b.member_id, b.paid, b.should_pay, b.balance))
        .collect();
    assert_eq!(
        rows,
        vec![
            (
                MemberId(1),
                Money::from_i64(300),
                Money::from_i64(130),
                Money::from_i64(170)
            ),
            (
                MemberId(2),
                Money::from_i64(90),
                Money::from_i64(130),
                Money::from_i64(-40)
            ),
            (
                MemberId(3),
                Money::ZERO,
                Money::from_i64(130),
                Money::from_i64(-130)
            ),
        ]
    );

    let transfers: Vec<(MemberId, MemberId, Money)> = result
        .settlements
        .iter()
        .map(|s| (s.from_member, s.to_member, s.amount))
        .collect();
    assert_eq!(
        transfers,
        vec![
            (MemberId(3), MemberId(1), Money::from_i64(130)),
            (MemberId(2), MemberId(1), Money::from_i64(40)),
        ]
    );
}

#[test]
fn shares_short_of_amount_are_rejected() {
    let ledger = EventLedger::try_new(
        event(),
        vec![member(1), member(2)],
        vec![bill(1, Money::from_i64(100), 1)],
        vec![
            share(1, 1, Money::from_i64(45)),
            share(1, 2, Money::from_i64(45)),
        ],
    )
    .expect("valid ledger");

    let result = SettlementEngine::default().compute(&ledger);
    assert_eq!(
        result,
        Err(SettlementError::InvariantViolation(
            InvariantViolation::ShareMismatch {
                bill: BillId(1),
                amount: Money::from_i64(100),
                share_total: Money::from_i64(90),
            }
        ))
    );
}
