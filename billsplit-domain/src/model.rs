use std::{
    collections::BTreeMap,
    fmt,
    iter::Sum,
    ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign},
};

use chrono::{DateTime, Utc};
use fxhash::FxHashSet;
use indexmap::IndexMap;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::{error::ValidationError, services::RoundingMode};

const MAX_DECIMAL_SCALE: u32 = 28;

macro_rules! id_newtype {
    ($($name:ident),* $(,)?) => {
        $(
            #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
            pub struct $name(pub u64);

            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )*
    };
}

id_newtype!(MemberId, EventId, BillId, TeamId);

/// Exact decimal currency amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

/// Which shares receive the leftover atomic units of an uneven split.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RemainderPolicy {
    FrontLoad,
    BackLoad,
}

impl Money {
    pub const ZERO: Self = Self(Decimal::ZERO);

    pub fn zero() -> Self {
        Self::ZERO
    }

    pub fn new(num: i64, scale: u32) -> Self {
        Self(Decimal::new(num, scale.min(MAX_DECIMAL_SCALE)))
    }

    pub fn from_i64(value: i64) -> Self {
        Self(Decimal::from(value))
    }

    pub fn from_decimal(value: Decimal) -> Self {
        Self(value)
    }

    pub fn as_decimal(self) -> Decimal {
        self.0
    }

    pub fn abs(self) -> Self {
        Self(self.0.abs())
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    pub fn is_positive(self) -> bool {
        self.signum() > 0
    }

    pub fn is_negative(self) -> bool {
        self.signum() < 0
    }

    pub fn signum(self) -> i64 {
        match self.0.cmp(&Decimal::ZERO) {
            std::cmp::Ordering::Greater => 1,
            std::cmp::Ordering::Less => -1,
            std::cmp::Ordering::Equal => 0,
        }
    }

    /// True when the amount carries more significant decimal places than `scale`.
    pub fn exceeds_scale(self, scale: u32) -> bool {
        self.0.normalize().scale() > scale
    }

    pub fn checked_add(self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }

    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        self.0.checked_sub(rhs.0).map(Self)
    }

    /// Sum of `amounts`, or `None` when it does not fit a `Decimal`.
    pub fn checked_sum<I: IntoIterator<Item = Money>>(amounts: I) -> Option<Self> {
        amounts
            .into_iter()
            .try_fold(Money::ZERO, |total, amount| total.checked_add(amount))
    }

    /// Largest accepted sum of all bill amounts of one event.
    ///
    /// Balances, derived should-pay totals and settle-up bookkeeping stay
    /// within a small multiple of this sum, so plain arithmetic on them
    /// cannot overflow.
    pub fn max_event_total() -> Self {
        Self(Decimal::MAX / Decimal::from(4))
    }

    pub fn round_dp(self, scale: u32, mode: RoundingMode) -> Self {
        Self(
            self.0
                .round_dp_with_strategy(scale.min(MAX_DECIMAL_SCALE), mode.strategy()),
        )
    }

    /// Splits the amount into `parts` shares of whole atomic units.
    ///
    /// Shares always sum to the original amount. Units left over by integer
    /// division are handed out one per share in `policy` order; any residue
    /// finer than the atomic unit lands on the first share in that order.
    pub fn split_even(self, parts: usize, policy: RemainderPolicy, scale: u32) -> Vec<Money> {
        if parts == 0 {
            return Vec::new();
        }

        let scale = scale.min(MAX_DECIMAL_SCALE);
        let count = Decimal::from(parts as u64);
        let base = (self.0 / count).round_dp_with_strategy(scale, RoundingStrategy::ToZero);
        let mut shares = vec![Money(base); parts];
        let mut remainder = self.0 - base * count;

        let order: Vec<usize> = match policy {
            RemainderPolicy::FrontLoad => (0..parts).collect(),
            RemainderPolicy::BackLoad => (0..parts).rev().collect(),
        };

        let unit = if self.0.is_sign_negative() {
            -Decimal::new(1, scale)
        } else {
            Decimal::new(1, scale)
        };
        for &idx in &order {
            if remainder.abs() < unit.abs() {
                break;
            }
            shares[idx].0 += unit;
            remainder -= unit;
        }
        if !remainder.is_zero() {
            shares[order[0]].0 += remainder;
        }

        shares
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 -= rhs.0;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self::Output {
        Self(-self.0)
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rhs: Decimal) -> Self::Output {
        Self(self.0 * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

/// Net balance per member; positive means the member is owed money.
pub type MemberBalances = BTreeMap<MemberId, Money>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Member {
    pub id: MemberId,
    pub display_name: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: EventId,
    pub name: String,
    pub team_id: Option<TeamId>,
    pub key_payer: Option<MemberId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bill {
    pub id: BillId,
    pub event_id: EventId,
    pub name: String,
    pub amount: Money,
    pub payer: MemberId,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BillParticipant {
    pub bill_id: BillId,
    pub member_id: MemberId,
    pub share_amount: Money,
}

/// Derived per-member position within one event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EventBalance {
    pub event_id: EventId,
    pub member_id: MemberId,
    pub paid: Money,
    pub should_pay: Money,
    pub balance: Money,
}

impl EventBalance {
    /// Books a transfer against this position so that `balance == paid - should_pay` still holds.
    pub fn apply_transfer(&mut self, transfer: &Transfer) {
        if transfer.from == self.member_id {
            self.paid += transfer.amount;
        }
        if transfer.to == self.member_id {
            self.should_pay += transfer.amount;
        }
        self.balance = self.paid - self.should_pay;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transfer {
    pub from: MemberId,
    pub to: MemberId,
    pub amount: Money,
}

/// A recommended money transfer between two members of an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Settlement {
    pub event_id: EventId,
    pub from_member: MemberId,
    pub to_member: MemberId,
    pub amount: Money,
}

impl Settlement {
    pub fn from_transfer(event_id: EventId, transfer: Transfer) -> Self {
        Self {
            event_id,
            from_member: transfer.from,
            to_member: transfer.to,
            amount: transfer.amount,
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct SettlementOutcome {
    pub new_balances: MemberBalances,
    pub transfers: Vec<Transfer>,
}

/// Computed view of one event: balances plus the transfers that clear them.
#[derive(Clone, Debug, PartialEq)]
pub struct EventSettlement {
    pub event_id: EventId,
    pub balances: Vec<EventBalance>,
    pub settlements: Vec<Settlement>,
}

/// Validated bills, shares and members of a single event.
#[derive(Clone, Debug)]
pub struct EventLedger {
    event: Event,
    members: Vec<Member>,
    bills: Vec<Bill>,
    shares: IndexMap<BillId, Vec<BillParticipant>>,
}

impl EventLedger {
    pub fn try_new(
        event: Event,
        members: Vec<Member>,
        bills: Vec<Bill>,
        participants: Vec<BillParticipant>,
    ) -> Result<Self, ValidationError> {
        let mut member_ids = FxHashSet::default();
        for member in &members {
            if !member_ids.insert(member.id) {
                return Err(ValidationError::DuplicateMember { member: member.id });
            }
        }

        if let Some(key_payer) = event.key_payer
            && !member_ids.contains(&key_payer)
        {
            return Err(ValidationError::UnknownKeyPayer { member: key_payer });
        }

        let mut shares: IndexMap<BillId, Vec<BillParticipant>> =
            IndexMap::with_capacity(bills.len());
        let max_total = Money::max_event_total();
        let mut event_total = Money::ZERO;
        for bill in &bills {
            if bill.event_id != event.id {
                return Err(ValidationError::ForeignBill {
                    bill: bill.id,
                    event: bill.event_id,
                });
            }
            if !bill.amount.is_positive() {
                return Err(ValidationError::NonPositiveBillAmount {
                    bill: bill.id,
                    amount: bill.amount,
                });
            }
            event_total = event_total
                .checked_add(bill.amount)
                .filter(|total| *total <= max_total)
                .ok_or(ValidationError::AmountOverflow { bill: bill.id })?;
            if !member_ids.contains(&bill.payer) {
                return Err(ValidationError::UnknownPayer {
                    bill: bill.id,
                    member: bill.payer,
                });
            }
            if shares.insert(bill.id, Vec::new()).is_some() {
                return Err(ValidationError::DuplicateBill { bill: bill.id });
            }
        }

        for participant in participants {
            let Some(bill_shares) = shares.get_mut(&participant.bill_id) else {
                return Err(ValidationError::UnknownBill {
                    bill: participant.bill_id,
                });
            };
            if !member_ids.contains(&participant.member_id) {
                return Err(ValidationError::UnknownMember {
                    bill: participant.bill_id,
                    member: participant.member_id,
                });
            }
            if participant.share_amount.is_negative() {
                return Err(ValidationError::NegativeShare {
                    bill: participant.bill_id,
                    member: participant.member_id,
                    amount: participant.share_amount,
                });
            }
            if bill_shares
                .iter()
                .any(|existing| existing.member_id == participant.member_id)
            {
                return Err(ValidationError::DuplicateParticipant {
                    bill: participant.bill_id,
                    member: participant.member_id,
                });
            }
            bill_shares.push(participant);
        }

        for (bill, list) in &shares {
            if list.is_empty() {
                return Err(ValidationError::BillWithoutParticipants { bill: *bill });
            }
            if Money::checked_sum(list.iter().map(|p| p.share_amount)).is_none() {
                return Err(ValidationError::AmountOverflow { bill: *bill });
            }
        }

        Ok(Self {
            event,
            members,
            bills,
            shares,
        })
    }

    pub fn event(&self) -> &Event {
        &self.event
    }

    pub fn event_id(&self) -> EventId {
        self.event.id
    }

    pub fn members(&self) -> &[Member] {
        &self.members
    }

    pub fn member_ids(&self) -> impl Iterator<Item = MemberId> + '_ {
        self.members.iter().map(|member| member.id)
    }

    pub fn contains_member(&self, member: MemberId) -> bool {
        self.members.iter().any(|m| m.id == member)
    }

    pub fn bills(&self) -> &[Bill] {
        &self.bills
    }

    pub fn participants_of(&self, bill: BillId) -> &[BillParticipant] {
        self.shares.get(&bill).map(Vec::as_slice).unwrap_or_default()
    }

    /// Bills in input order paired with their participant shares.
    pub fn bills_with_shares(&self) -> impl Iterator<Item = (&Bill, &[BillParticipant])> + '_ {
        self.bills
            .iter()
            .map(|bill| (bill, self.participants_of(bill.id)))
    }
}

/// Paid and owed totals of a single member.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemberTotals {
    pub paid: Money,
    pub should_pay: Money,
}

impl MemberTotals {
    pub fn balance(&self) -> Money {
        self.paid - self.should_pay
    }
}

pub struct BalanceAccumulator {
    totals: BTreeMap<MemberId, MemberTotals>,
}

impl BalanceAccumulator {
    pub fn new() -> Self {
        Self {
            totals: BTreeMap::new(),
        }
    }

    pub fn new_with_members<I>(members: I) -> Self
    where
        I: IntoIterator<Item = MemberId>,
    {
        let totals = members
            .into_iter()
            .map(|member| (member, MemberTotals::default()))
            .collect();
        Self { totals }
    }

    pub fn record_payment(&mut self, payer: MemberId, amount: Money) {
        self.totals.entry(payer).or_default().paid += amount;
    }

    pub fn record_share(&mut self, member: MemberId, amount: Money) {
        self.totals.entry(member).or_default().should_pay += amount;
    }

    pub fn totals(&self) -> &BTreeMap<MemberId, MemberTotals> {
        &self.totals
    }

    pub fn balances(&self) -> MemberBalances {
        self.totals
            .iter()
            .map(|(member, totals)| (*member, totals.balance()))
            .collect()
    }

    pub fn into_totals(self) -> BTreeMap<MemberId, MemberTotals> {
        self.totals
    }
}

impl Default for BalanceAccumulator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::str::FromStr;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).expect("valid decimal")
    }

    fn member(id: u64) -> Member {
        Member {
            id: MemberId(id),
            display_name: format!("member-{id}"),
        }
    }

    fn event() -> Event {
        Event {
            id: EventId(1),
            name: "Trip".to_string(),
            team_id: None,
            key_payer: None,
        }
    }

    fn bill(id: u64, amount: i64, payer: u64) -> Bill {
        Bill {
            id: BillId(id),
            event_id: EventId(1),
            name: format!("bill-{id}"),
            amount: Money::from_i64(amount),
            payer: MemberId(payer),
            created_at: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    fn share(bill: u64, member: u64, amount: i64) -> BillParticipant {
        BillParticipant {
            bill_id: BillId(bill),
            member_id: MemberId(member),
            share_amount: Money::from_i64(amount),
        }
    }

    #[rstest]
    #[case::even(Money::from_i64(90), 3, RemainderPolicy::FrontLoad, 2, &["30", "30", "30"])]
    #[case::front_loaded(Money::from_i64(100), 3, RemainderPolicy::FrontLoad, 2, &["33.34", "33.33", "33.33"])]
    #[case::back_loaded(Money::from_i64(100), 3, RemainderPolicy::BackLoad, 2, &["33.33", "33.33", "33.34"])]
    #[case::whole_units(Money::from_i64(10), 4, RemainderPolicy::FrontLoad, 0, &["3", "3", "2", "2"])]
    #[case::sub_unit_residue(Money::new(1001, 3), 2, RemainderPolicy::FrontLoad, 2, &["0.501", "0.50"])]
    fn split_even_distributes_remainder(
        #[case] amount: Money,
        #[case] parts: usize,
        #[case] policy: RemainderPolicy,
        #[case] scale: u32,
        #[case] expected: &[&str],
    ) {
        let shares = amount.split_even(parts, policy, scale);
        let expected: Vec<Money> = expected
            .iter()
            .map(|value| Money::from_decimal(dec(value)))
            .collect();

        assert_eq!(shares, expected);
        assert_eq!(shares.iter().sum::<Money>(), amount);
    }

    #[rstest]
    #[case::half_up_positive(RoundingMode::HalfUp, "2.345", "2.35")]
    #[case::half_up_negative(RoundingMode::HalfUp, "-2.345", "-2.35")]
    #[case::half_even(RoundingMode::HalfEven, "2.345", "2.34")]
    fn round_dp_follows_mode(
        #[case] mode: RoundingMode,
        #[case] raw: &str,
        #[case] expected: &str,
    ) {
        let rounded = Money::from_decimal(dec(raw)).round_dp(2, mode);
        assert_eq!(rounded, Money::from_decimal(dec(expected)));
    }

    #[test]
    fn split_even_into_zero_parts_is_empty() {
        assert!(
            Money::from_i64(10)
                .split_even(0, RemainderPolicy::FrontLoad, 2)
                .is_empty()
        );
    }

    #[rstest]
    #[case::integral(Money::from_i64(12), 0, false)]
    #[case::trailing_zeros(Money::from_decimal(dec("12.500")), 1, false)]
    #[case::too_fine(Money::from_decimal(dec("12.345")), 2, true)]
    fn exceeds_scale_ignores_trailing_zeros(
        #[case] amount: Money,
        #[case] scale: u32,
        #[case] expected: bool,
    ) {
        assert_eq!(amount.exceeds_scale(scale), expected);
    }

    #[test]
    fn ledger_groups_shares_by_bill_in_input_order() {
        let ledger = EventLedger::try_new(
            event(),
            vec![member(1), member(2)],
            vec![bill(20, 50, 2), bill(10, 30, 1)],
            vec![share(10, 1, 15), share(20, 2, 50), share(10, 2, 15)],
        )
        .expect("valid ledger");

        let order: Vec<BillId> = ledger.bills_with_shares().map(|(b, _)| b.id).collect();
        assert_eq!(order, vec![BillId(20), BillId(10)]);
        assert_eq!(ledger.participants_of(BillId(10)).len(), 2);
        assert!(ledger.participants_of(BillId(99)).is_empty());
    }

    #[rstest]
    #[case::duplicate_member(
        vec![member(1), member(1)],
        vec![],
        vec![],
        ValidationError::DuplicateMember { member: MemberId(1) }
    )]
    #[case::unknown_payer(
        vec![member(1)],
        vec![bill(1, 10, 9)],
        vec![share(1, 1, 10)],
        ValidationError::UnknownPayer { bill: BillId(1), member: MemberId(9) }
    )]
    #[case::non_positive_amount(
        vec![member(1)],
        vec![bill(1, 0, 1)],
        vec![share(1, 1, 0)],
        ValidationError::NonPositiveBillAmount { bill: BillId(1), amount: Money::ZERO }
    )]
    #[case::negative_amount(
        vec![member(1)],
        vec![bill(1, -5, 1)],
        vec![share(1, 1, 0)],
        ValidationError::NonPositiveBillAmount { bill: BillId(1), amount: Money::from_i64(-5) }
    )]
    #[case::duplicate_bill(
        vec![member(1)],
        vec![bill(1, 10, 1), bill(1, 20, 1)],
        vec![share(1, 1, 10)],
        ValidationError::DuplicateBill { bill: BillId(1) }
    )]
    #[case::unknown_bill(
        vec![member(1)],
        vec![bill(1, 10, 1)],
        vec![share(1, 1, 10), share(2, 1, 10)],
        ValidationError::UnknownBill { bill: BillId(2) }
    )]
    #[case::unknown_member(
        vec![member(1)],
        vec![bill(1, 10, 1)],
        vec![share(1, 7, 10)],
        ValidationError::UnknownMember { bill: BillId(1), member: MemberId(7) }
    )]
    #[case::negative_share(
        vec![member(1), member(2)],
        vec![bill(1, 10, 1)],
        vec![share(1, 1, 20), share(1, 2, -10)],
        ValidationError::NegativeShare {
            bill: BillId(1),
            member: MemberId(2),
            amount: Money::from_i64(-10),
        }
    )]
    #[case::duplicate_participant(
        vec![member(1)],
        vec![bill(1, 10, 1)],
        vec![share(1, 1, 5), share(1, 1, 5)],
        ValidationError::DuplicateParticipant { bill: BillId(1), member: MemberId(1) }
    )]
    #[case::no_participants(
        vec![member(1)],
        vec![bill(1, 10, 1)],
        vec![],
        ValidationError::BillWithoutParticipants { bill: BillId(1) }
    )]
    fn ledger_rejects_invalid_input(
        #[case] members: Vec<Member>,
        #[case] bills: Vec<Bill>,
        #[case] participants: Vec<BillParticipant>,
        #[case] expected: ValidationError,
    ) {
        let result = EventLedger::try_new(event(), members, bills, participants);
        assert_eq!(result.err(), Some(expected));
    }

    fn bill_of(id: u64, amount: Decimal) -> Bill {
        Bill {
            amount: Money::from_decimal(amount),
            ..bill(id, 1, 1)
        }
    }

    #[rstest]
    #[case::single_bill_past_limit(
        vec![Decimal::MAX / Decimal::from(2) + Decimal::ONE; 2],
        BillId(1)
    )]
    #[case::sum_past_limit(
        vec![Decimal::MAX / Decimal::from(6); 2],
        BillId(2)
    )]
    fn ledger_rejects_amounts_that_would_overflow(
        #[case] amounts: Vec<Decimal>,
        #[case] expected_bill: BillId,
    ) {
        let bills: Vec<Bill> = amounts
            .iter()
            .enumerate()
            .map(|(idx, amount)| bill_of(idx as u64 + 1, *amount))
            .collect();
        let participants = bills
            .iter()
            .map(|bill| BillParticipant {
                bill_id: bill.id,
                member_id: MemberId(2),
                share_amount: bill.amount,
            })
            .collect();

        let result =
            EventLedger::try_new(event(), vec![member(1), member(2)], bills, participants);
        assert_eq!(
            result.err(),
            Some(ValidationError::AmountOverflow {
                bill: expected_bill
            })
        );
    }

    #[test]
    fn ledger_rejects_share_rows_that_overflow() {
        let huge = Money::from_decimal(Decimal::MAX);

        let result = EventLedger::try_new(
            event(),
            vec![member(1), member(2)],
            vec![bill(1, 10, 1)],
            vec![
                BillParticipant {
                    share_amount: huge,
                    ..share(1, 1, 0)
                },
                BillParticipant {
                    share_amount: huge,
                    ..share(1, 2, 0)
                },
            ],
        );
        assert_eq!(
            result.err(),
            Some(ValidationError::AmountOverflow { bill: BillId(1) })
        );
    }

    #[test]
    fn checked_sum_reports_overflow() {
        let huge = Money::from_decimal(Decimal::MAX);

        assert_eq!(Money::checked_sum([huge, Money::ZERO]), Some(huge));
        assert_eq!(Money::checked_sum([huge, Money::from_i64(1)]), None);
        assert_eq!(
            Money::checked_sum(vec![Money::from_i64(2), Money::new(5, 1)]),
            Some(Money::new(25, 1))
        );
    }

    #[test]
    fn ledger_rejects_bill_from_another_event() {
        let mut foreign = bill(1, 10, 1);
        foreign.event_id = EventId(2);

        let result = EventLedger::try_new(event(), vec![member(1)], vec![foreign], vec![]);
        assert_eq!(
            result.err(),
            Some(ValidationError::ForeignBill {
                bill: BillId(1),
                event: EventId(2),
            })
        );
    }

    #[test]
    fn ledger_rejects_unknown_key_payer() {
        let mut event = event();
        event.key_payer = Some(MemberId(5));

        let result = EventLedger::try_new(event, vec![member(1)], vec![], vec![]);
        assert_eq!(
            result.err(),
            Some(ValidationError::UnknownKeyPayer {
                member: MemberId(5)
            })
        );
    }

    #[test]
    fn accumulator_tracks_paid_and_owed() {
        let mut accumulator = BalanceAccumulator::new_with_members([MemberId(1), MemberId(2)]);
        accumulator.record_payment(MemberId(1), Money::from_i64(100));
        accumulator.record_share(MemberId(1), Money::from_i64(40));
        accumulator.record_share(MemberId(2), Money::from_i64(60));

        let balances = accumulator.balances();
        assert_eq!(balances[&MemberId(1)], Money::from_i64(60));
        assert_eq!(balances[&MemberId(2)], Money::from_i64(-60));
        assert_eq!(balances.values().sum::<Money>(), Money::ZERO);
    }

    #[test]
    fn applying_transfer_keeps_balance_identity() {
        let mut debtor = EventBalance {
            event_id: EventId(1),
            member_id: MemberId(2),
            paid: Money::ZERO,
            should_pay: Money::from_i64(40),
            balance: Money::from_i64(-40),
        };
        let transfer = Transfer {
            from: MemberId(2),
            to: MemberId(1),
            amount: Money::from_i64(40),
        };

        debtor.apply_transfer(&transfer);
        assert_eq!(debtor.paid, Money::from_i64(40));
        assert!(debtor.balance.is_zero());
        assert_eq!(debtor.balance, debtor.paid - debtor.should_pay);
    }
}
