use billsplit_domain::{
    Bill, BillParticipant, EventBalance, EventLedger, EventSettlement, Member, Money, Settlement,
    ValidationError,
    model::{BillId, Event, EventId, MemberId, TeamId},
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// Wire records mirror the REST payloads: camelCase keys, numeric ids and
// decimal amounts that may arrive as JSON numbers or strings.

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: u64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_payer_id: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: u64,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillRecord {
    pub id: u64,
    pub event_id: u64,
    pub name: String,
    pub amount: Decimal,
    pub payer_id: u64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillParticipantRecord {
    pub bill_id: u64,
    pub member_id: u64,
    pub share_amount: Decimal,
}

/// Everything needed to settle one event, as fetched from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerSnapshot {
    pub event: EventRecord,
    pub members: Vec<MemberRecord>,
    #[serde(default)]
    pub bills: Vec<BillRecord>,
    #[serde(default)]
    pub participants: Vec<BillParticipantRecord>,
}

impl LedgerSnapshot {
    pub fn event_id(&self) -> EventId {
        EventId(self.event.id)
    }

    pub fn into_ledger(self) -> Result<EventLedger, ValidationError> {
        let event = Event {
            id: EventId(self.event.id),
            name: self.event.name,
            team_id: self.event.team_id.map(TeamId),
            key_payer: self.event.key_payer_id.map(MemberId),
        };
        let members = self
            .members
            .into_iter()
            .map(|member| Member {
                id: MemberId(member.id),
                display_name: member.display_name,
            })
            .collect();
        let bills = self
            .bills
            .into_iter()
            .map(|bill| Bill {
                id: BillId(bill.id),
                event_id: EventId(bill.event_id),
                name: bill.name,
                amount: Money::from_decimal(bill.amount),
                payer: MemberId(bill.payer_id),
                created_at: bill.created_at,
            })
            .collect();
        let participants = self
            .participants
            .into_iter()
            .map(|participant| BillParticipant {
                bill_id: BillId(participant.bill_id),
                member_id: MemberId(participant.member_id),
                share_amount: Money::from_decimal(participant.share_amount),
            })
            .collect();

        EventLedger::try_new(event, members, bills, participants)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBalanceRecord {
    pub event_id: u64,
    pub member_id: u64,
    pub paid: Decimal,
    pub should_pay: Decimal,
    pub balance: Decimal,
}

impl From<&EventBalance> for EventBalanceRecord {
    fn from(balance: &EventBalance) -> Self {
        Self {
            event_id: balance.event_id.0,
            member_id: balance.member_id.0,
            paid: balance.paid.as_decimal(),
            should_pay: balance.should_pay.as_decimal(),
            balance: balance.balance.as_decimal(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementRecord {
    pub event_id: u64,
    pub from_member_id: u64,
    pub to_member_id: u64,
    pub amount: Decimal,
}

impl From<&Settlement> for SettlementRecord {
    fn from(settlement: &Settlement) -> Self {
        Self {
            event_id: settlement.event_id.0,
            from_member_id: settlement.from_member.0,
            to_member_id: settlement.to_member.0,
            amount: settlement.amount.as_decimal(),
        }
    }
}

/// Output payload: derived balances and the transfers to persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementReport {
    pub event_id: u64,
    pub balances: Vec<EventBalanceRecord>,
    pub settlements: Vec<SettlementRecord>,
}

impl From<&EventSettlement> for SettlementReport {
    fn from(settlement: &EventSettlement) -> Self {
        Self {
            event_id: settlement.event_id.0,
            balances: settlement.balances.iter().map(Into::into).collect(),
            settlements: settlement.settlements.iter().map(Into::into).collect(),
        }
    }
}
