use billsplit_application::{
    BillParticipantRecord, BillRecord, LedgerChange, LedgerSnapshot, LedgerSource, MemberRecord,
    SettlementRecord, SettlementSink, SinkError, SourceError,
};
use billsplit_domain::{
    EventLedger, EventSettlement, ValidationError,
    model::{BillId, EventId},
};
use dashmap::DashMap;
use std::sync::Arc;

/// Concurrent in-memory stand-in for the REST backend.
///
/// Every mutation returns the [`LedgerChange`] it caused so callers can
/// invalidate derived settlements.
#[derive(Clone, Default)]
pub struct InMemoryLedgerStore {
    ledgers: Arc<DashMap<EventId, LedgerSnapshot>>,
    settlements: Arc<DashMap<EventId, Vec<SettlementRecord>>>,
}

impl InMemoryLedgerStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces everything known about the snapshot's event.
    pub fn put_snapshot(&self, snapshot: LedgerSnapshot) -> LedgerChange {
        let event_id = snapshot.event_id();
        self.ledgers.insert(event_id, snapshot);
        LedgerChange::MembersChanged { event_id }
    }

    pub fn upsert_member(
        &self,
        event_id: EventId,
        member: MemberRecord,
    ) -> Result<LedgerChange, SourceError> {
        let mut ledger = self.ledger_mut(event_id)?;
        match ledger.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => *existing = member,
            None => ledger.members.push(member),
        }
        Ok(LedgerChange::MembersChanged { event_id })
    }

    pub fn create_bill(
        &self,
        bill: BillRecord,
        participants: Vec<BillParticipantRecord>,
    ) -> Result<LedgerChange, SourceError> {
        let event_id = EventId(bill.event_id);
        let bill_id = BillId(bill.id);
        let mut ledger = self.ledger_mut(event_id)?;
        if ledger.bills.iter().any(|b| b.id == bill.id) {
            return Err(ValidationError::DuplicateBill { bill: bill_id }.into());
        }
        ledger.bills.push(bill);
        ledger.participants.extend(participants);
        Ok(LedgerChange::BillCreated { event_id, bill_id })
    }

    pub fn update_bill(&self, bill: BillRecord) -> Result<LedgerChange, SourceError> {
        let event_id = EventId(bill.event_id);
        let bill_id = BillId(bill.id);
        let mut ledger = self.ledger_mut(event_id)?;
        let existing = ledger
            .bills
            .iter_mut()
            .find(|b| b.id == bill.id)
            .ok_or(ValidationError::UnknownBill { bill: bill_id })?;
        *existing = bill;
        Ok(LedgerChange::BillUpdated { event_id, bill_id })
    }

    /// Removes the bill together with its participant rows.
    pub fn delete_bill(
        &self,
        event_id: EventId,
        bill_id: BillId,
    ) -> Result<LedgerChange, SourceError> {
        let mut ledger = self.ledger_mut(event_id)?;
        let before = ledger.bills.len();
        ledger.bills.retain(|b| b.id != bill_id.0);
        if ledger.bills.len() == before {
            return Err(ValidationError::UnknownBill { bill: bill_id }.into());
        }
        ledger.participants.retain(|p| p.bill_id != bill_id.0);
        Ok(LedgerChange::BillDeleted { event_id, bill_id })
    }

    pub fn replace_participants(
        &self,
        event_id: EventId,
        bill_id: BillId,
        participants: Vec<BillParticipantRecord>,
    ) -> Result<LedgerChange, SourceError> {
        let mut ledger = self.ledger_mut(event_id)?;
        if !ledger.bills.iter().any(|b| b.id == bill_id.0) {
            return Err(ValidationError::UnknownBill { bill: bill_id }.into());
        }
        ledger.participants.retain(|p| p.bill_id != bill_id.0);
        ledger.participants.extend(participants);
        Ok(LedgerChange::ParticipantsChanged { event_id, bill_id })
    }

    /// Settlements last handed to the store for `event_id`.
    pub fn stored_settlements(&self, event_id: EventId) -> Vec<SettlementRecord> {
        self.settlements
            .get(&event_id)
            .map(|records| records.clone())
            .unwrap_or_default()
    }

    fn ledger_mut(
        &self,
        event_id: EventId,
    ) -> Result<dashmap::mapref::one::RefMut<'_, EventId, LedgerSnapshot>, SourceError> {
        self.ledgers
            .get_mut(&event_id)
            .ok_or(SourceError::EventNotFound(event_id))
    }
}

impl LedgerSource for InMemoryLedgerStore {
    fn fetch_ledger(&self, event_id: EventId) -> Result<EventLedger, SourceError> {
        // Clone out of the map so validation runs without holding the shard lock.
        let snapshot = self
            .ledgers
            .get(&event_id)
            .map(|entry| entry.value().clone())
            .ok_or(SourceError::EventNotFound(event_id))?;
        Ok(snapshot.into_ledger()?)
    }
}

impl SettlementSink for InMemoryLedgerStore {
    fn store(&self, settlement: &EventSettlement) -> Result<(), SinkError> {
        if !self.ledgers.contains_key(&settlement.event_id) {
            return Err(SinkError::Rejected {
                event: settlement.event_id,
                reason: "unknown event".to_string(),
            });
        }
        let records = settlement
            .settlements
            .iter()
            .map(SettlementRecord::from)
            .collect();
        self.settlements.insert(settlement.event_id, records);
        Ok(())
    }
}
