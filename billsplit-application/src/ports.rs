use crate::error::{SinkError, SourceError};
use billsplit_domain::{
    EventLedger, EventSettlement,
    model::{EventId, MemberId},
};
use std::collections::HashMap;

/// Read side of the backend: one event's members, bills and shares.
pub trait LedgerSource: Send + Sync {
    fn fetch_ledger(&self, event_id: EventId) -> Result<EventLedger, SourceError>;
}

/// Write side of the backend: replaces the stored settlements of an event.
pub trait SettlementSink: Send + Sync {
    fn store(&self, settlement: &EventSettlement) -> Result<(), SinkError>;
}

pub trait MemberDirectory: Send + Sync {
    fn display_name(&self, member_id: MemberId) -> Option<&str>;
}

impl MemberDirectory for HashMap<MemberId, String> {
    fn display_name(&self, member_id: MemberId) -> Option<&str> {
        self.get(&member_id).map(String::as_str)
    }
}

impl MemberDirectory for EventLedger {
    fn display_name(&self, member_id: MemberId) -> Option<&str> {
        self.members()
            .iter()
            .find(|member| member.id == member_id)
            .map(|member| member.display_name.as_str())
    }
}
