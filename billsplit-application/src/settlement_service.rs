use crate::{
    error::ServiceError,
    ports::{LedgerSource, SettlementSink},
};
use billsplit_domain::{
    EventSettlement, SettlementEngine,
    model::{EventId, MemberId},
};

/// Fetches an event's ledger and runs the settlement engine over it.
#[derive(Clone, Copy)]
pub struct SettlementService<'a> {
    source: &'a dyn LedgerSource,
    engine: SettlementEngine,
}

impl<'a> SettlementService<'a> {
    pub fn new(source: &'a dyn LedgerSource, engine: SettlementEngine) -> Self {
        Self { source, engine }
    }

    pub fn engine(&self) -> SettlementEngine {
        self.engine
    }

    pub fn compute(&self, event_id: EventId) -> Result<EventSettlement, ServiceError> {
        let ledger = self.source.fetch_ledger(event_id)?;
        self.engine.compute(&ledger).map_err(|err| {
            tracing::warn!(
                event_id = event_id.0,
                error = %err,
                reject_reason = "settlement_failed",
                "Settlement computation rejected"
            );
            err.into()
        })
    }

    /// Computes the settlement and hands it to `sink`; nothing is stored on failure.
    pub fn compute_and_store(
        &self,
        event_id: EventId,
        sink: &dyn SettlementSink,
    ) -> Result<EventSettlement, ServiceError> {
        let settlement = self.compute(event_id)?;
        sink.store(&settlement)?;
        tracing::info!(
            event_id = event_id.0,
            settlements = settlement.settlements.len(),
            "Stored settlements"
        );
        Ok(settlement)
    }

    pub fn settle_up(
        &self,
        event_id: EventId,
        settle_members: &[MemberId],
    ) -> Result<EventSettlement, ServiceError> {
        let ledger = self.source.fetch_ledger(event_id)?;
        Ok(self.engine.settle_up(&ledger, settle_members)?)
    }
}
