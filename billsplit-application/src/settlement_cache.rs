use crate::{error::ServiceError, settlement_service::SettlementService};
use billsplit_domain::{
    EventSettlement,
    model::{BillId, EventId},
};
use dashmap::{DashMap, mapref::entry::Entry};
use std::sync::Arc;

/// A mutation of the source data that makes derived settlements stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerChange {
    BillCreated { event_id: EventId, bill_id: BillId },
    BillUpdated { event_id: EventId, bill_id: BillId },
    BillDeleted { event_id: EventId, bill_id: BillId },
    ParticipantsChanged { event_id: EventId, bill_id: BillId },
    MembersChanged { event_id: EventId },
}

impl LedgerChange {
    pub fn event_id(&self) -> EventId {
        match *self {
            LedgerChange::BillCreated { event_id, .. }
            | LedgerChange::BillUpdated { event_id, .. }
            | LedgerChange::BillDeleted { event_id, .. }
            | LedgerChange::ParticipantsChanged { event_id, .. }
            | LedgerChange::MembersChanged { event_id } => event_id,
        }
    }
}

/// Materialized settlements, one per event.
///
/// # Invariant
/// Entries are only ever produced by the settlement engine and only ever
/// removed by [`SettlementCache::apply`] or [`SettlementCache::invalidate`];
/// there is no way to edit a cached balance or transfer in place.
///
/// An event with computations in flight carries a generation counter that
/// every invalidation bumps. A computation that started before an
/// invalidation does not overwrite the newer state: the generation check and
/// the insert happen under the same generation lock that `invalidate` holds
/// while removing. Lock order is always generations, then entries.
#[derive(Clone, Default)]
pub struct SettlementCache {
    entries: Arc<DashMap<EventId, Arc<EventSettlement>>>,
    generations: Arc<DashMap<EventId, Generation>>,
}

#[derive(Debug, Default)]
struct Generation {
    value: u64,
    in_flight: usize,
}

impl SettlementCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, event_id: EventId) -> Option<Arc<EventSettlement>> {
        self.entries
            .get(&event_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn get_or_compute(
        &self,
        event_id: EventId,
        service: &SettlementService<'_>,
    ) -> Result<Arc<EventSettlement>, ServiceError> {
        if let Some(hit) = self.get(event_id) {
            return Ok(hit);
        }

        let generation = self.begin_computation(event_id);
        let computed = service.compute(event_id).map(Arc::new);
        self.finish_computation(event_id, generation, computed.as_ref().ok());

        let computed = computed?;
        tracing::info!(
            event_id = event_id.0,
            settlements = computed.settlements.len(),
            "Recomputed event settlement"
        );
        Ok(computed)
    }

    /// Drops the cached settlement of the event touched by `change`.
    ///
    /// Returns whether an entry was removed.
    pub fn apply(&self, change: LedgerChange) -> bool {
        let removed = self.invalidate(change.event_id());
        tracing::debug!(?change, removed, "Applied ledger change to settlement cache");
        removed
    }

    pub fn invalidate(&self, event_id: EventId) -> bool {
        let mut generation = self.generations.get_mut(&event_id);
        if let Some(generation) = generation.as_mut() {
            generation.value += 1;
        }
        self.entries.remove(&event_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn begin_computation(&self, event_id: EventId) -> u64 {
        let mut generation = self.generations.entry(event_id).or_default();
        generation.in_flight += 1;
        generation.value
    }

    fn finish_computation(
        &self,
        event_id: EventId,
        started_at: u64,
        computed: Option<&Arc<EventSettlement>>,
    ) {
        let Entry::Occupied(mut generation) = self.generations.entry(event_id) else {
            return;
        };

        if let Some(computed) = computed {
            if generation.get().value == started_at {
                self.entries.insert(event_id, Arc::clone(computed));
            } else {
                tracing::debug!(
                    event_id = event_id.0,
                    "Ledger changed during computation; result not cached"
                );
            }
        }

        generation.get_mut().in_flight -= 1;
        if generation.get().in_flight == 0 {
            generation.remove();
        }
    }
}
