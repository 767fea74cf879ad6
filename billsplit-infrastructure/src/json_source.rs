use billsplit_application::{LedgerSnapshot, LedgerSource, SourceError};
use billsplit_domain::{EventLedger, model::EventId};
use serde::Deserialize;
use std::io::Read;

#[derive(Deserialize)]
#[serde(untagged)]
enum SnapshotDocument {
    One(LedgerSnapshot),
    Many(Vec<LedgerSnapshot>),
}

/// Ledger snapshots loaded from a JSON document.
///
/// The document is either a single snapshot object or an array of them.
#[derive(Debug, Clone)]
pub struct JsonLedgerSource {
    snapshots: Vec<LedgerSnapshot>,
}

impl JsonLedgerSource {
    pub fn from_json_str(json: &str) -> Result<Self, SourceError> {
        let document = serde_json::from_str(json).map_err(malformed)?;
        Ok(Self::from_document(document))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        let document = serde_json::from_reader(reader).map_err(malformed)?;
        Ok(Self::from_document(document))
    }

    fn from_document(document: SnapshotDocument) -> Self {
        let snapshots = match document {
            SnapshotDocument::One(snapshot) => vec![snapshot],
            SnapshotDocument::Many(snapshots) => snapshots,
        };
        Self { snapshots }
    }

    pub fn event_ids(&self) -> impl Iterator<Item = EventId> + '_ {
        self.snapshots.iter().map(LedgerSnapshot::event_id)
    }
}

fn malformed(err: serde_json::Error) -> SourceError {
    tracing::warn!(error = %err, reject_reason = "malformed_json", "Rejected ledger snapshot");
    SourceError::Malformed(err.to_string())
}

impl LedgerSource for JsonLedgerSource {
    fn fetch_ledger(&self, event_id: EventId) -> Result<EventLedger, SourceError> {
        let snapshot = self
            .snapshots
            .iter()
            .find(|snapshot| snapshot.event_id() == event_id)
            .ok_or(SourceError::EventNotFound(event_id))?;
        Ok(snapshot.clone().into_ledger()?)
    }
}
