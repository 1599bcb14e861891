//! Collaborator boundaries: the show ledger and the cost store.
//!
//! Persistence lives behind these traits; the snapshot path only ever reads
//! flat in-memory records through them.

use std::collections::HashMap;

use crate::records::{CostEntry, EventRecord};

/// Read access to the scheduled-show ledger.
pub trait EventLedger: Send + Sync {
    fn load_events(&self) -> Vec<EventRecord>;
}

/// Read access to ad-hoc cost entries, keyed by show id.
pub trait CostStore: Send + Sync {
    fn costs_for(&self, event_id: &str) -> Vec<CostEntry>;
}

/// In-memory ledger + cost store for tests, demos and offline wiring.
#[derive(Debug, Default, Clone)]
pub struct InMemoryLedger {
    events: Vec<EventRecord>,
    costs: HashMap<String, Vec<CostEntry>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a show with its costs.
    pub fn with_event(mut self, event: EventRecord, costs: Vec<CostEntry>) -> Self {
        self.costs.insert(event.id.clone(), costs);
        self.events.push(event);
        self
    }
}

impl EventLedger for InMemoryLedger {
    fn load_events(&self) -> Vec<EventRecord> {
        self.events.clone()
    }
}

impl CostStore for InMemoryLedger {
    fn costs_for(&self, event_id: &str) -> Vec<CostEntry> {
        self.costs.get(event_id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::EventStatus;
    use chrono::NaiveDate;

    #[test]
    fn in_memory_ledger_round_trips_events_and_costs() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 15).unwrap();
        let ledger = InMemoryLedger::new().with_event(
            EventRecord::new("s1", date, 4500.0, EventStatus::Confirmed),
            vec![CostEntry::new("venue", 1200.0)],
        );

        assert_eq!(ledger.load_events().len(), 1);
        assert_eq!(ledger.costs_for("s1")[0].amount, 1200.0);
        assert!(ledger.costs_for("unknown").is_empty());
    }
}
