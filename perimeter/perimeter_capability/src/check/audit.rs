use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use perimeter_core::id::ActorName;

use crate::model::InclusionKey;

/// An entry in the audit log
#[derive(Debug, Clone)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    /// Granter named by the capability that was checked
    pub granter: ActorName,

    /// Whether the capability was honoured
    pub permitted: bool,

    /// Why it was not, if it was not
    pub reason: Option<String>,
}

/// Inclusions tracked before the least recently checked one is dropped.
pub const DEFAULT_MAX_INCLUSIONS: usize = 1024;

struct InclusionEntries {
    entries: Vec<AuditEntry>,
    /// Sequence number of the latest record
    last_seen: u64,
}

#[derive(Default)]
struct AuditState {
    inclusions: HashMap<InclusionKey, InclusionEntries>,
    sequence: u64,
}

/// A bounded, thread-safe record of capability re-validations, per inclusion.
///
/// Both the entries kept per inclusion and the number of inclusions are
/// capped; when a new inclusion would exceed the cap, the inclusion checked
/// least recently is forgotten.
pub struct AuditLog {
    state: RwLock<AuditState>,

    max_entries_per_inclusion: usize,

    max_inclusions: usize,
}

impl AuditLog {
    pub fn new(max_entries_per_inclusion: usize) -> Self {
        Self {
            state: RwLock::new(AuditState::default()),
            max_entries_per_inclusion,
            max_inclusions: DEFAULT_MAX_INCLUSIONS,
        }
    }

    pub fn with_max_inclusions(mut self, max_inclusions: usize) -> Self {
        self.max_inclusions = max_inclusions.max(1);
        self
    }

    pub fn record(&self, key: &InclusionKey, granter: &ActorName, reason: Option<String>) {
        let entry = AuditEntry {
            timestamp: Utc::now(),
            granter: granter.clone(),
            permitted: reason.is_none(),
            reason,
        };

        let mut state = self.state.write();
        state.sequence += 1;
        let sequence = state.sequence;

        if !state.inclusions.contains_key(key) && state.inclusions.len() >= self.max_inclusions {
            let oldest = state
                .inclusions
                .iter()
                .min_by_key(|(_, inclusion)| inclusion.last_seen)
                .map(|(stale, _)| stale.clone());
            if let Some(oldest) = oldest {
                state.inclusions.remove(&oldest);
            }
        }

        let inclusion = state
            .inclusions
            .entry(key.clone())
            .or_insert_with(|| InclusionEntries {
                entries: Vec::new(),
                last_seen: sequence,
            });
        inclusion.last_seen = sequence;
        inclusion.entries.push(entry);

        if inclusion.entries.len() > self.max_entries_per_inclusion {
            let excess = inclusion.entries.len() - self.max_entries_per_inclusion;
            inclusion.entries.drain(0..excess);
        }
    }

    pub fn get_entries(&self, key: &InclusionKey) -> Vec<AuditEntry> {
        self.state
            .read()
            .inclusions
            .get(key)
            .map(|inclusion| inclusion.entries.clone())
            .unwrap_or_default()
    }

    /// Number of inclusions with recorded entries.
    pub fn inclusion_count(&self) -> usize {
        self.state.read().inclusions.len()
    }

    pub fn clear(&self) {
        self.state.write().inclusions.clear();
    }

    pub fn max_entries_per_inclusion(&self) -> usize {
        self.max_entries_per_inclusion
    }

    pub fn max_inclusions(&self) -> usize {
        self.max_inclusions
    }
}
