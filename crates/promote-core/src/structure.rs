use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::PromoteError;
use crate::types::Percent;
use crate::PromoteResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A single tier of a promote structure.
///
/// `tier_order` is display-only; the calculation sorts tiers by `hurdle`
/// ascending (stable, so duplicate hurdles keep their input order).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallTier {
    /// Display position (1-based), not used for calculation ordering
    pub tier_order: u32,
    /// Return hurdle as a whole percentage (8 = 8%)
    pub hurdle: Percent,
    /// GP share of cash flow in this tier, whole percentage
    pub gp_split: Percent,
    /// LP share of cash flow in this tier, whole percentage
    pub lp_split: Percent,
}

/// A named tier list attached to a deal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromoteStructure {
    /// Store-assigned unique id
    pub id: String,
    /// Owning deal
    pub deal_id: String,
    /// User-facing name
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Tiers exactly as supplied at creation (no sort at write time)
    pub tiers: Vec<WaterfallTier>,
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

/// Keyed collection of promote structures, insertion-ordered, with optional
/// JSON-file persistence (the session-durable analog of the dashboard's
/// browser storage).
///
/// Structures are read-mostly configuration; callers needing shared access
/// wrap the store in their own lock.
#[derive(Debug, Serialize, Deserialize)]
pub struct PromoteStructureStore {
    structures: Vec<PromoteStructure>,
    next_id: u64,
}

impl Default for PromoteStructureStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PromoteStructureStore {
    pub fn new() -> Self {
        Self {
            structures: Vec::new(),
            next_id: 1,
        }
    }

    /// Create and store a structure for a deal. The tier list is stored
    /// verbatim; validation happens at calculation time.
    pub fn create(
        &mut self,
        deal_id: &str,
        name: &str,
        tiers: Vec<WaterfallTier>,
    ) -> PromoteResult<PromoteStructure> {
        if deal_id.trim().is_empty() {
            return Err(PromoteError::InvalidInput {
                field: "deal_id".into(),
                reason: "Deal id cannot be empty".into(),
            });
        }
        if name.trim().is_empty() {
            return Err(PromoteError::InvalidInput {
                field: "name".into(),
                reason: "Structure name cannot be empty".into(),
            });
        }

        let structure = PromoteStructure {
            id: format!("ps-{}", self.next_id),
            deal_id: deal_id.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
            tiers,
        };
        self.next_id += 1;
        self.structures.push(structure.clone());
        Ok(structure)
    }

    /// All structures for a deal, in insertion order.
    pub fn list(&self, deal_id: &str) -> Vec<&PromoteStructure> {
        self.structures
            .iter()
            .filter(|s| s.deal_id == deal_id)
            .collect()
    }

    pub fn get(&self, id: &str) -> Option<&PromoteStructure> {
        self.structures.iter().find(|s| s.id == id)
    }

    /// Remove a structure. Results calculated against it earlier are value
    /// objects and remain valid.
    pub fn delete(&mut self, id: &str) -> PromoteResult<PromoteStructure> {
        match self.structures.iter().position(|s| s.id == id) {
            Some(idx) => Ok(self.structures.remove(idx)),
            None => Err(PromoteError::NotFound {
                entity: "Promote structure".into(),
                id: id.to_string(),
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.structures.is_empty()
    }

    // -- Persistence --------------------------------------------------------

    /// Load a store from a JSON file. A missing file yields an empty store
    /// (first-run behavior). The id counter is re-seeded past the highest
    /// persisted id so reloaded stores never reissue an id.
    pub fn load(path: impl AsRef<Path>) -> PromoteResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::new());
        }
        let contents = fs::read_to_string(path)?;
        let mut store: Self = serde_json::from_str(&contents)?;
        let max_seen = store
            .structures
            .iter()
            .filter_map(|s| s.id.strip_prefix("ps-"))
            .filter_map(|n| n.parse::<u64>().ok())
            .max()
            .unwrap_or(0);
        store.next_id = store.next_id.max(max_seen + 1);
        Ok(store)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> PromoteResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
