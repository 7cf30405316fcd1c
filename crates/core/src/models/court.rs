use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::WatchError;
use crate::models::slot::CourtId;

/// Static mapping from court id to display name for one deployment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourtRegistry(BTreeMap<CourtId, String>);

impl CourtRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `{"100676": "Court 1", ...}` JSON object used in configuration.
    pub fn from_json(raw: &str) -> Result<Self, WatchError> {
        let courts: BTreeMap<CourtId, String> = serde_json::from_str(raw)
            .map_err(|e| WatchError::Config(format!("COURTS must be a JSON object of id to name: {e}")))?;
        if courts.is_empty() {
            return Err(WatchError::Config("COURTS must name at least one court".to_string()));
        }
        Ok(Self(courts))
    }

    pub fn insert(&mut self, id: CourtId, name: impl Into<String>) {
        self.0.insert(id, name.into());
    }

    pub fn ids(&self) -> impl Iterator<Item = CourtId> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Display name, falling back to `Court <id>` for unregistered ids.
    pub fn name_of(&self, id: CourtId) -> String {
        self.0
            .get(&id)
            .cloned()
            .unwrap_or_else(|| format!("Court {id}"))
    }
}

impl FromIterator<(CourtId, String)> for CourtRegistry {
    fn from_iter<I: IntoIterator<Item = (CourtId, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
