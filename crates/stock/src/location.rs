use serde::{Deserialize, Serialize};

use goldsmith_core::{DomainError, DomainResult, Entity, LocationId};

/// A physical site (store/warehouse) that can hold unsold items.
///
/// Reference data: created by an administrator, never deleted while items
/// reference it. Not event-sourced — the registry in infra owns the set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    pub code: String,
}

impl Location {
    pub fn new(id: LocationId, name: impl Into<String>, code: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        let code = code.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("location name cannot be empty"));
        }
        if code.trim().is_empty() {
            return Err(DomainError::validation("location code cannot be empty"));
        }
        Ok(Self { id, name, code })
    }
}

impl Entity for Location {
    type Id = LocationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
