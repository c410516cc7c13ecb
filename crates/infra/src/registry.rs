//! Reference-data registries.
//!
//! Locations, categories and customer profiles are plain reference data,
//! not event-sourced aggregates: they change rarely, carry no history
//! requirement, and the ledger references them by id. Each registry is a
//! thread-safe in-process map with the same insert-order-preserving listing
//! the admin screens expect.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use goldsmith_core::{CategoryId, CustomerId, DomainError, DomainResult, Grams, LocationId, SubcategoryId};
use goldsmith_stock::Location;

/// Registry of physical locations.
///
/// Locations are never deleted: items and ledger rows reference them
/// forever, so the registry only grows.
#[derive(Debug, Default)]
pub struct LocationRegistry {
    inner: RwLock<Vec<Location>>,
}

impl LocationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new location. Codes must be unique (they appear on
    /// printed tags).
    pub fn create(
        &self,
        name: impl Into<String>,
        code: impl Into<String>,
    ) -> DomainResult<Location> {
        let location = Location::new(LocationId::new(), name, code)?;

        let mut locations = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("location registry lock poisoned"))?;

        if locations.iter().any(|l| l.code == location.code) {
            return Err(DomainError::conflict(format!(
                "location code '{}' already exists",
                location.code
            )));
        }

        locations.push(location.clone());
        Ok(location)
    }

    pub fn get(&self, id: LocationId) -> Option<Location> {
        let locations = self.inner.read().ok()?;
        locations.iter().find(|l| l.id == id).cloned()
    }

    /// All locations, in creation order. An empty result is valid (new
    /// deployment).
    pub fn list(&self) -> Vec<Location> {
        match self.inner.read() {
            Ok(locations) => locations.clone(),
            Err(_) => vec![],
        }
    }

    /// Fail if the id doesn't name a registered location.
    pub fn ensure_exists(&self, id: LocationId) -> DomainResult<Location> {
        self.get(id).ok_or(DomainError::NotFound)
    }
}

/// A product category (e.g. "Rings").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A subcategory within a category (e.g. "Rings / Solitaire").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    pub id: SubcategoryId,
    pub category_id: CategoryId,
    pub name: String,
}

/// Registry of catalog categories and subcategories.
#[derive(Debug, Default)]
pub struct CategoryRegistry {
    categories: RwLock<Vec<Category>>,
    subcategories: RwLock<Vec<Subcategory>>,
}

impl CategoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_category(&self, name: impl Into<String>) -> DomainResult<Category> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("category name cannot be empty"));
        }

        let mut categories = self
            .categories
            .write()
            .map_err(|_| DomainError::conflict("category registry lock poisoned"))?;

        if categories.iter().any(|c| c.name == name) {
            return Err(DomainError::conflict(format!(
                "category '{name}' already exists"
            )));
        }

        let category = Category {
            id: CategoryId::new(),
            name,
        };
        categories.push(category.clone());
        Ok(category)
    }

    pub fn create_subcategory(
        &self,
        category_id: CategoryId,
        name: impl Into<String>,
    ) -> DomainResult<Subcategory> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("subcategory name cannot be empty"));
        }
        self.get_category(category_id).ok_or(DomainError::NotFound)?;

        let mut subcategories = self
            .subcategories
            .write()
            .map_err(|_| DomainError::conflict("category registry lock poisoned"))?;

        if subcategories
            .iter()
            .any(|s| s.category_id == category_id && s.name == name)
        {
            return Err(DomainError::conflict(format!(
                "subcategory '{name}' already exists in this category"
            )));
        }

        let subcategory = Subcategory {
            id: SubcategoryId::new(),
            category_id,
            name,
        };
        subcategories.push(subcategory.clone());
        Ok(subcategory)
    }

    pub fn get_category(&self, id: CategoryId) -> Option<Category> {
        let categories = self.categories.read().ok()?;
        categories.iter().find(|c| c.id == id).cloned()
    }

    pub fn get_subcategory(&self, id: SubcategoryId) -> Option<Subcategory> {
        let subcategories = self.subcategories.read().ok()?;
        subcategories.iter().find(|s| s.id == id).cloned()
    }

    pub fn list_categories(&self) -> Vec<Category> {
        match self.categories.read() {
            Ok(categories) => categories.clone(),
            Err(_) => vec![],
        }
    }

    pub fn list_subcategories(&self, category_id: CategoryId) -> Vec<Subcategory> {
        match self.subcategories.read() {
            Ok(subcategories) => subcategories
                .iter()
                .filter(|s| s.category_id == category_id)
                .cloned()
                .collect(),
            Err(_) => vec![],
        }
    }
}

/// A customer profile.
///
/// `balance` is a manually maintained running balance in grams. It is not
/// derived from any ledger; an administrator edits it directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub id: CustomerId,
    pub name: String,
    pub phone: Option<String>,
    pub balance: Grams,
}

/// Registry of customer profiles.
#[derive(Debug, Default)]
pub struct CustomerDirectory {
    inner: RwLock<HashMap<CustomerId, CustomerProfile>>,
    order: RwLock<Vec<CustomerId>>,
}

impl CustomerDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(
        &self,
        name: impl Into<String>,
        phone: Option<String>,
    ) -> DomainResult<CustomerProfile> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("customer name cannot be empty"));
        }

        let profile = CustomerProfile {
            id: CustomerId::new(),
            name,
            phone,
            balance: Grams::ZERO,
        };

        let mut customers = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("customer directory lock poisoned"))?;
        let mut order = self
            .order
            .write()
            .map_err(|_| DomainError::conflict("customer directory lock poisoned"))?;

        customers.insert(profile.id, profile.clone());
        order.push(profile.id);
        Ok(profile)
    }

    pub fn get(&self, id: CustomerId) -> Option<CustomerProfile> {
        let customers = self.inner.read().ok()?;
        customers.get(&id).cloned()
    }

    pub fn list(&self) -> Vec<CustomerProfile> {
        let (customers, order) = match (self.inner.read(), self.order.read()) {
            (Ok(c), Ok(o)) => (c, o),
            _ => return vec![],
        };
        order
            .iter()
            .filter_map(|id| customers.get(id).cloned())
            .collect()
    }

    /// Overwrite the manual balance for a customer.
    pub fn set_balance(&self, id: CustomerId, balance: Grams) -> DomainResult<CustomerProfile> {
        let mut customers = self
            .inner
            .write()
            .map_err(|_| DomainError::conflict("customer directory lock poisoned"))?;
        let profile = customers.get_mut(&id).ok_or(DomainError::NotFound)?;
        profile.balance = balance;
        Ok(profile.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn location_codes_are_unique() {
        let registry = LocationRegistry::new();
        registry.create("Main Store", "MS").unwrap();

        let err = registry.create("Mirror Store", "MS").unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate code"),
        }
        assert_eq!(registry.list().len(), 1);
    }

    #[test]
    fn locations_list_in_creation_order() {
        let registry = LocationRegistry::new();
        let a = registry.create("Main Store", "MS").unwrap();
        let b = registry.create("Workshop", "WS").unwrap();

        let listed = registry.list();
        assert_eq!(listed, vec![a.clone(), b]);
        assert_eq!(registry.get(a.id), Some(a));
    }

    #[test]
    fn subcategory_requires_existing_category() {
        let registry = CategoryRegistry::new();
        let err = registry
            .create_subcategory(CategoryId::new(), "Solitaire")
            .unwrap_err();
        assert_eq!(err, DomainError::NotFound);

        let rings = registry.create_category("Rings").unwrap();
        let sub = registry.create_subcategory(rings.id, "Solitaire").unwrap();
        assert_eq!(registry.list_subcategories(rings.id), vec![sub]);
    }

    #[test]
    fn customer_balance_is_manually_edited() {
        let directory = CustomerDirectory::new();
        let customer = directory.create("A. Buyer", None).unwrap();
        assert!(customer.balance.is_zero());

        let updated = directory
            .set_balance(customer.id, "12.500".parse().unwrap())
            .unwrap();
        assert_eq!(updated.balance.to_string(), "12.500");
        assert_eq!(directory.get(customer.id).unwrap().balance, updated.balance);
    }
}
