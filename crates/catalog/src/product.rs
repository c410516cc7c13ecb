use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use goldsmith_core::{
    Aggregate, AggregateId, AggregateRoot, CategoryId, DomainError, Grams, SubcategoryId,
};
use goldsmith_events::Event;

/// Product identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub AggregateId);

impl ProductId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ProductId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Product (a catalog entry; one product may have many
/// physical stock items).
///
/// There is no delete: a product that leaves the catalog is retired
/// (tombstoned), so movement and sale records referencing it never dangle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    id: ProductId,
    name: String,
    /// Nominal catalog weight. Physical items carry their own weighed-in
    /// value; this one is display/reference only.
    weight: Grams,
    category_id: Option<CategoryId>,
    subcategory_id: Option<SubcategoryId>,
    image_url: Option<String>,
    live_stock: bool,
    retired: bool,
    version: u64,
    created: bool,
}

impl Product {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: ProductId) -> Self {
        Self {
            id,
            name: String::new(),
            weight: Grams::ZERO,
            category_id: None,
            subcategory_id: None,
            image_url: None,
            live_stock: false,
            retired: false,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> ProductId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn weight(&self) -> Grams {
        self.weight
    }

    pub fn category_id(&self) -> Option<CategoryId> {
        self.category_id
    }

    pub fn subcategory_id(&self) -> Option<SubcategoryId> {
        self.subcategory_id
    }

    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    pub fn live_stock(&self) -> bool {
        self.live_stock
    }

    pub fn retired(&self) -> bool {
        self.retired
    }
}

impl AggregateRoot for Product {
    type Id = ProductId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: CreateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateProduct {
    pub product_id: ProductId,
    pub name: String,
    pub weight: Grams,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub image_url: Option<String>,
    pub live_stock: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Partial update applied by `UpdateProduct`; `None` fields are left alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub image_url: Option<String>,
    pub live_stock: Option<bool>,
}

/// Command: UpdateProduct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    pub product_id: ProductId,
    pub update: ProductUpdate,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RetireProduct (tombstone; refused at the service layer while
/// unsold physical instances exist).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetireProduct {
    pub product_id: ProductId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductCommand {
    CreateProduct(CreateProduct),
    UpdateProduct(UpdateProduct),
    RetireProduct(RetireProduct),
}

/// Event: ProductCreated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductCreated {
    pub product_id: ProductId,
    pub name: String,
    pub weight: Grams,
    pub category_id: Option<CategoryId>,
    pub subcategory_id: Option<SubcategoryId>,
    pub image_url: Option<String>,
    pub live_stock: bool,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductUpdated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductUpdated {
    pub product_id: ProductId,
    pub update: ProductUpdate,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ProductRetired.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRetired {
    pub product_id: ProductId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductEvent {
    ProductCreated(ProductCreated),
    ProductUpdated(ProductUpdated),
    ProductRetired(ProductRetired),
}

impl Event for ProductEvent {
    fn event_type(&self) -> &'static str {
        match self {
            ProductEvent::ProductCreated(_) => "catalog.product.created",
            ProductEvent::ProductUpdated(_) => "catalog.product.updated",
            ProductEvent::ProductRetired(_) => "catalog.product.retired",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ProductEvent::ProductCreated(e) => e.occurred_at,
            ProductEvent::ProductUpdated(e) => e.occurred_at,
            ProductEvent::ProductRetired(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Product {
    type Command = ProductCommand;
    type Event = ProductEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            ProductEvent::ProductCreated(e) => {
                self.id = e.product_id;
                self.name = e.name.clone();
                self.weight = e.weight;
                self.category_id = e.category_id;
                self.subcategory_id = e.subcategory_id;
                self.image_url = e.image_url.clone();
                self.live_stock = e.live_stock;
                self.retired = false;
                self.created = true;
            }
            ProductEvent::ProductUpdated(e) => {
                if let Some(name) = &e.update.name {
                    self.name = name.clone();
                }
                if let Some(category_id) = e.update.category_id {
                    self.category_id = Some(category_id);
                }
                if let Some(subcategory_id) = e.update.subcategory_id {
                    self.subcategory_id = Some(subcategory_id);
                }
                if let Some(image_url) = &e.update.image_url {
                    self.image_url = Some(image_url.clone());
                }
                if let Some(live_stock) = e.update.live_stock {
                    self.live_stock = live_stock;
                }
            }
            ProductEvent::ProductRetired(_) => {
                self.retired = true;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            ProductCommand::CreateProduct(cmd) => self.handle_create(cmd),
            ProductCommand::UpdateProduct(cmd) => self.handle_update(cmd),
            ProductCommand::RetireProduct(cmd) => self.handle_retire(cmd),
        }
    }
}

impl Product {
    fn ensure_product_id(&self, product_id: ProductId) -> Result<(), DomainError> {
        if self.id != product_id {
            return Err(DomainError::precondition("product_id mismatch"));
        }
        Ok(())
    }

    fn handle_create(&self, cmd: &CreateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("product already exists"));
        }
        if cmd.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if !cmd.weight.is_positive() {
            return Err(DomainError::validation("weight must be positive"));
        }
        Ok(vec![ProductEvent::ProductCreated(ProductCreated {
            product_id: cmd.product_id,
            name: cmd.name.clone(),
            weight: cmd.weight,
            category_id: cmd.category_id,
            subcategory_id: cmd.subcategory_id,
            image_url: cmd.image_url.clone(),
            live_stock: cmd.live_stock,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;
        if self.retired {
            return Err(DomainError::precondition("retired products cannot be updated"));
        }
        if let Some(name) = &cmd.update.name {
            if name.trim().is_empty() {
                return Err(DomainError::validation("name cannot be empty"));
            }
        }
        if cmd.update == ProductUpdate::default() {
            return Ok(vec![]);
        }
        Ok(vec![ProductEvent::ProductUpdated(ProductUpdated {
            product_id: cmd.product_id,
            update: cmd.update.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_retire(&self, cmd: &RetireProduct) -> Result<Vec<ProductEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_product_id(cmd.product_id)?;
        if self.retired {
            return Err(DomainError::conflict("product is already retired"));
        }
        Ok(vec![ProductEvent::ProductRetired(ProductRetired {
            product_id: cmd.product_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use goldsmith_core::AggregateId;
    use goldsmith_events::execute;

    fn test_product_id() -> ProductId {
        ProductId::new(AggregateId::new())
    }

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn create_cmd(product_id: ProductId) -> CreateProduct {
        CreateProduct {
            product_id,
            name: "Gold Bangle".to_string(),
            weight: "12.250".parse().unwrap(),
            category_id: Some(CategoryId::new()),
            subcategory_id: None,
            image_url: None,
            live_stock: false,
            occurred_at: test_time(),
        }
    }

    #[test]
    fn create_product_emits_product_created_event() {
        let product_id = test_product_id();
        let product = Product::empty(product_id);
        let cmd = create_cmd(product_id);

        let events = product
            .handle(&ProductCommand::CreateProduct(cmd.clone()))
            .unwrap();
        assert_eq!(events.len(), 1);

        match &events[0] {
            ProductEvent::ProductCreated(e) => {
                assert_eq!(e.product_id, product_id);
                assert_eq!(e.name, "Gold Bangle");
                assert_eq!(e.weight, cmd.weight);
            }
            _ => panic!("Expected ProductCreated event"),
        }
    }

    #[test]
    fn create_product_rejects_empty_name() {
        let product_id = test_product_id();
        let product = Product::empty(product_id);
        let mut cmd = create_cmd(product_id);
        cmd.name = "   ".to_string();

        let err = product.handle(&ProductCommand::CreateProduct(cmd)).unwrap_err();
        match err {
            DomainError::Validation(_) => {}
            _ => panic!("Expected Validation error for empty name"),
        }
    }

    #[test]
    fn create_product_rejects_duplicate_creation() {
        let product_id = test_product_id();
        let mut product = Product::empty(product_id);
        let cmd = create_cmd(product_id);

        execute(&mut product, &ProductCommand::CreateProduct(cmd.clone())).unwrap();

        let err = product.handle(&ProductCommand::CreateProduct(cmd)).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for duplicate creation"),
        }
    }

    #[test]
    fn update_applies_only_provided_fields() {
        let product_id = test_product_id();
        let mut product = Product::empty(product_id);
        execute(&mut product, &ProductCommand::CreateProduct(create_cmd(product_id))).unwrap();
        let original_category = product.category_id();

        let cmd = ProductCommand::UpdateProduct(UpdateProduct {
            product_id,
            update: ProductUpdate {
                name: Some("Gold Bangle 22k".to_string()),
                live_stock: Some(true),
                ..ProductUpdate::default()
            },
            occurred_at: test_time(),
        });
        execute(&mut product, &cmd).unwrap();

        assert_eq!(product.name(), "Gold Bangle 22k");
        assert!(product.live_stock());
        assert_eq!(product.category_id(), original_category);
    }

    #[test]
    fn empty_update_is_a_noop() {
        let product_id = test_product_id();
        let mut product = Product::empty(product_id);
        execute(&mut product, &ProductCommand::CreateProduct(create_cmd(product_id))).unwrap();

        let events = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                product_id,
                update: ProductUpdate::default(),
                occurred_at: test_time(),
            }))
            .unwrap();
        assert!(events.is_empty());
    }

    #[test]
    fn retire_tombstones_instead_of_deleting() {
        let product_id = test_product_id();
        let mut product = Product::empty(product_id);
        execute(&mut product, &ProductCommand::CreateProduct(create_cmd(product_id))).unwrap();

        let cmd = ProductCommand::RetireProduct(RetireProduct {
            product_id,
            reason: Some("discontinued".to_string()),
            occurred_at: test_time(),
        });
        execute(&mut product, &cmd).unwrap();

        assert!(product.retired());
        // Still readable: history referencing this product stays resolvable.
        assert_eq!(product.name(), "Gold Bangle");

        let err = product.handle(&cmd).unwrap_err();
        match err {
            DomainError::Conflict(_) => {}
            _ => panic!("Expected Conflict error for double retire"),
        }
    }

    #[test]
    fn retired_product_rejects_updates() {
        let product_id = test_product_id();
        let mut product = Product::empty(product_id);
        execute(&mut product, &ProductCommand::CreateProduct(create_cmd(product_id))).unwrap();
        execute(
            &mut product,
            &ProductCommand::RetireProduct(RetireProduct {
                product_id,
                reason: None,
                occurred_at: test_time(),
            }),
        )
        .unwrap();

        let err = product
            .handle(&ProductCommand::UpdateProduct(UpdateProduct {
                product_id,
                update: ProductUpdate {
                    name: Some("renamed".to_string()),
                    ..ProductUpdate::default()
                },
                occurred_at: test_time(),
            }))
            .unwrap_err();
        match err {
            DomainError::Precondition(_) => {}
            _ => panic!("Expected Precondition error for updating a retired product"),
        }
    }

    mod proptest_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig {
                cases: 128,
                ..ProptestConfig::default()
            })]

            /// Property: any sequence of updates never changes the nominal
            /// weight set at creation, and version grows by exactly one per
            /// applied event.
            #[test]
            fn updates_never_touch_creation_weight(
                names in prop::collection::vec("[a-z]{1,12}", 1..8),
            ) {
                let product_id = test_product_id();
                let mut product = Product::empty(product_id);
                let cmd = create_cmd(product_id);
                let weight = cmd.weight;
                execute(&mut product, &ProductCommand::CreateProduct(cmd)).unwrap();

                let mut applied = 1u64;
                for name in names {
                    let events = execute(&mut product, &ProductCommand::UpdateProduct(UpdateProduct {
                        product_id,
                        update: ProductUpdate {
                            name: Some(name),
                            ..ProductUpdate::default()
                        },
                        occurred_at: test_time(),
                    })).unwrap();
                    applied += events.len() as u64;
                }

                prop_assert_eq!(product.weight(), weight);
                prop_assert_eq!(product.version(), applied);
            }
        }
    }
}
