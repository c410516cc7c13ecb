use std::sync::Arc;

use goldsmith_core::{AggregateId, DomainError, ExpectedVersion};
use goldsmith_events::{EventBus, EventEnvelope, InMemoryEventBus};
use goldsmith_infra::{
    CategoryRegistry, CommandDispatcher, CustomerDirectory, DispatchError, EventStore,
    EventStoreError, InMemoryEventStore, InMemoryReadModelStore, LocationRegistry, StoredEvent,
    UncommittedEvent,
    projections::{
        ItemReadModel, ItemStateProjection, ProductCatalogProjection, ProductReadModel,
        RawGoldProjection, ShadowOrderWriter, SoldItemsProjection,
    },
};

#[cfg(feature = "postgres")]
use goldsmith_infra::PostgresEventStore;
#[cfg(feature = "postgres")]
use sqlx::PgPool;

use goldsmith_catalog::ProductId;
use goldsmith_stock::StockItemId;

type Bus = Arc<InMemoryEventBus<EventEnvelope<serde_json::Value>>>;

type ItemProjection = ItemStateProjection<Arc<InMemoryReadModelStore<StockItemId, ItemReadModel>>>;
type CatalogProjection =
    ProductCatalogProjection<Arc<InMemoryReadModelStore<ProductId, ProductReadModel>>>;

/// The configured event store backend.
///
/// In-memory for dev/test; Postgres when `USE_PERSISTENT_STORES=true` and
/// the `postgres` feature is compiled in. Everything downstream of the
/// store (dispatcher, projections) is identical in both modes.
#[derive(Clone)]
pub enum StoreHandle {
    InMemory(Arc<InMemoryEventStore>),
    #[cfg(feature = "postgres")]
    Postgres(Arc<PostgresEventStore>),
}

impl EventStore for StoreHandle {
    fn append(
        &self,
        events: Vec<UncommittedEvent>,
        expected_version: ExpectedVersion,
    ) -> Result<Vec<StoredEvent>, EventStoreError> {
        match self {
            StoreHandle::InMemory(store) => store.append(events, expected_version),
            #[cfg(feature = "postgres")]
            StoreHandle::Postgres(store) => store.append(events, expected_version),
        }
    }

    fn load_stream(&self, aggregate_id: AggregateId) -> Result<Vec<StoredEvent>, EventStoreError> {
        match self {
            StoreHandle::InMemory(store) => store.load_stream(aggregate_id),
            #[cfg(feature = "postgres")]
            StoreHandle::Postgres(store) => store.load_stream(aggregate_id),
        }
    }
}

/// Shared application services: store + bus + dispatcher, the read-side
/// projections, and the registries that live outside the event ledger.
pub struct AppServices {
    dispatcher: CommandDispatcher<StoreHandle, Bus>,
    event_store: StoreHandle,
    event_bus: Bus,
    items: Arc<ItemProjection>,
    catalog: Arc<CatalogProjection>,
    sold_items: Arc<SoldItemsProjection>,
    raw_gold: Arc<RawGoldProjection>,
    shadow_orders: Arc<ShadowOrderWriter>,
    locations: Arc<LocationRegistry>,
    categories: Arc<CategoryRegistry>,
    customers: Arc<CustomerDirectory>,
    // Single shop, single raw-gold ledger stream.
    raw_gold_ledger_id: AggregateId,
}

pub async fn build_services() -> AppServices {
    let use_persistent = std::env::var("USE_PERSISTENT_STORES")
        .unwrap_or_else(|_| "false".to_string())
        .parse::<bool>()
        .unwrap_or(false);

    if use_persistent {
        #[cfg(feature = "postgres")]
        {
            return build_with_store(build_postgres_store().await).await;
        }
        #[cfg(not(feature = "postgres"))]
        {
            tracing::warn!(
                "USE_PERSISTENT_STORES=true but postgres feature not enabled, falling back to in-memory"
            );
        }
    }

    build_with_store(StoreHandle::InMemory(Arc::new(InMemoryEventStore::new()))).await
}

#[cfg(feature = "postgres")]
async fn build_postgres_store() -> StoreHandle {
    let database_url = std::env::var("DATABASE_URL")
        .expect("DATABASE_URL must be set when USE_PERSISTENT_STORES=true");

    let pool = PgPool::connect(&database_url)
        .await
        .expect("failed to connect to Postgres");

    StoreHandle::Postgres(Arc::new(PostgresEventStore::new(pool)))
}

async fn build_with_store(store: StoreHandle) -> AppServices {
    let bus: Bus = Arc::new(InMemoryEventBus::new());

    let items: Arc<ItemProjection> = Arc::new(ItemStateProjection::new(Arc::new(
        InMemoryReadModelStore::new(),
    )));
    let catalog: Arc<CatalogProjection> = Arc::new(ProductCatalogProjection::new(Arc::new(
        InMemoryReadModelStore::new(),
    )));
    let sold_items = Arc::new(SoldItemsProjection::new());
    let raw_gold = Arc::new(RawGoldProjection::new());
    let shadow_orders = Arc::new(ShadowOrderWriter::new());

    let locations = Arc::new(LocationRegistry::new());
    let categories = Arc::new(CategoryRegistry::new());
    let customers = Arc::new(CustomerDirectory::new());

    // Background subscriber: bus -> projections, routed by aggregate type.
    {
        let sub = bus.subscribe();
        let items = items.clone();
        let catalog = catalog.clone();
        let sold_items = sold_items.clone();
        let raw_gold = raw_gold.clone();
        let shadow_orders = shadow_orders.clone();
        tokio::task::spawn_blocking(move || loop {
            match sub.recv() {
                Ok(env) => {
                    let apply_ok = match env.aggregate_type() {
                        "stock.item" => {
                            let result = items
                                .apply_envelope(&env)
                                .and_then(|()| sold_items.apply_envelope(&env));
                            // Best effort by design: never holds up the projections.
                            shadow_orders.apply_envelope(&env);
                            result.map_err(|e| e.to_string())
                        }
                        "catalog.product" => {
                            catalog.apply_envelope(&env).map_err(|e| e.to_string())
                        }
                        "rawgold.ledger" => {
                            raw_gold.apply_envelope(&env).map_err(|e| e.to_string())
                        }
                        _ => Ok(()),
                    };

                    if let Err(e) = apply_ok {
                        tracing::warn!("projection apply failed: {e}");
                    }
                }
                Err(_) => break,
            }
        });
    }

    let dispatcher = CommandDispatcher::new(store.clone(), bus.clone());

    AppServices {
        dispatcher,
        event_store: store,
        event_bus: bus,
        items,
        catalog,
        sold_items,
        raw_gold,
        shadow_orders,
        locations,
        categories,
        customers,
        raw_gold_ledger_id: AggregateId::new(),
    }
}

impl AppServices {
    pub fn dispatch<A>(
        &self,
        aggregate_id: AggregateId,
        aggregate_type: &str,
        command: A::Command,
        make_aggregate: impl FnOnce(AggregateId) -> A,
    ) -> Result<Vec<StoredEvent>, DispatchError>
    where
        A: goldsmith_core::Aggregate<Error = DomainError>,
        A::Event: goldsmith_events::Event + serde::Serialize + serde::de::DeserializeOwned,
    {
        self.dispatcher
            .dispatch::<A>(aggregate_id, aggregate_type, command, make_aggregate)
    }

    pub fn event_store(&self) -> &StoreHandle {
        &self.event_store
    }

    pub fn event_bus(&self) -> &Bus {
        &self.event_bus
    }

    pub fn items(&self) -> &ItemProjection {
        &self.items
    }

    pub fn catalog(&self) -> &CatalogProjection {
        &self.catalog
    }

    pub fn sold_items(&self) -> &SoldItemsProjection {
        &self.sold_items
    }

    pub fn raw_gold(&self) -> &RawGoldProjection {
        &self.raw_gold
    }

    pub fn shadow_orders(&self) -> &ShadowOrderWriter {
        &self.shadow_orders
    }

    pub fn locations(&self) -> &LocationRegistry {
        &self.locations
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    pub fn customers(&self) -> &CustomerDirectory {
        &self.customers
    }

    pub fn raw_gold_ledger_id(&self) -> AggregateId {
        self.raw_gold_ledger_id
    }
}
