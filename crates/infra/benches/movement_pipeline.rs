use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value as JsonValue;

use goldsmith_catalog::ProductId;
use goldsmith_core::{AggregateId, LocationId};
use goldsmith_events::{EventBus, EventEnvelope, InMemoryEventBus};
use goldsmith_infra::command_dispatcher::CommandDispatcher;
use goldsmith_infra::event_store::InMemoryEventStore;
use goldsmith_infra::projections::ItemStateProjection;
use goldsmith_infra::read_model::InMemoryReadModelStore;
use goldsmith_stock::{MoveItem, ReceiveItem, StockItem, StockItemCommand, StockItemId};

type Bus = Arc<InMemoryEventBus<EventEnvelope<JsonValue>>>;

fn dispatcher() -> (CommandDispatcher<Arc<InMemoryEventStore>, Bus>, Bus) {
    let store = Arc::new(InMemoryEventStore::new());
    let bus: Bus = Arc::new(InMemoryEventBus::new());
    (CommandDispatcher::new(store, bus.clone()), bus)
}

fn receive(
    d: &CommandDispatcher<Arc<InMemoryEventStore>, Bus>,
    item_id: StockItemId,
    location: LocationId,
) {
    d.dispatch(
        item_id.0,
        "stock.item",
        StockItemCommand::ReceiveItem(ReceiveItem {
            item_id,
            product_id: ProductId::new(AggregateId::new()),
            weight: "5.000".parse().unwrap(),
            location_id: location,
            performed_by: "bench".to_string(),
            occurred_at: Utc::now(),
        }),
        |id| StockItem::empty(StockItemId::new(id)),
    )
    .unwrap();
}

/// Dispatch cost of one move as the item's history grows.
///
/// Rehydration replays the whole stream, so this shows how dispatch latency
/// scales with per-item movement count.
fn bench_move_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("move_dispatch");

    for history_len in [1usize, 16, 64, 256] {
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(
            BenchmarkId::from_parameter(history_len),
            &history_len,
            |b, &history_len| {
                let (d, _bus) = dispatcher();
                let a = LocationId::new();
                let bl = LocationId::new();
                let item_id = StockItemId::new(AggregateId::new());
                receive(&d, item_id, a);

                let mut at = a;
                for _ in 0..history_len {
                    let to = if at == a { bl } else { a };
                    d.dispatch(
                        item_id.0,
                        "stock.item",
                        StockItemCommand::MoveItem(MoveItem {
                            item_id,
                            from_location_id: at,
                            to_location_id: to,
                            performed_by: "bench".to_string(),
                            remarks: None,
                            occurred_at: Utc::now(),
                        }),
                        |id| StockItem::empty(StockItemId::new(id)),
                    )
                    .unwrap();
                    at = to;
                }

                b.iter(|| {
                    // Alternate destinations so every dispatch is a real move.
                    let to = if at == a { bl } else { a };
                    d.dispatch(
                        item_id.0,
                        "stock.item",
                        StockItemCommand::MoveItem(MoveItem {
                            item_id,
                            from_location_id: at,
                            to_location_id: to,
                            performed_by: "bench".to_string(),
                            remarks: None,
                            occurred_at: Utc::now(),
                        }),
                        |id| StockItem::empty(StockItemId::new(id)),
                    )
                    .unwrap();
                    at = to;
                });
            },
        );
    }

    group.finish();
}

/// Projection apply throughput over a batch of published envelopes.
fn bench_projection_apply(c: &mut Criterion) {
    let mut group = c.benchmark_group("projection_apply");

    for item_count in [100usize, 1_000] {
        let (d, bus) = dispatcher();
        let subscription = bus.subscribe();
        let location = LocationId::new();
        for _ in 0..item_count {
            receive(&d, StockItemId::new(AggregateId::new()), location);
        }
        let mut envelopes = Vec::with_capacity(item_count);
        while let Ok(env) = subscription.try_recv() {
            envelopes.push(env);
        }

        group.throughput(Throughput::Elements(item_count as u64));
        group.bench_with_input(
            BenchmarkId::from_parameter(item_count),
            &envelopes,
            |b, envelopes| {
                b.iter(|| {
                    let projection = ItemStateProjection::new(InMemoryReadModelStore::new());
                    for env in envelopes {
                        projection.apply_envelope(black_box(env)).unwrap();
                    }
                    black_box(projection.list().len())
                });
            },
        );
    }

    group.finish();
}

criterion_group!(benches, bench_move_dispatch, bench_projection_apply);
criterion_main!(benches);
