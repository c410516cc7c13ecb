/// Execute an aggregate command deterministically (no IO, no async).
///
/// Canonical decide-then-evolve lifecycle:
///
/// 1. **Decide**: `aggregate.handle(command)` returns events (pure).
/// 2. **Evolve**: each event is applied via `aggregate.apply(event)`.
///
/// This mutates the aggregate in place and is meant for unit tests and inline
/// processing. For the full pipeline (persistence, optimistic concurrency,
/// publication) use the infra dispatcher.
pub fn execute<A>(aggregate: &mut A, command: &A::Command) -> Result<Vec<A::Event>, A::Error>
where
    A: goldsmith_core::Aggregate,
{
    let events = A::handle(aggregate, command)?;
    for ev in &events {
        A::apply(aggregate, ev);
    }
    Ok(events)
}
