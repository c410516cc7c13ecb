use axum::Router;

pub mod categories;
pub mod customers;
pub mod items;
pub mod locations;
pub mod products;
pub mod rawgold;
pub mod reports;
pub mod system;

/// Router for all actor-scoped endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/locations", locations::router())
        .nest("/categories", categories::router())
        .nest("/products", products::router())
        .nest("/items", items::router())
        .nest("/rawgold", rawgold::router())
        .nest("/customers", customers::router())
        .nest("/reports", reports::router())
}
