//! Catalog: product definitions that physical stock items instantiate.

pub mod product;

pub use product::{
    CreateProduct, Product, ProductCommand, ProductCreated, ProductEvent, ProductId,
    ProductRetired, ProductUpdate, ProductUpdated, RetireProduct, UpdateProduct,
};
