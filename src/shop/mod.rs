//! Product catalog and per-browser-session cart.

pub mod cart;
pub mod catalog;

pub use cart::{CartItem, CartSessions, CartStore, CartView, InMemoryCartSessions};
pub use catalog::{Catalog, Product};
