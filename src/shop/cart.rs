//! Session-scoped shopping cart.
//!
//! Cart contents live behind [`CartSessions`], so the backing store (cookie,
//! server memory, external cache) can change without touching the handlers.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ShopConfig;
use crate::core::errors::{AppError, AppResult};
use crate::shop::catalog::{Catalog, Product};

/// A copy of a product placed in a cart.
pub type CartItem = Product;

/// Storage capability for per-session carts.
pub trait CartSessions: Send + Sync {
    /// Current cart for a session; empty if none exists yet.
    fn get(&self, session: &str) -> Vec<CartItem>;

    /// Replace the cart for a session.
    fn set(&self, session: &str, items: Vec<CartItem>);

    /// Discard carts whose session has gone idle.
    fn discard_idle(&self) {}
}

struct CartEntry {
    items: Vec<CartItem>,
    touched: Instant,
}

impl CartEntry {
    fn new(items: Vec<CartItem>) -> Self {
        Self {
            items,
            touched: Instant::now(),
        }
    }

    fn is_idle(&self, ttl: Duration) -> bool {
        self.touched.elapsed() >= ttl
    }
}

/// In-process cart storage keyed by the browser's cart cookie.
///
/// A cart untouched for `idle_ttl` is treated as gone, an emptied cart is
/// dropped, and at most `max_carts` carts are kept.
pub struct InMemoryCartSessions {
    carts: DashMap<String, CartEntry>,
    idle_ttl: Duration,
    max_carts: usize,
}

impl InMemoryCartSessions {
    /// Create cart storage with an idle lifetime and a size cap.
    #[must_use]
    pub fn new(idle_ttl: Duration, max_carts: usize) -> Self {
        Self {
            carts: DashMap::new(),
            idle_ttl,
            max_carts: max_carts.max(1),
        }
    }

    /// Create cart storage from the shop settings.
    #[must_use]
    pub fn from_config(config: &ShopConfig) -> Self {
        Self::new(
            Duration::from_secs(config.cart_idle_ttl_secs),
            config.max_carts,
        )
    }

    /// Number of carts currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.carts.len()
    }

    /// Whether no carts are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.carts.is_empty()
    }

    /// Drop every cart idle for longer than the lifetime.
    pub fn cleanup_expired(&self) {
        let ttl = self.idle_ttl;
        self.carts.retain(|_, entry| !entry.is_idle(ttl));
    }

    fn enforce_max_carts(&self) {
        if self.carts.len() <= self.max_carts {
            return;
        }
        self.cleanup_expired();

        let excess = self.carts.len().saturating_sub(self.max_carts);
        if excess == 0 {
            return;
        }
        let mut by_age: Vec<(Instant, String)> = self
            .carts
            .iter()
            .map(|entry| (entry.touched, entry.key().clone()))
            .collect();
        by_age.sort_unstable();
        for (_, key) in by_age.into_iter().take(excess) {
            self.carts.remove(&key);
        }
        tracing::debug!(evicted = excess, "cart cap reached");
    }
}

impl Default for InMemoryCartSessions {
    fn default() -> Self {
        Self::from_config(&ShopConfig::default())
    }
}

impl CartSessions for InMemoryCartSessions {
    fn get(&self, session: &str) -> Vec<CartItem> {
        let ttl = self.idle_ttl;
        let items = self
            .carts
            .get(session)
            .filter(|entry| !entry.is_idle(ttl))
            .map(|entry| entry.items.clone());
        if items.is_none() {
            self.carts.remove_if(session, |_, entry| entry.is_idle(ttl));
        }
        items.unwrap_or_default()
    }

    fn set(&self, session: &str, items: Vec<CartItem>) {
        if items.is_empty() {
            self.carts.remove(session);
            return;
        }
        self.carts.insert(session.to_string(), CartEntry::new(items));
        self.enforce_max_carts();
    }

    fn discard_idle(&self) {
        self.cleanup_expired();
    }
}

/// Cart contents plus the price total.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct CartView {
    /// Items in insertion order.
    pub items: Vec<CartItem>,
    /// Sum of item prices.
    pub total: i64,
}

/// Cart operations over the catalog and a session store.
#[derive(Clone)]
pub struct CartStore {
    catalog: Arc<Catalog>,
    sessions: Arc<dyn CartSessions>,
}

impl CartStore {
    /// Create a cart store.
    #[must_use]
    pub fn new(catalog: Arc<Catalog>, sessions: Arc<dyn CartSessions>) -> Self {
        Self { catalog, sessions }
    }

    /// Append a copy of the product and return the new item count.
    ///
    /// # Errors
    /// Returns `AppError::NotFound` if the product id is not in the catalog.
    pub fn add(&self, session: &str, product_id: i64) -> AppResult<usize> {
        let product = self
            .catalog
            .find(product_id)
            .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
        let mut items = self.sessions.get(session);
        items.push(product.clone());
        let count = items.len();
        self.sessions.set(session, items);
        Ok(count)
    }

    /// Remove the first item with this id, if any, and return the item count.
    pub fn remove(&self, session: &str, product_id: i64) -> usize {
        let mut items = self.sessions.get(session);
        if let Some(pos) = items.iter().position(|item| item.id == product_id) {
            items.remove(pos);
            let count = items.len();
            self.sessions.set(session, items);
            return count;
        }
        items.len()
    }

    /// Discard idle carts in the backing store.
    pub fn discard_idle(&self) {
        self.sessions.discard_idle();
    }

    /// Number of items in the cart.
    #[must_use]
    pub fn count(&self, session: &str) -> usize {
        self.sessions.get(session).len()
    }

    /// Cart items and their total price.
    #[must_use]
    pub fn view(&self, session: &str) -> CartView {
        let items = self.sessions.get(session);
        let total = items.iter().map(|item| item.price).sum();
        CartView { items, total }
    }
}
