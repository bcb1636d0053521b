//! Static product catalog, built once at startup and shared read-only.

use serde::{Deserialize, Serialize};

/// A product in the shop.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Product id used by the cart endpoints.
    pub id: i64,
    /// Display name.
    pub name: String,
    /// Price in whole currency units.
    pub price: i64,
    /// Emoji shown instead of a picture.
    pub image: String,
    /// Short description.
    pub description: String,
}

/// Immutable product list.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Wrap a product list.
    #[must_use]
    pub const fn new(products: Vec<Product>) -> Self {
        Self { products }
    }

    /// The agency's packaged offerings.
    #[must_use]
    pub fn agency_default() -> Self {
        let product = |id: i64, name: &str, price: i64, image: &str, description: &str| Product {
            id,
            name: name.to_string(),
            price,
            image: image.to_string(),
            description: description.to_string(),
        };
        Self::new(vec![
            product(1, "AI Chatbot Start", 500, "🤖", "Chatbot za sajt sa osnovnom bazom znanja."),
            product(2, "AI Chatbot Pro", 1200, "🧠", "Chatbot sa dokumentima, istorijom i analitikom."),
            product(3, "Automatizacija", 1000, "⚙️", "Povezivanje AI modela sa vašim alatima."),
            product(4, "Konsultacije (1h)", 50, "💬", "Sat vremena razgovora o uvođenju AI u vaš biznis."),
        ])
    }

    /// All products in display order.
    #[must_use]
    pub fn products(&self) -> &[Product] {
        &self.products
    }

    /// Find a product by id.
    #[must_use]
    pub fn find(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}
