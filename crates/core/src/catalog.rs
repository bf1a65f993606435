//! Product catalog.
//!
//! Plain CRUD over an ordered list of products. IDs are assigned as
//! `max(existing ids, 0) + 1`, so deleting the highest product frees its ID
//! for the next insert. There is no concurrency control beyond the caller's
//! lock; the last writer wins.

use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{ProductError, RegistryError, Result};
use crate::persistence::{StateStore, keys, load_collection, save_collection};
use crate::types::{Price, ProductId};

const LABEL_NEW: &str = "Yeni Ürün";
const LABEL_SOLD_OUT: &str = "Tükendi";
const COLOR_NEW: &str = "#EAB308";
const COLOR_SOLD_OUT: &str = "#EF4444";

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    /// Image URL or inline `data:` URI.
    pub image: String,
    /// Outbound purchase link.
    pub link: String,
    pub in_stock: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_color: Option<String>,
}

/// Product input before an ID has been assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub link: String,
    #[serde(default = "default_in_stock")]
    pub in_stock: bool,
    #[serde(default)]
    pub label_text: Option<String>,
    #[serde(default)]
    pub label_color: Option<String>,
}

const fn default_in_stock() -> bool {
    true
}

impl NewProduct {
    /// Check the fields an admin must fill in.
    ///
    /// # Errors
    ///
    /// Returns `ProductError` if the name is blank, both image and link are
    /// blank, or the price is not positive.
    pub fn validate(&self) -> std::result::Result<(), ProductError> {
        validate_fields(&self.name, &self.image, &self.link, self.price)
    }

    /// Attach an ID without validating.
    #[must_use]
    pub fn into_product(self, id: ProductId) -> Product {
        Product {
            id,
            name: self.name,
            price: self.price,
            image: self.image,
            link: self.link,
            in_stock: self.in_stock,
            label_text: self.label_text,
            label_color: self.label_color,
        }
    }
}

impl Product {
    /// Check the fields an admin must fill in.
    ///
    /// # Errors
    ///
    /// See [`NewProduct::validate`].
    pub fn validate(&self) -> std::result::Result<(), ProductError> {
        validate_fields(&self.name, &self.image, &self.link, self.price)
    }
}

fn validate_fields(
    name: &str,
    image: &str,
    link: &str,
    price: Price,
) -> std::result::Result<(), ProductError> {
    if name.trim().is_empty() {
        return Err(ProductError::MissingName);
    }
    if image.trim().is_empty() && link.trim().is_empty() {
        return Err(ProductError::MissingImageAndLink);
    }
    if !price.is_positive() {
        return Err(ProductError::Price(crate::types::PriceError::NotPositive));
    }
    Ok(())
}

/// The product catalog, mirrored to a [`StateStore`] under `products`.
pub struct ProductCatalog {
    store: Arc<dyn StateStore>,
    products: Vec<Product>,
    seeded: bool,
}

impl ProductCatalog {
    /// Load the catalog, seeding the demo products when nothing is stored.
    #[must_use]
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let (products, seeded) = match load_collection(store.as_ref(), keys::PRODUCTS) {
            Some(products) => (products, false),
            None => {
                tracing::info!("No stored catalog, seeding default products");
                (default_products(), true)
            }
        };
        Self {
            store,
            products,
            seeded,
        }
    }

    /// Whether [`load`](Self::load) fell back to the demo products.
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// All products in insertion order.
    #[must_use]
    pub fn list(&self) -> &[Product] {
        &self.products
    }

    /// Look up a product by ID.
    #[must_use]
    pub fn get(&self, id: ProductId) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    /// The ID the next [`add`](Self::add) will assign.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::IdsExhausted` if a stored product already
    /// holds `i64::MAX`.
    pub fn next_id(&self) -> Result<ProductId> {
        self.products
            .iter()
            .map(|p| p.id.as_i64())
            .fold(0, i64::max)
            .checked_add(1)
            .map(ProductId::new)
            .ok_or(RegistryError::IdsExhausted)
    }

    /// Validate and append a product.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidProduct` for bad input,
    /// `RegistryError::IdsExhausted` when no ID is left, or
    /// `RegistryError::Storage` if the catalog cannot be saved.
    pub fn add(&mut self, product: NewProduct) -> Result<Product> {
        product.validate()?;
        let product = product.into_product(self.next_id()?);

        let mut next = self.products.clone();
        next.push(product.clone());
        self.commit(next)?;

        tracing::info!(product_id = %product.id, name = %product.name, "Product added");
        Ok(product)
    }

    /// Replace the product with the same ID.
    ///
    /// Returns `false` without writing anything if no product has that ID.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidProduct` for bad input or
    /// `RegistryError::Storage` if the catalog cannot be saved.
    pub fn update(&mut self, product: Product) -> Result<bool> {
        product.validate()?;
        if self.get(product.id).is_none() {
            return Ok(false);
        }

        let next = self
            .products
            .iter()
            .map(|p| if p.id == product.id { product.clone() } else { p.clone() })
            .collect();
        self.commit(next)?;

        tracing::info!(product_id = %product.id, "Product updated");
        Ok(true)
    }

    /// Remove the product with `id`. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the catalog cannot be saved.
    pub fn delete(&mut self, id: ProductId) -> Result<bool> {
        if self.get(id).is_none() {
            return Ok(false);
        }

        let next = self.products.iter().filter(|p| p.id != id).cloned().collect();
        self.commit(next)?;

        tracing::info!(product_id = %id, "Product deleted");
        Ok(true)
    }

    /// Write the current catalog to the store.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the write fails.
    pub fn persist(&self) -> Result<()> {
        save_collection(self.store.as_ref(), keys::PRODUCTS, &self.products)?;
        Ok(())
    }

    fn commit(&mut self, next: Vec<Product>) -> Result<()> {
        save_collection(self.store.as_ref(), keys::PRODUCTS, &next)?;
        self.products = next;
        Ok(())
    }
}

/// The demo catalog used when nothing has been stored yet.
#[must_use]
pub fn default_products() -> Vec<Product> {
    let demo = |id: i64, name: &str, cents: i64, photo: &str, in_stock: bool| {
        let (label, color) = if in_stock {
            (LABEL_NEW, COLOR_NEW)
        } else {
            (LABEL_SOLD_OUT, COLOR_SOLD_OUT)
        };
        Product {
            id: ProductId::new(id),
            name: name.to_owned(),
            price: Price::new_unchecked(Decimal::new(cents, 2)),
            image: format!(
                "https://images.unsplash.com/photo-{photo}?auto=format&fit=crop&w=500&q=80"
            ),
            link: format!("https://example.com/product{id}"),
            in_stock,
            label_text: Some(label.to_owned()),
            label_color: Some(color.to_owned()),
        }
    };

    vec![
        demo(1, "Gaming Headset Pro", 399_999, "1618366712010-f4ae9c647dcb", true),
        demo(2, "Mechanical Keyboard", 489_999, "1618384887929-16ec33fab9ef", false),
        demo(3, "Gaming Mouse", 249_999, "1615663245857-ac93bb7c39e7", true),
        demo(4, "Gaming Monitor", 899_999, "1616763355603-9755a640a287", true),
        demo(5, "Gaming Chair", 749_999, "1610395219791-21b0353e43cb", false),
        demo(6, "Gaming Console", 1_499_999, "1605901309584-818e25960a8f", true),
    ]
}
