use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::non_empty;
use crate::document::{Document, new_id};
use crate::error::{Result, StorefrontError};

/// A stored product photo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    pub public_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub photos: Vec<Photo>,
    pub price: f64,
    pub stock: u32,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub ratings: u8,
    #[serde(default)]
    pub num_reviews: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Photo ids to release from object storage when the product goes away.
    pub fn photo_ids(&self) -> Vec<String> {
        self.photos.iter().map(|p| p.public_id.clone()).collect()
    }

    /// Recomputes the floor-average rating and review count.
    pub fn apply_ratings(&mut self, ratings: &[u8]) {
        self.num_reviews = ratings.len() as u32;
        self.ratings = if ratings.is_empty() {
            0
        } else {
            let total: u32 = ratings.iter().map(|r| u32::from(*r)).sum();
            (total / ratings.len() as u32) as u8
        };
    }
}

impl Document for Product {
    const COLLECTION: &'static str = "products";
    const ENTITY: &'static str = "Product";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Product fields collected from a create request.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl NewProduct {
    /// Validates the fields and builds the product around already uploaded photos.
    pub fn into_product(self, photos: Vec<Photo>, now: DateTime<Utc>) -> Result<Product> {
        let missing = || StorefrontError::validation("product", "Please enter all fields");

        let name = non_empty(self.name).ok_or_else(missing)?;
        let category = non_empty(self.category).ok_or_else(missing)?;
        let description = non_empty(self.description).ok_or_else(missing)?;
        let stock = self.stock.ok_or_else(missing)?;
        let price = self.price.filter(|p| *p > 0.0).ok_or_else(missing)?;

        Ok(Product {
            id: new_id(),
            name,
            photos,
            price,
            stock,
            category: category.to_lowercase(),
            description,
            ratings: 0,
            num_reviews: 0,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Partial update; absent fields keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<u32>,
    pub category: Option<String>,
    pub description: Option<String>,
}

impl ProductPatch {
    pub fn apply(self, product: &mut Product, now: DateTime<Utc>) -> Result<()> {
        if let Some(price) = self.price {
            if price <= 0.0 {
                return Err(StorefrontError::validation(
                    "price",
                    "Price must be greater than zero",
                ));
            }
            product.price = price;
        }
        if let Some(name) = non_empty(self.name) {
            product.name = name;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
        if let Some(category) = non_empty(self.category) {
            product.category = category.to_lowercase();
        }
        if let Some(description) = non_empty(self.description) {
            product.description = description;
        }
        product.updated_at = now;
        Ok(())
    }
}
