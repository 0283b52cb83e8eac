use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::user::non_empty;
use crate::document::{Document, new_id};
use crate::error::{Result, StorefrontError};

/// Fulfillment state. Orders only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderStatus {
    #[default]
    Processing,
    Shipped,
    Delivered,
}

impl OrderStatus {
    /// The state an order moves to when processed.
    pub fn advance(self) -> Self {
        match self {
            Self::Processing => Self::Shipped,
            Self::Shipped | Self::Delivered => Self::Delivered,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub pin_code: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    pub name: String,
    pub photo: String,
    pub price: f64,
    pub quantity: u32,
    pub product_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: String,
    pub shipping_info: ShippingInfo,
    /// Buyer user id.
    pub user: String,
    pub sub_total: f64,
    pub tax: f64,
    pub shipping_charges: f64,
    pub discount: f64,
    pub total: f64,
    #[serde(default)]
    pub status: OrderStatus,
    pub order_items: Vec<OrderItem>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Ids of every product referenced by the order, in item order.
    pub fn product_ids(&self) -> Vec<String> {
        self.order_items
            .iter()
            .map(|item| item.product_id.clone())
            .collect()
    }
}

impl Document for Order {
    const COLLECTION: &'static str = "orders";
    const ENTITY: &'static str = "Order";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Checkout body. Charges default to zero; the rest is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewOrder {
    pub shipping_info: Option<ShippingInfo>,
    pub order_items: Option<Vec<OrderItem>>,
    pub user: Option<String>,
    pub sub_total: Option<f64>,
    pub tax: Option<f64>,
    pub shipping_charges: Option<f64>,
    pub discount: Option<f64>,
    pub total: Option<f64>,
}

impl NewOrder {
    pub fn into_order(self, now: DateTime<Utc>) -> Result<Order> {
        let missing = || StorefrontError::validation("order", "Please enter all fields");

        let shipping_info = self.shipping_info.ok_or_else(missing)?;
        let order_items = self
            .order_items
            .filter(|items| !items.is_empty())
            .ok_or_else(missing)?;
        let user = non_empty(self.user).ok_or_else(missing)?;
        let sub_total = self.sub_total.filter(|v| *v > 0.0).ok_or_else(missing)?;
        let total = self.total.filter(|v| *v > 0.0).ok_or_else(missing)?;

        if let Some(item) = order_items.iter().find(|item| item.quantity == 0) {
            return Err(StorefrontError::validation(
                "orderItems",
                format!("Quantity for {} must be at least 1", item.name),
            ));
        }

        Ok(Order {
            id: new_id(),
            shipping_info,
            user,
            sub_total,
            tax: self.tax.unwrap_or_default(),
            shipping_charges: self.shipping_charges.unwrap_or_default(),
            discount: self.discount.unwrap_or_default(),
            total,
            status: OrderStatus::Processing,
            order_items,
            created_at: now,
            updated_at: now,
        })
    }
}
