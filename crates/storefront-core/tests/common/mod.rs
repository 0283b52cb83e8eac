#![allow(dead_code)]
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use storefront_core::{
    Gender, Order, OrderItem, OrderStatus, Photo, Product, Role, ShippingInfo, User,
};

/// Noon UTC on the given day.
pub fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
}

pub fn product(id: &str, category: &str, stock: u32, created: DateTime<Utc>) -> Product {
    Product {
        id: id.to_string(),
        name: format!("Product {id}"),
        photos: vec![Photo {
            public_id: format!("ph-{id}"),
            url: format!("/uploads/ph-{id}.png"),
        }],
        price: 100.0,
        stock,
        category: category.to_string(),
        description: "fixture".to_string(),
        ratings: 0,
        num_reviews: 0,
        created_at: created,
        updated_at: created,
    }
}

pub fn user(id: &str, gender: Gender, role: Role, dob: (i32, u32, u32), created: DateTime<Utc>) -> User {
    User {
        id: id.to_string(),
        name: format!("User {id}"),
        email: format!("{id}@example.com"),
        photo: String::new(),
        role,
        gender,
        dob: NaiveDate::from_ymd_opt(dob.0, dob.1, dob.2).unwrap(),
        created_at: created,
        updated_at: created,
    }
}

pub fn order(id: &str, total: f64, discount: f64, status: OrderStatus, created: DateTime<Utc>) -> Order {
    Order {
        id: id.to_string(),
        shipping_info: ShippingInfo {
            address: "1 Main St".to_string(),
            city: "Pune".to_string(),
            state: "MH".to_string(),
            country: "India".to_string(),
            pin_code: 411001,
        },
        user: "u-1".to_string(),
        sub_total: total,
        tax: 10.0,
        shipping_charges: 5.0,
        discount,
        total,
        status,
        order_items: vec![OrderItem {
            name: "Lamp".to_string(),
            photo: String::new(),
            price: total,
            quantity: 1,
            product_id: "p-1".to_string(),
        }],
        created_at: created,
        updated_at: created,
    }
}
