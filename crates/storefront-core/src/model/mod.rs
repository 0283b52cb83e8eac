//! Domain documents and their write bodies.

pub mod coupon;
pub mod order;
pub mod product;
pub mod review;
pub mod user;

pub use coupon::{Coupon, CouponBody};
pub use order::{NewOrder, Order, OrderItem, OrderStatus, ShippingInfo};
pub use product::{NewProduct, Photo, Product, ProductPatch};
pub use review::{NewReview, Review};
pub use user::{Gender, NewUser, Role, User};
