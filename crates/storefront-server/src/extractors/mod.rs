//! Request extractors.

pub mod caller;
pub mod multipart;
pub mod path;
pub mod query;

pub use caller::{AdminUser, Caller, USER_ID_HEADER};
pub use multipart::{ProductForm, read_product_form};
pub use path::IdPath;
pub use query::{DiscountQuery, MyOrdersQuery, SearchQuery};
