use serde::{Deserialize, Serialize};

use super::user::non_empty;
use crate::document::{Document, new_id};
use crate::error::{Result, StorefrontError};

/// A discount code worth a fixed amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coupon {
    #[serde(rename = "_id")]
    pub id: String,
    pub code: String,
    pub amount: f64,
}

impl Document for Coupon {
    const COLLECTION: &'static str = "coupons";
    const ENTITY: &'static str = "Coupon";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Create and update body. On update, absent fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CouponBody {
    pub code: Option<String>,
    pub amount: Option<f64>,
}

impl CouponBody {
    pub fn into_coupon(self) -> Result<Coupon> {
        let missing = || StorefrontError::validation("coupon", "Please enter all fields");
        let code = non_empty(self.code).ok_or_else(missing)?;
        let amount = self.amount.filter(|a| *a > 0.0).ok_or_else(missing)?;

        Ok(Coupon {
            id: new_id(),
            code,
            amount,
        })
    }

    pub fn apply(self, coupon: &mut Coupon) {
        if let Some(code) = non_empty(self.code) {
            coupon.code = code;
        }
        if let Some(amount) = self.amount.filter(|a| *a > 0.0) {
            coupon.amount = amount;
        }
    }
}
