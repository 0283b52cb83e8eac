use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::document::{Document, new_id};
use crate::error::{Result, StorefrontError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    #[serde(rename = "_id")]
    pub id: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    /// Author user id.
    pub user: String,
    /// Reviewed product id.
    pub product: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Document for Review {
    const COLLECTION: &'static str = "reviews";
    const ENTITY: &'static str = "Review";

    fn id(&self) -> &str {
        &self.id
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewReview {
    pub rating: Option<u8>,
    pub comment: Option<String>,
}

impl NewReview {
    fn checked_rating(&self) -> Result<u8> {
        match self.rating {
            None => Err(StorefrontError::validation(
                "rating",
                "Please provide a rating",
            )),
            Some(r) if !(1..=5).contains(&r) => Err(StorefrontError::validation(
                "rating",
                "Rating must be between 1 and 5",
            )),
            Some(r) => Ok(r),
        }
    }

    /// Builds a fresh review by `user` on `product`.
    pub fn into_review(self, user: &str, product: &str, now: DateTime<Utc>) -> Result<Review> {
        let rating = self.checked_rating()?;
        Ok(Review {
            id: new_id(),
            rating,
            comment: self.comment.filter(|c| !c.trim().is_empty()),
            user: user.to_string(),
            product: product.to_string(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Overwrites an existing review by the same author.
    pub fn apply_to(self, review: &mut Review, now: DateTime<Utc>) -> Result<()> {
        review.rating = self.checked_rating()?;
        if let Some(comment) = self.comment.filter(|c| !c.trim().is_empty()) {
            review.comment = Some(comment);
        }
        review.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_is_required() {
        let err = NewReview::default()
            .into_review("u-1", "p-1", Utc::now())
            .unwrap_err();
        assert_eq!(err.to_string(), "Please provide a rating");
    }

    #[test]
    fn test_rating_out_of_range() {
        let body = NewReview {
            rating: Some(6),
            comment: None,
        };
        assert!(body.into_review("u-1", "p-1", Utc::now()).is_err());
    }

    #[test]
    fn test_update_keeps_comment_when_absent() {
        let mut review = NewReview {
            rating: Some(3),
            comment: Some("ok".into()),
        }
        .into_review("u-1", "p-1", Utc::now())
        .unwrap();

        NewReview {
            rating: Some(5),
            comment: None,
        }
        .apply_to(&mut review, Utc::now())
        .unwrap();

        assert_eq!(review.rating, 5);
        assert_eq!(review.comment.as_deref(), Some("ok"));
    }
}
