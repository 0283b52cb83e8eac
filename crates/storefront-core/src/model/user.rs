use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{Result, StorefrontError};

/// Authorization role carried by a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    #[default]
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

/// A registered customer or administrator.
///
/// The id is provided by the client (it comes from the external identity
/// provider), not generated by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
    pub photo: String,
    #[serde(default)]
    pub role: Role,
    pub gender: Gender,
    pub dob: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Age in whole years on the given day.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.dob).unwrap_or(0)
    }
}

impl Document for User {
    const COLLECTION: &'static str = "users";
    const ENTITY: &'static str = "User";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Body of a registration request. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NewUser {
    #[serde(rename = "_id")]
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub photo: Option<String>,
    pub gender: Option<Gender>,
    pub dob: Option<String>,
}

impl NewUser {
    /// Validates the body and builds the user document.
    pub fn into_user(self, now: DateTime<Utc>) -> Result<User> {
        let missing = || StorefrontError::validation("user", "Please enter all fields");

        let id = non_empty(self.id).ok_or_else(missing)?;
        let name = non_empty(self.name).ok_or_else(missing)?;
        let email = non_empty(self.email).ok_or_else(missing)?;
        let photo = non_empty(self.photo).ok_or_else(missing)?;
        let gender = self.gender.ok_or_else(missing)?;
        let dob = non_empty(self.dob).ok_or_else(missing)?;
        let dob = parse_date(&dob)
            .ok_or_else(|| StorefrontError::validation("dob", "Invalid date of birth"))?;

        Ok(User {
            id,
            name,
            email,
            photo,
            role: Role::User,
            gender,
            dob,
            created_at: now,
            updated_at: now,
        })
    }
}

/// Accepts `YYYY-MM-DD` or a full RFC 3339 timestamp.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(raw)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
