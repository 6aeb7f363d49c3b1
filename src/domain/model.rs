use crate::utils::error::{ListingError, Result};
use crate::utils::validation::{require_price, require_text, Validate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque listing identifier, a 24-character hex object id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ListingId(String);

impl ListingId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ListingId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for ListingId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// A persisted property listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Listing {
    pub id: ListingId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub project_name: String,
    pub unit_name: String,
    pub unit_number: i64,
    pub description: String,
    pub address: String,
    pub sell: bool,
    pub rent: bool,
    pub parking_spot: bool,
    pub furnished: bool,
    pub offer: bool,
    pub beds: u32,
    pub baths: u32,
    pub regular_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Listing {
    pub fn from_candidate(id: ListingId, candidate: NewListing, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: candidate.user_id,
            project_name: candidate.project_name,
            unit_name: candidate.unit_name,
            unit_number: candidate.unit_number,
            description: candidate.description,
            address: candidate.address,
            sell: candidate.sell,
            rent: candidate.rent,
            parking_spot: candidate.parking_spot,
            furnished: candidate.furnished,
            offer: candidate.offer,
            beds: candidate.beds,
            baths: candidate.baths,
            regular_price: candidate.regular_price,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing fields supplied by a caller at creation; `id` and timestamps are assigned by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewListing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub project_name: String,
    pub unit_name: String,
    pub unit_number: i64,
    pub description: String,
    pub address: String,
    #[serde(default)]
    pub sell: bool,
    #[serde(default)]
    pub rent: bool,
    #[serde(default)]
    pub parking_spot: bool,
    #[serde(default)]
    pub furnished: bool,
    #[serde(default)]
    pub offer: bool,
    #[serde(default)]
    pub beds: u32,
    #[serde(default)]
    pub baths: u32,
    pub regular_price: f64,
}

impl Validate for NewListing {
    fn validate(&self) -> Result<()> {
        require_text("projectName", &self.project_name)?;
        require_text("unitName", &self.unit_name)?;
        require_text("description", &self.description)?;
        require_text("address", &self.address)?;
        require_price("regularPrice", self.regular_price)?;
        Ok(())
    }
}

/// Partial update. Only the fields that are `Some` are written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_number: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sell: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rent: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parking_spot: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnished: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub beds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub baths: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regular_price: Option<f64>,
}

impl ListingUpdate {
    pub fn is_empty(&self) -> bool {
        self == &ListingUpdate::default()
    }

    /// Writes the supplied fields onto `listing` and stamps `updated_at`.
    pub fn apply_to(&self, listing: &mut Listing, now: DateTime<Utc>) {
        if let Some(v) = &self.project_name {
            listing.project_name = v.clone();
        }
        if let Some(v) = &self.unit_name {
            listing.unit_name = v.clone();
        }
        if let Some(v) = self.unit_number {
            listing.unit_number = v;
        }
        if let Some(v) = &self.description {
            listing.description = v.clone();
        }
        if let Some(v) = &self.address {
            listing.address = v.clone();
        }
        if let Some(v) = self.sell {
            listing.sell = v;
        }
        if let Some(v) = self.rent {
            listing.rent = v;
        }
        if let Some(v) = self.parking_spot {
            listing.parking_spot = v;
        }
        if let Some(v) = self.furnished {
            listing.furnished = v;
        }
        if let Some(v) = self.offer {
            listing.offer = v;
        }
        if let Some(v) = self.beds {
            listing.beds = v;
        }
        if let Some(v) = self.baths {
            listing.baths = v;
        }
        if let Some(v) = self.regular_price {
            listing.regular_price = v;
        }
        listing.updated_at = now;
    }
}

impl Validate for ListingUpdate {
    fn validate(&self) -> Result<()> {
        if self.is_empty() {
            return Err(ListingError::InvalidListing {
                field: "update".to_string(),
                reason: "at least one field must be supplied".to_string(),
            });
        }
        let text_fields = [
            ("projectName", &self.project_name),
            ("unitName", &self.unit_name),
            ("description", &self.description),
            ("address", &self.address),
        ];
        for (field, value) in text_fields {
            if let Some(value) = value {
                require_text(field, value)?;
            }
        }
        if let Some(price) = self.regular_price {
            require_price("regularPrice", price)?;
        }
        Ok(())
    }
}
