//! Brand records

use bson::oid::ObjectId;
use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Brand record as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Brand {
    pub id: String,
    pub name: String,
    pub details: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Result of an upsert
#[derive(Debug, Clone)]
pub struct Upserted {
    pub brand: Brand,
    /// True when the upsert inserted a new brand
    pub created: bool,
}

/// Create brand request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBrand {
    pub name: Option<String>,
    pub details: Option<String>,
}

/// Update brand request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateBrand {
    pub details: Option<String>,
}

/// Brand as stored in the collection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BrandDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    #[serde(default)]
    pub details: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<BrandDocument> for Brand {
    fn from(doc: BrandDocument) -> Self {
        Brand {
            id: doc.id.to_hex(),
            name: doc.name,
            details: doc.details,
            created_at: doc.created_at,
            updated_at: doc.updated_at,
        }
    }
}
