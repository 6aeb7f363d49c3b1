use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
use crate::domain::ports::ListingStore;
use crate::domain::query::{ListingQuery, SearchPredicate, SortOrder};
use crate::utils::error::{ListingError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::bson::{doc, oid::ObjectId, Bson, DateTime as BsonDateTime, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{ClientOptions, IndexOptions};
use mongodb::{Client, Collection, IndexModel};
use serde::{Deserialize, Serialize};

const DUPLICATE_KEY_CODE: i32 = 11000;
pub const UNIT_NAME_INDEX: &str = "unitName_1";
pub const UNIT_NUMBER_INDEX: &str = "unitNumber_1";

/// Stored shape of a listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingDocument {
    #[serde(rename = "_id")]
    pub id: ObjectId,
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
    pub beds: i64,
    #[serde(default)]
    pub baths: i64,
    pub regular_price: f64,
    pub created_at: BsonDateTime,
    pub updated_at: BsonDateTime,
}

impl ListingDocument {
    pub fn from_candidate(id: ObjectId, candidate: NewListing, now: BsonDateTime) -> Self {
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
            beds: i64::from(candidate.beds),
            baths: i64::from(candidate.baths),
            regular_price: candidate.regular_price,
            created_at: now,
            updated_at: now,
        }
    }
}

impl TryFrom<ListingDocument> for Listing {
    type Error = ListingError;

    fn try_from(document: ListingDocument) -> Result<Self> {
        let count = |field: &str, value: i64| {
            u32::try_from(value).map_err(|_| ListingError::CorruptRecord {
                message: format!("{} = {} on listing {}", field, value, document.id),
            })
        };
        let beds = count("beds", document.beds)?;
        let baths = count("baths", document.baths)?;

        Ok(Listing {
            id: ListingId::new(document.id.to_hex()),
            user_id: document.user_id,
            project_name: document.project_name,
            unit_name: document.unit_name,
            unit_number: document.unit_number,
            description: document.description,
            address: document.address,
            sell: document.sell,
            rent: document.rent,
            parking_spot: document.parking_spot,
            furnished: document.furnished,
            offer: document.offer,
            beds,
            baths,
            regular_price: document.regular_price,
            created_at: to_chrono(document.created_at),
            updated_at: to_chrono(document.updated_at),
        })
    }
}

fn to_chrono(value: BsonDateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(value.timestamp_millis()).unwrap_or_default()
}

/// Invalid hex never matches any stored listing.
fn parse_object_id(id: &ListingId) -> Option<ObjectId> {
    ObjectId::parse_str(id.as_str()).ok()
}

/// Filter document for `query`, or `None` when nothing can match.
pub fn build_filter(query: &ListingQuery) -> Option<Document> {
    let mut filter = Document::new();

    if let Some(user_id) = &query.user_id {
        filter.insert("userId", user_id.as_str());
    }

    if let Some(listing_id) = &query.listing_id {
        filter.insert("_id", parse_object_id(listing_id)?);
    }

    match &query.search {
        Some(SearchPredicate::UnitNumber(number)) => {
            filter.insert("unitNumber", Bson::Int64(*number));
        }
        Some(SearchPredicate::Fractional(number)) => {
            filter.insert("unitNumber", Bson::Double(*number));
        }
        Some(SearchPredicate::Text(term)) => {
            let pattern = regex::escape(term);
            filter.insert(
                "$or",
                vec![
                    doc! { "projectName": { "$regex": pattern.as_str(), "$options": "i" } },
                    doc! { "unitName": { "$regex": pattern.as_str(), "$options": "i" } },
                ],
            );
        }
        None => {}
    }

    for (field, value) in query.flags.active() {
        filter.insert(field, value);
    }

    Some(filter)
}

pub fn build_sort(order: SortOrder) -> Document {
    let direction = match order {
        SortOrder::Asc => 1,
        SortOrder::Desc => -1,
    };
    doc! { "updatedAt": direction, "_id": direction }
}

pub fn build_update(fields: &ListingUpdate, now: BsonDateTime) -> Document {
    let mut set = Document::new();
    if let Some(v) = &fields.project_name {
        set.insert("projectName", v.as_str());
    }
    if let Some(v) = &fields.unit_name {
        set.insert("unitName", v.as_str());
    }
    if let Some(v) = fields.unit_number {
        set.insert("unitNumber", v);
    }
    if let Some(v) = &fields.description {
        set.insert("description", v.as_str());
    }
    if let Some(v) = &fields.address {
        set.insert("address", v.as_str());
    }
    if let Some(v) = fields.sell {
        set.insert("sell", v);
    }
    if let Some(v) = fields.rent {
        set.insert("rent", v);
    }
    if let Some(v) = fields.parking_spot {
        set.insert("parkingSpot", v);
    }
    if let Some(v) = fields.furnished {
        set.insert("furnished", v);
    }
    if let Some(v) = fields.offer {
        set.insert("offer", v);
    }
    if let Some(v) = fields.beds {
        set.insert("beds", i64::from(v));
    }
    if let Some(v) = fields.baths {
        set.insert("baths", i64::from(v));
    }
    if let Some(v) = fields.regular_price {
        set.insert("regularPrice", v);
    }
    set.insert("updatedAt", now);
    doc! { "$set": set }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    UnitName,
    UnitNumber,
}

/// Which unique index a duplicate-key message refers to.
pub fn duplicate_field(message: &str) -> Option<UniqueField> {
    if message.contains(UNIT_NAME_INDEX) || message.contains("unitName") {
        Some(UniqueField::UnitName)
    } else if message.contains(UNIT_NUMBER_INDEX) || message.contains("unitNumber") {
        Some(UniqueField::UnitNumber)
    } else {
        None
    }
}

fn duplicate_key_message(err: &mongodb::error::Error) -> Option<&str> {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(write_error))
            if write_error.code == DUPLICATE_KEY_CODE =>
        {
            Some(write_error.message.as_str())
        }
        _ => None,
    }
}

/// Maps a unique-index rejection onto the matching domain error.
fn map_write_error(
    err: mongodb::error::Error,
    unit_name: Option<&str>,
    unit_number: Option<i64>,
) -> ListingError {
    match duplicate_key_message(&err).and_then(duplicate_field) {
        Some(UniqueField::UnitName) => ListingError::DuplicateUnitName {
            unit_name: unit_name.unwrap_or_default().to_string(),
        },
        Some(UniqueField::UnitNumber) => ListingError::DuplicateUnitNumber {
            unit_number: unit_number.unwrap_or_default(),
        },
        None => ListingError::Database(err),
    }
}

fn unique_index(field: &str, name: &str) -> IndexModel {
    let mut keys = Document::new();
    keys.insert(field, 1);
    IndexModel::builder()
        .keys(keys)
        .options(
            IndexOptions::builder()
                .unique(true)
                .name(name.to_string())
                .build(),
        )
        .build()
}

/// MongoDB-backed listing store. The collection handle shares the client's
/// connection pool; clone the store (or wrap it in an `Arc`) rather than reconnecting.
#[derive(Debug, Clone)]
pub struct MongoListingStore {
    collection: Collection<ListingDocument>,
}

impl MongoListingStore {
    /// Connects, verifies the server answers, and declares the unique indexes.
    pub async fn connect(url: &str, database: &str, collection: &str) -> Result<Self> {
        let mut options = ClientOptions::parse(url).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        let client = Client::with_options(options)?;

        let db = client.database(database);
        db.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("✅ Connected to MongoDB database '{}'", database);

        let store = Self {
            collection: db.collection(collection),
        };
        store.ensure_indexes().await?;
        Ok(store)
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let indexes = vec![
            unique_index("unitName", UNIT_NAME_INDEX),
            unique_index("unitNumber", UNIT_NUMBER_INDEX),
            IndexModel::builder()
                .keys(doc! { "updatedAt": -1, "_id": -1 })
                .build(),
        ];
        self.collection.create_indexes(indexes).await?;
        tracing::debug!(
            "Ensured indexes on collection '{}'",
            self.collection.name()
        );
        Ok(())
    }

    async fn exists(&self, filter: Document) -> Result<bool> {
        Ok(self.collection.find_one(filter).await?.is_some())
    }
}

#[async_trait]
impl ListingStore for MongoListingStore {
    async fn create(&self, candidate: NewListing) -> Result<ListingId> {
        // 先檢查 unitName 再檢查 unitNumber，唯一索引負責處理併發寫入
        if self
            .exists(doc! { "unitName": candidate.unit_name.as_str() })
            .await?
        {
            return Err(ListingError::DuplicateUnitName {
                unit_name: candidate.unit_name,
            });
        }
        if self
            .exists(doc! { "unitNumber": candidate.unit_number })
            .await?
        {
            return Err(ListingError::DuplicateUnitNumber {
                unit_number: candidate.unit_number,
            });
        }

        let unit_name = candidate.unit_name.clone();
        let unit_number = candidate.unit_number;
        let document = ListingDocument::from_candidate(ObjectId::new(), candidate, BsonDateTime::now());
        let id = document.id;

        self.collection
            .insert_one(&document)
            .await
            .map_err(|e| map_write_error(e, Some(&unit_name), Some(unit_number)))?;

        Ok(ListingId::new(id.to_hex()))
    }

    async fn update_by_id(&self, id: &ListingId, fields: &ListingUpdate) -> Result<ListingId> {
        let oid = parse_object_id(id).ok_or_else(|| ListingError::NotFound { id: id.to_string() })?;
        let update = build_update(fields, BsonDateTime::now());

        let result = self
            .collection
            .update_one(doc! { "_id": oid }, update)
            .await
            .map_err(|e| map_write_error(e, fields.unit_name.as_deref(), fields.unit_number))?;

        if result.matched_count == 0 {
            return Err(ListingError::NotFound { id: id.to_string() });
        }
        Ok(id.clone())
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<()> {
        let oid = parse_object_id(id).ok_or_else(|| ListingError::NotFound { id: id.to_string() })?;
        let result = self.collection.delete_one(doc! { "_id": oid }).await?;
        if result.deleted_count == 0 {
            return Err(ListingError::NotFound { id: id.to_string() });
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>> {
        let Some(oid) = parse_object_id(id) else {
            return Ok(None);
        };
        self.collection
            .find_one(doc! { "_id": oid })
            .await?
            .map(Listing::try_from)
            .transpose()
    }

    async fn query(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        // limit(0) 在 MongoDB 代表不限筆數，這裡必須回傳空頁
        if query.limit == 0 {
            return Ok(Vec::new());
        }
        let Some(filter) = build_filter(query) else {
            return Ok(Vec::new());
        };
        tracing::debug!("MongoDB listing filter: {}", filter);

        let limit = i64::try_from(query.limit).unwrap_or(i64::MAX);
        let mut cursor = self
            .collection
            .find(filter)
            .sort(build_sort(query.order))
            .skip(query.start_index as u64)
            .limit(limit)
            .await?;

        let mut listings = Vec::with_capacity(query.limit.min(64));
        while cursor.advance().await? {
            let document = cursor.deserialize_current()?;
            listings.push(Listing::try_from(document)?);
        }
        Ok(listings)
    }

    fn backend_name(&self) -> &'static str {
        "mongodb"
    }
}
