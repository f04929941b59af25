//! MongoDB brand store

use async_trait::async_trait;
use bson::{doc, oid::ObjectId};
use futures::TryStreamExt;
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::{
    ClientOptions, CountOptions, FindOneAndUpdateOptions, FindOptions, IndexOptions, ReturnDocument,
};
use mongodb::{Client, Collection, Database, IndexModel};
use serde::Deserialize;

use super::brands::{Brand, BrandDocument, Upserted};
use super::{now_millis, BrandStore, Result, StoreError};
use crate::config::DatabaseConfig;

/// Server error code for unique index violations
const DUPLICATE_KEY: i32 = 11000;

/// Brand store backed by one MongoDB collection
#[derive(Clone)]
pub struct MongoBrandStore {
    client: Client,
    database: Database,
    collection: Collection<BrandDocument>,
}

#[derive(Deserialize)]
struct NameOnly {
    name: String,
}

impl MongoBrandStore {
    /// Connect, verify the connection and ensure indexes.
    ///
    /// Any failure here is fatal for the server, so nothing is deferred to the
    /// background.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        options.app_name = Some(env!("CARGO_PKG_NAME").to_string());
        options.connect_timeout = Some(config.connect_timeout);
        options.server_selection_timeout = Some(config.connect_timeout);

        let client = Client::with_options(options)?;
        let store = Self::new(client, &config.database, &config.collection);

        store.ping().await?;
        tracing::info!("Successfully connected and pinged MongoDB");

        store.ensure_indexes().await?;

        Ok(store)
    }

    pub fn new(client: Client, database: &str, collection: &str) -> Self {
        let database = client.database(database);
        let collection = database.collection::<BrandDocument>(collection);
        Self {
            client,
            database,
            collection,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    /// Create the unique index on `name`
    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder().unique(true).build())
            .build();

        self.collection.create_index(index, None).await?;
        tracing::info!(
            collection = %self.collection.name(),
            "Unique index on 'name' field ensured"
        );
        Ok(())
    }
}

#[async_trait]
impl BrandStore for MongoBrandStore {
    async fn list_names(&self) -> Result<Vec<String>> {
        let options = FindOptions::builder()
            .projection(doc! { "name": 1, "_id": 0 })
            .build();

        let names: Vec<NameOnly> = self
            .collection
            .clone_with_type::<NameOnly>()
            .find(doc! {}, options)
            .await?
            .try_collect()
            .await?;

        Ok(names.into_iter().map(|n| n.name).collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Brand>> {
        let brand = self
            .collection
            .find_one(doc! { "name": name }, None)
            .await?
            .map(Brand::from);

        Ok(brand)
    }

    async fn create(&self, name: &str, details: &str) -> Result<Brand> {
        // Clearer conflict before the insert; the unique index still decides races
        let options = CountOptions::builder().limit(1_u64).build();
        let existing = self
            .collection
            .count_documents(doc! { "name": name }, options)
            .await?;
        if existing > 0 {
            return Err(StoreError::Conflict(name.to_string()));
        }

        let now = now_millis();
        let document = BrandDocument {
            id: ObjectId::new(),
            name: name.to_string(),
            details: details.to_string(),
            created_at: now,
            updated_at: now,
        };

        match self.collection.insert_one(&document, None).await {
            Ok(_) => Ok(document.into()),
            Err(e) if is_duplicate_key(&e) => Err(StoreError::Conflict(name.to_string())),
            Err(e) => Err(e.into()),
        }
    }

    async fn update_details(&self, name: &str, details: &str) -> Result<Option<Brand>> {
        let now = bson::DateTime::from_chrono(now_millis());
        // $max: a record written after our clock read keeps its own stamp
        let update = doc! {
            "$set": { "details": details },
            "$max": { "updatedAt": now },
        };
        let options = FindOneAndUpdateOptions::builder()
            .return_document(ReturnDocument::After)
            .build();

        let updated = self
            .collection
            .find_one_and_update(doc! { "name": name }, update, options)
            .await?
            .map(Brand::from);

        Ok(updated)
    }

    async fn upsert_details(&self, name: &str, details: &str) -> Result<Upserted> {
        let now = now_millis();
        let bson_now = bson::DateTime::from_chrono(now);
        let new_id = ObjectId::new();

        let update = doc! {
            "$set": { "details": details },
            "$max": { "updatedAt": bson_now },
            "$setOnInsert": { "_id": new_id, "name": name, "createdAt": bson_now },
        };
        // The pre-image tells insert from update: no pre-image means the
        // document did not exist.
        let options = FindOneAndUpdateOptions::builder()
            .upsert(true)
            .return_document(ReturnDocument::Before)
            .build();

        let before = match self
            .collection
            .find_one_and_update(doc! { "name": name }, update, options)
            .await
        {
            Ok(before) => before,
            Err(e) if is_duplicate_key(&e) => return Err(StoreError::Conflict(name.to_string())),
            Err(e) => return Err(e.into()),
        };

        let upserted = match before {
            Some(existing) => Upserted {
                brand: Brand {
                    details: details.to_string(),
                    updated_at: now.max(existing.updated_at),
                    ..existing.into()
                },
                created: false,
            },
            None => Upserted {
                brand: Brand {
                    id: new_id.to_hex(),
                    name: name.to_string(),
                    details: details.to_string(),
                    created_at: now,
                    updated_at: now,
                },
                created: true,
            },
        };

        Ok(upserted)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        let result = self.collection.delete_one(doc! { "name": name }, None).await?;
        Ok(result.deleted_count > 0)
    }

    async fn ping(&self) -> Result<()> {
        self.database.run_command(doc! { "ping": 1 }, None).await?;
        Ok(())
    }
}

fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY,
        _ => false,
    }
}
