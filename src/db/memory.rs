//! In-memory brand store

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use bson::oid::ObjectId;
use parking_lot::RwLock;

use super::brands::{Brand, Upserted};
use super::{now_millis, BrandStore, Result, StoreError};

/// Brand store kept in process memory, keyed by name
#[derive(Default)]
pub struct MemoryBrandStore {
    brands: RwLock<HashMap<String, Brand>>,
}

impl MemoryBrandStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.brands.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.brands.read().is_empty()
    }
}

#[async_trait]
impl BrandStore for MemoryBrandStore {
    async fn list_names(&self) -> Result<Vec<String>> {
        Ok(self.brands.read().keys().cloned().collect())
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Brand>> {
        Ok(self.brands.read().get(name).cloned())
    }

    async fn create(&self, name: &str, details: &str) -> Result<Brand> {
        match self.brands.write().entry(name.to_string()) {
            Entry::Occupied(_) => Err(StoreError::Conflict(name.to_string())),
            Entry::Vacant(slot) => {
                let now = now_millis();
                let brand = Brand {
                    id: ObjectId::new().to_hex(),
                    name: name.to_string(),
                    details: details.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                Ok(slot.insert(brand).clone())
            }
        }
    }

    async fn update_details(&self, name: &str, details: &str) -> Result<Option<Brand>> {
        let mut brands = self.brands.write();
        let updated = brands.get_mut(name).map(|brand| {
            brand.details = details.to_string();
            brand.updated_at = now_millis();
            brand.clone()
        });
        Ok(updated)
    }

    async fn upsert_details(&self, name: &str, details: &str) -> Result<Upserted> {
        let mut brands = self.brands.write();
        // Stamp under the lock so no record can be created after this read
        let now = now_millis();
        let upserted = match brands.entry(name.to_string()) {
            Entry::Occupied(mut slot) => {
                let brand = slot.get_mut();
                brand.details = details.to_string();
                brand.updated_at = now;
                Upserted {
                    brand: brand.clone(),
                    created: false,
                }
            }
            Entry::Vacant(slot) => {
                let brand = Brand {
                    id: ObjectId::new().to_hex(),
                    name: name.to_string(),
                    details: details.to_string(),
                    created_at: now,
                    updated_at: now,
                };
                Upserted {
                    brand: slot.insert(brand).clone(),
                    created: true,
                }
            }
        };
        Ok(upserted)
    }

    async fn delete(&self, name: &str) -> Result<bool> {
        Ok(self.brands.write().remove(name).is_some())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
