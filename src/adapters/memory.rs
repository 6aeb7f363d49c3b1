use crate::domain::model::{Listing, ListingId, ListingUpdate, NewListing};
use crate::domain::ports::ListingStore;
use crate::domain::query::ListingQuery;
use crate::utils::error::{ListingError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use mongodb::bson::oid::ObjectId;
use std::collections::BTreeMap;
use tokio::sync::Mutex;

/// In-process listing store. Every operation runs under one lock, so the
/// uniqueness checks and the write they guard are atomic.
#[derive(Debug, Default)]
pub struct InMemoryListingStore {
    state: Mutex<MemoryState>,
}

#[derive(Debug, Default)]
struct MemoryState {
    listings: BTreeMap<ListingId, Listing>,
    last_stamp: Option<DateTime<Utc>>,
}

impl MemoryState {
    /// Millisecond timestamps, strictly increasing within this store.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let stamp = match self.last_stamp {
            Some(last) if now <= last => last + Duration::milliseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }

    fn check_unique(
        &self,
        unit_name: Option<&str>,
        unit_number: Option<i64>,
        except: Option<&ListingId>,
    ) -> Result<()> {
        let others = move || {
            self.listings
                .values()
                .filter(move |listing| Some(&listing.id) != except)
        };
        if let Some(name) = unit_name {
            if others().any(|listing| listing.unit_name == name) {
                return Err(ListingError::DuplicateUnitName {
                    unit_name: name.to_string(),
                });
            }
        }
        if let Some(number) = unit_number {
            if others().any(|listing| listing.unit_number == number) {
                return Err(ListingError::DuplicateUnitNumber {
                    unit_number: number,
                });
            }
        }
        Ok(())
    }
}

impl InMemoryListingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.listings.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ListingStore for InMemoryListingStore {
    async fn create(&self, candidate: NewListing) -> Result<ListingId> {
        let mut state = self.state.lock().await;
        state.check_unique(
            Some(candidate.unit_name.as_str()),
            Some(candidate.unit_number),
            None,
        )?;

        let id = ListingId::new(ObjectId::new().to_hex());
        let now = state.next_stamp();
        let listing = Listing::from_candidate(id.clone(), candidate, now);
        state.listings.insert(id.clone(), listing);
        Ok(id)
    }

    async fn update_by_id(&self, id: &ListingId, fields: &ListingUpdate) -> Result<ListingId> {
        let mut state = self.state.lock().await;
        if !state.listings.contains_key(id) {
            return Err(ListingError::NotFound { id: id.to_string() });
        }
        state.check_unique(fields.unit_name.as_deref(), fields.unit_number, Some(id))?;

        let now = state.next_stamp();
        if let Some(listing) = state.listings.get_mut(id) {
            fields.apply_to(listing, now);
        }
        Ok(id.clone())
    }

    async fn delete_by_id(&self, id: &ListingId) -> Result<()> {
        let mut state = self.state.lock().await;
        state
            .listings
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| ListingError::NotFound { id: id.to_string() })
    }

    async fn find_by_id(&self, id: &ListingId) -> Result<Option<Listing>> {
        let state = self.state.lock().await;
        Ok(state.listings.get(id).cloned())
    }

    async fn query(&self, query: &ListingQuery) -> Result<Vec<Listing>> {
        let state = self.state.lock().await;
        let mut matching: Vec<&Listing> = state
            .listings
            .values()
            .filter(|listing| query.matches(listing))
            .collect();
        matching.sort_by(|a, b| query.compare(a, b));

        Ok(matching
            .into_iter()
            .skip(query.start_index)
            .take(query.limit)
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(unit_name: &str, unit_number: i64) -> NewListing {
        NewListing {
            user_id: None,
            project_name: "Harbour View".to_string(),
            unit_name: unit_name.to_string(),
            unit_number,
            description: "Two bedroom flat".to_string(),
            address: "12 Quay Street".to_string(),
            sell: false,
            rent: true,
            parking_spot: true,
            furnished: false,
            offer: false,
            beds: 2,
            baths: 1,
            regular_price: 1800.0,
        }
    }

    #[tokio::test]
    async fn test_timestamps_strictly_increase() {
        let store = InMemoryListingStore::new();
        let mut stamps = Vec::new();
        for i in 0..20 {
            let id = store.create(candidate(&format!("U-{}", i), i)).await.unwrap();
            stamps.push(store.find_by_id(&id).await.unwrap().unwrap().updated_at);
        }
        assert!(stamps.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_unit_name_checked_before_unit_number() {
        let store = InMemoryListingStore::new();
        store.create(candidate("A-1", 1)).await.unwrap();

        let err = store.create(candidate("A-1", 1)).await.unwrap_err();
        assert!(matches!(err, ListingError::DuplicateUnitName { .. }));

        let err = store.create(candidate("A-2", 1)).await.unwrap_err();
        assert!(matches!(err, ListingError::DuplicateUnitNumber { unit_number: 1 }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_may_keep_its_own_unique_values() {
        let store = InMemoryListingStore::new();
        let id = store.create(candidate("A-1", 1)).await.unwrap();
        let update = ListingUpdate {
            unit_name: Some("A-1".to_string()),
            unit_number: Some(1),
            beds: Some(4),
            ..Default::default()
        };
        assert_eq!(store.update_by_id(&id, &update).await.unwrap(), id);
        assert_eq!(store.find_by_id(&id).await.unwrap().unwrap().beds, 4);
    }

    #[tokio::test]
    async fn test_concurrent_creates_with_same_unit_name_admit_one() {
        let store = std::sync::Arc::new(InMemoryListingStore::new());
        let mut handles = Vec::new();
        for i in 0..8 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.create(candidate("Race", 100 + i)).await
            }));
        }

        let mut created = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                created += 1;
            }
        }
        assert_eq!(created, 1);
        assert_eq!(store.len().await, 1);
    }
}
