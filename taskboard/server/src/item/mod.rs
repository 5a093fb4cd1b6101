use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::clock::{Clock, SystemClock};

pub mod api;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Item {
    id: String,
    name: String,
    description: String,
    created_at: DateTime<Utc>,
}

impl Item {
    pub fn new(id: String, name: String, description: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            description,
            created_at,
        }
    }

    /// Returns the ID of the item.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Error type for ItemService operations.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ItemServiceError {
    /// Represents a create request without a name.
    #[error("Name is required")]
    NameRequired,
    /// Represents an item id that is not in the store.
    #[error("Item with ID '{0}' not found")]
    ItemNotFound(String),
}

#[derive(Debug)]
struct ItemTable {
    items: Vec<Item>,
    next_id: u64,
}

impl ItemTable {
    fn push(&mut self, name: String, description: String, created_at: DateTime<Utc>) -> Item {
        let item = Item::new(self.next_id.to_string(), name, description, created_at);
        self.next_id += 1;
        self.items.push(item.clone());
        item
    }
}

/// In-memory item catalogue.
pub struct ItemService {
    table: Mutex<ItemTable>,
    clock: Arc<dyn Clock>,
}

impl ItemService {
    /// Creates an empty catalogue.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            table: Mutex::new(ItemTable {
                items: Vec::new(),
                next_id: 1,
            }),
            clock,
        }
    }

    /// Creates a catalogue holding the two sample items.
    pub fn with_sample_items(clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let mut table = ItemTable {
            items: Vec::new(),
            next_id: 1,
        };
        table.push(
            "Sample Item 1".to_string(),
            "This is a sample item".to_string(),
            now,
        );
        table.push(
            "Sample Item 2".to_string(),
            "Another sample item".to_string(),
            now,
        );
        Self {
            table: Mutex::new(table),
            clock,
        }
    }

    /// Builds the catalogue the server starts with.
    pub fn from_seed_flag(seed_sample_items: bool) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        if seed_sample_items {
            Self::with_sample_items(clock)
        } else {
            Self::new(clock)
        }
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_all_items(&self) -> Vec<Item> {
        self.table.lock().await.items.clone()
    }

    #[tracing::instrument(skip(self))]
    pub async fn get_item_by_id(&self, id: &str) -> Result<Item, ItemServiceError> {
        let table = self.table.lock().await;
        table
            .items
            .iter()
            .find(|item| item.id == id)
            .cloned()
            .ok_or_else(|| ItemServiceError::ItemNotFound(id.to_string()))
    }

    /// Creates an item. The name must be present and non-empty; the description defaults to "".
    #[tracing::instrument(skip(self))]
    pub async fn create_item(
        &self,
        name: Option<String>,
        description: Option<String>,
    ) -> Result<Item, ItemServiceError> {
        let name = match name {
            Some(name) if !name.is_empty() => name,
            _ => return Err(ItemServiceError::NameRequired),
        };
        let mut table = self.table.lock().await;
        let item = table.push(name, description.unwrap_or_default(), self.clock.now());
        tracing::info!("Created item {}", item.id());
        Ok(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn fixed_clock() -> Arc<dyn Clock> {
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap(),
        ))
    }

    #[tokio::test]
    async fn sample_catalogue_has_two_items() {
        let service = ItemService::with_sample_items(fixed_clock());

        let items = service.get_all_items().await;

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id(), "1");
        assert_eq!(items[0].name(), "Sample Item 1");
        assert_eq!(items[1].id(), "2");
    }

    #[tokio::test]
    async fn can_create_item_with_default_description() {
        let service = ItemService::new(fixed_clock());

        let item = service
            .create_item(Some("Widget".to_string()), None)
            .await
            .unwrap();

        assert_eq!(item.id(), "1");
        assert_eq!(item.description(), "");
        assert_eq!(service.get_item_by_id("1").await, Ok(item));
    }

    #[tokio::test]
    async fn ids_continue_after_sample_items() {
        let service = ItemService::with_sample_items(fixed_clock());

        let item = service
            .create_item(Some("Third".to_string()), Some("More".to_string()))
            .await
            .unwrap();

        assert_eq!(item.id(), "3");
    }

    #[tokio::test]
    async fn rejects_missing_or_empty_name() {
        let service = ItemService::new(fixed_clock());

        assert_eq!(
            service.create_item(None, None).await,
            Err(ItemServiceError::NameRequired)
        );
        assert_eq!(
            service.create_item(Some(String::new()), None).await,
            Err(ItemServiceError::NameRequired)
        );
        assert!(service.get_all_items().await.is_empty());
    }

    #[tokio::test]
    async fn reports_unknown_item() {
        let service = ItemService::from_seed_flag(false);

        assert_eq!(
            service.get_item_by_id("42").await,
            Err(ItemServiceError::ItemNotFound("42".to_string()))
        );
    }
}
