/// Item accumulator: product records keyed by product identifier
use crate::product::ProductRecord;
use std::collections::HashMap;

/// Accumulates partially built product records during a crawl
///
/// Records are only created through [`ItemStore::insert_if_absent`]; every
/// other mutation goes through [`ItemStore::update`], which silently drops
/// updates for identifiers that have no record yet.
#[derive(Debug, Clone, Default)]
pub struct ItemStore {
    items: HashMap<String, ProductRecord>,
}

impl ItemStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates the record for `id` unless one already exists
    ///
    /// # Returns
    ///
    /// * `true` - A new record was created
    /// * `false` - A record with this id was already present
    pub fn insert_if_absent(&mut self, id: &str, name: &str, direct_url: &str) -> bool {
        if self.items.contains_key(id) {
            return false;
        }

        self.items
            .insert(id.to_string(), ProductRecord::new(id, name, direct_url));
        true
    }

    /// Applies `mutate` to the record for `id`, if there is one
    ///
    /// # Returns
    ///
    /// * `true` - The record existed and was mutated
    /// * `false` - No record for `id`; nothing happened
    pub fn update<F>(&mut self, id: &str, mutate: F) -> bool
    where
        F: FnOnce(&mut ProductRecord),
    {
        match self.items.get_mut(id) {
            Some(record) => {
                mutate(record);
                true
            }
            None => false,
        }
    }

    /// Returns true if a record exists for `id`
    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    /// Gets the record for `id`
    pub fn get(&self, id: &str) -> Option<&ProductRecord> {
        self.items.get(id)
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Returns true if no record has been created
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Borrows the underlying map
    pub fn as_map(&self) -> &HashMap<String, ProductRecord> {
        &self.items
    }
}
