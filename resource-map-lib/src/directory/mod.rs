use crate::types::{CategoryFilter, LatLng, ResourceRecord};

/// Ordered, in-memory collection of the records accepted in one load.
#[derive(Debug, Default, Clone)]
pub struct ResourceDirectory {
    records: Vec<ResourceRecord>,
}

impl ResourceDirectory {
    pub fn new(records: Vec<ResourceRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[ResourceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<&ResourceRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Record a geocoding result. Returns the updated record, or `None` when
    /// no record carries `id`.
    pub fn attach_position(&mut self, id: usize, position: LatLng) -> Option<&ResourceRecord> {
        let record = self.records.iter_mut().find(|r| r.id == id)?;
        record.position = Some(position);
        Some(record)
    }

    /// Records in the selected category whose name, address, phone or
    /// category label contains `search_text`, ignoring case. File order is
    /// kept.
    pub fn filter(&self, search_text: &str, category: CategoryFilter) -> Vec<&ResourceRecord> {
        let needle = search_text.to_lowercase();
        self.records
            .iter()
            .filter(|r| category.matches(r.category) && r.matches_text(&needle))
            .collect()
    }
}
