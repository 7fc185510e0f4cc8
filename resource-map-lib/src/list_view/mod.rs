use serde::Serialize;
use std::io::Write;

use crate::error::ResourceMapError;
use crate::types::ResourceRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListItem {
    pub record_id: usize,
    pub title: String,
    /// `{category label} | {address}`
    pub subtitle: String,
}

impl ListItem {
    fn for_record(record: &ResourceRecord) -> Self {
        Self {
            record_id: record.id,
            title: record.name.clone(),
            subtitle: format!("{} | {}", record.category.display_name(), record.address),
        }
    }
}

/// The clickable resource list. Re-rendered from scratch whenever the
/// filter changes.
#[derive(Debug, Default)]
pub struct ListView {
    items: Vec<ListItem>,
}

impl ListView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, records: &[&ResourceRecord]) {
        self.items = records.iter().map(|r| ListItem::for_record(r)).collect();
        tracing::debug!("Resource list shows {} items", self.items.len());
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn contains(&self, record_id: usize) -> bool {
        self.items.iter().any(|i| i.record_id == record_id)
    }

    /// Write the current items as CSV with a `record_id,title,subtitle` header.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), ResourceMapError> {
        let mut writer = csv::Writer::from_writer(writer);
        for item in &self.items {
            writer.serialize(item)?;
        }
        writer.flush()?;
        Ok(())
    }
}
