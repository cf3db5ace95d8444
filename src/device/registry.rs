//! Ordered record registry.

use crate::error::{Error, Result};

/// A record that can live in a [`Registry`].
pub trait Record {
    /// Human-readable record kind, used in error messages.
    const KIND: &'static str;

    /// Unique id within the registry.
    fn id(&self) -> &str;
}

/// Records in registration order, with unique ids.
///
/// Rows are addressed 1-based, matching IID table indexes.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    records: Vec<T>,
}

impl<T: Record> Registry<T> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
        }
    }

    /// Append a record, failing if its id is already present.
    pub fn register(&mut self, record: T) -> Result<()> {
        if self.records.iter().any(|r| r.id() == record.id()) {
            return Err(Error::config(format!(
                "duplicate {} id {:?}",
                T::KIND,
                record.id()
            )));
        }
        self.records.push(record);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Row `row`, 1-based.
    pub fn row(&self, row: u32) -> Option<&T> {
        let idx = (row as usize).checked_sub(1)?;
        self.records.get(idx)
    }

    /// Row `row` for mutation, 1-based.
    pub fn row_mut(&mut self, row: u32) -> Option<&mut T> {
        let idx = (row as usize).checked_sub(1)?;
        self.records.get_mut(idx)
    }

    /// Look up by id.
    pub fn by_id(&self, id: &str) -> Option<&T> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }
}

impl<T: Record> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
