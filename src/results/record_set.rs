use std::ops::{Index, IndexMut};

use super::Record;

/// A read-only snapshot of every row of a result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSet {
    records: Vec<Record>,
}

impl RecordSet {
    /// Create an empty record set with room for `capacity` records
    ///
    /// # Arguments
    ///
    /// * `capacity` - The number of records to reserve space for
    ///
    /// # Returns
    ///
    /// An empty `RecordSet`
    #[must_use]
    pub fn with_capacity(capacity: usize) -> RecordSet {
        RecordSet {
            records: Vec::with_capacity(capacity),
        }
    }

    /// Remove every record
    pub fn clear(&mut self) {
        self.records.clear();
    }

    /// Grow or shrink to `len` records; new slots hold empty records.
    pub fn resize(&mut self, len: usize) {
        self.records.resize_with(len, Record::default);
    }

    /// Append a record
    ///
    /// # Arguments
    ///
    /// * `record` - The record to add at the end of the set
    pub fn push(&mut self, record: Record) {
        self.records.push(record);
    }

    /// Number of records in the set
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Get a record by position
    ///
    /// # Arguments
    ///
    /// * `index` - The zero-based row position
    ///
    /// # Returns
    ///
    /// The record at the position, or None if it is out of bounds
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Get a mutable record by position
    ///
    /// # Arguments
    ///
    /// * `index` - The zero-based row position
    ///
    /// # Returns
    ///
    /// The record at the position, or None if it is out of bounds
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    /// Iterate over the records in row order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Column names shared by the records, empty when the set is empty.
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        self.records.first().map_or(&[], Record::column_names)
    }
}

impl Index<usize> for RecordSet {
    type Output = Record;

    fn index(&self, index: usize) -> &Self::Output {
        &self.records[index]
    }
}

impl IndexMut<usize> for RecordSet {
    fn index_mut(&mut self, index: usize) -> &mut Self::Output {
        &mut self.records[index]
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}
