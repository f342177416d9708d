use std::sync::Arc;

use crate::types::Value;

/// One row of a result, decoded into tagged values.
///
/// Values are addressed by column index; column names are shared across every
/// record of the same result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    column_names: Arc<Vec<String>>,
    values: Vec<Value>,
}

impl Record {
    /// Create a new record
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names, shared with the other records of the result
    /// * `values` - The decoded values, in column order
    ///
    /// # Returns
    ///
    /// A new `Record` instance
    #[must_use]
    pub fn new(column_names: Arc<Vec<String>>, values: Vec<Value>) -> Self {
        Self {
            column_names,
            values,
        }
    }

    /// Drop every value and the column names.
    pub fn clear(&mut self) {
        self.values.clear();
        self.column_names = Arc::default();
    }

    /// Replace the column names used for lookups by name
    ///
    /// # Arguments
    ///
    /// * `column_names` - The column names of the result this record belongs to
    pub fn set_column_names(&mut self, column_names: Arc<Vec<String>>) {
        self.column_names = column_names;
    }

    /// Store `value` at `index`, padding any gap with `Value::Null`.
    pub fn set_value(&mut self, index: usize, value: Value) {
        if index >= self.values.len() {
            self.values.resize(index + 1, Value::Null);
        }
        self.values[index] = value;
    }

    /// Column names of the result, in column order
    #[must_use]
    pub fn column_names(&self) -> &[String] {
        &self.column_names
    }

    /// Get the index of a column by name
    ///
    /// # Arguments
    ///
    /// * `column_name` - The name of the column
    ///
    /// # Returns
    ///
    /// The index of the column, or None if not found
    #[must_use]
    pub fn get_column_index(&self, column_name: &str) -> Option<usize> {
        self.column_names.iter().position(|col| col == column_name)
    }

    /// Get a value from the record by column name
    ///
    /// # Arguments
    ///
    /// * `column_name` - The name of the column
    ///
    /// # Returns
    ///
    /// The value at the column, or None if the column wasn't found
    #[must_use]
    pub fn get(&self, column_name: &str) -> Option<&Value> {
        self.get_column_index(column_name)
            .and_then(|idx| self.values.get(idx))
    }

    /// Get a value from the record by column index
    ///
    /// # Arguments
    ///
    /// * `index` - The zero-based column index
    ///
    /// # Returns
    ///
    /// The value at the index, or None if the index is out of bounds
    #[must_use]
    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All values of the record, in column order
    #[must_use]
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Number of values in the record
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the record holds no values, as after `clear`
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Consume the record and return its values
    #[must_use]
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names() -> Arc<Vec<String>> {
        Arc::new(vec!["id".to_string(), "name".to_string()])
    }

    #[test]
    fn lookups_by_name_and_index() {
        let record = Record::new(names(), vec![Value::I32(7), Value::String("bolt".into())]);
        assert_eq!(record.len(), 2);
        assert_eq!(record.get_column_index("name"), Some(1));
        assert_eq!(record.get("id"), Some(&Value::I32(7)));
        assert_eq!(record.get("missing"), None);
        assert_eq!(record.get_by_index(2), None);
        assert_eq!(record.column_names(), &["id".to_string(), "name".to_string()]);
    }

    #[test]
    fn set_value_pads_gaps_with_null() {
        let mut record = Record::default();
        record.set_column_names(names());
        record.set_value(1, Value::U8(3));
        assert_eq!(record.values(), &[Value::Null, Value::U8(3)]);
    }

    #[test]
    fn clear_drops_values_and_names() {
        let mut record = Record::new(names(), vec![Value::I32(1), Value::Null]);
        record.clear();
        assert!(record.is_empty());
        assert!(record.column_names().is_empty());
        assert_eq!(record.get("id"), None);
        assert!(record.into_values().is_empty());
    }
}
