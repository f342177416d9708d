use super::field::FieldMeta;

/// One text-protocol row: `None` cells are SQL NULL.
pub type NativeRow = Vec<Option<Vec<u8>>>;

/// A fully buffered result set with a server-style fetch cursor.
///
/// `fetch_row` returns the row under the cursor and advances it; `data_seek`
/// moves the cursor to an absolute row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredResult {
    fields: Vec<FieldMeta>,
    rows: Vec<NativeRow>,
    position: usize,
}

impl StoredResult {
    /// Buffer a result
    ///
    /// # Arguments
    ///
    /// * `fields` - Column metadata, in column order
    /// * `rows` - Every row of the result, as raw text cells
    ///
    /// # Returns
    ///
    /// A `StoredResult` with the fetch cursor on the first row
    #[must_use]
    pub fn new(fields: Vec<FieldMeta>, rows: Vec<NativeRow>) -> Self {
        Self {
            fields,
            rows,
            position: 0,
        }
    }

    /// Column metadata of the result
    #[must_use]
    pub fn fields(&self) -> &[FieldMeta] {
        &self.fields
    }

    /// Number of buffered rows, independent of the fetch cursor
    #[must_use]
    pub fn num_rows(&self) -> u64 {
        self.rows.len() as u64
    }

    /// Position the fetch cursor on `row`; positions past the end leave
    /// nothing to fetch.
    pub fn data_seek(&mut self, row: u64) {
        self.position = usize::try_from(row).unwrap_or(usize::MAX);
    }

    /// Row under the cursor, then advance.
    pub fn fetch_row(&mut self) -> Option<&NativeRow> {
        let row = self.rows.get(self.position)?;
        self.position += 1;
        Some(row)
    }

    /// Byte length of every cell of the most recently fetched row.
    #[must_use]
    pub fn fetch_lengths(&self) -> Option<Vec<usize>> {
        let last = self.position.checked_sub(1)?;
        self.rows
            .get(last)
            .map(|row| row.iter().map(|cell| cell.as_ref().map_or(0, Vec::len)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mariadb::FieldType;

    fn result() -> StoredResult {
        StoredResult::new(
            vec![FieldMeta::new("v", FieldType::VarString)],
            vec![
                vec![Some(b"a".to_vec())],
                vec![None],
                vec![Some(b"ccc".to_vec())],
            ],
        )
    }

    #[test]
    fn fetch_advances_the_cursor() {
        let mut res = result();
        assert_eq!(res.num_rows(), 3);
        assert_eq!(res.fetch_row(), Some(&vec![Some(b"a".to_vec())]));
        assert_eq!(res.fetch_row(), Some(&vec![None]));
        assert_eq!(res.fetch_lengths(), Some(vec![0]));
        assert_eq!(res.fetch_row(), Some(&vec![Some(b"ccc".to_vec())]));
        assert_eq!(res.fetch_lengths(), Some(vec![3]));
        assert_eq!(res.fetch_row(), None);
    }

    #[test]
    fn seek_repositions() {
        let mut res = result();
        res.data_seek(2);
        assert_eq!(res.fetch_row(), Some(&vec![Some(b"ccc".to_vec())]));
        res.data_seek(0);
        assert_eq!(res.fetch_row(), Some(&vec![Some(b"a".to_vec())]));
        res.data_seek(10);
        assert_eq!(res.fetch_row(), None);
    }

    #[test]
    fn no_lengths_before_first_fetch() {
        assert_eq!(result().fetch_lengths(), None);
    }
}
