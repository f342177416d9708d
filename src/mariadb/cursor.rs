use super::codec;
use super::slot::ConnectionSlot;
use crate::error::ConnectorError;
use crate::native::NativeClient;
use crate::results::{Record, RecordSet};

impl<C: NativeClient> ConnectionSlot<C> {
    /// Materialise the requested row, seeking first when the server-side
    /// position has drifted from it.
    pub(crate) fn load_row(&mut self) -> Result<(), ConnectorError> {
        let handle = self.handle;
        let Some(result) = self.result.as_mut() else {
            return Err(ConnectorError::NoResult(format!(
                "slot {handle} has no live result set"
            )));
        };

        if self.cursor.actual != self.cursor.requested {
            tracing::trace!(
                handle,
                from = self.cursor.actual,
                to = self.cursor.requested,
                "data seek"
            );
            result.data_seek(self.cursor.requested);
            self.cursor.actual = self.cursor.requested;
        }

        let row = result.fetch_row().cloned().ok_or_else(|| {
            ConnectorError::NoResult(format!(
                "row {} is past the end of the result set",
                self.cursor.requested
            ))
        })?;
        self.cursor.actual += 1;
        self.column_lengths = result.fetch_lengths().unwrap_or_default();
        self.row = Some(row);
        self.status.valid_record = true;
        Ok(())
    }

    pub(crate) fn move_first(&mut self) -> Result<bool, ConnectorError> {
        if self.row_count == 0 {
            return Ok(false);
        }
        self.cursor.requested = 0;
        self.load_row()?;
        Ok(true)
    }

    /// Advance one row. At the last row the cursor stays put and `false` is returned.
    pub(crate) fn move_next(&mut self) -> Result<bool, ConnectorError> {
        self.cursor.requested += 1;
        if self.cursor.requested < self.row_count {
            self.load_row()?;
            Ok(true)
        } else {
            self.cursor.requested -= 1;
            Ok(false)
        }
    }

    pub(crate) fn move_previous(&mut self) -> Result<bool, ConnectorError> {
        if self.cursor.requested == 0 || self.row_count == 0 {
            return Ok(false);
        }
        self.cursor.requested -= 1;
        self.load_row()?;
        Ok(true)
    }

    pub(crate) fn move_last(&mut self) -> Result<bool, ConnectorError> {
        if self.row_count == 0 {
            return Ok(false);
        }
        self.cursor.requested = self.row_count - 1;
        self.load_row()?;
        Ok(true)
    }

    /// Decode the loaded row into `record`. The record is emptied first, so it
    /// holds nothing when no row is loaded.
    pub(crate) fn get_record(&self, record: &mut Record) -> Result<(), ConnectorError> {
        record.clear();
        if !self.status.valid_record {
            return Err(ConnectorError::RecordNotLoaded);
        }
        let (Some(row), Some(result)) = (self.row.as_ref(), self.result.as_ref()) else {
            return Err(ConnectorError::RecordNotLoaded);
        };

        record.set_column_names(self.column_names.clone());

        for (index, field) in result.fields().iter().enumerate().take(self.column_count) {
            let raw = row.get(index).and_then(Option::as_deref).map(|bytes| {
                let len = self
                    .column_lengths
                    .get(index)
                    .copied()
                    .unwrap_or(bytes.len())
                    .min(bytes.len());
                &bytes[..len]
            });
            record.set_value(index, codec::decode_text(field, raw)?);
        }
        Ok(())
    }

    /// Decode every row of the live result into `records`, leaving the cursor
    /// on the last row.
    pub(crate) fn get_record_set(&mut self, records: &mut RecordSet) -> Result<(), ConnectorError> {
        records.clear();
        let rows = usize::try_from(self.row_count).map_err(|_| {
            ConnectorError::NoResult(format!("{} rows do not fit in memory", self.row_count))
        })?;
        records.resize(rows);

        if !self.move_first()? {
            return Ok(());
        }
        let mut index = 0;
        loop {
            self.get_record(&mut records[index])?;
            index += 1;
            if !self.move_next()? {
                break;
            }
        }
        Ok(())
    }
}
