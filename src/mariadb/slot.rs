use std::sync::Arc;

use super::codec::BindDescriptor;
use super::stored::{NativeRow, StoredResult};
use crate::error::ConnectorError;
use crate::native::NativeClient;
use crate::types::{BindValue, Value};

/// Status flags of one slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotStatus {
    /// The native session has been opened. Never reset.
    pub connected: bool,
    /// A row is materialised and may be decoded.
    pub valid_record: bool,
    /// `prepare_query` recorded a statement that `exec` may run.
    pub statement_prepared: bool,
    pub transaction_in_progress: bool,
}

/// Snapshot of a slot's cursor state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlotInfo {
    pub status: SlotStatus,
    pub row_count: u64,
    pub column_count: usize,
    /// Row the caller asked for.
    pub requested_row: u64,
    /// Server-side fetch position: the row the next fetch returns.
    pub actual_row: u64,
    pub has_result: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct RowCursor {
    pub(crate) actual: u64,
    pub(crate) requested: u64,
}

/// Prepared statement text and the parameters bound to it so far.
#[derive(Debug, Default)]
pub(crate) struct StatementState {
    pub(crate) sql: String,
    pub(crate) placeholders: usize,
    pub(crate) binds: Vec<BindDescriptor>,
    pub(crate) input_parameters: Vec<Value>,
    pub(crate) output_parameters: Vec<BindValue>,
}

impl StatementState {
    pub(crate) fn reset(&mut self) {
        self.sql.clear();
        self.placeholders = 0;
        self.binds.clear();
        self.input_parameters.clear();
        self.output_parameters.clear();
    }
}

/// Full state of one pooled connection.
pub(crate) struct ConnectionSlot<C> {
    pub(crate) handle: usize,
    pub(crate) client: C,
    pub(crate) result: Option<StoredResult>,
    pub(crate) column_names: Arc<Vec<String>>,
    pub(crate) row: Option<NativeRow>,
    pub(crate) column_lengths: Vec<usize>,
    pub(crate) column_count: usize,
    pub(crate) row_count: u64,
    pub(crate) cursor: RowCursor,
    pub(crate) status: SlotStatus,
    pub(crate) statement: StatementState,
}

impl<C: NativeClient> ConnectionSlot<C> {
    pub(crate) fn new(handle: usize, client: C) -> Self {
        Self {
            handle,
            client,
            result: None,
            column_names: Arc::default(),
            row: None,
            column_lengths: Vec::new(),
            column_count: 0,
            row_count: 0,
            cursor: RowCursor::default(),
            status: SlotStatus::default(),
            statement: StatementState::default(),
        }
    }

    pub(crate) fn info(&self) -> SlotInfo {
        SlotInfo {
            status: self.status,
            row_count: self.row_count,
            column_count: self.column_count,
            requested_row: self.cursor.requested,
            actual_row: self.cursor.actual,
            has_result: self.result.is_some(),
        }
    }

    pub(crate) fn ensure_connected(&self) -> Result<(), ConnectorError> {
        if self.status.connected {
            Ok(())
        } else {
            Err(ConnectorError::NotConnected(self.handle))
        }
    }

    /// Free the live result set and everything derived from it.
    pub(crate) fn release_result(&mut self) {
        self.result = None;
        self.row = None;
        self.column_lengths.clear();
        self.column_names = Arc::default();
        self.column_count = 0;
        self.row_count = 0;
        self.cursor = RowCursor::default();
        self.status.valid_record = false;
    }

    /// Adopt a freshly stored result and materialise row zero if there is one.
    pub(crate) fn install_result(&mut self, result: StoredResult) -> Result<(), ConnectorError> {
        self.column_count = result.fields().len();
        self.row_count = result.num_rows();
        self.column_names = Arc::new(result.fields().iter().map(|f| f.name.clone()).collect());
        self.cursor = RowCursor::default();
        self.result = Some(result);

        tracing::debug!(
            handle = self.handle,
            rows = self.row_count,
            columns = self.column_count,
            "result stored"
        );

        if self.row_count != 0 {
            self.load_row()?;
        }
        Ok(())
    }

    /// Release every native resource. Used when the pool is dropped.
    pub(crate) fn close(&mut self) {
        if self.status.transaction_in_progress {
            tracing::warn!(
                handle = self.handle,
                "closing connection with an open transaction; it will not be committed"
            );
        }
        self.release_result();
        self.statement.reset();
        self.client.stmt_close();
        self.client.close();
        self.status = SlotStatus::default();
    }
}
