//! In-memory stand-in for the native client, for tests and benchmarks.
//!
//! A [`ScriptedServer`] holds canned results and failures keyed by the command a
//! client issues, and records every command in order. Each pool slot gets its
//! own [`ScriptedClient`] sharing the same server, so a test can keep the
//! server and inspect what happened after the pool took ownership of the clients.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::config::ConnectionOptions;
use crate::mariadb::{
    BindDescriptor, FieldMeta, FieldType, NativeRow, StoredResult, count_placeholders, decode_bound,
};
use crate::native::{
    CR_COMMANDS_OUT_OF_SYNC, CR_SERVER_GONE_ERROR, CR_UNSUPPORTED_PARAM_TYPE, NativeClient,
    NativeError,
};
use crate::types::Value;

/// Client error code for a parameter count mismatch at bind time.
pub const CR_PARAMS_NOT_BOUND: u32 = 2031;

/// Log entry for a connect attempt.
pub const CONNECT: &str = "CONNECT";
/// Log entry for a session close.
pub const CLOSE: &str = "CLOSE";
/// Log entry for a native rollback.
pub const ROLLBACK: &str = "ROLLBACK";
/// Log entry for closing an open prepared statement.
pub const STMT_CLOSE: &str = "STMT_CLOSE";
/// Failure key for buffering a result, by query or by prepared statement.
/// Never logged.
pub const STORE_RESULT: &str = "STORE_RESULT";

#[derive(Default)]
struct ServerState {
    results: HashMap<String, StoredResult>,
    failures: HashMap<String, NativeError>,
    log: Vec<(usize, String)>,
    bound: Vec<Vec<Value>>,
}

/// Canned responses shared by every client of a test pool.
#[derive(Clone, Default)]
pub struct ScriptedServer {
    state: Arc<Mutex<ServerState>>,
}

impl ScriptedServer {
    /// A server that answers `SELECT 1` with a single BIGINT row.
    #[must_use]
    pub fn new() -> Self {
        let server = Self::default();
        server.on_query(
            "SELECT 1",
            text_result(
                vec![FieldMeta::new("1", FieldType::LongLong).with_length(1)],
                &[&[Some("1")]],
            ),
        );
        server
    }

    fn state(&self) -> MutexGuard<'_, ServerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Client for pool slot `handle`.
    #[must_use]
    pub fn client(&self, handle: usize) -> ScriptedClient {
        ScriptedClient {
            handle,
            server: self.clone(),
            connected: false,
            pending: None,
            field_count: 0,
            statement: None,
            binds: Vec::new(),
            stmt_result: None,
        }
    }

    /// Rows returned by `sql`, both as a query and as a prepared statement.
    pub fn on_query(&self, sql: &str, result: StoredResult) {
        self.state().results.insert(sql.to_string(), result);
    }

    /// Make the command logged as `entry` fail until cleared.
    ///
    /// Entries are the SQL text for queries, `PREPARE <sql>` and `EXECUTE <sql>`
    /// for statements, plus [`CONNECT`], [`ROLLBACK`] and [`STORE_RESULT`].
    pub fn fail(&self, entry: &str, error: NativeError) {
        self.state().failures.insert(entry.to_string(), error);
    }

    pub fn clear_failure(&self, entry: &str) {
        self.state().failures.remove(entry);
    }

    /// Every command issued so far, with the slot that issued it.
    #[must_use]
    pub fn log(&self) -> Vec<(usize, String)> {
        self.state().log.clone()
    }

    /// Commands issued by one slot.
    #[must_use]
    pub fn commands(&self, handle: usize) -> Vec<String> {
        self.state()
            .log
            .iter()
            .filter(|(h, _)| *h == handle)
            .map(|(_, entry)| entry.clone())
            .collect()
    }

    /// Number of times `entry` was issued by any slot.
    #[must_use]
    pub fn count(&self, entry: &str) -> usize {
        self.state().log.iter().filter(|(_, e)| e == entry).count()
    }

    /// Parameters of every executed statement, decoded from their bind descriptors.
    #[must_use]
    pub fn bound_parameters(&self) -> Vec<Vec<Value>> {
        self.state().bound.clone()
    }

    fn issue(&self, handle: usize, entry: String) -> Result<(), NativeError> {
        let mut state = self.state();
        let failure = state.failures.get(&entry).cloned();
        state.log.push((handle, entry));
        failure.map_or(Ok(()), Err)
    }

    fn failure(&self, entry: &str) -> Option<NativeError> {
        self.state().failures.get(entry).cloned()
    }

    fn result_for(&self, sql: &str) -> Option<StoredResult> {
        self.state().results.get(sql).cloned()
    }
}

/// Build a text-protocol result; `None` cells are NULL.
#[must_use]
pub fn text_result(fields: Vec<FieldMeta>, rows: &[&[Option<&str>]]) -> StoredResult {
    let rows: Vec<NativeRow> = rows
        .iter()
        .map(|row| {
            row.iter()
                .map(|cell| cell.map(|text| text.as_bytes().to_vec()))
                .collect()
        })
        .collect();
    StoredResult::new(fields, rows)
}

/// Single INT column named `n` holding `0..rows`.
#[must_use]
pub fn counting_result(rows: u64) -> StoredResult {
    let rows = (0..rows)
        .map(|n| vec![Some(n.to_string().into_bytes())])
        .collect();
    StoredResult::new(vec![FieldMeta::new("n", FieldType::Long)], rows)
}

struct PreparedText {
    sql: String,
    params: usize,
}

/// Scripted [`NativeClient`] for one slot.
pub struct ScriptedClient {
    handle: usize,
    server: ScriptedServer,
    connected: bool,
    pending: Option<StoredResult>,
    field_count: usize,
    statement: Option<PreparedText>,
    binds: Vec<BindDescriptor>,
    stmt_result: Option<StoredResult>,
}

fn gone() -> NativeError {
    NativeError::new(CR_SERVER_GONE_ERROR, "MySQL server has gone away")
}

fn out_of_sync() -> NativeError {
    NativeError::new(
        CR_COMMANDS_OUT_OF_SYNC,
        "Commands out of sync; you can't run this command now",
    )
}

impl NativeClient for ScriptedClient {
    fn connect(&mut self, _options: &ConnectionOptions) -> Result<(), NativeError> {
        self.server.issue(self.handle, CONNECT.to_string())?;
        self.connected = true;
        Ok(())
    }

    fn real_query(&mut self, sql: &str) -> Result<(), NativeError> {
        self.pending = None;
        self.field_count = 0;
        if !self.connected {
            return Err(gone());
        }
        self.server.issue(self.handle, sql.to_string())?;
        self.pending = self.server.result_for(sql);
        self.field_count = self.pending.as_ref().map_or(0, |r| r.fields().len());
        Ok(())
    }

    fn field_count(&self) -> usize {
        self.field_count
    }

    fn store_result(&mut self) -> Result<StoredResult, NativeError> {
        let pending = self.pending.take().ok_or_else(out_of_sync)?;
        self.server.failure(STORE_RESULT).map_or(Ok(pending), Err)
    }

    fn stmt_prepare(&mut self, sql: &str) -> Result<usize, NativeError> {
        if !self.connected {
            return Err(gone());
        }
        self.server.issue(self.handle, format!("PREPARE {sql}"))?;
        let params = count_placeholders(sql);
        self.statement = Some(PreparedText {
            sql: sql.to_string(),
            params,
        });
        Ok(params)
    }

    fn stmt_bind_param(&mut self, binds: &[BindDescriptor]) -> Result<(), NativeError> {
        let statement = self.statement.as_ref().ok_or_else(out_of_sync)?;
        if binds.len() != statement.params {
            return Err(NativeError::new(
                CR_PARAMS_NOT_BOUND,
                "No data supplied for parameters in prepared statement",
            ));
        }
        self.binds = binds.to_vec();
        Ok(())
    }

    fn stmt_execute(&mut self) -> Result<(), NativeError> {
        let sql = self
            .statement
            .as_ref()
            .map(|s| s.sql.clone())
            .ok_or_else(out_of_sync)?;
        self.server.issue(self.handle, format!("EXECUTE {sql}"))?;

        let values = self
            .binds
            .iter()
            .map(decode_bound)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| NativeError::new(CR_UNSUPPORTED_PARAM_TYPE, e.to_string()))?;
        self.server.state().bound.push(values);
        self.stmt_result = self.server.result_for(&sql);
        Ok(())
    }

    fn stmt_result_metadata(&self) -> Option<Vec<FieldMeta>> {
        self.stmt_result.as_ref().map(|r| r.fields().to_vec())
    }

    fn stmt_store_result(&mut self) -> Result<StoredResult, NativeError> {
        let result = self.stmt_result.take().ok_or_else(out_of_sync)?;
        self.server.failure(STORE_RESULT).map_or(Ok(result), Err)
    }

    fn stmt_close(&mut self) {
        if self.statement.take().is_some() {
            self.server.state().log.push((self.handle, STMT_CLOSE.to_string()));
        }
        self.binds.clear();
        self.stmt_result = None;
    }

    fn rollback(&mut self) -> Result<(), NativeError> {
        if !self.connected {
            return Err(gone());
        }
        self.server.issue(self.handle, ROLLBACK.to_string())
    }

    fn close(&mut self) {
        // Close never fails, so scripted failures are not consulted.
        self.server.state().log.push((self.handle, CLOSE.to_string()));
        self.connected = false;
        self.pending = None;
    }
}
