//! Outbound contract between the cursor engine and a native client library.
//!
//! One `NativeClient` lives in every connection slot. All calls block until the
//! client library returns. The engine never talks to the network itself; it only
//! sequences these calls and interprets their results.

use thiserror::Error;

use crate::config::ConnectionOptions;
use crate::mariadb::{BindDescriptor, FieldMeta, StoredResult};

/// Client-side error code used when the library fails without a server diagnostic.
pub const CR_UNKNOWN_ERROR: u32 = 2000;
/// Client-side error code for calls issued on a session that is not open.
pub const CR_SERVER_GONE_ERROR: u32 = 2006;
/// Client-side error code for calls issued in the wrong order.
pub const CR_COMMANDS_OUT_OF_SYNC: u32 = 2014;
/// Client-side error code for parameters the library cannot send.
pub const CR_UNSUPPORTED_PARAM_TYPE: u32 = 2036;

/// Error number and text as reported by the native client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{code} - {message}")]
pub struct NativeError {
    pub code: u32,
    pub message: String,
}

impl NativeError {
    #[must_use]
    pub fn new(code: u32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

/// Blocking native client bound to a single connection slot.
///
/// Implementations own exactly one session and at most one prepared statement.
pub trait NativeClient: Send {
    /// Open the network session.
    ///
    /// # Errors
    /// Returns the native error when the server cannot be reached or rejects the login.
    fn connect(&mut self, options: &ConnectionOptions) -> Result<(), NativeError>;

    /// Send SQL text over the text protocol.
    ///
    /// # Errors
    /// Returns the native error when the statement fails.
    fn real_query(&mut self, sql: &str) -> Result<(), NativeError>;

    /// Number of columns produced by the last `real_query`.
    fn field_count(&self) -> usize;

    /// Buffer the whole result of the last `real_query` locally.
    ///
    /// # Errors
    /// Returns the native error when no result is pending or reading rows fails.
    fn store_result(&mut self) -> Result<StoredResult, NativeError>;

    /// Initialise a statement handle and prepare `sql` on it; returns the placeholder count
    /// reported by the server.
    ///
    /// # Errors
    /// Returns the native error when the server rejects the statement.
    fn stmt_prepare(&mut self, sql: &str) -> Result<usize, NativeError>;

    /// Attach parameter buffers to the prepared statement.
    ///
    /// # Errors
    /// Returns the native error when a descriptor cannot be bound.
    fn stmt_bind_param(&mut self, binds: &[BindDescriptor]) -> Result<(), NativeError>;

    /// Execute the prepared statement with the bound parameters.
    ///
    /// # Errors
    /// Returns the native error when execution fails.
    fn stmt_execute(&mut self) -> Result<(), NativeError>;

    /// Column metadata of the executed statement, `None` when it produced no result.
    fn stmt_result_metadata(&self) -> Option<Vec<FieldMeta>>;

    /// Buffer the rows produced by the executed statement.
    ///
    /// # Errors
    /// Returns the native error when no statement result is pending.
    fn stmt_store_result(&mut self) -> Result<StoredResult, NativeError>;

    /// Release the prepared statement, if any.
    fn stmt_close(&mut self);

    /// Roll back the current transaction.
    ///
    /// # Errors
    /// Returns the native error when the rollback fails.
    fn rollback(&mut self) -> Result<(), NativeError>;

    /// Close the session. Safe to call on a session that was never opened.
    fn close(&mut self);
}
