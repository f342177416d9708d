use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::config::ConnectionOptions;
use crate::error::ConnectorError;
use crate::results::{Record, RecordSet};
use crate::types::BindValue;

/// Index of a connection slot, in `0..pool_size`.
pub type Handle = usize;

/// Engine-neutral contract exposed to the host application.
///
/// Every operation addresses one slot by handle. Operations on different handles
/// may run concurrently; operations on the same handle are serialised.
pub trait Connector: Send + Sync {
    fn pool_size(&self) -> usize;

    /// Connect the slot if needed and start a transaction.
    ///
    /// # Errors
    /// `Connection` when the session cannot be opened, `Statement` when the
    /// server refuses to start the transaction.
    fn begin(&self, handle: Handle) -> Result<(), ConnectorError>;

    /// Commit when a transaction is open, otherwise do nothing.
    ///
    /// # Errors
    /// `Statement` when the commit fails.
    fn end(&self, handle: Handle) -> Result<(), ConnectorError>;

    /// Commit the current transaction and release the live result set.
    ///
    /// # Errors
    /// `Statement` when the commit fails. Slot state is reset either way.
    fn commit(&self, handle: Handle) -> Result<(), ConnectorError>;

    /// # Errors
    /// `Statement` when the rollback fails; the transaction stays flagged open.
    fn rollback(&self, handle: Handle) -> Result<(), ConnectorError>;

    /// Run SQL text and buffer any rows it returns, loading row zero.
    ///
    /// # Errors
    /// `NotConnected` before the first `begin`, `Statement` when the server
    /// rejects the SQL or its rows cannot be buffered.
    fn query(&self, handle: Handle, sql: &str) -> Result<(), ConnectorError>;

    /// Record a statement for `exec`. Returns `false` for blank SQL.
    ///
    /// # Errors
    /// Only handle errors.
    fn prepare_query(&self, handle: Handle, sql: &str) -> Result<bool, ConnectorError>;

    /// Register a parameter for the prepared statement.
    ///
    /// # Errors
    /// Only handle errors.
    fn add_bind_value(&self, handle: Handle, value: BindValue) -> Result<(), ConnectorError>;

    /// Execute the prepared statement with the registered parameters.
    ///
    /// # Errors
    /// `NoStatementPrepared`, `NotConnected`, `ParameterError` on a placeholder
    /// count mismatch, `Statement` on native failures and `OutputWithoutResult`
    /// when output parameters were registered but no result came back.
    fn exec(&self, handle: Handle) -> Result<(), ConnectorError>;

    /// # Errors
    /// Handle errors, or a failure to read the row.
    fn move_first(&self, handle: Handle) -> Result<bool, ConnectorError>;

    /// # Errors
    /// Handle errors, or a failure to read the row.
    fn move_next(&self, handle: Handle) -> Result<bool, ConnectorError>;

    /// # Errors
    /// Handle errors, or a failure to read the row.
    fn move_previous(&self, handle: Handle) -> Result<bool, ConnectorError>;

    /// # Errors
    /// Handle errors, or a failure to read the row.
    fn move_last(&self, handle: Handle) -> Result<bool, ConnectorError>;

    /// Decode the loaded row into `record`.
    ///
    /// # Errors
    /// `RecordNotLoaded` when no row is loaded; codec errors for columns that
    /// cannot be decoded.
    fn get_record(&self, handle: Handle, record: &mut Record) -> Result<(), ConnectorError>;

    /// Decode the entire live result into `records`, leaving the cursor on the last row.
    ///
    /// # Errors
    /// Codec errors for columns that cannot be decoded.
    fn get_record_set(&self, handle: Handle, records: &mut RecordSet) -> Result<(), ConnectorError>;
}

/// Database engines a pool can be created for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Engine {
    #[value(name = "mariadb", alias = "mysql")]
    #[serde(alias = "mysql")]
    MariaDb,
}

impl FromStr for Engine {
    type Err = ConnectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Engine as ValueEnum>::from_str(s, true)
            .map_err(|_| ConnectorError::ConfigError(format!("unknown database engine `{s}`")))
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_possible_value() {
            Some(value) => f.write_str(value.get_name()),
            None => write!(f, "{self:?}"),
        }
    }
}

/// Create a connection pool of `pool_size` slots for `engine`.
///
/// No connection is opened until a slot's first `begin`.
///
/// # Errors
/// `Lifecycle` when the library is not initialised, `ConfigError` for invalid
/// options, `Unimplemented` when the engine's client was not compiled in.
pub fn create_connection_pool(
    engine: Engine,
    pool_size: usize,
    options: ConnectionOptions,
) -> Result<Box<dyn Connector>, ConnectorError> {
    match engine {
        Engine::MariaDb => mariadb_pool(pool_size, options),
    }
}

#[cfg(feature = "mariadb")]
fn mariadb_pool(
    pool_size: usize,
    options: ConnectionOptions,
) -> Result<Box<dyn Connector>, ConnectorError> {
    Ok(Box::new(crate::mariadb::MariaDbConnector::new(
        pool_size, options,
    )?))
}

#[cfg(not(feature = "mariadb"))]
fn mariadb_pool(
    _pool_size: usize,
    _options: ConnectionOptions,
) -> Result<Box<dyn Connector>, ConnectorError> {
    Err(ConnectorError::Unimplemented(
        "mariadb support requires the `mariadb` feature".into(),
    ))
}
