use thiserror::Error;

use crate::mariadb::FieldType;
use crate::native::NativeError;

#[derive(Debug, Error)]
pub enum ConnectorError {
    /// The native connect call failed; the slot stays disconnected.
    #[error("Connection error: {code} - {message}")]
    Connection { code: u32, message: String },

    /// The server or client library rejected a statement.
    #[error("SQL execution error: {code} - {message}")]
    Statement { code: u32, message: String },

    #[error("Invalid handle {handle}: pool holds {pool_size} connections")]
    InvalidHandle { handle: usize, pool_size: usize },

    #[error("Connection {0} is not connected; begin a transaction first")]
    NotConnected(usize),

    #[error("No statement prepared.")]
    NoStatementPrepared,

    #[error("Record not loaded.")]
    RecordNotLoaded,

    #[error("Output parameters specified, but query does/did not produce a result.")]
    OutputWithoutResult,

    #[error("Unable to retrieve query results: {0}")]
    NoResult(String),

    /// The server reported a column type the codec cannot represent.
    #[error("Unsupported column type {field_type:?} for column `{column}`")]
    UnsupportedColumnType { column: String, field_type: FieldType },

    #[error("Unable to decode column `{column}`: {message}")]
    Decode { column: String, message: String },

    #[error("Parameter conversion error: {0}")]
    ParameterError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Client library lifecycle error: {0}")]
    Lifecycle(String),

    #[error("Connection {0} is unusable: a previous operation panicked while holding it")]
    SlotPoisoned(usize),

    #[error("Unimplemented feature: {0}")]
    Unimplemented(String),
}

impl ConnectorError {
    pub(crate) fn connection(err: NativeError) -> Self {
        ConnectorError::Connection {
            code: err.code,
            message: err.message,
        }
    }

    pub(crate) fn statement(err: NativeError) -> Self {
        ConnectorError::Statement {
            code: err.code,
            message: err.message,
        }
    }

    pub(crate) fn decode(column: &str, message: impl Into<String>) -> Self {
        ConnectorError::Decode {
            column: column.to_string(),
            message: message.into(),
        }
    }

    /// Native error code carried by connection and statement failures.
    #[must_use]
    pub fn native_code(&self) -> Option<u32> {
        match self {
            ConnectorError::Connection { code, .. } | ConnectorError::Statement { code, .. } => {
                Some(*code)
            }
            _ => None,
        }
    }
}

impl From<serde_json::Error> for ConnectorError {
    fn from(err: serde_json::Error) -> Self {
        ConnectorError::ConfigError(format!("invalid connection options: {err}"))
    }
}
