use serde::{Deserialize, Serialize};

use crate::error::ConnectorError;

pub const DEFAULT_HOST: &str = "localhost";
pub const DEFAULT_PORT: u16 = 3306;

/// Options used to open each slot's session.
///
/// Read once per slot, at the first `begin_transaction` on that slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    pub host: String,
    pub user: String,
    pub password: String,
    /// Default schema (database) for the session; empty for none.
    pub schema: String,
    pub port: u16,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            user: String::new(),
            password: String::new(),
            schema: String::new(),
            port: DEFAULT_PORT,
        }
    }
}

impl ConnectionOptions {
    #[must_use]
    pub fn new(host: String, user: String, password: String, schema: String, port: u16) -> Self {
        Self {
            host,
            user,
            password,
            schema,
            port,
        }
    }

    #[must_use]
    pub fn builder() -> ConnectionOptionsBuilder {
        ConnectionOptionsBuilder::default()
    }

    /// Parse options from a JSON object; missing keys take their defaults.
    ///
    /// ```rust
    /// use sql_connector::ConnectionOptions;
    ///
    /// let opts = ConnectionOptions::from_json(r#"{"host": "db", "user": "app"}"#).unwrap();
    /// assert_eq!(opts.port, 3306);
    /// ```
    ///
    /// # Errors
    /// Returns `ConnectorError::ConfigError` if the JSON is malformed or fails validation.
    pub fn from_json(json: &str) -> Result<Self, ConnectorError> {
        let opts: ConnectionOptions = serde_json::from_str(json)?;
        opts.validate()?;
        Ok(opts)
    }

    /// # Errors
    /// Returns `ConnectorError::ConfigError` for an empty host or a zero port.
    pub fn validate(&self) -> Result<(), ConnectorError> {
        if self.host.trim().is_empty() {
            return Err(ConnectorError::ConfigError("host must not be empty".into()));
        }
        if self.port == 0 {
            return Err(ConnectorError::ConfigError("port must not be zero".into()));
        }
        Ok(())
    }
}

/// Fluent builder for connection options.
#[derive(Debug, Clone, Default)]
pub struct ConnectionOptionsBuilder {
    opts: ConnectionOptions,
}

impl ConnectionOptionsBuilder {
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.opts.host = host.into();
        self
    }

    #[must_use]
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.opts.user = user.into();
        self
    }

    #[must_use]
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.opts.password = password.into();
        self
    }

    #[must_use]
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.opts.schema = schema.into();
        self
    }

    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.opts.port = port;
        self
    }

    #[must_use]
    pub fn finish(self) -> ConnectionOptions {
        self.opts
    }
}
