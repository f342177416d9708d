//! Convenient imports for common functionality.
//!
//! Brings the pool contract, configuration, value types and lifecycle calls
//! into scope with a single `use`.

pub use crate::config::{ConnectionOptions, ConnectionOptionsBuilder};
pub use crate::connector::{Connector, Engine, Handle, create_connection_pool};
pub use crate::error::ConnectorError;
pub use crate::lifecycle::{initialise_library, is_initialised, shutdown_library};
pub use crate::mariadb::{MariaDbConnector, SlotInfo, SlotStatus};
pub use crate::results::{Record, RecordSet};
pub use crate::types::{BindValue, BitSet, ParamDirection, Value};

#[cfg(feature = "mariadb")]
pub use crate::mariadb::MysqlClient;
