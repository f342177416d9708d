//! Blocking database connector with a handle-addressed connection pool and a
//! bidirectional result cursor.
//!
//! The host initialises the library, creates a pool of `N` slots and then drives
//! each slot by handle: `begin` connects lazily and starts a transaction, `query`
//! and `prepare_query`/`exec` produce a buffered result, and the `move_*`
//! operations walk it while `get_record` decodes the loaded row into typed
//! [`Value`]s.
//!
//! ```no_run
//! use sql_connector::prelude::*;
//!
//! # fn main() -> Result<(), ConnectorError> {
//! initialise_library()?;
//! let options = ConnectionOptions::builder()
//!     .host("db.internal")
//!     .user("app")
//!     .password("secret")
//!     .schema("inventory")
//!     .finish();
//! let pool = create_connection_pool(Engine::MariaDb, 4, options)?;
//!
//! pool.begin(0)?;
//! pool.query(0, "SELECT id, name FROM item")?;
//! let mut record = Record::default();
//! if pool.move_first(0)? {
//!     loop {
//!         pool.get_record(0, &mut record)?;
//!         println!("{:?}", record.get("name"));
//!         if !pool.move_next(0)? {
//!             break;
//!         }
//!     }
//! }
//! pool.end(0)?;
//! drop(pool);
//! shutdown_library()?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod connector;
pub mod error;
pub mod lifecycle;
pub mod mariadb;
pub mod native;
pub mod prelude;
pub mod results;
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
pub mod types;

pub use config::{ConnectionOptions, ConnectionOptionsBuilder};
pub use connector::{Connector, Engine, Handle, create_connection_pool};
pub use error::ConnectorError;
pub use lifecycle::{initialise_library, is_initialised, shutdown_library};
pub use results::{Record, RecordSet};
pub use types::{BindValue, BitSet, ParamDirection, Value};
