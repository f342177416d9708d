//! MariaDB backend: connection slots, the typed value codec and the cursor engine.
//!
//! Every slot owns one [`NativeClient`](crate::native::NativeClient). Results are
//! buffered locally so the cursor can move both ways and seek at random.

#[cfg(feature = "mariadb")]
mod client;
mod codec;
mod cursor;
mod executor;
mod field;
mod placeholders;
mod pool;
mod slot;
mod stored;
mod transaction;

#[cfg(feature = "mariadb")]
pub use client::MysqlClient;
pub use codec::{BindDescriptor, decode_bound, decode_text, encode, encode_all};
pub use field::{FieldMeta, FieldType};
pub use placeholders::count_placeholders;
pub use pool::MariaDbConnector;
pub use slot::{SlotInfo, SlotStatus};
pub use stored::{NativeRow, StoredResult};
