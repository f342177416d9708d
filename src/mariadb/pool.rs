use std::sync::{Mutex, MutexGuard, PoisonError};

use super::slot::{ConnectionSlot, SlotInfo};
use crate::config::ConnectionOptions;
use crate::connector::{Connector, Handle};
use crate::error::ConnectorError;
use crate::lifecycle::PoolRegistration;
use crate::native::NativeClient;
use crate::results::{Record, RecordSet};
use crate::types::BindValue;

/// A fixed-size pool of MariaDB connection slots addressed by handle.
///
/// Slots connect lazily on their first `begin`. Each slot sits behind its own
/// mutex, so different handles may be driven from different threads.
pub struct MariaDbConnector<C: NativeClient> {
    options: ConnectionOptions,
    slots: Vec<Mutex<ConnectionSlot<C>>>,
    _registration: PoolRegistration,
}

impl<C: NativeClient> MariaDbConnector<C> {
    /// Build a pool whose slot `i` is driven by `factory(i)`. No I/O happens here.
    ///
    /// # Errors
    /// Fails when the library is not initialised, `pool_size` is zero or the
    /// options do not validate.
    pub fn with_clients<F>(
        pool_size: usize,
        options: ConnectionOptions,
        mut factory: F,
    ) -> Result<Self, ConnectorError>
    where
        F: FnMut(usize) -> C,
    {
        let registration = PoolRegistration::acquire()?;
        if pool_size == 0 {
            return Err(ConnectorError::ConfigError(
                "pool size must be at least 1".into(),
            ));
        }
        options.validate()?;

        let slots = (0..pool_size)
            .map(|handle| Mutex::new(ConnectionSlot::new(handle, factory(handle))))
            .collect();

        tracing::info!(
            pool_size,
            host = %options.host,
            port = options.port,
            schema = %options.schema,
            "mariadb connection pool created"
        );

        Ok(Self {
            options,
            slots,
            _registration: registration,
        })
    }

    #[must_use]
    pub fn options(&self) -> &ConnectionOptions {
        &self.options
    }

    /// Snapshot of the slot's flags and cursor.
    ///
    /// # Errors
    /// Returns `InvalidHandle` or `SlotPoisoned`.
    pub fn slot_info(&self, handle: Handle) -> Result<SlotInfo, ConnectorError> {
        Ok(self.slot(handle)?.info())
    }

    fn slot(&self, handle: Handle) -> Result<MutexGuard<'_, ConnectionSlot<C>>, ConnectorError> {
        let slot = self.slots.get(handle).ok_or(ConnectorError::InvalidHandle {
            handle,
            pool_size: self.slots.len(),
        })?;
        slot.lock().map_err(|_| ConnectorError::SlotPoisoned(handle))
    }
}

#[cfg(feature = "mariadb")]
impl MariaDbConnector<super::client::MysqlClient> {
    /// Pool backed by the `mysql` crate.
    ///
    /// # Errors
    /// See [`MariaDbConnector::with_clients`].
    pub fn new(pool_size: usize, options: ConnectionOptions) -> Result<Self, ConnectorError> {
        Self::with_clients(pool_size, options, |_| super::client::MysqlClient::new())
    }
}

impl<C: NativeClient> Drop for MariaDbConnector<C> {
    fn drop(&mut self) {
        for slot in &mut self.slots {
            slot.get_mut()
                .unwrap_or_else(PoisonError::into_inner)
                .close();
        }
        tracing::debug!(pool_size = self.slots.len(), "mariadb connection pool closed");
    }
}

impl<C: NativeClient> Connector for MariaDbConnector<C> {
    fn pool_size(&self) -> usize {
        self.slots.len()
    }

    fn begin(&self, handle: Handle) -> Result<(), ConnectorError> {
        self.slot(handle)?.begin(&self.options)
    }

    fn end(&self, handle: Handle) -> Result<(), ConnectorError> {
        self.slot(handle)?.end()
    }

    fn commit(&self, handle: Handle) -> Result<(), ConnectorError> {
        self.slot(handle)?.commit()
    }

    fn rollback(&self, handle: Handle) -> Result<(), ConnectorError> {
        self.slot(handle)?.rollback()
    }

    fn query(&self, handle: Handle, sql: &str) -> Result<(), ConnectorError> {
        self.slot(handle)?.query(sql)
    }

    fn prepare_query(&self, handle: Handle, sql: &str) -> Result<bool, ConnectorError> {
        Ok(self.slot(handle)?.prepare(sql))
    }

    fn add_bind_value(&self, handle: Handle, value: BindValue) -> Result<(), ConnectorError> {
        self.slot(handle)?.add_bind_value(value);
        Ok(())
    }

    fn exec(&self, handle: Handle) -> Result<(), ConnectorError> {
        self.slot(handle)?.exec()
    }

    fn move_first(&self, handle: Handle) -> Result<bool, ConnectorError> {
        self.slot(handle)?.move_first()
    }

    fn move_next(&self, handle: Handle) -> Result<bool, ConnectorError> {
        self.slot(handle)?.move_next()
    }

    fn move_previous(&self, handle: Handle) -> Result<bool, ConnectorError> {
        self.slot(handle)?.move_previous()
    }

    fn move_last(&self, handle: Handle) -> Result<bool, ConnectorError> {
        self.slot(handle)?.move_last()
    }

    fn get_record(&self, handle: Handle, record: &mut Record) -> Result<(), ConnectorError> {
        self.slot(handle)?.get_record(record)
    }

    fn get_record_set(&self, handle: Handle, records: &mut RecordSet) -> Result<(), ConnectorError> {
        self.slot(handle)?.get_record_set(records)
    }
}
