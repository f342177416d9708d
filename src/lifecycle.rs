//! Process-wide client library lifecycle.
//!
//! The host calls [`initialise_library`] once before building any pool and
//! [`shutdown_library`] once after every pool has been dropped. Nothing happens
//! implicitly at load or unload time.

use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::ConnectorError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LibraryState {
    Uninitialised,
    Ready,
    ShutDown,
}

struct Library {
    state: LibraryState,
    live_pools: usize,
}

static LIBRARY: Mutex<Library> = Mutex::new(Library {
    state: LibraryState::Uninitialised,
    live_pools: 0,
});

fn library() -> MutexGuard<'static, Library> {
    // The guarded data stays consistent even if a holder panicked.
    LIBRARY.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Initialise the client library. Repeated calls while initialised are no-ops.
///
/// # Errors
/// Returns `ConnectorError::Lifecycle` once the library has been shut down.
pub fn initialise_library() -> Result<(), ConnectorError> {
    let mut lib = library();
    match lib.state {
        LibraryState::Uninitialised => {
            lib.state = LibraryState::Ready;
            tracing::debug!("client library initialised");
            Ok(())
        }
        LibraryState::Ready => Ok(()),
        LibraryState::ShutDown => Err(ConnectorError::Lifecycle(
            "client library already shut down for this process".into(),
        )),
    }
}

/// Release the client library.
///
/// # Errors
/// Returns `ConnectorError::Lifecycle` if the library was never initialised or
/// if any connection pool is still alive.
pub fn shutdown_library() -> Result<(), ConnectorError> {
    let mut lib = library();
    match lib.state {
        LibraryState::Ready if lib.live_pools == 0 => {
            lib.state = LibraryState::ShutDown;
            tracing::debug!("client library shut down");
            Ok(())
        }
        LibraryState::Ready => Err(ConnectorError::Lifecycle(format!(
            "{} connection pool(s) still alive",
            lib.live_pools
        ))),
        LibraryState::Uninitialised => Err(ConnectorError::Lifecycle(
            "client library was never initialised".into(),
        )),
        LibraryState::ShutDown => Err(ConnectorError::Lifecycle(
            "client library already shut down".into(),
        )),
    }
}

#[must_use]
pub fn is_initialised() -> bool {
    library().state == LibraryState::Ready
}

/// Keeps the library from shutting down while a pool exists.
#[derive(Debug)]
pub(crate) struct PoolRegistration(());

impl PoolRegistration {
    pub(crate) fn acquire() -> Result<Self, ConnectorError> {
        let mut lib = library();
        if lib.state != LibraryState::Ready {
            return Err(ConnectorError::Lifecycle(
                "initialise_library() must be called before creating a connection pool".into(),
            ));
        }
        lib.live_pools += 1;
        Ok(PoolRegistration(()))
    }
}

impl Drop for PoolRegistration {
    fn drop(&mut self) {
        let mut lib = library();
        lib.live_pools = lib.live_pools.saturating_sub(1);
    }
}
