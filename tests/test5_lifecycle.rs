// Library state is process-wide, so this binary holds a single test.

use sql_connector::mariadb::MariaDbConnector;
use sql_connector::prelude::*;
use sql_connector::test_utils::{CLOSE, ScriptedServer};

#[test]
fn library_lifecycle_brackets_every_pool() -> Result<(), Box<dyn std::error::Error>> {
    let server = ScriptedServer::new();

    assert!(!is_initialised());
    let early = MariaDbConnector::with_clients(1, ConnectionOptions::default(), |h| {
        server.client(h)
    });
    assert!(matches!(early, Err(ConnectorError::Lifecycle(_))));
    assert!(matches!(shutdown_library(), Err(ConnectorError::Lifecycle(_))));

    initialise_library()?;
    initialise_library()?;
    assert!(is_initialised());

    let pool = MariaDbConnector::with_clients(3, ConnectionOptions::default(), |h| {
        server.client(h)
    })?;
    assert!(server.log().is_empty());
    pool.begin(1)?;

    assert!(matches!(shutdown_library(), Err(ConnectorError::Lifecycle(_))));

    drop(pool);
    assert_eq!(server.count(CLOSE), 3);
    assert_eq!(server.count("COMMIT"), 0);

    shutdown_library()?;
    assert!(!is_initialised());
    assert!(matches!(initialise_library(), Err(ConnectorError::Lifecycle(_))));
    assert!(matches!(shutdown_library(), Err(ConnectorError::Lifecycle(_))));

    let late = MariaDbConnector::with_clients(1, ConnectionOptions::default(), |h| {
        server.client(h)
    });
    assert!(matches!(late, Err(ConnectorError::Lifecycle(_))));
    Ok(())
}
