use sql_connector::mariadb::MariaDbConnector;
use sql_connector::native::NativeError;
use sql_connector::prelude::*;
use sql_connector::test_utils::{
    CONNECT, ROLLBACK, STORE_RESULT, ScriptedClient, ScriptedServer, counting_result,
};

fn pool(size: usize) -> Result<(ScriptedServer, MariaDbConnector<ScriptedClient>), ConnectorError> {
    initialise_library()?;
    let server = ScriptedServer::new();
    let clients = server.clone();
    let options = ConnectionOptions::builder()
        .host("db.test")
        .user("app")
        .schema("inventory")
        .finish();
    let pool = MariaDbConnector::with_clients(size, options, |h| clients.client(h))?;
    Ok((server, pool))
}

#[test]
fn begin_connects_once_and_starts_transaction() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(2)?;
    assert!(server.log().is_empty());

    pool.begin(1)?;
    pool.commit(1)?;
    pool.begin(1)?;

    assert_eq!(
        server.commands(1),
        vec![CONNECT, "START TRANSACTION", "COMMIT", "START TRANSACTION"]
    );
    assert!(server.commands(0).is_empty());
    let status = pool.slot_info(1)?.status;
    assert!(status.connected);
    assert!(status.transaction_in_progress);
    Ok(())
}

#[test]
fn failed_connect_leaves_slot_disconnected() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.fail(CONNECT, NativeError::new(2003, "Can't connect to MySQL server on 'db.test'"));

    let err = pool.begin(0).unwrap_err();
    assert!(matches!(err, ConnectorError::Connection { code: 2003, .. }));
    assert_eq!(err.native_code(), Some(2003));
    assert!(err.to_string().contains("2003 - Can't connect"));
    assert!(!pool.slot_info(0)?.status.connected);

    server.clear_failure(CONNECT);
    pool.begin(0)?;
    assert!(pool.slot_info(0)?.status.connected);
    assert_eq!(server.count(CONNECT), 2);
    Ok(())
}

#[test]
fn failed_start_leaves_connected_and_idle() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.fail("START TRANSACTION", NativeError::new(1792, "read-only transaction"));

    let err = pool.begin(0).unwrap_err();
    assert!(matches!(err, ConnectorError::Statement { code: 1792, .. }));
    let status = pool.slot_info(0)?.status;
    assert!(status.connected);
    assert!(!status.transaction_in_progress);
    Ok(())
}

#[test]
fn commit_resets_slot_even_on_failure() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM seq", counting_result(3));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM seq")?;
    server.fail("COMMIT", NativeError::new(1213, "Deadlock found when trying to get lock"));

    let err = pool.commit(0).unwrap_err();
    assert_eq!(err.native_code(), Some(1213));

    let info = pool.slot_info(0)?;
    assert!(!info.status.transaction_in_progress);
    assert!(!info.status.valid_record);
    assert!(!info.has_result);
    let mut record = Record::default();
    assert!(matches!(
        pool.get_record(0, &mut record),
        Err(ConnectorError::RecordNotLoaded)
    ));
    Ok(())
}

#[test]
fn commit_and_end_without_transaction_are_harmless() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    pool.commit(0)?;
    pool.end(0)?;
    assert!(server.log().is_empty());

    pool.begin(0)?;
    pool.end(0)?;
    pool.end(0)?;
    assert_eq!(server.count("COMMIT"), 1);
    Ok(())
}

#[test]
fn rollback_clears_flag_only_on_success() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    pool.begin(0)?;

    server.fail(ROLLBACK, NativeError::new(2013, "Lost connection to MySQL server"));
    let err = pool.rollback(0).unwrap_err();
    assert!(matches!(err, ConnectorError::Statement { code: 2013, .. }));
    assert!(pool.slot_info(0)?.status.transaction_in_progress);

    server.clear_failure(ROLLBACK);
    pool.rollback(0)?;
    assert!(!pool.slot_info(0)?.status.transaction_in_progress);
    Ok(())
}

#[test]
fn rollback_discards_live_result() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM seq", counting_result(2));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM seq")?;
    pool.rollback(0)?;
    assert!(!pool.slot_info(0)?.has_result);
    Ok(())
}

#[test]
fn query_before_begin_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    let err = pool.query(0, "SELECT 1").unwrap_err();
    assert!(matches!(err, ConnectorError::NotConnected(0)));
    assert!(server.log().is_empty());
    Ok(())
}

#[test]
fn query_failure_surfaces_native_diagnostic() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.fail(
        "SELEC 1",
        NativeError::new(1064, "You have an error in your SQL syntax"),
    );
    pool.begin(0)?;

    let err = pool.query(0, "SELEC 1").unwrap_err();
    assert!(matches!(err, ConnectorError::Statement { code: 1064, .. }));
    assert!(err.to_string().contains("1064 - You have an error"));
    Ok(())
}

#[test]
fn result_buffering_failure_keeps_native_code() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM seq", counting_result(2));
    server.fail(STORE_RESULT, NativeError::new(2013, "Lost connection to server during query"));
    pool.begin(0)?;

    let err = pool.query(0, "SELECT n FROM seq").unwrap_err();
    assert!(matches!(err, ConnectorError::Statement { code: 2013, .. }));
    assert_eq!(err.native_code(), Some(2013));
    assert!(err.to_string().contains("2013 - Lost connection"));
    assert!(!pool.slot_info(0)?.has_result);
    Ok(())
}

#[test]
fn begin_while_open_keeps_going() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    pool.begin(0)?;
    pool.begin(0)?;
    assert_eq!(server.count("START TRANSACTION"), 2);
    assert_eq!(server.count(CONNECT), 1);
    assert!(pool.slot_info(0)?.status.transaction_in_progress);
    Ok(())
}
