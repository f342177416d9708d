use sql_connector::mariadb::{FieldMeta, FieldType, MariaDbConnector};
use sql_connector::prelude::*;
use sql_connector::test_utils::{ScriptedClient, ScriptedServer, counting_result, text_result};

fn pool(size: usize) -> Result<(ScriptedServer, MariaDbConnector<ScriptedClient>), ConnectorError> {
    initialise_library()?;
    let server = ScriptedServer::new();
    let clients = server.clone();
    let pool = MariaDbConnector::with_clients(size, ConnectionOptions::default(), |h| {
        clients.client(h)
    })?;
    Ok((server, pool))
}

fn current(pool: &impl Connector, handle: Handle) -> Result<Value, ConnectorError> {
    let mut record = Record::default();
    pool.get_record(handle, &mut record)?;
    Ok(record.get("n").cloned().unwrap_or(Value::Null))
}

#[test]
fn select_one_yields_single_integer() -> Result<(), Box<dyn std::error::Error>> {
    let (_server, pool) = pool(1)?;
    pool.begin(0)?;
    pool.query(0, "SELECT 1")?;

    let mut record = Record::default();
    pool.get_record(0, &mut record)?;
    assert_eq!(record.len(), 1);
    assert_eq!(record.get_by_index(0), Some(&Value::I64(1)));
    assert_eq!(record.column_names(), &["1".to_string()]);

    assert!(!pool.move_next(0)?);
    pool.get_record(0, &mut record)?;
    assert_eq!(record.get_by_index(0), Some(&Value::I64(1)));
    pool.end(0)?;
    Ok(())
}

#[test]
fn forward_walk_visits_every_row_once() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM seq", counting_result(5));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM seq")?;

    let mut seen = Vec::new();
    assert!(pool.move_first(0)?);
    loop {
        seen.push(current(&pool, 0)?);
        if !pool.move_next(0)? {
            break;
        }
    }
    assert_eq!(seen, (0..5).map(Value::I32).collect::<Vec<_>>());

    // Stays on the last row no matter how often it is pushed.
    assert!(!pool.move_next(0)?);
    assert!(!pool.move_next(0)?);
    assert_eq!(current(&pool, 0)?, Value::I32(4));
    Ok(())
}

#[test]
fn zero_rows_leave_nothing_loaded() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM empty", counting_result(0));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM empty")?;

    assert!(!pool.move_first(0)?);
    assert!(!pool.move_last(0)?);
    let mut record = Record::default();
    let err = pool.get_record(0, &mut record).unwrap_err();
    assert!(matches!(err, ConnectorError::RecordNotLoaded));
    assert_eq!(err.to_string(), "Record not loaded.");
    Ok(())
}

#[test]
fn unloaded_row_empties_the_callers_record() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM empty", counting_result(0));
    pool.begin(0)?;
    pool.query(0, "SELECT 1")?;
    let mut record = Record::default();
    pool.get_record(0, &mut record)?;
    assert_eq!(record.len(), 1);

    pool.query(0, "SELECT n FROM empty")?;
    let err = pool.get_record(0, &mut record).unwrap_err();
    assert!(matches!(err, ConnectorError::RecordNotLoaded));
    assert!(record.is_empty());
    assert!(record.column_names().is_empty());
    assert_eq!(record.get("1"), None);
    Ok(())
}

#[test]
fn statements_without_rows_produce_no_result() -> Result<(), Box<dyn std::error::Error>> {
    let (_server, pool) = pool(1)?;
    pool.begin(0)?;
    pool.query(0, "UPDATE item SET qty = 0")?;

    let info = pool.slot_info(0)?;
    assert!(!info.has_result);
    assert_eq!(info.row_count, 0);
    assert!(!pool.move_first(0)?);
    Ok(())
}

#[test]
fn backwards_and_random_access() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM seq", counting_result(4));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM seq")?;

    assert!(!pool.move_previous(0)?);
    assert_eq!(current(&pool, 0)?, Value::I32(0));

    assert!(pool.move_last(0)?);
    assert_eq!(current(&pool, 0)?, Value::I32(3));

    let mut backwards = vec![current(&pool, 0)?];
    while pool.move_previous(0)? {
        backwards.push(current(&pool, 0)?);
    }
    assert_eq!(backwards, (0..4).rev().map(Value::I32).collect::<Vec<_>>());

    assert!(pool.move_next(0)?);
    assert_eq!(current(&pool, 0)?, Value::I32(1));
    assert!(pool.move_first(0)?);
    assert_eq!(current(&pool, 0)?, Value::I32(0));
    Ok(())
}

#[test]
fn record_set_matches_manual_iteration() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query(
        "SELECT id, name, note FROM item",
        text_result(
            vec![
                FieldMeta::new("id", FieldType::LongLong).with_unsigned(true),
                FieldMeta::new("name", FieldType::VarString),
                FieldMeta::new("note", FieldType::Blob),
            ],
            &[
                &[Some("1"), Some("bolt"), None],
                &[Some("2"), Some("nut"), Some("metric")],
                &[Some("3"), Some("washer"), Some("")],
            ],
        ),
    );
    pool.begin(0)?;
    pool.query(0, "SELECT id, name, note FROM item")?;

    let mut manual = Vec::new();
    let mut record = Record::default();
    assert!(pool.move_first(0)?);
    loop {
        pool.get_record(0, &mut record)?;
        manual.push(record.clone());
        if !pool.move_next(0)? {
            break;
        }
    }

    let mut records = RecordSet::default();
    pool.get_record_set(0, &mut records)?;
    assert_eq!(records.len(), 3);
    assert_eq!(records.iter().cloned().collect::<Vec<_>>(), manual);
    assert_eq!(records[1].get("name"), Some(&Value::String("nut".into())));
    assert_eq!(records[0].get("note"), Some(&Value::Null));
    assert_eq!(records[2].get("id"), Some(&Value::U64(3)));

    // The cursor is left on the final row.
    let info = pool.slot_info(0)?;
    assert_eq!(info.requested_row, 2);
    Ok(())
}

#[test]
fn record_set_of_empty_result_is_empty() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM empty", counting_result(0));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM empty")?;

    let mut records = RecordSet::default();
    records.push(Record::default());
    pool.get_record_set(0, &mut records)?;
    assert!(records.is_empty());
    Ok(())
}

#[test]
fn unsupported_column_type_is_fatal() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query(
        "SELECT doc FROM blobs",
        text_result(vec![FieldMeta::new("doc", FieldType::Json)], &[&[None]]),
    );
    pool.begin(0)?;
    pool.query(0, "SELECT doc FROM blobs")?;

    let mut record = Record::default();
    let err = pool.get_record(0, &mut record).unwrap_err();
    assert!(matches!(
        err,
        ConnectorError::UnsupportedColumnType {
            field_type: FieldType::Json,
            ..
        }
    ));
    Ok(())
}

#[test]
fn new_query_releases_previous_result() -> Result<(), Box<dyn std::error::Error>> {
    let (server, pool) = pool(1)?;
    server.on_query("SELECT n FROM seq", counting_result(3));
    pool.begin(0)?;
    pool.query(0, "SELECT n FROM seq")?;
    assert!(pool.move_last(0)?);

    pool.query(0, "SELECT 1")?;
    let info = pool.slot_info(0)?;
    assert_eq!(info.row_count, 1);
    assert_eq!(info.requested_row, 0);
    let mut record = Record::default();
    pool.get_record(0, &mut record)?;
    assert_eq!(record.get("1"), Some(&Value::I64(1)));
    Ok(())
}
