use mysql::consts::ColumnFlags;
use mysql::prelude::Queryable;
use mysql::{Column, Conn, OptsBuilder, Params, Row, Statement, Value as MyValue};

use super::codec::{self, BindDescriptor};
use super::field::{FieldMeta, FieldType};
use super::stored::{NativeRow, StoredResult};
use crate::config::ConnectionOptions;
use crate::native::{
    CR_COMMANDS_OUT_OF_SYNC, CR_SERVER_GONE_ERROR, CR_UNKNOWN_ERROR, CR_UNSUPPORTED_PARAM_TYPE,
    NativeClient, NativeError,
};
use crate::types::Value;

const BINARY_CHARSET: u16 = 63;

/// `NativeClient` over a blocking `mysql::Conn`.
///
/// Every result is read to the end and buffered, both for ad-hoc queries and for
/// prepared statements. Binary-protocol values are rendered back to their text
/// form so one decoder serves both paths.
#[derive(Default)]
pub struct MysqlClient {
    conn: Option<Conn>,
    pending: Option<StoredResult>,
    field_count: usize,
    stmt: Option<Statement>,
    params: Vec<MyValue>,
    stmt_result: Option<StoredResult>,
}

impl MysqlClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn conn(&mut self) -> Result<&mut Conn, NativeError> {
        self.conn
            .as_mut()
            .ok_or_else(|| NativeError::new(CR_SERVER_GONE_ERROR, "MySQL server has gone away"))
    }
}

fn native(err: mysql::Error) -> NativeError {
    match err {
        mysql::Error::MySqlError(e) => NativeError::new(u32::from(e.code), e.message),
        other => NativeError::new(CR_UNKNOWN_ERROR, other.to_string()),
    }
}

fn field_meta(columns: &[Column]) -> Vec<FieldMeta> {
    columns
        .iter()
        .map(|col| {
            FieldMeta::new(
                col.name_str().into_owned(),
                FieldType::from_code(u8::from(col.column_type())),
            )
            .with_unsigned(col.flags().contains(ColumnFlags::UNSIGNED_FLAG))
            .with_binary(col.character_set() == BINARY_CHARSET)
            .with_length(col.column_length())
        })
        .collect()
}

fn fraction(micros: u32) -> String {
    if micros == 0 {
        String::new()
    } else {
        format!(".{micros:06}")
    }
}

/// Render a driver value as the bytes the text protocol would have sent.
fn to_text(value: MyValue, field: Option<&FieldMeta>) -> Option<Vec<u8>> {
    let text = match value {
        MyValue::NULL => return None,
        MyValue::Bytes(bytes) => return Some(bytes),
        MyValue::Int(v) => v.to_string(),
        MyValue::UInt(v) => v.to_string(),
        MyValue::Float(v) => v.to_string(),
        MyValue::Double(v) => v.to_string(),
        MyValue::Date(y, m, d, ..) if field.is_some_and(|f| f.field_type == FieldType::Date) => {
            format!("{y:04}-{m:02}-{d:02}")
        }
        MyValue::Date(y, m, d, h, mi, s, us) => {
            format!("{y:04}-{m:02}-{d:02} {h:02}:{mi:02}:{s:02}{}", fraction(us))
        }
        MyValue::Time(negative, days, h, mi, s, us) => {
            let hours = days * 24 + u32::from(h);
            let sign = if negative { "-" } else { "" };
            format!("{sign}{hours:02}:{mi:02}:{s:02}{}", fraction(us))
        }
    };
    Some(text.into_bytes())
}

fn native_row(row: Row, fields: &[FieldMeta]) -> NativeRow {
    row.unwrap_raw()
        .into_iter()
        .enumerate()
        .map(|(idx, value)| to_text(value.unwrap_or(MyValue::NULL), fields.get(idx)))
        .collect()
}

fn to_param(desc: &BindDescriptor) -> Result<MyValue, NativeError> {
    let value = codec::decode_bound(desc)
        .map_err(|e| NativeError::new(CR_UNSUPPORTED_PARAM_TYPE, e.to_string()))?;
    Ok(match value {
        Value::Null => MyValue::NULL,
        Value::Bool(b) => MyValue::Int(i64::from(b)),
        Value::I8(v) => MyValue::Int(i64::from(v)),
        Value::I16(v) => MyValue::Int(i64::from(v)),
        Value::I32(v) => MyValue::Int(i64::from(v)),
        Value::I64(v) => MyValue::Int(v),
        Value::U8(v) => MyValue::UInt(u64::from(v)),
        Value::U16(v) => MyValue::UInt(u64::from(v)),
        Value::U32(v) => MyValue::UInt(u64::from(v)),
        Value::U64(v) => MyValue::UInt(v),
        Value::Float(v) => MyValue::Float(v),
        Value::Double(v) => MyValue::Double(v),
        Value::Decimal(d) => MyValue::Bytes(d.to_plain_string().into_bytes()),
        Value::String(s) => MyValue::Bytes(s.into_bytes()),
        Value::Blob(b) => MyValue::Bytes(b),
        Value::Bit(bits) => MyValue::Bytes(bits.to_be_bytes()),
        Value::Date(_) | Value::Time(_) | Value::DateTime(_) => {
            MyValue::Bytes(desc.buffer().to_vec())
        }
    })
}

impl NativeClient for MysqlClient {
    fn connect(&mut self, options: &ConnectionOptions) -> Result<(), NativeError> {
        let schema = (!options.schema.is_empty()).then_some(options.schema.as_str());
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(options.host.as_str()))
            .tcp_port(options.port)
            .user(Some(options.user.as_str()))
            .pass(Some(options.password.as_str()))
            .db_name(schema);
        self.conn = Some(Conn::new(opts).map_err(native)?);
        Ok(())
    }

    fn real_query(&mut self, sql: &str) -> Result<(), NativeError> {
        self.pending = None;
        self.field_count = 0;

        let conn = self.conn()?;
        let mut result = conn.query_iter(sql).map_err(native)?;
        let fields = field_meta(result.columns().as_ref());
        let mut rows = Vec::new();
        for row in result.by_ref() {
            rows.push(native_row(row.map_err(native)?, &fields));
        }
        drop(result);

        self.field_count = fields.len();
        if !fields.is_empty() {
            self.pending = Some(StoredResult::new(fields, rows));
        }
        Ok(())
    }

    fn field_count(&self) -> usize {
        self.field_count
    }

    fn store_result(&mut self) -> Result<StoredResult, NativeError> {
        self.pending.take().ok_or_else(|| {
            NativeError::new(CR_COMMANDS_OUT_OF_SYNC, "Commands out of sync; no pending result")
        })
    }

    fn stmt_prepare(&mut self, sql: &str) -> Result<usize, NativeError> {
        self.stmt_close();
        let stmt = self.conn()?.prep(sql).map_err(native)?;
        let params = usize::from(stmt.num_params());
        self.stmt = Some(stmt);
        Ok(params)
    }

    fn stmt_bind_param(&mut self, binds: &[BindDescriptor]) -> Result<(), NativeError> {
        self.params = binds.iter().map(to_param).collect::<Result<_, _>>()?;
        Ok(())
    }

    fn stmt_execute(&mut self) -> Result<(), NativeError> {
        self.stmt_result = None;
        let params = if self.params.is_empty() {
            Params::Empty
        } else {
            Params::Positional(std::mem::take(&mut self.params))
        };

        let stmt = self.stmt.as_ref().ok_or_else(|| {
            NativeError::new(CR_COMMANDS_OUT_OF_SYNC, "Commands out of sync; no statement")
        })?;
        let conn = self
            .conn
            .as_mut()
            .ok_or_else(|| NativeError::new(CR_SERVER_GONE_ERROR, "MySQL server has gone away"))?;

        let mut result = conn.exec_iter(stmt, params).map_err(native)?;
        let fields = field_meta(result.columns().as_ref());
        let mut rows = Vec::new();
        for row in result.by_ref() {
            rows.push(native_row(row.map_err(native)?, &fields));
        }
        drop(result);

        if !fields.is_empty() {
            self.stmt_result = Some(StoredResult::new(fields, rows));
        }
        Ok(())
    }

    fn stmt_result_metadata(&self) -> Option<Vec<FieldMeta>> {
        self.stmt_result.as_ref().map(|r| r.fields().to_vec())
    }

    fn stmt_store_result(&mut self) -> Result<StoredResult, NativeError> {
        self.stmt_result.take().ok_or_else(|| {
            NativeError::new(CR_COMMANDS_OUT_OF_SYNC, "Commands out of sync; no statement result")
        })
    }

    fn stmt_close(&mut self) {
        self.params.clear();
        self.stmt_result = None;
        if let (Some(conn), Some(stmt)) = (self.conn.as_mut(), self.stmt.take()) {
            if let Err(err) = conn.close(stmt) {
                tracing::debug!(error = %err, "failed to close prepared statement");
            }
        }
    }

    fn rollback(&mut self) -> Result<(), NativeError> {
        self.conn()?.query_drop("ROLLBACK").map_err(native)
    }

    fn close(&mut self) {
        self.stmt_close();
        self.pending = None;
        self.conn = None;
    }
}
