use super::codec;
use super::placeholders::count_placeholders;
use super::slot::ConnectionSlot;
use crate::error::ConnectorError;
use crate::native::NativeClient;
use crate::types::BindValue;

impl<C: NativeClient> ConnectionSlot<C> {
    /// Run `sql` verbatim over the text protocol and buffer any result.
    pub(crate) fn query(&mut self, sql: &str) -> Result<(), ConnectorError> {
        self.ensure_connected()?;
        self.release_result();

        tracing::debug!(handle = self.handle, sql, "query");
        self.client
            .real_query(sql)
            .map_err(ConnectorError::statement)?;

        if self.client.field_count() != 0 {
            let result = self
                .client
                .store_result()
                .map_err(ConnectorError::statement)?;
            self.install_result(result)?;
        }
        Ok(())
    }

    /// Record `sql` for a later `exec` and drop any previously bound parameters.
    ///
    /// Returns `false`, preparing nothing, when `sql` is blank.
    pub(crate) fn prepare(&mut self, sql: &str) -> bool {
        self.statement.reset();
        self.client.stmt_close();

        if sql.trim().is_empty() {
            self.status.statement_prepared = false;
            return false;
        }

        self.statement.sql = sql.to_string();
        self.statement.placeholders = count_placeholders(sql);
        self.status.statement_prepared = true;
        tracing::debug!(
            handle = self.handle,
            sql,
            placeholders = self.statement.placeholders,
            "statement prepared"
        );
        true
    }

    /// IN and INOUT values become input parameters; OUT and INOUT values are
    /// also registered as output parameters.
    pub(crate) fn add_bind_value(&mut self, bind: BindValue) {
        if bind.direction.is_input() {
            self.statement.input_parameters.push(bind.value.clone());
        }
        if bind.direction.is_output() {
            self.statement.output_parameters.push(bind);
        }
    }

    /// Prepare, bind and execute the recorded statement.
    ///
    /// When output parameters were registered the statement must produce a
    /// result; its rows become the slot's live result set.
    pub(crate) fn exec(&mut self) -> Result<(), ConnectorError> {
        if !self.status.statement_prepared {
            return Err(ConnectorError::NoStatementPrepared);
        }
        self.ensure_connected()?;

        let inputs = self.statement.input_parameters.len();
        if inputs != self.statement.placeholders {
            return Err(ConnectorError::ParameterError(format!(
                "statement has {} placeholder(s) but {inputs} input value(s) were bound",
                self.statement.placeholders
            )));
        }

        self.release_result();
        tracing::debug!(handle = self.handle, sql = %self.statement.sql, inputs, "exec");

        let expected = self
            .client
            .stmt_prepare(&self.statement.sql)
            .map_err(ConnectorError::statement)?;
        if expected != inputs {
            self.client.stmt_close();
            return Err(ConnectorError::ParameterError(format!(
                "server expects {expected} parameter(s) but {inputs} input value(s) were bound"
            )));
        }

        self.statement.binds = codec::encode_all(&self.statement.input_parameters);
        let outcome = self.bind_and_execute();
        // The native statement never outlives exec, whatever the outcome.
        self.client.stmt_close();
        outcome
    }

    fn bind_and_execute(&mut self) -> Result<(), ConnectorError> {
        self.client
            .stmt_bind_param(&self.statement.binds)
            .map_err(ConnectorError::statement)?;
        self.client
            .stmt_execute()
            .map_err(ConnectorError::statement)?;

        if !self.statement.output_parameters.is_empty() {
            if self.client.stmt_result_metadata().is_none() {
                return Err(ConnectorError::OutputWithoutResult);
            }
            let result = self
                .client
                .stmt_store_result()
                .map_err(ConnectorError::statement)?;
            self.install_result(result)?;
        }
        Ok(())
    }
}
