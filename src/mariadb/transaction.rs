use super::slot::ConnectionSlot;
use crate::config::ConnectionOptions;
use crate::error::ConnectorError;
use crate::native::NativeClient;

const START_TRANSACTION: &str = "START TRANSACTION";
const COMMIT: &str = "COMMIT";

impl<C: NativeClient> ConnectionSlot<C> {
    /// Open the session on first use, then start a transaction.
    ///
    /// A failed connect leaves the slot disconnected; a failed `START TRANSACTION`
    /// leaves it connected and idle.
    pub(crate) fn begin(&mut self, options: &ConnectionOptions) -> Result<(), ConnectorError> {
        if !self.status.connected {
            tracing::debug!(
                handle = self.handle,
                host = %options.host,
                port = options.port,
                schema = %options.schema,
                "connecting"
            );
            self.client
                .connect(options)
                .map_err(ConnectorError::connection)?;
            self.status.connected = true;
        }

        if self.status.transaction_in_progress {
            tracing::warn!(
                handle = self.handle,
                "starting a transaction while one is open; the server commits the open one"
            );
        }

        self.release_result();
        tracing::debug!(handle = self.handle, "{START_TRANSACTION}");
        self.client
            .real_query(START_TRANSACTION)
            .map_err(ConnectorError::statement)?;
        self.status.transaction_in_progress = true;
        Ok(())
    }

    /// Commit if a transaction is open; otherwise nothing happens.
    pub(crate) fn end(&mut self) -> Result<(), ConnectorError> {
        if self.status.transaction_in_progress {
            self.commit()
        } else {
            Ok(())
        }
    }

    /// Send `COMMIT`. The result set, transaction flag and loaded record are
    /// cleared whether or not the commit succeeds.
    pub(crate) fn commit(&mut self) -> Result<(), ConnectorError> {
        let outcome = if self.status.connected {
            tracing::debug!(handle = self.handle, "Committing last transaction");
            self.client
                .real_query(COMMIT)
                .map_err(ConnectorError::statement)
        } else {
            Ok(())
        };

        self.release_result();
        self.status.transaction_in_progress = false;

        if let Err(err) = &outcome {
            tracing::debug!(handle = self.handle, error = %err, "commit failed");
        }
        outcome
    }

    /// Roll back the open transaction. The transaction flag is only cleared on success.
    pub(crate) fn rollback(&mut self) -> Result<(), ConnectorError> {
        if !self.status.connected {
            return Ok(());
        }
        self.client.rollback().map_err(ConnectorError::statement)?;
        self.release_result();
        self.status.transaction_in_progress = false;
        tracing::debug!(handle = self.handle, "ROLLBACK TRANSACTION");
        Ok(())
    }
}
