//! TigerGraph implementation of the state gateway and script executor ports

use std::sync::Arc;

use super::client::TigerGraphClient;
use super::records::MigrationUpsertPayload;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};
use crate::domain::{current_version, Direction, MigrationRecord};
use crate::migrations::{METADATA_GRAPH_NAME, METADATA_INIT_GSQL};
use crate::ports::{ScriptExecutor, StateGateway};

/// Start of the metadata error message when the tracking graph does not exist
pub const NOT_INITIALIZED_PREFIX: &str = "Graph name ClientMetadata cannot be found.";

/// Migration state and script execution backed by a TigerGraph instance
#[derive(Debug, Clone)]
pub struct TigerGraphGateway {
    client: Arc<TigerGraphClient>,
}

impl TigerGraphGateway {
    pub fn new(client: TigerGraphClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }

    pub fn client(&self) -> &TigerGraphClient {
        &self.client
    }
}

impl StateGateway for TigerGraphGateway {
    fn is_tracking_initialized(&self, ctx: &RunContext) -> Result<bool> {
        let meta = self.client.graph_metadata(ctx, METADATA_GRAPH_NAME)?;

        let graph_name = meta.results.as_ref().map(|r| r.graph_name.as_str());
        if !meta.error && graph_name == Some(METADATA_GRAPH_NAME) {
            return Ok(true);
        }

        if meta.message.starts_with(NOT_INITIALIZED_PREFIX) {
            return Ok(false);
        }

        let detail = if meta.message.is_empty() {
            format!("unexpected metadata graph name {:?}", graph_name.unwrap_or(""))
        } else {
            meta.message
        };
        Err(Error::UnknownInitializationFailure(detail))
    }

    fn latest_version(&self, ctx: &RunContext, target: &str) -> Result<Option<String>> {
        match self.client.latest_migration(ctx, target)? {
            Some(attrs) => current_version(&attrs.migration_number, &attrs.mode).map(Some),
            None => Ok(None),
        }
    }

    fn commit(&self, ctx: &RunContext, target: &str, version: &str, direction: Direction) -> Result<()> {
        let record = MigrationRecord::new(target, version, direction);
        let payload = MigrationUpsertPayload::from(&record);

        let result = self.client.upsert(ctx, METADATA_GRAPH_NAME, &payload)?;
        if result.accepted_vertices != 1 {
            return Err(Error::commit_failed(format!(
                "upsert of migration vertex accepted {} vertices, expected exactly 1",
                result.accepted_vertices
            )));
        }

        tracing::debug!(graph = %target, version, %direction, key = %record.key(), "Recorded migration");
        Ok(())
    }

    fn bootstrap(&self, ctx: &RunContext) -> Result<()> {
        self.client.run_gsql(ctx, METADATA_INIT_GSQL)
    }
}

impl ScriptExecutor for TigerGraphGateway {
    fn execute(&self, ctx: &RunContext, _target: &str, script: &str) -> Result<()> {
        self.client.run_gsql(ctx, script)
    }
}
