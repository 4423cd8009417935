//! Migration vertices: upserting new records and reading the latest one

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::client::TigerGraphClient;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};
use crate::domain::MigrationRecord;
use crate::migrations::{LATEST_MIGRATION_QUERY, METADATA_GRAPH_NAME};

/// Upsert endpoint prefix, followed by `/<graph>`
pub const UPSERT_PATH: &str = "/graph";

/// DATETIME format TigerGraph accepts on upsert
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Path of the installed query reading the latest migration record
pub fn latest_migration_path() -> String {
    format!("/query/{}", LATEST_MIGRATION_QUERY)
}

/// Path receiving migration vertex upserts
pub fn migration_upsert_path() -> String {
    format!("{}/{}", UPSERT_PATH, METADATA_GRAPH_NAME)
}

// =============================================================================
// Upsert
// =============================================================================

/// An attribute in an upsert payload: `{"value": ...}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue<T> {
    pub value: T,
}

impl<T> AttributeValue<T> {
    pub fn new(value: T) -> Self {
        Self { value }
    }
}

/// A migration vertex in the upsert payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationVertexPayload {
    pub graph_name: AttributeValue<String>,
    pub migration_number: AttributeValue<String>,
    pub mode: AttributeValue<String>,
    pub created_at: AttributeValue<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationVertices {
    #[serde(rename = "Migration")]
    pub migration: HashMap<String, MigrationVertexPayload>,
}

/// The whole payload sent to the upsert endpoint for a migration record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationUpsertPayload {
    pub vertices: MigrationVertices,
}

impl From<&MigrationRecord> for MigrationUpsertPayload {
    fn from(record: &MigrationRecord) -> Self {
        let vertex = MigrationVertexPayload {
            graph_name: AttributeValue::new(record.target.clone()),
            migration_number: AttributeValue::new(record.version.clone()),
            mode: AttributeValue::new(record.direction.to_string()),
            created_at: AttributeValue::new(record.created_at.format(DATETIME_FORMAT).to_string()),
        };

        let mut migration = HashMap::new();
        migration.insert(record.key(), vertex);

        Self {
            vertices: MigrationVertices { migration },
        }
    }
}

/// Counts reported by the upsert endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertResult {
    #[serde(default)]
    pub accepted_vertices: i64,
    #[serde(default)]
    pub accepted_edges: i64,
    #[serde(default)]
    pub skipped_vertices: i64,
    #[serde(default)]
    pub skipped_edges: i64,
    #[serde(default)]
    pub vertices_already_exist: Option<JsonValue>,
    #[serde(default)]
    pub miss_vertices: Option<JsonValue>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<UpsertResult>,
}

// =============================================================================
// Latest migration query
// =============================================================================

/// Attributes of a stored migration vertex
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationVertexAttributes {
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub migration_number: String,
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub graph_name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MigrationVertex {
    #[serde(default)]
    pub attributes: MigrationVertexAttributes,
    #[serde(default)]
    pub v_id: String,
    #[serde(default)]
    pub v_type: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestMigrationResult {
    #[serde(default)]
    pub latest_migration: Vec<MigrationVertex>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LatestMigrationResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<LatestMigrationResult>,
}

#[derive(Debug, Serialize)]
struct LatestMigrationRequest<'a> {
    graph_name: &'a str,
}

impl TigerGraphClient {
    /// Upsert data into `graph`, returning the reported counts
    ///
    /// https://docs.tigergraph.com/tigergraph-server/current/api/upsert-rest
    pub fn upsert<B: Serialize>(&self, ctx: &RunContext, graph: &str, data: &B) -> Result<UpsertResult> {
        let path = format!("{}/{}", UPSERT_PATH, graph);
        let response: UpsertResponse = self.post(ctx, &path, graph, data)?;

        if response.error {
            return Err(Error::transport(format!(
                "TigerGraph returned an error when trying to upsert data. Message: {}",
                response.message
            )));
        }

        response
            .results
            .into_iter()
            .next()
            .ok_or_else(|| Error::transport("TigerGraph upsert response contained no results"))
    }

    /// The most recent migration vertex recorded for `target`, if any
    pub fn latest_migration(
        &self,
        ctx: &RunContext,
        target: &str,
    ) -> Result<Option<MigrationVertexAttributes>> {
        let response: LatestMigrationResponse = self.post(
            ctx,
            &latest_migration_path(),
            METADATA_GRAPH_NAME,
            &LatestMigrationRequest { graph_name: target },
        )?;

        if response.error {
            return Err(Error::transport(format!(
                "TigerGraph returned an error reading the latest migration. Message: {}",
                response.message
            )));
        }

        let result = response.results.into_iter().next().ok_or_else(|| {
            Error::transport("TigerGraph latest migration response contained no results")
        })?;

        Ok(result
            .latest_migration
            .into_iter()
            .next()
            .map(|vertex| vertex.attributes))
    }
}
