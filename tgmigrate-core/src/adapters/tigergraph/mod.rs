//! TigerGraph adapter
//!
//! A blocking HTTP client for the REST++ and GSQL servers, and the gateway
//! implementing the migration ports on top of it.

mod auth;
mod client;
mod gateway;
mod gsql;
mod loading_job;
mod metadata;
mod records;

pub use auth::{RequestTokenResponse, RequestTokenResults, Token, TokenCache, REQUEST_TOKEN_PATH};
pub use client::{TigerGraphClient, TigerGraphSettings, DEFAULT_TIMEOUT, PING_PATH};
pub use gateway::{TigerGraphGateway, NOT_INITIALIZED_PREFIX};
pub use gsql::{check_gsql_response, GSQL_FILE_PATH, SEMANTIC_FAILURE_MARKER, SUCCESS_MARKER};
pub use loading_job::{
    loading_job_path, to_jsonl, LoadingJobObjectResult, LoadingJobResponse, LoadingJobResult,
    LoadingJobStatistics,
};
pub use metadata::{
    Attribute, AttributeType, EdgeType, GraphMetadata, GraphMetadataResponse, VertexType,
    GRAPH_METADATA_PATH,
};
pub use records::{
    latest_migration_path, migration_upsert_path, AttributeValue, LatestMigrationResponse,
    LatestMigrationResult, MigrationUpsertPayload, MigrationVertex, MigrationVertexAttributes,
    MigrationVertexPayload, MigrationVertices, UpsertResponse, UpsertResult, DATETIME_FORMAT,
    UPSERT_PATH,
};
