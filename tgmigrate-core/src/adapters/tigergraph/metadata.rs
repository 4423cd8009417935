//! Graph schema metadata from the GSQL server

use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use super::client::TigerGraphClient;
use crate::context::RunContext;
use crate::domain::result::Result;

/// Path returning schema metadata for `?graph=<name>`
pub const GRAPH_METADATA_PATH: &str = "/gsqlserver/gsql/schema";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttributeType {
    #[serde(rename = "Name", default)]
    pub name: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Attribute {
    #[serde(rename = "AttributeName", default)]
    pub attribute_name: String,
    #[serde(rename = "AttributeType", default)]
    pub attribute_type: AttributeType,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VertexType {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<Attribute>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EdgeType {
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "FromVertexTypeName", default)]
    pub from_vertex_type_name: String,
    #[serde(rename = "ToVertexTypeName", default)]
    pub to_vertex_type_name: String,
    #[serde(rename = "IsDirected", default)]
    pub is_directed: bool,
    #[serde(rename = "Attributes", default)]
    pub attributes: Vec<Attribute>,
}

/// Schema of one graph
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetadata {
    #[serde(rename = "GraphName", default)]
    pub graph_name: String,
    #[serde(rename = "VertexTypes", default)]
    pub vertex_types: Vec<VertexType>,
    #[serde(rename = "EdgeTypes", default)]
    pub edge_types: Vec<EdgeType>,
}

/// Metadata response. `error` and `message` are returned as-is because
/// callers care about the exact failure message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphMetadataResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub results: Option<GraphMetadata>,
}

#[derive(Debug, Deserialize)]
struct RawGraphMetadataResponse {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error: bool,
    #[serde(default)]
    results: JsonValue,
}

impl TigerGraphClient {
    /// Fetch the schema metadata of `graph`
    pub fn graph_metadata(&self, ctx: &RunContext, graph: &str) -> Result<GraphMetadataResponse> {
        let request = self
            .gsql_request(Method::GET, GRAPH_METADATA_PATH)
            .query(&[("graph", graph)]);

        let raw: RawGraphMetadataResponse = self.request_into(ctx, request)?;

        // On error TigerGraph sends an empty string for "results"
        let results = serde_json::from_value::<GraphMetadata>(raw.results).ok();

        Ok(GraphMetadataResponse {
            message: raw.message,
            error: raw.error,
            results,
        })
    }
}
