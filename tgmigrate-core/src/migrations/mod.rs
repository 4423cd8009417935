//! Tracking schema bootstrap - embedded GSQL
//!
//! The script is compiled into the binary at build time using include_str!.
//! It creates the `ClientMetadata` graph holding one `Migration` vertex per
//! applied step, plus the installed query that reads back the latest one.

/// Graph the migration records are stored in
pub const METADATA_GRAPH_NAME: &str = "ClientMetadata";

/// Vertex type of a migration record
pub const MIGRATION_VERTEX_TYPE: &str = "Migration";

/// Installed query returning the most recent record for a graph
pub const LATEST_MIGRATION_QUERY: &str = "get_latest_migration";

/// GSQL creating the tracking schema.
///
/// IMPORTANT: this runs exactly once per TigerGraph instance. Changing it does
/// not alter instances that are already initialised.
pub const METADATA_INIT_GSQL: &str = include_str!("metadata_init.gsql");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_script_defines_tracking_schema() {
        assert!(METADATA_INIT_GSQL.contains(&format!("CREATE GRAPH {}", METADATA_GRAPH_NAME)));
        assert!(METADATA_INIT_GSQL.contains(&format!("CREATE VERTEX {}", MIGRATION_VERTEX_TYPE)));
        assert!(METADATA_INIT_GSQL.contains(&format!("INSTALL QUERY {}", LATEST_MIGRATION_QUERY)));
    }
}
