//! Loading jobs fed with JSON lines

use serde::{Deserialize, Serialize};

use super::client::TigerGraphClient;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};

/// Per vertex or edge type counts in loading job statistics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingJobObjectResult {
    #[serde(default)]
    pub type_name: String,
    #[serde(default)]
    pub valid_object: i64,
    #[serde(default)]
    pub no_id_found: i64,
    #[serde(default)]
    pub invalid_attribute: i64,
    #[serde(default)]
    pub invalid_vertex_type: i64,
    #[serde(default)]
    pub invalid_primary_id: i64,
    #[serde(default)]
    pub invalid_secondary_id: i64,
    #[serde(default)]
    pub incorrect_fixed_binary_length: i64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingJobStatistics {
    #[serde(default)]
    pub valid_line: i64,
    #[serde(default)]
    pub reject_line: i64,
    #[serde(default)]
    pub failed_condition_line: i64,
    #[serde(default)]
    pub not_enough_token: i64,
    #[serde(default)]
    pub invalid_json: i64,
    #[serde(default)]
    pub oversize_token: i64,
    #[serde(default)]
    pub vertex: Vec<LoadingJobObjectResult>,
    #[serde(default)]
    pub edge: Vec<LoadingJobObjectResult>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingJobResult {
    #[serde(default)]
    pub source_file_name: String,
    #[serde(default)]
    pub statistics: LoadingJobStatistics,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadingJobResponse {
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub results: Vec<LoadingJobResult>,
}

/// Path running loading job `job` on `graph` with the request body as file `f`
pub fn loading_job_path(graph: &str, job: &str) -> String {
    format!("/ddl/{}?tag={}&filename=f", graph, job)
}

/// Serialize each item to one JSON line, joined by `\n` without a trailing newline
pub fn to_jsonl<T: Serialize>(lines: &[T]) -> Result<Vec<u8>> {
    let mut body = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if i > 0 {
            body.push(b'\n');
        }
        serde_json::to_writer(&mut body, line)?;
    }
    Ok(body)
}

impl TigerGraphClient {
    /// Run a loading job over `lines`, one JSON document per line.
    ///
    /// Fails unless TigerGraph reports every line as valid. Lines it did
    /// accept before a failure stay loaded.
    pub fn run_loading_job_jsonl<T: Serialize>(
        &self,
        ctx: &RunContext,
        graph: &str,
        job: &str,
        lines: &[T],
    ) -> Result<LoadingJobStatistics> {
        let body = to_jsonl(lines)?;
        let response: LoadingJobResponse =
            self.post_raw(ctx, &loading_job_path(graph, job), graph, body)?;

        if response.results.len() != 1 {
            return Err(Error::transport(format!(
                "Loading job response does not contain exactly one result, got {}",
                response.results.len()
            )));
        }

        let statistics = response
            .results
            .into_iter()
            .next()
            .map(|result| result.statistics)
            .unwrap_or_default();

        if statistics.valid_line != lines.len() as i64 {
            return Err(Error::transport(format!(
                "Not all lines were loaded: TigerGraph reported {} valid lines, expected {}",
                statistics.valid_line,
                lines.len()
            )));
        }

        tracing::debug!(graph, job, lines = lines.len(), "Loading job finished");
        Ok(statistics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_jsonl_has_no_trailing_newline() {
        let body = to_jsonl(&[json!({"guid": "1234"}), json!({"guid": "222"})]).unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "{\"guid\":\"1234\"}\n{\"guid\":\"222\"}"
        );
    }

    #[test]
    fn test_empty_jsonl() {
        let lines: Vec<serde_json::Value> = Vec::new();
        assert!(to_jsonl(&lines).unwrap().is_empty());
    }

    #[test]
    fn test_loading_job_path() {
        assert_eq!(
            loading_job_path("MyGraph", "load_people"),
            "/ddl/MyGraph?tag=load_people&filename=f"
        );
    }
}
