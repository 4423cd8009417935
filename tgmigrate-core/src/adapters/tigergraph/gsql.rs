//! Running arbitrary GSQL on the GSQL server

use reqwest::Method;

use super::client::TigerGraphClient;
use crate::context::RunContext;
use crate::domain::result::{Error, Result};

/// Path accepting a GSQL file body
pub const GSQL_FILE_PATH: &str = "/gsqlserver/gsql/file";

/// Second-to-last response line when the GSQL ran without error
pub const SUCCESS_MARKER: &str = "__GSQL__RETURN__CODE__,0";

/// Appears anywhere in the response when a semantic check failed
pub const SEMANTIC_FAILURE_MARKER: &str = "Semantic Check Fails:";

impl TigerGraphClient {
    /// Execute GSQL on the remote instance.
    ///
    /// An error does not mean none of the GSQL ran; statements before the
    /// failing one may have been applied. The full response is included in
    /// the error for inspection.
    pub fn run_gsql(&self, ctx: &RunContext, body: &str) -> Result<()> {
        let escaped: String = url::form_urlencoded::byte_serialize(body.as_bytes()).collect();

        let request = self
            .gsql_request(Method::POST, GSQL_FILE_PATH)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(escaped);

        let response = self.send(ctx, request)?;
        self.check_response_status(&response)?;

        let text = response
            .text()
            .map_err(|e| Error::transport(format!("Failed to read GSQL response: {}", e)))?;

        tracing::debug!(response = %text, "GSQL response");
        check_gsql_response(&text)
    }
}

/// Decide whether a GSQL server response reports success
pub fn check_gsql_response(response: &str) -> Result<()> {
    let lines: Vec<&str> = response.split('\n').collect();
    if lines.len() < 2 {
        return Err(Error::script_failed(format!(
            "not enough returned lines in GSQL response. full response: {}",
            response
        )));
    }

    if response.contains(SEMANTIC_FAILURE_MARKER) {
        return Err(Error::script_failed(format!(
            "a semantic failure was found in the response. full response: {}",
            response
        )));
    }

    let code_line = lines[lines.len() - 2];
    if code_line != SUCCESS_MARKER {
        return Err(Error::script_failed(format!(
            "GSQL response did not contain expected success code. response code was: {}\nfull response: {}",
            code_line, response
        )));
    }

    Ok(())
}
