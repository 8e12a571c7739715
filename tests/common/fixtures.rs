//! Project tree fixtures

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use gas_mcp_bridge::remote::EndpointConfigFile;

/// Annotated source declaring `sheet.append`, routed to `appendRow`.
pub const SHEET_APPEND_SOURCE: &str = r#"
/**
 * @mcp
 * name: sheet.append
 * description: Append a row to the active sheet
 * path: appendRow
 * schema:
 *   type: object
 *   properties:
 *     values:
 *       type: array
 *       items:
 *         type: string
 *   required: [values]
 */
function appendRow(args) {
  SpreadsheetApp.getActiveSheet().appendRow(args.values);
}
"#;

/// Annotated source declaring `mail.send` without an explicit path.
pub const MAIL_SEND_SOURCE: &str = r#"
/* @mcp
name: mail.send
description: Send an email
schema:
  type: object
  properties:
    to: { type: string }
    body: { type: string }
*/
function sendMail(args) {}
"#;

/// Write `content` at `relative` under `root`, creating parent directories.
pub fn write_source(root: &Path, relative: &str, content: &str) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create fixture directory");
    }
    fs::write(&path, content).expect("Failed to write fixture file");
    path
}

/// Annotated source declaring a tool named `name` with a description.
pub fn tool_source(name: &str, description: &str) -> String {
    format!(
        "/**\n * @mcp\n * name: {}\n * description: {}\n * schema:\n *   type: object\n */\nfunction f() {{}}\n",
        name, description
    )
}

/// Write an endpoint configuration file pointing at `url`.
pub async fn write_endpoint_config(root: &Path, url: &str, token: Option<&str>) -> PathBuf {
    let path = root.join(".mcp-gas.json");
    EndpointConfigFile {
        script_id: Some("test-script".to_string()),
        deployment_id: Some("test-deployment".to_string()),
        gas_url: url.to_string(),
        api_token: token.map(str::to_string),
    }
    .save(&path)
    .await
    .expect("Failed to write endpoint config");
    path
}
