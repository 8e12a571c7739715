//! Echo Tool
//!
//! Local fallback tool published when a project declares no tools. Answers
//! with a diagnostic payload explaining how to annotate functions.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mcp::protocol::{McpError, ToolsCallResult};

const NOTE: &str = "This is the built-in echo tool. It is published when no @mcp annotations \
were found in the project or the tools file could not be loaded. Annotate your functions and \
run the build command to publish them.";

const TEMPLATE: &str = "/**
 * @mcp
 * name: <tool name>
 * description: <what the tool does>
 * path: <remote function name>
 * schema:
 *   type: object
 *   properties:
 *     <field>:
 *       type: string
 *   required: [<field>]
 */";

const EXAMPLE: &str = "/**
 * @mcp
 * name: sheet.appendRow
 * description: Append a row to the active spreadsheet
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
}";

#[derive(Debug, Deserialize)]
struct EchoParams {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct EchoResult<'a> {
    test_tool: bool,
    note: &'a str,
    input_received: InputReceived<'a>,
    how_to_annotate: HowToAnnotate<'a>,
}

#[derive(Debug, Serialize)]
struct InputReceived<'a> {
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct HowToAnnotate<'a> {
    template: &'a str,
    example: &'a str,
}

pub fn call(arguments: Value) -> Result<ToolsCallResult, McpError> {
    let params: EchoParams = serde_json::from_value(arguments)
        .map_err(|e| McpError::InvalidParams(format!("echo expects a string message: {}", e)))?;

    let result = EchoResult {
        test_tool: true,
        note: NOTE,
        input_received: InputReceived {
            message: &params.message,
        },
        how_to_annotate: HowToAnnotate {
            template: TEMPLATE,
            example: EXAMPLE,
        },
    };

    ToolsCallResult::json(&result).map_err(|e| McpError::InternalError(e.to_string()))
}
