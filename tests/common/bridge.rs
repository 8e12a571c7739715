//! In-memory MCP client
//!
//! Drives a [`BridgeServer`] over a pair of in-memory pipes, the way an MCP
//! client drives it over stdio.

#![allow(dead_code)]

use std::time::Duration;

use gas_mcp_bridge::BridgeServer;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines};
use tokio::task::JoinHandle;

const RESPONSE_TIMEOUT: Duration = Duration::from_secs(10);

pub struct BridgeClient {
    writer: DuplexStream,
    lines: Lines<BufReader<DuplexStream>>,
    task: JoinHandle<anyhow::Result<()>>,
    next_id: i64,
}

impl BridgeClient {
    pub fn spawn(server: BridgeServer) -> Self {
        let (client_out, server_in) = tokio::io::duplex(64 * 1024);
        let (server_out, client_in) = tokio::io::duplex(64 * 1024);

        let task =
            tokio::spawn(async move { server.serve(BufReader::new(server_in), server_out).await });

        Self {
            writer: client_out,
            lines: BufReader::new(client_in).lines(),
            task,
            next_id: 1,
        }
    }

    pub async fn send_raw(&mut self, line: &str) {
        self.send_bytes(format!("{}\n", line).as_bytes()).await;
    }

    /// Write bytes as-is, without appending a newline.
    pub async fn send_bytes(&mut self, bytes: &[u8]) {
        self.writer
            .write_all(bytes)
            .await
            .expect("Failed to write to bridge");
        self.writer.flush().await.expect("Failed to flush bridge input");
    }

    pub async fn send(&mut self, message: Value) {
        self.send_raw(&message.to_string()).await;
    }

    /// Send a request and return its id.
    pub async fn send_request(&mut self, method: &str, params: Value) -> i64 {
        let id = self.next_id;
        self.next_id += 1;
        self.send(json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}))
            .await;
        id
    }

    pub async fn recv(&mut self) -> Value {
        let line = tokio::time::timeout(RESPONSE_TIMEOUT, self.lines.next_line())
            .await
            .expect("Timed out waiting for bridge response")
            .expect("Failed to read bridge output")
            .expect("Bridge output closed");
        serde_json::from_str(&line).expect("Bridge wrote invalid JSON")
    }

    /// Send a request and wait for its response.
    pub async fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.send_request(method, params).await;
        let response = self.recv().await;
        assert_eq!(response["id"], json!(id), "Response id mismatch");
        response
    }

    pub async fn initialize(&mut self) -> Value {
        let response = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": "2024-11-05",
                    "capabilities": {},
                    "clientInfo": {"name": "test-client", "version": "1.0.0"}
                }),
            )
            .await;
        self.send(json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .await;
        response
    }

    pub async fn call_tool(&mut self, name: &str, arguments: Value) -> Value {
        self.request("tools/call", json!({"name": name, "arguments": arguments}))
            .await
    }

    /// Parse the JSON text content of a successful tools/call response.
    pub fn tool_result(response: &Value) -> Value {
        let text = response["result"]["content"][0]["text"]
            .as_str()
            .unwrap_or_else(|| panic!("No text content in response: {}", response));
        serde_json::from_str(text).expect("Tool result is not JSON")
    }

    /// Close the input and wait for the server to finish.
    pub async fn shutdown(self) -> anyhow::Result<()> {
        drop(self.writer);
        tokio::time::timeout(RESPONSE_TIMEOUT, self.task)
            .await
            .expect("Timed out waiting for bridge shutdown")
            .expect("Bridge task panicked")
    }
}
