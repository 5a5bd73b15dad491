mod common;

use std::sync::Arc;

use common::{FakeUpstream, init_test_env, test_config};
use serde_json::Value;
use yaps_mcp::{AppState, mcp::{McpHandler, serve_lines}};

fn handler() -> McpHandler {
    init_test_env();
    let upstream = Arc::new(FakeUpstream::new().with_score("alice", 12.0, 60.0));
    McpHandler::new(AppState::new(test_config(&[]), upstream, None))
}

async fn run(input: &str) -> Vec<Value> {
    run_bytes(input.as_bytes()).await
}

async fn run_bytes(input: &[u8]) -> Vec<Value> {
    let mut output = Vec::new();
    serve_lines(handler(), input, &mut output).await.unwrap();
    String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

#[tokio::test]
async fn one_response_per_request_line() {
    let input = concat!(
        r#"{"jsonrpc":"2.0","id":1,"method":"initialize","params":{}}"#,
        "\n",
        r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
        "\n\n",
        r#"{"jsonrpc":"2.0","id":"two","method":"tools/call","params":{"name":"get_yaps_score","arguments":{"username":"alice"}}}"#,
        "\n",
    );

    let responses = run(input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[0]["result"]["serverInfo"]["name"], "YAPS");
    assert_eq!(responses[1]["id"], "two");
    assert_eq!(
        responses[1]["result"]["content"][1]["text"],
        "@alice has a YAPS score of 60.0 over the last 30 days, placing them in the 50th percentile (Good)."
    );
}

#[tokio::test]
async fn bad_line_does_not_stop_the_loop() {
    let input = "garbage\n{\"jsonrpc\":\"2.0\",\"id\":7,\"method\":\"ping\"}\n";

    let responses = run(input).await;

    assert_eq!(responses.len(), 2);
    assert_eq!(responses[0]["error"]["code"], -32700);
    assert_eq!(responses[1]["id"], 7);
    assert!(responses[1]["result"].is_object());
}

#[tokio::test]
async fn resource_templates_are_listed() {
    let responses = run("{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"resources/templates/list\"}\n").await;
    assert_eq!(
        responses[0]["result"]["resourceTemplates"][0]["uriTemplate"],
        "yaps-score://{username}"
    );
}

#[tokio::test]
async fn invalid_utf8_line_is_a_parse_error() {
    let mut input = Vec::new();
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\"}\n");
    input.extend_from_slice(b"\xff\xfe garbage\n");
    input.extend_from_slice(b"{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}");

    let responses = run_bytes(&input).await;

    assert_eq!(responses.len(), 3);
    assert_eq!(responses[0]["id"], 1);
    assert_eq!(responses[1]["error"]["code"], -32700);
    assert!(responses[1]["id"].is_null());
    assert_eq!(responses[2]["id"], 2);
}

#[tokio::test]
async fn null_id_gets_a_response() {
    let responses = run("{\"jsonrpc\":\"2.0\",\"id\":null,\"method\":\"ping\"}\n").await;

    assert_eq!(responses.len(), 1);
    assert!(responses[0]["id"].is_null());
    assert!(responses[0]["result"].is_object());
}
