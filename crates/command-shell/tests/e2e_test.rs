//! End-to-end tests driving the shell with text lines.

mod common;

use command_engine::Value;
use command_shell::{shell, OutputFormat, Reply};
use common::{identity, message, test_adapter};
use tokio::io::BufReader;

fn reply_text(line: &str) -> String {
    match test_adapter().handle(&message(line)) {
        Some(Reply::Value(value)) => value.to_string(),
        Some(Reply::Text(text)) => text,
        Some(Reply::Error(error)) => format!("Error: {}", error),
        None => String::new(),
    }
}

#[test]
fn test_number_commands() {
    assert_eq!(reply_text("!contains 1 [2 3 4 1]"), "true");
    assert_eq!(reply_text("!contains 2"), "false");
    assert!(reply_text("!contains 2 agf").starts_with("Error:"));
    assert_eq!(reply_text("!sum [1 5 3 4]"), "13");
    assert_eq!(reply_text("!total []"), "0");
    assert_eq!(reply_text("!implicit 2 3 2 1 4 Heyo"), "2 - [3, 2, 1, 4] - Heyo");
    assert!(reply_text("!implicit 2 Hi").starts_with("Error:"));
    assert_eq!(reply_text("!unique 3 1 3 2"), "[3, 1, 2]");
    assert_eq!(reply_text("!reduce product 2 3 4"), "24");
    assert_eq!(reply_text("!reduce MAX [7 2]"), "7");
    assert!(reply_text("!reduce median 1 2").starts_with("Error:"));
    assert_eq!(reply_text("!range 1 to 5"), "[1, 2, 3, 4, 5]");
    assert_eq!(reply_text("!range 1 TO 9 by 4"), "[1, 5, 9]");
    assert_eq!(reply_text("!parity 4"), "true");
    assert_eq!(reply_text("!parity 4 no"), "false");
}

#[test]
fn test_vector_commands() {
    assert_eq!(
        reply_text("!vadd Vector3(1 2 3) Vector3(1 1)"),
        "Vector3(x: 2, y: 3, z: 3)"
    );
    assert_eq!(reply_text("!len Vector3(3 4)"), "5");
    assert_eq!(reply_text("!dot Vector3(1 0 0) Vector3.UP"), "0");
    assert_eq!(
        reply_text("!cross Vector3(1 0 0) Vector3(0 1 0)"),
        "Vector3(x: 0, y: 0, z: 1)"
    );
    assert_eq!(
        reply_text("!scale Vector3.unit(0 0 9) by 2"),
        "Vector3(x: 0, y: 0, z: 2)"
    );
    assert_eq!(reply_text("!length Vector3.ZERO"), "0");
    assert!(reply_text("!length #Vector3(3 1)").contains("Expected the alias Vector3 but got #Vector3"));
    assert!(reply_text("!length (3 1 2)").starts_with("Error:"));
    assert!(reply_text("!length Vector3.unit(0 0 0)").starts_with("Error:"));
}

#[test]
fn test_shape_commands() {
    assert_eq!(reply_text("!area Rect(2 3) Square(2)"), "10");
    assert_eq!(reply_text("!perimeter Square(1) Square(2)"), "12");
    assert_eq!(
        reply_text("!describe Square(3)"),
        "Square(area: 9, perimeter: 12)"
    );
    assert!(reply_text("!area Square(-1)").starts_with("Error:"));
    assert!(reply_text("!area Hexagon(1)").starts_with("Error:"));
}

#[test]
fn test_text_commands() {
    assert_eq!(reply_text("!echo hello world"), "hello world");
    assert_eq!(reply_text("!repeat \"two words\" 2"), "two words two words");
    assert_eq!(reply_text("!repeat hey"), "hey hey");
    assert_eq!(reply_text("!greet"), "Hello, ada!");
    assert_eq!(reply_text("!HI grace"), "Hello, grace!");
    assert_eq!(reply_text("!whoami"), "ada in lab");
    assert_eq!(reply_text("!grade b"), "B: good");
    assert!(reply_text("!grade bb").starts_with("Error:"));
    assert!(reply_text("!whoami please").starts_with("Error:"));
}

#[test]
fn test_event_source() {
    let Some(Reply::Value(Value::Record(event))) = test_adapter().handle(&message("!event")) else {
        panic!("expected an event record");
    };
    assert_eq!(event.type_name(), "Event");
    assert_eq!(event.get("user"), Some(&Value::str("ada")));
    assert_eq!(event.get("channel"), Some(&Value::str("lab")));
    assert!(event.get("timestamp").and_then(Value::as_str).is_some());
}

#[test]
fn test_help_lists_commands() {
    let help = reply_text("!help");
    assert!(help.starts_with("Commands:"));
    assert!(help.contains("!contains <Integer> [Integer[]] - Whether a number appears in an array"));
    assert!(help.contains("!range <Integer> <to> <Integer> [by] [Integer] - Numbers from start to end"));
    assert!(help.contains("!whoami - Show the user and channel"));

    let help = reply_text("!help len");
    assert!(help.starts_with("!length <Vector3> - Length of a vector"));
    assert!(reply_text("!help nothing").starts_with("Error:"));
}

#[test]
fn test_unknown_and_ignored_lines() {
    assert!(reply_text("!frobnicate").starts_with("Error: Unknown command 'frobnicate'"));
    assert_eq!(reply_text("just chatting"), "");
}

#[tokio::test]
async fn test_run_loop_text_output() {
    let input = tokio_test::io::Builder::new()
        .read(b"!sum [1 2]\nnot a command\n")
        .read(b"!echo done\n")
        .build();
    let mut output = Vec::new();

    let handled = shell::run(
        &test_adapter(),
        &identity(),
        OutputFormat::Text,
        BufReader::new(input),
        &mut output,
    )
    .await
    .unwrap();

    assert_eq!(handled, 2);
    assert_eq!(String::from_utf8(output).unwrap(), "3\ndone\n");
}

#[tokio::test]
async fn test_run_loop_json_output() {
    let input = tokio_test::io::Builder::new()
        .read(b"!describe Square(2)\n!nope\n")
        .build();
    let mut output = Vec::new();

    shell::run(
        &test_adapter(),
        &identity(),
        OutputFormat::Json,
        BufReader::new(input),
        &mut output,
    )
    .await
    .unwrap();

    let lines: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(
        lines[0],
        serde_json::json!({
            "ok": true,
            "value": { "type": "Square", "area": 4.0, "perimeter": 8.0 }
        })
    );
    assert_eq!(lines[1]["ok"], serde_json::json!(false));
}
