#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

fn hostmsg(args: &[&str], stdin: Option<&str>) -> Output {
    let mut command = Command::new(env!("CARGO_BIN_EXE_hostmsg"));
    if !args.contains(&"--log-level") {
        command.args(["--log-level", "error"]);
    }
    let mut child = command
        .args(args)
        .env_remove("HOSTMSG_SENTINEL")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("hostmsg should start");

    {
        let mut pipe = child.stdin.take().expect("stdin should be piped");
        if let Some(input) = stdin {
            pipe.write_all(input.as_bytes())
                .expect("stdin should accept input");
        }
    }

    child.wait_with_output().expect("hostmsg should finish")
}

fn json_lines(output: &Output) -> Vec<serde_json::Value> {
    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(|line| serde_json::from_str(line).expect("stdout line should be JSON"))
        .collect()
}

fn unique_temp_file(tag: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "hostmsg-{tag}-{}-{}.frames",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .expect("time should be after epoch")
            .as_nanos()
    ))
}

#[test]
fn frame_outputs_prefixed_json() {
    let output = hostmsg(
        &[
            "--format", "json", "frame", "--type", "embed-size", "--sentinel", "s1", "--json",
            r#"{"height":40}"#,
        ],
        None,
    );

    assert!(output.status.success());
    let lines = json_lines(&output);
    let frame = lines[0]["frame"].as_str().expect("frame should be a string");
    let body = frame.strip_prefix("amp-").expect("frame should carry the prefix");
    let parsed: serde_json::Value = serde_json::from_str(body).expect("body should be JSON");
    assert_eq!(
        parsed,
        serde_json::json!({"type": "embed-size", "sentinel": "s1", "height": 40})
    );
}

#[test]
fn frame_rejects_non_object_payload_with_usage_code() {
    let output = hostmsg(&["frame", "--type", "t", "--json", "[1,2]"], None);
    assert_eq!(output.status.code(), Some(64));
    assert!(String::from_utf8_lossy(&output.stderr).contains("JSON object"));
}

#[test]
fn send_shows_envelope_received_by_host() {
    let output = hostmsg(
        &["--format", "json", "send", "--type", "get-config", "--sentinel", "s1"],
        None,
    );

    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0]["event"], "sent");
    assert_eq!(
        lines[0]["message"],
        serde_json::json!({"type": "get-config", "sentinel": "s1"})
    );
    assert!(lines[0]["schema_id"]
        .as_str()
        .is_some_and(|id| id.ends_with("message-sent.schema.json")));
}

#[test]
fn replay_from_stdin_dispatches_and_summarizes() {
    let frames = concat!(
        "# session frames\n",
        "amp-{\"type\":\"embed-size\",\"sentinel\":\"s1\",\"height\":12}\n",
        "amp-{\"type\":\"embed-size\",\"sentinel\":\"stale\"}\n",
        "{\"type\":\"embed-size\",\"sentinel\":\"s1\"}\n",
        "amp-{\"type\":\"theme\",\"sentinel\":\"s1\"}\n",
    );
    let output = hostmsg(
        &[
            "--format", "json", "replay", "--sentinel", "s1", "--register", "embed-size",
        ],
        Some(frames),
    );

    assert!(output.status.success());
    let lines = json_lines(&output);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["event"], "dispatched");
    assert_eq!(lines[0]["message"]["height"], 12);

    let summary = &lines[1];
    assert_eq!(summary["frames_read"], 4);
    assert_eq!(summary["dispatched"], 1);
    assert_eq!(summary["dropped_sentinel_mismatch"], 1);
    assert_eq!(summary["dropped_not_framed"], 1);
    assert_eq!(summary["dropped_no_handler"], 1);
}

#[test]
fn replay_reports_failing_handler_on_stderr_and_continues() {
    let path = unique_temp_file("fail");
    std::fs::write(
        &path,
        "amp-{\"type\":\"bad\",\"sentinel\":7}\namp-{\"type\":\"ok\",\"sentinel\":\"7\"}\n",
    )
    .expect("frames file should be writable");

    let output = hostmsg(
        &[
            "--format",
            "json",
            "replay",
            "--sentinel",
            "7",
            "--register",
            "ok",
            "--fail",
            "bad",
            "--file",
            path.to_str().expect("temp path should be UTF-8"),
        ],
        None,
    );
    let _ = std::fs::remove_file(&path);

    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error in registered callback bad"));
    assert!(stderr.contains("IFRAME-MSG"));

    let lines = json_lines(&output);
    assert_eq!(lines.last().expect("summary line")["handler_failures"], 1);
    assert_eq!(lines.last().expect("summary line")["dispatched"], 1);
}

#[test]
fn handler_failures_follow_quiet_handlers_not_log_level() {
    let frames = "amp-{\"type\":\"bad\",\"sentinel\":\"s\"}\n";
    let replay = ["--format", "json", "replay", "--sentinel", "s", "--fail", "bad"];

    let mut args = vec!["--log-level", "off"];
    args.extend(replay);
    let output = hostmsg(&args, Some(frames));
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("error in registered callback bad"));

    let mut args = vec!["--quiet-handlers"];
    args.extend(replay);
    let output = hostmsg(&args, Some(frames));
    assert!(output.status.success());
    assert!(!String::from_utf8_lossy(&output.stderr).contains("registered callback"));
    let lines = json_lines(&output);
    assert_eq!(lines.last().expect("summary line")["handler_failures"], 1);
}

#[test]
fn replay_missing_file_fails() {
    let path = unique_temp_file("missing");
    let output = hostmsg(
        &[
            "replay",
            "--sentinel",
            "s",
            "--file",
            path.to_str().expect("temp path should be UTF-8"),
        ],
        None,
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn version_extended_lists_frame_prefix() {
    let output = hostmsg(&["version", "--extended"], None);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("frame_prefix: amp-"));
}
