use clap::{Args, Subcommand};
use serde_json::{Map, Value};
use std::path::PathBuf;

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod frame;
pub mod replay;
pub mod send;
pub mod version;

/// Origin given to the simulated host context.
pub const HOST_ORIGIN: &str = "https://host.invalid";
/// Origin given to the simulated embedded context.
pub const FRAME_ORIGIN: &str = "https://frame.invalid";

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode an inbound wire frame.
    Frame(FrameArgs),
    /// Show the envelope a client posts to its host.
    Send(SendArgs),
    /// Feed wire frames through a client and print what gets dispatched.
    Replay(ReplayArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Frame(args) => frame::run(args, format),
        Command::Send(args) => send::run(args, format),
        Command::Replay(args) => replay::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct FrameArgs {
    /// Message type.
    #[arg(long = "type", short = 't')]
    pub message_type: String,
    /// Session sentinel.
    #[arg(long, env = "HOSTMSG_SENTINEL")]
    pub sentinel: Option<String>,
    /// JSON object merged into the envelope.
    #[arg(long)]
    pub json: Option<String>,
    /// Frame prefix.
    #[arg(long, default_value = hostmsg_frame::FRAME_PREFIX)]
    pub prefix: String,
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// Message type.
    #[arg(long = "type", short = 't')]
    pub message_type: String,
    /// Session sentinel. Omitted from the envelope when unset.
    #[arg(long, env = "HOSTMSG_SENTINEL")]
    pub sentinel: Option<String>,
    /// JSON object merged into the envelope.
    #[arg(long)]
    pub json: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Session sentinel the client expects.
    #[arg(long, env = "HOSTMSG_SENTINEL")]
    pub sentinel: Option<String>,
    /// Message types to register a printing handler for (comma-separated).
    #[arg(long, short = 'r', value_delimiter = ',')]
    pub register: Vec<String>,
    /// Message types to register a failing handler for (comma-separated).
    #[arg(long, value_delimiter = ',')]
    pub fail: Vec<String>,
    /// Read frames from file (one per line). Default: stdin.
    #[arg(long)]
    pub file: Option<PathBuf>,
    /// Frame prefix.
    #[arg(long, default_value = hostmsg_frame::FRAME_PREFIX)]
    pub prefix: String,
    /// Require the sentinel to match in type as well as value.
    #[arg(long)]
    pub strict_sentinel: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse a `--json` payload; it must be a JSON object.
pub fn parse_payload(json: Option<&str>) -> CliResult<Option<Map<String, Value>>> {
    let Some(json) = json else {
        return Ok(None);
    };
    match serde_json::from_str::<Value>(json) {
        Ok(Value::Object(map)) => Ok(Some(map)),
        Ok(_) => Err(CliError::new(USAGE, "--json must be a JSON object")),
        Err(err) => Err(CliError::new(USAGE, format!("--json is not valid JSON: {err}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_payload_accepts_objects_only() {
        assert!(parse_payload(None).expect("none is fine").is_none());
        let map = parse_payload(Some(r#"{"a":1}"#))
            .expect("object should parse")
            .expect("object should be present");
        assert_eq!(map.get("a"), Some(&Value::from(1)));

        assert_eq!(parse_payload(Some("[1]")).expect_err("array").code, USAGE);
        assert_eq!(parse_payload(Some("{")).expect_err("bad json").code, USAGE);
    }
}
