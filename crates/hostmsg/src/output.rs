use std::io::{IsTerminal, Write};
use std::time::{SystemTime, UNIX_EPOCH};

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use hostmsg_client::GatewayStats;
use serde::Serialize;
use serde_json::Value;

const SCHEMA_BASE: &str = "https://schemas.3leaps.dev/hostmsg/cli/v1";

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Raw,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MessageOutput<'a> {
    schema_id: String,
    event: &'a str,
    message_type: &'a str,
    message: &'a Value,
    timestamp: String,
}

/// Print one message object (dispatched inbound or posted outbound).
pub fn print_message(event: &str, message: &Value, format: OutputFormat) {
    let message_type = message
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("<none>");

    match format {
        OutputFormat::Json => {
            let out = MessageOutput {
                schema_id: format!("{SCHEMA_BASE}/message-{event}.schema.json"),
                event,
                message_type,
                message,
                timestamp: now_unix_seconds(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["EVENT", "TYPE", "SENTINEL", "MESSAGE"])
                .add_row(vec![
                    event.to_string(),
                    message_type.to_string(),
                    message
                        .get("sentinel")
                        .map(Value::to_string)
                        .unwrap_or_default(),
                    message.to_string(),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!("{event} type={message_type} message={message}");
        }
        OutputFormat::Raw => {
            print_raw(&format!("{message}\n"));
        }
    }
}

#[derive(Serialize)]
struct StatsOutput<'a> {
    schema_id: String,
    frames_read: usize,
    #[serde(flatten)]
    stats: &'a GatewayStats,
}

/// Print gateway counters after a replay.
pub fn print_stats(frames_read: usize, stats: &GatewayStats, format: OutputFormat) {
    match format {
        OutputFormat::Json | OutputFormat::Raw => {
            let out = StatsOutput {
                schema_id: format!("{SCHEMA_BASE}/replay-summary.schema.json"),
                frames_read,
                stats,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["COUNTER", "VALUE"]);
            for (name, value) in stats_rows(frames_read, stats) {
                table.add_row(vec![name.to_string(), value.to_string()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            let line = stats_rows(frames_read, stats)
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join(" ");
            println!("summary {line}");
        }
    }
}

fn stats_rows(frames_read: usize, stats: &GatewayStats) -> Vec<(&'static str, u64)> {
    vec![
        ("frames_read", frames_read as u64),
        ("received", stats.received),
        ("dispatched", stats.dispatched),
        ("handler_failures", stats.handler_failures),
        ("dropped_foreign_source", stats.dropped_foreign_source),
        ("dropped_not_framed", stats.dropped_not_framed),
        ("dropped_malformed", stats.dropped_malformed),
        ("dropped_sentinel_mismatch", stats.dropped_sentinel_mismatch),
        ("dropped_no_handler", stats.dropped_no_handler),
    ]
}

pub fn print_raw(data: &str) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data.as_bytes());
    let _ = out.flush();
}

fn now_unix_seconds() -> String {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs().to_string())
        .unwrap_or_else(|_| "0".to_string())
}
