use std::fs::File;
use std::io::{BufRead, BufReader};
use std::rc::Rc;

use hostmsg_client::{ClientConfig, GatewayStats, MessagingClient};
use hostmsg_frame::{Envelope, SentinelMatch};
use hostmsg_transport::{MessageBus, TargetOrigin, Window};
use serde_json::Value;

use crate::cmd::{ReplayArgs, FRAME_ORIGIN, HOST_ORIGIN};
use crate::exit::{io_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_message, print_stats, OutputFormat};

type DispatchSink = Rc<dyn Fn(&Value)>;

pub fn run(args: ReplayArgs, format: OutputFormat) -> CliResult<i32> {
    let reader: Box<dyn BufRead> = match &args.file {
        Some(path) => Box::new(BufReader::new(
            File::open(path).map_err(|err| io_error("open frames file", err))?,
        )),
        None => Box::new(BufReader::new(std::io::stdin())),
    };

    let mut lines = Vec::new();
    for line in reader.lines() {
        lines.push(line.map_err(|err| io_error("read frames", err))?);
    }

    let on_dispatch: DispatchSink =
        Rc::new(move |message: &Value| print_message("dispatched", message, format));
    let (frames_read, stats) = replay_lines(&args, lines, on_dispatch)?;
    print_stats(frames_read, &stats, format);
    Ok(SUCCESS)
}

/// Host-side view of a replay: posts each frame to an embedded client.
fn replay_lines(
    args: &ReplayArgs,
    lines: impl IntoIterator<Item = String>,
    on_dispatch: DispatchSink,
) -> CliResult<(usize, GatewayStats)> {
    let bus = MessageBus::new();
    let host = bus.open_top(HOST_ORIGIN);
    let frame = bus.open_child(host.id(), FRAME_ORIGIN);

    let config = ClientConfig {
        prefix: args.prefix.clone(),
        sentinel_match: if args.strict_sentinel {
            SentinelMatch::Strict
        } else {
            SentinelMatch::Loose
        },
        ..ClientConfig::default()
    };
    let client = MessagingClient::with_config(frame, config);
    if let Some(sentinel) = args.sentinel.as_deref() {
        client.set_sentinel(sentinel);
    }

    for message_type in &args.register {
        let sink = on_dispatch.clone();
        client.register_callback(message_type, move |envelope: &Envelope| {
            sink(&envelope.clone().into_value());
        });
    }
    for message_type in &args.fail {
        let rejected = message_type.clone();
        client.register_callback(message_type, move |_: &Envelope| -> Result<(), String> {
            Err(format!("{rejected} handler rejected the message"))
        });
    }

    let mut frames_read = 0;
    for line in lines {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        frames_read += 1;
        host.post_message(
            client.window().id(),
            Value::String(line.to_string()),
            &TargetOrigin::Any,
        )
        .map_err(|err| CliError::new(INTERNAL, format!("post frame: {err}")))?;
        bus.pump();
    }

    let stats = client.stats();
    tracing::debug!(
        frames_read,
        dispatched = stats.dispatched,
        dropped = stats.dropped(),
        "replay finished"
    );
    Ok((frames_read, stats))
}
