use hostmsg_frame::{encode_frame, Envelope, Sentinel};

use crate::cmd::{parse_payload, FrameArgs};
use crate::exit::{frame_error, CliResult, SUCCESS};
use crate::output::{print_raw, OutputFormat};

pub fn run(args: FrameArgs, format: OutputFormat) -> CliResult<i32> {
    let frame = build_frame(&args)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "frame": frame })),
        OutputFormat::Raw => print_raw(&frame),
        OutputFormat::Table | OutputFormat::Pretty => println!("{frame}"),
    }
    Ok(SUCCESS)
}

fn build_frame(args: &FrameArgs) -> CliResult<String> {
    let sentinel = args.sentinel.as_deref().map(Sentinel::from);
    let envelope = Envelope::outbound(&args.message_type, sentinel.as_ref())
        .merge(parse_payload(args.json.as_deref())?.unwrap_or_default());
    encode_frame(&envelope, &args.prefix).map_err(|err| frame_error("encode failed", err))
}

#[cfg(test)]
mod tests {
    use hostmsg_frame::{decode_frame, FRAME_PREFIX};

    use super::*;

    fn args(json: Option<&str>) -> FrameArgs {
        FrameArgs {
            message_type: "embed-size".to_string(),
            sentinel: Some("s-1".to_string()),
            json: json.map(str::to_string),
            prefix: FRAME_PREFIX.to_string(),
        }
    }

    #[test]
    fn builds_decodable_frame() {
        let frame = build_frame(&args(Some(r#"{"height":40}"#))).expect("frame should build");
        let envelope = decode_frame(&frame, FRAME_PREFIX).expect("frame should decode");
        assert_eq!(envelope.message_type(), Some("embed-size"));
        assert_eq!(envelope.sentinel(), Some(&serde_json::json!("s-1")));
        assert_eq!(envelope.get("height"), Some(&serde_json::json!(40)));
    }

    #[test]
    fn rejects_non_object_payload() {
        assert!(build_frame(&args(Some("3"))).is_err());
    }
}
