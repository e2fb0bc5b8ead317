use clap::ValueEnum;
use hostmsg_client::DIAGNOSTICS_TARGET;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, Layer};

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Off => LevelFilter::OFF,
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

/// Per-target filter for the stderr subscriber.
///
/// Handler-failure diagnostics (the default sink's target) stay visible at
/// every `level`, including `off`, unless `quiet_handlers` is set.
pub fn log_filter(level: LogLevel, quiet_handlers: bool) -> Targets {
    let diagnostics = if quiet_handlers {
        LevelFilter::OFF
    } else {
        level.as_filter().max(LevelFilter::ERROR)
    };
    Targets::new()
        .with_default(level.as_filter())
        .with_target(DIAGNOSTICS_TARGET, diagnostics)
}

/// Install the stderr subscriber.
pub fn init_logging(format: LogFormat, level: LogLevel, quiet_handlers: bool) {
    let filter = log_filter(level, quiet_handlers);
    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    match format {
        LogFormat::Text => {
            let _ = tracing_subscriber::registry()
                .with(layer.with_filter(filter))
                .try_init();
        }
        LogFormat::Json => {
            let _ = tracing_subscriber::registry()
                .with(layer.json().with_filter(filter))
                .try_init();
        }
    }
}
