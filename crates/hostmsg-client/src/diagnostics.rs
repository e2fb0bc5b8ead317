use std::cell::RefCell;

use crate::error::HandlerError;

/// Receives reports about isolated handler failures.
///
/// Only the gateway's handler-failure path reports here; dropped frames never do.
pub trait DiagnosticsSink {
    fn report(&self, tag: &str, message: &str, error: &HandlerError);
}

/// `tracing` target of the events [`TracingSink`] emits.
pub const DIAGNOSTICS_TARGET: &str = "hostmsg::diagnostics";

/// Default sink: emits an `error` event on [`DIAGNOSTICS_TARGET`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn report(&self, tag: &str, message: &str, error: &HandlerError) {
        tracing::error!(target: DIAGNOSTICS_TARGET, tag, error = %error, "{message}");
    }
}

/// One captured report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticReport {
    pub tag: String,
    pub message: String,
    pub error: String,
}

/// Sink that keeps every report in memory.
#[derive(Debug, Default)]
pub struct RecordingSink {
    reports: RefCell<Vec<DiagnosticReport>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the reports received so far.
    pub fn reports(&self) -> Vec<DiagnosticReport> {
        self.reports.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.reports.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.borrow().is_empty()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn report(&self, tag: &str, message: &str, error: &HandlerError) {
        self.reports.borrow_mut().push(DiagnosticReport {
            tag: tag.to_string(),
            message: message.to_string(),
            error: error.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            let bytes = self.0.lock().expect("log buffer should not be poisoned");
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    impl io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("log buffer should not be poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = Self;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    #[test]
    fn tracing_sink_emits_error_event_with_tag() {
        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_ansi(false)
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            TracingSink.report(
                "IFRAME-MSG",
                "error in registered callback embed-size",
                &HandlerError::Failed("height missing".into()),
            );
        });

        let output = logs.text();
        assert!(output.contains("ERROR"), "unexpected log output: {output}");
        assert!(output.contains(DIAGNOSTICS_TARGET));
        assert!(output.contains("error in registered callback embed-size"));
        assert!(output.contains("IFRAME-MSG"));
        assert!(output.contains("height missing"));
    }

    #[test]
    fn recording_sink_keeps_reports_in_order() {
        let sink = RecordingSink::new();
        assert!(sink.is_empty());

        sink.report("T", "first", &HandlerError::Panicked("boom".to_string()));
        sink.report("T", "second", &HandlerError::Failed("bad input".into()));

        let reports = sink.reports();
        assert_eq!(sink.len(), 2);
        assert_eq!(reports[0].message, "first");
        assert_eq!(reports[0].error, "handler panicked: boom");
        assert_eq!(reports[1].error, "bad input");
    }
}
