//! The sandbox logging surface.
//!
//! Script code sees exactly two logging methods, `log` and `error`.  Both
//! render their arguments the same way (each value serialized on its own,
//! joined by single spaces), prefix the line with a stream tag, and hand the
//! result to one host print primitive together with an is-error flag.
//!
//! Script output never goes through `tracing`; it is the script's own
//! output, not host diagnostics.

use std::io::Write;
use std::sync::{Arc, Mutex};

use serde_json::Value;

/// The single low-level output channel the bridge writes through.
///
/// Implementations must not fail from the bridge's point of view; a write
/// error is theirs to swallow or report.
pub trait HostPrint: Send + Sync {
    fn print(&self, text: &str, is_error: bool);
}

/// Which logical stream a line belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    Out,
    Err,
}

impl Stream {
    pub fn tag(self) -> &'static str {
        match self {
            Self::Out => "[out]:",
            Self::Err => "[err]:",
        }
    }

    pub fn is_error(self) -> bool {
        self == Self::Err
    }
}

/// Render values the way a positional-argument logger would: each value
/// serialized individually, joined with single spaces.
pub fn format_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stream-tagged logger bound to one host print primitive.
#[derive(Clone)]
pub struct Console {
    printer: Arc<dyn HostPrint>,
}

impl Console {
    pub fn new(printer: Arc<dyn HostPrint>) -> Self {
        Self { printer }
    }

    /// Render one full line, tag and trailing newline included.
    pub fn render(stream: Stream, values: &[Value]) -> String {
        format!("{} {}\n", stream.tag(), format_values(values))
    }

    pub fn log(&self, values: &[Value]) {
        self.emit(Stream::Out, values);
    }

    pub fn error(&self, values: &[Value]) {
        self.emit(Stream::Err, values);
    }

    pub fn emit(&self, stream: Stream, values: &[Value]) {
        self.printer
            .print(&Self::render(stream, values), stream.is_error());
    }

    /// Raw print, bypassing formatting.  This is what the engine's own
    /// `print` binding maps to.
    pub fn print(&self, text: &str, is_error: bool) {
        self.printer.print(text, is_error);
    }
}

impl std::fmt::Debug for Console {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Console").finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Printers
// ---------------------------------------------------------------------------

/// Writes to the process's stdout / stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioPrint;

impl HostPrint for StdioPrint {
    fn print(&self, text: &str, is_error: bool) {
        if is_error {
            let mut stderr = std::io::stderr().lock();
            let _ = stderr.write_all(text.as_bytes());
            let _ = stderr.flush();
        } else {
            let mut stdout = std::io::stdout().lock();
            let _ = stdout.write_all(text.as_bytes());
            let _ = stdout.flush();
        }
    }
}

/// One chunk of text received by a [`CapturedPrint`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrintedText {
    pub text: String,
    pub is_error: bool,
}

/// Keeps everything printed in memory, in order.
#[derive(Debug, Default)]
pub struct CapturedPrint {
    printed: Mutex<Vec<PrintedText>>,
}

impl CapturedPrint {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything printed so far.
    pub fn printed(&self) -> Vec<PrintedText> {
        self.printed
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }

    /// Text printed on the standard stream.
    pub fn stdout(&self) -> String {
        self.collect(false)
    }

    /// Text printed on the error stream.
    pub fn stderr(&self) -> String {
        self.collect(true)
    }

    fn collect(&self, is_error: bool) -> String {
        self.printed()
            .into_iter()
            .filter(|p| p.is_error == is_error)
            .map(|p| p.text)
            .collect()
    }
}

impl HostPrint for CapturedPrint {
    fn print(&self, text: &str, is_error: bool) {
        if let Ok(mut printed) = self.printed.lock() {
            printed.push(PrintedText {
                text: text.to_string(),
                is_error,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn captured() -> (Arc<CapturedPrint>, Console) {
        let sink = Arc::new(CapturedPrint::new());
        let console = Console::new(sink.clone());
        (sink, console)
    }

    #[test]
    fn format_joins_with_single_spaces() {
        assert_eq!(format_values(&[json!("a"), json!(1)]), "\"a\" 1");
        assert_eq!(format_values(&[]), "");
        assert_eq!(
            format_values(&[json!({"k": [1, 2]}), json!(null), json!(true)]),
            "{\"k\":[1,2]} null true"
        );
    }

    #[test]
    fn log_and_error_produce_one_tagged_line_each() {
        let (sink, console) = captured();
        console.log(&[json!("a"), json!(1)]);
        console.error(&[json!("b"), json!(2)]);

        assert_eq!(
            sink.printed(),
            vec![
                PrintedText {
                    text: "[out]: \"a\" 1\n".into(),
                    is_error: false,
                },
                PrintedText {
                    text: "[err]: \"b\" 2\n".into(),
                    is_error: true,
                },
            ]
        );
        assert_eq!(sink.stdout().lines().count(), 1);
        assert_eq!(sink.stderr().lines().count(), 1);
    }

    #[test]
    fn raw_print_is_passed_through() {
        let (sink, console) = captured();
        console.print("Hello runjs!\n", false);
        assert_eq!(sink.stdout(), "Hello runjs!\n");
        assert!(sink.stderr().is_empty());
    }

    #[test]
    fn stream_tags() {
        assert_eq!(Stream::Out.tag(), "[out]:");
        assert_eq!(Stream::Err.tag(), "[err]:");
        assert!(!Stream::Out.is_error());
        assert!(Stream::Err.is_error());
    }
}
