//! Tracing setup for the browser.
//!
//! Events are formatted by `tracing-subscriber` and each one is forwarded to the
//! console method matching its level, so the devtools level filter works as
//! expected. Timestamps are left out: the console adds its own and wasm has no
//! system clock to read them from.

use std::io;
use std::sync::OnceLock;

use tracing::level_filters::LevelFilter;
use tracing::{debug, warn, Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{reload, EnvFilter};

type FilterReload = Box<dyn Fn(EnvFilter) -> Result<(), reload::Error> + Send + Sync>;

static FILTER_RELOAD: OnceLock<FilterReload> = OnceLock::new();

/// Installs the global subscriber with `directive` as its filter.
///
/// The first call installs; later calls only swap the filter, so logging can
/// start before the page configuration has been read.
pub fn init(directive: &str) {
    if let Some(reload) = FILTER_RELOAD.get() {
        if let Err(e) = reload(env_filter(directive)) {
            warn!(%e, directive, "failed to change log filter");
        }
        return;
    }

    // dependencies that log through `log` end up in the same place
    let _ = tracing_log::LogTracer::init();

    let subscriber = tracing_subscriber::fmt()
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_env_filter(env_filter(directive))
        .with_writer(ConsoleWriter)
        .with_filter_reloading();
    let handle = subscriber.reload_handle();

    if tracing::subscriber::set_global_default(subscriber.finish()).is_err() {
        debug!("logging already initialized");
        return;
    }
    let _ = FILTER_RELOAD.set(Box::new(move |filter| handle.reload(filter)));
}

fn env_filter(directive: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directive)
}

/// Console method a line at `level` is written with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleMethod {
    Error,
    Warn,
    Info,
    Debug,
}

impl From<&Level> for ConsoleMethod {
    fn from(level: &Level) -> Self {
        match *level {
            Level::ERROR => ConsoleMethod::Error,
            Level::WARN => ConsoleMethod::Warn,
            Level::INFO => ConsoleMethod::Info,
            _ => ConsoleMethod::Debug,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleWriter;

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = ConsoleLine;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleLine::new(ConsoleMethod::Info)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleLine::new(meta.level().into())
    }
}

/// Buffers one formatted event and emits it when dropped.
pub struct ConsoleLine {
    method: ConsoleMethod,
    buffer: Vec<u8>,
}

impl ConsoleLine {
    fn new(method: ConsoleMethod) -> Self {
        Self {
            method,
            buffer: Vec::new(),
        }
    }

    fn take_text(&mut self) -> Option<String> {
        let text = String::from_utf8_lossy(&self.buffer).trim_end().to_string();
        self.buffer.clear();
        (!text.is_empty()).then_some(text)
    }
}

impl io::Write for ConsoleLine {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(text) = self.take_text() {
            emit(self.method, &text);
        }
        Ok(())
    }
}

impl Drop for ConsoleLine {
    fn drop(&mut self) {
        if let Some(text) = self.take_text() {
            emit(self.method, &text);
        }
    }
}

#[cfg(all(feature = "web", target_arch = "wasm32"))]
fn emit(method: ConsoleMethod, text: &str) {
    use wasm_bindgen::JsValue;
    use web_sys::console;

    let line = JsValue::from_str(text);
    match method {
        ConsoleMethod::Error => console::error_1(&line),
        ConsoleMethod::Warn => console::warn_1(&line),
        ConsoleMethod::Info => console::info_1(&line),
        ConsoleMethod::Debug => console::debug_1(&line),
    }
}

#[cfg(not(all(feature = "web", target_arch = "wasm32")))]
fn emit(_method: ConsoleMethod, text: &str) {
    use std::io::Write;

    let _ = writeln!(io::stderr(), "{text}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_map_to_console_methods() {
        assert_eq!(ConsoleMethod::from(&Level::ERROR), ConsoleMethod::Error);
        assert_eq!(ConsoleMethod::from(&Level::WARN), ConsoleMethod::Warn);
        assert_eq!(ConsoleMethod::from(&Level::INFO), ConsoleMethod::Info);
        assert_eq!(ConsoleMethod::from(&Level::DEBUG), ConsoleMethod::Debug);
        assert_eq!(ConsoleMethod::from(&Level::TRACE), ConsoleMethod::Debug);
    }

    #[test]
    fn line_buffer_trims_and_drains() {
        let mut line = ConsoleLine::new(ConsoleMethod::Info);
        line.buffer.extend_from_slice(b" INFO page interactions initialized\n");

        assert_eq!(line.take_text().as_deref(), Some(" INFO page interactions initialized"));
        assert_eq!(line.take_text(), None);
    }

    #[test]
    fn later_init_swaps_the_filter() {
        init("warn");
        assert_eq!(LevelFilter::current(), LevelFilter::WARN);

        init("debug");
        assert_eq!(LevelFilter::current(), LevelFilter::DEBUG);
    }

    #[test]
    fn filter_uses_configured_level() {
        assert_eq!(env_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(env_filter("warn").max_level_hint(), Some(LevelFilter::WARN));
    }
}
