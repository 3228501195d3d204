//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber
//! - Stamp every line with the current correlation id
//! - Configure log level from config, overridable via `RUST_LOG`
//!
//! # Line Layout
//! ```text
//! 2026-10-18T08:15:02.113Z | INFO  | 6f1c...e2 | request{method=GET}: integration_hub::http::response: exchange completed status=200
//! <timestamp>              | <lvl> | <corr id> | <spans>: <target>: <message> <fields>
//! ```
//! Lines emitted outside a request scope carry `NA` in the id column.

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, FormattedFields, MakeWriter};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::observability::correlation::{self, SENTINEL};

/// Error returned when a global subscriber is already installed.
pub type InitError = tracing_subscriber::util::TryInitError;

/// Event formatter producing `timestamp | LEVEL | correlation id | message`.
#[derive(Debug, Clone)]
pub struct CorrelationFormat {
    timer: SystemTime,
    with_target: bool,
}

impl Default for CorrelationFormat {
    fn default() -> Self {
        Self {
            timer: SystemTime,
            with_target: true,
        }
    }
}

impl CorrelationFormat {
    pub fn with_target(mut self, with_target: bool) -> Self {
        self.with_target = with_target;
        self
    }
}

impl<S, N> FormatEvent<S, N> for CorrelationFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        self.timer.format_time(&mut writer)?;
        match correlation::current() {
            Some(id) => write!(writer, " | {:<5} | {} | ", meta.level(), id)?,
            None => write!(writer, " | {:<5} | {} | ", meta.level(), SENTINEL)?,
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}", span.name())?;
                let extensions = span.extensions();
                if let Some(fields) = extensions.get::<FormattedFields<N>>() {
                    if !fields.is_empty() {
                        write!(writer, "{{{}}}", fields)?;
                    }
                }
                write!(writer, ": ")?;
            }
        }

        if self.with_target {
            write!(writer, "{}: ", meta.target())?;
        }

        ctx.format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Build the hub's subscriber stack over an arbitrary writer.
///
/// `init_logging` installs it globally over stdout; tests install it as the
/// thread default over an in-memory buffer.
pub fn build_subscriber<W>(filter: EnvFilter, writer: W) -> impl Subscriber + Send + Sync + 'static
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    tracing_subscriber::registry().with(filter).with(
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .event_format(CorrelationFormat::default())
            .with_writer(writer),
    )
}

/// Install the global subscriber. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) -> Result<(), InitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{default_level},tower_http=debug")));

    build_subscriber(filter, std::io::stdout).try_init()
}
