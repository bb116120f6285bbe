use std::fmt;
use std::process::ExitCode;

use clap::error::ErrorKind;
use clap_verbosity_flag::{InfoLevel, Verbosity};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields, format::Writer};
use tracing_subscriber::registry::LookupSpan;

/// Plain console lines: the message only, with `ERROR: ` and `WARNING: `
/// in front of errors and warnings.
pub struct ConsoleFormat;

impl<S, N> FormatEvent<S, N> for ConsoleFormat
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
        match *event.metadata().level() {
            Level::ERROR => write!(writer, "ERROR: ")?,
            Level::WARN => write!(writer, "WARNING: ")?,
            _ => {}
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

pub fn init(verbosity: Verbosity<InfoLevel>) {
    tracing_subscriber::fmt()
        .with_max_level(verbosity)
        .with_writer(std::io::stdout)
        .event_format(ConsoleFormat)
        .init();
}

/// Prints a command line error the way argument validation does and returns
/// the exit code. Help and version requests are not errors.
pub fn report_parse_error(err: clap::Error) -> ExitCode {
    match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand => {
            println!("{}", err.render());
            ExitCode::FAILURE
        }
        _ => {
            println!("{}", parse_error_lines(&err.render().to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Turns clap's rendered error into a `Usage:` line followed by an
/// `ERROR:` line.
fn parse_error_lines(rendered: &str) -> String {
    let usage = rendered
        .lines()
        .find(|line| line.starts_with("Usage:"))
        .unwrap_or("Usage: cardpin [OPTIONS] <COMMAND>");
    let message = rendered
        .lines()
        .next()
        .unwrap_or_default()
        .trim_start_matches("error: ");
    format!("{usage}\nERROR: {message}")
}
