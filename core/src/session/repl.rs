//! Line-based console driver

use super::{ChatSession, DriverState, ReplySink};
use crate::chat::Message;
use crate::error::AgentError;
use crate::output::OutputFormatter;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Writes replies and errors to any `Write`
pub struct ConsoleSink<W: Write> {
    out: W,
    formatter: OutputFormatter,
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W, formatter: OutputFormatter) -> Self {
        Self { out, formatter }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_line(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            tracing::warn!(error = %e, "failed to write to console");
        }
    }

    fn prompt(&mut self) -> std::io::Result<()> {
        write!(self.out, "{}", self.formatter.prompt())?;
        self.out.flush()
    }
}

impl<W: Write> ReplySink for ConsoleSink<W> {
    fn on_reply(&mut self, message: &Message) {
        let text = self.formatter.format_reply(message);
        self.write_line(&text);
    }

    fn on_error(&mut self, error: &AgentError) {
        let text = self.formatter.format_error(error);
        self.write_line(&text);
    }
}

/// Read lines from `input` until the user exits or input ends.
pub async fn run_console<R, W>(
    session: &mut ChatSession,
    input: R,
    sink: &mut ConsoleSink<W>,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut lines = input.lines();
    loop {
        sink.prompt()?;
        let Some(line) = lines.next_line().await? else {
            tracing::info!(session = %session.id(), "input closed");
            break;
        };
        if session.handle_input(&line, sink).await == DriverState::Terminated {
            break;
        }
    }
    Ok(())
}
