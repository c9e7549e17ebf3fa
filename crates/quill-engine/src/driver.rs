//! Session Loop: one instruction per input line, handled to completion
//! before the next line is read.

use std::io::Write;

use quill_core::SessionError;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, error, info};

use crate::session::Session;
use crate::sink::ResponseSink;

const PROMPT_MARKER: &str = "> ";
const EXIT_COMMAND: &str = "exit";

/// Whether the preamble is still owed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Turn {
    First,
    Subsequent,
}

/// How a loop ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopExit {
    /// The user typed `exit`.
    Command,
    /// Input was closed.
    EndOfInput,
}

pub struct SessionLoop<S> {
    session: Session,
    sink: S,
    turn: Turn,
}

impl<S: ResponseSink> SessionLoop<S> {
    pub fn new(session: Session, sink: S) -> Self {
        Self {
            session,
            sink,
            turn: Turn::First,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run until `exit` or end of input.
    ///
    /// A turn without a result prints the sink's failure notice and the
    /// loop keeps going. That includes a context load failure, after which
    /// the session carries on without context. Errors returned here are the
    /// fatal kind: input, the document, or the console failed.
    pub async fn run<R, W>(&mut self, input: R, out: &mut W) -> Result<LoopExit, SessionError>
    where
        R: AsyncBufRead + Unpin,
        W: Write,
    {
        let mut lines = input.lines();
        let exit = loop {
            write!(out, "{PROMPT_MARKER}").map_err(SessionError::Console)?;
            out.flush().map_err(SessionError::Console)?;

            let Some(instruction) = lines.next_line().await.map_err(SessionError::Input)? else {
                break LoopExit::EndOfInput;
            };
            if instruction.to_lowercase() == EXIT_COMMAND {
                break LoopExit::Command;
            }

            let request = self.prepare(&instruction)?;
            let reply = match self.session.generate(&request).await {
                Ok(reply) => {
                    self.turn = Turn::Subsequent;
                    reply
                }
                Err(e) => {
                    // Nothing was sent, so the preamble is still owed.
                    error!(path = %e.subject(), error = ?e, "context load failed");
                    None
                }
            };
            match reply {
                Some(text) => self.sink.deliver(text.trim(), out)?,
                None => writeln!(out, "{}", self.sink.failure_notice())
                    .map_err(SessionError::Console)?,
            }
        };

        debug!(?exit, "session loop ended");
        info!(
            client = self.session.client_name(),
            requests = self.session.request_count(),
            "session finished"
        );
        self.sink.finish(out)?;
        Ok(exit)
    }

    fn prepare(&self, instruction: &str) -> Result<String, SessionError> {
        let framed = self.sink.frame(instruction)?;
        Ok(match (self.turn, self.sink.preamble()) {
            (Turn::First, Some(preamble)) => format!("{preamble}\n{framed}"),
            _ => framed,
        })
    }
}
