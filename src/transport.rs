//! Request/response transports for the interactive missing-parameter protocol.
//!
//! A request is one line, `TU_PARAM_REQ <name> <spec>`, written to the peer.
//! The response is the next whitespace-delimited token read back. Tokens left
//! over on a response line are kept for the following request.

use std::collections::VecDeque;
use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use log::info;

use crate::error::{AutotestError, AutotestResult};

/// Sentinel that opens every request line. External tooling matches on it.
pub const PARAM_REQUEST_TOKEN: &str = "TU_PARAM_REQ";

/// Format the request line for `name` (without the trailing newline).
pub fn request_line(name: &str, spec: &str) -> String {
    format!("{} {} {}", PARAM_REQUEST_TOKEN, name, spec)
}

/// Synchronous request/response channel to whoever supplies missing values.
pub trait ParamTransport {
    /// Announce that `name` (declared as `spec`) is needed and block until a
    /// single token comes back.
    fn request(&mut self, name: &str, spec: &str) -> AutotestResult<String>;
}

/// Transport over any buffered reader and writer. Waits without a bound.
///
/// Used with in-memory buffers in tests, or with pipes a driver already owns.
#[derive(Debug)]
pub struct LineTransport<R, W> {
    input: R,
    output: W,
    pending: VecDeque<String>,
}

impl<R: BufRead, W: Write> LineTransport<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            pending: VecDeque::new(),
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub fn into_inner(self) -> (R, W) {
        (self.input, self.output)
    }

    fn next_token(&mut self, name: &str) -> AutotestResult<String> {
        loop {
            if let Some(token) = self.pending.pop_front() {
                return Ok(token);
            }
            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(AutotestError::InteractiveInputClosed { name: name.to_string() });
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
    }
}

impl<R: BufRead, W: Write> ParamTransport for LineTransport<R, W> {
    fn request(&mut self, name: &str, spec: &str) -> AutotestResult<String> {
        writeln!(self.output, "{}", request_line(name, spec))?;
        self.output.flush()?;
        self.next_token(name)
    }
}

/// Transport over the process's stdout and stdin.
///
/// Stdin is drained by a helper thread started on the first request, so that
/// the wait for a response can be bounded by `timeout`.
#[derive(Debug)]
pub struct StdioTransport {
    timeout: Option<Duration>,
    tokens: Option<Receiver<io::Result<String>>>,
}

impl StdioTransport {
    pub fn new(timeout: Option<Duration>) -> Self {
        Self { timeout, tokens: None }
    }

    fn spawn_reader() -> Receiver<io::Result<String>> {
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                match line {
                    Ok(line) => {
                        for token in line.split_whitespace() {
                            if tx.send(Ok(token.to_string())).is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        return;
                    }
                }
            }
        });
        rx
    }
}

impl ParamTransport for StdioTransport {
    fn request(&mut self, name: &str, spec: &str) -> AutotestResult<String> {
        {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{}", request_line(name, spec))?;
            out.flush()?;
        }
        info!("Requested param '{}' over stdio", name);

        let tokens = self.tokens.get_or_insert_with(Self::spawn_reader);
        wait_for_token(tokens, self.timeout, name)
    }
}

/// Take the next token from `tokens`, waiting at most `timeout` when one is set.
fn wait_for_token(
    tokens: &Receiver<io::Result<String>>,
    timeout: Option<Duration>,
    name: &str,
) -> AutotestResult<String> {
    let closed = || AutotestError::InteractiveInputClosed { name: name.to_string() };
    let received = match timeout {
        None => tokens.recv().map_err(|_| closed())?,
        Some(waited) => tokens.recv_timeout(waited).map_err(|e| match e {
            RecvTimeoutError::Timeout => AutotestError::InteractiveTimeout {
                name: name.to_string(),
                waited,
            },
            RecvTimeoutError::Disconnected => closed(),
        })?,
    };
    Ok(received?)
}
