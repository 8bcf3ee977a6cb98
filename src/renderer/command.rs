//! Renderer backed by an external command.
//!
//! Each call spawns the configured program, writes one JSON request to its
//! stdin and reads one JSON response from its stdout:
//!
//! ```text
//! -> {"op":"expand_for_edit","text":"..","uid":"..","mask":7}
//! <- {"text":"..","uid":"..","flags":{"bbcode":true,"magic_url":true,"smilies":false}}
//!
//! -> {"op":"encode_for_storage","text":"..","uid":"..","flags":{..}}
//! <- {"text":"..","bitfield":"..","options":7}
//! ```
//!
//! A response of the form `{"error":".."}` is reported as
//! [`RenderError::Rejected`]. Unknown response fields are ignored.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::io::{self, Read, Write};
use std::process::{Child, Command, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use super::{EditableText, MarkupRenderer, RenderError, RenderResult, StoredText};
use crate::record::{CapabilityMask, FeatureFlags};

/// Program, arguments and per-call timeout for a [`CommandRenderer`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RendererCommand {
    pub program: String,
    pub args: Vec<String>,
    pub timeout: Duration,
}

impl RendererCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Renderer that delegates to an external program.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    command: RendererCommand,
}

#[derive(Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
enum Request<'a> {
    ExpandForEdit {
        text: &'a str,
        uid: &'a str,
        mask: u32,
    },
    EncodeForStorage {
        text: &'a str,
        uid: &'a str,
        flags: FeatureFlags,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Response<T> {
    Failure { error: String },
    Success(T),
}

impl CommandRenderer {
    pub fn new(command: RendererCommand) -> Self {
        Self { command }
    }

    pub fn command(&self) -> &RendererCommand {
        &self.command
    }

    fn call<T: DeserializeOwned>(&self, request: &Request<'_>) -> RenderResult<T> {
        let mut payload = serde_json::to_vec(request)?;
        payload.push(b'\n');

        let mut child = Command::new(&self.command.program)
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == io::ErrorKind::NotFound {
                    RenderError::NotAvailable(self.command.program.clone())
                } else {
                    RenderError::Io(e)
                }
            })?;

        let output = run_with_timeout(&mut child, &payload, self.command.timeout).map_err(|e| {
            if e.kind() == io::ErrorKind::TimedOut {
                RenderError::Timeout(self.command.timeout)
            } else {
                RenderError::Io(e)
            }
        })?;

        if !output.status.success() {
            return Err(RenderError::ExitCode {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        match serde_json::from_slice::<Response<T>>(&output.stdout)? {
            Response::Success(value) => Ok(value),
            Response::Failure { error } => Err(RenderError::Rejected(error)),
        }
    }
}

impl MarkupRenderer for CommandRenderer {
    fn name(&self) -> &str {
        &self.command.program
    }

    fn expand_for_edit(
        &self,
        text: &str,
        uid: &str,
        mask: CapabilityMask,
    ) -> RenderResult<EditableText> {
        self.call(&Request::ExpandForEdit {
            text,
            uid,
            mask: mask.bits(),
        })
    }

    fn encode_for_storage(
        &self,
        text: &str,
        uid: &str,
        flags: FeatureFlags,
    ) -> RenderResult<StoredText> {
        self.call(&Request::EncodeForStorage { text, uid, flags })
    }
}

/// Feed `input` to the child and wait for it to finish within `timeout`.
///
/// stdout and stderr are drained on helper threads so a chatty child cannot
/// block on a full pipe while we are still writing its input. The child is
/// killed and reaped on timeout.
fn run_with_timeout(child: &mut Child, input: &[u8], timeout: Duration) -> io::Result<Output> {
    let stdout_reader = child.stdout.take().map(spawn_reader);
    let stderr_reader = child.stderr.take().map(spawn_reader);

    if let Some(mut stdin) = child.stdin.take() {
        // A child that exits without reading its input closes the pipe early;
        // its exit status tells the real story.
        if let Err(e) = stdin.write_all(input) {
            if e.kind() != io::ErrorKind::BrokenPipe {
                return Err(e);
            }
        }
    }

    let start = Instant::now();
    let poll_interval = Duration::from_millis(10);
    let status = loop {
        match child.try_wait()? {
            Some(status) => break status,
            None => {
                if start.elapsed() >= timeout {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(io::Error::new(
                        io::ErrorKind::TimedOut,
                        "Renderer process timed out",
                    ));
                }
                thread::sleep(poll_interval);
            }
        }
    };

    Ok(Output {
        status,
        stdout: join_reader(stdout_reader),
        stderr: join_reader(stderr_reader),
    })
}

fn spawn_reader<R: Read + Send + 'static>(mut pipe: R) -> thread::JoinHandle<Vec<u8>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        pipe.read_to_end(&mut buf).ok();
        buf
    })
}

fn join_reader(handle: Option<thread::JoinHandle<Vec<u8>>>) -> Vec<u8> {
    handle
        .and_then(|h| h.join().ok())
        .unwrap_or_default()
}
