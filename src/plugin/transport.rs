//! Subprocess transport for plugins
//!
//! Each plugin runs as one long-lived child process. A worker thread owns the
//! child's stdin, its buffered stdout and the request id counter; callers hand
//! it requests over a channel and block on the reply. The worker handles one
//! request at a time, so calls to the same plugin never interleave while
//! different plugins run independently.
//!
//! ```text
//! call() ──Envelope──▶ worker ──request line──▶ plugin stdin
//!   ▲                    │
//!   └────── reply ◀──────┴──◀─ response line ── plugin stdout
//!
//! plugin stderr ──▶ drain thread ──▶ tracing
//! ```
//!
//! There is no timeout: a plugin that never answers blocks its caller.
//! Responses carrying an id older than the request in flight are discarded,
//! so one duplicated answer does not shift every later call.

use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;
use std::thread::{self, JoinHandle};

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use super::protocol::{method, RpcError, RpcRequest, RpcResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to spawn plugin {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Plugin transport is closed")]
    Closed,

    #[error("Failed to write request: {0}")]
    Write(#[source] std::io::Error),

    #[error("Failed to read response: {0}")]
    Read(#[source] std::io::Error),

    #[error("Plugin closed its output before responding")]
    Eof,

    #[error("Failed to encode request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Failed to decode response: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    Remote(RpcError),

    #[error("Response id {got:?} does not match request id {expected}")]
    IdMismatch { expected: u64, got: Option<u64> },

    #[error("Failed to wait for plugin: {0}")]
    Wait(#[source] std::io::Error),
}

/// Lifecycle of a plugin connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportState {
    /// Process started, `init` not yet acknowledged
    Spawned,
    /// `init` succeeded
    Initialized,
    /// At least one call made after `init`
    Active,
    /// `shutdown` sent, process not yet reaped
    ShuttingDown,
    /// Process waited on and pipes closed
    Terminated,
}

type Reply = Result<Value, TransportError>;

/// A call handed to the worker thread
struct Envelope {
    method: String,
    params: Option<Value>,
    reply: Sender<Reply>,
}

/// A JSON-RPC connection to one plugin process
pub struct Transport {
    name: String,
    child: Child,
    requests: Option<Sender<Envelope>>,
    worker: Option<JoinHandle<()>>,
    stderr: Option<JoinHandle<()>>,
    state: Mutex<TransportState>,
}

impl Transport {
    /// Starts `executable` and wires up its stdio
    pub fn spawn(name: impl Into<String>, executable: &Path) -> Result<Self, TransportError> {
        let name = name.into();
        let spawn_err = |source| TransportError::Spawn {
            path: executable.to_path_buf(),
            source,
        };

        let mut child = Command::new(executable)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(spawn_err)?;

        let pipes = (child.stdin.take(), child.stdout.take(), child.stderr.take());
        let (Some(stdin), Some(stdout), Some(stderr)) = pipes else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(spawn_err(std::io::Error::other("plugin stdio was not captured")));
        };

        let (requests, inbox) = mpsc::channel();
        let worker = {
            let name = name.clone();
            thread::Builder::new()
                .name(format!("plugin-{}", name))
                .spawn(move || serve(&name, stdin, BufReader::new(stdout), inbox))
        };
        let stderr = {
            let name = name.clone();
            thread::Builder::new()
                .name(format!("plugin-{}-stderr", name))
                .spawn(move || drain_stderr(&name, stderr))
        };

        let (worker, stderr) = match (worker, stderr) {
            (Ok(w), Ok(s)) => (w, s),
            (Err(e), _) | (_, Err(e)) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(spawn_err(e));
            }
        };

        tracing::debug!("Spawned plugin {} (pid {})", name, child.id());

        Ok(Self {
            name,
            child,
            requests: Some(requests),
            worker: Some(worker),
            stderr: Some(stderr),
            state: Mutex::new(TransportState::Spawned),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> TransportState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: TransportState) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = state;
    }

    /// Sends one request and waits for its response.
    ///
    /// Every call consumes a request id, whether or not it succeeds.
    pub fn call(&self, method: &str, params: Option<Value>) -> Result<Value, TransportError> {
        let requests = self.requests.as_ref().ok_or(TransportError::Closed)?;
        let (reply, response) = mpsc::channel();

        requests
            .send(Envelope {
                method: method.to_string(),
                params,
                reply,
            })
            .map_err(|_| TransportError::Closed)?;

        let result = response.recv().map_err(|_| TransportError::Closed)?;
        if result.is_ok() && self.state() == TransportState::Initialized {
            self.set_state(TransportState::Active);
        }
        result
    }

    /// Like [`call`](Self::call), decoding the result into `T`
    pub fn call_as<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Option<Value>,
    ) -> Result<T, TransportError> {
        let value = self.call(method, params)?;
        serde_json::from_value(value).map_err(TransportError::Decode)
    }

    /// Sends `init` with the plugin's configuration
    pub fn init(&self, config: Value) -> Result<(), TransportError> {
        self.call(method::INIT, Some(serde_json::json!({ "config": config })))?;
        self.set_state(TransportState::Initialized);
        Ok(())
    }

    /// Sends `shutdown` (ignoring its outcome) and closes the connection
    pub fn shutdown(&mut self) -> Result<ExitStatus, TransportError> {
        self.set_state(TransportState::ShuttingDown);
        if let Err(e) = self.call(method::SHUTDOWN, None) {
            tracing::debug!("Plugin {} shutdown call failed: {}", self.name, e);
        }
        self.close()
    }

    /// Closes stdin, joins the I/O threads and waits for the process to exit
    pub fn close(&mut self) -> Result<ExitStatus, TransportError> {
        // Dropping the sender ends the worker, which drops the child's stdin
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }

        let status = self.child.wait().map_err(TransportError::Wait)?;

        if let Some(stderr) = self.stderr.take() {
            let _ = stderr.join();
        }

        self.set_state(TransportState::Terminated);
        tracing::debug!("Plugin {} exited with {}", self.name, status);
        Ok(status)
    }

    /// Kills the process without waiting for it to cooperate.
    ///
    /// The I/O threads are detached rather than joined; they finish once the
    /// pipes close.
    pub fn kill(&mut self) {
        self.requests.take();
        if let Err(e) = self.child.kill() {
            tracing::debug!("Failed to kill plugin {}: {}", self.name, e);
        }
        if let Err(e) = self.child.wait() {
            tracing::debug!("Failed to reap plugin {}: {}", self.name, e);
        }
        self.worker.take();
        self.stderr.take();
        self.set_state(TransportState::Terminated);
    }
}

impl Drop for Transport {
    fn drop(&mut self) {
        if self.state() != TransportState::Terminated {
            self.kill();
        }
    }
}

/// Worker loop: one request in flight at a time, ids from 1
fn serve(name: &str, mut stdin: ChildStdin, mut stdout: BufReader<ChildStdout>, inbox: Receiver<Envelope>) {
    let mut next_id: u64 = 1;

    for envelope in inbox {
        let id = next_id;
        next_id += 1;

        let result = round_trip(&mut stdin, &mut stdout, id, &envelope.method, envelope.params);
        if let Err(e) = &result {
            tracing::debug!("Plugin {} call {} (id {}) failed: {}", name, envelope.method, id, e);
        }

        // The caller may have gone away; nothing to do then
        let _ = envelope.reply.send(result);
    }
}

fn round_trip(
    stdin: &mut ChildStdin,
    stdout: &mut impl BufRead,
    id: u64,
    method: &str,
    params: Option<Value>,
) -> Reply {
    let request = RpcRequest::new(id, method, params);
    let mut line = serde_json::to_vec(&request).map_err(TransportError::Encode)?;
    line.push(b'\n');

    tracing::trace!("-> {}", String::from_utf8_lossy(&line).trim_end());
    stdin.write_all(&line).map_err(TransportError::Write)?;
    stdin.flush().map_err(TransportError::Write)?;

    let response = loop {
        let response = read_response(stdout)?;
        match response.id {
            // Leftover answer to an earlier request
            Some(got) if got < id => {
                tracing::debug!("Discarding stale response id {} while waiting for {}", got, id);
            }
            _ => break response,
        }
    };

    // Errors raised before the plugin could read an id carry a null id
    let unattributed_error = response.id.is_none() && response.error.is_some();
    if response.id != Some(id) && !unattributed_error {
        return Err(TransportError::IdMismatch {
            expected: id,
            got: response.id,
        });
    }

    response.into_result().map_err(TransportError::Remote)
}

fn read_response(stdout: &mut impl BufRead) -> Result<RpcResponse, TransportError> {
    let mut buf = String::new();
    if stdout.read_line(&mut buf).map_err(TransportError::Read)? == 0 {
        return Err(TransportError::Eof);
    }
    tracing::trace!("<- {}", buf.trim_end());

    serde_json::from_str(&buf).map_err(TransportError::Decode)
}

/// Forwards plugin stderr to the log until the pipe closes
fn drain_stderr(name: &str, stderr: ChildStderr) {
    for line in BufReader::new(stderr).lines() {
        match line {
            Ok(line) => tracing::warn!(plugin = name, "{}", line),
            Err(e) => {
                tracing::debug!("Stopped reading stderr of plugin {}: {}", name, e);
                break;
            }
        }
    }
}
