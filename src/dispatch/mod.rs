//! Process dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! MatchedRoute + RequestMetadata + request body
//!     → environment.rs (CGI-style variables, parameters last)
//!     → process.rs (spawn, stdin feeder, deadline-bound reads and wait)
//!     → Dispatched::Finished  (outcome known before any output was sent)
//!     → Dispatched::Streaming (output committed; outcome arrives later)
//! ```
//!
//! # Design Decisions
//! - One subprocess per request, no retries
//! - The deadline is measured from request start, not from spawn
//! - On deadline the child is killed and reaped in the background; the
//!   request task never waits for it to die
//! - Once the first output byte is forwarded, a late failure aborts the
//!   response body so the client sees a dropped connection, not a clean end

pub mod environment;
pub mod process;

use std::process::ExitStatus;
use std::time::Duration;

use axum::body::{Body, Bytes};
use tokio::sync::{mpsc, oneshot};
use tokio::time::Instant;

use crate::config::{DispatchConfig, OutputMode};
use crate::routing::MatchedRoute;

pub use environment::{build_environment, RequestMetadata, SERVER_SOFTWARE};
pub use process::{ProcessInvocation, RunningProcess};

/// Chunks buffered between the supervisor and the response body.
const STREAM_CHANNEL_CAPACITY: usize = 16;

/// Errors raised while running a subprocess.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("unable to launch {executable}: {source}")]
    Launch {
        executable: String,
        #[source]
        source: std::io::Error,
    },

    #[error("subprocess I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("subprocess exited with {0}")]
    Exit(ExitStatus),

    #[error("subprocess exceeded its deadline")]
    Timeout,

    #[error("client disconnected before output completed")]
    ClientGone,
}

/// Terminal state of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    Succeeded,
    Failed(String),
    TimedOut,
}

impl DispatchOutcome {
    pub fn from_result(result: &Result<(), DispatchError>) -> Self {
        match result {
            Ok(()) => DispatchOutcome::Succeeded,
            Err(DispatchError::Timeout) => DispatchOutcome::TimedOut,
            Err(e) => DispatchOutcome::Failed(e.to_string()),
        }
    }

    /// Short label for logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Succeeded => "succeeded",
            DispatchOutcome::Failed(_) => "failed",
            DispatchOutcome::TimedOut => "timed_out",
        }
    }
}

/// What the handler receives from a dispatch.
#[derive(Debug)]
pub enum Dispatched {
    /// The outcome was reached before any response byte was committed.
    Finished { outcome: DispatchOutcome, body: Bytes },
    /// Output has started; the body streams and the outcome follows.
    Streaming {
        body: Body,
        outcome: oneshot::Receiver<DispatchOutcome>,
    },
}

impl Dispatched {
    fn finished(result: Result<(), DispatchError>, body: Bytes) -> Self {
        Dispatched::Finished {
            outcome: DispatchOutcome::from_result(&result),
            body,
        }
    }
}

/// Runs matched routes as subprocesses.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    timeout: Duration,
    output_mode: OutputMode,
    read_buffer_size: usize,
}

impl Dispatcher {
    pub fn new(config: &DispatchConfig) -> Self {
        Self {
            timeout: Duration::from_millis(config.timeout_ms),
            output_mode: config.output_mode,
            read_buffer_size: config.read_buffer_size.max(1),
        }
    }

    /// Run the route's executable for one request that started at `started`.
    pub async fn dispatch(
        &self,
        matched: &MatchedRoute<'_>,
        metadata: &RequestMetadata,
        body: Body,
        started: Instant,
    ) -> Dispatched {
        let invocation = ProcessInvocation {
            executable: matched.route.executable.clone(),
            env: build_environment(metadata, matched),
            deadline: started + self.timeout,
        };

        let process = match invocation.spawn(body) {
            Ok(process) => process,
            Err(e) => return Dispatched::finished(Err(e), Bytes::new()),
        };

        match self.output_mode {
            OutputMode::Buffer => Self::run_buffered(process).await,
            OutputMode::Stream => self.run_streaming(process).await,
        }
    }

    async fn run_buffered(mut process: RunningProcess) -> Dispatched {
        let (result, output) = match process.read_to_end().await {
            Ok(output) => (process.wait().await, output),
            Err(e) => (Err(e), Bytes::new()),
        };

        process.release(&result);
        Dispatched::finished(result, output)
    }

    async fn run_streaming(&self, mut process: RunningProcess) -> Dispatched {
        let mut buf = vec![0u8; self.read_buffer_size];

        let first = match process.read_chunk(&mut buf).await {
            Ok(Some(chunk)) => chunk,
            Ok(None) => {
                let result = process.wait().await;
                process.release(&result);
                return Dispatched::finished(result, Bytes::new());
            }
            Err(e) => {
                let result = Err(e);
                process.release(&result);
                return Dispatched::finished(result, Bytes::new());
            }
        };

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let (outcome_tx, outcome_rx) = oneshot::channel();

        // The channel is empty, so the first chunk always fits.
        let _ = tx.try_send(Ok(first));
        tokio::spawn(supervise(process, buf, tx, outcome_tx));

        let stream = futures_util::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        });

        Dispatched::Streaming {
            body: Body::from_stream(stream),
            outcome: outcome_rx,
        }
    }
}

type ChunkSender = mpsc::Sender<Result<Bytes, DispatchError>>;

/// Pump the remaining output after headers are committed and report the
/// terminal outcome.
async fn supervise(
    mut process: RunningProcess,
    mut buf: Vec<u8>,
    tx: ChunkSender,
    outcome_tx: oneshot::Sender<DispatchOutcome>,
) {
    let result = forward(&mut process, &mut buf, &tx).await;
    let outcome = DispatchOutcome::from_result(&result);
    process.release(&result);
    let _ = outcome_tx.send(outcome);

    if let Err(e) = result {
        // An error item makes the server abort the response instead of
        // terminating it cleanly.
        let _ = tx.send(Err(e)).await;
    }
}

async fn forward(
    process: &mut RunningProcess,
    buf: &mut [u8],
    tx: &ChunkSender,
) -> Result<(), DispatchError> {
    while let Some(chunk) = process.read_chunk(buf).await? {
        match tokio::time::timeout_at(process.deadline(), tx.send(Ok(chunk))).await {
            Err(_) => return Err(DispatchError::Timeout),
            Ok(Err(_)) => return Err(DispatchError::ClientGone),
            Ok(Ok(())) => {}
        }
    }

    process.wait().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::{PathParams, RouteDefinition};

    fn dispatcher(timeout_ms: u64, output_mode: OutputMode) -> Dispatcher {
        Dispatcher::new(&DispatchConfig {
            timeout_ms,
            output_mode,
            ..Default::default()
        })
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(DispatchOutcome::from_result(&Ok(())), DispatchOutcome::Succeeded);
        assert_eq!(
            DispatchOutcome::from_result(&Err(DispatchError::Timeout)),
            DispatchOutcome::TimedOut
        );
        assert_eq!(
            DispatchOutcome::from_result(&Err(DispatchError::ClientGone)),
            DispatchOutcome::Failed("client disconnected before output completed".into())
        );
    }

    #[tokio::test]
    async fn test_missing_executable_fails_without_output() {
        let route = RouteDefinition::new("GET", "/x", "x.roc", "/nonexistent/x");
        let matched = MatchedRoute {
            route: &route,
            params: PathParams::new(),
        };

        for mode in [OutputMode::Stream, OutputMode::Buffer] {
            let dispatched = dispatcher(500, mode)
                .dispatch(&matched, &RequestMetadata::default(), Body::empty(), Instant::now())
                .await;
            match dispatched {
                Dispatched::Finished {
                    outcome: DispatchOutcome::Failed(message),
                    body,
                } => {
                    assert!(message.contains("unable to launch"));
                    assert!(body.is_empty());
                }
                other => panic!("unexpected dispatch result: {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn test_silent_success_finishes_before_commit() {
        let route = RouteDefinition::new("GET", "/x", "x.roc", "/bin/true");
        let matched = MatchedRoute {
            route: &route,
            params: PathParams::new(),
        };
        let dispatched = dispatcher(2_000, OutputMode::Stream)
            .dispatch(&matched, &RequestMetadata::default(), Body::empty(), Instant::now())
            .await;
        assert!(matches!(
            dispatched,
            Dispatched::Finished {
                outcome: DispatchOutcome::Succeeded,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_silent_failure_finishes_before_commit() {
        let route = RouteDefinition::new("GET", "/x", "x.roc", "/bin/false");
        let matched = MatchedRoute {
            route: &route,
            params: PathParams::new(),
        };
        let dispatched = dispatcher(2_000, OutputMode::Stream)
            .dispatch(&matched, &RequestMetadata::default(), Body::empty(), Instant::now())
            .await;
        match dispatched {
            Dispatched::Finished {
                outcome: DispatchOutcome::Failed(message),
                ..
            } => assert!(message.contains("exited with")),
            other => panic!("unexpected dispatch result: {:?}", other),
        }
    }
}
