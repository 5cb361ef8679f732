//! Single-owner worker that serializes move requests against one engine.
//!
//! The engine's two streams are shared state: if two requests interleaved
//! their commands or read each other's replies, both would parse garbage or
//! wait forever. [`MoveBridge`] hands the [`EngineProcess`] to one task and
//! feeds it jobs over a queue, so a full send-then-drain cycle is always one
//! uninterrupted unit. The worker finishes a cycle even if the caller that
//! submitted it has gone away.
//!
//! There is no timeout. A stalled engine blocks the job in flight and every
//! job queued behind it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

use crate::command::{parse_bestmove, EngineCommand, MoveRequest, MoveResult};
use crate::error::EngineError;
use crate::process::EngineProcess;

/// Move requests that may wait behind the one in flight before callers start
/// waiting for queue space.
pub const DEFAULT_QUEUE_DEPTH: usize = 32;

/// Observable state of the engine behind a [`MoveBridge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Ready,
    /// The engine stream broke; every further request fails immediately.
    Failed,
}

enum Job {
    Play {
        request: MoveRequest,
        reply: oneshot::Sender<Result<MoveResult, EngineError>>,
    },
    Shutdown {
        done: oneshot::Sender<()>,
    },
}

/// Cheap-to-clone handle for submitting move requests to the engine worker.
#[derive(Clone)]
pub struct MoveBridge {
    jobs: mpsc::Sender<Job>,
    failed: Arc<AtomicBool>,
}

impl MoveBridge {
    /// Hand a ready engine to a new worker task.
    pub fn spawn(engine: EngineProcess) -> Result<Self, EngineError> {
        Self::with_queue_depth(engine, DEFAULT_QUEUE_DEPTH)
    }

    pub fn with_queue_depth(engine: EngineProcess, depth: usize) -> Result<Self, EngineError> {
        if !engine.is_ready() {
            return Err(EngineError::NotReady);
        }

        let (jobs, rx) = mpsc::channel(depth.max(1));
        let failed = Arc::new(AtomicBool::new(false));
        tokio::spawn(run_worker(engine, rx, Arc::clone(&failed)));

        Ok(Self { jobs, failed })
    }

    pub fn state(&self) -> EngineState {
        if self.failed.load(Ordering::SeqCst) {
            EngineState::Failed
        } else {
            EngineState::Ready
        }
    }

    /// Ask the engine for its move.
    ///
    /// Exactly one command is sent and the engine output is read up to and
    /// including the terminal `bestmove` line before the next queued request
    /// is started.
    pub async fn play(&self, request: MoveRequest) -> Result<MoveResult, EngineError> {
        let (reply, result) = oneshot::channel();
        self.jobs
            .send(Job::Play { request, reply })
            .await
            .map_err(|_| EngineError::Terminated)?;
        result.await.map_err(|_| EngineError::Terminated)?
    }

    /// Stop the worker after the jobs queued before this call, and tell the
    /// engine to quit. Later calls to [`play`](MoveBridge::play) fail with
    /// [`EngineError::Terminated`].
    pub async fn shutdown(&self) {
        let (done, finished) = oneshot::channel();
        if self.jobs.send(Job::Shutdown { done }).await.is_ok() {
            let _ = finished.await;
        }
    }
}

async fn run_worker(engine: EngineProcess, mut jobs: mpsc::Receiver<Job>, failed: Arc<AtomicBool>) {
    let mut engine = Some(engine);

    while let Some(job) = jobs.recv().await {
        match job {
            Job::Play { request, reply } => {
                let result = match engine.as_mut() {
                    Some(handle) => run_cycle(handle, &request).await,
                    None => Err(EngineError::Terminated),
                };

                if let Err(e) = &result {
                    if e.is_fatal() && engine.is_some() {
                        error!("Engine failed, refusing further moves: {}", e);
                        failed.store(true, Ordering::SeqCst);
                        engine = None;
                    }
                }

                if reply.send(result).is_err() {
                    debug!("Move caller went away before the engine answered");
                }
            }
            Job::Shutdown { done } => {
                if let Some(handle) = engine.take() {
                    handle.shutdown().await;
                }
                let _ = done.send(());
                break;
            }
        }
    }

    if let Some(handle) = engine {
        handle.shutdown().await;
    }
    info!("Move bridge worker stopped");
}

/// One send-then-drain cycle. Non-terminal lines are discarded; an empty line
/// is treated like end of stream.
async fn run_cycle(
    engine: &mut EngineProcess,
    request: &MoveRequest,
) -> Result<MoveResult, EngineError> {
    engine
        .send_line(&EngineCommand::new(request).to_string())
        .await?;

    loop {
        let line = match engine.read_line().await? {
            Some(line) if !line.is_empty() => line,
            Some(_) => {
                warn!("Engine printed an empty line before its move");
                return Err(EngineError::Terminated);
            }
            None => return Err(EngineError::Terminated),
        };

        if let Some(best_move) = parse_bestmove(&line)? {
            return Ok(MoveResult {
                best_move: best_move.to_string(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::{StubEngine, StubReply};
    use std::time::Duration;

    fn request(position: &str) -> MoveRequest {
        MoveRequest {
            position: position.to_string(),
            moves: "a1a2".to_string(),
            black_time: 300,
            white_time: 300,
            black_inc: 5,
            white_inc: 5,
        }
    }

    async fn ready(stub: StubEngine) -> MoveBridge {
        let mut engine = stub.spawn();
        engine.handshake().await.unwrap();
        MoveBridge::spawn(engine).unwrap()
    }

    #[tokio::test]
    async fn play_returns_second_token_of_bestmove() {
        let stub = StubEngine::bestmove("e2e4").with_chatter(&["info depth 1", "info depth 2"]);
        let transcript = stub.transcript();
        let bridge = ready(stub).await;

        let result = bridge.play(request("startpos")).await.unwrap();
        assert_eq!(result.best_move, "e2e4");
        assert_eq!(bridge.state(), EngineState::Ready);

        let lines = transcript.lock().unwrap().clone();
        assert_eq!(
            lines,
            vec![
                "uci",
                "position startpos moves a1a2",
                "go btime 300 wtime 300 binc 5 winc 5",
            ]
        );
    }

    #[tokio::test]
    async fn chatter_is_drained_before_next_request() {
        let stub = StubEngine::new(StubReply::EchoPosition).with_chatter(&["info nodes 10"]);
        let bridge = ready(stub).await;

        for position in ["p1", "p2", "p3"] {
            let result = bridge.play(request(position)).await.unwrap();
            assert_eq!(result.best_move, position);
        }
    }

    #[tokio::test]
    async fn spawn_rejects_engine_without_handshake() {
        let engine = StubEngine::bestmove("e2e4").spawn();
        assert!(matches!(
            MoveBridge::spawn(engine),
            Err(EngineError::NotReady)
        ));
    }

    #[tokio::test]
    async fn concurrent_plays_never_interleave() {
        let stub = StubEngine::new(StubReply::EchoPosition)
            .with_delay(Duration::from_millis(30))
            .with_chatter(&["info depth 1"]);
        let transcript = stub.transcript();
        let bridge = ready(stub).await;

        let handles: Vec<_> = (0..6)
            .map(|i| {
                let bridge = bridge.clone();
                tokio::spawn(async move {
                    let position = format!("pos{}", i);
                    let result = bridge.play(request(&position)).await.unwrap();
                    (position, result.best_move)
                })
            })
            .collect();

        for handle in handles {
            let (position, best_move) = handle.await.unwrap();
            assert_eq!(position, best_move);
        }

        let lines = transcript.lock().unwrap().clone();
        assert_eq!(lines[0], "uci");
        let commands = &lines[1..];
        assert_eq!(commands.len(), 12);
        for pair in commands.chunks(2) {
            assert!(pair[0].starts_with("position "), "got {:?}", pair);
            assert!(pair[1].starts_with("go "), "got {:?}", pair);
        }
    }

    #[tokio::test]
    async fn hangup_is_reported_and_engine_marked_failed() {
        let bridge = ready(StubEngine::new(StubReply::HangUp)).await;

        let err = bridge.play(request("startpos")).await.unwrap_err();
        assert!(matches!(err, EngineError::Terminated));
        assert_eq!(bridge.state(), EngineState::Failed);

        // Failed is terminal
        let err = bridge.play(request("startpos")).await.unwrap_err();
        assert!(matches!(err, EngineError::Terminated));
    }

    #[tokio::test]
    async fn blank_line_counts_as_termination() {
        let bridge = ready(StubEngine::new(StubReply::BlankLine)).await;
        let err = bridge.play(request("startpos")).await.unwrap_err();
        assert!(matches!(err, EngineError::Terminated));
        assert_eq!(bridge.state(), EngineState::Failed);
    }

    #[tokio::test]
    async fn terminal_line_without_move_is_malformed_but_not_fatal() {
        let stub = StubEngine::new(StubReply::MissingMove).with_chatter(&["info depth 1"]);
        let transcript = stub.transcript();
        let bridge = ready(stub).await;

        let result = tokio::time::timeout(Duration::from_secs(5), bridge.play(request("p1")))
            .await
            .expect("bridge waited past a terminal line");
        assert!(matches!(result, Err(EngineError::MalformedReply(_))));
        assert_eq!(bridge.state(), EngineState::Ready);

        // The cycle ended cleanly, so the next request reaches the engine
        let result = tokio::time::timeout(Duration::from_secs(5), bridge.play(request("p2")))
            .await
            .expect("bridge waited past a terminal line");
        assert!(matches!(result, Err(EngineError::MalformedReply(_))));
        let lines = transcript.lock().unwrap().clone();
        assert_eq!(lines.iter().filter(|l| l.starts_with("go ")).count(), 2);
    }

    #[tokio::test]
    async fn cancelled_caller_does_not_leak_reply_to_next_caller() {
        let stub = StubEngine::new(StubReply::EchoPosition).with_delay(Duration::from_millis(50));
        let transcript = stub.transcript();
        let bridge = ready(stub).await;

        let abandoned = bridge.clone();
        let first = tokio::spawn(async move { abandoned.play(request("first")).await });
        StubEngine::wait_for_line(&transcript, "go ").await;
        first.abort();

        let result = bridge.play(request("second")).await.unwrap();
        assert_eq!(result.best_move, "second");
    }

    #[tokio::test]
    async fn shutdown_sends_quit_and_closes_queue() {
        let stub = StubEngine::bestmove("e2e4");
        let transcript = stub.transcript();
        let bridge = ready(stub).await;

        bridge.shutdown().await;
        tokio::time::timeout(
            Duration::from_secs(5),
            StubEngine::wait_for_line(&transcript, "quit"),
        )
        .await
        .expect("engine never received quit");

        let err = bridge.play(request("startpos")).await.unwrap_err();
        assert!(matches!(err, EngineError::Terminated));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn drives_a_real_child_process() {
        let script = r#"read cmd; echo uciok; while read line; do case "$line" in go*) echo "info depth 1"; echo "bestmove j0j1";; quit) exit 0;; esac; done"#;
        let mut engine =
            EngineProcess::spawn("sh", &["-c".to_string(), script.to_string()]).unwrap();
        engine.handshake().await.unwrap();
        let bridge = MoveBridge::spawn(engine).unwrap();

        let result = bridge.play(request("startpos")).await.unwrap();
        assert_eq!(result.best_move, "j0j1");
        bridge.shutdown().await;
    }
}
