//! In-memory stand-in for the engine executable.
//!
//! Speaks just enough of the protocol for bridge and server tests, and keeps
//! a transcript of every line it was sent.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::io::{duplex, AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream};

use crate::process::{EngineProcess, HANDSHAKE_COMMAND, READY_TOKEN};

/// Every line the stub received, in order.
pub type Transcript = Arc<Mutex<Vec<String>>>;

/// How the stub answers a `go` command.
#[derive(Debug, Clone)]
pub enum StubReply {
    /// Always play this move
    Fixed(String),
    /// Play the position token of the preceding `position` line, so
    /// concurrent callers can tell their replies apart
    EchoPosition,
    /// Close the output stream without answering
    HangUp,
    /// Print an empty line instead of a move
    BlankLine,
    /// Print a terminal line that carries no move
    MissingMove,
}

pub struct StubEngine {
    reply: StubReply,
    delay: Duration,
    chatter: Vec<String>,
    handshake: bool,
    transcript: Transcript,
}

impl StubEngine {
    pub fn new(reply: StubReply) -> Self {
        Self {
            reply,
            delay: Duration::ZERO,
            chatter: Vec::new(),
            handshake: true,
            transcript: Transcript::default(),
        }
    }

    pub fn bestmove(mv: &str) -> Self {
        Self::new(StubReply::Fixed(mv.to_string()))
    }

    /// Wait this long after `go` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Lines printed after `go` and before the reply.
    pub fn with_chatter(mut self, lines: &[&str]) -> Self {
        self.chatter = lines.iter().map(|l| l.to_string()).collect();
        self
    }

    /// Close the output on `uci` instead of answering `uciok`.
    pub fn without_handshake(mut self) -> Self {
        self.handshake = false;
        self
    }

    pub fn transcript(&self) -> Transcript {
        Arc::clone(&self.transcript)
    }

    /// Wait until the stub has received a line starting with `prefix`.
    pub async fn wait_for_line(transcript: &Transcript, prefix: &str) {
        loop {
            let seen = transcript
                .lock()
                .expect("transcript poisoned")
                .iter()
                .any(|line| line.starts_with(prefix));
            if seen {
                return;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Start the stub on a background task and return a handle connected to
    /// it. The handshake has not been performed yet.
    pub fn spawn(self) -> EngineProcess {
        let (engine_in, stub_in) = duplex(64 * 1024);
        let (stub_out, engine_out) = duplex(64 * 1024);
        tokio::spawn(self.run(stub_in, stub_out));
        EngineProcess::from_streams(engine_out, engine_in)
    }

    async fn run(self, input: DuplexStream, mut output: DuplexStream) {
        let mut lines = BufReader::new(input).lines();
        let mut position = String::new();

        while let Ok(Some(line)) = lines.next_line().await {
            self.transcript
                .lock()
                .expect("transcript poisoned")
                .push(line.clone());

            let mut out = String::new();
            if line == HANDSHAKE_COMMAND {
                if !self.handshake {
                    return;
                }
                out.push_str("id name stub\n");
                out.push_str(READY_TOKEN);
                out.push('\n');
            } else if line.starts_with("position ") {
                position = line.split_whitespace().nth(1).unwrap_or_default().to_string();
            } else if line.starts_with("go") {
                if !self.delay.is_zero() {
                    tokio::time::sleep(self.delay).await;
                }
                for chatter in &self.chatter {
                    out.push_str(chatter);
                    out.push('\n');
                }
                match &self.reply {
                    StubReply::Fixed(mv) => out.push_str(&format!("bestmove {}\n", mv)),
                    StubReply::EchoPosition => out.push_str(&format!("bestmove {}\n", position)),
                    StubReply::BlankLine => out.push('\n'),
                    StubReply::MissingMove => out.push_str("bestmove \n"),
                    StubReply::HangUp => {
                        let _ = output.write_all(out.as_bytes()).await;
                        return;
                    }
                }
            } else if line == "quit" {
                return;
            }

            if !out.is_empty() && output.write_all(out.as_bytes()).await.is_err() {
                return;
            }
        }
    }
}
