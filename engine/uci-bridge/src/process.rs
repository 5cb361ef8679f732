//! Engine process handle.
//!
//! Owns the two byte streams connected to the engine and nothing else. All
//! higher-level protocol (what to send, when to stop reading) lives in the
//! bridge; this module only knows the startup handshake.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use crate::error::EngineError;

/// Command that starts the handshake.
pub const HANDSHAKE_COMMAND: &str = "uci";

/// Line the engine prints once it accepts commands.
pub const READY_TOKEN: &str = "uciok";

/// How long [`EngineProcess::shutdown`] waits for the child after `quit`.
const QUIT_GRACE: Duration = Duration::from_secs(2);

type EngineReader = BufReader<Box<dyn AsyncRead + Send + Unpin>>;
type EngineWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// The external engine: its command stream, its reply stream and whether the
/// handshake has completed.
pub struct EngineProcess {
    reader: EngineReader,
    writer: EngineWriter,
    /// Present when the streams belong to a spawned child
    child: Option<Child>,
    ready: bool,
}

impl EngineProcess {
    /// Launch the engine executable with stdin and stdout piped.
    ///
    /// The child is killed if the handle is dropped without [`shutdown`].
    ///
    /// [`shutdown`]: EngineProcess::shutdown
    pub fn spawn(path: impl AsRef<Path>, args: &[String]) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let spawn_error = |source| EngineError::Spawn {
            path: path.to_path_buf(),
            source,
        };

        let mut child = Command::new(path)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_error(std::io::Error::other("engine stdin was not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_error(std::io::Error::other("engine stdout was not captured")))?;

        info!(path = %path.display(), pid = ?child.id(), "Engine process started");

        let mut engine = Self::from_streams(stdout, stdin);
        engine.child = Some(child);
        Ok(engine)
    }

    /// Wrap arbitrary streams as an engine. `reader` carries engine output,
    /// `writer` carries engine input.
    pub fn from_streams<R, W>(reader: R, writer: W) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            reader: BufReader::new(Box::new(reader)),
            writer: Box::new(writer),
            child: None,
            ready: false,
        }
    }

    /// Send `uci` and wait for `uciok`. Lines before it (`id`, `option`) are
    /// ignored. There is no timeout: an engine that never answers blocks here.
    pub async fn handshake(&mut self) -> Result<(), EngineError> {
        self.write_line(HANDSHAKE_COMMAND).await?;
        loop {
            match self.read_line().await? {
                Some(line) if line == READY_TOKEN => break,
                Some(_) => continue,
                None => return Err(EngineError::HandshakeFailed),
            }
        }
        self.ready = true;
        info!("Engine handshake complete");
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Write `text` plus a newline and flush.
    pub async fn send_line(&mut self, text: &str) -> Result<(), EngineError> {
        if !self.ready {
            return Err(EngineError::NotReady);
        }
        self.write_line(text).await
    }

    /// Read one line of engine output with surrounding whitespace removed.
    /// Returns `None` at end of stream.
    pub async fn read_line(&mut self) -> Result<Option<String>, EngineError> {
        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            debug!("Engine output closed");
            return Ok(None);
        }
        let line = line.trim().to_string();
        debug!(line = %line, "engine >");
        Ok(Some(line))
    }

    /// Ask the engine to exit and reap the child. Best effort: write errors
    /// are ignored and a child that ignores `quit` is killed.
    pub async fn shutdown(mut self) {
        if self.ready {
            if let Err(e) = self.write_line("quit").await {
                debug!("Could not send quit to engine: {}", e);
            }
        }
        drop(self.writer);

        if let Some(mut child) = self.child.take() {
            match tokio::time::timeout(QUIT_GRACE, child.wait()).await {
                Ok(Ok(status)) => info!(%status, "Engine process exited"),
                Ok(Err(e)) => warn!("Failed to wait for engine process: {}", e),
                Err(_) => {
                    warn!("Engine ignored quit, killing it");
                    if let Err(e) = child.kill().await {
                        warn!("Failed to kill engine process: {}", e);
                    }
                }
            }
        }
    }

    async fn write_line(&mut self, text: &str) -> Result<(), EngineError> {
        debug!(command = %text, "engine <");
        let mut buf = String::with_capacity(text.len() + 1);
        buf.push_str(text);
        buf.push('\n');
        self.writer.write_all(buf.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}
