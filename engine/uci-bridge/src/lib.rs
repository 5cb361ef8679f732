//! Client side of the line-oriented engine protocol used by the web GUI.
//!
//! The crate is split into three layers:
//!
//! 1. [`EngineProcess`]: owns the engine's stdin/stdout, performs the
//!    `uci`/`uciok` handshake and exposes line-level I/O
//! 2. [`EngineCommand`] and [`parse_bestmove`]: the text of one move
//!    request and the terminal reply line that ends it
//! 3. [`MoveBridge`]: a single worker task that owns the engine and runs
//!    one send-then-drain cycle at a time for any number of callers
//!
//! # Usage
//!
//! ```rust,ignore
//! use uci_bridge::{EngineProcess, MoveBridge, MoveRequest};
//!
//! let mut engine = EngineProcess::spawn("../player/leiserchess", &[])?;
//! engine.handshake().await?;
//!
//! let bridge = MoveBridge::spawn(engine)?;
//! let result = bridge
//!     .play(MoveRequest {
//!         position: "startpos".into(),
//!         moves: String::new(),
//!         black_time: 60_000,
//!         white_time: 60_000,
//!         black_inc: 1_000,
//!         white_inc: 1_000,
//!     })
//!     .await?;
//! println!("engine plays {}", result.best_move);
//! ```

mod bridge;
mod command;
mod error;
mod process;
#[cfg(any(test, feature = "stub"))]
pub mod stub;

pub use bridge::{EngineState, MoveBridge, DEFAULT_QUEUE_DEPTH};
pub use command::{parse_bestmove, EngineCommand, MoveRequest, MoveResult, BESTMOVE_TOKEN};
pub use error::EngineError;
pub use process::{EngineProcess, HANDSHAKE_COMMAND, READY_TOKEN};
