//! Move request text and terminal reply parsing.

use std::fmt;

use crate::error::EngineError;

/// First token of the line that ends a move search.
pub const BESTMOVE_TOKEN: &str = "bestmove";

/// Everything the engine needs to pick a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Board position in the engine's own notation
    pub position: String,
    /// Space-delimited move history, possibly empty
    pub moves: String,
    pub black_time: u64,
    pub white_time: u64,
    pub black_inc: u64,
    pub white_inc: u64,
}

/// The move chosen by the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveResult {
    pub best_move: String,
}

/// The two-line command sent for one [`MoveRequest`].
///
/// `Display` renders both lines without the final newline, so the whole
/// command goes out in a single [`send_line`](crate::EngineProcess::send_line).
pub struct EngineCommand<'a> {
    request: &'a MoveRequest,
}

impl<'a> EngineCommand<'a> {
    pub fn new(request: &'a MoveRequest) -> Self {
        Self { request }
    }
}

impl fmt::Display for EngineCommand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.request;
        write!(
            f,
            "position {} moves {}\ngo btime {} wtime {} binc {} winc {}",
            r.position, r.moves, r.black_time, r.white_time, r.black_inc, r.white_inc
        )
    }
}

/// Extract the move from a terminal reply line.
///
/// Returns `Ok(None)` for lines that are not terminal (search info, debug
/// output) and an error for a terminal line with no move token.
pub fn parse_bestmove(line: &str) -> Result<Option<&str>, EngineError> {
    let mut tokens = line.split_whitespace();
    if tokens.next() != Some(BESTMOVE_TOKEN) {
        return Ok(None);
    }
    tokens
        .next()
        .map(Some)
        .ok_or_else(|| EngineError::MalformedReply(line.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> MoveRequest {
        MoveRequest {
            position: "startpos".into(),
            moves: "e2e4 e7e5".into(),
            black_time: 1200,
            white_time: 1100,
            black_inc: 20,
            white_inc: 10,
        }
    }

    #[test]
    fn command_has_position_then_go_line() {
        let text = EngineCommand::new(&request()).to_string();
        assert_eq!(
            text,
            "position startpos moves e2e4 e7e5\ngo btime 1200 wtime 1100 binc 20 winc 10"
        );
    }

    #[test]
    fn empty_history_keeps_moves_keyword() {
        let mut req = request();
        req.moves.clear();
        let text = EngineCommand::new(&req).to_string();
        assert!(text.starts_with("position startpos moves \ngo "));
    }

    #[test]
    fn bestmove_second_token_is_the_move() {
        assert_eq!(parse_bestmove("bestmove e2e4").unwrap(), Some("e2e4"));
        assert_eq!(
            parse_bestmove("bestmove j0j1 ponder a1a2").unwrap(),
            Some("j0j1")
        );
    }

    #[test]
    fn non_terminal_lines_are_skipped() {
        assert_eq!(parse_bestmove("info depth 5 score cp 12").unwrap(), None);
        assert_eq!(parse_bestmove("bestmoves e2e4").unwrap(), None);
        assert_eq!(parse_bestmove("info string bestmove e2e4").unwrap(), None);
    }

    #[test]
    fn terminal_line_without_move_is_malformed() {
        for line in ["bestmove", "bestmove   "] {
            let err = parse_bestmove(line).unwrap_err();
            assert!(matches!(err, EngineError::MalformedReply(_)), "{:?}", line);
        }
    }
}
