//! Error types shared by the engines and searches.

use thiserror::Error;

use crate::nn::OracleError;

/// Failure to read a board or move from its text form.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected {expected} characters, found {found}")]
    Length { expected: usize, found: usize },

    #[error("invalid cell symbol '{symbol}' at position {position}")]
    Cell { symbol: char, position: usize },

    #[error("invalid player digit '{0}'")]
    Player(char),

    #[error("invalid counter field '{0}'")]
    Counter(String),

    #[error("invalid move text '{0}'")]
    Move(String),

    #[error("inconsistent board: {0}")]
    Board(String),
}

/// Contract violations raised by searches and move sources.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no legal moves in a non-terminal position")]
    NoLegalMoves,

    #[error("the game is already over")]
    GameOver,

    #[error("move with action index {0} is not legal in this position")]
    IllegalMove(usize),

    #[error("search tree has no root children")]
    EmptyTree,

    #[error("oracle error: {0}")]
    Oracle(#[from] OracleError),
}
