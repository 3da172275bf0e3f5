//! # Parser Events
//!
//! The parser does not build the tree directly. It emits a flat sequence of
//! events which the [`Sink`](super::sink::Sink) replays into a Rowan tree:
//!
//! ```text
//! Start(HEADLINE)
//!   Start(STARS) Token(STAR) Finish
//!   Token(WHITESPACE)
//!   Start(ITEM) Token(WORD) Finish
//!   Token(NEWLINE)
//! Finish
//! ```

use crate::syntax_kind::SyntaxKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// Begin a new composite node.
    Start { kind: SyntaxKind },

    /// Add a token to the current node.
    ///
    /// `n_raw_tokens` lexer tokens are glued together into one token of
    /// `kind`. A timestamp or property value can span a whole line, so this
    /// is not limited to a handful of tokens.
    Token { kind: SyntaxKind, n_raw_tokens: u32 },

    /// Finish the current node.
    Finish,

    /// Reserved slot left by `Parser::start`, replaced on completion and
    /// ignored by the sink when abandoned.
    Placeholder,
}

impl Event {
    pub fn start(kind: SyntaxKind) -> Self {
        Event::Start { kind }
    }

    /// Create a token event for a single raw token.
    pub fn token(kind: SyntaxKind) -> Self {
        Event::Token {
            kind,
            n_raw_tokens: 1,
        }
    }
}
