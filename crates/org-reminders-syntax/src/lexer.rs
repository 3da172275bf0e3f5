//! # Lexer - Tokenizing Org Source
//!
//! First stage of parsing: break the source into a flat run of tokens using
//! the [Logos] lexer generator.
//!
//! [Logos]: https://docs.rs/logos
//!
//! Every byte of the input ends up in exactly one token, so concatenating the
//! token texts reproduces the input:
//!
//! ```
//! use org_reminders_syntax::lexer::lex;
//!
//! let input = "* TODO Work :home:\n";
//! let reconstructed: String = lex(input).iter().map(|t| t.text).collect();
//! assert_eq!(input, reconstructed);
//! ```
//!
//! Tokens are context-free. The lexer does not know whether `*` opens a
//! headline or sits in the middle of a sentence, or whether `:` belongs to a
//! tag list, a property drawer or a clock time. The grammar decides that and
//! glues raw tokens into composite ones (`WORD`, `TAG`, `TIMESTAMP`, ...).

use logos::Logos;

use crate::syntax_kind::SyntaxKind;

/// Token kinds produced by the Logos lexer.
///
/// The `#[logos(skip r"")]` attribute means "skip nothing" - all input is
/// handled explicitly.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"")]
pub enum TokenKind {
    /// Horizontal whitespace (spaces, tabs)
    #[regex(r"[ \t]+")]
    Whitespace,

    /// Line ending (LF or CRLF)
    #[regex(r"\r?\n")]
    Newline,

    /// `*` for headline stars
    #[token("*")]
    Star,

    /// `:` for tags, drawers and plan keys
    #[token(":")]
    Colon,

    /// `[` for priority cookies, statistics and inactive timestamps
    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    /// `<` for active timestamps
    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    /// `#` inside priority cookies
    #[token("#")]
    Hash,

    /// Plain text - anything not matched by other rules
    #[regex(r"[^\s\[\]<>:*#]+")]
    Text,
}

impl TokenKind {
    /// Convert to SyntaxKind.
    pub fn to_syntax_kind(self) -> SyntaxKind {
        match self {
            TokenKind::Whitespace => SyntaxKind::WHITESPACE,
            TokenKind::Newline => SyntaxKind::NEWLINE,
            TokenKind::Star => SyntaxKind::STAR,
            TokenKind::Colon => SyntaxKind::COLON,
            TokenKind::LBracket => SyntaxKind::LBRACKET,
            TokenKind::RBracket => SyntaxKind::RBRACKET,
            TokenKind::LAngle => SyntaxKind::LANGLE,
            TokenKind::RAngle => SyntaxKind::RANGLE,
            TokenKind::Hash => SyntaxKind::HASH,
            TokenKind::Text => SyntaxKind::TEXT,
        }
    }
}

/// A lexed token with its kind and text slice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub text: &'a str,
}

/// Lex the input into a sequence of tokens.
///
/// Guarantees that all bytes from the input appear in the output tokens.
pub fn lex(input: &str) -> Vec<Token<'_>> {
    let mut tokens = Vec::new();
    let mut lexer = TokenKind::lexer(input);

    while let Some(result) = lexer.next() {
        let text = lexer.slice();
        let kind = match result {
            Ok(token_kind) => token_kind.to_syntax_kind(),
            // Unrecognized input (a lone `\r`, unicode spaces) stays as text
            Err(()) => SyntaxKind::TEXT,
        };
        tokens.push(Token { kind, text });
    }

    tokens
}
