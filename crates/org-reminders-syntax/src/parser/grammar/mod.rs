//! # Grammar Rules
//!
//! Each function takes a `&mut Parser`, inspects tokens, consumes them and
//! builds nodes through markers.
//!
//! The outline grammar is line oriented:
//!
//! ```text
//! ROOT    = BODY? SECTION*
//! SECTION = HEADLINE PLAN? PROPERTY_DRAWER? BODY? SECTION*   (deeper levels only)
//! ```
//!
//! Grammar rules never fail. Anything that does not fit a more specific rule
//! ends up in a BODY node, so every byte of input lands in the tree.

mod headline;
mod section;

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// Parse the root document.
pub fn root(p: &mut Parser<'_, '_>) {
    let m = p.start();

    if !p.at_end() && headline_level(p).is_none() {
        section::body(p);
    }

    while !p.at_end() {
        section::section(p);
    }

    m.complete(p, SyntaxKind::ROOT);
}

/// Level of the headline starting at the current position, if any.
///
/// A headline is one or more `*` at the start of a line followed by
/// horizontal whitespace.
pub(crate) fn headline_level(p: &Parser<'_, '_>) -> Option<usize> {
    if !p.at_line_start() {
        return None;
    }
    let mut n = 0;
    while p.nth(n) == SyntaxKind::STAR {
        n += 1;
    }
    (n > 0 && p.nth(n) == SyntaxKind::WHITESPACE).then_some(n)
}

/// Same rule as [`headline_level`] applied to raw text at a line start.
pub(crate) fn headline_level_of(text: &str) -> Option<usize> {
    let stars = text.bytes().take_while(|b| *b == b'*').count();
    let next = text.as_bytes().get(stars);
    (stars > 0 && matches!(next, Some(b' ' | b'\t'))).then_some(stars)
}

/// Consume the rest of the current line including its newline.
fn bump_line(p: &mut Parser<'_, '_>) {
    while !p.at_end() && !p.at(SyntaxKind::NEWLINE) {
        p.bump();
    }
    p.eat(SyntaxKind::NEWLINE);
}

/// Number of tokens from `offset` to the first token of `stop`, not
/// counting trailing whitespace, on the current line.
fn trimmed_len(p: &Parser<'_, '_>, offset: usize, stop: usize) -> usize {
    let mut end = stop;
    while end > offset && p.nth(end - 1) == SyntaxKind::WHITESPACE {
        end -= 1;
    }
    end - offset
}
