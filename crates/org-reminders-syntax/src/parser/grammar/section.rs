//! Sections and the blocks a headline owns: planning line, property drawer
//! and free body text.

use super::headline::headline;
use super::{bump_line, headline_level, trimmed_len};
use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

const PLAN_KEYWORDS: [&str; 3] = ["SCHEDULED", "CLOSED", "DEADLINE"];

/// A headline and everything up to the next headline of the same or a
/// shallower level. Deeper headlines become nested sections.
pub(super) fn section(p: &mut Parser<'_, '_>) {
    let level = headline_level(p).unwrap_or(0);
    let m = p.start();

    headline(p);

    if at_plan_line(p) {
        plan(p);
    }
    if at_drawer_start(p) {
        property_drawer(p);
    }
    if !p.at_end() && headline_level(p).is_none() {
        body(p);
    }
    while headline_level(p).is_some_and(|child| child > level) {
        section(p);
    }

    m.complete(p, SyntaxKind::SECTION);
}

/// Lines up to the next headline.
pub(super) fn body(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while !p.at_end() && headline_level(p).is_none() {
        bump_line(p);
    }
    m.complete(p, SyntaxKind::BODY);
}

/// Offset of the first non-whitespace token on the current line.
fn indent(p: &Parser<'_, '_>) -> usize {
    usize::from(p.at(SyntaxKind::WHITESPACE))
}

fn at_plan_key(p: &Parser<'_, '_>, offset: usize) -> bool {
    p.nth(offset) == SyntaxKind::TEXT
        && PLAN_KEYWORDS.contains(&p.nth_text(offset))
        && p.nth(offset + 1) == SyntaxKind::COLON
}

fn at_plan_line(p: &Parser<'_, '_>) -> bool {
    p.at_line_start() && at_plan_key(p, indent(p))
}

/// Consecutive planning lines directly below the headline.
fn plan(p: &mut Parser<'_, '_>) {
    let m = p.start();
    while at_plan_line(p) {
        plan_line(p);
    }
    m.complete(p, SyntaxKind::PLAN);
}

fn plan_line(p: &mut Parser<'_, '_>) {
    while !p.at_end() && !p.at(SyntaxKind::NEWLINE) {
        if at_plan_key(p, 0) {
            plan_entry(p);
        } else {
            p.bump();
        }
    }
    p.eat(SyntaxKind::NEWLINE);
}

/// `KEY: value`, where the value is a bracketed timestamp or, failing that,
/// everything up to the next key on the line.
fn plan_entry(p: &mut Parser<'_, '_>) {
    let m = p.start();
    p.bump_n(1, SyntaxKind::PLAN_KEY);
    p.bump();
    p.eat(SyntaxKind::WHITESPACE);

    let line = p.line_len();
    let close = match p.current() {
        SyntaxKind::LANGLE => Some(SyntaxKind::RANGLE),
        SyntaxKind::LBRACKET => Some(SyntaxKind::RBRACKET),
        _ => None,
    };
    let stop = match close.and_then(|c| (1..line).find(|&n| p.nth(n) == c)) {
        Some(end) => end + 1,
        None => (0..line).find(|&n| at_plan_key(p, n)).unwrap_or(line),
    };
    let len = trimmed_len(p, 0, stop);
    p.bump_n(len, SyntaxKind::TIMESTAMP);

    m.complete(p, SyntaxKind::PLAN_ENTRY);
}

fn at_drawer_start(p: &Parser<'_, '_>) -> bool {
    if !p.at_line_start() {
        return false;
    }
    let i = indent(p);
    p.nth(i) == SyntaxKind::COLON
        && p.nth(i + 1) == SyntaxKind::TEXT
        && p.nth_text(i + 1).eq_ignore_ascii_case("PROPERTIES")
        && p.nth(i + 2) == SyntaxKind::COLON
}

fn at_drawer_end(p: &Parser<'_, '_>) -> bool {
    let i = indent(p);
    p.nth(i) == SyntaxKind::COLON
        && p.nth(i + 1) == SyntaxKind::TEXT
        && p.nth_text(i + 1).eq_ignore_ascii_case("END")
        && p.nth(i + 2) == SyntaxKind::COLON
}

/// Length of the `:NAME:` prefix of a property line, counted from the
/// opening colon, if the current line is one.
fn property_name_len(p: &Parser<'_, '_>) -> Option<usize> {
    let i = indent(p);
    if p.nth(i) != SyntaxKind::COLON {
        return None;
    }
    let mut n = i + 1;
    while !matches!(
        p.nth(n),
        SyntaxKind::COLON | SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE | SyntaxKind::EOF
    ) {
        n += 1;
    }
    (n > i + 1 && p.nth(n) == SyntaxKind::COLON).then_some(n - i - 1)
}

/// `:PROPERTIES:` followed by property lines up to `:END:`. A missing
/// `:END:` closes the drawer at the first line that is not a property.
fn property_drawer(p: &mut Parser<'_, '_>) {
    let m = p.start();
    bump_line(p);
    while !p.at_end() && headline_level(p).is_none() {
        if at_drawer_end(p) {
            bump_line(p);
            break;
        }
        match property_name_len(p) {
            Some(name_len) => property(p, name_len),
            None => break,
        }
    }
    m.complete(p, SyntaxKind::PROPERTY_DRAWER);
}

fn property(p: &mut Parser<'_, '_>, name_len: usize) {
    let m = p.start();
    p.eat(SyntaxKind::WHITESPACE);
    p.bump();
    p.bump_n(name_len, SyntaxKind::PROPERTY_NAME);
    p.bump();
    p.eat(SyntaxKind::WHITESPACE);

    let len = trimmed_len(p, 0, p.line_len());
    p.bump_n(len, SyntaxKind::PROPERTY_VALUE);
    bump_line(p);

    m.complete(p, SyntaxKind::PROPERTY);
}
