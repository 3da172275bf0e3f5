//! Headline line: `STARS ITEM TAG_LIST? NEWLINE`.
//!
//! The item is kept as a run of `WORD` tokens. Recognising the TODO keyword,
//! the priority cookie and the statistics cookie is left to consumers, which
//! only need to look at the first and last words.

use crate::parser::Parser;
use crate::syntax_kind::SyntaxKind;

/// A word on the headline line, as token offsets from the line cursor.
struct Word {
    start: usize,
    len: usize,
}

pub(super) fn headline(p: &mut Parser<'_, '_>) {
    let m = p.start();

    let stars = p.start();
    while p.at(SyntaxKind::STAR) {
        p.bump();
    }
    stars.complete(p, SyntaxKind::STARS);

    let words = scan_words(p);
    let tag_list = words
        .last()
        .filter(|w| is_tag_word(&word_text(p, w)))
        .map(|w| (w.start, w.len));
    let item_words = &words[..words.len() - usize::from(tag_list.is_some())];

    // Offsets in `words` are relative to where the scan started.
    let mut cursor = 0;
    if let Some(first) = item_words.first() {
        cursor = bump_whitespace_to(p, cursor, first.start);
        let item = p.start();
        for word in item_words {
            cursor = bump_whitespace_to(p, cursor, word.start);
            p.bump_n(word.len, SyntaxKind::WORD);
            cursor += word.len;
        }
        item.complete(p, SyntaxKind::ITEM);
    }

    if let Some((start, len)) = tag_list {
        bump_whitespace_to(p, cursor, start);
        tags(p, len);
    }

    while p.at(SyntaxKind::WHITESPACE) {
        p.bump();
    }
    p.eat(SyntaxKind::NEWLINE);

    m.complete(p, SyntaxKind::HEADLINE);
}

fn scan_words(p: &Parser<'_, '_>) -> Vec<Word> {
    let end = p.line_len();
    let mut words = Vec::new();
    let mut i = 0;
    while i < end {
        if p.nth(i) == SyntaxKind::WHITESPACE {
            i += 1;
            continue;
        }
        let start = i;
        while i < end && p.nth(i) != SyntaxKind::WHITESPACE {
            i += 1;
        }
        words.push(Word {
            start,
            len: i - start,
        });
    }
    words
}

fn word_text(p: &Parser<'_, '_>, word: &Word) -> String {
    (word.start..word.start + word.len)
        .map(|n| p.nth_text(n))
        .collect()
}

fn bump_whitespace_to(p: &mut Parser<'_, '_>, mut cursor: usize, target: usize) -> usize {
    while cursor < target {
        p.bump();
        cursor += 1;
    }
    cursor
}

/// `:tag:other:` with non-empty names between the colons.
fn is_tag_word(text: &str) -> bool {
    let Some(inner) = text
        .strip_prefix(':')
        .and_then(|rest| rest.strip_suffix(':'))
    else {
        return false;
    };
    !inner.is_empty() && inner.split(':').all(|tag| !tag.is_empty())
}

/// TAG_LIST over the next `len` raw tokens: colons stay single tokens, the
/// runs between them become `TAG`s.
fn tags(p: &mut Parser<'_, '_>, len: usize) {
    let m = p.start();
    let mut consumed = 0;
    while consumed < len {
        if p.at(SyntaxKind::COLON) {
            p.bump();
            consumed += 1;
            continue;
        }
        let mut n = 0;
        while consumed + n < len && p.nth(n) != SyntaxKind::COLON {
            n += 1;
        }
        p.bump_n(n, SyntaxKind::TAG);
        consumed += n;
    }
    m.complete(p, SyntaxKind::TAG_LIST);
}
