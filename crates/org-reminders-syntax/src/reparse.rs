//! Incremental reparsing.
//!
//! Edits coming from sync mostly touch one section at a time, often near the
//! end of the file. Top-level children of the previous tree whose text is an
//! unchanged prefix of the new text are reused as green subtrees and only the
//! tail is lexed and parsed again.

use rowan::{GreenNode, NodeOrToken};

use crate::parser::{headline_level_of, parse, parse_green};
use crate::syntax_kind::{SyntaxKind, SyntaxNode};

/// Reparse `text` reusing what it can from `previous`.
///
/// The result is always structurally equal to `parse(text)`.
pub fn reparse(previous: &SyntaxNode, text: &str) -> SyntaxNode {
    let previous_len = usize::from(previous.text_range().len());
    if previous.kind() != SyntaxKind::ROOT || text.len() < previous_len {
        return parse(text);
    }

    let mut reused: Vec<SyntaxNode> = Vec::new();
    let mut offset = 0;
    for child in previous.children() {
        let end = offset + usize::from(child.text_range().len());
        match text.get(offset..end) {
            Some(slice) if child.text() == slice => {
                reused.push(child);
                offset = end;
            }
            _ => break,
        }
    }

    while let Some(last) = reused.last() {
        if tail_stands_alone(last, text, offset) {
            break;
        }
        offset -= usize::from(last.text_range().len());
        reused.pop();
    }

    log::trace!(
        "reparse reused {} top-level nodes, parsing {} trailing bytes",
        reused.len(),
        text.len() - offset
    );

    let tail = parse_green(&text[offset..]);
    let mut children: Vec<NodeOrToken<GreenNode, _>> = reused
        .iter()
        .map(|node| NodeOrToken::Node(node.green().into_owned()))
        .collect();
    children.extend(tail.children().map(|element| match element {
        NodeOrToken::Node(node) => NodeOrToken::Node(node.to_owned()),
        NodeOrToken::Token(token) => NodeOrToken::Token(token.to_owned()),
    }));

    SyntaxNode::new_root(GreenNode::new(SyntaxKind::ROOT.into(), children))
}

/// Whether a full parse would stop `last` at `offset` and start a new
/// top-level node there.
fn tail_stands_alone(last: &SyntaxNode, text: &str, offset: usize) -> bool {
    let rest = &text[offset..];
    if rest.is_empty() {
        return true;
    }
    if !text[..offset].ends_with('\n') {
        return false;
    }
    let Some(next) = headline_level_of(rest) else {
        return false;
    };
    match last.kind() {
        SyntaxKind::SECTION => section_level(last).is_some_and(|level| next <= level),
        _ => true,
    }
}

fn section_level(section: &SyntaxNode) -> Option<usize> {
    let headline = section
        .children()
        .find(|n| n.kind() == SyntaxKind::HEADLINE)?;
    let stars = headline
        .children()
        .find(|n| n.kind() == SyntaxKind::STARS)?;
    Some(usize::from(stars.text_range().len()))
}
