//! Building the headline [`Outline`] from an org syntax tree, and turning
//! headlines back into org text.
//!
//! Building never fails. A section missing an expected child yields a
//! headline with that field left at its default.

pub mod serialize;

use std::sync::LazyLock;

use org_reminders_syntax::{SyntaxKind, SyntaxNode, SyntaxToken};
use regex::Regex;

use crate::models::{Headline, HeadlineId, Outline, Priority, Status, SyntaxRef};

pub use serialize::{serialize, serialize_own};

/// Trailing `[done/total]` statistics cookie.
static STATISTICS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*\[\d+/\d+\]$").expect("statistics pattern is valid"));

/// Build the outline for `root`, a tree produced from the current text.
///
/// `generation` tags every headline's [`SyntaxRef`] so stale lookups can be
/// detected after the tree is replaced.
pub fn build_outline(root: &SyntaxNode, generation: u64) -> Outline {
    let mut outline = Outline::new();

    for section in children_of_kind(root, SyntaxKind::SECTION) {
        let list = push_section(&mut outline, None, &section, generation);
        for sub in children_of_kind(&section, SyntaxKind::SECTION) {
            push_section(&mut outline, Some(list), &sub, generation);
        }
    }

    outline
}

fn push_section(
    outline: &mut Outline,
    parent: Option<HeadlineId>,
    section: &SyntaxNode,
    generation: u64,
) -> HeadlineId {
    let headline = headline_from_section(section);
    let id = match parent {
        Some(parent) => outline.push_child(parent, headline),
        None => outline.push_root(headline),
    };
    outline.attach_syntax(
        id,
        SyntaxRef {
            generation,
            range: section.text_range(),
        },
    );
    id
}

/// Extract the own fields of one SECTION node.
pub fn headline_from_section(section: &SyntaxNode) -> Headline {
    let mut headline = Headline {
        level: 1,
        ..Headline::default()
    };

    if let Some(line) = child_of_kind(section, SyntaxKind::HEADLINE) {
        if let Some(stars) = child_of_kind(&line, SyntaxKind::STARS) {
            headline.level = usize::from(stars.text_range().len());
        }
        if let Some(item) = child_of_kind(&line, SyntaxKind::ITEM) {
            read_item(&mut headline, &item);
        }
        if let Some(tags) = child_of_kind(&line, SyntaxKind::TAG_LIST) {
            headline.tags = tokens_of_kind(&tags, SyntaxKind::TAG)
                .map(|t| t.text().to_string())
                .collect();
        }
    }

    if let Some(plan) = child_of_kind(section, SyntaxKind::PLAN) {
        for entry in children_of_kind(&plan, SyntaxKind::PLAN_ENTRY) {
            let key = tokens_of_kind(&entry, SyntaxKind::PLAN_KEY).next();
            let value = tokens_of_kind(&entry, SyntaxKind::TIMESTAMP).next();
            if let (Some(key), Some(value)) = (key, value) {
                headline
                    .plans
                    .insert(key.text().to_string(), value.text().to_string());
            }
        }
    }

    if let Some(drawer) = child_of_kind(section, SyntaxKind::PROPERTY_DRAWER) {
        for property in children_of_kind(&drawer, SyntaxKind::PROPERTY) {
            let Some(name) = tokens_of_kind(&property, SyntaxKind::PROPERTY_NAME).next() else {
                continue;
            };
            let value = tokens_of_kind(&property, SyntaxKind::PROPERTY_VALUE)
                .next()
                .map(|t| t.text().to_string())
                .unwrap_or_default();
            headline.properties.insert(name.text().to_string(), value);
        }
    }

    if let Some(body) = child_of_kind(section, SyntaxKind::BODY) {
        let text = body.text().to_string();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            headline.content = Some(trimmed.to_string());
        }
    }

    headline
}

/// Status keyword, priority cookie, then the rest of the words as title.
fn read_item(headline: &mut Headline, item: &SyntaxNode) {
    let words: Vec<SyntaxToken> = tokens_of_kind(item, SyntaxKind::WORD).collect();
    let mut rest = words.as_slice();

    if let Some((first, tail)) = rest.split_first()
        && let Some(status) = Status::from_keyword(first.text())
    {
        headline.status = Some(status);
        rest = tail;
    }
    if let Some((first, tail)) = rest.split_first()
        && let Some(priority) = Priority::from_cookie(first.text())
    {
        headline.priority = Some(priority);
        rest = tail;
    }

    let (Some(first), Some(last)) = (rest.first(), rest.last()) else {
        return;
    };
    let item_start = item.text_range().start();
    let start = usize::from(first.text_range().start() - item_start);
    let end = usize::from(last.text_range().end() - item_start);
    let text = item.text().to_string();
    headline.title = STATISTICS.replace(&text[start..end], "").into_owned();
}

fn child_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> Option<SyntaxNode> {
    node.children().find(|n| n.kind() == kind)
}

fn children_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxNode> {
    node.children().filter(move |n| n.kind() == kind)
}

fn tokens_of_kind(node: &SyntaxNode, kind: SyntaxKind) -> impl Iterator<Item = SyntaxToken> {
    node.children_with_tokens()
        .filter_map(|element| element.into_token())
        .filter(move |t| t.kind() == kind)
}
