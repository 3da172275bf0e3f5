//! Org text for headlines.
//!
//! Every serialized headline starts with a newline:
//!
//! ```text
//! \n* Work [1/2]
//! \n** DONE [#A] Ship it :DELETED:
//! CLOSED: [2025-03-10 Mon 09:00]
//! SCHEDULED: <2025-03-09 Sun 17:00>
//! :PROPERTIES:
//! :EXTERNAL-ID: X1
//! :END:
//! notes
//! ```

use crate::models::{HeadlineId, Outline, keys};

/// The headline and all of its children.
pub fn serialize(outline: &Outline, id: HeadlineId) -> String {
    let mut out = serialize_own(outline, id);
    for child in outline.children(id) {
        out.push_str(&serialize(outline, *child));
    }
    out
}

/// The headline's own fields, without children.
///
/// Lists carry a `[done/total]` cookie derived from their children.
pub fn serialize_own(outline: &Outline, id: HeadlineId) -> String {
    let headline = &outline[id];
    let mut out = String::from("\n");

    out.push_str(if headline.level == 1 { "*" } else { "**" });
    if let Some(status) = headline.status {
        out.push(' ');
        out.push_str(status.keyword());
    }
    if let Some(priority) = headline.priority {
        out.push(' ');
        out.push_str(&priority.cookie());
    }
    out.push(' ');
    out.push_str(&headline.title);

    if headline.level == 1 {
        let (done, total) = outline.statistics(id);
        out.push_str(&format!(" [{done}/{total}]"));
    }
    if !headline.tags.is_empty() {
        out.push_str(&format!(" :{}:", headline.tags.join(":")));
    }

    if let Some(closed) = headline.plan(keys::CLOSED) {
        out.push_str(&format!("\n{}: {closed}", keys::CLOSED));
    }
    for (key, value) in headline.plans.iter().filter(|(k, _)| *k != keys::CLOSED) {
        out.push_str(&format!("\n{key}: {value}"));
    }

    if !headline.properties.is_empty() {
        out.push_str("\n:PROPERTIES:");
        for (key, value) in &headline.properties {
            out.push_str(&format!("\n:{key}: {value}"));
        }
        out.push_str("\n:END:");
    }

    if let Some(content) = &headline.content {
        out.push('\n');
        out.push_str(content);
    }

    out
}
