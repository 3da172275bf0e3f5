//! # org-reminders-syntax
//!
//! A lossless org outline syntax tree using [Rowan] + [Logos], following the
//! [rust-analyzer] architecture model.
//!
//! [Rowan]: https://docs.rs/rowan
//! [Logos]: https://docs.rs/logos
//! [rust-analyzer]: https://rust-analyzer.github.io/book/contributing/syntax.html
//!
//! The tree keeps every byte of the source, so a consumer can locate a
//! headline's exact byte range and splice new text into the file without
//! disturbing anything it does not own.
//!
//! ## Pipeline
//!
//! ```text
//! Source Text → Lexer → Tokens → Parser → Events → Sink → Rowan Tree
//!               (Logos)          (Grammar)        (GreenNodeBuilder)
//! ```
//!
//! ## Shape
//!
//! ```text
//! ROOT
//! ├── BODY                 text before the first headline
//! └── SECTION              "* Work" and everything it owns
//!     ├── HEADLINE         STARS ITEM TAG_LIST?
//!     ├── PLAN             SCHEDULED: / CLOSED: / DEADLINE: lines
//!     ├── PROPERTY_DRAWER  :PROPERTIES: ... :END:
//!     ├── BODY
//!     └── SECTION          "** TODO Buy milk", nested by level
//! ```
//!
//! ## Quick Start
//!
//! ```
//! use org_reminders_syntax::{parse, SyntaxKind};
//!
//! let tree = parse("* Work\n** TODO Ship it\n");
//!
//! assert_eq!(tree.text().to_string(), "* Work\n** TODO Ship it\n");
//! let section = tree.children().next().unwrap();
//! assert_eq!(section.kind(), SyntaxKind::SECTION);
//! ```

pub mod lexer;
pub mod parser;
pub mod reparse;
pub mod syntax_kind;

pub use parser::parse;
pub use reparse::reparse;
pub use syntax_kind::{OrgLang, SyntaxElement, SyntaxKind, SyntaxNode, SyntaxToken};

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_snapshot;
    use pretty_assertions::assert_eq;

    /// Format a syntax tree as `KIND@range` lines for snapshot testing.
    pub(crate) fn format_tree(node: &SyntaxNode, indent: usize) -> String {
        let mut result = String::new();
        let prefix = "  ".repeat(indent);

        result.push_str(&format!(
            "{}{:?}@{:?}\n",
            prefix,
            node.kind(),
            node.text_range()
        ));

        for child in node.children_with_tokens() {
            match child {
                rowan::NodeOrToken::Node(n) => {
                    result.push_str(&format_tree(&n, indent + 1));
                }
                rowan::NodeOrToken::Token(t) => {
                    let text = t.text().replace('\n', "\\n");
                    result.push_str(&format!(
                        "{}  {:?}@{:?} {:?}\n",
                        prefix,
                        t.kind(),
                        t.text_range(),
                        text
                    ));
                }
            }
        }

        result
    }

    fn kinds(node: &SyntaxNode) -> Vec<SyntaxKind> {
        node.children().map(|n| n.kind()).collect()
    }

    #[test]
    fn snapshot_headline_words() {
        let tree = parse("* TODO [#A] Work [1/2] :home:\n");
        assert_snapshot!(format_tree(&tree, 0), @r#"
        ROOT@0..30
          SECTION@0..30
            HEADLINE@0..30
              STARS@0..1
                STAR@0..1 "*"
              WHITESPACE@1..2 " "
              ITEM@2..22
                WORD@2..6 "TODO"
                WHITESPACE@6..7 " "
                WORD@7..11 "[#A]"
                WHITESPACE@11..12 " "
                WORD@12..16 "Work"
                WHITESPACE@16..17 " "
                WORD@17..22 "[1/2]"
              WHITESPACE@22..23 " "
              TAG_LIST@23..29
                COLON@23..24 ":"
                TAG@24..28 "home"
                COLON@28..29 ":"
              NEWLINE@29..30 "\\n"
        "#);
    }

    #[test]
    fn snapshot_section_blocks() {
        let input = "* Work\n** DONE Ship\nCLOSED: [2025-03-10 Mon 09:00]\n:PROPERTIES:\n:HASH: ab\n:END:\nnotes\n";
        let tree = parse(input);
        assert_snapshot!(format_tree(&tree, 0), @r#"
        ROOT@0..86
          SECTION@0..86
            HEADLINE@0..7
              STARS@0..1
                STAR@0..1 "*"
              WHITESPACE@1..2 " "
              ITEM@2..6
                WORD@2..6 "Work"
              NEWLINE@6..7 "\\n"
            SECTION@7..86
              HEADLINE@7..20
                STARS@7..9
                  STAR@7..8 "*"
                  STAR@8..9 "*"
                WHITESPACE@9..10 " "
                ITEM@10..19
                  WORD@10..14 "DONE"
                  WHITESPACE@14..15 " "
                  WORD@15..19 "Ship"
                NEWLINE@19..20 "\\n"
              PLAN@20..51
                PLAN_ENTRY@20..50
                  PLAN_KEY@20..26 "CLOSED"
                  COLON@26..27 ":"
                  WHITESPACE@27..28 " "
                  TIMESTAMP@28..50 "[2025-03-10 Mon 09:00]"
                NEWLINE@50..51 "\\n"
              PROPERTY_DRAWER@51..80
                COLON@51..52 ":"
                TEXT@52..62 "PROPERTIES"
                COLON@62..63 ":"
                NEWLINE@63..64 "\\n"
                PROPERTY@64..74
                  COLON@64..65 ":"
                  PROPERTY_NAME@65..69 "HASH"
                  COLON@69..70 ":"
                  WHITESPACE@70..71 " "
                  PROPERTY_VALUE@71..73 "ab"
                  NEWLINE@73..74 "\\n"
                COLON@74..75 ":"
                TEXT@75..78 "END"
                COLON@78..79 ":"
                NEWLINE@79..80 "\\n"
              BODY@80..86
                TEXT@80..85 "notes"
                NEWLINE@85..86 "\\n"
        "#);
    }

    #[test]
    fn preamble_becomes_body() {
        let tree = parse("#+TITLE: Reminders\n\n* Work\n");
        assert_eq!(kinds(&tree), vec![SyntaxKind::BODY, SyntaxKind::SECTION]);
    }

    #[test]
    fn sections_nest_by_level() {
        let tree = parse("* A\n** a1\n*** deep\n** a2\n* B\n");
        assert_eq!(kinds(&tree), vec![SyntaxKind::SECTION, SyntaxKind::SECTION]);

        let a = tree.children().next().unwrap();
        assert_eq!(
            kinds(&a),
            vec![SyntaxKind::HEADLINE, SyntaxKind::SECTION, SyntaxKind::SECTION]
        );
        let a1 = a.children().nth(1).unwrap();
        assert_eq!(a1.text().to_string(), "** a1\n*** deep\n");
    }

    #[test]
    fn section_range_ends_at_next_headline() {
        let tree = parse("* A\n\n\n* B");
        let a = tree.children().next().unwrap();
        assert_eq!(a.text().to_string(), "* A\n\n\n");
    }

    #[test]
    fn drawer_without_end_stops_at_first_plain_line() {
        let tree = parse("* A\n:PROPERTIES:\n:ID: 1\nplain text\n");
        let section = tree.children().next().unwrap();
        assert_eq!(
            kinds(&section),
            vec![
                SyntaxKind::HEADLINE,
                SyntaxKind::PROPERTY_DRAWER,
                SyntaxKind::BODY
            ]
        );
    }

    #[test]
    fn plan_not_directly_below_headline_is_body() {
        let tree = parse("* A\ntext\nSCHEDULED: <2025-03-10 Mon 09:00>\n");
        let section = tree.children().next().unwrap();
        assert_eq!(kinds(&section), vec![SyntaxKind::HEADLINE, SyntaxKind::BODY]);
    }

    #[test]
    fn plan_line_with_two_entries() {
        let tree = parse(
            "* A\nCLOSED: [2025-03-10 Mon 10:00] SCHEDULED: <2025-03-09 Sun 09:00>\n",
        );
        let plan = tree
            .descendants()
            .find(|n| n.kind() == SyntaxKind::PLAN)
            .unwrap();
        let stamps: Vec<String> = plan
            .descendants_with_tokens()
            .filter_map(|e| e.into_token())
            .filter(|t| t.kind() == SyntaxKind::TIMESTAMP)
            .map(|t| t.text().to_string())
            .collect();
        assert_eq!(
            stamps,
            vec!["[2025-03-10 Mon 10:00]", "<2025-03-09 Sun 09:00>"]
        );
    }

    #[test]
    fn bold_text_at_line_start_is_not_a_headline() {
        let tree = parse("*bold* text\n");
        assert_eq!(kinds(&tree), vec![SyntaxKind::BODY]);
    }

    #[test]
    fn messy_input_preserves_all_bytes() {
        let input = "* \n**\n:PROPERTIES:\n* [#Z] ::: <unclosed\nCLOSED:\n:END:\r\n*** x :a::b:\n";
        let tree = parse(input);
        assert_eq!(tree.text().to_string(), input);
    }
}
