/// All syntax kinds for the org outline CST.
///
/// Token kinds come first, then node kinds. The `#[repr(u16)]` allows
/// conversion to/from rowan's raw `SyntaxKind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u16)]
#[allow(non_camel_case_types)]
pub enum SyntaxKind {
    // === Lexer tokens ===
    WHITESPACE = 0,
    NEWLINE,
    TEXT,
    STAR,
    COLON,
    LBRACKET,
    RBRACKET,
    LANGLE,
    RANGLE,
    HASH,

    // === Composite tokens (several lexer tokens glued by the parser) ===
    /// One whitespace-delimited word of a headline.
    WORD,
    /// A single tag name inside a tag list.
    TAG,
    /// `SCHEDULED`, `CLOSED` or `DEADLINE`.
    PLAN_KEY,
    /// The value following a plan key.
    TIMESTAMP,
    PROPERTY_NAME,
    PROPERTY_VALUE,

    /// End of input marker (not part of tree).
    EOF,

    // === Composite nodes ===
    ROOT,
    /// A headline plus everything it owns, including deeper sections.
    SECTION,
    HEADLINE,
    STARS,
    /// The headline words between the stars and the tag list.
    ITEM,
    TAG_LIST,
    PLAN,
    PLAN_ENTRY,
    PROPERTY_DRAWER,
    PROPERTY,
    /// Free text lines that are not part of any other node.
    BODY,
    ERROR,
}

impl SyntaxKind {
    pub fn is_token(self) -> bool {
        (self as u16) <= (SyntaxKind::EOF as u16)
    }

    pub fn is_node(self) -> bool {
        !self.is_token()
    }

    pub fn is_trivia(self) -> bool {
        matches!(self, SyntaxKind::WHITESPACE | SyntaxKind::NEWLINE)
    }
}

impl From<SyntaxKind> for rowan::SyntaxKind {
    fn from(kind: SyntaxKind) -> Self {
        Self(kind as u16)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OrgLang {}

impl rowan::Language for OrgLang {
    type Kind = SyntaxKind;

    fn kind_from_raw(raw: rowan::SyntaxKind) -> Self::Kind {
        assert!(raw.0 <= SyntaxKind::ERROR as u16);
        // SAFETY: SyntaxKind is repr(u16) and we've verified the value is in range
        unsafe { std::mem::transmute::<u16, SyntaxKind>(raw.0) }
    }

    fn kind_to_raw(kind: Self::Kind) -> rowan::SyntaxKind {
        kind.into()
    }
}

pub type SyntaxNode = rowan::SyntaxNode<OrgLang>;
pub type SyntaxToken = rowan::SyntaxToken<OrgLang>;
pub type SyntaxElement = rowan::SyntaxElement<OrgLang>;
