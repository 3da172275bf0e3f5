use std::collections::BTreeMap;

/// Reserved property, plan and tag names.
pub mod keys {
    pub const HASH: &str = "HASH";
    pub const LAST_MODIFIED: &str = "LAST-MODIFIED";
    pub const LIST_ID: &str = "LIST-ID";
    pub const EXTERNAL_ID: &str = "EXTERNAL-ID";
    pub const SCHEDULED: &str = "SCHEDULED";
    pub const CLOSED: &str = "CLOSED";
    pub const DELETED: &str = "DELETED";
}

/// TODO keyword of a headline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Todo,
    Done,
}

impl Status {
    pub fn keyword(self) -> &'static str {
        match self {
            Status::Todo => "TODO",
            Status::Done => "DONE",
        }
    }

    pub fn from_keyword(word: &str) -> Option<Self> {
        match word {
            "TODO" => Some(Status::Todo),
            "DONE" => Some(Status::Done),
            _ => None,
        }
    }
}

/// Priority cookie, `[#A]` to `[#C]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Priority {
    A,
    B,
    C,
}

impl Priority {
    pub fn letter(self) -> char {
        match self {
            Priority::A => 'A',
            Priority::B => 'B',
            Priority::C => 'C',
        }
    }

    pub fn from_letter(letter: char) -> Option<Self> {
        match letter {
            'A' => Some(Priority::A),
            'B' => Some(Priority::B),
            'C' => Some(Priority::C),
            _ => None,
        }
    }

    pub fn cookie(self) -> String {
        format!("[#{}]", self.letter())
    }

    pub fn from_cookie(word: &str) -> Option<Self> {
        let inner = word.strip_prefix("[#")?.strip_suffix(']')?;
        let mut chars = inner.chars();
        match (chars.next(), chars.next()) {
            (Some(letter), None) => Self::from_letter(letter),
            _ => None,
        }
    }
}

/// One node of the outline: a list (level 1) or a reminder item (level 2).
///
/// Plans and properties are keyed maps, so their on-disk order is not kept.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Headline {
    pub level: usize,
    pub title: String,
    pub status: Option<Status>,
    pub priority: Option<Priority>,
    pub plans: BTreeMap<String, String>,
    pub properties: BTreeMap<String, String>,
    pub tags: Vec<String>,
    pub content: Option<String>,
}

impl Headline {
    pub fn new(level: usize, title: impl Into<String>) -> Self {
        Self {
            level,
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    pub fn set_property(&mut self, key: &str, value: impl Into<String>) {
        self.properties.insert(key.to_string(), value.into());
    }

    pub fn plan(&self, key: &str) -> Option<&str> {
        self.plans.get(key).map(String::as_str)
    }

    /// The property holding this headline's store key.
    pub fn identity_key(&self) -> &'static str {
        if self.level == 1 {
            keys::LIST_ID
        } else {
            keys::EXTERNAL_ID
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn is_deleted(&self) -> bool {
        self.has_tag(keys::DELETED)
    }

    /// Same title, priority, status and level.
    pub fn same_shape(&self, other: &Headline) -> bool {
        self.title == other.title
            && self.priority == other.priority
            && self.status == other.status
            && self.level == other.level
    }

    /// Copy every own field of `other`, keeping this headline's level.
    pub fn assign_fields(&mut self, other: &Headline) {
        let level = self.level;
        *self = other.clone();
        self.level = level;
    }
}
