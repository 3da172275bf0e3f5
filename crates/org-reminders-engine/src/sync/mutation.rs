use crate::convert;
use crate::editing::{Document, DocumentError, DocumentWriter};
use crate::models::{Entity, Headline, HeadlineId};
use crate::sync::SyncVerb;

/// How a mutation finds its headline in the document.
#[derive(Debug, Clone, PartialEq)]
pub enum Locator {
    /// The headline carrying the probe's store key
    Identity(Headline),
    /// The first headline without a store key shaped like the probe
    Shape(Headline),
    /// Nothing to find; used by additions
    None,
}

#[derive(Debug, thiserror::Error)]
pub enum MutationError {
    #[error("No {kind} {title:?} in the document")]
    NotFound { kind: &'static str, title: String },
    #[error(transparent)]
    Document(#[from] DocumentError),
}

/// A reconciliation decision to be written into the document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentMutation {
    pub verb: SyncVerb,
    pub locator: Locator,
    pub value: Entity,
}

impl DocumentMutation {
    pub fn add(value: impl Into<Entity>) -> Self {
        Self {
            verb: SyncVerb::Add,
            locator: Locator::None,
            value: value.into(),
        }
    }

    pub fn update(locator: Locator, value: impl Into<Entity>) -> Self {
        Self {
            verb: SyncVerb::Update,
            locator,
            value: value.into(),
        }
    }

    pub fn delete(locator: Locator, value: impl Into<Entity>) -> Self {
        Self {
            verb: SyncVerb::Delete,
            locator,
            value: value.into(),
        }
    }

    pub fn apply(&self, doc: &mut Document) -> Result<(), MutationError> {
        match self.verb {
            SyncVerb::Add => {
                let (fragment, id) = match &self.value {
                    Entity::List(list) => convert::list_fragment(list),
                    Entity::Item(item) => convert::item_fragment(item),
                };
                DocumentWriter::new(doc).insert(&fragment, id)?;
            }
            SyncVerb::Update => {
                let target = self.locate(doc)?;
                let fields = match &self.value {
                    Entity::List(list) => convert::headline_from_list(list),
                    Entity::Item(item) => convert::headline_from_item(item),
                };
                DocumentWriter::new(doc).replace_fields(target, &fields)?;
            }
            SyncVerb::Delete => {
                let target = self.locate(doc)?;
                DocumentWriter::new(doc).delete(target)?;
            }
        }
        Ok(())
    }

    fn locate(&self, doc: &Document) -> Result<HeadlineId, MutationError> {
        let found = match &self.locator {
            Locator::Identity(probe) => doc.find_by_identity(probe),
            Locator::Shape(probe) => doc.outline().find_unkeyed_by_shape(probe),
            Locator::None => None,
        };
        found.ok_or_else(|| MutationError::NotFound {
            kind: self.value.kind_name(),
            title: self.value.title().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CanonicalItem, CanonicalList, Status};
    use pretty_assertions::assert_eq;

    const TEXT: &str = "* Work\n:PROPERTIES:\n:LIST-ID: L1\n:END:\n** a\n** TODO b\n:PROPERTIES:\n:EXTERNAL-ID: X2\n:END:\n";

    fn work() -> CanonicalList {
        CanonicalList::new(Some("L1".into()), "Work")
    }

    #[test]
    fn test_update_by_shape_assigns_key() {
        let mut doc = Document::load(TEXT).unwrap();
        let source = doc.headline(doc.outline().items()[0]).clone();
        let created = CanonicalItem {
            title: "a".into(),
            external_id: Some("X1".into()),
            list: work(),
            ..CanonicalItem::default()
        };

        DocumentMutation::update(Locator::Shape(source), created)
            .apply(&mut doc)
            .unwrap();

        let a = doc.headline(doc.outline().items()[0]);
        assert_eq!(a.status, Some(Status::Todo));
        assert_eq!(a.property("EXTERNAL-ID"), Some("X1"));
    }

    #[test]
    fn test_delete_by_identity() {
        let mut doc = Document::load(TEXT).unwrap();
        let mut probe = Headline::new(2, "b");
        probe.set_property("EXTERNAL-ID", "X2");

        DocumentMutation::delete(Locator::Identity(probe), CanonicalItem::default())
            .apply(&mut doc)
            .unwrap();

        assert_eq!(
            doc.text(),
            "* Work\n:PROPERTIES:\n:LIST-ID: L1\n:END:\n** a\n"
        );
    }

    #[test]
    fn test_add_item_lands_in_its_list() {
        let mut doc = Document::load("* Home\n* Work\n:PROPERTIES:\n:LIST-ID: L1\n:END:\n").unwrap();
        let item = CanonicalItem {
            title: "c".into(),
            external_id: Some("X3".into()),
            list: work(),
            ..CanonicalItem::default()
        };

        DocumentMutation::add(item).apply(&mut doc).unwrap();

        assert_eq!(
            doc.text(),
            "* Home\n* Work\n:PROPERTIES:\n:LIST-ID: L1\n:END:\n** TODO c\n:PROPERTIES:\n:EXTERNAL-ID: X3\n:END:\n"
        );
    }

    #[test]
    fn test_missing_target_is_reported() {
        let mut doc = Document::load(TEXT).unwrap();
        let mut probe = Headline::new(2, "gone");
        probe.set_property("EXTERNAL-ID", "X9");
        let value = CanonicalItem {
            title: "gone".into(),
            ..CanonicalItem::default()
        };

        let result = DocumentMutation::delete(Locator::Identity(probe), value).apply(&mut doc);

        assert!(matches!(
            result,
            Err(MutationError::NotFound { kind: "item", title }) if title == "gone"
        ));
        assert_eq!(doc.text(), TEXT);
    }
}
