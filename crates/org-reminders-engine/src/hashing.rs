//! Content hashing and change detection for reminder items.

use sha2::{Digest, Sha256};

use crate::models::CanonicalItem;

/// SHA-256 over the fields a person can see and edit, hex encoded.
///
/// The store key, modification time and the hash itself are left out, so
/// stamping those never changes the result.
pub fn compute_hash(item: &CanonicalItem) -> String {
    let due = item.due_date.as_ref().map(|d| d.text()).unwrap_or_default();
    let notes = item.notes.as_deref().unwrap_or_default();

    let mut hasher = Sha256::new();
    hasher.update(item.title.as_bytes());
    hasher.update(item.priority.to_string().as_bytes());
    hasher.update(item.is_completed.to_string().as_bytes());
    hasher.update(item.is_deleted.to_string().as_bytes());
    hasher.update(due.as_bytes());
    hasher.update(notes.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// The new hash if the item changed since it was last stamped.
pub fn modified(item: &CanonicalItem) -> Option<String> {
    let hash = compute_hash(item);
    (item.hash.as_deref() != Some(hash.as_str())).then_some(hash)
}

impl CanonicalItem {
    pub fn compute_hash(&self) -> String {
        compute_hash(self)
    }

    pub fn modified(&self) -> Option<String> {
        modified(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DateFormat, OrgDate, Stamp};
    use crate::tests::at;
    use pretty_assertions::assert_eq;

    fn item() -> CanonicalItem {
        CanonicalItem {
            title: "Buy milk".into(),
            priority: 5,
            due_date: Some(OrgDate::from_datetime(
                at(2025, 3, 10, 9, 0, 0),
                DateFormat::Scheduled,
            )),
            notes: Some("semi-skimmed".into()),
            ..CanonicalItem::default()
        }
    }

    #[test]
    fn test_hash_is_hex_sha256() {
        let hash = compute_hash(&item());
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_hash_matches_plain_concatenation() {
        let expected = format!(
            "{:x}",
            Sha256::digest("Buy milk5falsefalse<2025-03-10 Mon 09:00>semi-skimmed".as_bytes())
        );
        assert_eq!(compute_hash(&item()), expected);
    }

    #[test]
    fn test_hash_ignores_bookkeeping_fields() {
        let base = compute_hash(&item());
        let mut stamped = item();
        stamped.external_id = Some("X1".into());
        stamped.last_modified = Some(Stamp::new(at(2025, 1, 1, 0, 0, 0)));
        stamped.hash = Some("whatever".into());
        assert_eq!(compute_hash(&stamped), base);
    }

    #[test]
    fn test_hash_tracks_visible_fields() {
        let base = compute_hash(&item());
        let mut done = item();
        done.is_completed = true;
        assert_ne!(compute_hash(&done), base);
        let mut deleted = item();
        deleted.is_deleted = true;
        assert_ne!(compute_hash(&deleted), base);
    }

    #[test]
    fn test_modified_is_none_when_hash_matches() {
        let mut current = item();
        current.hash = Some(compute_hash(&current));
        assert_eq!(modified(&current), None);

        current.title = "Buy oat milk".into();
        assert_eq!(modified(&current), Some(compute_hash(&current)));
    }
}
