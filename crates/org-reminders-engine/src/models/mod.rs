pub mod date;
pub mod entity;
pub mod headline;
pub mod outline;

pub use date::{DateFormat, OrgDate, STAMP_FORMAT, Stamp};
pub use entity::{CanonicalItem, CanonicalList, Entity};
pub use headline::{Headline, Priority, Status, keys};
pub use outline::{HeadlineId, Outline, SyntaxRef};
