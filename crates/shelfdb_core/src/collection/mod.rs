//! Collections and the values they hold.
//!
//! A collection is either a list of [`Record`]s or a map of keyed values,
//! stored as a whole. [`Collection`] is the handle callers use; the other
//! types describe what it reads and writes.

mod data;
mod handle;
mod ops;
mod query;
mod record;
mod typed;

pub use data::CollectionData;
pub use handle::Collection;
pub use ops::UpsertTarget;
pub use query::Query;
pub use record::{Record, ID_FIELD};
pub use typed::TypedCollection;
