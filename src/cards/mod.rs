//! Card data model, knowledge base and rewind history.
//!
//! * [`Card`] / [`CardOrigin`] — one unit of displayable talking points,
//!   authored or generated.
//! * [`CardStore`] — JSON-backed, runtime-reloadable knowledge base.
//! * [`CardHistory`] — bounded stack of superseded cards for rewind.

pub mod card;
pub mod history;
pub mod store;

pub use card::{Card, CardOrigin};
pub use history::{CardHistory, DEFAULT_HISTORY_CAPACITY};
pub use store::{CardStore, StoreError};
