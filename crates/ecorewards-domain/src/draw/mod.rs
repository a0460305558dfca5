mod allocation;
mod service;
mod types;

pub use allocation::DrawEntryAllocation;
pub use service::{DrawEntryRepository, DrawService};
pub use types::{Draw, DrawEntryCount, DrawKind, WinnerRecord};
