pub mod backend;
pub mod local;
pub mod types;

pub use backend::Backend;
pub use local::LocalFs;
pub use types::{DirEntry, EntryKind};
