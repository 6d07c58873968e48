pub mod list;
pub mod pipeline;
pub mod summary;

pub use list::read_image_list;
pub use pipeline::{EntryOutcome, EntryReport, WorkspaceExtractor};
pub use summary::RunSummary;
