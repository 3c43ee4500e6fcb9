pub mod snapshot;
pub mod store;

pub use snapshot::DatasetSnapshot;
pub use store::{DatasetStore, PublishedDataset};
