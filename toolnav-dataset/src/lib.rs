pub mod dataset;
pub mod error;
pub mod normalize;
pub mod scan;

pub use dataset::{CategoryDef, Dataset, ToolEntry};
pub use error::DatasetError;
pub use normalize::{extract_domain, normalize_url};
pub use scan::{load_dataset, scan_source};
