pub mod storage;
pub mod types;

pub use storage::{load_responses, parse_responses};
pub use types::{ResponseFile, ResponseRecord};
