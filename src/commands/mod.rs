pub mod analyze;
pub mod init;

pub use analyze::{analyze_project, AnalyzeConfig};
pub use init::init_config;
