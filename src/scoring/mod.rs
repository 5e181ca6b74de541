pub mod migration;

pub use migration::{score_file, score_project};
