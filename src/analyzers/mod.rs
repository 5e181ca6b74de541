//! Per-file analyzers. Each is a pure function of file content: no
//! shared state between invocations, so callers may fan out across files
//! freely.

pub mod copybook;
pub mod lines;
pub mod orm;
pub mod program;

pub use copybook::analyze_copybook;
pub use lines::classify_lines;
pub use orm::analyze_orm_config;
pub use program::analyze_program;

use std::path::Path;

use crate::config::AnalysisConfig;
use crate::core::{
    CopybookAnalysisResult, FileKind, OrmAnalysisResult, ProgramAnalysisResult,
};

/// The analysis produced for one file, tagged by what the file was.
#[derive(Clone, Debug)]
pub enum FileAnalysis {
    Program(ProgramAnalysisResult),
    Copybook(CopybookAnalysisResult),
    Orm(OrmAnalysisResult),
}

/// Dispatch a file to the analyzer matching its kind. Unknown kinds
/// yield `None`.
pub fn analyze_file(path: &Path, content: &str, config: &AnalysisConfig) -> Option<FileAnalysis> {
    match FileKind::from_path(path) {
        FileKind::Program => Some(FileAnalysis::Program(analyze_program(path, content, config))),
        FileKind::Copybook => Some(FileAnalysis::Copybook(analyze_copybook(
            path, content, config,
        ))),
        FileKind::OrmConfig => Some(FileAnalysis::Orm(analyze_orm_config(path, content))),
        FileKind::Unknown => None,
    }
}
