// Export modules for library usage
pub mod analyzers;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod io;
pub mod scoring;

// Re-export commonly used types
pub use crate::core::{
    CopybookAnalysisResult, CopybookField, CopybookMetrics, DataType, Difficulty, EntityType,
    FileKind, InferredEntity, KeyStructure, KeyType, LineKind, MapperKind,
    MigrationComplexityScore, MigrationMetrics, OrmAnalysisResult, ProgramAnalysisResult,
    ProjectAnalysis, RecordLayout, ScoredProgram, SourceLine, SqlStatement,
};

pub use crate::analyzers::{
    analyze_copybook, analyze_file, analyze_orm_config, analyze_program, classify_lines,
    FileAnalysis,
};

pub use crate::analyzers::copybook::picture_length;
pub use crate::analyzers::lines::line_count;
pub use crate::analyzers::program::{
    extract_dependencies, extract_divisions, extract_paragraphs, migration_metrics,
};

pub use crate::config::{AnalysisConfig, CobmapConfig, ScoringWeights};

pub use crate::core::metrics::{average_complexity, max_complexity, per_100_loc};

pub use crate::io::output::{create_writer, OutputFormat, OutputWriter};
pub use crate::io::walker::{find_project_files, FileWalker};

pub use crate::scoring::{score_file, score_project};
