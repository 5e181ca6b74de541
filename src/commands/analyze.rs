//! The analyze command: walk, classify, analyze in parallel, score,
//! write.

use anyhow::Result;
use chrono::Utc;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::PathBuf;

use crate::analyzers::{analyze_file, FileAnalysis};
use crate::config::CobmapConfig;
use crate::core::errors::read_source;
use crate::core::{
    CopybookAnalysisResult, OrmAnalysisResult, ProjectAnalysis, ScoredProgram,
};
use crate::io::output::{create_writer, OutputFormat};
use crate::io::walker::find_project_files;
use crate::scoring::{score_file, score_project};

pub struct AnalyzeConfig {
    pub path: PathBuf,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
    pub config_file: Option<PathBuf>,
    /// Show only the N most difficult programs
    pub top: Option<usize>,
}

pub fn analyze_project(cfg: AnalyzeConfig) -> Result<()> {
    let config = CobmapConfig::load(cfg.config_file.as_deref())?;

    let files = if cfg.path.is_file() {
        vec![cfg.path.clone()]
    } else {
        find_project_files(&cfg.path, config.analysis.ignore_patterns.clone())?
    };
    log::info!("Analyzing {} files under {}", files.len(), cfg.path.display());

    let progress = ProgressBar::new(files.len() as u64).with_style(
        ProgressStyle::with_template("{bar:40} {pos}/{len} {msg}").expect("valid template"),
    );

    // Analyzers are pure per file, so the fan-out is a deterministic
    // reduction: collect preserves input order, and the walker sorted it.
    let analyses: Vec<FileAnalysis> = files
        .par_iter()
        .progress_with(progress)
        .map(|path| -> Result<Option<FileAnalysis>> {
            let content = read_source(path)?;
            Ok(analyze_file(path, &content, &config.analysis))
        })
        .collect::<Result<Vec<_>>>()?
        .into_iter()
        .flatten()
        .collect();

    let mut programs: Vec<ScoredProgram> = Vec::new();
    let mut copybooks: Vec<CopybookAnalysisResult> = Vec::new();
    let mut orm_configs: Vec<OrmAnalysisResult> = Vec::new();

    for analysis in analyses {
        match analysis {
            FileAnalysis::Program(result) => {
                let score = score_file(&result, &config.scoring);
                programs.push(ScoredProgram {
                    analysis: result,
                    score,
                });
            }
            FileAnalysis::Copybook(result) => copybooks.push(result),
            FileAnalysis::Orm(result) => orm_configs.push(result),
        }
    }

    let per_file_scores: Vec<_> = programs.iter().map(|p| p.score.clone()).collect();
    let migration_complexity = score_project(&per_file_scores, &config.scoring);

    if let Some(top) = cfg.top {
        programs.sort_by(|a, b| b.score.overall.cmp(&a.score.overall));
        programs.truncate(top);
    }

    let results = ProjectAnalysis {
        project_path: cfg.path,
        timestamp: Utc::now(),
        programs,
        copybooks,
        orm_configs,
        migration_complexity,
    };

    let mut writer = create_writer(cfg.format, cfg.output.as_deref())?;
    writer.write_results(&results)
}
