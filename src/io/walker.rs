use anyhow::Result;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};

use crate::core::FileKind;

/// Walks a project tree collecting the legacy assets the analyzers
/// understand. Git-ignore rules are honored; additional glob patterns
/// may be excluded on top.
pub struct FileWalker {
    root: PathBuf,
    kinds: Vec<FileKind>,
    ignore_patterns: Vec<String>,
}

impl FileWalker {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root,
            kinds: vec![FileKind::Program, FileKind::Copybook, FileKind::OrmConfig],
            ignore_patterns: vec![],
        }
    }

    pub fn with_kinds(mut self, kinds: Vec<FileKind>) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Collect matching files, sorted by path so downstream aggregation
    /// is deterministic regardless of walk order.
    pub fn walk(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkBuilder::new(&self.root)
            .hidden(false)
            .git_ignore(true)
            .build();

        for entry in walker {
            let entry = entry?;
            let path = entry.path();

            if path.is_file() && self.should_process(path) {
                files.push(path.to_path_buf());
            }
        }

        files.sort();
        log::debug!("Walker found {} candidate files", files.len());
        Ok(files)
    }

    fn should_process(&self, path: &Path) -> bool {
        let kind = FileKind::from_path(path);
        if !self.kinds.contains(&kind) {
            return false;
        }

        let path_str = path.to_string_lossy();
        for pattern in &self.ignore_patterns {
            if glob::Pattern::new(pattern)
                .map(|p| p.matches(&path_str))
                .unwrap_or(false)
            {
                return false;
            }
        }

        true
    }
}

pub fn find_project_files(root: &Path, ignore_patterns: Vec<String>) -> Result<Vec<PathBuf>> {
    FileWalker::new(root.to_path_buf())
        .with_ignore_patterns(ignore_patterns)
        .walk()
}
