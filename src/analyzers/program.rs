//! COBOL program structure analysis.
//!
//! Scans program source for divisions, paragraph labels, CALL/COPY
//! dependencies, and the battery of migration-risk counters consumed by
//! the scorer. All scans are line-oriented regex recognition over the
//! classified line sequence; no AST is built and malformed source
//! degrades to partial extraction.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::analyzers::lines::{classify_lines, line_count};
use crate::config::AnalysisConfig;
use crate::core::{MigrationMetrics, ProgramAnalysisResult, SourceLine};

static DIVISION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(IDENTIFICATION|ENVIRONMENT|DATA|PROCEDURE)\s+DIVISION").unwrap()
});
static PARAGRAPH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z][A-Za-z0-9-]*)\.$").unwrap());
static CALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bCALL\s+['"]([A-Za-z0-9-]+)['"]"#).unwrap());
static COPY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bCOPY\s+([A-Za-z0-9-]+)").unwrap());
static PROGRAM_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPROGRAM-ID\s*\.?\s+([A-Za-z0-9-]+)").unwrap());

static IF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bIF\b").unwrap());
static EVALUATE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bEVALUATE\b").unwrap());
static WHEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bWHEN\b").unwrap());
static PERFORM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bPERFORM\b").unwrap());
static UNTIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bUNTIL\b").unwrap());
static GOTO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bGO\s+TO\b|\bGOTO\b").unwrap());
static FILE_OP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(OPEN|READ|WRITE|CLOSE|REWRITE|DELETE)\b").unwrap());
static OCCURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bOCCURS\b").unwrap());
static REDEFINES_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bREDEFINES\b").unwrap());
static COMP3_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"COMP-3|PACKED-DECIMAL").unwrap());
static SQL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"EXEC\s+SQL|EXEC-SQL").unwrap());
static PIC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bPIC(?:TURE)?\s+([^\s]+)").unwrap());
static SORT_MERGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(SORT|MERGE|RELEASE|RETURN)\b").unwrap());
static END_SCOPE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\bEND-[A-Z]+\b").unwrap());

/// Analyze one COBOL program source file.
pub fn analyze_program(path: &Path, content: &str, config: &AnalysisConfig) -> ProgramAnalysisResult {
    let lines = classify_lines(content, config.fixed_column_comments);
    let metrics = migration_metrics(&lines, &config.assembly_linkage_tokens);

    ProgramAnalysisResult {
        program_name: extract_program_name(&lines)
            .unwrap_or_else(|| file_stem(path)),
        source_path: path.to_path_buf(),
        total_loc: line_count(&lines),
        cyclomatic_complexity: metrics.cyclomatic_complexity,
        divisions: extract_divisions(&lines),
        paragraphs: extract_paragraphs(&lines),
        dependencies: extract_dependencies(&lines),
        migration_metrics: metrics,
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_string()
}

fn extract_program_name(lines: &[SourceLine]) -> Option<String> {
    lines
        .iter()
        .filter(|l| l.is_code())
        .find_map(|l| PROGRAM_ID_RE.captures(&l.text))
        .map(|c| c[1].to_uppercase())
}

/// Division headers in source order, duplicates included as found, each
/// formatted `"<NAME> DIVISION"`.
pub fn extract_divisions(lines: &[SourceLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.is_code())
        .filter_map(|l| DIVISION_RE.captures(&l.text))
        .map(|c| format!("{} DIVISION", c[1].to_uppercase()))
        .collect()
}

/// A line consisting solely of an identifier followed by a period is a
/// paragraph label, unless the identifier is the DIVISION keyword.
pub fn extract_paragraphs(lines: &[SourceLine]) -> Vec<String> {
    lines
        .iter()
        .filter(|l| l.is_code())
        .filter_map(|l| PARAGRAPH_RE.captures(l.text.trim()))
        .map(|c| c[1].to_string())
        .filter(|name| !name.eq_ignore_ascii_case("DIVISION"))
        .collect()
}

/// CALL and COPY targets, deduplicated, first appearance preserved.
pub fn extract_dependencies(lines: &[SourceLine]) -> Vec<String> {
    let mut deps: Vec<String> = Vec::new();
    for line in lines.iter().filter(|l| l.is_code()) {
        for caps in CALL_RE
            .captures_iter(&line.text)
            .chain(COPY_RE.captures_iter(&line.text))
        {
            let name = caps[1].to_uppercase();
            if !deps.contains(&name) {
                deps.push(name);
            }
        }
    }
    deps
}

/// One linear pass over non-comment lines accumulating every migration
/// risk counter independently. Overlapping matches increment every
/// relevant counter; the metrics measure presence, not exclusivity.
pub fn migration_metrics(lines: &[SourceLine], assembly_tokens: &[String]) -> MigrationMetrics {
    let mut m = MigrationMetrics::new();
    let mut if_depth: u32 = 0;
    let tokens: Vec<String> = assembly_tokens.iter().map(|t| t.to_uppercase()).collect();

    for line in lines.iter().filter(|l| !l.is_comment()) {
        let upper = line.text.to_uppercase();
        // Scope terminators like END-IF and END-EVALUATE would otherwise
        // match the bare keyword (hyphens are word boundaries), so the
        // END-IF count is taken first and every END-* token is scrubbed
        // before the keyword scans.
        let end_if_count = upper.matches("END-IF").count() as u32;
        let scrubbed = END_SCOPE_RE.replace_all(&upper, " ");

        if IF_RE.is_match(&scrubbed) {
            m.cyclomatic_complexity += 1;
            if_depth += 1;
            m.max_nested_if_depth = m.max_nested_if_depth.max(if_depth);
        }
        if_depth = if_depth.saturating_sub(end_if_count);

        let evaluates = EVALUATE_RE.find_iter(&scrubbed).count() as u32;
        m.evaluate_count += evaluates;
        m.cyclomatic_complexity += evaluates;
        m.cyclomatic_complexity += WHEN_RE.find_iter(&scrubbed).count() as u32;

        let performs = PERFORM_RE.find_iter(&scrubbed).count() as u32;
        m.perform_count += performs;
        if performs > 0 && UNTIL_RE.is_match(&scrubbed) {
            m.cyclomatic_complexity += 1;
        }

        let gotos = GOTO_RE.find_iter(&scrubbed).count() as u32;
        m.goto_count += gotos;
        m.cyclomatic_complexity += gotos;

        m.copybook_count += COPY_RE.find_iter(&scrubbed).count() as u32;
        m.sql_statement_count += SQL_RE.find_iter(&scrubbed).count() as u32;
        m.file_operation_count += FILE_OP_RE.find_iter(&scrubbed).count() as u32;
        m.occurs_count += OCCURS_RE.find_iter(&scrubbed).count() as u32;
        m.redefines_count += REDEFINES_RE.find_iter(&scrubbed).count() as u32;
        m.comp3_count += COMP3_RE.find_iter(&upper).count() as u32;
        m.sort_merge_count += SORT_MERGE_RE.find_iter(&scrubbed).count() as u32;

        if upper.contains("CALL") && tokens.iter().any(|t| upper.contains(t.as_str())) {
            m.assembly_call_count += 1;
        }

        for caps in PIC_RE.captures_iter(&upper) {
            if is_complex_picture(&caps[1]) {
                m.complex_pic_count += 1;
            }
        }

        if upper.contains("REPORT") && upper.contains("SECTION") {
            m.uses_report_writer = true;
        }
    }

    m
}

/// A PIC clause with 5 or more format characters from {S,V,P,9,X} is
/// considered complex enough to need manual mapping review.
fn is_complex_picture(clause: &str) -> bool {
    let trimmed = clause.trim_end_matches('.');
    trimmed
        .chars()
        .filter(|c| matches!(c, 'S' | 'V' | 'P' | '9' | 'X'))
        .count()
        >= 5
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::lines::classify_lines;

    fn code_lines(src: &str) -> Vec<SourceLine> {
        classify_lines(src, false)
    }

    #[test]
    fn complex_picture_threshold() {
        assert!(!is_complex_picture("9(5)V99"));
        assert!(is_complex_picture("S9(7)V99"));
        assert!(is_complex_picture("X99V99."));
    }

    #[test]
    fn end_if_does_not_count_as_if() {
        let lines = code_lines("    IF A = B\n    END-IF.\n");
        let m = migration_metrics(&lines, &[]);
        assert_eq!(m.cyclomatic_complexity, 2);
        assert_eq!(m.max_nested_if_depth, 1);
    }

    #[test]
    fn program_id_wins_over_file_stem() {
        let lines = code_lines("       PROGRAM-ID. payroll01.\n");
        assert_eq!(extract_program_name(&lines).as_deref(), Some("PAYROLL01"));
    }
}
