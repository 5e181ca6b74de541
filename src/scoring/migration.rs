//! Migration difficulty scoring.
//!
//! Combines a program's migration metrics into three independently
//! capped category scores (logic, data, COBOL-specific risk), each in
//! [0, 100], then a weighted overall score. Every cap and threshold is a
//! named constant so scores stay numerically reproducible across runs.

use crate::config::ScoringWeights;
use crate::core::metrics::per_100_loc;
use crate::core::{Difficulty, MigrationComplexityScore, MigrationMetrics, ProgramAnalysisResult};

const COMPLEXITY_FACTOR: f64 = 2.0;
const COMPLEXITY_CAP: f64 = 40.0;
const GOTO_FACTOR: f64 = 10.0;
const GOTO_CAP: f64 = 30.0;
const EVALUATE_FACTOR: f64 = 2.0;
const EVALUATE_CAP: f64 = 10.0;

const COPYBOOK_FACTOR: f64 = 5.0;
const COPYBOOK_CAP: f64 = 25.0;
const SQL_FACTOR: f64 = 5.0;
const SQL_CAP: f64 = 30.0;
const FILE_OP_FACTOR: f64 = 2.0;
const FILE_OP_CAP: f64 = 20.0;
const OCCURS_FACTOR: f64 = 3.0;
const OCCURS_CAP: f64 = 15.0;
const REDEFINES_FACTOR: f64 = 3.0;
const REDEFINES_CAP: f64 = 10.0;

const COMP3_FACTOR: f64 = 5.0;
const COMP3_CAP: f64 = 25.0;
const ASSEMBLY_FACTOR: f64 = 20.0;
const ASSEMBLY_CAP: f64 = 40.0;
const COMPLEX_PIC_FACTOR: f64 = 3.0;
const COMPLEX_PIC_CAP: f64 = 15.0;
const SORT_MERGE_FACTOR: f64 = 3.0;
const SORT_MERGE_CAP: f64 = 10.0;
const REPORT_WRITER_SCORE: f64 = 10.0;

/// Score one analyzed program.
pub fn score_file(
    result: &ProgramAnalysisResult,
    weights: &ScoringWeights,
) -> MigrationComplexityScore {
    let m = &result.migration_metrics;
    let loc = result.total_loc;

    let logic_score = clamp_score(
        (per_100_loc(m.cyclomatic_complexity, loc) * COMPLEXITY_FACTOR).min(COMPLEXITY_CAP)
            + nested_depth_bonus(m.max_nested_if_depth)
            + (m.goto_count as f64 * GOTO_FACTOR).min(GOTO_CAP)
            + (m.evaluate_count as f64 * EVALUATE_FACTOR).min(EVALUATE_CAP),
    );

    let data_score = clamp_score(
        (m.copybook_count as f64 * COPYBOOK_FACTOR).min(COPYBOOK_CAP)
            + (per_100_loc(m.sql_statement_count, loc) * SQL_FACTOR).min(SQL_CAP)
            + (m.file_operation_count as f64 * FILE_OP_FACTOR).min(FILE_OP_CAP)
            + (m.occurs_count as f64 * OCCURS_FACTOR).min(OCCURS_CAP)
            + (m.redefines_count as f64 * REDEFINES_FACTOR).min(REDEFINES_CAP),
    );

    let risk_score = clamp_score(
        (m.comp3_count as f64 * COMP3_FACTOR).min(COMP3_CAP)
            + (m.assembly_call_count as f64 * ASSEMBLY_FACTOR).min(ASSEMBLY_CAP)
            + (m.complex_pic_count as f64 * COMPLEX_PIC_FACTOR).min(COMPLEX_PIC_CAP)
            + (m.sort_merge_count as f64 * SORT_MERGE_FACTOR).min(SORT_MERGE_CAP)
            + if m.uses_report_writer {
                REPORT_WRITER_SCORE
            } else {
                0.0
            },
    );

    let overall = weighted_overall(logic_score, data_score, risk_score, weights);
    let difficulty = difficulty_for(overall);

    MigrationComplexityScore {
        overall,
        logic_score,
        data_score,
        risk_score,
        difficulty,
        description: description_for(difficulty).to_string(),
        logic_findings: logic_findings(m),
        data_findings: data_findings(m),
        risk_findings: risk_findings(m),
    }
}

/// Aggregate per-file scores into a project score: category sub-scores
/// are averaged, the overall is recomputed from the averages rather than
/// averaged itself, and findings are unioned with duplicates removed in
/// first-seen order.
pub fn score_project(
    scores: &[MigrationComplexityScore],
    weights: &ScoringWeights,
) -> MigrationComplexityScore {
    if scores.is_empty() {
        return MigrationComplexityScore {
            overall: 0,
            logic_score: 0,
            data_score: 0,
            risk_score: 0,
            difficulty: Difficulty::Low,
            description: "No files analyzed".to_string(),
            logic_findings: Vec::new(),
            data_findings: Vec::new(),
            risk_findings: Vec::new(),
        };
    }

    let logic_score = average(scores.iter().map(|s| s.logic_score));
    let data_score = average(scores.iter().map(|s| s.data_score));
    let risk_score = average(scores.iter().map(|s| s.risk_score));
    let overall = weighted_overall(logic_score, data_score, risk_score, weights);
    let difficulty = difficulty_for(overall);

    MigrationComplexityScore {
        overall,
        logic_score,
        data_score,
        risk_score,
        difficulty,
        description: description_for(difficulty).to_string(),
        logic_findings: dedup(scores.iter().flat_map(|s| s.logic_findings.iter())),
        data_findings: dedup(scores.iter().flat_map(|s| s.data_findings.iter())),
        risk_findings: dedup(scores.iter().flat_map(|s| s.risk_findings.iter())),
    }
}

fn clamp_score(raw: f64) -> u32 {
    raw.round().clamp(0.0, 100.0) as u32
}

fn weighted_overall(logic: u32, data: u32, risk: u32, weights: &ScoringWeights) -> u32 {
    (logic as f64 * weights.logic + data as f64 * weights.data + risk as f64 * weights.cobol_risk)
        .round() as u32
}

fn nested_depth_bonus(depth: u32) -> f64 {
    match depth {
        d if d > 5 => 20.0,
        d if d > 3 => 10.0,
        d if d > 2 => 5.0,
        _ => 0.0,
    }
}

fn difficulty_for(overall: u32) -> Difficulty {
    match overall {
        0..=29 => Difficulty::Low,
        30..=59 => Difficulty::Medium,
        60..=79 => Difficulty::High,
        _ => Difficulty::VeryHigh,
    }
}

fn description_for(difficulty: Difficulty) -> &'static str {
    match difficulty {
        Difficulty::Low => "Straightforward migration with standard tooling",
        Difficulty::Medium => "Moderate effort; manual review of flagged constructs required",
        Difficulty::High => "Significant rework needed; plan redesign of flagged areas",
        Difficulty::VeryHigh => "Extensive redesign required; consider a phased rewrite",
    }
}

fn logic_findings(m: &MigrationMetrics) -> Vec<String> {
    let mut findings = Vec::new();
    if m.cyclomatic_complexity > 20 {
        findings.push(format!(
            "High cyclomatic complexity: {}",
            m.cyclomatic_complexity
        ));
    }
    if m.max_nested_if_depth > 3 {
        findings.push(format!(
            "Deeply nested IF statements (depth {})",
            m.max_nested_if_depth
        ));
    }
    if m.goto_count > 0 {
        findings.push(format!(
            "{} GO TO statements require control-flow restructuring",
            m.goto_count
        ));
    }
    if m.evaluate_count > 5 {
        findings.push(format!("{} EVALUATE constructs", m.evaluate_count));
    }
    findings
}

fn data_findings(m: &MigrationMetrics) -> Vec<String> {
    let mut findings = Vec::new();
    if m.copybook_count > 3 {
        findings.push(format!("{} copybook dependencies", m.copybook_count));
    }
    if m.sql_statement_count > 10 {
        findings.push(format!(
            "{} embedded SQL statements",
            m.sql_statement_count
        ));
    }
    if m.file_operation_count > 10 {
        findings.push(format!("{} file operations", m.file_operation_count));
    }
    if m.occurs_count > 2 {
        findings.push(format!("{} OCCURS table definitions", m.occurs_count));
    }
    if m.redefines_count > 2 {
        findings.push(format!("{} REDEFINES storage overlays", m.redefines_count));
    }
    findings
}

fn risk_findings(m: &MigrationMetrics) -> Vec<String> {
    let mut findings = Vec::new();
    if m.comp3_count > 0 {
        findings.push(format!("{} COMP-3 packed decimal fields", m.comp3_count));
    }
    if m.assembly_call_count > 0 {
        findings.push(format!(
            "{} suspected assembly language calls",
            m.assembly_call_count
        ));
    }
    if m.complex_pic_count > 5 {
        findings.push(format!("{} complex PICTURE clauses", m.complex_pic_count));
    }
    if m.sort_merge_count > 0 {
        findings.push(format!("{} SORT/MERGE operations", m.sort_merge_count));
    }
    if m.uses_report_writer {
        findings.push("Report Writer usage detected".to_string());
    }
    findings
}

fn average(values: impl Iterator<Item = u32>) -> u32 {
    let collected: Vec<u32> = values.collect();
    if collected.is_empty() {
        return 0;
    }
    let sum: u32 = collected.iter().sum();
    (sum as f64 / collected.len() as f64).round() as u32
}

fn dedup<'a>(items: impl Iterator<Item = &'a String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.contains(item) {
            out.push(item.clone());
        }
    }
    out
}
