//! Migration risk counters for COBOL programs.

use serde::{Deserialize, Serialize};

/// Raw migration-risk counters accumulated in a single pass over a
/// program's non-comment lines. All counters are monotonic and
/// independent: a line with both `IF` and `EVALUATE` increments both.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationMetrics {
    /// Decision-point count, seeded at 1
    pub cyclomatic_complexity: u32,
    /// Maximum IF nesting depth observed (not the final depth)
    pub max_nested_if_depth: u32,
    pub goto_count: u32,
    pub evaluate_count: u32,
    pub perform_count: u32,
    pub copybook_count: u32,
    pub sql_statement_count: u32,
    pub file_operation_count: u32,
    pub occurs_count: u32,
    pub redefines_count: u32,
    pub comp3_count: u32,
    pub assembly_call_count: u32,
    pub complex_pic_count: u32,
    pub sort_merge_count: u32,
    pub uses_report_writer: bool,
}

impl MigrationMetrics {
    pub fn new() -> Self {
        Self {
            cyclomatic_complexity: 1,
            ..Self::default()
        }
    }
}

/// Complexity normalized to program size. A zero-LOC program has no
/// decision density.
pub fn per_100_loc(count: u32, loc: usize) -> f64 {
    if loc == 0 {
        return 0.0;
    }
    count as f64 / loc as f64 * 100.0
}

pub fn average_complexity(complexities: &[u32]) -> f64 {
    if complexities.is_empty() {
        return 0.0;
    }
    let sum: u32 = complexities.iter().sum();
    sum as f64 / complexities.len() as f64
}

pub fn max_complexity(complexities: &[u32]) -> u32 {
    complexities.iter().copied().max().unwrap_or(0)
}
