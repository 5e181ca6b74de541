pub mod errors;
pub mod metrics;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub use errors::CobmapError;
pub use metrics::MigrationMetrics;

/// Root structure serialized by the output writers: every per-file result
/// plus the aggregated project score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProjectAnalysis {
    pub project_path: PathBuf,
    pub timestamp: DateTime<Utc>,
    pub programs: Vec<ScoredProgram>,
    pub copybooks: Vec<CopybookAnalysisResult>,
    pub orm_configs: Vec<OrmAnalysisResult>,
    pub migration_complexity: MigrationComplexityScore,
}

/// A program analysis paired with its migration difficulty score.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScoredProgram {
    pub analysis: ProgramAnalysisResult,
    pub score: MigrationComplexityScore,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LineKind {
    Code,
    Comment,
    Blank,
}

/// One logical source line, tagged during classification. Immutable once
/// produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLine {
    /// 1-based line number
    pub number: usize,
    pub text: String,
    pub kind: LineKind,
}

impl SourceLine {
    pub fn is_code(&self) -> bool {
        self.kind == LineKind::Code
    }

    pub fn is_comment(&self) -> bool {
        self.kind == LineKind::Comment
    }
}

/// The kinds of legacy asset the analyzers understand.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileKind {
    Program,
    Copybook,
    OrmConfig,
    Unknown,
}

impl FileKind {
    pub fn from_extension(ext: &str) -> Self {
        static EXTENSION_MAP: &[(&[&str], FileKind)] = &[
            (&["cbl", "cob", "cobol", "ccp", "pco"], FileKind::Program),
            (&["cpy", "copy"], FileKind::Copybook),
            (&["xml"], FileKind::OrmConfig),
        ];

        let ext = ext.to_ascii_lowercase();
        EXTENSION_MAP
            .iter()
            .find(|(exts, _)| exts.contains(&ext.as_str()))
            .map(|(_, kind)| *kind)
            .unwrap_or(FileKind::Unknown)
    }

    pub fn from_path(path: &std::path::Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or(FileKind::Unknown)
    }
}

impl std::fmt::Display for FileKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(FileKind, &str)] = &[
            (FileKind::Program, "COBOL Program"),
            (FileKind::Copybook, "Copybook"),
            (FileKind::OrmConfig, "ORM Configuration"),
            (FileKind::Unknown, "Unknown"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(k, _)| k == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// Structural analysis of one COBOL program source file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProgramAnalysisResult {
    /// From PROGRAM-ID when present, else the file stem
    pub program_name: String,
    pub source_path: PathBuf,
    /// Non-comment, non-blank lines
    pub total_loc: usize,
    pub cyclomatic_complexity: u32,
    /// Division headers in source order, duplicates included
    pub divisions: Vec<String>,
    pub paragraphs: Vec<String>,
    /// CALL and COPY targets, deduplicated
    pub dependencies: Vec<String>,
    pub migration_metrics: MigrationMetrics,
}

/// Storage classification of an elementary copybook field.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataType {
    Alphanumeric,
    Numeric,
    Packed,
    Binary,
    Group,
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(DataType, &str)] = &[
            (DataType::Alphanumeric, "Alphanumeric"),
            (DataType::Numeric, "Numeric"),
            (DataType::Packed, "Packed Decimal"),
            (DataType::Binary, "Binary"),
            (DataType::Group, "Group"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(d, _)| d == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// One field in a record layout tree. Group items carry length 0 directly;
/// their effective length is the recursive sum over children.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopybookField {
    pub name: String,
    /// 01-49 structural, 66 rename, 77 independent, 88 condition-name
    pub level: u8,
    pub picture: Option<String>,
    pub usage: Option<String>,
    pub occurs: Option<u32>,
    pub redefines: Option<String>,
    pub value: Option<String>,
    /// Byte offset within the record, before OCCURS expansion
    pub offset: u32,
    /// PIC-derived byte length; 0 for groups and condition names
    pub length: u32,
    pub data_type: DataType,
    pub probable_key: bool,
    pub business_meaning: String,
    pub children: Vec<CopybookField>,
}

impl CopybookField {
    /// Recursive storage length: groups sum their children, OCCURS
    /// multiplies. Condition names (level 88) occupy no storage and do
    /// not make their parent a group.
    pub fn effective_length(&self) -> u32 {
        let child_sum: u32 = self
            .children
            .iter()
            .filter(|c| c.level != 88)
            .map(|c| c.effective_length())
            .sum();
        let has_data_children = self.children.iter().any(|c| c.level != 88);
        let base = if has_data_children {
            child_sum
        } else {
            self.length
        };
        base * self.occurs.unwrap_or(1)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum KeyType {
    Primary,
    Alternate,
    Foreign,
}

/// A key inferred from field naming conventions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct KeyStructure {
    pub name: String,
    pub key_type: KeyType,
    pub fields: Vec<String>,
    /// True only for primary keys
    pub unique: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityType {
    Master,
    Transaction,
    Reference,
    Work,
    Header,
    Detail,
    Data,
    Unknown,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(EntityType, &str)] = &[
            (EntityType::Master, "Master"),
            (EntityType::Transaction, "Transaction"),
            (EntityType::Reference, "Reference"),
            (EntityType::Work, "Work"),
            (EntityType::Header, "Header"),
            (EntityType::Detail, "Detail"),
            (EntityType::Data, "Data"),
            (EntityType::Unknown, "Unknown"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(e, _)| e == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// One level-01 record structure with its computed layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordLayout {
    pub name: String,
    pub fields: Vec<CopybookField>,
    pub total_length: u32,
    pub keys: Vec<KeyStructure>,
    pub entity_type: EntityType,
}

/// Best-guess business entity for a copybook, with the evidence that
/// built up its confidence.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InferredEntity {
    pub name: String,
    pub entity_type: EntityType,
    /// Additive confidence in [0, 1]
    pub confidence: f64,
    pub evidence: Vec<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopybookMetrics {
    /// Fields with at least one child
    pub group_items: usize,
    /// Leaf fields, excluding level 88
    pub elementary_items: usize,
    pub redefines_count: usize,
    pub occurs_count: usize,
    pub total_lines: usize,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CopybookAnalysisResult {
    pub copybook_name: String,
    pub source_path: PathBuf,
    pub records: Vec<RecordLayout>,
    pub entity: InferredEntity,
    /// COPY targets in first-seen order, deduplicated
    pub referenced_copybooks: Vec<String>,
    pub metrics: CopybookMetrics,
}

/// The closed set of ORM mapper formats recognized by content sniffing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MapperKind {
    MyBatis,
    Jpa,
    Hibernate,
    Unknown,
}

impl std::fmt::Display for MapperKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(MapperKind, &str)] = &[
            (MapperKind::MyBatis, "MyBatis"),
            (MapperKind::Jpa, "JPA"),
            (MapperKind::Hibernate, "Hibernate"),
            (MapperKind::Unknown, "Unknown"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(m, _)| m == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// One SQL statement extracted from a mapper file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SqlStatement {
    /// Statement id or query name from the mapping
    pub id: String,
    /// Tag that carried the statement (select, insert, named-query, ...)
    pub statement_kind: String,
    pub sql: String,
    pub postgresql_features: Vec<String>,
    pub postgresql_dependent: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrmAnalysisResult {
    pub source_path: PathBuf,
    pub mapper_kind: MapperKind,
    pub statements: Vec<SqlStatement>,
    pub result_map_count: usize,
    pub dynamic_sql_count: usize,
    pub type_handlers: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Difficulty {
    Low,
    Medium,
    High,
    VeryHigh,
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        static DISPLAY_STRINGS: &[(Difficulty, &str)] = &[
            (Difficulty::Low, "Low"),
            (Difficulty::Medium, "Medium"),
            (Difficulty::High, "High"),
            (Difficulty::VeryHigh, "Very High"),
        ];

        let display_str = DISPLAY_STRINGS
            .iter()
            .find(|(d, _)| d == self)
            .map(|(_, s)| *s)
            .unwrap_or("Unknown");

        write!(f, "{display_str}")
    }
}

/// Weighted, capped migration difficulty score for one program or a
/// whole project.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MigrationComplexityScore {
    /// Weighted combination of the three category scores, 0-100
    pub overall: u32,
    pub logic_score: u32,
    pub data_score: u32,
    pub risk_score: u32,
    pub difficulty: Difficulty,
    pub description: String,
    pub logic_findings: Vec<String>,
    pub data_findings: Vec<String>,
    pub risk_findings: Vec<String>,
}
