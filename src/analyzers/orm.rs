//! ORM mapping file analysis.
//!
//! Classifies XML mapping artifacts by sniffing content rather than
//! trusting extensions, extracts the embedded SQL bodies each format
//! carries, and scans every statement for PostgreSQL-specific syntax,
//! functions, and data types. The four mapper formats are a closed set
//! selected by a pure classification function; an unrecognized file
//! falls through to an empty generic result.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::core::{MapperKind, OrmAnalysisResult, SqlStatement};

static MYBATIS_STMT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?is)<(select|insert|update|delete)\b[^>]*?\bid\s*=\s*"([^"]*)"[^>]*>(.*?)</(?:select|insert|update|delete)>"#,
    )
    .unwrap()
});
static JPA_QUERY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<named-query\b[^>]*?\bname\s*=\s*"([^"]*)"[^>]*>(.*?)</named-query>"#)
        .unwrap()
});
static HIBERNATE_QUERY_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?is)<(sql-query|query)\b([^>]*)>(.*?)</(?:sql-query|query)>"#).unwrap()
});
static NAME_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\bname\s*=\s*"([^"]*)""#).unwrap());
static RESULT_MAP_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)<resultMap\b").unwrap());
static DYNAMIC_SQL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<(if|choose|when|foreach|where|set)\b").unwrap());
static TYPE_HANDLER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?i)\btypeHandler\s*=\s*"([^"]*)""#).unwrap());
static XML_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").unwrap());

/// PostgreSQL-specific syntax, first column is a word-boundary regex.
static PG_SYNTAX: &[(&str, &str)] = &[
    (r"\bLIMIT\b", "LIMIT clause"),
    (r"\bOFFSET\b", "OFFSET clause"),
    (r"\bRETURNING\b", "RETURNING clause"),
    (r"\bON\s+CONFLICT\b", "ON CONFLICT clause"),
    (r"\bILIKE\b", "ILIKE operator"),
    (r"\bDISTINCT\s+ON\b", "DISTINCT ON expression"),
];

/// Operator fragments checked by plain substring containment.
static PG_OPERATORS: &[(&str, &str)] = &[
    ("@>", "JSONB containment operator @>"),
    ("<@", "JSONB containment operator <@"),
    ("->>", "JSON field extraction operator ->>"),
    ("->", "JSON field extraction operator ->"),
];

static PG_FUNCTIONS: &[&str] = &[
    "NEXTVAL",
    "CURRVAL",
    "SETVAL",
    "GENERATE_SERIES",
    "STRING_AGG",
    "ARRAY_AGG",
    "DATE_TRUNC",
    "TO_TSVECTOR",
    "TO_TSQUERY",
    "JSONB_SET",
    "JSONB_BUILD_OBJECT",
];

static PG_DATA_TYPES: &[&str] = &[
    "JSONB", "JSON", "UUID", "BYTEA", "BIGSERIAL", "SERIAL", "TIMESTAMPTZ", "INET", "CIDR",
    "TSVECTOR",
];

/// Analyze one ORM mapping file.
pub fn analyze_orm_config(path: &Path, content: &str) -> OrmAnalysisResult {
    let mapper_kind = detect_mapper_kind(content);
    let statements = match mapper_kind {
        MapperKind::MyBatis => extract_mybatis_statements(content),
        MapperKind::Jpa => extract_jpa_statements(content),
        MapperKind::Hibernate => extract_hibernate_statements(content),
        MapperKind::Unknown => Vec::new(),
    };

    let (result_map_count, dynamic_sql_count, type_handlers) = match mapper_kind {
        MapperKind::MyBatis => (
            RESULT_MAP_RE.find_iter(content).count(),
            DYNAMIC_SQL_RE.find_iter(content).count(),
            TYPE_HANDLER_RE
                .captures_iter(content)
                .map(|c| c[1].to_string())
                .collect(),
        ),
        _ => (0, 0, Vec::new()),
    };

    OrmAnalysisResult {
        source_path: path.to_path_buf(),
        mapper_kind,
        statements,
        result_map_count,
        dynamic_sql_count,
        type_handlers,
    }
}

/// Content sniffing: a mapper is what its markup says it is, whatever
/// the file is named.
pub fn detect_mapper_kind(content: &str) -> MapperKind {
    if content.contains("<mapper") || content.contains("mybatis.org//DTD Mapper") {
        MapperKind::MyBatis
    } else if content.contains("<persistence") || content.contains("<entity-mappings") {
        MapperKind::Jpa
    } else if content.contains("<hibernate-mapping") {
        MapperKind::Hibernate
    } else {
        MapperKind::Unknown
    }
}

fn extract_mybatis_statements(content: &str) -> Vec<SqlStatement> {
    MYBATIS_STMT_RE
        .captures_iter(content)
        .map(|caps| build_statement(&caps[2], &caps[1].to_lowercase(), &caps[3]))
        .collect()
}

fn extract_jpa_statements(content: &str) -> Vec<SqlStatement> {
    JPA_QUERY_RE
        .captures_iter(content)
        .map(|caps| build_statement(&caps[1], "named-query", &caps[2]))
        .collect()
}

fn extract_hibernate_statements(content: &str) -> Vec<SqlStatement> {
    HIBERNATE_QUERY_RE
        .captures_iter(content)
        .enumerate()
        .map(|(idx, caps)| {
            let id = NAME_ATTR_RE
                .captures(&caps[2])
                .map(|c| c[1].to_string())
                .unwrap_or_else(|| format!("query-{}", idx + 1));
            build_statement(&id, &caps[1].to_lowercase(), &caps[3])
        })
        .collect()
}

fn build_statement(id: &str, kind: &str, raw_body: &str) -> SqlStatement {
    let sql = clean_sql_body(raw_body);
    let postgresql_features = scan_postgresql_features(&sql);
    SqlStatement {
        id: id.to_string(),
        statement_kind: kind.to_string(),
        postgresql_dependent: !postgresql_features.is_empty(),
        sql,
        postgresql_features,
    }
}

/// Strip CDATA wrappers and nested markup, then unescape XML entities.
fn clean_sql_body(body: &str) -> String {
    let without_cdata = body.replace("<![CDATA[", "").replace("]]>", "");
    let without_tags = XML_TAG_RE.replace_all(&without_cdata, " ");
    unescape_xml(&without_tags)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn unescape_xml(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

/// Scan one SQL statement for PostgreSQL-specific features. Each table
/// entry is recorded at most once per statement.
pub fn scan_postgresql_features(sql: &str) -> Vec<String> {
    static SYNTAX_RES: Lazy<Vec<(Regex, &str)>> = Lazy::new(|| {
        PG_SYNTAX
            .iter()
            .map(|(pat, label)| (Regex::new(pat).unwrap(), *label))
            .collect()
    });
    static TYPE_RES: Lazy<Vec<(Regex, &str)>> = Lazy::new(|| {
        PG_DATA_TYPES
            .iter()
            .map(|t| (Regex::new(&format!(r"\b{t}\b")).unwrap(), *t))
            .collect()
    });

    let upper = sql.to_uppercase();
    let mut features = Vec::new();

    for (re, label) in SYNTAX_RES.iter() {
        if re.is_match(&upper) {
            features.push((*label).to_string());
        }
    }
    for (op, label) in PG_OPERATORS {
        if upper.contains(op) {
            features.push((*label).to_string());
        }
    }
    for name in PG_FUNCTIONS {
        if upper.contains(&format!("{name}(")) {
            features.push(format!("PostgreSQL function {name}"));
        }
    }
    for (re, name) in TYPE_RES.iter() {
        if re.is_match(&upper) {
            features.push(format!("PostgreSQL data type {name}"));
        }
    }

    features
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffing_ignores_extension() {
        assert_eq!(detect_mapper_kind("<mapper namespace=\"x\">"), MapperKind::MyBatis);
        assert_eq!(detect_mapper_kind("<entity-mappings>"), MapperKind::Jpa);
        assert_eq!(detect_mapper_kind("<hibernate-mapping>"), MapperKind::Hibernate);
        assert_eq!(detect_mapper_kind("<project/>"), MapperKind::Unknown);
    }

    #[test]
    fn cdata_and_entities_are_stripped() {
        let sql = clean_sql_body("<![CDATA[SELECT * FROM t WHERE a &lt; 5]]>");
        assert_eq!(sql, "SELECT * FROM t WHERE a < 5");
    }

    #[test]
    fn feature_scan_hits_limit_and_offset() {
        let features = scan_postgresql_features("SELECT id FROM t LIMIT 10 OFFSET 5");
        assert!(features.contains(&"LIMIT clause".to_string()));
        assert!(features.contains(&"OFFSET clause".to_string()));
    }

    #[test]
    fn serial_does_not_match_inside_bigserial() {
        let features = scan_postgresql_features("CREATE TABLE t (id BIGSERIAL)");
        assert!(features.contains(&"PostgreSQL data type BIGSERIAL".to_string()));
        assert!(!features.contains(&"PostgreSQL data type SERIAL".to_string()));
    }
}
