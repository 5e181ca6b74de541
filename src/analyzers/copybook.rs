//! Copybook record layout analysis.
//!
//! Reconstructs hierarchical record layouts from flat level-numbered
//! field declarations, computing byte offsets and lengths from PIC
//! clauses, inferring keys and business meaning from naming conventions,
//! and guessing the business entity a copybook describes.
//!
//! The builder threads an explicit parser state (`LayoutBuilder`) through
//! a fold over the classified lines: the running byte offset and the
//! ancestor stack live in that state rather than in outer-scope mutable
//! variables, so each step is testable in isolation.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::analyzers::lines::classify_lines;
use crate::config::AnalysisConfig;
use crate::core::{
    CopybookAnalysisResult, CopybookField, CopybookMetrics, DataType, EntityType, InferredEntity,
    KeyStructure, KeyType, RecordLayout, SourceLine,
};

static FIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})\s+([A-Za-z][A-Za-z0-9-]*)").unwrap());
static PIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bPIC(?:TURE)?\s+(?:IS\s+)?([^\s]+)").unwrap());
static USAGE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(COMP-[1-5]|COMP|COMPUTATIONAL(?:-[1-5])?|BINARY|PACKED-DECIMAL|DISPLAY|INDEX)\b")
        .unwrap()
});
static OCCURS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bOCCURS\s+(\d+)").unwrap());
static REDEFINES_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bREDEFINES\s+([A-Za-z0-9-]+)").unwrap());
static VALUE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bVALUE\s+(?:IS\s+)?('[^']*'|"[^"]*"|[A-Za-z0-9+.-]+)"#).unwrap()
});
static COPY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bCOPY\s+([A-Za-z0-9-]+)").unwrap());

/// Ordered first-match-wins table mapping field-name substrings to a
/// business meaning label.
static BUSINESS_MEANINGS: &[(&[&str], &str)] = &[
    (&["CUST", "CLIENT"], "Customer information"),
    (&["ACCT", "ACCOUNT"], "Account information"),
    (&["ORDER", "ORD-"], "Order information"),
    (&["PROD", "ITEM"], "Product information"),
    (&["EMP", "EMPLOYEE"], "Employee information"),
    (&["INV", "INVOICE"], "Invoice information"),
    (&["AMT", "AMOUNT"], "Monetary amount"),
    (&["BAL", "BALANCE"], "Balance amount"),
    (&["QTY", "QUANTITY"], "Quantity"),
    (&["RATE", "PCT"], "Rate or percentage"),
    (&["DATE", "-DT", "YYMMDD"], "Date value"),
    (&["TIME", "-TM"], "Time value"),
    (&["NAME", "-NM"], "Name"),
    (&["ADDR", "ADDRESS"], "Address"),
    (&["PHONE", "-TEL"], "Phone number"),
    (&["STAT", "STATUS"], "Status code"),
    (&["FLAG", "-IND", "-SW"], "Indicator flag"),
];

/// Canonical identifier fields that pin down the business entity. First
/// match wins and overrides the inferred entity name and type.
static CANONICAL_IDS: &[(&str, &str, EntityType)] = &[
    ("CUST-ID", "Customer", EntityType::Master),
    ("ACCT-ID", "Account", EntityType::Master),
    ("ORDER-ID", "Order", EntityType::Transaction),
    ("EMP-ID", "Employee", EntityType::Master),
    ("PROD-ID", "Product", EntityType::Master),
    ("ITEM-ID", "Item", EntityType::Master),
    ("INV-NO", "Invoice", EntityType::Transaction),
    ("PART-NO", "Part", EntityType::Master),
];

static KEY_HINTS: &[&str] = &["KEY", "-ID", "-CD", "-CODE", "-NO", "-NUM", "-NBR"];

static MASTER_HINTS: &[&str] = &["MAST", "MST", "MASTER"];
static TRANSACTION_HINTS: &[&str] = &["TRANS", "TXN", "TRN"];

/// Record-name substring table for entity-type tagging.
static ENTITY_TYPE_HINTS: &[(&[&str], EntityType)] = &[
    (&["MAST", "MST"], EntityType::Master),
    (&["TRANS", "TXN", "TRN"], EntityType::Transaction),
    (&["REF", "CODE", "TBL"], EntityType::Reference),
    (&["WORK", "WRK", "TEMP"], EntityType::Work),
    (&["HDR", "HEADER"], EntityType::Header),
    (&["DTL", "DETAIL"], EntityType::Detail),
];

/// Analyze one copybook source file.
pub fn analyze_copybook(
    path: &Path,
    content: &str,
    config: &AnalysisConfig,
) -> CopybookAnalysisResult {
    let lines = classify_lines(content, config.fixed_column_comments);

    let builder = lines
        .iter()
        .filter(|l| l.is_code())
        .fold(LayoutBuilder::default(), |b, line| b.step(line));
    let records = builder.finish();

    let copybook_name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("UNKNOWN")
        .to_uppercase();

    let metrics = collect_metrics(&records, lines.len());
    let entity = infer_entity(&copybook_name, &records);

    CopybookAnalysisResult {
        copybook_name,
        source_path: path.to_path_buf(),
        records,
        entity,
        referenced_copybooks: referenced_copybooks(&lines),
        metrics,
    }
}

/// Compute the byte length of a PIC clause.
///
/// Repetition groups `c(n)` are expanded first, then one unit is counted
/// for every character in {X,9,A,Z,B,S,+,-} and for an actual decimal
/// point. `V` is an implied decimal and occupies no byte.
pub fn picture_length(pic: &str) -> u32 {
    let upper = pic.trim_end_matches('.').to_uppercase();
    let expanded = expand_picture(&upper);
    expanded
        .chars()
        .filter(|c| matches!(c, 'X' | '9' | 'A' | 'Z' | 'B' | 'S' | '+' | '-' | '.'))
        .count() as u32
}

fn expand_picture(pic: &str) -> String {
    let mut out = String::new();
    let mut chars = pic.chars().peekable();
    while let Some(c) = chars.next() {
        let repeatable = matches!(c, 'X' | '9' | 'A' | 'Z' | 'S' | '-' | 'V' | '+' | ',' | '.');
        if repeatable && chars.peek() == Some(&'(') {
            chars.next();
            let mut digits = String::new();
            for d in chars.by_ref() {
                if d == ')' {
                    break;
                }
                digits.push(d);
            }
            let n: usize = digits.trim().parse().unwrap_or(1);
            for _ in 0..n {
                out.push(c);
            }
        } else {
            out.push(c);
        }
    }
    out
}

/// Data-type classification, first match wins: explicit packed or binary
/// usage, then PIC character classes, defaulting to alphanumeric.
fn classify_data_type(picture: Option<&str>, usage: Option<&str>) -> DataType {
    let usage = usage.map(|u| u.to_uppercase()).unwrap_or_default();
    if usage.contains("COMP-3") || usage.contains("COMPUTATIONAL-3") || usage.contains("PACKED") {
        return DataType::Packed;
    }
    if usage.contains("COMP") || usage.contains("BINARY") {
        return DataType::Binary;
    }
    let Some(pic) = picture else {
        return DataType::Group;
    };
    let pic = pic.to_uppercase();
    if pic.contains('X') || pic.contains('A') {
        DataType::Alphanumeric
    } else if pic.contains('9') || pic.contains('S') || pic.contains('V') {
        DataType::Numeric
    } else {
        DataType::Alphanumeric
    }
}

fn business_meaning(name: &str) -> String {
    let upper = name.to_uppercase();
    BUSINESS_MEANINGS
        .iter()
        .find(|(hints, _)| hints.iter().any(|h| upper.contains(h)))
        .map(|(_, label)| (*label).to_string())
        .unwrap_or_else(|| "Business data".to_string())
}

fn is_key_candidate(name: &str) -> bool {
    let upper = name.to_uppercase();
    KEY_HINTS.iter().any(|h| upper.contains(h))
}

fn classify_key(name: &str) -> KeyType {
    let upper = name.to_uppercase();
    if upper.contains("FK") || upper.contains("FOREIGN") {
        return KeyType::Foreign;
    }
    // Identifier suffixes mark the record's own key; KEY and -ID names
    // are primary unless an ALT prefix demotes them
    if upper.contains("PRIMARY")
        || ((upper.contains("KEY") || upper.contains("-ID")) && !upper.contains("ALT"))
    {
        return KeyType::Primary;
    }
    KeyType::Alternate
}

fn entity_type_for_record(name: &str) -> EntityType {
    let upper = name.to_uppercase();
    ENTITY_TYPE_HINTS
        .iter()
        .find(|(hints, _)| hints.iter().any(|h| upper.contains(h)))
        .map(|(_, t)| *t)
        .unwrap_or(EntityType::Data)
}

/// One field declaration parsed from a source line.
#[derive(Clone, Debug, PartialEq)]
struct ParsedField {
    level: u8,
    name: String,
    picture: Option<String>,
    usage: Option<String>,
    occurs: Option<u32>,
    redefines: Option<String>,
    value: Option<String>,
}

fn parse_field(text: &str) -> Option<ParsedField> {
    let trimmed = text.trim();
    let caps = FIELD_RE.captures(trimmed)?;
    let level: u8 = caps[1].parse().ok()?;
    let name = caps[2].to_uppercase();
    let rest = &trimmed[caps.get(0).map(|m| m.end()).unwrap_or(0)..];

    Some(ParsedField {
        level,
        name,
        picture: PIC_RE
            .captures(rest)
            .map(|c| c[1].trim_end_matches('.').to_uppercase()),
        usage: USAGE_RE.captures(rest).map(|c| c[1].to_uppercase()),
        occurs: OCCURS_RE.captures(rest).and_then(|c| c[1].parse().ok()),
        redefines: REDEFINES_RE.captures(rest).map(|c| c[1].to_uppercase()),
        value: VALUE_RE.captures(rest).map(|c| c[1].to_string()),
    })
}

/// Explicit parser state folded over the line sequence.
#[derive(Debug, Default)]
struct LayoutBuilder {
    records: Vec<RecordLayout>,
    current: Option<OpenRecord>,
}

/// The record currently being built: its completed top-level fields plus
/// the stack of still-open ancestors (innermost last).
#[derive(Debug)]
struct OpenRecord {
    name: String,
    fields: Vec<CopybookField>,
    stack: Vec<CopybookField>,
    /// Running byte offset, taken before each elementary field is parsed
    offset: u32,
}

impl LayoutBuilder {
    fn step(mut self, line: &SourceLine) -> Self {
        let Some(parsed) = parse_field(&line.text) else {
            return self;
        };

        // FILLER advances storage but is never materialized as a node
        if parsed.name == "FILLER" {
            if let Some(record) = self.current.as_mut() {
                record.offset += parsed.picture.as_deref().map(picture_length).unwrap_or(0)
                    * parsed.occurs.unwrap_or(1);
            }
            return self;
        }

        if parsed.level == 1 {
            self.close_current();
            self.current = Some(OpenRecord::new(&parsed));
            return self;
        }

        let Some(record) = self.current.as_mut() else {
            // Orphan field before any level 01: best-effort skip
            return self;
        };
        record.push(parsed);
        self
    }

    fn close_current(&mut self) {
        if let Some(record) = self.current.take() {
            self.records.push(record.close());
        }
    }

    fn finish(mut self) -> Vec<RecordLayout> {
        self.close_current();
        self.records
    }
}

impl OpenRecord {
    fn new(parsed: &ParsedField) -> Self {
        Self {
            name: parsed.name.clone(),
            fields: Vec::new(),
            stack: vec![make_field(parsed, 0)],
            offset: 0,
        }
    }

    fn push(&mut self, parsed: ParsedField) {
        // Ancestors at the same or deeper level can no longer own children
        while self
            .stack
            .last()
            .is_some_and(|top| top.level >= parsed.level)
        {
            let done = self.stack.pop().unwrap();
            self.attach(done);
        }

        let field = make_field(&parsed, self.offset);
        self.offset += field.length * parsed.occurs.unwrap_or(1);

        if parsed.level == 88 {
            // Condition names join the tree but never take children
            match self.stack.last_mut() {
                Some(parent) => parent.children.push(field),
                None => self.fields.push(field),
            }
        } else {
            self.stack.push(field);
        }
    }

    fn attach(&mut self, field: CopybookField) {
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(field),
            None => self.fields.push(field),
        }
    }

    fn close(mut self) -> RecordLayout {
        while let Some(done) = self.stack.pop() {
            self.attach(done);
        }
        let total_length = self.fields.iter().map(|f| f.effective_length()).sum();
        let keys = infer_keys(&self.fields);
        let entity_type = entity_type_for_record(&self.name);
        RecordLayout {
            name: self.name,
            fields: self.fields,
            total_length,
            keys,
            entity_type,
        }
    }
}

fn make_field(parsed: &ParsedField, offset: u32) -> CopybookField {
    let length = match parsed.picture.as_deref() {
        Some(pic) if parsed.level != 88 => picture_length(pic),
        _ => 0,
    };
    let data_type = if parsed.picture.is_none() {
        DataType::Group
    } else {
        classify_data_type(parsed.picture.as_deref(), parsed.usage.as_deref())
    };

    CopybookField {
        name: parsed.name.clone(),
        level: parsed.level,
        picture: parsed.picture.clone(),
        usage: parsed.usage.clone(),
        occurs: parsed.occurs,
        redefines: parsed.redefines.clone(),
        value: parsed.value.clone(),
        offset,
        length,
        data_type,
        probable_key: is_key_candidate(&parsed.name),
        business_meaning: business_meaning(&parsed.name),
        children: Vec::new(),
    }
}

fn infer_keys(fields: &[CopybookField]) -> Vec<KeyStructure> {
    let mut keys = Vec::new();
    walk(fields, &mut |field| {
        if field.level != 88 && field.probable_key {
            let key_type = classify_key(&field.name);
            keys.push(KeyStructure {
                name: field.name.clone(),
                key_type,
                fields: vec![field.name.clone()],
                unique: key_type == KeyType::Primary,
            });
        }
    });
    keys
}

fn walk(fields: &[CopybookField], f: &mut impl FnMut(&CopybookField)) {
    for field in fields {
        f(field);
        walk(&field.children, f);
    }
}

/// Infer the business entity a copybook describes. Confidence starts at
/// 0.5 and grows additively with each independent signal, clamped to 1.0.
fn infer_entity(copybook_name: &str, records: &[RecordLayout]) -> InferredEntity {
    let mut confidence: f64 = 0.5;
    let mut evidence = Vec::new();
    let mut entity_type = EntityType::Unknown;
    let mut name = copybook_name.to_string();

    let primary_name = records
        .first()
        .map(|r| r.name.to_uppercase())
        .unwrap_or_default();

    if MASTER_HINTS.iter().any(|h| primary_name.contains(h)) {
        confidence += 0.2;
        entity_type = EntityType::Master;
        evidence.push(format!("Record name {primary_name} matches master file pattern"));
    }
    // Evaluated after the master check; a name matching both patterns
    // ends up Transaction (kept for output parity with prior behavior)
    if TRANSACTION_HINTS.iter().any(|h| primary_name.contains(h)) {
        confidence += 0.2;
        entity_type = EntityType::Transaction;
        evidence.push(format!(
            "Record name {primary_name} matches transaction file pattern"
        ));
    }

    if records
        .iter()
        .flat_map(|r| r.keys.iter())
        .any(|k| k.key_type == KeyType::Primary)
    {
        confidence += 0.15;
        evidence.push("Primary key field present".to_string());
    }

    'ids: for record in records {
        let mut found = None;
        walk(&record.fields, &mut |field| {
            if found.is_none() {
                let upper = field.name.to_uppercase();
                if let Some(hit) = CANONICAL_IDS.iter().find(|(id, _, _)| upper.contains(id)) {
                    found = Some((field.name.clone(), *hit));
                }
            }
        });
        if let Some((field_name, (id, entity_name, id_type))) = found {
            confidence += 0.15;
            name = entity_name.to_string();
            entity_type = id_type;
            evidence.push(format!("Field {field_name} carries canonical identifier {id}"));
            break 'ids;
        }
    }

    InferredEntity {
        name,
        entity_type,
        confidence: confidence.min(1.0),
        evidence,
    }
}

/// COPY targets, case-insensitive, deduplicated, first appearance kept.
fn referenced_copybooks(lines: &[SourceLine]) -> Vec<String> {
    let mut refs: Vec<String> = Vec::new();
    for line in lines.iter().filter(|l| l.is_code()) {
        for caps in COPY_RE.captures_iter(&line.text) {
            let name = caps[1].to_uppercase();
            if !refs.contains(&name) {
                refs.push(name);
            }
        }
    }
    refs
}

fn collect_metrics(records: &[RecordLayout], total_lines: usize) -> CopybookMetrics {
    let mut metrics = CopybookMetrics {
        total_lines,
        ..CopybookMetrics::default()
    };
    for record in records {
        walk(&record.fields, &mut |field| {
            let has_data_children = field.children.iter().any(|c| c.level != 88);
            if has_data_children {
                metrics.group_items += 1;
            } else if field.level != 88 {
                metrics.elementary_items += 1;
            }
            if field.redefines.is_some() {
                metrics.redefines_count += 1;
            }
            if field.occurs.is_some() {
                metrics.occurs_count += 1;
            }
        });
    }
    metrics
}
