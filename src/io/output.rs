use crate::core::metrics::average_complexity;
use crate::core::{CopybookField, Difficulty, ProjectAnalysis, RecordLayout};
use colored::*;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Markdown,
    Terminal,
}

pub trait OutputWriter {
    fn write_results(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()>;
}

pub fn create_writer(
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(std::io::stdout()),
    };

    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Markdown => Box::new(MarkdownWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TerminalWriter::new(sink)),
    })
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_results(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(results)?;
        self.writer.write_all(json.as_bytes())?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }
}

pub struct MarkdownWriter<W: Write> {
    writer: W,
}

impl<W: Write> MarkdownWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for MarkdownWriter<W> {
    fn write_results(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        self.write_header(results)?;
        self.write_summary(results)?;
        self.write_program_scores(results)?;
        self.write_findings(results)?;
        self.write_record_layouts(results)?;
        self.write_orm_section(results)?;
        Ok(())
    }
}

impl<W: Write> MarkdownWriter<W> {
    fn write_header(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        writeln!(self.writer, "# COBOL Migration Assessment")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "Generated: {}",
            results.timestamp.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        writeln!(
            self.writer,
            "Project: `{}`",
            results.project_path.display()
        )?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_summary(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        let score = &results.migration_complexity;
        let total_loc: usize = results.programs.iter().map(|p| p.analysis.total_loc).sum();
        let complexities: Vec<u32> = results
            .programs
            .iter()
            .map(|p| p.analysis.cyclomatic_complexity)
            .collect();

        writeln!(self.writer, "## Summary")?;
        writeln!(self.writer)?;
        writeln!(self.writer, "| Metric | Value |")?;
        writeln!(self.writer, "|--------|-------|")?;
        writeln!(self.writer, "| Programs | {} |", results.programs.len())?;
        writeln!(self.writer, "| Copybooks | {} |", results.copybooks.len())?;
        writeln!(
            self.writer,
            "| ORM configurations | {} |",
            results.orm_configs.len()
        )?;
        writeln!(self.writer, "| Total LOC | {} |", total_loc)?;
        writeln!(
            self.writer,
            "| Average complexity | {:.1} |",
            average_complexity(&complexities)
        )?;
        writeln!(
            self.writer,
            "| Migration difficulty | **{}** ({}/100) |",
            score.difficulty, score.overall
        )?;
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", score.description)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_program_scores(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        if results.programs.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Program Scores")?;
        writeln!(self.writer)?;
        writeln!(
            self.writer,
            "| Program | LOC | Complexity | Logic | Data | Risk | Overall | Difficulty |"
        )?;
        writeln!(
            self.writer,
            "|---------|-----|------------|-------|------|------|---------|------------|"
        )?;
        for program in &results.programs {
            let a = &program.analysis;
            let s = &program.score;
            writeln!(
                self.writer,
                "| {} | {} | {} | {} | {} | {} | {} | {} |",
                a.program_name,
                a.total_loc,
                a.cyclomatic_complexity,
                s.logic_score,
                s.data_score,
                s.risk_score,
                s.overall,
                s.difficulty
            )?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_findings(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        let score = &results.migration_complexity;
        let sections = [
            ("Logic", &score.logic_findings),
            ("Data", &score.data_findings),
            ("COBOL-Specific Risk", &score.risk_findings),
        ];
        if sections.iter().all(|(_, f)| f.is_empty()) {
            return Ok(());
        }

        writeln!(self.writer, "## Findings")?;
        writeln!(self.writer)?;
        for (title, findings) in sections {
            if findings.is_empty() {
                continue;
            }
            writeln!(self.writer, "### {title}")?;
            writeln!(self.writer)?;
            for finding in findings {
                writeln!(self.writer, "- {finding}")?;
            }
            writeln!(self.writer)?;
        }
        Ok(())
    }

    fn write_record_layouts(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        if results.copybooks.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## Record Layouts")?;
        writeln!(self.writer)?;
        for copybook in &results.copybooks {
            writeln!(
                self.writer,
                "### {} ({}, confidence {:.2})",
                copybook.copybook_name, copybook.entity.name, copybook.entity.confidence
            )?;
            writeln!(self.writer)?;
            for record in &copybook.records {
                self.write_record(record)?;
            }
        }
        Ok(())
    }

    fn write_record(&mut self, record: &RecordLayout) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "**{}**: {} entity, {} bytes",
            record.name, record.entity_type, record.total_length
        )?;
        writeln!(self.writer)?;
        if !record.keys.is_empty() {
            let keys: Vec<String> = record
                .keys
                .iter()
                .map(|k| format!("{} ({:?})", k.name, k.key_type))
                .collect();
            writeln!(self.writer, "Keys: {}", keys.join(", "))?;
            writeln!(self.writer)?;
        }
        writeln!(self.writer, "```")?;
        for field in &record.fields {
            self.write_field(field, 0)?;
        }
        writeln!(self.writer, "```")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_field(&mut self, field: &CopybookField, depth: usize) -> anyhow::Result<()> {
        let indent = "  ".repeat(depth);
        let pic = field
            .picture
            .as_deref()
            .map(|p| format!(" PIC {p}"))
            .unwrap_or_default();
        writeln!(
            self.writer,
            "{}{:02} {}{} [offset {}, len {}, {}]",
            indent,
            field.level,
            field.name,
            pic,
            field.offset,
            field.effective_length(),
            field.data_type
        )?;
        for child in &field.children {
            self.write_field(child, depth + 1)?;
        }
        Ok(())
    }

    fn write_orm_section(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        if results.orm_configs.is_empty() {
            return Ok(());
        }
        writeln!(self.writer, "## ORM Mappings")?;
        writeln!(self.writer)?;
        for orm in &results.orm_configs {
            let pg_dependent = orm
                .statements
                .iter()
                .filter(|s| s.postgresql_dependent)
                .count();
            writeln!(
                self.writer,
                "- `{}` ({}): {} statements, {} PostgreSQL-dependent",
                orm.source_path.display(),
                orm.mapper_kind,
                orm.statements.len(),
                pg_dependent
            )?;
            for statement in orm.statements.iter().filter(|s| s.postgresql_dependent) {
                writeln!(
                    self.writer,
                    "  - `{}`: {}",
                    statement.id,
                    statement.postgresql_features.join(", ")
                )?;
            }
        }
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TerminalWriter<W: Write> {
    writer: W,
}

impl<W: Write> TerminalWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn difficulty_colored(difficulty: Difficulty) -> ColoredString {
        let label = difficulty.to_string();
        match difficulty {
            Difficulty::Low => label.green(),
            Difficulty::Medium => label.yellow(),
            Difficulty::High => label.red(),
            Difficulty::VeryHigh => label.red().bold(),
        }
    }
}

impl<W: Write> OutputWriter for TerminalWriter<W> {
    fn write_results(&mut self, results: &ProjectAnalysis) -> anyhow::Result<()> {
        let score = &results.migration_complexity;

        writeln!(self.writer, "{}", "COBOL Migration Assessment".bold())?;
        writeln!(self.writer, "Project: {}", results.project_path.display())?;
        writeln!(
            self.writer,
            "Analyzed: {} programs, {} copybooks, {} ORM configurations",
            results.programs.len(),
            results.copybooks.len(),
            results.orm_configs.len()
        )?;
        writeln!(self.writer)?;

        writeln!(
            self.writer,
            "Migration difficulty: {} ({}/100)",
            Self::difficulty_colored(score.difficulty),
            score.overall
        )?;
        writeln!(
            self.writer,
            "  logic {:>3}  data {:>3}  risk {:>3}",
            score.logic_score, score.data_score, score.risk_score
        )?;
        writeln!(self.writer, "  {}", score.description)?;
        writeln!(self.writer)?;

        if !results.programs.is_empty() {
            writeln!(
                self.writer,
                "{:<20} {:>6} {:>10} {:>8}  {}",
                "PROGRAM".bold(),
                "LOC",
                "COMPLEXITY",
                "SCORE",
                "DIFFICULTY"
            )?;
            for program in &results.programs {
                let a = &program.analysis;
                writeln!(
                    self.writer,
                    "{:<20} {:>6} {:>10} {:>8}  {}",
                    a.program_name,
                    a.total_loc,
                    a.cyclomatic_complexity,
                    program.score.overall,
                    Self::difficulty_colored(program.score.difficulty)
                )?;
            }
            writeln!(self.writer)?;
        }

        for (title, findings) in [
            ("Logic findings", &score.logic_findings),
            ("Data findings", &score.data_findings),
            ("Risk findings", &score.risk_findings),
        ] {
            if findings.is_empty() {
                continue;
            }
            writeln!(self.writer, "{}", title.bold())?;
            for finding in findings {
                writeln!(self.writer, "  - {finding}")?;
            }
            writeln!(self.writer)?;
        }

        Ok(())
    }
}
