use cobmap::analyzers::lines::classify_lines;
use cobmap::analyzers::program::{
    analyze_program, extract_dependencies, extract_divisions, extract_paragraphs,
    migration_metrics,
};
use cobmap::config::AnalysisConfig;
use indoc::indoc;
use pretty_assertions::assert_eq;
use std::path::Path;

fn lines(src: &str) -> Vec<cobmap::SourceLine> {
    classify_lines(src, false)
}

#[test]
fn divisions_extracted_in_source_order() {
    let src = indoc! {"
        IDENTIFICATION DIVISION.
        PROGRAM-ID. ORDPROC.
        data division.
        PROCEDURE DIVISION.
    "};
    let divisions = extract_divisions(&lines(src));
    assert_eq!(
        divisions,
        vec![
            "IDENTIFICATION DIVISION".to_string(),
            "DATA DIVISION".to_string(),
            "PROCEDURE DIVISION".to_string(),
        ]
    );
}

#[test]
fn duplicate_divisions_are_kept() {
    let src = "DATA DIVISION.\nDATA DIVISION.\n";
    assert_eq!(extract_divisions(&lines(src)).len(), 2);
}

#[test]
fn paragraph_labels_exclude_division_keyword() {
    let src = indoc! {"
        MAIN-PARA.
            PERFORM INIT-PARA.
        INIT-PARA.
        DIVISION.
        2000-WRAP-UP.
    "};
    let paragraphs = extract_paragraphs(&lines(src));
    assert_eq!(paragraphs, vec!["MAIN-PARA".to_string(), "INIT-PARA".to_string()]);
}

#[test]
fn dependencies_deduplicated_across_call_and_copy() {
    let src = indoc! {"
        COPY CUSTREC.
        CALL 'SUBPGM1' USING WS-AREA.
        call \"subpgm1\" using ws-area.
        COPY CUSTREC.
        CALL 'SUBPGM2'.
    "};
    let deps = extract_dependencies(&lines(src));
    assert_eq!(
        deps,
        vec![
            "CUSTREC".to_string(),
            "SUBPGM1".to_string(),
            "SUBPGM2".to_string(),
        ]
    );
}

#[test]
fn cyclomatic_complexity_is_one_without_decisions() {
    let src = indoc! {"
        MOVE A TO B.
        DISPLAY 'HELLO'.
        ADD 1 TO COUNTER.
    "};
    let metrics = migration_metrics(&lines(src), &[]);
    assert_eq!(metrics.cyclomatic_complexity, 1);
}

#[test]
fn decision_keywords_accumulate_independently() {
    let src = indoc! {"
        IF WS-A = WS-B
            EVALUATE WS-STATE
                WHEN 1 MOVE 'X' TO Y
                WHEN 2 MOVE 'Z' TO Y
            END-EVALUATE
        END-IF.
        PERFORM LOOP-PARA UNTIL DONE = 'Y'.
        GO TO EXIT-PARA.
    "};
    let m = migration_metrics(&lines(src), &[]);
    // seed 1 + IF + EVALUATE + 2 WHEN + PERFORM UNTIL + GO TO
    assert_eq!(m.cyclomatic_complexity, 7);
    assert_eq!(m.evaluate_count, 1);
    assert_eq!(m.goto_count, 1);
    assert_eq!(m.perform_count, 1);
}

#[test]
fn nested_if_depth_reports_maximum_not_final() {
    let src = indoc! {"
        IF A = 1
            IF B = 2
                IF C = 3
                    MOVE 1 TO X
                END-IF
            END-IF
        END-IF.
        IF D = 4
        END-IF.
    "};
    let m = migration_metrics(&lines(src), &[]);
    assert_eq!(m.max_nested_if_depth, 3);
}

#[test]
fn file_operations_counted_as_whole_words() {
    let src = indoc! {"
        OPEN INPUT CUSTOMER-FILE.
        READ CUSTOMER-FILE.
        REWRITE CUSTOMER-RECORD.
        CLOSE CUSTOMER-FILE.
    "};
    let m = migration_metrics(&lines(src), &[]);
    assert_eq!(m.file_operation_count, 4);
}

#[test]
fn embedded_sql_and_comp3_counted() {
    let src = indoc! {"
        EXEC SQL SELECT BAL INTO :WS-BAL FROM ACCT END-EXEC.
        05 WS-AMT PIC S9(7)V99 COMP-3.
    "};
    let m = migration_metrics(&lines(src), &[]);
    assert_eq!(m.sql_statement_count, 1);
    assert_eq!(m.comp3_count, 1);
    assert_eq!(m.complex_pic_count, 1);
}

#[test]
fn assembly_call_tokens_come_from_configuration() {
    let src = "CALL 'XYZPGM' USING PARM-AREA OF SHOPLIB.\n";
    let none = migration_metrics(&lines(src), &[]);
    assert_eq!(none.assembly_call_count, 0);

    let tokens = vec!["SHOPLIB".to_string()];
    let m = migration_metrics(&lines(src), &tokens);
    assert_eq!(m.assembly_call_count, 1);
}

#[test]
fn report_writer_requires_both_tokens() {
    let m = migration_metrics(&lines("REPORT SECTION.\n"), &[]);
    assert!(m.uses_report_writer);
    let m = migration_metrics(&lines("WORKING-STORAGE SECTION.\n"), &[]);
    assert!(!m.uses_report_writer);
}

#[test]
fn comment_lines_do_not_contribute() {
    let src = indoc! {"
        * IF THIS WERE CODE IT WOULD COUNT
        MOVE A TO B.
    "};
    let m = migration_metrics(&lines(src), &[]);
    assert_eq!(m.cyclomatic_complexity, 1);
}

#[test]
fn empty_content_degrades_to_zero_metrics() {
    let config = AnalysisConfig::default();
    let result = analyze_program(Path::new("empty.cbl"), "", &config);
    assert_eq!(result.total_loc, 0);
    assert_eq!(result.cyclomatic_complexity, 1);
    assert!(result.divisions.is_empty());
    assert!(result.paragraphs.is_empty());
    assert!(result.dependencies.is_empty());
}

#[test]
fn program_name_from_program_id_else_file_stem() {
    let config = AnalysisConfig::default();
    let with_id = analyze_program(
        Path::new("x.cbl"),
        "IDENTIFICATION DIVISION.\nPROGRAM-ID. PAYROLL.\n",
        &config,
    );
    assert_eq!(with_id.program_name, "PAYROLL");

    let without_id = analyze_program(Path::new("ordproc.cbl"), "MOVE A TO B.\n", &config);
    assert_eq!(without_id.program_name, "ordproc");
}

#[test]
fn analysis_is_idempotent() {
    let src = indoc! {"
        IDENTIFICATION DIVISION.
        PROGRAM-ID. ORDPROC.
        PROCEDURE DIVISION.
        MAIN-PARA.
            IF WS-FLAG = 'Y'
                PERFORM SUB-PARA UNTIL DONE
            END-IF.
    "};
    let config = AnalysisConfig::default();
    let first = analyze_program(Path::new("ordproc.cbl"), src, &config);
    let second = analyze_program(Path::new("ordproc.cbl"), src, &config);
    assert_eq!(first, second);
}
