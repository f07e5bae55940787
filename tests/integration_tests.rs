//! Integration tests for the vtab converter.
//!
//! Tests the full pipeline from vtab source to rendered output.

use vtab::{to_ascii_tab, to_event_dump, to_lilypond, AsciiFormatter, Tuning, VtabParser};

#[test]
fn test_ascii_tab_end_to_end() {
    let source = "\
Canon
=====
composer: Trad.

--------
0 | | | |  |
| | | | |  0
--------
";
    let expected = "\
Canon
=====

Composer: Trad.

|---0-|
|-----|
|-----|
|-----|
|-----|
|-0---|

";
    assert_eq!(to_ascii_tab(source), expected);
}

#[test]
fn test_ascii_tab_reports_unparseable_lines() {
    let source = "--------\nThis is gibber\n| | 0 | | |\n";
    let output = to_ascii_tab(source);
    assert!(output.contains("ERROR: Unsupported attribute (error: 'Cannot parse 'This is gibber' at line 2')"));
    // The surrounding music still renders.
    assert!(output.contains("\n-0\n"));
}

#[test]
fn test_underlined_title_is_not_a_barline() {
    let events = to_event_dump("Title\n========\n");
    assert!(events.contains("attribute(title: 'Title')"));
    assert!(!events.contains("barline"));
}

#[test]
fn test_event_dump_records_the_whole_stream() {
    let source = "\
key: G
--------
| | 0 | | |  8
| | | | | |
:======:
";
    let events = to_event_dump(source);
    let lines: Vec<&str> = events.lines().collect();
    assert_eq!(
        lines,
        vec![
            "attribute(key: 'G')",
            "barline(Barline { double: false, repeat: None })",
            "attribute(duration: '1/8')",
            "note([- - D3 - - -], 1/4, tied=false)",
            "barline(Barline { double: true, repeat: Some(Both) })",
            "flush()",
        ]
    );
}

#[test]
fn test_lilypond_end_to_end() {
    let source = "\
title: Test piece
composer: Trad.
key: Em

=======:
| | | 0 1 0  2
| | | | | |
:=======
";
    let output = to_lilypond(source);
    assert!(output.starts_with("\\version \"2.16.0\"\n"));
    assert!(output.contains("title = \"Test piece\""));
    assert!(output.contains("composer = \"Trad.\""));
    assert!(output.contains("\\key e \\minor"));
    assert!(output.contains("\\repeat volta 2 {"));
    assert!(output.contains("<g\\3 c'\\2 e'\\1>1"));
    assert!(output.contains("\\score { \\Guitar }"));
}

#[test]
fn test_lilypond_ties_across_barlines() {
    let source = "\
--------
| | | 0 1 0  2
| | | 2 3 2
--------
| | | | | |
| | | 0 1 0
--------
";
    let output = to_lilypond(source);
    assert!(output.contains("<a\\3 d'\\2 fis'\\1>2~  |"));
}

#[test]
fn test_bass_tuning_pipeline() {
    let mut parser = VtabParser::with_tuning(Tuning::bass());
    parser.add_formatter(Box::new(AsciiFormatter::with_tuning(Tuning::bass())));
    for line in "--------\n0 2 | |\n--------\n".lines() {
        parser.parse_line(line);
    }
    parser.flush();

    assert_eq!(
        parser.formatters()[0].output(),
        "|---|\n|---|\n|-2-|\n|-0-|\n\n"
    );
}

#[test]
fn test_duration_accumulation_feeds_dotted_notes() {
    // Three eighth rows accumulate to a dotted quarter.
    let source = "\
--------
| 3 | | | |  8
| | | | | |
| | | | | |
| 3 | | | |
--------
";
    let output = to_lilypond(source);
    assert!(output.contains("<c\\5>4."));
}
