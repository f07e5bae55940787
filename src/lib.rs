pub mod ascii;
pub mod dummy;
pub mod error;
pub mod formatter;
pub mod lilypond;
pub mod line;
pub mod note;
pub mod parser;
pub mod tunings;

pub use ascii::AsciiFormatter;
pub use dummy::DummyFormatter;
pub use error::VtabError;
pub use formatter::{Attribute, Barline, Formatter, Fraction, Repeat};
pub use lilypond::LilypondFormatter;
pub use note::{Articulation, Note};
pub use parser::VtabParser;
pub use tunings::Tuning;

/// Run a vtab source through the parser with a single output sink and
/// return what the sink produced.
pub fn render(source: &str, formatter: Box<dyn Formatter>) -> String {
    let mut parser = VtabParser::new();
    parser.add_formatter(formatter);
    for line in source.lines() {
        parser.parse_line(line);
    }
    parser.flush();
    parser.formatters()[0].output().to_string()
}

/// Render a vtab source as fixed-width ASCII tablature.
/// This is the main entry point for the library.
pub fn to_ascii_tab(source: &str) -> String {
    render(source, Box::new(AsciiFormatter::new()))
}

/// Render a vtab source as a LilyPond document.
pub fn to_lilypond(source: &str) -> String {
    render(source, Box::new(LilypondFormatter::new()))
}

/// Dump the event stream a vtab source produces, one event per line
/// (useful for debugging tab sources).
pub fn to_event_dump(source: &str) -> String {
    render(source, Box::new(DummyFormatter::new()))
}
