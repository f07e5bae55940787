use crate::formatter::{Attribute, Barline, Formatter, Fraction};
use crate::note::Note;

/// A sink that records every event as one human-readable line. Useful for
/// debugging tab sources and for observing the parser from tests.
#[derive(Debug, Default)]
pub struct DummyFormatter {
    out: String,
}

impl DummyFormatter {
    pub fn new() -> Self {
        DummyFormatter::default()
    }
}

impl Formatter for DummyFormatter {
    fn format_attribute(&mut self, attribute: &Attribute) {
        self.out.push_str(&format!(
            "attribute({}: '{}')\n",
            attribute.key(),
            attribute.value()
        ));
    }

    fn format_barline(&mut self, barline: &Barline) {
        self.out.push_str(&format!("barline({:?})\n", barline));
    }

    fn format_note(&mut self, notes: &[Option<Note>], duration: Fraction, tied: bool) {
        let names: Vec<String> = notes
            .iter()
            .map(|n| match n {
                Some(note) => note.to_string(),
                None => "-".to_string(),
            })
            .collect();
        self.out.push_str(&format!(
            "note([{}], {}, tied={})\n",
            names.join(" "),
            duration,
            tied
        ));
    }

    fn flush(&mut self) {
        self.out.push_str("flush()\n");
    }

    fn output(&self) -> &str {
        &self.out
    }
}
