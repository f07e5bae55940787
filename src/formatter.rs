//! The event stream between the parser and its output sinks.

use num_rational::Rational32;

use crate::note::Note;

/// Note lengths are exact fractions of a whole bar.
pub type Fraction = Rational32;

/// A named attribute carried alongside the music. Keys the parser knows
/// about get their own variant; anything else arrives as `Unknown` and it
/// is the formatter's business to reject or report it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    Title(String),
    Key(String),
    Time(String),
    Duration(Fraction),
    Composer(String),
    Articulation(String),
    Text(String),
    Comment(String),
    Lyric(String),
    Error(String),
    Unknown { key: String, value: String },
}

impl Attribute {
    /// The attribute key as it appears in the wire format.
    pub fn key(&self) -> &str {
        match self {
            Attribute::Title(_) => "title",
            Attribute::Key(_) => "key",
            Attribute::Time(_) => "time",
            Attribute::Duration(_) => "duration",
            Attribute::Composer(_) => "composer",
            Attribute::Articulation(_) => "articulation",
            Attribute::Text(_) => "text",
            Attribute::Comment(_) => "comment",
            Attribute::Lyric(_) => "lyric",
            Attribute::Error(_) => "error",
            Attribute::Unknown { key, .. } => key,
        }
    }

    /// The attribute value rendered as text.
    pub fn value(&self) -> String {
        match self {
            Attribute::Title(v)
            | Attribute::Key(v)
            | Attribute::Time(v)
            | Attribute::Composer(v)
            | Attribute::Articulation(v)
            | Attribute::Text(v)
            | Attribute::Comment(v)
            | Attribute::Lyric(v)
            | Attribute::Error(v) => v.clone(),
            Attribute::Duration(d) => d.to_string(),
            Attribute::Unknown { value, .. } => value.clone(),
        }
    }
}

/// Repeat markers attached to a barline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Open,
    Close,
    Both,
}

/// Properties derived from a barline's marker glyphs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Barline {
    /// The marker contained '=' characters.
    pub double: bool,
    pub repeat: Option<Repeat>,
}

/// A consumer of the parser's event stream.
///
/// Formatters own their internal buffers exclusively and must not assume
/// anything about other registered formatters. `flush` drains whatever is
/// buffered into the output text; the parser calls it once at the end of
/// an input, and formatters tolerate extra calls with nothing pending.
pub trait Formatter {
    fn format_attribute(&mut self, attribute: &Attribute);
    fn format_barline(&mut self, barline: &Barline);
    fn format_note(&mut self, notes: &[Option<Note>], duration: Fraction, tied: bool);
    fn flush(&mut self);

    /// The text produced so far.
    fn output(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attribute_key_and_value() {
        let attr = Attribute::Title("Greensleeves".to_string());
        assert_eq!(attr.key(), "title");
        assert_eq!(attr.value(), "Greensleeves");

        let attr = Attribute::Duration(Fraction::new(1, 8));
        assert_eq!(attr.key(), "duration");
        assert_eq!(attr.value(), "1/8");

        let attr = Attribute::Unknown {
            key: "tempo".to_string(),
            value: "120".to_string(),
        };
        assert_eq!(attr.key(), "tempo");
        assert_eq!(attr.value(), "120");
    }
}
