//! The streaming vtab parser.
//!
//! Lines are classified one at a time and folded into an event stream:
//! note duration accumulates across repeated rows, ties carry across
//! barlines, and anything unrecognized degrades into `error` attribute
//! events rather than stopping the parse.

use std::cmp::min;
use std::io::BufRead;

use crate::formatter::{Attribute, Barline, Formatter, Fraction, Repeat};
use crate::line::{self, classify, Line};
use crate::note::{Articulation, Note};
use crate::tunings::Tuning;

/// A line of plain text waiting to be resolved as either a title (if an
/// underline follows) or an error (if anything else does).
#[derive(Debug, Clone)]
struct PendingLine {
    text: String,
    lineno: usize,
}

/// Everything the parser carries between lines. Reset wholesale at the
/// start of each input.
#[derive(Debug, Clone)]
struct ParseState {
    pending_text: Option<PendingLine>,
    /// The pitch-or-rest tuple of the note currently open.
    notes: Vec<Option<Note>>,
    /// How long the open note has lasted so far.
    note_len: Fraction,
    /// The open note was carried across a barline.
    tied: bool,
    /// The sticky duration unit; one row adds this much.
    duration: Fraction,
    lineno: usize,
    barno: usize,
}

impl ParseState {
    fn new(string_count: usize) -> Self {
        ParseState {
            pending_text: None,
            notes: vec![None; string_count],
            note_len: Fraction::new(0, 1),
            tied: false,
            duration: Fraction::new(1, 4),
            lineno: 0,
            barno: 0,
        }
    }
}

/// Drives line classification and broadcasts the resulting events to the
/// registered formatters, in order.
pub struct VtabParser {
    formatters: Vec<Box<dyn Formatter>>,
    tuning: Tuning,
    state: ParseState,
}

impl VtabParser {
    pub fn new() -> Self {
        VtabParser::with_tuning(Tuning::standard())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        let state = ParseState::new(tuning.len());
        VtabParser {
            formatters: Vec::new(),
            tuning,
            state,
        }
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    /// Register another output sink. Events are delivered to sinks in
    /// registration order.
    pub fn add_formatter(&mut self, formatter: Box<dyn Formatter>) {
        self.formatters.push(formatter);
    }

    /// The registered sinks, for collecting their output after a parse.
    pub fn formatters(&self) -> &[Box<dyn Formatter>] {
        &self.formatters
    }

    /// Parse one line (without its trailing newline).
    pub fn parse_line(&mut self, text: &str) {
        self.state.lineno += 1;

        match classify(text) {
            Line::Barline { marker, decorations } => {
                // An undecorated barline directly below buffered text is
                // not a barline at all: it underlines a title.
                if decorations.is_empty() {
                    if let Some(pending) = self.state.pending_text.take() {
                        self.emit_attribute(&Attribute::Title(pending.text));
                        return;
                    }
                }
                self.flush_pending_text();
                self.parse_barline(&marker, &decorations);
            }
            Line::Comment(comment) => {
                self.flush_pending_text();
                self.emit_attribute(&Attribute::Comment(comment));
            }
            Line::KeyPair { key, value } => {
                self.flush_pending_text();
                self.emit_keypair(&key, &value);
            }
            Line::NoteRow { tokens } => {
                self.flush_pending_text();
                self.parse_note_row(&tokens);
            }
            Line::Text(text) => {
                // The previous buffered line can no longer become a
                // title, so it resolves to an error before this one
                // takes its place.
                self.flush_pending_text();
                self.state.pending_text = Some(PendingLine {
                    text,
                    lineno: self.state.lineno,
                });
            }
            Line::Blank => {
                self.flush_pending_text();
            }
        }
    }

    /// Emit whatever is still open: the accumulated note, the buffered
    /// text line, then every formatter's own buffers. Calling this with
    /// nothing pending emits no events.
    pub fn flush(&mut self) {
        self.flush_open_note(false);
        self.flush_pending_text();
        for formatter in &mut self.formatters {
            formatter.flush();
        }
    }

    /// Parse a whole input line by line, then flush. Lines that cannot be
    /// read are logged with file and line context and counted; the count
    /// is returned so the caller can decide pass/fail.
    pub fn parse_reader<R: BufRead>(&mut self, name: &str, reader: R) -> usize {
        self.state = ParseState::new(self.tuning.len());

        let mut read_errors = 0;
        for result in reader.lines() {
            match result {
                Ok(text) => self.parse_line(text.trim_end()),
                Err(e) => {
                    self.state.lineno += 1;
                    log::error!("{}:{}: cannot read line: {}", name, self.state.lineno, e);
                    read_errors += 1;
                }
            }
        }
        self.flush();

        read_errors
    }

    fn emit_attribute(&mut self, attribute: &Attribute) {
        for formatter in &mut self.formatters {
            formatter.format_attribute(attribute);
        }
    }

    fn emit_barline(&mut self, barline: &Barline) {
        for formatter in &mut self.formatters {
            formatter.format_barline(barline);
        }
    }

    fn emit_note(&mut self, notes: &[Option<Note>], duration: Fraction, tied: bool) {
        for formatter in &mut self.formatters {
            formatter.format_note(notes, duration, tied);
        }
    }

    /// Normalize a key-value pair into an attribute event.
    fn emit_keypair(&mut self, key: &str, value: &str) {
        let key = key.to_lowercase();
        let key = match key.as_str() {
            "a" => "articulation",
            "t" => "text",
            other => other,
        };

        let attribute = match key {
            "title" => Attribute::Title(value.to_string()),
            "key" => Attribute::Key(value.to_string()),
            "time" => Attribute::Time(value.to_string()),
            "composer" => Attribute::Composer(value.to_string()),
            "articulation" => Attribute::Articulation(value.to_string()),
            "text" => Attribute::Text(value.to_string()),
            "comment" => Attribute::Comment(value.to_string()),
            "lyric" => Attribute::Lyric(value.to_string()),
            "error" => Attribute::Error(value.to_string()),
            "duration" => match value.parse::<i32>() {
                Ok(denominator) if denominator > 0 => {
                    Attribute::Duration(Fraction::new(1, denominator))
                }
                _ => Attribute::Unknown {
                    key: key.to_string(),
                    value: value.to_string(),
                },
            },
            _ => Attribute::Unknown {
                key: key.to_string(),
                value: value.to_string(),
            },
        };
        self.emit_attribute(&attribute);
    }

    /// Decoration tokens trail the bar marker or the string columns. A
    /// leading digit sets a new reciprocal duration, a key:value token
    /// sets an attribute, anything else is a lyric syllable.
    fn parse_decorations(&mut self, decorations: &[String]) {
        for token in decorations {
            if token.starts_with(|c: char| c.is_ascii_digit()) {
                if let Ok(denominator) = token.parse::<i32>() {
                    if denominator > 0 {
                        self.state.duration = Fraction::new(1, denominator);
                        self.emit_attribute(&Attribute::Duration(self.state.duration));
                        continue;
                    }
                }
            }

            if let Some((key, value)) = line::keypair(token) {
                self.emit_keypair(&key, &value);
                continue;
            }

            self.emit_attribute(&Attribute::Lyric(token.clone()));
        }
    }

    fn parse_barline(&mut self, marker: &str, decorations: &[String]) {
        self.flush_open_note(self.state.barno >= 1);
        self.state.barno += 1;

        self.parse_decorations(decorations);

        let special = min(2, marker.len() / 2);
        let prefix = &marker[..special];
        let postfix = &marker[marker.len() - special..];

        let mut barline = Barline {
            double: marker.contains('='),
            repeat: None,
        };
        if prefix.contains(':') {
            barline.repeat = Some(Repeat::Close);
        }
        if postfix.contains(':') {
            barline.repeat = Some(match barline.repeat {
                Some(Repeat::Close) => Repeat::Both,
                _ => Repeat::Open,
            });
        }

        self.emit_barline(&barline);
    }

    fn parse_note_row(&mut self, tokens: &[String]) {
        let string_count = self.tuning.len();
        let split = min(string_count, tokens.len());
        let (string_tokens, decorations) = tokens.split_at(split);

        let is_rest = string_tokens.iter().any(|t| t == ":");

        let mut notes: Vec<Option<Note>> = self
            .tuning
            .strings()
            .iter()
            .zip(string_tokens.iter())
            .map(|(open, token)| parse_string_token(open, token))
            .collect();
        // A short row leaves the remaining strings silent.
        notes.resize(string_count, None);

        let has_attack = notes.iter().any(|n| n.is_some());
        if has_attack || is_rest {
            // New note starts.
            self.flush_open_note(false);
            self.parse_decorations(decorations);
            self.state.notes = notes;
            self.state.note_len = self.state.duration;
        } else {
            // Note continues.
            self.parse_decorations(decorations);
            self.state.note_len += self.state.duration;
        }
    }

    /// Emit the open note, if any. When `new_bar` is set the pitch tuple
    /// survives so the note can continue, tied, on the far side of the
    /// barline; a tuple with no sounding string never ties.
    fn flush_open_note(&mut self, new_bar: bool) {
        let zero = Fraction::new(0, 1);
        if self.state.note_len != zero {
            let notes = std::mem::take(&mut self.state.notes);
            self.emit_note(&notes, self.state.note_len, self.state.tied);
            self.state.notes = notes;
            self.state.note_len = zero;
            if !new_bar {
                self.state.notes = vec![None; self.tuning.len()];
            }
        }
        let sounding = self.state.notes.iter().any(|n| n.is_some());
        self.state.tied = new_bar && sounding;
    }

    fn flush_pending_text(&mut self) {
        if let Some(pending) = self.state.pending_text.take() {
            self.emit_attribute(&Attribute::Error(format!(
                "Cannot parse '{}' at line {}",
                pending.text, pending.lineno
            )));
        }
    }
}

impl Default for VtabParser {
    fn default() -> Self {
        VtabParser::new()
    }
}

/// Parse one string column: optional articulation or filler prefix, a
/// fret number, optional filler suffix. Anything unparseable (including
/// the `|` sustain and `:` rest markers) yields no pitch.
fn parse_string_token(open: &Note, token: &str) -> Option<Note> {
    let stripped = token.trim_start_matches(['h', 'p', '-']);
    let prefix = &token[..token.len() - stripped.len()];
    let fret_text = stripped.trim_end_matches('-');

    let fret: i32 = fret_text.parse().ok()?;
    let mut note = open + fret;
    if prefix.contains('h') {
        note.add_articulation(Articulation::HammerOn);
    }
    if prefix.contains('p') {
        note.add_articulation(Articulation::PullOff);
    }
    Some(note)
}
