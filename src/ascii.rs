use crate::formatter::{Attribute, Barline, Formatter, Fraction};
use crate::note::Note;
use crate::tunings::Tuning;

/// Maximum width of an output line before the staff wraps.
const LINE_LENGTH: usize = 80;

/// Renders the event stream as fixed-width ASCII tablature, one text line
/// per string, wrapping when a row of cells would overflow.
pub struct AsciiFormatter {
    out: String,
    /// One growing line per string, lowest string first.
    staff: Vec<String>,
    /// Comments held back until the current staff block flushes.
    comments: Vec<String>,
    /// A blank separator is owed at the next flush.
    pad: bool,
    tuning: Tuning,
}

impl AsciiFormatter {
    pub fn new() -> Self {
        AsciiFormatter::with_tuning(Tuning::standard())
    }

    pub fn with_tuning(tuning: Tuning) -> Self {
        AsciiFormatter {
            out: String::new(),
            staff: vec![String::new(); tuning.len()],
            comments: Vec::new(),
            pad: false,
            tuning,
        }
    }

    fn staff_width(&self) -> usize {
        self.staff.first().map_or(0, |line| line.len())
    }

    fn staff_is_empty(&self) -> bool {
        self.staff_width() == 0
    }
}

impl Default for AsciiFormatter {
    fn default() -> Self {
        AsciiFormatter::new()
    }
}

impl Formatter for AsciiFormatter {
    fn format_attribute(&mut self, attribute: &Attribute) {
        match attribute {
            Attribute::Title(title) => {
                self.out.push_str(title);
                self.out.push('\n');
                self.out.push_str(&"=".repeat(title.chars().count()));
                self.out.push_str("\n\n");
            }
            Attribute::Comment(comment) => {
                let comment = format!("# {}\n", comment);
                if self.staff_is_empty() {
                    self.out.push_str(&comment);
                } else {
                    self.comments.push(comment);
                }
            }
            Attribute::Composer(composer) => {
                self.out.push_str(&format!("Composer: {}\n", composer));
                self.pad = true;
            }
            // Not meaningful for tab-only output.
            Attribute::Key(_)
            | Attribute::Time(_)
            | Attribute::Duration(_)
            | Attribute::Text(_) => {}
            other => {
                self.flush();
                self.out.push_str(&format!(
                    "ERROR: Unsupported attribute ({}: '{}')\n",
                    other.key(),
                    other.value()
                ));
            }
        }
    }

    fn format_barline(&mut self, barline: &Barline) {
        let mut width = self.staff_width() + 2;
        if width >= LINE_LENGTH {
            self.flush();
            width = 0;
        }

        for line in &mut self.staff {
            if line.is_empty() {
                line.push('|');
            } else {
                line.push_str("-|");
            }
        }

        // Keep a bar marker from dangling at the very end of a full line:
        // flush now and reopen the next block with the same marker.
        if width >= LINE_LENGTH - 16 {
            self.flush();
            self.format_barline(barline);
        }
    }

    fn format_note(&mut self, notes: &[Option<Note>], _duration: Fraction, tied: bool) {
        let frets: Vec<String> = notes
            .iter()
            .zip(self.tuning.strings())
            .map(|(note, open)| match note {
                // A sustained note is not restruck, so its cells stay blank.
                Some(n) if !tied => (n - open).to_string(),
                _ => String::new(),
            })
            .collect();

        let width = frets.iter().map(|f| f.len()).max().unwrap_or(0) + 1;
        if self.staff_width() + width >= LINE_LENGTH {
            self.flush();
        }

        for (line, fret) in self.staff.iter_mut().zip(&frets) {
            line.push_str(&"-".repeat(width - fret.len()));
            line.push_str(fret);
        }
    }

    fn flush(&mut self) {
        if self.pad {
            self.out.push('\n');
            self.pad = false;
        }

        let mut wrote_staff = false;
        if !self.staff_is_empty() {
            let width = self.staff_width();
            for line in self.staff.iter().rev() {
                assert_eq!(line.len(), width, "staff lines must stay equal length");
                self.out.push_str(line);
                self.out.push('\n');
            }
            for line in &mut self.staff {
                line.clear();
            }
            wrote_staff = true;
        }

        for comment in self.comments.drain(..) {
            self.out.push_str(&comment);
        }
        if wrote_staff {
            self.out.push('\n');
        }
    }

    fn output(&self) -> &str {
        &self.out
    }
}
