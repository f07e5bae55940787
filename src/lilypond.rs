use crate::formatter::{Attribute, Barline, Formatter, Fraction, Repeat};
use crate::note::Note;

const VERSION: &str = "\\version \"2.16.0\"\n";

const PAPER: &str = r#"\paper {
$(if (not (ly:get-option 'afive)) #{
  \paper {
    #(set-paper-size "a4")
    left-margin = 20
    line-width = 180
  }
#}
#{
  \paper {
    #(set-paper-size "a5")
    top-margin = 3
    bottom-margin = 3
    left-margin = 5
    line-width = 140.5
  }
#})

  % Align the first line with everything else
  indent = #0
}
"#;

const FINALIZE: &str = r#"NoStringNumbers = {
  % Setting the stencil to false causes problems placing other objects
  \override StringNumber #'transparent = ##t
}

NoStems = {
  \override Beam #'stencil = ##f
  \override Dots #'stencil = ##f
  \override Stem #'stencil = ##f
}

StaffMelody = {
  \NoStringNumbers
  \Melody
}

TabMelody  = {
  \NoStems
  \removeWithTag #'chords
  \removeWithTag #'texts
  \Melody
}

GuitarStaffAndTab = <<
  \new StaffGroup = "Guitar" <<
    \new Staff = "TraditionalStaff" <<
      \clef "treble_8"
      \context Voice = "Melody" { \StaffMelody }
    >>
    \new TabStaff = "TabStaff" <<
      \context TabVoice = "Melody" { \TabMelody }
    >>
  >>
>>

GuitarTabOnly = <<
  \new StaffGroup = "Guitar" <<
    \new TabStaff = "TabStaff" <<
      \context TabVoice = "Melody" { \TabMelody }
    >>
  >>
>>

Guitar =
$(if (ly:get-option 'afive) #{
\GuitarTabOnly
#}
#{
\GuitarStaffAndTab
#})

\score { \Guitar }
"#;

/// Renders the event stream as a LilyPond document: a melody token list
/// inside a fixed template, with header fields substituted at flush time.
pub struct LilypondFormatter {
    out: String,
    title: Option<String>,
    composer: Option<String>,
    /// LilyPond key command body, e.g. "c \major".
    key: String,
    melody: Vec<String>,
    /// Index of the last note token, for attaching tie markers.
    last_note: Option<usize>,
    /// Over-text staged for the next note, consumed exactly once.
    text: Option<String>,
    open_braces: i32,
}

impl LilypondFormatter {
    pub fn new() -> Self {
        LilypondFormatter {
            out: String::new(),
            title: None,
            composer: None,
            key: "c \\major".to_string(),
            melody: Vec::new(),
            last_note: None,
            text: None,
            open_braces: 0,
        }
    }

    fn append_comment(&mut self, comment: &str) {
        // Force a line break if the last token does not have one.
        if self.melody.last().is_some_and(|t| !t.ends_with('\n')) {
            self.melody.push("\n".to_string());
        }
        self.melody.push(format!("% {}\n", comment));
    }
}

impl Default for LilypondFormatter {
    fn default() -> Self {
        LilypondFormatter::new()
    }
}

impl Formatter for LilypondFormatter {
    fn format_attribute(&mut self, attribute: &Attribute) {
        match attribute {
            Attribute::Title(title) => self.title = Some(title.clone()),
            Attribute::Composer(composer) => self.composer = Some(composer.clone()),
            Attribute::Key(key) => self.key = translate_key(key),
            Attribute::Text(text) => self.text = Some(text.clone()),
            Attribute::Comment(comment) => self.append_comment(comment),
            // Timing never varies the tab-derived melody, and the sticky
            // duration already arrives folded into each note event.
            Attribute::Time(_) | Attribute::Duration(_) => {}
            other => {
                self.append_comment(&format!(
                    "ERROR: Unsupported attribute ({}: '{}')",
                    other.key(),
                    other.value()
                ));
            }
        }
    }

    fn format_barline(&mut self, barline: &Barline) {
        // Repeat markers deliberately clobber double-bar markers.
        let token = match barline.repeat {
            Some(Repeat::Open) => {
                self.open_braces += 1;
                "\\repeat volta 2 {".to_string()
            }
            Some(Repeat::Close) => {
                self.open_braces -= 1;
                "}".to_string()
            }
            Some(Repeat::Both) => "} \\repeat volta 2 {".to_string(),
            None if barline.double => "||".to_string(),
            None => "|".to_string(),
        };
        self.melody.push(token + "\n");
    }

    fn format_note(&mut self, notes: &[Option<Note>], duration: Fraction, tied: bool) {
        let mut chord_notes = Vec::new();
        for (index, note) in notes.iter().enumerate() {
            if let Some(note) = note {
                // String numbers count down from the lowest string.
                let string_number = notes.len() - index;
                chord_notes.push(format!("{}\\{}", ly_pitch(note), string_number));
            }
        }
        let chord = if chord_notes.is_empty() {
            "r".to_string()
        } else {
            format!("<{}>", chord_notes.join(" "))
        };

        let (base, dot) = if *duration.numer() == 3 {
            (duration - duration / 3, ".")
        } else {
            (duration, "")
        };
        let length = if *base.numer() == 1 {
            format!("{}{}", base.denom(), dot)
        } else {
            log::warn!(
                "cannot render duration {} exactly, falling back to 1/{}",
                duration,
                duration.denom()
            );
            duration.denom().to_string()
        };

        let mut token = format!("{}{}", chord, length);
        if let Some(text) = self.text.take() {
            token.push_str(&format!("^\"{}\"", text));
        }

        if tied {
            match self.last_note {
                Some(index) => self.melody[index].push('~'),
                None => log::warn!("tie with no preceding note, ignored"),
            }
        }
        self.last_note = Some(self.melody.len());
        self.melody.push(token);
    }

    fn flush(&mut self) {
        if self.open_braces < 0 {
            log::warn!("unbalanced repeat close, output braces will not match");
            self.open_braces = 0;
        }
        while self.open_braces > 0 {
            self.melody.push("}".to_string());
            self.open_braces -= 1;
        }

        self.out.push_str(VERSION);
        self.out.push_str(&format!(
            "\\header {{\n  title = {}\n  composer = {}\n  tagline = ##f\n}}\n",
            header_field(&self.title),
            header_field(&self.composer),
        ));
        self.out.push_str(PAPER);
        self.out.push_str(&format!(
            "Melody = {{\n  \\voiceOne\n  \\key {}\n  \\time 4/4\n  {}\n}}\n",
            self.key,
            self.melody.join("  "),
        ));
        self.out.push_str(FINALIZE);
    }

    fn output(&self) -> &str {
        &self.out
    }
}

/// Quote a header value for the template; absent (or unquotable) values
/// render as the LilyPond empty marker.
fn header_field(value: &Option<String>) -> String {
    match value {
        Some(v) if !v.contains('"') => format!("\"{}\"", v),
        _ => "##f".to_string(),
    }
}

/// Translate a key name like "A#" or "Bbm" into a LilyPond key command
/// body, spelling accidentals out and picking the tonality keyword.
fn translate_key(key: &str) -> String {
    let (name, tonality) = match key.strip_suffix('m') {
        Some(name) if !name.is_empty() => (name, "\\minor"),
        _ => (key, "\\major"),
    };
    let scale = name.replace('#', "is").replace('b', "es").to_lowercase();
    format!("{} {}", scale, tonality)
}

/// LilyPond pitch name with octave ticks relative to octave 3.
fn ly_pitch(note: &Note) -> String {
    let (letter, sharp, octave) = note.decompose();
    let mut name = letter.to_ascii_lowercase().to_string();
    if sharp {
        name.push_str("is");
    }
    if octave > 3 {
        for _ in 3..octave {
            name.push('\'');
        }
    } else {
        for _ in octave..3 {
            name.push(',');
        }
    }
    name
}
