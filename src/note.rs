use std::fmt;
use std::ops::{Add, Sub};
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::VtabError;

/// Match scientific pitch notation: letter, optional accidental, octave.
/// Template is: "C#4"
static RE_PITCH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-G])([#b]?)([0-9])$").expect("pitch regex"));

/// Semitone letters per octave step, sharps spelled explicitly.
const LETTERS: [char; 12] = ['C', 'C', 'D', 'D', 'E', 'F', 'F', 'G', 'G', 'A', 'A', 'B'];
const SHARPS: [bool; 12] = [
    false, true, false, true, false, false, true, false, true, false, true, false,
];

/// "C0" sits at 12 in the MIDI enumeration.
const MIDI_OFFSET: i32 = 12;

/// Playing-technique metadata that can be attached to a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Articulation {
    HammerOn,
    PullOff,
}

impl fmt::Display for Articulation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Articulation::HammerOn => write!(f, "hammer-on"),
            Articulation::PullOff => write!(f, "pull-off"),
        }
    }
}

/// A single pitch, stored as a semitone index in the MIDI enumeration.
///
/// Equality, ordering, hashing and string conversion are defined purely on
/// the semitone value. Articulation metadata is a side channel for
/// renderers and never takes part in any of those operations, nor does it
/// survive arithmetic.
#[derive(Debug, Clone)]
pub struct Note {
    pitch: i32,
    articulation: Vec<Articulation>,
}

impl Note {
    /// Create a note from a semitone index ("C4" is 60).
    pub fn new(pitch: i32) -> Self {
        Note {
            pitch,
            articulation: Vec::new(),
        }
    }

    /// The raw semitone index.
    pub fn semitones(&self) -> i32 {
        self.pitch
    }

    /// Split into letter, sharp flag and octave. Accidentals always come
    /// back as sharps, whatever spelling the note was built from.
    pub fn decompose(&self) -> (char, bool, i32) {
        let octave = (self.pitch - MIDI_OFFSET).div_euclid(12);
        let semitone = (self.pitch - MIDI_OFFSET).rem_euclid(12) as usize;
        (LETTERS[semitone], SHARPS[semitone], octave)
    }

    pub fn add_articulation(&mut self, articulation: Articulation) {
        if !self.articulation.contains(&articulation) {
            self.articulation.push(articulation);
        }
    }

    pub fn remove_articulation(&mut self, articulation: Articulation) {
        self.articulation.retain(|a| *a != articulation);
    }

    pub fn has_articulation(&self, articulation: Articulation) -> bool {
        self.articulation.contains(&articulation)
    }
}

impl FromStr for Note {
    type Err = VtabError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let captures = RE_PITCH
            .captures(s)
            .ok_or_else(|| VtabError::InvalidPitch(s.to_string()))?;

        let letter = &captures[1];
        let accidental = &captures[2];
        let octave: i32 = captures[3]
            .parse()
            .map_err(|_| VtabError::InvalidPitch(s.to_string()))?;

        let mut pitch = match letter {
            "C" => 0,
            "D" => 2,
            "E" => 4,
            "F" => 5,
            "G" => 7,
            "A" => 9,
            "B" => 11,
            _ => return Err(VtabError::InvalidPitch(s.to_string())),
        };

        match accidental {
            "#" => pitch += 1,
            "b" => pitch -= 1,
            _ => {}
        }

        Ok(Note::new(pitch + MIDI_OFFSET + 12 * octave))
    }
}

impl fmt::Display for Note {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (letter, sharp, octave) = self.decompose();
        if sharp {
            write!(f, "{}#{}", letter, octave)
        } else {
            write!(f, "{}{}", letter, octave)
        }
    }
}

impl PartialEq for Note {
    fn eq(&self, other: &Self) -> bool {
        self.pitch == other.pitch
    }
}

impl Eq for Note {}

impl PartialOrd for Note {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Note {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.pitch.cmp(&other.pitch)
    }
}

impl std::hash::Hash for Note {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.pitch.hash(state);
    }
}

impl Add<i32> for &Note {
    type Output = Note;

    fn add(self, semitones: i32) -> Note {
        Note::new(self.pitch + semitones)
    }
}

impl Add<i32> for Note {
    type Output = Note;

    fn add(self, semitones: i32) -> Note {
        Note::new(self.pitch + semitones)
    }
}

impl Sub<i32> for &Note {
    type Output = Note;

    fn sub(self, semitones: i32) -> Note {
        Note::new(self.pitch - semitones)
    }
}

impl Sub<i32> for Note {
    type Output = Note;

    fn sub(self, semitones: i32) -> Note {
        Note::new(self.pitch - semitones)
    }
}

impl Sub<&Note> for &Note {
    type Output = i32;

    fn sub(self, other: &Note) -> i32 {
        self.pitch - other.pitch
    }
}

impl Sub<Note> for Note {
    type Output = i32;

    fn sub(self, other: Note) -> i32 {
        self.pitch - other.pitch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTES_WITH_SHARPS: [&str; 12] = [
        "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
    ];
    const NOTES_WITH_FLATS: [&str; 12] = [
        "C", "Db", "D", "Eb", "E", "F", "Gb", "G", "Ab", "A", "Bb", "B",
    ];

    fn note(s: &str) -> Note {
        s.parse().unwrap()
    }

    #[test]
    fn test_matches_midi_enumeration() {
        assert_eq!(note("C4").semitones(), 60);
    }

    #[test]
    fn test_simple_display() {
        assert_eq!(note("C4").to_string(), "C4");
    }

    #[test]
    fn test_simple_sharp() {
        assert_eq!(note("C#4").semitones(), 61);
    }

    #[test]
    fn test_identity_over_all_octaves() {
        for octave in 0..9 {
            for name in NOTES_WITH_SHARPS {
                let text = format!("{}{}", name, octave);
                assert_eq!(note(&text).to_string(), text);
            }
        }
    }

    #[test]
    fn test_flats_normalize_to_sharps() {
        for octave in 0..9 {
            for i in 0..12 {
                let flat = format!("{}{}", NOTES_WITH_FLATS[i], octave);
                let sharp = format!("{}{}", NOTES_WITH_SHARPS[i], octave);
                assert_eq!(note(&flat).to_string(), sharp);
                assert_eq!(note(&flat), note(&sharp));
            }
        }
    }

    #[test]
    fn test_no_gaps_in_pitch() {
        let mut last_pitch = 11; // B-1 in the MIDI enumeration
        for octave in 0..9 {
            for name in NOTES_WITH_SHARPS {
                let n = note(&format!("{}{}", name, octave));
                assert_eq!(n.semitones(), last_pitch + 1);
                last_pitch = n.semitones();
            }
        }
    }

    #[test]
    fn test_semitone_round_trip() {
        for pitch in 12..128 {
            let n = Note::new(pitch);
            assert_eq!(n.to_string().parse::<Note>().unwrap().semitones(), pitch);
        }
    }

    #[test]
    fn test_invalid_pitch_names() {
        assert!("H2".parse::<Note>().is_err());
        assert!("C".parse::<Note>().is_err());
        assert!("Cx4".parse::<Note>().is_err());
        assert!("".parse::<Note>().is_err());
    }

    #[test]
    fn test_addition() {
        assert_eq!((note("C4") + 2).to_string(), "D4");
    }

    #[test]
    fn test_subtraction() {
        assert_eq!((note("C4") - 1).to_string(), "B3");
    }

    #[test]
    fn test_note_subtraction() {
        assert_eq!(note("C4") - note("B3"), 1);
        assert_eq!(note("C4") - note("C4"), 0);
        assert_eq!(note("C4") - note("C#4"), -1);
    }

    #[test]
    fn test_ordering() {
        assert!(note("C#4") > note("C4"));
        assert!(note("B3") < note("C4"));
        assert!(note("C4") >= note("C4"));
    }

    #[test]
    fn test_articulation_is_side_channel() {
        let mut plain = note("C4");
        let mut decorated = note("C4");
        decorated.add_articulation(Articulation::HammerOn);

        assert_eq!(plain, decorated);
        assert_eq!(plain.to_string(), decorated.to_string());
        assert_eq!(Articulation::HammerOn.to_string(), "hammer-on");
        assert_eq!(Articulation::PullOff.to_string(), "pull-off");
        assert!(decorated.has_articulation(Articulation::HammerOn));
        assert!(!decorated.has_articulation(Articulation::PullOff));

        // Arithmetic never carries articulation across.
        let moved = &decorated + 2;
        assert!(!moved.has_articulation(Articulation::HammerOn));

        decorated.remove_articulation(Articulation::HammerOn);
        assert!(!decorated.has_articulation(Articulation::HammerOn));

        plain.add_articulation(Articulation::PullOff);
        plain.add_articulation(Articulation::PullOff);
        assert!(plain.has_articulation(Articulation::PullOff));
    }
}
