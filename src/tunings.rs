use crate::error::VtabError;
use crate::note::Note;

/// An ordered set of open-string pitches, lowest string first.
///
/// Renderers index strings explicitly rather than assuming a direction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tuning {
    strings: Vec<Note>,
}

impl Tuning {
    pub fn new(strings: Vec<Note>) -> Self {
        Tuning { strings }
    }

    /// Six-string guitar standard tuning, E2 A2 D3 G3 B3 E4.
    pub fn standard() -> Self {
        Tuning::new(vec![
            Note::new(40), // E2
            Note::new(45), // A2
            Note::new(50), // D3
            Note::new(55), // G3
            Note::new(59), // B3
            Note::new(64), // E4
        ])
    }

    /// Four-string bass tuning, E1 A1 D2 G2.
    pub fn bass() -> Self {
        Tuning::new(vec![
            Note::new(28), // E1
            Note::new(33), // A1
            Note::new(38), // D2
            Note::new(43), // G2
        ])
    }

    /// Look up a built-in tuning by name (case-insensitive).
    pub fn by_name(name: &str) -> Result<Self, VtabError> {
        match name.to_lowercase().as_str() {
            "standard" | "guitar" => Ok(Tuning::standard()),
            "bass" => Ok(Tuning::bass()),
            _ => Err(VtabError::UnknownTuning(name.to_string())),
        }
    }

    pub fn len(&self) -> usize {
        self.strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    pub fn strings(&self) -> &[Note] {
        &self.strings
    }

    /// Map fret offsets onto the open strings. `None` is a rest and yields
    /// no pitch for that string. Extra offsets beyond the string count are
    /// ignored, as are extra strings beyond the offset count.
    pub fn chord(&self, frets: &[Option<i32>]) -> Vec<Option<Note>> {
        frets
            .iter()
            .zip(self.strings.iter())
            .map(|(fret, open)| fret.map(|f| open + f))
            .collect()
    }
}

impl Default for Tuning {
    fn default() -> Self {
        Tuning::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_tuning_names() {
        let names: Vec<String> = Tuning::standard()
            .strings()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, ["E2", "A2", "D3", "G3", "B3", "E4"]);
    }

    #[test]
    fn test_bass_tuning_names() {
        let names: Vec<String> = Tuning::bass()
            .strings()
            .iter()
            .map(|n| n.to_string())
            .collect();
        assert_eq!(names, ["E1", "A1", "D2", "G2"]);
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(Tuning::by_name("standard").unwrap(), Tuning::standard());
        assert_eq!(Tuning::by_name("Bass").unwrap(), Tuning::bass());
        assert!(Tuning::by_name("ukulele").is_err());
    }

    #[test]
    fn test_open_chord() {
        let chord = Tuning::standard().chord(&[Some(0); 6]);
        assert_eq!(chord, Tuning::standard().strings().iter().cloned().map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn test_e_major_chord() {
        let chord = Tuning::standard().chord(&[
            Some(0),
            Some(2),
            Some(2),
            Some(1),
            Some(0),
            Some(0),
        ]);
        let names: Vec<String> = chord
            .iter()
            .map(|n| n.as_ref().unwrap().to_string())
            .collect();
        assert_eq!(names, ["E2", "B2", "E3", "G#3", "B3", "E4"]);
    }

    #[test]
    fn test_chord_with_rests() {
        let chord = Tuning::standard().chord(&[None, None, Some(0), Some(2), Some(3), Some(2)]);
        assert_eq!(chord[0], None);
        assert_eq!(chord[1], None);
        assert_eq!(chord[2].as_ref().unwrap().to_string(), "D3");
        assert_eq!(chord[3].as_ref().unwrap().to_string(), "A3");
        assert_eq!(chord[4].as_ref().unwrap().to_string(), "D4");
        assert_eq!(chord[5].as_ref().unwrap().to_string(), "F#4");
    }
}
