use crate::errors::BackendError;
use crate::recording::{Recording, RecordingDate};

/// A vocabulary entry: optional image, dated history of recordings.
///
/// At most one recording exists per date; adding one for an occupied
/// date replaces it. The recording list stays sorted ascending by
/// date.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    text: String,
    image_filename: Option<String>,
    recordings: Vec<Recording>,
}

impl Word {
    pub fn new(text: impl AsRef<str>) -> Result<Self, BackendError> {
        Word::with_parts(text, None, vec![])
    }

    /// Assembles a word from previously stored parts. The recording
    /// list is re-sorted and de-duplicated by date, later entries
    /// winning.
    pub fn with_parts(
        text: impl AsRef<str>,
        image_filename: Option<String>,
        recordings: Vec<Recording>,
    ) -> Result<Self, BackendError> {
        let text = text.as_ref().trim();

        if text.is_empty() {
            return Err(BackendError::EmptyWordText);
        }

        let mut word = Word {
            text: text.to_owned(),
            image_filename,
            recordings: vec![],
        };

        for recording in recordings {
            word.add_recording(recording.date(), recording.filename().to_owned());
        }

        Ok(word)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn image_filename(&self) -> Option<&str> {
        self.image_filename.as_deref()
    }

    pub fn recordings(&self) -> &[Recording] {
        &self.recordings
    }

    /// Records a filename for the given date, replacing any recording
    /// already keyed by that date.
    pub fn add_recording(&mut self, date: RecordingDate, filename: impl Into<String>) {
        self.recordings.retain(|r| r.date() != date);
        self.recordings.push(Recording::new(date, filename));
        self.recordings.sort_by_key(|r| r.date());
    }

    pub fn recording(&self, date: RecordingDate) -> Option<&Recording> {
        self.recordings.iter().find(|r| r.date() == date)
    }

    /// Removes the recording for the given date. Returns whether a
    /// match existed.
    pub fn remove_recording(&mut self, date: RecordingDate) -> bool {
        let before = self.recordings.len();
        self.recordings.retain(|r| r.date() != date);
        self.recordings.len() < before
    }

    /// Returns the `(year, month)` pair of every recording, oldest
    /// first. Kept for callers that predate day-level dates.
    pub fn dates(&self) -> Vec<(i32, u8)> {
        self.recordings
            .iter()
            .map(|r| (r.date().year(), r.date().month()))
            .collect()
    }

    /// Returns the distinct years that have recordings, ascending.
    pub fn years(&self) -> Vec<i32> {
        let mut years = self
            .recordings
            .iter()
            .map(|r| r.date().year())
            .collect::<Vec<_>>();
        years.dedup();
        years
    }

    /// Sets the representative image, overwriting any previous one.
    pub fn set_image(&mut self, filename: impl Into<String>) {
        self.image_filename = Some(filename.into());
    }
}

/// A tracked person owning a vocabulary of words. Names are unique
/// across the store (exact match); word texts are unique within a
/// child.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Child {
    name: String,
    words: Vec<Word>,
}

impl Child {
    pub fn new(name: impl AsRef<str>) -> Result<Self, BackendError> {
        Child::with_words(name, vec![])
    }

    pub fn with_words(name: impl AsRef<str>, words: Vec<Word>) -> Result<Self, BackendError> {
        let name = name.as_ref().trim();

        if name.is_empty() {
            return Err(BackendError::EmptyName);
        }

        let mut child = Child {
            name: name.to_owned(),
            words: vec![],
        };

        for word in words {
            child.add_word(word);
        }

        Ok(child)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    /// Adds a word to the vocabulary. A word whose exact text already
    /// exists is left untouched; the call is a no-op, not an error.
    pub fn add_word(&mut self, word: Word) {
        if !self.words.iter().any(|w| w.text() == word.text()) {
            self.words.push(word);
        }
    }

    pub fn word(&self, text: &str) -> Option<&Word> {
        self.words.iter().find(|w| w.text() == text)
    }

    pub fn word_mut(&mut self, text: &str) -> Option<&mut Word> {
        self.words.iter_mut().find(|w| w.text() == text)
    }

    /// Removes the word with exactly the given text. Returns whether
    /// a match existed.
    pub fn remove_word(&mut self, text: &str) -> bool {
        let before = self.words.len();
        self.words.retain(|w| w.text() != text);
        self.words.len() < before
    }
}

#[cfg(test)]
mod tests {
    use super::{Child, Word};
    use crate::errors::BackendError;
    use crate::recording::RecordingDate;

    fn date(year: i32, month: u8, day: u8) -> RecordingDate {
        RecordingDate::new(year, month, day).unwrap()
    }

    #[test]
    fn adding_a_recording_for_an_occupied_date_replaces_it() {
        let mut word = Word::new("hola").unwrap();

        word.add_recording(date(2023, 6, 15), "hola_1.mp3");
        word.add_recording(date(2023, 6, 15), "hola_2.mp3");

        assert_eq!(word.recordings().len(), 1);
        assert_eq!(word.recordings()[0].filename(), "hola_2.mp3");
    }

    #[test]
    fn recordings_stay_sorted_by_date() {
        let mut word = Word::new("gat").unwrap();

        word.add_recording(date(2024, 1, 2), "c.mp3");
        word.add_recording(date(2022, 7, 1), "a.mp3");
        word.add_recording(date(2023, 12, 31), "b.mp3");

        let dates = word
            .recordings()
            .iter()
            .map(|r| r.date())
            .collect::<Vec<_>>();
        let mut sorted = dates.clone();
        sorted.sort();

        assert_eq!(dates, sorted);

        word.remove_recording(date(2023, 12, 31));
        word.add_recording(date(2022, 1, 1), "d.mp3");

        assert_eq!(word.recordings()[0].filename(), "d.mp3");
        assert_eq!(word.recordings()[2].filename(), "c.mp3");
    }

    #[test]
    fn removing_a_recording_reports_whether_it_existed() {
        let mut word = Word::new("peix").unwrap();
        word.add_recording(date(2023, 3, 3), "peix.ogg");

        assert!(word.remove_recording(date(2023, 3, 3)));
        assert!(!word.remove_recording(date(2023, 3, 3)));
        assert!(word.recordings().is_empty());
    }

    #[test]
    fn dates_and_years_are_derived_views() {
        let mut word = Word::new("lluna").unwrap();
        word.add_recording(date(2022, 5, 1), "a.wav");
        word.add_recording(date(2022, 9, 2), "b.wav");
        word.add_recording(date(2023, 1, 3), "c.wav");

        assert_eq!(word.dates(), vec![(2022, 5), (2022, 9), (2023, 1)]);
        assert_eq!(word.years(), vec![2022, 2023]);
    }

    #[test]
    fn setting_an_image_overwrites_the_previous_one() {
        let mut word = Word::new("sol").unwrap();
        assert_eq!(word.image_filename(), None);

        word.set_image("sol.png");
        word.set_image("sol.jpg");

        assert_eq!(word.image_filename(), Some("sol.jpg"));
    }

    #[test]
    fn duplicate_words_are_a_silent_no_op() {
        let mut child = Child::new("Alice").unwrap();

        child.add_word(Word::new("hola").unwrap());
        child.add_word(Word::new("hola").unwrap());

        assert_eq!(child.words().len(), 1);
    }

    #[test]
    fn word_lookup_is_exact() {
        let mut child = Child::new("Bob").unwrap();
        child.add_word(Word::new("Hola").unwrap());

        assert!(child.word("Hola").is_some());
        assert!(child.word("hola").is_none());
    }

    #[test]
    fn names_are_trimmed_and_must_not_be_empty() {
        let child = Child::new("  Alice  ").unwrap();
        assert_eq!(child.name(), "Alice");

        assert!(matches!(Child::new("   "), Err(BackendError::EmptyName)));
        assert!(matches!(Word::new(" "), Err(BackendError::EmptyWordText)));
    }

    #[test]
    fn words_added_then_recorded_end_to_end() {
        let mut child = Child::new("Alice").unwrap();
        child.add_word(Word::new("hola").unwrap());

        let word = child.word_mut("hola").unwrap();
        word.add_recording(date(2023, 6, 15), "hola_1.mp3");
        word.add_recording(date(2023, 6, 15), "hola_2.mp3");

        let word = child.word("hola").unwrap();
        assert_eq!(word.recordings().len(), 1);
        assert_eq!(word.recordings()[0].filename(), "hola_2.mp3");

        assert!(child.remove_word("hola"));
        assert!(child.word("hola").is_none());
    }
}
