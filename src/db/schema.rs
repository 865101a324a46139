//! On-disk shapes of the persisted document and their migration into
//! domain types.
//!
//! Early deployments stored only a year per recording; `month` and
//! `day` fall back to 1 here, at the load boundary, so domain
//! constructors never see partial dates.

use serde::{Deserialize, Serialize};

use crate::child::{Child, Word};
use crate::errors::BackendError;
use crate::recording::{Recording, RecordingDate};

/// The root persisted structure: every child, in document order.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<StoredChild>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredChild {
    pub name: String,
    #[serde(default)]
    pub words: Vec<StoredWord>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredWord {
    pub text: String,
    #[serde(default)]
    pub image_filename: Option<String>,
    #[serde(default)]
    pub recordings: Vec<StoredRecording>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct StoredRecording {
    pub year: i32,
    #[serde(default = "first")]
    pub month: u8,
    #[serde(default = "first")]
    pub day: u8,
    pub filename: String,
}

fn first() -> u8 {
    1
}

impl StoredChild {
    pub fn from_domain(child: &Child) -> Self {
        StoredChild {
            name: child.name().to_owned(),
            words: child.words().iter().map(StoredWord::from_domain).collect(),
        }
    }

    pub fn upgrade(self) -> Result<Child, BackendError> {
        let words = self
            .words
            .into_iter()
            .map(StoredWord::upgrade)
            .collect::<Result<Vec<_>, _>>()?;

        Child::with_words(self.name, words)
    }
}

impl StoredWord {
    pub fn from_domain(word: &Word) -> Self {
        StoredWord {
            text: word.text().to_owned(),
            image_filename: word.image_filename().map(str::to_owned),
            recordings: word
                .recordings()
                .iter()
                .map(StoredRecording::from_domain)
                .collect(),
        }
    }

    pub fn upgrade(self) -> Result<Word, BackendError> {
        let recordings = self
            .recordings
            .into_iter()
            .map(StoredRecording::upgrade)
            .collect::<Result<Vec<_>, _>>()?;

        Word::with_parts(self.text, self.image_filename, recordings)
    }
}

impl StoredRecording {
    pub fn from_domain(recording: &Recording) -> Self {
        StoredRecording {
            year: recording.date().year(),
            month: recording.date().month(),
            day: recording.date().day(),
            filename: recording.filename().to_owned(),
        }
    }

    pub fn upgrade(self) -> Result<Recording, BackendError> {
        let date = RecordingDate::new(self.year, self.month, self.day)?;

        Ok(Recording::new(date, self.filename))
    }
}
