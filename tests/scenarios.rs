use std::sync::Arc;

use tempfile::TempDir;

use paraulins::child::{Child, Word};
use paraulins::config::Config;
use paraulins::environment::Environment;
use paraulins::log::{o, Logger};
use paraulins::recording::RecordingDate;

fn environment(directory: &TempDir) -> Environment {
    let logger = Arc::new(Logger::root(slog::Discard, o!()));
    let config = Config::new(directory.path());

    Environment::with_config(logger, config).unwrap()
}

fn date(year: i32, month: u8, day: u8) -> RecordingDate {
    RecordingDate::new(year, month, day).unwrap()
}

#[test]
fn repeated_uploads_for_one_date_keep_the_last() {
    let directory = TempDir::new().unwrap();
    let environment = environment(&directory);

    environment
        .db
        .save_child(&Child::new("Alice").unwrap())
        .unwrap();
    environment
        .db
        .add_word("Alice", Word::new("hola").unwrap())
        .unwrap();

    let when = date(2023, 6, 15);

    environment
        .db
        .add_recording("Alice", "hola", when, "hola_1.mp3")
        .unwrap();
    environment
        .db
        .add_recording("Alice", "hola", when, "hola_2.mp3")
        .unwrap();

    let child = environment.db.child("Alice").unwrap().unwrap();
    let recordings = child.word("hola").unwrap().recordings();

    assert_eq!(recordings.len(), 1);
    assert_eq!(recordings[0].filename(), "hola_2.mp3");
}

#[test]
fn deleting_a_word_removes_its_media_and_its_entry() {
    let directory = TempDir::new().unwrap();
    let environment = environment(&directory);

    // Build up a child with one word, two recordings and an image,
    // the way the orchestration layer would.
    let mut child = Child::new("Alice").unwrap();
    child.add_word(Word::new("gos").unwrap());

    let first = date(2023, 6, 15);
    let second = date(2024, 2, 29);

    let first_file = environment
        .audio
        .save(b"one", "clip.mp3", "Alice", "gos", first)
        .unwrap();
    let second_file = environment
        .audio
        .save(b"two", "clip.wav", "Alice", "gos", second)
        .unwrap();

    {
        let word = child.word_mut("gos").unwrap();
        word.add_recording(first, first_file.clone());
        word.add_recording(second, second_file.clone());
    }

    let png = {
        use image::{ImageOutputFormat, Rgb};
        use std::io::Cursor;

        let mut raw = Vec::new();
        image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(20, 20, Rgb([5, 5, 5])))
            .write_to(&mut Cursor::new(&mut raw), ImageOutputFormat::Png)
            .unwrap();
        raw
    };

    let image_file = environment.images.save(&png, "photo.png", "gos").unwrap();
    {
        let word = child.word_mut("gos").unwrap();
        word.set_image(image_file.clone());
    }

    environment.db.save_child(&child).unwrap();

    // Delete the word: every recording file, the image, then the
    // entry itself.
    let mut child = environment.db.child("Alice").unwrap().unwrap();
    let recordings = child
        .word("gos")
        .unwrap()
        .recordings()
        .iter()
        .map(|r| r.filename().to_owned())
        .collect::<Vec<_>>();

    for filename in &recordings {
        assert!(environment.audio.delete("Alice", "gos", filename).unwrap());
    }

    assert!(environment.images.delete("gos").unwrap());
    assert!(child.remove_word("gos"));
    environment.db.save_child(&child).unwrap();

    let reloaded = environment.db.child("Alice").unwrap().unwrap();
    assert!(reloaded.word("gos").is_none());

    assert!(environment.audio.path("Alice", "gos", &first_file).is_none());
    assert!(environment.audio.path("Alice", "gos", &second_file).is_none());
    assert!(environment.images.filename("gos").is_none());
    assert!(environment.images.path(&image_file).is_none());

    // The word and child audio directories were cleaned up with the
    // last file.
    assert!(!environment.config.audio_dir.join("Alice").exists());
}

#[test]
fn a_child_survives_a_full_round_trip_with_media_references() {
    let directory = TempDir::new().unwrap();
    let environment = environment(&directory);

    let mut word = Word::new("lluna").unwrap();
    word.add_recording(date(2022, 3, 4), "2022-03-04.ogg");
    word.set_image("lluna.png");

    let mut child = Child::new("Maria").unwrap();
    child.add_word(word);

    environment.db.save_child(&child).unwrap();

    assert_eq!(environment.db.child("Maria").unwrap().unwrap(), child);

    assert!(environment.db.delete_child("Maria").unwrap());
    assert!(environment.db.child("Maria").unwrap().is_none());
    assert!(environment.db.children().unwrap().is_empty());
}
