use audio_fingerprint::{
    calculate_similarity, find_duplicates, DuplicateFinder, Fingerprinter, SymphoniaDecoder,
    DEFAULT_SIMILARITY_THRESHOLD,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

fn write_wav(path: &Path, samples: &[i16]) {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 44_100,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    for &sample in samples {
        writer.write_sample(sample).unwrap();
    }
    writer.finalize().unwrap();
}

fn recording(frequency: f32, gain: f32) -> Vec<i16> {
    (0..44_100 * 2 * 3)
        .map(|i| {
            let t = (i / 2) as f32 / 44_100.0;
            let envelope = 0.5 + 0.5 * (t * 1.3).sin();
            ((2.0 * std::f32::consts::PI * frequency * t).sin() * envelope * gain) as i16
        })
        .collect()
}

struct Library {
    _media: TempDir,
    spool: TempDir,
    original: PathBuf,
    renamed_copy: PathBuf,
    other: PathBuf,
}

fn library() -> Library {
    let media = TempDir::new().unwrap();
    let spool = TempDir::new().unwrap();

    let original = media.path().join("01 - Song.wav");
    let renamed_copy = media.path().join("song_final_FINAL.wav");
    let other = media.path().join("02 - Other Song.wav");

    let song = recording(440.0, 20_000.0);
    write_wav(&original, &song);
    write_wav(&renamed_copy, &song);
    write_wav(&other, &recording(220.0, 9_000.0));

    Library {
        _media: media,
        spool,
        original,
        renamed_copy,
        other,
    }
}

#[tokio::test]
async fn renamed_copy_is_found_and_other_song_is_not() {
    let library = library();
    let fingerprinter = Fingerprinter::new_with_decoder(Arc::new(SymphoniaDecoder::with_spool_dir(
        library.spool.path(),
    )));

    let original = fingerprinter.fingerprint(&library.original).await.unwrap();
    let copy = fingerprinter.fingerprint(&library.renamed_copy).await.unwrap();
    let other = fingerprinter.fingerprint(&library.other).await.unwrap();

    assert_eq!(original.duration_seconds(), 3);
    assert!(original.hash().is_current_version());
    assert_eq!(original.hash().as_str().len(), 44);

    let corpus = vec![
        ("original", original.hash().to_string()),
        ("other", other.hash().to_string()),
    ];
    let matches = find_duplicates(copy.hash().as_str(), corpus, DEFAULT_SIMILARITY_THRESHOLD);

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].track_id, "original");
    assert_eq!(matches[0].similarity, 1.0);

    let score = calculate_similarity(original.hash().as_str(), other.hash().as_str());
    assert!(score < DEFAULT_SIMILARITY_THRESHOLD, "different songs scored {score}");

    assert!(std::fs::read_dir(library.spool.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn unreadable_files_are_skipped_without_aborting_a_batch() {
    let library = library();
    let broken = library.original.with_file_name("broken.flac");
    std::fs::write(&broken, [0u8; 512]).unwrap();

    let fingerprinter = Fingerprinter::new_with_decoder(Arc::new(SymphoniaDecoder::with_spool_dir(
        library.spool.path(),
    )));

    let paths = [
        library.original.clone(),
        broken,
        PathBuf::from("/missing/file.flac"),
        library.other.clone(),
    ];
    let mut fingerprints = Vec::new();
    for path in &paths {
        fingerprints.push(fingerprinter.fingerprint(path).await);
    }

    let outcome: Vec<bool> = fingerprints.iter().map(Option::is_some).collect();
    assert_eq!(outcome, vec![true, false, false, true]);
}

#[tokio::test]
async fn finder_over_a_stored_corpus() {
    let library = library();
    let fingerprinter = Fingerprinter::new_with_decoder(Arc::new(SymphoniaDecoder::with_spool_dir(
        library.spool.path(),
    )));

    let mut stored = Vec::new();
    for (id, path) in [(1u64, &library.original), (2, &library.other)] {
        let fingerprint = fingerprinter.fingerprint(path).await.unwrap();
        stored.push((id, fingerprint.hash().to_string()));
    }
    stored.push((3, "corrupted==".to_owned()));
    stored.push((4, String::new()));

    let finder = DuplicateFinder::new(stored);
    let query = fingerprinter
        .fingerprint(&library.renamed_copy)
        .await
        .unwrap();

    let matches = finder.find_duplicates_default(query.hash().as_str());
    let ids: Vec<u64> = matches.iter().map(|m| m.track_id).collect();
    assert_eq!(ids, vec![1]);
}
