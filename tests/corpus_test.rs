use std::io::Write;

use showdown::{Corpus, DatasetError, Label};

fn write_dataset(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_sample_dataset() {
    let corpus = Corpus::load("data/sentiment.yml").unwrap();

    assert_eq!(corpus.labels(), Label::ALL.to_vec());
    for label in Label::ALL {
        assert!(corpus.expected(label) > 0);
    }
    assert_eq!(corpus.len(), Label::ALL.iter().map(|l| corpus.expected(*l)).sum::<usize>());
}

#[test]
fn test_load_keeps_item_order() {
    let file = write_dataset("positive:\n  - first\n  - second\n  - third\nnegative:\n  - bad\n");
    let corpus = Corpus::load(file.path()).unwrap();

    assert_eq!(corpus.bucket(Label::Positive), ["first", "second", "third"]);
    assert_eq!(corpus.labels(), vec![Label::Negative, Label::Positive]);
    assert_eq!(corpus.expected(Label::Neutral), 0);
}

#[test]
fn test_duplicate_texts_are_kept() {
    let file = write_dataset("neutral: [same, same]\n");
    let corpus = Corpus::load(file.path()).unwrap();
    assert_eq!(corpus.expected(Label::Neutral), 2);
}

#[test]
fn test_empty_bucket_is_allowed() {
    let file = write_dataset("negative: []\npositive:\n");
    let corpus = Corpus::load(file.path()).unwrap();

    assert_eq!(corpus.labels(), vec![Label::Negative, Label::Positive]);
    assert!(corpus.is_empty());
}

#[test]
fn test_load_errors() {
    assert!(matches!(
        Corpus::load("no/such/dataset.yml"),
        Err(DatasetError::Io { .. })
    ));

    let file = write_dataset("");
    assert!(matches!(Corpus::load(file.path()), Err(DatasetError::Empty)));

    let file = write_dataset("sarcastic: [oh great]\n");
    assert!(matches!(Corpus::load(file.path()), Err(DatasetError::UnknownLabel(_))));

    let file = write_dataset("unknown: [who knows]\n");
    assert!(matches!(Corpus::load(file.path()), Err(DatasetError::UnknownLabel(_))));

    let file = write_dataset("- just\n- a list\n");
    assert!(matches!(Corpus::load(file.path()), Err(DatasetError::Parse(_))));
}
