/*!
 * Tests for error types and conversions
 */

use phrasekit::{AppError, CorpusError, PhraseError};

#[test]
fn test_phraseError_invalidPattern_shouldDisplayPatternAndMessage() {
    let error = PhraseError::InvalidPattern {
        pattern: "(oops".to_string(),
        message: "unclosed group".to_string(),
    };
    let display = format!("{}", error);
    assert!(display.contains("Invalid pattern"));
    assert!(display.contains("(oops"));
    assert!(display.contains("unclosed group"));
}

#[test]
fn test_phraseError_unknownPhrase_shouldDisplayIndex() {
    let display = format!("{}", PhraseError::UnknownPhrase(42));
    assert!(display.contains("Unknown phrase"));
    assert!(display.contains("42"));
}

#[test]
fn test_corpusError_fromPhraseError_shouldWrapCorrectly() {
    let error: CorpusError = PhraseError::InvariantViolation("orphan part".to_string()).into();
    match &error {
        CorpusError::Phrase(PhraseError::InvariantViolation(msg)) => assert_eq!(msg, "orphan part"),
        _ => panic!("Expected CorpusError::Phrase"),
    }
    assert!(format!("{}", error).contains("orphan part"));
}

#[test]
fn test_corpusError_fromSerdeError_shouldBeParseError() {
    let serde_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
    let error: CorpusError = serde_error.into();
    assert!(matches!(error, CorpusError::Parse(_)));
}

#[test]
fn test_appError_fromCorpusError_shouldWrapCorrectly() {
    let error: AppError = CorpusError::Load("corpus.json: not found".to_string()).into();
    assert!(matches!(error, AppError::Corpus(CorpusError::Load(_))));
    assert!(format!("{}", error).contains("corpus.json"));
}

#[test]
fn test_appError_fromIoError_shouldBeFileError() {
    let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::File(_)));
    assert!(format!("{}", error).contains("File not found"));
}

#[test]
fn test_appError_fromAnyhow_shouldBeUnknownError() {
    let error: AppError = anyhow::anyhow!("Something went wrong").into();
    assert!(matches!(error, AppError::Unknown(_)));
    assert!(format!("{}", error).contains("Something went wrong"));
}
