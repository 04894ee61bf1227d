/*!
 * Tests for JSON corpus documents
 */

use anyhow::Result;
use phrasekit::{
    Config, CorpusError, CorpusFile, KeyTermRule, PhraseTranslationHelper, Question, QuestionSource, SimpleKeyTerm,
    Substitution,
};

use crate::common;

const CORPUS: &str = r#"{
    "questions": [
        { "text": "Who was Timothy?", "reference": "ACT 16.1", "start_ref": 1, "end_ref": 1 },
        { "text": "Who was Euticus?", "reference": "ACT 20.9", "start_ref": 9, "end_ref": 9 },
        { "text": "What happened?", "reference": "ACT 20.9", "start_ref": 9, "end_ref": 9, "excluded": true }
    ],
    "key_terms": [
        { "id": "tim", "gloss": "Timothy", "renderings": ["Timoteo"] },
        { "id": "eut", "gloss": "Euticus", "renderings": ["Eutico"], "references": [9] }
    ],
    "key_term_rules": [
        { "term_id": "tim", "alternates": ["Timotheus"] },
        { "term_id": "nobody", "excluded": true }
    ],
    "rendering_rules": [
        { "name": "Names", "question_matching_pattern": "{0}", "rendering_matching_pattern": "o$" }
    ],
    "translations": [
        { "question": 0, "translation": "¿Quién era Timoteo?" }
    ]
}"#;

/// Test loading a corpus file from disk
#[test]
fn test_corpusFile_fromFile_shouldLoadEverySection() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "corpus.json", CORPUS)?;

    let corpus = CorpusFile::from_file(&path)?;

    assert_eq!(corpus.questions.len(), 3);
    assert_eq!(corpus.questions[1].reference, "ACT 20.9");
    assert!(corpus.questions[2].excluded);
    assert_eq!(corpus.key_terms[1].references, vec![9]);
    assert_eq!(corpus.key_term_rules[0], KeyTermRule::alternates("tim", &["Timotheus"]));
    assert_eq!(corpus.rendering_rules[0].name, "Names");
    assert_eq!(corpus.translations[0].question, 0);
    Ok(())
}

/// Test that a missing file is a load error and not a parse error
#[test]
fn test_corpusFile_fromFile_withMissingFile_shouldReportLoadError() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;

    let result = CorpusFile::from_file(temp_dir.path().join("absent.json"));

    assert!(matches!(result, Err(CorpusError::Load(_))));
    Ok(())
}

/// Test that a question ending before it starts is rejected
#[test]
fn test_corpusFile_fromJson_withInvertedRange_shouldFail() {
    let json = r#"{ "questions": [ { "text": "Who?", "start_ref": 5, "end_ref": 2 } ] }"#;

    assert!(matches!(CorpusFile::from_json(json), Err(CorpusError::Parse(_))));
}

/// Test that a document written out reads back the same
#[test]
fn test_corpusFile_toJson_shouldReadBack() -> Result<()> {
    let corpus = CorpusFile {
        questions: vec![Question::new("A", 1, 1, "Who was Paul?").in_category(1, 2)],
        key_terms: vec![SimpleKeyTerm::new("Paul").with_renderings(&["Pablo"])],
        substitutions: vec![Substitution::plain("Who", Some("Whom"))],
        ..CorpusFile::default()
    };

    let reloaded = CorpusFile::from_json(&corpus.to_json()?)?;

    assert_eq!(reloaded, corpus);
    Ok(())
}

/// Test using a corpus file as a question source
#[test]
fn test_corpusFile_asQuestionSource_shouldBuildHelper() -> Result<()> {
    common::init_logging();
    let corpus = CorpusFile::from_json(CORPUS)?;
    assert_eq!(corpus.key_terms()?.len(), 2);
    assert_eq!(corpus.substitutions()?.len(), 0);

    let helper = PhraseTranslationHelper::from_source(&corpus, &Config::default())?;

    assert_eq!(helper.len(), 3);
    assert_eq!(helper.unfiltered_phrases()[0].key_term_matches().count(), 1);
    assert!(helper.unfiltered_phrases()[2].is_excluded());
    let unused: Vec<&str> = helper.unused_key_term_rules().iter().map(|r| r.term_id.as_str()).collect();
    assert_eq!(unused, vec!["tim", "nobody"]);
    Ok(())
}

/// Test that an alternate form from a key-term rule is recognized
#[test]
fn test_corpusFile_keyTermRuleAlternates_shouldMatchAlternateForm() -> Result<()> {
    let json = CORPUS.replace("Who was Timothy?", "Who was Timotheus?");
    let corpus = CorpusFile::from_json(&json)?;

    let helper = PhraseTranslationHelper::from_source(&corpus, &Config::default())?;

    assert_eq!(helper.unfiltered_phrases()[0].key_term_matches().count(), 1);
    let unused: Vec<&str> = helper.unused_key_term_rules().iter().map(|r| r.term_id.as_str()).collect();
    assert_eq!(unused, vec!["nobody"]);
    Ok(())
}

/// Test locating the parsed phrase of a question when blank questions are present
#[test]
fn test_corpusFile_phraseIndex_shouldSkipBlankQuestions() -> Result<()> {
    let json = r#"{"questions": [
        { "text": "Who was Timothy?" },
        { "text": "" },
        { "text": " " },
        { "text": "Who was Euticus?" }
    ]}"#;
    let corpus = CorpusFile::from_json(json)?;

    assert_eq!(corpus.phrase_index(0), Some(0));
    assert_eq!(corpus.phrase_index(1), None);
    assert_eq!(corpus.phrase_index(2), None);
    assert_eq!(corpus.phrase_index(3), Some(1));
    assert_eq!(corpus.phrase_index(4), None);

    let helper = PhraseTranslationHelper::from_source(&corpus, &Config::default())?;
    assert_eq!(helper.unfiltered_phrases()[1].original_phrase(), "Who was Euticus?");
    Ok(())
}
