/*!
 * Integration tests for loading a corpus and translating it end to end
 */

use anyhow::Result;
use phrasekit::{Config, CorpusFile, KeyTermFilterType, PhraseTranslationHelper, SortBy};

use crate::common;

const CORPUS: &str = r#"{
    "questions": [
        { "text": "Who was Timothy?", "reference": "ACT 16.1", "start_ref": 1, "end_ref": 1 },
        { "text": "Who was Euticus?", "reference": "ACT 20.9", "start_ref": 9, "end_ref": 9 },
        { "text": "Who was Jacob?", "reference": "ACT 7.8", "start_ref": 8, "end_ref": 8 },
        { "text": "What happened to Euticus?", "reference": "ACT 20.9", "start_ref": 9, "end_ref": 9, "excluded": true }
    ],
    "key_terms": [
        { "id": "tim", "gloss": "Timothy", "renderings": ["Timoteo"] },
        { "id": "eut", "gloss": "Euticus", "renderings": ["Eutico"] },
        { "id": "jac", "gloss": "Jacob", "renderings": ["Jacobo", "Santiago"] }
    ],
    "rendering_rules": [
        { "question_matching_pattern": "Who was {0}", "rendering_matching_pattern": "^S" }
    ],
    "translations": [
        { "question": 0, "translation": "¿Quién era Timoteo?" }
    ]
}"#;

/// Load, apply the document's rules and translations, and return the helper
fn load(json: &str) -> Result<PhraseTranslationHelper> {
    common::init_logging();
    let temp_dir = common::create_temp_dir()?;
    let path = common::create_test_file(temp_dir.path(), "corpus.json", json)?;
    let document = CorpusFile::from_file(&path)?;

    let mut helper = PhraseTranslationHelper::from_source(&document, &Config::default())?;
    helper.set_rendering_rules(document.rendering_rules.clone())?;
    helper.begin_bulk_load();
    for entry in &document.translations {
        if let Some(position) = document.phrase_index(entry.question) {
            let id = helper.unfiltered_phrases()[position].id();
            helper.set_translation(id, Some(&entry.translation))?;
        }
    }
    helper.end_bulk_load();
    Ok(helper)
}

/// Test the whole flow from file to inferred translations
#[test]
fn test_corpusWorkflow_withTranslatedQuestion_shouldInferTheRest() -> Result<()> {
    let helper = load(CORPUS)?;
    let phrases = helper.unfiltered_phrases();

    assert_eq!(phrases[0].translation(), "¿Quién era Timoteo?");
    assert_eq!(phrases[1].translation(), "¿Quién era Eutico?");
    assert_eq!(phrases[2].translation(), "¿Quién era Santiago?");
    assert!(phrases[3].is_excluded());
    assert_eq!(phrases[3].translation(), "");
    assert_eq!(helper.last_summary().training_phrases, 1);
    assert_eq!(helper.last_summary().phrases_inferred, 2);
    helper.verify_integrity()?;
    Ok(())
}

/// Test narrowing and ordering the loaded corpus the way the command line does
#[test]
fn test_corpusWorkflow_filterAndSort_shouldListMatchingPhrases() -> Result<()> {
    let mut helper = load(CORPUS)?;

    helper.filter(Some("Euticus"), true, KeyTermFilterType::All, None, true);
    helper.sort(SortBy::EnglishPhrase, false);

    let texts: Vec<&str> = helper.phrases().map(|p| p.original_phrase()).collect();
    assert_eq!(texts, vec!["Who was Euticus?", "What happened to Euticus?"]);
    Ok(())
}

/// Test that blank questions are skipped without shifting later translations
#[test]
fn test_corpusWorkflow_withBlankQuestion_shouldKeepTranslationsAligned() -> Result<()> {
    let json = CORPUS
        .replace(
            r#"{ "text": "Who was Timothy?""#,
            r#"{ "text": "  " }, { "text": "Who was Timothy?""#,
        )
        .replace(r#""question": 0,"#, r#""question": 1,"#);

    let helper = load(&json)?;
    let phrases = helper.unfiltered_phrases();

    assert_eq!(phrases.len(), 4);
    assert_eq!(phrases[0].original_phrase(), "Who was Timothy?");
    assert!(phrases[0].has_user_translation());
    assert_eq!(phrases[1].translation(), "¿Quién era Eutico?");
    Ok(())
}

/// Test that a document with a bad rendering rule is rejected when applied
#[test]
fn test_corpusWorkflow_withInvalidRenderingRule_shouldFail() {
    let json = CORPUS.replace("^S", "[S");

    assert!(load(&json).is_err());
}
