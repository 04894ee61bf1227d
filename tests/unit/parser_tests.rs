/*!
 * Tests for splitting a corpus into shared parts and key terms
 */

use phrasekit::{Question, SimpleKeyTerm, Substitution};

use crate::common::{owned, parts_with_owners, TestCorpus};

/// Key term with the given verse references and no renderings
fn scoped_term(gloss: &str, references: &[i32]) -> SimpleKeyTerm {
    SimpleKeyTerm::new(gloss).with_references(references)
}

fn with_key_terms(corpus: TestCorpus, glosses: &[&str]) -> TestCorpus {
    glosses.iter().fold(corpus, |corpus, gloss| corpus.key_term(gloss, &[]))
}

/// Test that blank questions are dropped and whitespace is collapsed
#[test]
fn test_parse_withoutKeyTerms_shouldDropBlankQuestions() {
    let helper = TestCorpus::new()
        .phrase(" What do  you think?")
        .phrase("What  do you think it means to forgive?")
        .phrase("")
        .phrase("-OR-")
        .phrase("How could I have forgotten the question mark")
        .phrase("What do you think  it means to bless someone? ")
        .phrase("What is this? ")
        .build();

    assert_eq!(helper.unfiltered_phrases().len(), 6);
    assert!(helper.verify_integrity().is_ok());
    assert_eq!(parts_with_owners(&helper, " What do  you think?"), owned(&[("what do you think", 3)]));
    assert_eq!(
        parts_with_owners(&helper, "What  do you think it means to forgive?"),
        owned(&[("what do you think", 3), ("it means to forgive", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "-OR-"), owned(&[("-or-", 1)]));
    assert_eq!(
        parts_with_owners(&helper, "How could I have forgotten the question mark"),
        owned(&[("how could i have forgotten the question mark", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What do you think  it means to bless someone? "),
        owned(&[("what do you think", 3), ("it means to bless someone", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "What is this? "), owned(&[("what is this", 1)]));
}

/// Test that a remainder left by carving out a shared part reuses an existing part
#[test]
fn test_coalesce_remainderIsExistingPart_shouldShareIt() {
    let helper = TestCorpus::new()
        .phrase("Who was the man who went to the store?")
        .phrase("Who was the man?")
        .phrase("Who went to the store?")
        .phrase("Who was the man with the goatee who went to the store?")
        .build();

    assert_eq!(helper.unfiltered_phrases().len(), 4);
    assert_eq!(
        parts_with_owners(&helper, "Who was the man who went to the store?"),
        owned(&[("who was the man", 3), ("who went to the store", 3)])
    );
    assert_eq!(parts_with_owners(&helper, "Who was the man?"), owned(&[("who was the man", 3)]));
    assert_eq!(parts_with_owners(&helper, "Who went to the store?"), owned(&[("who went to the store", 3)]));
    assert_eq!(
        parts_with_owners(&helper, "Who was the man with the goatee who went to the store?"),
        owned(&[("who was the man", 3), ("with the goatee", 1), ("who went to the store", 3)])
    );
}

/// Test carving a shared part out of the middle of a longer part
#[test]
fn test_coalesce_sharedPartInTheMiddle_shouldLeaveRemainderOnBothSides() {
    let helper = TestCorpus::new()
        .phrase("Are you the one who knows the man who ate the monkey?")
        .phrase("Who knows the man?")
        .build();

    assert_eq!(
        parts_with_owners(&helper, "Are you the one who knows the man who ate the monkey?"),
        owned(&[("are you the one", 1), ("who knows the man", 2), ("who ate the monkey", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "Who knows the man?"), owned(&[("who knows the man", 2)]));
}

/// Test that parts are never carved out of the middle of a word
#[test]
fn test_coalesce_sharedWordsInsideLongerWord_shouldNotSplit() {
    let helper = TestCorpus::new()
        .key_term("think", &[])
        .phrase("Was a man happy?")
        .phrase("As a man thinks in his heart, how is he?")
        .build();

    assert_eq!(parts_with_owners(&helper, "Was a man happy?"), owned(&[("was a man happy", 1)]));
    assert_eq!(
        parts_with_owners(&helper, "As a man thinks in his heart, how is he?"),
        owned(&[("as a man", 1), ("in his heart how is he", 1)])
    );
}

/// Test key terms made of several words, with optional and leading-"to" forms
#[test]
fn test_parse_multiWordKeyTerms_shouldMatchLongestForm() {
    let helper = with_key_terms(
        TestCorpus::new(),
        &[
            "to forgive (flamboyantly)",
            "to forgive always and forever",
            "high priest",
            "God",
            "sentence that is seven words long",
            "sentence",
            "seven",
        ],
    )
    .phrase("What do you think it means to forgive?")
    .phrase("Bla bla bla to forgive always?")
    .phrase("Please forgive!")
    .phrase("Who do you think God wants you to forgive and why?")
    .phrase("Can you say a sentence that is seven words long?")
    .phrase("high priest")
    .phrase("If the high priest wants you to forgive God, can he ask you using a sentence that is seven words long or not?")
    .phrase("Is this sentence that is seven dwarves?")
    .build();

    assert_eq!(helper.unfiltered_phrases().len(), 8);
    assert_eq!(
        parts_with_owners(&helper, "What do you think it means to forgive?"),
        owned(&[("what do you think it means", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Bla bla bla to forgive always?"),
        owned(&[("bla bla bla", 1), ("always", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "Please forgive!"), owned(&[("please", 1)]));
    assert_eq!(
        parts_with_owners(&helper, "Who do you think God wants you to forgive and why?"),
        owned(&[("who do you think", 1), ("wants you", 2), ("and why", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Can you say a sentence that is seven words long?"),
        owned(&[("can you say a", 1)])
    );
    assert!(parts_with_owners(&helper, "high priest").is_empty());
    assert_eq!(
        parts_with_owners(
            &helper,
            "If the high priest wants you to forgive God, can he ask you using a sentence that is seven words long or not?"
        ),
        owned(&[("if the", 1), ("wants you", 2), ("can he ask you using a", 1), ("or not", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Is this sentence that is seven dwarves?"),
        owned(&[("is this", 1), ("that is", 1), ("dwarves", 1)])
    );
}

/// Test that a multi-word term cut short at the end of a phrase does not match
#[test]
fn test_parse_multiWordKeyTermCutShort_shouldNotMatch() {
    let helper = TestCorpus::new()
        .key_term("John", &[])
        .key_term("tell the good news", &[])
        .phrase("What did John tell the Christians?")
        .phrase("Why should you tell the good news?")
        .build();

    assert_eq!(
        parts_with_owners(&helper, "What did John tell the Christians?"),
        owned(&[("what did", 1), ("tell the christians", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Why should you tell the good news?"),
        owned(&[("why should you", 1)])
    );
}

/// Test glosses with parenthesized optional words and an optional leading "to"
#[test]
fn test_parse_keyTermsWithOptionalWords_shouldMatchEveryForm() {
    let helper = with_key_terms(
        TestCorpus::new(),
        &["ask for (earnestly)", "to sin", "(things of) this life", "(loving)kindness"],
    )
    .phrase("Did Herod ask for John's head because he wanted to sin?")
    .phrase("Did Jambres sin when he clung to the things of this life?")
    .phrase("Whose lovingkindness is everlasting?")
    .phrase("What did John ask for earnestly?")
    .phrase("Is showing kindness in this life a way to earn salvation?")
    .build();

    assert_eq!(
        parts_with_owners(&helper, "Did Herod ask for John's head because he wanted to sin?"),
        owned(&[("did herod", 1), ("john's head because he wanted", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Did Jambres sin when he clung to the things of this life?"),
        owned(&[("did jambres", 1), ("when he clung to the", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Whose lovingkindness is everlasting?"),
        owned(&[("whose", 1), ("is everlasting", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What did John ask for earnestly?"),
        owned(&[("what did john", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Is showing kindness in this life a way to earn salvation?"),
        owned(&[("is showing", 1), ("in", 1), ("a way to earn salvation", 1)])
    );
}

/// Test that apostrophes stay inside words and possessives still match terms
#[test]
fn test_parse_withApostrophes_shouldKeepPossessives() {
    let helper = with_key_terms(
        TestCorpus::new(),
        &[
            "(God described as the) Most High",
            "(God of) hosts",
            "God",
            "heavenly creature, symbol of God's majesty and associated with his presence",
            "(one's own) burial-place",
            "to make straight (one's way)",
            "love for one's fellow believer",
        ],
    )
    .phrase("If one gives one's word and doesn't keep it, is it sin?")
    .phrase("Is there one way to heaven?")
    .phrase("Is the Bible God's Word?")
    .phrase("Who is God's one and only Son?")
    .phrase("Can the God of hosts also be called the Most High God?")
    .phrase("Should one be buried in one's own burial-place?")
    .phrase("Do wise people make straight paths for themselves?")
    .phrase("How can you tell if one has love for one's fellow believer?")
    .phrase("Is the earth God's?")
    .build();

    assert_eq!(helper.unfiltered_phrases().len(), 9);
    assert_eq!(
        parts_with_owners(&helper, "If one gives one's word and doesn't keep it, is it sin?"),
        owned(&[("if one gives one's word and doesn't keep it is it sin", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Is there one way to heaven?"),
        owned(&[("is there one way to heaven", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Is the Bible God's Word?"),
        owned(&[("is the bible", 1), ("word", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Who is God's one and only Son?"),
        owned(&[("who is", 1), ("one and only son", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Can the God of hosts also be called the Most High God?"),
        owned(&[("can the", 1), ("also be called the", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Should one be buried in one's own burial-place?"),
        owned(&[("should one be buried in", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Do wise people make straight paths for themselves?"),
        owned(&[("do wise people", 1), ("paths for themselves", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "How can you tell if one has love for one's fellow believer?"),
        owned(&[("how can you tell if one has", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "Is the earth God's?"), owned(&[("is the earth", 1)]));
}

fn bible_names_corpus() -> TestCorpus {
    with_key_terms(
        TestCorpus::new(),
        &["John", "Paul", "Mary", "temple", "forgive", "bless", "God", "Jesus", "sin"],
    )
    .phrase("Who was John?")
}

/// Test plain substitutions that rewrite, remove and empty out words
#[test]
fn test_parse_withPlainSubstitutions_shouldParseRewrittenText() {
    let helper = bible_names_corpus()
        .substitution(Substitution::plain("What do you think it means", Some("What means")))
        .substitution(Substitution::plain("the", None))
        .substitution(Substitution::plain("do", Some("")))
        .phrase("Who was Paul?")
        .phrase("Who was Mary?")
        .phrase("Who went to the well?")
        .phrase("Who went to the temple?")
        .phrase("What do you think it means to forgive?")
        .phrase("What do you think it means to bless someone?")
        .phrase("What do you think God wants you to do?")
        .phrase("Why do you think God created man?")
        .phrase("Why do you think God  sent Jesus to the earth?")
        .phrase("Who went to the well with Jesus?")
        .phrase("Do you think God could forgive someone who sins?")
        .phrase("What do you think it means to serve two masters?")
        .build();

    assert_eq!(helper.unfiltered_phrases().len(), 13);
    for name in ["John", "Paul", "Mary"] {
        let text = format!("Who was {}?", name);
        assert_eq!(parts_with_owners(&helper, &text), owned(&[("who was", 3)]));
    }
    assert_eq!(parts_with_owners(&helper, "Who went to the well?"), owned(&[("who went to well", 2)]));
    assert_eq!(parts_with_owners(&helper, "Who went to the temple?"), owned(&[("who went to", 1)]));
    assert_eq!(
        parts_with_owners(&helper, "What do you think it means to forgive?"),
        owned(&[("what means to", 3)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What do you think it means to bless someone?"),
        owned(&[("what means to", 3), ("someone", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What do you think God wants you to do?"),
        owned(&[("what", 1), ("you think", 2), ("wants you to", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Why do you think God created man?"),
        owned(&[("why you think", 2), ("created man", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Why do you think God  sent Jesus to the earth?"),
        owned(&[("why you think", 2), ("sent", 1), ("to earth", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Who went to the well with Jesus?"),
        owned(&[("who went to well", 2), ("with", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Do you think God could forgive someone who sins?"),
        owned(&[("you think", 2), ("could", 1), ("someone who", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What do you think it means to serve two masters?"),
        owned(&[("what means to", 3), ("serve two masters", 1)])
    );
}

/// Test regex and case-sensitive substitutions, including group references
#[test]
fn test_parse_withRegexSubstitutions_shouldParseRewrittenText() {
    let helper = with_key_terms(
        TestCorpus::new(),
        &["John", "Paul", "Mary", "altar", "forgive", "bless", "God", "Jesus", "sin"],
    )
    .substitution(Substitution::plain("what do you think it means", Some("what means")).case_sensitive())
    .substitution(Substitution::regex(r"\ban\b", Some("a")))
    .substitution(Substitution::regex(r"did (\S+) do", Some("did $1")).case_sensitive())
    .substitution(Substitution::regex(r"ed\b", None).case_sensitive())
    .phrase("What did John do?")
    .phrase("What did Paul do?")
    .phrase("Who was Mary?")
    .phrase("Who walked on a wall?")
    .phrase("Who walked on an altar?")
    .phrase("What do you think it means to forgive?")
    .phrase("what do you think it means to bless someone?")
    .phrase("Did Mary do the right thing?")
    .build();

    assert_eq!(helper.unfiltered_phrases().len(), 8);
    assert_eq!(parts_with_owners(&helper, "What did John do?"), owned(&[("what did", 2)]));
    assert_eq!(parts_with_owners(&helper, "What did Paul do?"), owned(&[("what did", 2)]));
    assert_eq!(parts_with_owners(&helper, "Who was Mary?"), owned(&[("who was", 1)]));
    assert_eq!(
        parts_with_owners(&helper, "Who walked on a wall?"),
        owned(&[("who walk on a", 2), ("wall", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "Who walked on an altar?"), owned(&[("who walk on a", 2)]));
    assert_eq!(
        parts_with_owners(&helper, "What do you think it means to forgive?"),
        owned(&[("what do you think it means to", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "what do you think it means to bless someone?"),
        owned(&[("what means to", 1), ("someone", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Did Mary do the right thing?"),
        owned(&[("did", 1), ("do the right thing", 1)])
    );
}

/// Test that key terms only match questions whose verse range covers them
#[test]
fn test_parse_withReferenceRanges_shouldOnlyMatchTermsInRange() {
    let helper = TestCorpus::new()
        .term(scoped_term("God", &[4]))
        .term(scoped_term("Paul", &[1, 3, 5]))
        .term(scoped_term("have", &[99]))
        .term(scoped_term("say", &[2, 5]))
        .question(Question::new("A-D", 1, 4, "What would God have me to say with respect to Paul?"))
        .question(Question::new("B", 2, 2, "What is Paul asking me to say with respect to that dog?"))
        .question(Question::new("C", 3, 3, "that dog"))
        .question(Question::new("B-D", 2, 4, "Is it okay for Paul to talk with respect to God today?"))
        .question(Question::new("E", 5, 5, "that dog wishes this Paul what is say radish"))
        .question(Question::new("E-F", 5, 6, "What is that dog?"))
        .build();

    assert_eq!(helper.unfiltered_phrases().len(), 6);
    assert_eq!(
        parts_with_owners(&helper, "What would God have me to say with respect to Paul?"),
        owned(&[("what would", 1), ("have me to", 1), ("with respect to", 3)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What is Paul asking me to say with respect to that dog?"),
        owned(&[("what is", 3), ("paul asking me to", 1), ("with respect to", 3), ("that dog", 4)])
    );
    assert_eq!(parts_with_owners(&helper, "that dog"), owned(&[("that dog", 4)]));
    assert_eq!(
        parts_with_owners(&helper, "Is it okay for Paul to talk with respect to God today?"),
        owned(&[("is it okay for", 1), ("to talk", 1), ("with respect to", 3), ("today", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "that dog wishes this Paul what is say radish"),
        owned(&[("that dog", 4), ("wishes this", 1), ("what is", 3), ("radish", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "What is that dog?"),
        owned(&[("what is", 3), ("that dog", 4)])
    );
}

/// Test scoped terms whose glosses list "or" choices and optional words
#[test]
fn test_parse_withScopedOrChoiceTerms_shouldMatchEachChoice() {
    let helper = TestCorpus::new()
        .term(scoped_term("high priest", &[1]))
        .term(scoped_term("high", &[1, 2]))
        .term(scoped_term("radish", &[1, 2]))
        .term(scoped_term("(to have) eaten or drunk", &[2, 3]))
        .term(scoped_term("high or drunk sailor", &[2, 4]))
        .question(Question::new("A", 1, 1, "Was the high priest on his high horse?"))
        .question(Question::new("B", 2, 2, "Who was the high priest?"))
        .question(Question::new("A", 1, 1, "I have eaten the horse."))
        .question(Question::new("C", 3, 3, "How high is this?"))
        .question(Question::new("C-D", 3, 4, "That drunk sailor has eaten a radish"))
        .question(Question::new("A-B", 1, 2, "That high sailor was to have drunk some radish juice"))
        .build();

    assert_eq!(helper.unfiltered_phrases().len(), 6);
    assert_eq!(
        parts_with_owners(&helper, "Was the high priest on his high horse?"),
        owned(&[("was the", 2), ("on his", 1), ("horse", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "Who was the high priest?"),
        owned(&[("who", 1), ("was the", 2), ("priest", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "I have eaten the horse."),
        owned(&[("i have eaten the horse", 1)])
    );
    assert_eq!(parts_with_owners(&helper, "How high is this?"), owned(&[("how high is this", 1)]));
    assert_eq!(
        parts_with_owners(&helper, "That drunk sailor has eaten a radish"),
        owned(&[("that", 2), ("has", 1), ("a radish", 1)])
    );
    assert_eq!(
        parts_with_owners(&helper, "That high sailor was to have drunk some radish juice"),
        owned(&[("that", 2), ("was", 1), ("some", 1), ("juice", 1)])
    );
}
