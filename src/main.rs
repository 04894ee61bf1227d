// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{debug, info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use phrasekit::app_config::{self, Config};
use phrasekit::{
    CorpusFile, KeyTermFilterType, PhrasePart, PhraseTranslationHelper, SortBy, TranslatablePhrase,
};

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// CLI Wrapper for SortBy to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliSortBy {
    Default,
    English,
    Reference,
    Translation,
}

impl From<CliSortBy> for SortBy {
    fn from(cli_sort: CliSortBy) -> Self {
        match cli_sort {
            CliSortBy::Default => SortBy::Default,
            CliSortBy::English => SortBy::EnglishPhrase,
            CliSortBy::Reference => SortBy::Reference,
            CliSortBy::Translation => SortBy::Translation,
        }
    }
}

/// CLI Wrapper for KeyTermFilterType to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliKeyTermFilter {
    All,
    WithRenderings,
    WithoutRenderings,
}

impl From<CliKeyTermFilter> for KeyTermFilterType {
    fn from(cli_filter: CliKeyTermFilter) -> Self {
        match cli_filter {
            CliKeyTermFilter::All => KeyTermFilterType::All,
            CliKeyTermFilter::WithRenderings => KeyTermFilterType::WithRenderings,
            CliKeyTermFilter::WithoutRenderings => KeyTermFilterType::WithoutRenderings,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List the phrases of a corpus with the parts they were split into
    Parse {
        /// Corpus file (JSON)
        #[arg(value_name = "CORPUS")]
        corpus: PathBuf,
    },

    /// Apply the corpus translations and print every phrase's translation
    Infer {
        /// Corpus file (JSON)
        #[arg(value_name = "CORPUS")]
        corpus: PathBuf,
    },

    /// Generate shell completions for phrasekit
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// phrasekit - phrase decomposition and translation inference
///
/// Splits a corpus of template questions into shared parts and infers
/// translations for untranslated questions from the translated ones.
#[derive(Parser, Debug)]
#[command(name = "phrasekit")]
#[command(version)]
#[command(about = "Phrase decomposition and translation inference for question corpora")]
#[command(long_about = "phrasekit splits template questions into shared parts and key terms, and \
infers translations for the whole corpus from the questions already translated.

EXAMPLES:
    phrasekit parse corpus.json                        # Show how each question was split
    phrasekit infer corpus.json                        # Show inferred translations
    phrasekit --sort reference infer corpus.json       # Sort by reference
    phrasekit --filter \"what is\" --whole-word parse corpus.json
    phrasekit completions bash > phrasekit.bash        # Generate bash completions

CONFIGURATION:
    Configuration is read from phrasekit.json by default. You can specify a
    different file with --config. If the file doesn't exist, a default one is
    created.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true, default_value = "phrasekit.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, global = true, value_enum, env = "PHRASEKIT_LOG")]
    log_level: Option<CliLogLevel>,

    /// Order of the listed phrases
    #[arg(short, long, global = true, value_enum, default_value = "default")]
    sort: CliSortBy,

    /// Reverse the sort order
    #[arg(short, long, global = true)]
    descending: bool,

    /// Only list phrases containing this text
    #[arg(short, long, global = true)]
    filter: Option<String>,

    /// Match the filter text on word boundaries only
    #[arg(short, long, global = true)]
    whole_word: bool,

    /// Restrict phrases by whether their key terms have renderings
    #[arg(short, long, global = true, value_enum, default_value = "all")]
    key_terms: CliKeyTermFilter,

    /// Also list excluded questions
    #[arg(long, global = true)]
    include_excluded: bool,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for a log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "ERROR"),
            Level::Warn => ("\x1B[1;33m", "WARN "),
            Level::Info => ("\x1B[1;32m", "INFO "),
            Level::Debug => ("\x1B[1;36m", "DEBUG"),
            Level::Trace => ("\x1B[1;35m", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, tag, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

fn main() -> Result<()> {
    // Initialized with everything enabled; the real level is applied once
    // the configuration has been read
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match &cli.command {
        Commands::Completions { shell } => {
            let mut cmd = CommandLineOptions::command();
            generate(*shell, &mut cmd, "phrasekit", &mut std::io::stdout());
            Ok(())
        }
        Commands::Parse { corpus } => {
            let config = load_config(&cli)?;
            let (helper, _) = build_helper(corpus, &config)?;
            let helper = apply_view(helper, &cli);
            print_parts(&helper);
            Ok(())
        }
        Commands::Infer { corpus } => {
            let config = load_config(&cli)?;
            let (mut helper, document) = build_helper(corpus, &config)?;
            apply_translations(&mut helper, &document)?;
            let helper = apply_view(helper, &cli);
            print_translations(&helper);
            Ok(())
        }
    }
}

/// Load the configuration, creating a default file when there is none.
fn load_config(options: &CommandLineOptions) -> Result<Config> {
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let config_path = Path::new(&options.config_path);
    let mut config = if config_path.exists() {
        Config::from_file(config_path)?
    } else {
        warn!("Config file not found at '{}', creating default config.", options.config_path);
        let config = Config::default();
        let config_json =
            serde_json::to_string_pretty(&config).context("Failed to serialize default config to JSON")?;
        std::fs::write(config_path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", options.config_path))?;
        config
    };

    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());
    debug!("Using configuration {:?}", config);
    Ok(config)
}

fn build_helper(corpus: &Path, config: &Config) -> Result<(PhraseTranslationHelper, CorpusFile)> {
    let document = CorpusFile::from_file(corpus)
        .with_context(|| format!("Failed to load corpus: {}", corpus.display()))?;
    let mut helper = PhraseTranslationHelper::from_source(&document, config)
        .with_context(|| format!("Failed to parse corpus: {}", corpus.display()))?;
    helper
        .set_rendering_rules(document.rendering_rules.clone())
        .context("Invalid rendering selection rule")?;

    for rule in helper.unused_key_term_rules() {
        warn!("Key term rule for '{}' never applied", rule.term_id);
    }
    Ok((helper, document))
}

fn apply_translations(helper: &mut PhraseTranslationHelper, document: &CorpusFile) -> Result<()> {
    helper.begin_bulk_load();
    for entry in &document.translations {
        let Some(position) = document.phrase_index(entry.question) else {
            warn!("Ignoring translation of blank question {}", entry.question);
            continue;
        };
        let id = helper
            .unfiltered_phrases()
            .get(position)
            .map(|p| p.id())
            .with_context(|| format!("No question {} in corpus", entry.question))?;
        helper.set_translation(id, Some(&entry.translation))?;
    }
    helper.end_bulk_load();
    info!(
        "Applied {} translations; {} phrases inferred",
        document.translations.len(),
        helper.last_summary().phrases_inferred
    );
    Ok(())
}

fn apply_view(mut helper: PhraseTranslationHelper, options: &CommandLineOptions) -> PhraseTranslationHelper {
    helper.filter(
        options.filter.as_deref(),
        options.whole_word,
        options.key_terms.clone().into(),
        None,
        options.include_excluded,
    );
    helper.sort(options.sort.clone().into(), !options.descending);
    helper
}

fn describe_parts(helper: &PhraseTranslationHelper, phrase: &TranslatablePhrase) -> String {
    let table = helper.part_table();
    phrase
        .parts()
        .iter()
        .map(|part| match part {
            PhrasePart::Literal(id) => format!("[{}]", table.part(*id).text()),
            PhrasePart::KeyTerm(id) => {
                let term = table.key_term_match(*id).primary_term();
                let gloss = helper.key_terms().get(term).map(|t| t.gloss()).unwrap_or("?");
                format!("<{}>", gloss)
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn print_parts(helper: &PhraseTranslationHelper) {
    for phrase in helper.phrases() {
        println!("{}\t{}", phrase.reference(), phrase.original_phrase());
        if phrase.is_excluded() {
            println!("\t(excluded)");
        } else {
            println!("\t{}", describe_parts(helper, phrase));
        }
    }
}

fn print_translations(helper: &PhraseTranslationHelper) {
    for phrase in helper.phrases() {
        let origin = if phrase.has_user_translation() { "user" } else { "inferred" };
        println!(
            "{}\t{}\t{}\t({})",
            phrase.reference(),
            phrase.original_phrase(),
            phrase.translation(),
            origin
        );
    }
}
