// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Context, Result, anyhow};
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{Shell, generate};
use log::{Level, LevelFilter, Log, Metadata, Record, SetLoggerError, info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};

use yahtwai::app_config::{self, CheckpointBackend, Config, TranslationProvider};
use yahtwai::app_controller::Controller;
use yahtwai::language_utils;

/// CLI Wrapper for TranslationProvider to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliTranslationProvider {
    Anthropic,
    Ollama,
}

impl From<CliTranslationProvider> for TranslationProvider {
    fn from(cli_provider: CliTranslationProvider) -> Self {
        match cli_provider {
            CliTranslationProvider::Anthropic => TranslationProvider::Anthropic,
            CliTranslationProvider::Ollama => TranslationProvider::Ollama,
        }
    }
}

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

/// CLI Wrapper for CheckpointBackend to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliCheckpointBackend {
    File,
    Sqlite,
}

impl From<CliCheckpointBackend> for CheckpointBackend {
    fn from(cli_backend: CliCheckpointBackend) -> Self {
        match cli_backend {
            CliCheckpointBackend::File => CheckpointBackend::File,
            CliCheckpointBackend::Sqlite => CheckpointBackend::Sqlite,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check that the configured provider answers
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "conf.json")]
        config_path: String,
    },

    /// Generate shell completions for yahtwai
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Parser, Debug)]
struct TranslateArgs {
    /// Directory holding the source documents
    #[arg(value_name = "SOURCE_DIR")]
    source_dir: Option<PathBuf>,

    /// Translate documents again even when their translation exists
    #[arg(short, long)]
    force_overwrite: bool,

    /// Translation provider to use
    #[arg(short, long, value_enum)]
    provider: Option<CliTranslationProvider>,

    /// Model name to use for translation
    #[arg(short, long)]
    model: Option<String>,

    /// API key of the provider
    #[arg(short = 'k', long, env = "ANTHROPIC_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Source language code (e.g., 'he')
    #[arg(short, long)]
    source_language: Option<String>,

    /// Target language codes, comma separated (e.g., 'en,fr')
    #[arg(short, long, value_delimiter = ',')]
    target_languages: Vec<String>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,

    /// Stop after this many documents per language
    #[arg(short = 'n', long)]
    limit: Option<usize>,

    /// Documents translated at the same time
    #[arg(short = 'j', long)]
    concurrency: Option<usize>,

    /// Checkpoint persistence backend
    #[arg(long, value_enum)]
    checkpoint_backend: Option<CliCheckpointBackend>,
}

/// YAHTwAI - Yet Another HTML Translator with AI
///
/// Translates a directory of HTML documents chunk by chunk with an LLM,
/// checking every answer against the structure of the source.
#[derive(Parser, Debug)]
#[command(name = "yahtwai")]
#[command(version)]
#[command(about = "Structure-preserving HTML translation with AI")]
#[command(args_conflicts_with_subcommands = true)]
#[command(long_about = "YAHTwAI translates HTML documents with AI providers while keeping their markup intact.

EXAMPLES:
    yahtwai site/                               # Translate using default config
    yahtwai -f site/                            # Translate existing documents again
    yahtwai -t en,fr -j 4 site/                 # Two languages, four documents at a time
    yahtwai -p ollama -m llama3.1 site/         # Use a specific provider and model
    yahtwai --log-level debug -n 1 site/        # One document per language with debug logging
    yahtwai check                               # Test the provider connection
    yahtwai completions bash > yahtwai.bash     # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

OUTPUT:
    Translations are written to SOURCE_DIR/<language>/<document>. Interrupted
    documents resume from their checkpoint on the next run.")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    translate: TranslateArgs,
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
        log::set_boxed_logger(Box::new(CustomLogger::new(level)))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "❌ "),
            Level::Warn => ("1;33", "🚧 "),
            Level::Info => ("1;32", " "),
            Level::Debug => ("1;36", "🔍 "),
            Level::Trace => ("1;35", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level && metadata.target().starts_with("yahtwai")
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                emoji,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize the logger with the most verbose level; the effective
    // level is set with log::set_max_level once the config is loaded
    CustomLogger::init(LevelFilter::Trace)?;
    log::set_max_level(LevelFilter::Info);

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "yahtwai", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Check { config_path }) => {
            let config = load_config(&config_path)?;
            config.validate().context("Configuration validation failed")?;
            Controller::with_config(config)?.check_provider().await
        }
        None => run_translate(cli.translate).await,
    }
}

/// Load the configuration file, writing the default one when it is missing
fn load_config(config_path: &str) -> Result<Config> {
    if Path::new(config_path).exists() {
        Config::from_file(config_path)
    } else {
        warn!("Config file not found at '{}', creating default config.", config_path);
        let config = Config::default();
        config.save(config_path)?;
        Ok(config)
    }
}

/// Apply command line options on top of the loaded configuration
fn apply_overrides(config: &mut Config, options: &TranslateArgs) -> Result<()> {
    if let Some(provider) = &options.provider {
        config.translation.provider = provider.clone().into();
    }
    if let Some(model) = &options.model {
        config.translation.active_provider_config_mut().model = model.clone();
    }
    if let Some(api_key) = &options.api_key {
        config.translation.active_provider_config_mut().api_key = api_key.clone();
    }
    if let Some(source_language) = &options.source_language {
        config.source_language = source_language.clone();
    }
    if !options.target_languages.is_empty() {
        config.target_languages = options
            .target_languages
            .iter()
            .map(|code| language_utils::normalize_to_part1_or_part2t(code))
            .collect::<Result<Vec<_>>>()?;
    }
    if let Some(source_dir) = &options.source_dir {
        config.run.source_dir = source_dir.to_string_lossy().to_string();
    }
    if let Some(limit) = options.limit {
        config.run.limit = Some(limit);
    }
    if let Some(concurrency) = options.concurrency {
        config.run.concurrent_documents = concurrency;
    }
    if let Some(backend) = &options.checkpoint_backend {
        config.run.checkpoint_backend = backend.clone().into();
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
    Ok(())
}

async fn run_translate(options: TranslateArgs) -> Result<()> {
    // If log level is set via command line, apply it immediately
    if let Some(cli_level) = &options.log_level {
        let level: app_config::LogLevel = cli_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = load_config(&options.config_path)?;
    apply_overrides(&mut config, &options)?;
    config.validate().context("Configuration validation failed")?;
    log::set_max_level(config.log_level.to_level_filter());

    if !Path::new(&config.run.source_dir).is_dir() {
        return Err(anyhow!("Source directory does not exist: {}", config.run.source_dir));
    }

    let controller = Controller::with_config(config)?;
    let summary = controller.run(options.force_overwrite).await?;
    if summary.incomplete > 0 {
        warn!(
            "{} document(s) are incomplete; run again to resume them",
            summary.incomplete
        );
    } else {
        info!("All done");
    }

    Ok(())
}
