use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::default::Default;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::language_utils;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language codes (ISO); one worker per document and language
    #[serde(default = "default_target_languages")]
    pub target_languages: Vec<String>,

    /// Translation config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Chunking of document bodies
    #[serde(default)]
    pub chunking: ChunkingConfig,

    /// Document boundary and completion markers
    #[serde(default)]
    pub document: DocumentConfig,

    /// Answer validation settings
    #[serde(default)]
    pub validation: ValidationConfig,

    /// Degraded output settings
    #[serde(default)]
    pub recovery: RecoveryConfig,

    /// Per-language profiles
    #[serde(default = "default_language_profiles")]
    pub languages: Vec<LanguageProfile>,

    /// Run driver settings
    #[serde(default)]
    pub run: RunConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation provider type
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationProvider {
    // @provider: Anthropic messages API
    #[default]
    Anthropic,
    // @provider: Local Ollama server
    Ollama,
}

impl TranslationProvider {
    // @returns: Capitalized provider name
    pub fn display_name(&self) -> &str {
        match self {
            Self::Anthropic => "Anthropic",
            Self::Ollama => "Ollama",
        }
    }

    // @returns: Lowercase provider identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Anthropic => "anthropic".to_string(),
            Self::Ollama => "ollama".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "anthropic" => Ok(Self::Anthropic),
            "ollama" => Ok(Self::Ollama),
            _ => Err(anyhow!("Invalid provider type: {}", s)),
        }
    }
}

/// Provider configuration wrapper
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProviderConfig {
    // @field: Provider type identifier
    #[serde(rename = "type")]
    pub provider_type: String,

    // @field: Model name
    #[serde(default = "String::new")]
    pub model: String,

    // @field: API key
    #[serde(default = "String::new")]
    pub api_key: String,

    // @field: Service URL
    #[serde(default = "String::new")]
    pub endpoint: String,

    // @field: Timeout seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    // @field: Extra HTTP headers sent with every request
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl ProviderConfig {
    // @param provider_type: Provider enum
    // @returns: Provider config with defaults
    pub fn new(provider_type: TranslationProvider) -> Self {
        match provider_type {
            TranslationProvider::Anthropic => Self {
                provider_type: "anthropic".to_string(),
                model: default_anthropic_model(),
                api_key: String::new(),
                endpoint: default_anthropic_endpoint(),
                timeout_secs: default_anthropic_timeout_secs(),
                headers: BTreeMap::new(),
            },
            TranslationProvider::Ollama => Self {
                provider_type: "ollama".to_string(),
                model: default_ollama_model(),
                api_key: String::new(),
                endpoint: default_ollama_endpoint(),
                timeout_secs: default_timeout_secs(),
                headers: BTreeMap::new(),
            },
        }
    }
}

/// Translation service configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    /// Translation provider to use
    #[serde(default)]
    pub provider: TranslationProvider,

    /// Available translation providers
    #[serde(default)]
    pub available_providers: Vec<ProviderConfig>,

    /// Common translation settings
    #[serde(default)]
    pub common: TranslationCommonConfig,
}

/// Common translation settings applicable to all providers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationCommonConfig {
    /// System prompt template.
    /// Placeholders: {language}, {title}, {translator_note}, {example}
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,

    /// Compliance reminder sent with every request
    #[serde(default = "default_reminder")]
    pub reminder: String,

    /// Delay in milliseconds before each generator call
    #[serde(default)]
    pub rate_limit_delay_ms: u64,

    /// Base temperature (0.0 to 1.0), raised by 0.3 per failed attempt
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Output token ceiling per request
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Lower bound of the budget after a structural mismatch
    #[serde(default = "default_min_tokens")]
    pub min_tokens: u32,

    /// Attempts per part before recovery
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for TranslationCommonConfig {
    fn default() -> Self {
        Self {
            system_prompt: default_system_prompt(),
            reminder: default_reminder(),
            rate_limit_delay_ms: 0,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            min_tokens: default_min_tokens(),
            max_attempts: default_max_attempts(),
        }
    }
}

/// Chunking configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Maximum characters of flattened body per chunk
    #[serde(default = "default_chunk_max_size")]
    pub chunk_max_size: usize,

    /// Characters of previous translation carried as continuity context
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,

    /// The overlap is split in this many parts; the last one is the primer
    #[serde(default = "default_overlap_parting")]
    pub overlap_parting: usize,

    /// Natural separators, highest priority first
    #[serde(default = "default_separators")]
    pub separators: Vec<String>,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_max_size: default_chunk_max_size(),
            chunk_overlap: default_chunk_overlap(),
            overlap_parting: default_overlap_parting(),
            separators: default_separators(),
        }
    }
}

/// Document markers
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DocumentConfig {
    /// Start of the translatable body; everything before is header
    #[serde(default = "default_body_start_marker")]
    pub body_start_marker: String,

    /// End of the document; the body stops at its last occurrence
    #[serde(default = "default_end_marker")]
    pub end_marker: String,

    /// Generator stop sequence marking the end of the body
    #[serde(default = "default_stop_marker")]
    pub stop_marker: String,

    /// Marker opening a degraded fragment
    #[serde(default = "default_incomplete_marker")]
    pub incomplete_marker: String,

    /// Assistant primer for the first request of a document. Placeholder: {title}
    #[serde(default = "default_opening_primer")]
    pub opening_primer: String,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            body_start_marker: default_body_start_marker(),
            end_marker: default_end_marker(),
            stop_marker: default_stop_marker(),
            incomplete_marker: default_incomplete_marker(),
            opening_primer: default_opening_primer(),
        }
    }
}

/// Answer validation settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ValidationConfig {
    /// Inclusive code point ranges of the source script
    #[serde(default = "default_source_script_ranges")]
    pub source_script_ranges: Vec<[u32; 2]>,

    /// Maximum leaked positions reported
    #[serde(default = "default_leak_cap")]
    pub leak_cap: usize,

    /// Sliding window size for repetition detection
    #[serde(default = "default_repetition_window")]
    pub repetition_window: usize,

    /// Repetitions per window that count as looping (spaced scripts)
    #[serde(default = "default_repetition_threshold")]
    pub repetition_threshold: usize,

    /// Repetitions per window that count as looping (unspaced scripts)
    #[serde(default = "default_unspaced_repetition_threshold")]
    pub unspaced_repetition_threshold: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            source_script_ranges: default_source_script_ranges(),
            leak_cap: default_leak_cap(),
            repetition_window: default_repetition_window(),
            repetition_threshold: default_repetition_threshold(),
            unspaced_repetition_threshold: default_unspaced_repetition_threshold(),
        }
    }
}

/// Degraded output settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RecoveryConfig {
    /// Emit a degraded fragment instead of failing when progress exists
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Link to the complete reference edition. Placeholder: {name}
    #[serde(default = "default_reference_link")]
    pub reference_link: String,

    /// Text of the reference link
    #[serde(default = "default_reference_text")]
    pub reference_text: String,

    /// Optional footer link to the site
    #[serde(default)]
    pub site_link: Option<String>,

    /// Text of the footer link
    #[serde(default = "default_site_text")]
    pub site_text: String,
}

impl Default for RecoveryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            reference_link: default_reference_link(),
            reference_text: default_reference_text(),
            site_link: None,
            site_text: default_site_text(),
        }
    }
}

/// Per-language settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LanguageProfile {
    /// ISO code, also the output sub-directory
    pub code: String,

    /// Translated site title
    #[serde(default)]
    pub title: String,

    /// Expected length ratio of translation to source
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,

    /// Label for translator notes
    #[serde(default = "default_translator_note")]
    pub translator_note: String,

    /// Translation of the formatting example
    #[serde(default)]
    pub example: String,

    /// Notice shown under a degraded fragment
    #[serde(default = "default_incomplete_notice")]
    pub incomplete_notice: String,

    /// Script written without spaces between words
    #[serde(default)]
    pub unspaced_script: bool,
}

impl LanguageProfile {
    /// Human-readable language name for prompts
    pub fn language_name(&self) -> String {
        language_utils::get_language_name(&self.code).unwrap_or_else(|_| self.code.clone())
    }
}

/// Checkpoint persistence backend
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum CheckpointBackend {
    /// JSON file next to the output
    #[default]
    File,
    /// Embedded SQLite database
    Sqlite,
}

/// Run driver settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RunConfig {
    /// Directory holding the source documents
    #[serde(default = "default_source_dir")]
    pub source_dir: String,

    /// Extension of the documents to translate
    #[serde(default = "default_file_extension")]
    pub file_extension: String,

    /// Documents translated at the same time
    #[serde(default = "default_concurrent_documents")]
    pub concurrent_documents: usize,

    /// Checkpoint persistence backend
    #[serde(default)]
    pub checkpoint_backend: CheckpointBackend,

    /// SQLite database path (defaults to the user data directory)
    #[serde(default)]
    pub database_path: Option<String>,

    /// Stop after this many documents per language
    #[serde(default)]
    pub limit: Option<usize>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source_dir: default_source_dir(),
            file_extension: default_file_extension(),
            concurrent_documents: default_concurrent_documents(),
            checkpoint_backend: CheckpointBackend::default(),
            database_path: None,
            limit: None,
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_source_language() -> String {
    "he".to_string()
}

fn default_target_languages() -> Vec<String> {
    vec!["en".to_string()]
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_anthropic_timeout_secs() -> u64 {
    600
}

fn default_temperature() -> f32 {
    0.3
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_min_tokens() -> u32 {
    1000
}

fn default_max_attempts() -> u32 {
    5
}

fn default_true() -> bool {
    true
}

fn default_anthropic_endpoint() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

fn default_anthropic_model() -> String {
    "claude-3-5-sonnet-latest".to_string()
}

fn default_ollama_model() -> String {
    "llama3.1".to_string()
}

fn default_system_prompt() -> String {
    r#"<task>Translate the provided HTML content into {language}, while preserving all HTML structure</task>
<role>You are an expert literary translator into {language}.
    <readability>Produce natural, fluent text in {language}, avoiding word-for-word translation</readability>
    <untranslatable-terms>For terms unfamiliar to {language} readers, give a concise explanation in square brackets right after the term, within the same HTML tag. If more is needed, use [{translator_note}: explanation] sparingly</untranslatable-terms>
    <website-name>Translate the website name as "{title}"</website-name>
</role>
<output-format>
    <source-only-translation>Translate all and only source-language content to {language}. No source-language letters are allowed in the output</source-only-translation>
    <html-structure>Preserve all HTML structure, including all tags and HTML entities</html-structure>
    <br-tags>Preserve all '<br>' tags exactly. Never use line breaks</br-tags>
    <nbsp-entities>Preserve all '&nbsp;'. Do not convert them to spaces</nbsp-entities>
    <html-format-example>Example output: <div>{example}</div></html-format-example>
</output-format>
<validation>Violating these rules will cause automatic failure of the translation task:
    <html-preservation>Ensure all HTML elements are preserved EXACTLY as in the original. Do not omit ANY of them</html-preservation>
    <no-omissions>Translate all content SEQUENTIALLY without skipping or jumping ahead</no-omissions>
    <no-stops>Only stop answering at the end of the entire original text. NEVER interrupt the translation to ask or update anything</no-stops>
    <no-additions>Output ONLY the translated HTML content. NO meta-text, status updates, questions, or comments</no-additions>
</validation>"#
        .to_string()
}

fn default_reminder() -> String {
    "Re-read <output-format> and <validation> requirements and verify strict compliance. Do not omit ANY content or HTML element, NOR replace <br> with line break. Do not stop mid-translation. NEVER truncate your answer before the end of the entire original text, or end it with ANY comment.".to_string()
}

fn default_chunk_max_size() -> usize {
    12000
}

fn default_chunk_overlap() -> usize {
    600
}

fn default_overlap_parting() -> usize {
    3
}

fn default_separators() -> Vec<String> {
    vec![
        "<br><br>".to_string(),
        "</div>".to_string(),
        ". ".to_string(),
        ", ".to_string(),
        " ".to_string(),
    ]
}

fn default_body_start_marker() -> String {
    r#"<div class="mainheadline">"#.to_string()
}

fn default_end_marker() -> String {
    "</html>".to_string()
}

fn default_stop_marker() -> String {
    "</body>".to_string()
}

fn default_incomplete_marker() -> String {
    "<incomplete-translation>".to_string()
}

fn default_opening_primer() -> String {
    "<body><".to_string()
}

fn default_source_script_ranges() -> Vec<[u32; 2]> {
    // Hebrew block and Hebrew presentation forms
    vec![[0x0590, 0x05FF], [0xFB1D, 0xFB4F]]
}

fn default_leak_cap() -> usize {
    15
}

fn default_repetition_window() -> usize {
    200
}

fn default_repetition_threshold() -> usize {
    20
}

fn default_unspaced_repetition_threshold() -> usize {
    35
}

fn default_reference_link() -> String {
    "/en/{name}.html".to_string()
}

fn default_reference_text() -> String {
    "Read complete version in English".to_string()
}

fn default_site_text() -> String {
    "Our site in multiple languages".to_string()
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_translator_note() -> String {
    "Translator's note".to_string()
}

fn default_incomplete_notice() -> String {
    "The translation of the rest of this page will be available in the future.".to_string()
}

fn default_source_dir() -> String {
    ".".to_string()
}

fn default_file_extension() -> String {
    "html".to_string()
}

fn default_concurrent_documents() -> usize {
    2
}

fn default_language_profiles() -> Vec<LanguageProfile> {
    vec![
        LanguageProfile {
            code: "en".to_string(),
            title: "Degeneration of Nation".to_string(),
            multiplier: 1.0,
            translator_note: "Translator's note".to_string(),
            example: "Hello&nbsp;world<br><b>Title</b>".to_string(),
            incomplete_notice: default_incomplete_notice(),
            unspaced_script: false,
        },
        LanguageProfile {
            code: "fr".to_string(),
            title: "Dégénérescence de la Nation".to_string(),
            multiplier: 1.2,
            translator_note: "Note du traducteur".to_string(),
            example: "Bonjour&nbsp;le monde<br><b>Titre</b>".to_string(),
            incomplete_notice: "La traduction du reste de cette page sera disponible prochainement.".to_string(),
            unspaced_script: false,
        },
        LanguageProfile {
            code: "ja".to_string(),
            title: "国家の退化".to_string(),
            multiplier: 0.6,
            translator_note: "訳注".to_string(),
            example: "こんにちは&nbsp;世界<br><b>タイトル</b>".to_string(),
            incomplete_notice: "このページの残りの翻訳は近日公開予定です。".to_string(),
            unspaced_script: true,
        },
    ]
}

impl Config {
    /// Load a configuration file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open config file: {:?}", path))?;
        let reader = BufReader::new(file);
        serde_json::from_reader(reader)
            .with_context(|| format!("Failed to parse config file: {:?}", path))
    }

    /// Write the configuration as pretty JSON
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .context("Failed to serialize config to JSON")?;
        std::fs::write(path.as_ref(), json)
            .with_context(|| format!("Failed to write config to file: {:?}", path.as_ref()))
    }

    /// Profile of a target language, matching ISO 639-1 and 639-2 codes
    pub fn language_profile(&self, code: &str) -> Option<&LanguageProfile> {
        self.languages
            .iter()
            .find(|p| p.code.eq_ignore_ascii_case(code))
            .or_else(|| {
                self.languages
                    .iter()
                    .find(|p| language_utils::language_codes_match(&p.code, code))
            })
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        language_utils::get_language_name(&self.source_language)
            .context("Invalid source language")?;

        if self.target_languages.is_empty() {
            return Err(anyhow!("At least one target language is required"));
        }
        for code in &self.target_languages {
            language_utils::get_language_name(code)
                .with_context(|| format!("Invalid target language: {}", code))?;
            if self.language_profile(code).is_none() {
                return Err(anyhow!("No language profile configured for target language: {}", code));
            }
        }

        if self.translation.provider == TranslationProvider::Anthropic
            && self.translation.get_api_key().is_empty()
        {
            return Err(anyhow!("Translation API key is required for Anthropic provider"));
        }

        let common = &self.translation.common;
        if common.max_attempts == 0 {
            return Err(anyhow!("max_attempts must be at least 1"));
        }
        if common.min_tokens > common.max_tokens {
            return Err(anyhow!(
                "min_tokens ({}) cannot exceed max_tokens ({})",
                common.min_tokens,
                common.max_tokens
            ));
        }

        let chunking = &self.chunking;
        if chunking.chunk_max_size == 0 {
            return Err(anyhow!("chunk_max_size must be positive"));
        }
        if chunking.overlap_parting == 0 {
            return Err(anyhow!("overlap_parting must be at least 1"));
        }
        if chunking.chunk_overlap >= chunking.chunk_max_size {
            return Err(anyhow!("chunk_overlap must be smaller than chunk_max_size"));
        }

        let document = &self.document;
        if document.body_start_marker.is_empty() || document.end_marker.is_empty() {
            return Err(anyhow!("Document boundary markers cannot be empty"));
        }
        if document.incomplete_marker.is_empty() {
            return Err(anyhow!("Incomplete translation marker cannot be empty"));
        }

        if self.run.concurrent_documents == 0 {
            return Err(anyhow!("concurrent_documents must be at least 1"));
        }

        Ok(())
    }
}

/// Default implementation for Config
impl Default for Config {
    fn default() -> Self {
        Config {
            source_language: default_source_language(),
            target_languages: default_target_languages(),
            translation: TranslationConfig::default(),
            chunking: ChunkingConfig::default(),
            document: DocumentConfig::default(),
            validation: ValidationConfig::default(),
            recovery: RecoveryConfig::default(),
            languages: default_language_profiles(),
            run: RunConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl TranslationConfig {
    /// Get the active provider configuration from the available_providers array
    pub fn get_active_provider_config(&self) -> Option<&ProviderConfig> {
        let provider_str = self.provider.to_lowercase_string();
        self.available_providers.iter()
            .find(|p| p.provider_type == provider_str)
    }

    /// Mutable access to the active provider configuration, created on demand
    pub fn active_provider_config_mut(&mut self) -> &mut ProviderConfig {
        let provider_str = self.provider.to_lowercase_string();
        let index = match self.available_providers.iter().position(|p| p.provider_type == provider_str) {
            Some(index) => index,
            None => {
                self.available_providers.push(ProviderConfig::new(self.provider.clone()));
                self.available_providers.len() - 1
            }
        };
        &mut self.available_providers[index]
    }

    /// Get the model for the active provider
    pub fn get_model(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.model.is_empty() {
                return provider_config.model.clone();
            }
        }

        match self.provider {
            TranslationProvider::Anthropic => default_anthropic_model(),
            TranslationProvider::Ollama => default_ollama_model(),
        }
    }

    /// Get the API key for the active provider
    pub fn get_api_key(&self) -> String {
        self.get_active_provider_config()
            .map(|p| p.api_key.clone())
            .unwrap_or_default()
    }

    /// Get the endpoint for the active provider
    pub fn get_endpoint(&self) -> String {
        if let Some(provider_config) = self.get_active_provider_config() {
            if !provider_config.endpoint.is_empty() {
                return provider_config.endpoint.clone();
            }
        }

        match self.provider {
            TranslationProvider::Anthropic => default_anthropic_endpoint(),
            TranslationProvider::Ollama => default_ollama_endpoint(),
        }
    }

    /// Get the request timeout for the active provider
    pub fn get_timeout_secs(&self) -> u64 {
        self.get_active_provider_config()
            .map(|p| p.timeout_secs)
            .unwrap_or_else(default_timeout_secs)
    }

    /// Get the extra headers for the active provider
    pub fn get_headers(&self) -> BTreeMap<String, String> {
        self.get_active_provider_config()
            .map(|p| p.headers.clone())
            .unwrap_or_default()
    }
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            provider: TranslationProvider::default(),
            available_providers: vec![
                ProviderConfig::new(TranslationProvider::Anthropic),
                ProviderConfig::new(TranslationProvider::Ollama),
            ],
            common: TranslationCommonConfig::default(),
        }
    }
}
