/*!
 * Common test utilities for the yahtwai test suite
 */

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

use yahtwai::app_config::Config;
use yahtwai::providers::mock::{ScriptedProvider, ScriptedReply};
use yahtwai::run_context::RunContext;
use yahtwai::session::{DocumentPaths, FileCheckpointStore};
use yahtwai::translation::DocumentPipeline;

/// Everything before the body-start marker of the sample document
pub const SAMPLE_HEADER: &str = "<html>\n<head><meta charset=\"utf-8\"><title>ניוון האומה</title></head>\n<body>\n";

/// The sample header once the page is retitled after its English headline
pub const TRANSLATED_HEADER: &str =
    "<html>\n<head><meta charset=\"utf-8\"><title>Title - Degeneration of Nation</title></head>\n<body>\n";

/// Number of paragraphs in the sample document
pub const SAMPLE_PARAGRAPHS: usize = 8;

/// Hebrew words of the sample document and their English translation
const GLOSSARY: &[(&str, &str)] = &[("כותרת", "Title"), ("שורה", "Line")];

/// Creates a temporary directory for test files
pub fn create_temp_dir() -> Result<TempDir> {
    Ok(TempDir::new()?)
}

/// Creates a test file with the given content in the specified directory
pub fn create_test_file(dir: &Path, filename: &str, content: &str) -> Result<PathBuf> {
    let file_path = dir.join(filename);
    fs::write(&file_path, content)?;
    Ok(file_path)
}

/// Translatable part of the sample document, from the headline to `</body>`
pub fn sample_body() -> String {
    let paragraphs: String = (1..=SAMPLE_PARAGRAPHS)
        .map(|i| format!("<p style=\"margin:0\">שורה {}</p>", i))
        .collect();
    format!("<div class=\"mainheadline\">כותרת</div>{}</body>", paragraphs)
}

/// A complete source document
pub fn sample_document() -> String {
    format!("{}{}</html>", SAMPLE_HEADER, sample_body())
}

/// Creates the sample document in the specified directory
pub fn create_test_document(dir: &Path, filename: &str) -> Result<PathBuf> {
    create_test_file(dir, filename, &sample_document())
}

/// Replace every glossary word with its translation
pub fn translate_words(text: &str) -> String {
    GLOSSARY
        .iter()
        .fold(text.to_string(), |acc, (hebrew, english)| acc.replace(hebrew, english))
}

/// The document a perfect translation run produces
pub fn expected_translation() -> String {
    format!("{}{}</html>", TRANSLATED_HEADER, translate_words(&sample_body()))
}

/// Configuration used by the integration tests: no delay between requests
pub fn test_config() -> Config {
    let mut config = Config::default();
    config.translation.common.rate_limit_delay_ms = 0;
    config.run.concurrent_documents = 1;
    config
}

/// Configuration splitting the sample document into two chunks at a paragraph end
pub fn two_chunk_config() -> Config {
    let mut config = test_config();
    config.chunking.chunk_max_size = 80;
    config.chunking.separators = vec!["</p>".to_string()];
    config
}

/// Generator answer for a chunk: the primer is stripped from the first one,
/// the stop marker from the last one
pub fn chunk_answer(chunk_text: &str, config: &Config, first: bool, last: bool) -> String {
    let mut answer = translate_words(chunk_text);
    if first {
        if let Some(rest) = answer.strip_prefix(&config.document.opening_primer) {
            answer = rest.to_string();
        }
    }
    if last {
        if let Some(rest) = answer.strip_suffix(&config.document.stop_marker) {
            answer = rest.to_string();
        }
    }
    answer
}

/// Reply of a whole-document, single-chunk translation
pub fn single_chunk_reply(config: &Config) -> ScriptedReply {
    let flattened = yahtwai::structure::normalize_whitespace(&yahtwai::structure::simplify_tags(
        &format!("<body>{}", sample_body()),
    ));
    ScriptedProvider::stop(&chunk_answer(&flattened, config, true, true))
}

/// A pipeline over a file checkpoint store, writing its side files in `dir`
pub struct PipelineFixture {
    pub ctx: RunContext,
    pub provider: ScriptedProvider,
    pub paths: DocumentPaths,
    pub pipeline: DocumentPipeline,
}

/// Route library logs to the test output, once per test binary
pub fn init_test_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Build a pipeline for `<dir>/en/page.html` answering with `replies`
pub fn pipeline_fixture(dir: &Path, config: Config, replies: Vec<ScriptedReply>) -> PipelineFixture {
    init_test_logging();
    let provider = ScriptedProvider::new(replies);
    let paths = DocumentPaths::for_output(dir.join("en").join("page.html"));
    let profile = config
        .language_profile("en")
        .cloned()
        .expect("default config has an English profile");
    let ctx = RunContext::new(config, Arc::new(provider.clone()));
    let store = Arc::new(FileCheckpointStore::new(&paths.checkpoint));
    let pipeline = DocumentPipeline::new(ctx.clone(), profile, paths.clone(), store);

    PipelineFixture {
        ctx,
        provider,
        paths,
        pipeline,
    }
}
