/*!
 * End-to-end tests of the document pipeline with a scripted generator
 */

use anyhow::Result;

use crate::common;
use yahtwai::errors::{ProviderError, TranslationError};
use yahtwai::providers::mock::ScriptedProvider;
use yahtwai::structure::{normalize_whitespace, simplify_tags};
use yahtwai::translation::{Chunk, split_document, split_into_chunks};
use yahtwai::Config;

/// Chunks the pipeline derives from the sample document
fn sample_chunks(config: &Config) -> Vec<Chunk> {
    let parts = split_document(&common::sample_document(), &config.document).unwrap();
    let flattened = normalize_whitespace(&simplify_tags(&parts.body));
    split_into_chunks(&flattened, config.chunking.chunk_max_size, &config.chunking.separators)
}

#[tokio::test]
async fn test_translate_withSingleChunk_shouldRebuildDocument() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config();
    let reply = common::single_chunk_reply(&config);
    let f = common::pipeline_fixture(dir.path(), config, vec![reply]);

    let document = f.pipeline.translate(&common::sample_document()).await?;

    assert!(document.complete);
    assert_eq!(document.content, common::expected_translation());
    assert_eq!(f.provider.request_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_translate_withTwoChunksAndMismatch_shouldRetryAndRebuild() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::two_chunk_config();
    let chunks = sample_chunks(&config);
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].text.ends_with("<p>"));

    let first = common::chunk_answer(&chunks[0].text, &config, true, false);
    let second = common::chunk_answer(&chunks[1].text, &config, false, true);
    let drifted = second.replacen("</p>", "</b>", 1);

    let f = common::pipeline_fixture(
        dir.path(),
        config,
        vec![
            ScriptedProvider::reply(&first),
            ScriptedProvider::stop(&drifted),
            ScriptedProvider::stop(&second),
        ],
    );

    let document = f.pipeline.translate(&common::sample_document()).await?;

    assert!(document.complete);
    assert_eq!(document.content, common::expected_translation());

    let requests = f.provider.requests();
    assert_eq!(requests.len(), 3);
    assert!(!requests[1].cache_hint);
    assert!(requests[2].cache_hint);
    assert_eq!(requests[2].max_tokens, 1000);
    assert!(requests[2].turns[0].content.contains("Instead of </p> there was </b>"));
    assert_eq!(requests[0].turns[1].content, "<body><");
    Ok(())
}

#[tokio::test]
async fn test_translate_withSecondChunk_shouldCarryContext() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let mut config = common::two_chunk_config();
    config.chunking.chunk_overlap = 30;
    let chunks = sample_chunks(&config);
    let f = common::pipeline_fixture(
        dir.path(),
        config.clone(),
        vec![
            ScriptedProvider::reply(&common::chunk_answer(&chunks[0].text, &config, true, false)),
            ScriptedProvider::stop(&common::chunk_answer(&chunks[1].text, &config, false, true)),
        ],
    );

    f.pipeline.translate(&common::sample_document()).await?;

    let requests = f.provider.requests();
    // The second chunk continues the first one's translation
    assert!(requests[1].turns[1].content.ends_with("<p>"));
    assert!(requests[1].turns[0].content.starts_with("About "));
    assert!(requests[1].system_instructions.contains(":\n...><p>שורה 2</p>"));
    assert!(requests[1].system_instructions.contains("שורה 4"));
    assert!(!requests[1].system_instructions.contains("שורה 1<"));
    Ok(())
}

#[tokio::test]
async fn test_translate_withFatalError_shouldCancelAndKeepCheckpoint() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::two_chunk_config();
    let chunks = sample_chunks(&config);
    let f = common::pipeline_fixture(
        dir.path(),
        config.clone(),
        vec![
            ScriptedProvider::reply(&common::chunk_answer(&chunks[0].text, &config, true, false)),
            ScriptedProvider::error(ProviderError::AuthenticationError("invalid x-api-key".to_string())),
        ],
    );

    let result = f.pipeline.translate(&common::sample_document()).await;

    assert!(matches!(result, Err(TranslationError::GeneratorFatal(_))));
    assert!(f.ctx.is_cancelled());
    assert!(f.paths.checkpoint.exists());
    assert!(f.paths.partial.exists());
    assert!(!f.paths.output.exists());
    Ok(())
}

#[tokio::test]
async fn test_translate_whenCancelled_shouldNotCallGenerator() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::test_config();
    let reply = common::single_chunk_reply(&config);
    let f = common::pipeline_fixture(dir.path(), config, vec![reply]);

    f.ctx.cancel("test");
    let result = f.pipeline.translate(&common::sample_document()).await;

    assert!(matches!(result, Err(TranslationError::Cancelled)));
    assert_eq!(f.provider.request_count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_translate_withPersistentLeak_shouldEndWithIncompleteFragment() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = common::two_chunk_config();
    let chunks = sample_chunks(&config);
    let f = common::pipeline_fixture(
        dir.path(),
        config.clone(),
        vec![
            ScriptedProvider::reply(&common::chunk_answer(&chunks[0].text, &config, true, false)),
            ScriptedProvider::reply("Line 4</p><p>Line 5</p><p"),
            ScriptedProvider::reply("Line 6 שורה</p>"),
            ScriptedProvider::reply("Line 6 שורה</p>"),
        ],
    );

    let document = f.pipeline.translate(&common::sample_document()).await?;

    assert!(!document.complete);
    assert!(document.content.starts_with(common::TRANSLATED_HEADER));
    assert!(document.content.contains("<div class=\"mainheadline\">Title</div>"));
    assert!(document.content.contains("<p style=\"margin:0\">Line 5</p><incomplete-translation></incomplete-translation>"));
    assert!(document.content.contains("will be available in the future"));
    assert!(document.content.contains("/en/page.html"));
    assert!(!document.content.contains("Line 6"));
    Ok(())
}

#[tokio::test]
async fn test_translate_withoutBoundaryMarker_shouldFailBeforeRequests() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let f = common::pipeline_fixture(dir.path(), common::test_config(), vec![]);

    let result = f.pipeline.translate("<html><body><p>שלום</p></body></html>").await;

    assert!(matches!(result, Err(TranslationError::MissingBoundary(_))));
    assert_eq!(f.provider.request_count(), 0);
    Ok(())
}
