/*!
 * Checkpoint resumption tests: an interrupted document must finish exactly
 * as if it had never been interrupted
 */

use anyhow::Result;
use std::sync::Arc;

use crate::common;
use yahtwai::database::CheckpointDatabase;
use yahtwai::errors::{ProviderError, TranslationError};
use yahtwai::providers::mock::ScriptedProvider;
use yahtwai::run_context::RunContext;
use yahtwai::session::{CheckpointStore, DocumentPaths, FileCheckpointStore, SqliteCheckpointStore};
use yahtwai::structure::{normalize_whitespace, simplify_tags};
use yahtwai::translation::{Chunk, DocumentPipeline, split_document, split_into_chunks};
use yahtwai::Config;

fn sample_chunks(config: &Config) -> Vec<Chunk> {
    let parts = split_document(&common::sample_document(), &config.document).unwrap();
    let flattened = normalize_whitespace(&simplify_tags(&parts.body));
    split_into_chunks(&flattened, config.chunking.chunk_max_size, &config.chunking.separators)
}

/// Replies of an uninterrupted two-chunk run
fn uninterrupted_replies(config: &Config, chunks: &[Chunk]) -> (String, String) {
    (
        common::chunk_answer(&chunks[0].text, config, true, false),
        common::chunk_answer(&chunks[1].text, config, false, true),
    )
}

fn pipeline(config: &Config, paths: &DocumentPaths, store: Arc<dyn CheckpointStore>, provider: &ScriptedProvider) -> DocumentPipeline {
    let profile = config.language_profile("en").cloned().unwrap();
    let ctx = RunContext::new(config.clone(), Arc::new(provider.clone()));
    DocumentPipeline::new(ctx, profile, paths.clone(), store)
}

#[tokio::test]
async fn test_resume_afterFatalErrorMidChunk_shouldMatchUninterruptedRun() -> Result<()> {
    let config = common::two_chunk_config();
    let chunks = sample_chunks(&config);
    let (first, second) = uninterrupted_replies(&config, &chunks);

    // Reference run
    let reference_dir = common::create_temp_dir()?;
    let reference = common::pipeline_fixture(
        reference_dir.path(),
        config.clone(),
        vec![ScriptedProvider::reply(&first), ScriptedProvider::stop(&second)],
    );
    let expected = reference.pipeline.translate(&common::sample_document()).await?;
    assert!(expected.complete);

    // Interrupted run: the second chunk stops inside a tag, then the quota runs out
    let dir = common::create_temp_dir()?;
    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    let store: Arc<dyn CheckpointStore> = Arc::new(FileCheckpointStore::new(&paths.checkpoint));
    let cut = second.find("Line 6").unwrap() - 1;
    let (part_a, part_b) = second.split_at(cut);
    assert!(part_a.ends_with("<p"));

    let interrupted = ScriptedProvider::new(vec![
        ScriptedProvider::reply(&first),
        ScriptedProvider::reply(part_a),
        ScriptedProvider::error(ProviderError::RateLimitExceeded("quota exceeded".to_string())),
    ]);
    let result = pipeline(&config, &paths, store.clone(), &interrupted)
        .translate(&common::sample_document())
        .await;
    assert!(matches!(result, Err(TranslationError::GeneratorFatal(_))));

    let checkpoint = store.load().await?.unwrap();
    assert_eq!(checkpoint.leftover, "<p");
    assert_eq!(checkpoint.completed_chunks.len(), 2);
    assert!(!checkpoint.last_chunk_complete);

    // Fresh pipeline, same side files
    let resumed = ScriptedProvider::new(vec![ScriptedProvider::stop(part_b)]);
    let document = pipeline(&config, &paths, store.clone(), &resumed)
        .translate(&common::sample_document())
        .await?;

    assert!(document.complete);
    assert_eq!(document.content, expected.content);
    assert_eq!(document.content, common::expected_translation());
    assert_eq!(resumed.request_count(), 1);

    // The resumed request continues from the saved translation
    let request = &resumed.requests()[0];
    assert!(request.turns[1].content.ends_with("Line 5</p><p"));
    Ok(())
}

#[tokio::test]
async fn test_resume_withCompletedFirstChunk_shouldNotRequestItAgain() -> Result<()> {
    let config = common::two_chunk_config();
    let chunks = sample_chunks(&config);
    let (first, second) = uninterrupted_replies(&config, &chunks);

    let dir = common::create_temp_dir()?;
    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    let store: Arc<dyn CheckpointStore> = Arc::new(FileCheckpointStore::new(&paths.checkpoint));

    let interrupted = ScriptedProvider::new(vec![
        ScriptedProvider::reply(&first),
        ScriptedProvider::error(ProviderError::InvalidRequest("credit balance too low".to_string())),
    ]);
    assert!(pipeline(&config, &paths, store.clone(), &interrupted)
        .translate(&common::sample_document())
        .await
        .is_err());

    let resumed = ScriptedProvider::new(vec![ScriptedProvider::stop(&second)]);
    let document = pipeline(&config, &paths, store, &resumed)
        .translate(&common::sample_document())
        .await?;

    assert_eq!(document.content, common::expected_translation());
    assert_eq!(resumed.request_count(), 1);
    assert!(resumed.requests()[0].system_instructions.contains("שורה 4"));
    Ok(())
}

#[tokio::test]
async fn test_resume_withChangedSource_shouldStartOver() -> Result<()> {
    let config = common::test_config();
    let dir = common::create_temp_dir()?;
    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    let store: Arc<dyn CheckpointStore> = Arc::new(FileCheckpointStore::new(&paths.checkpoint));

    std::fs::create_dir_all(dir.path().join("en"))?;
    let stale = yahtwai::session::Checkpoint::new("0000");
    store.save(&stale).await?;

    let provider = ScriptedProvider::new(vec![common::single_chunk_reply(&config)]);
    let document = pipeline(&config, &paths, store.clone(), &provider)
        .translate(&common::sample_document())
        .await?;

    assert_eq!(document.content, common::expected_translation());
    let checkpoint = store.load().await?.unwrap();
    assert_ne!(checkpoint.source_hash, "0000");
    assert!(checkpoint.last_chunk_complete);
    Ok(())
}

#[tokio::test]
async fn test_resume_withSqliteStore_shouldMatchUninterruptedRun() -> Result<()> {
    let config = common::two_chunk_config();
    let chunks = sample_chunks(&config);
    let (first, second) = uninterrupted_replies(&config, &chunks);

    let dir = common::create_temp_dir()?;
    let db = CheckpointDatabase::open(dir.path().join("checkpoints.db"))?;
    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    let store: Arc<dyn CheckpointStore> = Arc::new(SqliteCheckpointStore::new(db.clone(), paths.key()));

    let interrupted = ScriptedProvider::new(vec![
        ScriptedProvider::reply(&first),
        ScriptedProvider::error(ProviderError::AuthenticationError("revoked".to_string())),
    ]);
    assert!(pipeline(&config, &paths, store.clone(), &interrupted)
        .translate(&common::sample_document())
        .await
        .is_err());
    assert_eq!(db.checkpoint_count()?, 1);

    let resumed = ScriptedProvider::new(vec![ScriptedProvider::stop(&second)]);
    let document = pipeline(&config, &paths, store, &resumed)
        .translate(&common::sample_document())
        .await?;

    assert!(document.complete);
    assert_eq!(document.content, common::expected_translation());
    Ok(())
}
