/*!
 * Integration tests for application lifecycle: directory runs through the
 * controller with a scripted provider
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;

use crate::common;
use yahtwai::app_config::CheckpointBackend;
use yahtwai::app_controller::Controller;
use yahtwai::errors::ProviderError;
use yahtwai::providers::mock::ScriptedProvider;
use yahtwai::session::DocumentPaths;
use yahtwai::Config;

fn site_config(dir: &std::path::Path) -> Config {
    let mut config = common::test_config();
    config.run.source_dir = dir.to_string_lossy().to_string();
    config
}

#[tokio::test]
async fn test_run_withOneDocument_shouldWriteTranslationAndCleanUp() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "page.html")?;
    let config = site_config(dir.path());
    let provider = ScriptedProvider::new(vec![common::single_chunk_reply(&config)]);

    let controller = Controller::with_provider(config, Arc::new(provider.clone()))?;
    let summary = controller.run(false).await?;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.complete, 1);
    assert_eq!(summary.errors, 0);

    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    assert_eq!(fs::read_to_string(&paths.output)?, common::expected_translation());
    assert!(!paths.checkpoint.exists());
    assert!(!paths.checkpoint_old.exists());
    assert!(!paths.partial.exists());
    assert!(paths.exchange_log.exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingTranslation_shouldSkipUnlessForced() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "page.html")?;
    let config = site_config(dir.path());
    let provider = ScriptedProvider::new(vec![
        common::single_chunk_reply(&config),
        common::single_chunk_reply(&config),
    ]);
    let controller = Controller::with_provider(config, Arc::new(provider.clone()))?;

    controller.run(false).await?;
    let second = controller.run(false).await?;
    assert_eq!(second.skipped, 1);
    assert_eq!(second.processed, 0);
    assert_eq!(provider.request_count(), 1);

    let forced = controller.run(true).await?;
    assert_eq!(forced.complete, 1);
    assert_eq!(provider.request_count(), 2);
    Ok(())
}

#[tokio::test]
async fn test_run_withPartialOutputLeft_shouldTranslateAgain() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "page.html")?;
    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    fs::create_dir_all(dir.path().join("en"))?;
    fs::write(&paths.output, "<html>old</html>")?;
    fs::write(&paths.partial, "div>Title")?;

    assert!(!Controller::is_translated(&paths));

    let config = site_config(dir.path());
    let provider = ScriptedProvider::new(vec![common::single_chunk_reply(&config)]);
    let controller = Controller::with_provider(config, Arc::new(provider))?;
    let summary = controller.run(false).await?;

    assert_eq!(summary.complete, 1);
    assert_eq!(fs::read_to_string(&paths.output)?, common::expected_translation());
    assert!(Controller::is_translated(&paths));
    Ok(())
}

#[tokio::test]
async fn test_run_withFatalError_shouldStopWithoutOutput() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "a.html")?;
    common::create_test_document(dir.path(), "b.html")?;
    let config = site_config(dir.path());
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::error(ProviderError::RateLimitExceeded("quota".to_string())),
        common::single_chunk_reply(&config),
    ]);

    let controller = Controller::with_provider(config, Arc::new(provider.clone()))?;
    let result = controller.run(false).await;

    assert!(result.is_err());
    assert!(controller.context().is_cancelled());
    assert_eq!(provider.request_count(), 1);
    assert!(!dir.path().join("en").join("a.html").exists());
    assert!(!dir.path().join("en").join("b.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withStalledDocument_shouldWriteIncompleteAndKeepSideFiles() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "page.html")?;
    let config = site_config(dir.path());
    let provider = ScriptedProvider::new(vec![
        ScriptedProvider::reply("div>Title</div><p>Line 1</p><p>Line 2</p><p"),
        ScriptedProvider::reply("Line 3 שורה</p>"),
        ScriptedProvider::reply("Line 3 שורה</p>"),
    ]);

    let controller = Controller::with_provider(config, Arc::new(provider))?;
    let summary = controller.run(false).await?;

    assert_eq!(summary.incomplete, 1);
    assert_eq!(summary.errors, 1);
    let paths = DocumentPaths::for_output(dir.path().join("en").join("page.html"));
    let content = fs::read_to_string(&paths.output)?;
    assert!(content.contains("Line 2</p><incomplete-translation>"));
    assert!(paths.checkpoint.exists());
    assert!(paths.partial.exists());
    assert!(!Controller::is_translated(&paths));
    Ok(())
}

#[tokio::test]
async fn test_run_withLimit_shouldTranslateFirstDocumentsOnly() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "chapter-2.html")?;
    common::create_test_document(dir.path(), "preface.html")?;
    let mut config = site_config(dir.path());
    config.run.limit = Some(1);
    let provider = ScriptedProvider::new(vec![common::single_chunk_reply(&config)]);

    let controller = Controller::with_provider(config, Arc::new(provider))?;
    let summary = controller.run(false).await?;

    assert_eq!(summary.processed, 1);
    // Names without digits come first
    assert!(dir.path().join("en").join("preface.html").exists());
    assert!(!dir.path().join("en").join("chapter-2.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withSqliteBackend_shouldClearCheckpointOnSuccess() -> Result<()> {
    let dir = common::create_temp_dir()?;
    common::create_test_document(dir.path(), "page.html")?;
    let mut config = site_config(dir.path());
    config.run.checkpoint_backend = CheckpointBackend::Sqlite;
    config.run.database_path = Some(dir.path().join("yahtwai.db").to_string_lossy().to_string());
    let provider = ScriptedProvider::new(vec![common::single_chunk_reply(&config)]);

    let controller = Controller::with_provider(config, Arc::new(provider))?;
    let summary = controller.run(false).await?;

    assert_eq!(summary.complete, 1);
    assert!(dir.path().join("yahtwai.db").exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("en").join("page.html"))?,
        common::expected_translation()
    );
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptyDirectory_shouldReturnEmptySummary() -> Result<()> {
    let dir = common::create_temp_dir()?;
    let config = site_config(dir.path());
    let controller = Controller::with_provider(config, Arc::new(ScriptedProvider::new(vec![])))?;

    let summary = controller.run(false).await?;
    assert_eq!(summary.processed, 0);
    assert_eq!(summary.skipped, 0);
    Ok(())
}

#[test]
fn test_checkProvider_withMockProvider_shouldSucceed() -> Result<()> {
    let controller = Controller::with_provider(Config::default(), Arc::new(ScriptedProvider::new(vec![])))?;
    tokio_test::block_on(async { controller.check_provider().await })
}
