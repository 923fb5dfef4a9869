use anyhow::{Context, Result, anyhow};
use futures::stream::{self, StreamExt};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::{CheckpointBackend, Config, LanguageProfile};
use crate::database::CheckpointDatabase;
use crate::errors::TranslationError;
use crate::file_utils::FileManager;
use crate::providers::{Provider, create_provider};
use crate::run_context::RunContext;
use crate::session::{DocumentPaths, open_checkpoint_store};
use crate::translation::DocumentPipeline;

// @module: Run driver translating a directory of documents into every target language

/// Minimum number of failed documents tolerated before a run is aborted
const MIN_ERROR_ALLOWANCE: usize = 4;

/// One in this many processed documents may fail before a run is aborted
const ERROR_RATIO: usize = 8;

/// What happened to one (document, language) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentStatus {
    /// Fully translated, side files removed
    Complete,
    /// Written with a degraded ending, side files kept for resumption
    Incomplete,
}

/// Counters of a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Documents attempted
    pub processed: usize,
    /// Documents fully translated
    pub complete: usize,
    /// Documents written with a degraded ending
    pub incomplete: usize,
    /// Documents skipped because their translation exists
    pub skipped: usize,
    /// Failed or incomplete documents
    pub errors: usize,
}

/// One unit of work: a source document and a target language
#[derive(Debug, Clone)]
struct Job {
    source: PathBuf,
    profile: LanguageProfile,
    paths: DocumentPaths,
}

/// Main application controller for document translation
pub struct Controller {
    // @field: Shared run context
    ctx: RunContext,
    // @field: Checkpoint database when the SQLite backend is selected
    db: Option<CheckpointDatabase>,
}

impl Controller {
    // @method: Create a controller with the configured provider
    pub fn with_config(config: Config) -> Result<Self> {
        let provider = create_provider(&config.translation);
        Self::with_provider(config, provider)
    }

    // @method: Create a controller with an explicit provider
    pub fn with_provider(config: Config, provider: Arc<dyn Provider>) -> Result<Self> {
        let db = match config.run.checkpoint_backend {
            CheckpointBackend::File => None,
            CheckpointBackend::Sqlite => Some(match &config.run.database_path {
                Some(path) => CheckpointDatabase::open(path)?,
                None => CheckpointDatabase::open_default()?,
            }),
        };

        Ok(Self {
            ctx: RunContext::new(config, provider),
            db,
        })
    }

    /// The run context shared with every worker
    pub fn context(&self) -> &RunContext {
        &self.ctx
    }

    /// Check that the configured provider answers
    pub async fn check_provider(&self) -> Result<()> {
        self.ctx
            .provider
            .test_connection()
            .await
            .with_context(|| {
                format!(
                    "Provider {} is not reachable",
                    self.ctx.config.translation.provider.display_name()
                )
            })?;
        info!(
            "Provider {} ({}) is reachable",
            self.ctx.config.translation.provider.display_name(),
            self.ctx.config.translation.get_model()
        );
        Ok(())
    }

    /// Output path of a source document for a language
    pub fn output_path(source_dir: &Path, language: &str, source: &Path) -> PathBuf {
        let file_name = source.file_name().map(PathBuf::from).unwrap_or_default();
        source_dir.join(language).join(file_name)
    }

    /// A translation exists when its output is non-empty and no partial output is left
    pub fn is_translated(paths: &DocumentPaths) -> bool {
        FileManager::file_size(&paths.output) > 0 && !FileManager::file_exists(&paths.partial)
    }

    /// Number of failed documents that aborts a run
    pub fn error_threshold(processed: usize) -> usize {
        (processed / ERROR_RATIO).max(MIN_ERROR_ALLOWANCE)
    }

    /// Run the translation of every document of the source directory into every target language
    pub async fn run(&self, force_overwrite: bool) -> Result<RunSummary> {
        let start_time = Instant::now();
        let config = &self.ctx.config;
        let source_dir = PathBuf::from(&config.run.source_dir);

        if !FileManager::dir_exists(&source_dir) {
            return Err(anyhow!("Source directory does not exist: {:?}", source_dir));
        }

        let documents = FileManager::order_documents(
            FileManager::find_files(&source_dir, &config.run.file_extension)?,
        );
        if documents.is_empty() {
            warn!("No .{} documents found in {:?}", config.run.file_extension, source_dir);
            return Ok(RunSummary::default());
        }

        let mut summary = RunSummary::default();
        let jobs = self.plan_jobs(&source_dir, &documents, force_overwrite, &mut summary)?;

        info!(
            "{}: {} - {} documents, {} to translate, {} already translated",
            config.translation.provider.display_name(),
            config.translation.get_model(),
            documents.len(),
            jobs.len(),
            summary.skipped
        );
        if jobs.is_empty() {
            return Ok(summary);
        }

        let multi_progress = MultiProgress::new();
        let progress_bar = multi_progress.add(ProgressBar::new(jobs.len() as u64));
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        progress_bar.set_style(style.progress_chars("█▓▒░"));
        progress_bar.set_message("Translating");

        let concurrency = config.run.concurrent_documents.max(1);
        let mut results = stream::iter(jobs.into_iter().map(|job| async move {
            let result = self.translate_document(&job).await;
            (job, result)
        }))
        .buffer_unordered(concurrency);

        let mut failure: Option<anyhow::Error> = None;
        while let Some((job, result)) = results.next().await {
            summary.processed += 1;
            progress_bar.inc(1);
            let name = format!("{}/{}", job.profile.code, job.paths.name());

            match result {
                Ok(DocumentStatus::Complete) => {
                    summary.complete += 1;
                    progress_bar.set_message(format!("Done: {}", name));
                }
                Ok(DocumentStatus::Incomplete) => {
                    summary.incomplete += 1;
                    summary.errors += 1;
                    error!("Incomplete translation written for {}", name);
                }
                Err(e) if e.is_fatal() => {
                    error!("!Stop! {}: {}", name, e);
                    self.ctx.cancel(&e.to_string());
                    failure = Some(anyhow!("Run stopped while translating {}: {}", name, e));
                    break;
                }
                Err(e) => {
                    summary.errors += 1;
                    error!("Error translating {}: {}", name, e);
                }
            }

            if summary.errors > Self::error_threshold(summary.processed) {
                self.ctx.cancel("too many failed documents");
                failure = Some(anyhow!(
                    "Too many errors: {} of {} documents failed",
                    summary.errors,
                    summary.processed
                ));
                break;
            }
        }
        drop(results);

        progress_bar.finish_and_clear();
        info!(
            "Run completed in {}: {} processed, {} complete, {} incomplete, {} skipped, {} errors",
            Self::format_duration(start_time.elapsed()),
            summary.processed,
            summary.complete,
            summary.incomplete,
            summary.skipped,
            summary.errors
        );

        match failure {
            Some(e) => Err(e),
            None => Ok(summary),
        }
    }

    /// Pair every document with every target language, skipping finished translations
    fn plan_jobs(
        &self,
        source_dir: &Path,
        documents: &[PathBuf],
        force_overwrite: bool,
        summary: &mut RunSummary,
    ) -> Result<Vec<Job>> {
        let config = &self.ctx.config;
        let mut jobs = Vec::new();

        for language in &config.target_languages {
            let profile = config
                .language_profile(language)
                .cloned()
                .ok_or_else(|| anyhow!("No language profile for {}", language))?;
            let mut planned = 0;

            for source in documents {
                if config.run.limit.is_some_and(|limit| planned >= limit) {
                    debug!("Document limit reached for {}", language);
                    break;
                }

                let paths = DocumentPaths::for_output(Self::output_path(source_dir, &profile.code, source));
                if !force_overwrite && Self::is_translated(&paths) {
                    debug!("Skipping {:?}, translation exists", paths.output);
                    summary.skipped += 1;
                    continue;
                }

                planned += 1;
                jobs.push(Job {
                    source: source.clone(),
                    profile: profile.clone(),
                    paths,
                });
            }
        }

        Ok(jobs)
    }

    /// Translate one document into one language and write the result
    async fn translate_document(&self, job: &Job) -> Result<DocumentStatus, TranslationError> {
        self.ctx.check_cancelled()?;
        let file_error = |e: anyhow::Error| TranslationError::File(format!("{:#}", e));

        let content = FileManager::read_to_string(&job.source).map_err(file_error)?;
        if let Some(parent) = job.paths.output.parent() {
            FileManager::ensure_dir(parent).map_err(file_error)?;
        }

        let store = open_checkpoint_store(self.ctx.config.run.checkpoint_backend, &job.paths, self.db.as_ref())?;
        let pipeline = DocumentPipeline::new(self.ctx.clone(), job.profile.clone(), job.paths.clone(), store.clone());
        let start_time = Instant::now();
        let document = pipeline.translate(&content).await?;

        FileManager::write_atomic(&job.paths.output, &document.content).map_err(file_error)?;
        if !document.complete {
            return Ok(DocumentStatus::Incomplete);
        }

        store.clear().await?;
        for side_file in job.paths.cleanup_files() {
            FileManager::remove_if_exists(side_file).map_err(file_error)?;
        }
        info!(
            "Success: {} in {}",
            job.paths.output.display(),
            Self::format_duration(start_time.elapsed())
        );
        Ok(DocumentStatus::Complete)
    }

    // Format duration in a human-readable format
    fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
