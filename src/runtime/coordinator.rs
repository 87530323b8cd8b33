//! Run coordinator
//!
//! Imports an asset through the engine loader, then hands the handle to a
//! fresh [`ProcessingPipeline`]. Import failure is the only fatal error: the
//! run is abandoned before any stage is invoked.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tracing::{error, info};

use crate::config::SlizzConfig;
use crate::provenance::BuildInfo;
use crate::runtime::cache::{CacheStats, ShaderCaches};
use crate::runtime::loader::{AssetHandle, AssetLoader, StubAssetLoader};
use crate::runtime::log::{EngineLog, TracingLog};
use crate::runtime::pipeline::{PipelineRun, ProcessingPipeline, StageResults};
use crate::runtime::stage::PipelineStages;

/// Statistics for both shader caches
#[derive(Debug, Clone, serde::Serialize)]
pub struct ShaderCacheStats {
    pub shader_conductor: CacheStats,
    pub directx: CacheStats,
}

/// Top-level entry point for pipeline runs
pub struct Coordinator {
    config: SlizzConfig,
    build: BuildInfo,
    loader: Arc<dyn AssetLoader>,
    log: Arc<dyn EngineLog>,
    caches: ShaderCaches,
    stages: Arc<PipelineStages>,
    runs_completed: AtomicU64,
}

impl Coordinator {
    /// Coordinator with the stub loader and `tracing` engine log
    pub fn new(config: SlizzConfig) -> Self {
        Self::with_parts(config, Arc::new(StubAssetLoader), Arc::new(TracingLog))
    }

    pub fn with_parts(
        config: SlizzConfig,
        loader: Arc<dyn AssetLoader>,
        log: Arc<dyn EngineLog>,
    ) -> Self {
        let caches = ShaderCaches::new();
        let stages = PipelineStages::simulated(&config.latency, &caches, log.clone());
        let build = BuildInfo::current();

        log.log(&format!(
            "Initialized SlizzAi version {} (Async Mode).",
            config.slizzai_version
        ));
        log.log(&format!(
            "SlizzAiV3Prototype initiated with Serial Number: {} (Async Mode).",
            build.serial_number
        ));

        Self {
            config,
            build,
            loader,
            log,
            caches,
            stages: Arc::new(stages),
            runs_completed: AtomicU64::new(0),
        }
    }

    /// Replace the stage set. `build` receives the coordinator's shader caches,
    /// which `cache_stats` keeps reporting.
    pub fn with_stages<F>(mut self, build: F) -> Self
    where
        F: FnOnce(&ShaderCaches) -> PipelineStages,
    {
        self.stages = Arc::new(build(&self.caches));
        self
    }

    pub fn config(&self) -> &SlizzConfig {
        &self.config
    }

    pub fn build_info(&self) -> &BuildInfo {
        &self.build
    }

    pub fn caches(&self) -> &ShaderCaches {
        &self.caches
    }

    pub fn cache_stats(&self) -> ShaderCacheStats {
        ShaderCacheStats {
            shader_conductor: self.caches.shader_conductor.stats(),
            directx: self.caches.directx.stats(),
        }
    }

    pub fn runs_completed(&self) -> u64 {
        self.runs_completed.load(Ordering::Relaxed)
    }

    /// Resolve `path` on the blocking pool. `None` when no usable handle came back.
    pub async fn import_asset(&self, path: &str) -> Option<AssetHandle> {
        let loader = Arc::clone(&self.loader);
        let owned_path = path.to_string();

        let loaded =
            tokio::task::spawn_blocking(move || loader.load_asset(&owned_path)).await;

        match loaded {
            Ok(Ok(Some(handle))) if !handle.is_empty() => {
                self.log
                    .log(&format!("Asset imported successfully: {}", handle));
                Some(handle)
            }
            Ok(Ok(_)) => {
                self.log
                    .log(&format!("No asset returned for '{}'", path));
                None
            }
            Ok(Err(e)) => {
                self.log
                    .log(&format!("Error importing asset from '{}': {}", path, e));
                None
            }
            Err(e) => {
                error!("Asset loader task for '{}' did not complete: {}", path, e);
                self.log
                    .log(&format!("Error importing asset from '{}': {}", path, e));
                None
            }
        }
    }

    /// Import and process `path`, keeping the per-step trace
    pub async fn run_report(&self, path: &str) -> Option<PipelineRun> {
        let Some(asset) = self.import_asset(path).await else {
            self.log
                .log("Prototype aborted due to asset import failure.");
            return None;
        };

        let pipeline = ProcessingPipeline::new(
            Arc::clone(&self.stages),
            Arc::clone(&self.log),
            self.config.shader_source.clone(),
        );
        let run = pipeline.run(asset.as_str()).await;

        self.runs_completed.fetch_add(1, Ordering::Relaxed);
        self.log.log(&format!(
            "Prototype {} built at {} completed processing (Async).",
            self.build.serial_number, self.build.build_time
        ));
        info!(
            serial = %self.build.serial_number,
            failed = run.failed_steps().len(),
            "pipeline run finished"
        );

        Some(run)
    }

    /// Import and process `path`; an empty mapping when the import failed
    pub async fn run(&self, path: &str) -> StageResults {
        self.run_report(path)
            .await
            .map(|run| run.results)
            .unwrap_or_default()
    }
}
