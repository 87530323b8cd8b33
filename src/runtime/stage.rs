//! Pipeline stage abstraction
//!
//! A stage takes one string and produces one string, standing in for a call to
//! an external tool. Shader-compile stages memoize their output per input.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::config::LatencyConfig;
use crate::runtime::cache::{ShaderCaches, StageCache};
use crate::runtime::log::EngineLog;

/// Stage processing error
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    #[error("{tool} failed: {reason}")]
    Failed { tool: String, reason: String },

    #[error("{tool} is unavailable")]
    Unavailable { tool: String },
}

/// A single stage in the asset pipeline
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name of the external tool this stage stands in for
    fn name(&self) -> &str;

    /// Transform the stage input into its output
    async fn run(&self, input: &str) -> Result<String, StageError>;
}

/// The external calls the pipeline simulates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    NeuralHdr,
    Codex,
    ZenQuery,
    Calibration,
    ShaderConductor,
    DirectXShader,
    ArtFilter,
}

impl StageKind {
    pub fn tool(&self) -> &'static str {
        match self {
            StageKind::NeuralHdr => "SlizzAi NeuralHDR",
            StageKind::Codex => "SlizzAi Codex",
            StageKind::ZenQuery => "Zen Database",
            StageKind::Calibration => "Meta-Human-DNA-Calibration",
            StageKind::ShaderConductor => "ShaderConductor",
            StageKind::DirectXShader => "DirectXShaderCompiler",
            StageKind::ArtFilter => "ARTv2",
        }
    }

    /// Deterministic output for `input`
    pub fn apply(&self, input: &str) -> String {
        match self {
            StageKind::NeuralHdr => format!("{} [Processed by SlizzAi]", input.to_uppercase()),
            StageKind::Codex => format!("CodexProcessed({})", input),
            StageKind::ZenQuery => format!("ZEN_METADATA: Verified({})", input),
            StageKind::Calibration => format!("calibrated_{}", input),
            StageKind::ShaderConductor => format!("compiled_{}", input),
            StageKind::DirectXShader => format!("dx_compiled_{}", input),
            StageKind::ArtFilter => format!("ARTv2_filtered({})", input),
        }
    }

    fn completion_message(&self) -> &'static str {
        match self {
            StageKind::NeuralHdr => {
                "Asset processed using neural HDR and fractal adaptive shading (Async)."
            }
            StageKind::Codex => "Asset enhanced using SlizzAi Codex algorithms (Async).",
            StageKind::ZenQuery => "Queried Zen Database successfully (Async).",
            StageKind::Calibration => {
                "Asset calibrated using Meta-Human-DNA-Calibration (Async)."
            }
            StageKind::ShaderConductor => {
                "Shader compiled using ShaderConductor-style processing (Async)."
            }
            StageKind::DirectXShader => "Shader compiled using DirectXShaderCompiler (Async).",
            StageKind::ArtFilter => "Art filter applied using ARTv2 methodology (Async).",
        }
    }

    /// Configured latency for this kind
    pub fn latency(&self, latency: &LatencyConfig) -> Duration {
        let ms = match self {
            StageKind::NeuralHdr => latency.neural_hdr_ms,
            StageKind::Codex => latency.codex_ms,
            StageKind::ZenQuery => latency.zen_query_ms,
            StageKind::Calibration => latency.calibration_ms,
            StageKind::ShaderConductor => latency.shader_ms,
            StageKind::DirectXShader => latency.dx_shader_ms,
            StageKind::ArtFilter => latency.art_filter_ms,
        };
        Duration::from_millis(ms)
    }
}

/// A stage that sleeps for a fixed latency and then applies its [`StageKind`]
pub struct SimulatedStage {
    kind: StageKind,
    latency: Duration,
    cache: Option<Arc<StageCache>>,
    log: Arc<dyn EngineLog>,
}

impl SimulatedStage {
    pub fn new(kind: StageKind, latency: Duration, log: Arc<dyn EngineLog>) -> Self {
        Self {
            kind,
            latency,
            cache: None,
            log,
        }
    }

    /// Memoize outputs in `cache`
    pub fn with_cache(mut self, cache: Arc<StageCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    async fn compute(&self, input: &str) -> String {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let output = self.kind.apply(input);
        self.log.log(self.kind.completion_message());
        output
    }
}

#[async_trait]
impl Stage for SimulatedStage {
    fn name(&self) -> &str {
        self.kind.tool()
    }

    async fn run(&self, input: &str) -> Result<String, StageError> {
        let Some(cache) = &self.cache else {
            return Ok(self.compute(input).await);
        };

        let lookup = cache.get_or_compute(input, || self.compute(input)).await;
        if lookup.hit {
            debug!(tool = self.kind.tool(), "cache hit");
            self.log.log(&format!(
                "Shader retrieved from cache ({}).",
                self.kind.tool()
            ));
        }
        Ok(lookup.value)
    }
}

/// The stage bound to each step of the pipeline
#[derive(Clone)]
pub struct PipelineStages {
    pub neural_hdr: Arc<dyn Stage>,
    pub codex: Arc<dyn Stage>,
    pub zen_query: Arc<dyn Stage>,
    pub calibration: Arc<dyn Stage>,
    pub shader: Arc<dyn Stage>,
    pub dx_shader: Arc<dyn Stage>,
    pub art_filter: Arc<dyn Stage>,
}

impl PipelineStages {
    /// Simulated stages, with the shader compilers backed by `caches`
    pub fn simulated(
        latency: &LatencyConfig,
        caches: &ShaderCaches,
        log: Arc<dyn EngineLog>,
    ) -> Self {
        let stage = |kind: StageKind| SimulatedStage::new(kind, kind.latency(latency), log.clone());

        Self {
            neural_hdr: Arc::new(stage(StageKind::NeuralHdr)),
            codex: Arc::new(stage(StageKind::Codex)),
            zen_query: Arc::new(stage(StageKind::ZenQuery)),
            calibration: Arc::new(stage(StageKind::Calibration)),
            shader: Arc::new(
                stage(StageKind::ShaderConductor).with_cache(caches.shader_conductor.clone()),
            ),
            dx_shader: Arc::new(
                stage(StageKind::DirectXShader).with_cache(caches.directx.clone()),
            ),
            art_filter: Arc::new(stage(StageKind::ArtFilter)),
        }
    }
}
