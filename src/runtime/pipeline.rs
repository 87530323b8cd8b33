//! Asset processing pipeline
//!
//! Runs the fixed stage graph over one asset. The four enhancement stages are
//! strictly sequential, the two shader compilers run concurrently, and the art
//! filter consumes the calibration output. A stage error never aborts the run:
//! the step records an empty string and the chain continues with it.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::runtime::log::EngineLog;
use crate::runtime::stage::{PipelineStages, Stage};

/// Step names used as result keys
pub mod steps {
    pub const NEURAL_HDR: &str = "NeuralHDR_Processing";
    pub const CODEX: &str = "Codex_Enhancement";
    pub const ZEN_QUERY: &str = "Zen_Database_Query";
    pub const CALIBRATION: &str = "Asset_Calibration";
    pub const SHADER: &str = "Shader_Compilation";
    pub const DX_SHADER: &str = "DX_Shader_Compilation";
    pub const ART_FILTER: &str = "ART_Filter_Application";
    pub const FINAL_ASSET: &str = "Final_Asset";
}

/// Named stage outputs in the order they were recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StageResults {
    entries: Vec<(String, String)>,
}

impl StageResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace in place
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }
}

impl Serialize for StageResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// What a single stage invocation produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum StageOutcome {
    Completed(String),
    Failed(String),
}

impl StageOutcome {
    /// Value handed downstream; a failed stage contributes an empty string
    pub fn value(&self) -> &str {
        match self {
            StageOutcome::Completed(value) => value,
            StageOutcome::Failed(_) => "",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, StageOutcome::Failed(_))
    }
}

/// Trace entry for one step
#[derive(Debug, Clone, Serialize)]
pub struct StepRecord {
    pub step: &'static str,
    pub outcome: StageOutcome,
    pub elapsed_ms: u64,
}

/// Everything one pipeline run produced
#[derive(Debug, Clone, Default, Serialize)]
pub struct PipelineRun {
    pub results: StageResults,
    pub steps: Vec<StepRecord>,
}

impl PipelineRun {
    /// Store a finished step and return the value for the next stage
    fn record(&mut self, record: StepRecord) -> String {
        let value = record.outcome.value().to_string();
        self.results.insert(record.step, value.clone());
        self.steps.push(record);
        value
    }

    /// Names of steps that failed
    pub fn failed_steps(&self) -> Vec<&'static str> {
        self.steps
            .iter()
            .filter(|s| s.outcome.is_failed())
            .map(|s| s.step)
            .collect()
    }
}

/// Runs the stage graph over one asset
pub struct ProcessingPipeline {
    stages: Arc<PipelineStages>,
    log: Arc<dyn EngineLog>,
    shader_source: String,
}

impl ProcessingPipeline {
    pub fn new(
        stages: Arc<PipelineStages>,
        log: Arc<dyn EngineLog>,
        shader_source: impl Into<String>,
    ) -> Self {
        Self {
            stages,
            log,
            shader_source: shader_source.into(),
        }
    }

    /// Run one stage, converting its error into a failed outcome
    pub async fn execute_step(
        &self,
        step: &'static str,
        stage: &dyn Stage,
        input: &str,
    ) -> StepRecord {
        self.log.log(&format!("Starting step: {}", step));
        let started = Instant::now();

        let outcome = match stage.run(input).await {
            Ok(output) => {
                self.log.log(&format!("Completed step: {}", step));
                StageOutcome::Completed(output)
            }
            Err(e) => {
                warn!(step, tool = stage.name(), "stage failed: {}", e);
                self.log.log(&format!("Error in {}: {}", step, e));
                StageOutcome::Failed(e.to_string())
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        debug!(step, elapsed_ms, "step finished");

        StepRecord {
            step,
            outcome,
            elapsed_ms,
        }
    }

    /// Run the complete pipeline over `asset`
    pub async fn run(&self, asset: &str) -> PipelineRun {
        let mut run = PipelineRun::default();
        let stages = &self.stages;

        // Dependent sequential steps
        let processed = run.record(
            self.execute_step(steps::NEURAL_HDR, stages.neural_hdr.as_ref(), asset)
                .await,
        );
        let enhanced = run.record(
            self.execute_step(steps::CODEX, stages.codex.as_ref(), &processed)
                .await,
        );
        let enriched = run.record(
            self.execute_step(steps::ZEN_QUERY, stages.zen_query.as_ref(), &enhanced)
                .await,
        );
        let calibrated = run.record(
            self.execute_step(steps::CALIBRATION, stages.calibration.as_ref(), &enriched)
                .await,
        );

        // Independent shader compilations: both start before either is awaited
        let mut shaders = FuturesUnordered::new();
        shaders.push(self.execute_step(
            steps::SHADER,
            stages.shader.as_ref(),
            &self.shader_source,
        ));
        shaders.push(self.execute_step(
            steps::DX_SHADER,
            stages.dx_shader.as_ref(),
            &self.shader_source,
        ));
        while let Some(record) = shaders.next().await {
            run.record(record);
        }

        let filtered = run.record(
            self.execute_step(steps::ART_FILTER, stages.art_filter.as_ref(), &calibrated)
                .await,
        );

        run.results.insert(steps::FINAL_ASSET, filtered);
        self.log
            .log("Processing pipeline completed (Async, Official Build).");
        run
    }
}
