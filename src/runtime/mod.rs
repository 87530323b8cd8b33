pub mod cache;
pub mod coordinator;
pub mod loader;
pub mod log;
pub mod pipeline;
pub mod stage;

pub use cache::{CacheLookup, CacheStats, ShaderCaches, StageCache};
pub use coordinator::{Coordinator, ShaderCacheStats};
pub use loader::{AssetHandle, AssetLoader, LoaderError, StubAssetLoader};
pub use log::{EngineLog, MemoryLog, TracingLog};
pub use pipeline::{steps, PipelineRun, ProcessingPipeline, StageOutcome, StageResults, StepRecord};
pub use stage::{PipelineStages, SimulatedStage, Stage, StageError, StageKind};
