use serde::{Deserialize, Serialize};

/// Asset imported when none is given on the command line
pub const DEFAULT_ASSET_PATH: &str = "/Game/ExampleAsset.ExampleAsset";

/// Input handed to both shader compilers
pub const DEFAULT_SHADER_SOURCE: &str = "shader_source_placeholder";

/// Framework version reported when the config does not name one
pub const DEFAULT_VERSION: &str = "2.9";

// ============================================================================
// SBIO: Pure data structures
// ============================================================================

/// Top-level configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlizzConfig {
    pub slizzai_version: String,
    pub default_asset: String,
    pub shader_source: String,
    pub latency: LatencyConfig,
    pub server: ServerConfig,
}

impl Default for SlizzConfig {
    fn default() -> Self {
        Self {
            slizzai_version: DEFAULT_VERSION.to_string(),
            default_asset: DEFAULT_ASSET_PATH.to_string(),
            shader_source: DEFAULT_SHADER_SOURCE.to_string(),
            latency: LatencyConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl SlizzConfig {
    /// Parse a JSON configuration document
    pub fn from_str(content: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(content)
    }
}

/// Simulated latency of each external call, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub neural_hdr_ms: u64,
    pub codex_ms: u64,
    pub zen_query_ms: u64,
    pub calibration_ms: u64,
    pub shader_ms: u64,
    pub dx_shader_ms: u64,
    pub art_filter_ms: u64,
}

impl Default for LatencyConfig {
    fn default() -> Self {
        Self {
            neural_hdr_ms: 50,
            codex_ms: 50,
            zen_query_ms: 50,
            calibration_ms: 50,
            shader_ms: 100,
            dx_shader_ms: 100,
            art_filter_ms: 50,
        }
    }
}

impl LatencyConfig {
    /// No simulated latency at all
    pub fn zero() -> Self {
        Self {
            neural_hdr_ms: 0,
            codex_ms: 0,
            zen_query_ms: 0,
            calibration_ms: 0,
            shader_ms: 0,
            dx_shader_ms: 0,
            art_filter_ms: 0,
        }
    }
}

/// HTTP serve mode settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub port: u16,
    pub max_concurrent: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            max_concurrent: 100,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}
