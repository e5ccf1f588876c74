//! Worker configuration.

use std::time::Duration;

use crate::retry::RetryConfig;

/// Extensions accepted as encoder input when `SUPPORTED_VIDEO_TYPES` is unset.
pub const DEFAULT_SUPPORTED_VIDEO_TYPES: &[&str] = &[
    ".3gp", ".3g2", ".3gp2", ".asf", ".avi", ".dv", ".m2ts", ".m2v", ".m4a", ".mod", ".mov",
    ".mp4", ".mpeg", ".mpg", ".mts", ".ts", ".wmv",
];

/// Polling never runs back to back.
const MIN_POLL_INTERVAL_MS: u64 = 1;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Delay between two polls of the same job, at least 1 ms
    pub poll_interval: Duration,
    /// Durable container holding content items
    pub content_container: String,
    /// Lowercase extensions including the dot
    pub supported_video_types: Vec<String>,
    /// Extension of the encoded object
    pub encoded_file_extension: String,
    /// Retry policy for backend bookkeeping deletes
    pub cleanup_retry: RetryConfig,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(1000),
            content_container: "content".to_string(),
            supported_video_types: DEFAULT_SUPPORTED_VIDEO_TYPES
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            encoded_file_extension: ".mp4".to_string(),
            cleanup_retry: RetryConfig::new("backend_cleanup"),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            poll_interval: Duration::from_millis(
                std::env::var("ENCODE_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse::<u64>().ok())
                    .unwrap_or(1000)
                    .max(MIN_POLL_INTERVAL_MS),
            ),
            content_container: std::env::var("CONTENT_CONTAINER")
                .unwrap_or(defaults.content_container),
            supported_video_types: std::env::var("SUPPORTED_VIDEO_TYPES")
                .ok()
                .map(|s| parse_extensions(&s))
                .filter(|types| !types.is_empty())
                .unwrap_or(defaults.supported_video_types),
            encoded_file_extension: std::env::var("ENCODED_FILE_EXTENSION")
                .map(|s| normalize_extension(&s))
                .unwrap_or(defaults.encoded_file_extension),
            cleanup_retry: RetryConfig::new("backend_cleanup")
                .with_max_retries(
                    std::env::var("CLEANUP_MAX_RETRIES")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(3),
                )
                .with_base_delay(Duration::from_millis(
                    std::env::var("CLEANUP_BASE_DELAY_MS")
                        .ok()
                        .and_then(|s| s.parse().ok())
                        .unwrap_or(100),
                )),
        }
    }

    /// Whether `extension` (with or without the dot, any case) is accepted.
    pub fn is_supported_extension(&self, extension: &str) -> bool {
        let extension = normalize_extension(extension);
        self.supported_video_types.iter().any(|ext| *ext == extension)
    }
}

fn normalize_extension(ext: &str) -> String {
    let ext = ext.trim().to_lowercase();
    if ext.starts_with('.') {
        ext
    } else {
        format!(".{}", ext)
    }
}

fn parse_extensions(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|ext| !ext.is_empty())
        .map(normalize_extension)
        .collect()
}
