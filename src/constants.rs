//! Application-wide constants
//!
//! Centralizes defaults that config files may override.

/// Default OpenAI-compatible API base when neither config nor env sets one.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Environment variable holding the API base URL.
pub const ENV_API_BASE: &str = "OPENAI_API_BASE";

/// Environment variable holding the API key.
pub const ENV_API_KEY: &str = "OPENAI_API_KEY";

/// Model used for generation when the operator picks nothing.
pub const DEFAULT_GENERATION_MODEL: &str = "gpt-4o-mini";

/// Fixed judge model. Judging never follows the generation model selection.
pub const DEFAULT_JUDGE_MODEL: &str = "gpt-4.1";

/// Sampling seed sent with every completion request.
pub const DEFAULT_SEED: u64 = 42;

/// HTTP timeout for a single completion request in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// System prompt used when a template omits its system variant.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful assistant.";

/// Inclusive bounds of the judge rating scale.
pub const RATING_MIN: i64 = 0;
pub const RATING_MAX: i64 = 3;

/// Prefix for record ids that come from synthetic datasets in mixed reports.
pub const SYNTHETIC_ID_PREFIX: &str = "synthetic_";

/// Error message display duration in seconds before auto-dismiss.
pub const ERROR_TTL_SECS: u64 = 8;

/// Spinner animation frame duration in milliseconds.
pub const SPINNER_FRAME_MS: u128 = 80;

/// Minimum terminal width for the side-by-side verdict panels.
pub const MIN_SPLIT_VIEW_WIDTH: u16 = 90;

/// Lines moved by one page scroll in result panels.
pub const SCROLL_PAGE_LINES: u16 = 10;

/// Datasets evaluated together when none are named.
pub const EVALUATION_DATASETS: [&str; 2] = ["shorten", "shorten_synthetic"];
