/// Configuration default values
///
/// This module contains all the default values for configuration options,
/// making them easily changeable in one central location.
// Web server defaults
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_MAX_REQUEST_BYTES: usize = 20 * 1024 * 1024; // 20MB, images arrive as data URLs

// Instruction document defaults
pub const DEFAULT_DOCUMENT_EXPORT_BASE_URL: &str = "https://docs.google.com";
pub const DEFAULT_INSTRUCTIONS_TTL_SECS: u64 = 60 * 60;
pub const DEFAULT_INSTRUCTIONS_FETCH_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_INSTRUCTIONS_FALLBACK: &str = "Помилка завантаження інструкцій з Google Docs";
pub const DEFAULT_MAX_PROMPT_CHARS: usize = 2000;

// Language model defaults
pub const DEFAULT_LLM_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_LLM_MODEL: &str = "gpt-4";
pub const DEFAULT_LLM_VISION_MODEL: &str = "gpt-4o";
pub const DEFAULT_LLM_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_LLM_MAX_TOKENS: u32 = 2000;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

// Analysis store defaults
pub const DEFAULT_STORE_CAPACITY: usize = 256;
pub const DEFAULT_STORE_TTL_SECS: u64 = 24 * 60 * 60;

// Environment
pub const ENV_PREFIX: &str = "TM_ANALYZER_";
pub const LEGACY_DOCUMENT_URL_VAR: &str = "GOOGLE_DOC_URL";
pub const LEGACY_API_KEY_VAR: &str = "OPENAI_API_KEY";
pub const LEGACY_PORT_VAR: &str = "PORT";
