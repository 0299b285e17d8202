//! Shared constants used across the application

/// Model requested when neither the CLI nor the config names one.
pub const DEFAULT_MODEL: &str = "openai/gpt-oss-20b";

/// Base URL of the default provider's OpenAI-compatible API surface.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Endpoint path appended to the base URL for text generation.
pub const RESPONSES_PATH: &str = "responses";

/// Environment variable carrying the bearer credential.
pub const CREDENTIAL_ENV: &str = "GROQ_API_KEY";

/// Environment variable overriding the API base URL.
pub const BASE_URL_ENV: &str = "GROQ_BASE_URL";

/// Title given to every freshly created conversation.
pub const NEW_CHAT_TITLE: &str = "New chat";
