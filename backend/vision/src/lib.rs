pub mod openai;
pub mod prompt;

pub use openai::{OpenAiVisionClient, DEFAULT_BASE_URL, DEFAULT_MODEL, REQUEST_TIMEOUT};
pub use prompt::{IMAGE_MIME_TYPE, SYSTEM_PROMPT, TEMPERATURE, USER_INSTRUCTION};
