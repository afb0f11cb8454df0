use std::time::Duration;

pub const CODEQUEST_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_LANG_MODEL: &str = "gemini-1.5-flash";
pub const DEFAULT_EMBEDDING_MODEL: &str = "models/embedding-001";

pub const DEFAULT_DOC_TEMPERATURE: f64 = 0.3;
pub const DEFAULT_CODE_TEMPERATURE: f64 = 0.2;

pub const DEFAULT_TOP_K: usize = 4;
pub const DEFAULT_INDEX_PATH: &str = "knowledge_index/index.json";

/// Deadline for a single outbound HTTP request.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

pub const INDEX_ARTIFACT_VERSION: u32 = 1;

pub const FENCE_MARKER: &str = "```";

pub const DOC_ACK: &str = "Searching the documentation... 📚";
pub const CODE_ACK: &str = "Analyzing the code snippet... 🧠";
pub const CODE_ANSWER_PREFIX: &str = "Here's the analysis:\n\n";
pub const DOC_APOLOGY: &str = "Sorry, I encountered an error while searching the docs.";
pub const CODE_APOLOGY: &str = "Sorry, I encountered an error while analyzing the code.";
pub const EMPTY_QUERY_HINT: &str = "Hi! Mention me with a question about the docs, or paste a code snippet in a ``` block and I'll explain it.";

/// Graphemes of request content kept in log lines.
pub const LOG_EXCERPT_LEN: usize = 80;
