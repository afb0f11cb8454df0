pub(crate) mod answer;
pub(crate) mod chunk;
pub(crate) mod embedding;
pub(crate) mod message;

pub use answer::{Answer, AnswerOrigin};
pub use chunk::RetrievedChunk;
pub use embedding::Embedding;
pub use message::{IncomingMessage, Query, QueryKind};
