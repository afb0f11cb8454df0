pub(crate) mod client;
pub(crate) mod event;
pub(crate) mod socket_mode;

pub use client::{MAX_MESSAGE_LEN, SlackClient, split_message};
pub use event::{AppMentionEvent, Envelope, EnvelopeKind};
pub use socket_mode::{FrameAction, SocketModeListener, process_frame};
