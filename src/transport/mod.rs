//! Raw-socket transport to out-of-process job servers.
//!
//! Frames are length-prefixed ([`frame`]). A [`SocketClient`] can keep many
//! requests in flight on one connection; responses are matched by sequence
//! number. Framing problems are logged and the connection carries on.

pub mod client;
pub mod frame;
pub mod worker;

pub use client::{Handlers, MessageHandler, SocketClient};
pub use frame::{Frame, FrameDecoder, HEADER_LEN, MAX_FRAME_LEN, RESPONSE};
pub use worker::{ExportWorker, DEFAULT_IDENTITY, EXPORT_JOB};
