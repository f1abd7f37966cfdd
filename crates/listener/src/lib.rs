//! eventsink webhook receiver.
//!
//! Binds an HTTP server on the resolved address and the configured port and
//! accepts event deliveries pushed by the orchestrator on
//! [`subscription::CallbackUrl::PATH`]. For each request:
//!
//! 1. the body is read in a loop until the declared `Content-Length` is
//!    satisfied or the stream ends, never past the declared length and never
//!    past the configured cap;
//! 2. the bytes are decoded as a JSON object ([`subscription::EventPayload`]);
//! 3. a decoded payload is stamped into a [`subscription::Delivery`] and handed
//!    to the configured [`subscription::EventSink`].
//!
//! | Outcome | Status |
//! |---------|--------|
//! | decoded and forwarded | `200 OK` |
//! | not a JSON object, or the body stream broke | `200 OK` (logged, nothing forwarded) |
//! | body larger than the cap | `413 Payload Too Large` |
//!
//! Requests are handled concurrently on the tokio runtime. Handlers share no
//! mutable state; the sink is the only shared component.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** Transport details and body framing live here. The rest
//! of the workspace sees only [`subscription::EventSink`] and
//! [`subscription::Delivery`].

mod body;
mod server;
mod sink;

pub use body::{read_body, BodyError};
pub use server::{BoundListener, WebhookListener};
pub use sink::{BoundedChannelSink, ChannelSink, LogSink};
