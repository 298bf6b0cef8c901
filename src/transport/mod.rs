//! Transport module - gateway endpoints and channel adapters.
//!
//! Provides:
//! - Production/sandbox endpoint selection
//! - Async adapters that write batches to, and read feedback from, a
//!   caller-supplied secured stream

mod channel;
mod gateway;

pub use channel::{FeedbackChannel, NotificationChannel};
pub use gateway::{
    GatewayConfig, FEEDBACK_PORT, GATEWAY_PORT, PRODUCTION_FEEDBACK_HOST, PRODUCTION_GATEWAY_HOST,
    SANDBOX_FEEDBACK_HOST, SANDBOX_GATEWAY_HOST,
};
