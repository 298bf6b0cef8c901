//! Protocol module - wire format, frame encoding and feedback decoding.
//!
//! This module implements the binary side of the gateway protocol:
//! - Outbound notification frames (command, token, payload)
//! - Feedback record decoding, pull-based over `Read` or push-based for
//!   chunked async reads

mod feedback;
mod feedback_buffer;
mod frame;
mod wire_format;

pub use feedback::{FeedbackDecoder, FeedbackRecord};
pub use feedback_buffer::FeedbackBuffer;
pub use frame::{encode_frame, encode_frame_into, Frame};
pub use wire_format::{
    EncoderConfig, FeedbackHeader, COMMAND_SIMPLE, DEFAULT_MAX_PAYLOAD_SIZE,
    DEFAULT_TOKEN_LENGTH, FEEDBACK_HEADER_SIZE, FRAME_OVERHEAD, LENGTH_PREFIX_SIZE,
};
