//! Gateway endpoints.
//!
//! The binary interface listens on two services: the notification gateway
//! (frames in) and the feedback service (expired tokens out). Each has a
//! production and a sandbox host.
//!
//! # Example
//!
//! ```
//! use apns_wire::transport::GatewayConfig;
//!
//! let config = GatewayConfig::production();
//! assert_eq!(config.gateway_addr(), ("gateway.push.apple.com", 2195));
//! assert_eq!(config.feedback_addr(), ("feedback.push.apple.com", 2196));
//! ```

/// Production notification gateway host.
pub const PRODUCTION_GATEWAY_HOST: &str = "gateway.push.apple.com";
/// Sandbox notification gateway host.
pub const SANDBOX_GATEWAY_HOST: &str = "gateway.sandbox.push.apple.com";
/// Notification gateway port.
pub const GATEWAY_PORT: u16 = 2195;

/// Production feedback service host.
pub const PRODUCTION_FEEDBACK_HOST: &str = "feedback.push.apple.com";
/// Sandbox feedback service host.
pub const SANDBOX_FEEDBACK_HOST: &str = "feedback.sandbox.push.apple.com";
/// Feedback service port.
pub const FEEDBACK_PORT: u16 = 2196;

/// Environment selection for the gateway endpoints.
///
/// The secured channel itself (TLS with the client certificate) is opened by
/// the caller; this only says where to connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Use the sandbox environment.
    pub sandbox: bool,
}

impl GatewayConfig {
    /// Production endpoints.
    pub fn production() -> Self {
        Self { sandbox: false }
    }

    /// Sandbox endpoints.
    pub fn sandbox() -> Self {
        Self { sandbox: true }
    }

    /// Notification gateway host.
    pub fn gateway_host(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_GATEWAY_HOST
        } else {
            PRODUCTION_GATEWAY_HOST
        }
    }

    /// Feedback service host.
    pub fn feedback_host(&self) -> &'static str {
        if self.sandbox {
            SANDBOX_FEEDBACK_HOST
        } else {
            PRODUCTION_FEEDBACK_HOST
        }
    }

    /// Notification gateway `(host, port)`.
    pub fn gateway_addr(&self) -> (&'static str, u16) {
        (self.gateway_host(), GATEWAY_PORT)
    }

    /// Feedback service `(host, port)`.
    pub fn feedback_addr(&self) -> (&'static str, u16) {
        (self.feedback_host(), FEEDBACK_PORT)
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self::sandbox()
    }
}
