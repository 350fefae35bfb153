//! Rallypoint Push Shared Library
//!
//! Provides a unified Firebase Cloud Messaging (FCM) client for sending
//! push notifications to devices across the Rallypoint platform.
//!
//! It handles:
//! - Single-device message delivery over the FCM HTTP API
//! - Loose response parsing so delivery failures surface as errors
//! - Device token validation via dry-run sends

pub mod client;
pub mod errors;
pub mod models;

pub use client::FcmClient;
pub use errors::FcmError;
pub use models::{FcmSendResult, PushMessage};
