//! MUAV Client - fleet platform REST client
//!
//! All communication with the platform backend goes through here.

pub mod client;
pub mod error;

pub use client::{ClientSettings, PlatformClient};
pub use error::ApiError;
