#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

//! ElevenLabs voice integration
//!
//! Covers the two calls the product makes: synthesizing debrief audio
//! and minting signed realtime URLs for the private conversational
//! agent.

mod client;
mod error;
mod http_client;
mod types;

pub use client::ElevenLabsClient;
pub use error::{Result, SpeechError};
pub use types::{SignedUrl, Synthesis};
