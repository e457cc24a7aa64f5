//! Clients for the Google-hosted endpoints the app talks to.

/// Gemini feedback generation.
pub mod gemini;
/// Apps Script upload webhook.
pub mod webhook;
