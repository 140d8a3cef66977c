#![deny(unsafe_code)]

//! Terminal paper-reading tutor backed by a hosted completion service.

/// Interaction loop and startup wiring.
pub mod app;
/// Conversation domain: context, history, session and render order.
pub mod chat;
/// Layered settings.
pub mod settings;
pub mod terminal;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult, ChatApp};
