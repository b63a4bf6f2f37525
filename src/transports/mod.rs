//! Transport implementations for chat platforms.

#[cfg(feature = "telegram")]
pub mod telegram;

#[cfg(feature = "telegram")]
pub use telegram::TelegramTransport;
