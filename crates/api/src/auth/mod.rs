//! Authentication primitives.
//!
//! - [`jwt`] -- JWT access-token generation and validation.
//! - [`cookie`] -- session cookie rendering and parsing.
//! - [`telegram`] -- rate limiting and replay protection for Telegram sign-in.

pub mod cookie;
pub mod jwt;
pub mod telegram;
