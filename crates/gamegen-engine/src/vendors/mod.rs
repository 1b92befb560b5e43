//! Vendor-specific provider integrations.
pub mod deepseek;
