//! Token service: issues, rotates, verifies and revokes token pairs.

mod config;
mod service;

#[cfg(test)]
pub(crate) mod tests;

pub use config::TokenServiceConfig;
pub use service::TokenService;
