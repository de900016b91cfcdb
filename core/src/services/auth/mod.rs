//! Authentication service module
//!
//! Facade over the identity resolver, token service, OTP service and reset
//! store. Each HTTP operation maps onto one method here:
//! - Password, OTP and social login
//! - Explicit registration
//! - Token refresh and logout
//! - Password reset

mod assembly;
mod service;

#[cfg(test)]
mod tests;

pub use assembly::{AuthCollaborators, AuthSettings, AuthStores};
pub use service::AuthService;
