//! Single-use password reset tokens delivered by e-mail.

mod store;

#[cfg(test)]
mod tests;

pub use store::ResetTokenStore;
