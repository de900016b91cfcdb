pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryAccountRepository;
pub use r#trait::AccountRepository;

/// Names reported in `DomainError::UniqueViolation` by account stores
pub mod constraints {
    pub const EMAIL: &str = "email";
    pub const PHONE: &str = "phone";
    pub const PROVIDER: &str = "provider";
}
