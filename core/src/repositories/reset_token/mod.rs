pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryResetTokenRepository;
pub use r#trait::ResetTokenRepository;
