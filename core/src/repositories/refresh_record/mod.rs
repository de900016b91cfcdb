pub mod r#trait {
    pub use super::trait_::*;
}
#[path = "trait.rs"]
mod trait_;
pub mod memory;

pub use memory::InMemoryRefreshRecordRepository;
pub use r#trait::{CasOutcome, RefreshRecordRepository};

#[cfg(test)]
mod tests;
