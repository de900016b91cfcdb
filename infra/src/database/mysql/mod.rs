//! MySQL repository implementations

mod account_repository_impl;
pub(crate) mod errors;
mod refresh_record_repository_impl;
mod reset_token_repository_impl;

pub use account_repository_impl::MySqlAccountRepository;
pub use refresh_record_repository_impl::MySqlRefreshRecordRepository;
pub use reset_token_repository_impl::MySqlResetTokenRepository;
