//! Repository interfaces for the stores this crate depends on.
//!
//! Every trait has an in-memory implementation suitable for tests and
//! single-process development deployments; durable implementations live in
//! the infrastructure crate.

pub mod account;
pub mod otp;
pub mod refresh_record;
pub mod reset_token;

pub use account::{AccountRepository, InMemoryAccountRepository};
pub use otp::{InMemoryOtpChallengeRepository, OtpChallengeRepository};
pub use refresh_record::{CasOutcome, InMemoryRefreshRecordRepository, RefreshRecordRepository};
pub use reset_token::{InMemoryResetTokenRepository, ResetTokenRepository};
