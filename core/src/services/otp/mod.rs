//! One-time password issuance and verification over SMS.

mod service;
mod traits;


pub use service::{OtpDispatch, OtpService};
pub use traits::SmsService;
