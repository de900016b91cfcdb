mod resolver_tests;

use hl_shared::{OtpConfig, PasswordConfig};
use std::sync::Arc;

use crate::repositories::{AccountRepository, InMemoryAccountRepository, InMemoryOtpChallengeRepository, OtpChallengeRepository};
use crate::services::identity::{IdentityResolver, PasswordHasher, SocialVerifierRegistry};
use crate::services::otp::tests::mocks::RecordingSms;
use crate::services::otp::OtpService;

pub(crate) fn fast_passwords() -> Arc<PasswordHasher> {
    Arc::new(PasswordHasher::new(&PasswordConfig {
        bcrypt_cost: 4,
        min_length: 8,
    }))
}

/// Everything a resolver test needs to poke at
pub(crate) struct Fixture {
    pub(crate) resolver: Arc<IdentityResolver>,
    pub(crate) accounts: InMemoryAccountRepository,
    pub(crate) otp: Arc<OtpService>,
    pub(crate) sms: RecordingSms,
}

pub(crate) fn fixture(social: SocialVerifierRegistry) -> Fixture {
    let accounts = InMemoryAccountRepository::new();
    fixture_with(
        Arc::new(accounts.clone()),
        accounts,
        Arc::new(InMemoryOtpChallengeRepository::new()),
        social,
    )
}

/// Build a resolver over possibly wrapped stores. `accounts` is the
/// unwrapped store for assertions.
pub(crate) fn fixture_with(
    account_store: Arc<dyn AccountRepository>,
    accounts: InMemoryAccountRepository,
    challenges: Arc<dyn OtpChallengeRepository>,
    social: SocialVerifierRegistry,
) -> Fixture {
    let sms = RecordingSms::default();
    let otp = Arc::new(OtpService::new(
        challenges,
        Arc::new(sms.clone()),
        OtpConfig::default(),
    ));
    let resolver = Arc::new(IdentityResolver::new(
        account_store,
        otp.clone(),
        fast_passwords(),
        social,
    ));
    Fixture {
        resolver,
        accounts,
        otp,
        sms,
    }
}
