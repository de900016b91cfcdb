
use hl_shared::{JwtConfig, PasswordConfig};
use std::sync::Arc;

use crate::domain::entities::SocialProvider;
use crate::services::auth::{AuthCollaborators, AuthService, AuthSettings, AuthStores};
use crate::services::identity::tests::mocks::{profile, ScriptedVerifier};
use crate::services::identity::SocialVerifierRegistry;
use crate::services::mail::tests::mocks::RecordingMailer;
use crate::services::otp::tests::mocks::RecordingSms;

pub(crate) struct Harness {
    pub(crate) auth: AuthService,
    pub(crate) sms: RecordingSms,
    pub(crate) mailer: RecordingMailer,
}

pub(crate) fn settings() -> AuthSettings {
    AuthSettings {
        jwt: JwtConfig {
            access_secret: "test-access-secret".to_string(),
            refresh_secret: "test-refresh-secret".to_string(),
            ..JwtConfig::default()
        },
        password: PasswordConfig {
            bcrypt_cost: 4,
            min_length: 8,
        },
        dashboard_url: "http://localhost:3000/dashboard".to_string(),
        ..AuthSettings::default()
    }
}

pub(crate) fn harness_with(settings: AuthSettings) -> Harness {
    let sms = RecordingSms::default();
    let mailer = RecordingMailer::default();
    let social = SocialVerifierRegistry::new().with(ScriptedVerifier::accepting(
        SocialProvider::Google,
        profile("google-123", Some("social@example.com"), true),
    ));
    let (auth, _worker) = AuthService::assemble(
        AuthStores::in_memory(),
        AuthCollaborators {
            sms: Arc::new(sms.clone()),
            email: Arc::new(mailer.clone()),
            social,
        },
        settings,
    )
    .unwrap();
    Harness { auth, sms, mailer }
}

pub(crate) fn harness() -> Harness {
    harness_with(settings())
}
