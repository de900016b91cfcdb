mod store_tests;

use hl_shared::ResetConfig;
use std::sync::Arc;

use crate::domain::entities::{Account, TokenSubject};
use crate::domain::value_objects::Session;
use crate::repositories::{AccountRepository, InMemoryAccountRepository, InMemoryRefreshRecordRepository, InMemoryResetTokenRepository};
use crate::services::identity::tests::fast_passwords;
use crate::services::mail::tests::mocks::RecordingMailer;
use crate::services::mail::MailOutbox;
use crate::services::reset::ResetTokenStore;
use crate::services::token::tests::service_with;
use crate::services::token::TokenService;

pub(crate) struct Fixture {
    pub(crate) store: ResetTokenStore,
    pub(crate) outbox: MailOutbox,
    pub(crate) mailer: RecordingMailer,
    pub(crate) accounts: InMemoryAccountRepository,
    pub(crate) tokens: InMemoryResetTokenRepository,
    pub(crate) token_service: Arc<TokenService>,
    pub(crate) account: Account,
}

pub(crate) async fn fixture(config: ResetConfig) -> Fixture {
    let accounts = InMemoryAccountRepository::new();
    let passwords = fast_passwords();
    let account = accounts
        .insert(
            Account::new()
                .with_email("jane@example.com", true)
                .with_password_hash(passwords.hash("old-password").await.unwrap()),
        )
        .await
        .unwrap();

    let mailer = RecordingMailer::default();
    let (outbox, _worker) = MailOutbox::start(Arc::new(mailer.clone()));
    let tokens = InMemoryResetTokenRepository::new();
    let token_service = Arc::new(service_with(Arc::new(InMemoryRefreshRecordRepository::new())));
    let store = ResetTokenStore::new(
        Arc::new(tokens.clone()),
        Arc::new(accounts.clone()),
        passwords,
        token_service.clone(),
        outbox.clone(),
        config,
    );

    Fixture {
        store,
        outbox,
        mailer,
        accounts,
        tokens,
        token_service,
        account,
    }
}

impl Fixture {
    /// Request a reset and pull the plaintext token out of the delivered link
    pub(crate) async fn request_token(&self) -> String {
        self.store
            .request_reset(&Session::new(), "jane@example.com")
            .await
            .unwrap();
        self.outbox.flush().await;
        let messages = self.mailer.messages().await;
        let html = &messages.last().unwrap().html;
        let start = html.find("token=").unwrap() + "token=".len();
        html[start..].chars().take_while(|c| c.is_ascii_hexdigit()).collect()
    }

    pub(crate) fn subject(&self) -> TokenSubject {
        TokenSubject::from(&self.account)
    }
}
