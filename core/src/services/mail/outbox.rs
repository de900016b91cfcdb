use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use hl_shared::utils::email::mask_email;

use super::{EmailMessage, EmailService};

enum OutboxCommand {
    Deliver(EmailMessage),
    Flush(oneshot::Sender<()>),
}

/// Fire-and-forget queue in front of an [`EmailService`]
///
/// Messages are delivered one at a time in enqueue order. Delivery failures
/// are logged and dropped. The worker stops once every handle is dropped.
#[derive(Clone)]
pub struct MailOutbox {
    commands: mpsc::UnboundedSender<OutboxCommand>,
}

impl MailOutbox {
    /// Spawn the delivery worker on the current runtime
    pub fn start(service: Arc<dyn EmailService>) -> (Self, JoinHandle<()>) {
        let (commands, receiver) = mpsc::unbounded_channel();
        let worker = tokio::spawn(run_worker(receiver, service));
        (Self { commands }, worker)
    }

    /// Queue a message without waiting for delivery
    pub fn enqueue(&self, message: EmailMessage) {
        if self.commands.send(OutboxCommand::Deliver(message)).is_err() {
            warn!(event = "mail_outbox_closed", "Mail worker stopped; message dropped");
        }
    }

    /// Wait until every message enqueued before this call has been attempted
    pub async fn flush(&self) {
        let (done, wait) = oneshot::channel();
        if self.commands.send(OutboxCommand::Flush(done)).is_ok() {
            let _ = wait.await;
        }
    }
}

async fn run_worker(mut receiver: mpsc::UnboundedReceiver<OutboxCommand>, service: Arc<dyn EmailService>) {
    while let Some(command) = receiver.recv().await {
        match command {
            OutboxCommand::Deliver(message) => {
                if service.send(&message).await {
                    debug!(to = %mask_email(&message.to), subject = %message.subject, "E-mail delivered");
                } else {
                    warn!(
                        to = %mask_email(&message.to),
                        subject = %message.subject,
                        event = "mail_delivery_failed",
                        "E-mail delivery failed"
                    );
                }
            }
            OutboxCommand::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    debug!("Mail worker stopped");
}
