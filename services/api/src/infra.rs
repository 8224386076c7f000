use metrics_exporter_prometheus::PrometheusHandle;
use pawhaven::notifications::{EmailError, EmailMessage, Mailer};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Keeps every outgoing message so the demo can print what would have been mailed.
#[derive(Default, Clone)]
pub(crate) struct CapturingMailer {
    outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl Mailer for CapturingMailer {
    fn send(&self, message: &EmailMessage) -> Result<(), EmailError> {
        let mut guard = self
            .outbox
            .lock()
            .map_err(|_| EmailError::Transport("outbox mutex poisoned".to_string()))?;
        guard.push(message.clone());
        Ok(())
    }
}

impl CapturingMailer {
    pub(crate) fn messages(&self) -> Vec<EmailMessage> {
        match self.outbox.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

/// Formats a fee held in cents as dollars.
pub(crate) fn dollars(cents: u32) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dollars_pads_cents() {
        assert_eq!(dollars(25_000), "$250.00");
        assert_eq!(dollars(7_505), "$75.05");
        assert_eq!(dollars(0), "$0.00");
    }

    #[test]
    fn capturing_mailer_keeps_messages_in_order() {
        let mailer = CapturingMailer::default();
        for subject in ["first", "second"] {
            mailer
                .send(&EmailMessage {
                    from: "noreply@pawhaven.local".to_string(),
                    to: "alex@example.org".to_string(),
                    subject: subject.to_string(),
                    body: String::new(),
                })
                .expect("captured");
        }

        let subjects: Vec<_> = mailer
            .messages()
            .into_iter()
            .map(|message| message.subject)
            .collect();
        assert_eq!(subjects, vec!["first", "second"]);
    }
}
