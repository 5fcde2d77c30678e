//! Contact submission handling: sanitize, validate, deliver.

use std::sync::Arc;

use uuid::Uuid;

use crate::config::ContactConfig;
use crate::contact::form::RawSubmission;
use crate::contact::mailer::{Mailer, OutgoingMail};
use crate::contact::response::{ContactResponse, ERR_DELIVERY};
use crate::observability::metrics;

pub struct ContactService {
    config: ContactConfig,
    x_mailer: String,
    mailer: Arc<dyn Mailer>,
}

impl ContactService {
    pub fn new(config: ContactConfig, x_mailer: String, mailer: Arc<dyn Mailer>) -> Self {
        Self { config, x_mailer, mailer }
    }

    pub fn config(&self) -> &ContactConfig {
        &self.config
    }

    /// Never fails: validation and delivery problems end up in the
    /// response's error list.
    pub async fn submit(&self, raw: &RawSubmission) -> ContactResponse {
        let submission = raw.sanitize();

        if let Err(errors) = submission.validate(self.config.max_message_length) {
            metrics::record_submission("invalid");
            tracing::info!(errors = ?errors, "Contact submission rejected");
            return ContactResponse::failed(errors);
        }

        let submission_id = Uuid::new_v4();
        let mail = OutgoingMail::compose(&submission, &self.config.admin_email, &self.x_mailer, submission_id);

        match self.mailer.send(&mail).await {
            Ok(()) => {
                metrics::record_submission("sent");
                tracing::info!(submission_id = %submission_id, "Contact message sent");
                ContactResponse::sent()
            }
            Err(e) => {
                metrics::record_submission("delivery_failed");
                tracing::error!(submission_id = %submission_id, error = %e, "Contact message delivery failed");
                ContactResponse::failed(vec![ERR_DELIVERY.to_string()])
            }
        }
    }
}
