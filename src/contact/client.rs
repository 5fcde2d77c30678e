//! Client side of the contact form: posts submissions and reports results.

use std::sync::Arc;

use url::Url;

use crate::contact::feedback::FormFeedback;
use crate::contact::form::RawSubmission;
use crate::contact::loading::LoadingStateManager;
use crate::contact::response::ContactResponse;

pub type ResponseCallback = Box<dyn Fn(&ContactResponse) + Send + Sync>;

pub struct ContactClient {
    http: reqwest::Client,
    endpoint: Url,
    loading: Arc<LoadingStateManager>,
    feedback: Option<Arc<FormFeedback>>,
    on_success: ResponseCallback,
    on_error: ResponseCallback,
}

impl ContactClient {
    pub fn new(endpoint: Url) -> Self {
        Self {
            http: reqwest::Client::new(),
            endpoint,
            loading: Arc::new(LoadingStateManager::new()),
            feedback: None,
            on_success: Box::new(|response: &ContactResponse| {
                tracing::info!(message = %response.message, "Contact form submitted");
            }),
            on_error: Box::new(|response: &ContactResponse| {
                tracing::warn!(errors = %response.error_summary(), "Contact form submission failed");
            }),
        }
    }

    pub fn with_loading_state(mut self, loading: Arc<LoadingStateManager>) -> Self {
        self.loading = loading;
        self
    }

    /// Mark fields valid/invalid from the reply and reset the form on success.
    pub fn with_feedback(mut self, feedback: Arc<FormFeedback>) -> Self {
        self.feedback = Some(feedback);
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&ContactResponse) + Send + Sync + 'static) -> Self {
        self.on_success = Box::new(callback);
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&ContactResponse) + Send + Sync + 'static) -> Self {
        self.on_error = Box::new(callback);
        self
    }

    pub fn loading_state(&self) -> &Arc<LoadingStateManager> {
        &self.loading
    }

    /// Submit `fields` for `form_id`.
    ///
    /// Returns `None` if that form already has a submission in flight.
    /// Transport or decoding failures become a single network error.
    pub async fn submit(&self, form_id: &str, fields: &RawSubmission) -> Option<ContactResponse> {
        if !self.loading.try_start(form_id) {
            tracing::debug!(form_id, "Submission already in flight");
            return None;
        }

        let response = match self.post(fields).await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(form_id, error = %e, "Contact endpoint unreachable");
                ContactResponse::network_error()
            }
        };

        if response.success {
            if let Some(feedback) = &self.feedback {
                feedback.reset(form_id);
            }
            (self.on_success)(&response);
        } else {
            if let Some(feedback) = &self.feedback {
                feedback.apply(form_id, &response);
            }
            (self.on_error)(&response);
        }

        self.loading.stop_loading(form_id);
        Some(response)
    }

    async fn post(&self, fields: &RawSubmission) -> Result<ContactResponse, reqwest::Error> {
        self.http
            .post(self.endpoint.clone())
            .form(fields)
            .send()
            .await?
            .json::<ContactResponse>()
            .await
    }
}
