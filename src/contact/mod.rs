//! Contact form subsystem.
//!
//! # Data Flow
//! ```text
//! POST (urlencoded or multipart)
//!     → handler.rs (extract fields)
//!     → form.rs (trim, strip tags, validate)
//!     → service.rs (compose + deliver via mailer.rs)
//!     → response.rs ({ success, message, errors })
//!
//! client.rs posts the same fields, guards duplicate submissions
//! through loading.rs and reflects the reply on the form via feedback.rs.
//! ```

pub mod client;
pub mod feedback;
pub mod form;
pub mod handler;
pub mod loading;
pub mod mailer;
pub mod response;
pub mod service;

pub use client::ContactClient;
pub use feedback::FormFeedback;
pub use form::{ContactSubmission, RawSubmission};
pub use loading::LoadingStateManager;
pub use mailer::{mailer_from_config, LogMailer, MailError, Mailer, OutgoingMail, SendmailMailer};
pub use response::ContactResponse;
pub use service::ContactService;
