//! The JSON body returned by the contact endpoint.

use serde::{Deserialize, Serialize};

pub const MSG_SENT: &str = "Message sent successfully!";
pub const MSG_FAILED: &str = "Error occurred";
pub const ERR_DELIVERY: &str = "Error sending the message. Please try again later.";
pub const ERR_NETWORK: &str = "Network error occurred. Please try again.";
pub const ERR_MALFORMED: &str = "Invalid form submission";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactResponse {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub errors: Vec<String>,
}

impl ContactResponse {
    pub fn sent() -> Self {
        Self {
            success: true,
            message: MSG_SENT.to_string(),
            errors: Vec::new(),
        }
    }

    pub fn failed(errors: Vec<String>) -> Self {
        Self {
            success: false,
            message: MSG_FAILED.to_string(),
            errors,
        }
    }

    /// What a client reports when the endpoint could not be reached.
    pub fn network_error() -> Self {
        Self::failed(vec![ERR_NETWORK.to_string()])
    }

    /// Errors joined one per line, or a generic message if there are none.
    pub fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            "An error occurred".to_string()
        } else {
            self.errors.join("\n")
        }
    }
}
