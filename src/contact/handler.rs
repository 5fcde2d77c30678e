//! Axum extractor and handler for the contact endpoint.

use axum::{
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Form, Json,
};

use crate::contact::form::RawSubmission;
use crate::contact::response::{ContactResponse, ERR_MALFORMED};
use crate::http::server::AppState;

/// Form fields from either a urlencoded or a multipart body.
pub struct ContactForm(pub RawSubmission);

type Rejection = (StatusCode, Json<ContactResponse>);

fn reject(detail: String) -> Rejection {
    tracing::debug!(detail = %detail, "Unreadable contact submission");
    (
        StatusCode::BAD_REQUEST,
        Json(ContactResponse::failed(vec![ERR_MALFORMED.to_string()])),
    )
}

impl<S> FromRequest<S> for ContactForm
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        if !is_multipart {
            let Form(raw) = Form::<RawSubmission>::from_request(req, state)
                .await
                .map_err(|e| reject(e.body_text()))?;
            return Ok(Self(raw));
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| reject(e.body_text()))?;

        let mut raw = RawSubmission::default();
        while let Some(field) = multipart.next_field().await.map_err(|e| reject(e.body_text()))? {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };
            let value = field.text().await.map_err(|e| reject(e.body_text()))?;
            raw.set_field(&name, value);
        }
        Ok(Self(raw))
    }
}

/// `POST {contact.endpoint_path}`
pub async fn submit_contact(
    State(state): State<AppState>,
    ContactForm(raw): ContactForm,
) -> Json<ContactResponse> {
    Json(state.contact.submit(&raw).await)
}
