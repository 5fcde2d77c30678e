//! Contact endpoint over HTTP, in-process and through the client.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;
use url::Url;

use folio_site::config::SiteConfig;
use folio_site::contact::form::{ERR_EMAIL_INVALID, ERR_MESSAGE_TOO_LONG, ERR_NAME_REQUIRED};
use folio_site::contact::feedback::{INVALID_CLASS, VALID_CLASS};
use folio_site::contact::loading::LOADING_CLASS;
use folio_site::contact::response::{ERR_DELIVERY, ERR_MALFORMED, ERR_NETWORK, MSG_SENT};
use folio_site::contact::{ContactClient, ContactResponse, FormFeedback, LoadingStateManager, RawSubmission};
use folio_site::page::{Document, Element};
use folio_site::HttpServer;

mod common;
use common::{serve, RecordingMailer};

fn app(mailer: Arc<RecordingMailer>) -> Router {
    HttpServer::with_mailer(SiteConfig::default(), mailer).router()
}

fn urlencoded(body: &str) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn valid_fields() -> RawSubmission {
    RawSubmission {
        name: "Ada".into(),
        email: "ada@folio.dev".into(),
        project: "Portfolio refresh".into(),
        message: "Hello there".into(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, ContactResponse) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_valid_urlencoded_submission_is_sent() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = send(
        app(mailer.clone()),
        urlencoded("name=Ada&email=ada%40folio.dev&project=Site&message=%3Cb%3EHi%3C%2Fb%3E+%26+bye"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.success);
    assert_eq!(body.message, MSG_SENT);
    assert!(body.errors.is_empty());

    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, "admin@example.com");
    assert!(sent[0].body.contains("Hi &amp; bye"));
    assert!(!sent[0].body.contains("<b>"));
}

#[tokio::test]
async fn test_invalid_fields_are_reported_and_not_sent() {
    let mailer = Arc::new(RecordingMailer::default());
    let (status, body) = send(
        app(mailer.clone()),
        urlencoded("name=%3Cp%3E%3C%2Fp%3E&email=not-an-email&project=Site&message=Hi"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.success);
    assert_eq!(body.errors, vec![ERR_NAME_REQUIRED, ERR_EMAIL_INVALID]);
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_message_length_limit_is_inclusive() {
    let mailer = Arc::new(RecordingMailer::default());

    let at_limit = format!("name=Ada&email=ada%40folio.dev&project=Site&message={}", "a".repeat(3000));
    let (_, body) = send(app(mailer.clone()), urlencoded(&at_limit)).await;
    assert!(body.success, "{body:?}");

    let over = format!("name=Ada&email=ada%40folio.dev&project=Site&message={}", "a".repeat(3001));
    let (_, body) = send(app(mailer.clone()), urlencoded(&over)).await;
    assert!(!body.success);
    assert_eq!(body.errors, vec![ERR_MESSAGE_TOO_LONG]);
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_multipart_submission_is_sent() {
    let mailer = Arc::new(RecordingMailer::default());
    let boundary = "folioBoundary";
    let mut body = String::new();
    for (name, value) in [
        ("name", "Grace"),
        ("email", "grace@folio.dev"),
        ("project", "Compiler docs"),
        ("message", "Line one\nLine two"),
        ("website", "ignored"),
    ] {
        body.push_str(&format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!("--{boundary}--\r\n"));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/contact")
        .header(header::CONTENT_TYPE, format!("multipart/form-data; boundary={boundary}"))
        .body(Body::from(body))
        .unwrap();
    let (status, response) = send(app(mailer.clone()), request).await;

    assert_eq!(status, StatusCode::OK);
    assert!(response.success, "{response:?}");
    let sent = mailer.sent.lock().unwrap();
    assert!(sent[0].body.contains("Grace"));
    assert!(sent[0].body.contains("Compiler docs"));
}

#[tokio::test]
async fn test_delivery_failure_is_reported() {
    let mailer = Arc::new(RecordingMailer {
        fail: true,
        ..Default::default()
    });
    let (status, body) = send(
        app(mailer.clone()),
        urlencoded("name=Ada&email=ada%40folio.dev&project=Site&message=Hi"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.success);
    assert_eq!(body.errors, vec![ERR_DELIVERY]);
}

#[tokio::test]
async fn test_unreadable_body_is_rejected() {
    let mailer = Arc::new(RecordingMailer::default());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/contact")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"name":"Ada"}"#))
        .unwrap();
    let (status, body) = send(app(mailer.clone()), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!body.success);
    assert_eq!(body.errors, vec![ERR_MALFORMED]);
    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_get_is_not_allowed() {
    let response = app(Arc::new(RecordingMailer::default()))
        .oneshot(Request::builder().uri("/contact").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_health_sets_request_id_and_security_headers() {
    let response = app(Arc::new(RecordingMailer::default()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("x-request-id"));
    assert_eq!(response.headers()[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
}

#[tokio::test]
async fn test_client_reports_success_and_clears_loading_state() {
    let mailer = Arc::new(RecordingMailer::default());
    let addr = serve(app(mailer.clone())).await;

    let document = Document::new();
    let form = Element::new("form").with_attr("id", "contact-form");
    document.append_child(document.body(), form.clone());
    let loading = Arc::new(LoadingStateManager::with_document(document));

    let busy_during_callback = Arc::new(AtomicBool::new(false));
    let errors = Arc::new(AtomicUsize::new(0));
    let client = {
        let busy = busy_during_callback.clone();
        let watched = form.clone();
        let errors = errors.clone();
        ContactClient::new(Url::parse(&format!("http://{addr}/contact")).unwrap())
            .with_loading_state(loading.clone())
            .on_success(move |_| busy.store(watched.has_class(LOADING_CLASS), Ordering::SeqCst))
            .on_error(move |_| {
                errors.fetch_add(1, Ordering::SeqCst);
            })
    };

    let response = client.submit("contact-form", &valid_fields()).await.unwrap();
    assert!(response.success);
    assert!(busy_during_callback.load(Ordering::SeqCst));
    assert_eq!(errors.load(Ordering::SeqCst), 0);
    assert!(!loading.is_loading("contact-form"));
    assert!(!form.has_class(LOADING_CLASS));
    assert_eq!(form.attr("aria-busy").as_deref(), Some("false"));
    assert_eq!(mailer.sent_count(), 1);
}

#[tokio::test]
async fn test_client_ignores_duplicate_submission() {
    let mailer = Arc::new(RecordingMailer::default());
    let addr = serve(app(mailer.clone())).await;
    let client = ContactClient::new(Url::parse(&format!("http://{addr}/contact")).unwrap());

    assert!(client.loading_state().try_start("contact-form"));
    assert!(client.submit("contact-form", &valid_fields()).await.is_none());
    assert_eq!(mailer.sent_count(), 0);

    client.loading_state().stop_loading("contact-form");
    assert!(client.submit("contact-form", &valid_fields()).await.unwrap().success);
}

#[tokio::test]
async fn test_client_reports_unreachable_endpoint() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let failures = Arc::new(AtomicUsize::new(0));
    let seen = failures.clone();
    let client = ContactClient::new(Url::parse(&format!("http://{addr}/contact")).unwrap())
        .on_error(move |response| {
            assert_eq!(response.error_summary(), ERR_NETWORK);
            seen.fetch_add(1, Ordering::SeqCst);
        });

    let response = client.submit("contact-form", &valid_fields()).await.unwrap();
    assert_eq!(response, ContactResponse::network_error());
    assert_eq!(failures.load(Ordering::SeqCst), 1);
    assert!(!client.loading_state().is_loading("contact-form"));
}

#[tokio::test]
async fn test_client_marks_fields_and_resets_form() {
    let mailer = Arc::new(RecordingMailer::default());
    let addr = serve(app(mailer.clone())).await;

    let document = Document::new();
    let form = Element::new("form").with_attr("id", "contact-form");
    let mut inputs = Vec::new();
    for (tag, name, value) in [
        ("input", "name", "Jo"),
        ("input", "email", "bad-email"),
        ("input", "project", "Site"),
        ("textarea", "message", "hi"),
    ] {
        let input = Element::new(tag).with_attr("name", name).with_attr("value", value);
        form.append_child(input.clone());
        inputs.push(input);
    }
    document.append_child(document.body(), form);
    let [name, email, project, message] = <[Element; 4]>::try_from(inputs).unwrap();

    let feedback = Arc::new(FormFeedback::new(document));
    let client = ContactClient::new(Url::parse(&format!("http://{addr}/contact")).unwrap())
        .with_feedback(feedback.clone());

    let fields = feedback.read("contact-form").unwrap();
    let response = client.submit("contact-form", &fields).await.unwrap();
    assert_eq!(response.errors, vec![ERR_EMAIL_INVALID]);
    assert!(email.has_class(INVALID_CLASS));
    for valid in [&name, &project, &message] {
        assert!(valid.has_class(VALID_CLASS));
    }
    assert_eq!(mailer.sent_count(), 0);

    email.set_attr("value", "jo@folio.dev");
    let fields = feedback.read("contact-form").unwrap();
    assert!(client.submit("contact-form", &fields).await.unwrap().success);
    assert_eq!(mailer.sent_count(), 1);
    for input in [&name, &email, &project, &message] {
        assert_eq!(input.attr("value").as_deref(), Some(""));
        assert!(!input.has_class(INVALID_CLASS));
        assert!(!input.has_class(VALID_CLASS));
    }
}
