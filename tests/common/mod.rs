//! Shared utilities for integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use futures_util::future::BoxFuture;
use tokio::net::TcpListener;
use tokio::time::Instant;

use folio_site::contact::{MailError, Mailer, OutgoingMail};
use folio_site::lazy::{FetchError, ImageFetcher};
use folio_site::page::{Element, Rect};

/// Fetcher whose outcome per source is scripted: each source fails a set
/// number of times, then succeeds. Every attempt is recorded.
pub struct ScriptedFetcher {
    default_failures: u32,
    remaining: Mutex<HashMap<String, u32>>,
    attempts: Mutex<Vec<(String, Instant)>>,
    hang: bool,
}

impl ScriptedFetcher {
    pub fn always_ok() -> Arc<Self> {
        Arc::new(Self::with_default(0, false))
    }

    pub fn always_fail() -> Arc<Self> {
        Arc::new(Self::with_default(u32::MAX, false))
    }

    /// Every source fails `n` times before loading.
    pub fn fail_times(n: u32) -> Arc<Self> {
        Arc::new(Self::with_default(n, false))
    }

    /// Attempts never settle.
    pub fn hanging() -> Arc<Self> {
        Arc::new(Self::with_default(0, true))
    }

    fn with_default(default_failures: u32, hang: bool) -> Self {
        Self {
            default_failures,
            remaining: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
            hang,
        }
    }

    pub fn attempts(&self) -> Vec<(String, Instant)> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, source: &str) -> Vec<Instant> {
        self.attempts()
            .into_iter()
            .filter(|(s, _)| s == source)
            .map(|(_, at)| at)
            .collect()
    }
}

impl ImageFetcher for ScriptedFetcher {
    fn preload<'a>(&'a self, source: &'a str) -> BoxFuture<'a, Result<(), FetchError>> {
        Box::pin(async move {
            self.attempts.lock().unwrap().push((source.to_string(), Instant::now()));
            if self.hang {
                std::future::pending::<()>().await;
            }

            let failing = {
                let mut remaining = self.remaining.lock().unwrap();
                let left = remaining.entry(source.to_string()).or_insert(self.default_failures);
                if *left > 0 {
                    *left = left.saturating_sub(1);
                    true
                } else {
                    false
                }
            };

            if failing {
                Err(FetchError::Status { url: source.to_string(), status: 503 })
            } else {
                Ok(())
            }
        })
    }
}

/// Mailer that records messages instead of sending them.
#[derive(Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<OutgoingMail>>,
    pub fail: bool,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl Mailer for RecordingMailer {
    fn send<'a>(&'a self, mail: &'a OutgoingMail) -> BoxFuture<'a, Result<(), MailError>> {
        Box::pin(async move {
            self.sent.lock().unwrap().push(mail.clone());
            if self.fail {
                Err(MailError::Io(std::io::Error::other("relay refused")))
            } else {
                Ok(())
            }
        })
    }
}

/// A deferred image 100x100 at vertical offset `y`.
pub fn lazy_img(source: &str, y: f64) -> Element {
    Element::new("img")
        .with_class("lazy-image")
        .with_attr("data-src", source)
        .with_bounds(Rect::new(0.0, y, 100.0, 100.0))
}

/// Serve `router` on an ephemeral local port.
pub async fn serve(router: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
