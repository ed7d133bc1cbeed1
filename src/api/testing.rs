//! In-memory transport for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::transport::{HttpRequest, HttpResponse, Method, Transport, TransportError};

struct Scripted {
    method: Method,
    url_suffix: String,
    reply: Result<HttpResponse, TransportError>,
}

/// A [`Transport`] that answers from a queue of scripted replies, in order,
/// and records every request it sees.
///
/// A request that does not match the next scripted method and URL suffix
/// panics, which fails the calling test.
#[derive(Default)]
pub(crate) struct ScriptedTransport {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a response for the next request.
    pub(crate) fn respond(&self, method: Method, url_suffix: &str, status: u16, body: &str) {
        self.push(method, url_suffix, Ok(HttpResponse::new(status, body)));
    }

    /// Queue a transport failure for the next request.
    pub(crate) fn fail(&self, method: Method, url_suffix: &str, err: TransportError) {
        self.push(method, url_suffix, Err(err));
    }

    /// Every request sent so far.
    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Number of scripted replies not yet consumed.
    pub(crate) fn remaining(&self) -> usize {
        self.script.lock().unwrap().len()
    }

    fn push(&self, method: Method, url_suffix: &str, reply: Result<HttpResponse, TransportError>) {
        self.script.lock().unwrap().push_back(Scripted {
            method,
            url_suffix: url_suffix.to_string(),
            reply,
        });
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        self.requests.lock().unwrap().push(request.clone());

        let next = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("unexpected request: {} {}", request.method, request.url));

        assert_eq!(
            next.method, request.method,
            "wrong method for {}",
            request.url
        );
        assert!(
            request.url.ends_with(&next.url_suffix),
            "expected URL ending in {}, got {}",
            next.url_suffix,
            request.url
        );

        next.reply
    }
}
