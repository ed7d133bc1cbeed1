//! JIRA API client implementation.
//!
//! This module provides the session-owning client that mediates every call to
//! the JIRA REST API. It builds resource URLs, attaches the current credential,
//! encodes request bodies, decodes response bodies into [`Record`]s and turns
//! transport failures into [`JiraError`]s.

use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, instrument, warn};

use super::auth::{AuthFailure, AuthResult, BasicAuth, Credential, LoginRequest, SessionCookie, SessionState};
use super::error::{JiraError, Result};
use super::record::{kind_of, Record};
use super::transport::{
    HttpRequest, HttpResponse, Method, ReqwestTransport, Transport, TransportError,
    DEFAULT_TIMEOUT_SECS,
};
use crate::cache::FieldCache;

/// The only REST API version this client speaks.
pub const DEFAULT_API_VERSION: &str = "2";

/// API versions accepted by [`JiraClient::new`].
const KNOWN_API_VERSIONS: &[&str] = &[DEFAULT_API_VERSION];

/// Default number of items requested per page.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Connection settings for a [`JiraClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// The JIRA instance URL, e.g. `https://jira.example.com`.
    pub base_url: String,
    /// REST API version, `"2"`.
    pub api_version: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Page size used when enumerating search results.
    pub page_size: usize,
}

impl ClientConfig {
    /// Settings for `base_url` with every other value at its default.
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    pub fn with_api_version(mut self, api_version: &str) -> Self {
        self.api_version = api_version.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }
}

/// A decoded response body.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// No body, `null`, or a bare scalar.
    Empty,
    /// A single JSON object.
    Record(Record),
    /// A JSON array of objects.
    List(Vec<Record>),
}

impl Payload {
    /// The single record, if the body was an object.
    pub fn into_record(self) -> Option<Record> {
        match self {
            Payload::Record(record) => Some(record),
            _ => None,
        }
    }

    /// The list of records, if the body was an array.
    pub fn into_records(self) -> Option<Vec<Record>> {
        match self {
            Payload::List(records) => Some(records),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Empty => true,
            Payload::Record(record) => record.is_empty(),
            Payload::List(records) => records.is_empty(),
        }
    }

    /// Encode the payload back to compact JSON text; `Empty` encodes as `""`.
    pub fn to_json_string(&self) -> String {
        match self {
            Payload::Empty => String::new(),
            Payload::Record(record) => record.to_json_string(),
            Payload::List(records) => {
                Value::Array(records.iter().cloned().map(Value::from).collect()).to_string()
            }
        }
    }
}

/// The JIRA API client.
///
/// Owns the session credential and the cached field catalog. One client is
/// meant to be driven by one logical caller at a time; the credential is
/// behind a lock so sharing a client across tasks is still sound.
pub struct JiraClient {
    transport: Arc<dyn Transport>,
    base_url: String,
    api_version: String,
    page_size: usize,
    credential: RwLock<Option<Credential>>,
    pub(crate) fields: FieldCache,
}

impl JiraClient {
    /// Create an anonymous client that talks HTTP through `reqwest`.
    ///
    /// Call [`login`](Self::login) before making authenticated requests.
    ///
    /// # Errors
    ///
    /// Returns [`JiraError::Config`] if the API version is unknown or the HTTP
    /// client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.timeout)
            .map_err(|e| JiraError::Config(format!("failed to build HTTP client: {}", e)))?;
        Self::with_transport(config, Arc::new(transport))
    }

    /// Create an anonymous client on top of an arbitrary [`Transport`].
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        if !KNOWN_API_VERSIONS.contains(&config.api_version.as_str()) {
            return Err(JiraError::Config(format!(
                "unknown JIRA API version: {}",
                config.api_version
            )));
        }
        if config.page_size == 0 {
            return Err(JiraError::Config("page size must be at least 1".to_string()));
        }

        Ok(Self {
            transport,
            base_url: normalize_base_url(&config.base_url),
            api_version: config.api_version,
            page_size: config.page_size,
            credential: RwLock::new(None),
            fields: FieldCache::new(),
        })
    }

    /// Authenticate every request with HTTP Basic credentials instead of a session.
    pub fn with_basic_auth(self, username: &str, secret: &str) -> Self {
        self.set_credential(Some(Credential::Basic(BasicAuth::new(username, secret))));
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Page size used by the search enumerators.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// The URL used to log in and out.
    pub fn auth_url(&self) -> String {
        format!("{}/rest/auth/1/session", self.base_url)
    }

    /// The full URL of a REST resource, e.g. `issue/TST-1`.
    pub fn rest_url(&self, subpath: &str) -> String {
        format!(
            "{}/rest/api/{}/{}",
            self.base_url,
            self.api_version,
            subpath.trim_start_matches('/')
        )
    }

    /// Resolve a request path: absolute URLs are used as-is, anything else is
    /// treated as a REST subpath.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            self.rest_url(path)
        }
    }

    pub fn state(&self) -> SessionState {
        if self.read_credential().is_some() {
            SessionState::Authenticated
        } else {
            SessionState::Anonymous
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }

    /// Log in with a username and password.
    ///
    /// On success the session cookie returned by the server is attached to
    /// every later request. Rejected credentials and unreachable servers leave
    /// the client anonymous and are reported through the returned value.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> AuthResult {
        self.set_credential(None);

        let body = serde_json::to_string(&LoginRequest { username, password })
            .map_err(|e| AuthFailure::MalformedSession(e.to_string()))?;
        let request = HttpRequest {
            method: Method::Post,
            url: self.auth_url(),
            headers: Vec::new(),
            body: Some(body),
        };

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Login failed, server unreachable: {}", e);
            AuthFailure::Unreachable(e.to_string())
        })?;

        if !response.is_success() {
            warn!(status = response.status, "Login rejected");
            return Err(AuthFailure::Rejected {
                status: response.status,
            });
        }

        let cookie = SessionCookie::from_login_response(&response.body)?;
        self.set_credential(Some(Credential::Session(cookie)));
        info!("Logged in");
        Ok(())
    }

    /// Log out, invalidating the server-side session.
    ///
    /// The client is anonymous afterwards whatever the server answers; the
    /// returned value only reports whether the server acknowledged the logout.
    #[instrument(skip(self))]
    pub async fn logout(&self) -> AuthResult {
        let credential = self.take_credential();

        if let Some(Credential::Basic(_)) = credential {
            info!("Dropped basic credentials");
            return Ok(());
        }

        let headers = credential
            .iter()
            .map(|c| {
                let (name, value) = c.header();
                (name.to_string(), value)
            })
            .collect();
        let request = HttpRequest {
            method: Method::Delete,
            url: self.auth_url(),
            headers,
            body: None,
        };

        let response = self.transport.send(request).await.map_err(|e| {
            warn!("Logout could not reach server: {}", e);
            AuthFailure::Unreachable(e.to_string())
        })?;

        if response.is_success() {
            info!("Logged out");
            Ok(())
        } else {
            warn!(status = response.status, "Logout rejected");
            Err(AuthFailure::Rejected {
                status: response.status,
            })
        }
    }

    /// `GET` a resource.
    pub async fn get(&self, path: &str) -> Result<Payload> {
        self.request(Method::Get, path, None).await
    }

    /// `GET` a resource with query parameters.
    pub async fn get_with_query(&self, path: &str, query: &[(&str, &str)]) -> Result<Payload> {
        if query.is_empty() {
            return self.get(path).await;
        }
        let encoded: Vec<String> = query
            .iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
            .collect();
        let separator = if path.contains('?') { '&' } else { '?' };
        let path = format!("{}{}{}", path, separator, encoded.join("&"));
        self.get(&path).await
    }

    /// `POST` a JSON body to a resource.
    pub async fn post(&self, path: &str, body: &Value) -> Result<Payload> {
        self.request(Method::Post, path, Some(body)).await
    }

    /// `PUT` a JSON body to a resource.
    pub async fn put(&self, path: &str, body: &Value) -> Result<Payload> {
        self.request(Method::Put, path, Some(body)).await
    }

    /// `DELETE` a resource.
    pub async fn delete(&self, path: &str) -> Result<Payload> {
        self.request(Method::Delete, path, None).await
    }

    /// `GET` a single resource, telling absence apart from other failures.
    ///
    /// JIRA reports some missing resources as a 200 whose body is empty or an
    /// `errorMessages` envelope, and others as a plain 404. All of these become
    /// `not_found()`; every other failure propagates unchanged.
    pub(crate) async fn lookup<F>(&self, path: &str, not_found: F) -> Result<Record>
    where
        F: FnOnce() -> JiraError,
    {
        match self.get(path).await {
            Ok(Payload::Record(record)) if !record.is_empty() && !record.has("errorMessages") => {
                Ok(record)
            }
            Ok(_) => {
                debug!(path, "Resource absent from response body");
                Err(not_found())
            }
            Err(e) if e.status() == Some(404) => Err(not_found()),
            Err(e) => Err(e),
        }
    }

    /// Send one request and decode the answer.
    #[instrument(skip(self, body), fields(method = %method))]
    async fn request(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Payload> {
        let mut headers = Vec::new();
        if let Some(credential) = self.read_credential() {
            let (name, value) = credential.header();
            headers.push((name.to_string(), value));
        }

        let request = HttpRequest {
            method,
            url: self.url_for(path),
            headers,
            body: body.map(Value::to_string),
        };
        debug!(url = %request.url, "Request");

        let response = self
            .transport
            .send(request)
            .await
            .map_err(|e| translate_transport_error(method, path, e))?;

        Self::handle_response(method, path, response)
    }

    /// Check the status and decode the body of a response.
    fn handle_response(method: Method, path: &str, response: HttpResponse) -> Result<Payload> {
        if !response.is_success() {
            debug!(status = response.status, "Error response body: {}", response.body);
            return Err(JiraError::from_status(
                method,
                path,
                response.status,
                &response.body,
            ));
        }
        decode_payload(&response.body)
    }

    fn read_credential(&self) -> Option<Credential> {
        self.credential
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_credential(&self, credential: Option<Credential>) {
        *self
            .credential
            .write()
            .unwrap_or_else(PoisonError::into_inner) = credential;
    }

    fn take_credential(&self) -> Option<Credential> {
        self.credential
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl fmt::Debug for JiraClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JiraClient")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

fn translate_transport_error(method: Method, path: &str, err: TransportError) -> JiraError {
    warn!("{} {} failed: {}", method, path, err);
    match err {
        TransportError::Timeout => JiraError::Timeout {
            method,
            path: path.to_string(),
        },
        other => JiraError::RequestFailed {
            method,
            path: path.to_string(),
            status: None,
            message: other.to_string(),
        },
    }
}

/// Decode a response body into a [`Payload`].
///
/// Objects become a record, arrays of objects a list of records. Empty bodies,
/// `null` and bare scalars carry nothing usable and decode to `Empty`.
pub(crate) fn decode_payload(body: &str) -> Result<Payload> {
    if body.trim().is_empty() {
        return Ok(Payload::Empty);
    }

    let value: Value =
        serde_json::from_str(body).map_err(|e| JiraError::decode(e.to_string(), body))?;

    match value {
        Value::Object(map) => Ok(Payload::Record(Record::from(map))),
        Value::Array(items) => {
            let mut records = Vec::with_capacity(items.len());
            for item in items {
                match item {
                    Value::Object(map) => records.push(Record::from(map)),
                    other => {
                        return Err(JiraError::decode(
                            format!("expected an array of objects, found {}", kind_of(&other)),
                            body,
                        ))
                    }
                }
            }
            Ok(Payload::List(records))
        }
        _ => Ok(Payload::Empty),
    }
}

/// Normalize the base URL: assume `http://` when no scheme is given and
/// remove trailing slashes.
pub(crate) fn normalize_base_url(url: &str) -> String {
    let url = url.trim().trim_end_matches('/');
    let url = if url.starts_with("https://") || url.starts_with("http://") {
        url.to_string()
    } else {
        format!("http://{}", url)
    };

    // Warn if not HTTPS (but don't enforce for localhost/testing)
    if !url.starts_with("https://") && !url.contains("localhost") && !url.contains("127.0.0.1") {
        warn!("URL does not use HTTPS: {}. This is insecure for production use.", url);
    }

    url
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::api::testing::ScriptedTransport;

    fn client(transport: &Arc<ScriptedTransport>) -> JiraClient {
        JiraClient::with_transport(
            ClientConfig::new("http://localhost:8080"),
            transport.clone(),
        )
        .unwrap()
    }

    const LOGIN_OK: &str = r#"{"session": {"name": "JSESSIONID", "value": "abc123"}}"#;

    #[test]
    fn test_normalize_base_url_removes_trailing_slash() {
        assert_eq!(
            normalize_base_url("https://company.atlassian.net/"),
            "https://company.atlassian.net"
        );
        assert_eq!(
            normalize_base_url("https://company.atlassian.net///"),
            "https://company.atlassian.net"
        );
    }

    #[test]
    fn test_normalize_base_url_prepends_scheme() {
        assert_eq!(normalize_base_url("jira.example.com"), "http://jira.example.com");
        assert_eq!(
            normalize_base_url("https://jira.example.com/jira/"),
            "https://jira.example.com/jira"
        );
    }

    #[test]
    fn test_rest_and_auth_urls() {
        let client = JiraClient::with_transport(
            ClientConfig::new("jira.example.com"),
            ScriptedTransport::new(),
        )
        .unwrap();
        assert_eq!(client.auth_url(), "http://jira.example.com/rest/auth/1/session");
        assert_eq!(
            client.rest_url("issue"),
            "http://jira.example.com/rest/api/2/issue"
        );
        assert_eq!(
            client.url_for("/issue/TST-1"),
            "http://jira.example.com/rest/api/2/issue/TST-1"
        );
        assert_eq!(
            client.url_for("https://other.example.com/rest/api/2/field"),
            "https://other.example.com/rest/api/2/field"
        );
    }

    #[test]
    fn test_unknown_api_version_rejected() {
        let result = JiraClient::with_transport(
            ClientConfig::new("jira.example.com").with_api_version("1.0"),
            ScriptedTransport::new(),
        );
        assert!(matches!(result, Err(JiraError::Config(_))));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let result = JiraClient::with_transport(
            ClientConfig::new("jira.example.com").with_page_size(0),
            ScriptedTransport::new(),
        );
        assert!(matches!(result, Err(JiraError::Config(_))));
    }

    #[test]
    fn test_decode_payload_shapes() {
        assert_eq!(decode_payload("").unwrap(), Payload::Empty);
        assert_eq!(decode_payload("  \n").unwrap(), Payload::Empty);
        assert_eq!(decode_payload("null").unwrap(), Payload::Empty);

        let record = decode_payload(r#"{"key": "TST-1"}"#).unwrap().into_record().unwrap();
        assert_eq!(record.get_str("key"), Some("TST-1"));

        let list = decode_payload(r#"[{"id": "a"}, {"id": "b"}]"#)
            .unwrap()
            .into_records()
            .unwrap();
        assert_eq!(list.len(), 2);

        assert!(matches!(
            decode_payload("[1, 2]"),
            Err(JiraError::Decode { .. })
        ));
        assert!(matches!(
            decode_payload("{oops"),
            Err(JiraError::Decode { raw, .. }) if raw == "{oops"
        ));
    }

    #[tokio::test]
    async fn test_login_attaches_session_cookie() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "/rest/auth/1/session", 200, LOGIN_OK);
        transport.respond(Method::Get, "/rest/api/2/field", 200, "[]");
        let client = client(&transport);

        assert_eq!(client.state(), SessionState::Anonymous);
        client.login("user", "password").await.unwrap();
        assert_eq!(client.state(), SessionState::Authenticated);

        client.get("field").await.unwrap();

        let requests = transport.requests();
        let login_body: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(login_body, json!({"username": "user", "password": "password"}));
        assert_eq!(requests[0].header("cookie"), None);
        assert_eq!(requests[1].header("cookie"), Some("JSESSIONID=abc123"));
    }

    #[tokio::test]
    async fn test_login_rejected_stays_anonymous() {
        let transport = ScriptedTransport::new();
        transport.respond(
            Method::Post,
            "/rest/auth/1/session",
            401,
            r#"{"errorMessages": ["Login failed"], "errors": {}}"#,
        );
        let client = client(&transport);

        let result = client.login("bogus", "bogus").await;
        assert_eq!(result, Err(AuthFailure::Rejected { status: 401 }));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_unreachable_stays_anonymous() {
        let transport = ScriptedTransport::new();
        transport.fail(
            Method::Post,
            "/rest/auth/1/session",
            TransportError::Connect("refused".to_string()),
        );
        let client = client(&transport);

        let result = client.login("user", "password").await;
        assert!(matches!(result, Err(AuthFailure::Unreachable(_))));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_failed_relogin_drops_previous_session() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "/rest/auth/1/session", 200, LOGIN_OK);
        transport.respond(Method::Post, "/rest/auth/1/session", 401, "");
        let client = client(&transport);

        client.login("user", "password").await.unwrap();
        assert!(client.login("user", "wrong").await.is_err());
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_sends_cookie_and_clears_state() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "/rest/auth/1/session", 200, LOGIN_OK);
        transport.respond(Method::Delete, "/rest/auth/1/session", 204, "");
        let client = client(&transport);

        client.login("user", "password").await.unwrap();
        client.logout().await.unwrap();

        assert!(!client.is_authenticated());
        assert_eq!(
            transport.requests()[1].header("cookie"),
            Some("JSESSIONID=abc123")
        );
    }

    #[tokio::test]
    async fn test_logout_unreachable_still_clears_state() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Post, "/rest/auth/1/session", 200, LOGIN_OK);
        transport.fail(Method::Delete, "/rest/auth/1/session", TransportError::Timeout);
        let client = client(&transport);

        client.login("user", "password").await.unwrap();
        let result = client.logout().await;
        assert!(matches!(result, Err(AuthFailure::Unreachable(_))));
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn test_logout_without_session_is_rejected() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Delete, "/rest/auth/1/session", 401, "");
        let client = client(&transport);

        assert_eq!(
            client.logout().await,
            Err(AuthFailure::Rejected { status: 401 })
        );
    }

    #[tokio::test]
    async fn test_basic_auth_header_and_local_logout() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Get, "/rest/api/2/field", 200, "[]");
        let client = client(&transport).with_basic_auth("user", "token");

        assert!(client.is_authenticated());
        client.get("field").await.unwrap();
        assert!(transport.requests()[0]
            .header("authorization")
            .unwrap()
            .starts_with("Basic "));

        client.logout().await.unwrap();
        assert!(!client.is_authenticated());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_error_status_becomes_request_failed() {
        let transport = ScriptedTransport::new();
        transport.respond(
            Method::Post,
            "/rest/api/2/search",
            400,
            r#"{"errorMessages": ["Error in the JQL Query"], "errors": {}}"#,
        );
        let client = client(&transport);

        let err = client.post("search", &json!({"jql": "((("})).await.unwrap_err();
        match err {
            JiraError::RequestFailed {
                method,
                path,
                status,
                message,
            } => {
                assert_eq!(method, Method::Post);
                assert_eq!(path, "search");
                assert_eq!(status, Some(400));
                assert_eq!(message, "Error in the JQL Query");
            }
            other => panic!("Expected RequestFailed, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_timeout_is_reported_distinctly() {
        let transport = ScriptedTransport::new();
        transport.fail(Method::Get, "/rest/api/2/issue/TST-1", TransportError::Timeout);
        let client = client(&transport);

        let err = client.get("issue/TST-1").await.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(transport.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_connection_failure_becomes_request_failed() {
        let transport = ScriptedTransport::new();
        transport.fail(
            Method::Get,
            "/rest/api/2/field",
            TransportError::Connect("refused".to_string()),
        );
        let client = client(&transport);

        let err = client.get("field").await.unwrap_err();
        assert!(matches!(
            err,
            JiraError::RequestFailed { status: None, .. }
        ));
    }

    #[tokio::test]
    async fn test_put_encodes_body_and_absolute_url() {
        let transport = ScriptedTransport::new();
        transport.respond(Method::Put, "https://elsewhere.example.com/custom", 204, "");
        let client = client(&transport);

        let payload = client
            .put("https://elsewhere.example.com/custom", &json!({"a": 1}))
            .await
            .unwrap();
        assert!(payload.is_empty());

        let request = &transport.requests()[0];
        assert_eq!(request.url, "https://elsewhere.example.com/custom");
        assert_eq!(request.body.as_deref(), Some(r#"{"a":1}"#));
    }

    #[tokio::test]
    async fn test_lookup_detects_absence_structurally() {
        let transport = ScriptedTransport::new();
        transport.respond(
            Method::Get,
            "/rest/api/2/issue/BOGUS-1",
            200,
            r#"{"errorMessages": ["Issue Does Not Exist"], "errors": {}}"#,
        );
        transport.respond(Method::Get, "/rest/api/2/issue/BOGUS-2", 200, "");
        transport.respond(Method::Get, "/rest/api/2/issue/BOGUS-3", 404, "");
        transport.respond(Method::Get, "/rest/api/2/issue/TST-1", 500, "oops");
        let client = client(&transport);

        for key in ["BOGUS-1", "BOGUS-2", "BOGUS-3"] {
            let err = client
                .lookup(&format!("issue/{}", key), || JiraError::IssueNotFound(key.to_string()))
                .await
                .unwrap_err();
            assert!(matches!(err, JiraError::IssueNotFound(k) if k == key));
        }

        let err = client
            .lookup("issue/TST-1", || JiraError::IssueNotFound("TST-1".to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_get_with_query_encodes_parameters() {
        let transport = ScriptedTransport::new();
        transport.respond(
            Method::Get,
            "/rest/api/2/issue/createmeta?expand=projects.issuetypes.fields&projectKeys=A%20B",
            200,
            "{}",
        );
        let client = client(&transport);

        client
            .get_with_query(
                "issue/createmeta",
                &[("expand", "projects.issuetypes.fields"), ("projectKeys", "A B")],
            )
            .await
            .unwrap();
    }
}
