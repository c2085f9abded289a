//! OAuth2 client-credentials client with lazy, single-flight token refresh.
//!
//! Responsibilities:
//! - Exchange client credentials for a bearer token and store it.
//! - Decide staleness with a safety margin so a token cannot lapse between
//!   the check and the request that uses it.
//! - Refresh on demand before an authorized request. There is no background
//!   timer; an idle client does no work.
//! - Coordinate concurrent refreshes: the first caller to see a stale token
//!   fetches, the rest subscribe to that exchange and receive its outcome,
//!   success or failure.
use crate::ClientCredentials;
use planetrack_types::{
    MissingExpiryPolicy, Token, TokenResponse, TokenStore, TrackerError,
    error::{Result, truncate_body},
    token::{DEFAULT_EXPIRY_MARGIN_SECS, unix_now},
};
use reqwest::{Client, Method, Response, header::AUTHORIZATION};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::broadcast;

/// Outcome of one token exchange, as delivered to every caller waiting on it.
type RefreshOutcome = std::result::Result<Arc<Token>, Arc<TrackerError>>;

/// Sender for the exchange currently in flight, if any.
type InFlight = Mutex<Option<broadcast::Sender<RefreshOutcome>>>;

enum Role {
    Leader(broadcast::Sender<RefreshOutcome>),
    Waiter(broadcast::Receiver<RefreshOutcome>),
}

pub struct OAuth2Client {
    credentials: ClientCredentials,
    store: Arc<dyn TokenStore>,
    http: Client,
    /// Set while an exchange is running; never locked across an await.
    in_flight: InFlight,
    margin_secs: u64,
    missing_expiry: MissingExpiryPolicy,
}

impl OAuth2Client {
    /// Creates a client that stores its token in `store` and talks over `http`.
    ///
    /// `http` should carry a request timeout; the client adds none of its own.
    pub fn new(credentials: ClientCredentials, store: Arc<dyn TokenStore>, http: Client) -> Self {
        Self {
            credentials,
            store,
            http,
            in_flight: Mutex::new(None),
            margin_secs: DEFAULT_EXPIRY_MARGIN_SECS,
            missing_expiry: MissingExpiryPolicy::default(),
        }
    }

    #[must_use]
    pub fn with_expiry_margin(mut self, margin_secs: u64) -> Self {
        self.margin_secs = margin_secs;
        self
    }

    #[must_use]
    pub fn with_missing_expiry(mut self, policy: MissingExpiryPolicy) -> Self {
        self.missing_expiry = policy;
        self
    }

    /// The HTTP client shared with gateways built on this client.
    #[must_use]
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Snapshot of the stored token, stale or not.
    #[must_use]
    pub fn current_token(&self) -> Option<Arc<Token>> {
        self.store.get()
    }

    /// Exchange the client credentials for a new token and store it.
    ///
    /// The store is only written once the full response has been received
    /// and parsed, so a cancelled or failed exchange leaves it untouched.
    ///
    /// # Errors
    ///
    /// - [`TrackerError::UpstreamUnavailable`] if the endpoint cannot be reached.
    /// - [`TrackerError::UpstreamAuth`] on a non-2xx response.
    /// - [`TrackerError::Validation`] if the body is not a token response.
    pub async fn fetch_token(&self) -> Result<Token> {
        let resp = self
            .http
            .post(&self.credentials.token_url)
            .form(&self.credentials.form_params())
            .send()
            .await
            .map_err(|e| {
                TrackerError::UpstreamUnavailable(format!("token endpoint unreachable: {e}"))
            })?;

        let status = resp.status();
        if !status.is_success() {
            let body = truncate_body(&resp.text().await.unwrap_or_default());
            tracing::warn!(
                status = status.as_u16(),
                client_id = %self.credentials.client_id,
                "token endpoint rejected client credentials"
            );
            return Err(TrackerError::UpstreamAuth {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        let payload: TokenResponse = serde_json::from_slice(&bytes)
            .map_err(|e| TrackerError::Validation(format!("malformed token response: {e}")))?;
        let token = payload.into_token(unix_now());

        tracing::info!(
            expires_in = ?token.expires_in,
            token_type = %token.token_type,
            "access token obtained"
        );
        self.store.set(token.clone());
        Ok(token)
    }

    /// Returns `true` if no token is stored or the stored one is stale
    /// under the configured margin.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_margin(self.margin_secs)
    }

    /// Same as [`Self::is_expired`] with an explicit margin in seconds.
    #[must_use]
    pub fn is_expired_with_margin(&self, margin_secs: u64) -> bool {
        self.store.get().is_none_or(|token| {
            token.is_expired_at(unix_now(), margin_secs, self.missing_expiry)
        })
    }

    /// Make sure a usable token is stored, fetching one if needed.
    ///
    /// Concurrent callers that find the token stale share one exchange and
    /// all receive its outcome.
    ///
    /// # Errors
    ///
    /// Propagates any [`Self::fetch_token`] error.
    pub async fn ensure_valid_token(&self) -> Result<()> {
        self.valid_token().await.map(|_| ())
    }

    async fn valid_token(&self) -> Result<Arc<Token>> {
        loop {
            if let Some(token) = self.fresh_token() {
                return Ok(token);
            }

            let role = {
                let mut slot = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
                match slot.as_ref() {
                    Some(tx) => Role::Waiter(tx.subscribe()),
                    None => {
                        // An exchange may have finished since the first check.
                        if let Some(token) = self.fresh_token() {
                            return Ok(token);
                        }
                        let (tx, _) = broadcast::channel(1);
                        *slot = Some(tx.clone());
                        Role::Leader(tx)
                    }
                }
            };

            match role {
                Role::Leader(tx) => return self.lead_refresh(&tx).await,
                Role::Waiter(mut rx) => match rx.recv().await {
                    Ok(outcome) => {
                        tracing::debug!("reusing outcome of a concurrent token refresh");
                        return outcome.map_err(|e| replay(&e));
                    }
                    // The leading caller was cancelled; start over.
                    Err(_) => continue,
                },
            }
        }
    }

    async fn lead_refresh(&self, tx: &broadcast::Sender<RefreshOutcome>) -> Result<Arc<Token>> {
        let mut slot = SlotGuard {
            in_flight: &self.in_flight,
            armed: true,
        };
        tracing::debug!("token missing or stale, fetching a new one");
        let outcome: RefreshOutcome = self.fetch_token().await.map(Arc::new).map_err(Arc::new);

        // Clear before publishing so late arrivals re-check the store.
        slot.clear();
        let _ = tx.send(outcome.clone());
        outcome.map_err(|e| replay(&e))
    }

    fn fresh_token(&self) -> Option<Arc<Token>> {
        self.store
            .get()
            .filter(|t| !t.is_expired_at(unix_now(), self.margin_secs, self.missing_expiry))
    }

    /// Issue a request with `Authorization: Bearer <token>`, refreshing the
    /// token first when it is stale.
    ///
    /// The response is returned as-is; the caller inspects its status.
    /// Nothing is retried.
    ///
    /// # Errors
    ///
    /// - Any [`Self::fetch_token`] error while refreshing.
    /// - [`TrackerError::UpstreamUnavailable`] on connection failure or timeout.
    pub async fn authorized_request(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<Response> {
        let token = self.valid_token().await?;

        let mut builder = self
            .http
            .request(method, url)
            .header(AUTHORIZATION, token.authorization_value());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Ok(builder.send().await?)
    }

    /// `GET` shorthand for [`Self::authorized_request`].
    ///
    /// # Errors
    ///
    /// See [`Self::authorized_request`].
    pub async fn authorized_get(&self, url: &str, query: &[(&str, String)]) -> Result<Response> {
        self.authorized_request(Method::GET, url, query).await
    }
}

/// Empties the in-flight slot when the leading exchange ends, including when
/// its future is dropped, so waiters see the channel close and retry.
struct SlotGuard<'a> {
    in_flight: &'a InFlight,
    armed: bool,
}

impl SlotGuard<'_> {
    fn clear(&mut self) {
        if self.armed {
            self.in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take();
            self.armed = false;
        }
    }
}

impl Drop for SlotGuard<'_> {
    fn drop(&mut self) {
        self.clear();
    }
}

/// Rebuild a shared refresh error for one waiting caller.
fn replay(err: &TrackerError) -> TrackerError {
    match err {
        TrackerError::UpstreamAuth { status, body } => TrackerError::UpstreamAuth {
            status: *status,
            body: body.clone(),
        },
        TrackerError::UpstreamUnavailable(msg) => TrackerError::UpstreamUnavailable(msg.clone()),
        TrackerError::Upstream { status, body } => TrackerError::Upstream {
            status: *status,
            body: body.clone(),
        },
        TrackerError::InvalidArgument(msg) => TrackerError::InvalidArgument(msg.clone()),
        TrackerError::Storage(msg) => TrackerError::Storage(msg.clone()),
        TrackerError::Config(msg) => TrackerError::Config(msg.clone()),
        TrackerError::NotFound(msg) => TrackerError::NotFound(msg.clone()),
        TrackerError::Validation(msg) => TrackerError::Validation(msg.clone()),
        TrackerError::Serialization(e) => TrackerError::Validation(e.to_string()),
    }
}
