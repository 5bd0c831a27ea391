// Listing server HTTP client
//
// Wraps `reqwest::Client` with URL construction, local request validation,
// and status mapping for the three listing endpoints. The session cookie is
// carried by the transport's cookie jar.

use secrecy::SecretString;
use serde::de::DeserializeOwned;
use tracing::{debug, trace};
use url::Url;

use crate::error::Error;
use crate::models::{
    DeleteListingRequest, ErrorBody, ListingRecord, MessageResponse, UpdateListingRequest,
    UpdateListingResponse,
};
use crate::transport::TransportConfig;

const LIST_PATH: &str = "api/upload";
const EDIT_PATH: &str = "api/edit";
const DELETE_PATH: &str = "api/delete";

/// Async client for the listing server.
///
/// `list_listings` is public; `update_listing` and `delete_listing` need a
/// session and are refused locally when none is configured.
pub struct ListingClient {
    http: reqwest::Client,
    base_url: Url,
    authorized: bool,
}

impl ListingClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// When a session token is given it is installed in the transport's
    /// cookie jar and the client reports itself as authorized.
    pub fn new(
        base_url: Url,
        session_token: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let base_url = normalize_base_url(base_url);
        let config = match session_token {
            Some(token) => transport.clone().with_session(&base_url, token),
            None => transport.clone(),
        };
        let http = config.build_client()?;
        Ok(Self {
            http,
            base_url,
            authorized: session_token.is_some(),
        })
    }

    /// Wrap an existing `reqwest::Client` (caller manages the session cookie).
    pub fn with_client(http: reqwest::Client, base_url: Url, authorized: bool) -> Self {
        Self {
            http,
            base_url: normalize_base_url(base_url),
            authorized,
        }
    }

    /// The server base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Whether a session is configured for mutating calls.
    pub fn is_authorized(&self) -> bool {
        self.authorized
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// Fetch the full listing collection.
    pub async fn list_listings(&self) -> Result<Vec<ListingRecord>, Error> {
        let url = self.url(LIST_PATH)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp, "listings").await
    }

    /// Update a listing with the full draft record.
    ///
    /// Returns the server's copy of the updated listing when it sends one.
    pub async fn update_listing(
        &self,
        request: &UpdateListingRequest,
    ) -> Result<Option<ListingRecord>, Error> {
        request.validate()?;
        self.require_session()?;

        let url = self.url(EDIT_PATH)?;
        debug!(listing_id = %request.id, "PUT {url}");

        let resp = self.http.put(url).json(request).send().await?;
        let body: UpdateListingResponse = self
            .handle_response(resp, &request.id)
            .await
            .map_err(session_refused)?;
        if let Some(message) = body.message {
            trace!(%message, "update acknowledged");
        }
        Ok(body.updated_listing)
    }

    /// Delete a listing by id.
    pub async fn delete_listing(&self, id: &str) -> Result<(), Error> {
        let request = DeleteListingRequest { id: id.to_owned() };
        request.validate()?;
        self.require_session()?;

        let url = self.url(DELETE_PATH)?;
        debug!(listing_id = %id, "DELETE {url}");

        let resp = self.http.delete(url).json(&request).send().await?;
        let body: MessageResponse = self
            .handle_response(resp, id)
            .await
            .map_err(session_refused)?;
        if let Some(message) = body.message {
            trace!(%message, "delete acknowledged");
        }
        Ok(())
    }

    // ── Helpers ──────────────────────────────────────────────────────

    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    fn require_session(&self) -> Result<(), Error> {
        if self.authorized {
            Ok(())
        } else {
            Err(Error::Unauthorized {
                message: "no session token configured".into(),
            })
        }
    }

    /// Map the response status, then decode the body.
    ///
    /// The server reports a missing listing as HTTP 400 with an `error`
    /// message mentioning "not found", so that shape maps to `NotFound`
    /// alongside a plain 404.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
        resource: &str,
    ) -> Result<T, Error> {
        let status = resp.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(Error::Unauthorized {
                message: format!("server refused the session (HTTP {})", status.as_u16()),
            });
        }

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                resource: resource.to_owned(),
            });
        }

        let body = resp.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.chars().take(200).collect());

            if status == reqwest::StatusCode::BAD_REQUEST
                && message.to_ascii_lowercase().contains("not found")
            {
                return Err(Error::NotFound {
                    resource: resource.to_owned(),
                });
            }

            return Err(Error::Server {
                status: status.as_u16(),
                message,
            });
        }

        serde_json::from_str(&body).map_err(|e| {
            let preview: String = body.chars().take(200).collect();
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body: body.clone(),
            }
        })
    }
}

/// The mutation routes answer a missing or expired session with a bare
/// HTTP 500 and an empty body instead of 401.
fn session_refused(err: Error) -> Error {
    match err {
        Error::Server {
            status: 500,
            ref message,
        } if message.trim().is_empty() => Error::Unauthorized {
            message: "server refused the session (HTTP 500, empty body)".into(),
        },
        other => other,
    }
}

/// Ensure the base path ends with `/` so relative joins append.
fn normalize_base_url(mut url: Url) -> Url {
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    url
}
