//! HTTP client for the `OnlyConfig` REST API.
//!
//! Every call follows one response convention:
//!
//! - `401` → [`ConsoleError::Unauthorized`]
//! - any other non-`200` → [`ConsoleError::RequestFailed`] with the status
//! - `200` → JSON body; absent list/result fields read as empty
//! - transport failure → [`ConsoleError::RequestFailed`] without status
//!
//! Nothing is retried.

use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::endpoint::ApiEndpoint;
use crate::error::ConsoleError;
use crate::session::SessionStore;
use crate::types::{
    Application, ConfigureDetail, ConfigureKey, ContentType, EnvDcKind, EnvDcRegistry, Id,
    NamespaceConfigures, NamespaceType, NewUser, Organization, null_as_empty,
};

const JSON_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Auth {
    Bearer,
    Anonymous,
}

// --- Response envelopes ---

#[derive(Deserialize, Default)]
struct TokenResponse {
    #[serde(default)]
    token: String,
}

#[derive(Deserialize, Default)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ListEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    list: Vec<T>,
}

#[derive(Deserialize, Default)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
struct ResultListEnvelope<T> {
    #[serde(default = "Vec::new", deserialize_with = "null_as_empty")]
    result: Vec<T>,
}

#[derive(Deserialize, Default)]
struct ResultEnvelope<T> {
    #[serde(default = "Option::default")]
    result: Option<T>,
}

/// Authenticated client for one backend origin.
///
/// The bearer token is read from the [`SessionStore`] on every request, so a
/// login or logout is picked up without rebuilding the client.
#[derive(Debug, Clone)]
pub struct OnlyConfigClient {
    http: reqwest::Client,
    endpoint: ApiEndpoint,
    session: SessionStore,
}

impl OnlyConfigClient {
    /// Create a client for `endpoint` that authenticates from `session`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsoleError::RequestFailed`] if the HTTP client cannot be
    /// built (TLS backend initialization).
    pub fn new(endpoint: ApiEndpoint, session: SessionStore) -> Result<Self, ConsoleError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("onlyconfig-console/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint,
            session,
        })
    }

    pub fn endpoint(&self) -> &ApiEndpoint {
        &self.endpoint
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    // --- User ---

    /// `POST /auth/user/login`: returns the issued token.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Unauthorized`] for bad credentials; see module docs
    /// for the rest.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, ConsoleError> {
        let body = json!({ "username": username, "password": password });
        let resp: TokenResponse = self
            .call(Method::POST, "/auth/user/login", Some(body), Auth::Anonymous)
            .await?;
        Ok(resp.token)
    }

    /// `POST /user/new_user`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn register(&self, user: &NewUser) -> Result<(), ConsoleError> {
        let body = serde_json::to_value(user)?;
        self.send(Method::POST, "/user/new_user", Some(body), Auth::Anonymous)
            .await
            .map(drop)
    }

    /// `POST /user/change_password`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn change_password(&self, old: &str, new: &str) -> Result<(), ConsoleError> {
        let body = json!({ "old": old, "new": new });
        self.send(Method::POST, "/user/change_password", Some(body), Auth::Bearer)
            .await
            .map(drop)
    }

    /// `GET /user/organizations`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn organizations(&self) -> Result<Vec<Organization>, ConsoleError> {
        let resp: ResultListEnvelope<Organization> = self.get("/user/organizations").await?;
        Ok(resp.result)
    }

    /// `PUT /organization/{org}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn create_organization(&self, org: &str) -> Result<(), ConsoleError> {
        let path = format!("/organization/{}", seg(org));
        self.put(&path, None).await
    }

    /// `PUT /organization/{org}/owner/{username}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn add_organization_owner(&self, org: &str, username: &str) -> Result<(), ConsoleError> {
        let path = format!("/organization/{}/owner/{}", seg(org), seg(username));
        self.put(&path, None).await
    }

    // --- Environments, datacenters, applications ---

    /// `GET /configures/env_dc_list`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn env_dc_list(&self) -> Result<EnvDcRegistry, ConsoleError> {
        self.get("/configures/env_dc_list").await
    }

    /// `PUT /configures/env_and_dc/{type}/{name}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn register_env_dc(&self, kind: EnvDcKind, name: &str) -> Result<(), ConsoleError> {
        let path = format!("/configures/env_and_dc/{}/{}", kind.as_str(), seg(name));
        self.put(&path, None).await
    }

    /// `GET /configures/applications`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn applications(&self) -> Result<Vec<Application>, ConsoleError> {
        let resp: ListEnvelope<Application> = self.get("/configures/applications").await?;
        Ok(resp.list)
    }

    /// `PUT /configures/application/{org}/{app}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn create_application(&self, org_id: &Id, app_name: &str) -> Result<(), ConsoleError> {
        let path = format!(
            "/configures/application/{}/{}",
            seg(org_id.as_str()),
            seg(app_name)
        );
        self.put(&path, None).await
    }

    /// `PUT /configures/application/{app_id}/{env}/{dc}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn attach_env_dc(&self, app_id: &Id, env: &str, dc: &str) -> Result<(), ConsoleError> {
        let path = format!(
            "/configures/application/{}/{}/{}",
            seg(app_id.as_str()),
            seg(env),
            seg(dc)
        );
        self.put(&path, None).await
    }

    // --- Namespaces and configuration entries ---

    /// `GET /configures/namespaces/{app_id}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn namespaces(&self, app_id: &Id) -> Result<Vec<String>, ConsoleError> {
        let path = format!("/configures/namespaces/{}", seg(app_id.as_str()));
        let resp: ResultListEnvelope<String> = self.get(&path).await?;
        Ok(resp.result)
    }

    /// `PUT /configures/namespace/{app_id}/{name}/{type}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn create_namespace(
        &self,
        app_id: &Id,
        name: &str,
        kind: NamespaceType,
    ) -> Result<(), ConsoleError> {
        let path = format!(
            "/configures/namespace/{}/{}/{}",
            seg(app_id.as_str()),
            seg(name),
            kind.as_str()
        );
        self.put(&path, None).await
    }

    /// `GET /configures/configure_list/{app_id}/{env}/{dc}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn configure_list(
        &self,
        app_id: &Id,
        env: &str,
        dc: &str,
    ) -> Result<Vec<NamespaceConfigures>, ConsoleError> {
        let path = format!(
            "/configures/configure_list/{}/{}/{}",
            seg(app_id.as_str()),
            seg(env),
            seg(dc)
        );
        let resp: ResultListEnvelope<NamespaceConfigures> = self.get(&path).await?;
        Ok(resp.result)
    }

    /// `POST /configures/configure/{app_id}/{env}/{dc}/{ns}/{key}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn create_configure(
        &self,
        key: &ConfigureKey,
        content_type: ContentType,
        content: &str,
    ) -> Result<(), ConsoleError> {
        let path = format!(
            "/configures/configure/{}/{}/{}/{}/{}",
            seg(key.app_id.as_str()),
            seg(&key.env),
            seg(&key.dc),
            seg(&key.namespace),
            seg(&key.key)
        );
        let body = json!({ "content_type": content_type.as_str(), "content": content });
        self.send(Method::POST, &path, Some(body), Auth::Bearer)
            .await
            .map(drop)
    }

    /// `GET /configures/configure/{configure_id}`. A missing `result` reads
    /// as an empty entry.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn configure(&self, configure_id: &Id) -> Result<ConfigureDetail, ConsoleError> {
        let path = format!("/configures/configure/{}", seg(configure_id.as_str()));
        let resp: ResultEnvelope<ConfigureDetail> = self.get(&path).await?;
        Ok(resp.result.unwrap_or_default())
    }

    /// `PUT /configures/configure/{configure_id}`.
    ///
    /// # Errors
    ///
    /// See module docs.
    pub async fn update_configure(
        &self,
        configure_id: &Id,
        content_type: ContentType,
        content: &str,
    ) -> Result<(), ConsoleError> {
        let path = format!("/configures/configure/{}", seg(configure_id.as_str()));
        let body = json!({ "ct": content_type.as_str(), "content": content });
        self.put(&path, Some(body)).await
    }

    // --- Private ---

    async fn get<T: DeserializeOwned + Default>(&self, path: &str) -> Result<T, ConsoleError> {
        self.call(Method::GET, path, None, Auth::Bearer).await
    }

    async fn put(&self, path: &str, body: Option<Value>) -> Result<(), ConsoleError> {
        self.send(Method::PUT, path, body, Auth::Bearer).await.map(drop)
    }

    async fn call<T: DeserializeOwned + Default>(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<T, ConsoleError> {
        let text = self.send(method, path, body, auth).await?;
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        Ok(serde_json::from_str(&text)?)
    }

    /// Send one request and return the body of a `200` answer.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
        auth: Auth,
    ) -> Result<String, ConsoleError> {
        let url = self.endpoint.build_url(path);
        let mut req = self
            .http
            .request(method.clone(), url.as_str())
            .header(reqwest::header::CONTENT_TYPE, JSON_CONTENT_TYPE);

        if auth == Auth::Bearer {
            req = req.bearer_auth(self.session.token());
        }
        if let Some(ref b) = body {
            req = req.body(b.to_string());
        }

        let resp = req.send().await.map_err(|e| {
            warn!(%method, %url, error = %e, "request did not complete");
            ConsoleError::from(e)
        })?;
        let status = resp.status();
        debug!(%method, %url, status = status.as_u16(), "request finished");

        if status == StatusCode::UNAUTHORIZED {
            return Err(ConsoleError::Unauthorized);
        }
        if status != StatusCode::OK {
            warn!(%method, %url, status = status.as_u16(), "unexpected status");
            return Err(ConsoleError::http(status.as_u16()));
        }

        Ok(resp.text().await?)
    }
}

/// Percent-encode one path segment.
fn seg(s: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(s)
}
