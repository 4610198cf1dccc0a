use std::sync::Arc;
use std::time::Duration;

use myverse_core::config::ApiConfig;
use myverse_core::routes::Navigator;
use myverse_core::session::{Credential, SessionEvent, SessionStore};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{extract_message, ApiError};

/// Plain `{"message": "..."}` acknowledgement.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Message {
    #[serde(default)]
    pub message: String,
}

/// Shared HTTP client with the session interceptor.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
    session: Arc<SessionStore>,
    navigator: Navigator,
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        timeout: Duration,
        session: Arc<SessionStore>,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: sanitize_base_url(base_url.into())?,
            http,
            session,
            navigator,
        })
    }

    pub fn from_config(
        config: &ApiConfig,
        session: Arc<SessionStore>,
        navigator: Navigator,
    ) -> Result<Self, ApiError> {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.timeout_secs),
            session,
            navigator,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Resolve an endpoint path (e.g. `/auth/me`) against the base URL.
    pub fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!(
            "{}/{}",
            self.base_url,
            path.trim_start_matches('/')
        ))?)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::GET, path)?).await
    }

    pub async fn get_query<T, Q>(&self, path: &str, query: &Q) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.execute(self.request(Method::GET, path)?.query(query))
            .await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::POST, path)?.json(body))
            .await
    }

    /// POST without attaching the session credential.
    ///
    /// Used for login and registration: a rejection there must not expire
    /// whatever session is currently active.
    pub async fn post_public<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(self.request(Method::POST, path)?.json(body), None)
            .await
    }

    /// POST without a body (accept/reject style actions).
    pub async fn post_empty<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::POST, path)?).await
    }

    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.execute(self.request(Method::PUT, path)?.json(body))
            .await
    }

    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        self.execute(self.request(Method::DELETE, path)?).await
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.http.request(method, self.url(path)?))
    }

    /// Attach the credential, send, and map the response.
    ///
    /// A 401 on a request that carried a credential is reported to the
    /// session as an expiry of the epoch the credential belonged to.
    async fn execute<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, ApiError> {
        self.send(req, self.session.credential()).await
    }

    async fn send<T: DeserializeOwned>(
        &self,
        req: RequestBuilder,
        credential: Option<Credential>,
    ) -> Result<T, ApiError> {
        let req = match &credential {
            Some(c) => req.bearer_auth(&c.token),
            None => req,
        };
        let request = req.build()?;
        let method = request.method().clone();
        let path = request.url().path().to_string();
        tracing::debug!(%method, %path, authenticated = credential.is_some(), "API request");

        let resp = self.http.execute(request).await?;
        let status = resp.status();

        if status.is_success() {
            let body = resp.text().await?;
            let body = if body.trim().is_empty() { "null" } else { &body };
            return serde_json::from_str(body).map_err(|e| {
                tracing::warn!(%method, %path, error = %e, "undecodable API response");
                ApiError::Parse(e.to_string())
            });
        }

        let status = status.as_u16();
        let body = resp.text().await.unwrap_or_default();
        let message = extract_message(&body);

        if status == 401 {
            if let Some(c) = credential {
                let transition = self.session.dispatch(SessionEvent::Expired { epoch: c.epoch });
                if let Some(route) = transition.navigate {
                    self.navigator.navigate(route);
                }
            }
            return Err(ApiError::Unauthorized(message));
        }

        tracing::warn!(status, %method, %path, %message, "MyVerse API error");
        Err(ApiError::Api { status, message })
    }
}

fn sanitize_base_url(mut base: String) -> Result<String, ApiError> {
    base = base.trim().to_string();
    if !base.starts_with("http://") && !base.starts_with("https://") {
        base = format!("http://{base}");
    }
    while base.ends_with('/') {
        base.pop();
    }
    Url::parse(&base)?;
    Ok(base)
}

#[cfg(test)]
mod tests {
    use super::*;
    use myverse_core::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        let session = Arc::new(SessionStore::new(Arc::new(MemoryStore::new())));
        ApiClient::new(base, Duration::from_secs(1), session, Navigator::default()).unwrap()
    }

    #[test]
    fn test_url_keeps_base_path() {
        let c = client("http://localhost:5000/api/");
        assert_eq!(c.base_url(), "http://localhost:5000/api");
        assert_eq!(
            c.url("/auth/me").unwrap().as_str(),
            "http://localhost:5000/api/auth/me"
        );
        assert_eq!(
            c.url("forum/posts/3/comments").unwrap().as_str(),
            "http://localhost:5000/api/forum/posts/3/comments"
        );
    }

    #[test]
    fn test_scheme_is_added() {
        let c = client("api.myverse.test");
        assert_eq!(c.base_url(), "http://api.myverse.test");
    }
}
