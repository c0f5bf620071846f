//! Main BubbleClient

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use url::Url;

use crate::error::ApiError;
use crate::error::ConfigError;
use crate::error::Error;

/// The main client for the Bubble.io Data API.
///
/// This client is cheap to clone (uses `Arc` internally) and can be shared
/// across threads safely. Configuration is immutable once built.
///
/// # Example
///
/// ```ignore
/// use bubble_lib::BubbleClient;
///
/// let client = BubbleClient::builder()
///     .api_root("https://appname.bubbleapps.io/api/1.1/obj")
///     .api_key("xxxxxxxxxxxxxxxxxxxxxxxxxxxxxx")
///     .build()?;
///
/// let page = client.list("fooType").send().await?;
/// ```
#[derive(Clone)]
pub struct BubbleClient {
    inner: Arc<BubbleClientInner>,
}

struct BubbleClientInner {
    api_root: String,
    api_key: String,
    http_client: Client,
    timeout: Option<Duration>,
}

impl BubbleClient {
    /// Creates a new builder for constructing a client.
    pub fn builder() -> BubbleClientBuilder<Missing, Missing> {
        BubbleClientBuilder::new()
    }

    /// Returns the configured API root.
    pub fn api_root(&self) -> &str {
        &self.inner.api_root
    }

    /// Composes the endpoint URL for a collection type.
    pub(crate) fn type_url(&self, type_name: &str) -> String {
        format!(
            "{}/{}",
            self.inner.api_root.trim_end_matches('/'),
            type_name
        )
    }

    /// Makes an authenticated GET request and validates the response status.
    ///
    /// This is the low-level request method used by all read operations.
    /// A non-success status is always surfaced as [`ApiError::Http`] with
    /// the status code and body.
    pub(crate) async fn get(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<reqwest::Response, Error> {
        let mut request = self
            .inner
            .http_client
            .get(url)
            .bearer_auth(&self.inner.api_key)
            .query(query);

        if let Some(timeout) = self.inner.timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(ApiError::from)?;

        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(Error::Api(ApiError::http(status.as_u16(), body)))
        }
    }
}

impl std::fmt::Debug for BubbleClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BubbleClient")
            .field("api_root", &self.inner.api_root)
            .finish()
    }
}

// =============================================================================
// Typestate Builder
// =============================================================================

/// Marker type for missing required builder fields.
pub struct Missing;

/// Marker type for set builder fields.
pub struct Set<T>(T);

/// Builder for constructing a [`BubbleClient`].
///
/// Uses the typestate pattern to ensure required fields are set at compile
/// time.
///
/// # Required Fields
///
/// - `api_root` - The Data API root URL, generally
///   `https://appname.bubbleapps.io/api/1.1/obj`
/// - `api_key` - The app's API token (`Settings > API` in the Bubble editor)
///
/// # Example
///
/// ```ignore
/// let client = BubbleClient::builder()
///     .api_root("https://appname.bubbleapps.io/api/1.1/obj")
///     .api_key(api_key)
///     .timeout(Duration::from_secs(30))
///     .build()?;
/// ```
pub struct BubbleClientBuilder<Root, Key> {
    api_root: Root,
    api_key: Key,
    timeout: Option<Duration>,
    connect_timeout: Option<Duration>,
    http_client: Option<Client>,
}

impl BubbleClientBuilder<Missing, Missing> {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            api_root: Missing,
            api_key: Missing,
            timeout: None,
            connect_timeout: None,
            http_client: None,
        }
    }
}

impl Default for BubbleClientBuilder<Missing, Missing> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> BubbleClientBuilder<Missing, K> {
    /// Sets the Data API root URL.
    pub fn api_root(self, root: impl Into<String>) -> BubbleClientBuilder<Set<String>, K> {
        BubbleClientBuilder {
            api_root: Set(root.into()),
            api_key: self.api_key,
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<R> BubbleClientBuilder<R, Missing> {
    /// Sets the API key used for bearer authentication.
    pub fn api_key(self, key: impl Into<String>) -> BubbleClientBuilder<R, Set<String>> {
        BubbleClientBuilder {
            api_root: self.api_root,
            api_key: Set(key.into()),
            timeout: self.timeout,
            connect_timeout: self.connect_timeout,
            http_client: self.http_client,
        }
    }
}

impl<R, K> BubbleClientBuilder<R, K> {
    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the connection timeout.
    ///
    /// This is applied when building the HTTP client.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    /// Sets a custom HTTP client.
    ///
    /// If not set, a default client will be created.
    pub fn http_client(mut self, client: Client) -> Self {
        self.http_client = Some(client);
        self
    }
}

impl BubbleClientBuilder<Set<String>, Set<String>> {
    /// Builds the [`BubbleClient`].
    ///
    /// This method is only available when both `api_root` and `api_key` have
    /// been set. The root is validated as an absolute HTTP(S) URL; an invalid
    /// root fails here with [`ConfigError::InvalidRoot`], before any network
    /// call.
    pub fn build(self) -> Result<BubbleClient, ConfigError> {
        let root = self.api_root.0;
        let parsed = Url::parse(&root).map_err(|e| ConfigError::InvalidRoot {
            root: root.clone(),
            message: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidRoot {
                root,
                message: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let http_client = self.http_client.unwrap_or_else(|| {
            let mut builder = Client::builder();
            if let Some(timeout) = self.connect_timeout {
                builder = builder.connect_timeout(timeout);
            }
            builder.build().expect("Failed to build HTTP client")
        });

        Ok(BubbleClient {
            inner: Arc::new(BubbleClientInner {
                api_root: root,
                api_key: self.api_key.0,
                http_client,
                timeout: self.timeout,
            }),
        })
    }
}
