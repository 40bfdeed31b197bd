use log::debug;
use reqwest::{Client, Response, header::CONTENT_TYPE};
use url::Url;

use crate::clients::{
    entities::RecordKind,
    errors::{Error, Result},
    jsonapi::{Document, JSONAPI_MEDIA_TYPE, WriteDocument},
};

/// API location used when `RARWE_API_URL` is not set
pub const DEFAULT_API_URL: &str = "http://localhost:4200";

/// HTTP client for the catalog's JSON:API backend
#[derive(Clone, Debug)]
pub struct JsonApiClient {
    http: Client,
    base_url: Url,
}

impl JsonApiClient {
    /// Client rooted at `base_url`. A trailing slash is added so that
    /// collection paths are joined below any path prefix.
    #[must_use]
    pub fn new(http: Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        JsonApiClient { http, base_url }
    }

    /// Parse `base_url` and build a client with a default `reqwest::Client`
    pub fn from_base_url(base_url: &str) -> Result<Self> {
        Ok(JsonApiClient::new(Client::new(), Url::parse(base_url)?))
    }

    /// Create a client from `RARWE_API_URL`, or fall back to the local dev server
    pub fn try_default() -> Result<Self> {
        let base_url = match std::env::var("RARWE_API_URL") {
            Ok(url) => url,
            Err(std::env::VarError::NotPresent) => DEFAULT_API_URL.to_string(),
            Err(err) => return Err(err.into()),
        };
        let client = JsonApiClient::from_base_url(&base_url).map_err(|e| {
            Error::ConfigurationError(format!("RARWE_API_URL={base_url} is not a valid URL: {e}"))
        })?;
        debug!("Using catalog API at {}", client.base_url);
        Ok(client)
    }

    /// Base URL, always ending in `/`
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/bands` or `<base>/songs`
    pub fn collection_url(&self, kind: RecordKind) -> Result<Url> {
        Ok(self.base_url.join(kind.collection_path())?)
    }

    /// `<base>/<collection>/<id>`
    pub fn member_url(&self, kind: RecordKind, id: &str) -> Result<Url> {
        let mut url = self.collection_url(kind)?;
        url.path_segments_mut()
            .map_err(|()| Error::ConfigurationError(format!("{} cannot be a base", self.base_url)))?
            .push(id);
        Ok(url)
    }

    /// Resolve a related link, which may be absolute or root-relative
    pub fn resolve(&self, link: &str) -> Result<Url> {
        Ok(self.base_url.join(link)?)
    }

    /// GET a JSON:API document
    pub async fn get_document(&self, url: Url) -> Result<Document> {
        debug!("GET {url}");
        let response = self.http.get(url).send().await?;
        read_document(response).await
    }

    /// POST a write document and read the document sent back
    pub async fn post_document(&self, url: Url, payload: &WriteDocument) -> Result<Document> {
        debug!("POST {url}");
        let response = self
            .http
            .post(url)
            .header(CONTENT_TYPE, JSONAPI_MEDIA_TYPE)
            .body(serde_json::to_vec(payload)?)
            .send()
            .await?;
        read_document(response).await
    }

    /// PATCH a write document. The response body is not read.
    pub async fn patch(&self, url: Url, payload: &WriteDocument) -> Result<()> {
        debug!("PATCH {url}");
        let response = self
            .http
            .patch(url)
            .header(CONTENT_TYPE, JSONAPI_MEDIA_TYPE)
            .body(serde_json::to_vec(payload)?)
            .send()
            .await?;
        check_status(&response)?;
        Ok(())
    }
}

fn check_status(response: &Response) -> Result<()> {
    let status = response.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(Error::Status {
            status,
            url: response.url().to_string(),
        })
    }
}

async fn read_document(response: Response) -> Result<Document> {
    check_status(&response)?;
    let body = response.bytes().await?;
    Ok(serde_json::from_slice(&body)?)
}
