//! HTTP client for the materials REST backend

use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use tracing::{debug, warn};
use url::Url;

use super::{ensure_id, MaterialsApi, Result};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::models::{
    ErrorPayload, Material, MaterialDraft, MaterialEnvelope, MaterialId, MaterialsEnvelope,
};

const MATERIALS_PATH: &str = "materials";

/// Materials API client over reqwest
#[derive(Clone)]
pub struct HttpMaterialsApi {
    http: Client,
    base_url: Url,
}

impl HttpMaterialsApi {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn collection_url(&self) -> Result<Url> {
        Ok(self.base_url.join(MATERIALS_PATH)?)
    }

    fn item_url(&self, id: &MaterialId) -> Result<Url> {
        ensure_id(id)?;
        let mut url = self.collection_url()?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl {
                message: format!("{} cannot be a base URL", self.base_url),
            })?
            .push(id.as_str());
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, path = url.path(), "materials request");
        self.http
            .request(method, url)
            .header("Accept", "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let messages = serde_json::from_str::<ErrorPayload>(&body)
            .map(|payload| payload.messages())
            .unwrap_or_default();

        warn!(
            status = status.as_u16(),
            first_message = messages.first().map(String::as_str),
            "materials request rejected"
        );

        Err(ApiError::Rejected {
            status: status.as_u16(),
            messages,
        })
    }
}

#[async_trait]
impl MaterialsApi for HttpMaterialsApi {
    async fn fetch_one(&self, id: &MaterialId) -> Result<Material> {
        let url = self.item_url(id)?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let envelope: MaterialEnvelope = response.json().await?;
        Ok(envelope.material)
    }

    async fn fetch_all(&self) -> Result<Vec<Material>> {
        let url = self.collection_url()?;
        let response = self.send(self.request(Method::GET, url)).await?;
        let envelope: MaterialsEnvelope = response.json().await?;
        Ok(envelope.materials)
    }

    async fn create(&self, draft: &MaterialDraft) -> Result<Material> {
        let url = self.collection_url()?;
        let response = self
            .send(self.request(Method::POST, url).json(draft))
            .await?;
        let envelope: MaterialEnvelope = response.json().await?;
        Ok(envelope.material)
    }

    async fn update(&self, material: &Material) -> Result<()> {
        let url = self.item_url(&material.id)?;
        self.send(self.request(Method::PUT, url).json(material))
            .await?;
        Ok(())
    }

    async fn delete(&self, id: &MaterialId) -> Result<()> {
        let url = self.item_url(id)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
