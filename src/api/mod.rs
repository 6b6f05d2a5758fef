//! MaterialsApi trait: the boundary between the controller and the backend.
//!
//! Two implementations: [`http::HttpMaterialsApi`] talks to the REST backend,
//! [`in_memory::InMemoryMaterialsApi`] keeps records in-process.

pub mod http;
pub mod in_memory;

use async_trait::async_trait;

use crate::error::ApiError;
use crate::models::{Material, MaterialDraft, MaterialId};

pub use http::HttpMaterialsApi;
pub use in_memory::InMemoryMaterialsApi;

pub type Result<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait MaterialsApi: Send + Sync {
    /// GET /materials/{id}
    async fn fetch_one(&self, id: &MaterialId) -> Result<Material>;

    /// GET /materials, in server order
    async fn fetch_all(&self) -> Result<Vec<Material>>;

    /// POST /materials; returns the record with its final identifier
    async fn create(&self, draft: &MaterialDraft) -> Result<Material>;

    /// PUT /materials/{id}
    async fn update(&self, material: &Material) -> Result<()>;

    /// DELETE /materials/{id}
    async fn delete(&self, id: &MaterialId) -> Result<()>;
}

/// A server call requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiRequest {
    FetchOne(MaterialId),
    FetchAll,
    Create(MaterialDraft),
    Update(Material),
    Delete(MaterialId),
}

/// Payload of a successful [`ApiRequest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiResponse {
    Material(Material),
    Materials(Vec<Material>),
    Created(Material),
    Updated,
    Deleted,
}

impl ApiRequest {
    pub fn kind(&self) -> &'static str {
        match self {
            ApiRequest::FetchOne(_) => "fetch_one",
            ApiRequest::FetchAll => "fetch_all",
            ApiRequest::Create(_) => "create",
            ApiRequest::Update(_) => "update",
            ApiRequest::Delete(_) => "delete",
        }
    }

    /// Run this request against an API implementation
    pub async fn execute(&self, api: &dyn MaterialsApi) -> Result<ApiResponse> {
        match self {
            ApiRequest::FetchOne(id) => api.fetch_one(id).await.map(ApiResponse::Material),
            ApiRequest::FetchAll => api.fetch_all().await.map(ApiResponse::Materials),
            ApiRequest::Create(draft) => api.create(draft).await.map(ApiResponse::Created),
            ApiRequest::Update(material) => api.update(material).await.map(|_| ApiResponse::Updated),
            ApiRequest::Delete(id) => api.delete(id).await.map(|_| ApiResponse::Deleted),
        }
    }
}

pub(crate) fn ensure_id(id: &MaterialId) -> Result<()> {
    if id.is_empty() {
        return Err(ApiError::EmptyIdentifier);
    }
    Ok(())
}
