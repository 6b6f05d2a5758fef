//! In-process materials backend
//!
//! Behaves like the REST backend (server-assigned ids, field validation,
//! `{ errors }`-style rejections) without a network. Failures can be queued
//! with [`InMemoryMaterialsApi::fail_next`] and every call is recorded, which
//! makes it the backend of choice for controller and session tests.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use tracing::debug;

use super::{ensure_id, ApiRequest, MaterialsApi, Result};
use crate::error::ApiError;
use crate::models::{Material, MaterialDraft, MaterialId};

const VALIDATION_STATUS: u16 = 422;
const NOT_FOUND_STATUS: u16 = 404;

#[derive(Default)]
struct Store {
    materials: Vec<Material>,
    next_id: u64,
    failures: VecDeque<ApiError>,
    calls: Vec<ApiRequest>,
}

impl Store {
    fn assign_id(&mut self) -> MaterialId {
        loop {
            self.next_id += 1;
            let id = MaterialId::new(format!("mat-{}", self.next_id));
            if !self.materials.iter().any(|m| m.id == id) {
                return id;
            }
        }
    }

    fn position(&self, id: &MaterialId) -> Result<usize> {
        self.materials
            .iter()
            .position(|m| &m.id == id)
            .ok_or_else(|| ApiError::rejected(NOT_FOUND_STATUS, ["Material not found"]))
    }
}

#[derive(Default)]
pub struct InMemoryMaterialsApi {
    store: Mutex<Store>,
    latency: Option<Duration>,
}

impl InMemoryMaterialsApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with existing server records (ids are kept as given)
    pub fn with_materials(materials: Vec<Material>) -> Self {
        Self {
            store: Mutex::new(Store {
                materials,
                ..Store::default()
            }),
            latency: None,
        }
    }

    /// Delay every response, so completions interleave with local edits
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next call fail with `error` instead of touching the store
    pub fn fail_next(&self, error: ApiError) {
        self.lock().failures.push_back(error);
    }

    pub fn materials(&self) -> Vec<Material> {
        self.lock().materials.clone()
    }

    /// Every request received so far, in arrival order
    pub fn calls(&self) -> Vec<ApiRequest> {
        self.lock().calls.clone()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        // A panic while holding the lock leaves the store usable for assertions.
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    async fn begin(&self, request: ApiRequest) -> Result<()> {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        debug!(kind = request.kind(), "in-memory materials request");
        let mut store = self.lock();
        store.calls.push(request);
        match store.failures.pop_front() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

fn validate(draft: &MaterialDraft) -> Result<()> {
    let mut messages = Vec::new();
    if draft.name.trim().is_empty() {
        messages.push("Name is required");
    }
    if draft.volume < Decimal::ZERO {
        messages.push("Volume must be a positive number");
    }
    if draft.cost < Decimal::ZERO {
        messages.push("Cost must be a positive number");
    }

    if messages.is_empty() {
        Ok(())
    } else {
        Err(ApiError::rejected(VALIDATION_STATUS, messages))
    }
}

#[async_trait]
impl MaterialsApi for InMemoryMaterialsApi {
    async fn fetch_one(&self, id: &MaterialId) -> Result<Material> {
        ensure_id(id)?;
        self.begin(ApiRequest::FetchOne(id.clone())).await?;
        let store = self.lock();
        let index = store.position(id)?;
        Ok(store.materials[index].clone())
    }

    async fn fetch_all(&self) -> Result<Vec<Material>> {
        self.begin(ApiRequest::FetchAll).await?;
        Ok(self.lock().materials.clone())
    }

    async fn create(&self, draft: &MaterialDraft) -> Result<Material> {
        self.begin(ApiRequest::Create(draft.clone())).await?;
        validate(draft)?;

        let mut store = self.lock();
        let id = store.assign_id();
        let material = draft.clone().into_material(id);
        store.materials.push(material.clone());
        Ok(material)
    }

    async fn update(&self, material: &Material) -> Result<()> {
        ensure_id(&material.id)?;
        self.begin(ApiRequest::Update(material.clone())).await?;
        validate(&material.draft())?;

        let mut store = self.lock();
        let index = store.position(&material.id)?;
        store.materials[index] = material.clone();
        Ok(())
    }

    async fn delete(&self, id: &MaterialId) -> Result<()> {
        ensure_id(id)?;
        self.begin(ApiRequest::Delete(id.clone())).await?;

        let mut store = self.lock();
        let index = store.position(id)?;
        store.materials.remove(index);
        Ok(())
    }
}
