//! Mock materials backend for integration tests
//!
//! Serves the REST endpoints the client consumes on an ephemeral port:
//!
//! - GET    /materials
//! - GET    /materials/:id
//! - POST   /materials
//! - PUT    /materials/:id
//! - DELETE /materials/:id
//!
//! Validation failures answer `422 { errors: [{ msg }] }`; a queued status
//! from [`MockBackend::fail_next`] answers with a plain-text body.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;

use materials_manager::models::{
    ErrorPayload, Material, MaterialDraft, MaterialEnvelope, MaterialId, MaterialsEnvelope,
};

#[derive(Default)]
struct Store {
    materials: Vec<Material>,
    next_id: u64,
    failures: VecDeque<StatusCode>,
}

#[derive(Clone, Default)]
pub struct MockBackend {
    store: Arc<Mutex<Store>>,
}

impl MockBackend {
    pub fn with_materials(materials: Vec<Material>) -> Self {
        let backend = Self::default();
        backend.store.lock().unwrap().materials = materials;
        backend
    }

    /// Next request answers `status` with a non-JSON body
    pub fn fail_next(&self, status: StatusCode) {
        self.store.lock().unwrap().failures.push_back(status);
    }

    pub fn materials(&self) -> Vec<Material> {
        self.store.lock().unwrap().materials.clone()
    }

    /// Bind on 127.0.0.1 with an OS-assigned port and serve in the background
    pub async fn spawn(self) -> SocketAddr {
        let app = Router::new()
            .route("/materials", get(list_materials).post(create_material))
            .route(
                "/materials/:id",
                get(get_material).put(update_material).delete(delete_material),
            )
            .with_state(self);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    fn take_failure(&self) -> Option<Response> {
        self.store
            .lock()
            .unwrap()
            .failures
            .pop_front()
            .map(|status| (status, "backend exploded").into_response())
    }
}

pub fn base_url(addr: SocketAddr) -> String {
    format!("http://{}", addr)
}

pub fn material(id: &str, name: &str, cost: &str) -> Material {
    Material {
        id: MaterialId::new(id),
        name: name.to_string(),
        color: "#a0522d".to_string(),
        volume: "100".parse().unwrap(),
        cost: cost.parse().unwrap(),
        delivery_date: NaiveDate::from_ymd_opt(2026, 11, 2).unwrap(),
    }
}

fn error_response(status: StatusCode, messages: Vec<&str>) -> Response {
    (status, Json(ErrorPayload::from_messages(messages))).into_response()
}

fn validation_messages(draft: &MaterialDraft) -> Vec<&'static str> {
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
    messages
}

async fn list_materials(State(backend): State<MockBackend>) -> Response {
    if let Some(failure) = backend.take_failure() {
        return failure;
    }
    let materials = backend.materials();
    Json(MaterialsEnvelope { materials }).into_response()
}

async fn get_material(State(backend): State<MockBackend>, Path(id): Path<String>) -> Response {
    if let Some(failure) = backend.take_failure() {
        return failure;
    }
    let store = backend.store.lock().unwrap();
    match store.materials.iter().find(|m| m.id.as_str() == id) {
        Some(material) => Json(MaterialEnvelope {
            material: material.clone(),
        })
        .into_response(),
        None => error_response(StatusCode::NOT_FOUND, vec!["Material not found"]),
    }
}

async fn create_material(
    State(backend): State<MockBackend>,
    Json(draft): Json<MaterialDraft>,
) -> Response {
    if let Some(failure) = backend.take_failure() {
        return failure;
    }
    let messages = validation_messages(&draft);
    if !messages.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, messages);
    }

    let mut store = backend.store.lock().unwrap();
    store.next_id += 1;
    let material = draft.into_material(MaterialId::new(format!("srv-{}", store.next_id)));
    store.materials.push(material.clone());
    (StatusCode::CREATED, Json(MaterialEnvelope { material })).into_response()
}

async fn update_material(
    State(backend): State<MockBackend>,
    Path(id): Path<String>,
    Json(material): Json<Material>,
) -> Response {
    if let Some(failure) = backend.take_failure() {
        return failure;
    }
    let messages = validation_messages(&material.draft());
    if !messages.is_empty() {
        return error_response(StatusCode::UNPROCESSABLE_ENTITY, messages);
    }

    let mut store = backend.store.lock().unwrap();
    match store.materials.iter_mut().find(|m| m.id.as_str() == id) {
        Some(existing) => {
            *existing = material;
            StatusCode::NO_CONTENT.into_response()
        }
        None => error_response(StatusCode::NOT_FOUND, vec!["Material not found"]),
    }
}

async fn delete_material(State(backend): State<MockBackend>, Path(id): Path<String>) -> Response {
    if let Some(failure) = backend.take_failure() {
        return failure;
    }
    let mut store = backend.store.lock().unwrap();
    let before = store.materials.len();
    store.materials.retain(|m| m.id.as_str() != id);
    if store.materials.len() == before {
        return error_response(StatusCode::NOT_FOUND, vec!["Material not found"]);
    }
    StatusCode::NO_CONTENT.into_response()
}
