//! Materials Manager
//!
//! Client for a materials REST API (name, color, volume, cost, delivery
//! date) with optimistic local updates.
//!
//! ## Layers
//!
//! - [`api`]: `MaterialsApi` trait, reqwest implementation and an in-process backend
//! - [`state`]: the materials controller, which applies changes locally first
//!   and rolls them back when the server refuses them
//! - [`session`]: runs the controller's server calls on tokio and applies results
//! - [`view`]: text rendering of the list, the form and the total

pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod session;
pub mod state;
pub mod view;

pub use api::{ApiRequest, ApiResponse, HttpMaterialsApi, InMemoryMaterialsApi, MaterialsApi};
pub use clock::{Clock, FixedClock, SystemClock};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, FieldError};
pub use models::{Material, MaterialDraft, MaterialId};
pub use session::MaterialsSession;
pub use state::{
    AutoConfirm, ConfirmPrompt, FieldName, MaterialCollection, MaterialsController,
    MaterialsEvent,
};
