//! Material data model and wire format

pub mod material;
pub mod wire;

pub use material::{
    ErrorPayload, FieldMessage, Material, MaterialDraft, MaterialEnvelope, MaterialId,
    MaterialsEnvelope, DEFAULT_COLOR, DEFAULT_NAME,
};
