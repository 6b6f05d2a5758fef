//! Client-side materials state: collection, field edits, in-flight commands and the controller

pub mod collection;
pub mod command;
pub mod controller;
pub mod field;

pub use collection::MaterialCollection;
pub use command::{Dispatch, OperationId, PendingCommand, Reconciliation};
pub use controller::{
    AutoConfirm, ConfirmPrompt, MaterialsController, MaterialsEvent, DELETE_FAILED_MESSAGE,
    OLD_DATE_WARNING, STILL_SAVING_MESSAGE,
};
pub use field::{FieldName, FieldUpdate};
