//! In-flight commands and the data each needs to roll itself back

use std::fmt;

use crate::api::ApiRequest;
use crate::models::{Material, MaterialId};

use super::field::FieldName;

/// Ticket identifying one in-flight server call
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationId(pub(crate) u64);

impl fmt::Display for OperationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "op-{}", self.0)
    }
}

/// A server call the owner of the controller must perform, then report back
/// through [`super::MaterialsController::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub op: OperationId,
    pub request: ApiRequest,
}

/// Local mutation already applied, awaiting the server's verdict
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingCommand {
    Initialize,

    /// Temporary element appended and selected
    Add {
        temp_id: MaterialId,
        previous_selection: Option<MaterialId>,
    },

    /// Element removed from `index`
    Delete { snapshot: Material, index: usize },

    /// Element mutated in place; `snapshot` is the pre-edit record
    Edit { snapshot: Material, field: FieldName },
}

impl PendingCommand {
    pub fn kind(&self) -> &'static str {
        match self {
            PendingCommand::Initialize => "initialize",
            PendingCommand::Add { .. } => "add",
            PendingCommand::Delete { .. } => "delete",
            PendingCommand::Edit { .. } => "edit",
        }
    }
}

/// What a completion did to local state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reconciliation {
    /// Server confirmed; local state now mirrors the server record
    Confirmed,
    /// Server refused; the optimistic change was undone
    RolledBack,
    /// Ticket unknown or already settled
    Ignored,
}
