//! Materials Controller
//!
//! Owns the materials list, the selection and the last error message, and
//! applies every user operation optimistically:
//!
//! 1. the local mutation happens immediately,
//! 2. a [`Dispatch`] describing the server call is handed back to the caller,
//! 3. the caller runs it and reports the outcome with [`MaterialsController::complete`],
//!    which confirms the change or rolls it back from the snapshot stored
//!    with the ticket.
//!
//! ## Ordering
//!
//! Operations are not queued. Each completion is applied to whatever the
//! state is when it arrives, so completions may come back in any order. A
//! failed edit restores its own snapshot even if a later edit to the same
//! material already succeeded.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use tracing::{debug, error, warn};

use crate::api::{ApiRequest, ApiResponse};
use crate::error::ApiError;
use crate::format::two_decimals;
use crate::models::{Material, MaterialDraft, MaterialId};

use super::collection::MaterialCollection;
use super::command::{Dispatch, OperationId, PendingCommand, Reconciliation};
use super::field::{FieldName, FieldUpdate};

pub const DELETE_FAILED_MESSAGE: &str = "Failed to delete material!";
pub const STILL_SAVING_MESSAGE: &str = "Material is still being saved!";
pub const OLD_DATE_WARNING: &str = "Are you sure you want to select an old date?";

/// Asks the user to confirm a non-blocking warning
pub trait ConfirmPrompt {
    fn confirm(&mut self, message: &str) -> bool;
}

/// Accepts every warning without asking
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoConfirm;

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, _message: &str) -> bool {
        true
    }
}

/// User intent emitted by the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MaterialsEvent {
    Initialize,
    Add,
    Delete,
    Select(MaterialId),
    FieldBlur { field: FieldName, raw: String },
}

#[derive(Debug, Default)]
pub struct MaterialsController {
    collection: MaterialCollection,
    selected: Option<MaterialId>,
    last_error: Option<String>,
    pending: BTreeMap<OperationId, PendingCommand>,
    next_op: u64,
}

impl MaterialsController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an already-loaded list, selecting its first element
    pub fn with_materials(materials: Vec<Material>) -> Self {
        let collection = MaterialCollection::from_materials(materials);
        let selected = collection.first_id().cloned();
        Self {
            collection,
            selected,
            ..Self::default()
        }
    }

    // -------------------------------------------------------------------------
    // Read access
    // -------------------------------------------------------------------------

    pub fn collection(&self) -> &MaterialCollection {
        &self.collection
    }

    pub fn selected_id(&self) -> Option<&MaterialId> {
        self.selected.as_ref()
    }

    pub fn selected(&self) -> Option<&Material> {
        self.selected.as_ref().and_then(|id| self.collection.get(id))
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Sum of all costs with two decimals; `"0.00"` when empty
    pub fn total_cost(&self) -> String {
        two_decimals(self.collection.total_cost())
    }

    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = (&OperationId, &PendingCommand)> {
        self.pending.iter()
    }

    // -------------------------------------------------------------------------
    // Event routing
    // -------------------------------------------------------------------------

    pub fn handle_event(
        &mut self,
        event: MaterialsEvent,
        today: NaiveDate,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Option<Dispatch> {
        match event {
            MaterialsEvent::Initialize => Some(self.initialize()),
            MaterialsEvent::Add => Some(self.add(today)),
            MaterialsEvent::Delete => self.delete(),
            MaterialsEvent::Select(id) => {
                self.select(&id);
                None
            }
            MaterialsEvent::FieldBlur { field, raw } => self.edit_field(field, &raw, today, prompt),
        }
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Request the full list from the server
    pub fn initialize(&mut self) -> Dispatch {
        self.register(PendingCommand::Initialize, ApiRequest::FetchAll)
    }

    /// Select `id` if it exists; unknown ids are ignored
    pub fn select(&mut self, id: &MaterialId) -> bool {
        if !self.collection.contains(id) {
            debug!(%id, "ignoring selection of unknown material");
            return false;
        }
        self.selected = Some(id.clone());
        true
    }

    /// Append a default material under a temporary id, select it, and request creation
    pub fn add(&mut self, today: NaiveDate) -> Dispatch {
        let draft = MaterialDraft::defaults(today);
        let temp_id = MaterialId::temporary();

        self.collection.push(draft.clone().into_material(temp_id.clone()));
        let previous_selection = self.selected.replace(temp_id.clone());

        self.register(
            PendingCommand::Add {
                temp_id,
                previous_selection,
            },
            ApiRequest::Create(draft),
        )
    }

    /// Remove the selected material and move the selection to its neighbour.
    ///
    /// Refused with "Material is still being saved!" while the selection is a temporary id.
    pub fn delete(&mut self) -> Option<Dispatch> {
        let id = self.selected.clone()?;
        if id.is_temporary() {
            self.last_error = Some(STILL_SAVING_MESSAGE.to_string());
            return None;
        }

        let len = self.collection.len();
        let Some(index) = self.collection.position(&id) else {
            debug!(%id, "selected material no longer present; delete ignored");
            return None;
        };

        let next_index = if len == 1 {
            None
        } else if index == len - 1 {
            Some(0)
        } else {
            Some(index + 1)
        };
        self.selected = next_index.and_then(|i| self.collection.id_at(i).cloned());

        let (index, snapshot) = self.collection.remove(&id)?;

        Some(self.register(
            PendingCommand::Delete { snapshot, index },
            ApiRequest::Delete(id),
        ))
    }

    /// Parse `raw` for `field` and apply it to the selected material.
    ///
    /// Dates earlier than `today` trigger a confirmation. The answer is only
    /// advisory: the edit goes ahead either way. Nothing is asked when the
    /// edit cannot be applied.
    pub fn edit_field(
        &mut self,
        field: FieldName,
        raw: &str,
        today: NaiveDate,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Option<Dispatch> {
        let id = self.editable_selection()?;
        let update = match field.parse(raw) {
            Ok(update) => update,
            Err(err) => {
                self.last_error = Some(err.to_string());
                return None;
            }
        };

        if let FieldUpdate::DeliveryDate(date) = &update {
            if *date < today && !prompt.confirm(OLD_DATE_WARNING) {
                debug!(%date, "past delivery date not confirmed; applying anyway");
            }
        }

        self.update_material(&id, update)
    }

    /// Apply an already-typed update to the selected material.
    ///
    /// Refused with "Material is still being saved!" while the selection is a temporary id.
    pub fn apply_update(&mut self, update: FieldUpdate) -> Option<Dispatch> {
        let id = self.editable_selection()?;
        self.update_material(&id, update)
    }

    // -------------------------------------------------------------------------
    // Completion
    // -------------------------------------------------------------------------

    /// Reconcile local state with the outcome of the server call behind `op`
    pub fn complete(
        &mut self,
        op: OperationId,
        result: Result<ApiResponse, ApiError>,
    ) -> Reconciliation {
        let Some(command) = self.pending.remove(&op) else {
            debug!(%op, "completion for unknown operation ignored");
            return Reconciliation::Ignored;
        };

        match (command, result) {
            (PendingCommand::Initialize, Ok(ApiResponse::Materials(materials))) => {
                self.collection = MaterialCollection::from_materials(materials);
                self.selected = self.collection.first_id().cloned();
                Reconciliation::Confirmed
            }
            (PendingCommand::Initialize, result) => {
                let err = unexpected_or_err(result);
                error!(error = %err, "failed to load materials");
                Reconciliation::RolledBack
            }

            (PendingCommand::Add { temp_id, .. }, Ok(ApiResponse::Created(material))) => {
                self.confirm_add(&temp_id, material);
                self.last_error = None;
                Reconciliation::Confirmed
            }
            (
                PendingCommand::Add {
                    temp_id,
                    previous_selection,
                },
                result,
            ) => {
                let err = unexpected_or_err(result);
                warn!(%op, error = %err, "create failed; removing temporary material");
                self.rollback_add(&temp_id, previous_selection);
                self.last_error = Some(err.display_message());
                Reconciliation::RolledBack
            }

            (PendingCommand::Delete { .. }, Ok(ApiResponse::Deleted)) => {
                self.last_error = None;
                Reconciliation::Confirmed
            }
            (PendingCommand::Delete { snapshot, index }, result) => {
                let err = unexpected_or_err(result);
                warn!(%op, id = %snapshot.id, error = %err, "delete failed; restoring material");
                self.collection.insert_at(index, snapshot);
                self.last_error = Some(DELETE_FAILED_MESSAGE.to_string());
                Reconciliation::RolledBack
            }

            (PendingCommand::Edit { .. }, Ok(ApiResponse::Updated)) => {
                self.last_error = None;
                Reconciliation::Confirmed
            }
            (PendingCommand::Edit { snapshot, field }, result) => {
                let err = unexpected_or_err(result);
                warn!(%op, id = %snapshot.id, %field, error = %err, "update failed; reverting");
                let id = snapshot.id.clone();
                self.collection.replace(&id, snapshot);
                self.last_error = Some(err.display_message());
                Reconciliation::RolledBack
            }
        }
    }

    fn register(&mut self, command: PendingCommand, request: ApiRequest) -> Dispatch {
        self.next_op += 1;
        let op = OperationId(self.next_op);
        debug!(%op, kind = command.kind(), "optimistic change applied");
        self.pending.insert(op, command);
        Dispatch { op, request }
    }

    /// Selected id, if it exists and is no longer temporary
    fn editable_selection(&mut self) -> Option<MaterialId> {
        let id = self.selected.clone()?;
        if id.is_temporary() {
            self.last_error = Some(STILL_SAVING_MESSAGE.to_string());
            return None;
        }
        if !self.collection.contains(&id) {
            debug!(%id, "selected material no longer present; edit ignored");
            return None;
        }
        Some(id)
    }

    fn update_material(&mut self, id: &MaterialId, update: FieldUpdate) -> Option<Dispatch> {
        let material = self.collection.get_mut(id)?;
        let snapshot = material.clone();
        update.apply(material);
        let mutated = material.clone();

        Some(self.register(
            PendingCommand::Edit {
                snapshot,
                field: update.field(),
            },
            ApiRequest::Update(mutated),
        ))
    }

    fn confirm_add(&mut self, temp_id: &MaterialId, material: Material) {
        let server_id = material.id.clone();
        if !self.collection.replace(temp_id, material) {
            // Temporary element gone, or the server id already arrived via a reload.
            self.collection.remove(temp_id);
        }
        if self.selected.as_ref() == Some(temp_id) {
            self.selected = self
                .collection
                .contains(&server_id)
                .then_some(server_id);
        }
    }

    fn rollback_add(&mut self, temp_id: &MaterialId, previous_selection: Option<MaterialId>) {
        self.collection.remove(temp_id);
        if self.selected.as_ref() == Some(temp_id) {
            self.selected = previous_selection.filter(|id| self.collection.contains(id));
        }
    }
}

/// A success payload of the wrong shape counts as a failed call.
fn unexpected_or_err(result: Result<ApiResponse, ApiError>) -> ApiError {
    match result {
        Err(err) => err,
        Ok(response) => ApiError::Decode {
            message: format!("unexpected response: {:?}", response),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    fn material(id: &str, cost: &str) -> Material {
        Material {
            id: MaterialId::new(id),
            name: format!("Material {}", id),
            color: "#aabbcc".into(),
            volume: Decimal::TEN,
            cost: cost.parse().unwrap(),
            delivery_date: today(),
        }
    }

    fn ids(controller: &MaterialsController) -> Vec<String> {
        controller
            .collection()
            .iter()
            .map(|m| m.id.to_string())
            .collect()
    }

    fn rejected(msg: &str) -> ApiError {
        ApiError::rejected(422, [msg])
    }

    struct RecordingPrompt {
        asked: Vec<String>,
        answer: bool,
    }

    impl ConfirmPrompt for RecordingPrompt {
        fn confirm(&mut self, message: &str) -> bool {
            self.asked.push(message.to_string());
            self.answer
        }
    }

    #[test]
    fn initialize_selects_first() {
        let mut c = MaterialsController::new();
        let dispatch = c.initialize();
        assert_eq!(dispatch.request, ApiRequest::FetchAll);

        let outcome = c.complete(
            dispatch.op,
            Ok(ApiResponse::Materials(vec![material("1", "1"), material("2", "2")])),
        );
        assert_eq!(outcome, Reconciliation::Confirmed);
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("1"));
    }

    #[test]
    fn initialize_failure_leaves_empty_without_error() {
        let mut c = MaterialsController::new();
        let dispatch = c.initialize();
        c.complete(dispatch.op, Err(ApiError::Unavailable));
        assert!(c.collection().is_empty());
        assert!(c.selected_id().is_none());
        assert!(c.last_error().is_none());
    }

    #[test]
    fn add_is_visible_before_the_server_answers() {
        let mut c = MaterialsController::with_materials(vec![material("1", "1")]);
        let dispatch = c.add(today());

        assert_eq!(c.collection().len(), 2);
        let selected = c.selected().unwrap();
        assert!(selected.id.is_temporary());
        assert_eq!(selected.delivery_date, today());
        assert_eq!(
            dispatch.request,
            ApiRequest::Create(MaterialDraft::defaults(today()))
        );
    }

    #[test]
    fn add_success_swaps_in_server_record() {
        let mut c = MaterialsController::with_materials(vec![material("1", "1")]);
        let dispatch = c.add(today());
        let server = MaterialDraft::defaults(today()).into_material("srv-9".into());

        c.complete(dispatch.op, Ok(ApiResponse::Created(server.clone())));

        assert_eq!(ids(&c), vec!["1", "srv-9"]);
        assert_eq!(c.selected_id(), Some(&server.id));
        assert!(c.last_error().is_none());
    }

    #[test]
    fn add_success_keeps_a_selection_that_moved_on() {
        let mut c = MaterialsController::with_materials(vec![material("1", "1")]);
        let dispatch = c.add(today());
        c.select(&MaterialId::new("1"));

        let server = MaterialDraft::defaults(today()).into_material("srv-9".into());
        c.complete(dispatch.op, Ok(ApiResponse::Created(server)));
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("1"));
    }

    #[test]
    fn add_failure_restores_collection_and_previous_selection() {
        let mut c = MaterialsController::with_materials(vec![material("1", "1"), material("2", "2")]);
        c.select(&MaterialId::new("2"));
        let before = c.collection().clone();

        let dispatch = c.add(today());
        c.complete(dispatch.op, Err(rejected("Name is required")));

        assert_eq!(c.collection(), &before);
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("2"));
        assert_eq!(c.last_error(), Some("Name is required"));
    }

    #[test]
    fn add_failure_on_empty_list_selects_nothing() {
        let mut c = MaterialsController::new();
        let dispatch = c.add(today());
        c.complete(
            dispatch.op,
            Err(ApiError::Transport {
                message: "refused".into(),
            }),
        );
        assert!(c.collection().is_empty());
        assert!(c.selected_id().is_none());
        assert_eq!(c.last_error(), Some(crate::error::GENERIC_FAILURE_MESSAGE));
    }

    #[test]
    fn delete_middle_selects_successor() {
        let mut c = MaterialsController::with_materials(vec![
            material("A", "1"),
            material("B", "1"),
            material("C", "1"),
        ]);
        c.select(&MaterialId::new("B"));
        let dispatch = c.delete().unwrap();

        assert_eq!(dispatch.request, ApiRequest::Delete(MaterialId::new("B")));
        assert_eq!(ids(&c), vec!["A", "C"]);
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("C"));
    }

    #[test]
    fn delete_last_selects_first() {
        let mut c =
            MaterialsController::with_materials(vec![material("A", "1"), material("B", "1")]);
        c.select(&MaterialId::new("B"));
        c.delete().unwrap();
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("A"));
    }

    #[test]
    fn delete_only_element_clears_selection() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        c.delete().unwrap();
        assert!(c.collection().is_empty());
        assert!(c.selected_id().is_none());
    }

    #[test]
    fn delete_without_selection_is_ignored() {
        let mut c = MaterialsController::new();
        assert!(c.delete().is_none());
        assert!(c.last_error().is_none());
    }

    #[test]
    fn delete_failure_reinserts_at_original_index() {
        let mut c = MaterialsController::with_materials(vec![
            material("A", "1"),
            material("B", "1"),
            material("C", "1"),
        ]);
        let before = c.collection().clone();
        c.select(&MaterialId::new("B"));
        let dispatch = c.delete().unwrap();

        c.complete(dispatch.op, Err(ApiError::Unavailable));

        assert_eq!(c.collection(), &before);
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("C"));
        assert_eq!(c.last_error(), Some(DELETE_FAILED_MESSAGE));
    }

    #[test]
    fn edit_failure_reverts_to_snapshot() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        let before = c.selected().cloned().unwrap();

        let dispatch = c
            .edit_field(FieldName::Cost, "42.10", today(), &mut AutoConfirm)
            .unwrap();
        assert_eq!(c.selected().unwrap().cost, "42.10".parse::<Decimal>().unwrap());
        match &dispatch.request {
            ApiRequest::Update(sent) => assert_eq!(sent.cost, "42.10".parse::<Decimal>().unwrap()),
            other => panic!("unexpected request {:?}", other),
        }

        c.complete(dispatch.op, Err(rejected("Cost must be a positive number")));
        assert_eq!(c.selected(), Some(&before));
        assert_eq!(c.last_error(), Some("Cost must be a positive number"));
    }

    #[test]
    fn edit_success_clears_error() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        let failed = c
            .edit_field(FieldName::Name, "", today(), &mut AutoConfirm)
            .unwrap();
        c.complete(failed.op, Err(rejected("Name is required")));
        assert!(c.last_error().is_some());

        let ok = c
            .edit_field(FieldName::Name, "Gravel", today(), &mut AutoConfirm)
            .unwrap();
        c.complete(ok.op, Ok(ApiResponse::Updated));
        assert!(c.last_error().is_none());
        assert_eq!(c.selected().unwrap().name, "Gravel");
    }

    #[test]
    fn unparseable_value_is_not_applied() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        let before = c.collection().clone();
        assert!(c
            .edit_field(FieldName::Volume, "lots", today(), &mut AutoConfirm)
            .is_none());
        assert_eq!(c.collection(), &before);
        assert_eq!(c.last_error(), Some("Volume must be a number"));
        assert!(!c.has_pending());
    }

    #[test]
    fn past_date_asks_but_does_not_block() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        let mut prompt = RecordingPrompt {
            asked: vec![],
            answer: false,
        };

        let dispatch = c.edit_field(FieldName::DeliveryDate, "2026-10-16", today(), &mut prompt);
        assert!(dispatch.is_some());
        assert_eq!(prompt.asked, vec![OLD_DATE_WARNING.to_string()]);
        assert_eq!(
            c.selected().unwrap().delivery_date,
            NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
        );

        c.edit_field(FieldName::DeliveryDate, "2026-10-17", today(), &mut prompt);
        assert_eq!(prompt.asked.len(), 1, "today is not an old date");
    }

    #[test]
    fn temporary_material_cannot_be_edited_or_deleted() {
        let mut c = MaterialsController::new();
        c.add(today());
        assert!(c.delete().is_none());
        assert!(c
            .edit_field(FieldName::Name, "x", today(), &mut AutoConfirm)
            .is_none());
        assert_eq!(c.last_error(), Some(STILL_SAVING_MESSAGE));
        assert_eq!(c.collection().len(), 1);
    }

    #[test]
    fn select_unknown_is_ignored() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        assert!(!c.select(&MaterialId::new("missing")));
        assert_eq!(c.selected_id().map(|id| id.as_str()), Some("A"));
    }

    #[test]
    fn total_cost_formats_two_decimals() {
        let c = MaterialsController::with_materials(vec![material("1", "10.00"), material("2", "5.50")]);
        assert_eq!(c.total_cost(), "15.50");
        assert_eq!(MaterialsController::new().total_cost(), "0.00");
    }

    #[test]
    fn unknown_ticket_is_ignored() {
        let mut c = MaterialsController::new();
        let dispatch = c.initialize();
        c.complete(dispatch.op, Ok(ApiResponse::Materials(vec![])));
        assert_eq!(
            c.complete(dispatch.op, Ok(ApiResponse::Materials(vec![]))),
            Reconciliation::Ignored
        );
    }

    #[test]
    fn mismatched_response_counts_as_failure() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        let dispatch = c.delete().unwrap();
        assert_eq!(
            c.complete(dispatch.op, Ok(ApiResponse::Updated)),
            Reconciliation::RolledBack
        );
        assert_eq!(c.collection().len(), 1);
    }

    #[test]
    fn failed_edit_rollback_clobbers_later_success() {
        let mut c = MaterialsController::with_materials(vec![material("A", "1")]);
        let first = c
            .edit_field(FieldName::Cost, "2", today(), &mut AutoConfirm)
            .unwrap();
        let second = c
            .edit_field(FieldName::Cost, "3", today(), &mut AutoConfirm)
            .unwrap();

        c.complete(second.op, Ok(ApiResponse::Updated));
        c.complete(first.op, Err(ApiError::Unavailable));

        assert_eq!(c.selected().unwrap().cost, Decimal::ONE);
    }

    #[test]
    fn oversized_cost_is_refused_and_total_still_renders() {
        let mut c =
            MaterialsController::with_materials(vec![material("A", "1"), material("B", "1")]);
        let dispatch = c.edit_field(
            FieldName::Cost,
            "79228162514264337593543950335",
            today(),
            &mut AutoConfirm,
        );

        assert!(dispatch.is_none());
        assert_eq!(c.last_error(), Some("Cost is too large"));
        assert_eq!(c.total_cost(), "2.00");
    }

    #[test]
    fn old_date_is_not_confirmed_for_an_edit_that_cannot_apply() {
        let old_date = "2020-01-01";
        let mut prompt = RecordingPrompt {
            asked: vec![],
            answer: true,
        };

        let mut empty = MaterialsController::new();
        assert!(empty
            .edit_field(FieldName::DeliveryDate, old_date, today(), &mut prompt)
            .is_none());

        let mut saving = MaterialsController::new();
        saving.add(today());
        assert!(saving
            .edit_field(FieldName::DeliveryDate, old_date, today(), &mut prompt)
            .is_none());
        assert_eq!(saving.last_error(), Some(STILL_SAVING_MESSAGE));

        assert!(prompt.asked.is_empty());
    }
}
