//! Session driver
//!
//! Runs the controller's server calls as tokio tasks and feeds their results
//! back one at a time. Tasks only perform IO; every state change happens on
//! the task that owns the session, so the controller needs no locking.

use std::sync::Arc;

use tokio::sync::mpsc::{self, error::TryRecvError, UnboundedReceiver, UnboundedSender};
use tracing::{debug, warn};

use crate::api::{ApiResponse, MaterialsApi};
use crate::clock::Clock;
use crate::error::ApiError;
use crate::models::MaterialId;
use crate::state::{
    ConfirmPrompt, Dispatch, FieldName, MaterialsController, MaterialsEvent, OperationId,
    Reconciliation,
};

struct Completion {
    op: OperationId,
    result: Result<ApiResponse, ApiError>,
}

/// Reports exactly one completion per spawned request. Dropped without a
/// result (the task panicked or was cancelled), it reports `Aborted`.
struct CompletionGuard {
    op: OperationId,
    tx: Option<UnboundedSender<Completion>>,
}

impl CompletionGuard {
    fn send(mut self, result: Result<ApiResponse, ApiError>) {
        if let Some(tx) = self.tx.take() {
            // The receiver lives as long as the session; a send error means it was dropped.
            let _ = tx.send(Completion { op: self.op, result });
        }
    }
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.tx.take() {
            warn!(op = %self.op, "materials request ended without a result");
            let _ = tx.send(Completion {
                op: self.op,
                result: Err(ApiError::Aborted),
            });
        }
    }
}

pub struct MaterialsSession {
    controller: MaterialsController,
    api: Arc<dyn MaterialsApi>,
    clock: Arc<dyn Clock>,
    tx: UnboundedSender<Completion>,
    rx: UnboundedReceiver<Completion>,
    in_flight: usize,
}

impl MaterialsSession {
    pub fn new(api: Arc<dyn MaterialsApi>, clock: Arc<dyn Clock>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller: MaterialsController::new(),
            api,
            clock,
            tx,
            rx,
            in_flight: 0,
        }
    }

    pub fn controller(&self) -> &MaterialsController {
        &self.controller
    }

    pub fn api(&self) -> &Arc<dyn MaterialsApi> {
        &self.api
    }

    /// Number of server calls whose results have not been applied yet
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn handle_event(
        &mut self,
        event: MaterialsEvent,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Option<OperationId> {
        let today = self.clock.today();
        let dispatch = self.controller.handle_event(event, today, prompt)?;
        Some(self.spawn(dispatch))
    }

    pub fn initialize(&mut self) -> OperationId {
        let dispatch = self.controller.initialize();
        self.spawn(dispatch)
    }

    pub fn add(&mut self) -> OperationId {
        let dispatch = self.controller.add(self.clock.today());
        self.spawn(dispatch)
    }

    pub fn delete(&mut self) -> Option<OperationId> {
        let dispatch = self.controller.delete()?;
        Some(self.spawn(dispatch))
    }

    pub fn select(&mut self, id: &MaterialId) -> bool {
        self.controller.select(id)
    }

    pub fn edit_field(
        &mut self,
        field: FieldName,
        raw: &str,
        prompt: &mut dyn ConfirmPrompt,
    ) -> Option<OperationId> {
        let dispatch = self
            .controller
            .edit_field(field, raw, self.clock.today(), prompt)?;
        Some(self.spawn(dispatch))
    }

    /// Wait for the next server result and apply it.
    ///
    /// Returns `None` when nothing is in flight.
    pub async fn next_completion(&mut self) -> Option<(OperationId, Reconciliation)> {
        if self.in_flight == 0 {
            return None;
        }
        let completion = self.rx.recv().await?;
        Some(self.apply(completion))
    }

    /// Apply results that have already arrived, without waiting
    pub fn apply_ready(&mut self) -> Vec<(OperationId, Reconciliation)> {
        let mut applied = Vec::new();
        while self.in_flight > 0 {
            match self.rx.try_recv() {
                Ok(completion) => applied.push(self.apply(completion)),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        applied
    }

    /// Apply results until no server call is outstanding
    pub async fn settle(&mut self) -> Vec<(OperationId, Reconciliation)> {
        let mut applied = Vec::new();
        while let Some(outcome) = self.next_completion().await {
            applied.push(outcome);
        }
        applied
    }

    fn spawn(&mut self, dispatch: Dispatch) -> OperationId {
        let Dispatch { op, request } = dispatch;
        let api = Arc::clone(&self.api);
        let guard = CompletionGuard {
            op,
            tx: Some(self.tx.clone()),
        };
        self.in_flight += 1;

        debug!(%op, kind = request.kind(), "dispatching materials request");
        tokio::spawn(async move {
            let result = request.execute(api.as_ref()).await;
            guard.send(result);
        });

        op
    }

    fn apply(&mut self, completion: Completion) -> (OperationId, Reconciliation) {
        self.in_flight -= 1;
        let outcome = self.controller.complete(completion.op, completion.result);
        debug!(op = %completion.op, ?outcome, "materials request settled");
        (completion.op, outcome)
    }
}
