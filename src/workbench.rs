//! Editing-session facade.
//!
//! A [`Workbench`] owns one editable graph for the lifetime of an editing
//! session and wires the core pieces together: every mutation re-runs the
//! compiler to keep a live canonical preview, run/pause/resume go through
//! the [`ExecutionSession`], inbound status frames are reconciled by
//! [`StatusSync`], and save/open/list delegate to the [`WorkflowStore`]
//! collaborator keyed by the [`Identity`] provider.
//!
//! The graph is mutated only from this single context; inbound updates are
//! drained explicitly via [`Workbench::apply_pending_updates`] so ordering
//! is strictly arrival order.

use std::sync::Arc;

use miette::Diagnostic;
use thiserror::Error;

use crate::compiler::compile;
use crate::config::RunnerConfig;
use crate::document::WorkflowDocument;
use crate::loader::{LoadError, load, parse_document};
use crate::model::{GraphController, TaskNode, TaskPatch, WorkflowGraph};
use crate::notices::{Notice, NoticeBus};
use crate::session::{ControlTransport, ExecutionSession, NodeUpdate, SessionError, WsTransport};
use crate::store::{Identity, StoreError, WorkflowRecord, WorkflowStore, WorkflowSummary};
use crate::sync::StatusSync;
use crate::types::{Position, TaskType};
use crate::utils::ids;

pub const DEFAULT_WORKFLOW_NAME: &str = "New Workflow";

#[derive(Debug, Error, Diagnostic)]
pub enum WorkbenchError {
    #[error("no user is signed in")]
    #[diagnostic(
        code(taskweave::workbench::not_signed_in),
        help("Saving and running require an identity provider that yields a user id.")
    )]
    NotSignedIn,

    #[error("workflow `{workflow_id}` not found")]
    #[diagnostic(code(taskweave::workbench::not_found))]
    WorkflowNotFound { workflow_id: String },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Session(#[from] SessionError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// One user-facing editing session over a workflow graph.
pub struct Workbench {
    graph: WorkflowGraph,
    workflow_name: String,
    description: String,
    current_workflow_id: Option<String>,
    preview: String,
    paused: bool,
    sync: StatusSync,
    session: ExecutionSession,
    store: Arc<dyn WorkflowStore>,
    identity: Arc<dyn Identity>,
    notices: NoticeBus,
}

impl Workbench {
    /// Build a workbench over an explicit transport (tests inject doubles
    /// here).
    #[must_use]
    pub fn new(
        transport: Arc<dyn ControlTransport>,
        store: Arc<dyn WorkflowStore>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        let notices = NoticeBus::default();
        let session = ExecutionSession::new(transport).with_notices(notices.sender());
        let mut bench = Self {
            graph: WorkflowGraph::new(),
            workflow_name: DEFAULT_WORKFLOW_NAME.to_string(),
            description: String::new(),
            current_workflow_id: None,
            preview: String::new(),
            paused: false,
            sync: StatusSync::new(),
            session,
            store,
            identity,
            notices,
        };
        bench.refresh_preview();
        bench
    }

    /// Build a workbench with a WebSocket transport from configuration.
    #[must_use]
    pub fn with_config(
        config: &RunnerConfig,
        store: Arc<dyn WorkflowStore>,
        identity: Arc<dyn Identity>,
    ) -> Self {
        Self::new(
            Arc::new(WsTransport::new(config.endpoint.clone())),
            store,
            identity,
        )
    }

    /// The notice bus carrying user-facing notifications. Hosting shells
    /// either poll [`NoticeBus::drain`] or attach a sink via
    /// [`NoticeBus::forward_to`].
    #[must_use]
    pub fn notices(&self) -> &NoticeBus {
        &self.notices
    }

    #[must_use]
    pub fn graph(&self) -> &WorkflowGraph {
        &self.graph
    }

    #[must_use]
    pub fn workflow_name(&self) -> &str {
        &self.workflow_name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn current_workflow_id(&self) -> Option<&str> {
        self.current_workflow_id.as_deref()
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[must_use]
    pub fn is_workflow_completed(&self) -> bool {
        self.sync.is_workflow_completed()
    }

    /// The live canonical document as pretty JSON, kept current across
    /// edits.
    #[must_use]
    pub fn preview(&self) -> &str {
        &self.preview
    }

    // ------------------------------------------------------------------
    // Editing operations
    // ------------------------------------------------------------------

    pub fn set_workflow_name(&mut self, name: impl Into<String>) {
        self.workflow_name = name.into();
        self.refresh_preview();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.refresh_preview();
    }

    /// Spawn a fresh task of the given type at a canvas position (the
    /// drag-and-drop entry point); returns its generated id.
    pub fn add_task(&mut self, task_type: TaskType, position: Position) -> String {
        let node = TaskNode::spawn(task_type, position);
        let id = node.id().to_string();
        self.graph.add_node(node);
        self.refresh_derived_state();
        id
    }

    /// Add a prebuilt node (imports, tests).
    pub fn add_node(&mut self, node: TaskNode) {
        self.graph.add_node(node);
        self.refresh_derived_state();
    }

    /// Connect `source -> target`: target depends on source.
    pub fn connect(&mut self, source: impl Into<String>, target: impl Into<String>) {
        self.graph.connect(source, target);
        self.refresh_derived_state();
    }

    /// Merge a partial field set into a task.
    pub fn update_task(&mut self, id: &str, patch: TaskPatch) -> bool {
        let updated = self.graph.update_task(id, patch);
        if updated {
            self.refresh_derived_state();
        }
        updated
    }

    /// Delete a task and every edge touching it.
    pub fn delete_task(&mut self, id: &str) -> bool {
        let deleted = self.graph.delete_task(id);
        if deleted {
            self.refresh_derived_state();
        }
        deleted
    }

    /// Discard the current graph and start a fresh unsaved workflow.
    pub fn new_workflow(&mut self) {
        self.graph.clear();
        self.workflow_name = DEFAULT_WORKFLOW_NAME.to_string();
        self.description.clear();
        self.current_workflow_id = None;
        self.paused = false;
        self.sync = StatusSync::new();
        self.refresh_derived_state();
    }

    /// Compile the current graph into its canonical document.
    #[must_use]
    pub fn compile(&self) -> WorkflowDocument {
        compile(&self.graph, &self.workflow_name, &self.description)
    }

    // ------------------------------------------------------------------
    // Persistence
    // ------------------------------------------------------------------

    /// Upsert the current workflow into the store; the first save allocates
    /// a workflow id. A failed write leaves the in-memory graph untouched.
    pub async fn save(&mut self) -> Result<String, WorkbenchError> {
        let user = self.identity.user_id().ok_or(WorkbenchError::NotSignedIn)?;
        let workflow_id = self
            .current_workflow_id
            .clone()
            .unwrap_or_else(ids::workflow_id);
        let record = WorkflowRecord {
            name: self.workflow_name.clone(),
            description: self.description.clone(),
            document: self.compile(),
            user_name: self.identity.display_name(),
        };
        if let Err(e) = self.store.upsert(&user, &workflow_id, record).await {
            self.notify(Notice::error("Failed to save workflow"));
            return Err(e.into());
        }
        self.current_workflow_id = Some(workflow_id.clone());
        tracing::info!(workflow = %workflow_id, "workflow saved");
        Ok(workflow_id)
    }

    /// Load a previously persisted workflow into the editable graph.
    pub async fn open(&mut self, workflow_id: &str) -> Result<(), WorkbenchError> {
        let user = self.identity.user_id().ok_or(WorkbenchError::NotSignedIn)?;
        let stored = self
            .store
            .get(&user, workflow_id)
            .await?
            .ok_or_else(|| WorkbenchError::WorkflowNotFound {
                workflow_id: workflow_id.to_string(),
            })?;
        let graph = load(&stored.record.document)?;
        self.graph = graph;
        self.workflow_name = stored.record.name;
        self.description = stored.record.description;
        self.current_workflow_id = Some(workflow_id.to_string());
        self.sync = StatusSync::new();
        self.refresh_derived_state();
        Ok(())
    }

    /// Workflows stored for the current user, most recent first.
    pub async fn list_workflows(&self) -> Result<Vec<WorkflowSummary>, WorkbenchError> {
        let user = self.identity.user_id().ok_or(WorkbenchError::NotSignedIn)?;
        Ok(self.store.list(&user).await?)
    }

    // ------------------------------------------------------------------
    // Execution control
    // ------------------------------------------------------------------

    /// Save, then hand the compiled document to the runner.
    ///
    /// A failed store write surfaces as a notice and does not block
    /// execution; the in-memory edits and the run both proceed.
    pub async fn run(&mut self) -> Result<(), WorkbenchError> {
        match self.save().await {
            Ok(_) => {}
            Err(WorkbenchError::Store(e)) => {
                tracing::warn!(error = %e, "workflow save failed; running unsaved");
            }
            Err(other) => return Err(other),
        }
        let doc = self.compile();
        self.session.run(&doc).await?;
        self.paused = false;
        Ok(())
    }

    pub async fn pause(&mut self) -> Result<(), WorkbenchError> {
        self.session.pause().await?;
        self.paused = true;
        Ok(())
    }

    pub async fn resume(&mut self) -> Result<(), WorkbenchError> {
        self.session.resume().await?;
        self.paused = false;
        Ok(())
    }

    /// Release the control channel; call when the editing session ends.
    pub async fn teardown(&mut self) {
        self.session.teardown().await;
        self.notices.stop().await;
    }

    /// Merge one inbound runner update into the graph.
    pub fn apply_update(&mut self, update: &NodeUpdate) {
        let outcome = self.sync.apply(&mut self.graph, update);
        if outcome.applied {
            self.refresh_preview();
        }
        if outcome.completed {
            self.notify(Notice::success("Workflow execution completed successfully!"));
        }
    }

    /// Drain every status update the session has received so far, in
    /// arrival order. Returns how many were processed.
    pub fn apply_pending_updates(&mut self) -> usize {
        let updates: Vec<NodeUpdate> = self.session.updates().try_iter().collect();
        let n = updates.len();
        for update in &updates {
            self.apply_update(update);
        }
        n
    }

    // ------------------------------------------------------------------
    // Import / export
    // ------------------------------------------------------------------

    /// Replace the editable graph with an imported document. On any error
    /// the prior graph state is left untouched.
    pub fn import_json(&mut self, json: &str) -> Result<(), WorkbenchError> {
        let result = parse_document(json).and_then(|doc| load(&doc).map(|graph| (doc, graph)));
        match result {
            Ok((doc, graph)) => {
                self.graph = graph;
                self.workflow_name = doc.workflow_name;
                self.description = doc.description;
                self.sync = StatusSync::new();
                self.refresh_derived_state();
                self.notify(Notice::success("Workflow imported successfully"));
                Ok(())
            }
            Err(e) => {
                self.notify(Notice::error("Failed to import workflow"));
                Err(e.into())
            }
        }
    }

    /// The current document as an exportable `(file name, JSON)` pair.
    #[must_use]
    pub fn export_json(&self) -> (String, String) {
        (
            format!("{}.json", self.workflow_name),
            self.preview.clone(),
        )
    }

    fn refresh_preview(&mut self) {
        match self.compile().to_json_pretty() {
            Ok(json) => self.preview = json,
            Err(e) => tracing::error!(error = %e, "preview serialization failed"),
        }
    }

    /// Every graph mutation lands here: recompile the preview and
    /// recompute the completion aggregate, so editor-side status changes
    /// re-arm (or fire) the tracker just like runner frames do.
    fn refresh_derived_state(&mut self) {
        self.refresh_preview();
        if self.sync.observe(&self.graph) {
            self.notify(Notice::success("Workflow execution completed successfully!"));
        }
    }

    fn notify(&self, notice: Notice) {
        let _ = self.notices.sender().send(notice);
    }
}
