//! Load / edit / save lifecycle for one open diagram.
//!
//! The engine is owned by the UI thread and driven through `&mut self`. Store
//! calls run as spawned tasks so the canvas stays interactive while they are
//! outstanding; [`SyncEngine::next_event`] waits for whichever of the pending
//! load, the pending save or the debounce deadline completes first.
//!
//! Saves are serialized: at most one `update` is outstanding, and edits made
//! while it runs lead to exactly one follow-up save. Results belonging to a
//! session that has since been replaced are discarded.
//!
//! A save refused for lack of credentials blocks the session until it is
//! reopened; a save of a diagram that is gone ends the session.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{ErrorClass, SaveStatus, SyncEvent, SyncState};
use crate::client::{ClientError, DiagramApi};
use crate::config::SyncConfig;
use crate::graph::Graph;
use crate::models::{
    CreateDiagramRequest, Diagram, Edge, Node, UpdateDiagramRequest, validate_new_title,
};

/// Outstanding store call tagged with the session it belongs to.
struct InFlight {
    generation: u64,
    diagram_id: Uuid,
    /// Graph revision captured in the request (saves only).
    revision: u64,
    handle: JoinHandle<Result<Diagram, ClientError>>,
}

pub struct SyncEngine {
    api: Arc<dyn DiagramApi>,
    config: SyncConfig,
    graph: Graph,
    state: SyncState,
    title: Option<String>,
    updated_at: Option<DateTime<Utc>>,
    /// Bumped whenever a session begins; stale results carry an older value.
    generation: u64,
    /// Set while a load is written into the graph. Changes observed while it
    /// is set belong to the load, not to the user.
    programmatic: bool,
    saved_revision: u64,
    deadline: Option<Instant>,
    follow_up: bool,
    load: Option<InFlight>,
    save: Option<InFlight>,
    events: VecDeque<SyncEvent>,
}

impl SyncEngine {
    pub fn new(api: Arc<dyn DiagramApi>, config: SyncConfig) -> Self {
        Self {
            api,
            config,
            graph: Graph::new(),
            state: SyncState::Idle,
            title: None,
            updated_at: None,
            generation: 0,
            programmatic: false,
            saved_revision: 0,
            deadline: None,
            follow_up: false,
            load: None,
            save: None,
            events: VecDeque::new(),
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn status(&self) -> Option<SaveStatus> {
        self.state.status()
    }

    pub fn diagram_id(&self) -> Option<Uuid> {
        self.state.diagram_id()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Server timestamp of the last load or accepted save.
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn is_save_scheduled(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn is_save_in_flight(&self) -> bool {
        self.save.is_some()
    }

    /// Graph changed since the last accepted save or load.
    pub fn is_dirty(&self) -> bool {
        self.graph.revision() != self.saved_revision
    }

    /// Start loading `diagram_id`. Any previous session is abandoned: its
    /// pending deadline is cancelled and its outstanding calls are left to
    /// finish with their results ignored.
    ///
    /// Must be called from within a tokio runtime.
    pub fn open(&mut self, diagram_id: Uuid) {
        self.begin_session();
        self.state = SyncState::Loading { diagram_id };

        let api = Arc::clone(&self.api);
        let handle = tokio::spawn(async move { api.get(diagram_id).await });
        self.load = Some(InFlight {
            generation: self.generation,
            diagram_id,
            revision: 0,
            handle,
        });
        info!("Opening diagram {}", diagram_id);
    }

    /// Create a diagram and open it. The title is checked before any request
    /// is made; editing only becomes possible once the server has assigned
    /// the id.
    pub async fn create(&mut self, title: &str) -> Result<Diagram, ClientError> {
        let title = validate_new_title(title).map_err(|e| ClientError::Validation(e.to_string()))?;

        self.begin_session();
        let diagram = self
            .api
            .create(CreateDiagramRequest::titled(title))
            .await
            .inspect_err(|e| warn!("Failed to create diagram: {}", e))?;

        info!("Created diagram {} ({})", diagram.id, diagram.title);
        self.apply_loaded(diagram.clone());
        Ok(diagram)
    }

    /// Leave the current session.
    pub fn close(&mut self) {
        self.begin_session();
    }

    /// Apply a user edit to the graph. Returns `None` without calling `f`
    /// unless a diagram is open for editing.
    pub fn edit<R>(&mut self, f: impl FnOnce(&mut Graph) -> R) -> Option<R> {
        if !matches!(self.state, SyncState::Editing { .. }) {
            debug!("Ignoring edit while {:?}", self.state);
            return None;
        }
        let output = f(&mut self.graph);
        self.observe_changes();
        Some(output)
    }

    /// Wait for the next state transition. Returns `None` when nothing is
    /// loading, saving or scheduled.
    pub async fn next_event(&mut self) -> Option<SyncEvent> {
        loop {
            if let Some(event) = self.events.pop_front() {
                return Some(event);
            }
            if self.load.is_none() && self.save.is_none() && self.deadline.is_none() {
                return None;
            }

            tokio::select! {
                result = join_slot(&mut self.load) => self.finish_load(result),
                result = join_slot(&mut self.save) => {
                    let _ = self.finish_save(result);
                }
                _ = wait_until(self.deadline) => self.on_deadline(),
            }
        }
    }

    /// Drive the engine until nothing is pending, collecting every event.
    pub async fn settle(&mut self) -> Vec<SyncEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    /// Save immediately, bypassing the debounce window. An outstanding save
    /// is awaited first. Does nothing when the diagram is already saved.
    pub async fn save_now(&mut self) -> Result<(), ClientError> {
        if !matches!(self.state, SyncState::Editing { .. }) {
            return Ok(());
        }
        self.deadline = None;

        if self.save.is_some() {
            self.follow_up = false;
            let result = join_slot(&mut self.save).await;
            let outcome = self.finish_save(result);
            if !matches!(self.state, SyncState::Editing { .. }) {
                return outcome;
            }
        }

        if !self.is_dirty() {
            return Ok(());
        }

        self.start_save();
        let result = join_slot(&mut self.save).await;
        self.finish_save(result)
    }

    /// Caller's diagrams for the dashboard.
    pub async fn list(&self) -> Result<Vec<Diagram>, ClientError> {
        self.api.list().await
    }

    /// Permanently delete a diagram, closing the session if it is the one open.
    pub async fn delete(&mut self, diagram_id: Uuid) -> Result<Uuid, ClientError> {
        let deleted = self.api.delete(diagram_id).await?;
        info!("Deleted diagram {}", deleted);
        if self.state.diagram_id() == Some(deleted) {
            self.close();
        }
        Ok(deleted)
    }

    fn begin_session(&mut self) {
        self.generation += 1;
        self.deadline = None;
        self.follow_up = false;
        if let Some(save) = self.save.take() {
            debug!("Detaching outstanding save of {}", save.diagram_id);
        }
        if let Some(load) = self.load.take() {
            debug!("Detaching outstanding load of {}", load.diagram_id);
        }
        self.events.clear();
        self.state = SyncState::Idle;
        self.title = None;
        self.updated_at = None;
        self.replace_graph(Vec::new(), Vec::new());
        self.saved_revision = self.graph.revision();
    }

    fn replace_graph(&mut self, nodes: Vec<Node>, edges: Vec<Edge>) {
        self.programmatic = true;
        self.graph.replace_all(nodes, edges);
        self.observe_changes();
        self.programmatic = false;
    }

    fn apply_loaded(&mut self, diagram: Diagram) {
        let diagram_id = diagram.id;
        self.replace_graph(diagram.nodes, diagram.edges);
        self.saved_revision = self.graph.revision();
        self.title = Some(diagram.title);
        self.updated_at = Some(diagram.updated_at);
        self.state = SyncState::Editing {
            diagram_id,
            status: SaveStatus::Saved,
        };
    }

    /// Classify drained graph changes. Only user changes schedule a save.
    fn observe_changes(&mut self) {
        let changes = self.graph.take_changes();
        if changes.is_empty() {
            return;
        }
        if self.programmatic {
            debug!("{} change(s) attributed to programmatic load", changes.len());
            return;
        }
        if let SyncState::Editing { status, .. } = &mut self.state {
            *status = SaveStatus::Unsaved;
            self.deadline = Some(Instant::now() + self.config.debounce);
            debug!("{} user change(s), autosave rescheduled", changes.len());
        }
    }

    fn set_status(&mut self, new_status: SaveStatus) {
        if let SyncState::Editing { status, .. } = &mut self.state {
            *status = new_status;
        }
    }

    fn on_deadline(&mut self) {
        self.deadline = None;
        if self.save.is_some() {
            debug!("Debounce elapsed during an outstanding save, follow-up queued");
            self.follow_up = true;
            return;
        }
        self.start_save();
    }

    fn start_save(&mut self) {
        let SyncState::Editing { diagram_id, status } = &mut self.state else {
            return;
        };
        let diagram_id = *diagram_id;
        *status = SaveStatus::Saving;

        let revision = self.graph.revision();
        let (nodes, edges) = self.graph.snapshot();
        debug!(
            "Saving diagram {} at revision {} ({} nodes, {} edges)",
            diagram_id,
            revision,
            nodes.len(),
            edges.len()
        );

        let api = Arc::clone(&self.api);
        let request = UpdateDiagramRequest::snapshot(nodes, edges);
        let handle = tokio::spawn(async move { api.update(diagram_id, request).await });
        self.save = Some(InFlight {
            generation: self.generation,
            diagram_id,
            revision,
            handle,
        });
        self.events.push_back(SyncEvent::SaveStarted { diagram_id });
    }

    fn finish_load(&mut self, result: Result<Diagram, ClientError>) {
        let Some(load) = self.load.take() else {
            return;
        };
        if load.generation != self.generation {
            debug!("Discarding stale load of {}", load.diagram_id);
            return;
        }

        match result {
            Ok(diagram) => {
                info!(
                    "Loaded diagram {} ({} nodes, {} edges)",
                    diagram.id,
                    diagram.nodes.len(),
                    diagram.edges.len()
                );
                let title = diagram.title.clone();
                self.apply_loaded(diagram);
                self.events.push_back(SyncEvent::Loaded {
                    diagram_id: load.diagram_id,
                    title,
                });
            }
            Err(error) => {
                warn!("Failed to load diagram {}: {}", load.diagram_id, error);
                self.state = SyncState::Idle;
                let event = match ErrorClass::from(&error) {
                    ErrorClass::NotFoundOrForbidden => SyncEvent::RedirectToList {
                        diagram_id: load.diagram_id,
                    },
                    ErrorClass::Auth => SyncEvent::AccessRestricted,
                    _ => SyncEvent::LoadFailed {
                        diagram_id: load.diagram_id,
                        error,
                    },
                };
                self.events.push_back(event);
            }
        }
    }

    fn finish_save(&mut self, result: Result<Diagram, ClientError>) -> Result<(), ClientError> {
        let Some(save) = self.save.take() else {
            return Ok(());
        };
        if save.generation != self.generation {
            debug!("Discarding stale save of {}", save.diagram_id);
            return Ok(());
        }

        let outcome = match result {
            Ok(diagram) => {
                self.saved_revision = save.revision;
                self.updated_at = Some(diagram.updated_at);
                let status = if self.is_dirty() {
                    SaveStatus::Unsaved
                } else {
                    SaveStatus::Saved
                };
                self.set_status(status);
                info!("Saved diagram {} ({:?})", save.diagram_id, status);
                self.events.push_back(SyncEvent::Saved {
                    diagram_id: save.diagram_id,
                    updated_at: diagram.updated_at,
                });
                Ok(())
            }
            Err(error) => {
                warn!("Failed to save diagram {}: {}", save.diagram_id, error);
                let failed = SyncEvent::SaveFailed {
                    diagram_id: save.diagram_id,
                    error: error.clone(),
                };
                match ErrorClass::from(&error) {
                    ErrorClass::NotFoundOrForbidden => {
                        let reported = std::mem::take(&mut self.events);
                        self.begin_session();
                        self.events = reported;
                        self.events.push_back(failed);
                        self.events.push_back(SyncEvent::RedirectToList {
                            diagram_id: save.diagram_id,
                        });
                    }
                    ErrorClass::Auth => {
                        self.deadline = None;
                        self.follow_up = false;
                        self.state = SyncState::Restricted {
                            diagram_id: save.diagram_id,
                        };
                        self.events.push_back(SyncEvent::AccessRestricted);
                        self.events.push_back(failed);
                    }
                    _ => {
                        self.set_status(SaveStatus::Unsaved);
                        self.events.push_back(failed);
                    }
                }
                Err(error)
            }
        };

        if std::mem::take(&mut self.follow_up) && self.is_dirty() {
            self.start_save();
        }
        outcome
    }
}

/// Resolve the call in `slot`, or never when the slot is empty.
async fn join_slot(slot: &mut Option<InFlight>) -> Result<Diagram, ClientError> {
    let Some(in_flight) = slot else {
        return std::future::pending().await;
    };
    match (&mut in_flight.handle).await {
        Ok(result) => result,
        Err(e) => Err(ClientError::Network(format!("Request task failed: {e}"))),
    }
}

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
