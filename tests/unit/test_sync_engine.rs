//! Sync engine lifecycle tests.
//!
//! Runs the engine against an in-process store with the tokio clock paused,
//! so debounce windows and slow responses are simulated deterministically.

use async_trait::async_trait;
use chrono::Utc;
use diagram_sync::canvas::{CanvasBounds, CanvasController, DataTransfer, EditKey, PALETTE};
use diagram_sync::client::{ClientError, DiagramApi};
use diagram_sync::config::SyncConfig;
use diagram_sync::models::{
    CreateDiagramRequest, Diagram, EdgeAttrs, Node, NodeType, Position, UpdateDiagramRequest,
};
use diagram_sync::sync::{SaveStatus, SyncEngine, SyncEvent, SyncState};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use uuid::Uuid;

const OWNER: &str = "me";

#[derive(Debug, Clone, PartialEq)]
enum Call {
    List,
    Get(Uuid),
    Create(String),
    Update { id: Uuid, nodes: usize, edges: usize },
    Delete(Uuid),
}

#[derive(Default)]
struct MockApi {
    diagrams: Mutex<HashMap<Uuid, Diagram>>,
    calls: Mutex<Vec<Call>>,
    update_failures: Mutex<VecDeque<ClientError>>,
    get_failures: Mutex<VecDeque<ClientError>>,
    update_delay: Mutex<Duration>,
    get_delay: Mutex<Duration>,
    updates_in_flight: Mutex<usize>,
    max_updates_in_flight: Mutex<usize>,
}

impl MockApi {
    fn insert(&self, owner: &str, title: &str, nodes: Vec<Node>) -> Uuid {
        let mut diagram = Diagram::new(owner, title);
        diagram.nodes = nodes;
        let id = diagram.id;
        self.diagrams.lock().unwrap().insert(id, diagram);
        id
    }

    fn stored(&self, id: Uuid) -> Diagram {
        self.diagrams.lock().unwrap()[&id].clone()
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn update_calls(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Update { .. }))
            .collect()
    }

    fn fail_next_update(&self, err: ClientError) {
        self.update_failures.lock().unwrap().push_back(err);
    }

    fn fail_next_get(&self, err: ClientError) {
        self.get_failures.lock().unwrap().push_back(err);
    }

    fn set_update_delay(&self, delay: Duration) {
        *self.update_delay.lock().unwrap() = delay;
    }

    fn set_get_delay(&self, delay: Duration) {
        *self.get_delay.lock().unwrap() = delay;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DiagramApi for MockApi {
    async fn list(&self) -> Result<Vec<Diagram>, ClientError> {
        self.record(Call::List);
        let mut owned: Vec<Diagram> = self
            .diagrams
            .lock()
            .unwrap()
            .values()
            .filter(|d| d.is_owned_by(OWNER))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(owned)
    }

    async fn get(&self, id: Uuid) -> Result<Diagram, ClientError> {
        self.record(Call::Get(id));
        let delay = *self.get_delay.lock().unwrap();
        sleep(delay).await;
        if let Some(err) = self.get_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.diagrams
            .lock()
            .unwrap()
            .get(&id)
            .filter(|d| d.is_owned_by(OWNER))
            .cloned()
            .ok_or(ClientError::NotFoundOrForbidden)
    }

    async fn create(&self, request: CreateDiagramRequest) -> Result<Diagram, ClientError> {
        let title = request.title.unwrap_or_default();
        self.record(Call::Create(title.clone()));
        let id = self.insert(OWNER, &title, request.nodes.unwrap_or_default());
        Ok(self.stored(id))
    }

    async fn update(
        &self,
        id: Uuid,
        request: UpdateDiagramRequest,
    ) -> Result<Diagram, ClientError> {
        self.record(Call::Update {
            id,
            nodes: request.nodes.as_ref().map_or(0, Vec::len),
            edges: request.edges.as_ref().map_or(0, Vec::len),
        });
        {
            let mut in_flight = self.updates_in_flight.lock().unwrap();
            *in_flight += 1;
            let mut max = self.max_updates_in_flight.lock().unwrap();
            *max = (*max).max(*in_flight);
        }

        let delay = *self.update_delay.lock().unwrap();
        sleep(delay).await;
        *self.updates_in_flight.lock().unwrap() -= 1;

        if let Some(err) = self.update_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        let mut diagrams = self.diagrams.lock().unwrap();
        let diagram = diagrams
            .get_mut(&id)
            .filter(|d| d.is_owned_by(OWNER))
            .ok_or(ClientError::NotFoundOrForbidden)?;
        if let Some(nodes) = request.nodes {
            diagram.nodes = nodes;
        }
        if let Some(edges) = request.edges {
            diagram.edges = edges;
        }
        diagram.touch();
        Ok(diagram.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<Uuid, ClientError> {
        self.record(Call::Delete(id));
        self.diagrams
            .lock()
            .unwrap()
            .remove(&id)
            .map(|d| d.id)
            .ok_or(ClientError::NotFoundOrForbidden)
    }
}

fn engine_with(api: &Arc<MockApi>) -> SyncEngine {
    SyncEngine::new(api.clone(), SyncConfig::default())
}

fn node(id: &str, node_type: NodeType) -> Node {
    Node::new(id, node_type, Position::new(0.0, 0.0))
}

async fn open_and_load(engine: &mut SyncEngine, id: Uuid) {
    engine.open(id);
    let events = engine.settle().await;
    assert!(matches!(events.as_slice(), [SyncEvent::Loaded { .. }]));
}

#[tokio::test(start_paused = true)]
async fn test_create_then_first_drop_autosaves_once() {
    let api = Arc::new(MockApi::default());
    let mut engine = engine_with(&api);

    let diagram = engine.create("Flow A").await.unwrap();
    assert_eq!(api.calls(), vec![Call::Create("Flow A".to_string())]);
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
    assert_eq!(engine.title(), Some("Flow A"));

    let added = engine
        .edit(|graph| graph.add_node(NodeType::Rectangle, Position::new(100.0, 100.0)))
        .unwrap();
    let edited_at = Instant::now();
    assert_eq!(added.label(), "rectangle node");
    assert_eq!(added.position, Position::new(100.0, 100.0));
    assert_eq!(engine.status(), Some(SaveStatus::Unsaved));

    // Nothing is sent before the debounce window has elapsed.
    assert!(
        timeout(Duration::from_millis(1999), engine.next_event())
            .await
            .is_err()
    );
    assert!(api.update_calls().is_empty());

    let remaining = Duration::from_millis(2100) - edited_at.elapsed();
    let events = timeout(remaining, engine.settle())
        .await
        .expect("autosave finishes within 2100 ms of the edit");

    assert_eq!(events.len(), 2);
    assert_eq!(
        events[0],
        SyncEvent::SaveStarted {
            diagram_id: diagram.id
        }
    );
    assert!(matches!(events[1], SyncEvent::Saved { diagram_id, .. } if diagram_id == diagram.id));
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
    assert_eq!(
        api.update_calls(),
        vec![Call::Update {
            id: diagram.id,
            nodes: 1,
            edges: 0
        }]
    );
    assert_eq!(engine.updated_at(), Some(api.stored(diagram.id).updated_at));
}

#[tokio::test(start_paused = true)]
async fn test_short_title_makes_no_request() {
    let api = Arc::new(MockApi::default());
    let mut engine = engine_with(&api);

    let err = engine.create("ab").await.unwrap_err();

    assert!(matches!(err, ClientError::Validation(_)));
    assert!(api.calls().is_empty());
    assert_eq!(engine.state(), SyncState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_load_does_not_trigger_save() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(
        OWNER,
        "Existing",
        vec![node("a", NodeType::Circle), node("b", NodeType::Diamond)],
    );
    let mut engine = engine_with(&api);

    engine.open(id);
    assert_eq!(engine.state(), SyncState::Loading { diagram_id: id });
    assert_eq!(engine.edit(|_| ()), None);

    let events = engine.settle().await;
    assert_eq!(
        events,
        vec![SyncEvent::Loaded {
            diagram_id: id,
            title: "Existing".to_string()
        }]
    );
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
    assert_eq!(engine.graph().nodes().len(), 2);
    assert!(!engine.is_save_scheduled());

    sleep(Duration::from_secs(10)).await;
    assert_eq!(engine.next_event().await, None);
    assert!(api.update_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_edits_coalesces_into_one_save() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", vec![node("a", NodeType::Rectangle)]);
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    for step in 1..=5 {
        engine.edit(|graph| graph.move_node("a", Position::new(step as f64 * 10.0, 0.0)));
        sleep(Duration::from_millis(500)).await;
    }

    let events = engine.settle().await;
    assert!(matches!(
        events.as_slice(),
        [SyncEvent::SaveStarted { .. }, SyncEvent::Saved { .. }]
    ));
    assert_eq!(api.update_calls().len(), 1);
    assert_eq!(api.stored(id).nodes[0].position, Position::new(50.0, 0.0));
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_keeps_graph_until_manual_retry() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    api.fail_next_update(ClientError::Network("connection reset".to_string()));
    engine.edit(|graph| graph.add_node(NodeType::Text, Position::new(5.0, 5.0)));

    let events = engine.settle().await;
    assert!(matches!(
        events.as_slice(),
        [SyncEvent::SaveStarted { .. }, SyncEvent::SaveFailed { error: ClientError::Network(_), .. }]
    ));
    assert_eq!(engine.status(), Some(SaveStatus::Unsaved));
    assert_eq!(engine.graph().nodes().len(), 1);
    assert!(api.stored(id).nodes.is_empty());

    // No automatic retry without a further edit.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(engine.next_event().await, None);
    assert_eq!(api.update_calls().len(), 1);

    engine.save_now().await.unwrap();
    assert_eq!(api.update_calls().len(), 2);
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
    assert_eq!(api.stored(id).nodes.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_save_now_when_saved_is_a_no_op() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    engine.save_now().await.unwrap();

    assert!(api.update_calls().is_empty());
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
}

#[tokio::test(start_paused = true)]
async fn test_save_now_skips_debounce() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    engine.edit(|graph| graph.add_node(NodeType::Circle, Position::new(1.0, 1.0)));
    engine.save_now().await.unwrap();

    assert_eq!(api.update_calls().len(), 1);
    assert!(!engine.is_save_scheduled());
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
}

#[tokio::test(start_paused = true)]
async fn test_edits_during_slow_save_get_exactly_one_follow_up() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    api.set_update_delay(Duration::from_secs(5));
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    engine.edit(|graph| graph.add_node(NodeType::Rectangle, Position::new(0.0, 0.0)));
    assert!(matches!(
        engine.next_event().await,
        Some(SyncEvent::SaveStarted { .. })
    ));

    // Both debounce windows below elapse while the first save is outstanding.
    engine.edit(|graph| graph.add_node(NodeType::Circle, Position::new(10.0, 0.0)));
    engine.edit(|graph| graph.add_node(NodeType::Diamond, Position::new(20.0, 0.0)));
    assert!(engine.is_save_in_flight());

    let saved = engine.next_event().await;
    assert!(matches!(saved, Some(SyncEvent::Saved { .. })));
    // The response covers an older revision.
    assert_ne!(engine.status(), Some(SaveStatus::Saved));

    let rest = engine.settle().await;
    assert!(matches!(
        rest.as_slice(),
        [SyncEvent::SaveStarted { .. }, SyncEvent::Saved { .. }]
    ));

    let updates = api.update_calls();
    assert_eq!(updates.len(), 2);
    assert_eq!(
        updates[1],
        Call::Update {
            id,
            nodes: 3,
            edges: 0
        }
    );
    assert_eq!(*api.max_updates_in_flight.lock().unwrap(), 1);
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
}

#[tokio::test(start_paused = true)]
async fn test_edit_after_save_started_uses_debounce_for_follow_up() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", vec![node("a", NodeType::Rectangle)]);
    api.set_update_delay(Duration::from_millis(500));
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    engine.edit(|graph| graph.relabel_node("a", "first"));
    assert!(matches!(
        engine.next_event().await,
        Some(SyncEvent::SaveStarted { .. })
    ));
    engine.edit(|graph| graph.relabel_node("a", "second"));

    let events = engine.settle().await;
    assert_eq!(events.len(), 3);
    assert_eq!(api.update_calls().len(), 2);
    assert_eq!(api.stored(id).nodes[0].label(), "second");
    assert_eq!(*api.max_updates_in_flight.lock().unwrap(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_stale_load_is_discarded_after_switching() {
    let api = Arc::new(MockApi::default());
    let first = api.insert(OWNER, "First", vec![node("x", NodeType::Circle)]);
    let second = api.insert(
        OWNER,
        "Second",
        vec![node("y", NodeType::Text), node("z", NodeType::Text)],
    );
    api.set_get_delay(Duration::from_secs(1));
    let mut engine = engine_with(&api);

    engine.open(first);
    sleep(Duration::from_millis(200)).await;
    engine.open(second);

    let events = engine.settle().await;
    assert_eq!(
        events,
        vec![SyncEvent::Loaded {
            diagram_id: second,
            title: "Second".to_string()
        }]
    );
    assert_eq!(engine.diagram_id(), Some(second));
    assert!(engine.graph().contains_node("y"));
    assert!(!engine.graph().contains_node("x"));
}

#[tokio::test(start_paused = true)]
async fn test_stale_save_does_not_touch_new_session() {
    let api = Arc::new(MockApi::default());
    let first = api.insert(OWNER, "First", Vec::new());
    let second = api.insert(OWNER, "Second", Vec::new());
    api.set_update_delay(Duration::from_secs(3));
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, first).await;

    engine.edit(|graph| graph.add_node(NodeType::Rectangle, Position::new(0.0, 0.0)));
    assert!(matches!(
        engine.next_event().await,
        Some(SyncEvent::SaveStarted { .. })
    ));

    open_and_load(&mut engine, second).await;
    sleep(Duration::from_secs(5)).await;

    assert_eq!(engine.next_event().await, None);
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
    assert_eq!(engine.diagram_id(), Some(second));
    // The detached request still completed on the server.
    assert_eq!(api.stored(first).nodes.len(), 1);
    assert!(api.stored(second).nodes.is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_closing_cancels_pending_autosave() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    engine.edit(|graph| graph.add_node(NodeType::Rectangle, Position::new(0.0, 0.0)));
    engine.close();
    sleep(Duration::from_secs(5)).await;

    assert_eq!(engine.next_event().await, None);
    assert_eq!(engine.state(), SyncState::Idle);
    assert!(engine.graph().nodes().is_empty());
    assert!(api.update_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_foreign_diagram_redirects_to_list() {
    let api = Arc::new(MockApi::default());
    let foreign = api.insert("someone-else", "Theirs", vec![node("a", NodeType::Circle)]);
    let mut engine = engine_with(&api);

    engine.open(foreign);
    let events = engine.settle().await;

    assert_eq!(
        events,
        vec![SyncEvent::RedirectToList {
            diagram_id: foreign
        }]
    );
    assert_eq!(engine.state(), SyncState::Idle);
    assert!(engine.graph().nodes().is_empty());
    assert!(api.update_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credential_on_load_restricts_access() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    api.fail_next_get(ClientError::Auth("expired".to_string()));
    let mut engine = engine_with(&api);

    engine.open(id);
    assert_eq!(engine.settle().await, vec![SyncEvent::AccessRestricted]);
    assert_eq!(engine.state(), SyncState::Idle);
    assert!(api.update_calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_rejected_credential_on_save_blocks_session() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    api.fail_next_update(ClientError::Auth("expired".to_string()));
    engine.edit(|graph| graph.add_node(NodeType::Text, Position::new(0.0, 0.0)));

    let events = engine.settle().await;
    assert_eq!(
        events,
        vec![
            SyncEvent::SaveStarted { diagram_id: id },
            SyncEvent::AccessRestricted,
            SyncEvent::SaveFailed {
                diagram_id: id,
                error: ClientError::Auth("expired".to_string()),
            },
        ]
    );
    assert_eq!(engine.state(), SyncState::Restricted { diagram_id: id });
    assert_eq!(engine.graph().nodes().len(), 1);

    // No further edits or saves until the diagram is opened again.
    assert!(
        engine
            .edit(|graph| graph.add_node(NodeType::Circle, Position::new(10.0, 10.0)))
            .is_none()
    );
    assert!(!engine.is_save_scheduled());
    engine.save_now().await.unwrap();
    assert!(engine.settle().await.is_empty());
    assert_eq!(api.update_calls().len(), 1);

    open_and_load(&mut engine, id).await;
    assert_eq!(engine.status(), Some(SaveStatus::Saved));
    assert!(
        engine
            .edit(|graph| graph.add_node(NodeType::Circle, Position::new(10.0, 10.0)))
            .is_some()
    );
}

#[tokio::test(start_paused = true)]
async fn test_save_of_vanished_diagram_redirects_to_list() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    api.fail_next_update(ClientError::NotFoundOrForbidden);
    engine.edit(|graph| graph.add_node(NodeType::Rectangle, Position::new(0.0, 0.0)));

    let events = engine.settle().await;
    assert_eq!(
        events,
        vec![
            SyncEvent::SaveStarted { diagram_id: id },
            SyncEvent::SaveFailed {
                diagram_id: id,
                error: ClientError::NotFoundOrForbidden,
            },
            SyncEvent::RedirectToList { diagram_id: id },
        ]
    );
    assert_eq!(engine.state(), SyncState::Idle);
    assert!(engine.graph().nodes().is_empty());

    assert!(
        engine
            .edit(|graph| graph.add_node(NodeType::Circle, Position::new(0.0, 0.0)))
            .is_none()
    );
    assert!(engine.settle().await.is_empty());
    assert_eq!(api.update_calls().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_manual_save_rejected_for_vanished_diagram() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    api.fail_next_update(ClientError::NotFoundOrForbidden);
    engine.edit(|graph| graph.add_node(NodeType::Rectangle, Position::new(0.0, 0.0)));

    assert_eq!(
        engine.save_now().await,
        Err(ClientError::NotFoundOrForbidden)
    );
    assert_eq!(engine.state(), SyncState::Idle);
    assert_eq!(
        engine.settle().await,
        vec![
            SyncEvent::SaveStarted { diagram_id: id },
            SyncEvent::SaveFailed {
                diagram_id: id,
                error: ClientError::NotFoundOrForbidden,
            },
            SyncEvent::RedirectToList { diagram_id: id },
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_load_failure_reports_error() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    api.fail_next_get(ClientError::Server {
        status: 500,
        message: "boom".to_string(),
    });
    let mut engine = engine_with(&api);

    engine.open(id);
    let events = engine.settle().await;

    assert!(matches!(
        events.as_slice(),
        [SyncEvent::LoadFailed { error: ClientError::Server { status: 500, .. }, .. }]
    ));
    assert_eq!(engine.state(), SyncState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_delete_open_diagram_closes_session() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(OWNER, "Existing", Vec::new());
    let other = api.insert(OWNER, "Other", Vec::new());
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    assert_eq!(engine.delete(other).await.unwrap(), other);
    assert_eq!(engine.diagram_id(), Some(id));

    assert_eq!(engine.delete(id).await.unwrap(), id);
    assert_eq!(engine.state(), SyncState::Idle);

    assert!(engine.list().await.unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_connect_and_cascade_are_saved_together() {
    let api = Arc::new(MockApi::default());
    let id = api.insert(
        OWNER,
        "Existing",
        vec![node("a", NodeType::Rectangle), node("b", NodeType::Circle)],
    );
    let mut engine = engine_with(&api);
    open_and_load(&mut engine, id).await;

    let edge = engine
        .edit(|graph| graph.connect("a", "b", EdgeAttrs::default()))
        .flatten();
    assert!(edge.is_some());
    engine.settle().await;
    assert_eq!(api.stored(id).edges.len(), 1);

    engine.edit(|graph| graph.remove_node("b"));
    engine.settle().await;

    let stored = api.stored(id);
    assert_eq!(stored.nodes.len(), 1);
    assert!(stored.edges.is_empty());
    assert!(stored.updated_at <= Utc::now());
}

#[tokio::test(start_paused = true)]
async fn test_canvas_gestures_flow_through_autosave() {
    let api = Arc::new(MockApi::default());
    let mut engine = engine_with(&api);
    let mut canvas = CanvasController::new();
    let diagram = engine.create("Flow A").await.unwrap();

    let mut transfer = DataTransfer::new();
    CanvasController::start_palette_drag(&PALETTE[3], &mut transfer);
    let bounds = CanvasBounds::new(20.0, 10.0);
    let dropped = engine
        .edit(|graph| canvas.drop(graph, &transfer, Position::new(120.0, 50.0), bounds))
        .flatten()
        .unwrap();
    assert_eq!(dropped.position, Position::new(100.0, 40.0));

    // Editing the label only mutates the graph on commit.
    engine.edit(|graph| canvas.double_click(graph, &dropped.id));
    canvas.label_input("Start here");
    engine.edit(|graph| canvas.key(graph, EditKey::Enter));

    engine.settle().await;
    let stored = api.stored(diagram.id);
    assert_eq!(stored.nodes.len(), 1);
    assert_eq!(stored.nodes[0].label(), "Start here");
    assert_eq!(api.update_calls().len(), 1);

    // A drop without a palette tag is ignored and schedules nothing.
    let empty = DataTransfer::new();
    assert_eq!(
        engine
            .edit(|graph| canvas.drop(graph, &empty, Position::new(0.0, 0.0), bounds))
            .flatten(),
        None
    );
    assert!(!engine.is_save_scheduled());
}
