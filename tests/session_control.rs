mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{FailingStore, MockTransport, two_step_graph};
use taskweave::compiler::compile;
use taskweave::model::{TaskPatch, WorkflowGraph};
use taskweave::notices::{MemorySink, NoticeLevel};
use taskweave::session::{
    ChannelState, ControlMessage, ExecutionSession, NodeUpdate, StatusMessage,
};
use taskweave::store::{InMemoryStore, StaticIdentity};
use taskweave::types::{Position, TaskStatus, TaskType};
use taskweave::workbench::Workbench;

fn update(node_id: &str, status: TaskStatus) -> StatusMessage {
    StatusMessage::NodeUpdate(NodeUpdate::new(node_id).status(status).loading(false))
}

#[tokio::test]
async fn run_sends_start_with_the_serialized_document() {
    let transport = MockTransport::new();
    let mut session = ExecutionSession::new(transport.clone());

    let doc = compile(&two_step_graph(), "Two Step", "");
    session.run(&doc).await.unwrap();

    assert_eq!(session.state(), ChannelState::Open);
    assert_eq!(transport.connect_count(), 1);

    let frames = transport.sent_frames();
    assert_eq!(frames.len(), 1);
    match &frames[0] {
        ControlMessage::Start { workflow } => {
            // The document rides inside the frame as a JSON string.
            let embedded: serde_json::Value = serde_json::from_str(workflow).unwrap();
            assert_eq!(embedded["workflow_name"], "Two Step");
            assert_eq!(embedded["tasks"].as_array().unwrap().len(), 2);
        }
        other => panic!("expected START, got {other:?}"),
    }
}

#[tokio::test]
async fn pause_and_resume_each_open_a_fresh_channel() {
    let transport = MockTransport::new();
    let mut session = ExecutionSession::new(transport.clone());

    session.pause().await.unwrap();
    session.resume().await.unwrap();

    assert_eq!(transport.connect_count(), 2);
    assert_eq!(
        transport.sent_frames(),
        vec![ControlMessage::Pause, ControlMessage::Resume]
    );
}

#[tokio::test]
async fn control_actions_replace_the_previous_channel() {
    let transport = MockTransport::new();
    let mut session = ExecutionSession::new(transport.clone());

    let doc = compile(&two_step_graph(), "Two Step", "");
    session.run(&doc).await.unwrap();
    session.pause().await.unwrap();
    session.teardown().await;

    assert_eq!(transport.connect_count(), 2);
    assert_eq!(session.state(), ChannelState::Closed);
    let frames = transport.sent_frames();
    assert!(matches!(frames[0], ControlMessage::Start { .. }));
    assert_eq!(frames[1], ControlMessage::Pause);
}

#[tokio::test]
async fn failed_connect_closes_the_slot() {
    common::init_telemetry();
    let transport = MockTransport::failing();
    let mut session = ExecutionSession::new(transport.clone());

    let doc = compile(&two_step_graph(), "Two Step", "");
    assert!(session.run(&doc).await.is_err());
    assert_eq!(session.state(), ChannelState::Closed);
    assert!(transport.sent_frames().is_empty());
}

#[tokio::test]
async fn status_updates_arrive_in_order() {
    let transport = MockTransport::with_script(vec![
        update("a", TaskStatus::Running),
        update("a", TaskStatus::Completed),
        update("b", TaskStatus::Running),
    ]);
    let mut session = ExecutionSession::new(transport);

    let doc = compile(&two_step_graph(), "Two Step", "");
    session.run(&doc).await.unwrap();

    let updates = session.updates();
    let mut received = Vec::new();
    for _ in 0..3 {
        let next = tokio::time::timeout(Duration::from_secs(1), updates.recv_async())
            .await
            .expect("status update timed out")
            .unwrap();
        received.push((next.node_id.clone(), next.status));
    }
    assert_eq!(
        received,
        vec![
            ("a".to_string(), Some(TaskStatus::Running)),
            ("a".to_string(), Some(TaskStatus::Completed)),
            ("b".to_string(), Some(TaskStatus::Running)),
        ]
    );
    session.teardown().await;
}

/// Drive a workbench until `expected` inbound updates have been applied.
async fn drain_updates(bench: &mut Workbench, expected: usize) {
    let mut applied = 0;
    for _ in 0..100 {
        applied += bench.apply_pending_updates();
        if applied >= expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("only {applied} of {expected} updates arrived");
}

#[tokio::test]
async fn workbench_reconciles_runner_updates_into_the_graph() {
    common::init_telemetry();
    let transport = MockTransport::with_script(vec![
        update("a", TaskStatus::Running),
        update("a", TaskStatus::Completed),
        update("ghost", TaskStatus::Completed),
        update("b", TaskStatus::Completed),
    ]);
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    for node in two_step_graph().nodes() {
        bench.add_node(node.clone());
    }
    bench.connect("a", "b");

    bench.run().await.unwrap();
    drain_updates(&mut bench, 4).await;

    // The unknown id is tolerated; the known tasks reached their states.
    assert_eq!(bench.graph().node("a").unwrap().status, TaskStatus::Completed);
    assert_eq!(bench.graph().node("b").unwrap().status, TaskStatus::Completed);
    assert!(bench.graph().node("ghost").is_none());
    assert!(bench.is_workflow_completed());

    bench.teardown().await;
}

#[tokio::test]
async fn workbench_pause_resume_tracks_paused_flag() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport.clone(), store, identity);

    bench.add_task(TaskType::Shell, Position::new(0.0, 0.0));
    bench.run().await.unwrap();
    assert!(!bench.is_paused());

    bench.pause().await.unwrap();
    assert!(bench.is_paused());
    bench.resume().await.unwrap();
    assert!(!bench.is_paused());

    let frames = transport.sent_frames();
    assert!(matches!(frames[0], ControlMessage::Start { .. }));
    assert_eq!(&frames[1..], [ControlMessage::Pause, ControlMessage::Resume]);
    bench.teardown().await;
}

#[tokio::test]
async fn workbench_saves_before_running() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    bench.set_workflow_name("Persisted");
    bench.add_task(TaskType::Shell, Position::new(0.0, 0.0));
    bench.run().await.unwrap();

    let id = bench.current_workflow_id().unwrap().to_string();
    let listed = bench.list_workflows().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, id);
    assert_eq!(listed[0].name, "Persisted");
    bench.teardown().await;
}

#[tokio::test]
async fn workbench_import_failure_keeps_prior_graph() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    for node in two_step_graph().nodes() {
        bench.add_node(node.clone());
    }
    bench.connect("a", "b");
    let before = bench.graph().clone();

    assert!(bench.import_json("{\"tasks\": 7}").is_err());
    assert_eq!(bench.graph(), &before);

    // A valid import replaces the graph wholesale.
    let doc = compile(&WorkflowGraph::new(), "Fresh", "");
    bench.import_json(&doc.to_json_pretty().unwrap()).unwrap();
    assert!(bench.graph().is_empty());
    assert_eq!(bench.workflow_name(), "Fresh");
    bench.teardown().await;
}

#[tokio::test]
async fn drained_notices_surface_operation_outcomes() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    let doc = compile(&two_step_graph(), "Imported", "");
    bench.import_json(&doc.to_json_pretty().unwrap()).unwrap();
    bench.run().await.unwrap();

    let seen = bench.notices().drain();
    let messages: Vec<&str> = seen.iter().map(|n| n.message.as_str()).collect();
    assert!(messages.contains(&"Workflow imported successfully"));
    assert!(messages.contains(&"Workflow execution started"));
    assert!(seen.iter().all(|n| n.level == NoticeLevel::Success));
    // Draining empties the queue.
    assert!(bench.notices().drain().is_empty());

    bench.teardown().await;
}

#[tokio::test]
async fn forwarded_sink_receives_notices() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    let sink = MemorySink::new();
    bench.notices().forward_to(sink.clone());

    let doc = compile(&two_step_graph(), "Imported", "");
    bench.import_json(&doc.to_json_pretty().unwrap()).unwrap();

    let mut messages = Vec::new();
    for _ in 0..100 {
        messages = sink.messages();
        if !messages.is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    assert!(messages.contains(&"Workflow imported successfully".to_string()));

    bench.teardown().await;
}

#[tokio::test]
async fn editor_regression_rearms_completion() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    for node in two_step_graph().nodes() {
        bench.add_node(node.clone());
    }
    bench.connect("a", "b");

    bench.apply_update(&NodeUpdate::new("a").status(TaskStatus::Completed));
    bench.apply_update(&NodeUpdate::new("b").status(TaskStatus::Completed));
    assert!(bench.is_workflow_completed());
    bench.notices().drain();

    // An editor-side status change must re-arm the aggregate.
    bench.update_task("a", TaskPatch::new().status(TaskStatus::Running));
    assert!(!bench.is_workflow_completed());

    // The next genuine completion fires the notice again, not silence.
    bench.apply_update(&NodeUpdate::new("a").status(TaskStatus::Completed));
    assert!(bench.is_workflow_completed());
    let messages: Vec<String> = bench
        .notices()
        .drain()
        .iter()
        .map(|n| n.message.clone())
        .collect();
    assert!(messages.contains(&"Workflow execution completed successfully!".to_string()));

    bench.teardown().await;
}

#[tokio::test]
async fn deleting_the_last_incomplete_task_completes_the_workflow() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    for node in two_step_graph().nodes() {
        bench.add_node(node.clone());
    }
    bench.apply_update(&NodeUpdate::new("b").status(TaskStatus::Completed));
    assert!(!bench.is_workflow_completed());

    bench.delete_task("a");
    assert!(bench.is_workflow_completed());
    bench.teardown().await;
}

#[tokio::test]
async fn run_survives_store_failure() {
    common::init_telemetry();
    let transport = MockTransport::new();
    let store = Arc::new(FailingStore);
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport.clone(), store, identity);

    bench.add_task(TaskType::Shell, Position::new(0.0, 0.0));
    bench.run().await.unwrap();

    // START went out even though the save failed.
    assert_eq!(transport.connect_count(), 1);
    assert!(matches!(
        transport.sent_frames()[0],
        ControlMessage::Start { .. }
    ));
    assert!(bench.current_workflow_id().is_none());

    let messages: Vec<String> = bench
        .notices()
        .drain()
        .iter()
        .map(|n| n.message.clone())
        .collect();
    assert!(messages.contains(&"Failed to save workflow".to_string()));
    bench.teardown().await;
}

#[tokio::test]
async fn workbench_export_names_the_file_after_the_workflow() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    bench.set_workflow_name("Nightly Report");
    let (file_name, json) = bench.export_json();
    assert_eq!(file_name, "Nightly Report.json");
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["workflow_name"], "Nightly Report");
    bench.teardown().await;
}

#[tokio::test]
async fn workbench_add_task_generates_prefixed_ids_and_previews() {
    let transport = MockTransport::new();
    let store = Arc::new(InMemoryStore::new());
    let identity = Arc::new(StaticIdentity::new("user-1"));
    let mut bench = Workbench::new(transport, store, identity);

    let id = bench.add_task(TaskType::RestApi, Position::new(120.0, 60.0));
    assert!(id.starts_with("RESTAPI_"));

    let preview: serde_json::Value = serde_json::from_str(bench.preview()).unwrap();
    assert_eq!(preview["tasks"][0]["id"], id.as_str());

    bench.new_workflow();
    assert!(bench.graph().is_empty());
    assert!(bench.current_workflow_id().is_none());
    bench.teardown().await;
}
