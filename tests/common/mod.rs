#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use taskweave::model::{TaskNode, TaskPatch, WorkflowGraph};
use taskweave::session::{
    ChannelError, ControlChannel, ControlMessage, ControlTransport, StatusMessage,
};
use taskweave::store::{
    StoreError, StoredWorkflow, WorkflowRecord, WorkflowStore, WorkflowSummary,
};
use taskweave::types::TaskType;

/// Tracing output for async tests; honors `RUST_LOG`.
pub fn init_telemetry() {
    taskweave::telemetry::init();
}

/// Transport double: records every connect and outbound frame, and feeds a
/// scripted sequence of status frames to whichever channel reads first.
/// Once the script is exhausted the channel stays open (reads hang), like a
/// quiet socket.
pub struct MockTransport {
    connects: Mutex<usize>,
    sent: Arc<Mutex<Vec<ControlMessage>>>,
    inbound: Arc<Mutex<VecDeque<StatusMessage>>>,
    fail_connect: bool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Self::with_script(Vec::new())
    }

    pub fn with_script(script: Vec<StatusMessage>) -> Arc<Self> {
        Arc::new(Self {
            connects: Mutex::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
            inbound: Arc::new(Mutex::new(script.into())),
            fail_connect: false,
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            connects: Mutex::new(0),
            sent: Arc::new(Mutex::new(Vec::new())),
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            fail_connect: true,
        })
    }

    pub fn connect_count(&self) -> usize {
        *self.connects.lock().unwrap()
    }

    pub fn sent_frames(&self) -> Vec<ControlMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl ControlTransport for MockTransport {
    async fn connect(&self) -> Result<Box<dyn ControlChannel>, ChannelError> {
        if self.fail_connect {
            return Err(ChannelError::Connect {
                endpoint: "mock://runner".into(),
                message: "connection refused".into(),
            });
        }
        *self.connects.lock().unwrap() += 1;
        Ok(Box::new(MockChannel {
            sent: Arc::clone(&self.sent),
            inbound: Arc::clone(&self.inbound),
        }))
    }
}

struct MockChannel {
    sent: Arc<Mutex<Vec<ControlMessage>>>,
    inbound: Arc<Mutex<VecDeque<StatusMessage>>>,
}

#[async_trait]
impl ControlChannel for MockChannel {
    async fn send(&mut self, frame: ControlMessage) -> Result<(), ChannelError> {
        self.sent.lock().unwrap().push(frame);
        Ok(())
    }

    async fn next_status(&mut self) -> Option<StatusMessage> {
        let next = self.inbound.lock().unwrap().pop_front();
        match next {
            Some(msg) => Some(msg),
            None => std::future::pending().await,
        }
    }

    async fn close(&mut self) {}
}

/// Store double whose every operation fails.
pub struct FailingStore;

#[async_trait]
impl WorkflowStore for FailingStore {
    async fn upsert(
        &self,
        _user: &str,
        _workflow_id: &str,
        _record: WorkflowRecord,
    ) -> Result<(), StoreError> {
        Err(StoreError::Backend {
            message: "write refused".into(),
        })
    }

    async fn get(
        &self,
        _user: &str,
        _workflow_id: &str,
    ) -> Result<Option<StoredWorkflow>, StoreError> {
        Err(StoreError::Backend {
            message: "read refused".into(),
        })
    }

    async fn list(&self, _user: &str) -> Result<Vec<WorkflowSummary>, StoreError> {
        Err(StoreError::Backend {
            message: "list refused".into(),
        })
    }

    async fn delete(&self, _user: &str, _workflow_id: &str) -> Result<(), StoreError> {
        Err(StoreError::Backend {
            message: "delete refused".into(),
        })
    }
}

/// Two shell tasks where `b` depends on `a`.
pub fn two_step_graph() -> WorkflowGraph {
    let mut graph = WorkflowGraph::new();
    let mut a = TaskNode::new("a", "First", TaskType::Shell);
    a.apply(TaskPatch::new().command("echo one"));
    let mut b = TaskNode::new("b", "Second", TaskType::Shell);
    b.apply(TaskPatch::new().command("echo two"));
    graph.add_node(a);
    graph.add_node(b);
    graph.connect("a", "b");
    graph
}
