//! The compiled, directly-executable workflow graph.
//!
//! Nodes live in a stable graph arena; every cross-reference (flow endpoints,
//! attached boundary events, event-gateway race sets, message links) is an
//! arena or catalog key resolved by lookup, never a pointer. After
//! compilation succeeds the whole structure is immutable and can be shared
//! read-only across runtime workers.

use crate::error::TransformError;
use crate::expr::{CompiledCondition, CompiledQuery};
use crate::lifecycle::{BindingTable, Step};
use crate::timer::CompiledTimer;
use petgraph::stable_graph::StableDiGraph;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Arena key of a compiled node.
pub type NodeKey = petgraph::stable_graph::NodeIndex;
/// Arena key of a compiled sequence flow.
pub type FlowKey = petgraph::stable_graph::EdgeIndex;
/// Catalog key of a compiled message.
pub type MessageKey = usize;
/// Catalog key of a compiled error.
pub type ErrorKey = usize;

/// Structural element-type tag stamped on every compiled node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ElementType {
    Process,
    SubProcess,
    StartEvent,
    EndEvent,
    IntermediateCatchEvent,
    BoundaryEvent,
    ServiceTask,
    ReceiveTask,
    CallActivity,
    ExclusiveGateway,
    ParallelGateway,
    EventBasedGateway,
    SequenceFlow,
    MultiInstanceBody,
}

impl ElementType {
    pub fn name(self) -> &'static str {
        match self {
            ElementType::Process => "process",
            ElementType::SubProcess => "sub-process",
            ElementType::StartEvent => "start-event",
            ElementType::EndEvent => "end-event",
            ElementType::IntermediateCatchEvent => "intermediate-catch-event",
            ElementType::BoundaryEvent => "boundary-event",
            ElementType::ServiceTask => "service-task",
            ElementType::ReceiveTask => "receive-task",
            ElementType::CallActivity => "call-activity",
            ElementType::ExclusiveGateway => "exclusive-gateway",
            ElementType::ParallelGateway => "parallel-gateway",
            ElementType::EventBasedGateway => "event-based-gateway",
            ElementType::SequenceFlow => "sequence-flow",
            ElementType::MultiInstanceBody => "multi-instance-body",
        }
    }
}

// ── Node payloads ──

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingKind {
    Input,
    Output,
}

/// One compiled data-mapping operation, applied in declaration order.
#[derive(Debug, Clone)]
pub struct MappingOp {
    pub kind: MappingKind,
    pub source: CompiledQuery,
    pub target: CompiledQuery,
}

/// State shared by every activity variant: the boundary events attached to
/// it. Boundary events are reachable only through this relation, never as
/// normal flow targets.
#[derive(Debug, Clone, Default)]
pub struct ActivityData {
    pub boundary_events: Vec<NodeKey>,
}

#[derive(Debug, Clone)]
pub enum EventTrigger {
    Message(MessageKey),
    Timer(CompiledTimer),
    Error(ErrorKey),
}

#[derive(Debug, Clone, Default)]
pub struct CatchEventData {
    pub trigger: Option<EventTrigger>,
    /// Boundary events only: whether firing interrupts the host activity.
    pub cancel_activity: bool,
}

#[derive(Debug, Clone)]
pub enum CalledElement {
    Literal(String),
    Expression(CompiledQuery),
}

/// Compiled multi-instance loop characteristics.
#[derive(Debug, Clone)]
pub struct LoopCharacteristics {
    pub sequential: bool,
    pub input_collection: CompiledQuery,
    pub input_element: Option<String>,
}

impl LoopCharacteristics {
    pub fn is_sequential(&self) -> bool {
        self.sequential
    }
}

#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The workflow's own container node, registered under the process id.
    Process,
    EndEvent {
        terminate: bool,
    },
    /// Start, intermediate, and boundary events all carry catch-event state.
    CatchEvent(CatchEventData),
    ServiceTask {
        activity: ActivityData,
        task_type: String,
        retries: u32,
        /// Encoded header blob (see `encoding`). Empty when none declared.
        headers: Vec<u8>,
    },
    ReceiveTask {
        activity: ActivityData,
        message: Option<MessageKey>,
    },
    CallActivity {
        activity: ActivityData,
        called: Option<CalledElement>,
    },
    SubProcess {
        activity: ActivityData,
        start_events: Vec<NodeKey>,
    },
    ExclusiveGateway {
        default_flow: Option<FlowKey>,
    },
    ParallelGateway,
    EventBasedGateway {
        /// Catch events reachable via the gateway's immediate outgoing flows
        /// — the race set the runtime activates together.
        events: Vec<NodeKey>,
    },
    MultiInstanceBody {
        inner: NodeKey,
        loop_characteristics: LoopCharacteristics,
    },
}

/// One compiled graph node.
#[derive(Debug, Clone)]
pub struct CompiledNode {
    pub id: String,
    pub element_type: ElementType,
    pub bindings: BindingTable,
    pub mappings: Vec<MappingOp>,
    pub kind: NodeKind,
}

impl CompiledNode {
    pub fn new(id: &str, element_type: ElementType, kind: NodeKind) -> Self {
        Self {
            id: id.to_string(),
            element_type,
            bindings: BindingTable::new(),
            mappings: Vec::new(),
            kind,
        }
    }

    /// Activity state, if this node kind carries any.
    pub fn try_activity(&self) -> Option<&ActivityData> {
        match &self.kind {
            NodeKind::ServiceTask { activity, .. }
            | NodeKind::ReceiveTask { activity, .. }
            | NodeKind::CallActivity { activity, .. }
            | NodeKind::SubProcess { activity, .. } => Some(activity),
            _ => None,
        }
    }

    pub fn try_activity_mut(&mut self) -> Option<&mut ActivityData> {
        match &mut self.kind {
            NodeKind::ServiceTask { activity, .. }
            | NodeKind::ReceiveTask { activity, .. }
            | NodeKind::CallActivity { activity, .. }
            | NodeKind::SubProcess { activity, .. } => Some(activity),
            _ => None,
        }
    }

    /// Activity state. Panics if the node is not an activity — callers ask
    /// for a variant they instantiated themselves, so a mismatch is a
    /// compiler defect, not bad input.
    pub fn activity(&self) -> &ActivityData {
        self.try_activity()
            .unwrap_or_else(|| panic!("element '{}' is not an activity", self.id))
    }

    pub fn activity_mut(&mut self) -> &mut ActivityData {
        let id = self.id.clone();
        self.try_activity_mut()
            .unwrap_or_else(|| panic!("element '{id}' is not an activity"))
    }

    /// Catch-event state. Panics on variant mismatch (compiler defect).
    pub fn catch_event(&self) -> &CatchEventData {
        match &self.kind {
            NodeKind::CatchEvent(data) => data,
            _ => panic!("element '{}' is not a catch event", self.id),
        }
    }

    pub fn catch_event_mut(&mut self) -> &mut CatchEventData {
        match &mut self.kind {
            NodeKind::CatchEvent(data) => data,
            _ => panic!("element '{}' is not a catch event", self.id),
        }
    }
}

// ── Sequence flows ──

/// Typed edge between compiled nodes.
#[derive(Debug, Clone)]
pub struct CompiledFlow {
    pub id: String,
    pub condition: Option<CompiledCondition>,
    /// Step dispatched when the flow is taken. Merging into a parallel
    /// gateway coordinates with sibling flows and uses a distinct step.
    pub taken_step: Step,
}

// ── Shared catalog entries ──

#[derive(Debug, Clone)]
pub struct CompiledMessage {
    pub id: String,
    pub name: String,
    pub correlation_key: Option<CompiledQuery>,
}

#[derive(Debug, Clone)]
pub struct CompiledError {
    pub id: String,
    pub code: String,
}

// ── Workflow ──

/// Root of one compiled process definition. Owns every node reachable from
/// it; the id index is the single source of truth for element identity. The
/// process itself is an element too: a container node registered under the
/// process id, so the runtime resolves the scope through the same lookup as
/// any flow node.
#[derive(Debug, Clone)]
pub struct CompiledWorkflow {
    id: String,
    element_type: ElementType,
    container: NodeKey,
    graph: StableDiGraph<CompiledNode, CompiledFlow>,
    index: BTreeMap<String, NodeKey>,
    flow_index: BTreeMap<String, FlowKey>,
    start_events: Vec<NodeKey>,
}

impl CompiledWorkflow {
    pub fn new(id: &str) -> Self {
        let mut graph = StableDiGraph::new();
        let container = graph.add_node(CompiledNode::new(
            id,
            ElementType::Process,
            NodeKind::Process,
        ));
        let mut index = BTreeMap::new();
        index.insert(id.to_string(), container);
        Self {
            id: id.to_string(),
            element_type: ElementType::Process,
            container,
            graph,
            index,
            flow_index: BTreeMap::new(),
            start_events: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Key of the workflow's own container node.
    pub fn container(&self) -> NodeKey {
        self.container
    }

    /// The container node's lifecycle table.
    pub fn bindings(&self) -> &BindingTable {
        &self.node(self.container).bindings
    }

    pub fn bindings_mut(&mut self) -> &mut BindingTable {
        let container = self.container;
        &mut self.node_mut(container).bindings
    }

    /// Top-level start events, in registration order.
    pub fn start_events(&self) -> &[NodeKey] {
        &self.start_events
    }

    pub fn add_start_event(&mut self, key: NodeKey) {
        self.start_events.push(key);
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn flow_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Insert a freshly constructed node, indexing it by id. Element ids are
    /// one namespace — a node may not reuse a sequence flow's id either.
    pub fn insert_node(&mut self, node: CompiledNode) -> Result<NodeKey, TransformError> {
        if self.index.contains_key(&node.id) || self.flow_index.contains_key(&node.id) {
            return Err(TransformError::DuplicateElement {
                element_id: node.id,
            });
        }
        let id = node.id.clone();
        let key = self.graph.add_node(node);
        self.index.insert(id, key);
        Ok(key)
    }

    /// Wire a sequence flow between two existing nodes.
    pub fn insert_flow(
        &mut self,
        source: NodeKey,
        target: NodeKey,
        flow: CompiledFlow,
    ) -> Result<FlowKey, TransformError> {
        if self.flow_index.contains_key(&flow.id) || self.index.contains_key(&flow.id) {
            return Err(TransformError::DuplicateElement { element_id: flow.id });
        }
        let id = flow.id.clone();
        let key = self.graph.add_edge(source, target, flow);
        self.flow_index.insert(id, key);
        Ok(key)
    }

    pub fn lookup(&self, id: &str) -> Option<NodeKey> {
        self.index.get(id).copied()
    }

    pub fn lookup_flow(&self, id: &str) -> Option<FlowKey> {
        self.flow_index.get(id).copied()
    }

    /// Key of an element instantiated earlier in this compilation. A missing
    /// id here means a transformer ran before the factory — a compiler
    /// defect, so this fails fast.
    pub fn key_of(&self, id: &str) -> NodeKey {
        self.lookup(id)
            .unwrap_or_else(|| panic!("element '{id}' was never instantiated"))
    }

    pub fn node(&self, key: NodeKey) -> &CompiledNode {
        self.graph
            .node_weight(key)
            .unwrap_or_else(|| panic!("stale node key {key:?}"))
    }

    pub fn node_mut(&mut self, key: NodeKey) -> &mut CompiledNode {
        self.graph
            .node_weight_mut(key)
            .unwrap_or_else(|| panic!("stale node key {key:?}"))
    }

    pub fn flow(&self, key: FlowKey) -> &CompiledFlow {
        self.graph
            .edge_weight(key)
            .unwrap_or_else(|| panic!("stale flow key {key:?}"))
    }

    pub fn flow_mut(&mut self, key: FlowKey) -> &mut CompiledFlow {
        self.graph
            .edge_weight_mut(key)
            .unwrap_or_else(|| panic!("stale flow key {key:?}"))
    }

    pub fn flow_endpoints(&self, key: FlowKey) -> (NodeKey, NodeKey) {
        self.graph
            .edge_endpoints(key)
            .unwrap_or_else(|| panic!("stale flow key {key:?}"))
    }

    pub fn incoming(&self, key: NodeKey) -> Vec<FlowKey> {
        let mut flows: Vec<FlowKey> = self
            .graph
            .edges_directed(key, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        flows.reverse(); // petgraph yields adjacency in reverse insertion order
        flows
    }

    pub fn outgoing(&self, key: NodeKey) -> Vec<FlowKey> {
        let mut flows: Vec<FlowKey> = self
            .graph
            .edges_directed(key, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        flows.reverse();
        flows
    }

    /// Swap the registered element under `id` for a wrapping node.
    ///
    /// The wrapper takes over the element's external connectivity: every
    /// flow touching the wrapped node is re-pointed at the wrapper, and the
    /// id index is updated to resolve to the wrapper. The wrapped node stays
    /// in the arena, reachable only through the wrapper.
    pub fn replace_element(&mut self, id: &str, wrapper: CompiledNode) -> NodeKey {
        let inner = self.key_of(id);
        let key = self.graph.add_node(wrapper);

        let incoming: Vec<FlowKey> = self
            .graph
            .edges_directed(inner, Direction::Incoming)
            .map(|e| e.id())
            .collect();
        for flow_key in incoming {
            let Some((source, _)) = self.graph.edge_endpoints(flow_key) else {
                continue;
            };
            let Some(flow) = self.graph.remove_edge(flow_key) else {
                continue;
            };
            let flow_id = flow.id.clone();
            let moved = self.graph.add_edge(source, key, flow);
            self.flow_index.insert(flow_id, moved);
        }

        let outgoing: Vec<FlowKey> = self
            .graph
            .edges_directed(inner, Direction::Outgoing)
            .map(|e| e.id())
            .collect();
        for flow_key in outgoing {
            let Some((_, target)) = self.graph.edge_endpoints(flow_key) else {
                continue;
            };
            let Some(flow) = self.graph.remove_edge(flow_key) else {
                continue;
            };
            let flow_id = flow.id.clone();
            let moved = self.graph.add_edge(key, target, flow);
            self.flow_index.insert(flow_id, moved);
        }

        self.index.insert(id.to_string(), key);
        key
    }

    /// Nodes in id order (index walk — deterministic).
    pub fn nodes(&self) -> impl Iterator<Item = (NodeKey, &CompiledNode)> + '_ {
        self.index.values().map(move |key| (*key, self.node(*key)))
    }

    /// Flows in id order.
    pub fn flows(&self) -> impl Iterator<Item = (FlowKey, &CompiledFlow)> + '_ {
        self.flow_index
            .values()
            .map(move |key| (*key, self.flow(*key)))
    }

    fn fingerprint_into(&self, hasher: &mut Sha256) {
        hasher.update(self.id.as_bytes());
        hasher.update(self.element_type.name().as_bytes());
        // The container node's table is covered by the node walk below.
        for (_, node) in self.nodes() {
            hasher.update(node.id.as_bytes());
            hasher.update(node.element_type.name().as_bytes());
            for (state, step) in node.bindings.iter() {
                hasher.update(state.name().as_bytes());
                hasher.update(step.name().as_bytes());
            }
            for op in &node.mappings {
                hasher.update(op.source.expression().as_bytes());
                hasher.update(op.target.expression().as_bytes());
            }
            hasher.update(format!("{:?}", node.kind).as_bytes());
        }
        for (key, flow) in self.flows() {
            let (source, target) = self.flow_endpoints(key);
            hasher.update(flow.id.as_bytes());
            hasher.update(self.node(source).id.as_bytes());
            hasher.update(self.node(target).id.as_bytes());
            if let Some(condition) = &flow.condition {
                hasher.update(condition.expression().as_bytes());
            }
            hasher.update(flow.taken_step.name().as_bytes());
        }
    }
}

// ── Compiled definitions ──

/// The complete compiler output: one workflow per declared process, plus the
/// message and error catalogs the workflows reference by key.
#[derive(Debug, Clone)]
pub struct CompiledDefinitions {
    workflows: BTreeMap<String, CompiledWorkflow>,
    messages: Vec<CompiledMessage>,
    errors: Vec<CompiledError>,
}

impl CompiledDefinitions {
    pub(crate) fn new(
        workflows: BTreeMap<String, CompiledWorkflow>,
        messages: Vec<CompiledMessage>,
        errors: Vec<CompiledError>,
    ) -> Self {
        Self {
            workflows,
            messages,
            errors,
        }
    }

    pub fn workflow(&self, id: &str) -> Option<&CompiledWorkflow> {
        self.workflows.get(id)
    }

    pub fn workflows(&self) -> impl Iterator<Item = &CompiledWorkflow> + '_ {
        self.workflows.values()
    }

    pub fn workflow_count(&self) -> usize {
        self.workflows.len()
    }

    pub fn message(&self, key: MessageKey) -> &CompiledMessage {
        &self.messages[key]
    }

    pub fn messages(&self) -> &[CompiledMessage] {
        &self.messages
    }

    pub fn error(&self, key: ErrorKey) -> &CompiledError {
        &self.errors[key]
    }

    pub fn errors(&self) -> &[CompiledError] {
        &self.errors
    }

    /// SHA-256 over a canonical walk of the compiled output — the version
    /// key for a deployment. Identical definitions compile to identical
    /// fingerprints.
    pub fn fingerprint(&self) -> [u8; 32] {
        let mut hasher = Sha256::new();
        for workflow in self.workflows.values() {
            workflow.fingerprint_into(&mut hasher);
        }
        for message in &self.messages {
            hasher.update(message.id.as_bytes());
            hasher.update(message.name.as_bytes());
            if let Some(key) = &message.correlation_key {
                hasher.update(key.expression().as_bytes());
            }
        }
        for error in &self.errors {
            hasher.update(error.id.as_bytes());
            hasher.update(error.code.as_bytes());
        }
        hasher.finalize().into()
    }
}
