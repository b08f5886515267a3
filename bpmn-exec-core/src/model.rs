//! The read-only source element tree.
//!
//! This is the shape the external BPMN parser hands over: typed elements
//! with stable string ids, structural links (source/target, attached-to,
//! nested scopes), and extension metadata. The compiler only consumes it.

use serde::{Deserialize, Serialize};

// ── Serde defaults ──

fn default_true() -> bool {
    true
}

fn default_retries() -> u32 {
    3
}

// ── Top-level definitions ──

/// One parsed deployment: processes plus the shared message/error
/// declarations they reference.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Definitions {
    #[serde(default)]
    pub processes: Vec<ProcessDecl>,
    #[serde(default)]
    pub messages: Vec<MessageDecl>,
    #[serde(default)]
    pub errors: Vec<ErrorDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDecl {
    pub id: String,
    #[serde(default)]
    pub elements: Vec<FlowElement>,
}

/// A named message, optionally carrying a correlation-key subscription.
/// A message with no name is decorative metadata and is never registered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDecl {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub subscription: Option<SubscriptionDecl>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionDecl {
    pub correlation_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDecl {
    pub id: String,
    pub code: String,
}

// ── Flow elements (closed tagged enum) ──

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum FlowElement {
    StartEvent {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<EventDefinitionDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    EndEvent {
        id: String,
        #[serde(default)]
        terminate: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    IntermediateCatchEvent {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<EventDefinitionDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    BoundaryEvent {
        id: String,
        attached_to: String,
        #[serde(default = "default_true")]
        cancel_activity: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        event: Option<EventDefinitionDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    ServiceTask {
        id: String,
        task: TaskDefinitionDecl,
        #[serde(default)]
        headers: Vec<HeaderDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loop_characteristics: Option<LoopDecl>,
    },
    ReceiveTask {
        id: String,
        message_ref: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loop_characteristics: Option<LoopDecl>,
    },
    CallActivity {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        called_element: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        called_element_expression: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loop_characteristics: Option<LoopDecl>,
    },
    SubProcess {
        id: String,
        #[serde(default)]
        elements: Vec<FlowElement>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        loop_characteristics: Option<LoopDecl>,
    },
    ExclusiveGateway {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default_flow: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    ParallelGateway {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    EventBasedGateway {
        id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        io: Option<IoMappingDecl>,
    },
    SequenceFlow {
        id: String,
        source: String,
        target: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        condition: Option<String>,
    },
}

impl FlowElement {
    pub fn id(&self) -> &str {
        match self {
            FlowElement::StartEvent { id, .. }
            | FlowElement::EndEvent { id, .. }
            | FlowElement::IntermediateCatchEvent { id, .. }
            | FlowElement::BoundaryEvent { id, .. }
            | FlowElement::ServiceTask { id, .. }
            | FlowElement::ReceiveTask { id, .. }
            | FlowElement::CallActivity { id, .. }
            | FlowElement::SubProcess { id, .. }
            | FlowElement::ExclusiveGateway { id, .. }
            | FlowElement::ParallelGateway { id, .. }
            | FlowElement::EventBasedGateway { id, .. }
            | FlowElement::SequenceFlow { id, .. } => id,
        }
    }

    /// Declared I/O mapping, if any. Sequence flows carry none.
    pub fn io(&self) -> Option<&IoMappingDecl> {
        match self {
            FlowElement::StartEvent { io, .. }
            | FlowElement::EndEvent { io, .. }
            | FlowElement::IntermediateCatchEvent { io, .. }
            | FlowElement::BoundaryEvent { io, .. }
            | FlowElement::ServiceTask { io, .. }
            | FlowElement::ReceiveTask { io, .. }
            | FlowElement::CallActivity { io, .. }
            | FlowElement::SubProcess { io, .. }
            | FlowElement::ExclusiveGateway { io, .. }
            | FlowElement::ParallelGateway { io, .. }
            | FlowElement::EventBasedGateway { io, .. } => io.as_ref(),
            FlowElement::SequenceFlow { .. } => None,
        }
    }
}

// ── Extension metadata ──

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDefinitionDecl {
    pub task_type: String,
    #[serde(default = "default_retries")]
    pub retries: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderDecl {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IoMappingDecl {
    #[serde(default)]
    pub inputs: Vec<MappingDecl>,
    #[serde(default)]
    pub outputs: Vec<MappingDecl>,
}

/// One source-path → target-path mapping pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappingDecl {
    pub source: String,
    pub target: String,
}

/// Multi-instance loop characteristics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoopDecl {
    #[serde(default)]
    pub sequential: bool,
    #[serde(default)]
    pub input_collection: Option<String>,
    #[serde(default)]
    pub input_element: Option<String>,
}

/// Event definition on a catch event. At most one per element.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EventDefinitionDecl {
    Message { message_ref: String },
    Timer(TimerDecl),
    Error { error_ref: String },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimerDecl {
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub cycle: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}
