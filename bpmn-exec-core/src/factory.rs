//! Element factory: one constructor per concrete source element type.
//!
//! The factory runs exactly once per element id; every later transformer
//! retrieves the node from the workflow index instead of re-creating it.
//! The element enum is closed, so an unmapped type cannot exist — the match
//! below is checked exhaustive at compile time.

use crate::compiled::{
    ActivityData, CatchEventData, CompiledNode, ElementType, NodeKind,
};
use crate::model::FlowElement;

/// Construct the empty compiled node for a source flow element, stamped
/// with its structural element type.
pub fn instantiate(element: &FlowElement) -> CompiledNode {
    let (element_type, kind) = match element {
        FlowElement::StartEvent { .. } => (
            ElementType::StartEvent,
            NodeKind::CatchEvent(CatchEventData::default()),
        ),
        FlowElement::EndEvent { terminate, .. } => (
            ElementType::EndEvent,
            NodeKind::EndEvent {
                terminate: *terminate,
            },
        ),
        FlowElement::IntermediateCatchEvent { .. } => (
            ElementType::IntermediateCatchEvent,
            NodeKind::CatchEvent(CatchEventData::default()),
        ),
        FlowElement::BoundaryEvent { .. } => (
            ElementType::BoundaryEvent,
            NodeKind::CatchEvent(CatchEventData::default()),
        ),
        FlowElement::ServiceTask { .. } => (
            ElementType::ServiceTask,
            NodeKind::ServiceTask {
                activity: ActivityData::default(),
                task_type: String::new(),
                retries: 0,
                headers: Vec::new(),
            },
        ),
        FlowElement::ReceiveTask { .. } => (
            ElementType::ReceiveTask,
            NodeKind::ReceiveTask {
                activity: ActivityData::default(),
                message: None,
            },
        ),
        FlowElement::CallActivity { .. } => (
            ElementType::CallActivity,
            NodeKind::CallActivity {
                activity: ActivityData::default(),
                called: None,
            },
        ),
        FlowElement::SubProcess { .. } => (
            ElementType::SubProcess,
            NodeKind::SubProcess {
                activity: ActivityData::default(),
                start_events: Vec::new(),
            },
        ),
        FlowElement::ExclusiveGateway { .. } => (
            ElementType::ExclusiveGateway,
            NodeKind::ExclusiveGateway { default_flow: None },
        ),
        FlowElement::ParallelGateway { .. } => {
            (ElementType::ParallelGateway, NodeKind::ParallelGateway)
        }
        FlowElement::EventBasedGateway { .. } => (
            ElementType::EventBasedGateway,
            NodeKind::EventBasedGateway { events: Vec::new() },
        ),
        FlowElement::SequenceFlow { .. } => {
            unreachable!("sequence flows are wired as edges, not instantiated as nodes")
        }
    };
    CompiledNode::new(element.id(), element_type, kind)
}
