//! Lifecycle states and processing-step bindings.
//!
//! Every compiled node carries a table mapping lifecycle states to named
//! processing steps. The runtime drives nodes through these states and looks
//! up which step to dispatch at each transition; the step names are opaque
//! handler identifiers owned by the runtime.

use std::collections::BTreeMap;

/// The closed set of execution phases a node passes through at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Lifecycle {
    Activating,
    Activated,
    EventOccurred,
    Completing,
    Completed,
    Terminating,
    Terminated,
}

impl Lifecycle {
    pub const ALL: [Lifecycle; 7] = [
        Lifecycle::Activating,
        Lifecycle::Activated,
        Lifecycle::EventOccurred,
        Lifecycle::Completing,
        Lifecycle::Completed,
        Lifecycle::Terminating,
        Lifecycle::Terminated,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Lifecycle::Activating => "activating",
            Lifecycle::Activated => "activated",
            Lifecycle::EventOccurred => "event-occurred",
            Lifecycle::Completing => "completing",
            Lifecycle::Completed => "completed",
            Lifecycle::Terminating => "terminating",
            Lifecycle::Terminated => "terminated",
        }
    }
}

/// The closed set of processing-step identifiers a transition can bind to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    // Baseline flow-node steps.
    FlowNodeActivating,
    FlowNodeActivated,
    FlowNodeEventOccurred,
    FlowNodeCompleting,
    FlowNodeCompleted,
    FlowNodeTerminating,
    FlowNodeTerminated,

    /// Shared completion step that evaluates and takes outgoing flows.
    FlowOut,

    ActivityActivating,
    ActivityActivated,
    ActivityEventOccurred,
    ActivityCompleting,
    ActivityTerminating,
    ActivityTerminated,

    ServiceTaskActivated,
    ServiceTaskTerminating,

    ReceiveTaskEventOccurred,

    CallActivityActivating,
    CallActivityTerminating,

    ExclusiveGatewayActivating,
    ExclusiveGatewayCompleted,

    EventGatewayActivating,
    EventGatewayActivated,
    EventGatewayEventOccurred,
    EventGatewayCompleting,
    EventGatewayCompleted,
    EventGatewayTerminating,

    IntermediateCatchActivating,
    IntermediateCatchActivated,
    IntermediateCatchEventOccurred,
    IntermediateCatchCompleting,
    IntermediateCatchTerminating,

    StartEventOccurred,

    ContainerActivating,
    ContainerActivated,
    ContainerCompleting,
    ContainerCompleted,
    ContainerTerminating,
    ContainerTerminated,

    SubProcessActivated,
    SubProcessTerminating,

    MultiInstanceActivating,
    MultiInstanceActivated,
    MultiInstanceEventOccurred,
    MultiInstanceCompleting,
    MultiInstanceTerminating,

    // Sequence-flow transitions.
    FlowTaken,
    ParallelMergeFlowTaken,
}

impl Step {
    /// Stable identifier the runtime resolves to an actual handler.
    pub fn name(self) -> &'static str {
        match self {
            Step::FlowNodeActivating => "activating",
            Step::FlowNodeActivated => "activated",
            Step::FlowNodeEventOccurred => "event-occurred",
            Step::FlowNodeCompleting => "completing",
            Step::FlowNodeCompleted => "completed",
            Step::FlowNodeTerminating => "terminating",
            Step::FlowNodeTerminated => "terminated",
            Step::FlowOut => "flow-out",
            Step::ActivityActivating => "activity.activating",
            Step::ActivityActivated => "activity.activated",
            Step::ActivityEventOccurred => "activity.event-occurred",
            Step::ActivityCompleting => "activity.completing",
            Step::ActivityTerminating => "activity.terminating",
            Step::ActivityTerminated => "activity.terminated",
            Step::ServiceTaskActivated => "service-task.activated",
            Step::ServiceTaskTerminating => "service-task.terminating",
            Step::ReceiveTaskEventOccurred => "receive-task.event-occurred",
            Step::CallActivityActivating => "call-activity.activating",
            Step::CallActivityTerminating => "call-activity.terminating",
            Step::ExclusiveGatewayActivating => "exclusive-gateway.activating",
            Step::ExclusiveGatewayCompleted => "exclusive-gateway.completed",
            Step::EventGatewayActivating => "event-gateway.activating",
            Step::EventGatewayActivated => "event-gateway.activated",
            Step::EventGatewayEventOccurred => "event-gateway.event-occurred",
            Step::EventGatewayCompleting => "event-gateway.completing",
            Step::EventGatewayCompleted => "event-gateway.completed",
            Step::EventGatewayTerminating => "event-gateway.terminating",
            Step::IntermediateCatchActivating => "intermediate-catch.activating",
            Step::IntermediateCatchActivated => "intermediate-catch.activated",
            Step::IntermediateCatchEventOccurred => "intermediate-catch.event-occurred",
            Step::IntermediateCatchCompleting => "intermediate-catch.completing",
            Step::IntermediateCatchTerminating => "intermediate-catch.terminating",
            Step::StartEventOccurred => "start-event.event-occurred",
            Step::ContainerActivating => "container.activating",
            Step::ContainerActivated => "container.activated",
            Step::ContainerCompleting => "container.completing",
            Step::ContainerCompleted => "container.completed",
            Step::ContainerTerminating => "container.terminating",
            Step::ContainerTerminated => "container.terminated",
            Step::SubProcessActivated => "sub-process.activated",
            Step::SubProcessTerminating => "sub-process.terminating",
            Step::MultiInstanceActivating => "multi-instance.activating",
            Step::MultiInstanceActivated => "multi-instance.activated",
            Step::MultiInstanceEventOccurred => "multi-instance.event-occurred",
            Step::MultiInstanceCompleting => "multi-instance.completing",
            Step::MultiInstanceTerminating => "multi-instance.terminating",
            Step::FlowTaken => "flow.taken",
            Step::ParallelMergeFlowTaken => "flow.taken-to-parallel-merge",
        }
    }
}

/// Per-node mapping from lifecycle state to processing step.
///
/// The generic flow-node table is bound first; more specific transformers
/// overwrite individual entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingTable {
    entries: BTreeMap<Lifecycle, Step>,
}

impl BindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(&mut self, state: Lifecycle, step: Step) {
        self.entries.insert(state, step);
    }

    pub fn get(&self, state: Lifecycle) -> Option<Step> {
        self.entries.get(&state).copied()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Lifecycle, Step)> + '_ {
        self.entries.iter().map(|(s, t)| (*s, *t))
    }
}
