//! Catch-event transformers: start, intermediate, and boundary events.

use crate::compiled::{ElementType, EventTrigger, NodeKey, NodeKind};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::lifecycle::{Lifecycle, Step};
use crate::model::EventDefinitionDecl;
use crate::timer;
use crate::transform::Scope;

/// Shared catch-event decoration: completion always flows out, and a
/// declared event definition resolves to exactly one trigger.
fn catch_event(
    id: &str,
    event: Option<&EventDefinitionDecl>,
    ctx: &mut TransformContext,
) -> Result<NodeKey, TransformError> {
    let trigger = match event {
        None => None,
        Some(EventDefinitionDecl::Message { message_ref }) => {
            let key = ctx
                .message_key(message_ref)
                .ok_or_else(|| TransformError::UnknownMessage {
                    element_id: id.to_string(),
                    reference: message_ref.to_string(),
                })?;
            Some(EventTrigger::Message(key))
        }
        Some(EventDefinitionDecl::Timer(decl)) => {
            Some(EventTrigger::Timer(timer::compile(id, decl)?))
        }
        Some(EventDefinitionDecl::Error { error_ref }) => {
            let key = ctx
                .error_key(error_ref)
                .ok_or_else(|| TransformError::UnknownError {
                    element_id: id.to_string(),
                    reference: error_ref.to_string(),
                })?;
            Some(EventTrigger::Error(key))
        }
    };

    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let node = workflow.node_mut(key);
    node.bindings.bind(Lifecycle::Completed, Step::FlowOut);
    node.catch_event_mut().trigger = trigger;
    Ok(key)
}

/// Start events register on their enclosing scope: the workflow for a
/// top-level scope, the container node for a sub-process scope.
pub fn start_event(
    id: &str,
    event: Option<&EventDefinitionDecl>,
    scope: Scope,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let key = catch_event(id, event, ctx)?;
    let workflow = ctx.current_mut();
    workflow
        .node_mut(key)
        .bindings
        .bind(Lifecycle::EventOccurred, Step::StartEventOccurred);
    match scope {
        Scope::Workflow => workflow.add_start_event(key),
        Scope::Container(container) => match &mut workflow.node_mut(container).kind {
            NodeKind::SubProcess { start_events, .. } => start_events.push(key),
            other => panic!("scope container for '{id}' is not a sub-process: {other:?}"),
        },
    }
    Ok(())
}

pub fn intermediate_catch_event(
    id: &str,
    event: Option<&EventDefinitionDecl>,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let key = catch_event(id, event, ctx)?;
    let workflow = ctx.current_mut();
    let incoming = workflow.incoming(key);
    let gateway_fed = !incoming.is_empty()
        && incoming.iter().all(|flow| {
            let (source, _) = workflow.flow_endpoints(*flow);
            workflow.node(source).element_type == ElementType::EventBasedGateway
        });

    let node = workflow.node_mut(key);
    if gateway_fed {
        // The gateway owns activation and selection; the event is a pure
        // pass-through target with no lifecycle of its own.
        node.bindings.clear();
    } else {
        node.bindings
            .bind(Lifecycle::Activating, Step::IntermediateCatchActivating);
        node.bindings
            .bind(Lifecycle::Activated, Step::IntermediateCatchActivated);
        node.bindings
            .bind(Lifecycle::EventOccurred, Step::IntermediateCatchEventOccurred);
        node.bindings
            .bind(Lifecycle::Completing, Step::IntermediateCatchCompleting);
        node.bindings
            .bind(Lifecycle::Terminating, Step::IntermediateCatchTerminating);
    }
    Ok(())
}

/// Boundary events attach to their host activity instead of joining the
/// normal flow graph.
pub fn boundary_event(
    id: &str,
    attached_to: &str,
    cancel_activity: bool,
    event: Option<&EventDefinitionDecl>,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let key = catch_event(id, event, ctx)?;
    let workflow = ctx.current_mut();
    workflow.node_mut(key).catch_event_mut().cancel_activity = cancel_activity;

    let host = workflow
        .lookup(attached_to)
        .ok_or_else(|| TransformError::UnknownElement {
            element_id: id.to_string(),
            reference: attached_to.to_string(),
        })?;
    match workflow.node_mut(host).try_activity_mut() {
        Some(activity) => activity.boundary_events.push(key),
        None => {
            return Err(TransformError::InvalidAttachment {
                element_id: id.to_string(),
                reference: attached_to.to_string(),
            })
        }
    }
    Ok(())
}
