//! The compile pipeline.
//!
//! Compilation walks each process scope in fixed passes so that structural
//! prerequisites always exist before anything inspects them:
//!
//! 1. instantiate — the factory creates one empty node per element id,
//!    recursing into sub-process scopes.
//! 2. wire — sequence flows resolve their endpoints and register adjacency.
//! 3. decorate — generic flow-node decoration plus the variant-specific
//!    transformer for everything except gateways.
//! 4. wrap — multi-instance bodies supersede their inner activities.
//! 5. gateways — decorated last, once flow connectivity and edge keys are
//!    final (gateway decisions read outgoing-flow counts and store flow
//!    keys).

pub mod activity;
pub mod catalog;
pub mod containers;
pub mod events;
pub mod flow_node;
pub mod flows;
pub mod gateways;
pub mod multi_instance;

use crate::compiled::{CompiledDefinitions, NodeKey};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::factory;
use crate::model::{Definitions, FlowElement};

/// Enclosing scope of an element during decoration: the workflow itself or
/// a nested sub-process container.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Workflow,
    Container(NodeKey),
}

/// Compile a parsed deployment into executable workflow graphs.
///
/// Synchronous and deterministic; either every process compiles or the
/// first failure aborts the whole deployment.
pub fn compile_definitions(
    definitions: &Definitions,
) -> Result<CompiledDefinitions, TransformError> {
    let mut ctx = TransformContext::new();
    for message in &definitions.messages {
        catalog::message(message, &mut ctx)?;
    }
    for error in &definitions.errors {
        catalog::error(error, &mut ctx);
    }
    for process in &definitions.processes {
        containers::process(process, &mut ctx)?;
    }
    tracing::debug!(
        processes = definitions.processes.len(),
        "compiled definitions"
    );
    Ok(ctx.finish())
}

/// Run the scope passes for one process body.
pub(crate) fn compile_scope(
    elements: &[FlowElement],
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    instantiate(elements, ctx)?;
    wire(elements, ctx)?;
    decorate(elements, Scope::Workflow, ctx)?;
    wrap(elements, ctx)?;
    decorate_gateways(elements, ctx)?;
    Ok(())
}

fn instantiate(elements: &[FlowElement], ctx: &mut TransformContext) -> Result<(), TransformError> {
    for element in elements {
        if let FlowElement::SequenceFlow { .. } = element {
            continue;
        }
        let node = factory::instantiate(element);
        ctx.current_mut().insert_node(node)?;
        if let FlowElement::SubProcess { elements, .. } = element {
            instantiate(elements, ctx)?;
        }
    }
    Ok(())
}

fn wire(elements: &[FlowElement], ctx: &mut TransformContext) -> Result<(), TransformError> {
    for element in elements {
        match element {
            FlowElement::SequenceFlow {
                id,
                source,
                target,
                condition,
            } => flows::sequence_flow(id, source, target, condition.as_deref(), ctx)?,
            FlowElement::SubProcess { elements, .. } => wire(elements, ctx)?,
            _ => {}
        }
    }
    Ok(())
}

fn decorate(
    elements: &[FlowElement],
    scope: Scope,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    for element in elements {
        match element {
            FlowElement::SequenceFlow { .. }
            | FlowElement::ExclusiveGateway { .. }
            | FlowElement::ParallelGateway { .. }
            | FlowElement::EventBasedGateway { .. } => continue,

            FlowElement::StartEvent { id, event, .. } => {
                flow_node::transform(element, ctx)?;
                events::start_event(id, event.as_ref(), scope, ctx)?;
            }
            FlowElement::EndEvent { .. } => {
                // End events need nothing beyond the baseline table; their
                // generic completion signals scope completion upward.
                flow_node::transform(element, ctx)?;
            }
            FlowElement::IntermediateCatchEvent { id, event, .. } => {
                flow_node::transform(element, ctx)?;
                events::intermediate_catch_event(id, event.as_ref(), ctx)?;
            }
            FlowElement::BoundaryEvent {
                id,
                attached_to,
                cancel_activity,
                event,
                ..
            } => {
                flow_node::transform(element, ctx)?;
                events::boundary_event(id, attached_to, *cancel_activity, event.as_ref(), ctx)?;
            }
            FlowElement::ServiceTask {
                id, task, headers, ..
            } => {
                flow_node::transform(element, ctx)?;
                activity::service_task(id, task, headers, ctx)?;
            }
            FlowElement::ReceiveTask {
                id, message_ref, ..
            } => {
                flow_node::transform(element, ctx)?;
                activity::receive_task(id, message_ref, ctx)?;
            }
            FlowElement::CallActivity {
                id,
                called_element,
                called_element_expression,
                ..
            } => {
                flow_node::transform(element, ctx)?;
                activity::call_activity(
                    id,
                    called_element.as_deref(),
                    called_element_expression.as_deref(),
                    ctx,
                )?;
            }
            FlowElement::SubProcess { id, elements, .. } => {
                flow_node::transform(element, ctx)?;
                containers::sub_process(id, ctx)?;
                let key = ctx.current().key_of(id);
                decorate(elements, Scope::Container(key), ctx)?;
            }
        }
    }
    Ok(())
}

fn wrap(elements: &[FlowElement], ctx: &mut TransformContext) -> Result<(), TransformError> {
    for element in elements {
        match element {
            FlowElement::ServiceTask {
                id,
                loop_characteristics: Some(decl),
                ..
            }
            | FlowElement::ReceiveTask {
                id,
                loop_characteristics: Some(decl),
                ..
            }
            | FlowElement::CallActivity {
                id,
                loop_characteristics: Some(decl),
                ..
            } => multi_instance::wrap(id, decl, ctx)?,
            FlowElement::SubProcess {
                id,
                elements,
                loop_characteristics,
                ..
            } => {
                // Inner scopes wrap before the enclosing sub-process does.
                wrap(elements, ctx)?;
                if let Some(decl) = loop_characteristics {
                    multi_instance::wrap(id, decl, ctx)?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn decorate_gateways(
    elements: &[FlowElement],
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    for element in elements {
        match element {
            FlowElement::ExclusiveGateway {
                id, default_flow, ..
            } => {
                flow_node::transform(element, ctx)?;
                gateways::exclusive(id, default_flow.as_deref(), ctx)?;
            }
            FlowElement::ParallelGateway { id, .. } => {
                flow_node::transform(element, ctx)?;
                gateways::parallel(id, ctx);
            }
            FlowElement::EventBasedGateway { id, .. } => {
                flow_node::transform(element, ctx)?;
                gateways::event_based(id, ctx);
            }
            FlowElement::SubProcess { elements, .. } => decorate_gateways(elements, ctx)?,
            _ => {}
        }
    }
    Ok(())
}
