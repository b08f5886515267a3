//! Generic flow-node decoration.

use crate::compiled::{MappingKind, MappingOp};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::lifecycle::{Lifecycle, Step};
use crate::model::FlowElement;

const DEFAULT_TABLE: [(Lifecycle, Step); 7] = [
    (Lifecycle::Activating, Step::FlowNodeActivating),
    (Lifecycle::Activated, Step::FlowNodeActivated),
    (Lifecycle::EventOccurred, Step::FlowNodeEventOccurred),
    (Lifecycle::Completing, Step::FlowNodeCompleting),
    (Lifecycle::Completed, Step::FlowNodeCompleted),
    (Lifecycle::Terminating, Step::FlowNodeTerminating),
    (Lifecycle::Terminated, Step::FlowNodeTerminated),
];

/// Baseline decoration every flow node receives: the default lifecycle
/// table, and the declared I/O mappings compiled into an ordered list of
/// mapping operations. More specific transformers overwrite individual
/// table entries afterwards.
pub fn transform(element: &FlowElement, ctx: &mut TransformContext) -> Result<(), TransformError> {
    let queries = ctx.queries();
    let mut mappings = Vec::new();
    if let Some(io) = element.io() {
        for (kind, decls) in [
            (MappingKind::Input, &io.inputs),
            (MappingKind::Output, &io.outputs),
        ] {
            for decl in decls {
                let compile = |raw: &str| {
                    queries.compile(raw).map_err(|e| TransformError::Expression {
                        element_id: element.id().to_string(),
                        source: e,
                    })
                };
                mappings.push(MappingOp {
                    kind,
                    source: compile(&decl.source)?,
                    target: compile(&decl.target)?,
                });
            }
        }
    }

    let workflow = ctx.current_mut();
    let key = workflow.key_of(element.id());
    let node = workflow.node_mut(key);
    for (state, step) in DEFAULT_TABLE {
        node.bindings.bind(state, step);
    }
    node.mappings = mappings;
    Ok(())
}
