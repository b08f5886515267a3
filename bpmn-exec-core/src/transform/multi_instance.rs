//! Multi-instance wrapping.
//!
//! An activity declaring loop characteristics is superseded by a
//! multi-instance body that takes over its external connectivity and its
//! registration in the element index. The inner activity survives inside
//! the arena, reachable only through the body, and its completion no longer
//! selects outgoing flows — only the body's completion does.

use crate::compiled::{CompiledNode, ElementType, LoopCharacteristics, NodeKind};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::lifecycle::{Lifecycle, Step};
use crate::model::LoopDecl;

pub fn wrap(id: &str, decl: &LoopDecl, ctx: &mut TransformContext) -> Result<(), TransformError> {
    let queries = ctx.queries();

    let raw_collection = decl
        .input_collection
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| TransformError::MissingInputCollection {
            element_id: id.to_string(),
        })?;
    let input_collection =
        queries
            .compile(raw_collection)
            .map_err(|e| TransformError::Expression {
                element_id: id.to_string(),
                source: e,
            })?;
    let input_element = decl
        .input_element
        .clone()
        .filter(|name| !name.trim().is_empty());

    let workflow = ctx.current_mut();
    let inner_key = workflow.key_of(id);

    // Completing one instance must never trigger outgoing-flow selection;
    // boundary events are detached from the inner activity.
    {
        let inner = workflow.node_mut(inner_key);
        inner
            .bindings
            .bind(Lifecycle::Completed, Step::FlowNodeCompleted);
        if let Some(activity) = inner.try_activity_mut() {
            activity.boundary_events.clear();
        }
    }

    let mut body = CompiledNode::new(
        id,
        ElementType::MultiInstanceBody,
        NodeKind::MultiInstanceBody {
            inner: inner_key,
            loop_characteristics: LoopCharacteristics {
                sequential: decl.sequential,
                input_collection,
                input_element,
            },
        },
    );
    body.bindings
        .bind(Lifecycle::Activating, Step::MultiInstanceActivating);
    body.bindings
        .bind(Lifecycle::Activated, Step::MultiInstanceActivated);
    body.bindings
        .bind(Lifecycle::EventOccurred, Step::MultiInstanceEventOccurred);
    body.bindings
        .bind(Lifecycle::Completing, Step::MultiInstanceCompleting);
    body.bindings.bind(Lifecycle::Completed, Step::FlowOut);
    body.bindings
        .bind(Lifecycle::Terminating, Step::MultiInstanceTerminating);
    body.bindings
        .bind(Lifecycle::Terminated, Step::ActivityTerminated);

    workflow.replace_element(id, body);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::compile_definitions;
    use crate::yaml::parse_definitions_yaml;

    const FIXTURE: &str = r#"
processes:
  - id: p
    elements:
      - kind: StartEvent
        id: start
      - kind: ServiceTask
        id: each
        task:
          task_type: send
        loop_characteristics:
          sequential: false
          input_collection: order.items
          input_element: item
      - kind: BoundaryEvent
        id: watchdog
        attached_to: each
        event:
          type: Timer
          duration: PT5M
      - kind: EndEvent
        id: end
      - kind: SequenceFlow
        id: f1
        source: start
        target: each
      - kind: SequenceFlow
        id: f2
        source: each
        target: end
"#;

    #[test]
    fn body_supersedes_inner_activity() {
        let definitions = parse_definitions_yaml(FIXTURE).unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();

        let body_key = workflow.key_of("each");
        let body = workflow.node(body_key);
        assert_eq!(body.element_type, ElementType::MultiInstanceBody);

        let (inner_key, loop_characteristics) = match &body.kind {
            NodeKind::MultiInstanceBody {
                inner,
                loop_characteristics,
            } => (*inner, loop_characteristics),
            other => panic!("unexpected kind: {other:?}"),
        };
        assert!(!loop_characteristics.is_sequential());
        assert_eq!(
            loop_characteristics.input_collection.expression(),
            "order.items"
        );
        assert_eq!(loop_characteristics.input_element.as_deref(), Some("item"));

        // External connectivity belongs to the body now.
        assert_eq!(workflow.incoming(body_key).len(), 1);
        assert_eq!(workflow.outgoing(body_key).len(), 1);
        assert!(workflow.incoming(inner_key).is_empty());
        assert!(workflow.outgoing(inner_key).is_empty());

        // Inner completion is downgraded; boundary events are detached.
        let inner = workflow.node(inner_key);
        assert_eq!(inner.element_type, ElementType::ServiceTask);
        assert_eq!(
            inner.bindings.get(Lifecycle::Completed),
            Some(Step::FlowNodeCompleted)
        );
        assert!(inner.activity().boundary_events.is_empty());

        // Body lifecycle.
        assert_eq!(
            body.bindings.get(Lifecycle::Activating),
            Some(Step::MultiInstanceActivating)
        );
        assert_eq!(body.bindings.get(Lifecycle::Completed), Some(Step::FlowOut));
        assert_eq!(
            body.bindings.get(Lifecycle::Terminated),
            Some(Step::ActivityTerminated)
        );
    }

    #[test]
    fn missing_input_collection_is_fatal() {
        let yaml = FIXTURE.replace("          input_collection: order.items\n", "");
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let result = compile_definitions(&definitions);
        assert_eq!(
            result.unwrap_err(),
            TransformError::MissingInputCollection {
                element_id: "each".to_string(),
            }
        );
    }

    #[test]
    fn empty_input_element_treated_as_absent() {
        let yaml = FIXTURE.replace("input_element: item", "input_element: \"  \"");
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        match &workflow.node(workflow.key_of("each")).kind {
            NodeKind::MultiInstanceBody {
                loop_characteristics,
                ..
            } => assert_eq!(loop_characteristics.input_element, None),
            other => panic!("unexpected kind: {other:?}"),
        }
    }
}
