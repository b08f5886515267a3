//! Sequence-flow wiring.

use crate::compiled::{CompiledFlow, ElementType};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::lifecycle::Step;

/// Resolve both endpoints (which must already be instantiated), register
/// the flow in the graph, and compile any declared condition. A flow into a
/// parallel gateway must coordinate with its sibling flows before the
/// gateway proceeds, so it binds the parallel-merge taken step instead of
/// the generic one.
pub fn sequence_flow(
    id: &str,
    source: &str,
    target: &str,
    condition: Option<&str>,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let conditions = ctx.conditions();
    let workflow = ctx.current_mut();

    let source_key = workflow
        .lookup(source)
        .ok_or_else(|| TransformError::UnknownElement {
            element_id: id.to_string(),
            reference: source.to_string(),
        })?;
    let target_key = workflow
        .lookup(target)
        .ok_or_else(|| TransformError::UnknownElement {
            element_id: id.to_string(),
            reference: target.to_string(),
        })?;

    if workflow.node(target_key).element_type == ElementType::BoundaryEvent {
        return Err(TransformError::BoundaryEventFlowTarget {
            flow_id: id.to_string(),
            target_id: target.to_string(),
        });
    }

    let compiled = condition
        .map(|raw| conditions.compile(raw))
        .transpose()
        .map_err(|e| TransformError::Expression {
            element_id: id.to_string(),
            source: e,
        })?;

    let taken_step = if workflow.node(target_key).element_type == ElementType::ParallelGateway {
        Step::ParallelMergeFlowTaken
    } else {
        Step::FlowTaken
    };

    workflow.insert_flow(
        source_key,
        target_key,
        CompiledFlow {
            id: id.to_string(),
            condition: compiled,
            taken_step,
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::compile_definitions;
    use crate::yaml::parse_definitions_yaml;

    #[test]
    fn dangling_source_is_fatal() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: EndEvent
        id: end
      - kind: SequenceFlow
        id: f1
        source: ghost
        target: end
"#,
        )
        .unwrap();
        let result = compile_definitions(&definitions);
        assert_eq!(
            result.unwrap_err(),
            TransformError::UnknownElement {
                element_id: "f1".to_string(),
                reference: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn flow_into_parallel_gateway_binds_merge_step() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: StartEvent
        id: start
      - kind: ParallelGateway
        id: join
      - kind: EndEvent
        id: end
      - kind: SequenceFlow
        id: into_join
        source: start
        target: join
      - kind: SequenceFlow
        id: out_of_join
        source: join
        target: end
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();

        let into_join = workflow.lookup_flow("into_join").unwrap();
        assert_eq!(
            workflow.flow(into_join).taken_step,
            Step::ParallelMergeFlowTaken
        );
        let out_of_join = workflow.lookup_flow("out_of_join").unwrap();
        assert_eq!(workflow.flow(out_of_join).taken_step, Step::FlowTaken);
    }

    #[test]
    fn condition_compiles_onto_the_flow() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: StartEvent
        id: start
      - kind: EndEvent
        id: end
      - kind: SequenceFlow
        id: f1
        source: start
        target: end
        condition: order.total > 0
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let flow = workflow.flow(workflow.lookup_flow("f1").unwrap());
        assert_eq!(
            flow.condition.as_ref().unwrap().expression(),
            "order.total > 0"
        );
    }
}
