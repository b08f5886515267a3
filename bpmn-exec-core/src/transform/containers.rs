//! Process and sub-process container transformers.

use crate::compiled::CompiledWorkflow;
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::lifecycle::{Lifecycle, Step};
use crate::model::ProcessDecl;

/// Create the workflow for one process, make it the active compilation
/// target, and compile its scope tree.
pub fn process(decl: &ProcessDecl, ctx: &mut TransformContext) -> Result<(), TransformError> {
    let mut workflow = CompiledWorkflow::new(&decl.id);
    let table = workflow.bindings_mut();
    table.bind(Lifecycle::Activating, Step::ContainerActivating);
    table.bind(Lifecycle::Activated, Step::ContainerActivated);
    table.bind(Lifecycle::Completing, Step::ContainerCompleting);
    table.bind(Lifecycle::Completed, Step::ContainerCompleted);
    table.bind(Lifecycle::Terminating, Step::ContainerTerminating);
    table.bind(Lifecycle::Terminated, Step::ContainerTerminated);

    ctx.add_workflow(workflow);
    ctx.set_current(&decl.id);
    super::compile_scope(&decl.elements, ctx)
}

/// Sub-processes keep the baseline table except for the container-specific
/// entries; completion flows out like an activity's.
pub fn sub_process(id: &str, ctx: &mut TransformContext) -> Result<(), TransformError> {
    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let node = workflow.node_mut(key);
    node.bindings
        .bind(Lifecycle::Activated, Step::SubProcessActivated);
    node.bindings.bind(Lifecycle::Completed, Step::FlowOut);
    node.bindings
        .bind(Lifecycle::Terminating, Step::SubProcessTerminating);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::compile_definitions;
    use crate::yaml::parse_definitions_yaml;

    #[test]
    fn process_binds_container_table() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements: []
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        assert_eq!(
            workflow.bindings().get(Lifecycle::Activating),
            Some(Step::ContainerActivating)
        );
        assert_eq!(
            workflow.bindings().get(Lifecycle::Completed),
            Some(Step::ContainerCompleted)
        );
        assert_eq!(workflow.bindings().get(Lifecycle::EventOccurred), None);
        // The table lives on the container node, indexed by the process id.
        assert_eq!(workflow.lookup("p"), Some(workflow.container()));
    }

    #[test]
    fn sub_process_overwrites_container_entries() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: SubProcess
        id: sub
        elements:
          - kind: StartEvent
            id: inner_start
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("sub"));
        assert_eq!(
            node.bindings.get(Lifecycle::Activated),
            Some(Step::SubProcessActivated)
        );
        assert_eq!(node.bindings.get(Lifecycle::Completed), Some(Step::FlowOut));
        assert_eq!(
            node.bindings.get(Lifecycle::Terminating),
            Some(Step::SubProcessTerminating)
        );
        // Untouched entries keep the baseline steps.
        assert_eq!(
            node.bindings.get(Lifecycle::Activating),
            Some(Step::FlowNodeActivating)
        );
    }
}
