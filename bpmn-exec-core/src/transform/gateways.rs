//! Gateway transformers. These run after flow wiring and multi-instance
//! wrapping so that outgoing-flow counts and flow keys are final.

use crate::compiled::{NodeKey, NodeKind};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::lifecycle::{Lifecycle, Step};

/// An exclusive gateway with nothing to choose between is a transparent
/// pass-through: completion just takes the single flow, and no
/// gateway-evaluation work is allocated for it.
pub fn exclusive(
    id: &str,
    default_flow: Option<&str>,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let outgoing = workflow.outgoing(key);

    if let Some(flow_id) = default_flow.filter(|f| !f.is_empty()) {
        let flow_key = outgoing
            .iter()
            .copied()
            .find(|k| workflow.flow(*k).id == flow_id)
            .ok_or_else(|| TransformError::UnknownElement {
                element_id: id.to_string(),
                reference: flow_id.to_string(),
            })?;
        match &mut workflow.node_mut(key).kind {
            NodeKind::ExclusiveGateway { default_flow } => *default_flow = Some(flow_key),
            other => panic!("element '{id}' is not an exclusive gateway: {other:?}"),
        }
    }

    let pass_through = outgoing.is_empty()
        || (outgoing.len() == 1 && workflow.flow(outgoing[0]).condition.is_none());
    let node = workflow.node_mut(key);
    if pass_through {
        node.bindings.bind(Lifecycle::Completed, Step::FlowOut);
    } else {
        node.bindings
            .bind(Lifecycle::Activating, Step::ExclusiveGatewayActivating);
        node.bindings
            .bind(Lifecycle::Completed, Step::ExclusiveGatewayCompleted);
    }
    Ok(())
}

/// Parallel split/join is structural — decided by flow fan-out/fan-in at
/// the flow level — so the gateway itself only ever flows out.
pub fn parallel(id: &str, ctx: &mut TransformContext) {
    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    workflow
        .node_mut(key)
        .bindings
        .bind(Lifecycle::Completed, Step::FlowOut);
}

/// Collects the race set — the catch events directly reachable via the
/// gateway's outgoing flows. The runtime activates all of them and takes
/// whichever fires first.
pub fn event_based(id: &str, ctx: &mut TransformContext) {
    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let events: Vec<NodeKey> = workflow
        .outgoing(key)
        .iter()
        .map(|flow| workflow.flow_endpoints(*flow).1)
        .filter(|target| matches!(workflow.node(*target).kind, NodeKind::CatchEvent(_)))
        .collect();
    match &mut workflow.node_mut(key).kind {
        NodeKind::EventBasedGateway { events: slot } => *slot = events,
        other => panic!("element '{id}' is not an event-based gateway: {other:?}"),
    }

    let node = workflow.node_mut(key);
    node.bindings
        .bind(Lifecycle::Activating, Step::EventGatewayActivating);
    node.bindings
        .bind(Lifecycle::Activated, Step::EventGatewayActivated);
    node.bindings
        .bind(Lifecycle::EventOccurred, Step::EventGatewayEventOccurred);
    node.bindings
        .bind(Lifecycle::Completing, Step::EventGatewayCompleting);
    node.bindings
        .bind(Lifecycle::Completed, Step::EventGatewayCompleted);
    node.bindings
        .bind(Lifecycle::Terminating, Step::EventGatewayTerminating);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::compile_definitions;
    use crate::yaml::parse_definitions_yaml;

    fn exclusive_fixture(flows: &str) -> String {
        format!(
            r#"
processes:
  - id: p
    elements:
      - kind: StartEvent
        id: start
      - kind: ExclusiveGateway
        id: gw
      - kind: EndEvent
        id: a
      - kind: EndEvent
        id: b
      - kind: SequenceFlow
        id: f0
        source: start
        target: gw
{flows}
"#
        )
    }

    #[test]
    fn single_unconditional_flow_is_pass_through() {
        let yaml = exclusive_fixture(
            r#"      - kind: SequenceFlow
        id: f1
        source: gw
        target: a
"#,
        );
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("gw"));
        assert_eq!(node.bindings.get(Lifecycle::Completed), Some(Step::FlowOut));
        assert_eq!(
            node.bindings.get(Lifecycle::Activating),
            Some(Step::FlowNodeActivating)
        );
    }

    #[test]
    fn single_conditional_flow_keeps_gateway_semantics() {
        let yaml = exclusive_fixture(
            r#"      - kind: SequenceFlow
        id: f1
        source: gw
        target: a
        condition: amount > 100
"#,
        );
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("gw"));
        assert_eq!(
            node.bindings.get(Lifecycle::Activating),
            Some(Step::ExclusiveGatewayActivating)
        );
        assert_eq!(
            node.bindings.get(Lifecycle::Completed),
            Some(Step::ExclusiveGatewayCompleted)
        );
    }

    #[test]
    fn two_conditional_flows_without_default() {
        let yaml = exclusive_fixture(
            r#"      - kind: SequenceFlow
        id: f1
        source: gw
        target: a
        condition: amount > 100
      - kind: SequenceFlow
        id: f2
        source: gw
        target: b
        condition: amount <= 100
"#,
        );
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("gw"));
        assert_eq!(
            node.bindings.get(Lifecycle::Activating),
            Some(Step::ExclusiveGatewayActivating)
        );
        // No default declared resolves to none, not an error.
        match &node.kind {
            NodeKind::ExclusiveGateway { default_flow } => assert_eq!(*default_flow, None),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn declared_default_flow_resolves() {
        let yaml = exclusive_fixture(
            r#"      - kind: SequenceFlow
        id: f1
        source: gw
        target: a
        condition: amount > 100
      - kind: SequenceFlow
        id: f2
        source: gw
        target: b
"#,
        )
        .replace("id: gw", "id: gw\n        default_flow: f2");
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("gw"));
        match &node.kind {
            NodeKind::ExclusiveGateway { default_flow } => {
                assert_eq!(*default_flow, workflow.lookup_flow("f2"));
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn unknown_default_flow_is_fatal() {
        let yaml = exclusive_fixture(
            r#"      - kind: SequenceFlow
        id: f1
        source: gw
        target: a
"#,
        )
        .replace("id: gw", "id: gw\n        default_flow: nope");
        let definitions = parse_definitions_yaml(&yaml).unwrap();
        let result = compile_definitions(&definitions);
        assert_eq!(
            result.unwrap_err(),
            TransformError::UnknownElement {
                element_id: "gw".to_string(),
                reference: "nope".to_string(),
            }
        );
    }

    #[test]
    fn event_based_gateway_collects_race_set() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: StartEvent
        id: start
      - kind: EventBasedGateway
        id: race
      - kind: IntermediateCatchEvent
        id: on_msg
        event:
          type: Message
          message_ref: m1
      - kind: IntermediateCatchEvent
        id: on_timer
        event:
          type: Timer
          duration: PT10M
      - kind: EndEvent
        id: end
      - kind: SequenceFlow
        id: f0
        source: start
        target: race
      - kind: SequenceFlow
        id: f1
        source: race
        target: on_msg
      - kind: SequenceFlow
        id: f2
        source: race
        target: on_timer
      - kind: SequenceFlow
        id: f3
        source: on_msg
        target: end
      - kind: SequenceFlow
        id: f4
        source: on_timer
        target: end
messages:
  - id: m1
    name: order-placed
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let race = workflow.node(workflow.key_of("race"));
        match &race.kind {
            NodeKind::EventBasedGateway { events } => {
                let mut ids: Vec<&str> =
                    events.iter().map(|k| workflow.node(*k).id.as_str()).collect();
                ids.sort();
                assert_eq!(ids, vec!["on_msg", "on_timer"]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
        assert_eq!(
            race.bindings.get(Lifecycle::EventOccurred),
            Some(Step::EventGatewayEventOccurred)
        );

        // The racing events are pure pass-through targets.
        for id in ["on_msg", "on_timer"] {
            let node = workflow.node(workflow.key_of(id));
            assert!(node.bindings.is_empty(), "expected no bindings on '{id}'");
        }
    }
}
