//! Activity-family transformers: the shared activity lifecycle plus the
//! service-task, receive-task, and call-activity specializations.

use crate::compiled::{CalledElement, CompiledNode, NodeKind};
use crate::context::TransformContext;
use crate::encoding::encode_headers;
use crate::error::TransformError;
use crate::lifecycle::{Lifecycle, Step};
use crate::model::{HeaderDecl, TaskDefinitionDecl};

/// Overwrite the baseline table with activity steps. Completion always
/// flows out — an activity finishing must decide its successor flow.
pub(crate) fn decorate(node: &mut CompiledNode) {
    node.bindings.bind(Lifecycle::Activating, Step::ActivityActivating);
    node.bindings.bind(Lifecycle::Activated, Step::ActivityActivated);
    node.bindings
        .bind(Lifecycle::EventOccurred, Step::ActivityEventOccurred);
    node.bindings.bind(Lifecycle::Completing, Step::ActivityCompleting);
    node.bindings.bind(Lifecycle::Completed, Step::FlowOut);
    node.bindings
        .bind(Lifecycle::Terminating, Step::ActivityTerminating);
    node.bindings
        .bind(Lifecycle::Terminated, Step::ActivityTerminated);
}

pub fn service_task(
    id: &str,
    task: &TaskDefinitionDecl,
    headers: &[HeaderDecl],
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let mut valid = Vec::new();
    for header in headers {
        if header.key.trim().is_empty() || header.value.trim().is_empty() {
            tracing::warn!(
                element = id,
                key = %header.key,
                value = %header.value,
                "dropping task header with empty key or value"
            );
            continue;
        }
        valid.push((header.key.clone(), header.value.clone()));
    }
    let blob = if valid.is_empty() {
        Vec::new()
    } else {
        encode_headers(&valid)
    };

    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let node = workflow.node_mut(key);
    decorate(node);
    match &mut node.kind {
        NodeKind::ServiceTask {
            task_type,
            retries,
            headers: encoded,
            ..
        } => {
            *task_type = task.task_type.clone();
            *retries = task.retries;
            *encoded = blob;
        }
        other => panic!("element '{id}' is not a service task: {other:?}"),
    }
    node.bindings
        .bind(Lifecycle::Activated, Step::ServiceTaskActivated);
    node.bindings
        .bind(Lifecycle::Terminating, Step::ServiceTaskTerminating);
    Ok(())
}

pub fn receive_task(
    id: &str,
    message_ref: &str,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    let message = ctx
        .message_key(message_ref)
        .ok_or_else(|| TransformError::UnknownMessage {
            element_id: id.to_string(),
            reference: message_ref.to_string(),
        })?;

    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let node = workflow.node_mut(key);
    decorate(node);
    match &mut node.kind {
        NodeKind::ReceiveTask { message: slot, .. } => *slot = Some(message),
        other => panic!("element '{id}' is not a receive task: {other:?}"),
    }
    node.bindings
        .bind(Lifecycle::EventOccurred, Step::ReceiveTaskEventOccurred);
    Ok(())
}

pub fn call_activity(
    id: &str,
    called_element: Option<&str>,
    called_element_expression: Option<&str>,
    ctx: &mut TransformContext,
) -> Result<(), TransformError> {
    // A non-empty expression takes precedence over the literal id.
    let expression = called_element_expression
        .map(str::trim)
        .filter(|e| !e.is_empty());
    let literal = called_element.map(str::trim).filter(|e| !e.is_empty());
    let called = match (expression, literal) {
        (Some(expr), _) => {
            let query = ctx
                .queries()
                .compile(expr)
                .map_err(|e| TransformError::Expression {
                    element_id: id.to_string(),
                    source: e,
                })?;
            CalledElement::Expression(query)
        }
        (None, Some(process_id)) => CalledElement::Literal(process_id.to_string()),
        (None, None) => {
            return Err(TransformError::MissingCalledElement {
                element_id: id.to_string(),
            })
        }
    };

    let workflow = ctx.current_mut();
    let key = workflow.key_of(id);
    let node = workflow.node_mut(key);
    decorate(node);
    match &mut node.kind {
        NodeKind::CallActivity { called: slot, .. } => *slot = Some(called),
        other => panic!("element '{id}' is not a call activity: {other:?}"),
    }
    node.bindings
        .bind(Lifecycle::Activating, Step::CallActivityActivating);
    node.bindings
        .bind(Lifecycle::Terminating, Step::CallActivityTerminating);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiled::NodeKind;
    use crate::encoding::decode_headers;
    use crate::transform::compile_definitions;
    use crate::yaml::parse_definitions_yaml;

    #[test]
    fn invalid_headers_dropped_valid_encoded() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: StartEvent
        id: start
      - kind: ServiceTask
        id: task
        task:
          task_type: charge
        headers:
          - key: ""
            value: x
          - key: k
            value: v
      - kind: EndEvent
        id: end
      - kind: SequenceFlow
        id: f1
        source: start
        target: task
      - kind: SequenceFlow
        id: f2
        source: task
        target: end
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("task"));
        match &node.kind {
            NodeKind::ServiceTask { headers, .. } => {
                let decoded = decode_headers(headers).unwrap();
                assert_eq!(decoded, vec![("k".to_string(), "v".to_string())]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn service_task_rebinds_activated_and_terminating() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: ServiceTask
        id: task
        task:
          task_type: charge
          retries: 5
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("task"));
        assert_eq!(
            node.bindings.get(Lifecycle::Activated),
            Some(Step::ServiceTaskActivated)
        );
        assert_eq!(
            node.bindings.get(Lifecycle::Terminating),
            Some(Step::ServiceTaskTerminating)
        );
        assert_eq!(node.bindings.get(Lifecycle::Completed), Some(Step::FlowOut));
        match &node.kind {
            NodeKind::ServiceTask {
                task_type, retries, ..
            } => {
                assert_eq!(task_type, "charge");
                assert_eq!(*retries, 5);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn receive_task_requires_known_message() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: ReceiveTask
        id: wait
        message_ref: missing
"#,
        )
        .unwrap();
        let result = compile_definitions(&definitions);
        assert_eq!(
            result.unwrap_err(),
            TransformError::UnknownMessage {
                element_id: "wait".to_string(),
                reference: "missing".to_string(),
            }
        );
    }

    #[test]
    fn call_activity_expression_takes_precedence() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: CallActivity
        id: call
        called_element: child
        called_element_expression: order.child_process
"#,
        )
        .unwrap();
        let compiled = compile_definitions(&definitions).unwrap();
        let workflow = compiled.workflow("p").unwrap();
        let node = workflow.node(workflow.key_of("call"));
        match &node.kind {
            NodeKind::CallActivity {
                called: Some(CalledElement::Expression(query)),
                ..
            } => assert_eq!(query.expression(), "order.child_process"),
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn call_activity_without_target_is_fatal() {
        let definitions = parse_definitions_yaml(
            r#"
processes:
  - id: p
    elements:
      - kind: CallActivity
        id: call
        called_element: "  "
"#,
        )
        .unwrap();
        let result = compile_definitions(&definitions);
        assert_eq!(
            result.unwrap_err(),
            TransformError::MissingCalledElement {
                element_id: "call".to_string(),
            }
        );
    }
}
