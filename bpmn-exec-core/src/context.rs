//! Mutable state for a single compilation.
//!
//! One context per deployment; nothing is shared between compilations, so
//! independent definitions may be compiled concurrently with separate
//! contexts. The context is consumed by `finish()` once compilation
//! succeeds and the result is immutable from then on.

use crate::compiled::{
    CompiledDefinitions, CompiledError, CompiledMessage, CompiledWorkflow, ErrorKey, MessageKey,
};
use crate::expr::{ConditionCompiler, QueryCompiler};
use std::collections::BTreeMap;

pub struct TransformContext {
    workflows: BTreeMap<String, CompiledWorkflow>,
    current: Option<String>,
    messages: Vec<CompiledMessage>,
    message_index: BTreeMap<String, MessageKey>,
    errors: Vec<CompiledError>,
    error_index: BTreeMap<String, ErrorKey>,
    queries: QueryCompiler,
    conditions: ConditionCompiler,
}

impl TransformContext {
    pub fn new() -> Self {
        Self {
            workflows: BTreeMap::new(),
            current: None,
            messages: Vec::new(),
            message_index: BTreeMap::new(),
            errors: Vec::new(),
            error_index: BTreeMap::new(),
            queries: QueryCompiler,
            conditions: ConditionCompiler,
        }
    }

    pub fn add_workflow(&mut self, workflow: CompiledWorkflow) {
        self.workflows.insert(workflow.id().to_string(), workflow);
    }

    /// Switch the active compilation target. Panics if the workflow was
    /// never added — scope handling is the pipeline's responsibility.
    pub fn set_current(&mut self, id: &str) {
        assert!(
            self.workflows.contains_key(id),
            "workflow '{id}' was never added"
        );
        self.current = Some(id.to_string());
    }

    pub fn current(&self) -> &CompiledWorkflow {
        let id = self.current.as_deref().expect("no current workflow");
        &self.workflows[id]
    }

    pub fn current_mut(&mut self) -> &mut CompiledWorkflow {
        let id = self.current.clone().expect("no current workflow");
        self.workflows
            .get_mut(&id)
            .expect("current workflow missing")
    }

    pub fn add_message(&mut self, message: CompiledMessage) -> MessageKey {
        let key = self.messages.len();
        self.message_index.insert(message.id.clone(), key);
        self.messages.push(message);
        key
    }

    pub fn message_key(&self, id: &str) -> Option<MessageKey> {
        self.message_index.get(id).copied()
    }

    pub fn message(&self, key: MessageKey) -> &CompiledMessage {
        &self.messages[key]
    }

    pub fn add_error(&mut self, error: CompiledError) -> ErrorKey {
        let key = self.errors.len();
        self.error_index.insert(error.id.clone(), key);
        self.errors.push(error);
        key
    }

    pub fn error_key(&self, id: &str) -> Option<ErrorKey> {
        self.error_index.get(id).copied()
    }

    /// Handle to the external path-query compiler.
    pub fn queries(&self) -> QueryCompiler {
        self.queries
    }

    /// Handle to the external boolean condition compiler.
    pub fn conditions(&self) -> ConditionCompiler {
        self.conditions
    }

    pub fn finish(self) -> CompiledDefinitions {
        CompiledDefinitions::new(self.workflows, self.messages, self.errors)
    }
}

impl Default for TransformContext {
    fn default() -> Self {
        Self::new()
    }
}
