//! Handles for the external expression services.
//!
//! The real query and condition engines live outside this crate; the compiler
//! only needs reusable, pre-validated expression objects it can attach to
//! compiled nodes. Validation here is intentionally shallow — syntax beyond
//! what the compiler must reject is the engine's business.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExprError {
    #[error("empty expression")]
    Empty,
    #[error("invalid path expression '{0}'")]
    InvalidPath(String),
    #[error("unbalanced parentheses in condition '{0}'")]
    UnbalancedParens(String),
}

/// A compiled, reusable path query (input/output mappings, collections,
/// correlation keys). Opaque to the runtime until evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledQuery {
    expression: String,
}

impl CompiledQuery {
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// A compiled boolean predicate used on conditional sequence flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledCondition {
    expression: String,
}

impl CompiledCondition {
    pub fn expression(&self) -> &str {
        &self.expression
    }
}

/// Handle to the path-query compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler;

impl QueryCompiler {
    pub fn compile(self, raw: &str) -> Result<CompiledQuery, ExprError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExprError::Empty);
        }
        // Dotted paths must not contain empty segments ("a..b", ".a", "a.").
        if trimmed.split('.').any(|segment| segment.is_empty()) {
            return Err(ExprError::InvalidPath(raw.to_string()));
        }
        Ok(CompiledQuery {
            expression: trimmed.to_string(),
        })
    }
}

/// Handle to the boolean condition compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionCompiler;

impl ConditionCompiler {
    pub fn compile(self, raw: &str) -> Result<CompiledCondition, ExprError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ExprError::Empty);
        }
        let mut depth = 0i32;
        for c in trimmed.chars() {
            match c {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
            if depth < 0 {
                return Err(ExprError::UnbalancedParens(raw.to_string()));
            }
        }
        if depth != 0 {
            return Err(ExprError::UnbalancedParens(raw.to_string()));
        }
        Ok(CompiledCondition {
            expression: trimmed.to_string(),
        })
    }
}
