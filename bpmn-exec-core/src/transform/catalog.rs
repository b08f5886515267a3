//! Message and error registration.

use crate::compiled::{CompiledError, CompiledMessage};
use crate::context::TransformContext;
use crate::error::TransformError;
use crate::model::{ErrorDecl, MessageDecl};

/// Register a message for later lookup by catch/receive constructs. A
/// message with no name is decorative metadata and is not registered.
pub fn message(decl: &MessageDecl, ctx: &mut TransformContext) -> Result<(), TransformError> {
    let Some(name) = decl
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
    else {
        return Ok(());
    };

    let correlation_key = decl
        .subscription
        .as_ref()
        .map(|sub| ctx.queries().compile(&sub.correlation_key))
        .transpose()
        .map_err(|e| TransformError::Expression {
            element_id: decl.id.clone(),
            source: e,
        })?;

    ctx.add_message(CompiledMessage {
        id: decl.id.clone(),
        name: name.to_string(),
        correlation_key,
    });
    Ok(())
}

pub fn error(decl: &ErrorDecl, ctx: &mut TransformContext) {
    ctx.add_error(CompiledError {
        id: decl.id.clone(),
        code: decl.code.clone(),
    });
}
