use crate::expr::ExprError;
use thiserror::Error;

/// Fatal compile-time failures.
///
/// A definition either compiles fully or is rejected before the runtime ever
/// sees it — there is no partial or best-effort compiled workflow.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("duplicate element id '{element_id}'")]
    DuplicateElement { element_id: String },

    #[error("element '{element_id}': referenced element '{reference}' not found")]
    UnknownElement {
        element_id: String,
        reference: String,
    },

    #[error("element '{element_id}': referenced message '{reference}' not found")]
    UnknownMessage {
        element_id: String,
        reference: String,
    },

    #[error("element '{element_id}': referenced error '{reference}' not found")]
    UnknownError {
        element_id: String,
        reference: String,
    },

    #[error("sequence flow '{flow_id}': boundary event '{target_id}' cannot be a flow target")]
    BoundaryEventFlowTarget { flow_id: String, target_id: String },

    #[error("boundary event '{element_id}': '{reference}' is not an activity")]
    InvalidAttachment {
        element_id: String,
        reference: String,
    },

    #[error("timer event '{element_id}': {reason}")]
    InvalidTimer { element_id: String, reason: String },

    #[error("call activity '{element_id}': no called element declared")]
    MissingCalledElement { element_id: String },

    #[error("multi-instance activity '{element_id}': no input collection declared")]
    MissingInputCollection { element_id: String },

    #[error("element '{element_id}': {source}")]
    Expression {
        element_id: String,
        source: ExprError,
    },
}
