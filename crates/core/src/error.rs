use thiserror::Error;

/// Result type for semantic indexing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the semantic indexing pipeline
///
/// Every variant corresponds to a fatal, non-recoverable condition: the
/// pipeline is all-or-nothing per file. There is no variant for "reference
/// built without optional metadata" because that path is not an error (see
/// `ReferenceBuilder`, which leaves optional fields unset instead).
#[derive(Error, Debug)]
pub enum Error {
    /// A capture name did not parse into a known `(category, entity)` pair
    #[error("unknown capture name `{name}`: {reason}")]
    UnknownCapture { name: String, reason: String },

    /// The language's scope boundary extractor received a node type it does
    /// not recognize
    #[error("scope boundary extractor for {language} cannot handle node type `{node_kind}`")]
    UnrecognizedScopeNode {
        language: String,
        node_kind: String,
    },

    /// A required AST field was missing on a capture's node (e.g. a class
    /// declaration without a `name` field)
    #[error("missing required field `{field}` on node `{node_kind}`")]
    MissingField { node_kind: String, field: String },

    /// Two scopes at equal depth both spatially contain a query location;
    /// the scope tree is malformed
    #[error("ambiguous scope containment: scopes `{scope_a}` and `{scope_b}` both contain the queried location at equal depth")]
    AmbiguousScope { scope_a: String, scope_b: String },

    /// `get_child_scope_with_symbol_name` found no matching child
    #[error("no child scope named `{name}` under parent scope `{parent}`")]
    MissingChildScope { parent: String, name: String },

    /// `build_semantic_index` was called with a language it does not support
    #[error("unsupported language: {0}")]
    UnsupportedLanguage(String),

    /// Catch-all for malformed input the pipeline cannot reason about
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Any other error, usually surfaced from a collaborator
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl Error {
    /// Creates an [`Error::UnknownCapture`]
    pub fn unknown_capture(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnknownCapture {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::UnrecognizedScopeNode`]
    pub fn unrecognized_scope_node(language: impl Into<String>, node_kind: impl Into<String>) -> Self {
        Self::UnrecognizedScopeNode {
            language: language.into(),
            node_kind: node_kind.into(),
        }
    }

    /// Creates an [`Error::MissingField`]
    pub fn missing_field(node_kind: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingField {
            node_kind: node_kind.into(),
            field: field.into(),
        }
    }

    /// Creates an [`Error::AmbiguousScope`]
    pub fn ambiguous_scope(scope_a: impl Into<String>, scope_b: impl Into<String>) -> Self {
        Self::AmbiguousScope {
            scope_a: scope_a.into(),
            scope_b: scope_b.into(),
        }
    }

    /// Creates an [`Error::MissingChildScope`]
    pub fn missing_child_scope(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::MissingChildScope {
            parent: parent.into(),
            name: name.into(),
        }
    }

    /// Creates an [`Error::InvalidInput`]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_scope_reports_both_ids() {
        let err = Error::ambiguous_scope("scope:a", "scope:b");
        let msg = err.to_string();
        assert!(msg.contains("scope:a"));
        assert!(msg.contains("scope:b"));
    }

    #[test]
    fn missing_field_reports_node_and_field() {
        let err = Error::missing_field("class_declaration", "name");
        let msg = err.to_string();
        assert!(msg.contains("class_declaration"));
        assert!(msg.contains("name"));
    }
}
