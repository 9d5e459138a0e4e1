use thiserror::Error;

/// Errors raised while building the rule schema table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SchemaError {
    #[error("rule type name must not be empty")]
    EmptyName,

    #[error("duplicate rule type: {name}")]
    DuplicateRuleType { name: String },

    #[error("rule type name '{name}' is reserved")]
    ReservedName { name: String },

    #[error("rule type '{name}' declares no columns")]
    NoColumns { name: String },

    #[error("rule type '{rule_type}' has an empty column name")]
    EmptyColumn { rule_type: String },

    #[error("rule type '{rule_type}' declares column '{column}' more than once")]
    DuplicateColumn { rule_type: String, column: String },
}

pub type Result<T> = std::result::Result<T, SchemaError>;
