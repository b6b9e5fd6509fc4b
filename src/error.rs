use thiserror::Error;

/// Errors raised while constructing a schema, a criteria set or a template.
///
/// These are fatal for the object being built and are never recovered silently.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Unknown criteria operator '{0}'")]
    UnknownOperator(String),

    #[error("Criteria are malformed: {0}")]
    MalformedCriteria(String),

    #[error("A criterion must name the field it tests")]
    EmptyCriterionField,

    #[error("Schema '{0}' declares no steps")]
    NoSteps(String),

    #[error("Field '{0}' is declared more than once")]
    DuplicateField(String),

    #[error("Step '{0}' is declared more than once")]
    DuplicateStep(String),

    #[error("Field '{field}' depends on '{parent}', which is not declared in the schema")]
    UnknownParent { field: String, parent: String },

    #[error("Field '{0}' is part of a dependency cycle")]
    DependencyCycle(String),

    #[error("Field '{0}' has a parent-keyed value provider but no parent field")]
    ProviderWithoutParent(String),

    #[error("Step '{step}' lists field '{field}', which is not declared in the schema")]
    UnknownStepField { step: String, field: String },

    #[error("Field '{0}' is not owned by any step")]
    UnownedField(String),

    #[error("Field '{field}' is owned by both step '{first}' and step '{second}'")]
    FieldOwnedTwice {
        field: String,
        first: String,
        second: String,
    },

    #[error(
        "Field '{field}' is asked before its parent '{parent}'; a parent must be owned by the same or an earlier step"
    )]
    ParentOwnedLater { field: String, parent: String },

    #[error(
        "Visibility of step '{step}' references '{field}', which is not answered by an earlier step"
    )]
    VisibilityField { step: String, field: String },

    #[error("Default value for field '{field}' is invalid: {message}")]
    InvalidDefault { field: String, message: String },

    #[error("Template '{template}' is malformed: {message}")]
    MalformedTemplate { template: String, message: String },

    #[error("Template '{template}' reads field '{field}', which the schema does not declare")]
    UnknownPlaceholder { template: String, field: String },
}

/// Errors raised by the dependency resolver when an answer is rejected.
///
/// A rejected answer never mutates the state it was applied to.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ResolveError {
    #[error("Field '{0}' is not declared in the schema")]
    UnknownField(String),

    #[error("Invalid value '{value}' for field '{field}': {reason}")]
    InvalidFieldValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Errors raised by the wizard state machine.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WizardError {
    #[error("No reachable step {direction} '{from}'")]
    NoReachableStep {
        from: String,
        direction: &'static str,
    },

    #[error("Step '{step}' is incomplete; missing required fields: {missing:?}")]
    StepIncomplete { step: String, missing: Vec<String> },

    #[error("Step '{current}' is not the last visible step; '{next}' is still reachable")]
    StepsRemaining { current: String, next: String },

    #[error("Operation '{operation}' is not valid while the wizard is {status}")]
    InvalidState {
        operation: &'static str,
        status: String,
    },

    #[error("Captured state does not fit schema '{schema}': {reason}")]
    CorruptState { schema: String, reason: String },

    #[error(transparent)]
    Resolve(#[from] ResolveError),
}

/// Errors raised when reading or writing persisted session snapshots.
#[derive(Error, Debug, Clone)]
pub enum StoreError {
    #[error("Could not access '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Snapshot encoding failed: {0}")]
    Encode(String),

    #[error("Snapshot decoding failed: {0}")]
    Decode(String),
}

/// Errors raised by the session service.
#[derive(Error, Debug, Clone)]
pub enum SessionError {
    #[error("Wizard '{0}' is not registered in the catalog")]
    UnknownWizard(String),

    #[error("Wizard '{wizard}' has no variant named '{variant}'")]
    UnknownVariant { wizard: String, variant: String },

    #[error("Session '{0}' does not exist")]
    UnknownSession(String),

    #[error(transparent)]
    Wizard(#[from] WizardError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that can occur when converting a custom definition format into a `ConfigSchema`.
#[derive(Error, Debug, Clone)]
pub enum DefinitionError {
    #[error("Failed to parse schema definition JSON: {0}")]
    JsonParseError(String),

    #[error("Field '{field}' uses unknown allowed-values keyword '{keyword}'")]
    UnknownKeyword { field: String, keyword: String },

    #[error("Default for field '{field}' does not match its declared type")]
    InvalidDefault { field: String },

    #[error(transparent)]
    Schema(#[from] ValidationError),
}
