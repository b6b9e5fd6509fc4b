//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and traits from the settei crate.
//! Import this module to get access to the core functionality without having to import
//! each type individually.
//!
//! # Example
//!
//! ```rust
//! use settei::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let catalog = std::sync::Arc::new(settei::catalog::builtin()?);
//! let mut service = WizardService::in_memory(catalog);
//!
//! let session = service.start_wizard(WizardType::Sdr)?;
//! let result = service.submit_step_json(
//!     session,
//!     &serde_json::json!({ "company_name": "Acme", "product": "Rockets" }),
//! )?;
//! assert!(result.ok);
//!
//! println!("{}", service.get_preview(session)?.system_prompt);
//! # Ok(())
//! # }
//! # run_example().unwrap();
//! ```

// Schemas and sessions
pub use crate::catalog::{Catalog, WizardType};
pub use crate::definition::{IntoSchema, SchemaDefinition};
pub use crate::resolver::DependencyResolver;
pub use crate::schema::{
    AllowedValues, ConfigSchema, FieldSpec, Step, ValueProvider, ValueType, Visibility,
};
pub use crate::session::{SessionId, StepResult, WizardService};
pub use crate::wizard::WizardStateMachine;

// Answers and criteria
pub use crate::criteria::{CriteriaSet, Criterion, Operator, Record};
pub use crate::model::{Answers, ConfigState, FinalConfig, Value, WizardStatus};

// Previews
pub use crate::preview::{Discriminator, Preview, PreviewPolicy, PreviewTemplate, TemplateRegistry};

// Error types
pub use crate::error::{ResolveError, SessionError, ValidationError, WizardError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
