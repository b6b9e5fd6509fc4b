//! # Settei - Schema-Driven Configuration Wizards
//!
//! **Settei** is the reusable core behind a family of multi-step agent configuration
//! wizards. Each wizard is described as data: a [`ConfigSchema`](schema::ConfigSchema) of
//! fields that depend on each other, grouped into ordered steps. A single engine runs
//! every wizard, keeps dependent answers valid, and renders a deterministic preview of
//! the resulting agent.
//!
//! ## Core Workflow
//!
//! 1.  **Describe the wizard**: Build a `ConfigSchema` with `ConfigSchema::builder`, or load
//!     one from JSON through the `IntoSchema` trait.
//! 2.  **Run a session**: Drive a `WizardStateMachine` with answers. Changing an upstream
//!     answer removes every downstream answer it invalidates.
//! 3.  **Preview**: Render `{agent_output, system_prompt}` from the answers through a
//!     `TemplateRegistry` keyed by a discriminator field.
//! 4.  **Target records**: Evaluate the `CriteriaSet` answers against records to select
//!     what the configured agent works on.
//!
//! For the full caller-facing flow over the built-in wizards, see
//! [`WizardService`](session::WizardService) and [`catalog::builtin`].
//!
//! ## Quick Start
//!
//! ```rust
//! use settei::prelude::*;
//!
//! fn main() -> Result<()> {
//!     let schema = ConfigSchema::builder("analysis")
//!         .field(
//!             FieldSpec::new("scope", ValueType::Enum)
//!                 .options(["individual", "bulk"])
//!                 .required(),
//!         )
//!         .field(
//!             FieldSpec::new("module", ValueType::Enum)
//!                 .depends_on("scope")
//!                 .when("individual", AllowedValues::one_of(["sales", "support"]))
//!                 .required(),
//!         )
//!         .step(Step::new("scope").field("scope"))
//!         .step(Step::new("target").field("module"))
//!         .build()?;
//!
//!     let mut wizard = WizardStateMachine::new(std::sync::Arc::new(schema));
//!     wizard.start()?;
//!     wizard.answer("scope", "individual")?;
//!     wizard.advance()?;
//!     wizard.answer("module", "sales")?;
//!
//!     // Switching the scope invalidates the module chosen under it.
//!     let removed = wizard.answer("scope", "bulk")?;
//!     assert_eq!(removed, vec!["module".to_string()]);
//!     Ok(())
//! }
//! ```

pub mod catalog;
pub mod criteria;
pub mod definition;
pub mod error;
pub mod model;
pub mod prelude;
pub mod preview;
pub mod resolver;
pub mod schema;
pub mod session;
pub mod wizard;
