//! Schemas loaded from data instead of code.
//!
//! ```rust
//! use settei::definition::schema_from_json;
//!
//! let schema = schema_from_json(r#"{
//!     "name": "demo",
//!     "fields": [
//!         { "id": "scope", "type": "enum", "options": ["individual", "bulk"], "required": true },
//!         { "id": "module", "type": "enum", "depends_on": "scope",
//!           "values_by_parent": { "individual": ["sales", "support"] }, "required": true }
//!     ],
//!     "steps": [
//!         { "id": "scope", "fields": ["scope"] },
//!         { "id": "target", "fields": ["module"] }
//!     ]
//! }"#).unwrap();
//!
//! assert_eq!(schema.topological_order(), ["scope", "module"]);
//! ```

pub mod conversion;
pub mod format;

pub use conversion::*;
pub use format::*;
