pub mod state;
pub mod value;

pub use state::*;
pub use value::*;
