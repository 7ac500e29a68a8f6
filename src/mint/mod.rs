pub mod errors;
pub mod pdas;
pub mod process;
pub mod submit;

pub use errors::*;
pub use process::*;
pub use submit::*;
