pub mod path;
pub mod errors;

pub use path::*;
pub use errors::*;
