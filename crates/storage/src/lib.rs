mod backend;
mod errors;
mod guard;
mod local;
mod models;

pub use backend::{BatchDeleter, FileReader, RemoteStorage, WalkVisitor};
pub use errors::*;
pub use guard::contained_path;
pub use local::LocalBackend;
pub use models::RemoteFile;
