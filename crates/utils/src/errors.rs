use thiserror::Error;

#[derive(Error, Debug)]
pub enum UtilsError {
    #[error("Path '{path}' is not under '{root}'")]
    NotUnderRoot { path: String, root: String },
}
