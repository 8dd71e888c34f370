use json_binding_path::PathError;
use thiserror::Error;

use crate::converter::ConverterError;

#[derive(Debug, Error)]
pub enum BindingError {
    #[error("path error: {0}")]
    Path(#[from] PathError),
    #[error("converter failed: {0}")]
    Converter(#[from] ConverterError),
    #[error("value at '{path}' is not an array")]
    NotAnArray { path: String },
    #[error("reference chain under '{path}' exceeds {limit} hops")]
    ReferenceLimit { path: String, limit: usize },
}
