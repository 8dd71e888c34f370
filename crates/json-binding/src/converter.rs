//! Value converters.
//!
//! A converter sits between the stored (model) value and the value handed to
//! the view. `format` runs on reads, `parse` runs on writes. Either direction
//! defaults to identity.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;
use thiserror::Error;

/// Failure raised by a converter. Bindings propagate it unchanged.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConverterError {
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl ConverterError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Bidirectional transform between stored and displayed values.
///
/// `None` stands for an absent value in both directions. `params` is the
/// optional per-binding parameter, see [`CurryConverter`].
pub trait ValueConverter {
    fn format(&self, value: Option<Value>, params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let _ = params;
        Ok(value)
    }

    fn parse(&self, value: Option<Value>, params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let _ = params;
        Ok(value)
    }
}

pub type SharedConverter = Rc<dyn ValueConverter>;

/// Binds a fixed parameter to an inner converter.
///
/// The parameter passed by the caller is ignored; the fixed one is always
/// forwarded instead.
pub struct CurryConverter {
    inner: SharedConverter,
    params: Value,
}

impl CurryConverter {
    pub fn new(inner: SharedConverter, params: impl Into<Value>) -> Self {
        Self {
            inner,
            params: params.into(),
        }
    }

    pub fn params(&self) -> &Value {
        &self.params
    }
}

impl ValueConverter for CurryConverter {
    fn format(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        self.inner.format(value, Some(&self.params))
    }

    fn parse(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        self.inner.parse(value, Some(&self.params))
    }
}

impl fmt::Debug for CurryConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CurryConverter")
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

/// Wrap `converter` with `params` when parameters are given.
pub fn curry(converter: Option<SharedConverter>, params: Option<Value>) -> Option<SharedConverter> {
    match (converter, params) {
        (Some(inner), Some(params)) => Some(Rc::new(CurryConverter::new(inner, params))),
        (converter, _) => converter,
    }
}

type ConvertFn = dyn Fn(Option<Value>, Option<&Value>) -> Result<Option<Value>, ConverterError>;

/// A converter assembled from closures.
///
/// ```
/// use json_binding::{FnConverter, ValueConverter};
/// use serde_json::json;
///
/// let upper = FnConverter::new().with_format(|v, _| {
///     Ok(v.map(|v| json!(v.as_str().unwrap_or_default().to_uppercase())))
/// });
/// assert_eq!(upper.format(Some(json!("ann")), None).unwrap(), Some(json!("ANN")));
/// assert_eq!(upper.parse(Some(json!("ann")), None).unwrap(), Some(json!("ann")));
/// ```
#[derive(Default)]
pub struct FnConverter {
    format: Option<Box<ConvertFn>>,
    parse: Option<Box<ConvertFn>>,
}

impl FnConverter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_format<F>(mut self, format: F) -> Self
    where
        F: Fn(Option<Value>, Option<&Value>) -> Result<Option<Value>, ConverterError> + 'static,
    {
        self.format = Some(Box::new(format));
        self
    }

    pub fn with_parse<F>(mut self, parse: F) -> Self
    where
        F: Fn(Option<Value>, Option<&Value>) -> Result<Option<Value>, ConverterError> + 'static,
    {
        self.parse = Some(Box::new(parse));
        self
    }

    pub fn shared(self) -> SharedConverter {
        Rc::new(self)
    }
}

impl ValueConverter for FnConverter {
    fn format(&self, value: Option<Value>, params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        match &self.format {
            Some(format) => format(value, params),
            None => Ok(value),
        }
    }

    fn parse(&self, value: Option<Value>, params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        match &self.parse {
            Some(parse) => parse(value, params),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for FnConverter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnConverter")
            .field("format", &self.format.is_some())
            .field("parse", &self.parse.is_some())
            .finish()
    }
}
