use core::fmt;
use std::{error, fmt::Display, io};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderErrorKind {
    /// Content identifier can't be mapped to a template
    Resolution,
    /// Context could not be loaded from the content store
    Load,
    /// Template source missing or unreadable
    TemplateRead,
    /// Template raised while being invoked
    Invocation,
    /// Output could not be persisted
    Write,
    Config,
    Parse,
    Io,
}

impl Display for RenderErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RenderErrorKind::Resolution => "resolution",
            RenderErrorKind::Load => "load",
            RenderErrorKind::TemplateRead => "template read",
            RenderErrorKind::Invocation => "invocation",
            RenderErrorKind::Write => "write",
            RenderErrorKind::Config => "config",
            RenderErrorKind::Parse => "parse",
            RenderErrorKind::Io => "io",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct RenderError {
    message: String,
    context: Option<String>,
    kind: RenderErrorKind,
}

impl RenderError {
    pub fn new<S: Into<String>>(message: S, kind: RenderErrorKind) -> RenderError {
        RenderError {
            message: message.into(),
            kind,
            context: None,
        }
    }

    pub fn resolution<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::Resolution)
    }

    pub fn load<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::Load)
    }

    pub fn template_read<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::TemplateRead)
    }

    pub fn invocation<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::Invocation)
    }

    pub fn write<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::Write)
    }

    pub fn config<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::Config)
    }

    pub fn io<S: Into<String>>(message: S) -> RenderError {
        Self::new(message, RenderErrorKind::Io)
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn kind(&self) -> RenderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl error::Error for RenderError {}

impl From<io::Error> for RenderError {
    fn from(error: io::Error) -> Self {
        Self::io(error.to_string())
    }
}
impl From<regex::Error> for RenderError {
    fn from(error: regex::Error) -> Self {
        Self::new(error.to_string(), RenderErrorKind::Parse)
    }
}
impl From<toml::de::Error> for RenderError {
    fn from(error: toml::de::Error) -> Self {
        Self::new(error.to_string(), RenderErrorKind::Parse)
    }
}
impl From<serde_json::Error> for RenderError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(error.to_string(), RenderErrorKind::Parse)
    }
}
impl From<glob::PatternError> for RenderError {
    fn from(error: glob::PatternError) -> Self {
        Self::config(error.to_string())
    }
}
impl From<minijinja::Error> for RenderError {
    fn from(error: minijinja::Error) -> Self {
        Self::invocation(error.to_string())
    }
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let context = if let Some(context) = &self.context {
            format!(" with context '{context}'")
        } else {
            "".into()
        };
        write!(f, "{} error: '{}'{context}", self.kind, self.message)
    }
}
