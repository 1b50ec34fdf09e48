use std::fmt;

#[derive(Debug, Clone)]
pub struct ChartError {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorKind {
    InvalidBand,
    OutOfRange,
    InvalidTable,
    InvalidColor,
    Asset,
    Render,
    Encode,
    Io,
    Config,
}

impl ChartError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn band(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidBand, message)
    }

    pub fn out_of_range(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::OutOfRange, message)
    }

    pub fn table(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidTable, message)
    }

    pub fn color(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidColor, message)
    }

    pub fn asset(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Asset, message)
    }

    pub fn render(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Render, message)
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Encode, message)
    }

    pub fn io(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Io, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Config, message)
    }
}

impl fmt::Display for ChartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

impl std::error::Error for ChartError {}

pub type ChartResult<T> = Result<T, ChartError>;
