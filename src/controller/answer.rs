use serde::Serialize;
use serde_json::Value;
use std::fmt;

/// Which path produced a response
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Remote,
    Local,
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Remote => "remote",
            DataSource::Local => "local",
        }
    }
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response from exactly one path: the remote body verbatim, or a typed
/// local value
#[derive(Debug, Clone, PartialEq)]
pub enum Answer<T> {
    Remote(Value),
    Local(T),
}

impl<T> Answer<T> {
    pub fn source(&self) -> DataSource {
        match self {
            Answer::Remote(_) => DataSource::Remote,
            Answer::Local(_) => DataSource::Local,
        }
    }

    pub fn local(self) -> Option<T> {
        match self {
            Answer::Local(value) => Some(value),
            Answer::Remote(_) => None,
        }
    }
}

impl<T: Serialize> Answer<T> {
    pub fn into_json(self) -> Result<Value, serde_json::Error> {
        match self {
            Answer::Remote(body) => Ok(body),
            Answer::Local(value) => serde_json::to_value(value),
        }
    }
}
