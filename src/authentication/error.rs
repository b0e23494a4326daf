use std::fmt;

#[derive(Debug, PartialEq)]
pub enum Error {
    InvalidArgument(String),
    SchemeNotFound(String),
    NoDefaultScheme,
    OptionsTypeMismatch {
        scheme: String,
        expected: &'static str,
    },
    HandlerNotFound(&'static str),
    InvalidParameter {
        name: String,
        msg: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::InvalidArgument(err) => write!(f, "Invalid argument: {err}"),
            Error::SchemeNotFound(name) => {
                write!(f, "No authentication scheme with name \"{name}\" found")
            }
            Error::NoDefaultScheme => write!(f, "No default authentication scheme found"),
            Error::OptionsTypeMismatch { scheme, expected } => write!(
                f,
                "Authentication scheme \"{scheme}\" does not use options of type {expected}"
            ),
            Error::HandlerNotFound(handler) => {
                write!(f, "No authentication scheme handler registered for {handler}")
            }
            Error::InvalidParameter { name, msg } => {
                write!(f, "Invalid scheme parameter \"{name}\": {msg}")
            }
        }
    }
}

impl std::error::Error for Error {}
