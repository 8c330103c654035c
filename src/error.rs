use std::collections::TryReserveError;
use std::fmt::{Display, Formatter, self};
use std::io;
use std::string::FromUtf8Error;

#[derive(Debug)]
pub enum EncodeError {
    /// The sink accepted fewer bytes than requested
    WriteFailed(io::Error),
    /// A length or id exceeds the 64 bit wire range
    Length(u128),
}

impl std::error::Error for EncodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EncodeError::WriteFailed(e) => Some(e),
            EncodeError::Length(_) => None,
        }
    }
}

impl Display for EncodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            EncodeError::WriteFailed(e) => write!(f, "Sink failed to accept bytes: {}", e),
            EncodeError::Length(value) => write!(f, "Couldn't encode length {}: exceeds limit", value),
        }
    }
}

impl From<io::Error> for EncodeError {
    fn from(e: io::Error) -> EncodeError {
        EncodeError::WriteFailed(e)
    }
}

#[derive(Debug)]
pub enum DecodeError {
    /// The source delivered fewer bytes than requested
    ReadFailed(io::Error),
    /// A string payload was not valid Utf-8
    Utf8(FromUtf8Error),
    /// A declared length would require more memory than is available
    Allocation(TryReserveError),
    /// A declared length is negative or doesn't fit this platform
    Length(i128),
    /// A mapping declared differing key and value counts
    Pairing(usize, usize),
    /// A tagged union scalar with no corresponding variant
    Discriminant(i128),
    /// A back-reference id that no table entry answers to
    UnknownId(i64),
    /// A shared slot was decoded under two different types
    WrongType(i64),
    /// Input continues past the root value
    Trailing(usize),
    /// The stream was produced by an incompatible archive format
    IncompatibleArchiver(i64),
}

impl std::error::Error for DecodeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DecodeError::ReadFailed(e) => Some(e),
            DecodeError::Utf8(e) => Some(e),
            DecodeError::Allocation(e) => Some(e),
            _ => None,
        }
    }
}

impl Display for DecodeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), fmt::Error> {
        match self {
            DecodeError::ReadFailed(e) => write!(f, "Source failed to deliver bytes: {}", e),
            DecodeError::Utf8(e) => write!(f, "String payload was not valid Utf-8: {}", e),
            DecodeError::Allocation(e) => write!(f, "Refusing to allocate for declared length: {}", e),
            DecodeError::Length(value) => write!(f, "Couldn't decode length: {} exceeds limit", value),
            DecodeError::Pairing(keys, values) => write!(f, "Mapping declares {} keys but {} values", keys, values),
            DecodeError::Discriminant(value) => write!(f, "No variant corresponds to discriminant {}", value),
            DecodeError::UnknownId(id) => write!(f, "Unknown back-reference id {}", id),
            DecodeError::WrongType(id) => write!(f, "Shared slot {} was decoded under two different types", id),
            DecodeError::Trailing(count) => write!(f, "{} trailing bytes after the root value", count),
            DecodeError::IncompatibleArchiver(version) => write!(f, "Stream encoded by archive format {}, expected {}", version, crate::ENCODING_VERSION),
        }
    }
}

impl From<io::Error> for DecodeError {
    fn from(e: io::Error) -> DecodeError {
        DecodeError::ReadFailed(e)
    }
}

impl From<FromUtf8Error> for DecodeError {
    fn from(e: FromUtf8Error) -> DecodeError {
        DecodeError::Utf8(e)
    }
}

impl From<TryReserveError> for DecodeError {
    fn from(e: TryReserveError) -> DecodeError {
        DecodeError::Allocation(e)
    }
}
