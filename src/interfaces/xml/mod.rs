pub mod request_writer;
pub mod response_reader;

use crate::error::DebitError;

pub(crate) fn xml(e: impl std::fmt::Display) -> DebitError {
    DebitError::Xml(e.to_string())
}
