//! Parses the provider's payment-response document.
//!
//! Response shape:
//!
//! ```xml
//! <SRP xmlns:i="http://www.w3.org/2001/XMLSchema-instance">
//!   <EL>
//!     <E>
//!       <CI>222333222</CI>
//!       <CL><C>PMT-AD-000003</C></CL>
//!     </E>
//!   </EL>
//! </SRP>
//! ```
//!
//! The protocol carries no positive acknowledgement: an item is known to
//! have failed when it appears in the error list, and is taken as
//! accepted when it does not. The error list element must be present
//! (possibly empty); a document without it is malformed.

use quick_xml::Reader;
use quick_xml::events::Event;

use super::xml;
use crate::error::{DebitError, Result};

/// One rejected item: the client identifier echoed back by the provider
/// (our debit reference) and the error codes attached to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemError {
    pub reference: String,
    pub codes: Vec<String>,
}

/// Structured view of a payment response.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PaymentResponse {
    pub errors: Vec<ItemError>,
}

impl PaymentResponse {
    pub fn error_for(&self, reference: &str) -> Option<&ItemError> {
        self.errors.iter().find(|e| e.reference == reference)
    }
}

pub fn parse_response(text: &str) -> Result<PaymentResponse> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);

    let mut errors = Vec::new();
    let mut saw_error_list = false;

    let mut reference: Option<String> = None;
    let mut codes: Vec<String> = Vec::new();
    let mut current_tag: Option<Vec<u8>> = None;

    loop {
        match reader.read_event().map_err(xml)? {
            Event::Start(e) => {
                let name = e.name().as_ref().to_vec();
                match name.as_slice() {
                    b"EL" => saw_error_list = true,
                    b"E" => {
                        reference = None;
                        codes = Vec::new();
                    }
                    _ => {}
                }
                current_tag = Some(name);
            }
            Event::Empty(e) => {
                if e.name().as_ref() == b"EL" {
                    saw_error_list = true;
                }
            }
            Event::Text(t) => {
                let value = t.unescape().map_err(xml)?.into_owned();
                match current_tag.as_deref() {
                    Some(b"CI") => reference = Some(value),
                    Some(b"C") => codes.push(value),
                    _ => {}
                }
            }
            Event::End(e) => {
                if e.name().as_ref() == b"E" {
                    let reference = reference.take().ok_or_else(|| {
                        DebitError::Xml("error entry without client identifier".to_string())
                    })?;
                    if codes.is_empty() {
                        return Err(DebitError::Xml(format!(
                            "error entry for {reference} without error codes"
                        )));
                    }
                    errors.push(ItemError {
                        reference,
                        codes: std::mem::take(&mut codes),
                    });
                }
                current_tag = None;
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !saw_error_list {
        return Err(DebitError::Xml("response has no error list element".to_string()));
    }

    Ok(PaymentResponse { errors })
}
