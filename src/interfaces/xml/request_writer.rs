//! Encodes debit records into the provider's payment-request document.
//!
//! Request shape:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <SRQ>
//!   <CR><U>username</U><P>derived hash</P></CR>
//!   <PL>
//!     <PI>...</PI>
//!   </PL>
//! </SRQ>
//! ```
//!
//! The explicit UTF-8 prolog is not optional: some provider endpoints
//! reject documents without it. Indentation is only for debuggability.

use chrono::{DateTime, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesStart, BytesText, Event};
use std::io::Write;

use super::xml;
use crate::domain::debit::{AccountType, Debit};
use crate::error::Result;

/// Provider credentials as they go on the wire: the raw username and the
/// secret derived from it at provider setup.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub secret: String,
}

/// Per-request constants taken from provider configuration.
#[derive(Debug, Clone, Copy)]
pub struct RequestParams<'a> {
    pub group_code: &'a str,
    pub bank_ref: &'a str,
}

/// Payment item field layout, per the provider schema:
/// CI client identification (varchar 20), GC group code (10),
/// ST service type (char 1, always "D"), SM service mode (always "2"),
/// A amount, AD action date (DDMMYYYY), CR client reference,
/// CR internal reference, BR bank reference, AT account type
/// (1 current, 2 savings), BC branch code (6), AN account number (15),
/// AH account holder (100), IT identification type, IN identification
/// number. IT and IN carry no values but must be present.
fn write_payment_item<W: Write>(
    wr: &mut Writer<W>,
    debit: &Debit,
    params: &RequestParams<'_>,
    now: DateTime<Utc>,
) -> Result<()> {
    let action_date = debit.scheduled_at.unwrap_or(now).format("%d%m%Y").to_string();
    let account_type = match debit.account_type {
        Some(AccountType::Current) => "1",
        Some(AccountType::Savings) => "2",
        None => "",
    };

    wr.write_event(Event::Start(BytesStart::new("PI"))).map_err(xml)?;
    text_element(wr, "CI", &debit.reference)?;
    text_element(wr, "GC", params.group_code)?;
    text_element(wr, "ST", "D")?;
    text_element(wr, "SM", "2")?;
    text_element(wr, "A", &debit.amount.to_string())?;
    text_element(wr, "AD", &action_date)?;
    text_element(wr, "CR", &debit.reference)?;
    text_element(wr, "CR", debit.client.as_deref().unwrap_or(""))?;
    text_element(wr, "BR", params.bank_ref)?;
    text_element(wr, "AT", account_type)?;
    text_element(wr, "BC", &debit.branch_code)?;
    text_element(wr, "AN", &debit.account_number)?;
    text_element(wr, "AH", &debit.account_name)?;
    text_element(wr, "IT", "")?;
    text_element(wr, "IN", "")?;
    wr.write_event(Event::End(BytesStart::new("PI").to_end()))
        .map_err(xml)?;
    Ok(())
}

/// Builds the complete batch request document for an ordered list of
/// debits. `now` supplies the action date for records without a schedule.
pub fn build_request(
    credentials: &Credentials,
    params: &RequestParams<'_>,
    debits: &[Debit],
    now: DateTime<Utc>,
) -> Result<String> {
    let mut buf = Vec::new();
    let mut wr = Writer::new_with_indent(&mut buf, b' ', 2);

    wr.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(xml)?;

    wr.write_event(Event::Start(BytesStart::new("SRQ"))).map_err(xml)?;

    wr.write_event(Event::Start(BytesStart::new("CR"))).map_err(xml)?;
    text_element(&mut wr, "U", &credentials.username)?;
    text_element(&mut wr, "P", &credentials.secret)?;
    wr.write_event(Event::End(BytesStart::new("CR").to_end()))
        .map_err(xml)?;

    wr.write_event(Event::Start(BytesStart::new("PL"))).map_err(xml)?;
    for debit in debits {
        write_payment_item(&mut wr, debit, params, now)?;
    }
    wr.write_event(Event::End(BytesStart::new("PL").to_end()))
        .map_err(xml)?;

    wr.write_event(Event::End(BytesStart::new("SRQ").to_end()))
        .map_err(xml)?;

    String::from_utf8(buf).map_err(xml)
}

fn text_element<W: Write>(wr: &mut Writer<W>, tag: &str, text: &str) -> Result<()> {
    if text.is_empty() {
        // Self-closing form keeps required-but-valueless fields present.
        wr.write_event(Event::Empty(BytesStart::new(tag))).map_err(xml)?;
        return Ok(());
    }
    wr.write_event(Event::Start(BytesStart::new(tag))).map_err(xml)?;
    wr.write_event(Event::Text(BytesText::new(text))).map_err(xml)?;
    wr.write_event(Event::End(BytesStart::new(tag).to_end()))
        .map_err(xml)?;
    Ok(())
}
