pub mod debit;
pub mod ports;
pub mod reference;
