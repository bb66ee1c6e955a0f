//! Invoicing domain module (event-sourced).
//!
//! Bills, the payments and credit notes settled against them, and bill
//! numbering. Pure domain logic: pricing is delegated to
//! `forgebill-pricing`, persistence to the caller.

pub mod bill;
pub mod numbering;
pub mod payment;

pub use bill::{
    Bill, BillCommand, BillEvent, BillIssued, BillStatus, BillTo, BillVoided, CreditNoteIssued,
    IssueBill, IssueCreditNote, PaymentRecorded, RecordPayment, VoidBill,
};
pub use numbering::{format_bill_number, next_bill_number};
pub use payment::{CreditNote, Payment, PaymentMethod};
