//! Payments and credit notes settled against a bill.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{BillId, CreditNoteId, Entity, PaymentId};

/// How a payment was made.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Upi,
    Card,
    BankTransfer,
    Cheque,
    Other(String),
}

impl core::fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            PaymentMethod::Cash => f.write_str("Cash"),
            PaymentMethod::Upi => f.write_str("UPI"),
            PaymentMethod::Card => f.write_str("Card"),
            PaymentMethod::BankTransfer => f.write_str("Bank Transfer"),
            PaymentMethod::Cheque => f.write_str("Cheque"),
            PaymentMethod::Other(s) => f.write_str(s),
        }
    }
}

/// A payment received against a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub id: PaymentId,
    pub bill_id: BillId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub method: PaymentMethod,
    /// UTR, cheque number, card slip, ...
    pub reference: Option<String>,
}

impl Entity for Payment {
    type Id = PaymentId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// A credit note reducing what the customer owes on a bill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNote {
    pub id: CreditNoteId,
    pub bill_id: BillId,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub reason: Option<String>,
}

impl Entity for CreditNote {
    type Id = CreditNoteId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}
