//! The bill aggregate: issue, payments, credit notes and voiding.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use forgebill_core::{Aggregate, AggregateRoot, BillId, DomainError, PartyId};
use forgebill_events::Event;
use forgebill_parties::Gstin;
use forgebill_pricing::{BillComputation, BillDraft};

use crate::payment::{CreditNote, Payment};

/// Bill status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillStatus {
    Open,
    PartiallyPaid,
    Paid,
    Void,
}

/// Customer details as printed on the bill, frozen at issue time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillTo {
    pub party_id: Option<PartyId>,
    pub name: String,
    pub gstin: Option<Gstin>,
    pub address: Option<String>,
}

impl BillTo {
    /// Walk-in customer with just a name.
    pub fn cash(name: impl Into<String>) -> Self {
        Self {
            party_id: None,
            name: name.into(),
            gstin: None,
            address: None,
        }
    }
}

/// Aggregate root: Bill.
///
/// Serializable so the current state can be kept as a document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bill {
    id: BillId,
    number: String,
    bill_to: Option<BillTo>,
    bill_date: Option<NaiveDate>,
    due_date: Option<NaiveDate>,
    status: BillStatus,
    draft: BillDraft,
    computation: Option<BillComputation>,
    payments: Vec<Payment>,
    credit_notes: Vec<CreditNote>,
    total_paid: Decimal,
    total_credited: Decimal,
    version: u64,
    created: bool,
}

impl Bill {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: BillId) -> Self {
        Self {
            id,
            number: String::new(),
            bill_to: None,
            bill_date: None,
            due_date: None,
            status: BillStatus::Open,
            draft: BillDraft::default(),
            computation: None,
            payments: Vec::new(),
            credit_notes: Vec::new(),
            total_paid: Decimal::ZERO,
            total_credited: Decimal::ZERO,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> BillId {
        self.id
    }

    pub fn number(&self) -> &str {
        &self.number
    }

    pub fn bill_to(&self) -> Option<&BillTo> {
        self.bill_to.as_ref()
    }

    pub fn bill_date(&self) -> Option<NaiveDate> {
        self.bill_date
    }

    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due_date
    }

    pub fn status(&self) -> BillStatus {
        self.status
    }

    pub fn draft(&self) -> &BillDraft {
        &self.draft
    }

    pub fn computation(&self) -> Option<&BillComputation> {
        self.computation.as_ref()
    }

    pub fn payments(&self) -> &[Payment] {
        &self.payments
    }

    pub fn credit_notes(&self) -> &[CreditNote] {
        &self.credit_notes
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    pub fn grand_total(&self) -> Decimal {
        self.computation
            .as_ref()
            .map_or(Decimal::ZERO, |c| c.grand_total)
    }

    pub fn total_paid(&self) -> Decimal {
        self.total_paid
    }

    pub fn total_credited(&self) -> Decimal {
        self.total_credited
    }

    /// `grand_total - paid - credited`, never below zero.
    pub fn outstanding_amount(&self) -> Decimal {
        (self.grand_total() - self.total_paid - self.total_credited).max(Decimal::ZERO)
    }

    /// Invariant: void or settled bills accept nothing.
    pub fn can_accept_settlement(&self) -> bool {
        self.status != BillStatus::Void && self.outstanding_amount() > Decimal::ZERO
    }

    fn settle_status(&self) -> BillStatus {
        let settled = self.total_paid + self.total_credited;
        if settled >= self.grand_total() {
            BillStatus::Paid
        } else if settled > Decimal::ZERO {
            BillStatus::PartiallyPaid
        } else {
            BillStatus::Open
        }
    }
}

impl AggregateRoot for Bill {
    type Id = BillId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: IssueBill. The draft is priced when the command is handled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueBill {
    pub bill_id: BillId,
    pub number: String,
    pub bill_to: Option<BillTo>,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub draft: BillDraft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RecordPayment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPayment {
    pub bill_id: BillId,
    pub payment: Payment,
    pub occurred_at: DateTime<Utc>,
}

/// Command: IssueCreditNote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueCreditNote {
    pub bill_id: BillId,
    pub credit_note: CreditNote,
    pub occurred_at: DateTime<Utc>,
}

/// Command: VoidBill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoidBill {
    pub bill_id: BillId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillCommand {
    IssueBill(IssueBill),
    RecordPayment(RecordPayment),
    IssueCreditNote(IssueCreditNote),
    VoidBill(VoidBill),
}

/// Event: BillIssued (carries the computation it was issued with).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillIssued {
    pub bill_id: BillId,
    pub number: String,
    pub bill_to: Option<BillTo>,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
    pub draft: BillDraft,
    pub computation: BillComputation,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PaymentRecorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecorded {
    pub bill_id: BillId,
    pub payment: Payment,
    pub new_total_paid: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: CreditNoteIssued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreditNoteIssued {
    pub bill_id: BillId,
    pub credit_note: CreditNote,
    pub new_total_credited: Decimal,
    pub occurred_at: DateTime<Utc>,
}

/// Event: BillVoided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillVoided {
    pub bill_id: BillId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BillEvent {
    BillIssued(BillIssued),
    PaymentRecorded(PaymentRecorded),
    CreditNoteIssued(CreditNoteIssued),
    BillVoided(BillVoided),
}

impl Event for BillEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BillEvent::BillIssued(_) => "invoicing.bill.issued",
            BillEvent::PaymentRecorded(_) => "invoicing.bill.payment_recorded",
            BillEvent::CreditNoteIssued(_) => "invoicing.bill.credit_note_issued",
            BillEvent::BillVoided(_) => "invoicing.bill.voided",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            BillEvent::BillIssued(e) => e.occurred_at,
            BillEvent::PaymentRecorded(e) => e.occurred_at,
            BillEvent::CreditNoteIssued(e) => e.occurred_at,
            BillEvent::BillVoided(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Bill {
    type Command = BillCommand;
    type Event = BillEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            BillEvent::BillIssued(e) => {
                self.id = e.bill_id;
                self.number = e.number.clone();
                self.bill_to = e.bill_to.clone();
                self.bill_date = Some(e.bill_date);
                self.due_date = e.due_date;
                self.draft = e.draft.clone();
                self.computation = Some(e.computation.clone());
                self.payments.clear();
                self.credit_notes.clear();
                self.total_paid = Decimal::ZERO;
                self.total_credited = Decimal::ZERO;
                self.created = true;
                self.status = self.settle_status();
            }
            BillEvent::PaymentRecorded(e) => {
                self.payments.push(e.payment.clone());
                self.total_paid = e.new_total_paid;
                self.status = self.settle_status();
            }
            BillEvent::CreditNoteIssued(e) => {
                self.credit_notes.push(e.credit_note.clone());
                self.total_credited = e.new_total_credited;
                self.status = self.settle_status();
            }
            BillEvent::BillVoided(_) => {
                self.status = BillStatus::Void;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            BillCommand::IssueBill(cmd) => self.handle_issue(cmd),
            BillCommand::RecordPayment(cmd) => self.handle_record_payment(cmd),
            BillCommand::IssueCreditNote(cmd) => self.handle_credit_note(cmd),
            BillCommand::VoidBill(cmd) => self.handle_void(cmd),
        }
    }
}

impl Bill {
    fn ensure_bill_id(&self, bill_id: BillId) -> Result<(), DomainError> {
        if self.id != bill_id {
            return Err(DomainError::invariant("bill_id mismatch"));
        }
        Ok(())
    }

    fn ensure_settleable(&self, bill_id: BillId, amount: Decimal) -> Result<(), DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_bill_id(bill_id)?;

        if !self.can_accept_settlement() {
            return Err(DomainError::invariant(
                "cannot settle a void or fully paid bill",
            ));
        }
        if amount <= Decimal::ZERO {
            return Err(DomainError::validation("settlement amount must be positive"));
        }
        if amount > self.outstanding_amount() {
            return Err(DomainError::invariant("cannot settle more than the outstanding amount"));
        }
        Ok(())
    }

    fn handle_issue(&self, cmd: &IssueBill) -> Result<Vec<BillEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("bill already exists"));
        }
        if cmd.number.trim().is_empty() {
            return Err(DomainError::validation("bill number cannot be empty"));
        }
        if cmd.draft.lines.is_empty() {
            return Err(DomainError::validation("cannot issue bill without lines"));
        }
        if let Some(due) = cmd.due_date {
            if due < cmd.bill_date {
                return Err(DomainError::validation("due date cannot precede the bill date"));
            }
        }

        let computation = cmd.draft.compute()?;

        Ok(vec![BillEvent::BillIssued(BillIssued {
            bill_id: cmd.bill_id,
            number: cmd.number.trim().to_string(),
            bill_to: cmd.bill_to.clone(),
            bill_date: cmd.bill_date,
            due_date: cmd.due_date,
            draft: cmd.draft.clone(),
            computation,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_record_payment(&self, cmd: &RecordPayment) -> Result<Vec<BillEvent>, DomainError> {
        if cmd.payment.bill_id != cmd.bill_id {
            return Err(DomainError::invariant("payment belongs to another bill"));
        }
        self.ensure_settleable(cmd.bill_id, cmd.payment.amount)?;

        Ok(vec![BillEvent::PaymentRecorded(PaymentRecorded {
            bill_id: cmd.bill_id,
            payment: cmd.payment.clone(),
            new_total_paid: self.total_paid + cmd.payment.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_credit_note(&self, cmd: &IssueCreditNote) -> Result<Vec<BillEvent>, DomainError> {
        if cmd.credit_note.bill_id != cmd.bill_id {
            return Err(DomainError::invariant("credit note belongs to another bill"));
        }
        self.ensure_settleable(cmd.bill_id, cmd.credit_note.amount)?;

        Ok(vec![BillEvent::CreditNoteIssued(CreditNoteIssued {
            bill_id: cmd.bill_id,
            credit_note: cmd.credit_note.clone(),
            new_total_credited: self.total_credited + cmd.credit_note.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_void(&self, cmd: &VoidBill) -> Result<Vec<BillEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_bill_id(cmd.bill_id)?;

        if self.status == BillStatus::Void {
            return Err(DomainError::conflict("bill is already void"));
        }
        if !self.payments.is_empty() {
            return Err(DomainError::invariant("cannot void a bill with recorded payments"));
        }

        Ok(vec![BillEvent::BillVoided(BillVoided {
            bill_id: cmd.bill_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
