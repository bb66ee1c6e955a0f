//! `BillingService`: the operations the invoice UI calls.
//!
//! Each operation loads the aggregate's current state from its store,
//! executes one command and writes the resulting state back.

use std::str::FromStr;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;

use forgebill_core::{Aggregate, AggregateRoot, BillId, CreditNoteId, Entity, PartyId, PaymentId};
use forgebill_events::{Event, HistoryEntry};
use forgebill_invoicing::{
    Bill, BillCommand, BillStatus, BillTo, CreditNote, IssueBill, IssueCreditNote, Payment,
    PaymentMethod, RecordPayment, VoidBill, next_bill_number,
};
use forgebill_parties::{
    ArchiveParty, ContactInfo, Party, PartyCommand, PartyKind, RegisterParty, StateCode,
    UpdateDetails,
};
use forgebill_pricing::{
    Adjustment, BillComputation, BillDraft, BillKind, LineItem, LineItemInput, SupplyKind,
};
use forgebill_store::{DocumentStore, Repository, stores};
use forgebill_views::{RenderedView, ViewSynchronizer};

use crate::config::BillingConfig;

/// Key of the billing settings document in the `settings` store.
pub const SETTINGS_KEY: &str = "billing";

/// Customer or vendor details as typed into the party form.
///
/// Blank GSTIN or state code means "not provided".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyDetails {
    pub name: String,
    pub gstin: String,
    pub state_code: String,
    pub contact: ContactInfo,
}

/// Everything the bill form submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillRequest {
    /// Registered customer; `None` bills a walk-in customer.
    pub customer: Option<PartyId>,
    /// Name printed for walk-in customers (defaults to "Cash").
    pub walk_in_name: Option<String>,
    pub gst: bool,
    pub rows: Vec<LineItemInput>,
    /// Adjustments typed on the bill, applied before the configured round-off.
    pub adjustments: Vec<Adjustment>,
    pub bill_date: NaiveDate,
    pub due_date: Option<NaiveDate>,
}

fn parse_optional<T>(raw: &str, what: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .with_context(|| format!("invalid {what} {raw:?}"))
}

fn is_blank_row(row: &LineItemInput) -> bool {
    [&row.name, &row.quantity, &row.rate, &row.length, &row.width, &row.height]
        .iter()
        .all(|cell| cell.trim().is_empty())
}

pub struct BillingService {
    config: BillingConfig,
    bills: Repository<Bill>,
    customers: Repository<Party>,
    vendors: Repository<Party>,
    payments: Repository<Payment>,
    credit_notes: Repository<CreditNote>,
    settings: Repository<BillingConfig>,
    history: Repository<HistoryEntry>,
}

impl BillingService {
    pub fn new(store: Arc<dyn DocumentStore>, config: BillingConfig) -> Self {
        Self {
            config,
            bills: Repository::new(store.clone(), stores::BILLS),
            customers: Repository::new(store.clone(), stores::CUSTOMERS),
            vendors: Repository::new(store.clone(), stores::VENDORS),
            payments: Repository::new(store.clone(), stores::PAYMENTS),
            credit_notes: Repository::new(store.clone(), stores::CREDIT_NOTES),
            settings: Repository::new(store.clone(), stores::SETTINGS),
            history: Repository::new(store, stores::HISTORY),
        }
    }

    /// Service over `store`, configured from saved settings if present and
    /// from the environment otherwise.
    pub async fn open(store: Arc<dyn DocumentStore>) -> Self {
        let mut service = Self::new(store, BillingConfig::from_env());
        if let Some(saved) = service.settings.get(SETTINGS_KEY).await {
            tracing::info!(config = ?saved, "using saved billing settings");
            service.config = saved;
        }
        service
    }

    pub fn config(&self) -> &BillingConfig {
        &self.config
    }

    pub async fn save_config(&mut self, config: BillingConfig) -> Result<()> {
        config
            .seller_state_code()
            .context("seller state must be a valid GST state code")?;
        if config.bill_prefix.trim().is_empty() {
            bail!("bill prefix cannot be empty");
        }
        self.settings
            .save(SETTINGS_KEY, &config)
            .await
            .context("failed to save billing settings")?;
        self.config = config;
        Ok(())
    }

    // ---- parties ----

    fn parties(&self, kind: PartyKind) -> &Repository<Party> {
        match kind {
            PartyKind::Customer => &self.customers,
            PartyKind::Vendor => &self.vendors,
        }
    }

    async fn save_party(&self, party: &Party) -> Result<()> {
        self.parties(party.kind())
            .save(&party.id_typed().to_string(), party)
            .await
            .context("failed to save party")
    }

    pub async fn register_party(&self, kind: PartyKind, details: &PartyDetails) -> Result<Party> {
        let party_id = PartyId::new();
        let mut party = Party::empty(party_id);
        let events = party
            .execute(&PartyCommand::RegisterParty(RegisterParty {
                party_id,
                kind,
                name: details.name.clone(),
                gstin: parse_optional(&details.gstin, "GSTIN")?,
                state_code: parse_optional::<StateCode>(&details.state_code, "state code")?,
                contact: Some(details.contact.clone()),
                occurred_at: Utc::now(),
            }))
            .context("failed to register party")?;

        self.save_party(&party).await?;
        self.record_history("party", party_id, party.version(), &events).await?;
        tracing::info!(%party_id, ?kind, "party registered");
        Ok(party)
    }

    /// Blank fields in `details` keep the party's current value.
    pub async fn update_party(
        &self,
        kind: PartyKind,
        party_id: PartyId,
        details: &PartyDetails,
    ) -> Result<Party> {
        let mut party = self.load_party(kind, party_id).await?;
        let name = details.name.trim();
        let events = party
            .execute(&PartyCommand::UpdateDetails(UpdateDetails {
                party_id,
                name: (!name.is_empty()).then(|| name.to_string()),
                gstin: parse_optional(&details.gstin, "GSTIN")?,
                state_code: parse_optional::<StateCode>(&details.state_code, "state code")?,
                contact: (details.contact != ContactInfo::default())
                    .then(|| details.contact.clone()),
                occurred_at: Utc::now(),
            }))
            .context("failed to update party")?;

        self.save_party(&party).await?;
        self.record_history("party", party_id, party.version(), &events).await?;
        Ok(party)
    }

    pub async fn archive_party(
        &self,
        kind: PartyKind,
        party_id: PartyId,
        reason: Option<String>,
    ) -> Result<Party> {
        let mut party = self.load_party(kind, party_id).await?;
        let events = party
            .execute(&PartyCommand::ArchiveParty(ArchiveParty {
                party_id,
                reason,
                occurred_at: Utc::now(),
            }))
            .context("failed to archive party")?;

        self.save_party(&party).await?;
        self.record_history("party", party_id, party.version(), &events).await?;
        tracing::info!(%party_id, ?kind, "party archived");
        Ok(party)
    }

    pub async fn load_party(&self, kind: PartyKind, party_id: PartyId) -> Result<Party> {
        self.parties(kind)
            .get(&party_id.to_string())
            .await
            .ok_or_else(|| anyhow!("{kind:?} {party_id} not found"))
    }

    /// Parties of `kind` sorted by name.
    pub async fn list_parties(&self, kind: PartyKind) -> Vec<Party> {
        let mut parties = self.parties(kind).list().await;
        parties.sort_by(|a, b| a.name().to_lowercase().cmp(&b.name().to_lowercase()));
        parties
    }

    // ---- pricing ----

    /// Price the typed rows for a customer in `place_of_supply`.
    ///
    /// Completely blank rows are skipped. The configured round-off is
    /// appended after the bill's own adjustments.
    pub fn build_draft(
        &self,
        gst: bool,
        place_of_supply: Option<&StateCode>,
        rows: &[LineItemInput],
        adjustments: &[Adjustment],
    ) -> Result<BillDraft> {
        let seller = self
            .config
            .seller_state_code()
            .context("invalid seller state in billing settings")?;
        let kind = if gst {
            BillKind::Gst {
                price_mode: self.config.price_mode,
            }
        } else {
            BillKind::Regular
        };

        let mut draft = BillDraft::new(kind, SupplyKind::between(&seller, place_of_supply));
        for (i, row) in rows.iter().enumerate() {
            if is_blank_row(row) {
                continue;
            }
            let line = LineItem::try_from(row).with_context(|| format!("invalid item on row {}", i + 1))?;
            draft.lines.push(line);
        }

        draft.adjustments.extend(adjustments.iter().cloned());
        if let Some(mode) = self.config.round_off {
            draft.adjustments.push(Adjustment::round_off(mode, Decimal::ONE));
        }
        Ok(draft)
    }

    async fn customer_for(&self, request: &BillRequest) -> Result<Option<Party>> {
        let Some(party_id) = request.customer else {
            return Ok(None);
        };
        let party = self.load_party(PartyKind::Customer, party_id).await?;
        if !party.can_transact() {
            bail!("customer {:?} is archived and cannot be billed", party.name());
        }
        Ok(Some(party))
    }

    /// Compute the bill the form currently describes, without saving it.
    pub async fn preview(&self, request: &BillRequest) -> Result<BillComputation> {
        let customer = self.customer_for(request).await?;
        let place_of_supply = customer.as_ref().and_then(Party::place_of_supply);
        let draft = self.build_draft(
            request.gst,
            place_of_supply.as_ref(),
            &request.rows,
            &request.adjustments,
        )?;
        draft.compute().context("failed to price bill")
    }

    // ---- bills ----

    pub async fn issue_bill(&self, request: &BillRequest) -> Result<Bill> {
        let customer = self.customer_for(request).await?;
        let place_of_supply = customer.as_ref().and_then(Party::place_of_supply);
        let draft = self.build_draft(
            request.gst,
            place_of_supply.as_ref(),
            &request.rows,
            &request.adjustments,
        )?;

        let bill_to = match &customer {
            Some(party) => BillTo {
                party_id: Some(party.id_typed()),
                name: party.name().to_string(),
                gstin: party.gstin().cloned(),
                address: party.contact().address.clone(),
            },
            None => BillTo::cash(
                request
                    .walk_in_name
                    .clone()
                    .filter(|n| !n.trim().is_empty())
                    .unwrap_or_else(|| "Cash".to_string()),
            ),
        };

        let existing = self.existing_bill_numbers().await?;
        let number = next_bill_number(
            &self.config.bill_prefix,
            existing.iter().map(String::as_str),
        )?;

        let bill_id = BillId::new();
        let mut bill = Bill::empty(bill_id);
        let events = bill
            .execute(&BillCommand::IssueBill(IssueBill {
                bill_id,
                number,
                bill_to: Some(bill_to),
                bill_date: request.bill_date,
                due_date: request.due_date,
                draft,
                occurred_at: Utc::now(),
            }))
            .context("failed to issue bill")?;

        self.save_bill(&bill).await?;
        self.record_history("bill", bill_id, bill.version(), &events).await?;
        tracing::info!(
            %bill_id,
            number = bill.number(),
            grand_total = %bill.grand_total(),
            "bill issued"
        );
        Ok(bill)
    }

    /// Numbers of every stored bill, read from the raw documents so a bill
    /// that no longer decodes still holds on to its number.
    async fn existing_bill_numbers(&self) -> Result<Vec<String>> {
        let records = self
            .bills
            .records()
            .await
            .context("failed to read existing bill numbers")?;
        Ok(records
            .into_iter()
            .filter_map(|record| {
                let number = record.value.get("number")?.as_str()?.to_string();
                Some(number)
            })
            .collect())
    }

    async fn save_bill(&self, bill: &Bill) -> Result<()> {
        self.bills
            .save(&bill.id_typed().to_string(), bill)
            .await
            .with_context(|| format!("failed to save bill {}", bill.number()))
    }

    pub async fn load_bill(&self, bill_id: BillId) -> Result<Bill> {
        self.bills
            .get(&bill_id.to_string())
            .await
            .ok_or_else(|| anyhow!("bill {bill_id} not found"))
    }

    /// All bills ordered by number.
    pub async fn list_bills(&self) -> Vec<Bill> {
        let mut bills = self.bills.list().await;
        bills.sort_by(|a, b| a.number().cmp(b.number()));
        bills
    }

    /// Bills still awaiting payment.
    pub async fn outstanding_bills(&self) -> Vec<Bill> {
        self.list_bills()
            .await
            .into_iter()
            .filter(|b| matches!(b.status(), BillStatus::Open | BillStatus::PartiallyPaid))
            .collect()
    }

    pub async fn total_outstanding(&self) -> Decimal {
        self.outstanding_bills()
            .await
            .iter()
            .map(Bill::outstanding_amount)
            .sum()
    }

    pub async fn record_payment(
        &self,
        bill_id: BillId,
        amount: Decimal,
        date: NaiveDate,
        method: PaymentMethod,
        reference: Option<String>,
    ) -> Result<Bill> {
        let mut bill = self.load_bill(bill_id).await?;
        let payment = Payment {
            id: PaymentId::new(),
            bill_id,
            amount,
            date,
            method,
            reference,
        };
        let events = bill
            .execute(&BillCommand::RecordPayment(RecordPayment {
                bill_id,
                payment: payment.clone(),
                occurred_at: Utc::now(),
            }))
            .with_context(|| format!("failed to record payment on bill {}", bill.number()))?;

        self.payments
            .save(&payment.store_key(), &payment)
            .await
            .context("failed to save payment")?;
        if let Err(err) = self.save_bill(&bill).await {
            if let Err(undo) = self.payments.remove(&payment.store_key()).await {
                tracing::error!(
                    %bill_id,
                    payment_id = %payment.id,
                    error = %undo,
                    "orphaned payment left in store"
                );
            }
            return Err(err);
        }
        self.record_history("bill", bill_id, bill.version(), &events).await?;
        tracing::info!(%bill_id, %amount, status = ?bill.status(), "payment recorded");
        Ok(bill)
    }

    pub async fn issue_credit_note(
        &self,
        bill_id: BillId,
        amount: Decimal,
        date: NaiveDate,
        reason: Option<String>,
    ) -> Result<Bill> {
        let mut bill = self.load_bill(bill_id).await?;
        let credit_note = CreditNote {
            id: CreditNoteId::new(),
            bill_id,
            amount,
            date,
            reason,
        };
        let events = bill
            .execute(&BillCommand::IssueCreditNote(IssueCreditNote {
                bill_id,
                credit_note: credit_note.clone(),
                occurred_at: Utc::now(),
            }))
            .with_context(|| format!("failed to issue credit note on bill {}", bill.number()))?;

        self.credit_notes
            .save(&credit_note.store_key(), &credit_note)
            .await
            .context("failed to save credit note")?;
        if let Err(err) = self.save_bill(&bill).await {
            if let Err(undo) = self.credit_notes.remove(&credit_note.store_key()).await {
                tracing::error!(
                    %bill_id,
                    credit_note_id = %credit_note.id,
                    error = %undo,
                    "orphaned credit note left in store"
                );
            }
            return Err(err);
        }
        self.record_history("bill", bill_id, bill.version(), &events).await?;
        tracing::info!(%bill_id, %amount, status = ?bill.status(), "credit note issued");
        Ok(bill)
    }

    pub async fn void_bill(&self, bill_id: BillId, reason: Option<String>) -> Result<Bill> {
        let mut bill = self.load_bill(bill_id).await?;
        let events = bill
            .execute(&BillCommand::VoidBill(VoidBill {
                bill_id,
                reason,
                occurred_at: Utc::now(),
            }))
            .with_context(|| format!("failed to void bill {}", bill.number()))?;

        self.save_bill(&bill).await?;
        self.record_history("bill", bill_id, bill.version(), &events).await?;
        tracing::info!(%bill_id, "bill voided");
        Ok(bill)
    }

    /// Payments recorded against `bill_id`, oldest first.
    pub async fn payments_for(&self, bill_id: BillId) -> Vec<Payment> {
        let mut payments: Vec<Payment> = self
            .payments
            .list()
            .await
            .into_iter()
            .filter(|p| p.bill_id == bill_id)
            .collect();
        payments.sort_by_key(|p| (p.date, p.id));
        payments
    }

    pub async fn credit_notes_for(&self, bill_id: BillId) -> Vec<CreditNote> {
        let mut notes: Vec<CreditNote> = self
            .credit_notes
            .list()
            .await
            .into_iter()
            .filter(|n| n.bill_id == bill_id)
            .collect();
        notes.sort_by_key(|n| (n.date, n.id));
        notes
    }

    // ---- history ----

    /// Store `events`, just applied to an aggregate now at `version`.
    async fn record_history<E>(
        &self,
        aggregate_type: &str,
        aggregate_id: impl core::fmt::Display,
        version: u64,
        events: &[E],
    ) -> Result<()>
    where
        E: Event + serde::Serialize,
    {
        let first = version + 1 - events.len() as u64;
        for (offset, event) in events.iter().enumerate() {
            let entry =
                HistoryEntry::from_event(aggregate_type, &aggregate_id, first + offset as u64, event)
                    .context("failed to encode event")?;
            tracing::debug!(
                event_type = event.event_type(),
                key = %entry.key(),
                "recording event"
            );
            self.history
                .save(&entry.key(), &entry)
                .await
                .context("failed to save history")?;
        }
        Ok(())
    }

    /// Events applied to a bill or party, oldest first.
    pub async fn history(&self, aggregate_id: &str) -> Vec<HistoryEntry> {
        let mut entries: Vec<HistoryEntry> = self
            .history
            .list()
            .await
            .into_iter()
            .filter(|e| e.aggregate_id == aggregate_id)
            .collect();
        entries.sort_by_key(|e| e.sequence_number);
        entries
    }

    // ---- views ----

    /// Push a saved bill to every sink registered on `views`.
    pub async fn show_bill(&self, bill_id: BillId, views: &mut ViewSynchronizer) -> Result<bool> {
        let bill = self.load_bill(bill_id).await?;
        let computation = bill
            .computation()
            .ok_or_else(|| anyhow!("bill {bill_id} has no computation"))?;
        views
            .sync(computation)
            .with_context(|| format!("failed to render bill {}", bill.number()))
    }

    /// Input, print-copy and GST tables for a saved bill.
    pub async fn render_bill(&self, bill_id: BillId) -> Result<Vec<RenderedView>> {
        let bill = self.load_bill(bill_id).await?;
        let computation = bill
            .computation()
            .ok_or_else(|| anyhow!("bill {bill_id} has no computation"))?;
        ViewSynchronizer::new()
            .render_all(computation)
            .with_context(|| format!("failed to render bill {}", bill.number()))
    }
}
