//! `forgebill-core`: pure domain primitives shared by every billing crate.
//!
//! The error model, typed identifiers, aggregate/entity/value-object traits
//! and the decimal helpers every money computation goes through. No IO.

pub mod aggregate;
pub mod entity;
pub mod error;
pub mod id;
pub mod numeric;
pub mod value_object;

pub use aggregate::{Aggregate, AggregateRoot};
pub use entity::Entity;
pub use error::{DomainError, DomainResult};
pub use id::{BillId, CreditNoteId, PartyId, PaymentId};
pub use numeric::{parse_decimal_or_zero, round_money, round_quantity, MONEY_DP, QUANTITY_DP};
pub use value_object::ValueObject;
