//! Parties domain module (customers and vendors, event-sourced).
//!
//! Business rules for the people a bill is addressed to, plus the GSTIN and
//! state-code value objects that decide where a supply is taxed. Pure domain
//! logic: no IO, no storage.

pub mod gstin;
pub mod party;

pub use gstin::{Gstin, StateCode};
pub use party::{
    ArchiveParty, ContactInfo, Party, PartyArchived, PartyCommand, PartyEvent, PartyKind,
    PartyRegistered, PartyStatus, PartyUpdated, RegisterParty, UpdateDetails,
};
