//! Customers and vendors as event-sourced parties.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use forgebill_core::{Aggregate, AggregateRoot, DomainError, PartyId};
use forgebill_events::Event;

use crate::gstin::{Gstin, StateCode};

/// Party kind: who the bill is addressed to, or who we buy from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Customer,
    Vendor,
}

/// Party status lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyStatus {
    Active,
    Archived,
}

/// Contact information for a party.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Aggregate root: Party (customer or vendor).
///
/// Serializable so the current state can be kept as a document in the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Party {
    id: PartyId,
    kind: PartyKind,
    name: String,
    gstin: Option<Gstin>,
    state_code: Option<StateCode>,
    contact: ContactInfo,
    status: PartyStatus,
    version: u64,
    created: bool,
}

impl Party {
    /// Create an empty, not-yet-created aggregate instance for rehydration.
    pub fn empty(id: PartyId) -> Self {
        Self {
            id,
            kind: PartyKind::Customer,
            name: String::new(),
            gstin: None,
            state_code: None,
            contact: ContactInfo::default(),
            status: PartyStatus::Active,
            version: 0,
            created: false,
        }
    }

    pub fn id_typed(&self) -> PartyId {
        self.id
    }

    pub fn kind(&self) -> PartyKind {
        self.kind
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn gstin(&self) -> Option<&Gstin> {
        self.gstin.as_ref()
    }

    pub fn contact(&self) -> &ContactInfo {
        &self.contact
    }

    pub fn status(&self) -> PartyStatus {
        self.status
    }

    pub fn is_created(&self) -> bool {
        self.created
    }

    /// State whose GST applies to supplies to this party.
    ///
    /// An explicit state code wins over the one embedded in the GSTIN;
    /// unregistered parties without a state give `None`.
    pub fn place_of_supply(&self) -> Option<StateCode> {
        self.state_code
            .clone()
            .or_else(|| self.gstin.as_ref().map(Gstin::state_code))
    }

    /// Archived parties cannot be billed.
    pub fn can_transact(&self) -> bool {
        self.created && self.status == PartyStatus::Active
    }
}

impl AggregateRoot for Party {
    type Id = PartyId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RegisterParty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterParty {
    pub party_id: PartyId,
    pub kind: PartyKind,
    pub name: String,
    pub gstin: Option<Gstin>,
    pub state_code: Option<StateCode>,
    pub contact: Option<ContactInfo>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateDetails. `None` fields keep their current value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateDetails {
    pub party_id: PartyId,
    pub name: Option<String>,
    pub gstin: Option<Gstin>,
    pub state_code: Option<StateCode>,
    pub contact: Option<ContactInfo>,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ArchiveParty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArchiveParty {
    pub party_id: PartyId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyCommand {
    RegisterParty(RegisterParty),
    UpdateDetails(UpdateDetails),
    ArchiveParty(ArchiveParty),
}

/// Event: PartyRegistered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyRegistered {
    pub party_id: PartyId,
    pub kind: PartyKind,
    pub name: String,
    pub gstin: Option<Gstin>,
    pub state_code: Option<StateCode>,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartyUpdated (carries the full resulting details).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyUpdated {
    pub party_id: PartyId,
    pub name: String,
    pub gstin: Option<Gstin>,
    pub state_code: Option<StateCode>,
    pub contact: ContactInfo,
    pub occurred_at: DateTime<Utc>,
}

/// Event: PartyArchived.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyArchived {
    pub party_id: PartyId,
    pub reason: Option<String>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartyEvent {
    PartyRegistered(PartyRegistered),
    PartyUpdated(PartyUpdated),
    PartyArchived(PartyArchived),
}

impl Event for PartyEvent {
    fn event_type(&self) -> &'static str {
        match self {
            PartyEvent::PartyRegistered(_) => "parties.party.registered",
            PartyEvent::PartyUpdated(_) => "parties.party.updated",
            PartyEvent::PartyArchived(_) => "parties.party.archived",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            PartyEvent::PartyRegistered(e) => e.occurred_at,
            PartyEvent::PartyUpdated(e) => e.occurred_at,
            PartyEvent::PartyArchived(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Party {
    type Command = PartyCommand;
    type Event = PartyEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            PartyEvent::PartyRegistered(e) => {
                self.id = e.party_id;
                self.kind = e.kind;
                self.name = e.name.clone();
                self.gstin = e.gstin.clone();
                self.state_code = e.state_code.clone();
                self.contact = e.contact.clone();
                self.status = PartyStatus::Active;
                self.created = true;
            }
            PartyEvent::PartyUpdated(e) => {
                self.name = e.name.clone();
                self.gstin = e.gstin.clone();
                self.state_code = e.state_code.clone();
                self.contact = e.contact.clone();
            }
            PartyEvent::PartyArchived(_) => {
                self.status = PartyStatus::Archived;
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            PartyCommand::RegisterParty(cmd) => self.handle_register(cmd),
            PartyCommand::UpdateDetails(cmd) => self.handle_update(cmd),
            PartyCommand::ArchiveParty(cmd) => self.handle_archive(cmd),
        }
    }
}

impl Party {
    fn ensure_party_id(&self, party_id: PartyId) -> Result<(), DomainError> {
        if self.id != party_id {
            return Err(DomainError::invariant("party_id mismatch"));
        }
        Ok(())
    }

    fn validate_name(name: &str) -> Result<String, DomainError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("party name cannot be empty"));
        }
        Ok(name.to_string())
    }

    fn handle_register(&self, cmd: &RegisterParty) -> Result<Vec<PartyEvent>, DomainError> {
        if self.created {
            return Err(DomainError::conflict("party already exists"));
        }
        let name = Self::validate_name(&cmd.name)?;

        Ok(vec![PartyEvent::PartyRegistered(PartyRegistered {
            party_id: cmd.party_id,
            kind: cmd.kind,
            name,
            gstin: cmd.gstin.clone(),
            state_code: cmd.state_code.clone(),
            contact: cmd.contact.clone().unwrap_or_default(),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateDetails) -> Result<Vec<PartyEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_party_id(cmd.party_id)?;
        if self.status == PartyStatus::Archived {
            return Err(DomainError::invariant("cannot update an archived party"));
        }

        let name = match &cmd.name {
            Some(name) => Self::validate_name(name)?,
            None => self.name.clone(),
        };

        Ok(vec![PartyEvent::PartyUpdated(PartyUpdated {
            party_id: cmd.party_id,
            name,
            gstin: cmd.gstin.clone().or_else(|| self.gstin.clone()),
            state_code: cmd.state_code.clone().or_else(|| self.state_code.clone()),
            contact: cmd.contact.clone().unwrap_or_else(|| self.contact.clone()),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_archive(&self, cmd: &ArchiveParty) -> Result<Vec<PartyEvent>, DomainError> {
        if !self.created {
            return Err(DomainError::not_found());
        }
        self.ensure_party_id(cmd.party_id)?;
        if self.status == PartyStatus::Archived {
            return Err(DomainError::conflict("party is already archived"));
        }

        Ok(vec![PartyEvent::PartyArchived(PartyArchived {
            party_id: cmd.party_id,
            reason: cmd.reason.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_time() -> DateTime<Utc> {
        Utc::now()
    }

    fn register(party_id: PartyId, gstin: Option<&str>) -> RegisterParty {
        RegisterParty {
            party_id,
            kind: PartyKind::Customer,
            name: "  Sharma Traders ".to_string(),
            gstin: gstin.map(|g| g.parse().unwrap()),
            state_code: None,
            contact: None,
            occurred_at: test_time(),
        }
    }

    fn registered(gstin: Option<&str>) -> Party {
        let party_id = PartyId::new();
        let mut party = Party::empty(party_id);
        party
            .execute(&PartyCommand::RegisterParty(register(party_id, gstin)))
            .unwrap();
        party
    }

    #[test]
    fn register_party_trims_name_and_activates() {
        let party = registered(None);
        assert_eq!(party.name(), "Sharma Traders");
        assert_eq!(party.status(), PartyStatus::Active);
        assert!(party.can_transact());
        assert_eq!(party.version(), 1);
    }

    #[test]
    fn register_rejects_blank_name() {
        let party_id = PartyId::new();
        let party = Party::empty(party_id);
        let mut cmd = register(party_id, None);
        cmd.name = "   ".to_string();
        let err = party.handle(&PartyCommand::RegisterParty(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn register_twice_conflicts() {
        let party = registered(None);
        let cmd = register(party.id_typed(), None);
        let err = party.handle(&PartyCommand::RegisterParty(cmd)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn place_of_supply_prefers_explicit_state() {
        let mut party = registered(Some("27AAPFU0939F1ZV"));
        assert_eq!(party.place_of_supply().unwrap().as_str(), "27");

        let cmd = UpdateDetails {
            party_id: party.id_typed(),
            name: None,
            gstin: None,
            state_code: Some("29".parse().unwrap()),
            contact: None,
            occurred_at: test_time(),
        };
        party.execute(&PartyCommand::UpdateDetails(cmd)).unwrap();
        assert_eq!(party.place_of_supply().unwrap().as_str(), "29");
        assert_eq!(party.gstin().unwrap().as_str(), "27AAPFU0939F1ZV");
        assert_eq!(party.name(), "Sharma Traders");
    }

    #[test]
    fn unregistered_party_has_no_place_of_supply() {
        assert!(registered(None).place_of_supply().is_none());
    }

    #[test]
    fn archived_party_cannot_transact_or_update() {
        let mut party = registered(None);
        let archive = ArchiveParty {
            party_id: party.id_typed(),
            reason: Some("closed".to_string()),
            occurred_at: test_time(),
        };
        party
            .execute(&PartyCommand::ArchiveParty(archive.clone()))
            .unwrap();
        assert!(!party.can_transact());

        let err = party
            .handle(&PartyCommand::ArchiveParty(archive))
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));

        let update = UpdateDetails {
            party_id: party.id_typed(),
            name: Some("New".to_string()),
            gstin: None,
            state_code: None,
            contact: None,
            occurred_at: test_time(),
        };
        let err = party
            .handle(&PartyCommand::UpdateDetails(update))
            .unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }

    #[test]
    fn update_rejects_unknown_party() {
        let party = Party::empty(PartyId::new());
        let cmd = UpdateDetails {
            party_id: party.id_typed(),
            name: None,
            gstin: None,
            state_code: None,
            contact: None,
            occurred_at: test_time(),
        };
        let err = party.handle(&PartyCommand::UpdateDetails(cmd)).unwrap_err();
        assert_eq!(err, DomainError::NotFound);
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let party = registered(Some("29AABCT1332L1ZA"));
        let json = serde_json::to_value(&party).unwrap();
        let back: Party = serde_json::from_value(json).unwrap();
        assert_eq!(back, party);
    }

    #[test]
    fn apply_is_deterministic() {
        let party_id = PartyId::new();
        let e1 = PartyEvent::PartyRegistered(PartyRegistered {
            party_id,
            kind: PartyKind::Vendor,
            name: "Steel Co".to_string(),
            gstin: None,
            state_code: None,
            contact: ContactInfo::default(),
            occurred_at: test_time(),
        });
        let e2 = PartyEvent::PartyArchived(PartyArchived {
            party_id,
            reason: None,
            occurred_at: test_time(),
        });

        let mut a = Party::empty(party_id);
        let mut b = Party::empty(party_id);
        for e in [&e1, &e2] {
            a.apply(e);
            b.apply(e);
        }
        assert_eq!(a, b);
        assert_eq!(a.kind(), PartyKind::Vendor);
        assert_eq!(a.version(), 2);
    }
}
