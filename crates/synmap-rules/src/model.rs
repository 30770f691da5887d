//! Reference target model
//!
//! A small slice of a regulatory trade-reporting record, enough to bind every
//! rule in this crate to concrete builders. Drivers with their own object
//! model implement [`CategorisedEntry`] and [`RoleEntry`] on their builders
//! instead.

use crate::category::{CategorisedEntry, Classification};
use crate::correlation::RoleEntry;
use synmap_core::synonym_enum;

synonym_enum! {
    /// Financial counterparty sector codes
    pub enum FinancialSector: "FinancialSectorEnum" {
        Aifd => "AIFD",
        Assu => "ASSU",
        Cdti => "CDTI",
        Inun => "INUN",
        Invf => "INVF",
        Orpi => "ORPI",
        Rein => "REIN",
        Ucit => "UCIT",
    }
}

synonym_enum! {
    /// Non-financial counterparty sectors (NACE sections)
    pub enum NonFinancialSector: "NonFinancialSectorEnum" {
        A => "A",
        B => "B",
        C => "C",
        D => "D",
        E => "E",
        F => "F",
        G => "G",
        H => "H",
        I => "I",
        J => "J",
        K => "K",
        L => "L",
        M => "M",
        N => "N",
        O => "O",
        P => "P",
        Q => "Q",
        R => "R",
        S => "S",
        T => "T",
        U => "U",
    }
}

synonym_enum! {
    /// Roles a related party can play in a trade
    pub enum PartyRole: "PartyRoleEnum" {
        Beneficiary => "Beneficiary",
        Broker => "Broker",
        ClearingClient => "ClearingClient",
        ClearingFirm => "ClearingFirm",
        ExecutingEntity => "ExecutingEntity",
        ReportingParty => "ReportingParty",
        SubmittingParty => "SubmittingParty",
    }
}

/// Corporate sector of a counterparty under one reporting regime
pub type CorporateSector = Classification<FinancialSector, NonFinancialSector>;

/// One reporting regime entry of a counterparty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportingRegimeBuilder {
    /// Regulator / regime tag, e.g. `ESMA`
    pub regime: Option<String>,
    pub corporate_sector: Option<CorporateSector>,
}

impl ReportingRegimeBuilder {
    pub fn for_regime(regime: impl Into<String>) -> Self {
        Self {
            regime: Some(regime.into()),
            corporate_sector: None,
        }
    }
}

impl CategorisedEntry for ReportingRegimeBuilder {
    type Primary = FinancialSector;
    type Secondary = NonFinancialSector;

    fn category(&self) -> Option<&str> {
        self.regime.as_deref()
    }

    fn set_classification(&mut self, classification: CorporateSector) {
        self.corporate_sector = Some(classification);
    }
}

/// A party reference together with the roles it plays
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartyRoleBuilder {
    pub party_reference: Option<String>,
    pub roles: Vec<PartyRole>,
}

impl RoleEntry for PartyRoleBuilder {
    type Role = PartyRole;

    fn roles(&self) -> &[PartyRole] {
        &self.roles
    }

    fn add_role(&mut self, role: PartyRole) {
        self.roles.push(role);
    }

    fn set_reference(&mut self, reference: String) {
        self.party_reference = Some(reference);
    }
}

/// Boolean flags of a transaction; `None` means "not determined"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TradeFlagsBuilder {
    pub intragroup: Option<bool>,
    pub clearing_obligation: Option<bool>,
}

impl TradeFlagsBuilder {
    pub fn set_intragroup(&mut self, value: bool) {
        self.intragroup = Some(value);
    }

    pub fn set_clearing_obligation(&mut self, value: bool) {
        self.clearing_obligation = Some(value);
    }
}
