use std::fmt;

use super::company::{Company, CompanyId};
use super::dev::{Dev, DevId};

/// Primary key of a persisted [`Freebie`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct FreebieId(pub i64);

impl fmt::Display for FreebieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A freebie that has not been staged in a working set yet.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct NewFreebie {
    pub company: CompanyId,
    pub dev: DevId,
    pub item_name: String,
    pub value: i64,
}

impl NewFreebie {
    pub fn new(item_name: impl Into<String>, value: i64, dev: DevId, company: CompanyId) -> Self {
        Self {
            company,
            dev,
            item_name: item_name.into(),
            value,
        }
    }
}

/// An item a company gave to a developer.
///
/// The owning dev can only change through
/// [`FreebieGraph::give_away`](super::FreebieGraph::give_away); the issuing
/// company never changes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Freebie {
    company: CompanyId,
    dev: DevId,
    pub id: FreebieId,
    pub item_name: String,
    pub value: i64,
}

impl Freebie {
    pub fn new(id: FreebieId, freebie: NewFreebie) -> Self {
        Self {
            company: freebie.company,
            dev: freebie.dev,
            id,
            item_name: freebie.item_name,
            value: freebie.value,
        }
    }

    /// Returns the issuing company.
    pub fn company(&self) -> CompanyId {
        self.company
    }

    /// Returns the current owner.
    pub fn dev(&self) -> DevId {
        self.dev
    }

    /// Describes who owns the item and where it came from.
    pub fn details(&self, dev: &Dev, company: &Company) -> String {
        format!(
            "{} owns a {} from {}",
            dev.name, self.item_name, company.name
        )
    }

    pub(crate) fn set_dev(&mut self, dev: DevId) {
        self.dev = dev;
    }
}

impl fmt::Display for Freebie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Freebie {} (Value: {})>", self.item_name, self.value)
    }
}
