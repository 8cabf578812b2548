use std::fmt;

use super::dev::Dev;
use super::freebie::NewFreebie;

/// Primary key of a persisted [`Company`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct CompanyId(pub i64);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A company that hands out freebies.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Company {
    pub founding_year: i64,
    pub id: CompanyId,
    pub name: String,
}

impl Company {
    /// Builds an unsaved freebie issued by this company to `dev`.
    ///
    /// Nothing is attached or persisted here; stage the result with
    /// [`FreebieGraph::add_freebie`](super::FreebieGraph::add_freebie) and
    /// commit the session to store it.
    pub fn give_freebie(&self, dev: &Dev, item_name: impl Into<String>, value: i64) -> NewFreebie {
        NewFreebie {
            company: self.id,
            dev: dev.id,
            item_name: item_name.into(),
            value,
        }
    }

    /// Returns the company with the earliest founding year.
    ///
    /// Companies founded in the same year are ordered by id, so the lowest id
    /// wins a tie regardless of iteration order.
    pub fn oldest_company<'a, I>(companies: I) -> Option<&'a Company>
    where
        I: IntoIterator<Item = &'a Company>,
    {
        companies
            .into_iter()
            .min_by_key(|company| (company.founding_year, company.id))
    }
}

impl fmt::Display for Company {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Company {}>", self.name)
    }
}
