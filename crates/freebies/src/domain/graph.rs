//! In-memory working set of companies, devs and freebies.
//!
//! [`FreebieGraph`] owns every loaded record and is the only place where a
//! freebie changes hands. Both owner sides are indexed through [`Backrefs`],
//! so `company -> freebies` and `dev -> freebies` always agree with the ids
//! stored on each [`Freebie`].

use std::collections::{BTreeMap, BTreeSet};

use tracing::debug;

use super::relation::Backrefs;
use super::{Company, CompanyId, Dev, DevId, Freebie, FreebieId, NewFreebie};
use crate::error::ModelError;

const FIRST_ID: i64 = 1;

#[derive(Clone, Debug)]
pub struct FreebieGraph {
    companies: BTreeMap<CompanyId, Company>,
    company_freebies: Backrefs<CompanyId, FreebieId>,
    dev_freebies: Backrefs<DevId, FreebieId>,
    devs: BTreeMap<DevId, Dev>,
    freebies: BTreeMap<FreebieId, Freebie>,
    next_company_id: i64,
    next_dev_id: i64,
    next_freebie_id: i64,
}

impl Default for FreebieGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl FreebieGraph {
    /// Creates an empty working set.
    pub fn new() -> Self {
        Self {
            companies: BTreeMap::new(),
            company_freebies: Backrefs::default(),
            dev_freebies: Backrefs::default(),
            devs: BTreeMap::new(),
            freebies: BTreeMap::new(),
            next_company_id: FIRST_ID,
            next_dev_id: FIRST_ID,
            next_freebie_id: FIRST_ID,
        }
    }

    /// Rebuilds a working set from persisted rows.
    ///
    /// # Errors
    /// Returns an error when a freebie points at a company or dev that is not
    /// part of `companies` or `devs`.
    pub fn from_records(
        companies: Vec<Company>,
        devs: Vec<Dev>,
        freebies: Vec<Freebie>,
    ) -> Result<Self, ModelError> {
        let mut graph = Self::new();
        for company in companies {
            graph.next_company_id = graph.next_company_id.max(company.id.0.saturating_add(1));
            graph.companies.insert(company.id, company);
        }
        for dev in devs {
            graph.next_dev_id = graph.next_dev_id.max(dev.id.0.saturating_add(1));
            graph.devs.insert(dev.id, dev);
        }
        for freebie in freebies {
            graph.ensure_company(freebie.company())?;
            graph.ensure_dev(freebie.dev())?;
            graph.next_freebie_id = graph.next_freebie_id.max(freebie.id.0.saturating_add(1));
            graph.insert_freebie(freebie);
        }

        Ok(graph)
    }

    /// Adds a company and returns its newly assigned id.
    ///
    /// # Errors
    /// Returns an error when no company id is left to assign.
    pub fn add_company(
        &mut self,
        name: impl Into<String>,
        founding_year: i64,
    ) -> Result<CompanyId, ModelError> {
        let id = CompanyId(allocate_id(&mut self.next_company_id, "company")?);
        self.companies.insert(
            id,
            Company {
                founding_year,
                id,
                name: name.into(),
            },
        );

        Ok(id)
    }

    /// Adds a dev and returns its newly assigned id.
    ///
    /// # Errors
    /// Returns an error when no dev id is left to assign.
    pub fn add_dev(&mut self, name: impl Into<String>) -> Result<DevId, ModelError> {
        let id = DevId(allocate_id(&mut self.next_dev_id, "dev")?);
        self.devs.insert(
            id,
            Dev {
                id,
                name: name.into(),
            },
        );

        Ok(id)
    }

    /// Stages a freebie and attaches it to both its company and its dev.
    ///
    /// # Errors
    /// Returns an error when the company or dev is not part of this working
    /// set, or when no freebie id is left to assign.
    pub fn add_freebie(&mut self, freebie: NewFreebie) -> Result<FreebieId, ModelError> {
        self.ensure_company(freebie.company)?;
        self.ensure_dev(freebie.dev)?;

        let id = FreebieId(allocate_id(&mut self.next_freebie_id, "freebie")?);
        self.insert_freebie(Freebie::new(id, freebie));

        Ok(id)
    }

    pub fn company(&self, id: CompanyId) -> Option<&Company> {
        self.companies.get(&id)
    }

    pub fn dev(&self, id: DevId) -> Option<&Dev> {
        self.devs.get(&id)
    }

    pub fn freebie(&self, id: FreebieId) -> Option<&Freebie> {
        self.freebies.get(&id)
    }

    /// Iterates companies in id order.
    pub fn companies(&self) -> impl Iterator<Item = &Company> {
        self.companies.values()
    }

    /// Iterates devs in id order.
    pub fn devs(&self) -> impl Iterator<Item = &Dev> {
        self.devs.values()
    }

    /// Iterates freebies in id order.
    pub fn freebies(&self) -> impl Iterator<Item = &Freebie> {
        self.freebies.values()
    }

    /// Freebies the company has given out.
    pub fn company_freebies(&self, company: CompanyId) -> impl Iterator<Item = &Freebie> {
        self.company_freebies
            .children(company)
            .filter_map(|id| self.freebies.get(&id))
    }

    /// Freebies the dev currently owns.
    pub fn dev_freebies(&self, dev: DevId) -> impl Iterator<Item = &Freebie> {
        self.dev_freebies
            .children(dev)
            .filter_map(|id| self.freebies.get(&id))
    }

    /// Devs holding at least one freebie from `company`, each listed once.
    pub fn company_devs(&self, company: CompanyId) -> Vec<&Dev> {
        let dev_ids: BTreeSet<DevId> = self
            .company_freebies(company)
            .map(Freebie::dev)
            .collect();

        dev_ids.iter().filter_map(|id| self.devs.get(id)).collect()
    }

    /// Companies `dev` holds at least one freebie from, each listed once.
    pub fn dev_companies(&self, dev: DevId) -> Vec<&Company> {
        let company_ids: BTreeSet<CompanyId> =
            self.dev_freebies(dev).map(Freebie::company).collect();

        company_ids
            .iter()
            .filter_map(|id| self.companies.get(id))
            .collect()
    }

    /// Returns whether `dev` owns a freebie named exactly `item_name`.
    pub fn received_one(&self, dev: DevId, item_name: &str) -> bool {
        self.dev_freebies(dev)
            .any(|freebie| freebie.item_name == item_name)
    }

    /// Hands `freebie` from `from` to `to`.
    ///
    /// Returns `Ok(false)` without touching anything when `from` does not own
    /// the freebie.
    ///
    /// # Errors
    /// Returns an error when `from` owns the freebie but `to` is not part of
    /// this working set.
    pub fn give_away(
        &mut self,
        from: DevId,
        to: DevId,
        freebie: FreebieId,
    ) -> Result<bool, ModelError> {
        if !self.dev_freebies.contains(from, freebie) {
            return Ok(false);
        }
        self.ensure_dev(to)?;
        let Some(record) = self.freebies.get_mut(&freebie) else {
            return Ok(false);
        };

        record.set_dev(to);
        self.dev_freebies.transfer(freebie, from, to);
        debug!(%freebie, %from, %to, "transferred freebie");

        Ok(true)
    }

    /// Returns the company with the earliest founding year, lowest id first.
    pub fn oldest_company(&self) -> Option<&Company> {
        Company::oldest_company(self.companies.values())
    }

    /// Describes who owns `freebie` and which company issued it.
    pub fn freebie_details(&self, freebie: FreebieId) -> Option<String> {
        let freebie = self.freebies.get(&freebie)?;
        let dev = self.devs.get(&freebie.dev())?;
        let company = self.companies.get(&freebie.company())?;

        Some(freebie.details(dev, company))
    }

    /// Deletes a company together with every freebie it gave out.
    ///
    /// Devs are kept even when they no longer own anything.
    ///
    /// # Errors
    /// Returns an error when the company does not exist.
    pub fn delete_company(&mut self, company: CompanyId) -> Result<Vec<Freebie>, ModelError> {
        if self.companies.remove(&company).is_none() {
            return Err(ModelError::CompanyNotFound(company));
        }

        let mut removed = Vec::new();
        for id in self.company_freebies.remove_owner(company) {
            if let Some(freebie) = self.freebies.remove(&id) {
                self.dev_freebies.unlink(freebie.dev(), id);
                removed.push(freebie);
            }
        }
        debug!(%company, cascaded = removed.len(), "deleted company");

        Ok(removed)
    }

    /// Deletes a dev together with every freebie it owns.
    ///
    /// # Errors
    /// Returns an error when the dev does not exist.
    pub fn delete_dev(&mut self, dev: DevId) -> Result<Vec<Freebie>, ModelError> {
        if self.devs.remove(&dev).is_none() {
            return Err(ModelError::DevNotFound(dev));
        }

        let mut removed = Vec::new();
        for id in self.dev_freebies.remove_owner(dev) {
            if let Some(freebie) = self.freebies.remove(&id) {
                self.company_freebies.unlink(freebie.company(), id);
                removed.push(freebie);
            }
        }
        debug!(%dev, cascaded = removed.len(), "deleted dev");

        Ok(removed)
    }

    /// Deletes a single freebie.
    ///
    /// # Errors
    /// Returns an error when the freebie does not exist.
    pub fn delete_freebie(&mut self, freebie: FreebieId) -> Result<Freebie, ModelError> {
        let removed = self
            .freebies
            .remove(&freebie)
            .ok_or(ModelError::FreebieNotFound(freebie))?;
        self.company_freebies.unlink(removed.company(), freebie);
        self.dev_freebies.unlink(removed.dev(), freebie);

        Ok(removed)
    }

    /// Drops every record and restarts id assignment.
    pub fn clear(&mut self) {
        *self = Self::new();
    }

    fn ensure_company(&self, company: CompanyId) -> Result<(), ModelError> {
        if self.companies.contains_key(&company) {
            return Ok(());
        }

        Err(ModelError::CompanyNotFound(company))
    }

    fn ensure_dev(&self, dev: DevId) -> Result<(), ModelError> {
        if self.devs.contains_key(&dev) {
            return Ok(());
        }

        Err(ModelError::DevNotFound(dev))
    }

    fn insert_freebie(&mut self, freebie: Freebie) {
        self.company_freebies.link(freebie.company(), freebie.id);
        self.dev_freebies.link(freebie.dev(), freebie.id);
        self.freebies.insert(freebie.id, freebie);
    }
}

/// Hands out `*next` and advances it. `i64::MAX` is never handed out, so an
/// id loaded at the top of the range cannot be reused.
fn allocate_id(next: &mut i64, kind: &'static str) -> Result<i64, ModelError> {
    let id = *next;
    *next = id.checked_add(1).ok_or(ModelError::IdsExhausted(kind))?;

    Ok(id)
}
