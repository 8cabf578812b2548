//! Unit of work over a [`FreebieStore`].

use tracing::{info, warn};

use crate::domain::{DevId, FreebieGraph, FreebieId};
use crate::error::{DbError, ModelError};
use crate::infra::db::FreebieStore;

/// A loaded working set bound to the store it came from.
///
/// Changes made through [`Session::modify`] stay in memory until
/// [`Session::commit`] writes them in one transaction. Dropping a session
/// with pending changes discards them.
pub struct Session<S: FreebieStore> {
    graph: FreebieGraph,
    has_pending_changes: bool,
    store: S,
}

impl<S: FreebieStore> Session<S> {
    /// Loads the current contents of `store`.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn open(store: S) -> Result<Self, DbError> {
        let graph = store.load()?;
        info!(
            companies = graph.companies().count(),
            devs = graph.devs().count(),
            freebies = graph.freebies().count(),
            "session opened"
        );

        Ok(Self {
            graph,
            has_pending_changes: false,
            store,
        })
    }

    pub fn graph(&self) -> &FreebieGraph {
        &self.graph
    }

    /// Applies `change` to the working set.
    ///
    /// The session only counts as changed when `change` succeeds, so
    /// `change` must leave the graph untouched when it fails.
    ///
    /// # Errors
    /// Returns the error produced by `change`.
    pub fn modify<T>(
        &mut self,
        change: impl FnOnce(&mut FreebieGraph) -> Result<T, ModelError>,
    ) -> Result<T, ModelError> {
        let value = change(&mut self.graph)?;
        self.has_pending_changes = true;

        Ok(value)
    }

    /// Hands `freebie` from `from` to `to` through
    /// [`FreebieGraph::give_away`], leaving the session clean when nothing
    /// moved.
    ///
    /// # Errors
    /// Returns an error when `to` is not part of the working set.
    pub fn give_away(
        &mut self,
        from: DevId,
        to: DevId,
        freebie: FreebieId,
    ) -> Result<bool, ModelError> {
        let transferred = self.graph.give_away(from, to, freebie)?;
        if transferred {
            self.has_pending_changes = true;
        }

        Ok(transferred)
    }

    pub fn has_pending_changes(&self) -> bool {
        self.has_pending_changes
    }

    /// Writes the working set to the store.
    ///
    /// # Errors
    /// Returns an error if the store rejects the changes; the working set is
    /// left as it was so the caller can fix it or roll back.
    pub fn commit(&mut self) -> Result<(), DbError> {
        self.store.save(&self.graph)?;
        self.has_pending_changes = false;
        info!(freebies = self.graph.freebies().count(), "session committed");

        Ok(())
    }

    /// Discards uncommitted changes by reloading from the store.
    ///
    /// # Errors
    /// Returns an error if the store cannot be read.
    pub fn rollback(&mut self) -> Result<(), DbError> {
        self.graph = self.store.load()?;
        self.has_pending_changes = false;

        Ok(())
    }
}

impl<S: FreebieStore> Drop for Session<S> {
    fn drop(&mut self) {
        if self.has_pending_changes {
            warn!("session closed with uncommitted changes; discarding them");
        }
    }
}
