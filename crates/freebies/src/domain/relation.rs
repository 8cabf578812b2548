//! One-to-many bookkeeping shared by every freebie owner.

use std::collections::BTreeSet;
use std::hash::Hash;

use rustc_hash::FxHashMap;

/// Index from an owner to the children that point back at it.
///
/// Every ownership change goes through [`Backrefs::link`],
/// [`Backrefs::unlink`] or [`Backrefs::transfer`], so the owner side always
/// agrees with the reference stored on the child.
#[derive(Clone, Debug)]
pub struct Backrefs<O, C> {
    children: FxHashMap<O, BTreeSet<C>>,
}

impl<O, C> Default for Backrefs<O, C> {
    fn default() -> Self {
        Self {
            children: FxHashMap::default(),
        }
    }
}

impl<O, C> Backrefs<O, C>
where
    O: Copy + Eq + Hash,
    C: Copy + Ord,
{
    /// Records `child` under `owner`.
    pub fn link(&mut self, owner: O, child: C) {
        self.children.entry(owner).or_default().insert(child);
    }

    /// Removes `child` from `owner`, returning whether it was linked.
    pub fn unlink(&mut self, owner: O, child: C) -> bool {
        let Some(children) = self.children.get_mut(&owner) else {
            return false;
        };
        let removed = children.remove(&child);
        if children.is_empty() {
            self.children.remove(&owner);
        }

        removed
    }

    /// Moves `child` from `from` to `to` when `from` currently owns it.
    pub fn transfer(&mut self, child: C, from: O, to: O) -> bool {
        if !self.unlink(from, child) {
            return false;
        }
        self.link(to, child);

        true
    }

    pub fn contains(&self, owner: O, child: C) -> bool {
        self.children
            .get(&owner)
            .is_some_and(|children| children.contains(&child))
    }

    /// Iterates the children of `owner` in ascending order.
    pub fn children(&self, owner: O) -> impl Iterator<Item = C> + '_ {
        self.children
            .get(&owner)
            .into_iter()
            .flat_map(|children| children.iter().copied())
    }

    /// Drops `owner` and hands back everything it owned.
    pub fn remove_owner(&mut self, owner: O) -> BTreeSet<C> {
        self.children.remove(&owner).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_moves_child_between_owners() {
        // Arrange
        let mut backrefs: Backrefs<u8, u32> = Backrefs::default();
        backrefs.link(1, 10);
        backrefs.link(1, 11);

        // Act
        let moved = backrefs.transfer(10, 1, 2);

        // Assert
        assert!(moved);
        assert_eq!(backrefs.children(1).collect::<Vec<_>>(), vec![11]);
        assert_eq!(backrefs.children(2).collect::<Vec<_>>(), vec![10]);
    }

    #[test]
    fn test_transfer_from_non_owner_changes_nothing() {
        // Arrange
        let mut backrefs: Backrefs<u8, u32> = Backrefs::default();
        backrefs.link(1, 10);

        // Act
        let moved = backrefs.transfer(10, 3, 2);

        // Assert
        assert!(!moved);
        assert!(backrefs.contains(1, 10));
        assert_eq!(backrefs.children(2).count(), 0);
    }

    #[test]
    fn test_remove_owner_returns_children() {
        // Arrange
        let mut backrefs: Backrefs<u8, u32> = Backrefs::default();
        backrefs.link(1, 12);
        backrefs.link(1, 10);

        // Act
        let removed = backrefs.remove_owner(1);

        // Assert
        assert_eq!(removed.into_iter().collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(backrefs.children(1).count(), 0);
    }
}
