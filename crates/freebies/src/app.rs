//! Collaborators that drive the data model: the unit-of-work session, the
//! seeding routine and the interactive inspection shell.

pub mod seed;
pub mod session;
pub mod shell;
