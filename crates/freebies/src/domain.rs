//! Domain records and the in-memory working set that keeps their
//! relationships consistent.

pub mod company;
pub mod dev;
pub mod freebie;
pub mod graph;
pub mod relation;

pub use company::{Company, CompanyId};
pub use dev::{Dev, DevId};
pub use freebie::{Freebie, FreebieId, NewFreebie};
pub use graph::FreebieGraph;
