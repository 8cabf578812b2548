//! Adapters to external systems.

pub mod db;
