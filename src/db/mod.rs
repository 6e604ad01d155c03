//! Provides database interaction functionalities.
//!
//! Currently, this module focuses on PostgreSQL interactions via the `postgres` submodule,
//! and the `ProjectRepository` seam commands read projects through.

mod postgres;

pub use postgres::*;
