//! Domains module containing business logic organized by bounded contexts.
//!
//! The server only exposes tools; every NetBox operation lives under
//! [`tools`].

pub mod tools;
