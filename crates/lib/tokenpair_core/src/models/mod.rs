//! Domain models shared by the flows and the stores.

pub mod auth;
