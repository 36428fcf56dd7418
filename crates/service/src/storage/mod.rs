//! Storage abstractions for the service layer
//!
//! Contains the reusable file-backed list store used by roster
//! implementations that persist an ordered collection as JSON.

pub mod json_list_store;
