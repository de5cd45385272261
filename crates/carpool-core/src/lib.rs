//! Core types and trait definitions for the carpool data model.
//!
//! This crate is free of database dependencies. Storage backends implement
//! [`store::CarpoolStore`]; everything else depends on that abstraction.

// Native `async fn` in trait impls; the trait itself spells out `Send` bounds.
#![allow(async_fn_in_trait)]

pub mod carpool;
pub mod error;
pub mod id;
pub mod identity;
pub mod person;
pub mod role;
pub mod ride_request;
pub mod store;

pub use error::{Error, Result};
