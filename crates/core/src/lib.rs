//! Core business logic for Coffer.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! The relational store and the object store are reached only through the
//! contracts in [`custody`], so everything here runs against in-memory fakes.
//!
//! # Modules
//!
//! - `access_code` - Fixed-width numeric access codes and their salted digests
//! - `auth` - Account password hashing
//! - `custody` - Upload, listing, code-verified retrieval and deletion across both stores
//! - `storage` - OpenDAL-backed object storage adapter

pub mod access_code;
pub mod auth;
pub mod custody;
pub mod storage;
