//! Showcase Core - domain types and registries.
//!
//! This crate provides the state shared by every Showcase component:
//! - `storefront` - Public shop and admin API server
//! - `cli` - Command-line tools for seeding and management
//!
//! # Architecture
//!
//! The core crate holds the three registries (products, admins, visitors) and
//! the [`persistence::StateStore`] port they write through. It performs no
//! network I/O; file or database backends live in the binaries that need them.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs and prices
//! - [`catalog`] - Product catalog
//! - [`admins`] - Admin accounts and the login gate
//! - [`visitors`] - Visitor tracking and IP bans
//! - [`persistence`] - Storage port and in-memory backend

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admins;
pub mod catalog;
pub mod error;
pub mod persistence;
pub mod types;
pub mod visitors;

pub use admins::{AdminRegistry, AdminUser, LoginOutcome};
pub use catalog::{NewProduct, Product, ProductCatalog};
pub use error::{ProductError, RegistryError, StorageError};
pub use persistence::{MemoryStore, StateStore};
pub use types::*;
pub use visitors::{VisitorInfo, VisitorMetadata, VisitorRegistry};
