//! Services that talk to the outside world on behalf of the registries.
//!
//! # Services
//!
//! - `geoip` - IP geolocation over HTTP with caching
//! - `user_agent` - Device, browser and OS strings from a user agent
//! - `visitors` - Visit recording that combines both

pub mod geoip;
pub mod user_agent;
pub mod visitors;

pub use geoip::{GeoError, GeoLocation, GeoLookup, HttpGeoLookup};
pub use visitors::VisitorService;
