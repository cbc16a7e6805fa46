//! Core types for parsed FreeBSD GEOM output and geom requests.
//!
//! This crate defines the data model shared by the parser, the runner and
//! the command-line front end:
//!
//! - [`Geom`]: one entity from `geom <class> list`, with its head
//!   attributes and optional nested providers/consumers.
//! - [`GeomItem`]: a provider or consumer entry.
//! - [`StatusEntry`]: one row from `geom <class> status -s`.
//! - [`GeomOutput`]: either mapping, serialized untagged.
//! - [`GeomRequest`]: the sub-command, [`DeviceClass`] and optional device
//!   filter of a query.
//!
//! Validation ([`validate_request`]) rejects device filters that are empty,
//! option-like, or contain whitespace or shell metacharacters.
//!
//! # Example
//!
//! ```
//! use geomscan_core::*;
//!
//! let request = GeomRequest::new(GeomCommand::List, DeviceClass::Mirror).with_device("gm0");
//! assert!(validate_request(&request).is_ok());
//! assert_eq!(request.argv(), vec!["MIRROR", "list", "gm0"]);
//! ```

mod request;
mod types;
mod validate;

pub use request::{DeviceClass, GeomCommand, GeomRequest};
pub use types::*;
pub use validate::{ValidationError, validate_device, validate_request};
