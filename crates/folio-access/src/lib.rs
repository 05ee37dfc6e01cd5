//! Access-state interpretation for Folio.
//!
//! Callers express access changes through a handful of attribute keys
//! (`visibility`, `embargo_release_date`, `lease_expiration_date` and the
//! during/after companions). [`VisibilityPropagator`] turns those keys into
//! visibility, embargo and lease state on any [`folio_types::AccessControlled`]
//! entity, copies visibility from a parent, and lifts expired restrictions.

pub mod error;
pub mod params;
pub mod propagator;

pub use error::{AccessError, AccessResult};
pub use params::{assigns_visibility, VisibilityParams, VisibilityRequest, VISIBILITY_KEYS};
pub use propagator::VisibilityPropagator;
