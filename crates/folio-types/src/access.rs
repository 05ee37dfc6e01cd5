//! Access state shared by works and file sets: visibility plus optional
//! time-bounded embargo and lease restrictions.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FieldError, TypeError};

/// Discovery/read access level of an entity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Readable by anyone.
    Open,
    /// Readable by any authenticated (institutional) user.
    Authenticated,
    /// Readable only by users holding explicit grants.
    #[default]
    Restricted,
}

impl Visibility {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Authenticated => "authenticated",
            Self::Restricted => "restricted",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Visibility {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "open" => Ok(Self::Open),
            "authenticated" => Ok(Self::Authenticated),
            "restricted" => Ok(Self::Restricted),
            other => Err(TypeError::InvalidVisibility(other.to_string())),
        }
    }
}

/// An embargo: restricted visibility until `release_date`, then
/// `visibility_after`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embargo {
    pub release_date: DateTime<Utc>,
    pub visibility_during: Visibility,
    pub visibility_after: Visibility,
    /// Human-readable record of past deactivations.
    #[serde(default)]
    pub history: Vec<String>,
}

impl Embargo {
    pub fn new(
        release_date: DateTime<Utc>,
        visibility_during: Visibility,
        visibility_after: Visibility,
    ) -> Self {
        Self {
            release_date,
            visibility_during,
            visibility_after,
            history: Vec::new(),
        }
    }

    /// An embargo is active until its release date passes.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.release_date > now
    }
}

/// A lease: permissive visibility until `expiration_date`, then
/// `visibility_after`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    pub expiration_date: DateTime<Utc>,
    pub visibility_during: Visibility,
    pub visibility_after: Visibility,
    #[serde(default)]
    pub history: Vec<String>,
}

impl Lease {
    pub fn new(
        expiration_date: DateTime<Utc>,
        visibility_during: Visibility,
        visibility_after: Visibility,
    ) -> Self {
        Self {
            expiration_date,
            visibility_during,
            visibility_after,
            history: Vec::new(),
        }
    }

    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expiration_date > now
    }
}

/// Entities whose access state can be read, assigned and copied.
///
/// Implemented by [`crate::Work`] and [`crate::FileSet`] so access
/// interpretation works on either.
pub trait AccessControlled {
    fn visibility(&self) -> Visibility;
    fn set_visibility(&mut self, visibility: Visibility);

    fn embargo(&self) -> Option<&Embargo>;
    fn set_embargo(&mut self, embargo: Option<Embargo>);

    fn lease(&self) -> Option<&Lease>;
    fn set_lease(&mut self, lease: Option<Lease>);

    /// Record a rejected access request. It shows on the entity's errors
    /// at once and fails the next save, which consumes it.
    fn reject(&mut self, error: FieldError);

    fn embargo_release_date(&self) -> Option<DateTime<Utc>> {
        self.embargo().map(|e| e.release_date)
    }

    fn lease_expiration_date(&self) -> Option<DateTime<Utc>> {
        self.lease().map(|l| l.expiration_date)
    }

    fn under_embargo(&self, now: DateTime<Utc>) -> bool {
        self.embargo().is_some_and(|e| e.is_active(now))
    }

    fn active_lease(&self, now: DateTime<Utc>) -> bool {
        self.lease().is_some_and(|l| l.is_active(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn visibility_parses_known_values() {
        assert_eq!("open".parse::<Visibility>().unwrap(), Visibility::Open);
        assert_eq!(
            "authenticated".parse::<Visibility>().unwrap(),
            Visibility::Authenticated
        );
        assert_eq!(
            "restricted".parse::<Visibility>().unwrap(),
            Visibility::Restricted
        );
        assert!("embargo".parse::<Visibility>().is_err());
    }

    #[test]
    fn visibility_serde_is_lowercase() {
        let json = serde_json::to_string(&Visibility::Authenticated).unwrap();
        assert_eq!(json, "\"authenticated\"");
    }

    #[test]
    fn embargo_activity_tracks_release_date() {
        let now = Utc::now();
        let embargo = Embargo::new(
            now + Duration::days(1),
            Visibility::Restricted,
            Visibility::Open,
        );
        assert!(embargo.is_active(now));
        assert!(!embargo.is_active(now + Duration::days(2)));
    }

    #[test]
    fn lease_activity_tracks_expiration() {
        let now = Utc::now();
        let lease = Lease::new(now - Duration::hours(1), Visibility::Open, Visibility::Restricted);
        assert!(!lease.is_active(now));
    }
}
