use chrono::{DateTime, NaiveDate, Utc};
use folio_types::{Attributes, Visibility};
use serde_json::Value;

use crate::error::{AccessError, AccessResult};

/// Keys whose presence means the caller is assigning visibility explicitly.
pub const VISIBILITY_KEYS: [&str; 3] = ["visibility", "embargo_release_date", "lease_expiration_date"];

const COMPANION_KEYS: [&str; 4] = [
    "visibility_during_embargo",
    "visibility_after_embargo",
    "visibility_during_lease",
    "visibility_after_lease",
];

const EMBARGO: &str = "embargo";
const LEASE: &str = "lease";

/// `true` iff `params` names any of [`VISIBILITY_KEYS`].
pub fn assigns_visibility(params: &Attributes) -> bool {
    VISIBILITY_KEYS.iter().any(|key| params.contains_key(*key))
}

/// The raw access-related values pulled out of an attribute map.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisibilityParams {
    pub visibility: Option<Value>,
    pub embargo_release_date: Option<Value>,
    pub lease_expiration_date: Option<Value>,
    pub visibility_during_embargo: Option<Value>,
    pub visibility_after_embargo: Option<Value>,
    pub visibility_during_lease: Option<Value>,
    pub visibility_after_lease: Option<Value>,
}

/// A validated access change.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VisibilityRequest {
    Plain(Visibility),
    Embargo {
        release_date: DateTime<Utc>,
        during: Visibility,
        after: Visibility,
    },
    Lease {
        expiration_date: DateTime<Utc>,
        during: Visibility,
        after: Visibility,
    },
}

impl VisibilityParams {
    /// Remove every access-related key from `attributes`.
    ///
    /// Returns `None` (and removes nothing) when no key in
    /// [`VISIBILITY_KEYS`] is present.
    pub fn take(attributes: &mut Attributes) -> Option<Self> {
        if !assigns_visibility(attributes) {
            return None;
        }
        let mut take = |key: &str| attributes.remove(key);
        let params = Self {
            visibility: take("visibility"),
            embargo_release_date: take("embargo_release_date"),
            lease_expiration_date: take("lease_expiration_date"),
            visibility_during_embargo: take(COMPANION_KEYS[0]),
            visibility_after_embargo: take(COMPANION_KEYS[1]),
            visibility_during_lease: take(COMPANION_KEYS[2]),
            visibility_after_lease: take(COMPANION_KEYS[3]),
        };
        Some(params)
    }

    /// Validate into a request as of `now`.
    ///
    /// `Ok(None)` means nothing to apply: only stray date keys were given.
    pub fn parse(&self, now: DateTime<Utc>) -> AccessResult<Option<VisibilityRequest>> {
        let Some(visibility) = string_value("visibility", self.visibility.as_ref())? else {
            return Ok(None);
        };

        match visibility.as_str() {
            EMBARGO => {
                let release_date = future_date(
                    EMBARGO,
                    "embargo_release_date",
                    self.embargo_release_date.as_ref(),
                    now,
                )?;
                Ok(Some(VisibilityRequest::Embargo {
                    release_date,
                    during: visibility_or(
                        "visibility_during_embargo",
                        self.visibility_during_embargo.as_ref(),
                        Visibility::Restricted,
                    )?,
                    after: visibility_or(
                        "visibility_after_embargo",
                        self.visibility_after_embargo.as_ref(),
                        Visibility::Open,
                    )?,
                }))
            }
            LEASE => {
                let expiration_date = future_date(
                    LEASE,
                    "lease_expiration_date",
                    self.lease_expiration_date.as_ref(),
                    now,
                )?;
                Ok(Some(VisibilityRequest::Lease {
                    expiration_date,
                    during: visibility_or(
                        "visibility_during_lease",
                        self.visibility_during_lease.as_ref(),
                        Visibility::Open,
                    )?,
                    after: visibility_or(
                        "visibility_after_lease",
                        self.visibility_after_lease.as_ref(),
                        Visibility::Restricted,
                    )?,
                }))
            }
            other => other
                .parse()
                .map(|v| Some(VisibilityRequest::Plain(v)))
                .map_err(|_| AccessError::InvalidVisibility {
                    field: "visibility",
                    value: other.to_string(),
                }),
        }
    }
}

fn string_value(field: &'static str, value: Option<&Value>) -> AccessResult<Option<String>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) if s.trim().is_empty() => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.trim().to_string())),
        Some(_) => Err(AccessError::NotAString { field }),
    }
}

fn visibility_or(
    field: &'static str,
    value: Option<&Value>,
    default: Visibility,
) -> AccessResult<Visibility> {
    match string_value(field, value)? {
        None => Ok(default),
        Some(s) => s
            .parse()
            .map_err(|_| AccessError::InvalidVisibility { field, value: s }),
    }
}

fn future_date(
    visibility: &'static str,
    field: &'static str,
    value: Option<&Value>,
    now: DateTime<Utc>,
) -> AccessResult<DateTime<Utc>> {
    let raw = string_value(field, value)?.ok_or(AccessError::MissingDate { visibility, field })?;
    let date = parse_date(&raw).ok_or_else(|| AccessError::InvalidDate {
        field,
        value: raw.clone(),
    })?;
    if date <= now {
        return Err(AccessError::NotInFuture { field, date });
    }
    Ok(date)
}

/// Accepts RFC 3339 timestamps and bare `YYYY-MM-DD` dates (midnight UTC).
fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    fn parse(value: Value) -> AccessResult<Option<VisibilityRequest>> {
        VisibilityParams::take(&mut attrs(value))
            .unwrap_or_default()
            .parse(now())
    }

    #[test]
    fn detects_visibility_keys() {
        assert!(assigns_visibility(&attrs(json!({ "visibility": "open" }))));
        assert!(assigns_visibility(&attrs(json!({ "lease_expiration_date": "2030-01-01" }))));
        assert!(!assigns_visibility(&attrs(json!({ "title": ["x"] }))));
        // Companion keys alone do not count.
        assert!(!assigns_visibility(&attrs(json!({ "visibility_after_embargo": "open" }))));
    }

    #[test]
    fn take_consumes_access_keys_only() {
        let mut a = attrs(json!({
            "visibility": "embargo",
            "embargo_release_date": "2030-01-01",
            "visibility_after_embargo": "authenticated",
            "title": ["Map"],
        }));
        let params = VisibilityParams::take(&mut a).unwrap();
        assert_eq!(params.visibility, Some(json!("embargo")));
        assert_eq!(a.len(), 1);
        assert!(a.contains_key("title"));
    }

    #[test]
    fn take_without_visibility_keys_leaves_map_alone() {
        let mut a = attrs(json!({ "title": ["Map"], "visibility_during_lease": "open" }));
        assert!(VisibilityParams::take(&mut a).is_none());
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn plain_visibility() {
        assert_eq!(
            parse(json!({ "visibility": "authenticated" })).unwrap(),
            Some(VisibilityRequest::Plain(Visibility::Authenticated))
        );
        assert!(matches!(
            parse(json!({ "visibility": "secret" })),
            Err(AccessError::InvalidVisibility { .. })
        ));
    }

    #[test]
    fn embargo_defaults_and_overrides() {
        let req = parse(json!({
            "visibility": "embargo",
            "embargo_release_date": "2030-06-01",
        }))
        .unwrap()
        .unwrap();
        assert_eq!(
            req,
            VisibilityRequest::Embargo {
                release_date: Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap(),
                during: Visibility::Restricted,
                after: Visibility::Open,
            }
        );

        let req = parse(json!({
            "visibility": "embargo",
            "embargo_release_date": "2030-06-01T12:00:00Z",
            "visibility_during_embargo": "authenticated",
        }))
        .unwrap()
        .unwrap();
        assert!(matches!(
            req,
            VisibilityRequest::Embargo { during: Visibility::Authenticated, after: Visibility::Open, .. }
        ));
    }

    #[test]
    fn lease_defaults_mirror_embargo() {
        let req = parse(json!({
            "visibility": "lease",
            "lease_expiration_date": "2030-06-01",
        }))
        .unwrap()
        .unwrap();
        assert!(matches!(
            req,
            VisibilityRequest::Lease { during: Visibility::Open, after: Visibility::Restricted, .. }
        ));
    }

    #[test]
    fn embargo_rejections() {
        assert_eq!(
            parse(json!({ "visibility": "embargo" })).unwrap_err(),
            AccessError::MissingDate { visibility: "embargo", field: "embargo_release_date" }
        );
        assert!(matches!(
            parse(json!({ "visibility": "embargo", "embargo_release_date": "soon" })),
            Err(AccessError::InvalidDate { .. })
        ));
        let past = (now() - Duration::days(1)).to_rfc3339();
        assert!(matches!(
            parse(json!({ "visibility": "embargo", "embargo_release_date": past })),
            Err(AccessError::NotInFuture { .. })
        ));
        assert!(matches!(
            parse(json!({ "visibility": ["open"] })),
            Err(AccessError::NotAString { field: "visibility" })
        ));
    }

    #[test]
    fn stray_dates_are_ignored() {
        assert_eq!(
            parse(json!({ "embargo_release_date": "2030-01-01" })).unwrap(),
            None
        );
        assert_eq!(
            parse(json!({ "visibility": "open", "lease_expiration_date": "2030-01-01" })).unwrap(),
            Some(VisibilityRequest::Plain(Visibility::Open))
        );
    }
}
