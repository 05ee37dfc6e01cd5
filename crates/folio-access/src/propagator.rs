use chrono::{DateTime, Utc};
use folio_types::{now_utc, AccessControlled, Attributes, Embargo, FieldError, Lease};
use tracing::{debug, info};

use crate::params::{VisibilityParams, VisibilityRequest};

/// Applies caller-supplied access state to entities and keeps parent and
/// child access state consistent.
#[derive(Clone, Copy, Debug, Default)]
pub struct VisibilityPropagator;

impl VisibilityPropagator {
    pub fn new() -> Self {
        Self
    }

    /// Consume the access keys from `attributes` and apply them to `entity`.
    ///
    /// Returns `false` if the request was rejected. The rejection is
    /// recorded on the entity's errors, so its next save fails validation.
    /// Returns `true` when the keys were applied or when there was nothing
    /// to apply.
    pub fn interpret_visibility<E>(&self, entity: &mut E, attributes: &mut Attributes) -> bool
    where
        E: AccessControlled + ?Sized,
    {
        self.interpret_visibility_at(entity, attributes, now_utc())
    }

    pub fn interpret_visibility_at<E>(
        &self,
        entity: &mut E,
        attributes: &mut Attributes,
        now: DateTime<Utc>,
    ) -> bool
    where
        E: AccessControlled + ?Sized,
    {
        let Some(params) = VisibilityParams::take(attributes) else {
            return true;
        };
        match params.parse(now) {
            Ok(Some(request)) => {
                self.apply(entity, request);
                true
            }
            Ok(None) => true,
            Err(err) => {
                debug!(field = err.field(), error = %err, "visibility request rejected");
                entity.reject(FieldError::new(err.field(), err.to_string()));
                false
            }
        }
    }

    /// Apply a validated request.
    pub fn apply<E>(&self, entity: &mut E, request: VisibilityRequest)
    where
        E: AccessControlled + ?Sized,
    {
        match request {
            VisibilityRequest::Plain(visibility) => {
                entity.set_embargo(None);
                entity.set_lease(None);
                entity.set_visibility(visibility);
            }
            VisibilityRequest::Embargo {
                release_date,
                during,
                after,
            } => {
                entity.set_lease(None);
                entity.set_embargo(Some(Embargo::new(release_date, during, after)));
                entity.set_visibility(during);
            }
            VisibilityRequest::Lease {
                expiration_date,
                during,
                after,
            } => {
                entity.set_embargo(None);
                entity.set_lease(Some(Lease::new(expiration_date, during, after)));
                entity.set_visibility(during);
            }
        }
    }

    /// Copy the plain visibility value from `source` onto `dest`.
    pub fn copy_visibility<S, D>(&self, source: &S, dest: &mut D)
    where
        S: AccessControlled + ?Sized,
        D: AccessControlled + ?Sized,
    {
        dest.set_visibility(source.visibility());
    }

    /// Lift an expired embargo or lease to its after-value.
    ///
    /// The restriction record stays on the entity with a history line.
    /// Returns `true` if visibility changed.
    pub fn deactivate_expired<E>(&self, entity: &mut E, now: DateTime<Utc>) -> bool
    where
        E: AccessControlled + ?Sized,
    {
        let mut changed = false;

        if let Some(mut embargo) = entity.embargo().cloned() {
            if !embargo.is_active(now) && entity.visibility() != embargo.visibility_after {
                embargo.history.push(format!(
                    "An expired embargo was deactivated on {}. Its release date was {}. \
                     Visibility during embargo was {} and intended visibility after embargo was {}",
                    now.date_naive(),
                    embargo.release_date.date_naive(),
                    embargo.visibility_during,
                    embargo.visibility_after,
                ));
                entity.set_visibility(embargo.visibility_after);
                entity.set_embargo(Some(embargo));
                changed = true;
            }
        }

        if let Some(mut lease) = entity.lease().cloned() {
            if !lease.is_active(now) && entity.visibility() != lease.visibility_after {
                lease.history.push(format!(
                    "An expired lease was deactivated on {}. Its expiration date was {}. \
                     Visibility during the lease was {} and intended visibility after the lease was {}",
                    now.date_naive(),
                    lease.expiration_date.date_naive(),
                    lease.visibility_during,
                    lease.visibility_after,
                ));
                entity.set_visibility(lease.visibility_after);
                entity.set_lease(Some(lease));
                changed = true;
            }
        }

        if changed {
            info!(visibility = %entity.visibility(), "expired access restriction deactivated");
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use folio_types::{FileSet, Visibility, Work};
    use serde_json::{json, Value};

    fn attrs(value: Value) -> Attributes {
        value.as_object().cloned().unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    // -----------------------------------------------------------------------
    // Interpretation
    // -----------------------------------------------------------------------

    #[test]
    fn embargo_sets_during_visibility_and_consumes_keys() {
        let mut fs = FileSet::new();
        fs.visibility = Visibility::Open;
        let mut a = attrs(json!({
            "visibility": "embargo",
            "embargo_release_date": "2030-01-01",
            "title": ["Map"],
        }));

        assert!(VisibilityPropagator.interpret_visibility_at(&mut fs, &mut a, now()));
        assert_eq!(fs.visibility, Visibility::Restricted);
        assert_eq!(
            fs.embargo_release_date(),
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(fs.under_embargo(now()));
        assert_eq!(a.keys().collect::<Vec<_>>(), vec!["title"]);
    }

    #[test]
    fn lease_replaces_embargo() {
        let mut fs = FileSet::new();
        let p = VisibilityPropagator::new();
        p.interpret_visibility_at(
            &mut fs,
            &mut attrs(json!({ "visibility": "embargo", "embargo_release_date": "2030-01-01" })),
            now(),
        );
        p.interpret_visibility_at(
            &mut fs,
            &mut attrs(json!({ "visibility": "lease", "lease_expiration_date": "2030-01-01" })),
            now(),
        );
        assert!(fs.embargo.is_none());
        assert!(fs.active_lease(now()));
        assert_eq!(fs.visibility, Visibility::Open);
    }

    #[test]
    fn plain_visibility_clears_restrictions() {
        let mut work = Work::new("Letters");
        work.embargo = Some(Embargo::new(
            now() + Duration::days(30),
            Visibility::Restricted,
            Visibility::Open,
        ));
        assert!(VisibilityPropagator.interpret_visibility_at(
            &mut work,
            &mut attrs(json!({ "visibility": "authenticated" })),
            now(),
        ));
        assert!(work.embargo.is_none());
        assert_eq!(work.visibility, Visibility::Authenticated);
    }

    #[test]
    fn rejection_is_recorded_and_state_untouched() {
        let mut fs = FileSet::new();
        fs.visibility = Visibility::Open;
        let mut a = attrs(json!({ "visibility": "embargo" }));

        assert!(!VisibilityPropagator.interpret_visibility_at(&mut fs, &mut a, now()));
        assert_eq!(fs.visibility, Visibility::Open);
        assert_eq!(fs.errors.len(), 1);
        assert_eq!(fs.errors[0].field, "embargo_release_date");
        assert!(a.is_empty());
        assert!(!fs.validate().is_empty());
    }

    #[test]
    fn no_access_keys_is_a_no_op() {
        let mut fs = FileSet::new();
        let mut a = attrs(json!({ "title": ["Map"] }));
        assert!(VisibilityPropagator.interpret_visibility(&mut fs, &mut a));
        assert_eq!(fs.visibility, Visibility::Restricted);
        assert_eq!(a.len(), 1);
    }

    // -----------------------------------------------------------------------
    // Propagation
    // -----------------------------------------------------------------------

    #[test]
    fn copies_parent_visibility() {
        let mut work = Work::new("Letters");
        work.visibility = Visibility::Open;
        let mut fs = FileSet::new();
        VisibilityPropagator.copy_visibility(&work, &mut fs);
        assert_eq!(fs.visibility, Visibility::Open);
    }

    #[test]
    fn expired_embargo_is_lifted_once() {
        let mut fs = FileSet::new();
        VisibilityPropagator.interpret_visibility_at(
            &mut fs,
            &mut attrs(json!({
                "visibility": "embargo",
                "embargo_release_date": "2024-02-01",
                "visibility_after_embargo": "authenticated",
            })),
            now(),
        );
        let later = now() + Duration::days(60);

        assert!(!VisibilityPropagator.deactivate_expired(&mut fs, now()));
        assert!(VisibilityPropagator.deactivate_expired(&mut fs, later));
        assert_eq!(fs.visibility, Visibility::Authenticated);
        assert_eq!(fs.embargo.as_ref().unwrap().history.len(), 1);

        assert!(!VisibilityPropagator.deactivate_expired(&mut fs, later));
        assert_eq!(fs.embargo.as_ref().unwrap().history.len(), 1);
    }

    #[test]
    fn expired_lease_reverts_to_after_value() {
        let mut work = Work::new("Letters");
        VisibilityPropagator.apply(
            &mut work,
            VisibilityRequest::Lease {
                expiration_date: now() + Duration::days(1),
                during: Visibility::Open,
                after: Visibility::Restricted,
            },
        );
        assert_eq!(work.visibility, Visibility::Open);
        assert!(VisibilityPropagator.deactivate_expired(&mut work, now() + Duration::days(2)));
        assert_eq!(work.visibility, Visibility::Restricted);
    }
}
