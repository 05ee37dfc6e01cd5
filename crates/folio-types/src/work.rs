use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::access::{AccessControlled, Embargo, Lease, Visibility};
use crate::error::FieldError;
use crate::id::EntityId;

/// An aggregating repository entity with an ordered list of member file sets.
///
/// `representative` and `thumbnail` point at members; once any member is
/// appended they name the first member appended while they were unset.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Work {
    /// Assigned by the repository on first persist.
    pub id: Option<EntityId>,
    pub title: Vec<String>,
    pub depositor: Option<String>,
    pub ordered_members: Vec<EntityId>,
    pub representative: Option<EntityId>,
    pub thumbnail: Option<EntityId>,
    pub visibility: Visibility,
    pub embargo: Option<Embargo>,
    pub lease: Option<Lease>,
    pub date_modified: Option<DateTime<Utc>>,
    /// Outcome of the last save or access request.
    #[serde(skip)]
    pub errors: Vec<FieldError>,
    /// Rejected access requests awaiting the next save.
    #[serde(skip)]
    pub rejections: Vec<FieldError>,
}

impl Work {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: vec![title.into()],
            ..Default::default()
        }
    }

    /// `true` until the repository has assigned an identifier.
    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Append a member at the tail of the ordered member list.
    pub fn append_member(&mut self, member: EntityId) {
        self.ordered_members.push(member);
    }

    /// Set `representative` to `member` unless one is already set.
    /// Returns `true` if it was assigned.
    pub fn set_representative_if_unset(&mut self, member: &EntityId) -> bool {
        if self.representative.is_some() {
            return false;
        }
        self.representative = Some(member.clone());
        true
    }

    /// Set `thumbnail` to `member` unless one is already set.
    pub fn set_thumbnail_if_unset(&mut self, member: &EntityId) -> bool {
        if self.thumbnail.is_some() {
            return false;
        }
        self.thumbnail = Some(member.clone());
        true
    }

    pub fn member_count(&self) -> usize {
        self.ordered_members.len()
    }

    /// Semantic validation run by repositories before persisting.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = self.rejections.clone();
        if self.title.iter().all(|t| t.trim().is_empty()) {
            errors.push(FieldError::new("title", "a work requires a title"));
        }
        errors
    }
}

impl AccessControlled for Work {
    fn visibility(&self) -> Visibility {
        self.visibility
    }

    fn set_visibility(&mut self, visibility: Visibility) {
        self.visibility = visibility;
    }

    fn embargo(&self) -> Option<&Embargo> {
        self.embargo.as_ref()
    }

    fn set_embargo(&mut self, embargo: Option<Embargo>) {
        self.embargo = embargo;
    }

    fn lease(&self) -> Option<&Lease> {
        self.lease.as_ref()
    }

    fn set_lease(&mut self, lease: Option<Lease>) {
        self.lease = lease;
    }

    fn reject(&mut self, error: FieldError) {
        self.errors.push(error.clone());
        self.rejections.push(error);
    }
}
