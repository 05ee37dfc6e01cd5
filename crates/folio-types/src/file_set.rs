use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::{AccessControlled, Embargo, Lease, Visibility};
use crate::error::{FieldError, TypeError, TypeResult};
use crate::id::EntityId;
use crate::schema::{self, FieldKind};
use crate::user::User;
use crate::Attributes;

/// Technical metadata extracted from the original file by characterization.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characterization {
    pub mime_type: Option<String>,
    pub byte_size: u64,
    /// Hex-encoded BLAKE3 digest of the characterized bytes.
    pub digest: String,
    pub characterized_at: DateTime<Utc>,
}

/// A repository entity representing one uploaded file and its metadata.
///
/// The file set holds only a weak back-reference to its parent: the parent
/// work lists the file set's id in its ordered members, never the reverse.
/// The original binary and its version history live in the binary store,
/// keyed by the file set's id.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSet {
    /// Assigned by the repository on first persist.
    pub id: Option<EntityId>,
    /// Display filename.
    pub label: Option<String>,
    pub title: Vec<String>,
    pub depositor: Option<String>,
    pub creator: Vec<String>,
    pub edit_users: BTreeSet<String>,
    pub date_uploaded: Option<DateTime<Utc>>,
    pub date_modified: Option<DateTime<Utc>>,
    pub visibility: Visibility,
    pub embargo: Option<Embargo>,
    pub lease: Option<Lease>,
    /// Remaining descriptive fields from the schema, by field name.
    pub metadata: BTreeMap<String, Vec<String>>,
    pub characterization: Option<Characterization>,
    /// Outcome of the last save or access request.
    #[serde(skip)]
    pub errors: Vec<FieldError>,
    /// Rejected access requests awaiting the next save.
    #[serde(skip)]
    pub rejections: Vec<FieldError>,
}

impl FileSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` until the repository has assigned an identifier.
    pub fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Record `user` as depositor and grant them edit access.
    pub fn apply_depositor_metadata(&mut self, user: &User) {
        self.depositor = Some(user.user_key().to_string());
        self.edit_users.insert(user.user_key().to_string());
    }

    /// Values of a descriptive field stored in [`Self::metadata`].
    pub fn field_values(&self, name: &str) -> &[String] {
        self.metadata.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Assign caller-supplied attributes after checking them against the
    /// metadata schema.
    ///
    /// Assignment is all-or-nothing: on any unknown field or malformed value
    /// the file set is left untouched.
    pub fn assign_attributes(&mut self, attributes: &Attributes) -> TypeResult<()> {
        let mut next = self.clone();
        for (name, value) in attributes {
            next.assign_attribute(name, value)?;
        }
        *self = next;
        Ok(())
    }

    fn assign_attribute(&mut self, name: &str, value: &Value) -> TypeResult<()> {
        if name == "visibility" {
            return match single_value(name, value)? {
                Some(v) => {
                    self.visibility = v.parse()?;
                    Ok(())
                }
                None => Ok(()),
            };
        }

        let spec =
            schema::field(name).ok_or_else(|| TypeError::UnknownAttribute(name.to_string()))?;

        match name {
            "title" => self.title = multi_value(name, value)?,
            "creator" => self.creator = multi_value(name, value)?,
            "label" => self.label = single_value(name, value)?,
            "date_uploaded" => self.date_uploaded = date_value(name, value)?,
            "date_modified" => self.date_modified = date_value(name, value)?,
            _ => {
                let values = if spec.is_multiple() {
                    multi_value(name, value)?
                } else {
                    single_value(name, value)?.into_iter().collect()
                };
                if spec.kind == FieldKind::Date {
                    for v in &values {
                        parse_date(name, v)?;
                    }
                }
                if values.is_empty() {
                    self.metadata.remove(name);
                } else {
                    self.metadata.insert(name.to_string(), values);
                }
            }
        }
        Ok(())
    }

    /// Semantic validation run by repositories before persisting.
    ///
    /// Computed from the current fields and pending rejections only, so a
    /// corrected file set validates cleanly whatever its last save reported.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = self.rejections.clone();
        if self.title.iter().any(|t| t.trim().is_empty()) {
            errors.push(FieldError::new("title", "title entries must not be blank"));
        }
        if let Some(label) = &self.label {
            if label.contains('/') {
                errors.push(FieldError::new("label", "label must be a bare filename"));
            }
        }
        errors
    }
}

impl AccessControlled for FileSet {
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

fn single_value(field: &str, value: &Value) -> TypeResult<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => Ok(Some(s.clone())),
        _ => Err(TypeError::InvalidAttributeValue {
            field: field.to_string(),
            expected: "a single string".into(),
        }),
    }
}

fn multi_value(field: &str, value: &Value) -> TypeResult<Vec<String>> {
    let invalid = || TypeError::InvalidAttributeValue {
        field: field.to_string(),
        expected: "a string or an array of strings".into(),
    };
    match value {
        Value::Null => Ok(Vec::new()),
        Value::String(s) if s.is_empty() => Ok(Vec::new()),
        Value::String(s) => Ok(vec![s.clone()]),
        // Form submissions pad arrays with blank entries; drop them.
        Value::Array(items) => items
            .iter()
            .filter(|item| !matches!(item, Value::String(s) if s.is_empty()))
            .map(|item| item.as_str().map(str::to_string).ok_or_else(invalid))
            .collect(),
        _ => Err(invalid()),
    }
}

fn date_value(field: &str, value: &Value) -> TypeResult<Option<DateTime<Utc>>> {
    single_value(field, value)?
        .map(|s| parse_date(field, &s))
        .transpose()
}

fn parse_date(field: &str, value: &str) -> TypeResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| TypeError::InvalidDate {
            field: field.to_string(),
            value: value.to_string(),
        })
}
