//! Person — a user of the carpool system.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{id::PersonId, role::Role};

/// Gender label that triggers the free-text description in
/// [`Person::gender_string`].
pub const SELF_DESCRIBED: &str = "Self-described";

/// A persisted person together with their attached roles.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Person {
  pub person_id:            PersonId,
  /// Stable external identifier handed to the session layer.
  pub uuid:                 Uuid,
  pub social_id:            String,
  pub email:                String,
  pub gender:               Option<String>,
  pub gender_self_describe: Option<String>,
  pub created_at:           DateTime<Utc>,
  pub roles:                Vec<Role>,
}

impl Person {
  /// The identifier the session layer stores to recognise this person across
  /// requests. See [`crate::store::CarpoolStore::identify`].
  pub fn get_id(&self) -> Uuid { self.uuid }

  /// Human-readable gender, or `None` when none was recorded.
  ///
  /// A `"Self-described"` gender is rendered as `"Self-described as <text>"`.
  pub fn gender_string(&self) -> Option<String> {
    let gender = self.gender.as_deref()?;
    match (gender, self.gender_self_describe.as_deref()) {
      (SELF_DESCRIBED, Some(description)) => {
        Some(format!("{gender} as {description}"))
      }
      _ => Some(gender.to_owned()),
    }
  }

  /// True if any attached role is named exactly `name`.
  pub fn has_roles(&self, name: &str) -> bool {
    self.roles.iter().any(|r| r.name == name)
  }

  /// Attach `role` in memory. A role with the same name is not added twice.
  ///
  /// This does not persist anything; use
  /// [`CarpoolStore::grant_role`](crate::store::CarpoolStore::grant_role).
  pub fn add_role(&mut self, role: Role) {
    if !self.has_roles(&role.name) {
      self.roles.push(role);
    }
  }
}

/// Input for [`CarpoolStore::add_person`](crate::store::CarpoolStore::add_person).
/// The store assigns the id, UUID and `created_at`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPerson {
  pub social_id:            String,
  pub email:                String,
  pub gender:               Option<String>,
  pub gender_self_describe: Option<String>,
}

impl NewPerson {
  /// Convenience constructor with no gender recorded.
  pub fn new(social_id: impl Into<String>, email: impl Into<String>) -> Self {
    Self {
      social_id:            social_id.into(),
      email:                email.into(),
      gender:               None,
      gender_self_describe: None,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::id::RoleId;

  fn person(gender: Option<&str>, description: Option<&str>) -> Person {
    Person {
      person_id:            PersonId(1),
      uuid:                 Uuid::new_v4(),
      social_id:            "facebook$1".into(),
      email:                "rider@example.com".into(),
      gender:               gender.map(str::to_owned),
      gender_self_describe: description.map(str::to_owned),
      created_at:           Utc::now(),
      roles:                Vec::new(),
    }
  }

  #[test]
  fn get_id_is_uuid() {
    let p = person(None, None);
    assert_eq!(p.get_id(), p.uuid);
  }

  #[test]
  fn gender_string_plain() {
    let p = person(Some("Female"), None);
    assert_eq!(p.gender_string().as_deref(), Some("Female"));
  }

  #[test]
  fn gender_string_ignores_description_for_other_genders() {
    let p = person(Some("Male"), Some("ignored"));
    assert_eq!(p.gender_string().as_deref(), Some("Male"));
  }

  #[test]
  fn gender_string_self_described() {
    let p = person(Some(SELF_DESCRIBED), Some("self-described gender"));
    assert_eq!(
      p.gender_string().as_deref(),
      Some("Self-described as self-described gender")
    );
  }

  #[test]
  fn gender_string_none_when_unset() {
    assert!(person(None, None).gender_string().is_none());
  }

  #[test]
  fn roles() {
    let role = Role { role_id: RoleId(1), name: "admin".into() };
    let mut p = person(None, None);
    assert!(!p.roles.contains(&role));
    assert!(!p.has_roles("admin"));

    p.add_role(role.clone());
    assert!(p.roles.contains(&role));
    assert!(p.has_roles("admin"));
    assert!(!p.has_roles("Admin"));

    p.add_role(role);
    assert_eq!(p.roles.len(), 1);
  }
}
