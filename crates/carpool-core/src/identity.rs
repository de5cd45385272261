//! The authenticated identity of a caller.
//!
//! The session layer resolves its stored identifier into an [`Identity`] via
//! [`CarpoolStore::identify`](crate::store::CarpoolStore::identify), then
//! passes that value to every identity-aware operation.

use serde::{Deserialize, Serialize};

use crate::{id::PersonId, person::Person};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Identity {
  /// No authenticated person. Identity-aware reads degrade to "no match".
  #[default]
  Anonymous,
  Person { person_id: PersonId },
}

impl Identity {
  pub fn person_id(self) -> Option<PersonId> {
    match self {
      Self::Anonymous => None,
      Self::Person { person_id } => Some(person_id),
    }
  }

  pub fn is_authenticated(self) -> bool { self.person_id().is_some() }

  /// True iff this identity is authenticated as `person_id`.
  pub fn is(self, person_id: PersonId) -> bool {
    self.person_id() == Some(person_id)
  }
}

impl From<&Person> for Identity {
  fn from(person: &Person) -> Self {
    Self::Person { person_id: person.person_id }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;

  #[test]
  fn anonymous_is_not_authenticated() {
    let anon = Identity::default();
    assert_eq!(anon, Identity::Anonymous);
    assert!(!anon.is_authenticated());
    assert_eq!(anon.person_id(), None);
    assert!(!anon.is(PersonId(1)));
  }

  #[test]
  fn person_identity_matches_only_itself() {
    let person = Person {
      person_id:            PersonId(7),
      uuid:                 Uuid::new_v4(),
      social_id:            "facebook$7".into(),
      email:                "seven@example.com".into(),
      gender:               None,
      gender_self_describe: None,
      created_at:           Utc::now(),
      roles:                Vec::new(),
    };

    let me = Identity::from(&person);
    assert!(me.is_authenticated());
    assert_eq!(me.person_id(), Some(PersonId(7)));
    assert!(me.is(PersonId(7)));
    assert!(!me.is(PersonId(8)));
  }
}
