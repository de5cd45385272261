//! Carpool — a ride offering owned by a driver.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  id::{CarpoolId, PersonId},
  identity::Identity,
};

/// A persisted carpool. Its ride requests are fetched through
/// [`CarpoolStore`](crate::store::CarpoolStore).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Carpool {
  pub carpool_id: CarpoolId,
  /// `None` when the carpool currently has no driver.
  pub driver_id:  Option<PersonId>,
  pub created_at: DateTime<Utc>,
}

impl Carpool {
  /// True iff `identity` is authenticated as this carpool's driver.
  /// Anonymous callers and driverless carpools yield `false`.
  pub fn current_user_is_driver(&self, identity: Identity) -> bool {
    self.driver_id.is_some_and(|driver| identity.is(driver))
  }
}

/// Input for [`CarpoolStore::add_carpool`](crate::store::CarpoolStore::add_carpool).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewCarpool {
  pub driver_id: Option<PersonId>,
}

#[cfg(test)]
mod tests {
  use super::*;

  fn carpool(driver_id: Option<PersonId>) -> Carpool {
    Carpool { carpool_id: CarpoolId(1), driver_id, created_at: Utc::now() }
  }

  #[test]
  fn anonymous_is_never_driver() {
    assert!(!carpool(Some(PersonId(1))).current_user_is_driver(Identity::Anonymous));
    assert!(!carpool(None).current_user_is_driver(Identity::Anonymous));
  }

  #[test]
  fn driver_matches_only_own_carpool() {
    let me = Identity::Person { person_id: PersonId(1) };
    assert!(carpool(Some(PersonId(1))).current_user_is_driver(me));
    assert!(!carpool(Some(PersonId(2))).current_user_is_driver(me));
    assert!(!carpool(None).current_user_is_driver(me));
  }
}
