//! The `CarpoolStore` trait.
//!
//! Implemented by storage backends (e.g. `carpool-store-sqlite`). Callers
//! depend on this abstraction, not on a concrete backend.

use std::future::Future;

use uuid::Uuid;

use crate::{
  carpool::{Carpool, NewCarpool},
  id::{CarpoolId, PersonId, RideRequestId},
  identity::Identity,
  person::{NewPerson, Person},
  ride_request::{NewRideRequest, RideRequest, RideRequestStatus},
  role::Role,
};

/// Repository over people, roles, carpools and ride requests.
///
/// Every method is its own unit of work: once the returned future resolves
/// successfully, the write is durable and visible to subsequent reads.
///
/// Identity-aware reads take an explicit [`Identity`]; an anonymous identity
/// never produces an error, only an empty result.
pub trait CarpoolStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── People ────────────────────────────────────────────────────────────

  /// Persist a new person. The store assigns the id, the external UUID and
  /// `created_at`.
  fn add_person(
    &self,
    input: NewPerson,
  ) -> impl Future<Output = Result<Person, Self::Error>> + Send + '_;

  /// Retrieve a person (with roles) by id. Returns `None` if not found.
  fn get_person(
    &self,
    id: PersonId,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// Retrieve a person (with roles) by external UUID.
  fn get_person_by_uuid(
    &self,
    uuid: Uuid,
  ) -> impl Future<Output = Result<Option<Person>, Self::Error>> + Send + '_;

  /// All people in creation order.
  fn list_people(
    &self,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_;

  // ── Roles ─────────────────────────────────────────────────────────────

  /// Attach the role called `name` to a person, creating the role if needed.
  /// Granting a role the person already holds is a no-op.
  fn grant_role<'a>(
    &'a self,
    person_id: PersonId,
    name: &'a str,
  ) -> impl Future<Output = Result<Role, Self::Error>> + Send + 'a;

  /// Detach the role called `name`. Returns whether a link was removed.
  fn revoke_role<'a>(
    &'a self,
    person_id: PersonId,
    name: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Roles attached to a person, ordered by name.
  fn get_roles(
    &self,
    person_id: PersonId,
  ) -> impl Future<Output = Result<Vec<Role>, Self::Error>> + Send + '_;

  // ── Session ───────────────────────────────────────────────────────────

  /// Resolve the identifier held by the session layer into an [`Identity`].
  ///
  /// `None`, or a UUID that matches nobody, yields [`Identity::Anonymous`].
  fn identify(
    &self,
    session_id: Option<Uuid>,
  ) -> impl Future<Output = Result<Identity, Self::Error>> + Send + '_;

  // ── Carpools ──────────────────────────────────────────────────────────

  fn add_carpool(
    &self,
    input: NewCarpool,
  ) -> impl Future<Output = Result<Carpool, Self::Error>> + Send + '_;

  fn get_carpool(
    &self,
    id: CarpoolId,
  ) -> impl Future<Output = Result<Option<Carpool>, Self::Error>> + Send + '_;

  /// Replace (or clear) a carpool's driver.
  fn set_driver(
    &self,
    carpool_id: CarpoolId,
    driver_id: Option<PersonId>,
  ) -> impl Future<Output = Result<Carpool, Self::Error>> + Send + '_;

  // ── Ride requests ─────────────────────────────────────────────────────

  fn add_ride_request(
    &self,
    input: NewRideRequest,
  ) -> impl Future<Output = Result<RideRequest, Self::Error>> + Send + '_;

  /// Approve, reject or reopen a ride request.
  fn set_ride_request_status(
    &self,
    id: RideRequestId,
    status: RideRequestStatus,
  ) -> impl Future<Output = Result<RideRequest, Self::Error>> + Send + '_;

  /// A carpool's ride requests in creation order.
  ///
  /// With `Some(statuses)`, only requests whose status is in `statuses` are
  /// returned; an empty slice matches nothing.
  fn get_ride_requests<'a>(
    &'a self,
    carpool_id: CarpoolId,
    statuses: Option<&'a [RideRequestStatus]>,
  ) -> impl Future<Output = Result<Vec<RideRequest>, Self::Error>> + Send + 'a;

  /// People with a ride request to this carpool in any of `statuses`, in the
  /// order of their first matching request. Each person appears once.
  fn get_riders<'a>(
    &'a self,
    carpool_id: CarpoolId,
    statuses: &'a [RideRequestStatus],
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + 'a;

  /// The ride request `identity` made to this carpool, if any.
  fn get_current_user_ride_request(
    &self,
    carpool_id: CarpoolId,
    identity: Identity,
  ) -> impl Future<Output = Result<Option<RideRequest>, Self::Error>> + Send + '_;

  /// People with an approved ride request.
  fn riders(
    &self,
    carpool_id: CarpoolId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_ {
    self.get_riders(carpool_id, RideRequestStatus::RIDING)
  }

  /// People with an approved or still pending ride request.
  fn riders_and_potential_riders(
    &self,
    carpool_id: CarpoolId,
  ) -> impl Future<Output = Result<Vec<Person>, Self::Error>> + Send + '_ {
    self.get_riders(carpool_id, RideRequestStatus::RIDING_OR_PENDING)
  }
}
