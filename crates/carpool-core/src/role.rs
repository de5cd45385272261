//! Role — a named permission tag attachable to a person.

use serde::{Deserialize, Serialize};

use crate::id::RoleId;

/// A permission tag. Role names are unique across the store; a person's
/// membership in a role is decided by exact name comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
  pub role_id: RoleId,
  pub name:    String,
}
