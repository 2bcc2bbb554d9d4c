//! User lookup

use super::{load_user, require_user};
use crate::{error::UserRole, transaction::WorldState, types::User, Result};

/// Return the user stored under `id`
pub fn read_user<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<User> {
    require_user(state, id, UserRole::User)
}

/// Check if a user is stored under `id`
pub fn user_exists<S: WorldState + ?Sized>(state: &S, id: &str) -> Result<bool> {
    Ok(load_user(state, id)?.is_some())
}
