//! # Authorization
//!
//! Roles and the operation capability table.
//!
//! ## How Gating Works
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Capability Check                                     │
//! │                                                                         │
//! │  Operation entry point (record_import, checkout, ...)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  authorize(actor, Operation::RecordImport)                             │
//! │       │                                                                 │
//! │       ├── actor is None? ──────────► CoreError::Unauthenticated         │
//! │       │                                                                 │
//! │       ├── role not in table? ─────► CoreError::Unauthorized             │
//! │       │                                                                 │
//! │       └── OK ─────────────────────► operation proceeds                  │
//! │                                                                         │
//! │  The table below is the single source of truth; no operation does      │
//! │  its own ad-hoc role comparison.                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{Actor, UserRole};

// =============================================================================
// Operations
// =============================================================================

/// Everything the core can be asked to do, for capability gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operation {
    /// Record a warehouse import (stock-in).
    RecordImport,
    /// Create, edit or delete regulations.
    EditRegulations,
    /// Check out a cart into a receipt.
    Checkout,
    /// Read the monthly sales reports.
    ViewReports,
    /// Add to / mutate a session cart.
    MutateCart,
}

/// Every signed-in role.
const ALL_ROLES: &[UserRole] = &[
    UserRole::Admin,
    UserRole::User,
    UserRole::WarehouseManager,
    UserRole::Staff,
];

impl Operation {
    /// The capability table: which roles may perform this operation.
    pub const fn allowed_roles(self) -> &'static [UserRole] {
        match self {
            Operation::RecordImport => &[UserRole::Admin, UserRole::WarehouseManager],
            Operation::EditRegulations => &[UserRole::Admin],
            Operation::ViewReports => &[UserRole::Admin, UserRole::Staff],
            Operation::Checkout | Operation::MutateCart => ALL_ROLES,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Operation::RecordImport => "record imports",
            Operation::EditRegulations => "edit regulations",
            Operation::Checkout => "check out",
            Operation::ViewReports => "view reports",
            Operation::MutateCart => "modify the cart",
        };
        f.write_str(label)
    }
}

// =============================================================================
// Authorization Check
// =============================================================================

/// Checks an (optional) actor against the capability table.
///
/// Called once at the entry point of every operation. Returns the actor
/// back on success so callers can use its id for attribution.
///
/// ## Example
/// ```rust
/// use bookstore_core::auth::{authorize, Operation};
/// use bookstore_core::types::{Actor, UserRole};
///
/// let admin = Actor::new(1, UserRole::Admin);
/// assert!(authorize(Some(&admin), Operation::EditRegulations).is_ok());
///
/// let customer = Actor::new(2, UserRole::User);
/// assert!(authorize(Some(&customer), Operation::EditRegulations).is_err());
/// assert!(authorize(None, Operation::MutateCart).is_err());
/// ```
pub fn authorize(actor: Option<&Actor>, operation: Operation) -> CoreResult<&Actor> {
    let actor = actor.ok_or(CoreError::Unauthenticated)?;

    if !operation.allowed_roles().contains(&actor.role) {
        return Err(CoreError::Unauthorized {
            role: actor.role,
            operation,
        });
    }

    Ok(actor)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_actor_is_unauthenticated() {
        let err = authorize(None, Operation::Checkout).unwrap_err();
        assert!(matches!(err, CoreError::Unauthenticated));
    }

    #[test]
    fn test_regulations_are_admin_only() {
        for role in [UserRole::User, UserRole::WarehouseManager, UserRole::Staff] {
            let actor = Actor::new(7, role);
            let err = authorize(Some(&actor), Operation::EditRegulations).unwrap_err();
            assert!(matches!(err, CoreError::Unauthorized { .. }));
        }

        let admin = Actor::new(1, UserRole::Admin);
        assert!(authorize(Some(&admin), Operation::EditRegulations).is_ok());
    }

    #[test]
    fn test_warehouse_manager_can_import() {
        let manager = Actor::new(3, UserRole::WarehouseManager);
        assert!(authorize(Some(&manager), Operation::RecordImport).is_ok());

        let customer = Actor::new(4, UserRole::User);
        assert!(authorize(Some(&customer), Operation::RecordImport).is_err());
    }

    #[test]
    fn test_every_role_can_checkout() {
        for role in [
            UserRole::Admin,
            UserRole::User,
            UserRole::WarehouseManager,
            UserRole::Staff,
        ] {
            let actor = Actor::new(5, role);
            assert!(authorize(Some(&actor), Operation::Checkout).is_ok());
        }
    }
}
