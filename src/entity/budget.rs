//! Project budgets.

use super::id::{EntityId, Keyed};
use super::user::UserRef;
use crate::error::ValidationError;

/// A project budget line.
///
/// `difference` is derived — `expected_budget - costs_incurred` — and is
/// recomputed by every field-updating method, so a cached budget can never
/// carry a stale derivation. Fields are private for exactly that reason.
///
/// # Examples
///
/// ```rust
/// use mutars::entity::{Budget, EntityId};
///
/// let budget = Budget::new(
///     EntityId::Placeholder(1),
///     7,
///     "Foundation works",
///     1000,
///     400,
///     None,
/// )
/// .unwrap();
/// assert_eq!(budget.difference(), 600);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Budget {
    id: EntityId,
    project_id: u64,
    title: String,
    expected_budget: i64,
    costs_incurred: i64,
    difference: i64,
    created_by: Option<UserRef>,
}

impl Budget {
    /// Creates a validated budget with its derived difference.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for a blank title,
    /// [`ValidationError::Negative`] for negative amounts.
    pub fn new(
        id: EntityId,
        project_id: u64,
        title: impl Into<String>,
        expected_budget: i64,
        costs_incurred: i64,
        created_by: Option<UserRef>,
    ) -> Result<Self, ValidationError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::Empty { field: "title" });
        }
        if expected_budget < 0 {
            return Err(ValidationError::Negative {
                field: "expected_budget",
            });
        }
        if costs_incurred < 0 {
            return Err(ValidationError::Negative {
                field: "costs_incurred",
            });
        }
        Ok(Self {
            id,
            project_id,
            title,
            expected_budget,
            costs_incurred,
            difference: expected_budget - costs_incurred,
            created_by,
        })
    }

    /// The project this budget belongs to.
    #[must_use]
    pub const fn project_id(&self) -> u64 {
        self.project_id
    }

    /// The budget line's title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Amount budgeted.
    #[must_use]
    pub const fn expected_budget(&self) -> i64 {
        self.expected_budget
    }

    /// Amount spent so far.
    #[must_use]
    pub const fn costs_incurred(&self) -> i64 {
        self.costs_incurred
    }

    /// Derived: `expected_budget - costs_incurred`.
    #[must_use]
    pub const fn difference(&self) -> i64 {
        self.difference
    }

    /// Who created the budget, when known.
    #[must_use]
    pub const fn created_by(&self) -> Option<&UserRef> {
        self.created_by.as_ref()
    }

    /// Updates the budgeted amount and recomputes the difference.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Negative`] for negative amounts.
    pub fn set_expected_budget(&mut self, expected_budget: i64) -> Result<(), ValidationError> {
        if expected_budget < 0 {
            return Err(ValidationError::Negative {
                field: "expected_budget",
            });
        }
        self.expected_budget = expected_budget;
        self.difference = self.expected_budget - self.costs_incurred;
        Ok(())
    }

    /// Updates the spent amount and recomputes the difference.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Negative`] for negative amounts.
    pub fn set_costs_incurred(&mut self, costs_incurred: i64) -> Result<(), ValidationError> {
        if costs_incurred < 0 {
            return Err(ValidationError::Negative {
                field: "costs_incurred",
            });
        }
        self.costs_incurred = costs_incurred;
        self.difference = self.expected_budget - self.costs_incurred;
        Ok(())
    }
}

impl Keyed for Budget {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}
