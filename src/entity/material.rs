//! Site-diary materials.

use super::id::{EntityId, Keyed};
use super::user::UserRef;
use crate::error::ValidationError;

/// A material entry recorded in a site diary.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Material {
    id: EntityId,
    site_diary_id: u64,
    name: String,
    amount: u32,
    unit: String,
    created_by: Option<UserRef>,
}

impl Material {
    /// Creates a validated material entry.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for a blank name or unit.
    pub fn new(
        id: EntityId,
        site_diary_id: u64,
        name: impl Into<String>,
        amount: u32,
        unit: impl Into<String>,
        created_by: Option<UserRef>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        let unit = unit.into();
        if unit.trim().is_empty() {
            return Err(ValidationError::Empty { field: "unit" });
        }
        Ok(Self {
            id,
            site_diary_id,
            name,
            amount,
            unit,
            created_by,
        })
    }

    /// The site diary this entry belongs to.
    #[must_use]
    pub const fn site_diary_id(&self) -> u64 {
        self.site_diary_id
    }

    /// The material's name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Quantity used.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Unit of measure for the amount.
    #[must_use]
    pub fn unit(&self) -> &str {
        &self.unit
    }

    /// Who recorded the entry, when known.
    #[must_use]
    pub const fn created_by(&self) -> Option<&UserRef> {
        self.created_by.as_ref()
    }

    /// Updates the quantity.
    pub const fn set_amount(&mut self, amount: u32) {
        self.amount = amount;
    }

    /// Renames the material.
    ///
    /// # Errors
    ///
    /// [`ValidationError::Empty`] for a blank name.
    pub fn rename(&mut self, name: impl Into<String>) -> Result<(), ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" });
        }
        self.name = name;
        Ok(())
    }
}

impl Keyed for Material {
    fn id(&self) -> &EntityId {
        &self.id
    }

    fn id_mut(&mut self) -> &mut EntityId {
        &mut self.id
    }
}
