use crate::{CatalogError, PackKey};
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SimulationError {
    #[error("Select at least one pack quantity.")]
    NoSelection,
    #[error("Quantity for {pack} must be a positive integer.")]
    ZeroQuantity { pack: PackKey },
    #[error("Quantity for {pack} is {quantity}; at most {max} packs can be opened at once.")]
    QuantityTooLarge { pack: PackKey, quantity: u32, max: u32 },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

impl SimulationError {
    /// Validation failures are the caller's to fix; catalog failures are not.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::NoSelection | Self::ZeroQuantity { .. } | Self::QuantityTooLarge { .. }
        )
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum SelectionError {
    #[error("Textarea is empty. Paste exported selection JSON first.")]
    Empty,
    #[error("Invalid JSON in selection: {0}")]
    InvalidJson(String),
    #[error("unsupported selection version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },
}

impl From<serde_json::Error> for SelectionError {
    fn from(value: serde_json::Error) -> Self {
        Self::InvalidJson(value.to_string())
    }
}
