use serde::{Serialize, Deserialize};
use log::info;

use crate::database::Inventory;
use super::types::{BarcodeFormat, Classification};

/// What the inventory layer should do with a confirmed code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reaction {
    /// Do nothing
    Ignore,

    /// Log the classification only
    Log,

    /// Offer to create a product, or edit it if one already exists
    PromptCreate,

    /// Offer to edit the existing product, if any
    PromptEdit,
}

/// Request handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum InventoryAction {
    CreateProduct {
        barcode: String,
        format: BarcodeFormat,
    },
    EditProduct {
        id: u64,
    },
}

/// Independent reactions for first-time and repeated confirmations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReactionPolicy {
    /// Applied to `FoundInReference` and `NotInReference`
    pub on_new: Reaction,

    /// Applied to `AlreadyScanned`
    pub on_duplicate: Reaction,
}

impl Default for ReactionPolicy {
    fn default() -> Self {
        Self {
            on_new: Reaction::PromptCreate,
            on_duplicate: Reaction::PromptEdit,
        }
    }
}

impl ReactionPolicy {
    /// A policy that never asks the inventory layer for anything
    pub fn log_only() -> Self {
        Self {
            on_new: Reaction::Log,
            on_duplicate: Reaction::Log,
        }
    }

    /// Decide the inventory action for a classification.
    ///
    /// `format` is the symbology of the frame that confirmed the code.
    pub fn react(
        &self,
        classification: &Classification,
        format: BarcodeFormat,
        inventory: &Inventory,
    ) -> Option<InventoryAction> {
        let code = classification.code()?;
        let reaction = if classification.is_duplicate() {
            self.on_duplicate
        } else {
            self.on_new
        };

        let existing = inventory.find_by_barcode(code);
        match reaction {
            Reaction::Ignore => None,
            Reaction::Log => {
                info!("Scanned {}", classification);
                None
            }
            Reaction::PromptCreate => Some(match existing {
                Some(product) => InventoryAction::EditProduct { id: product.id },
                None => InventoryAction::CreateProduct {
                    barcode: code.to_string(),
                    format,
                },
            }),
            Reaction::PromptEdit => existing.map(|product| InventoryAction::EditProduct { id: product.id }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::ProductDraft;

    #[test]
    fn test_default_policy_creates_new_codes() {
        let policy = ReactionPolicy::default();
        let inventory = Inventory::new();

        let action = policy.react(&Classification::NotInReference("42".into()), BarcodeFormat::Ean8, &inventory);
        assert_eq!(action, Some(InventoryAction::CreateProduct {
            barcode: "42".into(),
            format: BarcodeFormat::Ean8,
        }));
    }

    #[test]
    fn test_default_policy_edits_duplicates_with_record() {
        let policy = ReactionPolicy::default();
        let mut inventory = Inventory::new();
        let duplicate = Classification::AlreadyScanned("42".into());

        assert_eq!(policy.react(&duplicate, BarcodeFormat::Ean8, &inventory), None);

        let id = inventory.add("42", BarcodeFormat::Ean8, ProductDraft::new("Soap", 2.0, 1)).unwrap().id;
        assert_eq!(policy.react(&duplicate, BarcodeFormat::Ean8, &inventory), Some(InventoryAction::EditProduct { id }));
    }

    #[test]
    fn test_pending_and_log_only_produce_nothing() {
        let inventory = Inventory::new();
        assert_eq!(ReactionPolicy::default().react(&Classification::Pending, BarcodeFormat::Ean8, &inventory), None);

        let policy = ReactionPolicy::log_only();
        assert_eq!(policy.react(&Classification::FoundInReference("1".into()), BarcodeFormat::Ean8, &inventory), None);
    }

    #[test]
    fn test_policy_deserializes_partial_config() {
        let policy: ReactionPolicy = toml::from_str(r#"on_duplicate = "ignore""#).unwrap();
        assert_eq!(policy.on_new, Reaction::PromptCreate);
        assert_eq!(policy.on_duplicate, Reaction::Ignore);
    }
}
