//! Player inventory and the stacking rule applied on pickup.

use crate::items::ItemKind;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const INVENTORY_SLOTS: usize = 8;
pub const MAX_STACK: u8 = 99;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySlot {
    pub kind: ItemKind,
    pub count: u8,
}

impl InventorySlot {
    pub fn new(kind: ItemKind) -> Self {
        Self { kind, count: 1 }
    }

    fn can_absorb(&self, kind: ItemKind) -> bool {
        self.kind == kind && self.count < MAX_STACK
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory has {0} slots, at most 8 allowed")]
    TooManySlots(usize),
    #[error("slot {slot} holds {count} items, expected 1..=99")]
    CountOutOfRange { slot: usize, count: u8 },
}

/// Eight ordered slots, each empty or holding one stack.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inventory {
    slots: [Option<InventorySlot>; INVENTORY_SLOTS],
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds one item of `kind`.
    ///
    /// The first stack of the same kind below [`MAX_STACK`] absorbs it;
    /// failing that the first empty slot starts a new stack. Returns the
    /// slot index used, or `None` if nothing could take the item, in which
    /// case the inventory is untouched.
    pub fn try_add(&mut self, kind: ItemKind) -> Option<usize> {
        if let Some(index) = self
            .slots
            .iter()
            .position(|slot| slot.is_some_and(|s| s.can_absorb(kind)))
        {
            if let Some(slot) = self.slots[index].as_mut() {
                slot.count += 1;
            }
            return Some(index);
        }

        let index = self.slots.iter().position(Option::is_none)?;
        self.slots[index] = Some(InventorySlot::new(kind));
        Some(index)
    }

    pub fn slots(&self) -> &[Option<InventorySlot>; INVENTORY_SLOTS] {
        &self.slots
    }

    pub fn get(&self, index: usize) -> Option<&InventorySlot> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    /// Number of occupied slots.
    pub fn occupied(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    /// Total items of `kind` across every stack.
    pub fn count_of(&self, kind: ItemKind) -> u32 {
        self.slots
            .iter()
            .flatten()
            .filter(|slot| slot.kind == kind)
            .map(|slot| u32::from(slot.count))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }
}

impl TryFrom<Vec<Option<InventorySlot>>> for Inventory {
    type Error = InventoryError;

    /// Validates a client-supplied slot list; shorter lists are padded
    /// with empty slots.
    fn try_from(value: Vec<Option<InventorySlot>>) -> Result<Self, Self::Error> {
        if value.len() > INVENTORY_SLOTS {
            return Err(InventoryError::TooManySlots(value.len()));
        }

        let mut inventory = Inventory::new();
        for (index, slot) in value.into_iter().enumerate() {
            if let Some(slot) = slot {
                if slot.count == 0 || slot.count > MAX_STACK {
                    return Err(InventoryError::CountOutOfRange {
                        slot: index,
                        count: slot.count,
                    });
                }
            }
            inventory.slots[index] = slot;
        }
        Ok(inventory)
    }
}
