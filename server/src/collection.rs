//! Item pickup, run after every accepted player movement.

use crate::config::FullInventoryPolicy;
use crate::world::World;
use log::debug;
use shared::{planar_distance, Inventory, ItemId, PlayerId, ServerEvent, PICKUP_RADIUS};

/// A successful pickup, ready to be announced to every session.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    pub item_id: ItemId,
    pub player_id: PlayerId,
    /// The collector's inventory after the item was merged in.
    pub inventory: Inventory,
}

impl Collection {
    pub fn into_event(self) -> ServerEvent {
        ServerEvent::ItemCollected {
            item_id: self.item_id,
            player_id: self.player_id,
            inventory: self.inventory,
        }
    }
}

/// Collects every uncollected item within [`PICKUP_RADIUS`] of the player.
///
/// Each touched item is flagged collected before the inventory merge is
/// attempted. When the merge fails the item either stays consumed without
/// being granted or is released again, depending on `policy`; in neither
/// case is a collection reported. Unknown players collect nothing.
pub fn resolve(
    world: &mut World,
    player_id: PlayerId,
    policy: FullInventoryPolicy,
) -> Vec<Collection> {
    let Some(player) = world.players.get_mut(&player_id) else {
        return Vec::new();
    };
    let (px, pz) = (player.position.x, player.position.z);

    let mut collections = Vec::new();
    for item in world.items.iter_mut().filter(|item| !item.collected) {
        if planar_distance(px, pz, item.x, item.z) >= PICKUP_RADIUS {
            continue;
        }

        item.collected = true;

        if player.inventory.try_add(item.kind).is_some() {
            collections.push(Collection {
                item_id: item.id,
                player_id,
                inventory: player.inventory.clone(),
            });
            continue;
        }

        match policy {
            FullInventoryPolicy::Consume => {
                debug!("{} consumed {} with a full inventory", player_id, item.id);
            }
            FullInventoryPolicy::Keep => {
                item.collected = false;
                debug!("{} left {} behind, inventory full", player_id, item.id);
            }
        }
    }

    collections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::Item;
    use shared::{InventorySlot, ItemKind, Vec3, INVENTORY_SLOTS};

    fn world_with_items(items: &[(f32, f32, ItemKind)]) -> World {
        let mut world = World::default();
        world.items = items
            .iter()
            .enumerate()
            .map(|(index, &(x, z, kind))| Item {
                id: ItemId(index as u32),
                kind,
                x,
                z,
                collected: false,
            })
            .collect();
        world
    }

    fn place(world: &mut World, id: PlayerId, x: f32, z: f32) {
        if world.player(id).is_none() {
            world.add_player(id);
        }
        if let Some(player) = world.player_mut(id) {
            player.position = Vec3::new(x, 1.1, z);
        }
    }

    fn fill_inventory(world: &mut World, id: PlayerId, kind: ItemKind) {
        if let Some(player) = world.player_mut(id) {
            player.inventory = Inventory::try_from(vec![
                Some(InventorySlot { kind, count: 1 });
                INVENTORY_SLOTS
            ])
            .unwrap();
        }
    }

    #[test]
    fn test_collects_item_underfoot() {
        let mut world = world_with_items(&[(10.0, 10.0, ItemKind::Food)]);
        let id = PlayerId(1);
        place(&mut world, id, 10.0, 10.0);

        let collections = resolve(&mut world, id, FullInventoryPolicy::Consume);

        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].item_id, ItemId(0));
        assert_eq!(collections[0].player_id, id);
        assert_eq!(collections[0].inventory.count_of(ItemKind::Food), 1);
        assert!(world.items[0].collected);
        assert_eq!(world.remaining_items(), 0);
    }

    #[test]
    fn test_pickup_radius_is_strict_and_planar() {
        let mut world = world_with_items(&[
            (1.5, 0.0, ItemKind::Axe),
            (0.0, 1.49, ItemKind::Tool),
        ]);
        let id = PlayerId(1);
        world.add_player(id);
        if let Some(player) = world.player_mut(id) {
            player.position.y = 40.0;
        }

        let collections = resolve(&mut world, id, FullInventoryPolicy::Consume);

        assert_eq!(collections.len(), 1);
        assert_eq!(collections[0].item_id, ItemId(1));
        assert!(!world.items[0].collected);
    }

    #[test]
    fn test_collects_every_item_in_range_in_one_pass() {
        let mut world = world_with_items(&[
            (0.5, 0.0, ItemKind::Sword),
            (-0.5, 0.0, ItemKind::Sword),
            (0.0, 0.5, ItemKind::Medkit),
            (20.0, 0.0, ItemKind::Medkit),
        ]);
        let id = PlayerId(1);
        world.add_player(id);

        let collections = resolve(&mut world, id, FullInventoryPolicy::Consume);

        assert_eq!(collections.len(), 3);
        let last = &collections[2].inventory;
        assert_eq!(last.count_of(ItemKind::Sword), 2);
        assert_eq!(last.count_of(ItemKind::Medkit), 1);
        assert_eq!(last.occupied(), 2);
        assert!(!world.items[3].collected);
    }

    #[test]
    fn test_collected_item_is_never_collected_again() {
        let mut world = world_with_items(&[(3.0, 3.0, ItemKind::Bandage)]);
        let id = PlayerId(1);
        place(&mut world, id, 3.0, 3.0);

        assert_eq!(resolve(&mut world, id, FullInventoryPolicy::Consume).len(), 1);
        assert!(resolve(&mut world, id, FullInventoryPolicy::Consume).is_empty());
        assert_eq!(
            world.player(id).map(|p| p.inventory.count_of(ItemKind::Bandage)),
            Some(1)
        );
    }

    #[test]
    fn test_second_collector_finds_item_gone() {
        let mut world = world_with_items(&[(7.0, -7.0, ItemKind::Weapon)]);
        let first = PlayerId(1);
        let second = PlayerId(2);
        place(&mut world, first, 7.0, -7.0);
        place(&mut world, second, 7.2, -7.1);

        let won = resolve(&mut world, first, FullInventoryPolicy::Consume);
        let lost = resolve(&mut world, second, FullInventoryPolicy::Consume);

        assert_eq!(won.len(), 1);
        assert!(lost.is_empty());
        assert!(world
            .player(second)
            .map(|p| p.inventory.is_empty())
            .unwrap_or(false));
    }

    #[test]
    fn test_full_inventory_consumes_item_by_default() {
        let mut world = world_with_items(&[(0.0, 0.0, ItemKind::Pickaxe)]);
        let id = PlayerId(1);
        world.add_player(id);
        fill_inventory(&mut world, id, ItemKind::Food);
        let before = world.player(id).map(|p| p.inventory.clone());

        let collections = resolve(&mut world, id, FullInventoryPolicy::Consume);

        assert!(collections.is_empty());
        assert!(world.items[0].collected);
        assert_eq!(world.player(id).map(|p| p.inventory.clone()), before);
    }

    #[test]
    fn test_full_inventory_keeps_item_when_configured() {
        let mut world = world_with_items(&[(0.0, 0.0, ItemKind::Pickaxe)]);
        let full = PlayerId(1);
        world.add_player(full);
        fill_inventory(&mut world, full, ItemKind::Food);

        assert!(resolve(&mut world, full, FullInventoryPolicy::Keep).is_empty());
        assert!(!world.items[0].collected);

        let other = PlayerId(2);
        world.add_player(other);
        assert_eq!(resolve(&mut world, other, FullInventoryPolicy::Keep).len(), 1);
    }

    #[test]
    fn test_unknown_player_collects_nothing() {
        let mut world = world_with_items(&[(0.0, 0.0, ItemKind::Food)]);
        assert!(resolve(&mut world, PlayerId(42), FullInventoryPolicy::Consume).is_empty());
        assert!(!world.items[0].collected);
    }
}
