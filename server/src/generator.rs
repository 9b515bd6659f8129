//! One-shot procedural world generation.

use crate::config::WorldConfig;
use crate::error::GenerationError;
use crate::npc::Npc;
use crate::world::{Item, Obstacle, World};
use log::info;
use rand::Rng;
use shared::{planar_distance, ItemId, ItemKind, NpcId, MAP_BOUNDARY, SPAWN_EXTENT};

pub const VEGETATION_RADIUS: f32 = 0.8;
pub const TERRAIN_RADIUS_RANGE: (f32, f32) = (0.5, 1.3);
/// Minimum distance between an item and any obstacle centre.
pub const ITEM_CLEARANCE: f32 = 3.0;

/// Hand-placed structures.
pub const STRUCTURES: [Obstacle; 10] = [
    Obstacle { x: 5.0, z: 10.0, radius: 4.0 },
    Obstacle { x: -30.0, z: -20.0, radius: 7.0 },
    Obstacle { x: 35.0, z: -15.0, radius: 7.0 },
    Obstacle { x: -40.0, z: 25.0, radius: 9.0 },
    Obstacle { x: 40.0, z: 30.0, radius: 7.0 },
    Obstacle { x: -25.0, z: -50.0, radius: 8.0 },
    Obstacle { x: 50.0, z: -45.0, radius: 10.0 },
    Obstacle { x: -50.0, z: 50.0, radius: 7.0 },
    Obstacle { x: 60.0, z: 20.0, radius: 8.0 },
    Obstacle { x: -60.0, z: -30.0, radius: 8.0 },
];

pub const NPC_SPAWNS: [(f32, f32); 8] = [
    (-20.0, 15.0),
    (30.0, -30.0),
    (-45.0, -10.0),
    (25.0, 40.0),
    (-35.0, 45.0),
    (50.0, 10.0),
    (-15.0, -40.0),
    (40.0, -20.0),
];

/// Builds a complete world: obstacles first, then items kept clear of
/// them, then NPCs at their spawn points.
pub fn generate<R: Rng + ?Sized>(
    config: &WorldConfig,
    rng: &mut R,
) -> Result<World, GenerationError> {
    let mut world = World::new(MAP_BOUNDARY);

    world.obstacles = place_obstacles(config, rng);
    world.items = place_items(config, &world.obstacles, rng)?;
    world.npcs = place_npcs(rng);

    info!(
        "Generated world: {} obstacles, {} items, {} npcs",
        world.obstacles.len(),
        world.items.len(),
        world.npcs.len()
    );

    Ok(world)
}

fn random_point<R: Rng + ?Sized>(rng: &mut R) -> (f32, f32) {
    (
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
        rng.gen_range(-SPAWN_EXTENT..SPAWN_EXTENT),
    )
}

pub fn place_obstacles<R: Rng + ?Sized>(config: &WorldConfig, rng: &mut R) -> Vec<Obstacle> {
    let mut obstacles =
        Vec::with_capacity(config.vegetation_count + config.terrain_count + STRUCTURES.len());

    for _ in 0..config.vegetation_count {
        let (x, z) = random_point(rng);
        obstacles.push(Obstacle {
            x,
            z,
            radius: VEGETATION_RADIUS,
        });
    }

    for _ in 0..config.terrain_count {
        let (x, z) = random_point(rng);
        obstacles.push(Obstacle {
            x,
            z,
            radius: rng.gen_range(TERRAIN_RADIUS_RANGE.0..TERRAIN_RADIUS_RANGE.1),
        });
    }

    obstacles.extend_from_slice(&STRUCTURES);
    obstacles
}

fn is_clear(x: f32, z: f32, obstacles: &[Obstacle]) -> bool {
    obstacles
        .iter()
        .all(|obstacle| planar_distance(x, z, obstacle.x, obstacle.z) >= ITEM_CLEARANCE)
}

/// Rejection-samples item positions, giving up once a single item has
/// burned through `config.placement_attempts` candidates.
pub fn place_items<R: Rng + ?Sized>(
    config: &WorldConfig,
    obstacles: &[Obstacle],
    rng: &mut R,
) -> Result<Vec<Item>, GenerationError> {
    let mut items = Vec::with_capacity(config.item_count);

    while items.len() < config.item_count {
        let mut placed = None;
        for _ in 0..config.placement_attempts {
            let (x, z) = random_point(rng);
            let kind = ItemKind::ALL[rng.gen_range(0..ItemKind::ALL.len())];
            if is_clear(x, z, obstacles) {
                placed = Some((x, z, kind));
                break;
            }
        }

        let Some((x, z, kind)) = placed else {
            return Err(GenerationError::ItemPlacement {
                placed: items.len(),
                target: config.item_count,
                attempts: config.placement_attempts,
            });
        };

        items.push(Item {
            id: ItemId(items.len() as u32),
            kind,
            x,
            z,
            collected: false,
        });
    }

    Ok(items)
}

pub fn place_npcs<R: Rng + ?Sized>(rng: &mut R) -> Vec<Npc> {
    NPC_SPAWNS
        .iter()
        .enumerate()
        .map(|(index, &(x, z))| Npc::spawn(NpcId(index as u32), x, z, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn test_default_world_counts() {
        let mut rng = StdRng::seed_from_u64(11);
        let world = generate(&WorldConfig::default(), &mut rng).unwrap();

        assert_eq!(world.obstacles.len(), 50 + 30 + STRUCTURES.len());
        assert_eq!(world.items.len(), 30);
        assert_eq!(world.npcs.len(), NPC_SPAWNS.len());
        assert_eq!(world.player_count(), 0);
        assert!(world.items.iter().all(|item| !item.collected));
    }

    #[test]
    fn test_items_keep_clearance_from_every_obstacle() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let world = generate(&WorldConfig::default(), &mut rng).unwrap();

            for item in &world.items {
                for obstacle in &world.obstacles {
                    let distance = planar_distance(item.x, item.z, obstacle.x, obstacle.z);
                    assert!(
                        distance >= ITEM_CLEARANCE,
                        "{} is {} from an obstacle",
                        item.id,
                        distance
                    );
                }
            }
        }
    }

    #[test]
    fn test_positions_and_radii_in_range() {
        let mut rng = StdRng::seed_from_u64(12);
        let world = generate(&WorldConfig::default(), &mut rng).unwrap();

        for item in &world.items {
            assert!(item.x >= -SPAWN_EXTENT && item.x < SPAWN_EXTENT);
            assert!(item.z >= -SPAWN_EXTENT && item.z < SPAWN_EXTENT);
        }
        for obstacle in &world.obstacles[..50] {
            assert_eq!(obstacle.radius, VEGETATION_RADIUS);
        }
        for obstacle in &world.obstacles[50..80] {
            assert!(obstacle.radius >= TERRAIN_RADIUS_RANGE.0);
            assert!(obstacle.radius < TERRAIN_RADIUS_RANGE.1);
        }
        assert_eq!(&world.obstacles[80..], &STRUCTURES[..]);
    }

    #[test]
    fn test_ids_are_unique() {
        let mut rng = StdRng::seed_from_u64(13);
        let world = generate(&WorldConfig::default(), &mut rng).unwrap();

        let item_ids: HashSet<_> = world.items.iter().map(|item| item.id).collect();
        let npc_ids: HashSet<_> = world.npcs.iter().map(|npc| npc.id).collect();
        assert_eq!(item_ids.len(), world.items.len());
        assert_eq!(npc_ids.len(), world.npcs.len());
    }

    #[test]
    fn test_npcs_start_at_spawn_points() {
        let mut rng = StdRng::seed_from_u64(14);
        let npcs = place_npcs(&mut rng);

        for (npc, &(x, z)) in npcs.iter().zip(NPC_SPAWNS.iter()) {
            assert_eq!((npc.x, npc.z), (x, z));
            assert_eq!((npc.target_x, npc.target_z), (x, z));
        }
    }

    #[test]
    fn test_same_seed_same_world() {
        let config = WorldConfig::default();
        let a = generate(&config, &mut StdRng::seed_from_u64(99)).unwrap();
        let b = generate(&config, &mut StdRng::seed_from_u64(99)).unwrap();

        assert_eq!(a.items, b.items);
        assert_eq!(a.obstacles, b.obstacles);
        assert_eq!(a.npcs, b.npcs);
    }

    #[test]
    fn test_unplaceable_items_fail_instead_of_hanging() {
        // A blanket of huge-clearance vegetation leaves no legal spot.
        let config = WorldConfig {
            vegetation_count: 0,
            terrain_count: 0,
            item_count: 3,
            placement_attempts: 50,
        };
        let blanket: Vec<Obstacle> = (-30..=30)
            .flat_map(|i| {
                (-30..=30).map(move |j| Obstacle {
                    x: i as f32 * 3.0,
                    z: j as f32 * 3.0,
                    radius: VEGETATION_RADIUS,
                })
            })
            .collect();

        let mut rng = StdRng::seed_from_u64(15);
        let result = place_items(&config, &blanket, &mut rng);

        assert_eq!(
            result,
            Err(GenerationError::ItemPlacement {
                placed: 0,
                target: 3,
                attempts: 50,
            })
        );
    }

    #[test]
    fn test_zero_attempts_fails_immediately() {
        let config = WorldConfig {
            placement_attempts: 0,
            ..WorldConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(16);
        assert!(matches!(
            generate(&config, &mut rng),
            Err(GenerationError::ItemPlacement { placed: 0, .. })
        ));
    }
}
