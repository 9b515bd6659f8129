use serde::{Deserialize, Serialize};

/// The fixed set of collectible item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ItemKind {
    Weapon,
    Sword,
    Food,
    Medkit,
    Bandage,
    Tool,
    Axe,
    Pickaxe,
}

impl ItemKind {
    pub const ALL: [ItemKind; 8] = [
        ItemKind::Weapon,
        ItemKind::Sword,
        ItemKind::Food,
        ItemKind::Medkit,
        ItemKind::Bandage,
        ItemKind::Tool,
        ItemKind::Axe,
        ItemKind::Pickaxe,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            ItemKind::Weapon => "Weapon",
            ItemKind::Sword => "Sword",
            ItemKind::Food => "Food",
            ItemKind::Medkit => "Medkit",
            ItemKind::Bandage => "Bandage",
            ItemKind::Tool => "Tool",
            ItemKind::Axe => "Axe",
            ItemKind::Pickaxe => "Pickaxe",
        }
    }

    /// Glyph shown in inventory slots.
    pub fn glyph(self) -> &'static str {
        match self {
            ItemKind::Weapon => "🔫",
            ItemKind::Sword => "⚔️",
            ItemKind::Food => "🍎",
            ItemKind::Medkit => "💊",
            ItemKind::Bandage => "🩹",
            ItemKind::Tool => "🔧",
            ItemKind::Axe => "🪓",
            ItemKind::Pickaxe => "⛏️",
        }
    }

    /// RGB colour of the world marker.
    pub fn color(self) -> u32 {
        match self {
            ItemKind::Weapon => 0xff4444,
            ItemKind::Sword => 0xcccccc,
            ItemKind::Food => 0xff0000,
            ItemKind::Medkit => 0x00ff00,
            ItemKind::Bandage => 0xffcccc,
            ItemKind::Tool => 0x0088ff,
            ItemKind::Axe => 0x8b4513,
            ItemKind::Pickaxe => 0x666666,
        }
    }
}
