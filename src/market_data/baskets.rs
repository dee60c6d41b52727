// ---------------------------------------------------------------------------
// Sector baskets and item-sink membership
// ---------------------------------------------------------------------------

use serde::Serialize;

use crate::types::ItemId;

/// Named item baskets backing the sector indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Basket {
    Rune,
    Logs,
    Food,
    Metals,
    Herbs,
    Bossing,
    Common,
    HighVol,
}

impl Basket {
    pub const ALL: [Basket; 8] = [
        Basket::Rune,
        Basket::Logs,
        Basket::Food,
        Basket::Metals,
        Basket::Herbs,
        Basket::Bossing,
        Basket::Common,
        Basket::HighVol,
    ];

    /// Member item ids.
    pub fn members(&self) -> &'static [ItemId] {
        match self {
            // Law, Death, Chaos, Blood, Soul, Nature, Fire, Water, Air, Earth
            Self::Rune => &[563, 560, 562, 565, 566, 561, 554, 555, 556, 557],
            // Oak, Yew, Maple, Magic, Redwood, Willow, Logs
            Self::Logs => &[1521, 1515, 1517, 1513, 19669, 1519, 1511],
            // Lobster, Shark, Karambwan, Manta ray, Anglerfish, Monkfish, Swordfish
            Self::Food => &[379, 383, 3144, 385, 391, 7946, 373],
            // Coal, Runite, Mithril, Adamantite, Gold, Iron, Silver
            Self::Metals => &[453, 451, 447, 449, 444, 440, 442],
            // Ranarr, Lantadyme, Toadflax, Irit, Avantoe, Kwuarm, Cadantine, Dwarf weed
            Self::Herbs => &[207, 2481, 209, 211, 213, 215, 217, 219],
            // Twisted bow, Scythe, Shadow, Sanguinesti, Elysian, DWH, Elder maul
            Self::Bossing => &[20997, 22486, 27275, 22323, 12817, 13652, 21003],
            Self::Common => &[561, 453, 1515, 383, 207, 231, 2353, 1777],
            Self::HighVol => &[561, 554, 555, 556, 453, 2, 229, 314],
        }
    }
}

impl std::fmt::Display for Basket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rune => write!(f, "Rune"),
            Self::Logs => write!(f, "Logs"),
            Self::Food => write!(f, "Food"),
            Self::Metals => write!(f, "Metals"),
            Self::Herbs => write!(f, "Herbs"),
            Self::Bossing => write!(f, "Bossing"),
            Self::Common => write!(f, "Common"),
            Self::HighVol => write!(f, "HighVol"),
        }
    }
}

/// Items bought back and deleted by the Grand Exchange item sink.
const SINK_ITEMS: &[ItemId] = &[
    // Weapons
    20997, 22486, 21003, 21006, 21015, 20784, 13652, 22324, 22323, 25865, 27275,
    // Armour
    21018, 21021, 21024, 11832, 11834, 11836, 11826, 11828, 11830, 22326, 22327, 22328, 13239,
    13237, 13235,
    // Accessories
    19553, 19547, 19544, 19550, 12817, 12821, 12825,
    // Godswords
    11802, 11804, 11806, 11808,
];

/// Whether `id` is regulated by the item sink.
pub fn is_sink_item(id: ItemId) -> bool {
    SINK_ITEMS.contains(&id)
}
