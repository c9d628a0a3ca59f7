//! Roles and factions
//!
//! Every role belongs to exactly one [`Faction`]. Factions drive win-condition
//! evaluation; individual roles drive which night actions and on-death
//! abilities a participant has.
//!
//! | Faction | Roles |
//! |---------|-------|
//! | Wolf | Werewolf, WolfKing, WhiteWolfKing, NightmareKnight, HiddenWolf |
//! | God | Seer, Witch, Hunter, Guard, Idiot, Knight |
//! | Villager | Villager, Rogue |

pub mod template;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use template::{BASIC_BOARD_LIMIT, GameTemplate, TemplateCatalog};

/// Grouping used for win-condition evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Faction {
    /// Werewolves and their variants
    Wolf,
    /// Good roles with special powers
    God,
    /// Plain good roles
    Villager,
}

impl Faction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faction::Wolf => "wolf",
            Faction::God => "god",
            Faction::Villager => "villager",
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A role a participant plays for the whole game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Role {
    Werewolf,
    WolfKing,
    WhiteWolfKing,
    NightmareKnight,
    /// Disguised wolf: the Seer reads it as good and it skips the kill vote
    HiddenWolf,
    Seer,
    Witch,
    Hunter,
    Guard,
    Idiot,
    Knight,
    Villager,
    Rogue,
}

impl Role {
    /// Every role in catalogue order
    pub const ALL: [Role; 13] = [
        Role::Werewolf,
        Role::WolfKing,
        Role::WhiteWolfKing,
        Role::NightmareKnight,
        Role::HiddenWolf,
        Role::Seer,
        Role::Witch,
        Role::Hunter,
        Role::Guard,
        Role::Idiot,
        Role::Knight,
        Role::Villager,
        Role::Rogue,
    ];

    pub fn faction(&self) -> Faction {
        match self {
            Role::Werewolf
            | Role::WolfKing
            | Role::WhiteWolfKing
            | Role::NightmareKnight
            | Role::HiddenWolf => Faction::Wolf,
            Role::Seer | Role::Witch | Role::Hunter | Role::Guard | Role::Idiot | Role::Knight => {
                Faction::God
            }
            Role::Villager | Role::Rogue => Faction::Villager,
        }
    }

    pub fn is_wolf(&self) -> bool {
        self.faction() == Faction::Wolf
    }

    /// Whether this role takes part in the nightly wolf kill vote
    pub fn joins_wolf_kill(&self) -> bool {
        self.is_wolf() && *self != Role::HiddenWolf
    }

    /// What the Seer learns about this role (`true` = wolf)
    pub fn seer_reads_as_wolf(&self) -> bool {
        self.is_wolf() && *self != Role::HiddenWolf
    }

    /// Whether dying triggers a retaliatory shot
    pub fn shoots_on_death(&self) -> bool {
        matches!(self, Role::Hunter | Role::WolfKing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Werewolf => "Werewolf",
            Role::WolfKing => "WolfKing",
            Role::WhiteWolfKing => "WhiteWolfKing",
            Role::NightmareKnight => "NightmareKnight",
            Role::HiddenWolf => "HiddenWolf",
            Role::Seer => "Seer",
            Role::Witch => "Witch",
            Role::Hunter => "Hunter",
            Role::Guard => "Guard",
            Role::Idiot => "Idiot",
            Role::Knight => "Knight",
            Role::Villager => "Villager",
            Role::Rogue => "Rogue",
        }
    }

    /// Short rules text sent privately when roles are dealt
    pub fn description(&self) -> &'static str {
        match self {
            Role::Werewolf => "Each night, agree with the other wolves on one player to kill.",
            Role::WolfKing => {
                "A wolf who joins the nightly kill. When you die (except by poison) you may shoot one player."
            }
            Role::WhiteWolfKing => "A wolf who joins the nightly kill and leads the pack.",
            Role::NightmareKnight => "A wolf who joins the nightly kill and hides among the knights.",
            Role::HiddenWolf => {
                "A wolf the Seer reads as good. You do not take part in the nightly kill."
            }
            Role::Seer => "Each night, check one player and learn whether they are a wolf.",
            Role::Witch => {
                "You hold one antidote and one poison. Each may be used once per game."
            }
            Role::Hunter => "When you die (except by poison) you may shoot one player.",
            Role::Guard => {
                "Each night, protect one player from the wolves. You cannot protect the same player two nights in a row."
            }
            Role::Idiot => "A good role with no night action. Reason well during the day.",
            Role::Knight => "A good role with no night action. Use the daytime to expose wolves.",
            Role::Villager => "No special ability. Find the wolves through discussion and voting.",
            Role::Rogue => "A plain good role. You win with the village.",
        }
    }

    /// Catalogue names of the given roles, sorted (cache key normalization)
    pub fn sorted_names(roles: &[Role]) -> Vec<String> {
        let mut names: Vec<String> = roles.iter().map(|r| r.as_str().to_string()).collect();
        names.sort();
        names
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    /// Parse a role name, ignoring case, spaces, `-` and `_`
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();

        Role::ALL
            .iter()
            .copied()
            .find(|role| role.as_str().to_lowercase() == normalized)
            .ok_or_else(|| format!("unknown role: {}", s))
    }
}

/// Head-count of the living players per faction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FactionCounts {
    pub wolves: usize,
    pub gods: usize,
    pub villagers: usize,
}

impl FactionCounts {
    pub fn from_roles<'a>(roles: impl IntoIterator<Item = &'a Role>) -> Self {
        let mut counts = Self::default();
        for role in roles {
            match role.faction() {
                Faction::Wolf => counts.wolves += 1,
                Faction::God => counts.gods += 1,
                Faction::Villager => counts.villagers += 1,
            }
        }
        counts
    }
}
