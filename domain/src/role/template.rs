//! Standard role boards
//!
//! Fixed boards exist for the common table sizes. Other sizes either use the
//! basic board (small tables) or ask the AI gateway for a balanced list and
//! fall back to trimming the table to the largest standard board.

use super::Role;
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::BTreeMap;

/// Tables smaller than this use [`TemplateCatalog::basic_pool`]
pub const BASIC_BOARD_LIMIT: usize = 6;

/// A named, balanced role list for a fixed player count
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameTemplate {
    pub name: &'static str,
    pub roles: Vec<Role>,
}

impl GameTemplate {
    fn new(name: &'static str, groups: &[(Role, usize)]) -> Self {
        let roles = groups
            .iter()
            .flat_map(|(role, count)| std::iter::repeat_n(*role, *count))
            .collect();
        Self { name, roles }
    }

    pub fn player_count(&self) -> usize {
        self.roles.len()
    }
}

/// Player count → available boards
#[derive(Debug, Clone)]
pub struct TemplateCatalog {
    templates: BTreeMap<usize, Vec<GameTemplate>>,
}

impl Default for TemplateCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TemplateCatalog {
    /// The built-in boards
    pub fn standard() -> Self {
        let boards = vec![
            GameTemplate::new(
                "Beginner",
                &[(Role::Werewolf, 2), (Role::Seer, 1), (Role::Witch, 1), (Role::Villager, 2)],
            ),
            GameTemplate::new(
                "Hunter's Night",
                &[(Role::Werewolf, 2), (Role::Seer, 1), (Role::Hunter, 1), (Role::Villager, 2)],
            ),
            GameTemplate::new(
                "Classic",
                &[
                    (Role::Werewolf, 3),
                    (Role::Seer, 1),
                    (Role::Witch, 1),
                    (Role::Hunter, 1),
                    (Role::Villager, 3),
                ],
            ),
            GameTemplate::new(
                "Watchful Village",
                &[
                    (Role::Werewolf, 3),
                    (Role::Seer, 1),
                    (Role::Witch, 1),
                    (Role::Guard, 1),
                    (Role::Villager, 3),
                ],
            ),
            GameTemplate::new(
                "Classic Plus",
                &[
                    (Role::Werewolf, 3),
                    (Role::Seer, 1),
                    (Role::Witch, 1),
                    (Role::Hunter, 1),
                    (Role::Villager, 3),
                    (Role::Rogue, 1),
                ],
            ),
            GameTemplate::new(
                "Seer Witch Hunter Guard",
                &[
                    (Role::Werewolf, 4),
                    (Role::Seer, 1),
                    (Role::Witch, 1),
                    (Role::Hunter, 1),
                    (Role::Guard, 1),
                    (Role::Villager, 4),
                ],
            ),
            GameTemplate::new(
                "Wolf King",
                &[
                    (Role::Werewolf, 3),
                    (Role::WolfKing, 1),
                    (Role::Seer, 1),
                    (Role::Witch, 1),
                    (Role::Hunter, 1),
                    (Role::Idiot, 1),
                    (Role::Villager, 4),
                ],
            ),
            GameTemplate::new(
                "Hidden Wolf",
                &[
                    (Role::Werewolf, 3),
                    (Role::HiddenWolf, 1),
                    (Role::Seer, 1),
                    (Role::Witch, 1),
                    (Role::Hunter, 1),
                    (Role::Guard, 1),
                    (Role::Villager, 4),
                ],
            ),
        ];

        let mut templates: BTreeMap<usize, Vec<GameTemplate>> = BTreeMap::new();
        for board in boards {
            templates.entry(board.player_count()).or_default().push(board);
        }
        Self { templates }
    }

    pub fn templates_for(&self, player_count: usize) -> &[GameTemplate] {
        self.templates
            .get(&player_count)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Pick one of the boards for exactly `player_count` players
    pub fn choose<R: Rng + ?Sized>(&self, player_count: usize, rng: &mut R) -> Option<&GameTemplate> {
        self.templates_for(player_count).choose(rng)
    }

    /// Player counts with a standard board, ascending
    pub fn supported_counts(&self) -> Vec<usize> {
        self.templates.keys().copied().collect()
    }

    /// Largest standard board that fits `player_count`, or the smallest
    /// board if none fits
    pub fn largest_fitting(&self, player_count: usize) -> Option<usize> {
        self.templates
            .keys()
            .rev()
            .copied()
            .find(|count| *count <= player_count)
            .or_else(|| self.templates.keys().next().copied())
    }

    /// Basic board for small tables: one wolf, one seer, the rest villagers
    pub fn basic_pool(player_count: usize) -> Vec<Role> {
        let mut pool = vec![Role::Werewolf];
        if player_count > 1 {
            pool.push(Role::Seer);
        }
        pool.extend(std::iter::repeat_n(
            Role::Villager,
            player_count.saturating_sub(pool.len()),
        ));
        pool
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::FactionCounts;

    #[test]
    fn test_every_board_has_a_wolf_and_matches_its_count() {
        let catalog = TemplateCatalog::standard();
        for count in catalog.supported_counts() {
            for board in catalog.templates_for(count) {
                assert_eq!(board.roles.len(), count, "{}", board.name);
                assert!(FactionCounts::from_roles(&board.roles).wolves >= 1);
            }
        }
    }

    #[test]
    fn test_basic_pool() {
        for count in 3..BASIC_BOARD_LIMIT {
            let pool = TemplateCatalog::basic_pool(count);
            assert_eq!(pool.len(), count);
            let counts = FactionCounts::from_roles(&pool);
            assert_eq!(counts.wolves, 1);
            assert_eq!(counts.gods, 1);
        }
    }

    #[test]
    fn test_largest_fitting() {
        let catalog = TemplateCatalog::standard();
        assert_eq!(catalog.largest_fitting(11), Some(10));
        assert_eq!(catalog.largest_fitting(20), Some(12));
        assert_eq!(catalog.largest_fitting(7), Some(6));
    }

    #[test]
    fn test_choose_only_returns_exact_counts() {
        let catalog = TemplateCatalog::standard();
        let mut rng = rand::rng();
        assert!(catalog.choose(7, &mut rng).is_none());
        let board = catalog.choose(9, &mut rng).unwrap();
        assert_eq!(board.player_count(), 9);
    }
}
