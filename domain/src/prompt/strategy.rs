//! Play guidance for autonomous players

use crate::role::Role;

/// How an autonomous player with a given role should behave
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleStrategy {
    pub objective: &'static str,
    pub speech_style: &'static str,
    pub action_guide: &'static str,
    pub speech_guide: &'static str,
}

impl RoleStrategy {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Werewolf | Role::WhiteWolfKing | Role::NightmareKnight => Self {
                objective: "eliminate the special roles or the villagers without being found out",
                speech_style: "calm and cooperative, occasionally casting doubt on others",
                action_guide: "Kill whoever looks most like the Seer or Witch. Avoid fellow wolves.",
                speech_guide: "Pose as a villager. Never reveal a teammate. Push suspicion onto quiet or inconsistent players.",
            },
            Role::WolfKing => Self {
                objective: "lead the pack to victory and take a strong player down with you if you fall",
                speech_style: "confident, sometimes provocative",
                action_guide: "Kill influential players. If you must shoot, pick the most convincing good player.",
                speech_guide: "Claim to be a good role if pressured. Sow division among the villagers.",
            },
            Role::HiddenWolf => Self {
                objective: "survive until the wolves win while looking perfectly innocent",
                speech_style: "honest-sounding and measured",
                action_guide: "You have no night action.",
                speech_guide: "The Seer sees you as good. Use that trust and defend your teammates subtly.",
            },
            Role::Seer => Self {
                objective: "find the wolves and guide the village",
                speech_style: "analytical and assertive",
                action_guide: "Check players who are acting suspiciously or whom nobody has verified.",
                speech_guide: "Share checked results when it helps the village. Expect the wolves to target you.",
            },
            Role::Witch => Self {
                objective: "use your potions at the decisive moment",
                speech_style: "careful and observant",
                action_guide: "Save a likely good player. Poison only a player you are confident is a wolf.",
                speech_guide: "Keep your potion status hidden unless revealing it wins a vote.",
            },
            Role::Hunter => Self {
                objective: "help the village and make your death costly for the wolves",
                speech_style: "direct and bold",
                action_guide: "When you shoot, pick the player you are most sure is a wolf.",
                speech_guide: "You can afford to be aggressive; the wolves fear your shot.",
            },
            Role::Guard => Self {
                objective: "keep the key good roles alive",
                speech_style: "quiet and steady",
                action_guide: "Protect the player the wolves most likely want dead. You cannot guard the same player twice in a row.",
                speech_guide: "Stay low-profile so the wolves do not remove you first.",
            },
            Role::Idiot | Role::Knight => Self {
                objective: "help the village find the wolves",
                speech_style: "straightforward",
                action_guide: "Vote for the player with the weakest story.",
                speech_guide: "Press inconsistent players with pointed questions.",
            },
            Role::Villager | Role::Rogue => Self {
                objective: "find and vote out the wolves",
                speech_style: "natural, like a regular player",
                action_guide: "Vote for the player you find most suspicious.",
                speech_guide: "Reason from the votes and the speeches. Trust confirmed good players.",
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_role_has_guidance() {
        for role in Role::ALL {
            let strategy = RoleStrategy::for_role(role);
            assert!(!strategy.objective.is_empty(), "{role} has no objective");
            assert!(!strategy.speech_guide.is_empty(), "{role} has no speech guide");
        }
    }

    #[test]
    fn test_wolves_are_told_to_hide() {
        let strategy = RoleStrategy::for_role(Role::Werewolf);
        assert!(strategy.speech_guide.contains("Never reveal"));
    }
}
