//! Prompt templates for the AI gateway

use super::strategy::RoleStrategy;
use crate::decision::ABSTAIN_TOKEN;
use crate::participant::PlayerId;
use crate::role::Role;

/// Templates for every kind of AI request
pub struct PromptTemplate;

impl PromptTemplate {
    /// Ask for a balanced role list as a bare JSON array
    pub fn role_template(player_count: usize, allowed: &[Role]) -> String {
        let names = Role::sorted_names(allowed);
        format!(
            r#"Design a balanced Werewolf setup for {count} players.
Use only these roles: {roles}.
Include at least one wolf, at least one special role and at least one villager.
Reply with a JSON array of exactly {count} role names, for example ["Werewolf", "Seer", "Villager"].
Do not include markdown or any other text."#,
            count = player_count,
            roles = names.join(", "),
        )
    }

    /// Ask the moderator voice for a short piece of narration
    pub fn narrative(event_type: &str, context: &str, language: &str) -> String {
        format!(
            r#"You are the moderator of a Werewolf game.
Write one atmospheric line of narration (30 to 50 words) for the situation below.
Output the narration only, without a speaker prefix.
Write in the language with code "{language}".

Event: {event_type}
Details: {context}"#
        )
    }

    /// Ask an autonomous player for a target seat or an abstain
    pub fn action(role: Role, situation: &str, valid_targets: &[PlayerId]) -> String {
        let strategy = RoleStrategy::for_role(role);
        format!(
            r#"You are playing Werewolf. Your role is {role}.
Current situation: {situation}
Players you may choose (seat numbers): {targets}.

Guidance: {guide}

Choose the best option for your side's victory.
Reply with the chosen seat number only.
If you decide not to act or to abstain, reply '{abstain}'.
Do not explain."#,
            role = role,
            situation = situation,
            targets = Self::seat_list(valid_targets),
            guide = strategy.action_guide,
            abstain = ABSTAIN_TOKEN,
        )
    }

    /// Ask an autonomous player for a short speech during the day
    pub fn speech(seat: PlayerId, role: Role, situation: &str, history: &[String]) -> String {
        let strategy = RoleStrategy::for_role(role);
        let history_text = if history.is_empty() {
            "Nobody has spoken yet; you are the first speaker today.".to_string()
        } else {
            format!("Speeches so far today:\n{}", history.join("\n"))
        };

        format!(
            r#"You are playing Werewolf as player {seat}.
Your real role is {role}.

Speak in this style: {style}.
Your main objective: {objective}.

Guidelines:
{guide}

Current situation: {situation}
{history_text}

It is your turn to speak. Keep it under 50 words: analyse the situation or defend yourself.
Sound like a human player and never mention that you are an AI."#,
            style = strategy.speech_style,
            objective = strategy.objective,
            guide = strategy.speech_guide,
        )
    }

    /// Ask an eliminated autonomous player for a final statement
    pub fn last_words(seat: PlayerId, role: Role, situation: &str) -> String {
        let strategy = RoleStrategy::for_role(role);
        format!(
            r#"You are playing Werewolf as player {seat} and you have just been eliminated.
Your real role is {role}. Your side's objective: {objective}.
Current situation: {situation}

Give your last words in under 40 words. You may share a suspicion or a final hint.
Sound like a human player and never mention that you are an AI."#,
            objective = strategy.objective,
        )
    }

    fn seat_list(ids: &[PlayerId]) -> String {
        ids.iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_template_lists_sorted_roles() {
        let prompt = PromptTemplate::role_template(7, &[Role::Witch, Role::Seer, Role::Werewolf]);
        assert!(prompt.contains("7 players"));
        assert!(prompt.contains("Seer, Werewolf, Witch"));
        assert!(prompt.contains("exactly 7 role names"));
    }

    #[test]
    fn test_action_prompt_lists_targets_and_abstain() {
        let prompt = PromptTemplate::action(
            Role::Guard,
            "Day 2.",
            &[PlayerId(1), PlayerId(4), PlayerId(6)],
        );
        assert!(prompt.contains("Your role is Guard"));
        assert!(prompt.contains("1, 4, 6"));
        assert!(prompt.contains("reply 'no'"));
    }

    #[test]
    fn test_first_speaker_is_told_nobody_spoke() {
        let prompt = PromptTemplate::speech(PlayerId(3), Role::Villager, "Day 1.", &[]);
        assert!(prompt.contains("Nobody has spoken yet"));

        let history = vec!["AI-1: I trust 2.".to_string()];
        let prompt = PromptTemplate::speech(PlayerId(3), Role::Villager, "Day 1.", &history);
        assert!(prompt.contains("AI-1: I trust 2."));
        assert!(!prompt.contains("Nobody has spoken yet"));
    }

    #[test]
    fn test_narrative_mentions_language() {
        let prompt = PromptTemplate::narrative("night_start", "Night 1 falls.", "en");
        assert!(prompt.contains("\"en\""));
        assert!(prompt.contains("Event: night_start"));
    }
}
