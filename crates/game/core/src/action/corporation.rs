//! Corporation selection and the corporation's forced first action.

use tracing::debug;

use crate::card::{CardBehavior, CardType, ResourceTriggerType};
use crate::engine::auto_advance_turn_if_needed;
use crate::env::GameEnv;
use crate::resolver::{BehaviorTargets, ResolveContext, resolve_behavior};
use crate::state::{CardId, ForcedFirstAction, GamePhase, GameState, GameStatus, PlayerId};

use super::{
    ActionError, ActionTransition, Resolution, ensure_active, ensure_non_negative, fire_all,
    player_of, player_of_mut, register_card,
};

/// Takes a corporation card for a player who has none.
///
/// Starting resources and production are granted, `auto-corp-start` and
/// plain on-play behaviors resolve, lasting behaviors are registered and an
/// `auto-corp-first-action` behavior becomes the player's forced first action.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct SelectCorporationAction {
    pub player_id: PlayerId,
    pub corporation_id: CardId,
}

impl SelectCorporationAction {
    pub fn new(player_id: impl Into<PlayerId>, corporation_id: impl Into<CardId>) -> Self {
        Self {
            player_id: player_id.into(),
            corporation_id: corporation_id.into(),
        }
    }
}

fn resolves_on_selection(behavior: &CardBehavior) -> bool {
    behavior.has_trigger(ResourceTriggerType::AutoCorpStart) || behavior.applies_on_play()
}

impl ActionTransition for SelectCorporationAction {
    type Error = ActionError;
    type Result = Resolution;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        if state.status == GameStatus::Finished {
            return Err(ActionError::GameNotActive(state.status));
        }
        let player = player_of(state, &self.player_id)?;
        if player.corporation.is_some() {
            return Err(ActionError::CorporationAlreadySelected(self.player_id.clone()));
        }
        let card = env.card(&self.corporation_id)?;
        if card.card_type != CardType::Corporation {
            return Err(ActionError::NotACorporation(card.id.clone()));
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Resolution, Self::Error> {
        let card = env.card(&self.corporation_id)?;

        let player = player_of_mut(state, &self.player_id)?;
        player.corporation = Some(card.id.clone());
        if let Some(resources) = &card.starting_resources {
            player.resources.merge(resources);
        }
        if let Some(production) = &card.starting_production {
            player.production.merge(production);
        }
        register_card(player, card);
        if card
            .behaviors
            .iter()
            .any(|b| b.has_trigger(ResourceTriggerType::AutoCorpFirstAction))
        {
            player.forced_first_action = Some(ForcedFirstAction {
                action_type: ResourceTriggerType::AutoCorpFirstAction,
                corporation_id: card.id.clone(),
                source: card.name.clone(),
                completed: false,
            });
        }

        let targets = BehaviorTargets::default();
        let ctx = ResolveContext::for_card(&self.player_id, &card.id, &targets);
        let mut resolution = Resolution::default();
        let mut occurrences = Vec::new();
        for behavior in card.behaviors.iter().filter(|b| resolves_on_selection(b)) {
            let report = resolve_behavior(state, env, &ctx, &behavior.inputs, &behavior.outputs)?;
            resolution.calculated.extend(report.calculated);
            occurrences.extend(report.occurrences);
        }
        resolution.triggers_fired = fire_all(state, env, &occurrences)?;

        debug!(
            target: "core::action",
            player_id = %self.player_id,
            corporation_id = %card.id,
            "corporation selected"
        );
        Ok(resolution)
    }

    fn post_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_non_negative(state, &self.player_id)
    }
}

/// Resolves the corporation's forced first action.
///
/// Never consumes an action. The turn is re-checked for advance afterwards.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct CompleteForcedAction {
    pub player_id: PlayerId,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub choice_index: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: BehaviorTargets,
}

impl CompleteForcedAction {
    pub fn new(player_id: impl Into<PlayerId>) -> Self {
        Self {
            player_id: player_id.into(),
            choice_index: None,
            targets: BehaviorTargets::default(),
        }
    }

    fn corporation<'s>(&self, state: &'s GameState) -> Result<&'s CardId, ActionError> {
        player_of(state, &self.player_id)?
            .forced_first_action
            .as_ref()
            .filter(|forced| forced.is_outstanding())
            .map(|forced| &forced.corporation_id)
            .ok_or_else(|| ActionError::NoForcedAction(self.player_id.clone()))
    }
}

impl ActionTransition for CompleteForcedAction {
    type Error = ActionError;
    type Result = Resolution;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        if state.current_phase != GamePhase::Action {
            return Err(ActionError::WrongPhase {
                expected: GamePhase::Action,
                actual: state.current_phase,
            });
        }
        let corporation = self.corporation(state)?;
        env.card(corporation)?;
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Resolution, Self::Error> {
        let card = env.card(self.corporation(state)?)?;

        let ctx = ResolveContext::for_card(&self.player_id, &card.id, &self.targets);
        let mut resolution = Resolution::default();
        let mut occurrences = Vec::new();
        for behavior in card
            .behaviors
            .iter()
            .filter(|b| b.has_trigger(ResourceTriggerType::AutoCorpFirstAction))
        {
            let choice = if behavior.choices.is_empty() {
                None
            } else {
                self.choice_index
            };
            let resolved = behavior.extract_inputs_outputs(choice)?;
            let report = resolve_behavior(state, env, &ctx, &resolved.inputs, &resolved.outputs)?;
            resolution.calculated.extend(report.calculated);
            occurrences.extend(report.occurrences);
        }

        if let Some(forced) = player_of_mut(state, &self.player_id)?
            .forced_first_action
            .as_mut()
        {
            forced.completed = true;
        }
        resolution.triggers_fired = fire_all(state, env, &occurrences)?;

        auto_advance_turn_if_needed(state, env.config());
        Ok(resolution)
    }

    fn post_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_non_negative(state, &self.player_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, CardTag, ResourceCondition, ResourceType, TileType, Trigger};
    use crate::config::GameConfig;
    use crate::env::CardSnapshot;
    use crate::state::{ActionAllowance, PlayerState, ResourceSet};

    fn tharsis() -> Card {
        let mut card = Card::new("tharsis", "Tharsis Republic", CardType::Corporation, 0)
            .with_tags([CardTag::Building])
            .with_behavior(
                CardBehavior::new()
                    .with_trigger(Trigger {
                        trigger_type: ResourceTriggerType::AutoCorpStart,
                        condition: None,
                    })
                    .with_output(ResourceCondition::new(ResourceType::CreditsProduction, 1)),
            )
            .with_behavior(
                CardBehavior::new()
                    .with_trigger(Trigger {
                        trigger_type: ResourceTriggerType::AutoCorpFirstAction,
                        condition: None,
                    })
                    .with_output(ResourceCondition::new(ResourceType::CityPlacement, 1)),
            );
        card.starting_resources = Some(ResourceSet {
            credits: 40,
            ..ResourceSet::new()
        });
        card
    }

    fn game(config: &GameConfig) -> GameState {
        let mut state = GameState::new("g", config);
        state.add_player(PlayerState::new("p1", "Ann", 20)).unwrap();
        state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
        state.start(config).unwrap();
        state
    }

    #[test]
    fn selection_grants_start_and_sets_up_forced_action() {
        let cards = CardSnapshot::new([tharsis()]);
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);

        let action = SelectCorporationAction::new("p1", "tharsis");
        action.pre_validate(&state, &env).unwrap();
        action.apply(&mut state, &env).unwrap();

        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.corporation, Some(CardId::from("tharsis")));
        assert_eq!(p1.resources.credits, 40);
        assert_eq!(p1.production.credits, 1);
        assert!(p1.has_outstanding_forced_action());
        assert!(p1.pending_tile_selections.is_empty());

        assert_eq!(
            action.pre_validate(&state, &env),
            Err(ActionError::CorporationAlreadySelected("p1".into()))
        );
    }

    #[test]
    fn forced_action_queues_its_outputs_without_spending_an_action() {
        let cards = CardSnapshot::new([tharsis()]);
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);
        SelectCorporationAction::new("p1", "tharsis")
            .apply(&mut state, &env)
            .unwrap();

        let action = CompleteForcedAction::new("p1");
        action.pre_validate(&state, &env).unwrap();
        action.apply(&mut state, &env).unwrap();

        let p1 = &state.players[&PlayerId::from("p1")];
        assert!(!p1.has_outstanding_forced_action());
        assert_eq!(
            p1.pending_tile_selections.front().map(|p| p.tile_type),
            Some(TileType::City)
        );
        assert_eq!(
            state.current_turn.as_ref().unwrap().actions_remaining,
            ActionAllowance::Limited(2)
        );
        assert_eq!(
            action.pre_validate(&state, &env),
            Err(ActionError::NoForcedAction("p1".into()))
        );
    }

    #[test]
    fn project_cards_are_not_corporations() {
        let cards = CardSnapshot::new([Card::new("mine", "Mine", CardType::Automated, 4)]);
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let state = game(&config);

        assert_eq!(
            SelectCorporationAction::new("p1", "mine").pre_validate(&state, &env),
            Err(ActionError::NotACorporation("mine".into()))
        );
    }
}
