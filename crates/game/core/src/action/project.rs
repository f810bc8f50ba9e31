//! Standard projects and the sell-patents confirmation.

use std::collections::BTreeSet;

use tracing::debug;

use crate::card::{ResourceCondition, ResourceType, StandardProject};
use crate::engine::{auto_advance_turn_if_needed, ensure_can_act};
use crate::env::GameEnv;
use crate::playability::{calculate_player_standard_project_state, project_cost};
use crate::resolver::{BehaviorTargets, Occurrence, ResolveContext, apply_outputs};
use crate::state::{CardId, GameState, PendingCardSelection, PlayerId};

use super::{
    ActionError, ActionTransition, Resolution, ensure_active, ensure_non_negative, fire_all,
    player_of, player_of_mut, spend_action,
};

/// MC received for each card sold.
pub const PATENT_SALE_PRICE: i32 = 1;

/// Runs one standard project for the acting player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct StandardProjectAction {
    pub player_id: PlayerId,
    pub project: StandardProject,
}

impl StandardProjectAction {
    pub fn new(player_id: impl Into<PlayerId>, project: StandardProject) -> Self {
        Self {
            player_id: player_id.into(),
            project,
        }
    }
}

/// What a project gives once paid for. Sell patents opens a selection instead.
fn project_outputs(project: StandardProject) -> Vec<ResourceCondition> {
    use ResourceType as R;

    match project {
        StandardProject::SellPatents => Vec::new(),
        StandardProject::PowerPlant => vec![ResourceCondition::new(R::EnergyProduction, 1)],
        StandardProject::Asteroid | StandardProject::ConvertHeatToTemperature => {
            vec![ResourceCondition::new(R::Temperature, 1)]
        }
        StandardProject::Aquifer => vec![ResourceCondition::new(R::OceanPlacement, 1)],
        StandardProject::Greenery | StandardProject::ConvertPlantsToGreenery => {
            vec![ResourceCondition::new(R::GreeneryPlacement, 1)]
        }
        StandardProject::City => vec![
            ResourceCondition::new(R::CreditsProduction, 1),
            ResourceCondition::new(R::CityPlacement, 1),
        ],
    }
}

impl ActionTransition for StandardProjectAction {
    type Error = ActionError;
    type Result = Resolution;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        ensure_can_act(state, &self.player_id)?;
        let player = player_of(state, &self.player_id)?;

        let diagnostic =
            calculate_player_standard_project_state(self.project.as_ref(), player, state, env);
        match diagnostic.state.errors.into_iter().next() {
            Some(first) => Err(ActionError::Unavailable(first)),
            None => Ok(()),
        }
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Resolution, Self::Error> {
        let player = player_of_mut(state, &self.player_id)?;
        let (resource, cost, _) = project_cost(self.project, player, env);
        player.resources.add(resource, -cost);

        if self.project == StandardProject::SellPatents {
            player.pending_card_selection = Some(PendingCardSelection {
                source: self.project.to_string(),
                available_cards: player.hand.clone(),
                reward_per_card: PATENT_SALE_PRICE,
                min_cards: 0,
                max_cards: player.hand.len(),
            });
        }

        let source = format!("standard-project-{}", self.project);
        let targets = BehaviorTargets::default();
        let ctx = ResolveContext::for_project(&self.player_id, &source, &targets);
        let report = apply_outputs(state, env, &ctx, &project_outputs(self.project))?;

        let mut occurrences = vec![Occurrence::StandardProjectPlayed {
            player: self.player_id.clone(),
            project: self.project,
        }];
        occurrences.extend(report.occurrences);
        let triggers_fired = fire_all(state, env, &occurrences)?;

        spend_action(state, env.config())?;
        Ok(Resolution {
            calculated: report.calculated,
            triggers_fired,
        })
    }

    fn post_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_non_negative(state, &self.player_id)
    }
}

/// Confirms which of the offered cards to sell.
///
/// Takes no action and needs no turn: the selection was paid for by the
/// sell-patents project. Selecting nothing only clears the selection.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct ConfirmSellPatentsAction {
    pub player_id: PlayerId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub selected: Vec<CardId>,
}

impl ConfirmSellPatentsAction {
    pub fn new(player_id: impl Into<PlayerId>, selected: impl IntoIterator<Item = impl Into<CardId>>) -> Self {
        Self {
            player_id: player_id.into(),
            selected: selected.into_iter().map(Into::into).collect(),
        }
    }
}

impl ActionTransition for ConfirmSellPatentsAction {
    type Error = ActionError;
    type Result = i32;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        let player = player_of(state, &self.player_id)?;
        let selection = player
            .pending_card_selection
            .as_ref()
            .ok_or_else(|| ActionError::NoPendingSelection(self.player_id.clone()))?;

        let count = self.selected.len();
        if count < selection.min_cards || count > selection.max_cards {
            return Err(ActionError::SelectionCount {
                selected: count,
                min: selection.min_cards,
                max: selection.max_cards,
            });
        }

        let mut seen = BTreeSet::new();
        for card in &self.selected {
            let offered = selection.available_cards.contains(card) && player.has_in_hand(card);
            if !offered || !seen.insert(card) {
                return Err(ActionError::CardNotOffered(card.clone()));
            }
        }
        Ok(())
    }

    /// Returns the MC received.
    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<i32, Self::Error> {
        let player = player_of_mut(state, &self.player_id)?;
        let reward = player
            .pending_card_selection
            .take()
            .map_or(PATENT_SALE_PRICE, |selection| selection.reward_per_card);

        for card in &self.selected {
            player.remove_from_hand(card);
        }
        let earned = reward * self.selected.len() as i32;
        player.resources.credits += earned;
        state.discard_pile.extend(self.selected.iter().cloned());

        debug!(
            target: "core::action",
            player_id = %self.player_id,
            sold = self.selected.len(),
            earned,
            "patents sold"
        );
        auto_advance_turn_if_needed(state, env.config());
        Ok(earned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::TileType;
    use crate::config::GameConfig;
    use crate::env::CardSnapshot;
    use crate::state::{ActionAllowance, PlayerState};

    fn game(config: &GameConfig, credits: i32) -> GameState {
        let mut state = GameState::new("g", config);
        let mut p1 = PlayerState::new("p1", "Ann", 20);
        p1.resources.credits = credits;
        p1.hand = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        state.add_player(p1).unwrap();
        state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
        state.start(config).unwrap();
        state
    }

    #[test]
    fn power_plant_costs_eleven_and_adds_energy_production() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config, 11);

        let action = StandardProjectAction::new("p1", StandardProject::PowerPlant);
        action.pre_validate(&state, &env).unwrap();
        let resolution = action.apply(&mut state, &env).unwrap();

        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.resources.credits, 0);
        assert_eq!(p1.production.energy, 1);
        assert_eq!(resolution.calculated[0].resource_type, ResourceType::EnergyProduction);
        assert_eq!(
            state.current_turn.as_ref().unwrap().actions_remaining,
            ActionAllowance::Limited(1)
        );
    }

    #[test]
    fn city_queues_a_placement_that_holds_the_turn() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config, 30);
        state.current_turn.as_mut().unwrap().actions_remaining = ActionAllowance::Limited(1);

        let action = StandardProjectAction::new("p1", StandardProject::City);
        action.pre_validate(&state, &env).unwrap();
        action.apply(&mut state, &env).unwrap();

        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.production.credits, 1);
        let pending = p1.pending_tile_selections.front().unwrap();
        assert_eq!(pending.tile_type, TileType::City);
        assert_eq!(pending.source, "standard-project-city");
        assert_eq!(state.current_player_id(), Some(&PlayerId::from("p1")));
    }

    #[test]
    fn unaffordable_project_reports_the_cost_error() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let state = game(&config, 10);

        let err = StandardProjectAction::new("p1", StandardProject::Asteroid)
            .pre_validate(&state, &env)
            .unwrap_err();
        let validation = err.validation().unwrap();
        assert_eq!(validation.required_value, Some(14));
        assert_eq!(validation.current_value, Some(10));
    }

    #[test]
    fn asteroid_is_refused_once_temperature_is_maxed() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config, 30);
        state.global_parameters.temperature = config.max_temperature;

        let err = StandardProjectAction::new("p1", StandardProject::Asteroid)
            .pre_validate(&state, &env)
            .unwrap_err();
        assert_eq!(err.validation().unwrap().code, "TEMPERATURE_MAXED");
        assert_eq!(state.players[&PlayerId::from("p1")].resources.credits, 30);
    }

    #[test]
    fn selling_two_patents_discards_them_for_credits() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config, 0);

        StandardProjectAction::new("p1", StandardProject::SellPatents)
            .apply(&mut state, &env)
            .unwrap();
        let offered = state.players[&PlayerId::from("p1")]
            .pending_card_selection
            .clone()
            .unwrap();
        assert_eq!(offered.available_cards.len(), 4);
        assert_eq!(offered.max_cards, 4);

        let confirm = ConfirmSellPatentsAction::new("p1", ["a", "c"]);
        confirm.pre_validate(&state, &env).unwrap();
        assert_eq!(confirm.apply(&mut state, &env), Ok(2));

        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.resources.credits, 2);
        assert_eq!(p1.hand, vec![CardId::from("b"), CardId::from("d")]);
        assert!(p1.pending_card_selection.is_none());
        assert_eq!(state.discard_pile.len(), 2);
    }

    #[test]
    fn confirming_a_card_twice_is_rejected() {
        let cards = CardSnapshot::default();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config, 0);
        StandardProjectAction::new("p1", StandardProject::SellPatents)
            .apply(&mut state, &env)
            .unwrap();

        assert_eq!(
            ConfirmSellPatentsAction::new("p1", ["a", "a"]).pre_validate(&state, &env),
            Err(ActionError::CardNotOffered("a".into()))
        );
        assert_eq!(
            ConfirmSellPatentsAction::new("p2", Vec::<CardId>::new()).pre_validate(&state, &env),
            Err(ActionError::NoPendingSelection("p2".into()))
        );
    }
}
