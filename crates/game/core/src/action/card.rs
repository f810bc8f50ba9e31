//! Playing cards and using card actions.

use crate::card::{Card, ResolvedBehavior};
use crate::discount::{effective_card_cost, payment_substitutes};
use crate::engine::ensure_can_act;
use crate::env::GameEnv;
use crate::payment::CardPayment;
use crate::playability::{calculate_player_card_action_state, can_play_card};
use crate::resolver::{
    BehaviorTargets, Occurrence, ResolveContext, input_shortfalls, production_shortfalls,
    resolve_behavior,
};
use crate::state::{CardAction, CardId, GameState, PlayerId, PlayerState};

use super::{
    ActionError, ActionTransition, Resolution, ensure_active, ensure_non_negative, fire_all,
    player_of, player_of_mut, register_card, spend_action,
};

/// Plays a card from hand, paying its discounted cost.
///
/// On-play behaviors resolve in card order. Lasting behaviors are registered
/// before conditional effects fire, so the card's own effects are in place
/// (but never fire on the card itself).
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct PlayCardAction {
    pub player_id: PlayerId,
    pub card_id: CardId,
    #[cfg_attr(feature = "serde", serde(default))]
    pub payment: CardPayment,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub choice_index: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: BehaviorTargets,
}

impl PlayCardAction {
    pub fn new(player_id: impl Into<PlayerId>, card_id: impl Into<CardId>, payment: CardPayment) -> Self {
        Self {
            player_id: player_id.into(),
            card_id: card_id.into(),
            payment,
            choice_index: None,
            targets: BehaviorTargets::default(),
        }
    }

    #[must_use]
    pub fn with_choice(mut self, choice_index: usize) -> Self {
        self.choice_index = Some(choice_index);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: BehaviorTargets) -> Self {
        self.targets = targets;
        self
    }

    /// On-play behaviors with the selected choice folded in.
    ///
    /// The choice index applies to every behavior that offers choices.
    fn on_play(&self, card: &Card) -> Result<Vec<ResolvedBehavior>, ActionError> {
        card.behaviors
            .iter()
            .filter(|behavior| behavior.applies_on_play())
            .map(|behavior| {
                let choice = if behavior.choices.is_empty() {
                    None
                } else {
                    self.choice_index
                };
                behavior.extract_inputs_outputs(choice).map_err(ActionError::from)
            })
            .collect()
    }
}

impl ActionTransition for PlayCardAction {
    type Error = ActionError;
    type Result = Resolution;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        ensure_can_act(state, &self.player_id)?;
        let player = player_of(state, &self.player_id)?;
        let card = env.card(&self.card_id)?;

        let playability = can_play_card(card, state, player, env);
        if let Some(first) = playability.errors.into_iter().next() {
            return Err(ActionError::NotPlayable(first));
        }

        let (cost, _) = effective_card_cost(player, card);
        let substitutes = payment_substitutes(player, env.config());
        self.payment.covers_card_cost(
            cost,
            card.allows_steel(),
            card.allows_titanium(),
            &substitutes,
        )?;
        self.payment.can_afford(&player.resources)?;

        // On-play inputs are taken from what this payment leaves behind.
        let mut paid = player.clone();
        pay(&mut paid, &self.payment);
        for resolved in self.on_play(card)? {
            check_shortfalls(&resolved, &card.id, state, &paid, env)?;
        }
        Ok(())
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Resolution, Self::Error> {
        let card = env.card(&self.card_id)?;
        let behaviors = self.on_play(card)?;

        let player = player_of_mut(state, &self.player_id)?;
        pay(player, &self.payment);
        player.remove_from_hand(&card.id);
        player.played_cards.push(card.id.clone());
        register_card(player, card);

        let ctx = ResolveContext::for_card(&self.player_id, &card.id, &self.targets);
        let mut resolution = Resolution::default();
        let mut occurrences = vec![Occurrence::CardPlayed {
            player: self.player_id.clone(),
            card: card.id.clone(),
        }];
        for resolved in &behaviors {
            let report = resolve_behavior(state, env, &ctx, &resolved.inputs, &resolved.outputs)?;
            resolution.calculated.extend(report.calculated);
            occurrences.extend(report.occurrences);
        }

        resolution.triggers_fired = fire_all(state, env, &occurrences)?;
        spend_action(state, env.config())?;
        Ok(resolution)
    }

    fn post_validate(&self, state: &GameState, _env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_non_negative(state, &self.player_id)
    }
}

/// Uses a repeatable action of a played card.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct UseCardAction {
    pub player_id: PlayerId,
    pub card_id: CardId,
    pub behavior_index: usize,
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub choice_index: Option<usize>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub targets: BehaviorTargets,
}

impl UseCardAction {
    pub fn new(player_id: impl Into<PlayerId>, card_id: impl Into<CardId>, behavior_index: usize) -> Self {
        Self {
            player_id: player_id.into(),
            card_id: card_id.into(),
            behavior_index,
            choice_index: None,
            targets: BehaviorTargets::default(),
        }
    }

    #[must_use]
    pub fn with_choice(mut self, choice_index: usize) -> Self {
        self.choice_index = Some(choice_index);
        self
    }

    #[must_use]
    pub fn with_targets(mut self, targets: BehaviorTargets) -> Self {
        self.targets = targets;
        self
    }

    fn find<'p>(&self, player: &'p PlayerState) -> Result<&'p CardAction, ActionError> {
        player
            .actions
            .iter()
            .find(|a| a.card_id == self.card_id && a.behavior_index == self.behavior_index)
            .ok_or_else(|| ActionError::CardActionNotFound {
                player: self.player_id.clone(),
                card: self.card_id.clone(),
                behavior_index: self.behavior_index,
            })
    }
}

impl ActionTransition for UseCardAction {
    type Error = ActionError;
    type Result = Resolution;

    fn actor(&self) -> Option<&PlayerId> {
        Some(&self.player_id)
    }

    fn pre_validate(&self, state: &GameState, env: &GameEnv<'_>) -> Result<(), Self::Error> {
        ensure_active(state)?;
        ensure_can_act(state, &self.player_id)?;
        let player = player_of(state, &self.player_id)?;
        let action = self.find(player)?;

        let diagnostic = calculate_player_card_action_state(
            &self.card_id,
            self.behavior_index,
            &action.behavior,
            action.play_count,
            player,
            state,
            env,
        );
        if let Some(first) = diagnostic.state.errors.into_iter().next() {
            return Err(ActionError::Unavailable(first));
        }

        let resolved = action.behavior.extract_inputs_outputs(self.choice_index)?;
        check_shortfalls(&resolved, &self.card_id, state, player, env)
    }

    fn apply(&self, state: &mut GameState, env: &GameEnv<'_>) -> Result<Resolution, Self::Error> {
        let resolved = {
            let player = player_of(state, &self.player_id)?;
            self.find(player)?
                .behavior
                .extract_inputs_outputs(self.choice_index)?
        };

        let ctx = ResolveContext::for_card(&self.player_id, &self.card_id, &self.targets);
        let report = resolve_behavior(state, env, &ctx, &resolved.inputs, &resolved.outputs)?;

        let player = player_of_mut(state, &self.player_id)?;
        if let Some(action) = player
            .actions
            .iter_mut()
            .find(|a| a.card_id == self.card_id && a.behavior_index == self.behavior_index)
        {
            action.play_count += 1;
        }

        let triggers_fired = fire_all(state, env, &report.occurrences)?;
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

/// Rejects a resolved behavior the player cannot pay for or whose production
/// changes would break a floor.
fn check_shortfalls(
    resolved: &ResolvedBehavior,
    card_id: &CardId,
    state: &GameState,
    player: &PlayerState,
    env: &GameEnv<'_>,
) -> Result<(), ActionError> {
    let shortfall = input_shortfalls(&resolved.inputs, player, Some(card_id), env.config())
        .into_iter()
        .chain(production_shortfalls(
            &resolved.outputs,
            state,
            player,
            Some(card_id),
            env,
        ))
        .next();
    match shortfall {
        Some(shortfall) => Err(ActionError::Resolve(shortfall.into())),
        None => Ok(()),
    }
}

fn pay(player: &mut PlayerState, payment: &CardPayment) {
    use crate::card::ResourceType as R;

    player.resources.add(R::Credits, -payment.credits);
    player.resources.add(R::Steel, -payment.steel);
    player.resources.add(R::Titanium, -payment.titanium);
    for (resource, amount) in &payment.substitutes {
        player.resources.add(*resource, -amount);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{
        CardBehavior, CardTag, CardType, Choice, ResourceCondition, ResourceTriggerCondition,
        ResourceType, Trigger, TriggerEvent,
    };
    use crate::config::GameConfig;
    use crate::engine::TurnError;
    use crate::env::CardSnapshot;
    use crate::payment::PaymentError;
    use crate::resolver::ResolveError;
    use crate::state::{ActionAllowance, PlayerState};

    fn catalog() -> CardSnapshot {
        CardSnapshot::new([
            Card::new("mine", "Mine", CardType::Automated, 4)
                .with_tags([CardTag::Building])
                .with_behavior(
                    CardBehavior::new()
                        .with_trigger(Trigger::auto())
                        .with_output(ResourceCondition::new(ResourceType::SteelProduction, 1)),
                ),
            Card::new("rover", "Rover", CardType::Active, 6)
                .with_tags([CardTag::Science])
                .with_behavior(
                    CardBehavior::new()
                        .with_trigger(Trigger::on(ResourceTriggerCondition::new(
                            TriggerEvent::CardPlayed,
                        )))
                        .with_output(ResourceCondition::new(ResourceType::Credits, 1)),
                )
                .with_behavior(
                    CardBehavior::new()
                        .with_trigger(Trigger::manual())
                        .with_input(ResourceCondition::new(ResourceType::Energy, 1))
                        .with_choice(Choice {
                            inputs: vec![],
                            outputs: vec![ResourceCondition::new(ResourceType::Plants, 2)],
                        })
                        .with_choice(Choice {
                            inputs: vec![ResourceCondition::new(ResourceType::Heat, 5)],
                            outputs: vec![ResourceCondition::new(ResourceType::Steel, 3)],
                        }),
                ),
            Card::new("levy", "Levy", CardType::Automated, 10)
                .with_tags([CardTag::Building])
                .with_behavior(
                    CardBehavior::new()
                        .with_trigger(Trigger::auto())
                        .with_input(ResourceCondition::new(ResourceType::Credits, 5))
                        .with_output(ResourceCondition::new(ResourceType::CreditsProduction, 2)),
                ),
        ])
    }

    fn game(config: &GameConfig) -> GameState {
        let mut state = GameState::new("g", config);
        let mut p1 = PlayerState::new("p1", "Ann", 20);
        p1.resources.credits = 20;
        p1.resources.steel = 1;
        p1.resources.energy = 2;
        p1.hand = vec!["mine".into(), "rover".into()];
        state.add_player(p1).unwrap();
        state.add_player(PlayerState::new("p2", "Bo", 20)).unwrap();
        state.start(config).unwrap();
        state
    }

    fn run<T: ActionTransition>(
        action: &T,
        state: &mut GameState,
        env: &GameEnv<'_>,
    ) -> Result<T::Result, T::Error> {
        action.pre_validate(state, env)?;
        let result = action.apply(state, env)?;
        action.post_validate(state, env)?;
        Ok(result)
    }

    #[test]
    fn playing_a_card_pays_resolves_and_spends_an_action() {
        let cards = catalog();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);

        let action = PlayCardAction::new("p1", "mine", CardPayment::credits(2).with_steel(1));
        let resolution = run(&action, &mut state, &env).unwrap();

        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.resources.credits, 18);
        assert_eq!(p1.resources.steel, 0);
        assert_eq!(p1.production.steel, 1);
        assert_eq!(p1.played_cards, vec![CardId::from("mine")]);
        assert!(!p1.has_in_hand(&"mine".into()));
        assert_eq!(resolution.calculated.len(), 1);
        assert_eq!(
            state.current_turn.as_ref().unwrap().actions_remaining,
            ActionAllowance::Limited(1)
        );
    }

    #[test]
    fn titanium_is_rejected_for_a_non_space_card() {
        let cards = catalog();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);
        state.player_mut(&"p1".into()).unwrap().resources.titanium = 2;

        let action = PlayCardAction::new("p1", "mine", CardPayment::default().with_titanium(2));
        assert_eq!(
            action.pre_validate(&state, &env),
            Err(ActionError::Payment(PaymentError::TitaniumNotAllowed))
        );
    }

    #[test]
    fn only_the_current_player_may_play() {
        let cards = catalog();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let state = game(&config);

        let action = PlayCardAction::new("p2", "mine", CardPayment::credits(4));
        assert!(matches!(
            action.pre_validate(&state, &env),
            Err(ActionError::Turn(TurnError::NotYourTurn { .. }))
        ));
    }

    #[test]
    fn conditional_effect_fires_for_later_cards_but_not_itself() {
        let cards = catalog();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);

        let rover = run(
            &PlayCardAction::new("p1", "rover", CardPayment::credits(6)),
            &mut state,
            &env,
        )
        .unwrap();
        assert_eq!(rover.triggers_fired, 0);

        let mine = run(
            &PlayCardAction::new("p1", "mine", CardPayment::credits(4)),
            &mut state,
            &env,
        )
        .unwrap();
        assert_eq!(mine.triggers_fired, 1);
        // 20 - 6 - 4 + 1 from the rover effect
        assert_eq!(state.players[&PlayerId::from("p1")].resources.credits, 11);
    }

    #[test]
    fn card_action_applies_the_chosen_branch_once_per_generation() {
        let cards = catalog();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);
        state.current_turn.as_mut().unwrap().actions_remaining = ActionAllowance::Unlimited;

        run(
            &PlayCardAction::new("p1", "rover", CardPayment::credits(6)),
            &mut state,
            &env,
        )
        .unwrap();

        let expensive = UseCardAction::new("p1", "rover", 1).with_choice(1);
        assert!(matches!(
            expensive.pre_validate(&state, &env),
            Err(ActionError::Resolve(ResolveError::InsufficientInput {
                resource: ResourceType::Heat,
                ..
            }))
        ));

        let cheap = UseCardAction::new("p1", "rover", 1).with_choice(0);
        run(&cheap, &mut state, &env).unwrap();
        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.resources.energy, 1);
        assert_eq!(p1.resources.plants, 2);
        assert_eq!(p1.actions[0].play_count, 1);

        let again = cheap.pre_validate(&state, &env).unwrap_err();
        assert_eq!(
            again.validation().map(|e| e.code.as_str()),
            Some("ACTION_ALREADY_USED")
        );
    }

    #[test]
    fn on_play_inputs_must_survive_the_chosen_payment() {
        let cards = catalog();
        let config = GameConfig::default();
        let env = GameEnv::new(&cards, &config);
        let mut state = game(&config);
        let p1 = state.player_mut(&"p1".into()).unwrap();
        p1.resources.credits = 12;
        p1.resources.steel = 4;
        p1.hand.push("levy".into());

        let all_credits = PlayCardAction::new("p1", "levy", CardPayment::credits(10));
        assert!(matches!(
            all_credits.pre_validate(&state, &env),
            Err(ActionError::Resolve(_))
        ));

        let with_steel = PlayCardAction::new("p1", "levy", CardPayment::credits(2).with_steel(4));
        run(&with_steel, &mut state, &env).unwrap();
        let p1 = &state.players[&PlayerId::from("p1")];
        assert_eq!(p1.resources.credits, 5);
        assert_eq!(p1.production.credits, 2);
    }
}
