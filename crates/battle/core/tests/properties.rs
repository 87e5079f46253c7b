use battle_core::engine::damage_against;
use battle_core::{
    AssetId, BattleAction, BattleRules, BattleState, Card, CardEffect, CombatEngine, Combatant,
    CombatantRef, CombatantSpec, EffectKind, Element, Elements, Participant, PlayerId, SessionId,
    Side, SideState, StatKind, TargetSelector, execution_order, multiplier,
};
use proptest::prelude::*;
use strum::IntoEnumIterator;

fn unit(hp: u32, shield: u32, speed: u32) -> Combatant {
    Combatant::from_spec(CombatantSpec {
        id: AssetId::new("unit"),
        name: "Unit".to_string(),
        elements: Elements::single(Element::Earth),
        hp,
        energy: 100,
        speed,
        attack: 10,
        defense: 10,
        cards: vec![Card::new(
            "poke",
            "Poke",
            Element::Earth,
            5,
            vec![CardEffect::new(EffectKind::Damage, 5, TargetSelector::Enemy)],
        )],
    })
    .expect("valid combatant")
    .with_shield(shield)
}

fn fighter(element: Element, hp: u32, attack: u32, defense: u32) -> Combatant {
    Combatant::from_spec(CombatantSpec {
        id: AssetId::new(element.to_string()),
        name: element.to_string(),
        elements: Elements::single(element),
        hp,
        energy: 100,
        speed: 10,
        attack,
        defense,
        cards: vec![Card::new(
            "hit",
            "Hit",
            element,
            0,
            vec![CardEffect::new(EffectKind::Damage, 1, TargetSelector::Enemy)],
        )],
    })
    .expect("valid combatant")
}

fn any_element() -> impl Strategy<Value = Element> {
    proptest::sample::select(Element::iter().collect::<Vec<_>>())
}

fn side(name: &str, speeds: &[u32]) -> SideState {
    SideState::new(
        Participant::human(PlayerId::new(name)),
        speeds.iter().map(|&speed| unit(100, 0, speed)).collect(),
    )
    .expect("valid roster")
}

#[test]
fn fire_and_plant_are_asymmetric() {
    let fire = Elements::single(Element::Fire);
    let plant = Elements::single(Element::Plant);
    assert_eq!(multiplier(&fire, &plant), 2.0);
    assert_eq!(multiplier(&plant, &fire), 0.5);
}

proptest! {
    #[test]
    fn damage_never_raises_or_underflows_hit_points(
        hp in 1u32..500,
        shield in 0u32..300,
        damage in 0u32..1_000,
    ) {
        let mut target = unit(hp, shield, 10);
        target.take_damage(damage);
        prop_assert!(target.hp() <= hp);
    }

    #[test]
    fn damage_effects_never_raise_hit_points_whatever_the_matchup(
        attacker in any_element(),
        defender in any_element(),
        attack in 0u32..300,
        defense in 0u32..300,
        base in 0u32..300,
        hp in 1u32..500,
        shield in 0u32..300,
    ) {
        let striker = fighter(attacker, 100, attack, 0);
        let target = fighter(defender, hp, 0, defense).with_shield(shield);
        let (damage, scale) = damage_against(&striker, &target, base);
        prop_assert!(f64::from(damage) >= scale.floor());

        let mut state = BattleState::new(
            SideState::new(Participant::human(PlayerId::new("alice")), vec![striker])
                .expect("valid roster"),
            SideState::new(Participant::human(PlayerId::new("bob")), vec![target])
                .expect("valid roster"),
        );
        let rules = BattleRules::default();
        let victim = CombatantRef::new(Side::Away, 0);
        let mut engine = CombatEngine::new(&mut state, &rules);
        engine.apply_effect(
            CombatantRef::new(Side::Home, 0),
            &CardEffect::new(EffectKind::Damage, base, TargetSelector::Enemy),
            &[victim],
        );

        let after = engine.state().combatant(victim).map(Combatant::hp).expect("target exists");
        prop_assert!(after <= hp);
        prop_assert_eq!(after, hp.saturating_sub(damage.saturating_sub(shield)));
    }

    #[test]
    fn shield_absorbs_exactly_what_it_can(
        hp in 1u32..500,
        shield in 0u32..300,
        damage in 0u32..1_000,
    ) {
        let mut target = unit(hp, shield, 10);
        let outcome = target.take_damage(damage);

        prop_assert_eq!(target.shield(), shield.saturating_sub(damage));
        prop_assert_eq!(outcome.passed_through, damage.saturating_sub(shield));
        prop_assert_eq!(outcome.absorbed + outcome.passed_through, damage);
        prop_assert_eq!(outcome.hp_loss, outcome.passed_through.min(hp));
    }

    #[test]
    fn healing_stops_at_max_hit_points(
        wounds in 0u32..400,
        heal in 0u32..1_000,
    ) {
        let mut target = unit(400, 0, 10);
        target.take_damage(wounds);
        target.heal(heal);
        prop_assert!(target.hp() <= target.max_hp());
    }

    #[test]
    fn status_reverts_after_exactly_its_duration(
        magnitude in -50i32..50,
        duration in 1u32..8,
    ) {
        let mut target = unit(100, 0, 10);
        let base = target.attack();
        target.add_status(StatKind::Attack, magnitude, duration);

        for _ in 1..duration {
            prop_assert!(target.tick_statuses().is_empty());
            prop_assert_eq!(target.attack(), base + i64::from(magnitude));
        }
        prop_assert_eq!(target.tick_statuses().len(), 1);
        prop_assert_eq!(target.attack(), base);
        prop_assert_eq!(target.status_total(StatKind::Attack), 0);
    }

    #[test]
    fn execution_order_is_deterministic(
        home in proptest::collection::vec(0u32..5, 1..=3),
        away in proptest::collection::vec(0u32..5, 1..=3),
    ) {
        let state = BattleState::new(side("alice", &home), side("bob", &away));
        let session = SessionId(1);
        let declare = |count: usize| -> Vec<BattleAction> {
            (0..count as u8).map(|i| BattleAction::new(session, i, 0)).collect()
        };
        let (home_actions, away_actions) = (declare(home.len()), declare(away.len()));

        let first = execution_order(&state, &home_actions, &away_actions);
        let second = execution_order(&state, &home_actions, &away_actions);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), home.len() + away.len());

        let speeds: Vec<u32> = first
            .iter()
            .map(|(side, action)| {
                state
                    .side(*side)
                    .roster[usize::from(action.combatant)]
                    .speed()
            })
            .collect();
        prop_assert!(speeds.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
