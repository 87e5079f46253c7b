use battle_core::{
    AssetId, BattleAction, BattleRules, BattleSession, BattleState, Card, CardEffect,
    CombatEngine, Combatant, CombatantRef, CombatantSpec, ConclusionReason, Declaration,
    EffectKind, Element, Elements, MatchMode, Participant, PlayerId, SessionError, SessionId,
    Side, SideState, StakeTier, TargetSelector,
};

const SESSION: SessionId = SessionId(42);

fn card(id: &str, element: Element, cost: u32, effects: Vec<CardEffect>) -> Card {
    Card::new(id, id, element, cost, effects)
}

fn flame_lash() -> Card {
    card(
        "Flame Lash",
        Element::Fire,
        20,
        vec![CardEffect::new(EffectKind::Damage, 40, TargetSelector::Enemy)],
    )
}

fn spec(
    name: &str,
    elements: &[Element],
    speed: u32,
    attack: u32,
    defense: u32,
    cards: Vec<Card>,
) -> Combatant {
    Combatant::from_spec(CombatantSpec {
        id: AssetId::new(name.to_lowercase()),
        name: name.to_string(),
        elements: Elements::new(elements).expect("valid elements"),
        hp: 200,
        energy: 100,
        speed,
        attack,
        defense,
        cards,
    })
    .expect("valid combatant")
}

fn ember() -> Combatant {
    spec("Ember", &[Element::Fire], 60, 35, 5, vec![flame_lash()])
}

fn sprout() -> Combatant {
    let vine = card(
        "Vine",
        Element::Plant,
        10,
        vec![CardEffect::new(EffectKind::Damage, 20, TargetSelector::Enemy)],
    );
    spec("Sprout", &[Element::Plant], 40, 15, 10, vec![vine])
}

fn side(name: &str, roster: Vec<Combatant>) -> SideState {
    SideState::new(Participant::human(PlayerId::new(name)), roster).expect("valid roster")
}

fn active_session(home: Vec<Combatant>, away: Vec<Combatant>) -> BattleSession {
    let mut session = BattleSession::matched(
        SESSION,
        MatchMode::Ranked,
        StakeTier::Silver,
        side("alice", home),
        side("bob", away),
    )
    .expect("distinct participants");
    session.start().expect("matched session starts");
    session
}

fn play(combatant: u8) -> Declaration {
    Declaration::Actions(vec![BattleAction::new(SESSION, combatant, 0)])
}

fn idle() -> Declaration {
    Declaration::Actions(Vec::new())
}

fn unit(state: &BattleState, side: Side, index: u8) -> &Combatant {
    state
        .combatant(CombatantRef::new(side, index))
        .expect("combatant exists")
}

#[test]
fn super_effective_hit_lands_in_full() {
    // 40 + 35 - 10 = 65 nominal, doubled by fire against plant.
    let mut session = active_session(vec![ember()], vec![sprout()]);
    let report = session
        .resolve_turn(&BattleRules::default(), &play(0), &idle())
        .expect("turn resolves");

    let state = session.state().expect("active state");
    assert_eq!(unit(state, Side::Away, 0).hp(), 70);
    assert_eq!(report.log[0], "Ember plays Flame Lash");
    assert_eq!(report.log[1], "Ember hits Sprout for 130 damage (x2.0)");
}

#[test]
fn shield_soaks_part_of_the_hit() {
    let mut session = active_session(vec![ember()], vec![sprout().with_shield(50)]);
    let report = session
        .resolve_turn(&BattleRules::default(), &play(0), &idle())
        .expect("turn resolves");

    let target = unit(session.state().expect("active state"), Side::Away, 0);
    assert_eq!(target.shield(), 0);
    assert_eq!(target.hp(), 120);
    assert!(report.log[1].ends_with(", 50 absorbed by shield"));
}

#[test]
fn faster_lethal_action_wins_the_exchange() {
    let burst = card(
        "Burst",
        Element::Spirit,
        0,
        vec![CardEffect::new(EffectKind::Damage, 400, TargetSelector::Enemy)],
    );
    let quick = spec("Quick", &[Element::Spirit], 80, 0, 0, vec![burst.clone()]);
    let slow = spec("Slow", &[Element::Spirit], 20, 0, 0, vec![burst]);

    // The slow side sits at home; speed still decides.
    let mut session = active_session(vec![slow], vec![quick]);
    let report = session
        .resolve_turn(&BattleRules::default(), &play(0), &play(0))
        .expect("turn resolves");

    let outcome = report.outcome.expect("knockout concludes the match");
    assert_eq!(outcome.winner, Some(PlayerId::new("bob")));
    assert_eq!(outcome.reason, ConclusionReason::Knockout);
    assert!(report.log.iter().any(|l| l == "Slow has fainted and cannot act"));
    assert!(unit(session.state().expect("state"), Side::Away, 0).is_alive());
}

#[test]
fn knockout_locks_out_further_submissions() {
    let mut session = active_session(vec![ember()], vec![sprout().with_hp(50)]);
    let report = session
        .resolve_turn(&BattleRules::default(), &play(0), &play(0))
        .expect("turn resolves");
    assert_eq!(
        report.outcome.and_then(|o| o.winner),
        Some(PlayerId::new("alice"))
    );

    let late = [BattleAction::new(SESSION, 0, 0)];
    assert_eq!(
        session.validate_declaration(&PlayerId::new("alice"), &late),
        Err(SessionError::Concluded(SESSION))
    );
}

#[test]
fn identical_inputs_give_identical_results() {
    let build = || {
        let guard = card(
            "Guard",
            Element::Metal,
            15,
            vec![
                CardEffect::new(EffectKind::Shield, 25, TargetSelector::AllAllies),
                CardEffect::timed(EffectKind::BuffDefense, 5, TargetSelector::User, 2),
            ],
        );
        active_session(
            vec![ember(), spec("Bulwark", &[Element::Metal], 60, 10, 20, vec![guard])],
            vec![
                sprout(),
                spec("Gale", &[Element::Wind, Element::Ice], 60, 30, 5, vec![flame_lash()]),
            ],
        )
    };
    let home = Declaration::Actions(vec![
        BattleAction::new(SESSION, 0, 0).targeting(1),
        BattleAction::new(SESSION, 1, 0),
    ]);
    let away = Declaration::Actions(vec![
        BattleAction::new(SESSION, 0, 0),
        BattleAction::new(SESSION, 1, 0),
    ]);

    let rules = BattleRules::default();
    let mut first = build();
    let mut second = build();
    for _ in 0..3 {
        let a = first.resolve_turn(&rules, &home, &away).expect("turn resolves");
        let b = second.resolve_turn(&rules, &home, &away).expect("turn resolves");
        assert_eq!(a, b);
    }
    assert_eq!(first.state(), second.state());
}

#[test]
fn timed_buff_is_reversed_after_its_duration() {
    let rally = card(
        "Rally",
        Element::Light,
        0,
        vec![CardEffect::timed(EffectKind::BuffAttack, 12, TargetSelector::User, 2)],
    );
    let mut state = BattleState::new(
        side("alice", vec![spec("Herald", &[Element::Light], 50, 10, 0, vec![rally])]),
        side("bob", vec![sprout()]),
    );
    let rules = BattleRules::default();
    let herald = CombatantRef::new(Side::Home, 0);

    let mut engine = CombatEngine::new(&mut state, &rules);
    engine.run_turn(&[BattleAction::new(SESSION, 0, 0)], &[]);
    assert_eq!(engine.state().combatant(herald).map(Combatant::attack), Some(22));

    let log = engine.run_turn(&[], &[]);
    assert_eq!(engine.state().combatant(herald).map(Combatant::attack), Some(10));
    assert!(log.iter().any(|l| l == "Herald's attack buff wore off"));
    assert!(engine.state().combatant(herald).is_some_and(|c| c.statuses().is_empty()));
}

#[test]
fn explicit_target_is_honored() {
    let mut session = active_session(
        vec![ember()],
        vec![sprout(), spec("Shade", &[Element::Shadow], 10, 0, 0, vec![flame_lash()])],
    );
    let rules = BattleRules::default();
    let aimed = Declaration::Actions(vec![BattleAction::new(SESSION, 0, 0).targeting(1)]);

    session.resolve_turn(&rules, &aimed, &idle()).expect("turn resolves");
    let state = session.state().expect("state");
    assert_eq!(unit(state, Side::Away, 0).hp(), 200);
    assert!(unit(state, Side::Away, 1).hp() < 200);
}
