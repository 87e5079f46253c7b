/// Battle rule constants and tunable parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BattleRules {
    /// Share of the hit-point damage a Drain effect returns to its user, in percent.
    pub drain_heal_percent: u32,
    /// Energy every living combatant regains at the end of a turn.
    pub energy_regen_per_turn: u32,
    /// Consecutive missed turns after which a side forfeits. Zero disables forfeiture.
    pub forfeit_after_missed_turns: u32,
    /// Turn after which the match is decided on remaining hit points. Zero disables the cap.
    pub max_turns: u32,
}

impl BattleRules {
    // ===== compile-time constants used as type parameters =====
    /// Maximum combatants a participant may field.
    pub const MAX_ROSTER: usize = 3;
    /// Maximum element tags on one combatant.
    pub const MAX_ELEMENTS: usize = 2;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_DRAIN_HEAL_PERCENT: u32 = 50;
    pub const DEFAULT_ENERGY_REGEN: u32 = 20;
    pub const DEFAULT_FORFEIT_AFTER: u32 = 3;
    pub const DEFAULT_MAX_TURNS: u32 = 50;

    pub fn new() -> Self {
        Self {
            drain_heal_percent: Self::DEFAULT_DRAIN_HEAL_PERCENT,
            energy_regen_per_turn: Self::DEFAULT_ENERGY_REGEN,
            forfeit_after_missed_turns: Self::DEFAULT_FORFEIT_AFTER,
            max_turns: Self::DEFAULT_MAX_TURNS,
        }
    }
}

impl Default for BattleRules {
    fn default() -> Self {
        Self::new()
    }
}
