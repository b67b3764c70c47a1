//! Effect ledger: time-boxed modifiers attached to a unit, expired by explicit `now`.

mod caster;

pub use caster::{Caster, EnergyPool, Raven};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    SafetyField,
    Emp,
    Interference,
}

impl EffectKind {
    pub fn display_name(self) -> &'static str {
        match self {
            EffectKind::SafetyField => "安全力场",
            EffectKind::Emp => "电磁脉冲",
            EffectKind::Interference => "干扰矩阵",
        }
    }
}

impl fmt::Display for EffectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One application of an effect. Each application has its own timer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Effect {
    pub kind: EffectKind,
    pub start_time: f64,
    pub duration: f64,
    pub bonus_damage: f64,
    pub bonus_armor: f64,
    /// Healing per tick.
    pub bonus_hp_regen: f64,
}

impl Effect {
    pub fn new(kind: EffectKind, start_time: f64, duration: f64) -> Self {
        Self {
            kind,
            start_time,
            duration,
            bonus_damage: 0.0,
            bonus_armor: 0.0,
            bonus_hp_regen: 0.0,
        }
    }

    pub fn with_bonuses(mut self, damage: f64, armor: f64, hp_regen: f64) -> Self {
        self.bonus_damage = damage;
        self.bonus_armor = armor;
        self.bonus_hp_regen = hp_regen;
        self
    }

    pub fn is_expired(&self, now: f64) -> bool {
        now - self.start_time >= self.duration
    }
}

/// Summed modifiers of all live effects at some instant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EffectBonuses {
    pub damage: f64,
    pub armor: f64,
    pub hp_regen: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EffectLedger {
    effects: Vec<Effect>,
}

impl EffectLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// No deduplication: the same kind applied twice runs two timers.
    /// Anything already expired at the new effect's start time is dropped first,
    /// so a ledger that is only ever read and applied to stays bounded.
    pub fn apply(&mut self, effect: Effect) {
        self.purge_expired(effect.start_time);
        self.effects.push(effect);
    }

    /// Drop every effect of `kind` regardless of remaining time. Returns how many were removed.
    pub fn remove_kind(&mut self, kind: EffectKind) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| e.kind != kind);
        before - self.effects.len()
    }

    /// Drop effects whose window has closed at `now`. Returns how many were removed.
    pub fn purge_expired(&mut self, now: f64) -> usize {
        let before = self.effects.len();
        self.effects.retain(|e| !e.is_expired(now));
        let purged = before - self.effects.len();
        if purged > 0 {
            tracing::debug!(purged, now, "expired effects purged");
        }
        purged
    }

    /// Purge, then heal `hp` by every remaining effect's regen, capped at `max_hp`.
    pub fn tick(&mut self, now: f64, hp: &mut f64, max_hp: f64) {
        self.purge_expired(now);
        for effect in &self.effects {
            if effect.bonus_hp_regen > 0.0 {
                *hp = (*hp + effect.bonus_hp_regen).min(max_hp);
            }
        }
    }

    /// Effects still live at `now`, whether or not a purge has run.
    pub fn active(&self, now: f64) -> impl Iterator<Item = &Effect> + '_ {
        self.effects.iter().filter(move |e| !e.is_expired(now))
    }

    pub fn bonuses(&self, now: f64) -> EffectBonuses {
        self.active(now).fold(EffectBonuses::default(), |mut acc, e| {
            acc.damage += e.bonus_damage;
            acc.armor += e.bonus_armor;
            acc.hp_regen += e.bonus_hp_regen;
            acc
        })
    }

    pub fn has_active(&self, kind: EffectKind, now: f64) -> bool {
        self.active(now).any(|e| e.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.effects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.effects.is_empty()
    }
}

/// Anything that owns an effect ledger and can be targeted by a caster.
pub trait EffectHost {
    fn ledger_mut(&mut self) -> &mut EffectLedger;

    fn apply_effect(&mut self, effect: Effect) {
        self.ledger_mut().apply(effect);
    }
}

impl EffectHost for EffectLedger {
    fn ledger_mut(&mut self) -> &mut EffectLedger {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn field(start: f64) -> Effect {
        Effect::new(EffectKind::SafetyField, start, 10.0).with_bonuses(5.0, 2.0, 2.0)
    }

    #[test]
    fn expiry_boundary() {
        let mut ledger = EffectLedger::new();
        ledger.apply(field(100.0));
        assert!((ledger.bonuses(110.0 - EPS).damage - 5.0).abs() < 1e-9);
        assert_eq!(ledger.bonuses(110.0 + EPS).damage, 0.0);
        assert_eq!(ledger.bonuses(110.0).damage, 0.0);
    }

    #[test]
    fn duplicate_casts_keep_independent_timers() {
        let mut ledger = EffectLedger::new();
        ledger.apply(field(0.0));
        ledger.apply(field(5.0));
        let b = ledger.bonuses(6.0);
        assert!((b.damage - 10.0).abs() < 1e-9);
        assert!((b.armor - 4.0).abs() < 1e-9);
        assert_eq!(ledger.purge_expired(12.0), 1);
        assert!((ledger.bonuses(12.0).damage - 5.0).abs() < 1e-9);
    }

    #[test]
    fn apply_drops_effects_expired_at_new_start() {
        let mut ledger = EffectLedger::new();
        for i in 0..100 {
            ledger.apply(field(f64::from(i) * 45.0));
        }
        assert_eq!(ledger.len(), 1);
        assert!((ledger.bonuses(4455.0).damage - 5.0).abs() < 1e-9);

        let mut overlapping = EffectLedger::new();
        overlapping.apply(field(0.0));
        overlapping.apply(field(9.0));
        assert_eq!(overlapping.len(), 2);
        overlapping.apply(field(10.0));
        assert_eq!(overlapping.len(), 2);
    }

    #[test]
    fn remove_kind_only_touches_that_kind() {
        let mut ledger = EffectLedger::new();
        ledger.apply(field(0.0));
        ledger.apply(Effect::new(EffectKind::Emp, 0.0, 8.0));
        ledger.apply(Effect::new(EffectKind::Emp, 1.0, 8.0));
        assert_eq!(ledger.remove_kind(EffectKind::Emp), 2);
        assert_eq!(ledger.len(), 1);
        assert!(ledger.has_active(EffectKind::SafetyField, 1.0));
    }

    #[test]
    fn tick_purges_then_heals_capped() {
        let mut ledger = EffectLedger::new();
        ledger.apply(field(0.0));
        ledger.apply(field(0.0));
        let mut hp = 95.0;
        ledger.tick(1.0, &mut hp, 100.0);
        assert!((hp - 99.0).abs() < 1e-9);
        ledger.tick(2.0, &mut hp, 100.0);
        assert!((hp - 100.0).abs() < 1e-9);

        hp = 50.0;
        ledger.tick(10.0, &mut hp, 100.0);
        assert!((hp - 50.0).abs() < 1e-9);
        assert!(ledger.is_empty());
    }
}
