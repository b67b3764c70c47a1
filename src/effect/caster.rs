//! Casters with cooldown gates, energy pools, and the Raven support unit that owns them.

use super::{Effect, EffectHost, EffectKind, EffectLedger};

/// Energy that regenerates linearly between explicit `now` updates.
#[derive(Debug, Clone, PartialEq)]
pub struct EnergyPool {
    pub current: f64,
    pub max: f64,
    pub regen_per_sec: f64,
    last_update: f64,
}

impl EnergyPool {
    pub fn new(current: f64, max: f64, regen_per_sec: f64, now: f64) -> Self {
        Self {
            current: current.min(max),
            max,
            regen_per_sec,
            last_update: now,
        }
    }

    /// Regenerate up to `now`. Time never runs backwards here; an earlier `now` is ignored.
    pub fn advance(&mut self, now: f64) {
        if now <= self.last_update {
            return;
        }
        let elapsed = now - self.last_update;
        self.current = (self.current + self.regen_per_sec * elapsed).min(self.max);
        self.last_update = now;
    }

    pub fn has(&self, amount: f64) -> bool {
        self.current >= amount
    }

    pub fn try_spend(&mut self, amount: f64) -> bool {
        if !self.has(amount) {
            return false;
        }
        self.current -= amount;
        true
    }
}

/// An ability that stamps an effect onto its targets, gated by a cooldown.
#[derive(Debug, Clone, PartialEq)]
pub struct Caster {
    pub kind: EffectKind,
    pub duration: f64,
    pub cooldown: f64,
    pub energy_cost: f64,
    pub bonus_damage: f64,
    pub bonus_armor: f64,
    pub bonus_hp_regen: f64,
    last_cast_time: f64,
}

impl Caster {
    pub fn new(kind: EffectKind, duration: f64, cooldown: f64, energy_cost: f64) -> Self {
        Self {
            kind,
            duration,
            cooldown,
            energy_cost,
            bonus_damage: 0.0,
            bonus_armor: 0.0,
            bonus_hp_regen: 0.0,
            last_cast_time: 0.0,
        }
    }

    /// +5 damage, +2 armor, +2 hp per tick for 10 s; 45 s cooldown.
    pub fn safety_field() -> Self {
        let mut c = Self::new(EffectKind::SafetyField, 10.0, 45.0, 75.0);
        c.bonus_damage = 5.0;
        c.bonus_armor = 2.0;
        c.bonus_hp_regen = 2.0;
        c
    }

    /// 8 s, no stat bonuses; 30 s cooldown.
    pub fn emp() -> Self {
        Self::new(EffectKind::Emp, 8.0, 30.0, 100.0)
    }

    pub fn last_cast_time(&self) -> f64 {
        self.last_cast_time
    }

    pub fn can_cast(&self, now: f64) -> bool {
        now - self.last_cast_time >= self.cooldown
    }

    pub fn cooldown_remaining(&self, now: f64) -> f64 {
        (self.cooldown - (now - self.last_cast_time)).max(0.0)
    }

    pub fn make_effect(&self, now: f64) -> Effect {
        Effect::new(self.kind, now, self.duration).with_bonuses(
            self.bonus_damage,
            self.bonus_armor,
            self.bonus_hp_regen,
        )
    }

    /// All-or-nothing: on cooldown nothing is applied and `last_cast_time` is untouched.
    pub fn cast(&mut self, now: f64, targets: &mut [&mut dyn EffectHost]) -> bool {
        if !self.can_cast(now) {
            tracing::debug!(
                kind = %self.kind,
                remaining = self.cooldown_remaining(now),
                "cast refused: on cooldown"
            );
            return false;
        }
        for target in targets.iter_mut() {
            target.apply_effect(self.make_effect(now));
        }
        self.last_cast_time = now;
        true
    }
}

/// Support unit that carries the safety field and EMP casters.
#[derive(Debug, Clone)]
pub struct Raven {
    pub hp: f64,
    pub max_hp: f64,
    pub armor: f64,
    pub energy: EnergyPool,
    pub safety_field: Caster,
    pub emp: Caster,
    ledger: EffectLedger,
}

impl Raven {
    pub fn new(now: f64) -> Self {
        Self {
            hp: 140.0,
            max_hp: 140.0,
            armor: 1.0,
            energy: EnergyPool::new(50.0, 200.0, 0.5625, now),
            safety_field: Caster::safety_field(),
            emp: Caster::emp(),
            ledger: EffectLedger::new(),
        }
    }

    /// Regenerate energy and tick the Raven's own effects.
    pub fn update(&mut self, now: f64) {
        self.energy.advance(now);
        self.ledger.tick(now, &mut self.hp, self.max_hp);
    }

    pub fn cast_safety_field(&mut self, now: f64, target: &mut dyn EffectHost) -> bool {
        Self::cast_with_energy(&mut self.energy, &mut self.safety_field, now, &mut [target])
    }

    pub fn cast_emp(&mut self, now: f64, targets: &mut [&mut dyn EffectHost]) -> bool {
        Self::cast_with_energy(&mut self.energy, &mut self.emp, now, targets)
    }

    fn cast_with_energy(
        energy: &mut EnergyPool,
        caster: &mut Caster,
        now: f64,
        targets: &mut [&mut dyn EffectHost],
    ) -> bool {
        energy.advance(now);
        if !energy.has(caster.energy_cost) {
            tracing::debug!(
                kind = %caster.kind,
                energy = energy.current,
                cost = caster.energy_cost,
                "cast refused: not enough energy"
            );
            return false;
        }
        if !caster.cast(now, targets) {
            return false;
        }
        energy.try_spend(caster.energy_cost)
    }

    pub fn ledger(&self) -> &EffectLedger {
        &self.ledger
    }
}

impl EffectHost for Raven {
    fn ledger_mut(&mut self) -> &mut EffectLedger {
        &mut self.ledger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cooldown_gate_blocks_second_cast() {
        let mut caster = Caster::safety_field();
        let mut a = EffectLedger::new();
        assert!(caster.cast(50.0, &mut [&mut a]));
        assert!((caster.last_cast_time() - 50.0).abs() < 1e-9);
        assert!(!caster.cast(94.0, &mut [&mut a]));
        assert!((caster.last_cast_time() - 50.0).abs() < 1e-9);
        assert_eq!(a.len(), 1);
        assert!(caster.cast(95.0, &mut [&mut a]));
        // the first field ended at 60 and is dropped when the second lands
        assert_eq!(a.len(), 1);
    }

    #[test]
    fn first_cast_waits_for_cooldown_from_zero() {
        let caster = Caster::emp();
        assert!(!caster.can_cast(29.9));
        assert!(caster.can_cast(30.0));
        assert!((caster.cooldown_remaining(10.0) - 20.0).abs() < 1e-9);
    }

    #[test]
    fn emp_hits_every_target_or_none() {
        let mut caster = Caster::emp();
        let mut a = EffectLedger::new();
        let mut b = EffectLedger::new();
        assert!(!caster.cast(10.0, &mut [&mut a, &mut b]));
        assert!(a.is_empty() && b.is_empty());
        assert!(caster.cast(30.0, &mut [&mut a, &mut b]));
        assert!(a.has_active(EffectKind::Emp, 31.0));
        assert!(b.has_active(EffectKind::Emp, 31.0));
        assert!(!b.has_active(EffectKind::Emp, 38.0));
    }

    #[test]
    fn energy_regenerates_and_caps() {
        let mut pool = EnergyPool::new(50.0, 200.0, 0.5625, 0.0);
        pool.advance(100.0);
        assert!((pool.current - 106.25).abs() < 1e-9);
        pool.advance(50.0);
        assert!((pool.current - 106.25).abs() < 1e-9);
        pool.advance(10_000.0);
        assert!((pool.current - 200.0).abs() < 1e-9);
        assert!(pool.try_spend(75.0));
        assert!(!pool.try_spend(200.0));
    }

    #[test]
    fn raven_needs_energy_and_cooldown() {
        let mut raven = Raven::new(0.0);
        let mut target = EffectLedger::new();
        // 50 energy at t=0; 75 is reached at t=44.44
        assert!(!raven.cast_safety_field(44.0, &mut target));
        assert!(target.is_empty());
        assert!(raven.cast_safety_field(50.0, &mut target));
        assert!((raven.energy.current - (50.0 + 0.5625 * 50.0 - 75.0)).abs() < 1e-9);
        assert!((target.bonuses(51.0).damage - 5.0).abs() < 1e-9);
    }

    #[test]
    fn raven_refused_cast_spends_nothing() {
        let mut raven = Raven::new(0.0);
        raven.update(200.0);
        let before = raven.energy.current;
        let mut target = EffectLedger::new();
        assert!(raven.cast_emp(200.0, &mut [&mut target]));
        assert!(!raven.cast_emp(210.0, &mut [&mut target]));
        assert!((raven.energy.current - (before - 100.0 + 0.5625 * 10.0)).abs() < 1e-9);
    }
}
