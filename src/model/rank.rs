//! Rank/unlock policy: rank-gated weapon tiers and the rank haste interval rule.

use super::WeaponId;
use crate::config::{HASTE_INTERVAL_FLOOR_SECS, HASTE_RANK, RANK_HASTE_MULTIPLIER};
use serde::{Deserialize, Serialize};

/// Rank -> weapons unlocked at exactly that rank. Lookups accumulate every tier at or below the rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankGates {
    tiers: Vec<(u8, Vec<WeaponId>)>,
}

impl RankGates {
    /// `base` is always unlocked at rank 1.
    pub fn new(base: WeaponId) -> Self {
        Self {
            tiers: vec![(1, vec![base])],
        }
    }

    pub fn unlock_at(mut self, rank: u8, weapons: &[WeaponId]) -> Self {
        match self.tiers.iter_mut().find(|(r, _)| *r == rank) {
            Some((_, list)) => list.extend_from_slice(weapons),
            None => {
                self.tiers.push((rank, weapons.to_vec()));
                self.tiers.sort_by_key(|(r, _)| *r);
            }
        }
        self
    }

    /// Ordered weapons available at `rank`: lower tiers first, table order within a tier.
    pub fn unlocked(&self, rank: u8) -> Vec<WeaponId> {
        self.tiers
            .iter()
            .filter(|(r, _)| *r <= rank)
            .flat_map(|(_, list)| list.iter().copied())
            .collect()
    }

    pub fn is_unlocked(&self, rank: u8, weapon: WeaponId) -> bool {
        self.tiers
            .iter()
            .any(|(r, list)| *r <= rank && list.contains(&weapon))
    }

    /// Lowest rank at which `weapon` unlocks, if it is gated here at all.
    pub fn unlock_rank(&self, weapon: WeaponId) -> Option<u8> {
        self.tiers
            .iter()
            .find(|(_, list)| list.contains(&weapon))
            .map(|(r, _)| *r)
    }
}

/// Rank haste: intervals already at or below the floor are left alone, everything else is
/// compressed by the flat multiplier. Unconditional; see [`IntervalMode`] for gating by rank.
pub fn effective_interval(base_interval: f64) -> f64 {
    if base_interval <= HASTE_INTERVAL_FLOOR_SECS {
        return base_interval;
    }
    base_interval * RANK_HASTE_MULTIPLIER
}

/// Which attack interval a DPS calculation uses. Both raw and hasted call sites exist;
/// the caller picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntervalMode {
    /// Weapon interval as listed.
    Raw,
    /// Haste applied once the unit has reached the haste rank.
    #[default]
    RankGated,
    /// Haste applied regardless of rank.
    Hasted,
}

impl IntervalMode {
    pub fn interval(self, base_interval: f64, rank: u8) -> f64 {
        match self {
            IntervalMode::Raw => base_interval,
            IntervalMode::RankGated if rank >= HASTE_RANK => effective_interval(base_interval),
            IntervalMode::RankGated => base_interval,
            IntervalMode::Hasted => effective_interval(base_interval),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gates() -> RankGates {
        RankGates::new(WeaponId::TacticalRifle)
            .unlock_at(1, &[WeaponId::Shotgun])
            .unlock_at(3, &[WeaponId::Deathwatch, WeaponId::Hellfire])
            .unlock_at(2, &[WeaponId::AlphaRifle, WeaponId::FissionRifle])
    }

    #[test]
    fn unlocked_is_cumulative_and_ordered() {
        let g = gates();
        assert_eq!(
            g.unlocked(1),
            vec![WeaponId::TacticalRifle, WeaponId::Shotgun]
        );
        assert_eq!(
            g.unlocked(2),
            vec![
                WeaponId::TacticalRifle,
                WeaponId::Shotgun,
                WeaponId::AlphaRifle,
                WeaponId::FissionRifle
            ]
        );
        assert_eq!(g.unlocked(3).len(), 6);
        assert_eq!(g.unlock_rank(WeaponId::Hellfire), Some(3));
        assert_eq!(g.unlock_rank(WeaponId::HeavyLaser), None);
    }

    #[test]
    fn haste_respects_floor() {
        assert!((effective_interval(0.2) - 0.2).abs() < 1e-9);
        assert!((effective_interval(0.1) - 0.1).abs() < 1e-9);
        assert!((effective_interval(1.0) - 0.83).abs() < 1e-9);
        assert!((effective_interval(0.7) - 0.581).abs() < 1e-9);
    }

    #[test]
    fn interval_modes() {
        assert!((IntervalMode::Raw.interval(2.5, 3) - 2.5).abs() < 1e-9);
        assert!((IntervalMode::RankGated.interval(2.5, 2) - 2.5).abs() < 1e-9);
        assert!((IntervalMode::RankGated.interval(2.5, 3) - 2.075).abs() < 1e-9);
        assert!((IntervalMode::Hasted.interval(2.5, 1) - 2.075).abs() < 1e-9);
    }
}
