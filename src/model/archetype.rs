//! Archetypes as data: each unit kind maps to its base stats, weapon table and rank gates.

use super::{RankGates, TargetType, WeaponCatalog, WeaponId, WeaponStat};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Archetype {
    Ghost,
    Marine,
}

/// Static description of an archetype. Everything a fresh unit profile starts from.
#[derive(Debug, Clone, PartialEq)]
pub struct ArchetypeSpec {
    pub archetype: Archetype,
    pub hp: f64,
    pub armor: f64,
    pub armor_type: TargetType,
    pub movement_speed: f64,
    pub max_rank: u8,
    pub base_weapon: WeaponId,
    pub catalog: WeaponCatalog,
    pub gates: RankGates,
}

impl Archetype {
    pub const ALL: [Archetype; 2] = [Archetype::Ghost, Archetype::Marine];

    pub fn id(self) -> &'static str {
        match self {
            Archetype::Ghost => "ghost",
            Archetype::Marine => "marine",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Archetype::Ghost => "格式塔零渗透者",
            Archetype::Marine => "格式塔零先驱者",
        }
    }

    pub fn spec(self) -> ArchetypeSpec {
        match self {
            Archetype::Ghost => ghost(),
            Archetype::Marine => marine(),
        }
    }
}

impl fmt::Display for Archetype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Archetype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = crate::util::normalize_id(s);
        Archetype::ALL
            .into_iter()
            .find(|a| a.id() == key || a.display_name() == key)
            .ok_or_else(|| format!("unknown archetype: {}", s))
    }
}

fn ghost() -> ArchetypeSpec {
    use WeaponId::*;
    let catalog = WeaponCatalog::new()
        .with(TacticalRifle, WeaponStat::new(12.0, 0.8, 9.0))
        .with(
            Shotgun,
            WeaponStat::new(23.0, 1.75, 4.5)
                .with_bonus(TargetType::Light, 31.0)
                .with_splash(1.5),
        )
        .with(
            AlphaRifle,
            WeaponStat::new(30.0, 2.5, 13.0).with_bonus(TargetType::Biological, 60.0),
        )
        .with(
            FissionRifle,
            WeaponStat::new(12.0, 0.7, 8.0)
                .fixed_damage()
                .with_armor_reduction(4.0),
        )
        .with(
            Deathwatch,
            WeaponStat::new(50.0, 3.0, 17.0).with_bonus(TargetType::Heroic, 110.0),
        )
        .with(
            Hellfire,
            WeaponStat::new(60.0, 1.0, 9.0)
                .with_bonus(TargetType::Mechanical, 100.0)
                .ground_only(),
        );
    let gates = RankGates::new(TacticalRifle)
        .unlock_at(1, &[Shotgun])
        .unlock_at(2, &[AlphaRifle, FissionRifle])
        .unlock_at(3, &[Deathwatch, Hellfire]);
    ArchetypeSpec {
        archetype: Archetype::Ghost,
        hp: 100.0,
        armor: 0.0,
        armor_type: TargetType::Light,
        movement_speed: 2.25,
        max_rank: 3,
        base_weapon: TacticalRifle,
        catalog,
        gates,
    }
}

fn marine() -> ArchetypeSpec {
    use WeaponId::*;
    let catalog = WeaponCatalog::new()
        .with(AssaultRifle, WeaponStat::new(14.0, 0.7, 7.0))
        .with(
            MissileRifle,
            WeaponStat::new(20.0, 1.4, 10.0).with_bonus(TargetType::Heavy, 45.0),
        )
        .with(StormRifle, WeaponStat::new(7.0, 0.2, 6.0).with_shots(2))
        .with(
            Flamethrower,
            WeaponStat::new(6.0, 0.2, 5.0)
                .with_bonus(TargetType::Light, 9.0)
                .with_splash(2.0)
                .ground_only(),
        )
        .with(
            Punisher,
            WeaponStat::new(35.0, 1.0, 6.0).with_bonus(TargetType::Light, 50.0),
        )
        .with(
            HeavyLaser,
            WeaponStat::new(80.0, 2.5, 10.0).with_bonus(TargetType::Heavy, 110.0),
        );
    let gates = RankGates::new(AssaultRifle)
        .unlock_at(1, &[MissileRifle])
        .unlock_at(2, &[StormRifle, Flamethrower])
        .unlock_at(3, &[Punisher, HeavyLaser]);
    ArchetypeSpec {
        archetype: Archetype::Marine,
        hp: 125.0,
        armor: 1.0,
        armor_type: TargetType::Light,
        movement_speed: 2.25,
        max_rank: 3,
        base_weapon: AssaultRifle,
        catalog,
        gates,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_gated_weapon_is_in_catalog() {
        for a in Archetype::ALL {
            let spec = a.spec();
            let all = spec.gates.unlocked(spec.max_rank);
            assert_eq!(all.len(), spec.catalog.len(), "{}", a);
            for w in all {
                assert!(spec.catalog.contains(w), "{} missing {}", a, w);
            }
            assert_eq!(spec.gates.unlocked(1)[0], spec.base_weapon);
        }
    }

    #[test]
    fn fission_rifle_is_fixed_with_shred() {
        let spec = Archetype::Ghost.spec();
        let w = spec.catalog.get(WeaponId::FissionRifle).unwrap();
        assert!(w.is_fixed());
        assert!((w.armor_reduction - 4.0).abs() < 1e-9);
    }

    #[test]
    fn archetype_from_str() {
        assert_eq!("Ghost".parse::<Archetype>(), Ok(Archetype::Ghost));
        assert!("zergling".parse::<Archetype>().is_err());
    }
}
