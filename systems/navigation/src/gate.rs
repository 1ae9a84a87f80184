//! Policy deciding whether removable terrain counts as passable this tick.

use burrow_core::{DigPolicy, Footprint, Locomotion};

/// Reports whether the agent may spend its action clearing terrain.
///
/// Digging needs a spare action, a pool above the reserve, no hostile in
/// sight and a host that hands out a terrain mutator. Wide agents never dig.
pub(crate) fn dig_allowed<L>(policy: &DigPolicy, host: &mut L) -> bool
where
    L: Locomotion + ?Sized,
{
    policy.enabled
        && host.footprint() == Footprint::Single
        && host.can_act()
        && host.resources() > policy.resource_reserve
        && host.sensed_hostiles() == 0
        && host.terrain_mutator().is_some()
}

#[cfg(test)]
mod tests {
    use burrow_core::{
        Footprint, GridSize, Heading, Locomotion, Position, Surroundings, TerrainMutator, Tile,
    };

    use super::*;

    struct Host {
        footprint: Footprint,
        can_act: bool,
        resources: u32,
        hostiles: u32,
        mutator: bool,
    }

    impl Default for Host {
        fn default() -> Self {
            Self {
                footprint: Footprint::Single,
                can_act: true,
                resources: 50,
                hostiles: 0,
                mutator: true,
            }
        }
    }

    impl Surroundings for Host {
        fn grid_size(&self) -> GridSize {
            GridSize::new(3, 3)
        }
        fn position(&self) -> Position {
            Position::new(1, 1)
        }
        fn heading(&self) -> Heading {
            Heading::North
        }
        fn footprint(&self) -> Footprint {
            self.footprint
        }
        fn can_act(&self) -> bool {
            self.can_act
        }
        fn can_move(&self) -> bool {
            true
        }
        fn tile(&self, _cell: Position) -> Option<Tile> {
            Some(Tile::Open)
        }
        fn is_occupied(&self, _cell: Position) -> bool {
            false
        }
        fn sensed_hostiles(&self) -> u32 {
            self.hostiles
        }
        fn resources(&self) -> u32 {
            self.resources
        }
    }

    impl Locomotion for Host {
        fn step(&mut self, _heading: Heading) -> bool {
            false
        }
        fn turn(&mut self, _heading: Heading) -> bool {
            false
        }
        fn terrain_mutator(&mut self) -> Option<&mut dyn TerrainMutator> {
            if self.mutator {
                Some(self)
            } else {
                None
            }
        }
    }

    impl TerrainMutator for Host {
        fn clear(&mut self, _cell: Position) -> bool {
            true
        }
    }

    #[test]
    fn every_condition_must_hold() {
        let policy = DigPolicy {
            resource_reserve: 20,
            ..DigPolicy::default()
        };
        assert!(dig_allowed(&policy, &mut Host::default()));

        let blocked = [
            Host {
                footprint: Footprint::Wide,
                ..Host::default()
            },
            Host {
                can_act: false,
                ..Host::default()
            },
            Host {
                resources: 20,
                ..Host::default()
            },
            Host {
                hostiles: 1,
                ..Host::default()
            },
            Host {
                mutator: false,
                ..Host::default()
            },
        ];
        for mut host in blocked {
            assert!(!dig_allowed(&policy, &mut host));
        }
    }

    #[test]
    fn disabled_policy_never_digs() {
        let policy = DigPolicy {
            enabled: false,
            ..DigPolicy::default()
        };
        assert!(!dig_allowed(&policy, &mut Host::default()));
    }
}
