//! Unit tests for nasch-core primitives.

#[cfg(test)]
mod cell {
    use crate::Cell;

    #[test]
    fn empty_sentinel() {
        assert!(Cell::EMPTY.is_empty());
        assert_eq!(Cell::EMPTY.velocity(), None);
        assert_eq!(Cell::default(), Cell::EMPTY);
    }

    #[test]
    fn car_velocity() {
        let c = Cell::car(0);
        assert!(c.is_occupied());
        assert_eq!(c.velocity(), Some(0));
        assert_eq!(Cell::from(Some(4)).velocity(), Some(4));
        assert_eq!(Cell::from(None), Cell::EMPTY);
    }

    #[test]
    fn debug_format() {
        assert_eq!(format!("{:?}", Cell::EMPTY), ".");
        assert_eq!(format!("{:?}", Cell::car(3)), "3");
    }
}

#[cfg(test)]
mod config {
    use crate::{CoreError, RunConfig};

    #[test]
    fn defaults_applied() {
        let c = RunConfig::new(100, 0.3, 10, 4);
        assert_eq!(c.v_max, 5);
        assert_eq!(c.p_slowdown, 0.3);
        assert_eq!(c.num_cars(), 30);
        assert!(c.validate().is_ok());
    }

    #[test]
    fn num_cars_floors() {
        assert_eq!(RunConfig::new(10, 0.15, 1, 1).num_cars(), 1);
        assert_eq!(RunConfig::new(10, 0.05, 1, 1).num_cars(), 0);
    }

    #[test]
    fn rejects_more_units_than_cells() {
        let err = RunConfig::new(3, 0.5, 1, 4).validate().unwrap_err();
        assert!(matches!(err, CoreError::Partition { road_length: 3, num_units: 4 }));
    }

    #[test]
    fn rejects_bad_parameters() {
        assert!(RunConfig::new(0, 0.5, 1, 1).validate().is_err());
        assert!(RunConfig::new(10, 0.5, 1, 0).validate().is_err());
        assert!(RunConfig::new(10, 1.5, 1, 1).validate().is_err());
        assert!(RunConfig::new(10, f64::NAN, 1, 1).validate().is_err());
        assert!(RunConfig::new(10, 0.5, 1, 1).with_p_slowdown(-0.1).validate().is_err());
        assert!(RunConfig::new(10, 0.5, 1, 1).with_v_max(0).validate().is_err());
        assert!(RunConfig::new(10, 0.5, 1, 1).with_v_max(255).validate().is_err());
    }
}

#[cfg(test)]
mod road {
    use crate::{Road, RunConfig, SimRng};

    #[test]
    fn random_places_exact_car_count() {
        let cfg = RunConfig::new(1_000, 0.3, 1, 1);
        let road = Road::random(&cfg, &mut SimRng::new(7));
        assert_eq!(road.len(), 1_000);
        assert_eq!(road.occupied_count(), 300);
        assert!(road.cars().all(|(_, v)| v <= cfg.v_max));
    }

    #[test]
    fn random_is_seed_deterministic() {
        let cfg = RunConfig::new(200, 0.5, 1, 1);
        let a = Road::random(&cfg, &mut SimRng::new(1));
        let b = Road::random(&cfg, &mut SimRng::new(1));
        assert_eq!(a, b);
    }

    #[test]
    fn full_density_fills_every_cell() {
        let cfg = RunConfig::new(50, 1.0, 1, 1);
        let road = Road::random(&cfg, &mut SimRng::new(3));
        assert_eq!(road.occupied_count(), 50);
    }

    #[test]
    fn mean_velocity() {
        let road = Road::from_velocities(&[Some(1), None, Some(3), None]);
        assert_eq!(road.mean_velocity(), Some(2.0));
        assert_eq!(Road::empty(4).mean_velocity(), None);
    }

    #[test]
    fn check_rejects_wrong_length_and_speed() {
        let road = Road::from_velocities(&[Some(6), None]);
        assert!(road.check(3, 5).is_err());
        assert!(road.check(2, 5).is_err());
        assert!(road.check(2, 6).is_ok());
    }
}

#[cfg(test)]
mod rule {
    use crate::rule::{evaluate, gap_ahead};
    use crate::{Move, Road, RuleParams, UnitId, UnitRng};

    const DET: RuleParams = RuleParams { v_max: 5, p_slowdown: 0.0 };

    fn rng() -> UnitRng {
        UnitRng::new(42, UnitId(0))
    }

    fn road_with(len: usize, cars: &[(usize, u8)]) -> Road {
        let mut v = vec![None; len];
        for &(i, vel) in cars {
            v[i] = Some(vel);
        }
        Road::from_velocities(&v)
    }

    #[test]
    fn single_car_wraps_scenario() {
        let road = road_with(10, &[(0, 2)]);
        let m = evaluate(&road, 0, DET, &mut rng()).unwrap();
        assert_eq!(m, Move { source: 0, destination: 3, velocity: 3 });
    }

    #[test]
    fn empty_cell_yields_nothing() {
        let road = road_with(10, &[(0, 2)]);
        assert!(evaluate(&road, 5, DET, &mut rng()).is_none());
    }

    #[test]
    fn gap_stops_at_next_car() {
        let road = road_with(20, &[(2, 0), (5, 0)]);
        assert_eq!(gap_ahead(&road, 2, 5), 3);
    }

    #[test]
    fn gap_caps_beyond_v_max() {
        let road = road_with(100, &[(0, 0), (50, 0)]);
        assert_eq!(gap_ahead(&road, 0, 5), 7);
    }

    #[test]
    fn gap_wraps_around_end() {
        let road = road_with(10, &[(8, 0), (1, 0)]);
        assert_eq!(gap_ahead(&road, 8, 5), 3);
    }

    #[test]
    fn blocked_car_stops() {
        let road = road_with(10, &[(3, 4), (4, 0)]);
        let m = evaluate(&road, 3, DET, &mut rng()).unwrap();
        assert_eq!(m.velocity, 0);
        assert_eq!(m.destination, 3);
    }

    #[test]
    fn braking_to_gap() {
        let road = road_with(10, &[(0, 5), (3, 1)]);
        let m = evaluate(&road, 0, DET, &mut rng()).unwrap();
        assert_eq!(m.velocity, 2);
        assert_eq!(m.destination, 2);
    }

    #[test]
    fn acceleration_capped_at_v_max() {
        let road = road_with(50, &[(0, 5)]);
        let m = evaluate(&road, 0, DET, &mut rng()).unwrap();
        assert_eq!(m.velocity, 5);
    }

    #[test]
    fn certain_slowdown_subtracts_one() {
        let params = RuleParams { v_max: 5, p_slowdown: 1.0 };
        let road = road_with(50, &[(10, 2)]);
        let m = evaluate(&road, 10, params, &mut rng()).unwrap();
        assert_eq!(m.velocity, 2);
        assert_eq!(m.destination, 12);
    }

    #[test]
    fn single_cell_road_stays_put() {
        let road = road_with(1, &[(0, 3)]);
        let m = evaluate(&road, 0, DET, &mut rng()).unwrap();
        assert_eq!(m, Move { source: 0, destination: 0, velocity: 0 });
    }
}

#[cfg(test)]
mod segment {
    use crate::{CoreError, UnitId, partition};

    #[test]
    fn last_segment_absorbs_remainder() {
        let segs = partition(10, 3).unwrap();
        let bounds: Vec<_> = segs.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(bounds, [(0, 3), (3, 6), (6, 10)]);
        assert_eq!(segs[2].owner, UnitId(2));
    }

    #[test]
    fn coverage_exactly_once() {
        for len in 1..=40 {
            for n in 1..=len {
                let segs = partition(len, n).unwrap();
                assert_eq!(segs.len(), n);
                let mut hits = vec![0u32; len];
                for s in &segs {
                    assert!(!s.is_empty(), "len={len} n={n}: empty segment {s:?}");
                    for i in s.indices() {
                        hits[i] += 1;
                    }
                }
                assert!(hits.iter().all(|&h| h == 1), "len={len} n={n}: {hits:?}");
            }
        }
    }

    #[test]
    fn rejects_zero_and_oversized_unit_counts() {
        assert!(matches!(partition(5, 0), Err(CoreError::Partition { .. })));
        assert!(matches!(partition(5, 6), Err(CoreError::Partition { .. })));
    }

    #[test]
    fn contains() {
        let s = partition(10, 2).unwrap()[1];
        assert!(s.contains(5));
        assert!(s.contains(9));
        assert!(!s.contains(4));
    }
}

#[cfg(test)]
mod update {
    use crate::rule::gap_ahead;
    use crate::{
        CoreError, PartialUpdate, Road, RunConfig, SimRng, UnitId, UnitRng, compute_segment,
        merge, partition,
    };

    /// Advance `road` one step with `num_units` units, each with its own RNG.
    fn step(road: &Road, cfg: &RunConfig, rngs: &mut [UnitRng]) -> Road {
        let segs = partition(road.len(), rngs.len()).unwrap();
        let updates: Vec<_> = segs
            .iter()
            .zip(rngs.iter_mut())
            .map(|(s, rng)| compute_segment(road, s, cfg.rule_params(), rng))
            .collect();
        let merged = merge(road.len(), cfg.v_max, &updates).unwrap();
        assert_eq!(merged.collisions, 0);
        merged.road
    }

    #[test]
    fn scenario_partial_update() {
        let road = Road::from_velocities(&[
            Some(2), None, None, None, None, None, None, None, None, None,
        ]);
        let seg = partition(10, 1).unwrap()[0];
        let params = RunConfig::new(10, 0.1, 1, 1).with_p_slowdown(0.0).rule_params();
        let update = compute_segment(&road, &seg, params, &mut UnitRng::new(0, UnitId(0)));
        assert_eq!(update.iter().collect::<Vec<_>>(), [(3, 3)]);
    }

    #[test]
    fn conservation_and_bounds_over_many_steps() {
        for seed in 0..8 {
            for &density in &[0.1, 0.3, 0.5, 0.9] {
                let cfg = RunConfig::new(257, density, 50, 4).with_seed(seed);
                let mut road = Road::random(&cfg, &mut SimRng::new(seed));
                let cars = road.occupied_count();
                let mut rngs: Vec<_> = (0..4).map(|k| UnitRng::new(seed, UnitId(k))).collect();
                for _ in 0..cfg.sim_steps {
                    road = step(&road, &cfg, &mut rngs);
                    assert_eq!(road.occupied_count(), cars);
                    assert!(road.cars().all(|(_, v)| v <= cfg.v_max));
                }
            }
        }
    }

    #[test]
    fn moves_never_overtake_next_car() {
        let cfg = RunConfig::new(300, 0.4, 1, 3).with_seed(9);
        let mut sim_rng = SimRng::new(9);
        let mut road = Road::random(&cfg, &mut sim_rng);
        let mut rngs: Vec<_> = (0..3).map(|k| UnitRng::new(9, UnitId(k))).collect();
        for _ in 0..30 {
            let segs = partition(road.len(), 3).unwrap();
            for (s, rng) in segs.iter().zip(rngs.iter_mut()) {
                for i in s.indices() {
                    if let Some(m) = crate::rule::evaluate(&road, i, cfg.rule_params(), rng) {
                        let gap = gap_ahead(&road, i, cfg.v_max);
                        assert!((m.velocity as usize) < gap, "car {i} overtook: {m:?} gap {gap}");
                    }
                }
            }
            road = step(&road, &cfg, &mut rngs);
        }
    }

    #[test]
    fn unit_count_does_not_change_deterministic_step() {
        let cfg = RunConfig::new(120, 0.35, 1, 1).with_p_slowdown(0.0);
        let road = Road::random(&cfg, &mut SimRng::new(5));
        let one = step(&road, &cfg, &mut [UnitRng::new(0, UnitId(0))]);
        let mut many: Vec<_> = (0..7).map(|k| UnitRng::new(0, UnitId(k))).collect();
        assert_eq!(one, step(&road, &cfg, &mut many));
    }

    #[test]
    fn merge_last_write_wins_and_counts() {
        let mut a = PartialUpdate::new(UnitId(0));
        a.insert(2, 1);
        let mut b = PartialUpdate::new(UnitId(1));
        b.insert(2, 4);
        b.insert(0, 0);
        let merged = merge(5, 5, [&a, &b]).unwrap();
        assert_eq!(merged.collisions, 1);
        assert_eq!(merged.road.get(2).velocity(), Some(4));
        assert_eq!(merged.road.occupied_count(), 2);
    }

    #[test]
    fn same_unit_overwrite_counted() {
        let mut a = PartialUpdate::new(UnitId(0));
        assert_eq!(a.insert(3, 1), None);
        assert_eq!(a.insert(3, 2), Some(1));
        assert_eq!(a.overwrites(), 1);
        assert_eq!(a.len(), 1);

        let merged = merge(5, 5, [&a]).unwrap();
        assert_eq!(merged.collisions, 1);
        assert_eq!(merged.road.get(3).velocity(), Some(2));
        assert_eq!(merged.road.occupied_count(), 1);
    }

    #[test]
    fn merge_rejects_out_of_range() {
        let mut a = PartialUpdate::new(UnitId(0));
        a.insert(7, 1);
        assert!(matches!(
            merge(5, 5, [&a]),
            Err(CoreError::DestinationOutOfRange { destination: 7, road_length: 5 })
        ));
        let mut b = PartialUpdate::new(UnitId(0));
        b.insert(1, 9);
        assert!(matches!(merge(5, 5, [&b]), Err(CoreError::VelocityOutOfRange { .. })));
    }
}
