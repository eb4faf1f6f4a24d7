/////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
// TESTS
//////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use crate::ReactorsIVP::CSTR::{
        DT, ParametersUpdate, ReactorModel, ReactorParameters, ReactorState, cstr_derivatives,
    };
    use crate::ReactorsIVP::reactor_error::ReactorError;
    use crate::ReactorsIVP::validation::PhysicalLimits;
    use approx::assert_relative_eq;
    use std::sync::Arc;

    fn reference_state() -> ReactorState {
        ReactorState::new(1.0, 0.5, 350.0, 300.0)
    }

    fn reference_parameters() -> ReactorParameters {
        ReactorParameters {
            F0: 1.0,
            CA0: 0.5,
            T0: 350.0,
            TJ0: 300.0,
            KV: 0.1,
            Vmin: 0.1,
            alpha: 1.0,
            E: 10000.0,
            R: 8.314,
            n: 2.0,
            rho: 1000.0,
            Cp: 4.18,
            lambda: 1.0,
            U: 100.0,
            AH: 1.0,
            rhoJ: 1000.0,
            CJ: 4.18,
            VJ: 0.1,
            FJ: 0.1,
        }
    }

    /// no reaction, outlet flow equal to the feed: V = Vmin + F0/KV
    fn balanced_no_reaction() -> (ReactorState, ReactorParameters) {
        let mut params = reference_parameters();
        params.alpha = 0.0;
        params.F0 = 1.0;
        params.KV = 0.5;
        params.Vmin = 0.5;
        let state = ReactorState::new(params.Vmin + params.F0 / params.KV, params.CA0, 350.0, 300.0);
        (state, params)
    }

    #[test]
    fn test_reference_scenario_initial_diagnostics() {
        let reactor = ReactorModel::new(reference_state(), reference_parameters());
        assert_relative_eq!(reactor.outlet_flow(), 0.09, epsilon = 1e-12);
        let f = reactor.derivatives();
        assert_relative_eq!(f[0], 0.91, epsilon = 1e-12);
        assert_relative_eq!(reactor.heat_removal_rate(), 5.0, epsilon = 1e-12);
        let k = 1.0 * (-10000.0_f64 / (8.314 * 350.0)).exp();
        assert_relative_eq!(reactor.rate_constant(), k, epsilon = 1e-15);
        assert_relative_eq!(reactor.reaction_rate(), k * 0.25, epsilon = 1e-15);
        assert_relative_eq!(reactor.residence_time(), 1.0 / 0.09, epsilon = 1e-9);
        assert_eq!(reactor.conversion(), 0.0);
    }

    #[test]
    fn test_reference_scenario_one_step() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        let state = reactor.step();
        // volume equation is linear: V(t) = Veq + (V0 - Veq)·exp(-KV·t), Veq = Vmin + F0/KV
        let v_eq = 0.1 + 1.0 / 0.1;
        let exact = v_eq + (1.0 - v_eq) * (-0.1_f64 * DT).exp();
        assert_relative_eq!(state.volume, exact, epsilon = 1e-9);
        // first-order estimate V0 + dt·dV/dt
        assert!((state.volume - 1.091).abs() < 1e-3);
        assert_eq!(state.time, DT);
        assert_eq!(reactor.get_state(), state);
    }

    #[test]
    fn test_trajectories_are_reproducible() {
        let mut a = ReactorModel::new(reference_state(), reference_parameters());
        let mut b = ReactorModel::new(reference_state(), reference_parameters());
        for _ in 0..500 {
            assert_eq!(a.step(), b.step());
        }
        assert_eq!(a.get_state().volume.to_bits(), b.get_state().volume.to_bits());
    }

    #[test]
    fn test_zero_reaction_steady_state() {
        let (state, params) = balanced_no_reaction();
        let mut reactor = ReactorModel::new(state, params);
        assert_relative_eq!(reactor.outlet_flow(), params.F0, epsilon = 1e-14);
        for _ in 0..1000 {
            reactor.step();
        }
        let end = reactor.get_state();
        assert_relative_eq!(end.volume, state.volume, epsilon = 1e-12);
        assert_relative_eq!(end.concentration, state.concentration, epsilon = 1e-12);
    }

    /// one-step error of the volume equation against its closed form
    fn volume_local_error(dt: f64) -> f64 {
        let mut params = reference_parameters();
        params.alpha = 0.0;
        params.KV = 1.0;
        params.F0 = 0.5;
        params.Vmin = 0.2;
        let v0 = 3.0;
        let v_eq = params.Vmin + params.F0 / params.KV;
        let mut reactor = ReactorModel::with_time_step(ReactorState::new(v0, 0.5, 350.0, 300.0), params, dt);
        let v1 = reactor.step().volume;
        let exact = v_eq + (v0 - v_eq) * (-params.KV * dt).exp();
        (v1 - exact).abs()
    }

    #[test]
    fn test_rk4_local_error_is_fifth_order() {
        let e1 = volume_local_error(0.4);
        let e2 = volume_local_error(0.2);
        let e3 = volume_local_error(0.1);
        let ratio1 = e1 / e2;
        let ratio2 = e2 / e3;
        // O(dt^5): halving the step divides the error by ~32
        assert!(ratio1 > 28.0 && ratio1 < 36.0, "ratio {}", ratio1);
        assert!(ratio2 > 28.0 && ratio2 < 36.0, "ratio {}", ratio2);
    }

    #[test]
    fn test_time_accumulates_by_repeated_addition() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        let mut expected = reference_state().time;
        for _ in 0..1234 {
            reactor.step();
            expected += DT;
        }
        assert_eq!(reactor.get_state().time, expected);
    }

    #[test]
    fn test_conversion_bounds() {
        let params = reference_parameters();
        for i in 0..=10 {
            let ca = params.CA0 * i as f64 / 10.0;
            let reactor = ReactorModel::new(ReactorState::new(1.0, ca, 350.0, 300.0), params);
            let x = reactor.conversion();
            assert!((0.0..=100.0).contains(&x), "conversion {}", x);
        }
        let reactor = ReactorModel::new(ReactorState::new(1.0, 0.0, 350.0, 300.0), params);
        assert_relative_eq!(reactor.conversion(), 100.0);

        let mut no_feed = params;
        no_feed.CA0 = 0.0;
        let reactor = ReactorModel::new(ReactorState::new(1.0, 0.3, 350.0, 300.0), no_feed);
        assert_eq!(reactor.conversion(), 0.0);
    }

    #[test]
    fn test_residence_time_zero_for_non_positive_flow() {
        let params = reference_parameters();
        let at_vmin = ReactorModel::new(ReactorState::new(params.Vmin, 0.5, 350.0, 300.0), params);
        assert_eq!(at_vmin.residence_time(), 0.0);
        let below = ReactorModel::new(ReactorState::new(0.05, 0.5, 350.0, 300.0), params);
        assert!(below.outlet_flow() < 0.0);
        assert_eq!(below.residence_time(), 0.0);
    }

    #[test]
    fn test_update_parameters_keeps_state() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        reactor.step();
        let before = reactor.get_state();
        let update = ParametersUpdate {
            FJ: Some(0.5),
            TJ0: Some(290.0),
            ..Default::default()
        };
        reactor.update_parameters(&update);
        assert_eq!(reactor.get_state(), before);

        let merged = reactor.get_parameters();
        assert_eq!(merged.FJ, 0.5);
        assert_eq!(merged.TJ0, 290.0);
        assert_eq!(merged.F0, reference_parameters().F0);
        assert_eq!(merged.alpha, reference_parameters().alpha);

        // the next step uses the new parameters
        let mut expected = ReactorModel::new(before, reference_parameters().merged(&update));
        assert_eq!(reactor.step(), expected.step());
    }

    #[test]
    fn test_empty_update_is_identity() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        let update = ParametersUpdate::default();
        assert!(update.is_empty());
        reactor.update_parameters(&update);
        assert_eq!(reactor.get_parameters(), reference_parameters());
    }

    #[test]
    fn test_update_by_name() {
        let mut update = ParametersUpdate::default();
        update.set("U", 250.0).unwrap();
        update.set("n", 1.5).unwrap();
        assert_eq!(update.U, Some(250.0));
        assert_eq!(update.n, Some(1.5));
        assert!(matches!(
            update.set("unknown", 1.0),
            Err(ReactorError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_set_parameters_wholesale() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        let mut other = reference_parameters();
        other.U = 0.0;
        reactor.set_parameters(other);
        assert_eq!(reactor.get_parameters(), other);
        assert_relative_eq!(reactor.heat_removal_rate(), 0.0);
    }

    #[test]
    fn test_returned_state_is_a_copy() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        let mut returned = reactor.step();
        returned.volume = -42.0;
        returned.time = 1e9;
        assert_eq!(returned.volume, -42.0);
        assert_ne!(reactor.get_state(), returned);
        assert!(reactor.get_state().volume > 0.0);
        assert_eq!(reactor.get_state().time, DT);

        let mut initial = reference_state();
        let reactor = ReactorModel::new(initial, reference_parameters());
        initial.temperature = 0.0;
        assert_ne!(reactor.get_state(), initial);
        assert_eq!(reactor.get_state().temperature, 350.0);
    }

    #[test]
    fn test_derivatives_match_free_function() {
        let reactor = ReactorModel::new(reference_state(), reference_parameters());
        let f = cstr_derivatives(&reference_state().as_vector(), &reference_parameters());
        assert_eq!(reactor.derivatives(), f);
        // jacket is heated by the warmer reactor and cooled by the coolant inflow at TJ0 = TJ
        let p = reference_parameters();
        let expected_dtj = p.U * p.AH * (350.0 - 300.0) / (p.rhoJ * p.CJ * p.VJ);
        assert_relative_eq!(f[3], expected_dtj, epsilon = 1e-12);
    }

    #[test]
    fn test_exothermic_reaction_heats_reactor() {
        // F = F0 and T = T0, no jacket: only the reaction term is left in dT/dt
        let (state, mut params) = balanced_no_reaction();
        params.U = 0.0;
        let reactor = ReactorModel::new(state, params);
        assert_eq!(reactor.derivatives()[2], 0.0);

        // λ < 0 releases heat through the -λ·V·r term
        params.lambda = -5.0e5;
        params.alpha = 1.0e6;
        let reactor = ReactorModel::new(state, params);
        assert!(reactor.derivatives()[2] > 0.0);
    }

    #[test]
    fn test_zero_volume_propagates_non_finite() {
        let state = ReactorState::new(0.0, 0.5, 350.0, 300.0);
        let mut reactor = ReactorModel::new(state, reference_parameters());
        let next = reactor.step();
        assert!(!next.concentration.is_finite() || !next.temperature.is_finite());
        assert_eq!(next.time, DT);
    }

    #[test]
    fn test_negative_concentration_fractional_order_is_nan() {
        let mut params = reference_parameters();
        params.n = 1.5;
        let mut reactor = ReactorModel::new(ReactorState::new(1.0, -0.1, 350.0, 300.0), params);
        assert!(reactor.reaction_rate().is_nan());
        let next = reactor.step();
        assert!(next.concentration.is_nan());
    }

    #[test]
    fn test_try_step_without_validator_equals_step() {
        let mut a = ReactorModel::new(reference_state(), reference_parameters());
        let mut b = ReactorModel::new(reference_state(), reference_parameters());
        assert!(!a.has_validator());
        for _ in 0..10 {
            assert_eq!(a.try_step().unwrap(), b.step());
        }
    }

    #[test]
    fn test_try_step_rejects_without_committing() {
        let state = ReactorState::new(0.0, 0.5, 350.0, 300.0);
        let mut reactor = ReactorModel::new(state, reference_parameters());
        reactor.set_validator(Some(Arc::new(PhysicalLimits::default())));
        let result = reactor.try_step();
        assert!(result.is_err());
        assert!(result.unwrap_err().is_alarm());
        assert_eq!(reactor.get_state(), state);

        // plain step still goes through
        reactor.step();
        assert_eq!(reactor.get_state().time, DT);
    }

    #[test]
    fn test_try_step_accepts_valid_states() {
        let mut reactor = ReactorModel::new(reference_state(), reference_parameters());
        reactor.set_validator(Some(Arc::new(PhysicalLimits::strict())));
        for _ in 0..100 {
            reactor.try_step().unwrap();
        }
        assert_relative_eq!(reactor.get_state().time, 100.0 * DT, epsilon = 1e-9);
        reactor.set_validator(None);
        assert!(!reactor.has_validator());
    }

    #[test]
    fn test_independent_instances_in_threads() {
        let params = reference_parameters();
        let results: Vec<ReactorState> = std::thread::scope(|s| {
            let handles: Vec<_> = [300.0, 320.0, 340.0]
                .iter()
                .map(|&tj0| {
                    s.spawn(move || {
                        let mut p = params;
                        p.TJ0 = tj0;
                        let mut reactor = ReactorModel::new(reference_state(), p);
                        for _ in 0..100 {
                            reactor.step();
                        }
                        reactor.get_state()
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let mut serial = reference_parameters();
        serial.TJ0 = 320.0;
        let mut reactor = ReactorModel::new(reference_state(), serial);
        for _ in 0..100 {
            reactor.step();
        }
        assert_eq!(results[1], reactor.get_state());
        assert!(results[0].jacket_temperature < results[2].jacket_temperature);
    }
}
