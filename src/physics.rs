use crate::model::{ExperimentState, PhysicsModel, Rules, SUBLIMATION_ONSET_C};

/// Extended model integration step, in seconds of simulated time.
const EXTENDED_DT: f32 = 0.1;

/// Advances the experiment by one tick.
///
/// The previous state is never touched; the caller publishes the returned
/// record as a whole. Every derived value is clamped back into its domain
/// so float drift cannot break the bounds:
///
/// - `0 <= naphthalene_mass <= 100`
/// - `0 <= crystallization_level <= sublimation_level <= 100`
/// - `sublimation_level` and `crystallization_level` never decrease
pub(crate) fn step(prev: &ExperimentState, rules: &Rules) -> ExperimentState {
    let mut next = prev.clone();

    match rules.model {
        PhysicsModel::Simple => step_simple(prev, &mut next, rules),
        PhysicsModel::Extended => step_extended(prev, &mut next, rules),
    }

    clamp_domains(prev, &mut next, rules);
    next.experiment_time = prev.experiment_time.saturating_add(1);
    next
}

fn step_simple(prev: &ExperimentState, next: &mut ExperimentState, rules: &Rules) {
    let ambient = prev.ambient_temperature;

    next.temperature = if prev.heating_active {
        let heat_rate = (prev.flame_intensity as f32 / 100.0) * 0.8;
        (prev.temperature + heat_rate).min(rules.max_temp_c)
    } else {
        (prev.temperature - 0.02 * (prev.temperature - ambient)).max(ambient)
    };

    if next.temperature > SUBLIMATION_ONSET_C && prev.naphthalene_mass > 0.0 {
        let rate = ((next.temperature - SUBLIMATION_ONSET_C) * 0.015).max(0.0);
        sublimate(next, rate, rules);
    }

    if next.ice_added && next.sublimation_level > 0.0 {
        let rate = (next.sublimation_level * 0.025).min(2.0);
        deposit(next, rate);
    }
}

fn step_extended(prev: &ExperimentState, next: &mut ExperimentState, rules: &Rules) {
    let ambient = prev.ambient_temperature;
    let dt = EXTENDED_DT;

    next.temperature = if prev.heating_active {
        let heat_input = (prev.flame_intensity as f32 / 100.0) * 50.0;
        let heat_loss = 0.1 * (prev.temperature - ambient);
        (prev.temperature + (heat_input - heat_loss) * dt).min(rules.max_temp_c)
    } else {
        let cooling_rate = 0.05 * (prev.temperature - ambient);
        (prev.temperature - cooling_rate * dt).max(ambient)
    };

    if next.temperature > SUBLIMATION_ONSET_C && prev.naphthalene_mass > 0.0 {
        // Vapor pressure rises exponentially past the onset.
        let vapor_pressure = 0.001 * ((next.temperature - SUBLIMATION_ONSET_C) / 20.0).exp();
        let rate = vapor_pressure * (prev.pressure_hpa / 1013.25) * dt;
        let gained = sublimate(next, rate * 100.0, rules);
        next.vapor_density = (prev.vapor_density + gained * 0.5).min(1.0);
    }

    if next.ice_added && next.sublimation_level > 0.0 {
        let rate = 0.02 * (next.sublimation_level / 100.0) * dt * 100.0;
        deposit(next, rate);
    }

    next.heat_conduction =
        (prev.heat_conduction + (next.temperature - prev.temperature) * 0.01).clamp(0.0, 1.0);
}

/// Moves up to `gain` percent of the sample into vapor and returns what
/// actually moved. Limited by the remaining sample and by the 100% ceiling.
fn sublimate(next: &mut ExperimentState, gain: f32, rules: &Rules) -> f32 {
    let headroom = (100.0 - next.sublimation_level).max(0.0);
    let by_mass = next.naphthalene_mass.max(0.0) / rules.mass_per_sublimation;
    let gain = gain.min(headroom).min(by_mass).max(0.0);

    next.sublimation_level += gain;
    next.naphthalene_mass = (next.naphthalene_mass - gain * rules.mass_per_sublimation).max(0.0);
    gain
}

fn deposit(next: &mut ExperimentState, rate: f32) {
    next.crystallization_level =
        (next.crystallization_level + rate.max(0.0)).min(next.sublimation_level);
}

fn clamp_domains(prev: &ExperimentState, next: &mut ExperimentState, rules: &Rules) {
    next.temperature = next
        .temperature
        .clamp(next.ambient_temperature, rules.max_temp_c.max(next.ambient_temperature));
    next.naphthalene_mass = next.naphthalene_mass.clamp(0.0, 100.0);
    next.sublimation_level = next
        .sublimation_level
        .clamp(0.0, 100.0)
        .max(prev.sublimation_level);
    next.crystallization_level = next
        .crystallization_level
        .max(prev.crystallization_level)
        .clamp(0.0, next.sublimation_level);
    next.vapor_density = next.vapor_density.clamp(0.0, 1.0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn heating(model: PhysicsModel) -> (ExperimentState, Rules) {
        let mut st = ExperimentState::new();
        st.setup_complete = true;
        st.heating_active = true;
        (st, Rules::for_model(model))
    }

    fn run(st: &ExperimentState, rules: &Rules, ticks: usize) -> ExperimentState {
        let mut cur = st.clone();
        for _ in 0..ticks {
            cur = step(&cur, rules);
        }
        cur
    }

    #[test]
    fn simple_heating_is_linear_in_flame() {
        let (st, rules) = heating(PhysicsModel::Simple);
        let next = step(&st, &rules);
        assert_relative_eq!(next.temperature, 25.4, epsilon = 1e-4);
        assert_eq!(next.experiment_time, 1);
    }

    #[test]
    fn simple_heating_caps_at_max() {
        let (mut st, rules) = heating(PhysicsModel::Simple);
        st.flame_intensity = 100;
        let end = run(&st, &rules, 1000);
        assert_relative_eq!(end.temperature, 200.0);
    }

    #[test]
    fn extended_heating_caps_at_max() {
        let (mut st, rules) = heating(PhysicsModel::Extended);
        st.flame_intensity = 100;
        let end = run(&st, &rules, 5000);
        assert!(end.temperature <= 250.0);
        assert!(end.temperature > 200.0);
    }

    #[test]
    fn no_sublimation_at_or_below_onset() {
        let (mut st, rules) = heating(PhysicsModel::Simple);
        st.heating_active = false;
        st.temperature = 80.0;
        let end = run(&st, &rules, 500);
        assert_eq!(end.sublimation_level, 0.0);
        assert_eq!(end.naphthalene_mass, 100.0);
    }

    #[test]
    fn cooling_relaxes_to_ambient_but_not_below() {
        for model in [PhysicsModel::Simple, PhysicsModel::Extended] {
            let mut st = ExperimentState::new();
            st.temperature = 150.0;
            let rules = Rules::for_model(model);
            let mut cur = st.clone();
            for _ in 0..20_000 {
                let next = step(&cur, &rules);
                assert!(next.temperature <= cur.temperature);
                assert!(next.temperature >= next.ambient_temperature);
                cur = next;
            }
            assert!(cur.temperature < 30.0);
        }
    }

    #[test]
    fn mass_and_sublimation_move_in_lockstep() {
        let (mut st, rules) = heating(PhysicsModel::Simple);
        st.temperature = 120.0;
        let next = step(&st, &rules);
        let gained = next.sublimation_level - st.sublimation_level;
        let lost = st.naphthalene_mass - next.naphthalene_mass;
        assert!(gained > 0.0);
        assert_relative_eq!(lost, gained * 0.8, epsilon = 1e-4);
    }

    #[test]
    fn empty_sample_stops_sublimation() {
        let (mut st, rules) = heating(PhysicsModel::Simple);
        st.temperature = 150.0;
        st.naphthalene_mass = 0.0;
        st.sublimation_level = 40.0;
        let end = run(&st, &rules, 50);
        assert_eq!(end.sublimation_level, 40.0);
        assert_eq!(end.naphthalene_mass, 0.0);
    }

    #[test]
    fn sublimation_gain_limited_by_remaining_mass() {
        let (mut st, rules) = heating(PhysicsModel::Simple);
        st.temperature = 200.0;
        st.naphthalene_mass = 0.4;
        st.sublimation_level = 70.0;
        let next = step(&st, &rules);
        assert_relative_eq!(next.sublimation_level, 70.5, epsilon = 1e-4);
        assert_eq!(next.naphthalene_mass, 0.0);
    }

    #[test]
    fn full_sublimation_is_terminal() {
        let (mut st, rules) = heating(PhysicsModel::Extended);
        st.temperature = 240.0;
        st.sublimation_level = 100.0;
        st.naphthalene_mass = 10.0;
        let end = run(&st, &rules, 100);
        assert_eq!(end.sublimation_level, 100.0);
        assert_eq!(end.naphthalene_mass, 10.0);
    }

    #[test]
    fn crystallization_needs_ice() {
        let (mut st, rules) = heating(PhysicsModel::Simple);
        st.sublimation_level = 20.0;
        let end = run(&st, &rules, 50);
        assert_eq!(end.crystallization_level, 0.0);
    }

    #[test]
    fn crystallization_bounded_by_sublimation() {
        for model in [PhysicsModel::Simple, PhysicsModel::Extended] {
            let (mut st, rules) = heating(model);
            st.heating_active = false;
            st.sublimation_level = 12.0;
            st.ice_added = true;
            let mut cur = st.clone();
            for _ in 0..1000 {
                let next = step(&cur, &rules);
                assert!(next.crystallization_level >= cur.crystallization_level);
                assert!(next.crystallization_level <= next.sublimation_level);
                cur = next;
            }
            assert_relative_eq!(cur.crystallization_level, 12.0, epsilon = 1e-3);
        }
    }

    #[test]
    fn invariants_hold_over_long_run() {
        for model in [PhysicsModel::Simple, PhysicsModel::Extended] {
            let (mut st, rules) = heating(model);
            st.flame_intensity = 100;
            let mut cur = st.clone();
            for i in 0..6000 {
                if i == 1500 {
                    cur.ice_added = true;
                }
                if i == 4000 {
                    cur.heating_active = false;
                }
                let next = step(&cur, &rules);
                assert!((0.0..=100.0).contains(&next.sublimation_level));
                assert!((0.0..=100.0).contains(&next.naphthalene_mass));
                assert!(next.crystallization_level <= next.sublimation_level);
                assert!(next.sublimation_level >= cur.sublimation_level);
                assert!(next.crystallization_level >= cur.crystallization_level);
                assert!((0.0..=1.0).contains(&next.heat_conduction));
                assert!((0.0..=1.0).contains(&next.vapor_density));
                cur = next;
            }
        }
    }

    #[test]
    fn extended_vapor_density_tracks_sublimation() {
        let (mut st, rules) = heating(PhysicsModel::Extended);
        st.temperature = 160.0;
        let next = step(&st, &rules);
        assert!(next.sublimation_level > 0.0);
        assert_relative_eq!(next.vapor_density, next.sublimation_level * 0.5, epsilon = 1e-5);
    }
}
