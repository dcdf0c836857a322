// Phase-based point-mass flight model.
//
// Each phase has one transition function: it sets the controls for the tick,
// integrates the kinematics through `fly`, and returns the phase to be in
// afterwards. Transitions never move backwards.

use crate::domain::aerodynamics::{self, FlightCondition};
use crate::domain::atmosphere::{self, G0};
use crate::domain::catalog::{self, AircraftPerformanceProfile};
use crate::domain::geo::{self, METERS_PER_FOOT, METERS_PER_NM};
use crate::domain::state::{FlightPhase, FlightState};
use chrono::{DateTime, Utc};

// Takeoff.
const ROLLING_FRICTION: f64 = 0.02;
const MAX_GROUND_ACCELERATION: f64 = 4.0;
const ROTATION_SPEED_FACTOR: f64 = 0.9 * 1.2;
const MAX_TAKEOFF_PITCH: f64 = 8.6;
const PITCH_RATE: f64 = 3.0;
const INITIAL_CLIMB_RATE: f64 = 2000.0 * METERS_PER_FOOT / 60.0;
const CLIMB_HANDOFF_ALTITUDE: f64 = 1500.0 * METERS_PER_FOOT;

// Climb and cruise.
const CLIMB_SPEED_FACTOR: f64 = 0.9;
const CLIMB_THROTTLE: f64 = 0.95;
const MAX_CLIMB_GRADIENT: f64 = 0.15;
const CEILING_TAPER_FRACTION: f64 = 0.2;
const CRUISE_CAPTURE_FRACTION: f64 = 0.98;
const MIN_CRUISE_THROTTLE: f64 = 0.3;
const MAX_CRUISE_THROTTLE: f64 = 0.9;
const ALTITUDE_HOLD_TIME: f64 = 10.0;
const SHORT_ROUTE_ALTITUDE: f64 = 8000.0;

// Descent, approach and landing.
const DESCENT_THROTTLE: f64 = 0.1;
const DESCENT_SPEED_FACTOR: f64 = 1.5;
const GLIDE_PATH_ANGLE: f64 = 3.0;
const GLIDE_PATH_CAPTURE_TIME: f64 = 20.0;
const APPROACH_ALTITUDE: f64 = 3000.0 * METERS_PER_FOOT;
const APPROACH_DISTANCE: f64 = 50.0 * METERS_PER_NM;
const APPROACH_THROTTLE: f64 = 0.25;
const APPROACH_SPEED_FACTOR: f64 = 1.3;
const APPROACH_SPEED_MARGIN: f64 = 5.0;
const LANDING_ALTITUDE: f64 = 200.0 * METERS_PER_FOOT;
const FLARE_MAX_SINK: f64 = 2.0;
const FLARE_MIN_SINK: f64 = 0.5;
const ROLLOUT_DECELERATION: f64 = 3.0;

// Speed and heading control.
const SPEED_CHANGE_RATE: f64 = 1.5;
const MAX_TURN_RATE: f64 = 3.0;
const MAX_BANK_ANGLE: f64 = 25.0;
// Steering is dropped this close to the destination so the aircraft does not
// chase a bearing that flips once the airport passes underneath.
const STEERING_CUTOFF: f64 = 1000.0;
const MIN_FLYING_SPEED: f64 = 1.0;

/// Phase before and after one call to [`advance`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickOutcome {
    pub from: FlightPhase,
    pub to: FlightPhase,
}

impl TickOutcome {
    pub fn transitioned(&self) -> bool {
        self.from != self.to
    }

    pub fn arrived(&self) -> bool {
        self.transitioned() && self.to == FlightPhase::Arrived
    }
}

/// Distance from the destination at which descent has to begin (3:1 rule:
/// 3 nm per 1000 ft to lose).
pub fn top_of_descent_distance(altitude: f64) -> f64 {
    altitude.max(0.0) / (1000.0 * METERS_PER_FOOT) * 3.0 * METERS_PER_NM
}

/// Cruise altitude picked from the route length.
pub fn cruise_altitude_for(profile: &AircraftPerformanceProfile, route_distance: f64) -> f64 {
    let nm = route_distance / METERS_PER_NM;
    if nm > 3000.0 {
        profile.cruise_altitude
    } else if nm > 1500.0 {
        profile.cruise_altitude * 0.95
    } else if nm > 500.0 {
        profile.cruise_altitude * 0.85
    } else {
        SHORT_ROUTE_ALTITUDE.min(profile.cruise_altitude)
    }
}

/// Advances `flight` by `dt` simulated seconds. `now` is the wall clock used
/// for the scheduled start and the landing timestamp.
pub fn advance(flight: &mut FlightState, dt: f64, now: DateTime<Utc>) -> TickOutcome {
    let from = flight.phase;
    if flight.is_arrived() || !dt.is_finite() || dt <= 0.0 {
        return TickOutcome { from, to: from };
    }

    let profile = catalog::lookup(flight.profile_key);
    let next = match from {
        FlightPhase::Preflight | FlightPhase::Taxi => preflight(flight, profile, now),
        FlightPhase::Takeoff => takeoff(flight, profile, dt),
        FlightPhase::Climb => climb(flight, profile, dt),
        FlightPhase::Cruise => cruise(flight, profile, dt),
        FlightPhase::Descent => descent(flight, profile, dt),
        FlightPhase::Approach => approach(flight, profile, dt),
        FlightPhase::Landing => landing(flight, profile, dt, now),
        FlightPhase::Arrived => FlightPhase::Arrived,
    };

    if from > FlightPhase::Taxi {
        flight.flight_time += dt;
        flight.stats.record(
            flight.altitude,
            flight.tas,
            flight.mach,
            flight.vertical_speed,
            flight.fuel_flow,
        );
    }
    flight.time_in_phase += dt;

    flight.enter_phase(next);
    if flight.is_arrived() {
        settle_at_gate(flight);
    }
    flight.clamp_invariants();

    TickOutcome {
        from,
        to: flight.phase,
    }
}

fn preflight(flight: &mut FlightState, profile: &AircraftPerformanceProfile, now: DateTime<Utc>) -> FlightPhase {
    if !flight.fuel_loaded {
        flight.fuel_remaining = profile.departure_fuel();
        flight.gross_weight = profile.empty_weight + flight.fuel_remaining;
        flight.fuel_loaded = true;
    }

    flight.total_distance = geo::distance(flight.origin.position(), flight.destination.position());
    flight.distance_remaining = flight.total_distance;
    flight.target_altitude = cruise_altitude_for(profile, flight.total_distance);
    flight.target_speed = atmosphere::mach_to_tas(profile.cruise_mach, flight.target_altitude);
    flight.target_heading = geo::bearing(flight.position(), flight.destination.position());
    flight.heading = flight.target_heading;

    if now >= flight.scheduled_start {
        FlightPhase::Takeoff
    } else {
        FlightPhase::Preflight
    }
}

fn takeoff(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64) -> FlightPhase {
    flight.throttle = 1.0;
    let mass = flight.gross_weight.max(1.0);
    let weight = mass * G0;
    let forces = forces_for(flight, profile, true);
    let rotation_speed = ROTATION_SPEED_FACTOR * profile.stall_speed_landing;
    let on_ground = flight.altitude <= 0.0 && flight.tas < rotation_speed;

    if on_ground {
        let rolling = ROLLING_FRICTION * (weight - forces.lift).max(0.0);
        let accel = ((forces.thrust - forces.drag - rolling) / mass).clamp(0.0, MAX_GROUND_ACCELERATION);
        flight.tas += accel * dt;
        flight.vertical_speed = 0.0;
        flight.pitch = 0.0;
        flight.aoa = 0.0;
    } else {
        flight.pitch = (flight.pitch + PITCH_RATE * dt).min(MAX_TAKEOFF_PITCH);
        flight.vertical_speed = INITIAL_CLIMB_RATE;
        let gamma = flight_path_angle(flight.vertical_speed, flight.tas);
        let accel = ((forces.thrust - forces.drag - weight * gamma.sin()) / mass).clamp(0.0, MAX_GROUND_ACCELERATION);
        flight.tas = approach_value(flight.tas, climb_speed(flight, profile), accel * dt);
        flight.aoa = level_flight_aoa(flight, profile);
    }

    fly(flight, profile, dt, !on_ground, true);

    if flight.altitude >= CLIMB_HANDOFF_ALTITUDE {
        FlightPhase::Climb
    } else {
        FlightPhase::Takeoff
    }
}

fn climb(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64) -> FlightPhase {
    flight.throttle = CLIMB_THROTTLE;
    let speed = climb_speed(flight, profile);
    flight.tas = approach_value(flight.tas, speed, SPEED_CHANGE_RATE * dt);

    let capability = aerodynamics::max_climb_rate(profile, flight.gross_weight, flight.tas, flight.altitude)
        .min(profile.max_climb_rate);
    let taper = ((profile.service_ceiling - flight.altitude) / (CEILING_TAPER_FRACTION * profile.service_ceiling))
        .clamp(0.0, 1.0);
    let to_target = (flight.target_altitude - flight.altitude).max(0.0) / dt;
    flight.vertical_speed = (capability * taper).min(to_target);

    flight.pitch = climb_pitch(flight.vertical_speed, flight.tas);
    flight.aoa = level_flight_aoa(flight, profile);

    fly(flight, profile, dt, true, false);

    if flight.distance_remaining <= top_of_descent_distance(flight.altitude) {
        FlightPhase::Descent
    } else if flight.altitude >= CRUISE_CAPTURE_FRACTION * flight.target_altitude {
        FlightPhase::Cruise
    } else {
        FlightPhase::Climb
    }
}

fn cruise(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64) -> FlightPhase {
    flight.tas = approach_value(flight.tas, flight.target_speed, SPEED_CHANGE_RATE * dt);

    let error = flight.target_altitude - flight.altitude;
    flight.vertical_speed =
        (error / ALTITUDE_HOLD_TIME.max(dt)).clamp(-profile.max_descent_rate, profile.max_climb_rate);
    flight.pitch = climb_pitch(flight.vertical_speed, flight.tas);
    flight.aoa = level_flight_aoa(flight, profile);

    // Throttle solved so available thrust matches the drag to overcome.
    let required = forces_for(flight, profile, false).drag;
    let available = aerodynamics::available_thrust(profile, flight.altitude);
    flight.throttle = if available > 0.0 {
        (required / available).clamp(MIN_CRUISE_THROTTLE, MAX_CRUISE_THROTTLE)
    } else {
        MAX_CRUISE_THROTTLE
    };

    fly(flight, profile, dt, true, false);

    if flight.distance_remaining <= top_of_descent_distance(flight.altitude) {
        FlightPhase::Descent
    } else {
        FlightPhase::Cruise
    }
}

fn descent(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64) -> FlightPhase {
    flight.throttle = DESCENT_THROTTLE;
    let speed = DESCENT_SPEED_FACTOR * profile.stall_speed_landing;
    flight.tas = approach_value(flight.tas, speed, SPEED_CHANGE_RATE * dt);

    let sink = (flight.tas * GLIDE_PATH_ANGLE.to_radians().sin()).min(profile.max_descent_rate);
    flight.vertical_speed = -sink;
    flight.pitch = climb_pitch(flight.vertical_speed, flight.tas);
    flight.aoa = level_flight_aoa(flight, profile);

    fly(flight, profile, dt, true, false);

    if flight.altitude <= APPROACH_ALTITUDE || flight.distance_remaining <= APPROACH_DISTANCE {
        FlightPhase::Approach
    } else {
        FlightPhase::Descent
    }
}

fn approach(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64) -> FlightPhase {
    flight.throttle = APPROACH_THROTTLE;
    let speed = APPROACH_SPEED_FACTOR * profile.stall_speed_clean + APPROACH_SPEED_MARGIN;
    flight.tas = approach_value(flight.tas, speed, SPEED_CHANGE_RATE * dt);

    flight.vertical_speed = glide_path_vertical_speed(flight, profile, dt);
    flight.pitch = climb_pitch(flight.vertical_speed, flight.tas);
    flight.aoa = level_flight_aoa(flight, profile);

    fly(flight, profile, dt, true, true);

    if flight.altitude <= LANDING_ALTITUDE {
        FlightPhase::Landing
    } else {
        FlightPhase::Approach
    }
}

fn landing(
    flight: &mut FlightState,
    profile: &AircraftPerformanceProfile,
    dt: f64,
    now: DateTime<Utc>,
) -> FlightPhase {
    flight.throttle = 0.0;

    if flight.altitude > 0.0 {
        // Flare: keep sinking, but gently.
        flight.vertical_speed =
            glide_path_vertical_speed(flight, profile, dt).clamp(-FLARE_MAX_SINK, -FLARE_MIN_SINK);
        flight.pitch = climb_pitch(flight.vertical_speed, flight.tas);
        flight.aoa = level_flight_aoa(flight, profile);
        fly(flight, profile, dt, false, true);
        if flight.altitude <= 0.0 {
            flight.vertical_speed = 0.0;
            flight.pitch = 0.0;
        }
        return FlightPhase::Landing;
    }

    flight.tas = (flight.tas - ROLLOUT_DECELERATION * dt).max(0.0);
    flight.vertical_speed = 0.0;
    flight.pitch = 0.0;
    flight.aoa = 0.0;
    fly(flight, profile, dt, false, true);

    if flight.ground_speed <= 0.0 {
        flight.landed_at = Some(now);
        FlightPhase::Arrived
    } else {
        FlightPhase::Landing
    }
}

// Shared per-tick integration: heading, altitude, forces, fuel, position.
fn fly(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64, steer: bool, flaps: bool) {
    if steer && flight.distance_remaining > STEERING_CUTOFF {
        turn_towards_destination(flight, profile, dt);
    } else {
        flight.roll = 0.0;
    }

    flight.altitude = (flight.altitude + flight.vertical_speed * dt).max(0.0);
    let gamma = flight_path_angle(flight.vertical_speed, flight.tas);
    flight.ground_speed = flight.tas * gamma.cos();

    let forces = forces_for(flight, profile, flaps);
    flight.lift = forces.lift;
    flight.drag = forces.drag;
    flight.thrust = forces.thrust;
    flight.lift_to_drag = forces.lift_to_drag();
    flight.mach = forces.mach;
    flight.ias = forces.ias;
    flight.fuel_flow = if flight.fuel_remaining > 0.0 { forces.fuel_flow } else { 0.0 };

    let burned = (flight.fuel_flow * dt).min(flight.fuel_remaining);
    flight.fuel_remaining = (flight.fuel_remaining - burned).max(0.0);
    flight.fuel_consumed += burned;
    flight.gross_weight = profile.empty_weight + flight.fuel_remaining;

    let step = flight.ground_speed * dt;
    if step > 0.0 {
        let next = geo::destination(flight.position(), flight.heading, step);
        flight.lat = next.lat;
        flight.lon = next.lon;
        flight.distance_flown += step;
    }

    flight.distance_remaining = geo::distance(flight.position(), flight.destination.position());
    flight.progress = if flight.total_distance > 0.0 {
        (1.0 - flight.distance_remaining / flight.total_distance).clamp(0.0, 1.0)
    } else {
        1.0
    };
}

fn turn_towards_destination(flight: &mut FlightState, profile: &AircraftPerformanceProfile, dt: f64) {
    flight.target_heading = geo::bearing(flight.position(), flight.destination.position());
    let max_turn = MAX_TURN_RATE * dt;
    let turn = geo::heading_difference(flight.heading, flight.target_heading).clamp(-max_turn, max_turn);
    flight.heading = geo::normalize_heading(flight.heading + turn);

    let bank_limit = MAX_BANK_ANGLE.min(profile.max_bank_angle);
    let rate = (turn / dt).to_radians();
    flight.roll = aerodynamics::bank_angle(flight.tas, rate)
        .to_degrees()
        .clamp(-bank_limit, bank_limit);
}

fn glide_path_vertical_speed(flight: &FlightState, profile: &AircraftPerformanceProfile, dt: f64) -> f64 {
    let slope = GLIDE_PATH_ANGLE.to_radians().tan();
    let on_path = flight.distance_remaining * slope;
    let nominal = -flight.tas * slope;
    let correction = (on_path - flight.altitude) / GLIDE_PATH_CAPTURE_TIME.max(dt);
    (nominal + correction).clamp(-profile.max_descent_rate, 0.0)
}

fn forces_for(
    flight: &FlightState,
    profile: &AircraftPerformanceProfile,
    flaps: bool,
) -> aerodynamics::AeroForces {
    aerodynamics::compute_forces(
        profile,
        &FlightCondition {
            tas: flight.tas,
            altitude: flight.altitude,
            gross_weight: flight.gross_weight,
            aoa: flight.aoa.to_radians(),
            throttle: flight.throttle,
            flaps,
        },
    )
}

fn climb_speed(flight: &FlightState, profile: &AircraftPerformanceProfile) -> f64 {
    let best_range = aerodynamics::best_range_speed(profile, flight.gross_weight, flight.altitude);
    (CLIMB_SPEED_FACTOR * best_range).min(flight.target_speed.max(MIN_FLYING_SPEED))
}

fn level_flight_aoa(flight: &FlightState, profile: &AircraftPerformanceProfile) -> f64 {
    aerodynamics::level_flight_aoa(profile, flight.gross_weight, flight.tas, flight.altitude).to_degrees()
}

fn flight_path_angle(vertical_speed: f64, tas: f64) -> f64 {
    if tas < MIN_FLYING_SPEED {
        return 0.0;
    }
    (vertical_speed / tas).clamp(-1.0, 1.0).asin()
}

fn climb_pitch(vertical_speed: f64, tas: f64) -> f64 {
    if tas < MIN_FLYING_SPEED {
        return 0.0;
    }
    (vertical_speed / tas)
        .clamp(-MAX_CLIMB_GRADIENT, MAX_CLIMB_GRADIENT)
        .asin()
        .to_degrees()
}

fn approach_value(current: f64, target: f64, max_step: f64) -> f64 {
    current + (target - current).clamp(-max_step, max_step)
}

fn settle_at_gate(flight: &mut FlightState) {
    flight.tas = 0.0;
    flight.ias = 0.0;
    flight.ground_speed = 0.0;
    flight.mach = 0.0;
    flight.vertical_speed = 0.0;
    flight.throttle = 0.0;
    flight.thrust = 0.0;
    flight.lift = 0.0;
    flight.drag = 0.0;
    flight.lift_to_drag = 0.0;
    flight.fuel_flow = 0.0;
    flight.roll = 0.0;
    flight.distance_remaining = 0.0;
    flight.progress = 1.0;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::state::tests::{epoch, plan};
    use chrono::TimeDelta;

    // 50 ms real-time ticks at a 100x speed multiplier.
    const DT: f64 = 0.05 * 100.0;
    const MAX_TICKS: usize = 50_000;

    fn fly_to_arrival(flight: &mut FlightState) -> Vec<FlightPhase> {
        let mut phases = vec![flight.phase];
        let mut now = epoch();
        for _ in 0..MAX_TICKS {
            now += TimeDelta::milliseconds(50);
            let outcome = advance(flight, DT, now);
            assert!((0.0..=1.0).contains(&flight.progress), "progress {}", flight.progress);
            assert!((0.0..=1.0).contains(&flight.throttle));
            assert!(flight.altitude >= 0.0);
            assert!(flight.fuel_remaining >= 0.0);
            assert!(flight.lat.is_finite() && flight.lon.is_finite());
            if outcome.transitioned() {
                phases.push(outcome.to);
            }
            if flight.is_arrived() {
                break;
            }
        }
        phases
    }

    fn long_haul() -> FlightState {
        // 9,000 km east along the equator.
        let lon = (9_000_000.0 / geo::EARTH_RADIUS).to_degrees();
        FlightState::new(&plan("LH001", "Boeing 777-300ER", (0.0, lon), 0), epoch())
    }

    #[test]
    fn long_haul_flight_reaches_arrival() {
        let mut flight = long_haul();
        let route = flight.total_distance;
        assert!((route - 9_000_000.0).abs() < 1.0);

        let phases = fly_to_arrival(&mut flight);
        assert_eq!(flight.phase, FlightPhase::Arrived);
        assert_eq!(
            phases,
            vec![
                FlightPhase::Preflight,
                FlightPhase::Takeoff,
                FlightPhase::Climb,
                FlightPhase::Cruise,
                FlightPhase::Descent,
                FlightPhase::Approach,
                FlightPhase::Landing,
                FlightPhase::Arrived,
            ]
        );

        assert!(((flight.distance_flown - route) / route).abs() < 0.05, "flown {}", flight.distance_flown);
        assert!(flight.fuel_consumed > 0.0);
        let cruise = catalog::lookup("Boeing 777-300ER").cruise_altitude;
        assert!(((flight.stats.max_altitude - cruise) / cruise).abs() < 0.05);
        assert!(flight.landed_at.is_some());
        assert_eq!(flight.progress, 1.0);
        assert_eq!(flight.ground_speed, 0.0);
    }

    #[test]
    fn phase_sequence_never_moves_backwards() {
        let mut flight = FlightState::new(&plan("SH001", "A320", (3.0, 4.0), 0), epoch());
        let phases = fly_to_arrival(&mut flight);
        assert_eq!(flight.phase, FlightPhase::Arrived);
        assert!(phases.windows(2).all(|w| w[0] < w[1]), "{phases:?}");
        assert!(!phases.contains(&FlightPhase::Taxi));
    }

    #[test]
    fn waits_in_preflight_until_scheduled_start() {
        let mut flight = FlightState::new(&plan("WT001", "A320", (0.0, 10.0), 600), epoch());
        let outcome = advance(&mut flight, DT, epoch() + TimeDelta::seconds(599));
        assert_eq!(outcome.to, FlightPhase::Preflight);
        assert!(flight.fuel_loaded);
        let profile = catalog::lookup("A320");
        assert!((flight.fuel_remaining - profile.departure_fuel()).abs() < 1e-9);
        assert!((flight.gross_weight - (profile.empty_weight + profile.departure_fuel())).abs() < 1e-9);
        assert_eq!(flight.flight_time, 0.0);
        assert_eq!(flight.distance_flown, 0.0);

        let outcome = advance(&mut flight, DT, epoch() + TimeDelta::seconds(600));
        assert_eq!(outcome.to, FlightPhase::Takeoff);
    }

    #[test]
    fn cruise_altitude_depends_on_route_length() {
        let p = catalog::lookup("A320");
        let nm = METERS_PER_NM;
        assert_eq!(cruise_altitude_for(p, 3500.0 * nm), p.cruise_altitude);
        assert_eq!(cruise_altitude_for(p, 2000.0 * nm), 0.95 * p.cruise_altitude);
        assert_eq!(cruise_altitude_for(p, 800.0 * nm), 0.85 * p.cruise_altitude);
        assert_eq!(cruise_altitude_for(p, 200.0 * nm), SHORT_ROUTE_ALTITUDE);
    }

    #[test]
    fn top_of_descent_follows_three_to_one_rule() {
        // 35,000 ft -> 105 nm.
        let d = top_of_descent_distance(35_000.0 * METERS_PER_FOOT);
        assert!((d - 105.0 * METERS_PER_NM).abs() < 1e-6);
        assert_eq!(top_of_descent_distance(-10.0), 0.0);
    }

    #[test]
    fn takeoff_rolls_then_rotates_and_climbs() {
        let mut flight = FlightState::new(&plan("TO001", "A320", (0.0, 10.0), 0), epoch());
        advance(&mut flight, 1.0, epoch());
        assert_eq!(flight.phase, FlightPhase::Takeoff);

        advance(&mut flight, 1.0, epoch());
        assert_eq!(flight.throttle, 1.0);
        assert!(flight.tas > 0.0 && flight.tas <= MAX_GROUND_ACCELERATION);
        assert_eq!(flight.altitude, 0.0);

        for _ in 0..600 {
            advance(&mut flight, 1.0, epoch());
            if flight.phase != FlightPhase::Takeoff {
                break;
            }
            assert!(flight.pitch <= MAX_TAKEOFF_PITCH);
        }
        assert_eq!(flight.phase, FlightPhase::Climb);
        assert!(flight.altitude >= CLIMB_HANDOFF_ALTITUDE);
    }

    #[test]
    fn cruise_holds_altitude_and_throttle_band() {
        let mut flight = long_haul();
        let mut now = epoch();
        while flight.phase != FlightPhase::Cruise {
            now += TimeDelta::seconds(1);
            advance(&mut flight, DT, now);
        }
        for _ in 0..200 {
            advance(&mut flight, DT, now);
            assert!(flight.altitude <= flight.target_altitude + 1e-6);
            assert!((MIN_CRUISE_THROTTLE..=MAX_CRUISE_THROTTLE).contains(&flight.throttle));
        }
        assert!((flight.altitude - flight.target_altitude).abs() < 1.0);
        assert!((flight.tas - flight.target_speed).abs() < 1.0);
        assert!(flight.lift_to_drag > 10.0);
    }

    #[test]
    fn arrived_flights_are_frozen() {
        let mut flight = FlightState::new(&plan("SH002", "A320", (1.0, 2.0), 0), epoch());
        fly_to_arrival(&mut flight);
        let frozen = flight.clone();
        let outcome = advance(&mut flight, DT, epoch());
        assert!(!outcome.transitioned());
        assert_eq!(flight, frozen);
    }

    #[test]
    fn invalid_time_steps_are_ignored() {
        let mut flight = FlightState::new(&plan("DT001", "A320", (0.0, 10.0), 0), epoch());
        let before = flight.clone();
        advance(&mut flight, 0.0, epoch());
        advance(&mut flight, -1.0, epoch());
        advance(&mut flight, f64::NAN, epoch());
        assert_eq!(flight, before);
    }

    #[test]
    fn heading_turns_at_a_limited_rate_with_bounded_bank() {
        let mut flight = FlightState::new(&plan("HD001", "A320", (0.0, 10.0), 0), epoch());
        let mut now = epoch();
        while flight.phase < FlightPhase::Climb {
            now += TimeDelta::seconds(1);
            advance(&mut flight, 1.0, now);
        }
        // Point the aircraft away from the destination.
        flight.heading = 0.0;
        let before = flight.heading;
        advance(&mut flight, 1.0, now);
        assert!((geo::heading_difference(before, flight.heading) - MAX_TURN_RATE).abs() < 1e-9);
        assert!(flight.roll > 0.0 && flight.roll <= MAX_BANK_ANGLE);
    }
}
