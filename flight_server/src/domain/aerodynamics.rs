// Point-mass aerodynamic and propulsive forces.

use crate::domain::atmosphere::{self, G0};
use crate::domain::catalog::AircraftPerformanceProfile;
use serde::Serialize;
use std::f64::consts::PI;

// |AoA| beyond which separated-flow drag is added (rad).
const HIGH_AOA_THRESHOLD: f64 = 0.15;
const HIGH_AOA_DRAG_FACTOR: f64 = 2.0;
// Mach where wave drag starts to build.
const DRAG_DIVERGENCE_MACH: f64 = 0.75;
const WAVE_DRAG_FACTOR: f64 = 1.0;
const MAX_WAVE_DRAG: f64 = 0.02;
// Carson's speed as a multiple of minimum-drag speed.
const CARSON_FACTOR: f64 = 1.32;
// Below this speed turn geometry is undefined.
const MIN_TURN_SPEED: f64 = 1.0;

/// Instantaneous flight condition the forces are evaluated for.
#[derive(Debug, Clone, Copy)]
pub struct FlightCondition {
    /// True airspeed (m/s).
    pub tas: f64,
    /// Altitude (m).
    pub altitude: f64,
    /// Gross mass (kg).
    pub gross_weight: f64,
    /// Angle of attack (rad).
    pub aoa: f64,
    /// 0.0..=1.0
    pub throttle: f64,
    pub flaps: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct AeroForces {
    /// N
    pub lift: f64,
    /// N
    pub drag: f64,
    /// N
    pub thrust: f64,
    /// Pa
    pub dynamic_pressure: f64,
    pub lift_coefficient: f64,
    pub drag_coefficient: f64,
    /// kg/s
    pub fuel_flow: f64,
    pub mach: f64,
    pub tas: f64,
    pub ias: f64,
}

impl AeroForces {
    pub fn lift_to_drag(&self) -> f64 {
        if self.drag > 0.0 {
            self.lift / self.drag
        } else {
            0.0
        }
    }
}

pub fn dynamic_pressure(density: f64, tas: f64) -> f64 {
    0.5 * density * tas * tas
}

/// Thin-airfoil lift slope corrected for finite aspect ratio (per rad).
pub fn lift_curve_slope(profile: &AircraftPerformanceProfile) -> f64 {
    let ar = profile.aspect_ratio();
    2.0 * PI * ar / (ar + 2.0)
}

/// Induced drag factor `k` in `Cd = Cd0 + k * Cl^2`.
pub fn induced_drag_factor(profile: &AircraftPerformanceProfile) -> f64 {
    1.0 / (PI * profile.oswald_efficiency * profile.aspect_ratio())
}

pub fn lift_coefficient(profile: &AircraftPerformanceProfile, aoa: f64, flaps: bool) -> f64 {
    let cl_max = profile.cl_max(flaps);
    (lift_curve_slope(profile) * aoa).clamp(-cl_max, cl_max)
}

pub fn drag_coefficient(profile: &AircraftPerformanceProfile, cl: f64, aoa: f64, mach: f64) -> f64 {
    let mut cd = profile.cd0 + induced_drag_factor(profile) * cl * cl;

    let excess_aoa = aoa.abs() - HIGH_AOA_THRESHOLD;
    if excess_aoa > 0.0 {
        cd += HIGH_AOA_DRAG_FACTOR * excess_aoa * excess_aoa;
    }

    let excess_mach = mach - DRAG_DIVERGENCE_MACH;
    if excess_mach > 0.0 {
        cd += (WAVE_DRAG_FACTOR * excess_mach * excess_mach).min(MAX_WAVE_DRAG);
    }

    cd
}

/// Maximum thrust available at `altitude`, before throttle.
pub fn available_thrust(profile: &AircraftPerformanceProfile, altitude: f64) -> f64 {
    let sigma = atmosphere::at_altitude(altitude).density_ratio;
    profile.max_thrust_sea_level * sigma.powf(profile.thrust_lapse_rate)
}

pub fn compute_forces(profile: &AircraftPerformanceProfile, condition: &FlightCondition) -> AeroForces {
    let air = atmosphere::at_altitude(condition.altitude);
    let tas = condition.tas.max(0.0);
    let throttle = condition.throttle.clamp(0.0, 1.0);

    let q = dynamic_pressure(air.density, tas);
    let mach = tas / air.speed_of_sound;
    let cl = lift_coefficient(profile, condition.aoa, condition.flaps);
    let cd = drag_coefficient(profile, cl, condition.aoa, mach);
    let thrust = profile.max_thrust_sea_level * air.density_ratio.powf(profile.thrust_lapse_rate) * throttle;

    AeroForces {
        lift: q * profile.wing_area * cl,
        drag: q * profile.wing_area * cd,
        thrust,
        dynamic_pressure: q,
        lift_coefficient: cl,
        drag_coefficient: cd,
        fuel_flow: thrust * profile.tsfc,
        mach,
        tas,
        ias: tas * air.density_ratio.sqrt(),
    }
}

/// Angle of attack that produces lift equal to weight in level flight.
///
/// Returns 0 when there is no dynamic pressure, and saturates at the clean
/// `ClMax` when the required lift cannot be generated.
pub fn level_flight_aoa(profile: &AircraftPerformanceProfile, gross_weight: f64, tas: f64, altitude: f64) -> f64 {
    let q = dynamic_pressure(atmosphere::at_altitude(altitude).density, tas);
    if q <= f64::EPSILON {
        return 0.0;
    }
    let cl_required = (gross_weight * G0 / (q * profile.wing_area)).min(profile.cl_max_clean);
    cl_required / lift_curve_slope(profile)
}

/// `V = sqrt(2W / (rho * S * ClMax))` for the given mass (kg).
pub fn stall_speed(profile: &AircraftPerformanceProfile, gross_weight: f64, altitude: f64, flaps: bool) -> f64 {
    let rho = atmosphere::at_altitude(altitude).density;
    (2.0 * gross_weight * G0 / (rho * profile.wing_area * profile.cl_max(flaps))).sqrt()
}

/// Speed of maximum lift-to-drag ratio in level flight.
pub fn best_lift_to_drag_speed(profile: &AircraftPerformanceProfile, gross_weight: f64, altitude: f64) -> f64 {
    let rho = atmosphere::at_altitude(altitude).density;
    let k = induced_drag_factor(profile);
    (2.0 * gross_weight * G0 / (rho * profile.wing_area)).sqrt() * (k / profile.cd0).powf(0.25)
}

/// Practical best-range cruise speed for jets (Carson's speed).
pub fn best_range_speed(profile: &AircraftPerformanceProfile, gross_weight: f64, altitude: f64) -> f64 {
    CARSON_FACTOR * best_lift_to_drag_speed(profile, gross_weight, altitude)
}

/// Steady climb rate at full thrust from excess power, never negative.
pub fn max_climb_rate(profile: &AircraftPerformanceProfile, gross_weight: f64, tas: f64, altitude: f64) -> f64 {
    if tas <= 0.0 || gross_weight <= 0.0 {
        return 0.0;
    }
    let forces = compute_forces(
        profile,
        &FlightCondition {
            tas,
            altitude,
            gross_weight,
            aoa: level_flight_aoa(profile, gross_weight, tas, altitude),
            throttle: 1.0,
            flaps: false,
        },
    );
    ((forces.thrust - forces.drag) * tas / (gross_weight * G0)).max(0.0)
}

/// Turn rate (rad/s) for a coordinated turn at bank `bank` (rad).
pub fn turn_rate(tas: f64, bank: f64) -> f64 {
    if tas < MIN_TURN_SPEED {
        return 0.0;
    }
    G0 * bank.tan() / tas
}

/// Bank angle (rad) required for `turn_rate` (rad/s), from `tan(phi) = V*omega/g`.
pub fn bank_angle(tas: f64, turn_rate: f64) -> f64 {
    if tas < MIN_TURN_SPEED {
        return 0.0;
    }
    (tas * turn_rate / G0).atan()
}

pub fn load_factor(bank: f64) -> f64 {
    1.0 / bank.cos()
}
