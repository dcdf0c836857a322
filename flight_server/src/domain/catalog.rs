// Aircraft performance catalog: static aerodynamic and mass data per type.

use serde::Serialize;

/// Immutable performance data for one aircraft type.
///
/// Masses are in kilograms, speeds in m/s, rates in m/s, altitudes in meters,
/// angles in degrees, thrust in newtons and TSFC in kg/(N*s).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AircraftPerformanceProfile {
    pub key: &'static str,
    pub wing_area: f64,
    pub wing_span: f64,
    pub empty_weight: f64,
    pub max_fuel_weight: f64,
    pub max_takeoff_weight: f64,
    pub max_landing_weight: f64,
    /// Zero-lift drag coefficient.
    pub cd0: f64,
    pub oswald_efficiency: f64,
    pub cl_max_clean: f64,
    pub cl_max_flaps: f64,
    pub max_thrust_sea_level: f64,
    /// Exponent applied to the density ratio for available thrust.
    pub thrust_lapse_rate: f64,
    pub tsfc: f64,
    pub service_ceiling: f64,
    pub cruise_altitude: f64,
    pub cruise_mach: f64,
    /// Clean stall speed (VS1).
    pub stall_speed_clean: f64,
    /// Landing configuration stall speed (VS0).
    pub stall_speed_landing: f64,
    pub max_climb_rate: f64,
    pub max_descent_rate: f64,
    pub max_bank_angle: f64,
    pub max_load_factor: f64,
}

impl AircraftPerformanceProfile {
    pub fn aspect_ratio(&self) -> f64 {
        self.wing_span * self.wing_span / self.wing_area
    }

    pub fn cl_max(&self, flaps: bool) -> f64 {
        if flaps {
            self.cl_max_flaps
        } else {
            self.cl_max_clean
        }
    }

    /// Initial fuel load carried by every departing flight.
    pub fn departure_fuel(&self) -> f64 {
        self.max_fuel_weight * DEPARTURE_FUEL_FRACTION
    }
}

const DEPARTURE_FUEL_FRACTION: f64 = 0.7;

/// Key of the profile used when no catalog entry matches.
pub const DEFAULT_PROFILE_KEY: &str = "Boeing 737-800";

static PROFILES: [AircraftPerformanceProfile; 10] = [
    AircraftPerformanceProfile {
        key: "Boeing 737-800",
        wing_area: 124.6,
        wing_span: 35.8,
        empty_weight: 41_413.0,
        max_fuel_weight: 20_894.0,
        max_takeoff_weight: 79_016.0,
        max_landing_weight: 66_361.0,
        cd0: 0.020,
        oswald_efficiency: 0.8,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.6,
        max_thrust_sea_level: 242_800.0,
        thrust_lapse_rate: 0.75,
        tsfc: 1.75e-5,
        service_ceiling: 12_497.0,
        cruise_altitude: 10_668.0,
        cruise_mach: 0.785,
        stall_speed_clean: 69.0,
        stall_speed_landing: 57.0,
        max_climb_rate: 15.0,
        max_descent_rate: 18.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Airbus A320",
        wing_area: 122.6,
        wing_span: 35.8,
        empty_weight: 42_600.0,
        max_fuel_weight: 18_730.0,
        max_takeoff_weight: 78_000.0,
        max_landing_weight: 66_000.0,
        cd0: 0.020,
        oswald_efficiency: 0.8,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.7,
        max_thrust_sea_level: 240_000.0,
        thrust_lapse_rate: 0.75,
        tsfc: 1.7e-5,
        service_ceiling: 12_131.0,
        cruise_altitude: 10_668.0,
        cruise_mach: 0.78,
        stall_speed_clean: 70.0,
        stall_speed_landing: 56.0,
        max_climb_rate: 15.0,
        max_descent_rate: 18.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Boeing 777-300ER",
        wing_area: 436.8,
        wing_span: 64.8,
        empty_weight: 167_800.0,
        max_fuel_weight: 145_538.0,
        max_takeoff_weight: 351_500.0,
        max_landing_weight: 251_290.0,
        cd0: 0.017,
        oswald_efficiency: 0.85,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.5,
        max_thrust_sea_level: 1_026_000.0,
        thrust_lapse_rate: 0.8,
        tsfc: 1.5e-5,
        service_ceiling: 13_137.0,
        cruise_altitude: 10_972.0,
        cruise_mach: 0.84,
        stall_speed_clean: 80.0,
        stall_speed_landing: 62.0,
        max_climb_rate: 13.0,
        max_descent_rate: 17.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Boeing 787-9",
        wing_area: 377.0,
        wing_span: 60.1,
        empty_weight: 128_850.0,
        max_fuel_weight: 101_456.0,
        max_takeoff_weight: 254_011.0,
        max_landing_weight: 192_777.0,
        cd0: 0.016,
        oswald_efficiency: 0.85,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.5,
        max_thrust_sea_level: 640_000.0,
        thrust_lapse_rate: 0.8,
        tsfc: 1.5e-5,
        service_ceiling: 13_137.0,
        cruise_altitude: 11_277.0,
        cruise_mach: 0.85,
        stall_speed_clean: 76.0,
        stall_speed_landing: 60.0,
        max_climb_rate: 14.0,
        max_descent_rate: 17.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Airbus A350-900",
        wing_area: 442.0,
        wing_span: 64.75,
        empty_weight: 142_400.0,
        max_fuel_weight: 110_523.0,
        max_takeoff_weight: 283_000.0,
        max_landing_weight: 207_000.0,
        cd0: 0.016,
        oswald_efficiency: 0.86,
        cl_max_clean: 1.6,
        cl_max_flaps: 2.6,
        max_thrust_sea_level: 748_000.0,
        thrust_lapse_rate: 0.8,
        tsfc: 1.45e-5,
        service_ceiling: 13_100.0,
        cruise_altitude: 11_277.0,
        cruise_mach: 0.85,
        stall_speed_clean: 74.0,
        stall_speed_landing: 59.0,
        max_climb_rate: 14.0,
        max_descent_rate: 17.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Airbus A330-300",
        wing_area: 361.6,
        wing_span: 60.3,
        empty_weight: 129_400.0,
        max_fuel_weight: 109_185.0,
        max_takeoff_weight: 242_000.0,
        max_landing_weight: 187_000.0,
        cd0: 0.018,
        oswald_efficiency: 0.83,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.5,
        max_thrust_sea_level: 632_000.0,
        thrust_lapse_rate: 0.8,
        tsfc: 1.6e-5,
        service_ceiling: 12_634.0,
        cruise_altitude: 11_277.0,
        cruise_mach: 0.82,
        stall_speed_clean: 75.0,
        stall_speed_landing: 60.0,
        max_climb_rate: 13.0,
        max_descent_rate: 17.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Airbus A380-800",
        wing_area: 845.0,
        wing_span: 79.75,
        empty_weight: 277_000.0,
        max_fuel_weight: 253_983.0,
        max_takeoff_weight: 575_000.0,
        max_landing_weight: 394_000.0,
        cd0: 0.018,
        oswald_efficiency: 0.85,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.4,
        max_thrust_sea_level: 1_328_000.0,
        thrust_lapse_rate: 0.8,
        tsfc: 1.6e-5,
        service_ceiling: 13_115.0,
        cruise_altitude: 10_972.0,
        cruise_mach: 0.85,
        stall_speed_clean: 78.0,
        stall_speed_landing: 63.0,
        max_climb_rate: 12.0,
        max_descent_rate: 16.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Boeing 747-400",
        wing_area: 525.0,
        wing_span: 64.4,
        empty_weight: 178_756.0,
        max_fuel_weight: 173_472.0,
        max_takeoff_weight: 396_890.0,
        max_landing_weight: 295_742.0,
        cd0: 0.019,
        oswald_efficiency: 0.8,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.5,
        max_thrust_sea_level: 1_008_000.0,
        thrust_lapse_rate: 0.8,
        tsfc: 1.7e-5,
        service_ceiling: 13_747.0,
        cruise_altitude: 10_668.0,
        cruise_mach: 0.85,
        stall_speed_clean: 80.0,
        stall_speed_landing: 64.0,
        max_climb_rate: 12.0,
        max_descent_rate: 16.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Embraer E190",
        wing_area: 92.5,
        wing_span: 28.7,
        empty_weight: 28_080.0,
        max_fuel_weight: 12_971.0,
        max_takeoff_weight: 51_800.0,
        max_landing_weight: 44_000.0,
        cd0: 0.022,
        oswald_efficiency: 0.8,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.5,
        max_thrust_sea_level: 178_000.0,
        thrust_lapse_rate: 0.75,
        tsfc: 1.85e-5,
        service_ceiling: 12_497.0,
        cruise_altitude: 10_668.0,
        cruise_mach: 0.78,
        stall_speed_clean: 64.0,
        stall_speed_landing: 52.0,
        max_climb_rate: 15.0,
        max_descent_rate: 18.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
    AircraftPerformanceProfile {
        key: "Bombardier CRJ900",
        wing_area: 70.6,
        wing_span: 24.9,
        empty_weight: 21_845.0,
        max_fuel_weight: 8_822.0,
        max_takeoff_weight: 38_330.0,
        max_landing_weight: 33_340.0,
        cd0: 0.023,
        oswald_efficiency: 0.8,
        cl_max_clean: 1.5,
        cl_max_flaps: 2.4,
        max_thrust_sea_level: 129_000.0,
        thrust_lapse_rate: 0.75,
        tsfc: 1.9e-5,
        service_ceiling: 12_497.0,
        cruise_altitude: 10_668.0,
        cruise_mach: 0.78,
        stall_speed_clean: 66.0,
        stall_speed_landing: 54.0,
        max_climb_rate: 15.0,
        max_descent_rate: 18.0,
        max_bank_angle: 30.0,
        max_load_factor: 2.5,
    },
];

/// Every profile in the catalog, in lookup order.
pub fn profiles() -> &'static [AircraftPerformanceProfile] {
    &PROFILES
}

pub fn default_profile() -> &'static AircraftPerformanceProfile {
    &PROFILES[0]
}

/// Resolves a model name to a profile.
///
/// Tries a case-insensitive exact match, then a substring match in either
/// direction, and finally falls back to [`default_profile`]. Never fails.
pub fn lookup(model: &str) -> &'static AircraftPerformanceProfile {
    find(model).unwrap_or_else(default_profile)
}

/// Like [`lookup`] but reports whether a catalog entry actually matched.
pub fn find(model: &str) -> Option<&'static AircraftPerformanceProfile> {
    let wanted = model.trim().to_lowercase();
    if wanted.is_empty() {
        return None;
    }

    PROFILES
        .iter()
        .find(|p| p.key.to_lowercase() == wanted)
        .or_else(|| {
            PROFILES.iter().find(|p| {
                let key = p.key.to_lowercase();
                key.contains(&wanted) || wanted.contains(&key)
            })
        })
}
