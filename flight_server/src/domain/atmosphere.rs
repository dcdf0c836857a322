// International Standard Atmosphere (ISA) up to 86 km.

/// Gravitational acceleration at sea level in m/s^2.
pub const G0: f64 = 9.80665;
/// Specific gas constant for dry air in J/(kg*K).
pub const R_AIR: f64 = 287.052_87;
/// Heat capacity ratio for air.
pub const GAMMA: f64 = 1.4;

pub const SEA_LEVEL_TEMPERATURE: f64 = 288.15;
pub const SEA_LEVEL_PRESSURE: f64 = 101_325.0;
pub const SEA_LEVEL_DENSITY: f64 = SEA_LEVEL_PRESSURE / (R_AIR * SEA_LEVEL_TEMPERATURE);

/// Upper bound of the modeled atmosphere in meters.
pub const MAX_ALTITUDE: f64 = 86_000.0;

// Below this magnitude a layer is treated as isothermal.
const ISOTHERMAL_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy)]
struct Layer {
    base_altitude: f64,
    lapse_rate: f64, // K/m
    base_temperature: f64,
}

const LAYERS: [Layer; 7] = [
    // Troposphere
    Layer { base_altitude: 0.0, lapse_rate: -0.0065, base_temperature: 288.15 },
    // Tropopause
    Layer { base_altitude: 11_000.0, lapse_rate: 0.0, base_temperature: 216.65 },
    // Stratosphere
    Layer { base_altitude: 20_000.0, lapse_rate: 0.001, base_temperature: 216.65 },
    Layer { base_altitude: 32_000.0, lapse_rate: 0.0028, base_temperature: 228.65 },
    // Stratopause
    Layer { base_altitude: 47_000.0, lapse_rate: 0.0, base_temperature: 270.65 },
    // Mesosphere
    Layer { base_altitude: 51_000.0, lapse_rate: -0.0028, base_temperature: 270.65 },
    Layer { base_altitude: 71_000.0, lapse_rate: -0.002, base_temperature: 214.65 },
];

/// Air properties at a given geometric altitude.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AtmosphereState {
    /// Altitude the state was evaluated at, after clamping (m).
    pub altitude: f64,
    /// Static temperature (K).
    pub temperature: f64,
    /// Static pressure (Pa).
    pub pressure: f64,
    /// Air density (kg/m^3).
    pub density: f64,
    /// Local speed of sound (m/s).
    pub speed_of_sound: f64,
    /// T / T0
    pub temperature_ratio: f64,
    /// P / P0
    pub pressure_ratio: f64,
    /// rho / rho0
    pub density_ratio: f64,
}

/// Evaluates the ISA at `altitude` meters. Out-of-range input is clamped to
/// `[0, MAX_ALTITUDE]`.
pub fn at_altitude(altitude: f64) -> AtmosphereState {
    let altitude = if altitude.is_nan() {
        0.0
    } else {
        altitude.clamp(0.0, MAX_ALTITUDE)
    };

    let mut temperature = SEA_LEVEL_TEMPERATURE;
    let mut pressure = SEA_LEVEL_PRESSURE;

    for (i, layer) in LAYERS.iter().enumerate() {
        let top = LAYERS
            .get(i + 1)
            .map_or(MAX_ALTITUDE, |next| next.base_altitude);
        let dh = altitude.min(top) - layer.base_altitude;

        temperature = layer.base_temperature + layer.lapse_rate * dh;
        if layer.lapse_rate.abs() < ISOTHERMAL_EPSILON {
            pressure *= (-G0 * dh / (R_AIR * layer.base_temperature)).exp();
        } else {
            pressure *= (temperature / layer.base_temperature).powf(-G0 / (layer.lapse_rate * R_AIR));
        }

        if altitude <= top {
            break;
        }
    }

    let density = pressure / (R_AIR * temperature);
    AtmosphereState {
        altitude,
        temperature,
        pressure,
        density,
        speed_of_sound: (GAMMA * R_AIR * temperature).sqrt(),
        temperature_ratio: temperature / SEA_LEVEL_TEMPERATURE,
        pressure_ratio: pressure / SEA_LEVEL_PRESSURE,
        density_ratio: density / SEA_LEVEL_DENSITY,
    }
}

pub fn tas_to_ias(tas: f64, altitude: f64) -> f64 {
    tas * at_altitude(altitude).density_ratio.sqrt()
}

pub fn ias_to_tas(ias: f64, altitude: f64) -> f64 {
    ias / at_altitude(altitude).density_ratio.sqrt()
}

pub fn tas_to_mach(tas: f64, altitude: f64) -> f64 {
    tas / at_altitude(altitude).speed_of_sound
}

pub fn mach_to_tas(mach: f64, altitude: f64) -> f64 {
    mach * at_altitude(altitude).speed_of_sound
}

/// Altitude at which the standard atmosphere has the given static pressure.
pub fn pressure_altitude(pressure: f64) -> f64 {
    invert_monotonic(pressure, |state| state.pressure)
}

/// Altitude at which the standard atmosphere has the given density.
pub fn density_altitude(density: f64) -> f64 {
    invert_monotonic(density, |state| state.density)
}

// Pressure and density both strictly decrease with altitude, so bisection
// over the modeled range converges on the unique altitude.
fn invert_monotonic(target: f64, value: impl Fn(&AtmosphereState) -> f64) -> f64 {
    let (mut low, mut high) = (0.0, MAX_ALTITUDE);
    if target >= value(&at_altitude(low)) {
        return low;
    }
    if target <= value(&at_altitude(high)) {
        return high;
    }
    for _ in 0..64 {
        let mid = 0.5 * (low + high);
        if value(&at_altitude(mid)) > target {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}
