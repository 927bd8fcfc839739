//! Reference constants — Earth and Sun references, physical constants,
//! unit conversions, and the fixed coefficients of each index.
//!
//! Plain `f64` constants grouped by concern. Every formula in the crate
//! reads its numbers from here so the documented values live in one place.

/// Earth reference values used by the similarity indices.
pub mod earth {
    /// Radius in Earth radii.
    pub const RADIUS: f64 = 1.0;
    /// Mass in Earth masses.
    pub const MASS: f64 = 1.0;
    /// Bulk density in g/cm³.
    pub const DENSITY: f64 = 5.51;
    /// Equilibrium temperature in K.
    pub const EQUILIBRIUM_TEMP: f64 = 255.0;
}

/// Solar reference values and defaults for missing stellar data.
pub mod sun {
    /// Effective temperature used when a star's is unknown (K).
    pub const DEFAULT_TEFF: f64 = 5778.0;
    /// Stellar radius used when a star's is unknown (solar radii).
    pub const DEFAULT_RADIUS: f64 = 1.0;
    /// Solar radius in AU.
    pub const RADIUS_AU: f64 = 0.00465047;
    /// Solar mass in kg.
    pub const MASS_KG: f64 = 1.989e30;
}

/// Physical constants and unit conversions.
pub mod physics {
    /// Gravitational constant (m³ kg⁻¹ s⁻²).
    pub const G: f64 = 6.67430e-11;
    /// AU per metre.
    pub const AU_PER_METER: f64 = 6.68459e-12;
    /// Seconds per day.
    pub const SECONDS_PER_DAY: f64 = 86_400.0;
    /// Light-years per parsec.
    pub const LY_PER_PARSEC: f64 = 3.26156;
    /// Offset between Celsius and Kelvin.
    pub const CELSIUS_TO_KELVIN: f64 = 273.15;
}

/// Derivation engine coefficients.
pub mod derivation {
    /// Bond albedo assumed for equilibrium temperature.
    pub const ALBEDO: f64 = 0.3;
    /// Radius (Earth radii) separating the rocky and gaseous mass-radius laws.
    pub const ROCKY_RADIUS_LIMIT: f64 = 1.5;
    /// Mass-radius exponent below the rocky limit.
    pub const ROCKY_MASS_EXPONENT: f64 = 3.33;
    /// Mass-radius exponent at or above the rocky limit.
    pub const GASEOUS_MASS_EXPONENT: f64 = 2.0;
    /// Effective flux at the conservative inner habitable-zone edge.
    pub const HZ_INNER_FLUX: f64 = 1.1;
    /// Effective flux at the conservative outer habitable-zone edge.
    pub const HZ_OUTER_FLUX: f64 = 0.53;
    /// Optimistic inner edge as a fraction of the conservative inner edge.
    pub const HZ_OPTIMISTIC_INNER: f64 = 0.75;
    /// Optimistic outer edge as a multiple of the conservative outer edge.
    pub const HZ_OPTIMISTIC_OUTER: f64 = 1.25;
}

/// Travel-time scenarios as fractions of the speed of light.
pub mod travel {
    /// Current probe technology (~0.0057% c).
    pub const CURRENT_TECH: f64 = 0.000057;
    /// Twenty percent of light speed.
    pub const TWENTY_PERCENT: f64 = 0.20;
    /// Near light speed.
    pub const NEAR_LIGHT: f64 = 0.9999;
}

/// Index weight domains and defaults.
pub mod weights {
    /// Maximum (and default) ESI weight.
    pub const ESI_MAX: f64 = 1.0;
    /// Maximum (and default) PHI weight.
    pub const PHI_MAX: f64 = 0.25;
}

/// PHI rule scores.
pub mod phi {
    pub const SOLID_SURFACE: f64 = 0.8;
    pub const STABLE_ENERGY: f64 = 0.7;
    /// No automatic assessment of life-essential compounds exists.
    pub const LIFE_COMPOUNDS: f64 = 0.0;
    pub const STABLE_ORBIT: f64 = 0.9;
    /// Eccentricity below which an orbit counts as stable.
    pub const STABLE_ORBIT_MAX_ECC: f64 = 0.2;
    /// Inclusive stellar age window (Gyr) for stable energy.
    pub const STABLE_AGE_MIN: f64 = 1.0;
    pub const STABLE_AGE_MAX: f64 = 8.0;
}

/// SPH temperature bands (K).
pub mod sph {
    pub const OPTIMAL_MIN: f64 = 273.15;
    pub const OPTIMAL_MAX: f64 = 323.15;
    pub const MARGINAL_MIN: f64 = 250.0;
    pub const MARGINAL_MAX: f64 = 373.15;
    pub const OPTIMAL_BASE: f64 = 70.0;
    pub const OPTIMAL_SPAN: f64 = 30.0;
    pub const MARGINAL_SCORE: f64 = 40.0;
    pub const POOR_SCORE: f64 = 10.0;
}

/// Kopparapu effective-flux polynomial coefficients `(S_sun, a, b, c, d)`
/// used by SEPHI's liquid-water likelihood.
pub mod kopparapu {
    /// Reference temperature for the polynomial expansion (K).
    pub const T_REF: f64 = 5780.0;
    /// Recent Venus.
    pub const RECENT_VENUS: [f64; 5] = [1.766, 1.335e-4, 3.151e-9, -3.348e-12, 5.733e-16];
    /// Runaway greenhouse.
    pub const RUNAWAY_GREENHOUSE: [f64; 5] = [1.038, 1.246e-4, 2.874e-9, -3.06e-12, 5.279e-16];
    /// Maximum greenhouse.
    pub const MAXIMUM_GREENHOUSE: [f64; 5] = [0.3438, 5.894e-5, 1.628e-9, -1.698e-12, 2.92e-16];
    /// Early Mars.
    pub const EARLY_MARS: [f64; 5] = [0.3179, 5.451e-5, 1.526e-9, -1.598e-12, 2.747e-16];
    /// Inner edge scale applied to the recent-Venus distance.
    pub const INNER_SCALE: f64 = 0.68;
    /// Outer edge scale applied to the early-Mars distance.
    pub const OUTER_SCALE: f64 = 1.35;
}
