//! Configuration loading and typed config structures for the growsim core.
//!
//! The canonical configuration lives in `growsim-config.yaml` at the project
//! root. Every section is optional; a missing section or key falls back to
//! the defaults defined here, so an empty file is a valid configuration.

use std::collections::BTreeMap;
use std::path::Path;

use rust_decimal::Decimal;
use serde::Deserialize;

use growsim_ledger::Tariffs;
use growsim_physics::{AmbientConditions, CapacityPolicy};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level simulation configuration.
///
/// Mirrors the structure of `growsim-config.yaml`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    /// World-level settings (seed, tick length, calendar epoch).
    #[serde(default)]
    pub world: WorldConfig,

    /// Coverage and airflow thresholds.
    #[serde(default = "default_capacity")]
    pub capacity: CapacityPolicy,

    /// Outside air the zones exchange with.
    #[serde(default)]
    pub ambient: AmbientConditions,

    /// Irrigation and nutrient buffer parameters.
    #[serde(default)]
    pub irrigation: IrrigationConfig,

    /// Plant growth and stress parameters.
    #[serde(default)]
    pub physiology: PhysiologyConfig,

    /// Harvest behaviour.
    #[serde(default)]
    pub harvest: HarvestConfig,

    /// Utility prices.
    #[serde(default)]
    pub tariffs: Tariffs,

    /// Device wear parameters.
    #[serde(default)]
    pub devices: DeviceWearConfig,

    /// Workforce payroll.
    #[serde(default)]
    pub workforce: WorkforceConfig,

    /// Strain catalog keyed by strain id.
    #[serde(default = "default_strains")]
    pub strains: BTreeMap<String, StrainProfile>,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            world: WorldConfig::default(),
            capacity: default_capacity(),
            ambient: AmbientConditions::default(),
            irrigation: IrrigationConfig::default(),
            physiology: PhysiologyConfig::default(),
            harvest: HarvestConfig::default(),
            tariffs: Tariffs::default(),
            devices: DeviceWearConfig::default(),
            workforce: WorkforceConfig::default(),
            strains: default_strains(),
            logging: LoggingConfig::default(),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yml::from_str(yaml)?)
    }

    /// Look up a strain, falling back to the default profile.
    ///
    /// The boolean is `false` when the strain is not in the catalog.
    pub fn strain(&self, strain_id: &str) -> (StrainProfile, bool) {
        self.strains
            .get(strain_id)
            .map_or_else(|| (StrainProfile::default(), false), |p| (*p, true))
    }
}

/// World-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct WorldConfig {
    /// Human-readable simulation name.
    #[serde(default = "default_world_name")]
    pub name: String,

    /// Seed string from which every RNG stream is derived.
    #[serde(default = "default_seed")]
    pub seed: String,

    /// Simulated hours covered by one tick.
    #[serde(default = "default_tick_duration_hours")]
    pub tick_duration_hours: f64,

    /// Calendar timestamp of simulated hour zero.
    #[serde(default = "default_epoch")]
    pub epoch: String,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            name: default_world_name(),
            seed: default_seed(),
            tick_duration_hours: default_tick_duration_hours(),
            epoch: default_epoch(),
        }
    }
}

/// Irrigation and nutrient configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct IrrigationConfig {
    /// Fraction of the unabsorbed nutrient mass lost per tick, [0, 1].
    #[serde(default = "default_leaching_fraction")]
    pub leaching_fraction01: f64,

    /// Plant nutrient demand per gram of biomass per hour, mg, by nutrient key.
    #[serde(default = "default_nutrient_demand")]
    pub nutrient_demand_mg_per_g_h: BTreeMap<String, f64>,

    /// Water the replay harness schedules per zone per day, litres per m².
    #[serde(default = "default_daily_water")]
    pub daily_water_l_per_m2: f64,

    /// Feed solution the replay harness schedules, mg per litre.
    #[serde(default = "default_feed_concentrations")]
    pub feed_concentrations_mg_per_l: BTreeMap<String, f64>,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            leaching_fraction01: default_leaching_fraction(),
            nutrient_demand_mg_per_g_h: default_nutrient_demand(),
            daily_water_l_per_m2: default_daily_water(),
            feed_concentrations_mg_per_l: default_feed_concentrations(),
        }
    }
}

/// Plant physiology configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PhysiologyConfig {
    /// Biomass gained per mol of intercepted photons, grams.
    pub light_use_efficiency_g_per_mol: f64,
    /// Upper bound on the canopy area one plant intercepts, m².
    pub max_canopy_m2_per_plant: f64,
    /// Lower edge of the band with full temperature response, °C.
    pub optimal_temperature_min_c: f64,
    /// Upper edge of the band with full temperature response, °C.
    pub optimal_temperature_max_c: f64,
    /// Below this temperature growth stops and plants are stressed, °C.
    pub stress_temperature_min_c: f64,
    /// Above this temperature growth stops and plants are stressed, °C.
    pub stress_temperature_max_c: f64,
    /// Lowest unstressed vapour-pressure deficit, kPa.
    pub vpd_min_kpa: f64,
    /// Highest unstressed vapour-pressure deficit, kPa.
    pub vpd_max_kpa: f64,
    /// Nutrient satisfaction below which plants are stressed, [0, 1].
    pub nutrient_stress_threshold01: f64,
    /// Health lost per stressed hour.
    pub stress_per_hour: f64,
    /// Health regained per unstressed hour.
    pub recovery_per_hour: f64,
    /// CO2 drawn down by lit canopy, ppm per kg biomass per hour.
    pub co2_uptake_ppm_per_kg_h: f64,
    /// Water vapour transpired by lit canopy, g per kg biomass per hour.
    pub transpiration_g_per_kg_h: f64,
    /// Substrate water drawn by the canopy, litres per kg biomass per hour.
    pub water_use_l_per_kg_h: f64,
}

impl Default for PhysiologyConfig {
    fn default() -> Self {
        Self {
            light_use_efficiency_g_per_mol: 0.5,
            max_canopy_m2_per_plant: 1.0,
            optimal_temperature_min_c: 22.0,
            optimal_temperature_max_c: 28.0,
            stress_temperature_min_c: 18.0,
            stress_temperature_max_c: 32.0,
            vpd_min_kpa: 0.4,
            vpd_max_kpa: 1.6,
            nutrient_stress_threshold01: 0.5,
            stress_per_hour: 0.01,
            recovery_per_hour: 0.005,
            co2_uptake_ppm_per_kg_h: 20.0,
            transpiration_g_per_kg_h: 30.0,
            water_use_l_per_kg_h: 0.03,
        }
    }
}

/// Harvest configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct HarvestConfig {
    /// Turn harvest-ready plants into lots automatically.
    #[serde(default = "default_true")]
    pub auto_harvest: bool,

    /// Moisture fraction recorded on new lots.
    #[serde(default = "default_harvest_moisture")]
    pub moisture01: f64,
}

impl Default for HarvestConfig {
    fn default() -> Self {
        Self {
            auto_harvest: true,
            moisture01: default_harvest_moisture(),
        }
    }
}

/// Device wear configuration.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DeviceWearConfig {
    /// Condition lost per operating hour.
    #[serde(default = "default_wear_per_hour")]
    pub wear_per_hour: f64,

    /// Condition below which `device.condition.low` is raised.
    #[serde(default = "default_low_condition")]
    pub low_condition_warn01: f64,
}

impl Default for DeviceWearConfig {
    fn default() -> Self {
        Self {
            wear_per_hour: default_wear_per_hour(),
            low_condition_warn01: default_low_condition(),
        }
    }
}

/// Workforce configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WorkforceConfig {
    /// Payroll per simulated hour for the whole staff.
    #[serde(default = "default_payroll_per_hour")]
    pub payroll_per_hour: Decimal,
}

impl Default for WorkforceConfig {
    fn default() -> Self {
        Self {
            payroll_per_hour: default_payroll_per_hour(),
        }
    }
}

/// Growth profile of one strain.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct StrainProfile {
    /// Hours a plant stays a seedling.
    pub seedling_hours: f64,
    /// Minimum vegetative hours before a flowering photoperiod takes effect.
    pub vegetative_min_hours: f64,
    /// Hours of flowering until the plant is harvest-ready.
    pub flowering_hours: f64,
    /// Multiplier on light-driven growth.
    pub growth_multiplier: f64,
    /// Share of fresh biomass that ends up in the harvest lot, [0, 1].
    pub harvest_index01: f64,
}

impl Default for StrainProfile {
    fn default() -> Self {
        Self {
            seedling_hours: 168.0,
            vegetative_min_hours: 336.0,
            flowering_hours: 1344.0,
            growth_multiplier: 1.0,
            harvest_index01: 0.35,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default value functions for serde
// ---------------------------------------------------------------------------

fn default_world_name() -> String {
    "growsim".to_owned()
}

fn default_seed() -> String {
    "gm-001".to_owned()
}

const fn default_tick_duration_hours() -> f64 {
    1.0
}

fn default_epoch() -> String {
    "2025-01-01T00:00:00".to_owned()
}

const fn default_capacity() -> CapacityPolicy {
    CapacityPolicy {
        min_ach: 2.0,
        coverage_warn_ratio: 1.0,
    }
}

const fn default_leaching_fraction() -> f64 {
    0.1
}

fn default_nutrient_demand() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("k".to_owned(), 0.015),
        ("n".to_owned(), 0.02),
        ("p".to_owned(), 0.005),
    ])
}

const fn default_daily_water() -> f64 {
    0.5
}

fn default_feed_concentrations() -> BTreeMap<String, f64> {
    BTreeMap::from([
        ("k".to_owned(), 200.0),
        ("n".to_owned(), 150.0),
        ("p".to_owned(), 50.0),
    ])
}

const fn default_true() -> bool {
    true
}

const fn default_harvest_moisture() -> f64 {
    0.75
}

const fn default_wear_per_hour() -> f64 {
    0.0001
}

const fn default_low_condition() -> f64 {
    0.3
}

fn default_payroll_per_hour() -> Decimal {
    Decimal::new(4500, 2)
}

fn default_strains() -> BTreeMap<String, StrainProfile> {
    BTreeMap::from([
        ("northern-lights".to_owned(), StrainProfile {
            flowering_hours: 1176.0,
            growth_multiplier: 0.9,
            ..StrainProfile::default()
        }),
        ("og-kush".to_owned(), StrainProfile::default()),
    ])
}

fn default_log_level() -> String {
    "info".to_owned()
}
