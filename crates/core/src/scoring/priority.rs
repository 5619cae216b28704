//! Condition-dependent factor prioritization.
//!
//! Scoring weighs five named factors; which factor dominates depends on the
//! point's own readings. The reordering is a fixed decision table over five
//! trigger conditions, kept separate from the scoring arithmetic so the
//! precedence cascade stays auditable on its own.

use crate::types::EnvironmentalData;

/// Conversion from the weather provider's raw wind speed to miles per hour.
pub const WIND_TO_MPH: f64 = 2.237;

/// The five scored environmental factors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FireFactor {
    /// Type and density of vegetation.
    Vegetation,
    /// Temperature and humidity (one shared priority slot).
    TemperatureHumidity,
    /// Wind speed and direction.
    Wind,
    /// Soil moisture across the three depth bands.
    SoilMoisture,
    /// Topographic slope.
    Topography,
}

/// Baseline priority when no trigger condition holds.
pub const BASELINE_PRIORITY: [FireFactor; 5] = [
    FireFactor::Vegetation,
    FireFactor::TemperatureHumidity,
    FireFactor::Wind,
    FireFactor::SoilMoisture,
    FireFactor::Topography,
];

/// The five trigger conditions, each evaluated on the point's own values
/// (never on cluster averages).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FactorTriggers {
    pub low_vegetation: bool,
    pub hot_or_dry: bool,
    pub strong_wind: bool,
    pub dry_soil: bool,
    pub steep_slope: bool,
}

impl FactorTriggers {
    pub fn evaluate(point: &EnvironmentalData) -> Self {
        Self {
            low_vegetation: point.vegetation_density < 0.4,
            hot_or_dry: point.temperature >= 35.0 || point.humidity <= 15.0,
            strong_wind: point.wind_speed * WIND_TO_MPH > 20.0,
            dry_soil: point.soil_moisture.surface <= 0.2
                || point.soil_moisture.root_zone <= 0.3
                || point.soil_moisture.profile <= 0.35,
            steep_slope: point.topography.slope >= 30.0,
        }
    }

    pub fn active_count(&self) -> usize {
        usize::from(self.low_vegetation)
            + usize::from(self.hot_or_dry)
            + usize::from(self.strong_wind)
            + usize::from(self.dry_soil)
            + usize::from(self.steep_slope)
    }
}

/// Multi-factor override: two or more conditions active at once.
///
/// Slots of the baseline list are overwritten by a nested cascade favoring
/// wind, then soil, then temperature/humidity, then vegetation, then
/// topography. The cascade can leave a factor duplicated in (or evicted
/// from) the list; scoring resolves that through first-occurrence indexing,
/// with an absent factor scoring at index "-1" (weight 5).
fn multifactor_priority(t: FactorTriggers) -> [FireFactor; 5] {
    use FireFactor::{SoilMoisture, TemperatureHumidity, Topography, Vegetation, Wind};

    let mut priority = BASELINE_PRIORITY;
    if t.strong_wind {
        priority[0] = Wind;
        if t.dry_soil {
            priority[1] = SoilMoisture;
            if t.hot_or_dry {
                priority[2] = TemperatureHumidity;
                priority[3] = Vegetation;
            } else {
                priority[2] = Vegetation;
                priority[3] = TemperatureHumidity;
            }
        } else {
            if t.hot_or_dry {
                priority[1] = TemperatureHumidity;
                priority[2] = Vegetation;
            } else {
                priority[1] = Vegetation;
                priority[2] = TemperatureHumidity;
            }
            if t.steep_slope {
                priority[3] = Topography;
                priority[4] = SoilMoisture;
            }
        }
    } else if t.hot_or_dry {
        priority[0] = TemperatureHumidity;
        if t.dry_soil {
            priority[1] = SoilMoisture;
        }
        priority[2] = Vegetation;
        priority[3] = Wind;
        if t.steep_slope {
            priority[3] = Topography;
            priority[4] = SoilMoisture;
        }
    } else if t.steep_slope {
        priority[3] = Topography;
        priority[4] = SoilMoisture;
    }
    priority
}

/// Resolve the factor-priority ordering for one point.
///
/// Two or more active conditions route through the multi-factor override;
/// exactly one routes to that condition's fixed list; none leaves the
/// baseline untouched.
pub fn factor_priority(point: &EnvironmentalData) -> [FireFactor; 5] {
    use FireFactor::{SoilMoisture, TemperatureHumidity, Topography, Vegetation, Wind};

    let triggers = FactorTriggers::evaluate(point);
    if triggers.active_count() >= 2 {
        return multifactor_priority(triggers);
    }

    if triggers.low_vegetation {
        // Sparse fuel dominates the decision.
        [Vegetation, TemperatureHumidity, Wind, SoilMoisture, Topography]
    } else if triggers.hot_or_dry {
        [TemperatureHumidity, Vegetation, Wind, Topography, SoilMoisture]
    } else if triggers.strong_wind {
        [Wind, Vegetation, TemperatureHumidity, Topography, SoilMoisture]
    } else if triggers.dry_soil {
        [Vegetation, SoilMoisture, TemperatureHumidity, Wind, Topography]
    } else if triggers.steep_slope {
        [Vegetation, TemperatureHumidity, Topography, Wind, SoilMoisture]
    } else {
        BASELINE_PRIORITY
    }
}

/// Scoring weight of a factor under a priority ordering.
///
/// First occurrence counts: `max(4 - index, 1)`, so ranks 0-3 weigh 4, 3, 2
/// and 1 and later ranks clamp to 1. A factor evicted from the list by the
/// multi-factor override indexes as -1 and weighs 5, reproducing the
/// arithmetic of the system this replaces.
pub fn factor_weight(priority: &[FireFactor; 5], factor: FireFactor) -> f64 {
    let index = priority
        .iter()
        .position(|&f| f == factor)
        .map_or(-1_i64, |i| i as i64);
    (4 - index).max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;
    use crate::types::{SoilMoisture, Topography};
    use FireFactor::{SoilMoisture as Soil, TemperatureHumidity, Topography as Topo, Vegetation, Wind};

    /// A point that triggers none of the five conditions.
    fn calm_point() -> EnvironmentalData {
        EnvironmentalData {
            point: Point::new(0.0, 0.0),
            place_name: String::new(),
            temperature: 20.0,
            humidity: 50.0,
            wind_speed: 5.0,
            wind_direction: 0.0,
            vegetation_density: 0.5,
            soil_moisture: SoilMoisture {
                surface: 0.5,
                root_zone: 0.5,
                profile: 0.5,
            },
            topography: Topography { slope: 0.0 },
        }
    }

    #[test]
    fn test_baseline_when_nothing_triggers() {
        assert_eq!(factor_priority(&calm_point()), BASELINE_PRIORITY);
    }

    #[test]
    fn test_low_vegetation_ranks_vegetation_first() {
        let mut point = calm_point();
        point.vegetation_density = 0.1;
        let priority = factor_priority(&point);
        assert_eq!(priority[0], Vegetation);
        assert_eq!(factor_weight(&priority, Vegetation), 4.0);
    }

    #[test]
    fn test_single_condition_lists() {
        let mut hot = calm_point();
        hot.temperature = 36.0;
        assert_eq!(
            factor_priority(&hot),
            [TemperatureHumidity, Vegetation, Wind, Topo, Soil]
        );

        let mut windy = calm_point();
        windy.wind_speed = 10.0; // 22.4 mph
        assert_eq!(
            factor_priority(&windy),
            [Wind, Vegetation, TemperatureHumidity, Topo, Soil]
        );

        let mut parched = calm_point();
        parched.soil_moisture.surface = 0.1;
        assert_eq!(
            factor_priority(&parched),
            [Vegetation, Soil, TemperatureHumidity, Wind, Topo]
        );

        let mut steep = calm_point();
        steep.topography.slope = 45.0;
        assert_eq!(
            factor_priority(&steep),
            [Vegetation, TemperatureHumidity, Topo, Wind, Soil]
        );
    }

    #[test]
    fn test_multifactor_wind_and_soil() {
        let mut point = calm_point();
        point.wind_speed = 10.0;
        point.soil_moisture.surface = 0.1;
        assert_eq!(
            factor_priority(&point),
            [Wind, Soil, Vegetation, TemperatureHumidity, Topo]
        );
    }

    #[test]
    fn test_multifactor_wind_soil_and_heat() {
        let mut point = calm_point();
        point.wind_speed = 10.0;
        point.soil_moisture.surface = 0.1;
        point.temperature = 40.0;
        assert_eq!(
            factor_priority(&point),
            [Wind, Soil, TemperatureHumidity, Vegetation, Topo]
        );
    }

    #[test]
    fn test_multifactor_wind_and_slope_evicts_nothing_but_moves_soil_last() {
        let mut point = calm_point();
        point.wind_speed = 10.0;
        point.topography.slope = 45.0;
        assert_eq!(
            factor_priority(&point),
            [Wind, Vegetation, TemperatureHumidity, Topo, Soil]
        );
    }

    #[test]
    fn test_multifactor_heat_without_soil_duplicates_temperature_slot() {
        // Heat + low vegetation: the override writes TemperatureHumidity to
        // slot 0 while slot 1 keeps its baseline copy, and SoilMoisture is
        // evicted entirely. Weights resolve through first occurrence and the
        // missing factor weighs 5.
        let mut point = calm_point();
        point.temperature = 40.0;
        point.vegetation_density = 0.1;
        let priority = factor_priority(&point);
        assert_eq!(
            priority,
            [
                TemperatureHumidity,
                TemperatureHumidity,
                Vegetation,
                Wind,
                Topo
            ]
        );
        assert_eq!(factor_weight(&priority, TemperatureHumidity), 4.0);
        assert_eq!(factor_weight(&priority, Soil), 5.0);
    }

    #[test]
    fn test_multifactor_slope_plus_low_vegetation_keeps_baseline_head() {
        let mut point = calm_point();
        point.vegetation_density = 0.1;
        point.topography.slope = 45.0;
        assert_eq!(
            factor_priority(&point),
            [Vegetation, TemperatureHumidity, Wind, Topo, Soil]
        );
    }
}
