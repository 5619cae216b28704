//! NASA POWER daily-point client.
//!
//! One client serves both consumers of the API: the soil-moisture series
//! (agroclimatology community, three `GWET*` depths) and the climate series
//! feeding the intensity predictor (renewable-energy community). Both pull
//! the trailing month of daily values; missing depths are filled with the
//! `-999` sentinel the API itself uses.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Months, NaiveDate, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;

use burn_plan_core::geometry::Point;
use burn_plan_core::sources::{
    ClimateSeries, ClimateSeriesSource, DailySoilMoisture, SoilMoistureSource,
};
use burn_plan_core::types::SOIL_MOISTURE_SENTINEL;
use burn_plan_core::SourceError;

use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "nasa-power";

type ParameterMaps = BTreeMap<String, BTreeMap<String, f64>>;

#[derive(Deserialize)]
struct PowerResponse {
    properties: PowerProperties,
}

#[derive(Deserialize)]
struct PowerProperties {
    parameter: ParameterMaps,
}

pub struct PowerClient {
    client: Client,
    base_url: String,
}

impl PowerClient {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
        }
    }

    fn fetch(
        &self,
        point: Point,
        community: &str,
        parameters: &str,
    ) -> Result<ParameterMaps, SourceError> {
        let (start, end) = trailing_month_range(Utc::now().date_naive());
        let url = format!(
            "{}/api/temporal/daily/point?start={start}&end={end}&latitude={}&longitude={}&community={community}&parameters={parameters}&format=JSON",
            self.base_url, point.lat, point.lon
        );

        let response = self.client.get(url).send().map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let body: PowerResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
        Ok(body.properties.parameter)
    }
}

/// `YYYYMMDD` endpoints of the trailing month ending today.
fn trailing_month_range(today: NaiveDate) -> (String, String) {
    let start = today.checked_sub_months(Months::new(1)).unwrap_or(today);
    (
        start.format("%Y%m%d").to_string(),
        today.format("%Y%m%d").to_string(),
    )
}

/// Join the three depth maps into one chronological series, filling depths
/// the API omitted for a date with the sentinel.
fn assemble_soil_series(parameter: &ParameterMaps) -> Vec<DailySoilMoisture> {
    let empty = BTreeMap::new();
    let surface = parameter.get("GWETTOP").unwrap_or(&empty);
    let root_zone = parameter.get("GWETROOT").unwrap_or(&empty);
    let profile = parameter.get("GWETPROF").unwrap_or(&empty);

    let dates: BTreeSet<&String> = surface
        .keys()
        .chain(root_zone.keys())
        .chain(profile.keys())
        .collect();

    dates
        .into_iter()
        .map(|date| DailySoilMoisture {
            date: date.clone(),
            surface: surface.get(date).copied().unwrap_or(SOIL_MOISTURE_SENTINEL),
            root_zone: root_zone
                .get(date)
                .copied()
                .unwrap_or(SOIL_MOISTURE_SENTINEL),
            profile: profile.get(date).copied().unwrap_or(SOIL_MOISTURE_SENTINEL),
        })
        .collect()
}

fn take_parameter(
    parameter: &mut ParameterMaps,
    key: &str,
) -> Result<BTreeMap<String, f64>, SourceError> {
    parameter
        .remove(key)
        .ok_or_else(|| decode_error(SERVICE, &format!("response is missing parameter {key}")))
}

impl SoilMoistureSource for PowerClient {
    fn soil_moisture_series(&self, point: Point) -> Result<Vec<DailySoilMoisture>, SourceError> {
        let parameter = self.fetch(point, "AG", "GWETPROF,GWETROOT,GWETTOP")?;
        Ok(assemble_soil_series(&parameter))
    }
}

impl ClimateSeriesSource for PowerClient {
    fn climate_series(&self, point: Point) -> Result<ClimateSeries, SourceError> {
        let mut parameter = self.fetch(
            point,
            "RE",
            "T2M,PRECTOTCORR,RH2M,ALLSKY_SFC_SW_DWN,GWETPROF",
        )?;
        Ok(ClimateSeries {
            temperature: take_parameter(&mut parameter, "T2M")?,
            precipitation: take_parameter(&mut parameter, "PRECTOTCORR")?,
            humidity: take_parameter(&mut parameter, "RH2M")?,
            solar_radiation: take_parameter(&mut parameter, "ALLSKY_SFC_SW_DWN")?,
            soil_moisture: take_parameter(&mut parameter, "GWETPROF")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> ParameterMaps {
        let response: PowerResponse = serde_json::from_str(body).unwrap();
        response.properties.parameter
    }

    #[test]
    fn test_trailing_month_range_is_one_month_back() {
        let today = NaiveDate::from_ymd_opt(2026, 8, 23).unwrap();
        assert_eq!(
            trailing_month_range(today),
            (String::from("20260723"), String::from("20260823"))
        );
        // Month arithmetic clamps instead of overflowing.
        let end_of_march = NaiveDate::from_ymd_opt(2026, 3, 31).unwrap();
        assert_eq!(trailing_month_range(end_of_march).0, "20260228");
    }

    #[test]
    fn test_soil_series_fills_missing_depths_with_the_sentinel() {
        let parameter = parse(
            r#"{"properties":{"parameter":{
                "GWETTOP":  {"20250801": 0.31, "20250802": 0.32},
                "GWETROOT": {"20250801": 0.41},
                "GWETPROF": {"20250801": 0.51, "20250802": 0.52}
            }}}"#,
        );

        let series = assemble_soil_series(&parameter);
        assert_eq!(series.len(), 2);
        assert_eq!(series[0].date, "20250801");
        assert_eq!(series[0].root_zone, 0.41);
        assert_eq!(series[1].date, "20250802");
        assert_eq!(series[1].root_zone, SOIL_MOISTURE_SENTINEL);
        assert_eq!(series[1].profile, 0.52);
    }

    #[test]
    fn test_climate_series_requires_every_parameter() {
        let mut parameter = parse(
            r#"{"properties":{"parameter":{
                "T2M": {"20250801": 25.0},
                "PRECTOTCORR": {"20250801": 1.0},
                "RH2M": {"20250801": 40.0},
                "ALLSKY_SFC_SW_DWN": {"20250801": 20.0}
            }}}"#,
        );

        for key in ["T2M", "PRECTOTCORR", "RH2M", "ALLSKY_SFC_SW_DWN"] {
            assert!(take_parameter(&mut parameter, key).is_ok());
        }
        let error = take_parameter(&mut parameter, "GWETPROF").unwrap_err();
        assert!(matches!(error, SourceError::Decode { .. }));
    }
}
