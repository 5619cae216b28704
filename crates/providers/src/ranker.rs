//! LLM-backed wildfire-risk ranker over the OpenAI chat completions API.
//!
//! The surveyed profiles are embedded verbatim in the prompt and the model
//! is asked for exactly three sub-regions as a bare JSON array. The reply is
//! parsed strictly: anything other than three well-formed regions is a
//! decode failure, not a partial result.

use reqwest::blocking::Client;
use serde::Deserialize;
use serde_json::json;

use burn_plan_core::geometry::BoundingBox;
use burn_plan_core::sources::RiskRanker;
use burn_plan_core::types::{EnvironmentalData, RiskRegion};
use burn_plan_core::SourceError;

use crate::config::ProviderConfig;
use crate::{decode_error, ensure_success, transport_error};

const SERVICE: &str = "openai";
const MODEL: &str = "gpt-4o";
const SAMPLING_TEMPERATURE: f64 = 0.2;
const EXPECTED_REGIONS: usize = 3;

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: String,
}

fn risk_prompt(bbox: &BoundingBox, profiles: &[EnvironmentalData]) -> Result<String, SourceError> {
    let data = serde_json::to_string_pretty(profiles)
        .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
    Ok(format!(
        "Given an area bounded by coordinates (minLat: {}, maxLat: {}, minLon: {}, maxLon: {}), \
         and the following environmental data:\n{data}\n\
         Based on this data, identify the three distinct sub-regions within the given area that \
         are most at risk of wildfires. Return only a JSON array containing exactly three \
         objects, each with minLat, maxLat, minLon, maxLon, and severity (0-1) properties. The \
         sub-regions can overlap.",
        bbox.min_lat, bbox.max_lat, bbox.min_lon, bbox.max_lon
    ))
}

/// Strip a markdown code fence if the model wrapped its JSON in one.
fn extract_json(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(fenced) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    fenced
        .trim_start_matches("json")
        .trim_end_matches("```")
        .trim()
}

fn parse_regions(content: &str) -> Result<Vec<RiskRegion>, SourceError> {
    let regions: Vec<RiskRegion> = serde_json::from_str(extract_json(content))
        .map_err(|err| decode_error(SERVICE, &err.to_string()))?;
    if regions.len() != EXPECTED_REGIONS {
        return Err(decode_error(
            SERVICE,
            &format!("expected {EXPECTED_REGIONS} risk regions, got {}", regions.len()),
        ));
    }
    Ok(regions)
}

pub struct OpenAiRanker {
    client: Client,
    url: String,
    api_key: String,
}

impl OpenAiRanker {
    pub fn new(client: Client, config: &ProviderConfig) -> Self {
        Self {
            client,
            url: format!("{}/v1/chat/completions", config.openai_base_url),
            api_key: config.openai_api_key.clone(),
        }
    }
}

impl RiskRanker for OpenAiRanker {
    fn rank(
        &self,
        bbox: &BoundingBox,
        profiles: &[EnvironmentalData],
    ) -> Result<Vec<RiskRegion>, SourceError> {
        let body = json!({
            "model": MODEL,
            "messages": [{ "role": "user", "content": risk_prompt(bbox, profiles)? }],
            "temperature": SAMPLING_TEMPERATURE,
        });

        let response = self
            .client
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .map_err(transport_error)?;
        let response = ensure_success(SERVICE, response)?;
        let chat: ChatResponse = response
            .json()
            .map_err(|err| decode_error(SERVICE, &err.to_string()))?;

        let content = chat
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| decode_error(SERVICE, "completion carried no choices"))?;
        parse_regions(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn_plan_core::geometry::Point;

    const THREE_REGIONS: &str = r#"[
        {"minLat": 0.0, "maxLat": 0.5, "minLon": 0.0, "maxLon": 0.5, "severity": 0.9},
        {"minLat": 0.5, "maxLat": 1.0, "minLon": 0.0, "maxLon": 0.5, "severity": 0.6},
        {"minLat": 0.0, "maxLat": 1.0, "minLon": 0.5, "maxLon": 1.0, "severity": 0.3}
    ]"#;

    #[test]
    fn test_parses_a_bare_json_array() {
        let regions = parse_regions(THREE_REGIONS).unwrap();
        assert_eq!(regions.len(), 3);
        assert_eq!(regions[0].severity, 0.9);
        assert_eq!(regions[2].max_lon, 1.0);
    }

    #[test]
    fn test_strips_a_markdown_code_fence() {
        let fenced = format!("```json\n{THREE_REGIONS}\n```");
        assert_eq!(parse_regions(&fenced).unwrap().len(), 3);
    }

    #[test]
    fn test_rejects_the_wrong_number_of_regions() {
        let two = r#"[
            {"minLat": 0.0, "maxLat": 0.5, "minLon": 0.0, "maxLon": 0.5, "severity": 0.9},
            {"minLat": 0.5, "maxLat": 1.0, "minLon": 0.0, "maxLon": 0.5, "severity": 0.6}
        ]"#;
        assert!(matches!(
            parse_regions(two).unwrap_err(),
            SourceError::Decode { .. }
        ));
    }

    #[test]
    fn test_prompt_embeds_the_bounds_and_the_profiles() {
        let bbox = BoundingBox {
            min_lat: -34.0,
            max_lat: -33.0,
            min_lon: 150.0,
            max_lon: 151.0,
        };
        let profiles = vec![EnvironmentalData {
            point: Point::new(-33.5, 150.5),
            place_name: String::from("Katoomba"),
            temperature: 30.0,
            humidity: 20.0,
            wind_speed: 10.0,
            wind_direction: 270.0,
            vegetation_density: 0.7,
            soil_moisture: burn_plan_core::SoilMoisture {
                surface: 0.2,
                root_zone: 0.3,
                profile: 0.4,
            },
            topography: burn_plan_core::Topography { slope: 12.0 },
        }];

        let prompt = risk_prompt(&bbox, &profiles).unwrap();
        assert!(prompt.contains("minLat: -34"));
        assert!(prompt.contains("Katoomba"));
        assert!(prompt.contains("exactly three"));
    }
}
