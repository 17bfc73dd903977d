//! Rule-based weather lookup

use crate::config::WeatherConfig;
use async_trait::async_trait;
use serde_json::{Map, Value};
use toolchat_prebuilt::{Capability, InputSchema, ParamType, PrebuiltError, Result};
use tracing::debug;

/// `get_weather`: first fixture whose keyword occurs in the location wins
#[derive(Debug, Clone, Default)]
pub struct WeatherCapability {
    config: WeatherConfig,
}

impl WeatherCapability {
    pub fn new(config: WeatherConfig) -> Self {
        Self { config }
    }

    /// Report for a location, or the unknown sentinel
    pub fn lookup(&self, location: &str) -> String {
        self.config
            .fixtures
            .iter()
            .find(|fixture| location.contains(&fixture.keyword))
            .map(|fixture| fixture.report.clone())
            .unwrap_or_else(|| self.config.unknown.clone())
    }
}

#[async_trait]
impl Capability for WeatherCapability {
    fn name(&self) -> &str {
        "get_weather"
    }

    fn description(&self) -> &str {
        "查询城市真实天气. Look up the current weather for a city."
    }

    fn input_schema(&self) -> InputSchema {
        InputSchema::new().required("location", ParamType::String, "City name, e.g. 深圳")
    }

    async fn execute(&self, arguments: &Map<String, Value>) -> Result<String> {
        let location = arguments
            .get("location")
            .and_then(Value::as_str)
            .ok_or_else(|| PrebuiltError::InvalidArguments("location is required".to_string()))?;

        let report = self.lookup(location);
        debug!(location, %report, "Weather lookup");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WeatherFixture;

    #[test]
    fn test_keyword_inside_location() {
        let weather = WeatherCapability::default();
        assert_eq!(weather.lookup("北京市朝阳区"), "狂风暴雨，气温 10 度");
        assert!(weather.lookup("深圳").contains("28"));
        assert_eq!(weather.lookup("Paris"), "未知天气");
    }

    #[test]
    fn test_custom_fixtures() {
        let weather = WeatherCapability::new(WeatherConfig {
            unknown: "no idea".to_string(),
            fixtures: vec![WeatherFixture::new("Oslo", "snow, -3")],
        });
        assert_eq!(weather.lookup("Oslo, Norway"), "snow, -3");
        assert_eq!(weather.lookup("深圳"), "no idea");
    }
}
