// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Consumption forecasting: prompt construction, parsing, filtering

use chrono::Local;
use serde::Deserialize;
use tracing::{debug, info};

use crate::catalog::ItemName;
use crate::config::AppConfig;
use crate::engine::{extract_json_array, Engine};
use crate::inventory::EntryPatch;
use crate::Result;

/// One raw forecast row from the text model. Field names follow the keys
/// the prompt asks for.
#[derive(Debug, Clone, Deserialize)]
pub struct ForecastRow {
    pub name: String,
    #[serde(rename = "usageRate", alias = "usage_rate")]
    pub usage_rate: String,
    #[serde(rename = "reorderDate", alias = "reorder_date")]
    pub reorder_date: String,
}

/// Build the forecast prompt for the given item names.
pub fn forecast_prompt(template: &str, names: &[ItemName], today: &str) -> String {
    let joined_names = names
        .iter()
        .map(|n| n.as_str())
        .collect::<Vec<_>>()
        .join(", ");

    template
        .replace("{names}", &joined_names)
        .replace("{items}", &ItemName::joined())
        .replace("{date}", today)
}

/// Parse the model's response into raw forecast rows.
pub fn parse_rows(text: &str) -> Result<Vec<ForecastRow>> {
    let rows = serde_json::from_str(extract_json_array(text))?;
    Ok(rows)
}

/// Drop rows whose name fails normalization; annotations pass through
/// unchanged.
pub fn filter_rows(rows: Vec<ForecastRow>) -> Vec<EntryPatch> {
    rows.into_iter()
        .filter_map(|row| match ItemName::normalize(&row.name) {
            Some(name) => Some(EntryPatch::with_annotations(
                name,
                row.usage_rate,
                row.reorder_date,
            )),
            None => {
                debug!("Dropping forecast row for unknown item: {}", row.name);
                None
            }
        })
        .collect()
}

/// Generate a consumption forecast for the given items.
///
/// An empty name list short-circuits to an empty result without contacting
/// the engine.
pub async fn generate_forecast(
    engine: &dyn Engine,
    config: &AppConfig,
    names: &[ItemName],
) -> Result<Vec<EntryPatch>> {
    if names.is_empty() {
        return Ok(Vec::new());
    }

    let today = Local::now().format("%Y-%m-%d").to_string();
    let prompt = forecast_prompt(&config.prompts.forecast, names, &today);

    let response = engine.forecast(&prompt).await?;
    let patches = filter_rows(parse_rows(&response)?);

    info!("Forecast produced {} usable row(s)", patches.len());

    Ok(patches)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;
    use async_trait::async_trait;

    /// Stub engine that fails the test if it is ever contacted.
    struct PanicEngine;

    #[async_trait]
    impl Engine for PanicEngine {
        async fn recognize(&self, _prompt: &str, _image_base64: &str) -> Result<String> {
            panic!("engine should not be contacted");
        }

        async fn forecast(&self, _prompt: &str) -> Result<String> {
            panic!("engine should not be contacted");
        }
    }

    struct FixedEngine(String);

    #[async_trait]
    impl Engine for FixedEngine {
        async fn recognize(&self, _prompt: &str, _image_base64: &str) -> Result<String> {
            Ok(self.0.clone())
        }

        async fn forecast(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn test_prompt_expansion() {
        let prompt = forecast_prompt(
            "Items: {names}. Catalog: {items}. Today: {date}.",
            &[ItemName::Milk, ItemName::Rice],
            "2025-08-31",
        );
        assert_eq!(
            prompt,
            "Items: Milk, Rice. Catalog: Rice, Milk, Eggs, Oil, Bread. Today: 2025-08-31."
        );
    }

    #[test]
    fn test_parse_camel_case_rows() {
        let text = r#"[{"name": "Milk", "usageRate": "1 unit every 3 days", "reorderDate": "2025-09-05"}]"#;
        let rows = parse_rows(text).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].usage_rate, "1 unit every 3 days");
        assert_eq!(rows[0].reorder_date, "2025-09-05");
    }

    #[test]
    fn test_filter_drops_unknown_names() {
        let rows = vec![
            ForecastRow {
                name: "whole milk".to_string(),
                usage_rate: "1 unit every 4 days".to_string(),
                reorder_date: "2025-09-08".to_string(),
            },
            ForecastRow {
                name: "Detergent".to_string(),
                usage_rate: "1 unit every 30 days".to_string(),
                reorder_date: "2025-10-01".to_string(),
            },
        ];

        let patches = filter_rows(rows);
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].name, ItemName::Milk);
        assert_eq!(patches[0].quantity, None, "forecast never touches quantity");
        assert_eq!(patches[0].usage_rate.as_deref(), Some("1 unit every 4 days"));
    }

    #[tokio::test]
    async fn test_empty_input_short_circuits() {
        let config = AppConfig::default();
        let patches = generate_forecast(&PanicEngine, &config, &[]).await.unwrap();
        assert!(patches.is_empty());
    }

    #[tokio::test]
    async fn test_generate_forecast_filters_rows() {
        let response = r#"[
            {"name": "Eggs", "usageRate": "2 units every day", "reorderDate": "2025-09-02"},
            {"name": "Toothpaste", "usageRate": "1 unit every 60 days", "reorderDate": "2025-11-01"}
        ]"#;
        let config = AppConfig::default();

        let patches = generate_forecast(&FixedEngine(response.to_string()), &config, &[ItemName::Eggs])
            .await
            .unwrap();
        assert_eq!(patches.len(), 1);
        assert_eq!(patches[0].name, ItemName::Eggs);
    }
}
