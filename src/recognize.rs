// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Image recognition: prompt construction, response parsing, aggregation

use base64::{engine::general_purpose, Engine as _};
use image::GenericImageView;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::ItemName;
use crate::config::AppConfig;
use crate::engine::{extract_json_array, Engine};
use crate::inventory::EntryPatch;
use crate::{LarderError, Result};

/// One raw detection row from the vision model.
#[derive(Debug, Clone, Deserialize)]
pub struct Detection {
    pub name: String,
    pub quantity: u32,
}

/// Build the recognition prompt with the catalog constraint filled in.
pub fn recognition_prompt(template: &str) -> String {
    template.replace("{items}", &ItemName::joined())
}

/// Parse the model's response into raw detections.
pub fn parse_detections(text: &str) -> Result<Vec<Detection>> {
    let detections = serde_json::from_str(extract_json_array(text))?;
    Ok(detections)
}

/// Merge raw detections from a single scan into one quantity per catalog
/// item.
///
/// Names that fail normalization are dropped; duplicates ("Milk" and
/// "carton of milk") are summed. Output order is first occurrence.
pub fn aggregate_detections(detections: &[Detection]) -> Vec<(ItemName, u32)> {
    let mut totals: Vec<(ItemName, u32)> = Vec::new();

    for detection in detections {
        let Some(name) = ItemName::normalize(&detection.name) else {
            debug!("Dropping unrecognized detection: {}", detection.name);
            continue;
        };
        match totals.iter_mut().find(|(n, _)| *n == name) {
            Some((_, quantity)) => *quantity = quantity.saturating_add(detection.quantity),
            None => totals.push((name, detection.quantity)),
        }
    }

    totals
}

/// Downscale large images and re-encode as JPEG for the vision model.
fn prepare_image(data: &[u8]) -> Result<Vec<u8>> {
    let img = image::load_from_memory(data)?;

    // Resize if too large (max 1024px on longest side)
    let img = if img.width() > 1024 || img.height() > 1024 {
        img.resize(1024, 1024, image::imageops::FilterType::Triangle)
    } else {
        img
    };

    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);
    img.write_to(&mut cursor, image::ImageFormat::Jpeg)?;

    Ok(buffer)
}

/// Base64 payload for the vision model, falling back to the raw bytes when
/// the image cannot be decoded locally.
pub fn encode_image(data: &[u8]) -> String {
    match prepare_image(data) {
        Ok(prepared) => general_purpose::STANDARD.encode(&prepared),
        Err(e) => {
            warn!("Could not prepare image ({}), sending raw bytes", e);
            general_purpose::STANDARD.encode(data)
        }
    }
}

/// Identify catalog items in an image and return them as inventory patches.
///
/// A transport or parse failure surfaces as a single error with no partial
/// results; a successful call that yields zero usable detections is the
/// distinct [`LarderError::NoItemsRecognized`].
pub async fn identify_items(
    engine: &dyn Engine,
    config: &AppConfig,
    image: &[u8],
) -> Result<Vec<EntryPatch>> {
    let prompt = recognition_prompt(&config.prompts.recognize);
    let payload = encode_image(image);

    let response = engine.recognize(&prompt, &payload).await?;
    let detections = parse_detections(&response)?;
    let items = aggregate_detections(&detections);

    if items.is_empty() {
        return Err(LarderError::NoItemsRecognized);
    }

    info!("Recognized {} catalog item(s)", items.len());

    Ok(items
        .into_iter()
        .map(|(name, quantity)| EntryPatch::with_quantity(name, quantity))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

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

    fn detection(name: &str, quantity: u32) -> Detection {
        Detection {
            name: name.to_string(),
            quantity,
        }
    }

    #[test]
    fn test_prompt_embeds_catalog() {
        let prompt = recognition_prompt("Find these: {items}.");
        assert_eq!(prompt, "Find these: Rice, Milk, Eggs, Oil, Bread.");
    }

    #[test]
    fn test_parse_fenced_response() {
        let text = "```json\n[{\"name\": \"Milk\", \"quantity\": 2}]\n```";
        let detections = parse_detections(text).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].name, "Milk");
        assert_eq!(detections[0].quantity, 2);
    }

    #[test]
    fn test_parse_garbage_is_an_error() {
        assert!(parse_detections("I couldn't see anything in the image").is_err());
    }

    #[test]
    fn test_aggregate_merges_duplicates_and_drops_unknown() {
        let detections = [
            detection("Milk", 2),
            detection("carton of milk", 1),
            detection("Shampoo", 3),
        ];

        let items = aggregate_detections(&detections);
        assert_eq!(items, vec![(ItemName::Milk, 3)]);
    }

    #[test]
    fn test_aggregate_saturates_on_huge_quantities() {
        // Quantities are model-controlled; summed duplicates must not overflow.
        let detections = [detection("Milk", u32::MAX), detection("carton of milk", 2)];

        let items = aggregate_detections(&detections);
        assert_eq!(items, vec![(ItemName::Milk, u32::MAX)]);
    }

    #[test]
    fn test_aggregate_preserves_first_occurrence_order() {
        let detections = [
            detection("oil bottle", 1),
            detection("rice", 2),
            detection("olive oil", 1),
        ];

        let items = aggregate_detections(&detections);
        assert_eq!(items, vec![(ItemName::Oil, 2), (ItemName::Rice, 2)]);
    }

    #[tokio::test]
    async fn test_identify_items_empty_is_distinct_error() {
        let engine = FixedEngine("[{\"name\": \"Shampoo\", \"quantity\": 4}]".to_string());
        let config = AppConfig::default();

        let result = identify_items(&engine, &config, &[0u8; 4]).await;
        assert!(matches!(result, Err(LarderError::NoItemsRecognized)));
    }

    #[tokio::test]
    async fn test_identify_items_returns_patches() {
        let engine =
            FixedEngine("[{\"name\": \"Eggs\", \"quantity\": 6}, {\"name\": \"bread loaf\", \"quantity\": 1}]".to_string());
        let config = AppConfig::default();

        let patches = identify_items(&engine, &config, &[0u8; 4]).await.unwrap();
        assert_eq!(patches.len(), 2);
        assert_eq!(patches[0].name, ItemName::Eggs);
        assert_eq!(patches[0].quantity, Some(6));
        assert_eq!(patches[1].name, ItemName::Bread);
    }
}
