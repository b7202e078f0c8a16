//! Load technique definitions from TOML files
//!
//! ```toml
//! [[technique]]
//! id = "Ember"
//! sequence = ["Bloom", "Consume"]
//! chakra_cost = 5.0
//! cast_time = 0.5
//! recovery_time = 0.3
//! effect = { kind = "burst", radius = 2.0 }
//! ```

use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::techniques::definition::TechniqueDefinition;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default, rename = "technique")]
    techniques: Vec<TechniqueDefinition>,
}

/// Parse a catalog document into definitions, validating each one
pub fn parse_catalog(content: &str) -> Result<Vec<TechniqueDefinition>> {
    let file: CatalogFile = toml::from_str(content)?;
    for definition in &file.techniques {
        definition.validate()?;
    }
    Ok(file.techniques)
}

/// Load a catalog file from disk
pub fn load_catalog(path: &Path) -> Result<Vec<TechniqueDefinition>> {
    let content = fs::read_to_string(path)?;
    let techniques = parse_catalog(&content)?;
    tracing::info!("Loaded {} techniques from {}", techniques.len(), path.display());
    Ok(techniques)
}

/// Small built-in catalog used when no file is supplied
pub const DEFAULT_CATALOG: &str = r#"
[[technique]]
id = "Spark"
sequence = ["Bloom"]
chakra_cost = 2.0
cast_time = 0.2
recovery_time = 0.1
effect = { kind = "flash" }

[[technique]]
id = "Ember"
sequence = ["Bloom", "Consume"]
chakra_cost = 5.0
cast_time = 0.5
recovery_time = 0.3
effect = { kind = "burst", radius = 2.0 }

[[technique]]
id = "Wildfire"
sequence = ["Bloom", "Consume", "Scatter"]
chakra_cost = 12.0
stability_cost = 8.0
cast_time = 1.0
recovery_time = 0.6
effect = { kind = "cone", length = 6.0 }

[[technique]]
id = "StillWater"
sequence = ["Anchor", "Yield"]
chakra_cost = 3.0
stability_cost = 1.0
cast_time = 0.4
recovery_time = 0.4
effect = { kind = "ward" }

[[technique]]
id = "Undertow"
sequence = ["Yield", "Anchor", "Consume"]
chakra_cost = 9.0
stability_cost = 15.0
cast_time = 0.8
recovery_time = 0.8
effect = { kind = "pull", strength = 3.0 }
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::EngineError;
    use crate::core::types::{ConceptId, TechniqueId};
    use std::time::Duration;

    #[test]
    fn test_default_catalog_parses() {
        let techniques = parse_catalog(DEFAULT_CATALOG).unwrap();
        assert_eq!(techniques.len(), 5);

        let ember = techniques
            .iter()
            .find(|t| t.id == TechniqueId::new("Ember"))
            .unwrap();
        assert_eq!(ember.sequence, vec![ConceptId::new("Bloom"), ConceptId::new("Consume")]);
        assert_eq!(ember.cast_duration, Duration::from_millis(500));
        assert_eq!(ember.recovery_duration, Duration::from_millis(300));
        assert_eq!(ember.stability_cost, 0.0);
        assert_eq!(ember.effect["kind"], "burst");
    }

    #[test]
    fn test_empty_sequence_rejected() {
        let content = r#"
[[technique]]
id = "Hollow"
sequence = []
"#;
        assert!(matches!(parse_catalog(content), Err(EngineError::Catalog(_))));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let content = r#"
[[technique]]
id = "Rewind"
sequence = ["Bloom"]
cast_time = -1.0
"#;
        assert!(matches!(parse_catalog(content), Err(EngineError::Toml(_))));
    }

    #[test]
    fn test_empty_document_is_empty_catalog() {
        assert!(parse_catalog("").unwrap().is_empty());
    }
}
