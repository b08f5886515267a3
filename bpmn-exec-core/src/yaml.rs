use crate::model::Definitions;
use anyhow::Result;

/// Parse a YAML document into source `Definitions`.
///
/// No validation happens here — structural checks run inside
/// `compile_definitions`, which rejects malformed definitions with a
/// `TransformError`.
pub fn parse_definitions_yaml(yaml_str: &str) -> Result<Definitions> {
    let definitions: Definitions = serde_yaml::from_str(yaml_str)?;
    Ok(definitions)
}
