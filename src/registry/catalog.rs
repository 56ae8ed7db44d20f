use schemars::schema_for;
use serde::Serialize;
use serde_json::Value;

use super::validation::ArgumentSpec;
use super::{CommandCategory, CommandInfo};

/// A catalog entry: metadata, the wire-level argument list, and the JSON
/// schema of the typed params.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRegistryEntry {
    #[serde(flatten)]
    pub info: CommandInfo,
    pub arguments: Vec<ArgumentSpec>,
    pub param_schema: Value,
}

pub(super) fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}

pub(super) fn schema_value<T: schemars::JsonSchema>() -> Value {
    let root = schema_for!(T);
    serde_json::to_value(root).unwrap_or_else(|_| empty_object_schema())
}

pub(super) fn entry(
    info: CommandInfo,
    arguments: Vec<ArgumentSpec>,
    param_schema: Value,
) -> CommandRegistryEntry {
    CommandRegistryEntry {
        info,
        arguments,
        param_schema,
    }
}

/// The built-in command catalog, in declaration order.
pub fn command_registry() -> Vec<CommandRegistryEntry> {
    super::Command::registry_entries()
}

/// Help text for command discovery.
/// Three tiers: no topic → categories, category → command list, command → arguments.
pub fn help_text(topic: Option<&str>) -> String {
    let registry = command_registry();

    let Some(topic) = topic.map(str::trim).filter(|t| !t.is_empty()) else {
        let mut lines = vec!["Available command categories:".to_string()];
        for category in CommandCategory::all() {
            let count = registry.iter().filter(|e| e.info.category == *category).count();
            if count > 0 {
                lines.push(format!(
                    "  {} ({count}): {}",
                    category.slug(),
                    category.description()
                ));
            }
        }
        lines.push(String::new());
        lines.push("Use help --topic tone to list commands in a category.".to_string());
        lines.push("Use help --topic auto_typer for argument details.".to_string());
        return lines.join("\n");
    };

    if let Some(entry) = registry.iter().find(|e| e.info.name == topic) {
        return describe_command(entry);
    }

    let wanted = topic.to_lowercase();
    let matching: Vec<&CommandRegistryEntry> = registry
        .iter()
        .filter(|e| e.info.category.slug() == wanted)
        .collect();

    if matching.is_empty() {
        return format!("Unknown topic: \"{topic}\". Use help to see categories and commands.");
    }
    let mut lines = vec![format!("{wanted} commands:")];
    for entry in matching {
        lines.push(format!("  - {}: {}", entry.info.name, entry.info.description));
    }
    lines.push(String::new());
    lines.push("Use help --topic <command> for argument details.".to_string());
    lines.join("\n")
}

fn describe_command(entry: &CommandRegistryEntry) -> String {
    let mut lines = vec![
        format!("{}: {}", entry.info.name, entry.info.description),
        format!("Category: {}", entry.info.category.slug()),
    ];
    if entry.arguments.is_empty() {
        lines.push("No arguments.".to_string());
        return lines.join("\n");
    }
    lines.push(String::new());
    lines.push("Arguments:".to_string());
    for spec in &entry.arguments {
        let kind = serde_json::to_value(&spec.kind)
            .ok()
            .and_then(|v| v.get("type").and_then(Value::as_str).map(str::to_string))
            .unwrap_or_default();
        let mut line = format!("  --{} <{kind}>", spec.name);
        if spec.required {
            line.push_str(" (required)");
        } else if let Some(default) = &spec.default {
            line.push_str(&format!(" (default {default})"));
        }
        line.push_str(&format!(": {}", spec.description));
        lines.push(line);
    }
    lines.join("\n")
}

/// JSON Schema formatted command list, printed by `autotype commands`.
pub fn to_json_schema() -> Value {
    Value::Array(
        command_registry()
            .iter()
            .map(|e| {
                serde_json::json!({
                    "name": e.info.name,
                    "description": e.info.description,
                    "category": e.info.category.slug(),
                    "arguments": e.arguments,
                    "inputSchema": e.param_schema,
                })
            })
            .collect(),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    #[test]
    fn every_argument_appears_in_the_schema() {
        for entry in command_registry() {
            let properties = &entry.param_schema["properties"];
            for spec in &entry.arguments {
                assert!(
                    properties.get(spec.name).is_some(),
                    "{}: '{}' missing from schema",
                    entry.info.name,
                    spec.name
                );
            }
        }
    }

    #[test]
    fn help_without_topic_lists_categories() {
        let text = help_text(None);
        assert!(text.starts_with("Available command categories:"));
        assert!(text.contains("typing (4)"));
        assert!(text.contains("tone (4)"));
        assert_eq!(help_text(Some("  ")), text);
    }

    #[test]
    fn help_for_category_lists_commands() {
        let text = help_text(Some("Windows"));
        assert!(text.contains("- get_windows:"));
        assert!(text.contains("- select_window:"));
        assert!(!text.contains("auto_typer"));
    }

    #[test]
    fn help_for_command_lists_arguments() {
        let text = help_text(Some("auto_typer"));
        assert!(text.contains("--text <string> (required)"));
        assert!(text.contains("--typo_rate <percentage> (default 0)"));
        assert!(help_text(Some("get_windows")).contains("No arguments."));
    }

    #[test]
    fn unknown_topic_is_reported_in_text() {
        assert!(help_text(Some("teleport")).starts_with("Unknown topic"));
    }

    #[test]
    fn json_schema_carries_every_command() {
        let Value::Array(commands) = to_json_schema() else {
            panic!("expected an array");
        };
        assert_eq!(commands.len(), 13);
        let adjust = commands.iter().find(|c| c["name"] == "adjust_tone").unwrap();
        assert_eq!(adjust["category"], "tone");
        let preset = adjust["arguments"]
            .as_array()
            .unwrap()
            .iter()
            .find(|a| a["name"] == "preset")
            .unwrap();
        assert_eq!(preset["type"], "string");
        assert_eq!(preset["default"], "custom");
    }
}
