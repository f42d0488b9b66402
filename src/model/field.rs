//! Template configuration: field definitions bound to data paths.

use super::{AnalysisResult, BBox};
use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// How a field's value is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    #[default]
    Text,
    Multiline,
    Checkbox,
    /// Drawn like `Text`; the formatter normalizes date strings.
    Date,
}

impl FieldKind {
    /// Parse a type name, case-insensitively.
    pub fn parse(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "text" => Some(FieldKind::Text),
            "multiline" => Some(FieldKind::Multiline),
            "checkbox" => Some(FieldKind::Checkbox),
            "date" => Some(FieldKind::Date),
            _ => None,
        }
    }
}

/// One fill-in location and the data path that feeds it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawFieldDefinition")]
pub struct FieldDefinition {
    /// Path into the value source; unbound fields are never drawn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema_path: Option<String>,

    #[serde(rename = "type")]
    pub kind: FieldKind,

    /// Page index (0-based)
    pub page: usize,

    /// Numeric bbox components as authored; see [`FieldDefinition::bbox`]
    pub bbox: Vec<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked_when_equals: Option<String>,

    /// Human-readable label carried through from the template builder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl FieldDefinition {
    /// Create a text field.
    pub fn text(page: usize, bbox: BBox, schema_path: impl Into<String>) -> Self {
        Self {
            schema_path: Some(schema_path.into()),
            kind: FieldKind::Text,
            page,
            bbox: bbox.to_array().to_vec(),
            font_size: None,
            checked_when_equals: None,
            label: None,
        }
    }

    /// Create a field of an arbitrary kind.
    pub fn new(kind: FieldKind, page: usize, bbox: BBox, schema_path: impl Into<String>) -> Self {
        Self {
            kind,
            ..Self::text(page, bbox, schema_path)
        }
    }

    /// Builder: set the starting font size.
    pub fn with_font_size(mut self, size: f32) -> Self {
        self.font_size = Some(size);
        self
    }

    /// Builder: check the box only when the value equals `expected`.
    pub fn with_checked_when_equals(mut self, expected: impl Into<String>) -> Self {
        self.checked_when_equals = Some(expected.into());
        self
    }

    /// The field rectangle, if at least four numeric components were given.
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_slice(&self.bbox)
    }

    /// Bound data path, if any. Blank paths count as unbound.
    pub fn binding(&self) -> Option<&str> {
        self.schema_path
            .as_deref()
            .map(str::trim)
            .filter(|path| !path.is_empty())
    }
}

/// Lenient wire shape; every key is optional and loosely typed.
#[derive(Deserialize)]
struct RawFieldDefinition {
    #[serde(default)]
    schema_path: Option<Value>,
    #[serde(default, rename = "type")]
    kind: Option<Value>,
    #[serde(default)]
    field_type: Option<Value>,
    #[serde(default)]
    page: Option<Value>,
    #[serde(default)]
    bbox: Option<Value>,
    #[serde(default)]
    font_size: Option<Value>,
    #[serde(default)]
    checked_when_equals: Option<Value>,
    #[serde(default)]
    label: Option<Value>,
}

impl From<RawFieldDefinition> for FieldDefinition {
    fn from(raw: RawFieldDefinition) -> Self {
        let schema_path = non_empty_str(raw.schema_path.as_ref()).map(str::to_string);

        let type_name = non_empty_str(raw.kind.as_ref())
            .or_else(|| non_empty_str(raw.field_type.as_ref()))
            .unwrap_or("text");
        let kind = FieldKind::parse(type_name).unwrap_or_else(|| {
            log::warn!(
                "Unknown field type '{}' for {:?}, drawing as text",
                type_name,
                schema_path
            );
            FieldKind::Text
        });

        let page = match raw.page {
            None | Some(Value::Null) => 0,
            Some(ref value) => match number_of(value) {
                Some(n) if n >= 0.0 => n as usize,
                _ => {
                    log::warn!("Invalid page for {:?}, using first page", schema_path);
                    0
                }
            },
        };

        let bbox: Vec<f64> = match raw.bbox {
            Some(Value::Array(items)) => items.iter().filter_map(number_of).collect(),
            _ => Vec::new(),
        };

        let font_size = raw.font_size.as_ref().and_then(number_of).map(|n| n as f32);

        let checked_when_equals = match raw.checked_when_equals {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => Some(other.to_string()),
        };

        let label = non_empty_str(raw.label.as_ref()).map(str::to_string);

        Self {
            schema_path,
            kind,
            page,
            bbox: bbox.into_iter().map(|n| n as f32).collect(),
            font_size,
            checked_when_equals,
            label,
        }
    }
}

/// Trimmed, non-empty string content of a JSON value.
fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s.trim()),
        _ => None,
    }
}

/// A JSON number, or a string holding one.
fn number_of(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Persisted template configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemplateConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template_id: Option<String>,

    /// SHA-256 of the template the fields were authored against
    #[serde(
        default,
        alias = "pdf_sha256",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_hash: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_count: Option<usize>,

    /// `None` when the key is absent from the document
    #[serde(default, deserialize_with = "deserialize_fields")]
    pub fields: Option<Vec<FieldDefinition>>,
}

impl TemplateConfig {
    /// Config holding the given fields.
    pub fn with_fields(fields: Vec<FieldDefinition>) -> Self {
        Self {
            fields: Some(fields),
            ..Self::default()
        }
    }

    /// Empty starter config for a freshly analyzed template.
    pub fn starter(template_id: impl Into<String>, analysis: &AnalysisResult) -> Self {
        Self {
            template_id: Some(template_id.into()),
            content_hash: Some(analysis.content_hash.clone()),
            page_count: Some(analysis.page_count),
            fields: Some(Vec::new()),
        }
    }

    /// Parse from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Parse from a JSON file.
    pub fn from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Field list, which must be present and non-empty before filling.
    pub fn fields(&self) -> Result<&[FieldDefinition]> {
        match self.fields.as_deref() {
            None => Err(Error::Configuration(
                "template config is missing 'fields'".to_string(),
            )),
            Some([]) => Err(Error::Configuration(
                "template config has no fields".to_string(),
            )),
            Some(fields) => Ok(fields),
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Accept any list, keeping only object entries.
fn deserialize_fields<'de, D>(deserializer: D) -> std::result::Result<Option<Vec<FieldDefinition>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(raw.map(|items| {
        items
            .into_iter()
            .filter(Value::is_object)
            .filter_map(|item| match serde_json::from_value::<FieldDefinition>(item) {
                Ok(field) => Some(field),
                Err(e) => {
                    log::warn!("Ignoring unreadable field definition: {}", e);
                    None
                }
            })
            .collect()
    }))
}
