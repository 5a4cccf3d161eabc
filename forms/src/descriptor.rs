use serde::{Deserialize, Serialize};
use std::fmt;
use std::io::Read;
use thiserror::Error;

/// The kinds of form control an expectation list can describe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Textbox,
    Password,
    Select,
    Radio,
    Option,
    Label,
    Submit,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Textbox => "textbox",
            FieldKind::Password => "password",
            FieldKind::Select => "select",
            FieldKind::Radio => "radio",
            FieldKind::Option => "option",
            FieldKind::Label => "label",
            FieldKind::Submit => "submit",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The expected shape of one form control.
///
/// Most kinds are found by `id`. A label is found through its `for` attribute, an option
/// without an `id` through its value, and the submit control is the document's first button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum FieldDescriptor {
    Textbox {
        id: String,
        name: String,
    },
    Password {
        id: String,
        name: String,
    },
    Select {
        id: String,
        name: String,
    },
    Radio {
        id: String,
        name: String,
        value: String,
    },
    #[serde(rename = "option")]
    SelectOption {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        value: String,
        parent: String,
    },
    Label {
        #[serde(rename = "for")]
        for_id: String,
    },
    Submit,
}

impl FieldDescriptor {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldDescriptor::Textbox { .. } => FieldKind::Textbox,
            FieldDescriptor::Password { .. } => FieldKind::Password,
            FieldDescriptor::Select { .. } => FieldKind::Select,
            FieldDescriptor::Radio { .. } => FieldKind::Radio,
            FieldDescriptor::SelectOption { .. } => FieldKind::Option,
            FieldDescriptor::Label { .. } => FieldKind::Label,
            FieldDescriptor::Submit => FieldKind::Submit,
        }
    }

    /// The `id` to look the control up by, if it is resolved that way
    pub fn id(&self) -> Option<&str> {
        match self {
            FieldDescriptor::Textbox { id, .. }
            | FieldDescriptor::Password { id, .. }
            | FieldDescriptor::Select { id, .. }
            | FieldDescriptor::Radio { id, .. } => Some(id),
            FieldDescriptor::SelectOption { id, .. } => id.as_deref(),
            FieldDescriptor::Label { .. } | FieldDescriptor::Submit => None,
        }
    }

    /// The `name` attribute the control must carry. Labels, options and the submit control
    /// are not checked for a name
    pub fn expected_name(&self) -> Option<&str> {
        match self {
            FieldDescriptor::Textbox { name, .. }
            | FieldDescriptor::Password { name, .. }
            | FieldDescriptor::Select { name, .. }
            | FieldDescriptor::Radio { name, .. } => Some(name),
            _ => None,
        }
    }

    /// How diagnostics refer to this field
    pub fn field_id(&self) -> String {
        match self {
            FieldDescriptor::Submit => FieldKind::Submit.to_string(),
            FieldDescriptor::Label { for_id } => format!("label[for={}]", for_id),
            FieldDescriptor::SelectOption { id: None, value, .. } => {
                format!("option[value={}]", value)
            }
            other => other.id().unwrap_or_default().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("could not read expectation list: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid expectation list: {0}")]
    Json(#[from] serde_json::Error),
}

/// Reads a JSON array of field descriptors
pub fn load_descriptors<R: Read>(reader: R) -> Result<Vec<FieldDescriptor>, DescriptorError> {
    let descriptors: Vec<FieldDescriptor> = serde_json::from_reader(reader)?;
    tracing::debug!(count = descriptors.len(), "Loaded expectation list");
    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_descriptors() {
        let json = r#"[
            {"type": "textbox", "id": "text-1", "name": "text-1"},
            {"type": "password", "id": "pw", "name": "pw"},
            {"type": "select", "id": "select-1", "name": "select-1"},
            {"type": "radio", "id": "r1", "name": "colour", "value": "red"},
            {"type": "option", "value": "second", "parent": "select-1"},
            {"type": "label", "for": "text-1"},
            {"type": "submit"}
        ]"#;
        let descriptors = load_descriptors(json.as_bytes()).unwrap();
        let kinds: Vec<_> = descriptors.iter().map(|d| d.kind().as_str()).collect();
        assert_eq!(
            kinds,
            vec!["textbox", "password", "select", "radio", "option", "label", "submit"]
        );
        assert_eq!(
            descriptors[4],
            FieldDescriptor::SelectOption {
                id: None,
                value: "second".to_string(),
                parent: "select-1".to_string(),
            }
        );
        assert_eq!(
            descriptors[5],
            FieldDescriptor::Label {
                for_id: "text-1".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_incomplete_descriptor() {
        assert!(load_descriptors(r#"[{"type": "textbox", "id": "a"}]"#.as_bytes()).is_err());
        assert!(load_descriptors(r#"[{"type": "checkbox", "id": "a"}]"#.as_bytes()).is_err());
        assert!(load_descriptors(r#"{"type": "submit"}"#.as_bytes()).is_err());
    }

    #[test]
    fn test_field_id() {
        let textbox = FieldDescriptor::Textbox {
            id: "text-1".to_string(),
            name: "n".to_string(),
        };
        assert_eq!(textbox.field_id(), "text-1");
        assert_eq!(FieldDescriptor::Submit.field_id(), "submit");
        let label = FieldDescriptor::Label {
            for_id: "x".to_string(),
        };
        assert_eq!(label.field_id(), "label[for=x]");
        let option = FieldDescriptor::SelectOption {
            id: Some("option-2".to_string()),
            value: "2".to_string(),
            parent: "s".to_string(),
        };
        assert_eq!(option.field_id(), "option-2");
        assert_eq!(option.id(), Some("option-2"));
        let option = FieldDescriptor::SelectOption {
            id: None,
            value: "2".to_string(),
            parent: "s".to_string(),
        };
        assert_eq!(option.field_id(), "option[value=2]");
        assert_eq!(option.expected_name(), None);
    }
}
