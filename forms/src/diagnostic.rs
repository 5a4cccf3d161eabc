use serde::Serialize;
use std::fmt;

use crate::descriptor::{FieldDescriptor, FieldKind};

/// What was wrong with a field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "problem", rename_all = "snake_case")]
pub enum Problem {
    NotFound,
    MissingName {
        expected: String,
    },
    WrongName {
        expected: String,
        found: String,
    },
    WrongTag {
        expected: String,
        found: String,
    },
    WrongControlType {
        expected: String,
        found: Option<String>,
    },
    WrongAssociation {
        expected: String,
        found: Option<String>,
    },
    WrongValue {
        expected: String,
        found: Option<String>,
    },
}

/// One mismatch between a form and its expectation list. Renders to the report text with
/// [`Display`](fmt::Display)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub field_id: String,
    pub kind: FieldKind,
    #[serde(flatten)]
    pub problem: Problem,
}

impl Diagnostic {
    pub fn new(descriptor: &FieldDescriptor, problem: Problem) -> Self {
        Self {
            field_id: descriptor.field_id(),
            kind: descriptor.kind(),
            problem,
        }
    }
}

struct Found<'a>(&'a Option<String>);

impl fmt::Display for Found<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(v) => f.write_str(v),
            None => f.write_str("nothing"),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Field {} ({}) ", self.field_id, self.kind)?;
        match &self.problem {
            Problem::NotFound => write!(f, "not found"),
            Problem::MissingName { expected } => {
                write!(f, "has no name: Expected it to be {}", expected)
            }
            Problem::WrongName { expected, found } => {
                write!(f, "has the wrong name: Expected {}, but found {}", expected, found)
            }
            Problem::WrongTag { expected, found } => {
                write!(f, "is the wrong tag: Expected {}, but found {}", expected, found)
            }
            Problem::WrongControlType { expected, found } => write!(
                f,
                "is the wrong type of form control: Expected {}, but found {}",
                expected,
                Found(found)
            ),
            Problem::WrongAssociation { expected, found } => write!(
                f,
                "is associated with the wrong form control: Expected {}, but found {}",
                expected,
                Found(found)
            ),
            Problem::WrongValue { expected, found } => write!(
                f,
                "has the wrong value: Expected {}, but found {}",
                expected,
                Found(found)
            ),
        }
    }
}

#[cfg(test)]
#[test]
fn test_messages() {
    let textbox = FieldDescriptor::Textbox {
        id: "text-1".to_string(),
        name: "wrong-name".to_string(),
    };
    let d = Diagnostic::new(&textbox, Problem::NotFound);
    assert_eq!(d.to_string(), "Field text-1 (textbox) not found");
    let d = Diagnostic::new(
        &textbox,
        Problem::WrongName {
            expected: "wrong-name".to_string(),
            found: "text-1".to_string(),
        },
    );
    assert_eq!(
        d.to_string(),
        "Field text-1 (textbox) has the wrong name: Expected wrong-name, but found text-1"
    );
    let label = FieldDescriptor::Label {
        for_id: "x".to_string(),
    };
    let d = Diagnostic::new(
        &label,
        Problem::WrongAssociation {
            expected: "x".to_string(),
            found: None,
        },
    );
    assert_eq!(
        d.to_string(),
        "Field label[for=x] (label) is associated with the wrong form control: Expected x, but found nothing"
    );
}

#[cfg(test)]
#[test]
fn test_serialize() {
    let d = Diagnostic::new(
        &FieldDescriptor::Submit,
        Problem::WrongTag {
            expected: "button".to_string(),
            found: "input".to_string(),
        },
    );
    let json = serde_json::to_value(&d).unwrap();
    assert_eq!(
        json,
        serde_json::json!({
            "field_id": "submit",
            "kind": "submit",
            "problem": "wrong_tag",
            "expected": "button",
            "found": "input",
        })
    );
}
