use html::{DOMElement, ElementRef};
use tracing::{debug, span, trace, Level};

use crate::descriptor::FieldDescriptor;
use crate::diagnostic::{Diagnostic, Problem};

/// Finds the element a descriptor refers to.
///
/// An `id` always wins. Otherwise a label is found by its `for` attribute and an option by its
/// value; when several match, the last one in document order is used. The submit control is
/// the first `<button>` in the document.
pub fn resolve_field<'a>(
    document: &'a DOMElement,
    descriptor: &FieldDescriptor,
) -> Option<ElementRef<'a>> {
    if let Some(id) = descriptor.id() {
        return document.get_element_by_id(id);
    }
    match descriptor {
        FieldDescriptor::Label { for_id } => document
            .get_elements_by_tag_name("label")
            .into_iter()
            .filter(|label| label.get_attribute("for") == Some(for_id))
            .last(),
        FieldDescriptor::SelectOption { value, .. } => document
            .get_elements_by_tag_name("option")
            .into_iter()
            .filter(|option| &option.option_value() == value)
            .last(),
        FieldDescriptor::Submit => document
            .get_elements_by_tag_name("button")
            .into_iter()
            .next(),
        _ => None,
    }
}

/// Checks one resolved element against its descriptor. Only the first problem found is
/// reported
pub fn verify_field(
    element: Option<ElementRef>,
    descriptor: &FieldDescriptor,
) -> Option<Diagnostic> {
    let problem = match element {
        None => Problem::NotFound,
        Some(element) => check_name(&element, descriptor)
            .or_else(|| check_shape(element, descriptor))?,
    };
    Some(Diagnostic::new(descriptor, problem))
}

/// Resolves and checks every descriptor, returning the problems in descriptor order
pub fn verify_all_fields(
    document: &DOMElement,
    descriptors: &[FieldDescriptor],
) -> Vec<Diagnostic> {
    let span = span!(Level::DEBUG, "Verifying fields", count = descriptors.len());
    let _enter = span.enter();
    descriptors
        .iter()
        .filter_map(|descriptor| {
            let element = resolve_field(document, descriptor);
            trace!(field = %descriptor.field_id(), found = element.is_some(), "Resolved field");
            let diagnostic = verify_field(element, descriptor);
            if let Some(d) = &diagnostic {
                debug!("{}", d);
            }
            diagnostic
        })
        .collect()
}

fn check_name(element: &DOMElement, descriptor: &FieldDescriptor) -> Option<Problem> {
    name_problem(element, descriptor.expected_name()?)
}

fn name_problem(element: &DOMElement, expected: &str) -> Option<Problem> {
    match element.get_attribute("name") {
        None => Some(Problem::MissingName {
            expected: expected.to_string(),
        }),
        Some(name) if name != expected => Some(Problem::WrongName {
            expected: expected.to_string(),
            found: name.clone(),
        }),
        Some(_) => None,
    }
}

fn check_shape(element: ElementRef, descriptor: &FieldDescriptor) -> Option<Problem> {
    match descriptor {
        FieldDescriptor::Select { .. } => expect_tag(&element, "select"),
        FieldDescriptor::Radio { name, value, .. } => expect_tag(&element, "input")
            .or_else(|| name_problem(&element, name))
            .or_else(|| {
                expect_equal(element.get_attribute("value"), value, |expected, found| {
                    Problem::WrongValue { expected, found }
                })
            }),
        FieldDescriptor::SelectOption { parent, .. } => {
            expect_tag(&element, "option").or_else(|| {
                let found = element.parent.and_then(|p| p.get_attribute("name"));
                expect_equal(found, parent, |expected, found| Problem::WrongAssociation {
                    expected,
                    found,
                })
            })
        }
        FieldDescriptor::Textbox { .. } => {
            expect_tag(&element, "input").or_else(|| expect_control_type(&element, "text"))
        }
        FieldDescriptor::Password { .. } => {
            expect_tag(&element, "input").or_else(|| expect_control_type(&element, "password"))
        }
        FieldDescriptor::Label { for_id } => expect_tag(&element, "label").or_else(|| {
            expect_equal(element.get_attribute("for"), for_id, |expected, found| {
                Problem::WrongAssociation { expected, found }
            })
        }),
        FieldDescriptor::Submit => {
            expect_tag(&element, "button").or_else(|| expect_control_type(&element, "submit"))
        }
    }
}

fn expect_tag(element: &DOMElement, tag: &str) -> Option<Problem> {
    if element.is(tag) {
        None
    } else {
        Some(Problem::WrongTag {
            expected: tag.to_string(),
            found: element.tag_name(),
        })
    }
}

fn expect_control_type(element: &DOMElement, expected: &str) -> Option<Problem> {
    match element.control_type() {
        Some(t) if t == expected => None,
        found => Some(Problem::WrongControlType {
            expected: expected.to_string(),
            found,
        }),
    }
}

fn expect_equal(
    found: Option<&String>,
    expected: &str,
    problem: impl FnOnce(String, Option<String>) -> Problem,
) -> Option<Problem> {
    if found.map(String::as_str) == Some(expected) {
        None
    } else {
        Some(problem(expected.to_string(), found.cloned()))
    }
}
