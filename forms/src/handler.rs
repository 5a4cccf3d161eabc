use html::{DOMElement, ElementRef};
use thiserror::Error;
use tracing::{info, span, Level};

use crate::collect::{collect_form_controls, extract_control_data, ExtractedFieldData};
use crate::descriptor::FieldDescriptor;
use crate::diagnostic::Diagnostic;
use crate::report::Reporter;
use crate::verify::verify_all_fields;

/// The submission that triggered a check
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SubmitEvent {
    default_prevented: bool,
}

impl SubmitEvent {
    pub fn new() -> Self {
        Self::default()
    }
    /// Stops the host from performing the submission itself
    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }
    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormError {
    #[error("Required parameter '{0}' not supplied")]
    MissingArgument(&'static str),
    #[error("Unable to find form #{0} in the document")]
    FormNotFound(String),
    #[error("Element #{id} is not a form, but a {tag}")]
    NotAForm { id: String, tag: String },
}

fn require<T>(value: Option<T>, name: &'static str) -> Result<T, FormError> {
    value.ok_or(FormError::MissingArgument(name))
}

/// Finds the `<form>` with the given id
pub fn locate_form<'a>(
    document: &'a DOMElement,
    form_id: &str,
) -> Result<ElementRef<'a>, FormError> {
    let form = document
        .get_element_by_id(form_id)
        .ok_or_else(|| FormError::FormNotFound(form_id.to_string()))?;
    if !form.is("form") {
        return Err(FormError::NotAForm {
            id: form_id.to_string(),
            tag: form.tag_name(),
        });
    }
    Ok(form)
}

/// Handles a submission by extracting the state of every text box and select in the form
pub fn run_extraction(
    event: &mut SubmitEvent,
    document: Option<&DOMElement>,
    form_id: Option<&str>,
) -> Result<Vec<ExtractedFieldData>, FormError> {
    let document = require(document, "document")?;
    let form_id = require(form_id, "formId")?;
    let form = locate_form(document, form_id)?;
    event.prevent_default();

    let span = span!(Level::INFO, "Extracting form", form = form_id);
    let _enter = span.enter();
    let data: Vec<_> = collect_form_controls(form)
        .into_iter()
        .filter_map(|control| extract_control_data(&control))
        .collect();
    info!(fields = data.len(), "Extracted form data");
    Ok(data)
}

/// Handles a submission by checking the form against an expectation list. The problems found
/// are passed to `reporter` and returned
pub fn run_verification<R: Reporter + ?Sized>(
    event: Option<&mut SubmitEvent>,
    document: Option<&DOMElement>,
    form_id: Option<&str>,
    descriptors: &[FieldDescriptor],
    reporter: &mut R,
) -> Result<Vec<Diagnostic>, FormError> {
    let event = require(event, "event")?;
    let document = require(document, "document")?;
    let form_id = require(form_id, "formId")?;
    locate_form(document, form_id)?;
    event.prevent_default();

    let span = span!(Level::INFO, "Verifying form", form = form_id);
    let _enter = span.enter();
    let diagnostics = verify_all_fields(document, descriptors);
    info!(problems = diagnostics.len(), "Verified form");
    reporter.report(&diagnostics);
    Ok(diagnostics)
}
