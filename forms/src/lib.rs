//! Checking the controls of an HTML form against a list of expected fields

/// Gathering form controls and their submitted state
pub mod collect;
/// Expected fields
pub mod descriptor;
/// Mismatches between a form and its expectations
pub mod diagnostic;
/// Submission entry points
pub mod handler;
/// Presentation of verification results
pub mod report;
/// Matching descriptors to elements
pub mod verify;


pub use collect::{collect_form_controls, extract_control_data, ExtractedFieldData, ExtractedKind};
pub use descriptor::{load_descriptors, DescriptorError, FieldDescriptor, FieldKind};
pub use diagnostic::{Diagnostic, Problem};
pub use handler::{locate_form, run_extraction, run_verification, FormError, SubmitEvent};
pub use report::{DomReporter, Reporter, TextReporter};
pub use verify::{resolve_field, verify_all_fields, verify_field};
