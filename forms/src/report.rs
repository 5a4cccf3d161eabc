use html::{attributes, DOMElement};
use std::io::{self, Write};
use tracing::warn;

use crate::diagnostic::Diagnostic;

pub const SUCCESS_BANNER: &str = "Congratulations, you've done it! Well done";
pub const FAILURE_BANNER: &str = "Form does not match the expectations:";

/// Id of the list a [`DomReporter`] attaches to the document
pub const REPORT_ID: &str = "report";

/// Presents the outcome of a verification run
pub trait Reporter {
    fn report(&mut self, diagnostics: &[Diagnostic]);
}

impl<R: Reporter + ?Sized> Reporter for &mut R {
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        (**self).report(diagnostics);
    }
}

/// Reports only when present
impl<R: Reporter> Reporter for Option<R> {
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        if let Some(reporter) = self {
            reporter.report(diagnostics);
        }
    }
}

impl<A: Reporter, B: Reporter> Reporter for (A, B) {
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        self.0.report(diagnostics);
        self.1.report(diagnostics);
    }
}

/// Writes a banner and a numbered list of problems
pub struct TextReporter<W: Write> {
    out: W,
    error: Option<io::Error>,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out, error: None }
    }

    /// Returns the writer, or the first error hit while reporting
    pub fn finish(self) -> io::Result<W> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }

    fn write_report(&mut self, diagnostics: &[Diagnostic]) -> io::Result<()> {
        if diagnostics.is_empty() {
            writeln!(self.out, "{}", SUCCESS_BANNER)?;
        } else {
            writeln!(self.out, "{}", FAILURE_BANNER)?;
            for (i, d) in diagnostics.iter().enumerate() {
                writeln!(self.out, "{:>3}. {}", i + 1, d)?;
            }
        }
        self.out.flush()
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        if let Err(e) = self.write_report(diagnostics) {
            warn!("Could not write report: {}", e);
            self.error.get_or_insert(e);
        }
    }
}

/// Attaches the report to a document as `<ol id="report">` at the end of `<body>`, replacing
/// any earlier report
pub struct DomReporter {
    document: DOMElement,
}

impl DomReporter {
    pub fn new(document: DOMElement) -> Self {
        Self { document }
    }

    pub fn into_document(self) -> DOMElement {
        self.document
    }
}

/// Builds the report list: one item per problem, or a single success item
pub fn report_list(diagnostics: &[Diagnostic]) -> DOMElement {
    let (class, items): (_, Vec<String>) = if diagnostics.is_empty() {
        ("report-success", vec![SUCCESS_BANNER.to_string()])
    } else {
        ("report-failure", diagnostics.iter().map(|d| d.to_string()).collect())
    };
    DOMElement::new(
        "ol",
        Some(attributes!(id=>REPORT_ID, class=>class)),
        items
            .into_iter()
            .map(|text| DOMElement::new("li", None, vec![text.into()]).into())
            .collect(),
    )
}

impl Reporter for DomReporter {
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        while self.document.remove_element_by_id(REPORT_ID).is_some() {}
        let list = report_list(diagnostics);
        if !self.document.append_to("body", list.clone()) {
            self.document.contents.push(list.into());
        }
    }
}
