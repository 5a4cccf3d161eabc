use forms::{
    load_descriptors, run_extraction, run_verification, Diagnostic, DomReporter, FieldDescriptor,
    Reporter, SubmitEvent, TextReporter,
};
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;
use tracing::{info, span, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Loading of documents from disk or the web
mod web;

const USAGE: &str = "\
Usage: formcheck <SOURCE> <FORM_ID> [OPTIONS]

Extracts the state of a form, or checks it against an expectation list.

Options:
  -e, --expect <FILE>    JSON list of expected fields to verify against
  -a, --annotate <FILE>  Write the document with the report attached (needs --expect)
  -j, --json             Print results as JSON lines
  -t, --trace            Log progress to stderr (filtered by RUST_LOG)
  -h, --help             Show this message";

struct Args {
    pub source: String,
    pub form_id: String,
    pub expect: Option<PathBuf>,
    pub annotate: Option<PathBuf>,
    pub json: bool,
    pub trace: bool,
}

#[derive(Debug, Error)]
enum AppError {
    #[error("{0}")]
    Args(#[from] pico_args::Error),
    #[error(transparent)]
    Load(#[from] web::LoadError),
    #[error(transparent)]
    Form(#[from] forms::FormError),
    #[error("{path}: {source}")]
    Descriptors {
        path: PathBuf,
        source: forms::DescriptorError,
    },
    #[error("could not write output: {0}")]
    Output(#[from] io::Error),
    #[error("could not encode output: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A diagnostic together with its rendered message, for JSON output
#[derive(Serialize)]
struct Finding<'a> {
    message: String,
    #[serde(flatten)]
    diagnostic: &'a Diagnostic,
}

fn main() -> ExitCode {
    let mut pargs = pico_args::Arguments::from_env();
    if pargs.contains(["-h", "--help"]) {
        println!("{}", USAGE);
        return ExitCode::SUCCESS;
    }
    let args = match parse_args(pargs) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}\n\n{}", AppError::from(e), USAGE);
            return ExitCode::from(2);
        }
    };
    if args.trace {
        tracing_subscriber::fmt::fmt()
            .with_span_events(FmtSpan::ACTIVE)
            .with_max_level(Level::TRACE)
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .finish()
            .init();
        info!("Logger initialized");
    }

    match run(&args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}

fn parse_args(mut pargs: pico_args::Arguments) -> Result<Args, pico_args::Error> {
    let args = Args {
        expect: pargs.opt_value_from_str(["-e", "--expect"])?,
        annotate: pargs.opt_value_from_str(["-a", "--annotate"])?,
        json: pargs.contains(["-j", "--json"]),
        trace: pargs.contains(["-t", "--trace"]),
        source: pargs.free_from_str()?,
        form_id: pargs.free_from_str()?,
    };
    if args.annotate.is_some() && args.expect.is_none() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: "--annotate requires --expect".to_string(),
        });
    }
    let rest = pargs.finish();
    if !rest.is_empty() {
        return Err(pico_args::Error::ArgumentParsingFailed {
            cause: format!("unexpected arguments: {:?}", rest),
        });
    }
    Ok(args)
}

/// Returns whether the form passed
fn run(args: &Args) -> Result<bool, AppError> {
    let page = web::Page::load(&args.source)?;
    let span = span!(Level::DEBUG, "Checking", source = %page.source, form = %args.form_id);
    let _enter = span.enter();
    let mut event = SubmitEvent::new();
    let stdout = io::stdout();

    let Some(path) = &args.expect else {
        let data = run_extraction(&mut event, Some(&page.dom), Some(&args.form_id))?;
        let mut out = stdout.lock();
        for field in &data {
            if args.json {
                writeln!(out, "{}", serde_json::to_string(field)?)?;
            } else {
                let id = field.id.as_deref().unwrap_or("-");
                let name = field.name.as_deref().unwrap_or("-");
                let value = field.value.as_deref().unwrap_or("");
                writeln!(out, "{}\t{}\t{}={}", field.kind.as_str(), id, name, value)?;
            }
        }
        return Ok(true);
    };

    let descriptors = read_descriptors(path)?;
    let mut annotated = args.annotate.as_ref().map(|_| DomReporter::new(page.dom.clone()));
    let diagnostics = if args.json {
        let mut reporter = (JsonReporter::new(stdout.lock()), annotated.as_mut());
        let diagnostics = verify(&mut event, &page.dom, args, &descriptors, &mut reporter)?;
        reporter.0.finish().map(drop)?;
        diagnostics
    } else {
        let mut reporter = (TextReporter::new(stdout.lock()), annotated.as_mut());
        let diagnostics = verify(&mut event, &page.dom, args, &descriptors, &mut reporter)?;
        reporter.0.finish().map(drop)?;
        diagnostics
    };

    if let (Some(path), Some(reporter)) = (&args.annotate, annotated) {
        let mut file = File::create(path)?;
        writeln!(file, "<!DOCTYPE html>\n{}", reporter.into_document())?;
        info!(path = %path.display(), "Wrote annotated document");
    }
    Ok(diagnostics.is_empty())
}

fn verify<R: Reporter>(
    event: &mut SubmitEvent,
    dom: &html::DOMElement,
    args: &Args,
    descriptors: &[FieldDescriptor],
    reporter: &mut R,
) -> Result<Vec<Diagnostic>, AppError> {
    Ok(run_verification(
        Some(event),
        Some(dom),
        Some(&args.form_id),
        descriptors,
        reporter,
    )?)
}

fn read_descriptors(path: &Path) -> Result<Vec<FieldDescriptor>, AppError> {
    let descriptors_error = |source: forms::DescriptorError| AppError::Descriptors {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(|e| descriptors_error(e.into()))?;
    load_descriptors(BufReader::new(file)).map_err(descriptors_error)
}

/// Writes one JSON object per diagnostic
struct JsonReporter<W: Write> {
    out: W,
    error: Option<AppError>,
}

impl<W: Write> JsonReporter<W> {
    fn new(out: W) -> Self {
        Self { out, error: None }
    }

    fn finish(self) -> Result<W, AppError> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.out),
        }
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn report(&mut self, diagnostics: &[Diagnostic]) {
        for diagnostic in diagnostics {
            let finding = Finding {
                message: diagnostic.to_string(),
                diagnostic,
            };
            let result = serde_json::to_string(&finding)
                .map_err(AppError::from)
                .and_then(|line| writeln!(self.out, "{}", line).map_err(AppError::from));
            if let Err(e) = result {
                self.error.get_or_insert(e);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    const FORM: &str = r#"<!DOCTYPE html>
<html><body>
<form id="form-1"><input type="text" id="text-1" name="text-1" value="Some text"></form>
<ol id="report"><li>stale</li></ol>
</body></html>"#;

    fn parse(argv: &[&str]) -> Result<Args, pico_args::Error> {
        parse_args(pico_args::Arguments::from_vec(
            argv.iter().map(OsString::from).collect(),
        ))
    }

    fn temp_file(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("formcheck-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_parse_args() {
        let args = parse(&["page.html", "form-1", "--expect", "fields.json", "-j"]).unwrap();
        assert_eq!(args.source, "page.html");
        assert_eq!(args.form_id, "form-1");
        assert_eq!(args.expect, Some(PathBuf::from("fields.json")));
        assert!(args.json);
        assert!(!args.trace);
        assert!(args.annotate.is_none());

        assert!(parse(&["page.html"]).is_err());
        assert!(parse(&["page.html", "form-1", "extra"]).is_err());
        assert!(parse(&["page.html", "form-1", "--annotate", "out.html"]).is_err());
        let args = parse(&["page.html", "form-1", "-a", "out.html", "-e", "fields.json"]).unwrap();
        assert_eq!(args.annotate, Some(PathBuf::from("out.html")));
    }

    #[test]
    fn test_run_verification_with_annotation() {
        let page = temp_file("page.html", FORM);
        let expect = temp_file(
            "fields.json",
            r#"[{"type": "textbox", "id": "text-1", "name": "wrong-name"}]"#,
        );
        let annotated = std::env::temp_dir().join(format!("formcheck-{}-out.html", std::process::id()));
        let args = Args {
            source: page.to_string_lossy().into_owned(),
            form_id: "form-1".to_string(),
            expect: Some(expect.clone()),
            annotate: Some(annotated.clone()),
            json: true,
            trace: false,
        };
        assert!(!run(&args).unwrap());

        let written = std::fs::read_to_string(&annotated).unwrap();
        let (_, dom) = html::document(&written).unwrap();
        let reports = dom.get_elements_by_tag_name("ol");
        assert_eq!(reports.len(), 1);
        assert_eq!(
            reports[0].text_content(),
            "Field text-1 (textbox) has the wrong name: Expected wrong-name, but found text-1"
        );
        for path in [page, expect, annotated] {
            std::fs::remove_file(path).unwrap();
        }
    }

    #[test]
    fn test_run_reports_errors() {
        let page = temp_file("not-a-form.html", FORM);
        let args = Args {
            source: page.to_string_lossy().into_owned(),
            form_id: "text-1".to_string(),
            expect: None,
            annotate: None,
            json: false,
            trace: false,
        };
        let err = run(&args).err().unwrap();
        assert_eq!(err.to_string(), "Element #text-1 is not a form, but a input");
        std::fs::remove_file(page).unwrap();
    }
}
