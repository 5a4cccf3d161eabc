use super::*;

const FORM_DOCUMENT: &str = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>Sign up</title>
    </head>
    <body>
        <!-- The form under test -->
        <form id="form-1">
            <label for="text-1">Name</label>
            <input type="text" id="text-1" name="text-1" value="Some text">
            <div>
                <select id="select-1" name="select-1">
                    <option id="option-1">1st option</option>
                    <option id="option-2" value="second" selected>2nd option</option>
                </select>
            </div>
            <button>Send</button>
        </form>
    </body>
</html>"#;

#[test]
fn test_document() {
    let i = r#"<!DOCTYPE html>
<html lang="en">
    <head>
        <meta charset="utf-8"/>
        <title>The minimal, valid HTML5 document</title>
    </head>
    <body>
        <!-- User-visible content goes in the body -->
        <p>Some paragraph</p>
        Some untagged text
    </body>
</html>"#;
    let target = DOMElement::new(
        "html",
        Some(attributes!(lang=>"en")),
        vec![
            DOMElement::new(
                "head",
                None,
                vec![
                    DOMElement::new("meta", Some(attributes!(charset=>"utf-8")), vec![]).into(),
                    DOMElement::new(
                        "title",
                        None,
                        vec!["The minimal, valid HTML5 document".into()],
                    )
                    .into(),
                ],
            )
            .into(),
            DOMElement::new(
                "body",
                None,
                vec![
                    DOMElement::new("p", None, vec!["Some paragraph".into()]).into(),
                    "Some untagged text".into(),
                ],
            )
            .into(),
        ],
    );
    assert_eq!(document(i), Ok(("", target)));
}

#[test]
fn test_lookup_by_id() {
    let (_, doc) = document(FORM_DOCUMENT).unwrap();
    let select = doc.get_element_by_id("select-1").unwrap();
    assert!(select.is("select"));
    assert!(select.parent.unwrap().is("div"));
    let option = doc.get_element_by_id("option-2").unwrap();
    assert_eq!(option.parent.unwrap().id().unwrap(), "select-1");
    assert!(doc.get_element_by_id("missing").is_none());
}

#[test]
fn test_lookup_by_tag_name() {
    let (_, doc) = document(FORM_DOCUMENT).unwrap();
    let options: Vec<_> = doc
        .get_elements_by_tag_name("OPTION")
        .iter()
        .map(|o| o.id().unwrap().clone())
        .collect();
    assert_eq!(options, vec!["option-1", "option-2"]);
    assert_eq!(doc.get_elements_by_tag_name("html").len(), 1);
    assert!(doc.get_elements_by_tag_name("textarea").is_empty());
    let body = doc.get_elements_by_tag_name("body");
    assert_eq!(body.len(), 1);
    assert_eq!(body[0].get_elements_by_tag_name("input").len(), 1);
}

#[test]
fn test_option_value() {
    let (_, doc) = document(FORM_DOCUMENT).unwrap();
    assert_eq!(doc.get_element_by_id("option-1").unwrap().option_value(), "1st option");
    assert_eq!(doc.get_element_by_id("option-2").unwrap().option_value(), "second");
}

#[test]
fn test_control_type() {
    let (_, doc) = document(FORM_DOCUMENT).unwrap();
    assert_eq!(doc.get_element_by_id("text-1").unwrap().control_type().as_deref(), Some("text"));
    let button = doc.get_elements_by_tag_name("button")[0];
    assert_eq!(button.control_type().as_deref(), Some("submit"));
    assert_eq!(doc.get_element_by_id("select-1").unwrap().control_type(), None);
    let untyped = DOMElement::new("INPUT", None, vec![]);
    assert_eq!(untyped.control_type().as_deref(), Some("text"));
    let password = DOMElement::new("input", Some(attributes!(type=>"Password")), vec![]);
    assert_eq!(password.control_type().as_deref(), Some("password"));
    let unknown = DOMElement::new("input", Some(attributes!(type=>"bogus")), vec![]);
    assert_eq!(unknown.control_type().as_deref(), Some("text"));
    let reset = DOMElement::new("button", Some(attributes!(type=>"reset")), vec![]);
    assert_eq!(reset.control_type().as_deref(), Some("reset"));
    let odd_button = DOMElement::new("button", Some(attributes!(type=>"bogus")), vec![]);
    assert_eq!(odd_button.control_type().as_deref(), Some("submit"));
}

#[test]
fn test_replace_and_append() {
    let (_, mut doc) = document(FORM_DOCUMENT).unwrap();
    let report = DOMElement::new("ol", Some(attributes!(id=>"report")), vec![]);
    assert!(doc.append_to("body", report.clone()));
    assert_eq!(doc.get_elements_by_tag_name("ol").len(), 1);
    let removed = doc.remove_element_by_id("report").unwrap();
    assert_eq!(removed, report);
    assert!(doc.get_element_by_id("report").is_none());
    assert!(!doc.append_to("footer", report));
}

#[test]
fn test_serialized_document_parses_back() {
    let (_, doc) = document(FORM_DOCUMENT).unwrap();
    let text = doc.to_string();
    let (rest, reparsed) = document(&text).unwrap();
    assert_eq!(rest, "");
    assert_eq!(reparsed, doc);
}

#[test]
fn test_document_with_bom() {
    let (rest, doc) = document("\u{feff}<!DOCTYPE html><html><body></body></html>").unwrap();
    assert_eq!(rest, "");
    assert!(doc.is("html"));
}
