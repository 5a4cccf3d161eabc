use html::{DOMElement, ElementRef};
use serde::Serialize;
use tracing::trace;

/// Tags that bear or describe form state
pub const FORM_CONTROL_TAGS: [&str; 5] = ["input", "textarea", "select", "option", "label"];

/// Input types which are extracted as text boxes
const TEXTBOX_INPUT_TYPES: [&str; 3] = ["text", "password", "email"];

pub fn is_form_control(element: &DOMElement) -> bool {
    FORM_CONTROL_TAGS.iter().any(|tag| element.is(tag))
}

/// Every form control below `root`, in document order. A control's own descendants are still
/// searched, so a `<select>` is followed by its `<option>`s
pub fn collect_form_controls<'a>(root: ElementRef<'a>) -> Vec<ElementRef<'a>> {
    let controls: Vec<_> = root
        .descendants()
        .into_iter()
        .filter(|e| is_form_control(e))
        .collect();
    trace!(root = %root.name, count = controls.len(), "Collected form controls");
    controls
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractedKind {
    Textbox,
    Select,
}

impl ExtractedKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractedKind::Textbox => "textbox",
            ExtractedKind::Select => "select",
        }
    }
}

/// The submitted state of one control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedFieldData {
    #[serde(rename = "type")]
    pub kind: ExtractedKind,
    pub id: Option<String>,
    pub name: Option<String>,
    pub value: Option<String>,
}

/// Extracts the state of a text-like `<input>` or a `<select>`. Password and email inputs are
/// reported as text boxes; any other control yields nothing
pub fn extract_control_data(element: &DOMElement) -> Option<ExtractedFieldData> {
    if element.is("input") {
        extract_input_data(element)
    } else if element.is("select") {
        Some(extract_select_data(element))
    } else {
        None
    }
}

fn extract_input_data(element: &DOMElement) -> Option<ExtractedFieldData> {
    let control_type = element.control_type()?;
    if !TEXTBOX_INPUT_TYPES.contains(&control_type.as_str()) {
        return None;
    }
    Some(ExtractedFieldData {
        kind: ExtractedKind::Textbox,
        id: element.id().cloned(),
        name: element.get_attribute("name").cloned(),
        value: element.get_attribute("value").cloned(),
    })
}

/// The value of a select is the `id` of its first option marked `selected`
fn extract_select_data(element: &DOMElement) -> ExtractedFieldData {
    let value = ElementRef::root(element)
        .descendants()
        .into_iter()
        .filter(|e| e.is("option"))
        .find(|option| option.has_attribute("selected"))
        .and_then(|option| option.id().cloned());
    ExtractedFieldData {
        kind: ExtractedKind::Select,
        id: element.id().cloned(),
        name: element.get_attribute("name").cloned(),
        value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use html::document;

    const COMPLEX_FORM: &str = r#"<!DOCTYPE html><html><head /><body><form id="form-1"><input type="text" id="text-1" name="text-1" value="Some text" /><div><select id="select-1" name="select-1"><option id="option-1" name="option-1">1st option</option><option id="option-2" name="option-2" selected>2nd option</option></select></div></form></body></html>"#;

    fn ids(controls: &[ElementRef]) -> Vec<String> {
        controls
            .iter()
            .map(|c| c.id().cloned().unwrap_or_default())
            .collect()
    }

    #[test]
    fn test_empty_form() {
        let (_, doc) = document(r#"<html><body><form id="form-1"></form></body></html>"#).unwrap();
        let form = doc.get_element_by_id("form-1").unwrap();
        assert!(collect_form_controls(form).is_empty());
    }

    #[test]
    fn test_document_order() {
        let (_, doc) = document(COMPLEX_FORM).unwrap();
        let form = doc.get_element_by_id("form-1").unwrap();
        let controls = collect_form_controls(form);
        assert_eq!(ids(&controls), vec!["text-1", "select-1", "option-1", "option-2"]);
        assert!(controls.iter().all(|c| is_form_control(c)));
        assert_eq!(controls[2].parent.unwrap().id().unwrap(), "select-1");
    }

    #[test]
    fn test_nested_and_mixed_case() {
        let (_, doc) = document(
            r#"<form id="f"><fieldset><LABEL for="t">T</LABEL><p><TextArea id="t"></TextArea></p></fieldset><button id="b">Go</button></form>"#,
        )
        .unwrap();
        let controls = collect_form_controls(ElementRef::root(&doc));
        let tags: Vec<_> = controls.iter().map(|c| c.tag_name()).collect();
        assert_eq!(tags, vec!["label", "textarea"]);
    }

    #[test]
    fn test_root_is_not_collected() {
        let (_, doc) = document(r#"<select id="s"><option>a</option></select>"#).unwrap();
        let controls = collect_form_controls(ElementRef::root(&doc));
        assert_eq!(controls.len(), 1);
        assert!(controls[0].is("option"));
    }

    #[test]
    fn test_extract_textbox_variants() {
        let (_, doc) = document(
            r#"<form><input type="text" id="a" name="a" value="x"><input type="password" id="b" name="b"><input type="email" id="c"><input type="checkbox" id="d"></form>"#,
        )
        .unwrap();
        let inputs = doc.get_elements_by_tag_name("input");
        let data: Vec<_> = inputs.iter().map(|i| extract_control_data(i)).collect();
        assert_eq!(
            data[0],
            Some(ExtractedFieldData {
                kind: ExtractedKind::Textbox,
                id: Some("a".to_string()),
                name: Some("a".to_string()),
                value: Some("x".to_string()),
            })
        );
        // Extraction does not tell password or email inputs apart from text inputs
        assert_eq!(data[1].as_ref().unwrap().kind, ExtractedKind::Textbox);
        assert_eq!(data[2].as_ref().unwrap().kind, ExtractedKind::Textbox);
        assert_eq!(data[2].as_ref().unwrap().name, None);
        assert_eq!(data[3], None);
    }

    #[test]
    fn test_extract_select() {
        let (_, doc) = document(COMPLEX_FORM).unwrap();
        let select = doc.get_element_by_id("select-1").unwrap();
        let data = extract_control_data(&select).unwrap();
        assert_eq!(data.kind, ExtractedKind::Select);
        assert_eq!(data.name.as_deref(), Some("select-1"));
        assert_eq!(data.value.as_deref(), Some("option-2"));

        let (_, none_selected) =
            document(r#"<select id="s" name="s"><option id="o">a</option></select>"#).unwrap();
        assert_eq!(extract_control_data(&none_selected).unwrap().value, None);
    }

    #[test]
    fn test_extract_other_tags() {
        let label = DOMElement::new("label", None, vec![]);
        assert_eq!(extract_control_data(&label), None);
        let option = DOMElement::new("option", None, vec![]);
        assert_eq!(extract_control_data(&option), None);
    }
}
