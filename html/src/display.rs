use std::fmt;

use super::parsing::{is_raw_text_element, is_void_element};
use super::{DOMContent, DOMElement};

fn escape(s: &str, in_attribute: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if in_attribute => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Serializes back to HTML. Attributes are written in name order so output is stable
impl fmt::Display for DOMElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}", self.name)?;
        let mut attributes: Vec<_> = self.attributes.0.iter().collect();
        attributes.sort();
        for (key, value) in attributes {
            if value.is_empty() {
                write!(f, " {}", key)?;
            } else {
                write!(f, " {}=\"{}\"", key, escape(value, true))?;
            }
        }
        write!(f, ">")?;
        if is_void_element(&self.name) {
            return Ok(());
        }
        for content in &self.contents {
            match content {
                DOMContent::Text(t) if is_raw_text_element(&self.name) => write!(f, "{}", t)?,
                content => write!(f, "{}", content)?,
            }
        }
        write!(f, "</{}>", self.name)
    }
}

impl fmt::Display for DOMContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DOMContent::Element(el) => write!(f, "{}", el),
            DOMContent::Text(t) => write!(f, "{}", escape(t, false)),
        }
    }
}

#[cfg(test)]
#[test]
fn test_serialize() {
    let el = DOMElement::new(
        "select",
        Some(crate::attributes!(name=>"s", id=>"s")),
        vec![DOMElement::new(
            "option",
            Some(crate::attributes!(selected=>"")),
            vec!["Fish & chips".into()],
        )
        .into()],
    );
    assert_eq!(
        el.to_string(),
        r#"<select id="s" name="s"><option selected>Fish &amp; chips</option></select>"#
    );
    let input = DOMElement::new("input", Some(crate::attributes!(value=>"\"quoted\"")), vec![]);
    assert_eq!(input.to_string(), r#"<input value="&quot;quoted&quot;">"#);
}
