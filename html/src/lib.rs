use std::collections::HashMap;
use std::fmt::Display;

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct DOMElement {
    pub name: String,
    pub attributes: DOMAttributes,
    pub contents: Vec<DOMContent>,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum DOMContent {
    Element(DOMElement),
    Text(String),
}

#[derive(Debug, Clone, Default, Eq, PartialEq)]
pub struct DOMAttributes(pub HashMap<String, String>);

impl DOMAttributes {
    pub fn empty() -> Self {
        Self(HashMap::new())
    }
    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(key)
    }
}

/// Build a [`DOMAttributes`] map, e.g. `attributes!(id=>"text-1", for=>"text-1", selected=>"")`.
/// Underscores in keys become hyphens
#[macro_export]
macro_rules! attributes {
    ($($k:tt=>$v:expr),* $(,)?) => {
        $crate::DOMAttributes(::std::collections::HashMap::from([
            $((stringify!($k).replace('_', "-"), $v.to_string())),*
        ]))
    };
}

impl From<DOMElement> for DOMContent {
    fn from(el: DOMElement) -> Self {
        DOMContent::Element(el)
    }
}

impl From<&str> for DOMContent {
    fn from(s: &str) -> Self {
        DOMContent::Text(s.to_string())
    }
}

impl From<String> for DOMContent {
    fn from(s: String) -> Self {
        DOMContent::Text(s)
    }
}

const INPUT_TYPES: [&str; 22] = [
    "button", "checkbox", "color", "date", "datetime-local", "email", "file", "hidden", "image",
    "month", "number", "password", "radio", "range", "reset", "search", "submit", "tel", "text",
    "time", "url", "week",
];

const BUTTON_TYPES: [&str; 3] = ["submit", "reset", "button"];

/// A borrowed element together with the element that contains it
#[derive(Debug, Clone, Copy)]
pub struct ElementRef<'a> {
    pub element: &'a DOMElement,
    pub parent: Option<&'a DOMElement>,
}

impl<'a> ElementRef<'a> {
    pub fn root(element: &'a DOMElement) -> Self {
        Self {
            element,
            parent: None,
        }
    }

    /// Child elements of this element, each paired with this element as parent
    pub fn children(&self) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        let parent = self.element;
        parent.child_elements().map(move |element| ElementRef {
            element,
            parent: Some(parent),
        })
    }

    /// Pre-order traversal of every element below this one (not including itself)
    pub fn descendants(&self) -> Vec<ElementRef<'a>> {
        let mut out = Vec::new();
        self.collect_descendants(&mut out);
        out
    }

    fn collect_descendants(&self, out: &mut Vec<ElementRef<'a>>) {
        for child in self.children() {
            out.push(child);
            child.collect_descendants(out);
        }
    }
}

impl<'a> std::ops::Deref for ElementRef<'a> {
    type Target = DOMElement;
    fn deref(&self) -> &Self::Target {
        self.element
    }
}

impl DOMElement {
    pub fn new(
        name: impl Display,
        attributes: Option<DOMAttributes>,
        contents: Vec<DOMContent>,
    ) -> Self {
        Self {
            name: name.to_string(),
            attributes: attributes.unwrap_or_default(),
            contents,
        }
    }

    /// Lower-cased tag name
    pub fn tag_name(&self) -> String {
        self.name.to_ascii_lowercase()
    }

    pub fn is(&self, tag: &str) -> bool {
        self.name.eq_ignore_ascii_case(tag)
    }

    pub fn get_attribute(&self, key: &str) -> Option<&String> {
        self.attributes.get(key)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.0.contains_key(key)
    }

    pub fn id(&self) -> Option<&String> {
        self.get_attribute("id")
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &DOMElement> {
        self.contents.iter().filter_map(|c| match c {
            DOMContent::Element(el) => Some(el),
            DOMContent::Text(_) => None,
        })
    }

    /// Every element in this tree (this one included) with a matching tag name, in document order
    pub fn get_elements_by_tag_name(&self, name: &str) -> Vec<ElementRef<'_>> {
        let root = ElementRef::root(self);
        std::iter::once(root)
            .chain(root.descendants())
            .filter(|e| e.is(name))
            .collect()
    }

    /// First element in this tree (this one included) whose `id` attribute is `id`
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementRef<'_>> {
        let root = ElementRef::root(self);
        if root.id().map(String::as_str) == Some(id) {
            return Some(root);
        }
        root.descendants()
            .into_iter()
            .find(|e| e.id().map(String::as_str) == Some(id))
    }

    /// Concatenated text of every descendant text node
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        for content in &self.contents {
            match content {
                DOMContent::Text(t) => text.push_str(t),
                DOMContent::Element(el) => text.push_str(&el.text_content()),
            }
        }
        text
    }

    /// The value an `<option>` submits: its `value` attribute, or its text with whitespace
    /// collapsed
    pub fn option_value(&self) -> String {
        match self.get_attribute("value") {
            Some(v) => v.clone(),
            None => self
                .text_content()
                .split_whitespace()
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Effective `type` of a form control. Missing or unrecognised types fall back to `text` for
    /// `input` and `submit` for `button`
    pub fn control_type(&self) -> Option<String> {
        let (known, default): (&[&str], &str) = if self.is("input") {
            (&INPUT_TYPES[..], "text")
        } else if self.is("button") {
            (&BUTTON_TYPES[..], "submit")
        } else {
            return None;
        };
        let declared = self
            .get_attribute("type")
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| known.contains(&t.as_str()));
        Some(declared.unwrap_or_else(|| default.to_string()))
    }

    /// Removes the first element below this one with the given id, returning it
    pub fn remove_element_by_id(&mut self, id: &str) -> Option<DOMElement> {
        let position = self.contents.iter().position(|c| {
            matches!(c, DOMContent::Element(el) if el.id().map(String::as_str) == Some(id))
        });
        if let Some(pos) = position {
            if let DOMContent::Element(el) = self.contents.remove(pos) {
                return Some(el);
            }
        }
        self.contents.iter_mut().find_map(|c| match c {
            DOMContent::Element(el) => el.remove_element_by_id(id),
            DOMContent::Text(_) => None,
        })
    }

    /// Appends `element` to the first element named `tag` in this tree. Returns `false` if there
    /// is no such element
    pub fn append_to(&mut self, tag: &str, element: DOMElement) -> bool {
        if self.is(tag) {
            self.contents.push(element.into());
            return true;
        }
        for content in self.contents.iter_mut() {
            if let DOMContent::Element(el) = content {
                if el.contains_tag(tag) {
                    return el.append_to(tag, element);
                }
            }
        }
        false
    }

    fn contains_tag(&self, tag: &str) -> bool {
        self.is(tag) || self.child_elements().any(|c| c.contains_tag(tag))
    }
}

mod display;
mod parsing;
#[cfg(test)]
mod tests;

pub use parsing::{document, is_void_element};
