use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, tag_no_case, take_until, take_while1},
    character::complete::{char, multispace0, multispace1, satisfy},
    combinator::{map, not, opt, recognize, verify},
    error::{Error, ErrorKind},
    multi::{many0, many1},
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};
use tracing::{debug, span, Level};

use super::{DOMAttributes, DOMContent, DOMElement};

/// Elements which never have contents or a closing tag
const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

/// Elements whose contents are taken verbatim up to the closing tag
const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

pub fn is_void_element(name: &str) -> bool {
    VOID_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

pub(crate) fn is_raw_text_element(name: &str) -> bool {
    RAW_TEXT_ELEMENTS.iter().any(|v| v.eq_ignore_ascii_case(name))
}

/// Parse a complete HTML document, returning its root element. A leading byte order mark,
/// doctype, comments and whitespace around the root are skipped
pub fn document(input: &str) -> IResult<&str, DOMElement> {
    let span = span!(Level::DEBUG, "Parsing document");
    let _enter = span.enter();
    let (r, _) = opt(char('\u{feff}'))(input)?;
    let (r, _) = skip_misc(r)?;
    let (r, root) = parse_element(r)?;
    let (r, _) = skip_misc(r)?;
    debug!(root = %root.name, "Parsed document");
    Ok((r, root))
}

fn skip_misc(input: &str) -> IResult<&str, ()> {
    let (r, _) = many0(alt((multispace1, parse_comment, parse_doctype)))(input)?;
    Ok((r, ()))
}

fn parse_doctype(input: &str) -> IResult<&str, &str> {
    delimited(tag_no_case("<!doctype"), take_until(">"), char('>'))(input)
}

fn parse_comment(input: &str) -> IResult<&str, &str> {
    delimited(tag("<!--"), take_until("-->"), tag("-->"))(input)
}

/// Attempt to parse a string as a valid tag name
fn parse_tag_name(input: &str) -> IResult<&str, &str> {
    verify(
        take_while1(|c: char| c.is_ascii_alphanumeric() || c == '-'),
        |s: &str| s.starts_with(|c: char| c.is_ascii_alphabetic()),
    )(input)
}

/// Parse a tag in the form `</name>`, returning `name`
fn parse_close_tag(input: &str) -> IResult<&str, &str> {
    let (remaining, (_, name, _, _)) =
        tuple((tag("</"), parse_tag_name, multispace0, char('>')))(input)?;
    Ok((remaining, name))
}

/// Parse a tag in the form `<name attr=value ...>` or `<name ... />`, returning the
/// [`DOMElement`] and whether the tag closed itself
fn parse_open_tag(input: &str) -> IResult<&str, (DOMElement, bool)> {
    let (rest, (_, name, attrs, _, end)) = tuple((
        char('<'),
        parse_tag_name,
        many0(preceded(multispace1, single_attr_parser)),
        multispace0,
        alt((tag("/>"), tag(">"))),
    ))(input)?;
    // A repeated attribute is ignored
    let mut attributes = DOMAttributes::empty();
    for (k, v) in attrs {
        attributes
            .0
            .entry(k.to_ascii_lowercase())
            .or_insert_with(|| decode_entities(v));
    }
    Ok((
        rest,
        (DOMElement::new(name, Some(attributes), vec![]), end == "/>"),
    ))
}

/// Parse the text between tags. A `<` which does not begin a tag, comment or close tag is kept
/// as text. Surrounding whitespace is dropped, and whitespace-only runs produce no node
fn parse_text(input: &str) -> IResult<&str, Option<DOMContent>> {
    let stray_lt = terminated(
        tag("<"),
        not(satisfy(|c: char| c.is_ascii_alphabetic() || c == '/' || c == '!')),
    );
    let (remaining, res) = recognize(many1(alt((is_not("<"), stray_lt))))(input)?;
    let trimmed = res.trim();
    if trimmed.is_empty() {
        Ok((remaining, None))
    } else {
        Ok((remaining, Some(DOMContent::Text(decode_entities(trimmed)))))
    }
}

/// Parse the content between an opening and closing tag, returning the list of
/// [`DOMContent`]'s within
fn parse_dom_node_contents(input: &str) -> IResult<&str, Vec<DOMContent>> {
    let (remaining, contents) = many0(alt((
        map(parse_element, |el| Some(DOMContent::Element(el))),
        map(parse_comment, |_| None),
        parse_text,
    )))(input)?;
    Ok((remaining, contents.into_iter().flatten().collect()))
}

/// Parse a complete element, returning the [`DOMElement`]
pub fn parse_element(input: &str) -> IResult<&str, DOMElement> {
    let (r, (mut open, self_closing)) = parse_open_tag(input)?;
    if self_closing || is_void_element(&open.name) {
        return Ok((r, open));
    }
    if is_raw_text_element(&open.name) {
        let close = format!("</{}", open.tag_name());
        let end = r
            .to_ascii_lowercase()
            .find(&close)
            .ok_or_else(|| nom::Err::Error(Error::new(r, ErrorKind::TakeUntil)))?;
        let (text, r) = r.split_at(end);
        let (r, _) = parse_close_tag(r)?;
        if !text.trim().is_empty() {
            open.contents.push(DOMContent::Text(text.to_string()));
        }
        return Ok((r, open));
    }
    let (remaining, contents) = opt(parse_dom_node_contents)(r)?;
    let (remaining, close) = parse_close_tag(remaining)?;
    if !close.eq_ignore_ascii_case(&open.name) {
        return Err(nom::Err::Error(Error::new(remaining, ErrorKind::Verify)));
    }
    open.contents = contents.unwrap_or_default();
    Ok((remaining, open))
}

#[cfg(test)]
#[test]
fn test_node_parse() {
    let data = r#"<html><div class=nothing><h1></h1></div></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new(
            "div",
            Some(crate::attributes!(class=>"nothing")),
            vec![DOMElement::new("h1", None, vec![]).into()],
        )
        .into()],
    );
    assert_eq!(parse_element(data).unwrap(), ("", target));

    let data = r#"<html><h1>Hello, world</h1></html>"#;
    let target = DOMElement::new(
        "html",
        None,
        vec![DOMElement::new("h1", None, vec!["Hello, world".into()]).into()],
    );
    assert_eq!(parse_element(data).unwrap(), ("", target));
}

#[cfg(test)]
#[test]
fn test_parse_malformed() {
    let data = r#"<html></closing><opening></html>"#;
    assert!(parse_element(data).is_err());
    let data = r#"<---></--->"#;
    assert!(parse_element(data).is_err());
    let data = r#"<form><input></form>"#;
    assert!(parse_element(data).is_ok());
    let data = r#"<form><select></form>"#;
    assert!(parse_element(data).is_err());
}

#[cfg(test)]
#[test]
fn test_void_and_self_closing() {
    let data = r#"<form id="f"><input type="text" /><br><label for="a">A</label></form>"#;
    let (rest, form) = parse_element(data).unwrap();
    assert_eq!(rest, "");
    let names: Vec<_> = form.child_elements().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["input", "br", "label"]);
}

#[cfg(test)]
#[test]
fn test_close_tag_case_insensitive() {
    let data = r#"<FORM id="f"><Select name="s"></select></Form>"#;
    let (_, form) = parse_element(data).unwrap();
    assert!(form.is("form"));
    assert_eq!(form.tag_name(), "form");
    assert!(form.child_elements().next().unwrap().is("select"));
}

#[cfg(test)]
#[test]
fn test_raw_text() {
    let data = r#"<script>if (a < b) { go(); }</script>"#;
    let (_, script) = parse_element(data).unwrap();
    assert_eq!(script.text_content(), "if (a < b) { go(); }");

    let data = r#"<SCRIPT>document.write("</p>")</Script>"#;
    let (rest, script) = parse_element(data).unwrap();
    assert_eq!(rest, "");
    assert_eq!(script.text_content(), r#"document.write("</p>")"#);
    assert!(parse_element("<style>p {}").is_err());
}

#[cfg(test)]
#[test]
fn test_less_than_in_text() {
    let data = r#"<form><label for="a">1 < 2 <= 3 <</label><input id="a"></form>"#;
    let (rest, form) = parse_element(data).unwrap();
    assert_eq!(rest, "");
    let label = form.child_elements().next().unwrap();
    assert_eq!(label.text_content(), "1 < 2 <= 3 <");
    assert_eq!(form.child_elements().count(), 2);
}

#[cfg(test)]
#[test]
fn test_tag_parse() {
    let data = r#"<div>"#;
    let target = DOMElement::new("div", None, vec![]);
    assert_eq!(parse_open_tag(data).unwrap(), ("", (target, false)));

    let data = r#"<div class=nothing>"#;
    let target = DOMElement::new("div", Some(crate::attributes!(class=>"nothing")), vec![]);
    assert_eq!(parse_open_tag(data).unwrap(), ("", (target, false)));

    let data = r#"<div attr1 attr2=two attr3='three'
        attr4="number four" />"#;
    let target = DOMElement::new(
        "div",
        Some(crate::attributes!(attr1=>"", attr2=>"two", attr3=>"three", attr4=>"number four")),
        vec![],
    );
    assert_eq!(parse_open_tag(data).unwrap(), ("", (target, true)));
}

// Attribute parsing below

fn parse_single_quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('\''), is_not("'"), char('\'')),
        map(tag("''"), |_| ""),
    ))(input)
}

fn parse_double_quoted(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(char('"'), is_not("\""), char('"')),
        map(tag("\"\""), |_| ""),
    ))(input)
}

fn parse_unquoted(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'=<>`")(input)
}

fn value_parser(input: &str) -> IResult<&str, &str> {
    alt((parse_single_quoted, parse_double_quoted, parse_unquoted))(input)
}

fn name_parser(input: &str) -> IResult<&str, &str> {
    is_not(" \t\r\n\"'>/=")(input)
}

fn single_attr_parser(input: &str) -> IResult<&str, (&str, &str)> {
    let mut key_value = separated_pair(
        name_parser,
        tuple((multispace0, char('='), multispace0)),
        value_parser,
    );
    if let Ok((r, (k, v))) = key_value(input) {
        Ok((r, (k, v)))
    } else {
        let (r, res) = name_parser(input)?;
        Ok((r, (res, "")))
    }
}

/// Replace the character references a form document realistically contains
fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    s.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", "\u{a0}")
        .replace("&amp;", "&")
}

#[cfg(test)]
#[test]
fn test_attributes() {
    let (_, attrs) = single_attr_parser(r#"value="a &amp; b""#).unwrap();
    assert_eq!(attrs, ("value", "a &amp; b"));
    let (_, (el, _)) = parse_open_tag(r#"<input value="a &amp; b" selected>"#).unwrap();
    assert_eq!(el.get_attribute("value").unwrap(), "a & b");
    assert_eq!(el.get_attribute("selected").unwrap(), "");
    let (_, (el, _)) = parse_open_tag(r#"<input name="first" NAME="second">"#).unwrap();
    assert_eq!(el.get_attribute("name").unwrap(), "first");
    let (_, (el, _)) = parse_open_tag(r#"<input VALUE="" NAME = 'n'>"#).unwrap();
    assert_eq!(el.get_attribute("value").unwrap(), "");
    assert_eq!(el.get_attribute("name").unwrap(), "n");
}
