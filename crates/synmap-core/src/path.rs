//! Path addressing for flattened source documents
//!
//! A [`Path`] names one field occurrence inside a flattened source document.
//! It is a sequence of [`PathElement`]s, each with a name, an optional
//! zero-based index (for repeating groups) and a map of attributes carried as
//! sibling qualifiers on the source field (typically classification scheme
//! URIs).
//!
//! # String form
//!
//! ```text
//! trade.party[1].partyId(partyIdScheme=http://www.fpml.org/coding-scheme/lei)
//! ```
//!
//! Segments are separated by `.`, an index is written as `[n]` and attributes
//! as `(key=value,key=value)` after the index. Dots, brackets and `=` are
//! allowed inside attribute values. Inside the attribute list a backslash
//! escapes the next character, so `,` `)` and `\` in values (and `=` in keys)
//! are written as `\,` `\)` `\\` and `\=`. Keys and values are kept verbatim,
//! including surrounding whitespace.
//!
//! Paths are immutable: [`Path::add_element`], [`Path::parent`] and
//! [`Path::with_last_index`] return new instances.

use crate::error::MappingError;
use crate::result::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// One named segment of a [`Path`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathElement {
    name: String,
    index: Option<usize>,
    attributes: BTreeMap<String, String>,
}

impl PathElement {
    /// Create a non-repeated element with no attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            index: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the occurrence index of this element within its repeating group
    pub fn with_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Add an attribute qualifier
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Zero-based index, `None` for non-repeated fields
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn attributes(&self) -> &BTreeMap<String, String> {
        &self.attributes
    }

    /// Look up a single attribute value
    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// Write `text`, backslash-escaping backslashes and every character of `special`
fn write_escaped(f: &mut fmt::Formatter<'_>, text: &str, special: &[char]) -> fmt::Result {
    for ch in text.chars() {
        if ch == '\\' || special.contains(&ch) {
            f.write_str("\\")?;
        }
        write!(f, "{ch}")?;
    }
    Ok(())
}

impl fmt::Display for PathElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if let Some(index) = self.index {
            write!(f, "[{index}]")?;
        }
        if !self.attributes.is_empty() {
            write!(f, "(")?;
            for (i, (key, value)) in self.attributes.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write_escaped(f, key, &[',', ')', '='])?;
                write!(f, "=")?;
                write_escaped(f, value, &[',', ')'])?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// Immutable address of one field occurrence in a flattened source document
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Path {
    elements: Vec<PathElement>,
}

impl Path {
    /// Create an empty path
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a path from already constructed elements
    pub fn from_elements(elements: Vec<PathElement>) -> Self {
        Self { elements }
    }

    /// Parse a path from its string form
    ///
    /// The empty string parses to the empty path.
    pub fn parse(input: &str) -> Result<Self> {
        let mut elements = Vec::new();
        for segment in split_segments(input)? {
            elements.push(parse_segment(input, &segment)?);
        }
        Ok(Self { elements })
    }

    pub fn elements(&self) -> &[PathElement] {
        &self.elements
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Element names in order, ignoring indexes and attributes
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.elements.iter().map(PathElement::name)
    }

    /// Return a new path with a plain element appended
    pub fn add_element(&self, name: impl Into<String>) -> Path {
        self.append(PathElement::new(name))
    }

    /// Return a new path with the given element appended
    pub fn append(&self, element: PathElement) -> Path {
        let mut elements = self.elements.clone();
        elements.push(element);
        Path { elements }
    }

    /// Return the path without its last element
    ///
    /// The parent of a single-element path (and of the empty path) is the
    /// empty path.
    pub fn parent(&self) -> Path {
        let keep = self.elements.len().saturating_sub(1);
        Path {
            elements: self.elements[..keep].to_vec(),
        }
    }

    /// The last element of the path
    pub fn last_element(&self) -> Result<&PathElement> {
        self.elements
            .last()
            .ok_or_else(|| MappingError::malformed_path("", "path has no elements"))
    }

    /// Index of the element `levels` positions up from the last element
    ///
    /// `index_from_end(0)` is the index of the last element, `index_from_end(1)`
    /// the index of its parent. Returns `None` when that element is not
    /// repeated, and an error when the path is not that deep.
    pub fn index_from_end(&self, levels: usize) -> Result<Option<usize>> {
        if levels >= self.elements.len() {
            return Err(MappingError::malformed_path(
                self.to_string(),
                format!(
                    "cannot go {levels} levels up from a path of {} elements",
                    self.elements.len()
                ),
            ));
        }
        Ok(self.elements[self.elements.len() - 1 - levels].index)
    }

    /// Return a copy with the last element's index replaced
    pub fn with_last_index(&self, index: usize) -> Result<Path> {
        let mut elements = self.elements.clone();
        match elements.last_mut() {
            Some(last) => last.index = Some(index),
            None => {
                return Err(MappingError::malformed_path("", "cannot index an empty path"));
            }
        }
        Ok(Path { elements })
    }

    /// Test whether the trailing element names equal `suffix`
    ///
    /// Indexes and attributes are ignored. An empty suffix matches every path.
    pub fn ends_with<S: AsRef<str>>(&self, suffix: &[S]) -> bool {
        if suffix.len() > self.elements.len() {
            return false;
        }
        let offset = self.elements.len() - suffix.len();
        self.elements[offset..]
            .iter()
            .zip(suffix)
            .all(|(element, name)| element.name == name.as_ref())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, element) in self.elements.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            write!(f, "{element}")?;
        }
        Ok(())
    }
}

impl FromStr for Path {
    type Err = MappingError;

    fn from_str(s: &str) -> Result<Self> {
        Path::parse(s)
    }
}

impl TryFrom<String> for Path {
    type Error = MappingError;

    fn try_from(value: String) -> Result<Self> {
        Path::parse(&value)
    }
}

impl From<Path> for String {
    fn from(path: Path) -> Self {
        path.to_string()
    }
}

/// Split on `.` outside of attribute parentheses
fn split_segments(input: &str) -> Result<Vec<String>> {
    let mut segments = Vec::new();
    if input.is_empty() {
        return Ok(segments);
    }

    let mut current = String::new();
    let mut in_attributes = false;
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if in_attributes => {
                current.push(ch);
                match chars.next() {
                    Some(escaped) => current.push(escaped),
                    None => {
                        return Err(MappingError::malformed_path(input, "dangling escape"));
                    }
                }
            }
            '.' if !in_attributes => {
                if current.is_empty() {
                    return Err(MappingError::malformed_path(input, "empty segment"));
                }
                segments.push(std::mem::take(&mut current));
            }
            '(' if !in_attributes => {
                in_attributes = true;
                current.push(ch);
            }
            ')' if in_attributes => {
                in_attributes = false;
                current.push(ch);
            }
            _ => current.push(ch),
        }
    }

    if in_attributes {
        return Err(MappingError::malformed_path(input, "unclosed attribute list"));
    }
    if current.is_empty() {
        return Err(MappingError::malformed_path(input, "empty segment"));
    }
    segments.push(current);

    Ok(segments)
}

fn parse_segment(input: &str, segment: &str) -> Result<PathElement> {
    let (head, attributes) = match segment.find('(') {
        Some(open) => {
            let Some(body) = segment[open + 1..].strip_suffix(')') else {
                return Err(MappingError::malformed_path(
                    input,
                    format!("unexpected text after attribute list in '{segment}'"),
                ));
            };
            (&segment[..open], parse_attributes(input, body)?)
        }
        None => (segment, BTreeMap::new()),
    };

    let (name, index) = match head.find('[') {
        Some(open) => {
            let Some(digits) = head[open + 1..].strip_suffix(']') else {
                return Err(MappingError::malformed_path(
                    input,
                    format!("unclosed index in '{segment}'"),
                ));
            };
            let index = digits.parse::<usize>().map_err(|_| {
                MappingError::malformed_path(
                    input,
                    format!("index '{digits}' is not a non-negative number"),
                )
            })?;
            (&head[..open], Some(index))
        }
        None => (head, None),
    };

    if name.is_empty() {
        return Err(MappingError::malformed_path(input, "segment has no name"));
    }
    if name.contains([']', '(', ')']) {
        return Err(MappingError::malformed_path(
            input,
            format!("invalid characters in segment name '{name}'"),
        ));
    }

    Ok(PathElement {
        name: name.to_string(),
        index,
        attributes,
    })
}

/// Parse the body of an attribute list, resolving backslash escapes
fn parse_attributes(input: &str, body: &str) -> Result<BTreeMap<String, String>> {
    let mut attributes = BTreeMap::new();
    if body.is_empty() {
        return Ok(attributes);
    }

    let mut key = String::new();
    let mut value = String::new();
    let mut in_value = false;
    let mut chars = body.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => {
                let Some(escaped) = chars.next() else {
                    return Err(MappingError::malformed_path(input, "dangling escape"));
                };
                if in_value {
                    value.push(escaped);
                } else {
                    key.push(escaped);
                }
            }
            '=' if !in_value => in_value = true,
            ',' => {
                insert_attribute(input, &mut attributes, &mut key, &mut value, in_value)?;
                in_value = false;
            }
            _ if in_value => value.push(ch),
            _ => key.push(ch),
        }
    }
    insert_attribute(input, &mut attributes, &mut key, &mut value, in_value)?;

    Ok(attributes)
}

fn insert_attribute(
    input: &str,
    attributes: &mut BTreeMap<String, String>,
    key: &mut String,
    value: &mut String,
    has_value: bool,
) -> Result<()> {
    if !has_value {
        return Err(MappingError::malformed_path(
            input,
            format!("attribute '{key}' is not a key=value pair"),
        ));
    }
    if key.is_empty() {
        return Err(MappingError::malformed_path(input, "attribute has no key"));
    }
    attributes.insert(std::mem::take(key), std::mem::take(value));
    Ok(())
}
