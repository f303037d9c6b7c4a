//! Flat element model and a compound-selector matcher.
//!
//! The storefront renders each view as a flat list of [`Node`]s. Selectors
//! are matched one compound at a time (`tag`, `#id`, `.class`, `[attr]`,
//! `[attr="v"]`, `[attr^="v"]`, `[attr*="v"]`); comma-separated lists are
//! unions. Combinators are not supported.

use crate::driver::ElementSnapshot;
use crate::locator::{Selector, TEST_ID_ATTRIBUTE};
use std::collections::BTreeMap;

/// What happens when a node is clicked, filled or selected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum Action {
    #[default]
    None,
    Login,
    DismissError,
    AddToCart(usize),
    RemoveFromCart(usize),
    OpenCart,
    OpenMenu,
    CloseMenu,
    Logout,
    ResetState,
    AllItems,
    ContinueShopping,
    Checkout,
    ContinueCheckout,
    CancelInformation,
    CancelOverview,
    Finish,
    BackHome,
    Input(&'static str),
    Sort,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    pub tag: &'static str,
    pub id: Option<&'static str>,
    pub classes: Vec<&'static str>,
    pub attrs: BTreeMap<&'static str, String>,
    pub text: String,
    pub value: Option<String>,
    pub visible: bool,
    pub enabled: bool,
    pub action: Action,
}

impl Node {
    pub fn new(tag: &'static str) -> Self {
        Self {
            tag,
            visible: true,
            enabled: true,
            ..Self::default()
        }
    }

    pub fn id(mut self, id: &'static str) -> Self {
        self.id = Some(id);
        self
    }

    pub fn class(mut self, class: &'static str) -> Self {
        self.classes.push(class);
        self
    }

    pub fn test_id(self, id: impl Into<String>) -> Self {
        self.attr(TEST_ID_ATTRIBUTE, id)
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        let _ = self.attrs.insert(name, value.into());
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn value(mut self, value: impl Into<String>) -> Self {
        let value = value.into();
        let _ = self.attrs.insert("value", value.clone());
        self.value = Some(value);
        self
    }

    pub const fn visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    pub const fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub const fn action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.map(str::to_string),
            "class" => (!self.classes.is_empty()).then(|| self.classes.join(" ")),
            _ => self.attrs.get(name).cloned(),
        }
    }

    pub fn snapshot(&self) -> ElementSnapshot {
        let mut attributes: BTreeMap<String, String> = self
            .attrs
            .iter()
            .map(|(k, v)| ((*k).to_string(), v.clone()))
            .collect();
        if let Some(id) = self.id {
            let _ = attributes.insert("id".to_string(), id.to_string());
        }
        if !self.classes.is_empty() {
            let _ = attributes.insert("class".to_string(), self.classes.join(" "));
        }
        ElementSnapshot {
            tag: self.tag.to_string(),
            text: self.text.clone(),
            visible: self.visible,
            enabled: self.enabled,
            value: self.value.clone(),
            attributes,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    op: AttrOp,
    value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Compound {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

impl Compound {
    fn matches(&self, node: &Node) -> bool {
        if self.tag.as_deref().is_some_and(|t| t != node.tag) {
            return false;
        }
        if self.id.as_deref().is_some_and(|id| node.id != Some(id)) {
            return false;
        }
        if !self
            .classes
            .iter()
            .all(|c| node.classes.iter().any(|nc| *nc == c.as_str()))
        {
            return false;
        }
        self.attrs.iter().all(|m| match node.attribute(&m.name) {
            None => false,
            Some(actual) => match m.op {
                AttrOp::Exists => true,
                AttrOp::Equals => actual == m.value,
                AttrOp::Prefix => actual.starts_with(&m.value),
                AttrOp::Contains => actual.contains(&m.value),
            },
        })
    }
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn take_name(chars: &[char], pos: &mut usize) -> Result<String, String> {
    let start = *pos;
    while *pos < chars.len() && is_name_char(chars[*pos]) {
        *pos += 1;
    }
    if start == *pos {
        return Err(format!("expected a name at offset {start}"));
    }
    Ok(chars[start..*pos].iter().collect())
}

fn parse_attr(chars: &[char], pos: &mut usize) -> Result<AttrMatch, String> {
    let name = take_name(chars, pos)?;
    let op = match chars.get(*pos) {
        Some(']') => {
            *pos += 1;
            return Ok(AttrMatch {
                name,
                op: AttrOp::Exists,
                value: String::new(),
            });
        }
        Some('=') => {
            *pos += 1;
            AttrOp::Equals
        }
        Some('^') if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            AttrOp::Prefix
        }
        Some('*') if chars.get(*pos + 1) == Some(&'=') => {
            *pos += 2;
            AttrOp::Contains
        }
        other => return Err(format!("unexpected {other:?} in attribute selector")),
    };
    let value = match chars.get(*pos) {
        Some(&quote) if quote == '"' || quote == '\'' => {
            *pos += 1;
            let start = *pos;
            while *pos < chars.len() && chars[*pos] != quote {
                *pos += 1;
            }
            if *pos >= chars.len() {
                return Err("unterminated attribute value".to_string());
            }
            let value: String = chars[start..*pos].iter().collect();
            *pos += 1;
            value
        }
        _ => take_name(chars, pos)?,
    };
    if chars.get(*pos) != Some(&']') {
        return Err("expected ']'".to_string());
    }
    *pos += 1;
    Ok(AttrMatch { name, op, value })
}

fn parse_compound(css: &str) -> Result<Compound, String> {
    let chars: Vec<char> = css.trim().chars().collect();
    if chars.is_empty() {
        return Err("empty selector".to_string());
    }
    let mut compound = Compound::default();
    let mut pos = 0;
    if is_name_char(chars[0]) {
        compound.tag = Some(take_name(&chars, &mut pos)?);
    }
    while pos < chars.len() {
        match chars[pos] {
            '#' => {
                pos += 1;
                compound.id = Some(take_name(&chars, &mut pos)?);
            }
            '.' => {
                pos += 1;
                compound.classes.push(take_name(&chars, &mut pos)?);
            }
            '[' => {
                pos += 1;
                compound.attrs.push(parse_attr(&chars, &mut pos)?);
            }
            c if c.is_whitespace() || c == '>' || c == '+' || c == '~' => {
                return Err(format!("combinators are not supported in '{css}'"));
            }
            c => return Err(format!("unexpected '{c}' in '{css}'")),
        }
    }
    Ok(compound)
}

/// Split a selector list on commas outside brackets/quotes
fn split_list(css: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;
    for (i, c) in css.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.saturating_sub(1),
            (None, ',') if depth == 0 => {
                parts.push(&css[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&css[start..]);
    parts
}

/// Compiled selector
#[derive(Debug, Clone)]
pub(crate) struct Matcher {
    alternatives: Vec<Compound>,
    text: Option<String>,
}

impl Matcher {
    pub fn compile(selector: &Selector) -> Result<Self, String> {
        let css = selector.to_css();
        let alternatives = split_list(&css)
            .into_iter()
            .map(parse_compound)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            alternatives,
            text: selector.text_filter().map(str::to_string),
        })
    }

    pub fn matches(&self, node: &Node) -> bool {
        let text_ok = self
            .text
            .as_deref()
            .map_or(true, |t| node.text.contains(t));
        text_ok && self.alternatives.iter().any(|c| c.matches(node))
    }

    /// Indices of matching nodes, in document order
    pub fn select<'a>(&self, nodes: &'a [Node]) -> Vec<&'a Node> {
        nodes.iter().filter(|n| self.matches(n)).collect()
    }
}
