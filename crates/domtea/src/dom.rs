//! Headless document model.
//!
//! A [`Document`] is an arena of [`Element`]s addressed by [`ElementId`]. It
//! models the slice of the browser DOM that form widgets read and write:
//! input values, placeholders, the disabled and read-only flags, `data-*`
//! attributes, element visibility, containment and focus. Styling is not
//! modeled; an element is either displayed or `hidden`.
//!
//! # Example
//!
//! ```rust
//! use domtea::dom::{Document, Element, ElementKind};
//!
//! let mut doc = Document::new();
//! let body = doc.body();
//! let input = doc.insert(body, Element::input().with_class("city").with_name("city"));
//!
//! let found = doc.query_selector_all(".city").unwrap();
//! assert_eq!(found, vec![input]);
//! assert_eq!(doc.get(input).kind, ElementKind::Input);
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use thiserror::Error;

/// Errors produced by document queries.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomError {
    /// The selector string could not be parsed.
    #[error("invalid selector '{selector}': {reason}")]
    InvalidSelector {
        /// The offending selector.
        selector: String,
        /// What went wrong.
        reason: String,
    },
}

/// A specialized [`Result`] type for document operations.
pub type Result<T> = std::result::Result<T, DomError>;

/// A shared, single-threaded handle to a document.
///
/// Widgets keep a clone of the handle the way browser widgets keep element
/// references; all access happens on the host event loop.
pub type DocumentHandle = Rc<RefCell<Document>>;

/// Identifier of an element inside one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

impl ElementId {
    /// Returns the arena index of this element.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The element tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementKind {
    /// The document body.
    Body,
    /// `<form>`.
    Form,
    /// `<div>`.
    Div,
    /// `<span>`.
    Span,
    /// `<input>`.
    Input,
    /// `<button>`.
    Button,
    /// `<ul>`.
    Ul,
    /// `<li>`.
    Li,
}

impl ElementKind {
    /// Returns the lowercase tag name.
    pub fn tag_name(self) -> &'static str {
        match self {
            ElementKind::Body => "body",
            ElementKind::Form => "form",
            ElementKind::Div => "div",
            ElementKind::Span => "span",
            ElementKind::Input => "input",
            ElementKind::Button => "button",
            ElementKind::Ul => "ul",
            ElementKind::Li => "li",
        }
    }
}

/// The `type` attribute of an input element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputType {
    /// A single-line text field.
    #[default]
    Text,
    /// A hidden field carried with form submissions.
    Hidden,
    /// A checkbox; submitted only when checked.
    Checkbox,
}

impl InputType {
    fn as_str(self) -> &'static str {
        match self {
            InputType::Text => "text",
            InputType::Hidden => "hidden",
            InputType::Checkbox => "checkbox",
        }
    }
}

/// A node in the document.
#[derive(Debug, Clone)]
pub struct Element {
    /// The tag.
    pub kind: ElementKind,
    /// The `id` attribute.
    pub id: Option<String>,
    /// The `name` attribute.
    pub name: Option<String>,
    /// The class list.
    pub classes: Vec<String>,
    /// `data-*` attributes, keyed without the `data-` prefix (`key-name`).
    pub dataset: BTreeMap<String, String>,
    /// The current value of an input.
    pub value: String,
    /// Text content.
    pub text: String,
    /// Placeholder text of an input.
    pub placeholder: String,
    /// Tooltip text.
    pub title: String,
    /// Input type.
    pub input_type: InputType,
    /// Whether the element is disabled.
    pub disabled: bool,
    /// Whether the input is read-only.
    pub read_only: bool,
    /// Whether a checkbox is checked.
    pub checked: bool,
    /// Whether the element is not displayed.
    pub hidden: bool,
    /// Form submission URL.
    pub action: String,
    /// Form submission method.
    pub method: String,
    parent: Option<ElementId>,
    children: Vec<ElementId>,
}

impl Element {
    /// Creates a detached element of the given kind.
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            id: None,
            name: None,
            classes: Vec::new(),
            dataset: BTreeMap::new(),
            value: String::new(),
            text: String::new(),
            placeholder: String::new(),
            title: String::new(),
            input_type: InputType::Text,
            disabled: false,
            read_only: false,
            checked: false,
            hidden: false,
            action: String::new(),
            method: String::new(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Creates a text input.
    pub fn input() -> Self {
        Self::new(ElementKind::Input)
    }

    /// Creates a hidden input.
    pub fn hidden_input() -> Self {
        Self::new(ElementKind::Input).with_type(InputType::Hidden)
    }

    /// Creates a form with an action URL and method.
    pub fn form(action: impl Into<String>, method: impl Into<String>) -> Self {
        let mut form = Self::new(ElementKind::Form);
        form.action = action.into();
        form.method = method.into();
        form
    }

    /// Sets the `id` attribute.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Sets the `name` attribute.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Adds a class.
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.add_class(class);
        self
    }

    /// Sets a `data-*` attribute (`key` without the prefix).
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.dataset.insert(key.into(), value.into());
        self
    }

    /// Sets the value.
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Sets the text content.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Sets the placeholder.
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Sets the input type.
    pub fn with_type(mut self, input_type: InputType) -> Self {
        self.input_type = input_type;
        self
    }

    /// Marks the element disabled.
    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    /// Marks a checkbox checked.
    pub fn checked(mut self) -> Self {
        self.checked = true;
        self
    }

    /// Marks the element as not displayed.
    pub fn hide(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Returns whether the element carries `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Adds `class` if not already present.
    pub fn add_class(&mut self, class: impl Into<String>) {
        let class = class.into();
        if !self.has_class(&class) {
            self.classes.push(class);
        }
    }

    /// Removes `class` if present.
    pub fn remove_class(&mut self, class: &str) {
        self.classes.retain(|c| c != class);
    }

    /// Returns a `data-*` attribute.
    pub fn data(&self, key: &str) -> Option<&str> {
        self.dataset.get(key).map(String::as_str)
    }

    /// Returns the parent element, if attached.
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }

    /// Returns the child elements in order.
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Returns an attribute value as a selector would see it.
    pub fn attribute(&self, name: &str) -> Option<String> {
        match name {
            "id" => self.id.clone(),
            "name" => self.name.clone(),
            "class" => (!self.classes.is_empty()).then(|| self.classes.join(" ")),
            "type" => (self.kind == ElementKind::Input).then(|| self.input_type.as_str().to_string()),
            "value" => Some(self.value.clone()),
            "placeholder" => Some(self.placeholder.clone()),
            other => other
                .strip_prefix("data-")
                .and_then(|key| self.dataset.get(key).cloned()),
        }
    }
}

/// The document: an arena of elements rooted at a body.
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    free: Vec<ElementId>,
    body: ElementId,
    focused: Option<ElementId>,
    location: Option<String>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Creates an empty document containing only a body.
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new(ElementKind::Body)],
            free: Vec::new(),
            body: ElementId(0),
            focused: None,
            location: None,
        }
    }

    /// Creates an empty document behind a shared handle.
    pub fn shared() -> DocumentHandle {
        Rc::new(RefCell::new(Self::new()))
    }

    /// Returns the body element.
    pub fn body(&self) -> ElementId {
        self.body
    }

    /// Returns the number of live elements, attached or not. Removed
    /// elements are not counted.
    pub fn len(&self) -> usize {
        self.elements.len() - self.free.len()
    }

    /// Returns true if only the body exists.
    pub fn is_empty(&self) -> bool {
        self.len() <= 1
    }

    /// Returns an element.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different document.
    pub fn get(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }

    /// Returns an element mutably.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different document.
    pub fn get_mut(&mut self, id: ElementId) -> &mut Element {
        &mut self.elements[id.0]
    }

    /// Adds a detached element and returns its id.
    ///
    /// Slots freed by [`Document::remove`] are reused first.
    pub fn create(&mut self, element: Element) -> ElementId {
        let element = Element {
            parent: None,
            children: Vec::new(),
            ..element
        };
        if let Some(id) = self.free.pop() {
            self.elements[id.0] = element;
            return id;
        }
        let id = ElementId(self.elements.len());
        self.elements.push(element);
        id
    }

    /// Creates an element and appends it to `parent`.
    pub fn insert(&mut self, parent: ElementId, element: Element) -> ElementId {
        let id = self.create(element);
        self.append_child(parent, id);
        id
    }

    /// Moves `child` to the end of `parent`'s children.
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        self.detach(child);
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
    }

    /// Removes `child` from its parent. The element stays in the arena.
    pub fn detach(&mut self, child: ElementId) {
        if let Some(parent) = self.elements[child.0].parent.take() {
            self.elements[parent.0].children.retain(|&c| c != child);
        }
    }

    /// Detaches every child of `parent`.
    pub fn clear_children(&mut self, parent: ElementId) {
        let children = std::mem::take(&mut self.elements[parent.0].children);
        for child in children {
            self.elements[child.0].parent = None;
        }
    }

    /// Detaches `id` and frees it together with its subtree. Ids of removed
    /// elements must not be used again; their slots go to later
    /// [`Document::create`] calls. The body and already removed ids are
    /// ignored.
    pub fn remove(&mut self, id: ElementId) {
        if id == self.body || self.free.contains(&id) {
            return;
        }
        self.detach(id);
        self.release(id);
    }

    /// Removes every child of `parent` along with their subtrees.
    pub fn remove_children(&mut self, parent: ElementId) {
        let children = std::mem::take(&mut self.elements[parent.0].children);
        for child in children {
            self.elements[child.0].parent = None;
            self.release(child);
        }
    }

    fn release(&mut self, root: ElementId) {
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let slot = std::mem::replace(&mut self.elements[id.0], Element::new(ElementKind::Div));
            stack.extend(slot.children);
            if self.focused == Some(id) {
                self.focused = None;
            }
            self.free.push(id);
        }
    }

    /// Inserts `wrapper` where `target` currently sits and moves `target`
    /// inside it. Returns the wrapper id.
    pub fn wrap(&mut self, target: ElementId, wrapper: Element) -> ElementId {
        let wrapper = self.create(wrapper);
        if let Some(parent) = self.elements[target.0].parent {
            let siblings = &mut self.elements[parent.0].children;
            if let Some(pos) = siblings.iter().position(|&c| c == target) {
                siblings[pos] = wrapper;
            }
            self.elements[wrapper.0].parent = Some(parent);
            self.elements[target.0].parent = None;
        }
        self.append_child(wrapper, target);
        wrapper
    }

    /// Returns true if `node` is `ancestor` or lies inside it.
    pub fn contains(&self, ancestor: ElementId, node: ElementId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.elements[id.0].parent;
        }
        false
    }

    /// Returns true if the element is reachable from the body.
    pub fn is_connected(&self, id: ElementId) -> bool {
        self.contains(self.body, id)
    }

    /// Returns the nearest inclusive ancestor matching `predicate`.
    pub fn closest<F>(&self, node: ElementId, predicate: F) -> Option<ElementId>
    where
        F: Fn(&Element) -> bool,
    {
        let mut current = Some(node);
        while let Some(id) = current {
            if predicate(&self.elements[id.0]) {
                return Some(id);
            }
            current = self.elements[id.0].parent;
        }
        None
    }

    /// Returns the descendants of `root` in document (pre-)order, excluding
    /// `root` itself.
    pub fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let mut stack: Vec<ElementId> = self.elements[root.0].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.elements[id.0].children.iter().rev().copied());
        }
        out
    }

    /// Returns every connected element matching `selector` in document order.
    pub fn query_selector_all(&self, selector: &str) -> Result<Vec<ElementId>> {
        self.query_within(self.body, selector)
    }

    /// Returns the descendants of `root` matching `selector` in document order.
    pub fn query_within(&self, root: ElementId, selector: &str) -> Result<Vec<ElementId>> {
        let selector = Selector::parse(selector)?;
        Ok(self
            .descendants(root)
            .into_iter()
            .filter(|&id| selector.matches(&self.elements[id.0]))
            .collect())
    }

    /// Returns the first connected element whose `id` attribute equals `id`.
    pub fn get_element_by_id(&self, id: &str) -> Option<ElementId> {
        self.descendants(self.body)
            .into_iter()
            .find(|&el| self.elements[el.0].id.as_deref() == Some(id))
    }

    /// Moves focus to `id`.
    pub fn focus(&mut self, id: ElementId) {
        self.focused = Some(id);
    }

    /// Clears focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// Returns the focused element.
    pub fn focused(&self) -> Option<ElementId> {
        self.focused
    }

    /// Records a navigation to `url` (a redirect).
    pub fn navigate(&mut self, url: impl Into<String>) {
        self.location = Some(url.into());
    }

    /// Returns the last navigation target.
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}

// -----------------------------------------------------------------------------
// Selectors
// -----------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttrOp {
    Exists,
    Equals,
    Prefix,
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
    fn matches(&self, el: &Element) -> bool {
        if let Some(tag) = &self.tag {
            if tag != el.kind.tag_name() {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if el.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| el.has_class(c)) {
            return false;
        }
        self.attrs.iter().all(|attr| match el.attribute(&attr.name) {
            None => false,
            Some(actual) => match attr.op {
                AttrOp::Exists => true,
                AttrOp::Equals => actual == attr.value,
                AttrOp::Prefix => actual.starts_with(&attr.value),
            },
        })
    }
}

/// A parsed selector list: `#id`, `.class`, `tag`, `[attr]`, `[attr="v"]`
/// and `[attr^="v"]`, combined into compounds and separated by commas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    alternatives: Vec<Compound>,
}

impl Selector {
    /// Parses a selector list.
    pub fn parse(input: &str) -> Result<Self> {
        let fail = |reason: &str| DomError::InvalidSelector {
            selector: input.to_string(),
            reason: reason.to_string(),
        };

        let chars: Vec<char> = input.chars().collect();
        let mut pos = 0;
        let mut alternatives = Vec::new();
        let mut current = Compound::default();
        let mut current_empty = true;

        let read_ident = |pos: &mut usize| -> String {
            let start = *pos;
            while *pos < chars.len() && is_ident_char(chars[*pos]) {
                *pos += 1;
            }
            chars[start..*pos].iter().collect()
        };

        while pos < chars.len() {
            let c = chars[pos];
            match c {
                ',' => {
                    if current_empty {
                        return Err(fail("empty selector in list"));
                    }
                    alternatives.push(std::mem::take(&mut current));
                    current_empty = true;
                    pos += 1;
                }
                c if c.is_whitespace() => {
                    pos += 1;
                    while pos < chars.len() && chars[pos].is_whitespace() {
                        pos += 1;
                    }
                    if !current_empty && pos < chars.len() && chars[pos] != ',' {
                        return Err(fail("descendant combinators are not supported"));
                    }
                }
                '#' => {
                    pos += 1;
                    let ident = read_ident(&mut pos);
                    if ident.is_empty() {
                        return Err(fail("expected id after '#'"));
                    }
                    current.id = Some(ident);
                    current_empty = false;
                }
                '.' => {
                    pos += 1;
                    let ident = read_ident(&mut pos);
                    if ident.is_empty() {
                        return Err(fail("expected class after '.'"));
                    }
                    current.classes.push(ident);
                    current_empty = false;
                }
                '[' => {
                    pos += 1;
                    let name = read_ident(&mut pos);
                    if name.is_empty() {
                        return Err(fail("expected attribute name"));
                    }
                    let op = if chars.get(pos) == Some(&']') {
                        AttrOp::Exists
                    } else if chars.get(pos) == Some(&'=') {
                        pos += 1;
                        AttrOp::Equals
                    } else if chars.get(pos) == Some(&'^') && chars.get(pos + 1) == Some(&'=') {
                        pos += 2;
                        AttrOp::Prefix
                    } else {
                        return Err(fail("unsupported attribute operator"));
                    };
                    let value = if op == AttrOp::Exists {
                        String::new()
                    } else {
                        match chars.get(pos) {
                            Some(&quote @ ('"' | '\'')) => {
                                pos += 1;
                                let start = pos;
                                while pos < chars.len() && chars[pos] != quote {
                                    pos += 1;
                                }
                                if pos >= chars.len() {
                                    return Err(fail("unterminated string"));
                                }
                                let value: String = chars[start..pos].iter().collect();
                                pos += 1;
                                value
                            }
                            _ => read_ident(&mut pos),
                        }
                    };
                    if chars.get(pos) != Some(&']') {
                        return Err(fail("expected ']'"));
                    }
                    pos += 1;
                    current.attrs.push(AttrMatch { name, op, value });
                    current_empty = false;
                }
                c if is_ident_char(c) => {
                    if !current_empty {
                        return Err(fail("tag name must come first"));
                    }
                    current.tag = Some(read_ident(&mut pos).to_ascii_lowercase());
                    current_empty = false;
                }
                _ => return Err(fail("unexpected character")),
            }
        }

        if current_empty {
            return Err(fail("empty selector"));
        }
        alternatives.push(current);
        Ok(Self { alternatives })
    }

    /// Returns true if `el` matches any alternative.
    pub fn matches(&self, el: &Element) -> bool {
        self.alternatives.iter().any(|c| c.matches(el))
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '-' || c == '_'
}
