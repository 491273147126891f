//! One bound input: its generated elements and per-instance state.
//!
//! An instance owns the structure generated around its input (wrapper,
//! optional tag strip, hidden field, clear control, dropdown list) and
//! mirrors its [`SelectionStore`] and [`Dropdown`] into those elements.
//! Behavior lives in the widget; this module only builds and renders.

use std::fmt;

use domtea::{Document, Element, ElementId, ElementKind};

use crate::config::{ClearStyle, Config, Language, SelectionMode, TagsPosition};
use crate::debounce::Debouncer;
use crate::dropdown::{Dropdown, DropdownContent};
use crate::encoding;
use crate::selection::SelectionStore;

/// Identifies one instance within a widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(usize);

impl InstanceId {
    /// Creates an id from an index into the widget's instance list.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    /// The index into the widget's instance list.
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "autocomplete#{}", self.0)
    }
}

/// Elements generated around the bound input.
#[derive(Debug, Clone, Copy)]
pub struct Parts {
    /// The bound text input.
    pub input: ElementId,
    /// The hidden field carrying the encoded keys.
    pub hidden: ElementId,
    /// Outermost generated element; clicks inside it belong to the instance.
    pub wrapper: ElementId,
    /// Tag strip (multi mode only).
    pub tags: Option<ElementId>,
    /// Inline container holding tags and input (inline tags only).
    pub input_container: Option<ElementId>,
    /// The clear control.
    pub clear: ElementId,
    /// The dropdown list.
    pub list: ElementId,
}

/// State of one bound input.
#[derive(Debug)]
pub struct Instance {
    pub(crate) id: InstanceId,
    pub(crate) parts: Parts,
    pub(crate) store: SelectionStore,
    pub(crate) debouncer: Debouncer,
    pub(crate) dropdown: Dropdown,
    pub(crate) disabled: bool,
    pub(crate) search_seq: u64,
    rows: Vec<ElementId>,
    removes: Vec<ElementId>,
}

/// Name of the hidden field generated for `input`.
///
/// `data-key-name` wins, then `<name>_key`, then `autocomplete_key`.
pub fn hidden_field_name(input: &Element) -> String {
    if let Some(name) = input.data("key-name").filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    match input.name.as_deref().filter(|n| !n.is_empty()) {
        Some(name) => format!("{name}_key"),
        None => "autocomplete_key".to_string(),
    }
}

impl Instance {
    /// Generates the structure around `input` and returns the new instance.
    pub fn mount(
        doc: &mut Document,
        id: InstanceId,
        input: ElementId,
        config: &Config,
        language: &Language,
    ) -> Self {
        let mode = config.mode();
        let inline = mode.is_multi() && config.tags_position == TagsPosition::Inline;

        let hidden_name = hidden_field_name(doc.get(input));
        {
            let el = doc.get_mut(input);
            if el.placeholder.is_empty() {
                el.placeholder = language.placeholder.clone();
            }
        }

        let wrapper = doc.wrap(input, Element::new(ElementKind::Div).with_class("autocomplete-wrapper"));

        let mut tags = None;
        if mode.is_multi() && !inline {
            tags = Some(doc.insert(
                wrapper,
                Element::new(ElementKind::Div).with_class("autocomplete-tags"),
            ));
        }

        let group = doc.insert(
            wrapper,
            Element::new(ElementKind::Div).with_class("autocomplete-input-group"),
        );

        let mut input_container = None;
        if inline {
            let container = doc.insert(
                group,
                Element::new(ElementKind::Div).with_class("autocomplete-input-container"),
            );
            tags = Some(doc.insert(
                container,
                Element::new(ElementKind::Span).with_class("autocomplete-tags"),
            ));
            doc.append_child(container, input);
            input_container = Some(container);
        } else {
            doc.append_child(group, input);
        }

        let hidden = doc.insert(group, Element::hidden_input().with_name(hidden_name));

        let clear_kind = match config.clear_style {
            ClearStyle::Button => ElementKind::Button,
            ClearStyle::Icon => ElementKind::Span,
        };
        let mut clear_el = Element::new(clear_kind)
            .with_class("autocomplete-clear")
            .with_text("\u{00d7}")
            .hide();
        clear_el.title = language.clear_title.clone();
        let clear = doc.insert(group, clear_el);

        let list = config.dropdown_classes().fold(
            Element::new(ElementKind::Ul)
                .with_class("autocomplete-dropdown")
                .hide(),
            |el, class| el.with_class(class),
        );
        let list = doc.insert(wrapper, list);

        Self {
            id,
            parts: Parts {
                input,
                hidden,
                wrapper,
                tags,
                input_container,
                clear,
                list,
            },
            store: SelectionStore::new(mode.capacity()),
            debouncer: Debouncer::new(config.debounce),
            dropdown: Dropdown::new(),
            disabled: false,
            search_seq: 0,
            rows: Vec::new(),
            removes: Vec::new(),
        }
    }

    /// The instance id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The generated elements.
    pub fn parts(&self) -> &Parts {
        &self.parts
    }

    /// The selection store.
    pub fn store(&self) -> &SelectionStore {
        &self.store
    }

    /// The dropdown state.
    pub fn dropdown(&self) -> &Dropdown {
        &self.dropdown
    }

    /// Whether the instance is disabled.
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Single mode: whether a selection is committed.
    pub(crate) fn is_selected(&self) -> bool {
        !self.store.is_empty()
    }

    /// Mirrors the dropdown state into the list element.
    pub(crate) fn render_dropdown(&mut self, doc: &mut Document, language: &Language) {
        let list = self.parts.list;
        doc.remove_children(list);
        self.rows.clear();
        match self.dropdown.content() {
            DropdownContent::Empty => {}
            DropdownContent::NoResults => {
                doc.insert(
                    list,
                    Element::new(ElementKind::Li)
                        .with_class("autocomplete-no-results")
                        .with_text(language.no_results.clone()),
                );
            }
            DropdownContent::Rows(rows) => {
                for (i, c) in rows.iter().enumerate() {
                    let mut row = Element::new(ElementKind::Li)
                        .with_class("autocomplete-item")
                        .with_data("key", c.key.clone())
                        .with_data("value", c.value.clone())
                        .with_text(c.value.clone());
                    if self.dropdown.active() == Some(i) {
                        row.add_class("active");
                    }
                    self.rows.push(doc.insert(list, row));
                }
            }
        }
        doc.get_mut(list).hidden = !self.dropdown.is_visible();
    }

    /// Moves the `active` class to the current active row.
    pub(crate) fn render_active(&self, doc: &mut Document) {
        for (i, &row) in self.rows.iter().enumerate() {
            let el = doc.get_mut(row);
            if self.dropdown.active() == Some(i) {
                el.add_class("active");
            } else {
                el.remove_class("active");
            }
        }
    }

    /// Hides the dropdown and its list element.
    pub(crate) fn hide_dropdown(&mut self, doc: &mut Document) {
        self.dropdown.hide();
        doc.get_mut(self.parts.list).hidden = true;
    }

    /// Rebuilds the tag strip from the store.
    pub(crate) fn render_tags(&mut self, doc: &mut Document, language: &Language) {
        let Some(tags) = self.parts.tags else {
            return;
        };
        doc.remove_children(tags);
        self.removes.clear();
        for (i, c) in self.store.items().iter().enumerate() {
            let tag = doc.insert(
                tags,
                Element::new(ElementKind::Span).with_class("autocomplete-tag"),
            );
            doc.insert(
                tag,
                Element::new(ElementKind::Span).with_text(c.value.clone()),
            );
            let mut remove = Element::new(ElementKind::Span)
                .with_class("autocomplete-tag-remove")
                .with_data("index", i.to_string())
                .with_text("\u{00d7}");
            remove.title = language.remove_title.clone();
            self.removes.push(doc.insert(tag, remove));
        }
    }

    /// Writes the encoded keys into the hidden field.
    pub(crate) fn sync_hidden(&self, doc: &mut Document, mode: SelectionMode) {
        doc.get_mut(self.parts.hidden).value = encoding::encode(&self.store, mode);
    }

    /// Writes the keys left after a tag removal into the hidden field.
    pub(crate) fn sync_hidden_after_remove(&self, doc: &mut Document, mode: SelectionMode) {
        doc.get_mut(self.parts.hidden).value = encoding::encode_remaining(&self.store, mode);
    }

    /// Shows or hides the clear control.
    pub(crate) fn set_clear_visible(&self, doc: &mut Document, visible: bool) {
        doc.get_mut(self.parts.clear).hidden = !visible;
    }

    /// Returns true if `target` lies inside this instance's structure.
    pub(crate) fn owns(&self, doc: &Document, target: ElementId) -> bool {
        doc.contains(self.parts.wrapper, target)
    }

    /// Index of the dropdown row containing `target`.
    pub(crate) fn row_at(&self, doc: &Document, target: ElementId) -> Option<usize> {
        self.rows.iter().position(|&row| doc.contains(row, target))
    }

    /// Index of the tag whose remove control contains `target`.
    pub(crate) fn remove_control_at(&self, doc: &Document, target: ElementId) -> Option<usize> {
        self.removes.iter().position(|&rm| doc.contains(rm, target))
    }

    /// Returns true if `target` is the clear control.
    pub(crate) fn is_clear_control(&self, doc: &Document, target: ElementId) -> bool {
        doc.contains(self.parts.clear, target)
    }

    /// Returns true if a click on `target` should focus the input: the inline
    /// container itself or its tag strip background.
    pub(crate) fn is_focus_surface(&self, target: ElementId) -> bool {
        self.parts.input_container == Some(target)
            || (self.parts.input_container.is_some() && self.parts.tags == Some(target))
    }

    /// Renders the instance as text.
    pub(crate) fn view(&self, doc: &Document) -> String {
        let mut lines = Vec::new();
        let input = doc.get(self.parts.input);

        let tags: Vec<String> = self
            .store
            .items()
            .iter()
            .map(|c| format!("[{} \u{00d7}]", c.value))
            .collect();
        if !tags.is_empty() {
            lines.push(tags.join(" "));
        }

        let mut field = if input.value.is_empty() {
            format!("> ({})", input.placeholder)
        } else {
            format!("> {}", input.value)
        };
        if self.disabled || input.disabled {
            field.push_str(" (disabled)");
        } else if input.read_only {
            field.push_str(" (read-only)");
        }
        if !doc.get(self.parts.clear).hidden {
            field.push_str(" [\u{00d7}]");
        }
        lines.push(field);

        if self.dropdown.is_visible() {
            match self.dropdown.content() {
                DropdownContent::Empty => {}
                DropdownContent::NoResults => {
                    if let Some(&li) = doc.get(self.parts.list).children().first() {
                        lines.push(format!("    {}", doc.get(li).text));
                    }
                }
                DropdownContent::Rows(rows) => {
                    for (i, c) in rows.iter().enumerate() {
                        let marker = if self.dropdown.active() == Some(i) { ">" } else { " " };
                        lines.push(format!("  {marker} {}", c.value));
                    }
                }
            }
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::candidate::Candidate;

    fn mount(config: &Config, input: Element) -> (Document, Instance) {
        let mut doc = Document::new();
        let body = doc.body();
        let input = doc.insert(body, input);
        let inst = Instance::mount(&mut doc, InstanceId::new(0), input, config, &Language::default());
        (doc, inst)
    }

    #[test]
    fn test_hidden_field_name_precedence() {
        let el = Element::input().with_name("city").with_data("key-name", "city_id");
        assert_eq!(hidden_field_name(&el), "city_id");
        assert_eq!(hidden_field_name(&Element::input().with_name("city")), "city_key");
        assert_eq!(hidden_field_name(&Element::input()), "autocomplete_key");
    }

    #[test]
    fn test_mount_single_structure() {
        let (doc, inst) = mount(&Config::default(), Element::input().with_name("city"));
        let parts = inst.parts();
        assert!(parts.tags.is_none());
        assert!(parts.input_container.is_none());
        assert!(doc.contains(parts.wrapper, parts.input));
        assert!(doc.is_connected(parts.wrapper));
        assert_eq!(doc.get(parts.hidden).name.as_deref(), Some("city_key"));
        assert_eq!(doc.get(parts.input).placeholder, "Search...");
        assert!(doc.get(parts.clear).hidden);
        assert_eq!(doc.get(parts.clear).kind, ElementKind::Button);
        assert!(doc.get(parts.list).hidden);
    }

    #[test]
    fn test_mount_adds_dropdown_classes() {
        let config = Config::default().class_name("compact dark");
        let (doc, inst) = mount(&config, Element::input());
        let list = doc.get(inst.parts().list);
        assert_eq!(list.classes, vec!["autocomplete-dropdown", "compact", "dark"]);
        assert_eq!(doc.query_selector_all(".autocomplete-dropdown.dark").unwrap().len(), 1);
    }

    #[test]
    fn test_mount_keeps_existing_placeholder() {
        let (doc, inst) = mount(
            &Config::default().clear_style(ClearStyle::Icon),
            Element::input().with_placeholder("City"),
        );
        assert_eq!(doc.get(inst.parts().input).placeholder, "City");
        assert_eq!(doc.get(inst.parts().clear).kind, ElementKind::Span);
    }

    #[test]
    fn test_mount_inline_tags() {
        let config = Config::default()
            .max_selections(3)
            .tags_position(TagsPosition::Inline);
        let (doc, inst) = mount(&config, Element::input());
        let parts = inst.parts();
        let container = parts.input_container.unwrap();
        assert!(doc.contains(container, parts.tags.unwrap()));
        assert!(doc.contains(container, parts.input));
        assert!(inst.is_focus_surface(container));
        assert!(!inst.is_focus_surface(parts.input));
    }

    #[test]
    fn test_render_tags_and_lookup() {
        let (mut doc, mut inst) = mount(&Config::default().max_selections(3), Element::input());
        inst.store.add(Candidate::new("1", "Apple"));
        inst.store.add(Candidate::new("2", "Banana"));
        inst.render_tags(&mut doc, &Language::default());

        let tags = inst.parts().tags.unwrap();
        assert_eq!(doc.get(tags).children().len(), 2);
        let second = doc.get(tags).children()[1];
        let remove = doc.get(second).children()[1];
        assert_eq!(doc.get(remove).data("index"), Some("1"));
        assert_eq!(doc.get(remove).title, "Remove");
        assert_eq!(inst.remove_control_at(&doc, remove), Some(1));
    }

    #[test]
    fn test_render_dropdown_rows() {
        let (mut doc, mut inst) = mount(&Config::default(), Element::input());
        inst.dropdown.show(vec![Candidate::new("1", "Apple"), Candidate::new("2", "Apricot")]);
        inst.dropdown.move_down();
        inst.render_dropdown(&mut doc, &Language::default());

        let list = inst.parts().list;
        assert!(!doc.get(list).hidden);
        let rows = doc.get(list).children().to_vec();
        assert_eq!(rows.len(), 2);
        assert!(doc.get(rows[0]).has_class("active"));
        assert_eq!(doc.get(rows[1]).data("key"), Some("2"));
        assert_eq!(inst.row_at(&doc, rows[1]), Some(1));
        assert_eq!(inst.view(&doc), "> (Search...)\n  > Apple\n    Apricot");
    }

    #[test]
    fn test_render_no_results() {
        let (mut doc, mut inst) = mount(&Config::default(), Element::input());
        inst.dropdown.show(Vec::new());
        inst.render_dropdown(&mut doc, &Language::default());
        let list = inst.parts().list;
        let li = doc.get(list).children()[0];
        assert_eq!(doc.get(li).text, "No results found");
        assert!(inst.row_at(&doc, li).is_none());
    }
}
