//! The autocomplete widget.
//!
//! [`Autocomplete`] binds every input matching a selector and implements
//! [`Model`]: the host delivers DOM events as messages and runs the returned
//! commands (debounce ticks, search results). All instances share one
//! configuration and one delegated click handler.

use std::collections::HashMap;

use domtea::{
    ClickMsg, Cmd, DocumentHandle, ElementId, FocusMsg, InputMsg, KeyDownMsg, KeyMsg, Message,
    Model,
};
use tracing::{debug, error, info};

use crate::candidate::Candidate;
use crate::config::{Config, Language, SelectionMode, TagsPosition};
use crate::debounce::DebounceMsg;
use crate::error::{AutocompleteError, Result};
use crate::instance::{Instance, InstanceId};
use crate::keymap::{KeyMap, NavAction};
use crate::selection::{Keys, SelectionValue};
use crate::source::{Retrieval, post_process};

/// Default selector when none is given.
pub const DEFAULT_SELECTOR: &str = ".autocomplete";

/// Results of one search, delivered back to the widget.
#[derive(Debug)]
pub struct SearchResultsMsg {
    /// The instance that searched.
    pub instance: InstanceId,
    /// Sequence number of the search within its instance.
    pub seq: u64,
    /// Raw provider results, before exclusion and truncation.
    pub results: Vec<Candidate>,
}

/// Normalizes a selector: empty means [`DEFAULT_SELECTOR`], and a bare name
/// without `#` or `.` is taken as a class.
pub fn normalize_selector(selector: &str) -> String {
    let selector = selector.trim();
    if selector.is_empty() {
        DEFAULT_SELECTOR.to_string()
    } else if selector.starts_with('#') || selector.starts_with('.') {
        selector.to_string()
    } else {
        format!(".{selector}")
    }
}

/// An autocomplete widget bound to one or more inputs.
///
/// # Example
///
/// ```rust
/// use domtea::{Document, Element};
/// use typeahead::{Autocomplete, Candidate, Config};
///
/// let doc = Document::shared();
/// let body = doc.borrow().body();
/// doc.borrow_mut().insert(body, Element::input().with_class("city"));
///
/// let widget = Autocomplete::new(
///     doc.clone(),
///     "city",
///     Config::default().data(vec![Candidate::new("1", "Berlin")]),
/// );
/// assert_eq!(widget.instance_count(), 1);
/// ```
pub struct Autocomplete {
    document: DocumentHandle,
    config: Config,
    language: Language,
    keymap: KeyMap,
    instances: Vec<Instance>,
    by_input: HashMap<ElementId, InstanceId>,
    initialized: bool,
}

impl std::fmt::Debug for Autocomplete {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Autocomplete")
            .field("config", &self.config)
            .field("instances", &self.instances.len())
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl Autocomplete {
    /// Binds every input matching `selector` using the default language.
    ///
    /// A selector that matches nothing is logged and yields a widget with no
    /// instances.
    pub fn new(document: DocumentHandle, selector: &str, config: Config) -> Self {
        Self::with_language(document, selector, config, Language::default())
    }

    /// Binds every input matching `selector` with custom strings.
    pub fn with_language(
        document: DocumentHandle,
        selector: &str,
        config: Config,
        language: Language,
    ) -> Self {
        match Self::try_new(document.clone(), selector, config.clone(), language.clone()) {
            Ok(widget) => widget,
            Err(err) => {
                error!(error = %err, "autocomplete: construction failed");
                Self::unbound(document, config, language)
            }
        }
    }

    /// Binds every input matching `selector`, reporting a miss as an error.
    pub fn try_new(
        document: DocumentHandle,
        selector: &str,
        config: Config,
        language: Language,
    ) -> Result<Self> {
        let selector = normalize_selector(selector);
        let inputs = document.borrow().query_selector_all(&selector)?;
        if inputs.is_empty() {
            return Err(AutocompleteError::NoElements { selector });
        }

        let mut widget = Self::unbound(document, config, language);
        for input in inputs {
            widget.bind(input);
        }
        widget.initialized = true;
        info!(
            selector = %selector,
            instances = widget.instances.len(),
            mode = ?widget.config.mode(),
            "autocomplete: bound"
        );

        if let Some(on_loaded) = widget.config.on_loaded.clone() {
            on_loaded();
        }
        Ok(widget)
    }

    fn unbound(document: DocumentHandle, config: Config, language: Language) -> Self {
        Self {
            document,
            config,
            language,
            keymap: KeyMap::default(),
            instances: Vec::new(),
            by_input: HashMap::new(),
            initialized: false,
        }
    }

    /// Replaces the navigation key bindings.
    #[must_use]
    pub fn with_keymap(mut self, keymap: KeyMap) -> Self {
        self.keymap = keymap;
        self
    }

    fn bind(&mut self, input: ElementId) {
        let id = InstanceId::new(self.instances.len());
        let (instance, disabled_attr) = {
            let mut doc = self.document.borrow_mut();
            let disabled_attr = doc.get(input).disabled;
            let instance = Instance::mount(&mut doc, id, input, &self.config, &self.language);
            (instance, disabled_attr)
        };
        self.instances.push(instance);
        self.by_input.insert(input, id);
        debug!(instance = %id, input = %input, "autocomplete: mounted");

        self.apply_defaults(id, input);
        if self.config.disabled || disabled_attr {
            self.disable_instance(id);
        }
    }

    fn apply_defaults(&mut self, id: InstanceId, input: ElementId) {
        match self.config.mode() {
            SelectionMode::Multi { .. } => {
                let defaults = self.config.default_selections.clone().unwrap_or_default();
                for candidate in defaults.into_iter().filter(Candidate::is_complete) {
                    self.commit(id, candidate);
                }
            }
            SelectionMode::Single => {
                let (data_key, data_value) = {
                    let doc = self.document.borrow();
                    let el = doc.get(input);
                    (
                        el.data("default-key").map(str::to_string),
                        el.data("default-value").map(str::to_string),
                    )
                };
                let key = non_empty(self.config.default_key.clone()).or(non_empty(data_key));
                let value = non_empty(self.config.default_value.clone()).or(non_empty(data_value));
                if let (Some(key), Some(value)) = (key, value) {
                    self.commit(id, Candidate::new(key, value));
                }
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Number of bound inputs.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// The instance at `index`, in document order.
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    /// All instances in document order.
    pub fn instances(&self) -> &[Instance] {
        &self.instances
    }

    /// The instance bound to `input`.
    pub fn instance_for(&self, input: ElementId) -> Option<&Instance> {
        self.by_input
            .get(&input)
            .and_then(|id| self.instances.get(id.index()))
    }

    /// The shared document.
    pub fn document(&self) -> &DocumentHandle {
        &self.document
    }

    /// The resolved configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The user-facing strings.
    pub fn language(&self) -> &Language {
        &self.language
    }

    /// The navigation key bindings.
    pub fn keymap(&self) -> &KeyMap {
        &self.keymap
    }

    // -------------------------------------------------------------------------
    // Programmatic surface
    // -------------------------------------------------------------------------

    /// The current selection of every instance.
    pub fn value(&self) -> Vec<SelectionValue> {
        self.instances
            .iter()
            .map(|inst| snapshot(inst, self.config.mode()).1)
            .collect()
    }

    /// Replaces the selection of every instance, by position.
    ///
    /// In multi mode a list resets the instance and adds each complete
    /// candidate. In single mode a complete candidate is selected. Anything
    /// else, including a missing entry, clears the instance.
    pub fn set_value(&mut self, values: Vec<SelectionValue>) {
        let mode = self.config.mode();
        for index in 0..self.instances.len() {
            let id = InstanceId::new(index);
            match (mode, values.get(index)) {
                (SelectionMode::Multi { .. }, Some(SelectionValue::Multi(list))) => {
                    self.reset(id);
                    for candidate in list.iter().filter(|c| c.is_complete()) {
                        self.commit(id, candidate.clone());
                    }
                }
                (_, Some(SelectionValue::Single(Some(candidate)))) if candidate.is_complete() => {
                    self.commit(id, candidate.clone());
                }
                _ => {
                    self.clear_instance(id);
                }
            }
        }
    }

    /// The selected key(s) of every instance.
    pub fn keys(&self) -> Vec<Keys> {
        self.instances
            .iter()
            .map(|inst| snapshot(inst, self.config.mode()).0)
            .collect()
    }

    /// Disables every instance.
    pub fn disable(&mut self) {
        for index in 0..self.instances.len() {
            self.disable_instance(InstanceId::new(index));
        }
    }

    /// Enables every instance.
    pub fn enable(&mut self) {
        for index in 0..self.instances.len() {
            self.enable_instance(InstanceId::new(index));
        }
    }

    /// Clears every instance.
    ///
    /// Focus moves to each input in turn without a `focus` event.
    pub fn clear(&mut self) {
        for index in 0..self.instances.len() {
            self.clear_instance(InstanceId::new(index));
        }
    }

    /// Unbinds every instance. Messages that arrive afterwards, including
    /// pending search results, are ignored.
    pub fn destroy(&mut self) {
        {
            let mut doc = self.document.borrow_mut();
            for inst in &mut self.instances {
                inst.debouncer.cancel();
                inst.hide_dropdown(&mut doc);
            }
        }
        info!(instances = self.instances.len(), "autocomplete: destroyed");
        self.instances.clear();
        self.by_input.clear();
    }

    // -------------------------------------------------------------------------
    // Selection transitions
    // -------------------------------------------------------------------------

    fn commit(&mut self, id: InstanceId, candidate: Candidate) {
        let mode = self.config.mode();
        let Some(inst) = self.instances.get_mut(id.index()) else {
            return;
        };
        {
            let mut doc = self.document.borrow_mut();
            match mode {
                SelectionMode::Multi { .. } => {
                    if !inst.store.add(candidate.clone()) {
                        debug!(instance = %id, key = %candidate.key, "autocomplete: selection full");
                        return;
                    }
                    inst.render_tags(&mut doc, &self.language);
                    inst.sync_hidden(&mut doc, mode);
                    let full = inst.store.is_full();
                    let input = doc.get_mut(inst.parts.input);
                    input.value.clear();
                    if full {
                        input.disabled = true;
                        input.placeholder.clear();
                    }
                }
                SelectionMode::Single => {
                    inst.store.replace(candidate.clone());
                    inst.sync_hidden(&mut doc, mode);
                    let input = doc.get_mut(inst.parts.input);
                    input.value = candidate.value.clone();
                    input.read_only = true;
                }
            }
            inst.set_clear_visible(&mut doc, true);
            inst.hide_dropdown(&mut doc);
        }
        debug!(instance = %id, key = %candidate.key, "autocomplete: selected");
        self.notify_change(id);
    }

    fn remove(&mut self, id: InstanceId, index: usize) {
        let Some(inst) = self.instances.get_mut(id.index()) else {
            return;
        };
        let Some(removed) = inst.store.remove_at(index) else {
            return;
        };
        {
            let mut doc = self.document.borrow_mut();
            inst.render_tags(&mut doc, &self.language);
            inst.sync_hidden_after_remove(&mut doc, self.config.mode());
            let input = doc.get_mut(inst.parts.input);
            input.disabled = inst.disabled;
            input.placeholder = self.language.placeholder.clone();
            if inst.store.is_empty() {
                inst.set_clear_visible(&mut doc, false);
            }
        }
        debug!(instance = %id, key = %removed.key, "autocomplete: removed");
        self.notify_change(id);
    }

    /// Empties the store and restores the input without notifying anyone.
    fn reset(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(id.index()) else {
            return;
        };
        inst.store.clear();
        let mut doc = self.document.borrow_mut();
        inst.render_tags(&mut doc, &self.language);
        inst.sync_hidden(&mut doc, self.config.mode());
        let input = doc.get_mut(inst.parts.input);
        input.value.clear();
        input.read_only = false;
        input.disabled = inst.disabled;
        input.placeholder = self.language.placeholder.clone();
        inst.set_clear_visible(&mut doc, false);
    }

    /// Clears one instance and focuses its input. Returns the input when
    /// focus moved to it.
    fn clear_instance(&mut self, id: InstanceId) -> Option<ElementId> {
        self.reset(id);
        let inst = self.instances.get(id.index())?;
        let input = inst.parts.input;
        let moved = {
            let mut doc = self.document.borrow_mut();
            if inst.disabled || doc.focused() == Some(input) {
                false
            } else {
                doc.focus(input);
                true
            }
        };
        debug!(instance = %id, "autocomplete: cleared");
        if self.initialized {
            if let Some(on_clear) = self.config.on_clear.clone() {
                on_clear();
            }
        }
        moved.then_some(input)
    }

    fn notify_change(&self, id: InstanceId) {
        if !self.initialized {
            return;
        }
        let (Some(on_change), Some(inst)) = (self.config.on_change.clone(), self.instances.get(id.index()))
        else {
            return;
        };
        let (keys, value) = snapshot(inst, self.config.mode());
        on_change(&keys, &value);
    }

    fn disable_instance(&mut self, id: InstanceId) {
        let Some(inst) = self.instances.get_mut(id.index()) else {
            return;
        };
        inst.disabled = true;
        inst.debouncer.cancel();
        let mut doc = self.document.borrow_mut();
        doc.get_mut(inst.parts.input).disabled = true;
        doc.get_mut(inst.parts.clear).disabled = true;
        if let Some(container) = inst.parts.input_container {
            doc.get_mut(container).add_class("disabled");
        }
        inst.hide_dropdown(&mut doc);
    }

    fn enable_instance(&mut self, id: InstanceId) {
        let multi = self.config.mode().is_multi();
        let Some(inst) = self.instances.get_mut(id.index()) else {
            return;
        };
        inst.disabled = false;
        let mut doc = self.document.borrow_mut();
        doc.get_mut(inst.parts.input).disabled = multi && inst.store.is_full();
        doc.get_mut(inst.parts.clear).disabled = false;
        if let Some(container) = inst.parts.input_container {
            doc.get_mut(container).remove_class("disabled");
        }
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Reads the input and either searches or hides the dropdown.
    fn run_query(&mut self, id: InstanceId) -> Option<Cmd> {
        let mode = self.config.mode();
        let inst = self.instances.get_mut(id.index())?;
        let query = self
            .document
            .borrow()
            .get(inst.parts.input)
            .value
            .trim()
            .to_string();

        if !mode.is_multi() && inst.is_selected() {
            return None;
        }
        if query.chars().count() < self.config.min_length {
            inst.hide_dropdown(&mut self.document.borrow_mut());
            return None;
        }

        inst.search_seq += 1;
        let seq = inst.search_seq;
        debug!(instance = %id, query = %query, seq, "autocomplete: search");

        match self.config.source.search(&query, self.config.case_sensitive) {
            Retrieval::Ready(results) => Some(Cmd::new(move || {
                Message::new(SearchResultsMsg {
                    instance: id,
                    seq,
                    results,
                })
            })),
            Retrieval::Pending(fut) => Some(Cmd::future(async move {
                let results = fut.await;
                Message::new(SearchResultsMsg {
                    instance: id,
                    seq,
                    results,
                })
            })),
        }
    }

    fn show_results(&mut self, msg: SearchResultsMsg) {
        let Some(inst) = self.instances.get_mut(msg.instance.index()) else {
            debug!(instance = %msg.instance, "autocomplete: results for unbound instance dropped");
            return;
        };
        if inst.disabled {
            return;
        }
        if self.config.discard_stale_results && msg.seq != inst.search_seq {
            debug!(
                instance = %msg.instance,
                seq = msg.seq,
                latest = inst.search_seq,
                "autocomplete: stale results dropped"
            );
            return;
        }
        let results = post_process(
            msg.results,
            inst.store.keys(),
            self.config.mode().is_multi(),
            self.config.max_items,
        );
        debug!(instance = %msg.instance, rows = results.len(), "autocomplete: results");
        inst.dropdown.show(results);
        inst.render_dropdown(&mut self.document.borrow_mut(), &self.language);
    }

    // -------------------------------------------------------------------------
    // Event handlers
    // -------------------------------------------------------------------------

    fn on_input(&mut self, target: ElementId) -> Option<Cmd> {
        let id = *self.by_input.get(&target)?;
        let inst = self.instances.get_mut(id.index())?;
        if inst.disabled {
            return None;
        }
        Some(inst.debouncer.trigger(id))
    }

    fn on_debounce(&mut self, msg: &DebounceMsg) -> Option<Cmd> {
        let inst = self.instances.get(msg.instance.index())?;
        if inst.disabled || !inst.debouncer.accept(msg) {
            return None;
        }
        self.run_query(msg.instance)
    }

    fn on_focus(&mut self, target: ElementId) -> Option<Cmd> {
        let id = *self.by_input.get(&target)?;
        let inst = self.instances.get(id.index())?;
        if inst.disabled || (!self.config.mode().is_multi() && inst.is_selected()) {
            return None;
        }
        let len = self.document.borrow().get(target).value.chars().count();
        if len >= self.config.min_length {
            self.run_query(id)
        } else {
            None
        }
    }

    fn on_key(&mut self, target: ElementId, key: &KeyMsg) -> Option<Cmd> {
        let id = *self.by_input.get(&target)?;
        let action = self.keymap.action(key)?;
        let multi = self.config.mode().is_multi();
        let inline = self.config.tags_position == TagsPosition::Inline;
        let inst = self.instances.get_mut(id.index())?;
        if inst.disabled {
            return None;
        }

        match action {
            NavAction::Down | NavAction::Up => {
                let moved = if action == NavAction::Down {
                    inst.dropdown.move_down()
                } else {
                    inst.dropdown.move_up()
                };
                if moved {
                    inst.render_active(&mut self.document.borrow_mut());
                }
            }
            NavAction::Select => {
                if let Some(candidate) = inst.dropdown.active_candidate().cloned() {
                    self.commit(id, candidate);
                }
            }
            NavAction::Dismiss => inst.hide_dropdown(&mut self.document.borrow_mut()),
            NavAction::RemoveLast => {
                let empty = self.document.borrow().get(target).value.is_empty();
                if multi && inline && empty && !inst.store.is_empty() {
                    let last = inst.store.len() - 1;
                    self.remove(id, last);
                }
            }
        }
        None
    }

    fn on_click(&mut self, target: ElementId) -> Option<Cmd> {
        let owner = {
            let mut doc = self.document.borrow_mut();
            let owner = self
                .instances
                .iter()
                .find(|inst| inst.owns(&doc, target))
                .map(Instance::id);
            for inst in &mut self.instances {
                if Some(inst.id) != owner && inst.dropdown.is_visible() {
                    inst.hide_dropdown(&mut doc);
                }
            }
            owner
        }?;

        enum Hit {
            Row(Candidate),
            Clear,
            Remove(usize),
            Focus,
        }

        let hit = {
            let inst = self.instances.get(owner.index())?;
            if inst.disabled {
                return None;
            }
            let doc = self.document.borrow();
            if let Some(row) = inst.row_at(&doc, target) {
                inst.dropdown.rows().get(row).cloned().map(Hit::Row)
            } else if inst.is_clear_control(&doc, target) {
                Some(Hit::Clear)
            } else if let Some(index) = inst.remove_control_at(&doc, target) {
                Some(Hit::Remove(index))
            } else if inst.is_focus_surface(target) {
                Some(Hit::Focus)
            } else {
                None
            }
        }?;

        match hit {
            Hit::Row(candidate) => {
                self.commit(owner, candidate);
                None
            }
            Hit::Clear => self.clear_instance(owner).map(focus_cmd),
            Hit::Remove(index) => {
                self.remove(owner, index);
                None
            }
            Hit::Focus => {
                let input = self.instances.get(owner.index())?.parts.input;
                let mut doc = self.document.borrow_mut();
                if doc.focused() == Some(input) {
                    return None;
                }
                doc.focus(input);
                Some(focus_cmd(input))
            }
        }
    }
}

impl Model for Autocomplete {
    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if let Some(m) = msg.downcast_ref::<InputMsg>() {
            return self.on_input(m.target);
        }
        if let Some(m) = msg.downcast_ref::<DebounceMsg>() {
            return self.on_debounce(m);
        }
        if let Some(m) = msg.downcast_ref::<FocusMsg>() {
            return self.on_focus(m.target);
        }
        if let Some(m) = msg.downcast_ref::<KeyDownMsg>() {
            return self.on_key(m.target, &m.key);
        }
        if let Some(m) = msg.downcast_ref::<ClickMsg>() {
            return self.on_click(m.target);
        }
        if let Some(results) = msg.downcast::<SearchResultsMsg>() {
            self.show_results(results);
        }
        None
    }

    fn view(&self) -> String {
        let doc = self.document.borrow();
        self.instances
            .iter()
            .map(|inst| inst.view(&doc))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn focus_cmd(input: ElementId) -> Cmd {
    Cmd::new(move || Message::new(FocusMsg { target: input }))
}

fn non_empty(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// The public view of one instance's selection.
fn snapshot(inst: &Instance, mode: SelectionMode) -> (Keys, SelectionValue) {
    let items = inst.store().items();
    match mode {
        SelectionMode::Single => {
            let selected = items.first().cloned();
            let key = selected.as_ref().map(|c| c.key.clone()).unwrap_or_default();
            (Keys::Single(key), SelectionValue::Single(selected))
        }
        SelectionMode::Multi { .. } => (
            Keys::Multi(items.iter().map(|c| c.key.clone()).collect()),
            SelectionValue::Multi(items.to_vec()),
        ),
    }
}
