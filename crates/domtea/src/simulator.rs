//! Deterministic host event loop for driving models without a browser.
//!
//! The simulator plays the role of the page's event loop: it delivers DOM
//! events as messages, runs immediate commands after each update, keeps
//! timers on a virtual clock and polls suspended futures. Time only moves
//! when [`ProgramSimulator::advance`] is called, which makes debounce and
//! out-of-order async behavior reproducible in tests.

use std::collections::{BTreeMap, VecDeque};
use std::task::{Context, Poll};
use std::time::Duration;

use futures::future::LocalBoxFuture;
use futures::task::noop_waker_ref;
use tracing::trace;

use crate::Model;
use crate::command::{Cmd, CmdKind};
use crate::dom::{DocumentHandle, ElementId};
use crate::key::{KeyMsg, KeyType};
use crate::message::{BatchMsg, ClickMsg, FocusMsg, InputMsg, KeyDownMsg, Message, SubmitMsg};

type Thunk = Box<dyn FnOnce() -> Option<Message>>;

/// Statistics tracked during simulation.
#[derive(Debug, Clone, Default)]
pub struct SimulationStats {
    /// Number of times update() was called.
    pub update_calls: usize,
    /// Commands that were returned from init/update.
    pub commands_returned: usize,
    /// Timers that fired.
    pub timers_fired: usize,
    /// Futures that resolved.
    pub futures_resolved: usize,
}

/// A simulator for testing Model implementations against a headless document.
///
/// # Example
///
/// ```rust
/// use domtea::{Cmd, Message, Model, dom::Document, simulator::ProgramSimulator};
///
/// struct Counter { count: i32 }
///
/// impl Model for Counter {
///     fn update(&mut self, msg: Message) -> Option<Cmd> {
///         if let Some(n) = msg.downcast::<i32>() {
///             self.count += n;
///         }
///         None
///     }
///     fn view(&self) -> String {
///         format!("Count: {}", self.count)
///     }
/// }
///
/// let mut sim = ProgramSimulator::new(Counter { count: 0 }, Document::shared());
/// sim.dispatch(Message::new(5));
/// sim.dispatch(Message::new(3));
///
/// assert_eq!(sim.model().count, 8);
/// ```
pub struct ProgramSimulator<M: Model> {
    model: M,
    document: DocumentHandle,
    queue: VecDeque<Message>,
    timers: BTreeMap<(Duration, u64), Thunk>,
    pending: Vec<LocalBoxFuture<'static, Option<Message>>>,
    now: Duration,
    next_timer: u64,
    stats: SimulationStats,
    initialized: bool,
}

impl<M: Model> ProgramSimulator<M> {
    /// Create a new simulator with the given model and document.
    pub fn new(model: M, document: DocumentHandle) -> Self {
        Self {
            model,
            document,
            queue: VecDeque::new(),
            timers: BTreeMap::new(),
            pending: Vec::new(),
            now: Duration::ZERO,
            next_timer: 0,
            stats: SimulationStats::default(),
            initialized: false,
        }
    }

    /// Initialize the model, scheduling any returned command.
    pub fn init(&mut self) {
        if self.initialized {
            return;
        }
        self.initialized = true;
        let cmd = self.model.init();
        self.schedule(cmd);
        self.run_until_idle();
    }

    /// Queue a message without processing it.
    pub fn send(&mut self, msg: Message) {
        self.queue.push_back(msg);
    }

    /// Queue a message and process everything that becomes runnable.
    pub fn dispatch(&mut self, msg: Message) {
        self.send(msg);
        self.run_until_idle();
    }

    /// Process queued messages and ready futures until nothing is runnable
    /// without advancing time. Returns the number of messages processed.
    pub fn run_until_idle(&mut self) -> usize {
        if !self.initialized {
            self.init();
        }
        let mut processed = 0;
        loop {
            while let Some(msg) = self.queue.pop_front() {
                self.process(msg);
                processed += 1;
            }
            self.poll_pending();
            if self.queue.is_empty() {
                break;
            }
        }
        processed
    }

    /// Advance the virtual clock, firing due timers in deadline order.
    ///
    /// Each timer's message is fully processed before the next timer fires.
    pub fn advance(&mut self, duration: Duration) {
        self.run_until_idle();
        let target = self.now + duration;
        loop {
            let due = match self.timers.keys().next() {
                Some(&(deadline, seq)) if deadline <= target => (deadline, seq),
                _ => break,
            };
            let Some(run) = self.timers.remove(&due) else {
                break;
            };
            self.now = due.0;
            self.stats.timers_fired += 1;
            trace!(at = ?self.now, "timer fired");
            if let Some(msg) = run() {
                self.queue.push_back(msg);
            }
            self.run_until_idle();
        }
        self.now = target;
    }

    fn process(&mut self, msg: Message) {
        if msg.is::<BatchMsg>() {
            if let Some(BatchMsg(cmds)) = msg.downcast::<BatchMsg>() {
                for cmd in cmds {
                    self.schedule(Some(cmd));
                }
            }
            return;
        }
        self.stats.update_calls += 1;
        let cmd = self.model.update(msg);
        self.schedule(cmd);
    }

    fn schedule(&mut self, cmd: Option<Cmd>) {
        let Some(cmd) = cmd else {
            return;
        };
        self.stats.commands_returned += 1;
        match cmd.into_kind() {
            CmdKind::Immediate(run) => {
                if let Some(msg) = run() {
                    self.queue.push_back(msg);
                }
            }
            CmdKind::Delayed { delay, run } => {
                let seq = self.next_timer;
                self.next_timer += 1;
                self.timers.insert((self.now + delay, seq), run);
            }
            CmdKind::Async(fut) => self.pending.push(fut),
        }
    }

    fn poll_pending(&mut self) {
        let mut cx = Context::from_waker(noop_waker_ref());
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut fut in self.pending.drain(..) {
            match fut.as_mut().poll(&mut cx) {
                Poll::Ready(msg) => {
                    self.stats.futures_resolved += 1;
                    if let Some(msg) = msg {
                        self.queue.push_back(msg);
                    }
                }
                Poll::Pending => still_pending.push(fut),
            }
        }
        self.pending = still_pending;
    }

    // -------------------------------------------------------------------------
    // User gestures
    // -------------------------------------------------------------------------

    /// Replace the value of an input and fire `input`.
    ///
    /// Returns false (and fires nothing) when the element is disabled or
    /// read-only, as a browser would.
    pub fn type_text(&mut self, target: ElementId, text: &str) -> bool {
        {
            let mut doc = self.document.borrow_mut();
            let el = doc.get_mut(target);
            if el.disabled || el.read_only {
                return false;
            }
            el.value = text.to_string();
        }
        self.dispatch(Message::new(InputMsg { target }));
        true
    }

    /// Focus an element and fire `focus`.
    pub fn focus(&mut self, target: ElementId) {
        if self.document.borrow().get(target).disabled {
            return;
        }
        self.document.borrow_mut().focus(target);
        self.dispatch(Message::new(FocusMsg { target }));
    }

    /// Press a key on the focused element. Ignored when nothing has focus.
    pub fn key(&mut self, key_type: KeyType) {
        self.key_msg(KeyMsg::from_type(key_type));
    }

    /// Deliver a full key message to the focused element.
    pub fn key_msg(&mut self, key: KeyMsg) {
        let Some(target) = self.document.borrow().focused() else {
            return;
        };
        self.dispatch(Message::new(KeyDownMsg { target, key }));
    }

    /// Click an element.
    pub fn click(&mut self, target: ElementId) {
        self.dispatch(Message::new(ClickMsg { target }));
    }

    /// Submit a form.
    pub fn submit(&mut self, form: ElementId) {
        self.dispatch(Message::new(SubmitMsg { form }));
    }

    // -------------------------------------------------------------------------
    // Inspection
    // -------------------------------------------------------------------------

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.now
    }

    /// Number of timers that have not fired yet.
    pub fn pending_timers(&self) -> usize {
        self.timers.len()
    }

    /// Number of futures that have not resolved yet.
    pub fn pending_futures(&self) -> usize {
        self.pending.len()
    }

    /// Get a reference to the current model state.
    pub fn model(&self) -> &M {
        &self.model
    }

    /// Get a mutable reference to the current model state.
    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    /// Consume the simulator and return the final model.
    pub fn into_model(self) -> M {
        self.model
    }

    /// The document the simulator delivers events for.
    pub fn document(&self) -> &DocumentHandle {
        &self.document
    }

    /// Get the simulation statistics.
    pub fn stats(&self) -> &SimulationStats {
        &self.stats
    }

    /// Render the model.
    pub fn view(&self) -> String {
        self.model.view()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{batch, tick};
    use crate::dom::{Document, Element};
    use futures::channel::oneshot;
    use futures::FutureExt;

    struct Recorder {
        seen: Vec<String>,
    }

    struct Schedule(&'static str, u64);
    struct Wait(oneshot::Receiver<&'static str>);

    impl Model for Recorder {
        fn update(&mut self, msg: Message) -> Option<Cmd> {
            if let Some(s) = msg.downcast_ref::<&'static str>() {
                self.seen.push((*s).to_string());
                return None;
            }
            if let Some(Schedule(label, ms)) = msg.downcast_ref::<Schedule>() {
                let label = *label;
                return Some(tick(Duration::from_millis(*ms), move || Message::new(label)));
            }
            if let Some(InputMsg { .. }) = msg.downcast_ref::<InputMsg>() {
                self.seen.push("input".to_string());
                return None;
            }
            if msg.is::<Wait>() {
                let Wait(rx) = msg.downcast::<Wait>()?;
                return Some(Cmd::future_optional(rx.map(|r| r.ok().map(Message::new))));
            }
            None
        }

        fn view(&self) -> String {
            self.seen.join(",")
        }
    }

    fn sim() -> ProgramSimulator<Recorder> {
        ProgramSimulator::new(Recorder { seen: Vec::new() }, Document::shared())
    }

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut sim = sim();
        sim.dispatch(Message::new(Schedule("late", 300)));
        sim.dispatch(Message::new(Schedule("early", 100)));
        assert_eq!(sim.pending_timers(), 2);

        sim.advance(Duration::from_millis(99));
        assert!(sim.model().seen.is_empty());

        sim.advance(Duration::from_millis(1));
        assert_eq!(sim.view(), "early");

        sim.advance(Duration::from_millis(500));
        assert_eq!(sim.view(), "early,late");
        assert_eq!(sim.now(), Duration::from_millis(600));
        assert_eq!(sim.stats().timers_fired, 2);
    }

    #[test]
    fn test_futures_resolve_in_completion_order() {
        let mut sim = sim();
        let (tx1, rx1) = oneshot::channel();
        let (tx2, rx2) = oneshot::channel();
        sim.dispatch(Message::new(Wait(rx1)));
        sim.dispatch(Message::new(Wait(rx2)));
        assert_eq!(sim.pending_futures(), 2);

        tx2.send("second").unwrap();
        sim.run_until_idle();
        assert_eq!(sim.view(), "second");

        tx1.send("first").unwrap();
        sim.run_until_idle();
        assert_eq!(sim.view(), "second,first");
        assert_eq!(sim.pending_futures(), 0);
    }

    #[test]
    fn test_batch_is_unpacked() {
        let mut sim = sim();
        let cmd = batch(vec![
            Some(Cmd::new(|| Message::new("a"))),
            Some(Cmd::new(|| Message::new("b"))),
        ]);
        sim.schedule(cmd);
        sim.run_until_idle();
        assert_eq!(sim.view(), "a,b");
    }

    #[test]
    fn test_type_text_respects_disabled_and_read_only() {
        let doc = Document::shared();
        let (enabled, disabled, read_only) = {
            let mut d = doc.borrow_mut();
            let body = d.body();
            let enabled = d.insert(body, Element::input());
            let disabled = d.insert(body, Element::input().disabled());
            let read_only = d.insert(body, Element::input());
            d.get_mut(read_only).read_only = true;
            (enabled, disabled, read_only)
        };
        let mut sim = ProgramSimulator::new(Recorder { seen: Vec::new() }, doc.clone());

        assert!(sim.type_text(enabled, "abc"));
        assert!(!sim.type_text(disabled, "abc"));
        assert!(!sim.type_text(read_only, "abc"));
        assert_eq!(sim.view(), "input");
        assert_eq!(doc.borrow().get(enabled).value, "abc");
        assert_eq!(doc.borrow().get(disabled).value, "");
    }

    #[test]
    fn test_key_without_focus_is_ignored() {
        let mut sim = sim();
        sim.key(KeyType::Enter);
        assert_eq!(sim.stats().update_calls, 0);
    }
}
