#![allow(clippy::pedantic)]
#![allow(clippy::nursery)]

//! End-to-end submissions driven through the simulator.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use ajaxform::feedback::{FEEDBACK_CLASS, GROUP_CLASS, INVALID_CLASS};
use ajaxform::prelude::*;
use ajaxform::{Outcome, SubmitResultMsg};
use domtea::simulator::ProgramSimulator;
use domtea::{
    Cmd, Document, DocumentHandle, Element, ElementId, ElementKind, InputType, KeyType, Message,
    Model, SubmitMsg,
};
use futures::FutureExt;
use futures::channel::oneshot;
use typeahead::{Autocomplete, Config, candidates};

// =============================================================================
// Helpers
// =============================================================================

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn with_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let captured = Captured::default();
    let writer = captured.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(tracing::Level::DEBUG)
        .finish();
    let out = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
    (out, logs)
}

struct SignupPage {
    doc: DocumentHandle,
    form: ElementId,
    email: ElementId,
    email_slot: ElementId,
    name: ElementId,
    name_slot: ElementId,
}

/// A signup form with two grouped fields, a hidden token and a checkbox.
fn signup_page(action: &str) -> SignupPage {
    let doc = Document::shared();
    let mut d = doc.borrow_mut();
    let body = d.body();
    let form = d.insert(body, Element::form(action, "post").with_id("signup"));

    let group = d.insert(form, Element::new(ElementKind::Div).with_class(GROUP_CLASS));
    let email = d.insert(group, Element::input().with_name("email").with_value("a@b.c"));
    let email_slot = d.insert(
        group,
        Element::new(ElementKind::Div).with_class(FEEDBACK_CLASS).hide(),
    );

    let group = d.insert(form, Element::new(ElementKind::Div).with_class(GROUP_CLASS));
    let name = d.insert(group, Element::input().with_id("name").with_name("name"));
    let name_slot = d.insert(
        group,
        Element::new(ElementKind::Div).with_class(FEEDBACK_CLASS).hide(),
    );

    d.insert(form, Element::hidden_input().with_name("csrf").with_value("t0k"));
    d.insert(
        form,
        Element::input()
            .with_type(InputType::Checkbox)
            .with_name("terms")
            .checked(),
    );
    drop(d);

    SignupPage {
        doc,
        form,
        email,
        email_slot,
        name,
        name_slot,
    }
}

type Requests = Rc<RefCell<Vec<SubmitRequest>>>;

/// A transport that records every request and answers with `answer`.
fn answering(answer: Result<SubmitResponse, TransportError>) -> (impl Transport, Requests) {
    let requests: Requests = Rc::default();
    let log = requests.clone();
    let transport = move |req: SubmitRequest| -> TransportFuture {
        log.borrow_mut().push(req);
        let answer = answer.clone();
        async move { answer }.boxed_local()
    };
    (transport, requests)
}

type Replies = Rc<RefCell<Vec<oneshot::Sender<Result<SubmitResponse, TransportError>>>>>;

/// A transport whose requests stay pending until the test answers them.
fn deferred() -> (impl Transport, Replies) {
    let replies: Replies = Rc::default();
    let queue = replies.clone();
    let transport = move |_req: SubmitRequest| -> TransportFuture {
        let (tx, rx) = oneshot::channel();
        queue.borrow_mut().push(tx);
        async move {
            rx.await
                .unwrap_or_else(|_| Err(TransportError::network("dropped")))
        }
        .boxed_local()
    };
    (transport, replies)
}

fn overlay_hidden(sim: &ProgramSimulator<AjaxForm>) -> bool {
    let overlay = sim.model().overlay().expect("built-in overlay");
    sim.document().borrow().get(overlay).hidden
}

#[derive(Clone, Default)]
struct RecordingLoader(Rc<RefCell<Vec<bool>>>);

impl Loader for RecordingLoader {
    fn set_loading(&self, loading: bool) {
        self.0.borrow_mut().push(loading);
    }
}

// =============================================================================
// Submission
// =============================================================================

#[test]
fn submit_sends_fields_and_api_params() {
    let page = signup_page("/api/signup");
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let options = FormOptions::new().api_param("lang", "de");
    let form = AjaxForm::new(page.doc.clone(), "signup", options, transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);

    let requests = requests.borrow();
    assert_eq!(requests.len(), 1);
    let req = &requests[0];
    assert_eq!(req.action, "/api/signup");
    assert_eq!(req.method, "POST");
    assert_eq!(
        req.data.to_urlencoded(),
        "email=a%40b.c&name=&csrf=t0k&terms=on&lang=de"
    );
}

#[test]
fn disabled_fields_are_not_submitted() {
    let page = signup_page("/api/signup");
    page.doc.borrow_mut().get_mut(page.email).disabled = true;
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);
    assert_eq!(requests.borrow()[0].data.get("email"), None);
}

#[test]
fn other_forms_are_ignored() {
    let page = signup_page("/api/signup");
    let other = {
        let mut d = page.doc.borrow_mut();
        let body = d.body();
        d.insert(body, Element::form("/api/other", "post").with_id("other"))
    };
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(other);
    assert!(requests.borrow().is_empty());
}

#[test]
fn each_submit_sends_a_request() {
    let page = signup_page("/api/signup");
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);
    page.doc.borrow_mut().get_mut(page.email).value = "c@d.e".into();
    sim.submit(page.form);

    let requests = requests.borrow();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[1].data.get("email"), Some("c@d.e"));
}

// =============================================================================
// Loading state
// =============================================================================

#[test]
fn overlay_shown_while_request_pending() {
    let page = signup_page("/api/signup");
    let (transport, replies) = deferred();
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());
    assert!(overlay_hidden(&sim));

    sim.submit(page.form);
    assert!(!overlay_hidden(&sim));
    assert_eq!(sim.model().in_flight(), 1);
    assert_eq!(sim.pending_futures(), 1);
    assert!(sim.view().starts_with("form #signup: submitting (1)"));

    let reply = replies.borrow_mut().remove(0);
    reply.send(Ok(SubmitResponse::ok())).unwrap();
    sim.run_until_idle();

    assert!(overlay_hidden(&sim));
    assert_eq!(sim.model().in_flight(), 0);
    assert_eq!(sim.model().outcome(), Some(&Outcome::Accepted));
}

#[test]
fn first_completion_hides_overlay() {
    let page = signup_page("/api/signup");
    let (transport, replies) = deferred();
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);
    sim.submit(page.form);
    assert_eq!(sim.model().in_flight(), 2);

    let reply = replies.borrow_mut().remove(0);
    reply.send(Ok(SubmitResponse::ok())).unwrap();
    sim.run_until_idle();

    assert!(overlay_hidden(&sim));
    assert_eq!(sim.model().in_flight(), 1);
}

#[test]
fn external_loader_replaces_overlay() {
    let page = signup_page("/api/signup");
    let loader = RecordingLoader::default();
    let (transport, _requests) = answering(Ok(SubmitResponse::ok()));
    let options = FormOptions::new().loader(loader.clone());
    let form = AjaxForm::new(page.doc.clone(), "signup", options, transport);
    assert!(form.overlay().is_none());
    assert!(page.doc.borrow().get_element_by_id("signup-overlay").is_none());

    let mut sim = ProgramSimulator::new(form, page.doc.clone());
    sim.submit(page.form);

    assert_eq!(*loader.0.borrow(), vec![true, false]);
}

#[test]
fn transport_failure_is_logged_and_loader_released() {
    let page = signup_page("/api/signup");
    let errors = Rc::new(RefCell::new(0));
    let seen = errors.clone();
    let (transport, _requests) = answering(Err(TransportError::network("connection refused")));
    let options = FormOptions::new().on_error(move |_| *seen.borrow_mut() += 1);
    let form = AjaxForm::new(page.doc.clone(), "signup", options, transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    let ((), logs) = with_logs(|| sim.submit(page.form));

    assert!(logs.contains("ajaxform: request failed"), "{logs}");
    assert!(logs.contains("connection refused"), "{logs}");
    assert!(overlay_hidden(&sim));
    assert_eq!(*errors.borrow(), 0);
    assert!(matches!(sim.model().outcome(), Some(Outcome::Failed(_))));
    assert_eq!(page.doc.borrow().location(), None);
}

#[test]
fn malformed_body_is_a_transport_failure() {
    let page = signup_page("/api/signup");
    let (transport, _requests) = answering(SubmitResponse::from_json("<html>oops</html>"));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    let ((), logs) = with_logs(|| sim.submit(page.form));
    assert!(logs.contains("invalid response"), "{logs}");
    assert!(overlay_hidden(&sim));
}

// =============================================================================
// Responses
// =============================================================================

#[test]
fn success_runs_hook_before_redirect() {
    let page = signup_page("https://shop.test/api/signup");
    let seen_location = Rc::new(RefCell::new(Vec::new()));
    let sink = seen_location.clone();
    let doc = page.doc.clone();
    let options = FormOptions::new().on_success(move |resp| {
        assert!(resp.success);
        sink.borrow_mut()
            .push(doc.borrow().location().map(str::to_string));
    });
    let (transport, _requests) = answering(Ok(SubmitResponse::ok().redirect_to("/thanks")));
    let form = AjaxForm::new(page.doc.clone(), "signup", options, transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);

    assert_eq!(*seen_location.borrow(), vec![None]);
    assert_eq!(page.doc.borrow().location(), Some("https://shop.test/thanks"));
    assert_eq!(sim.view(), "form #signup: accepted");
}

#[test]
fn success_without_redirect_stays() {
    let page = signup_page("/api/signup");
    let (transport, _requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);
    assert_eq!(page.doc.borrow().location(), None);
}

#[test]
fn rejection_marks_invalid_and_clears_valid() {
    let page = signup_page("/api/signup");
    {
        let mut d = page.doc.borrow_mut();
        d.get_mut(page.name).add_class(INVALID_CLASS);
        let slot = d.get_mut(page.name_slot);
        slot.text = "Too short".into();
        slot.hidden = false;
    }
    let rejections = Rc::new(RefCell::new(Vec::new()));
    let sink = rejections.clone();
    let successes = Rc::new(RefCell::new(0));
    let counted = successes.clone();
    let options = FormOptions::new()
        .on_error(move |resp| sink.borrow_mut().push(resp.invalid.len()))
        .on_success(move |_| *counted.borrow_mut() += 1);
    let response = SubmitResponse::default()
        .with_invalid("email", "Already registered")
        .with_valid("name");
    let (transport, _requests) = answering(Ok(response));
    let form = AjaxForm::new(page.doc.clone(), "signup", options, transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);

    {
        let d = page.doc.borrow();
        assert!(d.get(page.email).has_class(INVALID_CLASS));
        assert_eq!(d.get(page.email_slot).text, "Already registered");
        assert!(!d.get(page.email_slot).hidden);

        assert!(!d.get(page.name).has_class(INVALID_CLASS));
        assert_eq!(d.get(page.name_slot).text, "\u{00a0}");
        assert!(d.get(page.name_slot).hidden);
    }
    assert_eq!(*rejections.borrow(), vec![1]);
    assert_eq!(*successes.borrow(), 0);
    assert_eq!(
        sim.model().outcome(),
        Some(&Outcome::Rejected(vec!["email".into()]))
    );
    assert_eq!(
        sim.view(),
        "form #signup: rejected\n  ! email: Already registered"
    );
}

#[test]
fn rejection_addresses_fields_by_id() {
    let page = signup_page("/api/signup");
    let response = SubmitResponse::from_json(r#"{"invalid": {"name": ["too", "short"]}}"#).unwrap();
    let (transport, _requests) = answering(Ok(response));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);

    let d = page.doc.borrow();
    assert!(d.get(page.name).has_class(INVALID_CLASS));
    assert_eq!(d.get(page.name_slot).text, r#"["too","short"]"#);
}

#[test]
fn unknown_invalid_field_is_harmless() {
    let page = signup_page("/api/signup");
    let response = SubmitResponse::default().with_invalid("phone", "Required");
    let (transport, _requests) = answering(Ok(response));
    let form = AjaxForm::new(page.doc.clone(), "signup", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    sim.submit(page.form);
    assert!(!page.doc.borrow().get(page.email).has_class(INVALID_CLASS));
    assert_eq!(
        sim.model().outcome(),
        Some(&Outcome::Rejected(vec!["phone".into()]))
    );
}

#[test]
fn debug_message_is_surfaced() {
    let page = signup_page("/api/signup");
    let messages = Rc::new(RefCell::new(Vec::new()));
    let sink = messages.clone();
    let options = FormOptions::new().on_debug(move |msg| sink.borrow_mut().push(msg.to_string()));
    let mut response = SubmitResponse::ok();
    response.debug_msg = Some("took 12ms".into());
    let (transport, _requests) = answering(Ok(response));
    let form = AjaxForm::new(page.doc.clone(), "signup", options, transport);
    let mut sim = ProgramSimulator::new(form, page.doc.clone());

    let ((), logs) = with_logs(|| sim.submit(page.form));

    assert_eq!(*messages.borrow(), vec!["took 12ms".to_string()]);
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("took 12ms"), "{logs}");
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn missing_form_is_logged_and_inert() {
    let page = signup_page("/api/signup");
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let (form, logs) = with_logs(|| {
        AjaxForm::new(page.doc.clone(), "nope", FormOptions::new(), transport)
    });
    assert!(logs.contains("element with id 'nope' not found"), "{logs}");
    assert!(!form.is_bound());

    let mut sim = ProgramSimulator::new(form, page.doc.clone());
    sim.submit(page.form);
    assert!(requests.borrow().is_empty());
}

// =============================================================================
// Together with the autocomplete
// =============================================================================

/// One page hosting a form and an autocomplete inside it.
struct Page {
    form: AjaxForm,
    widget: Autocomplete,
}

impl Model for Page {
    fn update(&mut self, msg: Message) -> Option<Cmd> {
        if msg.is::<SubmitMsg>() || msg.is::<SubmitResultMsg>() {
            return self.form.update(msg);
        }
        self.widget.update(msg)
    }

    fn view(&self) -> String {
        format!("{}\n{}", self.widget.view(), self.form.view())
    }
}

fn order_page() -> (DocumentHandle, ElementId, ElementId, ElementId) {
    let doc = Document::shared();
    let (form, city, slot) = {
        let mut d = doc.borrow_mut();
        let body = d.body();
        let form = d.insert(body, Element::form("/api/order", "post").with_id("order"));
        let group = d.insert(form, Element::new(ElementKind::Div).with_class(GROUP_CLASS));
        let city = d.insert(group, Element::input().with_class("city").with_name("city"));
        let slot = d.insert(
            group,
            Element::new(ElementKind::Div).with_class(FEEDBACK_CLASS).hide(),
        );
        (form, city, slot)
    };
    (doc, form, city, slot)
}

fn pick(sim: &mut ProgramSimulator<Page>, input: ElementId, text: &str) {
    if sim.document().borrow().focused() != Some(input) {
        sim.focus(input);
    }
    assert!(sim.type_text(input, text));
    sim.advance(Duration::from_millis(300));
    sim.key(KeyType::Down);
    sim.key(KeyType::Enter);
}

fn cities() -> Config {
    Config::default().data(candidates([("1", "Berlin"), ("2", "Bern"), ("3", "Bonn")]))
}

#[test]
fn selected_key_travels_with_the_form() {
    let (doc, form_el, city, _slot) = order_page();
    let widget = Autocomplete::new(doc.clone(), "city", cities());
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(doc.clone(), "order", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(Page { form, widget }, doc.clone());

    pick(&mut sim, city, "ber");
    sim.submit(form_el);

    let requests = requests.borrow();
    assert_eq!(requests[0].data.get("city_key"), Some("1"));
}

#[test]
fn selected_keys_travel_as_json_in_multi_mode() {
    let (doc, form_el, city, _slot) = order_page();
    let widget = Autocomplete::new(doc.clone(), "city", cities().max_selections(3));
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(doc.clone(), "order", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(Page { form, widget }, doc.clone());

    pick(&mut sim, city, "b");
    pick(&mut sim, city, "b");
    sim.submit(form_el);

    let requests = requests.borrow();
    assert_eq!(requests[0].data.get("city_key"), Some(r#"["1","2"]"#));
}

#[test]
fn empty_selection_submits_empty_key() {
    let (doc, form_el, _city, _slot) = order_page();
    let widget = Autocomplete::new(doc.clone(), "city", cities());
    let (transport, requests) = answering(Ok(SubmitResponse::ok()));
    let form = AjaxForm::new(doc.clone(), "order", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(Page { form, widget }, doc.clone());

    sim.submit(form_el);
    assert_eq!(requests.borrow()[0].data.get("city_key"), Some(""));
}

#[test]
fn rejection_marks_the_autocomplete_input() {
    let (doc, form_el, city, slot) = order_page();
    let widget = Autocomplete::new(doc.clone(), "city", cities());
    let response = SubmitResponse::default().with_invalid("city", "We do not ship there");
    let (transport, _requests) = answering(Ok(response));
    let form = AjaxForm::new(doc.clone(), "order", FormOptions::new(), transport);
    let mut sim = ProgramSimulator::new(Page { form, widget }, doc.clone());

    sim.submit(form_el);

    let d = doc.borrow();
    assert!(d.get(city).has_class(INVALID_CLASS));
    assert_eq!(d.get(slot).text, "We do not ship there");
    assert!(!d.get(slot).hidden);
}
