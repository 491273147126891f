//! Message types for the Elm Architecture.
//!
//! Messages are the only way to update a model. Every DOM event delivered by
//! the host (input, focus, click, keydown, submit), every timer expiry and
//! every resolved asynchronous retrieval reaches the model as a message.

use std::any::Any;
use std::fmt;

use crate::dom::ElementId;
use crate::key::KeyMsg;

/// A type-erased message container.
///
/// Messages can be any `'static` type. Use [`Message::new`] to create a
/// message and [`Message::downcast`] to retrieve the original type.
///
/// The host event loop is single-threaded, so messages are not required to
/// be `Send`; callbacks captured in a message may hold `Rc` state.
///
/// # Example
///
/// ```rust
/// use domtea::Message;
///
/// struct MyMsg(i32);
///
/// let msg = Message::new(MyMsg(42));
/// if let Some(my_msg) = msg.downcast::<MyMsg>() {
///     assert_eq!(my_msg.0, 42);
/// }
/// ```
pub struct Message(Box<dyn Any>);

impl Message {
    /// Create a new message from any `'static` type.
    pub fn new<M: Any>(msg: M) -> Self {
        Self(Box::new(msg))
    }

    /// Try to downcast to a specific message type.
    ///
    /// Returns `Some(T)` if the message is of type `T`, otherwise `None`.
    pub fn downcast<M: Any>(self) -> Option<M> {
        self.0.downcast::<M>().ok().map(|b| *b)
    }

    /// Try to get a reference to the message as a specific type.
    pub fn downcast_ref<M: Any>(&self) -> Option<&M> {
        self.0.downcast_ref::<M>()
    }

    /// Check if the message is of a specific type.
    pub fn is<M: Any>(&self) -> bool {
        self.0.is::<M>()
    }
}

impl fmt::Debug for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Message").finish_non_exhaustive()
    }
}

// DOM event messages

/// The `input` event: the value of `target` changed through user typing.
///
/// The new value is already stored on the element when the message arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputMsg {
    /// The element whose value changed.
    pub target: ElementId,
}

/// The `focus` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusMsg {
    /// The element that received focus.
    pub target: ElementId,
}

/// A pointer click anywhere in the document.
///
/// Clicks bubble: a widget receives every click and decides by containment
/// whether the target belongs to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClickMsg {
    /// The innermost element under the pointer.
    pub target: ElementId,
}

/// The `keydown` event on the focused element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDownMsg {
    /// The focused element.
    pub target: ElementId,
    /// The key that was pressed.
    pub key: KeyMsg,
}

/// The `submit` event of a form element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitMsg {
    /// The form being submitted.
    pub form: ElementId,
}

/// Internal message carrying multiple commands produced by `batch`.
pub struct BatchMsg(pub Vec<crate::command::Cmd>);

impl fmt::Debug for BatchMsg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("BatchMsg").field(&self.0.len()).finish()
    }
}
