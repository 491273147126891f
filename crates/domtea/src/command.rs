//! Commands for side effects.
//!
//! Commands represent deferred work that produces messages. They are the only
//! way to perform side effects in the Elm Architecture: an update function
//! stays pure and hands the host a command describing what to do next.
//!
//! # Command kinds
//!
//! The host event loop is single-threaded and cooperative, so commands map
//! onto the three ways a browser schedules work:
//!
//! - **Immediate** - runs right after the current update completes, like a
//!   microtask.
//! - **Delayed** - runs once a timer expires ([`tick`]), like `setTimeout`.
//! - **Async** - a suspended future ([`Cmd::future`]) that delivers its
//!   message whenever it resolves. Nothing cancels it once started.

use std::future::Future;
use std::time::Duration;

use futures::future::{FutureExt, LocalBoxFuture};

use crate::message::{BatchMsg, Message};

type Thunk = Box<dyn FnOnce() -> Option<Message>>;

/// How the host should run a command.
pub enum CmdKind {
    /// Run as soon as the current update returns.
    Immediate(Thunk),
    /// Run after `delay` of host time has elapsed.
    Delayed {
        /// Time to wait before running.
        delay: Duration,
        /// Work to run once the timer fires.
        run: Thunk,
    },
    /// Poll until the future resolves.
    Async(LocalBoxFuture<'static, Option<Message>>),
}

/// A command that produces a message when executed.
///
/// Commands are lazy - they don't execute until the host runs them.
///
/// # Example
///
/// ```rust
/// use domtea::{Cmd, Message};
///
/// let cmd = Cmd::new(|| Message::new("done"));
/// let msg = cmd.execute().unwrap();
/// assert!(msg.is::<&str>());
/// ```
pub struct Cmd(CmdKind);

impl Cmd {
    /// Create a new immediate command from a closure.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce() -> Message + 'static,
    {
        Self(CmdKind::Immediate(Box::new(move || Some(f()))))
    }

    /// Create an immediate command that may not produce a message.
    pub fn new_optional<F>(f: F) -> Self
    where
        F: FnOnce() -> Option<Message> + 'static,
    {
        Self(CmdKind::Immediate(Box::new(f)))
    }

    /// Create an asynchronous command from a future.
    pub fn future<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Message> + 'static,
    {
        Self(CmdKind::Async(fut.map(Some).boxed_local()))
    }

    /// Create an asynchronous command that may not produce a message.
    pub fn future_optional<Fut>(fut: Fut) -> Self
    where
        Fut: Future<Output = Option<Message>> + 'static,
    {
        Self(CmdKind::Async(fut.boxed_local()))
    }

    /// Create an empty command that does nothing.
    pub fn none() -> Option<Self> {
        None
    }

    /// Returns the scheduling kind so a host can run the command.
    pub fn into_kind(self) -> CmdKind {
        self.0
    }

    /// Returns true if the command waits on a timer.
    pub fn is_delayed(&self) -> bool {
        matches!(self.0, CmdKind::Delayed { .. })
    }

    /// Returns true if the command is a suspended future.
    pub fn is_async(&self) -> bool {
        matches!(self.0, CmdKind::Async(_))
    }

    /// Execute the command right now and return the resulting message.
    ///
    /// Delayed commands run without waiting. Async commands yield a message
    /// only if their future is already complete on the first poll.
    pub fn execute(self) -> Option<Message> {
        match self.0 {
            CmdKind::Immediate(run) | CmdKind::Delayed { run, .. } => run(),
            CmdKind::Async(fut) => fut.now_or_never().flatten(),
        }
    }
}

impl std::fmt::Debug for Cmd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match &self.0 {
            CmdKind::Immediate(_) => "Immediate",
            CmdKind::Delayed { .. } => "Delayed",
            CmdKind::Async(_) => "Async",
        };
        f.debug_tuple("Cmd").field(&kind).finish()
    }
}

/// Batch multiple commands.
///
/// Commands in a batch are handed to the host together with no ordering
/// guarantees between their results.
///
/// # Example
///
/// ```rust
/// use domtea::{Cmd, Message, batch};
///
/// let cmd = batch(vec![
///     Some(Cmd::new(|| Message::new("first"))),
///     None,
///     Some(Cmd::new(|| Message::new("second"))),
/// ]);
/// assert!(cmd.is_some());
/// ```
pub fn batch(cmds: Vec<Option<Cmd>>) -> Option<Cmd> {
    let valid_cmds: Vec<Cmd> = cmds.into_iter().flatten().collect();

    match valid_cmds.len() {
        0 => None,
        1 => valid_cmds.into_iter().next(),
        _ => Some(Cmd::new(move || Message::new(BatchMsg(valid_cmds)))),
    }
}

/// Command that fires once after a duration of host time.
///
/// This is the building block for debouncing: schedule a tick carrying a
/// tag, and ignore ticks whose tag is no longer current when they arrive.
///
/// # Example
///
/// ```rust
/// use domtea::{tick, Message};
/// use std::time::Duration;
///
/// struct TickMsg(u64);
///
/// let cmd = tick(Duration::from_millis(300), || Message::new(TickMsg(1)));
/// assert!(cmd.is_delayed());
/// ```
pub fn tick<F>(duration: Duration, f: F) -> Cmd
where
    F: FnOnce() -> Message + 'static,
{
    Cmd(CmdKind::Delayed {
        delay: duration,
        run: Box::new(move || Some(f())),
    })
}
