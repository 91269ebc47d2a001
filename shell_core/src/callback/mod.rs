//! # Callbacks
//!
//! [`Callback<Args>`] is a deferred, optionally unbound invocation that a
//! component stores and fires from inside its event handling. The component
//! only knows the argument list; the target can be a closure, a free or
//! static function, or a method on an instance held elsewhere.
//!
//! `Args` is the argument list:
//!
//! | Arity | `Args`                          | Spread handler shape        |
//! |-------|---------------------------------|-----------------------------|
//! | 0     | `()`                            | `Fn()`                      |
//! | 1     | `(A,)`, or any `A` incl. `str`  | `Fn(&A)`                    |
//! | 2–4   | `(A, B)` … `(A, B, C, D)`       | `Fn(&A, &B)` …              |
//!
//! Arguments travel through the erasure layer by reference, so nothing is
//! copied on the way to the target. A target that wants owned arguments,
//! either spread (`fn resize(&self, w: u32, h: u32)`) or whole through
//! [`Callback::by_value`] and [`Callback::function_by_value`], gets each one
//! cloned once per call.
//!
//! ## Instance targets
//!
//! [`Callback::method`] holds the instance through a [`Weak`] reference. When
//! the instance is gone, invoking the callback does nothing and reports
//! [`Delivery::Dropped`].
//!
//! ## Example
//!
//! ```rust
//! use std::cell::RefCell;
//! use std::rc::Rc;
//! use shell_core::callback::{Callback, Delivery};
//!
//! struct Counter {
//!     hits: RefCell<Vec<(u32, String)>>,
//! }
//!
//! impl Counter {
//!     fn record(&self, id: &u32, label: &String) {
//!         self.hits.borrow_mut().push((*id, label.clone()));
//!     }
//! }
//!
//! let counter = Rc::new(Counter { hits: RefCell::new(Vec::new()) });
//!
//! let mut on_pick: Callback<(u32, String)> = Callback::empty();
//! assert_eq!(on_pick.invoke(&(1, "ignored".into())), Delivery::Unbound);
//!
//! on_pick.bind(Callback::method(&counter, Counter::record));
//! assert_eq!(on_pick.invoke(&(2, "beam".into())), Delivery::Delivered);
//! assert_eq!(counter.hits.borrow().as_slice(), &[(2, "beam".to_string())]);
//!
//! drop(counter);
//! assert_eq!(on_pick.invoke(&(3, "gone".into())), Delivery::Dropped);
//! ```

mod handler;

pub use handler::{Handler, MethodHandler, Owned, Spread, Value, Whole};

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

/// What kind of target a callback is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetKind {
    /// Closure capturing its own state
    Closure,
    /// Free function or static (associated) function
    Function,
    /// Method on a weakly held instance
    Method,
}

/// Outcome of a single [`Callback::invoke`].
///
/// None of these are errors: an unbound callback is an optional observer
/// nobody subscribed to, and a dropped instance simply no longer listens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    /// The target ran exactly once
    Delivered,
    /// No target was bound
    Unbound,
    /// The bound instance has been dropped
    Dropped,
}

impl Delivery {
    pub fn is_delivered(self) -> bool {
        matches!(self, Delivery::Delivered)
    }
}

enum Target<Args: ?Sized + 'static> {
    Direct {
        kind: TargetKind,
        thunk: Rc<dyn Fn(&Args)>,
    },
    Method {
        receiver: Weak<dyn Any>,
        thunk: Rc<dyn Fn(&dyn Any, &Args)>,
    },
}

impl<Args: ?Sized + 'static> Clone for Target<Args> {
    fn clone(&self) -> Self {
        match self {
            Target::Direct { kind, thunk } => Target::Direct {
                kind: *kind,
                thunk: Rc::clone(thunk),
            },
            Target::Method { receiver, thunk } => Target::Method {
                receiver: Weak::clone(receiver),
                thunk: Rc::clone(thunk),
            },
        }
    }
}

/// A typed, optionally bound callback taking the argument list `Args`.
pub struct Callback<Args: ?Sized + 'static> {
    target: Option<Target<Args>>,
}

impl<Args: ?Sized + 'static> Callback<Args> {
    /// An unbound callback. Invoking it does nothing.
    pub fn empty() -> Self {
        Callback { target: None }
    }

    /// Bind to a closure.
    pub fn new<M, H>(handler: H) -> Self
    where
        H: Handler<Args, M>,
    {
        Self::direct(TargetKind::Closure, handler)
    }

    /// Bind to a free function or a static function.
    pub fn function<M, H>(function: H) -> Self
    where
        H: Handler<Args, M>,
    {
        Self::direct(TargetKind::Function, function)
    }

    /// Bind to `method` on `instance`.
    ///
    /// Only a weak reference to the instance is kept; the callback never
    /// extends its lifetime.
    pub fn method<T, M, H>(instance: &Rc<T>, method: H) -> Self
    where
        T: Any,
        H: MethodHandler<T, Args, M>,
    {
        let weak: Weak<T> = Rc::downgrade(instance);
        let receiver: Weak<dyn Any> = weak;
        let thunk: Rc<dyn Fn(&dyn Any, &Args)> = Rc::new(move |receiver: &dyn Any, args: &Args| {
            if let Some(this) = receiver.downcast_ref::<T>() {
                method.call(this, args);
            }
        });
        Callback {
            target: Some(Target::Method { receiver, thunk }),
        }
    }

    fn direct<M, H>(kind: TargetKind, handler: H) -> Self
    where
        H: Handler<Args, M>,
    {
        let thunk: Rc<dyn Fn(&Args)> = Rc::new(move |args: &Args| handler.call(args));
        Callback {
            target: Some(Target::Direct { kind, thunk }),
        }
    }

    /// Replace the current target with `other`'s. The previous target is
    /// dropped and will not be called again.
    pub fn bind(&mut self, other: Callback<Args>) {
        self.target = other.target;
    }

    /// Unbind. Subsequent invocations are no-ops.
    pub fn clear(&mut self) {
        self.target = None;
    }

    /// Take the target out, leaving this callback unbound.
    pub fn take(&mut self) -> Callback<Args> {
        Callback {
            target: self.target.take(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.target.is_none()
    }

    pub fn target_kind(&self) -> Option<TargetKind> {
        self.target.as_ref().map(|target| match target {
            Target::Direct { kind, .. } => *kind,
            Target::Method { .. } => TargetKind::Method,
        })
    }

    /// True when bound to a method whose instance has been dropped.
    pub fn is_dangling(&self) -> bool {
        matches!(&self.target, Some(Target::Method { receiver, .. }) if receiver.strong_count() == 0)
    }

    /// Call the target with `args`.
    pub fn invoke(&self, args: &Args) -> Delivery {
        match &self.target {
            None => Delivery::Unbound,
            Some(Target::Direct { thunk, .. }) => {
                thunk(args);
                Delivery::Delivered
            }
            Some(Target::Method { receiver, thunk }) => match receiver.upgrade() {
                Some(instance) => {
                    thunk(&*instance, args);
                    Delivery::Delivered
                }
                None => {
                    log::trace!("callback target dropped; invocation skipped");
                    Delivery::Dropped
                }
            },
        }
    }
}

impl<Args: Clone + 'static> Callback<Args> {
    /// Bind to a closure that takes the arguments by value. The arguments are
    /// cloned once per invocation.
    pub fn by_value<F>(handler: F) -> Self
    where
        F: Fn(Args) + 'static,
    {
        Self::owned(TargetKind::Closure, handler)
    }

    /// Bind to a free or static function that takes the arguments by value.
    pub fn function_by_value<F>(function: F) -> Self
    where
        F: Fn(Args) + 'static,
    {
        Self::owned(TargetKind::Function, function)
    }

    fn owned<F>(kind: TargetKind, handler: F) -> Self
    where
        F: Fn(Args) + 'static,
    {
        Self::direct(kind, move |args: &Args| handler(args.clone()))
    }
}

impl Callback<()> {
    /// Invoke a zero-argument callback.
    pub fn fire(&self) -> Delivery {
        self.invoke(&())
    }
}

impl<Args: ?Sized + 'static> Default for Callback<Args> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<Args: ?Sized + 'static> Clone for Callback<Args> {
    fn clone(&self) -> Self {
        Callback {
            target: self.target.clone(),
        }
    }
}

impl<Args: ?Sized + 'static> fmt::Debug for Callback<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback")
            .field("target", &self.target_kind())
            .field("dangling", &self.is_dangling())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::{Cell, RefCell};

    /// Counts how many times it has been cloned.
    struct Tracked {
        value: u32,
        clones: Rc<Cell<usize>>,
    }

    impl Tracked {
        fn new(value: u32) -> (Self, Rc<Cell<usize>>) {
            let clones = Rc::new(Cell::new(0));
            (
                Tracked {
                    value,
                    clones: Rc::clone(&clones),
                },
                clones,
            )
        }
    }

    impl Clone for Tracked {
        fn clone(&self) -> Self {
            self.clones.set(self.clones.get() + 1);
            Tracked {
                value: self.value,
                clones: Rc::clone(&self.clones),
            }
        }
    }

    struct Recorder {
        calls: RefCell<Vec<String>>,
    }

    impl Recorder {
        fn new() -> Rc<Self> {
            Rc::new(Recorder {
                calls: RefCell::new(Vec::new()),
            })
        }

        fn ping(&self) {
            self.calls.borrow_mut().push("ping".to_string());
        }

        fn note(&self, text: &str) {
            self.calls.borrow_mut().push(text.to_string());
        }

        fn pair(&self, a: &u8, b: &String) {
            self.calls.borrow_mut().push(format!("{a}:{b}"));
        }

        fn three(&self, a: &u8, b: &u16, c: &u32) {
            self.calls.borrow_mut().push(format!("{}", *a as u32 + *b as u32 + *c));
        }

        fn keep(&self, tracked: Tracked) {
            self.calls.borrow_mut().push(format!("kept {}", tracked.value));
        }

        fn place(&self, tracked: Tracked, column: u32, label: String) {
            self.calls
                .borrow_mut()
                .push(format!("{label}@{column}={}", tracked.value));
        }

        fn set_count(&self, count: u32) {
            self.calls.borrow_mut().push(format!("count {count}"));
        }

        fn four(&self, a: &u8, b: &u16, c: &u32, d: &u64) {
            self.calls.borrow_mut().push(format!("{}", *a as u64 + *b as u64 + *c as u64 + *d));
        }
    }

    thread_local! {
        static FREE_CALLS: Cell<u32> = const { Cell::new(0) };
    }

    fn free_function(amount: &u32) {
        FREE_CALLS.with(|calls| calls.set(calls.get() + amount));
    }

    fn free_owned(amount: u32) {
        FREE_CALLS.with(|calls| calls.set(calls.get() + amount));
    }

    fn free_product(a: u32, b: u32) {
        FREE_CALLS.with(|calls| calls.set(calls.get() + a * b));
    }

    #[test]
    fn test_empty_for_every_arity() {
        let zero: Callback<()> = Callback::empty();
        let one: Callback<(u32,)> = Callback::default();
        let one_ref: Callback<str> = Callback::empty();
        let two: Callback<(u32, String)> = Callback::empty();
        let three: Callback<(u8, u16, u32)> = Callback::empty();
        let four: Callback<(u8, u16, u32, u64)> = Callback::empty();

        assert!(zero.is_empty());
        assert_eq!(zero.fire(), Delivery::Unbound);
        assert_eq!(one.invoke(&(1,)), Delivery::Unbound);
        assert_eq!(one_ref.invoke("text"), Delivery::Unbound);
        assert_eq!(two.invoke(&(1, "x".to_string())), Delivery::Unbound);
        assert_eq!(three.invoke(&(1, 2, 3)), Delivery::Unbound);
        assert_eq!(four.invoke(&(1, 2, 3, 4)), Delivery::Unbound);
        assert_eq!(four.target_kind(), None);
    }

    #[test]
    fn test_closure_called_once_with_arguments() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let cb: Callback<(u32, String)> = Callback::new(move |id: &u32, name: &String| {
            sink.borrow_mut().push(format!("{id}-{name}"));
        });

        assert_eq!(cb.invoke(&(7, "log".to_string())), Delivery::Delivered);
        assert_eq!(seen.borrow().as_slice(), &["7-log".to_string()]);
        assert_eq!(cb.target_kind(), Some(TargetKind::Closure));
    }

    #[test]
    fn test_whole_argument_handler() {
        let total = Rc::new(Cell::new(0));
        let sink = Rc::clone(&total);
        let cb: Callback<(u32, u32, u32)> = Callback::new(move |args: &(u32, u32, u32)| {
            sink.set(args.0 + args.1 + args.2);
        });
        cb.invoke(&(1, 2, 3));
        assert_eq!(total.get(), 6);
    }

    #[test]
    fn test_free_function_binding() {
        FREE_CALLS.with(|calls| calls.set(0));
        let cb: Callback<u32> = Callback::function(free_function);
        assert_eq!(cb.target_kind(), Some(TargetKind::Function));
        cb.invoke(&5);
        cb.invoke(&2);
        assert_eq!(FREE_CALLS.with(|calls| calls.get()), 7);
    }

    #[test]
    fn test_method_bindings_per_arity() {
        let recorder = Recorder::new();
        let zero: Callback<()> = Callback::method(&recorder, Recorder::ping);
        let one: Callback<str> = Callback::method(&recorder, Recorder::note);
        let two: Callback<(u8, String)> = Callback::method(&recorder, Recorder::pair);
        let four: Callback<(u8, u16, u32, u64)> = Callback::method(&recorder, Recorder::four);

        zero.fire();
        one.invoke("note");
        two.invoke(&(3, "three".to_string()));
        four.invoke(&(1, 2, 3, 4));

        assert_eq!(
            recorder.calls.borrow().as_slice(),
            &["ping", "note", "3:three", "10"].map(String::from)
        );
        assert_eq!(one.target_kind(), Some(TargetKind::Method));
    }

    #[test]
    fn test_method_does_not_keep_instance_alive() {
        let recorder = Recorder::new();
        let cb: Callback<str> = Callback::method(&recorder, Recorder::note);
        assert_eq!(Rc::strong_count(&recorder), 1);
        assert!(!cb.is_dangling());

        drop(recorder);
        assert!(cb.is_dangling());
        assert_eq!(cb.invoke("late"), Delivery::Dropped);
    }

    #[test]
    fn test_reference_argument_not_copied() {
        let (tracked, clones) = Tracked::new(4);
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let cb: Callback<Tracked> = Callback::new(move |t: &Tracked| sink.set(t.value));

        cb.invoke(&tracked);
        cb.invoke(&tracked);
        assert_eq!(seen.get(), 4);
        assert_eq!(clones.get(), 0);
    }

    #[test]
    fn test_value_argument_copied_at_most_once() {
        let (tracked, clones) = Tracked::new(9);
        let seen = Rc::new(Cell::new(0));
        let sink = Rc::clone(&seen);
        let cb: Callback<Tracked> = Callback::by_value(move |t: Tracked| sink.set(t.value));

        cb.invoke(&tracked);
        assert_eq!(seen.get(), 9);
        assert_eq!(clones.get(), 1);
    }

    #[test]
    fn test_spread_arity_three() {
        let total = Rc::new(Cell::new(0u32));
        let sink = Rc::clone(&total);
        let closure: Callback<(u8, u16, u32)> = Callback::new(move |a: &u8, b: &u16, c: &u32| {
            sink.set(*a as u32 + *b as u32 + *c);
        });
        assert!(closure.invoke(&(1, 2, 3)).is_delivered());
        assert_eq!(total.get(), 6);

        let recorder = Recorder::new();
        let method: Callback<(u8, u16, u32)> = Callback::method(&recorder, Recorder::three);
        assert!(method.invoke(&(4, 5, 6)).is_delivered());
        assert_eq!(recorder.calls.borrow().as_slice(), &["15".to_string()]);
    }

    #[test]
    fn test_by_value_method_arity_one() {
        let recorder = Recorder::new();
        let (tracked, clones) = Tracked::new(3);

        let spread: Callback<(Tracked,)> = Callback::method(&recorder, Recorder::keep);
        let args = (tracked,);
        spread.invoke(&args);
        assert_eq!(clones.get(), 1);

        let whole: Callback<Tracked> = Callback::method(&recorder, Recorder::keep);
        whole.invoke(&args.0);
        assert_eq!(clones.get(), 2);

        let count: Callback<u32> = Callback::method(&recorder, Recorder::set_count);
        count.invoke(&12);

        assert_eq!(
            recorder.calls.borrow().as_slice(),
            &["kept 3", "kept 3", "count 12"].map(String::from)
        );
    }

    #[test]
    fn test_by_value_method_arity_three() {
        let recorder = Recorder::new();
        let (tracked, clones) = Tracked::new(8);
        let cb: Callback<(Tracked, u32, String)> = Callback::method(&recorder, Recorder::place);

        let args = (tracked, 2, "beam".to_string());
        cb.invoke(&args);
        cb.invoke(&args);
        assert_eq!(clones.get(), 2);
        assert_eq!(recorder.calls.borrow().as_slice(), &["beam@2=8", "beam@2=8"].map(String::from));

        drop(recorder);
        assert_eq!(cb.invoke(&args), Delivery::Dropped);
        assert_eq!(clones.get(), 2);
    }

    #[test]
    fn test_by_value_tuple_arguments() {
        let (tracked, clones) = Tracked::new(5);
        let seen = Rc::new(RefCell::new(Vec::new()));

        let sink = Rc::clone(&seen);
        let whole: Callback<(Tracked, String)> = Callback::by_value(move |(t, label): (Tracked, String)| {
            sink.borrow_mut().push(format!("{label}{}", t.value));
        });
        let args = (tracked, "w".to_string());
        whole.invoke(&args);
        assert_eq!(clones.get(), 1);

        let sink = Rc::clone(&seen);
        let spread: Callback<(Tracked, String)> = Callback::new(move |t: Tracked, label: String| {
            sink.borrow_mut().push(format!("{label}{}", t.value));
        });
        spread.invoke(&(args.0.clone(), "s".to_string()));
        assert_eq!(clones.get(), 3);

        assert_eq!(seen.borrow().as_slice(), &["w5", "s5"].map(String::from));
    }

    #[test]
    fn test_by_value_functions_keep_kind() {
        FREE_CALLS.with(|calls| calls.set(0));
        let owned: Callback<u32> = Callback::function_by_value(free_owned);
        let product: Callback<(u32, u32)> = Callback::function(free_product);
        let closure: Callback<u32> = Callback::by_value(|_: u32| {});

        assert_eq!(owned.target_kind(), Some(TargetKind::Function));
        assert_eq!(product.target_kind(), Some(TargetKind::Function));
        assert_eq!(closure.target_kind(), Some(TargetKind::Closure));

        owned.invoke(&4);
        product.invoke(&(2, 3));
        assert_eq!(FREE_CALLS.with(|calls| calls.get()), 10);
    }

    #[test]
    fn test_rebound_method_leaves_old_instance() {
        let old = Recorder::new();
        let new = Recorder::new();
        let mut cb: Callback<str> = Callback::method(&old, Recorder::note);
        cb.invoke("first");

        cb.bind(Callback::method(&new, Recorder::note));
        cb.invoke("second");
        assert_eq!(old.calls.borrow().as_slice(), &["first".to_string()]);

        drop(old);
        assert!(!cb.is_dangling());
        assert_eq!(cb.invoke("third"), Delivery::Delivered);
        assert_eq!(new.calls.borrow().as_slice(), &["second", "third"].map(String::from));
    }

    #[test]
    fn test_rebind_replaces_target() {
        let first = Rc::new(Cell::new(0));
        let second = Rc::new(Cell::new(0));

        let sink = Rc::clone(&first);
        let mut cb: Callback<()> = Callback::new(move || sink.set(sink.get() + 1));
        cb.fire();

        let sink = Rc::clone(&second);
        cb.bind(Callback::new(move || sink.set(sink.get() + 1)));
        cb.fire();
        cb.fire();

        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 2);
    }

    #[test]
    fn test_clear_and_take() {
        let hits = Rc::new(Cell::new(0));
        let sink = Rc::clone(&hits);
        let mut cb: Callback<()> = Callback::new(move || sink.set(sink.get() + 1));

        let taken = cb.take();
        assert!(cb.is_empty());
        assert_eq!(cb.fire(), Delivery::Unbound);
        assert_eq!(taken.fire(), Delivery::Delivered);

        let mut again = taken.clone();
        again.clear();
        assert_eq!(again.fire(), Delivery::Unbound);
        assert_eq!(taken.fire(), Delivery::Delivered);
        assert_eq!(hits.get(), 2);
    }

    #[test]
    fn test_debug_shows_kind_only() {
        let cb: Callback<()> = Callback::new(|| {});
        let text = format!("{:?}", cb);
        assert!(text.contains("Closure"));
    }
}
