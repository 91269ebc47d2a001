//! Handler shapes accepted by [`Callback`](super::Callback) constructors.
//!
//! A handler can take the whole argument list by reference (`Fn(&Args)`) or,
//! when `Args` is a tuple of up to four elements, each element by reference
//! (`Fn(&A, &B)`) or by value (`Fn(A, B)`). Methods may also take the whole
//! argument list by value (`fn set_count(&self, n: u32)` for `Callback<u32>`).
//! By-value elements are cloned once per call. The marker parameter keeps the
//! shapes apart; callers never name it.

/// Marker: handler receives `&Args`.
pub enum Whole {}

/// Marker: handler receives each tuple element by reference.
pub enum Spread {}

/// Marker: handler receives each tuple element by value.
pub enum Value {}

/// Marker: method receives `Args` by value.
pub enum Owned {}

/// A free function, static function or closure callable with `&Args`.
pub trait Handler<Args: ?Sized, M>: 'static {
    fn call(&self, args: &Args);
}

/// A method-like function callable with a receiver and `&Args`.
pub trait MethodHandler<T: ?Sized, Args: ?Sized, M>: 'static {
    fn call(&self, receiver: &T, args: &Args);
}

impl<F, Args> Handler<Args, Whole> for F
where
    F: Fn(&Args) + 'static,
    Args: ?Sized,
{
    fn call(&self, args: &Args) {
        self(args)
    }
}

impl<F, T, Args> MethodHandler<T, Args, Whole> for F
where
    F: Fn(&T, &Args) + 'static,
    T: ?Sized,
    Args: ?Sized,
{
    fn call(&self, receiver: &T, args: &Args) {
        self(receiver, args)
    }
}

impl<F, T, Args> MethodHandler<T, Args, Owned> for F
where
    F: Fn(&T, Args) + 'static,
    T: ?Sized,
    Args: Clone,
{
    fn call(&self, receiver: &T, args: &Args) {
        self(receiver, args.clone())
    }
}

macro_rules! spread_handlers {
    ($(($($arg:ident),*)),* $(,)?) => {
        $(
            #[allow(non_snake_case)]
            impl<F, $($arg,)*> Handler<($($arg,)*), Spread> for F
            where
                F: Fn($(&$arg),*) + 'static,
            {
                fn call(&self, args: &($($arg,)*)) {
                    let ($($arg,)*) = args;
                    self($($arg),*)
                }
            }

            #[allow(non_snake_case)]
            impl<F, T, $($arg,)*> MethodHandler<T, ($($arg,)*), Spread> for F
            where
                F: Fn(&T, $(&$arg),*) + 'static,
                T: ?Sized,
            {
                fn call(&self, receiver: &T, args: &($($arg,)*)) {
                    let ($($arg,)*) = args;
                    self(receiver, $($arg),*)
                }
            }
        )*
    };
}

spread_handlers! {
    (),
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
}

// `()` has no elements to take by value; its spread form already covers it.
macro_rules! value_handlers {
    ($(($($arg:ident),+)),* $(,)?) => {
        $(
            #[allow(non_snake_case)]
            impl<F, $($arg,)+> Handler<($($arg,)+), Value> for F
            where
                F: Fn($($arg),+) + 'static,
                $($arg: Clone,)+
            {
                fn call(&self, args: &($($arg,)+)) {
                    let ($($arg,)+) = args;
                    self($($arg.clone()),+)
                }
            }

            #[allow(non_snake_case)]
            impl<F, T, $($arg,)+> MethodHandler<T, ($($arg,)+), Value> for F
            where
                F: Fn(&T, $($arg),+) + 'static,
                T: ?Sized,
                $($arg: Clone,)+
            {
                fn call(&self, receiver: &T, args: &($($arg,)+)) {
                    let ($($arg,)+) = args;
                    self(receiver, $($arg.clone()),+)
                }
            }
        )*
    };
}

value_handlers! {
    (A),
    (A, B),
    (A, B, C),
    (A, B, C, D),
}
