// Typed layer - closed Rust enums matched against compiler-checked case records
//
// A cases record has one field per variant, so a record literal that misses a
// case or names one that does not exist is rejected at compile time.

use crate::data::Value;

/// A closed enumeration of named cases
pub trait Tagged {
    /// Case names in declaration order
    const TAGS: &'static [&'static str];

    /// Case name of this value
    fn tag(&self) -> &'static str;
}

/// Dispatch against a cases record `C`
pub trait Match<C>: Tagged + Sized {
    type Output;

    /// Invoke the handler for this value's case with its payload
    fn dispatch(self, cases: &C) -> Self::Output;
}

/// `dispatch(cases, value)`: run the handler for `value`'s case
pub fn dispatch<T, C>(cases: &C, value: T) -> <T as Match<C>>::Output
where
    T: Match<C>,
{
    value.dispatch(cases)
}

/// Partially apply a cases record into a reusable `value -> result` function
pub fn matcher<'c, T, C>(cases: &'c C) -> impl Fn(T) -> <T as Match<C>>::Output + 'c
where
    T: Match<C>,
{
    move |value: T| value.dispatch(cases)
}

/// Optional value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Maybe<T> {
    Absent,
    Present(T),
}

/// Cases record for [`Maybe`].
///
/// Both cases must be supplied:
///
/// ```compile_fail
/// use casemap_core::typed::MaybeCases;
///
/// let cases: MaybeCases<'_, i32, bool> = MaybeCases {
///     present: Box::new(|_| true),
/// };
/// ```
///
/// and misspelled cases do not compile:
///
/// ```compile_fail
/// use casemap_core::typed::MaybeCases;
///
/// let cases: MaybeCases<'_, i32, bool> = MaybeCases {
///     absent: Box::new(|| false),
///     presnet: Box::new(|_| true),
/// };
/// ```
pub struct MaybeCases<'a, T, R> {
    pub absent: Box<dyn Fn() -> R + 'a>,
    pub present: Box<dyn Fn(T) -> R + 'a>,
}

impl<'a, T, R> MaybeCases<'a, T, R> {
    pub fn new(absent: impl Fn() -> R + 'a, present: impl Fn(T) -> R + 'a) -> Self {
        MaybeCases {
            absent: Box::new(absent),
            present: Box::new(present),
        }
    }
}

impl<T> Tagged for Maybe<T> {
    const TAGS: &'static [&'static str] = &["absent", "present"];

    fn tag(&self) -> &'static str {
        match self {
            Maybe::Absent => "absent",
            Maybe::Present(_) => "present",
        }
    }
}

impl<'a, T, R> Match<MaybeCases<'a, T, R>> for Maybe<T> {
    type Output = R;

    fn dispatch(self, cases: &MaybeCases<'a, T, R>) -> R {
        match self {
            Maybe::Absent => (cases.absent)(),
            Maybe::Present(value) => (cases.present)(value),
        }
    }
}

impl<T> From<Option<T>> for Maybe<T> {
    fn from(option: Option<T>) -> Self {
        match option {
            Some(value) => Maybe::Present(value),
            None => Maybe::Absent,
        }
    }
}

impl<T> From<Maybe<T>> for Option<T> {
    fn from(maybe: Maybe<T>) -> Self {
        match maybe {
            Maybe::Present(value) => Some(value),
            Maybe::Absent => None,
        }
    }
}

impl Maybe<Value> {
    /// Dynamic form, tagged as in [`SumSchema::option`](crate::schema::SumSchema::option)
    pub fn into_value(self) -> Value {
        match self {
            Maybe::Absent => Value::variant(0, Value::Unit),
            Maybe::Present(value) => Value::variant(1, value),
        }
    }
}

/// Value of one of two types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Either<L, R> {
    Left(L),
    Right(R),
}

/// Cases record for [`Either`]
pub struct EitherCases<'a, L, R, O> {
    pub left: Box<dyn Fn(L) -> O + 'a>,
    pub right: Box<dyn Fn(R) -> O + 'a>,
}

impl<'a, L, R, O> EitherCases<'a, L, R, O> {
    pub fn new(left: impl Fn(L) -> O + 'a, right: impl Fn(R) -> O + 'a) -> Self {
        EitherCases {
            left: Box::new(left),
            right: Box::new(right),
        }
    }
}

impl<L, R> Tagged for Either<L, R> {
    const TAGS: &'static [&'static str] = &["left", "right"];

    fn tag(&self) -> &'static str {
        match self {
            Either::Left(_) => "left",
            Either::Right(_) => "right",
        }
    }
}

impl<'a, L, R, O> Match<EitherCases<'a, L, R, O>> for Either<L, R> {
    type Output = O;

    fn dispatch(self, cases: &EitherCases<'a, L, R, O>) -> O {
        match self {
            Either::Left(value) => (cases.left)(value),
            Either::Right(value) => (cases.right)(value),
        }
    }
}

/// Declare a closed enum together with its cases record.
///
/// Each case is written `case_name: Variant` or `case_name: Variant(Payload)`.
/// The record gets one boxed handler field per case, named after the case.
/// A case carrying several payload fields takes them as one tuple,
/// `rect: Rect((f64, f64))`, and its handler receives that tuple.
///
/// ```
/// use casemap_core::sum_type;
/// use casemap_core::typed::{dispatch, Tagged};
///
/// sum_type! {
///     #[derive(Debug, Clone, PartialEq)]
///     pub enum Shape => ShapeCases {
///         circle: Circle(f64),
///         rect: Rect((f64, f64)),
///         point: Point,
///     }
/// }
///
/// let area = ShapeCases {
///     circle: Box::new(|r| 3.0 * r * r),
///     rect: Box::new(|(w, h)| w * h),
///     point: Box::new(|| 0.0),
/// };
/// assert_eq!(dispatch(&area, Shape::Rect((2.0, 3.0))), 6.0);
/// assert_eq!(Shape::TAGS, &["circle", "rect", "point"]);
/// ```
///
/// Payload fields are not spread across the variant:
///
/// ```compile_fail
/// use casemap_core::sum_type;
///
/// sum_type! {
///     pub enum Shape => ShapeCases {
///         rect: Rect(f64, f64),
///     }
/// }
/// ```
#[macro_export]
macro_rules! sum_type {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident => $cases:ident {
            $( $case:ident : $variant:ident $( ( $payload:ty ) )? ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis enum $name {
            $( $variant $( ($payload) )? ),+
        }

        $vis struct $cases<'a, R> {
            $( pub $case: $crate::__case_handler!('a, R $(, $payload)?), )+
        }

        impl $crate::typed::Tagged for $name {
            const TAGS: &'static [&'static str] = &[$( stringify!($case) ),+];

            fn tag(&self) -> &'static str {
                match self {
                    $( $name::$variant { .. } => stringify!($case), )+
                }
            }
        }

        impl<'a, R> $crate::typed::Match<$cases<'a, R>> for $name {
            type Output = R;

            fn dispatch(self, cases: &$cases<'a, R>) -> R {
                match self {
                    $(
                        $crate::__case_pattern!($name, $variant, payload $(, $payload)?) =>
                            $crate::__case_call!(cases.$case, payload $(, $payload)?),
                    )+
                }
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __case_handler {
    ($lt:lifetime, $out:ident, $payload:ty) => {
        ::std::boxed::Box<dyn Fn($payload) -> $out + $lt>
    };
    ($lt:lifetime, $out:ident) => {
        ::std::boxed::Box<dyn Fn() -> $out + $lt>
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __case_pattern {
    ($name:ident, $variant:ident, $bind:ident, $payload:ty) => {
        $name::$variant($bind)
    };
    ($name:ident, $variant:ident, $bind:ident) => {
        $name::$variant
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __case_call {
    ($handler:expr, $bind:ident, $payload:ty) => {
        ($handler)($bind)
    };
    ($handler:expr, $bind:ident) => {
        ($handler)()
    };
}
