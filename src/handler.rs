//! Typed step callables and their type-erased form.
//!
//! [`StepFn`] is implemented for every `Fn(&mut S, A1, .., An) -> R` with up
//! to seven [`StepArg`] parameters. It yields the callable's [`Signature`]
//! and erases it into a [`Handler`] that accepts already-bound arguments.

use std::{any::type_name, sync::Arc, vec};

use crate::{
    error::StepError,
    signature::{BoundArg, Signature, StepArg, StepReturn},
};

/// Type-erased step callable invoked with the live suite and bound arguments.
pub type Handler<S> = Arc<dyn Fn(&mut S, Vec<BoundArg>) -> Result<(), StepError> + Send + Sync>;

/// Callables usable as step definitions or hooks on suite `S`.
///
/// The `Args` parameter only disambiguates the arity-specific
/// implementations and is inferred at the registration site.
pub trait StepFn<S, Args>: Send + Sync + 'static {
    /// Describe the callable's parameters and return arity.
    fn signature(&self) -> Signature;

    /// Erase the callable into a [`Handler`].
    fn into_handler(self) -> Handler<S>;
}

fn take<T: StepArg>(
    args: &mut vec::IntoIter<BoundArg>,
    position: &mut usize,
) -> Result<T, StepError> {
    let at = *position;
    *position += 1;
    args.next()
        .and_then(T::from_bound)
        .ok_or(StepError::Binding {
            position: at,
            expected: T::kind().name(),
        })
}

macro_rules! impl_step_fn {
    ($($arg:ident),*) => {
        impl<S, F, R, $($arg,)*> StepFn<S, ($($arg,)*)> for F
        where
            S: 'static,
            F: Fn(&mut S, $($arg),*) -> R + Send + Sync + 'static,
            R: StepReturn,
            $($arg: StepArg,)*
        {
            fn signature(&self) -> Signature {
                Signature::new(vec![$($arg::kind()),*], R::ARITY, type_name::<R>())
            }

            #[allow(non_snake_case, unused_mut, unused_variables)]
            fn into_handler(self) -> Handler<S> {
                Arc::new(move |suite: &mut S, args: Vec<BoundArg>| -> Result<(), StepError> {
                    let mut args = args.into_iter();
                    let mut position = 0;
                    $(let $arg = take::<$arg>(&mut args, &mut position)?;)*
                    let _ = (self)(suite, $($arg),*);
                    Ok(())
                })
            }
        }
    };
}

impl_step_fn!();
impl_step_fn!(A1);
impl_step_fn!(A1, A2);
impl_step_fn!(A1, A2, A3);
impl_step_fn!(A1, A2, A3, A4);
impl_step_fn!(A1, A2, A3, A4, A5);
impl_step_fn!(A1, A2, A3, A4, A5, A6);
impl_step_fn!(A1, A2, A3, A4, A5, A6, A7);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        signature::ArgKind,
        value::{ParamKind, Value},
    };

    #[derive(Default)]
    struct Counter {
        total: i64,
        label: String,
    }

    impl Counter {
        fn add(&mut self, amount: i64, label: String) {
            self.total += amount;
            self.label = label;
        }
    }

    #[test]
    fn method_signature_lists_parameters() {
        let signature = StepFn::<Counter, _>::signature(&Counter::add);
        assert_eq!(
            signature.args(),
            [ArgKind::Param(ParamKind::Int), ArgKind::Param(ParamKind::Str)]
        );
        assert_eq!(signature.returns(), 0);
    }

    #[test]
    fn handler_invokes_with_bound_arguments() {
        let handler = StepFn::<Counter, _>::into_handler(Counter::add);
        let mut counter = Counter::default();
        handler(
            &mut counter,
            vec![
                BoundArg::Value(Value::Int(5)),
                BoundArg::Value(Value::Str("five".to_owned())),
            ],
        )
        .expect("arguments bind");
        assert_eq!(counter.total, 5);
        assert_eq!(counter.label, "five");
    }

    #[test]
    fn handler_reports_mismatched_arguments() {
        let handler = StepFn::<Counter, _>::into_handler(Counter::add);
        let mut counter = Counter::default();
        let err = handler(&mut counter, vec![BoundArg::Value(Value::Int(5))])
            .expect_err("second argument is missing");
        assert!(matches!(err, StepError::Binding { position: 1, expected: "String" }));
        assert_eq!(counter.total, 0);
    }

    #[test]
    fn closures_report_return_arity() {
        let f = |_: &mut Counter| -> bool { true };
        assert_eq!(StepFn::<Counter, ()>::signature(&f).returns(), 1);
    }
}
