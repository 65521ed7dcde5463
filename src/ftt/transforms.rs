//! Transform pipeline infrastructure
//!
//!     Parsing is a chain of stages, each a [`Runnable`] from one owned value to the
//!     next. [`Transform`] wraps a runnable so stages can be chained with `.then()`; the
//!     compiler checks that the output of one stage is the input of the next.
//!
//!         source text -> LineProcessing -> PostProcessing -> GraphValidation -> Session
//!
//!     Every stage fails with the same error, [`Abort`]: the single fatal diagnostic plus
//!     the headers gathered before it. The first failing stage ends the chain, so no later
//!     stage ever sees a graph that already produced a fatal diagnostic.
//!
//!     Pre-built pipelines live in [`standard`]; the individual stages in [`stages`].

pub mod stages;
pub mod standard;

use crate::ftt::session::Abort;

/// Anything that can turn an `I` into an `O`.
pub trait Runnable<I, O> {
    fn run(&self, input: I) -> Result<O, Abort>;
}

/// A composable transformation from `I` to `O`.
pub struct Transform<I, O> {
    run_fn: Box<dyn Fn(I) -> Result<O, Abort> + Send + Sync>,
}

impl<I, O> Transform<I, O> {
    /// Create a transform from a function
    pub fn from_fn<F>(f: F) -> Self
    where
        F: Fn(I) -> Result<O, Abort> + Send + Sync + 'static,
    {
        Transform {
            run_fn: Box::new(f),
        }
    }

    /// Chain a stage after this transform.
    pub fn then<O2, S>(self, stage: S) -> Transform<I, O2>
    where
        S: Runnable<O, O2> + Send + Sync + 'static,
        I: 'static,
        O: 'static,
        O2: 'static,
    {
        let prev_run = self.run_fn;
        Transform {
            run_fn: Box::new(move |input| {
                let intermediate = prev_run(input)?;
                stage.run(intermediate)
            }),
        }
    }

    /// Execute this transform on the given input
    pub fn run(&self, input: I) -> Result<O, Abort> {
        (self.run_fn)(input)
    }
}

impl<I, O> Runnable<I, O> for Transform<I, O>
where
    I: 'static,
    O: 'static,
{
    fn run(&self, input: I) -> Result<O, Abort> {
        Transform::run(self, input)
    }
}
