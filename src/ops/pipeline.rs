//! Ordered stages with a fallback chain.
//!
//! A [`Pipeline`] runs its stages in order and stops at the first error or
//! at the first stage that does not simply complete. A [`Fallback`] pairs a
//! primary stage with a pipeline that only runs when the primary fails with
//! a recoverable error.

use crate::core::{ErrorKind, PipelineError, PipelineResult};

/// How a stage (or a whole pipeline) finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// The build was configured but has to be finished by hand
    ManualBuildRequired,
}

/// One fallible step.
pub trait Stage {
    fn name(&self) -> &str;

    fn run(&mut self) -> PipelineResult<Outcome>;
}

/// A stage backed by a closure.
pub struct FnStage<F> {
    name: String,
    f: F,
}

impl<F> FnStage<F>
where
    F: FnMut() -> PipelineResult<Outcome>,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        FnStage {
            name: name.into(),
            f,
        }
    }
}

impl<F> Stage for FnStage<F>
where
    F: FnMut() -> PipelineResult<Outcome>,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn run(&mut self) -> PipelineResult<Outcome> {
        (self.f)()
    }
}

/// Sequential, short-circuiting stages.
#[derive(Default)]
pub struct Pipeline<'s> {
    stages: Vec<Box<dyn Stage + 's>>,
}

impl<'s> Pipeline<'s> {
    pub fn new() -> Self {
        Pipeline { stages: Vec::new() }
    }

    /// Append a stage.
    pub fn stage(mut self, stage: impl Stage + 's) -> Self {
        self.stages.push(Box::new(stage));
        self
    }

    /// Append a closure stage.
    pub fn then<F>(self, name: impl Into<String>, f: F) -> Self
    where
        F: FnMut() -> PipelineResult<Outcome> + 's,
    {
        self.stage(FnStage::new(name, f))
    }

    /// Run every stage in order.
    ///
    /// Returns the first outcome other than [`Outcome::Completed`], or
    /// `Completed` when all stages complete.
    pub fn run(&mut self) -> PipelineResult<Outcome> {
        for stage in &mut self.stages {
            tracing::debug!("Running stage `{}`", stage.name());
            let outcome = stage.run()?;
            if outcome != Outcome::Completed {
                tracing::debug!("Stage `{}` ended with {:?}", stage.name(), outcome);
                return Ok(outcome);
            }
        }
        Ok(Outcome::Completed)
    }
}

/// Which branch of a [`Fallback`] produced the result.
#[derive(Debug)]
pub enum Resolution {
    /// The primary stage succeeded; the fallback chain never ran
    Primary(Outcome),
    /// The primary stage failed with `reason` and the fallback chain succeeded
    Fallback { reason: PipelineError, outcome: Outcome },
}

/// A primary stage with a fallback pipeline.
pub struct Fallback<'s> {
    primary: Box<dyn Stage + 's>,
    chain: Pipeline<'s>,
}

impl<'s> Fallback<'s> {
    /// Fall back to `chain` when `primary` fails with a fetch error.
    pub fn new(primary: impl Stage + 's, chain: Pipeline<'s>) -> Self {
        Fallback {
            primary: Box::new(primary),
            chain,
        }
    }

    pub fn run(mut self) -> PipelineResult<Resolution> {
        match self.primary.run() {
            Ok(outcome) => Ok(Resolution::Primary(outcome)),
            Err(err) if err.kind() == ErrorKind::Fetch => {
                match err.status_code() {
                    Some(status) => tracing::warn!(
                        "{} failed (status {}): {}",
                        self.primary.name(),
                        status,
                        err
                    ),
                    None => tracing::warn!("{} failed: {}", self.primary.name(), err),
                }
                let outcome = self.chain.run()?;
                Ok(Resolution::Fallback {
                    reason: err,
                    outcome,
                })
            }
            Err(err) => Err(err),
        }
    }
}
