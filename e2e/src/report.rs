use std::{
    any::Any,
    fmt::{Debug, Display, Formatter},
};

use thiserror::Error;

use crate::BrowserType;

pub(crate) struct TestResult {
    pub test_name: &'static str,
    pub browser_type: BrowserType,
    pub result: anyhow::Result<()>,
}

impl TestResult {
    fn status(&self) -> &'static str {
        if self.result.is_ok() {
            "OK"
        } else {
            "FAILED"
        }
    }
}

impl Display for TestResult {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} in {}...\t[{}]",
            self.test_name,
            self.browser_type,
            self.status()
        )?;
        if let Err(err) = &self.result {
            write!(f, "\n{:#?}", err)?;
        }
        Ok(())
    }
}

/// Why the runner could not get as far as running a test.
#[derive(Debug, Error)]
pub(crate) enum SetupFailure {
    #[error("Web app not reachable at {0}")]
    ServerUnreachable(String),

    #[error("No host or port in base url {0}")]
    InvalidBaseUrl(String),

    #[error("Failed to initialize {0}")]
    Initialize(BrowserType),

    #[error("Failed to open page in {browser_type} of {test_name}")]
    OpenPage {
        test_name: &'static str,
        browser_type: BrowserType,
    },
}

/// Setup failures collected across browsers, reported together.
pub(crate) struct ErrorList<C> {
    vec: Vec<(C, anyhow::Error)>,
}

impl<C> ErrorList<C> {
    pub fn new<E: Into<anyhow::Error>>(context: C, error: E) -> Self {
        ErrorList {
            vec: vec![(context, error.into())],
        }
    }

    pub fn push<E: Into<anyhow::Error>>(&mut self, context: C, error: E) {
        self.vec.push((context, error.into()));
    }
}

impl<C: Display> ErrorList<C> {
    /// One line per failure. `verbose` prints each error's debug form, which
    /// carries its backtrace; otherwise the cause chain is joined on one line.
    fn write_failures(&self, f: &mut Formatter<'_>, verbose: bool) -> std::fmt::Result {
        writeln!(f, "{} setup failure(s):", self.vec.len())?;
        for (context, error) in &self.vec {
            if verbose {
                writeln!(f, "\t- {}: {:#?}", context, error)?;
            } else {
                writeln!(f, "\t- {}: {:#}", context, error)?;
            }
        }
        Ok(())
    }
}

impl<C: Display> Debug for ErrorList<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.write_failures(f, true)
    }
}

impl<C: Display> Display for ErrorList<C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.write_failures(f, false)
    }
}

impl<C: Display> std::error::Error for ErrorList<C> {}

/// A test that panicked instead of returning an error.
#[derive(Error)]
#[error("{}", .0.as_deref().unwrap_or("Unknown error"))]
pub(crate) struct CaughtPanic(Option<Box<str>>);

impl CaughtPanic {
    pub fn new(err: Box<dyn Any + Send + 'static>) -> Self {
        match err.downcast::<String>() {
            Ok(message) => CaughtPanic(Some(message.into_boxed_str())),
            Err(err) => match err.downcast::<&str>() {
                Ok(message) => CaughtPanic(Some((*message).into())),
                Err(_) => CaughtPanic(None),
            },
        }
    }
}

impl Debug for CaughtPanic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}
