//! Per-compile context: options in, diagnostics out.

use crate::diagnostics::{Diagnostics, current_time_ms};
use crate::error::{CompileError, Result};
use std::time::Instant;

/// Vector-instruction support reported by the host runtime.
///
/// Only logged; compilation never depends on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HostCapabilities {
    pub simd: bool,
    pub relaxed_simd: bool,
}

/// Caller-supplied configuration for a compile.
#[derive(Debug, Clone, Default)]
pub struct CompileOptions {
    /// Dump declared data values after the Data section even without a
    /// `# dd` directive line.
    pub dump_data: bool,
    /// Host capabilities to report in the diagnostics log.
    pub capabilities: Option<HostCapabilities>,
}

/// State owned by exactly one compile invocation.
#[derive(Debug, Default)]
pub struct CompileContext {
    options: CompileOptions,
    diagnostics: Diagnostics,
}

impl CompileContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: CompileOptions) -> Self {
        let mut ctx = Self {
            options,
            diagnostics: Diagnostics::new(),
        };
        if let Some(caps) = ctx.options.capabilities {
            ctx.report_capabilities(caps);
        }
        ctx
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    /// Run one compile pass, logging start, end and elapsed time.
    ///
    /// An error returned by `pass` is appended to the log in user-facing
    /// form before being handed back to the caller.
    pub fn run<T>(
        &mut self,
        what: &str,
        pass: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let started = Instant::now();
        self.diagnostics
            .info(format!("Started compiling {} at {}", what, current_time_ms()));

        let result = pass(self);

        let elapsed = started.elapsed().as_millis();
        match &result {
            Ok(_) => self.diagnostics.info(format!(
                "Finished compiling {} at {} ({} ms)",
                what,
                current_time_ms(),
                elapsed
            )),
            Err(err) => {
                self.report(err);
                self.diagnostics.info(format!(
                    "Aborted compiling {} at {} ({} ms)",
                    what,
                    current_time_ms(),
                    elapsed
                ));
            }
        }
        result
    }

    /// Append an error to the log.
    pub fn report(&mut self, err: &CompileError) {
        self.diagnostics.error(err.to_string());
    }

    fn report_capabilities(&mut self, caps: HostCapabilities) {
        if caps.simd {
            self.diagnostics.info("SIMD in wasm is supported");
        } else {
            self.diagnostics
                .error("SIMD in wasm is NOT supported! Check your runtime.");
        }
        if caps.relaxed_simd {
            self.diagnostics.info("Relaxed SIMD in wasm is supported");
        } else {
            self.diagnostics.info(
                "Relaxed SIMD in wasm is NOT supported! Some things will not be available.",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::Level;
    use crate::error::Span;

    #[test]
    fn test_run_logs_start_and_end() {
        let mut ctx = CompileContext::new();
        let value = ctx.run("test", |_| Ok(7)).unwrap();
        assert_eq!(value, 7);

        let entries = ctx.diagnostics().entries();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].message.starts_with("Started compiling test"));
        assert!(entries[1].message.starts_with("Finished compiling test"));
        assert!(entries[1].message.ends_with("ms)"));
    }

    #[test]
    fn test_run_reports_error_before_returning() {
        let mut ctx = CompileContext::new();
        let err = ctx
            .run::<()>("test", |_| {
                Err(CompileError::Redeclaration {
                    name: "x".into(),
                    span: Span::new(2, 1),
                })
            })
            .unwrap_err();

        let errors: Vec<_> = ctx.diagnostics().errors().collect();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, err.to_string());
    }

    #[test]
    fn test_capabilities_are_only_logged() {
        let ctx = CompileContext::with_options(CompileOptions {
            capabilities: Some(HostCapabilities {
                simd: false,
                relaxed_simd: true,
            }),
            ..Default::default()
        });
        let entries = ctx.diagnostics().entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].level, Level::Error);
        assert_eq!(entries[1].level, Level::Info);
    }

    #[test]
    fn test_contexts_are_independent() {
        let mut a = CompileContext::new();
        let b = CompileContext::new();
        a.diagnostics_mut().warn("only in a");
        assert_eq!(a.diagnostics().len(), 1);
        assert!(b.diagnostics().is_empty());
    }
}
