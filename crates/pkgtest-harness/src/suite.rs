//! Class-level orchestration: runs an ordered sequence of test methods,
//! sharing one fixture across all of them when the class asks for a
//! persistent fixture.
//!
//! # Persistent fixtures
//!
//! A class whose setUp stands up something expensive (a long-lived managed
//! service, say) declares itself persistent. The orchestrator then builds
//! the fixture once, runs the real setUp once, hands every method a
//! [`MethodCase`] that borrows the shared fixture with
//! `owns_lifecycle = false`, and runs the real tearDown exactly once after
//! the loop — whether the loop ended normally or on an abort signal.
//!
//! Non-persistent classes get a fresh fixture per method and the case
//! wrapper drives the lifecycle itself.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::case::{
    CaseError, Interrupted, MethodCase, SetUp, TestBody, TestFixture, TestId, run_case,
};
use crate::collector::{Control, ResultCollector};

/// Wall-clock seconds for one executed test method.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingEntry {
    pub class_name: String,
    pub method_name: String,
    pub seconds: f64,
}

/// One test method of a class: a name plus a body operating on the class
/// fixture.
pub struct TestMethod<F: TestFixture> {
    pub name: String,
    pub body: TestBody<F>,
}

impl<F: TestFixture> TestMethod<F> {
    #[must_use]
    pub fn new(name: impl Into<String>, body: TestBody<F>) -> Self {
        Self {
            name: name.into(),
            body,
        }
    }
}

/// Object-safe face of a class suite, so a run plan can mix fixture types:
/// `Vec<Box<dyn Suite>>`.
pub trait Suite {
    /// Run every method in declared order.
    ///
    /// Returns the collector's abort signal so the caller can stop
    /// dispatching further suites.
    ///
    /// # Errors
    ///
    /// `Err(Interrupted)` on process-level cancellation; remaining methods
    /// are left unclassified.
    fn run(&mut self, collector: &mut ResultCollector<'_>) -> Result<Control, Interrupted>;

    /// Drain the timing recorded by the last `run`.
    fn take_timing(&mut self) -> Vec<TimingEntry>;

    fn class_name(&self) -> &str;
}

/// An ordered set of test methods sharing a fixture type.
pub struct ClassSuite<F: TestFixture> {
    class_name: String,
    persistent: bool,
    make_fixture: Box<dyn Fn() -> F>,
    methods: Vec<TestMethod<F>>,
    timing: Vec<TimingEntry>,
}

impl<F: TestFixture> ClassSuite<F> {
    #[must_use]
    pub fn new(class_name: impl Into<String>, make_fixture: impl Fn() -> F + 'static) -> Self {
        Self {
            class_name: class_name.into(),
            persistent: false,
            make_fixture: Box::new(make_fixture),
            methods: Vec::new(),
            timing: Vec::new(),
        }
    }

    /// Declare the persistent-fixture capability: real setUp/tearDown run
    /// once for the whole class instead of once per method.
    #[must_use]
    pub fn persistent(mut self, persistent: bool) -> Self {
        self.persistent = persistent;
        self
    }

    #[must_use]
    pub fn with_method(mut self, name: impl Into<String>, body: TestBody<F>) -> Self {
        self.methods.push(TestMethod::new(name, body));
        self
    }

    pub fn add_method(&mut self, name: impl Into<String>, body: TestBody<F>) {
        self.methods.push(TestMethod::new(name, body));
    }

    #[must_use]
    pub fn is_persistent(&self) -> bool {
        self.persistent
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    fn run_per_method(
        &mut self,
        collector: &mut ResultCollector<'_>,
    ) -> Result<Control, Interrupted> {
        let coverage = collector.coverage().cloned();
        for method in &self.methods {
            let mut fixture = (self.make_fixture)();
            if let Some(ctx) = &coverage {
                fixture.attach_context(ctx);
            }
            let started = Instant::now();
            let control = run_case(
                MethodCase {
                    id: TestId::new(&self.class_name, &method.name),
                    body: method.body,
                    fixture: &mut fixture,
                    owns_lifecycle: true,
                },
                collector,
            )?;
            self.timing.push(TimingEntry {
                class_name: self.class_name.clone(),
                method_name: method.name.clone(),
                seconds: started.elapsed().as_secs_f64(),
            });
            if control.is_abort() {
                return Ok(Control::Abort);
            }
        }
        Ok(Control::Continue)
    }

    fn run_persistent(
        &mut self,
        collector: &mut ResultCollector<'_>,
    ) -> Result<Control, Interrupted> {
        let mut fixture = (self.make_fixture)();
        if let Some(ctx) = collector.coverage().cloned() {
            fixture.attach_context(&ctx);
        }

        debug!(class = %self.class_name, "running persistent fixture setUp");
        let set_up_ok = match fixture.set_up() {
            Ok(SetUp::Ready) => true,
            Ok(SetUp::EarlyTearDown) => {
                // Early teardown is a per-test precondition check; at class
                // level there is no single test to mark successful.
                let id = TestId::new(&self.class_name, "setUp");
                collector.start(&id);
                let _ = collector
                    .add_error(&id, "early teardown is not meaningful for a persistent fixture");
                false
            }
            Err(CaseError::Interrupted) => return Err(Interrupted),
            Err(CaseError::Assertion(detail) | CaseError::Unexpected(detail)) => {
                let id = TestId::new(&self.class_name, "setUp");
                collector.start(&id);
                let _ = collector.add_error(&id, &detail);
                false
            }
        };

        let mut control = Control::Continue;
        if set_up_ok {
            for method in &self.methods {
                let started = Instant::now();
                let method_control = run_case(
                    MethodCase {
                        id: TestId::new(&self.class_name, &method.name),
                        body: method.body,
                        fixture: &mut fixture,
                        owns_lifecycle: false,
                    },
                    collector,
                )?;
                self.timing.push(TimingEntry {
                    class_name: self.class_name.clone(),
                    method_name: method.name.clone(),
                    seconds: started.elapsed().as_secs_f64(),
                });
                if method_control.is_abort() {
                    control = Control::Abort;
                    break;
                }
            }
        }

        // Real tearDown runs exactly once per class, normal end or abort.
        debug!(class = %self.class_name, "running persistent fixture tearDown");
        match fixture.tear_down() {
            Ok(()) => {}
            Err(CaseError::Interrupted) => return Err(Interrupted),
            Err(CaseError::Assertion(detail) | CaseError::Unexpected(detail)) => {
                let id = TestId::new(&self.class_name, "tearDown");
                collector.start(&id);
                let _ = collector.add_error(&id, &detail);
            }
        }

        Ok(control)
    }
}

impl<F: TestFixture> Suite for ClassSuite<F> {
    fn run(&mut self, collector: &mut ResultCollector<'_>) -> Result<Control, Interrupted> {
        // A class with no test methods never touches its fixture.
        if self.methods.is_empty() {
            return Ok(Control::Continue);
        }
        if self.persistent {
            self.run_persistent(collector)
        } else {
            self.run_per_method(collector)
        }
    }

    fn take_timing(&mut self) -> Vec<TimingEntry> {
        std::mem::take(&mut self.timing)
    }

    fn class_name(&self) -> &str {
        &self.class_name
    }
}
