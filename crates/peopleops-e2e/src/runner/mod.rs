//! Scenario runner.
//!
//! Scenarios are registered in a [`Registry`], selected with a
//! [`Selection`] and executed by a [`Runner`] against pages from a
//! [`DriverFactory`](crate::driver::DriverFactory). Scenario bodies receive
//! a [`TestContext`] and assert through the [`expect`] helpers.

mod context;
mod executor;
pub mod expect;
mod registry;

pub use context::TestContext;
pub use executor::{artifact_dir, PlannedProject, ProgressFn, RunPlan, Runner};
pub use expect::{
    expect_contains, expect_count, expect_eq, expect_true, expect_url_contains, expect_visible,
};
pub use registry::{slug, Registry, Scenario, ScenarioFn, Selection};
