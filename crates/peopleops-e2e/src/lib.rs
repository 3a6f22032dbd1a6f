//! PeopleOps E2E: page objects and scenarios for browser tests of the
//! PeopleOps platform and an OrangeHRM instance.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                     PEOPLEOPS-E2E Architecture                   │
//! ├──────────────────────────────────────────────────────────────────┤
//! │  ┌────────────┐   ┌────────────┐   ┌────────────┐   ┌──────────┐ │
//! │  │ Scenarios  │──►│ Page       │──►│ BasePage   │──►│ Page     │ │
//! │  │ + Registry │   │ Objects    │   │ + Locators │   │ Driver   │ │
//! │  └────────────┘   └────────────┘   └────────────┘   └──────────┘ │
//! │        │                                                  │      │
//! │        ▼                                                  ▼      │
//! │  ┌────────────┐   ┌────────────┐                    ┌──────────┐ │
//! │  │ Runner     │──►│ Reporter   │                    │ Chromium │ │
//! │  │ (projects) │   │ list/html/ │                    │ (CDP) or │ │
//! │  │            │   │ junit/json │                    │ Mock     │ │
//! │  └────────────┘   └────────────┘                    └──────────┘ │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Scenarios never talk to the driver directly: they build page objects
//! from a [`TestContext`], act through them and assert with the
//! [`runner::expect`] helpers. The runner executes projects in dependency
//! order so the `setup` project's stored session is in place before any
//! test that reuses it.

#![cfg_attr(test, allow(clippy::large_stack_arrays, clippy::large_stack_frames))]

/// Shared page behavior: navigation, actions, reads and waits
pub mod base_page;

/// Chromium control over CDP (feature `browser`)
pub mod browser;

/// Runner configuration, projects and config-file discovery
pub mod config;

/// Generated fixtures and fixed reference data
pub mod data;

/// The page driver contract and the in-memory mock
pub mod driver;

/// Client-side error capture
pub mod listener;

/// Element locators
pub mod locator;

/// Tracing subscriber setup
pub mod logging;

/// The page object contract
pub mod page_object;

/// Page objects for both applications
pub mod pages;

/// Run reports
pub mod reporter;

mod result;

/// Scenario registry, context and executor
pub mod runner;

/// The registered end-to-end scenarios
pub mod scenarios;

/// In-page scripts used by the CDP driver
pub mod script;

/// Session snapshots
pub mod session;

/// Action traces
pub mod trace;

/// Load states, element states and polling
pub mod wait;

pub use base_page::BasePage;
pub use config::{
    Credentials, ProjectConfig, ReporterKind, RunnerConfig, ScreenshotMode, TraceMode,
    DEFAULT_BASE_URL, DEFAULT_HRM_BASE_URL,
};
pub use data::{ReferenceData, TestDataGenerator};
pub use driver::{
    DriverConfig, DriverFactory, ElementHandle, MockDriver, MockDriverFactory, MockReaction,
    PageDriver,
};
pub use locator::{Locator, TextMatch};
pub use page_object::PageObject;
pub use reporter::{Reporter, TestResultEntry, TestStatus};
pub use result::{E2eError, E2eResult};
pub use runner::{Registry, RunPlan, Runner, Scenario, Selection, TestContext};
pub use session::{SessionStore, StorageState};
pub use wait::{LoadState, UrlPattern};
