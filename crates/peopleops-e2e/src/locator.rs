//! Locator descriptors for element selection.
//!
//! A [`Locator`] is an immutable chain of [`Step`]s. Each step selects
//! elements inside the elements matched by the previous step, optionally
//! narrows them with [`Filter`]s and finally picks one by position.
//!
//! Locators have two renderings:
//!
//! - a canonical display string (`role=button[name="Save"i] >> nth=0`) used
//!   in logs, error messages and as the element key of the mock driver;
//! - a serde plan (JSON) that the browser driver hands to the in-page
//!   resolver script.
//!
//! Raw selector strings convert into locators, so page objects can pass
//! `"input#email"` wherever a locator is accepted.

use regex::RegexBuilder;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default timeout for auto-waiting actions (5 seconds)
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

/// Default polling interval for auto-waiting (50ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 50;

/// How element text or accessible names are compared.
///
/// Text is whitespace-normalized before comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TextMatch {
    /// Case-insensitive substring
    Contains(String),
    /// Case-sensitive whole-string equality
    Exact(String),
    /// Regular expression
    Pattern {
        /// Expression source
        source: String,
        /// Ignore case
        case_insensitive: bool,
    },
}

impl TextMatch {
    /// Case-insensitive substring match
    #[must_use]
    pub fn contains(text: impl Into<String>) -> Self {
        Self::Contains(text.into())
    }

    /// Exact match
    #[must_use]
    pub fn exact(text: impl Into<String>) -> Self {
        Self::Exact(text.into())
    }

    /// Case-insensitive regular expression, like `/save/i`
    #[must_use]
    pub fn pattern(source: impl Into<String>) -> Self {
        Self::Pattern {
            source: source.into(),
            case_insensitive: true,
        }
    }

    /// Check a piece of text against this matcher.
    ///
    /// An invalid pattern never matches.
    #[must_use]
    pub fn matches(&self, text: &str) -> bool {
        let normalized = normalize_whitespace(text);
        match self {
            Self::Contains(needle) => normalized
                .to_lowercase()
                .contains(&normalize_whitespace(needle).to_lowercase()),
            Self::Exact(expected) => normalized == normalize_whitespace(expected),
            Self::Pattern {
                source,
                case_insensitive,
            } => RegexBuilder::new(source)
                .case_insensitive(*case_insensitive)
                .build()
                .map(|re| re.is_match(&normalized))
                .unwrap_or(false),
        }
    }
}

impl From<&str> for TextMatch {
    fn from(text: &str) -> Self {
        Self::Contains(text.to_string())
    }
}

impl From<String> for TextMatch {
    fn from(text: String) -> Self {
        Self::Contains(text)
    }
}

impl From<&String> for TextMatch {
    fn from(text: &String) -> Self {
        Self::Contains(text.clone())
    }
}

impl fmt::Display for TextMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Contains(text) => write!(f, "{text:?}i"),
            Self::Exact(text) => write!(f, "{text:?}s"),
            Self::Pattern {
                source,
                case_insensitive,
            } => {
                write!(f, "/{source}/")?;
                if *case_insensitive {
                    write!(f, "i")?;
                }
                Ok(())
            }
        }
    }
}

/// Collapse runs of whitespace and trim, the way rendered text is compared.
#[must_use]
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Selector strategy for one locator step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Selector {
    /// CSS selector (e.g., "button.primary")
    Css(String),
    /// XPath expression, evaluated relative to the scope element
    XPath(String),
    /// Element whose own text matches
    Text(TextMatch),
    /// `data-testid` attribute
    TestId(String),
    /// ARIA role with optional accessible name
    Role {
        /// Role name (button, link, heading, ...)
        role: String,
        /// Accessible name matcher
        name: Option<TextMatch>,
    },
    /// Input placeholder
    Placeholder(TextMatch),
    /// Form control by its label text
    Label(TextMatch),
    /// Union of several locators, in document order
    Any(Vec<Locator>),
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(css) => write!(f, "{css}"),
            Self::XPath(xpath) => write!(f, "xpath={xpath}"),
            Self::Text(text) => write!(f, "text={text}"),
            Self::TestId(id) => write!(f, "testid={id}"),
            Self::Role { role, name: None } => write!(f, "role={role}"),
            Self::Role {
                role,
                name: Some(name),
            } => write!(f, "role={role}[name={name}]"),
            Self::Placeholder(text) => write!(f, "placeholder={text}"),
            Self::Label(text) => write!(f, "label={text}"),
            Self::Any(options) => {
                let parts: Vec<String> = options.iter().map(ToString::to_string).collect();
                write!(f, "({})", parts.join(" | "))
            }
        }
    }
}

/// Narrowing applied to the elements matched by a step
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Filter {
    /// Element text matches
    HasText(TextMatch),
    /// Element text does not match
    HasNotText(TextMatch),
    /// Element contains a descendant matching the locator
    Has(Box<Locator>),
    /// Element visibility equals the flag
    Visible(bool),
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HasText(text) => write!(f, "has-text={text}"),
            Self::HasNotText(text) => write!(f, "has-not-text={text}"),
            Self::Has(inner) => write!(f, "has=({inner})"),
            Self::Visible(flag) => write!(f, "visible={flag}"),
        }
    }
}

/// Positional pick among the filtered matches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Nth {
    /// Zero-based index from the start
    Index(usize),
    /// Last match
    Last,
}

impl fmt::Display for Nth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "nth={i}"),
            Self::Last => write!(f, "nth=-1"),
        }
    }
}

/// One step of a locator chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    /// How to select candidates inside the current scope
    pub selector: Selector,
    /// Filters applied in order
    pub filters: Vec<Filter>,
    /// Positional pick applied after filters
    pub nth: Option<Nth>,
}

impl Step {
    fn new(selector: Selector) -> Self {
        Self {
            selector,
            filters: Vec::new(),
            nth: None,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.selector)?;
        for filter in &self.filters {
            write!(f, " >> {filter}")?;
        }
        if let Some(nth) = self.nth {
            write!(f, " >> {nth}")?;
        }
        Ok(())
    }
}

/// An immutable element descriptor.
///
/// Builders consume `self` and return the refined locator, so a page object
/// can derive row and cell locators from its base locators without mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    steps: Vec<Step>,
}

impl Locator {
    fn single(selector: Selector) -> Self {
        Self {
            steps: vec![Step::new(selector)],
        }
    }

    /// CSS selector
    #[must_use]
    pub fn css(selector: impl Into<String>) -> Self {
        Self::single(Selector::Css(selector.into()))
    }

    /// XPath expression
    #[must_use]
    pub fn xpath(expression: impl Into<String>) -> Self {
        Self::single(Selector::XPath(expression.into()))
    }

    /// `data-testid` attribute
    #[must_use]
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::single(Selector::TestId(id.into()))
    }

    /// Element by text
    #[must_use]
    pub fn text(text: impl Into<TextMatch>) -> Self {
        Self::single(Selector::Text(text.into()))
    }

    /// ARIA role without a name constraint
    #[must_use]
    pub fn role(role: impl Into<String>) -> Self {
        Self::single(Selector::Role {
            role: role.into(),
            name: None,
        })
    }

    /// ARIA role with an accessible name
    #[must_use]
    pub fn role_named(role: impl Into<String>, name: impl Into<TextMatch>) -> Self {
        Self::single(Selector::Role {
            role: role.into(),
            name: Some(name.into()),
        })
    }

    /// Input by placeholder
    #[must_use]
    pub fn placeholder(text: impl Into<TextMatch>) -> Self {
        Self::single(Selector::Placeholder(text.into()))
    }

    /// Form control by label
    #[must_use]
    pub fn label(text: impl Into<TextMatch>) -> Self {
        Self::single(Selector::Label(text.into()))
    }

    /// Parse a raw selector string.
    ///
    /// Segments are separated by `>>`. A segment starting with `//`, `(//`,
    /// `..` or `xpath=` is XPath, `text=` is a text match (quoted values are
    /// exact), `testid=` is a test id, `nth=N` picks a position in the
    /// previous segment (`-1` is last) and anything else is CSS.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let mut steps: Vec<Step> = Vec::new();
        for segment in raw.split(">>").map(str::trim).filter(|s| !s.is_empty()) {
            if let Some(position) = segment.strip_prefix("nth=") {
                if let (Some(last), Ok(index)) = (steps.last_mut(), position.parse::<i64>()) {
                    last.nth = Some(if index < 0 {
                        Nth::Last
                    } else {
                        Nth::Index(index as usize)
                    });
                    continue;
                }
            }
            steps.push(Step::new(parse_segment(segment)));
        }
        if steps.is_empty() {
            steps.push(Step::new(Selector::Css(raw.to_string())));
        }
        Self { steps }
    }

    /// Steps of this chain
    #[must_use]
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Select `child` inside the elements matched by this locator
    #[must_use]
    pub fn locator(mut self, child: impl Into<Self>) -> Self {
        self.steps.extend(child.into().steps);
        self
    }

    /// Parent element of each match
    #[must_use]
    pub fn parent(self) -> Self {
        self.locator(Self::xpath(".."))
    }

    fn push_filter(mut self, filter: Filter) -> Self {
        if let Some(last) = self.steps.last_mut() {
            // A filter after a positional pick narrows the picked element,
            // so it starts a new step scoped to the element itself.
            if last.nth.is_some() {
                let mut step = Step::new(Selector::XPath(".".into()));
                step.filters.push(filter);
                self.steps.push(step);
            } else {
                last.filters.push(filter);
            }
        }
        self
    }

    /// Keep matches whose text contains `text` (case-insensitive)
    #[must_use]
    pub fn has_text(self, text: impl Into<TextMatch>) -> Self {
        self.push_filter(Filter::HasText(text.into()))
    }

    /// Keep matches whose whole text equals `text`
    #[must_use]
    pub fn has_exact_text(self, text: impl Into<String>) -> Self {
        self.push_filter(Filter::HasText(TextMatch::exact(text)))
    }

    /// Drop matches whose text matches `text`
    #[must_use]
    pub fn has_not_text(self, text: impl Into<TextMatch>) -> Self {
        self.push_filter(Filter::HasNotText(text.into()))
    }

    /// Keep matches containing a descendant matched by `inner`
    #[must_use]
    pub fn filter_has(self, inner: impl Into<Self>) -> Self {
        self.push_filter(Filter::Has(Box::new(inner.into())))
    }

    /// Keep only visible matches
    #[must_use]
    pub fn visible(self) -> Self {
        self.push_filter(Filter::Visible(true))
    }

    fn pick(mut self, nth: Nth) -> Self {
        if let Some(last) = self.steps.last_mut() {
            if last.nth.is_some() {
                let mut step = Step::new(Selector::XPath(".".into()));
                step.nth = Some(nth);
                self.steps.push(step);
            } else {
                last.nth = Some(nth);
            }
        }
        self
    }

    /// First match
    #[must_use]
    pub fn first(self) -> Self {
        self.pick(Nth::Index(0))
    }

    /// Last match
    #[must_use]
    pub fn last(self) -> Self {
        self.pick(Nth::Last)
    }

    /// Match at zero-based `index`
    #[must_use]
    pub fn nth(self, index: usize) -> Self {
        self.pick(Nth::Index(index))
    }

    /// Elements matched by either locator
    #[must_use]
    pub fn or(self, other: impl Into<Self>) -> Self {
        let other = other.into();
        let mut options = match self.steps.as_slice() {
            [Step {
                selector: Selector::Any(existing),
                filters,
                nth: None,
            }] if filters.is_empty() => existing.clone(),
            _ => vec![self],
        };
        options.push(other);
        Self::single(Selector::Any(options))
    }

    /// JSON plan consumed by the in-page resolver
    #[must_use]
    pub fn to_plan(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

fn parse_segment(segment: &str) -> Selector {
    if let Some(xpath) = segment.strip_prefix("xpath=") {
        return Selector::XPath(xpath.to_string());
    }
    if segment.starts_with("//") || segment.starts_with("(//") || segment.starts_with("..") {
        return Selector::XPath(segment.to_string());
    }
    if let Some(text) = segment.strip_prefix("text=") {
        let quoted = text.len() >= 2 && text.starts_with('"') && text.ends_with('"');
        return if quoted {
            Selector::Text(TextMatch::exact(&text[1..text.len() - 1]))
        } else {
            Selector::Text(TextMatch::contains(text))
        };
    }
    if let Some(id) = segment.strip_prefix("testid=") {
        return Selector::TestId(id.to_string());
    }
    let css = segment.strip_prefix("css=").unwrap_or(segment);
    Selector::Css(css.to_string())
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.steps.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" >> "))
    }
}

impl From<&str> for Locator {
    fn from(raw: &str) -> Self {
        Self::parse(raw)
    }
}

impl From<String> for Locator {
    fn from(raw: String) -> Self {
        Self::parse(&raw)
    }
}

impl From<&String> for Locator {
    fn from(raw: &String) -> Self {
        Self::parse(raw)
    }
}

impl From<&Self> for Locator {
    fn from(locator: &Self) -> Self {
        locator.clone()
    }
}
