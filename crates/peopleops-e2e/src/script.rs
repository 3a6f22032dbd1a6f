//! In-page scripts used by the browser driver.
//!
//! Locators are resolved inside the page by a small runtime installed on
//! `window.__peopleops`. Every expression built here starts with the
//! (idempotent) installer, because navigation discards the window object.

use crate::driver::SelectBy;
use crate::locator::Locator;

/// Runtime that resolves serialized locator plans.
pub const RESOLVER_RUNTIME: &str = r#"(() => {
  if (window.__peopleops) { return; }
  const norm = (s) => (s || '').replace(/\s+/g, ' ').trim();
  const textMatches = (m, text) => {
    const t = norm(text);
    switch (m.kind) {
      case 'contains': return t.toLowerCase().includes(norm(m.value).toLowerCase());
      case 'exact': return t === norm(m.value);
      case 'pattern':
        try { return new RegExp(m.value.source, m.value.case_insensitive ? 'i' : '').test(t); }
        catch (e) { return false; }
      default: return false;
    }
  };
  const isVisible = (el) => {
    if (!(el instanceof Element) || !el.isConnected) { return false; }
    const style = getComputedStyle(el);
    if (style.visibility === 'hidden' || style.display === 'none') { return false; }
    const r = el.getBoundingClientRect();
    return r.width > 0 && r.height > 0;
  };
  const INPUT_ROLES = { button: 'button', submit: 'button', reset: 'button', image: 'button',
    checkbox: 'checkbox', radio: 'radio', range: 'slider', search: 'searchbox' };
  const roleOf = (el) => {
    const explicit = el.getAttribute('role');
    if (explicit) { return explicit.split(' ')[0]; }
    const tag = el.tagName.toLowerCase();
    if (tag === 'input') { return INPUT_ROLES[(el.getAttribute('type') || 'text').toLowerCase()] || 'textbox'; }
    if (/^h[1-6]$/.test(tag)) { return 'heading'; }
    const map = { a: el.hasAttribute('href') ? 'link' : null, button: 'button', select: 'combobox',
      textarea: 'textbox', table: 'table', tr: 'row', td: 'cell', th: 'columnheader', ul: 'list',
      ol: 'list', li: 'listitem', nav: 'navigation', img: 'img', dialog: 'dialog', option: 'option',
      form: 'form', main: 'main', header: 'banner', aside: 'complementary' };
    return map[tag] || null;
  };
  const labelOf = (el) => {
    if (el.getAttribute('aria-label')) { return el.getAttribute('aria-label'); }
    const by = el.getAttribute('aria-labelledby');
    if (by) { return by.split(' ').map((id) => norm((document.getElementById(id) || {}).textContent)).join(' '); }
    if (el.labels && el.labels.length) { return Array.from(el.labels).map((l) => l.textContent).join(' '); }
    return '';
  };
  const nameOf = (el) => {
    const label = labelOf(el);
    if (label) { return label; }
    const tag = el.tagName.toLowerCase();
    if (tag === 'input' && ['button', 'submit', 'reset'].includes(el.type)) { return el.value; }
    if (tag === 'img') { return el.getAttribute('alt') || ''; }
    return el.getAttribute('title') || el.textContent || el.getAttribute('placeholder') || '';
  };
  const all = (scope) => Array.from(scope.querySelectorAll('*'));
  const docOrder = (a, b) => (a.compareDocumentPosition(b) & Node.DOCUMENT_POSITION_FOLLOWING ? -1 : 1);
  const select = (scope, sel) => {
    switch (sel.kind) {
      case 'css': return Array.from(scope.querySelectorAll(sel.value));
      case 'xpath': {
        const r = document.evaluate(sel.value, scope, null, XPathResult.ORDERED_NODE_SNAPSHOT_TYPE, null);
        const out = [];
        for (let i = 0; i < r.snapshotLength; i++) {
          const n = r.snapshotItem(i);
          if (n instanceof Element) { out.push(n); }
        }
        return out;
      }
      case 'text': return all(scope).filter((el) => textMatches(sel.value, el.textContent)
        && !Array.from(el.children).some((c) => textMatches(sel.value, c.textContent)));
      case 'test_id': return Array.from(scope.querySelectorAll('[data-testid="' + CSS.escape(sel.value) + '"]'));
      case 'role': return all(scope).filter((el) => roleOf(el) === sel.value.role
        && (!sel.value.name || textMatches(sel.value.name, nameOf(el))));
      case 'placeholder': return Array.from(scope.querySelectorAll('[placeholder]'))
        .filter((el) => textMatches(sel.value, el.getAttribute('placeholder')));
      case 'label': return Array.from(scope.querySelectorAll('input, select, textarea'))
        .filter((el) => textMatches(sel.value, labelOf(el)));
      case 'any': {
        const found = new Set();
        sel.value.forEach((plan) => resolve(plan, [scope]).forEach((el) => found.add(el)));
        return Array.from(found).sort(docOrder);
      }
      default: return [];
    }
  };
  const applyFilter = (els, f) => {
    switch (f.kind) {
      case 'has_text': return els.filter((el) => textMatches(f.value, el.textContent));
      case 'has_not_text': return els.filter((el) => !textMatches(f.value, el.textContent));
      case 'has': return els.filter((el) => resolve(f.value, [el]).length > 0);
      case 'visible': return els.filter((el) => isVisible(el) === f.value);
      default: return els;
    }
  };
  const resolve = (plan, roots) => {
    let scopes = roots || [document];
    for (const step of plan.steps) {
      let found = [];
      for (const scope of scopes) {
        for (const el of select(scope, step.selector)) {
          if (!found.includes(el)) { found.push(el); }
        }
      }
      for (const f of step.filters) { found = applyFilter(found, f); }
      if (step.nth) {
        const pick = step.nth.kind === 'last' ? found[found.length - 1] : found[step.nth.value];
        found = pick ? [pick] : [];
      }
      scopes = found;
    }
    return scopes;
  };
  const describe = (el) => ({
    tag_name: el.tagName.toLowerCase(),
    text_content: norm(el.textContent),
    visible: isVisible(el),
    enabled: !(el.disabled || el.getAttribute('aria-disabled') === 'true'),
    value: typeof el.value === 'string' ? el.value : null,
    checked: typeof el.checked === 'boolean' ? el.checked : null,
    attributes: Object.fromEntries(Array.from(el.attributes).map((a) => [a.name, a.value])),
  });
  const setValue = (el, value) => {
    const proto = el instanceof HTMLTextAreaElement ? HTMLTextAreaElement.prototype
      : el instanceof HTMLSelectElement ? HTMLSelectElement.prototype : HTMLInputElement.prototype;
    const desc = Object.getOwnPropertyDescriptor(proto, 'value');
    el.focus();
    if (desc && desc.set) { desc.set.call(el, value); } else { el.value = value; }
    el.dispatchEvent(new Event('input', { bubbles: true }));
    el.dispatchEvent(new Event('change', { bubbles: true }));
  };
  window.__peopleops = { resolve, describe, setValue, isVisible };
})();
"#;

fn with_first(locator: &Locator, body: &str) -> String {
    format!(
        "{RESOLVER_RUNTIME}\n(() => {{ const el = window.__peopleops.resolve({plan})[0]; \
         if (!el) {{ return false; }} el.scrollIntoView({{ block: 'center' }}); {body} }})()",
        plan = locator.to_plan(),
    )
}

fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}

/// Describe every element the locator resolves to
#[must_use]
pub fn query_expr(locator: &Locator) -> String {
    format!(
        "{RESOLVER_RUNTIME}\nwindow.__peopleops.resolve({plan}).map(window.__peopleops.describe)",
        plan = locator.to_plan(),
    )
}

/// Click the first match; evaluates to `false` when nothing matched
#[must_use]
pub fn click_expr(locator: &Locator) -> String {
    with_first(locator, "el.click(); return true;")
}

/// Replace the value of the first match
#[must_use]
pub fn fill_expr(locator: &Locator, value: &str) -> String {
    with_first(
        locator,
        &format!(
            "window.__peopleops.setValue(el, {}); return true;",
            js_string(value)
        ),
    )
}

/// Select an option; evaluates to `null` when no option matched
#[must_use]
pub fn select_expr(locator: &Locator, by: &SelectBy) -> String {
    let predicate = match by {
        SelectBy::Value(v) => format!("o.value === {}", js_string(v)),
        SelectBy::Label(l) => format!("o.label.trim() === {} || o.textContent.trim() === {}", js_string(l), js_string(l)),
    };
    with_first(
        locator,
        &format!(
            "const opt = Array.from(el.options || []).find((o) => {predicate}); \
             if (!opt) {{ return null; }} window.__peopleops.setValue(el, opt.value); return true;"
        ),
    )
}

/// Toggle the first match until `checked` holds
#[must_use]
pub fn check_expr(locator: &Locator, checked: bool) -> String {
    with_first(
        locator,
        &format!("if (el.checked !== {checked}) {{ el.click(); }} return true;"),
    )
}

/// Focus the first match
#[must_use]
pub fn focus_expr(locator: &Locator) -> String {
    with_first(locator, "el.focus(); return true;")
}

/// Web storage of the current origin
pub const CAPTURE_STORAGE: &str = r"(() => ({
  origin: location.origin,
  localStorage: Object.keys(localStorage).map((name) => ({ name, value: localStorage.getItem(name) })),
  sessionStorage: Object.keys(sessionStorage).map((name) => ({ name, value: sessionStorage.getItem(name) })),
}))()";

/// Write storage entries for the current origin
#[must_use]
pub fn restore_storage_expr(origin: &crate::session::OriginState) -> String {
    let local = serde_json::to_string(&origin.local_storage).unwrap_or_else(|_| "[]".into());
    let session = serde_json::to_string(&origin.session_storage).unwrap_or_else(|_| "[]".into());
    format!(
        "(() => {{ {local}.forEach((e) => localStorage.setItem(e.name, e.value)); \
         {session}.forEach((e) => sessionStorage.setItem(e.name, e.value)); return true; }})()"
    )
}

/// Override blocking dialogs so `confirm()` returns `accept`
#[must_use]
pub fn auto_dialog_expr(accept: bool) -> String {
    format!("window.confirm = () => {accept}; window.alert = () => {{}}; true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{OriginState, StorageEntry};

    mod expr_tests {
        use super::*;

        #[test]
        fn test_query_embeds_plan() {
            let expr = query_expr(&Locator::test_id("bench-count"));
            assert!(expr.starts_with(RESOLVER_RUNTIME));
            assert!(expr.contains(r#""kind":"test_id""#));
            assert!(expr.contains("bench-count"));
            assert!(expr.ends_with("map(window.__peopleops.describe)"));
        }

        #[test]
        fn test_fill_escapes_value() {
            let expr = fill_expr(&Locator::css("input#email"), "o'brien \"x\"\n");
            assert!(expr.contains(r#"setValue(el, "o'brien \"x\"\n")"#));
        }

        #[test]
        fn test_select_by_label() {
            let expr = select_expr(&Locator::css("select#status"), &SelectBy::Label("Active".into()));
            assert!(expr.contains("o.label.trim() === \"Active\""));
            let expr = select_expr(&Locator::css("select#status"), &SelectBy::Value("1".into()));
            assert!(expr.contains("o.value === \"1\""));
        }

        #[test]
        fn test_check_and_click() {
            assert!(check_expr(&Locator::css("input"), true).contains("el.checked !== true"));
            assert!(click_expr(&Locator::css("button")).contains("el.click()"));
            assert!(focus_expr(&Locator::css("input")).contains("el.focus()"));
        }

        #[test]
        fn test_restore_storage() {
            let mut origin = OriginState::new("http://localhost:3000");
            origin.local_storage.push(StorageEntry {
                name: "token".into(),
                value: "jwt".into(),
            });
            let expr = restore_storage_expr(&origin);
            assert!(expr.contains(r#"[{"name":"token","value":"jwt"}].forEach"#));
            assert!(expr.contains("[].forEach"));
        }

        #[test]
        fn test_auto_dialog() {
            assert_eq!(
                auto_dialog_expr(true),
                "window.confirm = () => true; window.alert = () => {}; true"
            );
        }
    }
}
