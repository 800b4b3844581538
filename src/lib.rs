//! Deterministic headless harness for a certificate-request form page.
//!
//! [`Page`] loads the page markup into a lightweight DOM, wires the form
//! enhancement behavior the real page runs in a browser (field validation
//! with inline feedback, a submission gate with a loading latch, a download
//! countdown, copy-to-clipboard buttons, alert auto-dismissal), and exposes
//! user events, a virtual clock, and assertions so the whole thing can be
//! exercised from plain Rust tests.
//!
//! ```
//! use certform_tester::Page;
//!
//! # fn main() -> certform_tester::Result<()> {
//! let mut page = Page::from_html(
//!     r#"
//!     <form id="sslForm">
//!       <div><input id="domains" name="domains"></div>
//!       <div><input id="email" name="email"></div>
//!       <div><input id="accept_agreement" name="accept_agreement" type="checkbox"></div>
//!       <button id="generateBtn" type="submit">
//!         <span class="btn-text">Generate</span>
//!         <span class="btn-loading d-none">Working</span>
//!       </button>
//!     </form>
//!     "#,
//! )?;
//!
//! page.type_text("#domains", "example.com")?;
//! page.blur("#domains")?;
//! page.assert_text(".valid-feedback", "1 domain(s) validated successfully.")?;
//! # Ok(())
//! # }
//! ```

mod clipboard;
mod copy;
mod countdown;
mod dom;
mod form;
mod html;
mod selector;
mod validate;

#[cfg(test)]
mod tests;

use dom::{Dom, NodeId, is_checkbox_input_element, truncate_chars};
use form::FormBindings;

pub use clipboard::ClipboardError;
pub use dom::{Error, Result};
pub use validate::{
    FieldState, format_domain_input, is_valid_domain, split_domain_list, validate_domain_list,
    validate_email,
};

#[derive(Debug, Clone)]
enum TimerAction {
    CountdownTick,
    RestoreCopyLabel {
        button: NodeId,
        original_html: String,
        copied: bool,
    },
    DismissAlert {
        alert: NodeId,
    },
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: i64,
    due_at: i64,
    order: i64,
    interval_ms: Option<i64>,
    action: TimerAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: i64,
    pub due_at: i64,
    pub order: i64,
    pub interval_ms: Option<i64>,
}

#[derive(Debug, Clone, Copy)]
struct CountdownState {
    remaining: u32,
    timer_id: i64,
}

pub struct Page {
    dom: Dom,
    source_html: String,
    clipboard: clipboard::MockClipboard,
    bindings: Option<FormBindings>,
    countdown: Option<CountdownState>,
    selection: Option<NodeId>,
    submission_locked: bool,
    submissions: Vec<Vec<(String, String)>>,
    reload_count: u32,
    task_queue: Vec<ScheduledTask>,
    now_ms: i64,
    timer_step_limit: usize,
    next_timer_id: i64,
    next_task_order: i64,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        let dom = html::parse_html(html)?;
        let mut page = Self {
            dom,
            source_html: html.to_string(),
            clipboard: clipboard::MockClipboard::default(),
            bindings: None,
            countdown: None,
            selection: None,
            submission_locked: false,
            submissions: Vec::new(),
            reload_count: 0,
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        };
        page.initialize()?;
        Ok(page)
    }

    fn initialize(&mut self) -> Result<()> {
        self.bindings = self.resolve_form_bindings();
        self.start_countdown()?;
        self.schedule_alert_dismissals()?;
        Ok(())
    }

    /// Models the browser reload the countdown triggers at expiry: the DOM is
    /// rebuilt from the original markup, pending timers are dropped, and
    /// initialization reruns. Virtual time and the clipboard survive.
    fn reload_now(&mut self) -> Result<()> {
        self.dom = html::parse_html(&self.source_html)?;
        self.task_queue.clear();
        self.bindings = None;
        self.countdown = None;
        self.selection = None;
        self.submission_locked = false;
        self.reload_count += 1;
        let count = self.reload_count;
        self.trace_event_line(format!("[page] reload count={count} now_ms={}", self.now_ms));
        self.initialize()
    }

    pub fn reload_count(&self) -> u32 {
        self.reload_count
    }

    // ─── User events ───

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) || self.dom.readonly(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.trace_event_line(format!(
            "[event] input {}",
            self.event_node_label(target)
        ));
        self.on_input(target)
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let is_checkbox = self
            .dom
            .element(target)
            .map(is_checkbox_input_element)
            .unwrap_or(false);
        if !is_checkbox {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox]".into(),
                actual: self.dom.tag_name(target).unwrap_or("non-element").into(),
            });
        }

        let current = self.dom.checked(target)?;
        if current != checked {
            self.dom.set_checked(target, checked)?;
            self.on_input(target)?;
        }
        Ok(())
    }

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.click_node(target)
    }

    fn click_node(&mut self, target: NodeId) -> Result<()> {
        if self.dom.disabled(target) {
            return Ok(());
        }
        self.trace_event_line(format!(
            "[event] click {}",
            self.event_node_label(target)
        ));

        let is_checkbox = self
            .dom
            .element(target)
            .map(is_checkbox_input_element)
            .unwrap_or(false);
        if is_checkbox {
            let current = self.dom.checked(target)?;
            self.dom.set_checked(target, !current)?;
            return self.on_input(target);
        }

        if self.dom.class_contains(target, "copy-btn")? {
            return self.on_copy_click(target);
        }

        if self.is_submit_control(target) {
            if let Some(form) = self.resolve_form_for_submit(target) {
                self.on_submit(form)?;
            }
        }

        Ok(())
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.trace_event_line(format!("[event] blur {}", self.event_node_label(target)));
        self.on_blur(target)
    }

    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.resolve_form_for_submit(target)
        };

        if let Some(form_id) = form {
            self.trace_event_line(format!(
                "[event] submit {}",
                self.event_node_label(form_id)
            ));
            self.on_submit(form_id)?;
        }

        Ok(())
    }

    /// Dispatches a named event the way the page wiring would route it.
    /// Events without a handler on the target are discarded.
    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        match event {
            "input" => {
                let target = self.select_one(selector)?;
                self.on_input(target)
            }
            "blur" => self.blur(selector),
            "submit" => self.submit(selector),
            "click" => self.click(selector),
            _ => {
                let _ = self.select_one(selector)?;
                Ok(())
            }
        }
    }

    // ─── Virtual clock ───

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
                interval_ms: task.interval_ms,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::PageRuntime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::PageRuntime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        self.now_ms = target_ms;
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_due_timers(&mut self) -> Result<usize> {
        let ran = self.run_due_timers_internal()?;
        self.trace_timer_line(format!(
            "[timer] run_due now_ms={} ran={}",
            self.now_ms, ran
        ));
        Ok(ran)
    }

    pub fn set_timer_step_limit(&mut self, max_steps: usize) -> Result<()> {
        if max_steps == 0 {
            return Err(Error::PageRuntime(
                "set_timer_step_limit requires at least 1 step".into(),
            ));
        }
        self.timer_step_limit = max_steps;
        Ok(())
    }

    fn run_due_timers_internal(&mut self) -> Result<usize> {
        let mut steps = 0usize;
        while let Some(next_idx) = self.next_due_task_index() {
            steps += 1;
            if steps > self.timer_step_limit {
                return Err(self.timer_step_limit_error(self.timer_step_limit, steps));
            }
            let task = self.task_queue.remove(next_idx);
            self.execute_timer_task(task)?;
        }
        Ok(steps)
    }

    fn next_due_task_index(&self) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_at <= self.now_ms)
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    fn timer_step_limit_error(&self, max_steps: usize, steps: usize) -> Error {
        let next_task_desc = self
            .next_due_task_index()
            .and_then(|idx| self.task_queue.get(idx))
            .map(|task| {
                let interval_desc = task
                    .interval_ms
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "none".into());
                format!(
                    "id={},due_at={},order={},interval_ms={}",
                    task.id, task.due_at, task.order, interval_desc
                )
            })
            .unwrap_or_else(|| "none".into());

        Error::PageRuntime(format!(
            "timer run exceeded max task steps (possible uncleared interval): limit={max_steps}, steps={steps}, now_ms={}, pending_tasks={}, next_task={}",
            self.now_ms,
            self.task_queue.len(),
            next_task_desc
        ))
    }

    fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        let interval_desc = task
            .interval_ms
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        self.trace_timer_line(format!(
            "[timer] run id={} due_at={} interval_ms={} now_ms={}",
            task.id, task.due_at, interval_desc, self.now_ms
        ));

        let requeue = match &task.action {
            TimerAction::CountdownTick => self.countdown_tick()?,
            TimerAction::RestoreCopyLabel {
                button,
                original_html,
                copied,
            } => {
                let (button, original_html, copied) = (*button, original_html.clone(), *copied);
                self.restore_copy_label(button, &original_html, copied)?;
                false
            }
            TimerAction::DismissAlert { alert } => {
                let alert = *alert;
                self.dismiss_alert(alert)?;
                false
            }
        };

        if let Some(interval_ms) = task.interval_ms {
            if requeue {
                let delay_ms = interval_ms.max(0);
                let due_at = task.due_at.saturating_add(delay_ms);
                let order = self.next_task_order;
                self.next_task_order += 1;
                self.task_queue.push(ScheduledTask {
                    id: task.id,
                    due_at,
                    order,
                    interval_ms: Some(delay_ms),
                    action: task.action,
                });
                self.trace_timer_line(format!(
                    "[timer] requeue id={} due_at={} interval_ms={}",
                    task.id, due_at, delay_ms
                ));
            } else {
                self.trace_timer_line(format!("[timer] clear id={}", task.id));
            }
        }

        Ok(())
    }

    fn schedule_timeout(&mut self, delay_ms: i64, action: TimerAction) -> i64 {
        self.schedule_task(delay_ms, None, action)
    }

    fn schedule_interval(&mut self, interval_ms: i64, action: TimerAction) -> i64 {
        self.schedule_task(interval_ms, Some(interval_ms.max(0)), action)
    }

    fn schedule_task(
        &mut self,
        delay_ms: i64,
        interval_ms: Option<i64>,
        action: TimerAction,
    ) -> i64 {
        let id = self.next_timer_id;
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        let due_at = self.now_ms.saturating_add(delay_ms.max(0));
        let interval_desc = interval_ms
            .map(|value| value.to_string())
            .unwrap_or_else(|| "none".into());
        self.task_queue.push(ScheduledTask {
            id,
            due_at,
            order,
            interval_ms,
            action,
        });
        self.trace_timer_line(format!(
            "[timer] schedule id={id} due_at={due_at} interval_ms={interval_desc}"
        ));
        id
    }

    // ─── Harness observers ───

    pub fn clipboard_text(&self) -> &str {
        self.clipboard.text()
    }

    pub fn clipboard_write_count(&self) -> usize {
        self.clipboard.write_count()
    }

    pub fn set_clipboard_failing(&mut self, failing: bool) {
        self.clipboard.set_failing(failing);
    }

    pub fn submission_count(&self) -> usize {
        self.submissions.len()
    }

    pub fn last_submission(&self) -> Option<&[(String, String)]> {
        self.submissions.last().map(Vec::as_slice)
    }

    pub fn is_submission_locked(&self) -> bool {
        self.submission_locked
    }

    pub fn countdown_remaining(&self) -> Option<u32> {
        self.countdown.map(|state| state.remaining)
    }

    pub fn has_text_selection(&self) -> bool {
        self.selection.is_some()
    }

    pub fn selection_range(&self, selector: &str) -> Result<(usize, usize)> {
        let target = self.select_one(selector)?;
        self.dom.selection_range(target)
    }

    // ─── Assertions ───

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.text_content(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.value(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.checked(target)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_class(&self, selector: &str, class_name: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.class_contains(target, class_name)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class {class_name} present={expected}"),
                actual: format!("class {class_name} present={actual}"),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        let _ = self.select_one(selector)?;
        Ok(())
    }

    pub fn assert_missing(&self, selector: &str) -> Result<()> {
        if let Some(target) = self.dom.query_selector(selector)? {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: "no match".into(),
                actual: "a matching element".into(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn assert_disabled(&self, selector: &str, expected: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        let actual = self.dom.disabled(target);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.node_snippet(target),
            });
        }
        Ok(())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.dom.dump_node(target))
    }

    fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    fn node_snippet(&self, node_id: NodeId) -> String {
        truncate_chars(&self.dom.dump_node(node_id), 200)
    }

    fn event_node_label(&self, node_id: NodeId) -> String {
        if let Some(id) = self.dom.attr(node_id, "id") {
            return format!("#{id}");
        }
        self.dom.tag_name(node_id).unwrap_or("document").to_string()
    }

    // ─── Tracing ───

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::PageRuntime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.trace_line(line);
        }
    }

    fn trace_timer_line(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.trace_line(line);
        }
    }

    fn trace_line(&mut self, line: String) {
        if self.trace {
            if self.trace_to_stderr {
                eprintln!("{line}");
            }
            if self.trace_logs.len() >= self.trace_log_limit {
                self.trace_logs.remove(0);
            }
            self.trace_logs.push(line);
        }
    }
}
