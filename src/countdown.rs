//! Download-expiry countdown: a 15-minute clock injected under the download
//! section, ticking once per virtual second and reloading the page at zero.

use std::collections::HashMap;

use crate::dom::Result;
use crate::{CountdownState, Page, TimerAction};

pub(crate) const DOWNLOAD_EXPIRY_SECS: u32 = 15 * 60;
pub(crate) const COUNTDOWN_TICK_MS: i64 = 1000;

const COUNTDOWN_MARKUP: &str = concat!(
    r#"<small><i class="fas fa-clock me-1"></i>"#,
    r#"Download links expire in <span id="countdown">15:00</span></small>"#,
);

pub(crate) fn format_countdown(remaining_secs: u32) -> String {
    format!("{}:{:02}", remaining_secs / 60, remaining_secs % 60)
}

impl Page {
    /// No-op when the page has no download section, so the countdown only
    /// runs on the post-generation rendering of the page.
    pub(crate) fn start_countdown(&mut self) -> Result<()> {
        let Some(section) = self.dom.query_selector(".download-section")? else {
            return Ok(());
        };

        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), "text-muted text-center mt-2".to_string());
        let wrapper = self.dom.create_element(section, "div".to_string(), attrs);
        self.dom.set_inner_html(wrapper, COUNTDOWN_MARKUP)?;

        let timer_id = self.schedule_interval(COUNTDOWN_TICK_MS, TimerAction::CountdownTick);
        self.countdown = Some(CountdownState {
            remaining: DOWNLOAD_EXPIRY_SECS,
            timer_id,
        });
        self.trace_timer_line(format!(
            "[timer] countdown started id={timer_id} remaining_secs={DOWNLOAD_EXPIRY_SECS}"
        ));
        Ok(())
    }

    /// Each tick renders the current remaining time, then decrements. The
    /// zero tick renders "0:00" and triggers a reload instead of counting
    /// further.
    pub(crate) fn countdown_tick(&mut self) -> Result<bool> {
        let Some(state) = self.countdown else {
            return Ok(false);
        };

        if let Some(display) = self.dom.by_id("countdown") {
            self.dom
                .set_text_content(display, &format_countdown(state.remaining))?;
        }

        if state.remaining == 0 {
            self.trace_timer_line(format!(
                "[timer] countdown expired id={} now_ms={}",
                state.timer_id, self.now_ms
            ));
            self.countdown = None;
            self.reload_now()?;
            return Ok(false);
        }

        if let Some(state) = self.countdown.as_mut() {
            state.remaining -= 1;
        }
        Ok(true)
    }
}
