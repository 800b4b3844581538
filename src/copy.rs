//! Copy-to-clipboard buttons and alert auto-dismissal.

use crate::Page;
use crate::dom::{NodeId, Result};
use crate::TimerAction;

const COPY_SUCCESS_MARKUP: &str = r#"<i class="fas fa-check me-1"></i>Copied!"#;
const COPY_FALLBACK_MARKUP: &str = r#"<i class="fas fa-exclamation me-1"></i>Select All"#;

pub(crate) const COPY_LABEL_RESTORE_MS: i64 = 2000;
pub(crate) const ALERT_DISMISS_MS: i64 = 5000;

impl Page {
    /// Buttons without a resolvable `data-target` do nothing. On success the
    /// button reads "Copied!" for two seconds; when the clipboard rejects the
    /// write, the button offers "Select All" instead so the user can copy by
    /// hand. The page-level selection is always released afterwards.
    pub(crate) fn on_copy_click(&mut self, button: NodeId) -> Result<()> {
        let Some(target_id) = self.dom.attr(button, "data-target") else {
            return Ok(());
        };
        let Some(field) = self.dom.by_id(&target_id) else {
            return Ok(());
        };

        let text = self.dom.value(field)?;
        let length = text.chars().count();
        self.dom.set_selection_range(field, 0, length)?;
        self.selection = Some(field);

        let original_html = self.dom.inner_html(button)?;
        match self.clipboard.write_text(&text) {
            Ok(()) => {
                self.trace_event_line(format!(
                    "[event] copy ok target=#{target_id} chars={length}"
                ));
                self.dom.class_add(button, "copied")?;
                self.dom.set_inner_html(button, COPY_SUCCESS_MARKUP)?;
                self.schedule_timeout(
                    COPY_LABEL_RESTORE_MS,
                    TimerAction::RestoreCopyLabel {
                        button,
                        original_html,
                        copied: true,
                    },
                );
            }
            Err(err) => {
                self.trace_event_line(format!(
                    "[event] copy failed target=#{target_id}: {err}"
                ));
                self.dom.set_inner_html(button, COPY_FALLBACK_MARKUP)?;
                self.schedule_timeout(
                    COPY_LABEL_RESTORE_MS,
                    TimerAction::RestoreCopyLabel {
                        button,
                        original_html,
                        copied: false,
                    },
                );
            }
        }

        self.selection = None;
        Ok(())
    }

    pub(crate) fn restore_copy_label(
        &mut self,
        button: NodeId,
        original_html: &str,
        copied: bool,
    ) -> Result<()> {
        if !self.dom.is_connected(button) {
            return Ok(());
        }
        if copied {
            self.dom.class_remove(button, "copied")?;
        }
        self.dom.set_inner_html(button, original_html)
    }

    /// Dismissible alerts disappear after five seconds. Informational and
    /// sticky-warning alerts stay.
    pub(crate) fn schedule_alert_dismissals(&mut self) -> Result<()> {
        let alerts = self.dom.query_selector_all(".alert")?;
        for alert in alerts {
            let sticky = self.dom.class_contains(alert, "alert-info")?
                || self.dom.class_contains(alert, "sticky-warning")?;
            if !sticky {
                self.schedule_timeout(ALERT_DISMISS_MS, TimerAction::DismissAlert { alert });
            }
        }
        Ok(())
    }

    pub(crate) fn dismiss_alert(&mut self, alert: NodeId) -> Result<()> {
        if !self.dom.is_connected(alert) {
            return Ok(());
        }
        self.trace_event_line(format!(
            "[event] alert dismissed {}",
            self.event_node_label(alert)
        ));
        self.dom.remove_node(alert)
    }
}
