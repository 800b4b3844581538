//! Form enhancement behavior: inline validation feedback, input cleanup,
//! and the submission gate with its one-shot loading latch.

use std::collections::HashMap;

use crate::Page;
use crate::dom::{NodeId, Result};
use crate::validate::{
    FieldState, MSG_AGREEMENT_REQUIRED, format_domain_input, validate_domain_list, validate_email,
};

/// Elements the enhancement script looks up once at startup. The wiring only
/// activates when both the form and its submit button are present; the two
/// field handles may be absent individually, in which case the behaviors
/// that need them stay inert.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FormBindings {
    pub(crate) form: NodeId,
    pub(crate) generate_btn: NodeId,
    pub(crate) domains: Option<NodeId>,
    pub(crate) email: Option<NodeId>,
}

impl Page {
    pub(crate) fn resolve_form_bindings(&self) -> Option<FormBindings> {
        let form = self.dom.by_id("sslForm")?;
        let generate_btn = self.dom.by_id("generateBtn")?;
        Some(FormBindings {
            form,
            generate_btn,
            domains: self.dom.by_id("domains"),
            email: self.dom.by_id("email"),
        })
    }

    pub(crate) fn on_input(&mut self, target: NodeId) -> Result<()> {
        let Some(bindings) = self.bindings else {
            return Ok(());
        };

        if bindings.domains == Some(target) {
            self.clear_marks(target)?;
            let value = self.dom.value(target)?;
            let formatted = format_domain_input(&value);
            if formatted != value {
                self.dom.set_value(target, &formatted)?;
            }
        } else if bindings.email == Some(target) {
            self.clear_marks(target)?;
        }

        Ok(())
    }

    pub(crate) fn on_blur(&mut self, target: NodeId) -> Result<()> {
        let Some(bindings) = self.bindings else {
            return Ok(());
        };

        if bindings.domains == Some(target) {
            self.validate_domains_field()?;
        } else if bindings.email == Some(target) {
            self.validate_email_field()?;
        }

        Ok(())
    }

    pub(crate) fn on_submit(&mut self, form: NodeId) -> Result<()> {
        let Some(bindings) = self.bindings else {
            return Ok(());
        };
        if bindings.form != form {
            return Ok(());
        }
        if self.submission_locked {
            self.trace_event_line("[event] submit discarded: submission in flight".to_string());
            return Ok(());
        }

        // All checks run so every failing field gets annotated in one pass.
        let domains_ok = self.validate_domains_field()?;
        let email_ok = self.validate_email_field()?;
        let agreement_ok = self.check_agreement()?;
        if !(domains_ok && email_ok && agreement_ok) {
            self.trace_event_line(format!(
                "[event] submit blocked domains_ok={domains_ok} email_ok={email_ok} agreement_ok={agreement_ok}"
            ));
            return Ok(());
        }

        let entries = self.form_data_entries(form)?;
        self.submissions.push(entries);
        self.submission_locked = true;
        self.show_loading_state()?;
        self.trace_event_line("[event] submit accepted".to_string());
        Ok(())
    }

    pub(crate) fn validate_domains_field(&mut self) -> Result<bool> {
        let Some(bindings) = self.bindings else {
            return Ok(true);
        };
        let Some(field) = bindings.domains else {
            return Ok(true);
        };
        let raw = self.dom.value(field)?;
        let state = validate_domain_list(&raw);
        let ok = state.is_valid();
        self.apply_field_state(field, &state)?;
        Ok(ok)
    }

    pub(crate) fn validate_email_field(&mut self) -> Result<bool> {
        let Some(bindings) = self.bindings else {
            return Ok(true);
        };
        let Some(field) = bindings.email else {
            return Ok(true);
        };
        let raw = self.dom.value(field)?;
        let state = validate_email(&raw);
        let ok = state.is_valid();
        self.apply_field_state(field, &state)?;
        Ok(ok)
    }

    fn check_agreement(&mut self) -> Result<bool> {
        let Some(checkbox) = self.dom.by_id("accept_agreement") else {
            return Ok(false);
        };
        if self.dom.checked(checkbox)? {
            return Ok(true);
        }
        self.mark_invalid(checkbox, MSG_AGREEMENT_REQUIRED)?;
        Ok(false)
    }

    fn apply_field_state(&mut self, field: NodeId, state: &FieldState) -> Result<()> {
        match state {
            FieldState::Untouched => self.clear_marks(field),
            FieldState::Valid(message) => self.mark_valid(field, message),
            FieldState::Invalid(message) => self.mark_invalid(field, message),
        }
    }

    pub(crate) fn mark_valid(&mut self, field: NodeId, message: &str) -> Result<()> {
        self.dom.class_remove(field, "is-invalid")?;
        self.dom.class_add(field, "is-valid")?;
        self.remove_feedback_nodes(field)?;
        self.append_feedback_node(field, "valid-feedback", message);
        Ok(())
    }

    pub(crate) fn mark_invalid(&mut self, field: NodeId, message: &str) -> Result<()> {
        self.dom.class_remove(field, "is-valid")?;
        self.dom.class_add(field, "is-invalid")?;
        self.remove_feedback_nodes(field)?;
        self.append_feedback_node(field, "invalid-feedback", message);
        Ok(())
    }

    pub(crate) fn clear_marks(&mut self, field: NodeId) -> Result<()> {
        self.dom.class_remove(field, "is-valid")?;
        self.dom.class_remove(field, "is-invalid")?;
        self.remove_feedback_nodes(field)
    }

    fn remove_feedback_nodes(&mut self, field: NodeId) -> Result<()> {
        let Some(container) = self.dom.parent(field) else {
            return Ok(());
        };
        let mut stale = self.dom.query_selector_all_from(container, ".valid-feedback")?;
        stale.extend(self.dom.query_selector_all_from(container, ".invalid-feedback")?);
        for node in stale {
            self.dom.remove_node(node)?;
        }
        Ok(())
    }

    fn append_feedback_node(&mut self, field: NodeId, class_name: &str, message: &str) {
        let container = self.dom.parent(field).unwrap_or(self.dom.root);
        let mut attrs = HashMap::new();
        attrs.insert("class".to_string(), class_name.to_string());
        let feedback = self.dom.create_element(container, "div".to_string(), attrs);
        self.dom.create_text(feedback, message.to_string());
    }

    fn show_loading_state(&mut self) -> Result<()> {
        let Some(bindings) = self.bindings else {
            return Ok(());
        };
        let button = bindings.generate_btn;
        self.dom.set_disabled(button, true)?;
        if let Some(label) = self.dom.query_selector_from(button, ".btn-text")? {
            self.dom.class_add(label, "d-none")?;
        }
        if let Some(spinner) = self.dom.query_selector_from(button, ".btn-loading")? {
            self.dom.class_remove(spinner, "d-none")?;
        }
        Ok(())
    }

    /// A button defaults to submit; only explicit `type` values other than
    /// submit/image opt an input out.
    pub(crate) fn is_submit_control(&self, node_id: NodeId) -> bool {
        let Some(element) = self.dom.element(node_id) else {
            return false;
        };
        let control_type = element
            .attrs
            .get("type")
            .map(|value| value.trim().to_ascii_lowercase());
        match element.tag_name.to_ascii_lowercase().as_str() {
            "button" => matches!(control_type.as_deref(), None | Some("") | Some("submit")),
            "input" => matches!(control_type.as_deref(), Some("submit") | Some("image")),
            _ => false,
        }
    }

    pub(crate) fn resolve_form_for_submit(&self, node_id: NodeId) -> Option<NodeId> {
        self.dom.find_ancestor_by_tag(node_id, "form")
    }

    fn form_data_entries(&self, form: NodeId) -> Result<Vec<(String, String)>> {
        let mut entries = Vec::new();
        for control in self.collect_form_controls(form) {
            let Some(element) = self.dom.element(control) else {
                continue;
            };
            let Some(name) = element.attrs.get("name").cloned() else {
                continue;
            };
            if name.is_empty() || element.disabled {
                continue;
            }
            let tag = element.tag_name.to_ascii_lowercase();
            let control_type = element
                .attrs
                .get("type")
                .map(|value| value.trim().to_ascii_lowercase())
                .unwrap_or_default();
            let successful = match tag.as_str() {
                "input" => match control_type.as_str() {
                    "submit" | "reset" | "button" | "file" | "image" => false,
                    "checkbox" | "radio" => element.checked,
                    _ => true,
                },
                "textarea" | "select" => true,
                _ => false,
            };
            if successful {
                entries.push((name, self.dom.value(control)?));
            }
        }
        Ok(entries)
    }

    fn collect_form_controls(&self, form: NodeId) -> Vec<NodeId> {
        let mut controls = Vec::new();
        let mut stack = self.dom.children(form).to_vec();
        stack.reverse();
        while let Some(node) = stack.pop() {
            if let Some(tag) = self.dom.tag_name(node) {
                if matches!(
                    tag.to_ascii_lowercase().as_str(),
                    "input" | "textarea" | "select" | "button"
                ) {
                    controls.push(node);
                }
            }
            let mut children = self.dom.children(node).to_vec();
            children.reverse();
            stack.extend(children);
        }
        controls
    }
}
