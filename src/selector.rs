use crate::dom::{Dom, Element, Error, NodeId, Result, has_class};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AttrCondition {
    Exists { key: String },
    Eq { key: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct SelectorStep {
    pub(crate) tag: Option<String>,
    pub(crate) universal: bool,
    pub(crate) id: Option<String>,
    pub(crate) classes: Vec<String>,
    pub(crate) attrs: Vec<AttrCondition>,
}

impl SelectorStep {
    fn is_empty(&self) -> bool {
        !self.universal
            && self.tag.is_none()
            && self.id.is_none()
            && self.classes.is_empty()
            && self.attrs.is_empty()
    }
}

/// Descendant-combined selector chain; the last step is the subject.
pub(crate) fn parse_selector_chain(selector: &str) -> Result<Vec<SelectorStep>> {
    let trimmed = selector.trim();
    if trimmed.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }

    let mut steps = Vec::new();
    for token in trimmed.split_whitespace() {
        let step = parse_selector_step(token)
            .ok_or_else(|| Error::UnsupportedSelector(selector.into()))?;
        steps.push(step);
    }

    if steps.is_empty() {
        return Err(Error::UnsupportedSelector(selector.into()));
    }
    Ok(steps)
}

fn parse_selector_step(token: &str) -> Option<SelectorStep> {
    let mut step = SelectorStep::default();
    let bytes = token.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        match bytes[i] {
            b'*' => {
                step.universal = true;
                i += 1;
            }
            b'#' => {
                i += 1;
                let start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                if i == start {
                    return None;
                }
                step.id = Some(token[start..i].to_string());
            }
            b'.' => {
                i += 1;
                let start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                if i == start {
                    return None;
                }
                step.classes.push(token[start..i].to_string());
            }
            b'[' => {
                let close = token[i..].find(']')? + i;
                let body = &token[i + 1..close];
                let condition = if let Some((key, raw_value)) = body.split_once('=') {
                    let value = raw_value
                        .strip_prefix('"')
                        .and_then(|v| v.strip_suffix('"'))
                        .or_else(|| {
                            raw_value
                                .strip_prefix('\'')
                                .and_then(|v| v.strip_suffix('\''))
                        })
                        .unwrap_or(raw_value);
                    AttrCondition::Eq {
                        key: key.trim().to_ascii_lowercase(),
                        value: value.to_string(),
                    }
                } else {
                    AttrCondition::Exists {
                        key: body.trim().to_ascii_lowercase(),
                    }
                };
                step.attrs.push(condition);
                i = close + 1;
            }
            b if is_ident_char(b) && step.is_empty() => {
                let start = i;
                while i < bytes.len() && is_ident_char(bytes[i]) {
                    i += 1;
                }
                step.tag = Some(token[start..i].to_ascii_lowercase());
            }
            _ => return None,
        }
    }

    if step.is_empty() { None } else { Some(step) }
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

fn step_matches(element: &Element, step: &SelectorStep) -> bool {
    if let Some(tag) = &step.tag {
        if !element.tag_name.eq_ignore_ascii_case(tag) {
            return false;
        }
    }
    if let Some(id) = &step.id {
        if element.attrs.get("id") != Some(id) {
            return false;
        }
    }
    for class in &step.classes {
        if !has_class(element, class) {
            return false;
        }
    }
    for condition in &step.attrs {
        match condition {
            AttrCondition::Exists { key } => {
                if !element.attrs.contains_key(key) {
                    return false;
                }
            }
            AttrCondition::Eq { key, value } => {
                if element.attrs.get(key) != Some(value) {
                    return false;
                }
            }
        }
    }
    true
}

impl Dom {
    pub(crate) fn matches_chain(&self, node_id: NodeId, steps: &[SelectorStep]) -> bool {
        let Some(element) = self.element(node_id) else {
            return false;
        };
        let Some((subject, ancestors)) = steps.split_last() else {
            return false;
        };
        if !step_matches(element, subject) {
            return false;
        }

        // Each remaining step must match some strictly higher ancestor, in order.
        let mut cursor = self.parent(node_id);
        for step in ancestors.iter().rev() {
            let mut matched = false;
            while let Some(current) = cursor {
                cursor = self.parent(current);
                if let Some(candidate) = self.element(current) {
                    if step_matches(candidate, step) {
                        matched = true;
                        break;
                    }
                }
            }
            if !matched {
                return false;
            }
        }
        true
    }

    pub(crate) fn query_selector(&self, selector: &str) -> Result<Option<NodeId>> {
        Ok(self.query_selector_all(selector)?.into_iter().next())
    }

    pub(crate) fn query_selector_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        self.query_selector_all_from(self.root, selector)
    }

    pub(crate) fn query_selector_from(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Option<NodeId>> {
        Ok(self
            .query_selector_all_from(scope, selector)?
            .into_iter()
            .next())
    }

    pub(crate) fn query_selector_all_from(
        &self,
        scope: NodeId,
        selector: &str,
    ) -> Result<Vec<NodeId>> {
        let steps = parse_selector_chain(selector)?;

        let mut out = Vec::new();
        let mut stack = self.nodes[scope.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect::<Vec<_>>();
        while let Some(node) = stack.pop() {
            if self.matches_chain(node, &steps) {
                out.push(node);
            }
            for child in self.nodes[node.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        Ok(out)
    }
}
