//! The stack of open elements, element scopes, and the list of active
//! formatting elements.

use wren_dom::{ElementData, Namespace, NodeId};

use super::core::{ActiveFormattingElement, HTMLParser, InsertionMode};
use super::foreign_content::mathml;
use crate::stream::CharSource;
use crate::tokenizer::Token;

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
///
/// Which element types stop a "has an element in scope" search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Scope {
    Default,
    ListItem,
    Button,
    Table,
    Select,
}

/// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#special)
///
/// HTML elements in the "special" category.
const SPECIAL_HTML_ELEMENTS: &[&str] = &[
    "address", "applet", "area", "article", "aside", "base", "basefont", "bgsound",
    "blockquote", "body", "br", "button", "caption", "center", "col", "colgroup", "dd",
    "details", "dir", "div", "dl", "dt", "embed", "fieldset", "figcaption", "figure",
    "footer", "form", "frame", "frameset", "h1", "h2", "h3", "h4", "h5", "h6", "head",
    "header", "hgroup", "hr", "html", "iframe", "img", "input", "keygen", "li", "link",
    "listing", "main", "marquee", "menu", "meta", "nav", "noembed", "noframes", "noscript",
    "object", "ol", "p", "param", "plaintext", "pre", "script", "search", "section",
    "select", "source", "style", "summary", "table", "tbody", "td", "template", "textarea",
    "tfoot", "th", "thead", "title", "tr", "track", "ul", "wbr", "xmp",
];

/// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
const IMPLIED_END_TAGS: &[&str] = &[
    "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt", "rtc",
];

/// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
const IMPLIED_END_TAGS_THOROUGHLY: &[&str] = &[
    "caption", "colgroup", "dd", "dt", "li", "optgroup", "option", "p", "rb", "rp", "rt",
    "rtc", "tbody", "td", "tfoot", "th", "thead", "tr",
];

/// Whether two elements have the same tag name, namespace and attributes,
/// ignoring attribute order.
fn same_element(a: &ElementData, b: &ElementData) -> bool {
    a.local_name == b.local_name
        && a.namespace == b.namespace
        && a.attrs.len() == b.attrs.len()
        && a.attrs.iter().all(|attr| {
            b.attrs.iter().any(|other| {
                other.name == attr.name
                    && other.namespace == attr.namespace
                    && other.value == attr.value
            })
        })
}

// =============================================================================
// Element tests
// =============================================================================

impl<S: CharSource> HTMLParser<S> {
    pub(super) fn current_node(&self) -> Option<NodeId> {
        self.stack_of_open_elements.last().copied()
    }

    pub(super) fn is_in_namespace(&self, node: NodeId, namespace: Namespace) -> bool {
        self.tree
            .as_element(node)
            .is_some_and(|element| element.namespace == namespace)
    }

    pub(super) fn is_html_element_named(&self, node: NodeId, name: &str) -> bool {
        self.tree
            .as_element(node)
            .is_some_and(|element| element.is_html(name))
    }

    pub(super) fn is_html_element_in(&self, node: NodeId, names: &[&str]) -> bool {
        self.tree.as_element(node).is_some_and(|element| {
            element.namespace == Namespace::Html && names.contains(&element.local_name.as_str())
        })
    }

    /// Local name of `node` when it is an HTML element.
    pub(super) fn html_local_name(&self, node: NodeId) -> Option<&str> {
        self.tree
            .as_element(node)
            .filter(|element| element.namespace == Namespace::Html)
            .map(|element| element.local_name.as_str())
    }

    pub(super) fn current_node_is(&self, name: &str) -> bool {
        self.current_node()
            .is_some_and(|node| self.is_html_element_named(node, name))
    }

    pub(super) fn current_node_is_one_of(&self, names: &[&str]) -> bool {
        self.current_node()
            .is_some_and(|node| self.is_html_element_in(node, names))
    }

    pub(super) fn stack_has(&self, name: &str) -> bool {
        self.stack_of_open_elements
            .iter()
            .any(|&node| self.is_html_element_named(node, name))
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#special)
    pub(super) fn is_special_element(&self, node: NodeId) -> bool {
        let Some(element) = self.tree.as_element(node) else {
            return false;
        };
        let name = element.local_name.as_str();
        match element.namespace {
            Namespace::Html => SPECIAL_HTML_ELEMENTS.contains(&name),
            Namespace::MathMl => {
                mathml::is_text_integration_point(name) || name == "annotation-xml"
            }
            Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
            _ => false,
        }
    }

    /// [§ 13.2.6](https://html.spec.whatwg.org/multipage/parsing.html#html-integration-point)
    pub(super) fn is_html_integration_point(&self, node: NodeId) -> bool {
        let Some(element) = self.tree.as_element(node) else {
            return false;
        };
        match element.namespace {
            Namespace::MathMl => {
                element.local_name == "annotation-xml"
                    && element.attr("encoding").is_some_and(|encoding| {
                        encoding.eq_ignore_ascii_case("text/html")
                            || encoding.eq_ignore_ascii_case("application/xhtml+xml")
                    })
            }
            Namespace::Svg => {
                matches!(element.local_name.as_str(), "foreignObject" | "desc" | "title")
            }
            _ => false,
        }
    }

    fn is_scope_boundary(&self, node: NodeId, scope: Scope) -> bool {
        let Some(element) = self.tree.as_element(node) else {
            return false;
        };
        let name = element.local_name.as_str();
        let html = element.namespace == Namespace::Html;
        match scope {
            // "has an element in select scope ... consisting of all element
            // types except the following: optgroup, option"
            Scope::Select => !(html && matches!(name, "optgroup" | "option")),
            Scope::Table => html && matches!(name, "html" | "table" | "template"),
            Scope::Default | Scope::ListItem | Scope::Button => {
                let default = match element.namespace {
                    Namespace::Html => matches!(
                        name,
                        "applet"
                            | "caption"
                            | "html"
                            | "table"
                            | "td"
                            | "th"
                            | "marquee"
                            | "object"
                            | "template"
                    ),
                    Namespace::MathMl => {
                        mathml::is_text_integration_point(name) || name == "annotation-xml"
                    }
                    Namespace::Svg => matches!(name, "foreignObject" | "desc" | "title"),
                    _ => false,
                };
                default
                    || (scope == Scope::ListItem && html && matches!(name, "ol" | "ul"))
                    || (scope == Scope::Button && html && name == "button")
            }
        }
    }

    /// [§ 13.2.4.2](https://html.spec.whatwg.org/multipage/parsing.html#has-an-element-in-the-specific-scope)
    ///
    /// Walk down from the current node until `target` matches (true) or a
    /// boundary element for `scope` is reached (false).
    pub(super) fn has_in_scope(&self, scope: Scope, target: impl Fn(NodeId) -> bool) -> bool {
        for &node in self.stack_of_open_elements.iter().rev() {
            if target(node) {
                return true;
            }
            if self.is_scope_boundary(node, scope) {
                return false;
            }
        }
        false
    }

    pub(super) fn has_element_in_scope(&self, name: &str) -> bool {
        self.has_in_scope(Scope::Default, |node| self.is_html_element_named(node, name))
    }

    pub(super) fn has_element_in_list_item_scope(&self, name: &str) -> bool {
        self.has_in_scope(Scope::ListItem, |node| self.is_html_element_named(node, name))
    }

    pub(super) fn has_element_in_button_scope(&self, name: &str) -> bool {
        self.has_in_scope(Scope::Button, |node| self.is_html_element_named(node, name))
    }

    pub(super) fn has_element_in_table_scope(&self, name: &str) -> bool {
        self.has_in_scope(Scope::Table, |node| self.is_html_element_named(node, name))
    }

    pub(super) fn has_element_in_select_scope(&self, name: &str) -> bool {
        self.has_in_scope(Scope::Select, |node| self.is_html_element_named(node, name))
    }

    pub(super) fn has_any_in_scope(&self, scope: Scope, names: &[&str]) -> bool {
        self.has_in_scope(scope, |node| self.is_html_element_in(node, names))
    }

    pub(super) fn has_node_in_scope(&self, target: NodeId) -> bool {
        self.has_in_scope(Scope::Default, |node| node == target)
    }
}

// =============================================================================
// Popping
// =============================================================================

impl<S: CharSource> HTMLParser<S> {
    pub(super) fn pop_current_node(&mut self) -> Option<NodeId> {
        self.stack_of_open_elements.pop()
    }

    /// "Pop elements from the stack of open elements until an HTML element
    /// with the same tag name as the token has been popped from the stack."
    pub(super) fn pop_until_tag(&mut self, name: &str) {
        self.pop_until_one_of(&[name]);
    }

    pub(super) fn pop_until_one_of(&mut self, names: &[&str]) {
        while let Some(node) = self.pop_current_node() {
            if self.is_html_element_in(node, names) {
                break;
            }
        }
    }

    /// Pop until `target` itself has been popped.
    pub(super) fn pop_until_node(&mut self, target: NodeId) {
        while let Some(node) = self.pop_current_node() {
            if node == target {
                break;
            }
        }
    }

    /// Pop while the current node is not one of `names` (or `html`). Used by
    /// the "clear the stack back to a ... context" steps of the table modes.
    pub(super) fn clear_stack_back_to(&mut self, names: &[&str]) {
        while let Some(node) = self.current_node() {
            if self.is_html_element_in(node, names) || self.is_html_element_named(node, "html") {
                break;
            }
            let _ = self.pop_current_node();
        }
    }

    /// [§ 13.2.6.3 Closing elements that have implied end tags](https://html.spec.whatwg.org/multipage/parsing.html#generate-implied-end-tags)
    ///
    /// "while the current node is a dd element, a dt element, an li element,
    /// an optgroup element, an option element, a p element, an rb element, an
    /// rp element, an rt element, or an rtc element, the UA must pop the
    /// current node off the stack of open elements." `except` is left alone.
    pub(super) fn generate_implied_end_tags(&mut self, except: Option<&str>) {
        while let Some(node) = self.current_node() {
            let Some(name) = self.html_local_name(node) else {
                break;
            };
            if !IMPLIED_END_TAGS.contains(&name) || Some(name) == except {
                break;
            }
            let _ = self.pop_current_node();
        }
    }

    /// [§ 13.2.6.3](https://html.spec.whatwg.org/multipage/parsing.html#generate-all-implied-end-tags-thoroughly)
    pub(super) fn generate_all_implied_end_tags_thoroughly(&mut self) {
        while self.current_node_is_one_of(IMPLIED_END_TAGS_THOROUGHLY) {
            let _ = self.pop_current_node();
        }
    }

    /// Close an element whose end tag was seen and is in scope: generate
    /// implied end tags, complain if the current node is something else,
    /// then pop through it.
    pub(super) fn close_element(&mut self, name: &str) {
        self.generate_implied_end_tags(None);
        if !self.current_node_is(name) {
            self.parse_error(&format!("end tag </{name}> closes other open elements"));
        }
        self.pop_until_tag(name);
    }

    /// [§ 13.2.6.4.7](https://html.spec.whatwg.org/multipage/parsing.html#close-a-p-element)
    ///
    /// "Generate implied end tags, except for p elements. If the current node
    /// is not a p element, then this is a parse error. Pop elements from the
    /// stack of open elements until a p element has been popped from the
    /// stack."
    pub(super) fn close_p_element(&mut self) {
        self.generate_implied_end_tags(Some("p"));
        if !self.current_node_is("p") {
            self.parse_error("unexpected open elements while closing <p>");
        }
        self.pop_until_tag("p");
    }

    /// Close a `p` element if one is in button scope.
    pub(super) fn close_p_if_in_button_scope(&mut self) {
        if self.has_element_in_button_scope("p") {
            self.close_p_element();
        }
    }
}

// =============================================================================
// Active formatting elements
// =============================================================================

impl<S: CharSource> HTMLParser<S> {
    pub(super) fn active_formatting_position(&self, node: NodeId) -> Option<usize> {
        self.active_formatting_elements.iter().position(|entry| {
            matches!(entry, ActiveFormattingElement::Element { node_id, .. } if *node_id == node)
        })
    }

    pub(super) fn remove_from_active_formatting(&mut self, node: NodeId) {
        if let Some(index) = self.active_formatting_position(node) {
            let _ = self.active_formatting_elements.remove(index);
        }
    }

    /// The last element named `name` after the last marker.
    pub(super) fn active_formatting_element_named(&self, name: &str) -> Option<NodeId> {
        for entry in self.active_formatting_elements.iter().rev() {
            match entry {
                ActiveFormattingElement::Marker => return None,
                ActiveFormattingElement::Element { node_id, .. }
                    if self.is_html_element_named(*node_id, name) =>
                {
                    return Some(*node_id);
                }
                ActiveFormattingElement::Element { .. } => {}
            }
        }
        None
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#push-onto-the-list-of-active-formatting-elements)
    ///
    /// "If there are already three elements in the list of active formatting
    /// elements after the last marker, if any, or anywhere in the list if
    /// there are no markers, that have the same tag name, namespace, and
    /// attributes as element, then remove the earliest such element from the
    /// list of active formatting elements."
    pub(super) fn push_active_formatting_element(&mut self, node: NodeId, token: &Token) {
        if let Some(element) = self.tree.as_element(node) {
            let mut matching = Vec::new();
            for (index, entry) in self.active_formatting_elements.iter().enumerate().rev() {
                match entry {
                    ActiveFormattingElement::Marker => break,
                    ActiveFormattingElement::Element { node_id, .. } => {
                        if self
                            .tree
                            .as_element(*node_id)
                            .is_some_and(|other| same_element(element, other))
                        {
                            matching.push(index);
                        }
                    }
                }
            }
            if matching.len() >= 3
                && let Some(&earliest) = matching.last()
            {
                let _ = self.active_formatting_elements.remove(earliest);
            }
        }

        self.active_formatting_elements
            .push(ActiveFormattingElement::Element {
                node_id: node,
                token: token.clone(),
            });
    }

    pub(super) fn push_active_formatting_marker(&mut self) {
        self.active_formatting_elements
            .push(ActiveFormattingElement::Marker);
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#clear-the-list-of-active-formatting-elements-up-to-the-last-marker)
    pub(super) fn clear_active_formatting_elements_to_last_marker(&mut self) {
        while let Some(entry) = self.active_formatting_elements.pop() {
            if matches!(entry, ActiveFormattingElement::Marker) {
                break;
            }
        }
    }

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#reconstruct-the-active-formatting-elements)
    ///
    /// Reopen formatting elements that were implicitly closed, e.g. `<b>` in
    /// `<p><b>x<p>y`.
    pub(super) fn reconstruct_active_formatting_elements(&mut self) {
        let is_open_or_marker = |parser: &Self, entry: &ActiveFormattingElement| match entry {
            ActiveFormattingElement::Marker => true,
            ActiveFormattingElement::Element { node_id, .. } => {
                parser.stack_of_open_elements.contains(node_id)
            }
        };

        // "If there are no entries in the list of active formatting elements,
        // then there is nothing to reconstruct; stop this algorithm."
        // "If the last (most recently added) entry in the list of active
        // formatting elements is a marker, or if it is an element that is in
        // the stack of open elements, then there is nothing to reconstruct"
        let Some(last) = self.active_formatting_elements.last() else {
            return;
        };
        if is_open_or_marker(self, last) {
            return;
        }

        // Rewind: walk back to just after the last entry that is a marker or
        // still open.
        let mut index = self.active_formatting_elements.len() - 1;
        while index > 0 {
            if is_open_or_marker(self, &self.active_formatting_elements[index - 1]) {
                break;
            }
            index -= 1;
        }

        // Advance and create.
        for position in index..self.active_formatting_elements.len() {
            let ActiveFormattingElement::Element { token, .. } =
                &self.active_formatting_elements[position]
            else {
                continue;
            };
            let token = token.clone();
            let node_id = self.insert_html_element(&token);
            self.active_formatting_elements[position] =
                ActiveFormattingElement::Element { node_id, token };
        }
    }
}

// =============================================================================
// Resetting the insertion mode
// =============================================================================

impl<S: CharSource> HTMLParser<S> {
    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#reset-the-insertion-mode-appropriately)
    pub(super) fn reset_insertion_mode_appropriately(&mut self) {
        for index in (0..self.stack_of_open_elements.len()).rev() {
            let last = index == 0;
            let node = match self.context_element {
                Some(context) if last => context,
                _ => self.stack_of_open_elements[index],
            };

            let mode = match self.html_local_name(node) {
                Some("select") => Some(self.select_mode_for(index, last)),
                Some("td" | "th") if !last => Some(InsertionMode::InCell),
                Some("tr") => Some(InsertionMode::InRow),
                Some("tbody" | "thead" | "tfoot") => Some(InsertionMode::InTableBody),
                Some("caption") => Some(InsertionMode::InCaption),
                Some("colgroup") => Some(InsertionMode::InColumnGroup),
                Some("table") => Some(InsertionMode::InTable),
                Some("template") => self.template_insertion_modes.last().copied(),
                Some("head") if !last => Some(InsertionMode::InHead),
                Some("body") => Some(InsertionMode::InBody),
                Some("frameset") => Some(InsertionMode::InFrameset),
                Some("html") => Some(if self.head_element_pointer.is_none() {
                    InsertionMode::BeforeHead
                } else {
                    InsertionMode::AfterHead
                }),
                _ => None,
            };

            if let Some(mode) = mode {
                self.insertion_mode = mode;
                return;
            }
            if last {
                self.insertion_mode = InsertionMode::InBody;
                return;
            }
        }
        self.insertion_mode = InsertionMode::InBody;
    }

    /// "If node is a select element": in select in table if a table is open
    /// below it, without a template in between.
    fn select_mode_for(&self, index: usize, last: bool) -> InsertionMode {
        if !last {
            for &ancestor in self.stack_of_open_elements[..index].iter().rev() {
                if self.is_html_element_named(ancestor, "template") {
                    break;
                }
                if self.is_html_element_named(ancestor, "table") {
                    return InsertionMode::InSelectInTable;
                }
            }
        }
        InsertionMode::InSelect
    }

    /// Pop a `template` and everything above it, then restore the mode. The
    /// shared tail of the `</template>` end tag and end of file in a
    /// template.
    pub(super) fn close_template(&mut self) {
        self.generate_all_implied_end_tags_thoroughly();
        if !self.current_node_is("template") {
            self.parse_error("unexpected open elements while closing <template>");
        }
        self.pop_until_tag("template");
        self.clear_active_formatting_elements_to_last_marker();
        let _ = self.template_insertion_modes.pop();
        self.reset_insertion_mode_appropriately();
    }

    /// Remove `node` from the stack wherever it is.
    pub(super) fn remove_open_element(&mut self, target: NodeId) {
        self.stack_of_open_elements.retain(|&node| node != target);
    }
}
