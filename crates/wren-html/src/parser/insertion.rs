//! [§ 13.2.6.1 Creating and inserting nodes](https://html.spec.whatwg.org/multipage/parsing.html#creating-and-inserting-nodes)

use wren_dom::{DomError, ElementData, Namespace, NodeId, NodeType};

use super::core::{HTMLParser, InsertionMode};
use crate::stream::CharSource;
use crate::tokenizer::{Token, TokenizerState};

/// "The adjusted insertion location": a parent and the child to insert
/// before, or `None` to append.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct InsertionPoint {
    pub(super) parent: NodeId,
    pub(super) before: Option<NodeId>,
}

impl InsertionPoint {
    pub(super) const fn append_to(parent: NodeId) -> Self {
        Self {
            parent,
            before: None,
        }
    }
}

impl<S: CharSource> HTMLParser<S> {
    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#appropriate-place-for-inserting-a-node)
    ///
    /// "The appropriate place for inserting a node, optionally using a
    /// particular override target"
    pub(super) fn appropriate_place_for_inserting(
        &self,
        override_target: Option<NodeId>,
    ) -> InsertionPoint {
        // "If there was an override target specified, then let target be the
        // override target. Otherwise, let target be the current node."
        let target = override_target
            .or_else(|| self.current_node())
            .unwrap_or(NodeId::ROOT);

        let point = if self.foster_parenting
            && self.is_html_element_in(target, &["table", "tbody", "tfoot", "thead", "tr"])
        {
            self.foster_parent_location()
        } else {
            InsertionPoint::append_to(target)
        };

        // "If the adjusted insertion location is inside a template element,
        // let it instead be inside the template element's template contents,
        // after its last child (if any)."
        match self.template_contents(point.parent) {
            Some(contents) => InsertionPoint::append_to(contents),
            None => point,
        }
    }

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    ///
    /// Where foster-parented content goes: just before the last table on the
    /// stack, unless a template sits above that table.
    fn foster_parent_location(&self) -> InsertionPoint {
        let stack = &self.stack_of_open_elements;
        let last_template = stack
            .iter()
            .rposition(|&node| self.is_html_element_named(node, "template"));
        let last_table = stack
            .iter()
            .rposition(|&node| self.is_html_element_named(node, "table"));

        // "If there is a last template and either there is no last table, or
        // there is one, but last template is lower (more recently added) than
        // last table in the stack of open elements, then: let adjusted
        // insertion location be inside last template's template contents"
        if let Some(template_index) = last_template
            && last_table.is_none_or(|table_index| template_index > table_index)
        {
            return InsertionPoint::append_to(stack[template_index]);
        }

        // "If there is no last table, then let adjusted insertion location be
        // inside the first element in the stack of open elements (the html
        // element), after its last child (if any)"
        let Some(table_index) = last_table else {
            return InsertionPoint::append_to(stack.first().copied().unwrap_or(NodeId::ROOT));
        };
        let table = stack[table_index];

        // "If last table has a parent node, then let adjusted insertion
        // location be inside last table's parent node, immediately before
        // last table"
        if let Some(parent) = self.tree.parent(table) {
            return InsertionPoint {
                parent,
                before: Some(table),
            };
        }

        // "Let previous element be the element immediately above last table
        // in the stack of open elements."
        InsertionPoint::append_to(stack[table_index.saturating_sub(1)])
    }

    /// The contents fragment of an HTML `template` element.
    pub(super) fn template_contents(&self, node: NodeId) -> Option<NodeId> {
        self.tree
            .as_element(node)
            .filter(|element| element.is_html("template"))
            .and_then(|element| element.template_contents)
    }

    /// Insert `node` at `point`. A rejected insertion means the tree
    /// builder lost track of the tree, which ends the parse.
    pub(super) fn insert_at(&mut self, point: InsertionPoint, node: NodeId) {
        if let Err(err) = self.tree.insert_before(point.parent, node, point.before) {
            self.fail(err.into());
        }
    }

    pub(super) fn append_node(&mut self, parent: NodeId, node: NodeId) {
        if let Err(err) = self.tree.append_child(parent, node) {
            self.fail(err.into());
        }
    }

    pub(super) fn checked(&mut self, result: Result<(), DomError>) {
        if let Err(err) = result {
            self.fail(err.into());
        }
    }

    /// [§ 13.2.6.1 Create an element for a token](https://html.spec.whatwg.org/multipage/parsing.html#create-an-element-for-the-token)
    ///
    /// Creates a detached element. HTML `template` elements also get a
    /// DocumentFragment for their contents.
    pub(super) fn create_element_for_token(
        &mut self,
        token: &Token,
        namespace: Namespace,
    ) -> NodeId {
        let mut data = ElementData::new(token.tag_name().unwrap_or_default(), namespace);
        data.attrs = token.attributes().to_vec();
        if data.is_html("template") {
            data.template_contents = Some(self.tree.alloc(NodeType::DocumentFragment));
        }
        self.tree.alloc(NodeType::Element(data))
    }

    /// [§ 13.2.6.1 Insert a foreign element](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-foreign-element)
    pub(super) fn insert_foreign_element(&mut self, token: &Token, namespace: Namespace) -> NodeId {
        let point = self.appropriate_place_for_inserting(None);
        let element = self.create_element_for_token(token, namespace);
        self.insert_at(point, element);
        self.stack_of_open_elements.push(element);
        element
    }

    /// [§ 13.2.6.1 Insert an HTML element](https://html.spec.whatwg.org/multipage/parsing.html#insert-an-html-element)
    ///
    /// "When the steps below require the user agent to insert an HTML element
    /// for a token, the user agent must insert a foreign element for the
    /// token, with the HTML namespace and false."
    pub(super) fn insert_html_element(&mut self, token: &Token) -> NodeId {
        self.insert_foreign_element(token, Namespace::Html)
    }

    /// Insert an HTML element for a start tag that has no token of its own,
    /// such as the implied `<head>` or `<tbody>`.
    pub(super) fn insert_html_element_named(&mut self, name: &str) -> NodeId {
        self.insert_html_element(&Token::start_tag(name))
    }

    /// Insert an HTML element and pop it straight away, acknowledging the
    /// self-closing flag. Used for void elements.
    pub(super) fn insert_void_element(&mut self, token: &Token) {
        let _ = self.insert_html_element(token);
        let _ = self.stack_of_open_elements.pop();
        self.acknowledge_self_closing_flag();
    }

    /// [§ 13.2.6.1 Insert a character](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-character)
    pub(super) fn insert_character(&mut self, c: char) {
        let point = self.appropriate_place_for_inserting(None);

        // "If the adjusted insertion location is in a Document node, then
        // return."
        if point.parent == NodeId::ROOT {
            return;
        }

        // "If there is a Text node immediately before the adjusted insertion
        // location, then append data to that Text node's data."
        let previous = match point.before {
            Some(before) => self.tree.prev_sibling(before),
            None => self.tree.last_child(point.parent),
        };
        if let Some(previous) = previous
            && let Some(node) = self.tree.get_mut(previous)
            && let NodeType::Text(text) = &mut node.node_type
        {
            text.push(c);
            return;
        }

        let text = self.tree.alloc(NodeType::Text(c.to_string()));
        self.insert_at(point, text);
    }

    /// [§ 13.2.6.1 Insert a comment](https://html.spec.whatwg.org/multipage/parsing.html#insert-a-comment)
    ///
    /// At `position`, or at the appropriate place when `None`.
    pub(super) fn insert_comment(&mut self, data: &str, position: Option<InsertionPoint>) {
        let point = position.unwrap_or_else(|| self.appropriate_place_for_inserting(None));
        let comment = self.tree.alloc(NodeType::Comment(data.to_string()));
        self.insert_at(point, comment);
    }

    /// Append attributes from `token` to `element` that it does not already
    /// have. Used for stray `<html>` and `<body>` start tags.
    pub(super) fn merge_attributes(&mut self, element: NodeId, token: &Token) {
        let Some(data) = self.tree.as_element_mut(element) else {
            return;
        };
        for attr in token.attributes() {
            if !data.has_attr(&attr.name) {
                data.attrs.push(attr.clone());
            }
        }
    }

    /// [§ 13.2.6.2 Generic raw text element parsing algorithm](https://html.spec.whatwg.org/multipage/parsing.html#generic-raw-text-element-parsing-algorithm)
    /// and the generic RCDATA one: insert, switch the tokenizer, and wait
    /// for the end tag in the "text" insertion mode.
    pub(super) fn parse_generic_text_element(
        &mut self,
        token: &Token,
        state: TokenizerState,
    ) {
        let _ = self.insert_html_element(token);
        self.tokenizer.switch_to(state);
        self.original_insertion_mode = Some(self.insertion_mode);
        self.insertion_mode = InsertionMode::Text;
    }
}
