//! [§ 13.4 Parsing HTML fragments](https://html.spec.whatwg.org/multipage/parsing.html#parsing-html-fragments)

use wren_common::issue::ParseIssue;
use wren_dom::{DomTree, ElementData, Namespace, NodeId, NodeType};

use super::core::{HTMLParser, InsertionMode};
use crate::error::{ParseError, Result};
use crate::stream::CharSource;
use crate::tokenizer::{HTMLTokenizer, TokenizerState};

/// The element a fragment is parsed "inside of", e.g. the element whose
/// `innerHTML` is being set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentContext {
    /// Lowercase local name.
    pub local_name: String,
    /// Namespace of the context element.
    pub namespace: Namespace,
}

impl FragmentContext {
    /// An HTML context element.
    #[must_use]
    pub fn html(local_name: &str) -> Self {
        Self {
            local_name: local_name.to_ascii_lowercase(),
            namespace: Namespace::Html,
        }
    }
}

/// The result of a fragment parse: the parsed nodes in order, in a tree
/// of their own. The nodes have no parent the caller needs to care about.
#[derive(Debug)]
pub struct Fragment {
    /// Arena holding the nodes.
    pub tree: DomTree,
    /// Top-level nodes of the fragment.
    pub nodes: Vec<NodeId>,
    /// True if any stage reported a parse error.
    pub had_errors: bool,
    /// Every recorded issue, when issue collection was requested.
    pub issues: Vec<ParseIssue>,
}

impl<S: CharSource> HTMLParser<S> {
    /// A parser set up to parse a fragment in `context`.
    ///
    /// "Create a new HTML parser ... Let root be the result of creating an
    /// element given document, html, and the HTML namespace ... Reset the
    /// parser's insertion mode appropriately."
    #[must_use]
    pub fn for_fragment(
        tokenizer: HTMLTokenizer<S>,
        context: &FragmentContext,
        scripting: bool,
    ) -> Self {
        let mut parser = Self::new(tokenizer).with_scripting(scripting);

        let root = parser
            .tree
            .alloc(NodeType::Element(ElementData::new("html", Namespace::Html)));
        parser.append_node(NodeId::ROOT, root);
        parser.stack_of_open_elements.push(root);

        // The context element stays detached; it only steers the tree
        // builder.
        let context_element = parser.tree.alloc(NodeType::Element(ElementData::new(
            context.local_name.as_str(),
            context.namespace,
        )));
        parser.context_element = Some(context_element);

        if context.namespace == Namespace::Html {
            if context.local_name == "template" {
                parser
                    .template_insertion_modes
                    .push(InsertionMode::InTemplate);
            }
            parser.tokenizer.switch_to(TokenizerState::for_fragment_context(
                &context.local_name,
                scripting,
            ));
            parser.tokenizer.set_last_start_tag(&context.local_name);
            if context.local_name == "form" {
                parser.form_element_pointer = Some(context_element);
            }
        }

        parser.reset_insertion_mode_appropriately();
        log::trace!(
            target: "wren_html::tree_builder",
            "fragment in <{}> starts in {} mode",
            context.local_name,
            parser.insertion_mode
        );
        parser
    }

    /// Parse to the end and return the fragment's nodes: the children of
    /// the synthetic root element.
    ///
    /// # Errors
    ///
    /// Only if the tree builder hit an internal invariant violation.
    pub fn into_fragment(self) -> Result<Fragment> {
        match self.finish_fragment() {
            (_, Some(err)) => Err(err),
            (fragment, None) => Ok(fragment),
        }
    }

    /// Like [`Self::into_fragment`], but a fatal error still hands out what
    /// was built before it.
    pub(crate) fn finish_fragment(mut self) -> (Fragment, Option<ParseError>) {
        self.run_until_stopped();
        let (document, fatal) = self.finish();
        let nodes = document
            .tree
            .document_element()
            .map(|root| document.tree.children(root).to_vec())
            .unwrap_or_default();
        let fragment = Fragment {
            tree: document.tree,
            nodes,
            had_errors: document.had_errors,
            issues: document.issues,
        };
        (fragment, fatal)
    }
}
