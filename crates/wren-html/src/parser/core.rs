use encoding_rs::Encoding;
use strum_macros::Display;
use wren_common::issue::{IssueStage, ParseIssue};
use wren_common::warning::warn_once;
use wren_dom::{Document, DomTree, Namespace, NodeId, QuirksMode};

use super::foreign_content::mathml;
use crate::encoding::sniffer::extract_charset_from_content;
use crate::encoding::{
    Confidence, EncodingChange, EncodingConfidence, ascii_compatible, resolve_label,
};
use crate::error::{ParseError, Result};
use crate::stream::{CharSource, StrSource};
use crate::tokenizer::{HTMLTokenizer, Token};

/// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
///
/// "The insertion mode is a state variable that controls the primary operation
/// of the tree construction stage."
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum InsertionMode {
    /// [§ 13.2.6.4.1 The "initial" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-initial-insertion-mode)
    Initial,
    /// [§ 13.2.6.4.2 The "before html" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-html-insertion-mode)
    BeforeHtml,
    /// [§ 13.2.6.4.3 The "before head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-before-head-insertion-mode)
    BeforeHead,
    /// [§ 13.2.6.4.4 The "in head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    InHead,
    /// [§ 13.2.6.4.5 The "in head noscript" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inheadnoscript)
    InHeadNoscript,
    /// [§ 13.2.6.4.6 The "after head" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-head-insertion-mode)
    AfterHead,
    /// [§ 13.2.6.4.7 The "in body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inbody)
    InBody,
    /// [§ 13.2.6.4.8 The "text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incdata)
    Text,
    /// [§ 13.2.6.4.9 The "in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intable)
    InTable,
    /// [§ 13.2.6.4.10 The "in table text" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intabletext)
    InTableText,
    /// [§ 13.2.6.4.11 The "in caption" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incaption)
    InCaption,
    /// [§ 13.2.6.4.12 The "in column group" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incolumngroup)
    InColumnGroup,
    /// [§ 13.2.6.4.13 The "in table body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intablebody)
    InTableBody,
    /// [§ 13.2.6.4.14 The "in row" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inrow)
    InRow,
    /// [§ 13.2.6.4.15 The "in cell" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-incell)
    InCell,
    /// [§ 13.2.6.4.16 The "in select" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselect)
    InSelect,
    /// [§ 13.2.6.4.17 The "in select in table" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inselectintable)
    InSelectInTable,
    /// [§ 13.2.6.4.18 The "in template" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-intemplate)
    InTemplate,
    /// [§ 13.2.6.4.19 The "after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterbody)
    AfterBody,
    /// [§ 13.2.6.4.20 The "in frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inframeset)
    InFrameset,
    /// [§ 13.2.6.4.21 The "after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-afterframeset)
    AfterFrameset,
    /// [§ 13.2.6.4.22 The "after after body" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-body-insertion-mode)
    AfterAfterBody,
    /// [§ 13.2.6.4.23 The "after after frameset" insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-after-after-frameset-insertion-mode)
    AfterAfterFrameset,
}

/// [§ 13.2.4.3 The list of active formatting elements](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
///
/// "The list contains elements in the formatting category, and markers."
#[derive(Debug, Clone)]
pub enum ActiveFormattingElement {
    /// A formatting element and the start tag that created it, kept so the
    /// element can be recreated when reconstructing or adopting.
    Element {
        /// The element in the tree.
        node_id: NodeId,
        /// The token it was created for.
        token: Token,
    },
    /// Pushed when entering applet, object, marquee, template, td, th and
    /// caption, so formatting from outside does not leak in.
    Marker,
}

/// [§ 13.2.6 Tree construction](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction)
///
/// Pulls tokens from an [`HTMLTokenizer`] and builds a node tree. All parser
/// state lives here, so independent parses never share anything.
///
/// ```
/// use wren_html::{HTMLParser, HTMLTokenizer};
///
/// let tokenizer = HTMLTokenizer::new("<p>Hello".to_string());
/// let document = HTMLParser::new(tokenizer).run().unwrap();
/// let body = document.body().unwrap();
/// assert_eq!(document.tree.text_content(body), "Hello");
/// ```
#[derive(Debug)]
pub struct HTMLParser<S = StrSource> {
    pub(super) tokenizer: HTMLTokenizer<S>,

    /// `NodeId::ROOT` is the Document node.
    pub(super) tree: DomTree,

    /// [§ 13.2.4.1 The insertion mode](https://html.spec.whatwg.org/multipage/parsing.html#the-insertion-mode)
    pub(super) insertion_mode: InsertionMode,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#original-insertion-mode)
    /// Where the "text" and "in table text" modes return to.
    pub(super) original_insertion_mode: Option<InsertionMode>,

    /// [§ 13.2.4.1](https://html.spec.whatwg.org/multipage/parsing.html#stack-of-template-insertion-modes)
    pub(super) template_insertion_modes: Vec<InsertionMode>,

    /// [§ 13.2.4.2 The stack of open elements](https://html.spec.whatwg.org/multipage/parsing.html#the-stack-of-open-elements)
    ///
    /// Grows downwards: the last entry is the current node.
    pub(super) stack_of_open_elements: Vec<NodeId>,

    /// [§ 13.2.4.3](https://html.spec.whatwg.org/multipage/parsing.html#the-list-of-active-formatting-elements)
    pub(super) active_formatting_elements: Vec<ActiveFormattingElement>,

    /// [§ 13.2.4.4 The element pointers](https://html.spec.whatwg.org/multipage/parsing.html#the-element-pointers)
    pub(super) head_element_pointer: Option<NodeId>,
    pub(super) form_element_pointer: Option<NodeId>,

    /// [§ 13.2.4.5 Other parsing state flags](https://html.spec.whatwg.org/multipage/parsing.html#frameset-ok-flag)
    pub(super) frameset_ok: bool,
    pub(super) scripting: bool,

    /// [§ 13.2.6.1](https://html.spec.whatwg.org/multipage/parsing.html#foster-parent)
    /// Set while the "in table" anything-else rule runs the "in body" rules.
    pub(super) foster_parenting: bool,

    /// Set after `<pre>`, `<listing>` and `<textarea>`: a newline right
    /// after the start tag is dropped.
    pub(super) ignore_next_line_feed: bool,

    /// Cleared before each token; void and self-closing foreign elements set
    /// it.
    pub(super) self_closing_acknowledged: bool,

    /// [§ 13.2.6.4.10](https://html.spec.whatwg.org/multipage/parsing.html#concept-pending-table-char-tokens)
    pub(super) pending_table_character_tokens: String,

    pub(super) quirks_mode: QuirksMode,

    /// [§ 13.4](https://html.spec.whatwg.org/multipage/parsing.html#concept-frag-parse-context)
    /// The detached context element of a fragment parse.
    pub(super) context_element: Option<NodeId>,

    encoding: EncodingConfidence,
    encoding_restart: Option<&'static Encoding>,

    pub(super) stopped: bool,
    had_error: bool,
    issues: Option<Vec<ParseIssue>>,
    tokens_processed: usize,
    fatal: Option<ParseError>,
}

impl<S: CharSource> HTMLParser<S> {
    /// A parser for a whole document, starting in the "initial" insertion
    /// mode with scripting disabled.
    #[must_use]
    pub fn new(tokenizer: HTMLTokenizer<S>) -> Self {
        Self {
            tokenizer,
            tree: DomTree::new(),
            insertion_mode: InsertionMode::Initial,
            original_insertion_mode: None,
            template_insertion_modes: Vec::new(),
            stack_of_open_elements: Vec::new(),
            active_formatting_elements: Vec::new(),
            head_element_pointer: None,
            form_element_pointer: None,
            frameset_ok: true,
            scripting: false,
            foster_parenting: false,
            ignore_next_line_feed: false,
            self_closing_acknowledged: false,
            pending_table_character_tokens: String::new(),
            quirks_mode: QuirksMode::NoQuirks,
            context_element: None,
            encoding: EncodingConfidence::irrelevant(),
            encoding_restart: None,
            stopped: false,
            had_error: false,
            issues: None,
            tokens_processed: 0,
            fatal: None,
        }
    }

    /// [§ 13.2.4.5](https://html.spec.whatwg.org/multipage/parsing.html#scripting-flag)
    #[must_use]
    pub const fn with_scripting(mut self, scripting: bool) -> Self {
        self.scripting = scripting;
        self
    }

    /// Record every tree construction error, not just the sticky flag.
    #[must_use]
    pub fn with_issue_collection(mut self, collect: bool) -> Self {
        self.issues = collect.then(Vec::new);
        self
    }

    /// The encoding the input is being decoded with. A tentative encoding
    /// may be overturned by a `<meta>` declaration.
    #[must_use]
    pub const fn with_encoding(mut self, encoding: EncodingConfidence) -> Self {
        self.encoding = encoding;
        self
    }

    /// Current insertion mode.
    #[must_use]
    pub const fn insertion_mode(&self) -> InsertionMode {
        self.insertion_mode
    }

    /// The tree built so far.
    #[must_use]
    pub const fn tree(&self) -> &DomTree {
        &self.tree
    }

    /// The encoding in use and its confidence.
    #[must_use]
    pub const fn encoding(&self) -> EncodingConfidence {
        self.encoding
    }

    /// The encoding a `<meta>` declaration asked to restart the parse with.
    /// Set only when the encoding was tentative and the request differs.
    #[must_use]
    pub const fn encoding_restart(&self) -> Option<&'static Encoding> {
        self.encoding_restart
    }

    /// Mutable access to the tokenizer, e.g. to collect a decoder I/O error.
    pub fn tokenizer_mut(&mut self) -> &mut HTMLTokenizer<S> {
        &mut self.tokenizer
    }

    /// Give back the tokenizer, and through it the character source.
    pub fn into_tokenizer(self) -> HTMLTokenizer<S> {
        self.tokenizer
    }

    /// Parse to the end of input and return the document.
    ///
    /// # Errors
    ///
    /// Only if the tree builder hit an internal invariant violation.
    pub fn run(mut self) -> Result<Document> {
        self.run_until_stopped();
        self.into_document()
    }

    /// Parse to the end; a fatal error still hands out the partial document.
    pub(crate) fn run_to_end(mut self) -> (Document, Option<ParseError>) {
        self.run_until_stopped();
        self.finish()
    }

    /// Process tokens until end of input, a fatal error, or an encoding
    /// restart request.
    pub fn run_until_stopped(&mut self) {
        while !self.stopped {
            let allow_cdata = self
                .adjusted_current_node()
                .is_some_and(|node| !self.is_in_namespace(node, Namespace::Html));
            self.tokenizer.set_allow_cdata(allow_cdata);

            let token = self.tokenizer.next_token();
            self.tokens_processed += 1;

            if self.ignore_next_line_feed {
                self.ignore_next_line_feed = false;
                if matches!(token, Token::Character { data: '\n' }) {
                    continue;
                }
            }

            self.self_closing_acknowledged = false;
            self.process_token(&token, None);

            // "When a start tag token is emitted with its self-closing flag
            // set, if the flag is not acknowledged when it is processed by the
            // tree construction stage, that is a parse error."
            if let Token::StartTag {
                name,
                self_closing: true,
                ..
            } = &token
                && !self.self_closing_acknowledged
            {
                self.parse_error(&format!(
                    "non-void-html-element-start-tag-with-trailing-solidus <{name}>"
                ));
            }

            if token.is_eof() {
                self.stopped = true;
            }
        }
    }

    /// Finish the parse and hand out the document.
    ///
    /// # Errors
    ///
    /// The internal invariant violation that stopped the parse, if any.
    pub fn into_document(self) -> Result<Document> {
        let (document, fatal) = self.finish();
        match fatal {
            Some(err) => Err(err),
            None => Ok(document),
        }
    }

    /// The document built so far plus the fatal error that stopped it, if
    /// any. A fatal error also sets `had_errors`.
    pub(crate) fn finish(mut self) -> (Document, Option<ParseError>) {
        let mut issues = self.tokenizer.stream_mut().take_decode_issues();
        issues.extend(self.tokenizer.take_issues());
        issues.extend(self.issues.take().unwrap_or_default());

        let had_errors = self.had_error
            || self.fatal.is_some()
            || self.tokenizer.had_error()
            || self.tokenizer.stream_mut().had_decode_error();

        let document = Document {
            tree: self.tree,
            character_set: self.encoding.label(),
            quirks_mode: self.quirks_mode,
            had_errors,
            issues,
        };
        (document, self.fatal)
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// With `mode_override` the token is processed "using the rules for" that
    /// mode. Without it the token goes through the dispatcher: foreign
    /// content rules or the current insertion mode. Reprocessing a token is
    /// a recursive call.
    pub fn process_token(&mut self, token: &Token, mode_override: Option<InsertionMode>) {
        if self.stopped {
            return;
        }
        match mode_override {
            Some(mode) => self.process_using_rules_for(mode, token),
            None if self.is_foreign_context(token) => self.process_foreign_content(token),
            None => self.process_using_rules_for(self.insertion_mode, token),
        }
    }

    /// Switch to `mode` and reprocess `token`.
    pub(super) fn reprocess_in(&mut self, mode: InsertionMode, token: &Token) {
        self.insertion_mode = mode;
        self.process_token(token, None);
    }

    fn process_using_rules_for(&mut self, mode: InsertionMode, token: &Token) {
        match mode {
            InsertionMode::Initial => self.handle_initial_mode(token),
            InsertionMode::BeforeHtml => self.handle_before_html_mode(token),
            InsertionMode::BeforeHead => self.handle_before_head_mode(token),
            InsertionMode::InHead => self.handle_in_head_mode(token),
            InsertionMode::InHeadNoscript => self.handle_in_head_noscript_mode(token),
            InsertionMode::AfterHead => self.handle_after_head_mode(token),
            InsertionMode::InBody => self.handle_in_body_mode(token),
            InsertionMode::Text => self.handle_text_mode(token),
            InsertionMode::InTable => self.handle_in_table_mode(token),
            InsertionMode::InTableText => self.handle_in_table_text_mode(token),
            InsertionMode::InCaption => self.handle_in_caption_mode(token),
            InsertionMode::InColumnGroup => self.handle_in_column_group_mode(token),
            InsertionMode::InTableBody => self.handle_in_table_body_mode(token),
            InsertionMode::InRow => self.handle_in_row_mode(token),
            InsertionMode::InCell => self.handle_in_cell_mode(token),
            InsertionMode::InSelect => self.handle_in_select_mode(token),
            InsertionMode::InSelectInTable => self.handle_in_select_in_table_mode(token),
            InsertionMode::InTemplate => self.handle_in_template_mode(token),
            InsertionMode::AfterBody => self.handle_after_body_mode(token),
            InsertionMode::InFrameset => self.handle_in_frameset_mode(token),
            InsertionMode::AfterFrameset => self.handle_after_frameset_mode(token),
            InsertionMode::AfterAfterBody => self.handle_after_after_body_mode(token),
            InsertionMode::AfterAfterFrameset => self.handle_after_after_frameset_mode(token),
        }
    }

    /// [§ 13.2.6 Tree construction dispatcher](https://html.spec.whatwg.org/multipage/parsing.html#tree-construction-dispatcher)
    ///
    /// True when the token must be handled by the rules for parsing tokens
    /// in foreign content rather than by the insertion mode.
    fn is_foreign_context(&self, token: &Token) -> bool {
        let Some(node) = self.adjusted_current_node() else {
            return false;
        };
        let Some(element) = self.tree.as_element(node) else {
            return false;
        };
        if element.namespace == Namespace::Html {
            return false;
        }

        let is_start_tag = matches!(token, Token::StartTag { .. });
        let is_character = matches!(token, Token::Character { .. });

        if element.namespace == Namespace::MathMl
            && mathml::is_text_integration_point(&element.local_name)
        {
            let leaves = match token {
                Token::StartTag { name, .. } => name != "mglyph" && name != "malignmark",
                Token::Character { .. } => true,
                _ => false,
            };
            if leaves {
                return false;
            }
        }

        if element.is(Namespace::MathMl, "annotation-xml") && token.is_start_tag("svg") {
            return false;
        }

        if (is_start_tag || is_character) && self.is_html_integration_point(node) {
            return false;
        }

        !token.is_eof()
    }

    /// The current node, except in a fragment parse with only the root on
    /// the stack, where it is the context element.
    pub(super) fn adjusted_current_node(&self) -> Option<NodeId> {
        if self.context_element.is_some() && self.stack_of_open_elements.len() == 1 {
            self.context_element
        } else {
            self.current_node()
        }
    }

    /// [§ 13.2.2 Parse errors](https://html.spec.whatwg.org/multipage/parsing.html#parse-errors)
    pub(super) fn parse_error(&mut self, message: &str) {
        let position = self.tokens_processed;
        log::debug!(
            target: "wren_html::tree_builder",
            "{message} at token {position} in {} mode",
            self.insertion_mode
        );
        self.had_error = true;
        if let Some(issues) = self.issues.as_mut() {
            issues.push(ParseIssue {
                stage: IssueStage::TreeBuilder,
                message: message.to_string(),
                position,
            });
        }
    }

    /// An internal invariant broke: keep what was built and stop.
    pub(super) fn fail(&mut self, err: ParseError) {
        log::error!(target: "wren_html::tree_builder", "{err}");
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.stopped = true;
    }

    /// [§ 13.2.7 The end](https://html.spec.whatwg.org/multipage/parsing.html#stop-parsing)
    ///
    /// "Pop all the nodes off the stack of open elements."
    pub(super) fn stop_parsing(&mut self) {
        self.stack_of_open_elements.clear();
        self.stopped = true;
    }

    /// "Acknowledge the token's self-closing flag"
    pub(super) const fn acknowledge_self_closing_flag(&mut self) {
        self.self_closing_acknowledged = true;
    }

    /// [§ 13.2.6.4.4](https://html.spec.whatwg.org/multipage/parsing.html#parsing-main-inhead)
    /// and [§ 13.2.3.4 Changing the encoding while parsing](https://html.spec.whatwg.org/multipage/parsing.html#changing-the-encoding-while-parsing)
    ///
    /// A `<meta>` start tag seen while the encoding is tentative may confirm
    /// it or ask for the parse to start over.
    pub(super) fn change_encoding_for_meta(&mut self, token: &Token) {
        if self.encoding.confidence == Confidence::Irrelevant {
            return;
        }

        let charset = token.attribute("charset");
        let requested = match charset {
            Some(label) => resolve_label(label),
            None => match (token.attribute("http-equiv"), token.attribute("content")) {
                (Some(equiv), Some(content)) if equiv.eq_ignore_ascii_case("content-type") => {
                    extract_charset_from_content(content.as_bytes())
                }
                _ => None,
            },
        };
        let Some(requested) = requested else {
            if let Some(label) = charset {
                let _ = warn_once(
                    "Encoding",
                    &format!("ignoring unknown <meta> charset {label:?}"),
                );
            }
            return;
        };

        match self.encoding.change_to(requested) {
            EncodingChange::Keep => {
                if ascii_compatible(requested) != self.encoding.encoding {
                    let _ = warn_once(
                        "Encoding",
                        &format!(
                            "ignoring <meta> switch to {}: {} is already certain",
                            requested.name(),
                            self.encoding.encoding.name()
                        ),
                    );
                }
            }
            EncodingChange::Confirm => {
                log::debug!(
                    target: "wren_html::encoding",
                    "<meta> confirms {}",
                    self.encoding.encoding.name()
                );
                self.encoding.confidence = Confidence::Certain;
                self.tokenizer.stream_mut().source_mut().disable_buffering();
            }
            EncodingChange::Restart(encoding) => {
                log::debug!(
                    target: "wren_html::encoding",
                    "<meta> switches {} to {}, restarting",
                    self.encoding.encoding.name(),
                    encoding.name()
                );
                self.encoding_restart = Some(encoding);
                self.stopped = true;
            }
        }
    }
}
