//! [§ 13.2.6.4.7 Adoption agency algorithm](https://html.spec.whatwg.org/multipage/parsing.html#adoption-agency-algorithm)
//!
//! Repairs misnested formatting elements such as `<b>1<p>2</b>3`.

use wren_dom::{Namespace, NodeId};

use super::core::{ActiveFormattingElement, HTMLParser};
use crate::error::ParseError;
use crate::stream::CharSource;
use crate::tokenizer::Token;

/// Where the recreated formatting element goes in the list of active
/// formatting elements.
#[derive(Debug, Clone, Copy)]
enum Bookmark {
    /// Take the formatting element's own slot.
    Replace,
    /// Just after this element's entry.
    InsertAfter(NodeId),
}

impl<S: CharSource> HTMLParser<S> {
    /// Runs the algorithm for the end tag `token`. Returns false when the
    /// caller must fall back to the "any other end tag" steps.
    pub(super) fn run_adoption_agency(&mut self, token: &Token) -> bool {
        // STEP 1: "Let subject be token's tag name."
        let Some(subject) = token.tag_name() else {
            return true;
        };

        // STEP 2: "If the current node is an HTML element whose tag name is
        // subject, and the current node is not in the list of active
        // formatting elements, then pop the current node off the stack of
        // open elements and return."
        if let Some(current) = self.current_node()
            && self.is_html_element_named(current, subject)
            && self.active_formatting_position(current).is_none()
        {
            let _ = self.pop_current_node();
            return true;
        }

        // STEP 3-4: the outer loop runs at most eight times.
        for _ in 0..8 {
            // STEP 4.3: "Let formatting element be the last element in the
            // list of active formatting elements that: is between the end of
            // the list and the last marker in the list, if any, or the start
            // of the list otherwise, and has the tag name subject."
            // "If there is no such element, then return and instead act as
            // described in the 'any other end tag' entry above."
            let Some(formatting_element) = self.active_formatting_element_named(subject) else {
                return false;
            };

            // STEP 4.4: "If formatting element is not in the stack of open
            // elements, then this is a parse error; remove the element from
            // the list, and return."
            let Some(formatting_index) = self
                .stack_of_open_elements
                .iter()
                .rposition(|&node| node == formatting_element)
            else {
                self.parse_error(&format!("</{subject}> for a formatting element that is not open"));
                self.remove_from_active_formatting(formatting_element);
                return true;
            };

            // STEP 4.5: "If formatting element is in the stack of open
            // elements, but the element is not in scope, then this is a parse
            // error; return."
            if !self.has_node_in_scope(formatting_element) {
                self.parse_error(&format!("</{subject}> for a formatting element not in scope"));
                return true;
            }

            // STEP 4.6: "If formatting element is not the current node, this
            // is a parse error. (But do not return.)"
            if self.current_node() != Some(formatting_element) {
                self.parse_error(&format!("misnested </{subject}>"));
            }

            // STEP 4.7: "Let furthest block be the topmost node in the stack
            // of open elements that is lower in the stack than formatting
            // element, and is an element in the special category."
            let furthest_block_index = (formatting_index + 1..self.stack_of_open_elements.len())
                .find(|&index| self.is_special_element(self.stack_of_open_elements[index]));

            // STEP 4.8: "If there is no furthest block, then the UA must first
            // pop all the nodes from the bottom of the stack of open elements,
            // from the current node up to and including formatting element,
            // then remove formatting element from the list of active
            // formatting elements, and finally return."
            let Some(furthest_block_index) = furthest_block_index else {
                self.stack_of_open_elements.truncate(formatting_index);
                self.remove_from_active_formatting(formatting_element);
                return true;
            };
            let furthest_block = self.stack_of_open_elements[furthest_block_index];

            // STEP 4.9: "Let common ancestor be the element immediately above
            // formatting element in the stack of open elements."
            let Some(common_ancestor) = formatting_index
                .checked_sub(1)
                .map(|index| self.stack_of_open_elements[index])
            else {
                self.fail(ParseError::Invariant(
                    "formatting element at the bottom of the stack of open elements",
                ));
                return true;
            };

            // STEP 4.10: "Let a bookmark note the position of formatting
            // element in the list of active formatting elements relative to
            // the elements on either side of it in the list."
            let mut bookmark = Bookmark::Replace;

            // STEP 4.11: "Let node and last node be furthest block."
            let mut node_index = furthest_block_index;
            let mut last_node = furthest_block;

            // STEP 4.13: inner loop.
            let mut inner_loop_counter = 0;
            loop {
                inner_loop_counter += 1;

                // STEP 4.13.3: "Let node be the element immediately above node
                // in the stack of open elements, or if node is no longer in
                // the stack of open elements, the element that was immediately
                // above node in the stack of open elements before node was
                // removed."
                node_index -= 1;
                let node = self.stack_of_open_elements[node_index];

                // STEP 4.13.4: "If node is formatting element, then break."
                if node == formatting_element {
                    break;
                }

                // STEP 4.13.5: "If inner loop counter is greater than three
                // and node is in the list of active formatting elements, then
                // remove node from the list of active formatting elements."
                let mut entry = self.active_formatting_position(node);
                if inner_loop_counter > 3
                    && let Some(index) = entry
                {
                    let _ = self.active_formatting_elements.remove(index);
                    entry = None;
                }

                // STEP 4.13.6: "If node is not in the list of active formatting
                // elements, then remove node from the stack of open elements
                // and continue."
                let Some(entry) = entry else {
                    let _ = self.stack_of_open_elements.remove(node_index);
                    continue;
                };

                // STEP 4.13.7: "Create an element for the token for which the
                // element node was created, in the HTML namespace, with common
                // ancestor as the intended parent; replace the entry for node
                // in the list of active formatting elements with an entry for
                // the new element, replace the entry for node in the stack of
                // open elements with an entry for the new element, and let
                // node be the new element."
                let ActiveFormattingElement::Element { token, .. } =
                    &self.active_formatting_elements[entry]
                else {
                    self.fail(ParseError::Invariant("marker found as an open element"));
                    return true;
                };
                let token = token.clone();
                let new_element = self.create_element_for_token(&token, Namespace::Html);
                self.active_formatting_elements[entry] = ActiveFormattingElement::Element {
                    node_id: new_element,
                    token,
                };
                self.stack_of_open_elements[node_index] = new_element;

                // STEP 4.13.8: "If last node is furthest block, then move the
                // aforementioned bookmark to be immediately after the new node
                // in the list of active formatting elements."
                if last_node == furthest_block {
                    bookmark = Bookmark::InsertAfter(new_element);
                }

                // STEP 4.13.9: "Append last node to node."
                self.append_node(new_element, last_node);

                // STEP 4.13.10: "Set last node to node."
                last_node = new_element;
            }

            // STEP 4.14: "Insert whatever last node ended up being in the
            // previous step at the appropriate place for inserting a node, but
            // using common ancestor as the override target."
            let point = self.appropriate_place_for_inserting(Some(common_ancestor));
            self.insert_at(point, last_node);

            // STEP 4.15: "Create an element for the token for which formatting
            // element was created, in the HTML namespace, with furthest block
            // as the intended parent."
            let Some(formatting_entry) = self.active_formatting_position(formatting_element)
            else {
                self.fail(ParseError::Invariant(
                    "formatting element left the list of active formatting elements",
                ));
                return true;
            };
            let ActiveFormattingElement::Element { token, .. } =
                &self.active_formatting_elements[formatting_entry]
            else {
                return true;
            };
            let token = token.clone();
            let new_element = self.create_element_for_token(&token, Namespace::Html);

            // STEP 4.16: "Take all of the child nodes of furthest block and
            // append them to the element created in the last step."
            let moved = self.tree.move_children(furthest_block, new_element);
            self.checked(moved);

            // STEP 4.17: "Append that new element to furthest block."
            self.append_node(furthest_block, new_element);

            // STEP 4.18: "Remove formatting element from the list of active
            // formatting elements, and insert the new element into the list of
            // active formatting elements at the position of the aforementioned
            // bookmark."
            let entry = ActiveFormattingElement::Element {
                node_id: new_element,
                token,
            };
            match bookmark {
                Bookmark::Replace => {
                    self.active_formatting_elements[formatting_entry] = entry;
                }
                Bookmark::InsertAfter(anchor) => {
                    let _ = self.active_formatting_elements.remove(formatting_entry);
                    let index = self
                        .active_formatting_position(anchor)
                        .map_or(self.active_formatting_elements.len(), |index| index + 1);
                    self.active_formatting_elements.insert(index, entry);
                }
            }

            // STEP 4.19: "Remove formatting element from the stack of open
            // elements, and insert the new element into the stack of open
            // elements immediately below the position of furthest block in
            // that stack."
            self.remove_open_element(formatting_element);
            let below_furthest_block = self
                .stack_of_open_elements
                .iter()
                .position(|&node| node == furthest_block)
                .map_or(self.stack_of_open_elements.len(), |index| index + 1);
            self.stack_of_open_elements
                .insert(below_furthest_block, new_element);

            if self.stopped {
                return true;
            }
        }
        true
    }
}
