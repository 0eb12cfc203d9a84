//! The markable character stream between the decoder and the tokenizer.
//!
//! Character references need to try the longest named reference and then
//! back up to the longest one that matched; several tokenizer states need to
//! look a few characters ahead before committing. Both are served by a
//! checkpoint ("mark") plus a pushdown of pending character producers: moving
//! back simply pushes the already-read characters onto the pushdown again.

use wren_common::issue::ParseIssue;

use crate::encoding::Normalizer;

/// Something that yields characters one at a time.
pub trait CharSource {
    /// Next character, or `None` at end of input. Keeps returning `None`
    /// once exhausted.
    fn next_char(&mut self) -> Option<char>;

    /// Sticky decode-error flag.
    fn had_error(&self) -> bool {
        false
    }

    /// Drain recorded decode issues.
    fn take_issues(&mut self) -> Vec<ParseIssue> {
        Vec::new()
    }

    /// The encoding is now certain; stop keeping bytes around for a restart.
    fn disable_buffering(&mut self) {}
}

/// Characters from an in-memory string, normalized like decoded input.
#[derive(Debug)]
pub struct StrSource {
    input: Vec<char>,
    position: usize,
    normalizer: Normalizer,
}

impl StrSource {
    /// Read from `input`.
    pub fn new(input: &str) -> Self {
        Self::with_normalizer(input, Normalizer::new())
    }

    /// Read from `input`, reporting through `normalizer`.
    pub fn with_normalizer(input: &str, normalizer: Normalizer) -> Self {
        Self {
            input: input.chars().collect(),
            position: 0,
            normalizer,
        }
    }
}

impl CharSource for StrSource {
    fn next_char(&mut self) -> Option<char> {
        while let Some(&c) = self.input.get(self.position) {
            self.position += 1;
            if let Some(c) = self.normalizer.normalize(c) {
                return Some(c);
            }
        }
        None
    }

    fn had_error(&self) -> bool {
        self.normalizer.had_error()
    }

    fn take_issues(&mut self) -> Vec<ParseIssue> {
        self.normalizer.take_issues()
    }
}

/// A lookahead buffer over a [`CharSource`].
///
/// While a mark is set every character read is retained, so the reader can
/// return to any position between the mark and the current one.
#[derive(Debug)]
pub struct MarkableStream<S> {
    source: S,
    /// Producers consulted before `source`, top of stack first. Each one is
    /// stored reversed so `pop` yields its next character.
    pushed: Vec<Vec<char>>,
    /// Characters read since the mark, oldest first.
    history: Vec<char>,
    marked: bool,
    /// Total characters handed out, minus those moved back.
    consumed: usize,
}

impl<S: CharSource> MarkableStream<S> {
    /// Wrap `source` with no mark set.
    pub const fn new(source: S) -> Self {
        Self {
            source,
            pushed: Vec::new(),
            history: Vec::new(),
            marked: false,
            consumed: 0,
        }
    }

    fn pull(&mut self) -> Option<char> {
        while let Some(top) = self.pushed.last_mut() {
            if let Some(c) = top.pop() {
                return Some(c);
            }
            let _ = self.pushed.pop();
        }
        self.source.next_char()
    }

    /// Read one character.
    pub fn read(&mut self) -> Option<char> {
        let c = self.pull()?;
        self.consumed += 1;
        if self.marked {
            self.history.push(c);
        }
        Some(c)
    }

    /// Read up to `buffer.len()` characters into `buffer`. Returns how many
    /// were read; fewer than requested only at end of input.
    pub fn read_into(&mut self, buffer: &mut [char]) -> usize {
        for (count, slot) in buffer.iter_mut().enumerate() {
            match self.read() {
                Some(c) => *slot = c,
                None => return count,
            }
        }
        buffer.len()
    }

    /// The next character without consuming it.
    pub fn peek(&mut self) -> Option<char> {
        let c = self.pull()?;
        self.push_source([c]);
        Some(c)
    }

    /// Set a mark at the current position unless one is already set.
    pub fn mark_if_needed(&mut self) {
        if !self.marked {
            self.mark_to_end();
        }
    }

    /// Set the mark at the current position, forgetting earlier history.
    pub fn mark_to_end(&mut self) {
        self.history.clear();
        self.marked = true;
    }

    /// Drop the mark. Characters already read can no longer be revisited.
    pub fn unmark(&mut self) {
        self.history.clear();
        self.marked = false;
    }

    /// Whether a mark is set.
    #[must_use]
    pub const fn is_marked(&self) -> bool {
        self.marked
    }

    /// Current position, counted in characters from the mark.
    #[must_use]
    pub fn mark_position(&self) -> usize {
        self.history.len()
    }

    /// Rewind (or stay) to `position` characters past the mark.
    ///
    /// Positions past the current one are clamped to it.
    pub fn set_mark_position(&mut self, position: usize) {
        let back = self.history.len().saturating_sub(position);
        self.move_back(back);
    }

    /// Undo the last `count` reads since the mark.
    pub fn move_back(&mut self, count: usize) {
        let count = count.min(self.history.len());
        let split = self.history.len() - count;
        let replay = self.history.split_off(split);
        self.consumed -= replay.len();
        self.push_source(replay);
    }

    /// Put one character back so the next `read` returns it again.
    pub fn unread(&mut self, c: char) {
        if self.marked && self.history.last() == Some(&c) {
            self.move_back(1);
        } else {
            self.consumed = self.consumed.saturating_sub(1);
            self.push_source([c]);
        }
    }

    /// Stack a new producer on top: its characters are read before anything
    /// else that is pending.
    pub fn push_source(&mut self, chars: impl IntoIterator<Item = char>) {
        let mut chars: Vec<char> = chars.into_iter().collect();
        if chars.is_empty() {
            return;
        }
        chars.reverse();
        self.pushed.push(chars);
    }

    /// Characters handed out so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.consumed
    }

    /// Sticky decode-error flag of the underlying source.
    #[must_use]
    pub fn had_decode_error(&self) -> bool {
        self.source.had_error()
    }

    /// Drain decode issues from the underlying source.
    pub fn take_decode_issues(&mut self) -> Vec<ParseIssue> {
        self.source.take_issues()
    }

    /// The underlying source.
    pub fn into_source(self) -> S {
        self.source
    }

    /// Mutable access to the underlying source.
    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stream(input: &str) -> MarkableStream<StrSource> {
        MarkableStream::new(StrSource::new(input))
    }

    fn drain(stream: &mut MarkableStream<StrSource>) -> String {
        std::iter::from_fn(|| stream.read()).collect()
    }

    #[test]
    fn rewind_to_mark_position() {
        let mut s = stream("notin;");
        s.mark_to_end();
        let mut buf = ['\0'; 4];
        assert_eq!(s.read_into(&mut buf), 4);
        assert_eq!(buf, ['n', 'o', 't', 'i']);
        s.set_mark_position(3);
        s.unmark();
        assert_eq!(drain(&mut s), "in;");
    }

    #[test]
    fn move_back_replays_in_order() {
        let mut s = stream("abcdef");
        assert_eq!(s.read(), Some('a'));
        s.mark_if_needed();
        let _ = s.read();
        let _ = s.read();
        let _ = s.read();
        s.move_back(2);
        assert_eq!(s.mark_position(), 1);
        assert_eq!(drain(&mut s), "cdef");
    }

    #[test]
    fn mark_if_needed_keeps_an_existing_mark() {
        let mut s = stream("xyz");
        s.mark_if_needed();
        let _ = s.read();
        s.mark_if_needed();
        let _ = s.read();
        assert_eq!(s.mark_position(), 2);
        s.set_mark_position(0);
        assert_eq!(s.read(), Some('x'));
    }

    #[test]
    fn pushed_sources_are_read_first() {
        let mut s = stream("world");
        assert_eq!(s.read(), Some('w'));
        s.push_source("lo ".chars());
        s.push_source("hel".chars());
        assert_eq!(drain(&mut s), "hello orld");
    }

    #[test]
    fn peek_and_unread() {
        let mut s = stream("ab");
        assert_eq!(s.peek(), Some('a'));
        assert_eq!(s.read(), Some('a'));
        s.unread('a');
        assert_eq!(s.consumed(), 0);
        assert_eq!(drain(&mut s), "ab");
        assert_eq!(s.read(), None);
        assert_eq!(s.peek(), None);
    }

    #[test]
    fn source_is_normalized() {
        let mut s = stream("\u{FEFF}a\r\nb\rc");
        assert_eq!(drain(&mut s), "a\nb\nc");
    }
}
