//! Recoverable parse errors.

use std::fmt;

/// Which pipeline stage reported an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueStage {
    /// Malformed bytes, control characters or noncharacters in the input.
    Decoder,
    /// Grammar errors found while tokenizing.
    Tokenizer,
    /// Misnested or misplaced tokens found while building the tree.
    TreeBuilder,
}

impl fmt::Display for IssueStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Decoder => "decoder",
            Self::Tokenizer => "tokenizer",
            Self::TreeBuilder => "tree builder",
        })
    }
}

/// One recoverable error. Parsing always continues after these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    /// Stage that found it.
    pub stage: IssueStage,
    /// Human-readable description.
    pub message: String,
    /// Number of characters (tokenizer) or tokens (tree builder) consumed
    /// when the issue was found.
    pub position: usize,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error at {}: {}", self.stage, self.position, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_stage() {
        let issue = ParseIssue {
            stage: IssueStage::TreeBuilder,
            message: "unexpected </div>".to_string(),
            position: 7,
        };
        assert_eq!(issue.to_string(), "tree builder error at 7: unexpected </div>");
    }
}
