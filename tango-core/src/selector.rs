//! Node selection
//!
//! Commands that target nodes accept either `all` or a comma-separated
//! list of node names (no spaces).

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, TangoError};

/// Keyword selecting every configured node
pub const ALL_NODES: &str = "all";

/// Which nodes a command targets
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeSelector {
    /// Every configured node, in configuration order
    All,
    /// Nodes named explicitly, in the order given
    Named(Vec<String>),
}

impl NodeSelector {
    /// Parse a node list argument
    pub fn parse(text: &str) -> Result<Self> {
        if text == ALL_NODES {
            return Ok(NodeSelector::All);
        }

        let names: Vec<String> = text.split(',').map(str::to_string).collect();
        if names.iter().any(String::is_empty) {
            return Err(TangoError::InvalidNodeList(text.to_string()));
        }

        Ok(NodeSelector::Named(names))
    }
}

impl FromStr for NodeSelector {
    type Err = TangoError;

    fn from_str(s: &str) -> Result<Self> {
        NodeSelector::parse(s)
    }
}

impl fmt::Display for NodeSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeSelector::All => write!(f, "{}", ALL_NODES),
            NodeSelector::Named(names) => write!(f, "{}", names.join(",")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all() {
        assert_eq!(NodeSelector::parse("all").unwrap(), NodeSelector::All);
    }

    #[test]
    fn test_parse_names() {
        let selector = NodeSelector::parse("beta,alpha").unwrap();
        assert_eq!(
            selector,
            NodeSelector::Named(vec!["beta".to_string(), "alpha".to_string()])
        );
        assert_eq!(selector.to_string(), "beta,alpha");
    }

    #[test]
    fn test_parse_rejects_empty_entries() {
        assert!(NodeSelector::parse("").is_err());
        assert!(NodeSelector::parse("alpha,,beta").is_err());
        assert!(NodeSelector::parse("alpha,").is_err());
    }

    #[test]
    fn test_spaces_are_not_trimmed() {
        let selector = NodeSelector::parse("alpha, beta").unwrap();
        assert_eq!(
            selector,
            NodeSelector::Named(vec!["alpha".to_string(), " beta".to_string()])
        );
    }
}
