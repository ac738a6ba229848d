//! Collection token grammar.
//!
//! `#<asin>^<type>` references a document by ASIN, `*<sha1>` by its
//! canonical-path hash. These two forms are the only bridge between
//! decoded metadata and the device's collection index.

use crate::metadata::DocumentMetadata;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Asin(String),
    Hash(String),
}

impl Token {
    /// Parse a token from its index representation. The ASIN runs to
    /// the last `^`; hashes are exactly 40 lowercase hex characters.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some(rest) = s.strip_prefix('#') {
            let (asin, _doc_type) = rest.rsplit_once('^')?;
            return Some(Token::Asin(asin.to_string()));
        }
        if let Some(hash) = s.strip_prefix('*')
            && hash.len() == 40
            && hash.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
        {
            return Some(Token::Hash(hash.to_string()));
        }
        None
    }

    /// True when this token references the given document.
    pub fn matches(&self, meta: &DocumentMetadata) -> bool {
        match self {
            Token::Asin(asin) => meta.asin.as_deref() == Some(asin.as_str()),
            Token::Hash(hash) => meta.content_hash == *hash,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_asin_token() {
        assert_eq!(
            Token::parse("#B00TEST1^EBOK"),
            Some(Token::Asin("B00TEST1".to_string()))
        );
        // ASIN runs to the last caret.
        assert_eq!(
            Token::parse("#AB^CD^EBOK"),
            Some(Token::Asin("AB^CD".to_string()))
        );
        assert_eq!(Token::parse("#B00TEST1"), None);
    }

    #[test]
    fn test_parse_hash_token() {
        let hash = "a".repeat(40);
        assert_eq!(
            Token::parse(&format!("*{hash}")),
            Some(Token::Hash(hash))
        );
        assert_eq!(Token::parse(&format!("*{}", "a".repeat(39))), None);
        assert_eq!(Token::parse(&format!("*{}", "A".repeat(40))), None);
        assert_eq!(Token::parse(&format!("*{}", "g".repeat(40))), None);
    }

    #[test]
    fn test_parse_garbage() {
        assert_eq!(Token::parse(""), None);
        assert_eq!(Token::parse("B00TEST1^EBOK"), None);
    }
}
