//! ORQL lexer using logos

use logos::Logos;
use onering_core::{Error, Result};
use std::fmt;

/// ORQL tokens. Keywords are case-sensitive.
#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r\n\f]+")]
pub enum Token {
    // Line heads
    #[token("CREATE")]
    Create,

    #[token("READ")]
    Read,

    #[token("UPDATE")]
    Update,

    #[token("DELETE")]
    Delete,

    #[token("LINK")]
    Link,

    #[token("COLOR")]
    Color,

    #[token("CLUSTER")]
    Cluster,

    #[token("LINEARISE")]
    Linearise,

    // Clause keywords
    #[token("WHERE")]
    Where,

    #[token("AND")]
    And,

    #[token("OR")]
    Or,

    #[token("ALL")]
    All,

    #[token("NOT")]
    Not,

    #[token("MAX_LENGTH")]
    MaxLength,

    #[token("MIN_LENGTH")]
    MinLength,

    // Symbols
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token(":")]
    Colon,

    #[token(",")]
    Comma,

    #[token("=")]
    Equals,

    // Literals
    #[regex(r"-?[0-9]+\.[0-9]+", |lex| lex.slice().to_string())]
    #[regex(r"-[0-9]+", |lex| lex.slice().to_string())]
    Number(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    Quoted(String),

    // Names, classes, keys and bare values; any Unicode letter or digit
    #[regex(r"[\p{L}\p{N}_]+", |lex| lex.slice().to_string())]
    Word(String),
}

impl Token {
    /// Check if this token may start a query line
    pub fn is_command(&self) -> bool {
        matches!(
            self,
            Token::Create
                | Token::Read
                | Token::Update
                | Token::Delete
                | Token::Link
                | Token::Color
                | Token::Cluster
                | Token::Linearise
        )
    }

    /// Check if this token is a keyword
    pub fn is_keyword(&self) -> bool {
        self.is_command()
            || matches!(
                self,
                Token::Where
                    | Token::And
                    | Token::Or
                    | Token::All
                    | Token::Not
                    | Token::MaxLength
                    | Token::MinLength
            )
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text: &str = match self {
            Token::Create => "CREATE",
            Token::Read => "READ",
            Token::Update => "UPDATE",
            Token::Delete => "DELETE",
            Token::Link => "LINK",
            Token::Color => "COLOR",
            Token::Cluster => "CLUSTER",
            Token::Linearise => "LINEARISE",
            Token::Where => "WHERE",
            Token::And => "AND",
            Token::Or => "OR",
            Token::All => "ALL",
            Token::Not => "NOT",
            Token::MaxLength => "MAX_LENGTH",
            Token::MinLength => "MIN_LENGTH",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBracket => "[",
            Token::RBracket => "]",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Colon => ":",
            Token::Comma => ",",
            Token::Equals => "=",
            Token::Number(s) | Token::Word(s) => s.as_str(),
            Token::Quoted(s) => return write!(f, "{:?}", s),
        };
        write!(f, "'{}'", text)
    }
}

/// Tokenize one ORQL line. Characters outside the token set are a syntax error.
pub fn tokenize(line: &str) -> Result<Vec<Token>> {
    let mut lexer = Token::lexer(line);
    let mut tokens = Vec::new();

    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => {
                return Err(Error::syntax(
                    line,
                    format!(
                        "unexpected input '{}' at column {}",
                        lexer.slice(),
                        lexer.span().start + 1
                    ),
                ));
            }
        }
    }

    Ok(tokens)
}

/// The first token of a line, if it lexes
pub fn first_token(line: &str) -> Option<Token> {
    Token::lexer(line).next().and_then(|token| token.ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_node() {
        let tokens = tokenize("CREATE (Frodo:Hobbit{age:50})").unwrap();

        assert_eq!(tokens[0], Token::Create);
        assert!(tokens.contains(&Token::LParen));
        assert!(tokens.contains(&Token::Colon));
        assert!(tokens.contains(&Token::LBrace));
        assert!(tokens
            .iter()
            .any(|t| matches!(t, Token::Word(s) if s == "Hobbit")));
        assert!(tokens
            .iter()
            .any(|t| matches!(t, Token::Word(s) if s == "50")));
    }

    #[test]
    fn test_link_modifiers() {
        let tokens = tokenize(r#"LINK [Frodo, "The One Ring"] MIN_LENGTH 2 MAX_LENGTH 4"#).unwrap();

        assert!(tokens.contains(&Token::Quoted("The One Ring".to_string())));
        assert!(tokens.contains(&Token::MinLength));
        assert!(tokens.contains(&Token::MaxLength));
    }

    #[test]
    fn test_numbers() {
        let tokens = tokenize("WHERE height = 1.75 AND delta = -3").unwrap();

        assert!(tokens.contains(&Token::Number("1.75".to_string())));
        assert!(tokens.contains(&Token::Number("-3".to_string())));
        assert!(tokens.contains(&Token::And));
    }

    #[test]
    fn test_strings() {
        let tokens = tokenize(r#"WHERE race = "Half Elf" OR race = 'Maia'"#).unwrap();

        assert!(tokens.contains(&Token::Quoted("Half Elf".to_string())));
        assert!(tokens.contains(&Token::Quoted("Maia".to_string())));
    }

    #[test]
    fn test_keywords_are_case_sensitive() {
        let tokens = tokenize("read all").unwrap();
        assert_eq!(
            tokens,
            vec![Token::Word("read".to_string()), Token::Word("all".to_string())]
        );

        let tokens = tokenize("READ ALLIES").unwrap();
        assert_eq!(tokens, vec![Token::Read, Token::Word("ALLIES".to_string())]);
    }

    #[test]
    fn test_unicode_names() {
        let tokens = tokenize("CREATE (Éowyn:Human{sword:Andúril})").unwrap();

        assert!(tokens.contains(&Token::Word("Éowyn".to_string())));
        assert!(tokens.contains(&Token::Word("Andúril".to_string())));
        assert_eq!(first_token("READ (Théoden)"), Some(Token::Read));
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("READ (Frodo) WHERE age > 3").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("'>'"));
    }

    #[test]
    fn test_first_token() {
        assert_eq!(first_token("  CLUSTER NOT"), Some(Token::Cluster));
        assert_eq!(first_token("BAD_LINE"), Some(Token::Word("BAD_LINE".to_string())));
        assert!(first_token("").is_none());
        assert!(Token::Cluster.is_command());
        assert!(!Token::Where.is_command());
        assert!(Token::Where.is_keyword());
    }
}
