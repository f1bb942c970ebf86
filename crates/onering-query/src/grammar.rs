//! ORQL grammar
//!
//! Recursive descent over the token stream of a single line. Validation is
//! purely syntactic: names are not resolved and nothing touches the store.
//!
//! ```text
//! CREATE (Name[:Class][{k:v, ...}])        CREATE [Source, Target[:Class][{k:v, ...}]]
//! READ   () | (:Class) | (Name)  [WHERE]    READ   [] | [:Class] | [Source, Target]  [WHERE]
//! UPDATE (Name[:Class]{k:v, ...}) [WHERE]   UPDATE [Source, Target[:Class]{k:v, ...}] [WHERE]
//! DELETE (Name)                             DELETE [Source, Target] | [:Class]
//! LINK   [Source, Target] [ALL | MAX_LENGTH n | MIN_LENGTH n | both bounds]
//! CLUSTER | COLOR | LINEARISE  [NOT]
//! ```

use crate::lexer::{Token, tokenize};
use crate::session::DisplayFlag;
use onering_core::{Error, Properties, PropertyFilter, PropertyValue, Result};
use onering_graph::PathBounds;
use serde::{Deserialize, Serialize};

/// A syntactically valid ORQL line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Statement {
    Create(Target),
    Read {
        target: Target,
        condition: Option<PropertyFilter>,
    },
    Update {
        target: Target,
        /// `WHERE` pairs, merged as a second pass at execution time
        condition: Option<Properties>,
    },
    Delete(Target),
    Link {
        source: String,
        target: String,
        search: PathSearch,
    },
    Display {
        flag: DisplayFlag,
        enabled: bool,
    },
}

/// A node `(...)` or edge `[...]` operand
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Target {
    Node(NodePattern),
    Edge(EdgePattern),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodePattern {
    pub name: Option<String>,
    pub class: Option<String>,
    pub properties: Option<Properties>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgePattern {
    /// Source and target node names
    pub endpoints: Option<(String, String)>,
    pub class: Option<String>,
    pub properties: Option<Properties>,
}

/// How LINK searches between its endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PathSearch {
    /// A single shortest path
    Shortest,
    /// Every simple path within the bounds
    AllSimple(PathBounds),
}

/// Validate one ORQL line and build its statement
pub fn parse_statement(line: &str) -> Result<Statement> {
    let tokens = tokenize(line)?;
    let mut parser = GrammarParser::new(line, tokens);
    let statement = parser.parse()?;
    parser.expect_end()?;
    Ok(statement)
}

struct GrammarParser<'a> {
    line: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> GrammarParser<'a> {
    fn new(line: &'a str, tokens: Vec<Token>) -> Self {
        Self {
            line,
            tokens,
            pos: 0,
        }
    }

    fn parse(&mut self) -> Result<Statement> {
        match self.advance() {
            Some(Token::Create) => self.parse_create(),
            Some(Token::Read) => self.parse_read(),
            Some(Token::Update) => self.parse_update(),
            Some(Token::Delete) => self.parse_delete(),
            Some(Token::Link) => self.parse_link(),
            Some(Token::Cluster) => self.parse_display(DisplayFlag::Cluster),
            Some(Token::Color) => self.parse_display(DisplayFlag::Color),
            Some(Token::Linearise) => self.parse_display(DisplayFlag::Linearise),
            Some(other) => Err(self.error(format!("{} cannot start a query", other))),
            None => Err(self.error("empty query")),
        }
    }

    // ========== Commands ==========

    fn parse_create(&mut self) -> Result<Statement> {
        let target = self.parse_target()?;
        match &target {
            Target::Node(node) if node.name.is_none() => {
                return Err(self.error("CREATE needs a node name"));
            }
            Target::Edge(edge) if edge.endpoints.is_none() => {
                return Err(self.error("CREATE needs a source and a target"));
            }
            _ => {}
        }
        Ok(Statement::Create(target))
    }

    fn parse_read(&mut self) -> Result<Statement> {
        let target = self.parse_target()?;
        match &target {
            Target::Node(node) if node.properties.is_some() => {
                return Err(self.error("READ does not take a property block"));
            }
            Target::Node(node) if node.name.is_some() && node.class.is_some() => {
                return Err(self.error("READ takes either a node name or a class"));
            }
            Target::Edge(edge) if edge.properties.is_some() => {
                return Err(self.error("READ does not take a property block"));
            }
            Target::Edge(edge) if edge.endpoints.is_some() && edge.class.is_some() => {
                return Err(self.error("READ takes either edge endpoints or a class"));
            }
            _ => {}
        }

        let condition = self.parse_condition()?;
        Ok(Statement::Read { target, condition })
    }

    fn parse_update(&mut self) -> Result<Statement> {
        let target = self.parse_target()?;
        match &target {
            Target::Node(node) if node.name.is_none() => {
                return Err(self.error("UPDATE needs a node name"));
            }
            Target::Edge(edge) if edge.endpoints.is_none() => {
                return Err(self.error("UPDATE needs a source and a target"));
            }
            Target::Node(NodePattern { properties: None, .. })
            | Target::Edge(EdgePattern { properties: None, .. }) => {
                return Err(self.error("UPDATE needs a property block"));
            }
            _ => {}
        }

        let condition = match self.parse_condition()? {
            None => None,
            Some(PropertyFilter::Conjunction(pairs)) => Some(pairs),
            Some(PropertyFilter::Disjunction(_)) => {
                return Err(self.error("UPDATE conditions can only be joined with AND"));
            }
        };
        Ok(Statement::Update { target, condition })
    }

    fn parse_delete(&mut self) -> Result<Statement> {
        let target = self.parse_target()?;
        let valid = match &target {
            Target::Node(node) => {
                node.name.is_some() && node.class.is_none() && node.properties.is_none()
            }
            Target::Edge(edge) => {
                edge.properties.is_none() && (edge.endpoints.is_some() != edge.class.is_some())
            }
        };
        if valid {
            Ok(Statement::Delete(target))
        } else {
            Err(self.error("DELETE takes (Name), [Source, Target] or [:Class]"))
        }
    }

    fn parse_link(&mut self) -> Result<Statement> {
        self.expect(Token::LBracket)?;
        let source = self.parse_link_name()?;
        self.expect(Token::Comma)?;
        let target = self.parse_link_name()?;
        self.expect(Token::RBracket)?;

        if self.consume(&Token::All) {
            return Ok(Statement::Link {
                source,
                target,
                search: PathSearch::AllSimple(PathBounds::unbounded()),
            });
        }

        let mut bounds = PathBounds::unbounded();
        let mut bounded = false;
        loop {
            if self.consume(&Token::MaxLength) {
                if bounds.max_length.is_some() {
                    return Err(self.error("MAX_LENGTH given twice"));
                }
                bounds.max_length = Some(self.parse_length()?);
            } else if self.consume(&Token::MinLength) {
                if bounds.min_length.is_some() {
                    return Err(self.error("MIN_LENGTH given twice"));
                }
                bounds.min_length = Some(self.parse_length()?);
            } else {
                break;
            }
            bounded = true;
        }

        let search = if bounded {
            PathSearch::AllSimple(bounds)
        } else {
            PathSearch::Shortest
        };
        Ok(Statement::Link {
            source,
            target,
            search,
        })
    }

    fn parse_display(&mut self, flag: DisplayFlag) -> Result<Statement> {
        let enabled = !self.consume(&Token::Not);
        Ok(Statement::Display { flag, enabled })
    }

    // ========== Operands ==========

    fn parse_target(&mut self) -> Result<Target> {
        match self.advance() {
            Some(Token::LParen) => {
                let name = self.parse_optional_word();
                let class = self.parse_class()?;
                let properties = self.parse_properties()?;
                self.expect(Token::RParen)?;
                Ok(Target::Node(NodePattern {
                    name,
                    class,
                    properties,
                }))
            }
            Some(Token::LBracket) => {
                let endpoints = match self.parse_optional_word() {
                    Some(source) => {
                        self.expect(Token::Comma)?;
                        let target = self.parse_word("target node name")?;
                        Some((source, target))
                    }
                    None => None,
                };
                let class = self.parse_class()?;
                let properties = self.parse_properties()?;
                self.expect(Token::RBracket)?;
                Ok(Target::Edge(EdgePattern {
                    endpoints,
                    class,
                    properties,
                }))
            }
            Some(other) => Err(self.error(format!("expected '(' or '[', found {}", other))),
            None => Err(self.error("expected '(' or '['")),
        }
    }

    fn parse_class(&mut self) -> Result<Option<String>> {
        if self.consume(&Token::Colon) {
            Ok(Some(self.parse_word("class name")?))
        } else {
            Ok(None)
        }
    }

    /// `{k:v, ...}`; an empty block is allowed
    fn parse_properties(&mut self) -> Result<Option<Properties>> {
        if !self.consume(&Token::LBrace) {
            return Ok(None);
        }

        let mut properties = Properties::new();
        if self.consume(&Token::RBrace) {
            return Ok(Some(properties));
        }

        loop {
            let key = self.parse_word("property key")?;
            self.expect(Token::Colon)?;
            let value = self.parse_value()?;
            properties.set(key, value);

            if self.consume(&Token::Comma) {
                continue;
            }
            self.expect(Token::RBrace)?;
            return Ok(Some(properties));
        }
    }

    /// ` WHERE k=v AND ...` or ` WHERE k=v OR ...`; mixing connectives is rejected
    fn parse_condition(&mut self) -> Result<Option<PropertyFilter>> {
        if !self.consume(&Token::Where) {
            return Ok(None);
        }

        let mut pairs = vec![self.parse_pair()?];
        let mut connective: Option<Token> = None;

        while let Some(next) = self.peek().filter(|t| matches!(t, Token::And | Token::Or)) {
            let next = next.clone();
            match &connective {
                Some(seen) if *seen != next => {
                    return Err(self.error("AND and OR cannot be mixed in one WHERE clause"));
                }
                _ => connective = Some(next),
            }
            self.pos += 1;
            pairs.push(self.parse_pair()?);
        }

        Ok(Some(match connective {
            Some(Token::Or) => PropertyFilter::Disjunction(
                pairs
                    .into_iter()
                    .map(|(key, value)| Properties::with(key, value))
                    .collect(),
            ),
            _ => PropertyFilter::Conjunction(pairs.into_iter().collect()),
        }))
    }

    fn parse_pair(&mut self) -> Result<(String, PropertyValue)> {
        let key = self.parse_word("condition key")?;
        self.expect(Token::Equals)?;
        let value = self.parse_value()?;
        Ok((key, value))
    }

    fn parse_value(&mut self) -> Result<PropertyValue> {
        match self.advance() {
            Some(Token::Quoted(s)) => Ok(PropertyValue::String(s)),
            Some(Token::Word(raw)) | Some(Token::Number(raw)) => {
                Ok(PropertyValue::from_literal(&raw))
            }
            Some(other) => Err(self.error(format!("expected a value, found {}", other))),
            None => Err(self.error("expected a value")),
        }
    }

    fn parse_link_name(&mut self) -> Result<String> {
        match self.advance() {
            Some(Token::Word(name)) | Some(Token::Quoted(name)) => Ok(name),
            Some(other) => Err(self.error(format!("expected a node name, found {}", other))),
            None => Err(self.error("expected a node name")),
        }
    }

    fn parse_length(&mut self) -> Result<usize> {
        match self.advance() {
            Some(Token::Word(raw)) => raw.parse::<usize>().map_err(|_| {
                self.error(format!("path length must be a whole number, found '{}'", raw))
            }),
            Some(other) => Err(self.error(format!("expected a path length, found {}", other))),
            None => Err(self.error("expected a path length")),
        }
    }

    // ========== Token Helpers ==========

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn consume(&mut self, expected: &Token) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, expected: Token) -> Result<()> {
        match self.advance() {
            Some(token) if token == expected => Ok(()),
            Some(token) => Err(self.error(format!("expected {}, found {}", expected, token))),
            None => Err(self.error(format!("expected {}", expected))),
        }
    }

    fn parse_optional_word(&mut self) -> Option<String> {
        match self.peek() {
            Some(Token::Word(word)) => {
                let word = word.clone();
                self.pos += 1;
                Some(word)
            }
            _ => None,
        }
    }

    fn parse_word(&mut self, what: &str) -> Result<String> {
        match self.advance() {
            Some(Token::Word(word)) => Ok(word),
            Some(other) if other.is_keyword() => Err(self.error(format!(
                "keyword {} cannot be used as a {}",
                other, what
            ))),
            Some(other) => Err(self.error(format!("expected {}, found {}", what, other))),
            None => Err(self.error(format!("expected {}", what))),
        }
    }

    fn expect_end(&self) -> Result<()> {
        match self.peek() {
            None => Ok(()),
            Some(token) => Err(self.error(format!("unexpected {} after end of query", token))),
        }
    }

    fn error<S: Into<String>>(&self, reason: S) -> Error {
        Error::syntax(self.line, reason)
    }
}
