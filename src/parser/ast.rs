use std::fmt::{self, Display};
use std::rc::Rc;

use super::locations::Span;
use super::tokenizer::{Token, TokenType as TT};

#[derive(Debug, Clone, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone)]
pub enum Statement {
    Let(Name, Expression),
    Return(Expression),
    Expression(Expression),
    While(Expression, Block),
}

/// `{ <statements> }` as used by function bodies, conditionals and loops.
/// A block does not open a scope of its own.
#[derive(Debug, Clone, Default)]
pub struct Block {
    pub statements: Vec<Statement>,
}

#[derive(Clone)]
pub struct Name {
    pub(crate) name: String,
    span: Span,
}

impl Name {
    pub fn as_str(&self) -> &str {
        &self.name
    }

    pub fn span(&self) -> Span {
        self.span
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name(\"{}\")", self.name)
    }
}

impl From<Token> for Name {
    fn from(value: Token) -> Self {
        Self {
            name: value.lexeme,
            span: value.span,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FunctionLiteral {
    pub parameters: Vec<Name>,
    pub body: Block,
}

#[derive(Debug, Clone)]
pub enum Expression {
    Identifier(Name),
    Integer(i64),
    Str(String),
    Boolean(bool),
    Prefix(PrefixOperator, Box<Expression>),
    Infix(InfixOperator, Box<(Expression, Expression)>),
    If(Box<Expression>, Block, Option<Block>),
    Function(Rc<FunctionLiteral>),
    Call(Box<Expression>, Vec<Expression>),
    Array(Vec<Expression>),
    Index(Box<(Expression, Expression)>),
    Hash(Vec<(Expression, Expression)>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Bang,
    Minus,
}

impl PrefixOperator {
    pub(super) fn from_token(typ: TT) -> Option<Self> {
        match typ {
            TT::BANG => Some(Self::Bang),
            TT::MINUS => Some(Self::Minus),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Plus,
    Minus,
    Times,
    Divide,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
}

impl InfixOperator {
    pub(super) fn from_token(typ: TT) -> Option<Self> {
        match typ {
            TT::PLUS => Some(Self::Plus),
            TT::MINUS => Some(Self::Minus),
            TT::ASTERISK => Some(Self::Times),
            TT::SLASH => Some(Self::Divide),
            TT::LT => Some(Self::LessThan),
            TT::GT => Some(Self::GreaterThan),
            TT::EQ => Some(Self::Equal),
            TT::NOT_EQ => Some(Self::NotEqual),
            _ => None,
        }
    }
}

impl Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bang => write!(f, "!"),
            Self::Minus => write!(f, "-"),
        }
    }
}

impl Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Times => "*",
            Self::Divide => "/",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        };
        write!(f, "{}", symbol)
    }
}

fn join<T: Display>(items: &[T]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{}", statement)?;
        }
        Ok(())
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let(name, value) => write!(f, "let {} = {};", name, value),
            Self::Return(value) => write!(f, "return {};", value),
            Self::Expression(expr) => write!(f, "{}", expr),
            Self::While(condition, body) => write!(f, "while {} {{ {} }}", condition, body),
        }
    }
}

impl Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {{ {} }}", join(&self.parameters), self.body)
    }
}

impl Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => write!(f, "{}", name),
            Self::Integer(value) => write!(f, "{}", value),
            Self::Str(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Prefix(op, right) => write!(f, "({}{})", op, right),
            Self::Infix(op, operands) => write!(f, "({} {} {})", operands.0, op, operands.1),
            Self::If(condition, consequence, alternative) => {
                write!(f, "if {} {{ {} }}", condition, consequence)?;
                if let Some(alternative) = alternative {
                    write!(f, " else {{ {} }}", alternative)?;
                }
                Ok(())
            }
            Self::Function(literal) => write!(f, "{}", literal),
            Self::Call(function, arguments) => write!(f, "{}({})", function, join(arguments)),
            Self::Array(elements) => write!(f, "[{}]", join(elements)),
            Self::Index(operands) => write!(f, "({}[{}])", operands.0, operands.1),
            Self::Hash(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(key, value)| format!("{}:{}", key, value))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", pairs.join(", "))
            }
        }
    }
}
