// Operator-precedence (Pratt) parser.
//
// Every token type maps to at most one prefix handler and one infix handler.
// `parse_expression` runs the prefix handler of the current token and then
// folds infix handlers for as long as the next token binds tighter than the
// precedence it was called with.
//
// Handlers are entered with `current` on their first token and leave
// `current` on their last token. A handler that fails records a diagnostic
// and returns `None`; the enclosing statement is dropped and parsing resumes
// with the next token.

use std::rc::Rc;

use super::ast::*;
use super::error::Error;
use super::tokenizer::{Token, TokenType as TT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

impl Precedence {
    fn of(typ: TT) -> Self {
        match typ {
            TT::EQ | TT::NOT_EQ => Self::Equals,
            TT::LT | TT::GT => Self::LessGreater,
            TT::PLUS | TT::MINUS => Self::Sum,
            TT::ASTERISK | TT::SLASH => Self::Product,
            TT::LPAREN => Self::Call,
            TT::LBRACKET => Self::Index,
            _ => Self::Lowest,
        }
    }
}

type PrefixFn<I> = fn(&mut Parser<I>) -> Option<Expression>;
type InfixFn<I> = fn(&mut Parser<I>, Expression) -> Option<Expression>;

/// Parses a whole token stream and hands back the tree together with every
/// diagnostic. The tree must not be evaluated unless the diagnostics are empty.
pub fn parse(tokens: Vec<Token>) -> (Program, Vec<Error>) {
    let mut parser = Parser::new(tokens);
    let program = parser.parse_program();
    (program, parser.errors)
}

pub struct Parser<I>
where
    I: Iterator<Item = Token>,
{
    tokens: I,
    current: Token,
    peek: Token,
    errors: Vec<Error>,
}

impl<I> Parser<I>
where
    I: Iterator<Item = Token>,
{
    pub fn new(tokens: impl IntoIterator<Item = Token, IntoIter = I>) -> Self {
        let mut parser = Self {
            tokens: tokens.into_iter(),
            current: Token::default(),
            peek: Token::default(),
            errors: vec![],
        };
        parser.next_token();
        parser.next_token();
        parser
    }

    pub fn parse_program(&mut self) -> Program {
        let mut program = Program::default();
        while !self.current_token_is(TT::EOF) {
            if let Some(statement) = self.parse_statement() {
                program.statements.push(statement);
            }
            self.next_token();
        }
        if !self.errors.is_empty() {
            tracing::debug!(count = self.errors.len(), "parsed program with diagnostics");
        }
        program
    }

    /// Diagnostic messages in the order they were found.
    pub fn errors(&self) -> Vec<String> {
        self.errors.iter().map(|e| e.message().to_string()).collect()
    }

    pub fn diagnostics(&self) -> &[Error] {
        &self.errors
    }

    fn next_token(&mut self) {
        // An exhausted stream keeps yielding EOF.
        let next = self
            .tokens
            .next()
            .unwrap_or_else(|| Token::new(TT::EOF, "", self.peek.span));
        self.current = std::mem::replace(&mut self.peek, next);
    }

    fn current_token_is(&self, typ: TT) -> bool {
        self.current.typ == typ
    }

    fn peek_token_is(&self, typ: TT) -> bool {
        self.peek.typ == typ
    }

    fn expect_peek(&mut self, typ: TT) -> Option<()> {
        if self.peek_token_is(typ) {
            self.next_token();
            Some(())
        } else {
            self.peek_error(typ);
            None
        }
    }

    fn peek_precedence(&self) -> Precedence {
        Precedence::of(self.peek.typ)
    }

    fn current_precedence(&self) -> Precedence {
        Precedence::of(self.current.typ)
    }

    fn report_error(&mut self, error: Error) {
        self.errors.push(error);
    }

    fn peek_error(&mut self, typ: TT) {
        let msg = format!(
            "expected next token to be {}, got {} instead",
            typ, self.peek.typ
        );
        self.report_error(Error::new(self.peek.span, &msg));
    }

    fn no_prefix_parse_fn_error(&mut self) {
        let msg = format!("no prefix parse function for {} found", self.current.typ);
        self.report_error(Error::new(self.current.span, &msg));
    }

    fn prefix_fn(typ: TT) -> Option<PrefixFn<I>> {
        let handler: PrefixFn<I> = match typ {
            TT::IDENT => Self::parse_identifier,
            TT::INT => Self::parse_integer_literal,
            TT::STRING => Self::parse_string_literal,
            TT::TRUE | TT::FALSE => Self::parse_boolean,
            TT::BANG | TT::MINUS => Self::parse_prefix_expression,
            TT::LPAREN => Self::parse_grouped_expression,
            TT::IF => Self::parse_if_expression,
            TT::FUNCTION => Self::parse_function_literal,
            TT::LBRACKET => Self::parse_array_literal,
            TT::LBRACE => Self::parse_hash_literal,
            _ => return None,
        };
        Some(handler)
    }

    fn infix_fn(typ: TT) -> Option<InfixFn<I>> {
        let handler: InfixFn<I> = match typ {
            TT::PLUS
            | TT::MINUS
            | TT::ASTERISK
            | TT::SLASH
            | TT::EQ
            | TT::NOT_EQ
            | TT::LT
            | TT::GT => Self::parse_infix_expression,
            TT::LPAREN => Self::parse_call_expression,
            TT::LBRACKET => Self::parse_index_expression,
            _ => return None,
        };
        Some(handler)
    }

    // STATEMENTS
    // ==========

    fn parse_statement(&mut self) -> Option<Statement> {
        match self.current.typ {
            TT::LET => self.parse_let_statement(),
            TT::RETURN => self.parse_return_statement(),
            TT::WHILE => self.parse_while_statement(),
            _ => self.parse_expression_statement(),
        }
    }

    fn skip_semicolon(&mut self) {
        if self.peek_token_is(TT::SEMICOLON) {
            self.next_token();
        }
    }

    // let_stmt: 'let' IDENT '=' expression [';']
    fn parse_let_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TT::IDENT)?;
        let name = Name::from(self.current.clone());
        self.expect_peek(TT::ASSIGN)?;
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Let(name, value))
    }

    // return_stmt: 'return' expression [';']
    fn parse_return_statement(&mut self) -> Option<Statement> {
        self.next_token();
        let value = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Return(value))
    }

    // while_stmt: 'while' '(' expression ')' block [';']
    fn parse_while_statement(&mut self) -> Option<Statement> {
        self.expect_peek(TT::LPAREN)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TT::RPAREN)?;
        self.expect_peek(TT::LBRACE)?;
        let body = self.parse_block()?;
        self.skip_semicolon();
        Some(Statement::While(condition, body))
    }

    fn parse_expression_statement(&mut self) -> Option<Statement> {
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.skip_semicolon();
        Some(Statement::Expression(expression))
    }

    // block: '{' statement* '}'
    fn parse_block(&mut self) -> Option<Block> {
        let mut block = Block::default();
        self.next_token();
        while !self.current_token_is(TT::RBRACE) {
            if self.current_token_is(TT::EOF) {
                let msg = format!(
                    "expected next token to be {}, got {} instead",
                    TT::RBRACE,
                    TT::EOF
                );
                self.report_error(Error::new(self.current.span, &msg));
                return None;
            }
            if let Some(statement) = self.parse_statement() {
                block.statements.push(statement);
            }
            self.next_token();
        }
        Some(block)
    }

    // EXPRESSIONS
    // ===========

    fn parse_expression(&mut self, precedence: Precedence) -> Option<Expression> {
        let Some(prefix) = Self::prefix_fn(self.current.typ) else {
            self.no_prefix_parse_fn_error();
            return None;
        };
        let mut left = prefix(self)?;

        while !self.peek_token_is(TT::SEMICOLON) && precedence < self.peek_precedence() {
            let Some(infix) = Self::infix_fn(self.peek.typ) else {
                return Some(left);
            };
            self.next_token();
            left = infix(self, left)?;
        }
        Some(left)
    }

    fn parse_identifier(&mut self) -> Option<Expression> {
        Some(Expression::Identifier(Name::from(self.current.clone())))
    }

    fn parse_integer_literal(&mut self) -> Option<Expression> {
        match self.current.lexeme.parse::<i64>() {
            Ok(value) => Some(Expression::Integer(value)),
            Err(_) => {
                let msg = format!("could not parse {} as integer", self.current.lexeme);
                self.report_error(Error::new(self.current.span, &msg));
                None
            }
        }
    }

    fn parse_string_literal(&mut self) -> Option<Expression> {
        Some(Expression::Str(self.current.lexeme.clone()))
    }

    fn parse_boolean(&mut self) -> Option<Expression> {
        Some(Expression::Boolean(self.current_token_is(TT::TRUE)))
    }

    fn parse_prefix_expression(&mut self) -> Option<Expression> {
        let operator = PrefixOperator::from_token(self.current.typ)?;
        self.next_token();
        let right = self.parse_expression(Precedence::Prefix)?;
        Some(Expression::Prefix(operator, Box::new(right)))
    }

    fn parse_infix_expression(&mut self, left: Expression) -> Option<Expression> {
        let operator = InfixOperator::from_token(self.current.typ)?;
        let precedence = self.current_precedence();
        self.next_token();
        let right = self.parse_expression(precedence)?;
        Some(Expression::Infix(operator, Box::new((left, right))))
    }

    fn parse_grouped_expression(&mut self) -> Option<Expression> {
        self.next_token();
        let expression = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TT::RPAREN)?;
        Some(expression)
    }

    // if_expr: 'if' '(' expression ')' block ['else' block]
    fn parse_if_expression(&mut self) -> Option<Expression> {
        self.expect_peek(TT::LPAREN)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TT::RPAREN)?;
        self.expect_peek(TT::LBRACE)?;
        let consequence = self.parse_block()?;
        let alternative = if self.peek_token_is(TT::ELSE) {
            self.next_token();
            self.expect_peek(TT::LBRACE)?;
            Some(self.parse_block()?)
        } else {
            None
        };
        Some(Expression::If(Box::new(condition), consequence, alternative))
    }

    // function: 'fn' '(' [IDENT (',' IDENT)*] ')' block
    fn parse_function_literal(&mut self) -> Option<Expression> {
        self.expect_peek(TT::LPAREN)?;
        let parameters = self.parse_function_parameters()?;
        self.expect_peek(TT::LBRACE)?;
        let body = self.parse_block()?;
        Some(Expression::Function(Rc::new(FunctionLiteral {
            parameters,
            body,
        })))
    }

    fn parse_function_parameters(&mut self) -> Option<Vec<Name>> {
        let mut parameters = vec![];
        if self.peek_token_is(TT::RPAREN) {
            self.next_token();
            return Some(parameters);
        }
        loop {
            self.expect_peek(TT::IDENT)?;
            parameters.push(Name::from(self.current.clone()));
            if !self.peek_token_is(TT::COMMA) {
                break;
            }
            self.next_token();
        }
        self.expect_peek(TT::RPAREN)?;
        Some(parameters)
    }

    /// Comma separated expressions up to `end`, shared by call arguments and
    /// array literals.
    fn parse_expression_list(&mut self, end: TT) -> Option<Vec<Expression>> {
        let mut list = vec![];
        if self.peek_token_is(end) {
            self.next_token();
            return Some(list);
        }
        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);
        while self.peek_token_is(TT::COMMA) {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }
        self.expect_peek(end)?;
        Some(list)
    }

    fn parse_array_literal(&mut self) -> Option<Expression> {
        let elements = self.parse_expression_list(TT::RBRACKET)?;
        Some(Expression::Array(elements))
    }

    fn parse_call_expression(&mut self, function: Expression) -> Option<Expression> {
        let arguments = self.parse_expression_list(TT::RPAREN)?;
        Some(Expression::Call(Box::new(function), arguments))
    }

    fn parse_index_expression(&mut self, left: Expression) -> Option<Expression> {
        self.next_token();
        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TT::RBRACKET)?;
        Some(Expression::Index(Box::new((left, index))))
    }

    // hash: '{' [expression ':' expression (',' expression ':' expression)*] '}'
    fn parse_hash_literal(&mut self) -> Option<Expression> {
        let mut pairs = vec![];
        while !self.peek_token_is(TT::RBRACE) {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;
            self.expect_peek(TT::COLON)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;
            pairs.push((key, value));
            if !self.peek_token_is(TT::RBRACE) {
                self.expect_peek(TT::COMMA)?;
            }
        }
        self.expect_peek(TT::RBRACE)?;
        Some(Expression::Hash(pairs))
    }
}
