mod builtins;
mod environment;
mod object;

pub use builtins::Builtin;
pub use environment::Environment;
pub use object::{Function, Hash, HashKey, HashPair, Object, ObjectType, FALSE, NULL, TRUE};

use std::io::{self, Write};
use std::rc::Rc;

use crate::parser::{Block, Expression, InfixOperator, Name, PrefixOperator, Program, Statement};

/// Returns early from the enclosing evaluation if `$obj` is an error.
macro_rules! propagate {
    ($obj:expr) => {{
        let obj = $obj;
        if obj.is_error() {
            return obj;
        }
        obj
    }};
}

/// Evaluates `program` in `env` with `puts` writing to stdout.
pub fn evaluate(program: &Program, env: &Environment) -> Object {
    Evaluator::new(io::stdout()).eval_program(program, env)
}

/// Tree-walking evaluator. Every step returns exactly one `Object`; an
/// `Object::Error` result aborts the enclosing block, call and statement.
pub struct Evaluator<W> {
    output: W,
}

impl<W> Evaluator<W>
where
    W: Write,
{
    pub fn new(output: W) -> Self {
        Self { output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    pub fn eval_program(&mut self, program: &Program, env: &Environment) -> Object {
        let mut result = NULL;
        for statement in &program.statements {
            result = self.evaluate(statement, env);
            match result {
                Object::ReturnValue(value) => return *value,
                Object::Error(ref msg) => {
                    tracing::debug!(error = %msg, "evaluation aborted");
                    return result;
                }
                _ => {}
            }
        }
        result
    }

    /// Like `eval_program`, but a return value stays wrapped so that it keeps
    /// unwinding up to the enclosing call.
    fn eval_block(&mut self, block: &Block, env: &Environment) -> Object {
        let mut result = NULL;
        for statement in &block.statements {
            result = self.evaluate(statement, env);
            if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
                return result;
            }
        }
        result
    }

    fn evaluate(&mut self, statement: &Statement, env: &Environment) -> Object {
        match statement {
            Statement::Let(name, value) => {
                let value = propagate!(self.evaluate_expr(value, env));
                env.set(name.as_str(), value);
                NULL
            }
            Statement::Return(value) => {
                let value = propagate!(self.evaluate_expr(value, env));
                Object::ReturnValue(Box::new(value))
            }
            Statement::Expression(expr) => self.evaluate_expr(expr, env),
            Statement::While(condition, body) => {
                loop {
                    let test = propagate!(self.evaluate_expr(condition, env));
                    if !test.is_truthy() {
                        break;
                    }
                    let result = self.eval_block(body, env);
                    if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
                        return result;
                    }
                }
                NULL
            }
        }
    }

    fn evaluate_expr(&mut self, expression: &Expression, env: &Environment) -> Object {
        match expression {
            Expression::Identifier(name) => eval_identifier(name, env),
            Expression::Integer(value) => Object::Integer(*value),
            Expression::Str(value) => Object::Str(Rc::from(value.as_str())),
            Expression::Boolean(value) => Object::from_bool(*value),
            Expression::Prefix(operator, right) => {
                let right = propagate!(self.evaluate_expr(right, env));
                eval_prefix_expression(*operator, &right)
            }
            Expression::Infix(operator, operands) => {
                let left = propagate!(self.evaluate_expr(&operands.0, env));
                let right = propagate!(self.evaluate_expr(&operands.1, env));
                eval_infix_expression(*operator, &left, &right)
            }
            Expression::If(condition, consequence, alternative) => {
                let condition = propagate!(self.evaluate_expr(condition, env));
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    NULL
                }
            }
            Expression::Function(literal) => Object::Function(Rc::new(Function {
                literal: Rc::clone(literal),
                env: env.clone(),
            })),
            Expression::Call(function, arguments) => {
                let function = propagate!(self.evaluate_expr(function, env));
                if !matches!(function, Object::Function(_) | Object::Builtin(_)) {
                    return not_a_function(&function);
                }
                match self.evaluate_expressions(arguments, env) {
                    Ok(args) => self.apply_function(&function, args),
                    Err(err) => err,
                }
            }
            Expression::Array(elements) => match self.evaluate_expressions(elements, env) {
                Ok(elements) => Object::Array(Rc::new(elements)),
                Err(err) => err,
            },
            Expression::Index(operands) => {
                let left = propagate!(self.evaluate_expr(&operands.0, env));
                let index = propagate!(self.evaluate_expr(&operands.1, env));
                eval_index_expression(&left, &index)
            }
            Expression::Hash(pairs) => self.eval_hash_literal(pairs, env),
        }
    }

    /// Evaluates left to right and stops at the first error, which becomes
    /// the `Err` value.
    fn evaluate_expressions(
        &mut self,
        expressions: &[Expression],
        env: &Environment,
    ) -> Result<Vec<Object>, Object> {
        let mut result = Vec::with_capacity(expressions.len());
        for expression in expressions {
            let value = self.evaluate_expr(expression, env);
            if value.is_error() {
                return Err(value);
            }
            result.push(value);
        }
        Ok(result)
    }

    fn apply_function(&mut self, function: &Object, args: Vec<Object>) -> Object {
        match function {
            Object::Function(function) => {
                let parameters = &function.literal.parameters;
                if parameters.len() != args.len() {
                    return Object::error(format!(
                        "wrong number of arguments: want={}, got={}",
                        parameters.len(),
                        args.len()
                    ));
                }
                tracing::trace!(arity = args.len(), "applying function");
                let env = Environment::new_enclosed(&function.env);
                for (parameter, arg) in parameters.iter().zip(args) {
                    env.set(parameter.as_str(), arg);
                }
                match self.eval_block(&function.literal.body, &env) {
                    Object::ReturnValue(value) => *value,
                    other => other,
                }
            }
            Object::Builtin(builtin) => {
                tracing::trace!(name = builtin.name, "applying builtin");
                builtin.call(&args, &mut self.output)
            }
            other => not_a_function(other),
        }
    }

    fn eval_hash_literal(&mut self, pairs: &[(Expression, Expression)], env: &Environment) -> Object {
        let mut hash = Hash::default();
        for (key_expr, value_expr) in pairs {
            let key = propagate!(self.evaluate_expr(key_expr, env));
            let Some(hash_key) = key.hash_key() else {
                return unusable_as_hash_key(&key);
            };
            let value = propagate!(self.evaluate_expr(value_expr, env));
            hash.pairs.insert(hash_key, HashPair { key, value });
        }
        Object::Hash(Rc::new(hash))
    }
}

fn not_a_function(obj: &Object) -> Object {
    Object::error(format!("not a function: {}", obj.object_type()))
}

fn unusable_as_hash_key(obj: &Object) -> Object {
    Object::error(format!("unusable as hash key: {}", obj.object_type()))
}

fn eval_identifier(name: &Name, env: &Environment) -> Object {
    env.get(name.as_str())
        .or_else(|| builtins::lookup(name.as_str()).map(Object::Builtin))
        .unwrap_or_else(|| Object::error(format!("identifier not found: {}", name)))
}

fn eval_prefix_expression(operator: PrefixOperator, right: &Object) -> Object {
    match operator {
        PrefixOperator::Bang => Object::from_bool(!right.is_truthy()),
        PrefixOperator::Minus => match right {
            Object::Integer(value) => Object::Integer(value.wrapping_neg()),
            _ => Object::error(format!("unknown operator: -{}", right.object_type())),
        },
    }
}

fn eval_infix_expression(operator: InfixOperator, left: &Object, right: &Object) -> Object {
    match (left, right) {
        (Object::Integer(l), Object::Integer(r)) => eval_integer_infix_expression(operator, *l, *r),
        (Object::Str(l), Object::Str(r)) => match operator {
            InfixOperator::Plus => Object::Str(Rc::from(format!("{}{}", l, r))),
            _ => unknown_infix_operator(operator, left, right),
        },
        _ if operator == InfixOperator::Equal => Object::from_bool(left.is_identical(right)),
        _ if operator == InfixOperator::NotEqual => Object::from_bool(!left.is_identical(right)),
        _ if left.object_type() != right.object_type() => Object::error(format!(
            "type mismatch: {} {} {}",
            left.object_type(),
            operator,
            right.object_type()
        )),
        _ => unknown_infix_operator(operator, left, right),
    }
}

fn unknown_infix_operator(operator: InfixOperator, left: &Object, right: &Object) -> Object {
    Object::error(format!(
        "unknown operator: {} {} {}",
        left.object_type(),
        operator,
        right.object_type()
    ))
}

// Arithmetic wraps on overflow.
fn eval_integer_infix_expression(operator: InfixOperator, l: i64, r: i64) -> Object {
    match operator {
        InfixOperator::Plus => Object::Integer(l.wrapping_add(r)),
        InfixOperator::Minus => Object::Integer(l.wrapping_sub(r)),
        InfixOperator::Times => Object::Integer(l.wrapping_mul(r)),
        InfixOperator::Divide if r == 0 => Object::error("division by zero"),
        InfixOperator::Divide => Object::Integer(l.wrapping_div(r)),
        InfixOperator::LessThan => Object::from_bool(l < r),
        InfixOperator::GreaterThan => Object::from_bool(l > r),
        InfixOperator::Equal => Object::from_bool(l == r),
        InfixOperator::NotEqual => Object::from_bool(l != r),
    }
}

fn eval_index_expression(left: &Object, index: &Object) -> Object {
    match (left, index) {
        (Object::Array(elements), Object::Integer(i)) => usize::try_from(*i)
            .ok()
            .and_then(|i| elements.get(i))
            .cloned()
            .unwrap_or(NULL),
        (Object::Hash(hash), _) => match index.hash_key() {
            Some(key) => hash.get(&key).cloned().unwrap_or(NULL),
            None => unusable_as_hash_key(index),
        },
        _ => Object::error(format!(
            "index operator not supported: {}",
            left.object_type()
        )),
    }
}

#[cfg(test)]
mod test;
