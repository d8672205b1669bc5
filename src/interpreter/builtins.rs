use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;

use derivative::Derivative;
use once_cell::sync::Lazy;

use super::object::{Object, NULL};

type BuiltinFn = fn(&[Object], &mut dyn Write) -> Object;

#[derive(Derivative)]
#[derivative(Debug)]
pub struct Builtin {
    pub name: &'static str,
    #[derivative(Debug = "ignore")]
    func: BuiltinFn,
}

impl Builtin {
    pub fn call(&self, args: &[Object], out: &mut dyn Write) -> Object {
        (self.func)(args, out)
    }
}

const BUILTINS: [Builtin; 6] = [
    Builtin { name: "len", func: len },
    Builtin { name: "first", func: first },
    Builtin { name: "last", func: last },
    Builtin { name: "rest", func: rest },
    Builtin { name: "push", func: push },
    Builtin { name: "puts", func: puts },
];

static TABLE: Lazy<HashMap<&'static str, Builtin>> = Lazy::new(|| {
    BUILTINS
        .into_iter()
        .map(|builtin| (builtin.name, builtin))
        .collect()
});

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    Lazy::force(&TABLE).get(name)
}

fn wrong_arity(got: usize, want: usize) -> Object {
    Object::error(format!(
        "wrong number of arguments. wanted {} got {}",
        want, got
    ))
}

fn len(args: &[Object], _: &mut dyn Write) -> Object {
    if args.len() != 1 {
        return Object::error(format!(
            "wrong number of arguments. got={}, want=1",
            args.len()
        ));
    }
    match &args[0] {
        Object::Str(value) => Object::Integer(value.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => Object::error(format!(
            "argument to `len` not supported, got {}",
            other.object_type()
        )),
    }
}

fn first(args: &[Object], _: &mut dyn Write) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(NULL),
        _ => Object::error("arguments to `first` must be ARRAY"),
    }
}

fn last(args: &[Object], _: &mut dyn Write) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(NULL),
        _ => Object::error("arguments to `last` must be ARRAY"),
    }
}

fn rest(args: &[Object], _: &mut dyn Write) -> Object {
    if args.len() != 1 {
        return wrong_arity(args.len(), 1);
    }
    match &args[0] {
        Object::Array(elements) if elements.is_empty() => NULL,
        Object::Array(elements) => Object::Array(Rc::new(elements[1..].to_vec())),
        _ => Object::error("arguments to `rest` must be ARRAY"),
    }
}

fn push(args: &[Object], _: &mut dyn Write) -> Object {
    if args.len() != 2 {
        return wrong_arity(args.len(), 2);
    }
    match &args[0] {
        Object::Array(elements) => {
            let mut elements = elements.to_vec();
            elements.push(args[1].clone());
            Object::Array(Rc::new(elements))
        }
        _ => Object::error("first argument to `push` must be ARRAY"),
    }
}

fn puts(args: &[Object], out: &mut dyn Write) -> Object {
    for arg in args {
        if let Err(err) = writeln!(out, "{}", arg) {
            return Object::error(format!("could not write output: {}", err));
        }
    }
    NULL
}
