//! Helper dispatch and the render step for each kind of tag.
//!
//! Simple names are looked up as helpers before the scope, complex paths
//! only ever resolve structurally. Callable values are invoked with a
//! [`Call`] built from the current scope and the evaluated arguments.

use std::borrow::Cow;
use std::fmt::Write;

use crate::fmt::{self, Formatter};
use crate::helpers::{Body, Call, Options};
use crate::render::{Env, Scope};
use crate::types::ast;
use crate::types::program::{
    Args, BlockCall, Callee, Expr, Param, PartialCall, PartialName, RawCall,
};
use crate::value::{Map, ValueCow};
use crate::{Error, ErrorKind, Function, Result, Value};

/// `{{name args}}` and `{{{name args}}}`
pub(crate) fn expand(
    f: &mut Formatter<'_>,
    source: &str,
    callee: &Callee,
    escape: bool,
    scope: &Scope<'_>,
    env: &Env<'_>,
) -> Result<()> {
    let value = eval_callee(source, callee, scope, env)?;
    fmt::write_expr(f, &value, escape)?;
    Ok(())
}

/// `{{#name args}}...{{/name}}` and `{{^name args}}...{{/name}}`
pub(crate) fn block(
    f: &mut Formatter<'_>,
    source: &str,
    block: &BlockCall,
    scope: &Scope<'_>,
    env: &Env<'_>,
) -> Result<()> {
    let body = Body::Block(&block.body);
    let inverse = block.inverse.as_ref().map_or(Body::Empty, Body::Block);
    let (fn_, inverse) = match block.inverted {
        true => (inverse, body),
        false => (body, inverse),
    };
    let options = Options {
        fn_,
        inverse,
        env: *env,
    };

    let callee = &block.callee;
    let helper = callee.path.as_simple().and_then(|name| env.helper(name));
    let result = match helper {
        Some(Value::Fn(func)) => invoke(func, source, callee, scope, env, Some(options))?,
        Some(value) => block_missing(source, callee, value.into(), scope, env, options)?,
        None => {
            let value = resolve(&callee.path, scope).unwrap_or_default();
            block_missing(source, callee, value, scope, env, options)?
        }
    };
    fmt::write_block(f, &result)?;
    Ok(())
}

/// `{{{{name args}}}}...{{{{/name}}}}`
pub(crate) fn raw_block(
    f: &mut Formatter<'_>,
    source: &str,
    raw: &RawCall,
    scope: &Scope<'_>,
    env: &Env<'_>,
) -> Result<()> {
    let value = lookup(&raw.callee.path, scope, env);
    match value.as_deref() {
        Some(Value::Fn(func)) => {
            let options = Options {
                fn_: Body::Raw(&raw.raw),
                inverse: Body::Empty,
                env: *env,
            };
            let result = invoke(func, source, &raw.callee, scope, env, Some(options))?;
            fmt::write_block(f, &result)?;
        }
        _ => f.write_str(&raw.raw)?,
    }
    Ok(())
}

/// `{{> name arg key=value}}`
pub(crate) fn partial(
    f: &mut Formatter<'_>,
    source: &str,
    partial: &PartialCall,
    scope: &Scope<'_>,
    env: &Env<'_>,
) -> Result<()> {
    let name = match &partial.name {
        PartialName::Static(name) => Cow::Borrowed(name.as_str()),
        PartialName::Dynamic(callee) => {
            let value = eval_callee(source, callee, scope, env)?;
            Cow::Owned(fmt::to_text(&value))
        }
    };
    let template = env.partial(&name).ok_or_else(|| {
        Error::spanned(
            ErrorKind::MissingPartial,
            format!("unknown partial `{name}`"),
            source,
            partial.span,
        )
    })?;
    let inner = env.enter(source, partial.span)?;

    let base = match partial.args.params.first() {
        Some(param) => eval_param(source, param, scope, env)?,
        None => ValueCow::Borrowed(scope.value()),
    };
    let overrides = partial
        .args
        .hash
        .iter()
        .map(|(k, p)| Ok((k.clone(), eval_param(source, p, scope, env)?.into_owned())))
        .collect::<Result<Map>>()?;
    let child = scope.child(base).with_overrides(overrides);

    tracing::trace!(partial = %name, depth = inner.depth(), "rendering partial");
    template
        .block
        .render(f, &child, &inner)
        .map_err(|err| err.with_name(&name))
}

/// Evaluates an expression or subexpression to a value.
pub(crate) fn eval_callee<'r>(
    source: &'r str,
    callee: &'r Callee,
    scope: &'r Scope<'r>,
    env: &Env<'r>,
) -> Result<ValueCow<'r>> {
    let simple = callee.path.as_simple().is_some();
    let value = lookup(&callee.path, scope, env);
    if let Some(Value::Fn(func)) = value.as_deref() {
        return invoke(func, source, callee, scope, env, None).map(ValueCow::Owned);
    }
    match value {
        Some(value) if !value.is_none() => Ok(value),
        _ if simple => helper_missing(source, callee, scope, env),
        _ => Ok(ValueCow::Owned(Value::None)),
    }
}

/// Looks up a path, checking the helpers first for a simple name.
fn lookup<'r>(path: &ast::Path, scope: &'r Scope<'r>, env: &Env<'r>) -> Option<ValueCow<'r>> {
    match path {
        ast::Path::Simple(ident) => env
            .helper(&ident.name)
            .map(ValueCow::Borrowed)
            .or_else(|| scope.get(&ident.name)),
        ast::Path::Complex(segments, _) => scope.resolve(segments),
    }
}

/// Looks up a path in the scope only.
fn resolve<'r>(path: &ast::Path, scope: &'r Scope<'r>) -> Option<ValueCow<'r>> {
    match path {
        ast::Path::Simple(ident) => scope.get(&ident.name),
        ast::Path::Complex(segments, _) => scope.resolve(segments),
    }
}

fn helper_missing<'r>(
    source: &'r str,
    callee: &'r Callee,
    scope: &'r Scope<'r>,
    env: &Env<'r>,
) -> Result<ValueCow<'r>> {
    match env.helper("helperMissing") {
        Some(Value::Fn(func)) => invoke(func, source, callee, scope, env, None).map(ValueCow::Owned),
        Some(value) => Ok(ValueCow::Borrowed(value)),
        None => Ok(ValueCow::Owned(Value::None)),
    }
}

fn block_missing<'r>(
    source: &'r str,
    callee: &'r Callee,
    value: ValueCow<'r>,
    scope: &'r Scope<'r>,
    env: &Env<'r>,
    options: Options<'r>,
) -> Result<Value> {
    match env.helper("blockHelperMissing") {
        Some(Value::Fn(func)) => {
            let call = Call {
                name: &callee.name,
                this: scope,
                params: vec![value],
                hash: Vec::new(),
                options: Some(options),
                env: *env,
                source,
                span: callee.span,
                args: None,
            };
            func.call(&call)
        }
        Some(value) => Ok(value.clone()),
        None => Ok(Value::None),
    }
}

fn invoke<'r>(
    func: &Function,
    source: &'r str,
    callee: &'r Callee,
    scope: &'r Scope<'r>,
    env: &Env<'r>,
    options: Option<Options<'r>>,
) -> Result<Value> {
    let (params, hash) = eval_args(source, &callee.args, scope, env)?;
    let call = Call {
        name: &callee.name,
        this: scope,
        params,
        hash,
        options,
        env: *env,
        source,
        span: callee.span,
        args: Some(&callee.args),
    };
    func.call(&call)
}

type Evaluated<'r> = (Vec<ValueCow<'r>>, Vec<(&'r str, ValueCow<'r>)>);

fn eval_args<'r>(
    source: &'r str,
    args: &'r Args,
    scope: &'r Scope<'r>,
    env: &Env<'r>,
) -> Result<Evaluated<'r>> {
    let params = args
        .params
        .iter()
        .map(|p| eval_param(source, p, scope, env))
        .collect::<Result<_>>()?;
    let hash = args
        .hash
        .iter()
        .map(|(k, p)| Ok((k.as_str(), eval_param(source, p, scope, env)?)))
        .collect::<Result<_>>()?;
    Ok((params, hash))
}

fn eval_param<'r>(
    source: &'r str,
    param: &'r Param,
    scope: &'r Scope<'r>,
    env: &Env<'r>,
) -> Result<ValueCow<'r>> {
    match &param.expr {
        Expr::Const(value) => Ok(ValueCow::Borrowed(value)),
        Expr::Path(path) => Ok(resolve(path, scope).unwrap_or_default()),
        Expr::Call(callee) => eval_callee(source, callee, scope, env),
    }
}
