use std::io;
use std::sync::{Arc, Mutex};

use whisker::{value, Call, Engine, Error, ErrorKind, Function, Helpers, Result, SafeString, Value};

fn shout(call: &Call<'_>) -> Result<String> {
    let s: &str = call.param_as(0)?;
    Ok(s.to_uppercase())
}

fn wrap(call: &Call<'_>) -> Result<SafeString> {
    let tag: &str = call.hash_as("tag")?;
    let mut out = SafeString::new();
    if let Some(options) = call.options() {
        out.push_str(&format!("<{tag}>"));
        out.push_str(options.render(call.this())?.as_str());
        out.push_str(&format!("</{tag}>"));
    }
    Ok(out)
}

#[test]
fn helper_inline() {
    let mut engine = Engine::new();
    engine.add_helper("shout", shout);
    let result = engine
        .compile("{{shout name}}!")
        .unwrap()
        .render(&engine, value! { name: "hey" })
        .to_string()
        .unwrap();
    assert_eq!(result, "HEY!");
}

#[test]
fn helper_string_result_is_escaped() {
    let mut engine = Engine::new();
    engine.add_helper("tag", |_: &Call<'_>| "<br>");
    engine.add_helper("safe", |_: &Call<'_>| SafeString::from("<br>"));
    let result = engine
        .compile("{{tag}} {{safe}} {{{tag}}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, "&lt;br&gt; <br> <br>");
}

#[test]
fn helper_block_with_hash() {
    let mut engine = Engine::new();
    engine.add_helper("wrap", wrap);
    let result = engine
        .compile(r#"{{#wrap tag="em"}}{{name}}{{/wrap}}"#)
        .unwrap()
        .render(&engine, value! { name: "<Ann>" })
        .to_string()
        .unwrap();
    assert_eq!(result, "<em>&lt;Ann&gt;</em>");
}

#[test]
fn helper_block_inverse() {
    let mut engine = Engine::new();
    engine.add_helper("either", |call: &Call<'_>| -> Result<SafeString> {
        let options = call.options().ok_or_else(|| Error::custom("block only"))?;
        match call.param_as::<bool>(0)? {
            true => options.render(call.this()),
            false => options.inverse(call.this()),
        }
    });
    let template = engine
        .compile("{{#either flag}}yes{{else}}no{{/either}}|{{^either flag}}yes{{else}}no{{/either}}")
        .unwrap();
    let result = template
        .render(&engine, value! { flag: true })
        .to_string()
        .unwrap();
    assert_eq!(result, "yes|no");
}

#[test]
fn helper_hash_pairs_keep_order() {
    let mut engine = Engine::new();
    engine.add_helper("attrs", |call: &Call<'_>| {
        call.hash_pairs()
            .map(|(k, v)| format!("{k}={}", v.as_str().unwrap_or("?")))
            .collect::<Vec<_>>()
            .join(" ")
    });
    let result = engine
        .compile(r#"{{attrs z="1" a="2" m=name}}"#)
        .unwrap()
        .render(&engine, value! { name: "3" })
        .to_string()
        .unwrap();
    assert_eq!(result, "z=1 a=2 m=3");
}

#[test]
fn helper_subexpressions() {
    let mut engine = Engine::new();
    engine.add_helper("add", |call: &Call<'_>| -> Result<i64> {
        Ok(call.param_as::<i64>(0)? + call.param_as::<i64>(1)?)
    });
    let result = engine
        .compile("{{add (add 1 2) (add n 4)}}")
        .unwrap()
        .render(&engine, value! { n: 3 })
        .to_string()
        .unwrap();
    assert_eq!(result, "10");
}

fn echo(call: &Call<'_>) -> Result<String> {
    let s: &str = call.param_as(0)?;
    Ok(s.to_owned())
}

#[test]
fn helper_string_literal_escaped_quotes() {
    let mut engine = Engine::new();
    engine.add_helper("echo", echo);
    let result = engine
        .compile(r#"{{{echo "\"world\""}}} {{{echo 'it\'s'}}} {{{echo 'a\"b\n'}}}"#)
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, r#""world" it's a\"b\n"#);
}

#[test]
fn helper_string_literal_backslash_only_escapes_quote() {
    let mut engine = Engine::new();
    engine.add_helper("echo", echo);
    let result = engine
        .compile(r#"{{echo "\\""}}"#)
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, r"\&quot;");
}

#[test]
fn helper_string_literal_cannot_escape_the_tag() {
    let mut engine = Engine::new();
    engine.add_helper("echo", echo);
    let template = "{{echo \"\\\\\")\n\n        raise AssertionError('Code Injected!')\n#\"}}";
    let result = engine
        .compile(template)
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(
        result,
        "\\&quot;)\n\n        raise AssertionError(&#x27;Code Injected!&#x27;)\n#"
    );
}

#[test]
fn helper_shadows_context() {
    let mut engine = Engine::new();
    engine.add_helper("name", |_: &Call<'_>| "helper");
    let result = engine
        .compile("{{name}} {{#name}}block{{/name}} {{this.name}} {{./name}}")
        .unwrap()
        .render(&engine, value! { name: "context" })
        .to_string()
        .unwrap();
    assert_eq!(result, "helper helper context context");
}

#[test]
fn helper_value_registered() {
    let mut engine = Engine::new();
    engine.add_helper_value("site", "whisker");
    let result = engine
        .compile("{{site}} {{#site}}{{this}}{{/site}}")
        .unwrap()
        .render(&engine, value! { site: "other" })
        .to_string()
        .unwrap();
    assert_eq!(result, "whisker whisker");
}

#[test]
fn helper_overrides_builtin() {
    let mut engine = Engine::new();
    engine.add_helper("if", |_: &Call<'_>| "custom");
    let result = engine
        .compile("{{#if false}}x{{/if}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, "custom");
}

#[test]
fn helper_per_render_overlay() {
    let mut engine = Engine::new();
    engine.add_helper("greet", |_: &Call<'_>| "engine");
    let mut local = Helpers::new();
    local.register("greet", |_: &Call<'_>| "local");
    let template = engine.compile("{{greet}}").unwrap();

    let result = template
        .render(&engine, value! {})
        .with_helpers(&local)
        .to_string()
        .unwrap();
    assert_eq!(result, "local");

    let result = template.render(&engine, value! {}).to_string().unwrap();
    assert_eq!(result, "engine");
}

#[test]
fn helper_context_lambda() {
    let engine = Engine::new();
    let greet = Function::new(|call: &Call<'_>| -> Result<String> {
        let name: &str = call.this().value().get("name").map_or(Ok(""), |v| {
            v.as_str().ok_or_else(|| Error::custom("name must be a string"))
        })?;
        Ok(format!("hi {name}"))
    });
    let ctx = value! { name: "Jo", greet: greet };
    let result = engine
        .compile("{{greet}}|{{#if greet}}t{{/if}}")
        .unwrap()
        .render_from(&engine, &ctx)
        .to_string()
        .unwrap();
    assert_eq!(result, "hi Jo|t");
}

#[test]
fn helper_lambda_in_block_uses_block_helper_missing() {
    let engine = Engine::new();
    let items = Function::new(|_: &Call<'_>| Value::from(vec![1, 2]));
    let ctx = value! { items: items };
    let result = engine
        .compile("{{#items}}<{{this}}>{{/items}}")
        .unwrap()
        .render_from(&engine, &ctx)
        .to_string()
        .unwrap();
    assert_eq!(result, "<1><2>");
}

#[test]
fn helper_call_invokes_lambda_param() {
    let mut engine = Engine::new();
    engine.add_helper("run", |call: &Call<'_>| -> Result<Value> {
        match call.param(0) {
            Some(Value::Fn(f)) => call.call(f),
            _ => Ok(Value::None),
        }
    });
    let ctx = value! { f: Function::new(|_: &Call<'_>| 7_i64) };
    let result = engine
        .compile("{{run f}}")
        .unwrap()
        .render_from(&engine, &ctx)
        .to_string()
        .unwrap();
    assert_eq!(result, "7");
}

#[test]
fn helper_missing_override() {
    let mut engine = Engine::new();
    engine.add_helper("helperMissing", |call: &Call<'_>| {
        format!("[{} {}]", call.name(), call.params().len())
    });
    let result = engine
        .compile("{{foo}} {{bar 1 2}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, "[foo 0] [bar 2]");
}

#[test]
fn helper_block_missing_override() {
    let mut engine = Engine::new();
    engine.add_helper("blockHelperMissing", |call: &Call<'_>| {
        format!("{}={}", call.name(), call.param(0).map_or("?", Value::human))
    });
    let result = engine
        .compile("{{#thing}}x{{/thing}}")
        .unwrap()
        .render(&engine, value! { thing: [1] })
        .to_string()
        .unwrap();
    assert_eq!(result, "thing=list");
}

#[test]
fn helper_returns_option() {
    let mut engine = Engine::new();
    engine.add_helper("maybe", |call: &Call<'_>| {
        call.param(0).and_then(Value::as_str).map(str::to_owned)
    });
    let result = engine
        .compile("[{{maybe a}}][{{maybe b}}]")
        .unwrap()
        .render(&engine, value! { a: "x", b: 1 })
        .to_string()
        .unwrap();
    assert_eq!(result, "[x][]");
}

#[test]
fn helper_error_propagates_unchanged() {
    let mut engine = Engine::new();
    engine.add_helper("fail", |_: &Call<'_>| -> Result<String> {
        Err(Error::custom("boom"))
    });
    let err = engine
        .compile("a {{fail}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Helper);
    assert_eq!(err.to_string(), "boom");
    assert_eq!(err.line(), None);
}

#[test]
fn helper_error_wraps_source() {
    let mut engine = Engine::new();
    engine.add_helper("io", |_: &Call<'_>| -> Result<String> {
        Err(Error::helper(io::Error::new(io::ErrorKind::Other, "disk")))
    });
    let err = engine
        .compile("{{io}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Helper);
    assert_eq!(err.to_string(), "disk");
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn helper_param_type_error() {
    let mut engine = Engine::new();
    engine.add_helper("shout", shout);
    let err = engine
        .compile("{{shout 1}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Helper);
    assert_eq!(
        err.to_string(),
        "helper `shout` expected string argument, found integer at line 1, column 9"
    );
}

#[test]
fn helper_options_accessors() {
    let mut engine = Engine::new();
    engine.add_partial("card", "card").unwrap();
    engine.add_helper("probe", |call: &Call<'_>| -> Result<String> {
        let options = call.options().ok_or_else(|| Error::custom("block only"))?;
        Ok(format!(
            "{} {} {} {}",
            options.helper("each").is_some(),
            options.has_partial("card"),
            options.has_partial("nope"),
            options.root().get("title").and_then(Value::as_str).unwrap_or(""),
        ))
    });
    let result = engine
        .compile("{{#probe}}{{/probe}}")
        .unwrap()
        .render(&engine, value! { title: "T" })
        .to_string()
        .unwrap();
    assert_eq!(result, "true true false T");
}

#[test]
fn helper_log_forwards_to_logger() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let mut engine = Engine::new();
    engine.set_logger(move |value: &Value| sink.lock().unwrap().push(value.clone()));
    let result = engine
        .compile("a{{log msg}}b")
        .unwrap()
        .render(&engine, value! { msg: "hello" })
        .to_string()
        .unwrap();
    assert_eq!(result, "ab");
    assert_eq!(*seen.lock().unwrap(), vec![Value::from("hello")]);
}

#[test]
fn helper_log_without_logger_is_silent() {
    let engine = Engine::new();
    let result = engine
        .compile("{{log 1}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, "");
}

#[test]
fn helper_raw_block() {
    let mut engine = Engine::new();
    engine.add_helper("raw", |call: &Call<'_>| -> Result<SafeString> {
        let options = call.options().ok_or_else(|| Error::custom("block only"))?;
        let mut out = options.render(call.this())?;
        out.push_str("!");
        Ok(out)
    });
    let result = engine
        .compile("{{{{raw}}}}{{x}} <b>{{{{/raw}}}}")
        .unwrap()
        .render(&engine, value! { x: 1 })
        .to_string()
        .unwrap();
    assert_eq!(result, "{{x}} <b>!");
}
