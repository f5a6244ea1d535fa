use whisker::{value, Engine, Precompiled};

#[test]
fn precompile_round_trip_through_json() {
    let mut engine = Engine::new();
    engine.add_partial("item", "<li>{{this}}</li>").unwrap();
    let source = "{{#if title}}\n<h1>{{title}}</h1>\n{{/if}}\n<ul>{{#each xs}}{{> item}}{{/each}}</ul>";

    let precompiled = engine.precompile(source).unwrap();
    let json = serde_json::to_string(&precompiled).unwrap();
    let loaded: Precompiled = serde_json::from_str(&json).unwrap();
    assert_eq!(loaded, precompiled);
    assert_eq!(loaded.source(), source);

    let ctx = value! { title: "<T>", xs: [1, 2] };
    let expected = engine
        .compile(source)
        .unwrap()
        .render(&engine, &ctx)
        .to_string()
        .unwrap();
    let result = engine
        .load_precompiled(loaded)
        .unwrap()
        .render(&engine, &ctx)
        .to_string()
        .unwrap();
    assert_eq!(result, expected);
    assert_eq!(result, "<h1>&lt;T&gt;</h1>\n<ul><li>1</li><li>2</li></ul>");
}

#[test]
fn precompile_reports_syntax_errors() {
    let engine = Engine::new();
    let err = engine.precompile("{{#if}}").unwrap_err();
    assert_eq!(err.kind(), whisker::ErrorKind::Syntax);
}

#[test]
fn precompile_rejects_spans_outside_source() {
    let engine = Engine::new();
    let precompiled = engine.precompile("Hello {{#if x}}{{name}}{{/if}}").unwrap();
    let mut json = serde_json::to_value(&precompiled).unwrap();
    json["source"] = serde_json::Value::from("Hi");
    let tampered: Precompiled = serde_json::from_value(json).unwrap();

    let err = engine.load_precompiled(tampered).unwrap_err();
    assert_eq!(err.kind(), whisker::ErrorKind::Syntax);
    assert!(err.to_string().starts_with("precompiled template has span"));
}
