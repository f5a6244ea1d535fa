mod helpers;

use whisker::{value, Engine, ErrorKind, Map, Value};

use crate::helpers::Writer;

#[test]
fn render_literal_text_unchanged() {
    let engine = Engine::new();
    let source = "lorem ipsum\n  dolor { sit } amet\r\n";
    let result = engine
        .compile(source)
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, source);
}

#[test]
fn render_expressions_across_lines() {
    let engine = Engine::new();
    let result = engine
        .compile("Goodbye\n{{cruel}}\n{{world}}!")
        .unwrap()
        .render(&engine, value! { cruel: "cruel", world: "world" })
        .to_string()
        .unwrap();
    assert_eq!(result, "Goodbye\ncruel\nworld!");
}

#[test]
fn render_escaped_expression() {
    let engine = Engine::new();
    let result = engine
        .compile("{{awesome}}")
        .unwrap()
        .render(&engine, value! { awesome: "&\"'<>" })
        .to_string()
        .unwrap();
    assert_eq!(result, "&amp;&quot;&#x27;&lt;&gt;");
}

#[test]
fn render_escapes_backtick() {
    let engine = Engine::new();
    let result = engine
        .compile("{{x}}")
        .unwrap()
        .render(&engine, value! { x: "a`b" })
        .to_string()
        .unwrap();
    assert_eq!(result, "a&#x60;b");
}

#[test]
fn render_unescaped_expressions() {
    let engine = Engine::new();
    let template = engine.compile("{{{x}}} {{&x}}").unwrap();
    let result = template
        .render(&engine, value! { x: "<b>&</b>" })
        .to_string()
        .unwrap();
    assert_eq!(result, "<b>&</b> <b>&</b>");
}

#[test]
fn render_scalars() {
    let engine = Engine::new();
    let result = engine
        .compile("{{a}} {{b}} {{c}} {{d}} [{{e}}]")
        .unwrap()
        .render(&engine, value! { a: true, b: 42, c: 1.5, d: "s", e: None })
        .to_string()
        .unwrap();
    assert_eq!(result, "true 42 1.5 s []");
}

#[test]
fn render_list_is_comma_joined() {
    let engine = Engine::new();
    let result = engine
        .compile("{{xs}}")
        .unwrap()
        .render(&engine, value! { xs: [1, "<a>", true] })
        .to_string()
        .unwrap();
    assert_eq!(result, "1,&lt;a&gt;,true");
}

#[test]
fn render_map_as_object() {
    let engine = Engine::new();
    let result = engine
        .compile("{{m}}")
        .unwrap()
        .render(&engine, value! { m: { a: 1 } })
        .to_string()
        .unwrap();
    assert_eq!(result, "[object Object]");
}

#[test]
fn render_paths() {
    let engine = Engine::new();
    let result = engine
        .compile("{{a.b}} {{a/b}} {{xs.1}} {{xs.[0]}} {{this.a.b}} {{[odd key]}}")
        .unwrap()
        .render(
            &engine,
            value! { a: { b: "c" }, xs: ["x", "y"], "odd key": "ok" },
        )
        .to_string()
        .unwrap();
    assert_eq!(result, "c c y x c ok");
}

#[test]
fn render_absent_values_are_empty() {
    let engine = Engine::new();
    let result = engine
        .compile("[{{missing}}][{{a.b.c}}][{{xs.9}}][{{../up}}]")
        .unwrap()
        .render(&engine, value! { a: "str", xs: [] })
        .to_string()
        .unwrap();
    assert_eq!(result, "[][][][]");
}

#[test]
fn render_comments_are_dropped() {
    let engine = Engine::new();
    let result = engine
        .compile("a{{! hidden }}b{{!-- {{x}} }} --}}c")
        .unwrap()
        .render(&engine, value! { x: 1 })
        .to_string()
        .unwrap();
    assert_eq!(result, "abc");
}

#[test]
fn render_section_over_list() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#goodbyes}}{{text}}! {{/goodbyes}}cruel {{world}}!")
        .unwrap()
        .render(
            &engine,
            value! { goodbyes: [{ text: "Hi" }, { text: "Bye" }], world: "world" },
        )
        .to_string()
        .unwrap();
    assert_eq!(result, "Hi! Bye! cruel world!");
}

#[test]
fn render_inverted_section() {
    let engine = Engine::new();
    let template = engine
        .compile("{{^set}}not set{{/set}} :: {{#set}}set{{/set}}")
        .unwrap();
    let result = template
        .render(&engine, value! { set: true })
        .to_string()
        .unwrap();
    assert_eq!(result, " :: set");
    let result = template
        .render(&engine, value! { set: false })
        .to_string()
        .unwrap();
    assert_eq!(result, "not set :: ");
}

#[test]
fn render_section_over_map_pushes_context() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#person}}{{name}} of {{../town}}{{/person}}")
        .unwrap()
        .render(&engine, value! { person: { name: "Ann" }, town: "Oslo" })
        .to_string()
        .unwrap();
    assert_eq!(result, "Ann of Oslo");
}

#[test]
fn render_section_else() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#xs}}item{{else}}empty{{/xs}}")
        .unwrap()
        .render(&engine, value! { xs: [] })
        .to_string()
        .unwrap();
    assert_eq!(result, "empty");
}

#[test]
fn render_each_list_with_loop_variables() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#each xs}}{{@index}}:{{.}}{{#if @last}}.{{else}},{{/if}}{{/each}}")
        .unwrap()
        .render(&engine, value! { xs: ["a", "b", "c"] })
        .to_string()
        .unwrap();
    assert_eq!(result, "0:a,1:b,2:c.");
}

#[test]
fn render_each_first() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#each xs}}{{#unless @first}}, {{/unless}}{{this}}{{/each}}")
        .unwrap()
        .render(&engine, value! { xs: [1, 2, 3] })
        .to_string()
        .unwrap();
    assert_eq!(result, "1, 2, 3");
}

#[test]
fn render_each_map_in_insertion_order() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#each m}}{{@key}}={{this}};{{/each}}")
        .unwrap()
        .render(&engine, value! { m: { z: 1, a: 2, m: 3 } })
        .to_string()
        .unwrap();
    assert_eq!(result, "z=1;a=2;m=3;");
}

#[test]
fn render_each_or_else() {
    let engine = Engine::new();
    let template = engine.compile("{{#each xs}}A{{^}}B{{/each}}").unwrap();
    for (ctx, expected) in [
        (value! { xs: [1, 2, 3] }, "AAA"),
        (value! { xs: [] }, "B"),
        (value! {}, "B"),
        (value! { xs: 5 }, "B"),
    ] {
        let result = template.render_from(&engine, &ctx).to_string().unwrap();
        assert_eq!(result, expected);
    }
}

#[test]
fn render_each_parent_chain() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#each items}}{{../v}}{{v}}{{/each}}")
        .unwrap()
        .render(&engine, value! { v: "o", items: [{ v: "i" }, { v: "j" }] })
        .to_string()
        .unwrap();
    assert_eq!(result, "oioj");
}

#[test]
fn render_each_nested_parent_chain() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#each rows}}{{#each cols}}{{../../v}}{{../name}}{{this}} {{/each}}{{/each}}")
        .unwrap()
        .render(
            &engine,
            value! { v: "!", rows: [{ name: "r", cols: [1, 2] }] },
        )
        .to_string()
        .unwrap();
    assert_eq!(result, "!r1 !r2 ");
}

#[test]
fn render_nested_loop_index() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#each a}}{{#each b}}{{@../index}}{{@../@index}}{{@index}} {{/each}}{{/each}}")
        .unwrap()
        .render(&engine, value! { a: [{ b: [0, 0] }, { b: [0] }] })
        .to_string()
        .unwrap();
    assert_eq!(result, "000 001 110 ");
}

#[test]
fn render_root_and_parent_specials() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#with inner}}{{@root.title}}/{{@_parent.title}}/{{name}}{{/with}}")
        .unwrap()
        .render(&engine, value! { title: "T", inner: { name: "n" } })
        .to_string()
        .unwrap();
    assert_eq!(result, "T/T/n");
}

#[test]
fn render_if_falsy_values() {
    let engine = Engine::new();
    let template = engine.compile("{{#if v}}yes{{else}}no{{/if}}").unwrap();
    for v in [
        Value::None,
        Value::Bool(false),
        Value::Integer(0),
        Value::Float(0.0),
        Value::from(""),
        Value::List(Vec::new()),
        Value::Map(Map::new()),
    ] {
        let ctx = Value::from([("v", v)]);
        let result = template.render_from(&engine, &ctx).to_string().unwrap();
        assert_eq!(result, "no");
    }
    let result = template
        .render(&engine, value! { v: "x" })
        .to_string()
        .unwrap();
    assert_eq!(result, "yes");
}

#[test]
fn render_unless() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#unless a}}A{{/unless}}{{#unless b}}B{{else}}b{{/unless}}")
        .unwrap()
        .render(&engine, value! { a: false, b: 1 })
        .to_string()
        .unwrap();
    assert_eq!(result, "Ab");
}

#[test]
fn render_with() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#with person}}{{first}} {{last}}{{/with}}")
        .unwrap()
        .render(&engine, value! { person: { first: "Ada", last: "Lovelace" } })
        .to_string()
        .unwrap();
    assert_eq!(result, "Ada Lovelace");
}

#[test]
fn render_lookup() {
    let engine = Engine::new();
    let result = engine
        .compile("{{lookup xs 1}} {{lookup m key}} [{{lookup m 'nope'}}]")
        .unwrap()
        .render(
            &engine,
            value! { xs: ["a", "b"], m: { k: "v" }, key: "k" },
        )
        .to_string()
        .unwrap();
    assert_eq!(result, "b v []");
}

#[test]
fn render_block_output_is_not_escaped_again() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#if t}}<{{x}}>{{/if}}")
        .unwrap()
        .render(&engine, value! { t: true, x: "&" })
        .to_string()
        .unwrap();
    assert_eq!(result, "<&amp;>");
}

#[test]
fn render_raw_block_without_helper() {
    let engine = Engine::new();
    let result = engine
        .compile("{{{{raw}}}} {{x}} {{#if}} {{{{/raw}}}}!")
        .unwrap()
        .render(&engine, value! { x: 1 })
        .to_string()
        .unwrap();
    assert_eq!(result, " {{x}} {{#if}} !");
}

#[test]
fn render_literal_arguments() {
    let engine = Engine::new();
    let result = engine
        .compile(r#"{{lookup m "a b"}}|{{#if true}}t{{/if}}|{{#if null}}n{{/if}}|{{#if undefined}}u{{/if}}|{{lookup xs -0}}"#)
        .unwrap()
        .render(&engine, value! { m: { "a b": "ab" }, xs: ["z"] })
        .to_string()
        .unwrap();
    assert_eq!(result, "ab|t|||z");
}

#[test]
fn render_standalone_block_lines() {
    let engine = Engine::new();
    let result = engine
        .compile("{{#if a}}\nyes\n{{/if}}\nafter")
        .unwrap()
        .render(&engine, value! { a: true })
        .to_string()
        .unwrap();
    assert_eq!(result, "yes\nafter");
}

#[test]
fn render_standalone_indented_with_trailing_whitespace() {
    let engine = Engine::new();
    let result = engine
        .compile("  {{#if a}}  \n    body\n  {{/if}}  \nend")
        .unwrap()
        .render(&engine, value! { a: true })
        .to_string()
        .unwrap();
    assert_eq!(result, "    body\nend");
}

#[test]
fn render_standalone_else() {
    let engine = Engine::new();
    let template = engine
        .compile("{{#if a}}\nx\n{{else}}\ny\n{{/if}}\nz")
        .unwrap();
    let result = template
        .render(&engine, value! { a: true })
        .to_string()
        .unwrap();
    assert_eq!(result, "x\nz");
    let result = template
        .render(&engine, value! { a: false })
        .to_string()
        .unwrap();
    assert_eq!(result, "y\nz");
}

#[test]
fn render_inline_block_keeps_whitespace() {
    let engine = Engine::new();
    let result = engine
        .compile("a {{#if b}} c {{/if}} d")
        .unwrap()
        .render(&engine, value! { b: true })
        .to_string()
        .unwrap();
    assert_eq!(result, "a  c  d");
}

#[test]
fn render_unresolved_helper_with_arguments() {
    let engine = Engine::new();
    let err = engine
        .compile("line\n{{nope 1}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnresolvedHelper);
    assert_eq!(err.line(), Some(2));
    assert!(err
        .to_string()
        .starts_with("could not find helper or property `nope`"));
}

#[test]
fn render_missing_name_with_only_keywords_is_empty() {
    let engine = Engine::new();
    let result = engine
        .compile("[{{nope a=1}}]")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap();
    assert_eq!(result, "[]");
}

#[test]
fn render_block_helper_inline_is_an_error() {
    let engine = Engine::new();
    let err = engine
        .compile("{{if true}}")
        .unwrap()
        .render(&engine, value! {})
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Render);
    assert!(err
        .to_string()
        .starts_with("helper `if` can only be used as a block"));
}

#[test]
fn render_from_value() {
    let engine = Engine::new();
    let ctx = Value::from([("ipsum", Value::from([("dolor", "test")]))]);
    let result = engine
        .compile("lorem {{ ipsum.dolor }}")
        .unwrap()
        .render_from(&engine, &ctx)
        .to_string()
        .unwrap();
    assert_eq!(result, "lorem test");
}

#[test]
fn render_to_writer() {
    let engine = Engine::new();
    let mut w = Writer::new();
    engine
        .compile("lorem {{ ipsum }}")
        .unwrap()
        .render(&engine, value! { ipsum: "dolor" })
        .to_writer(&mut w)
        .unwrap();
    assert_eq!(w.into_string(), "lorem dolor");
}

#[test]
fn render_to_writer_io_error() {
    let engine = Engine::new();
    let err = engine
        .compile("lorem {{ ipsum }}")
        .unwrap()
        .render(&engine, value! { ipsum: "dolor" })
        .to_writer(Writer::failing_after(1))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Io);
    let source = std::error::Error::source(&err).unwrap();
    assert_eq!(source.to_string(), "broken pipe");
}

#[test]
fn render_serialize_error_surfaces_on_render() {
    let engine = Engine::new();
    let err = engine
        .compile("{{x}}")
        .unwrap()
        .render(&engine, u64::MAX)
        .to_string()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
}

#[test]
fn render_struct_context() {
    #[derive(serde::Serialize)]
    struct Ctx {
        user: User,
    }

    #[derive(serde::Serialize)]
    struct User {
        name: String,
        tags: Vec<&'static str>,
    }

    let engine = Engine::new();
    let result = engine
        .compile("{{user.name}}: {{#each user.tags}}#{{this}} {{/each}}")
        .unwrap()
        .render(
            &engine,
            Ctx {
                user: User {
                    name: "Ann".into(),
                    tags: vec!["a", "b"],
                },
            },
        )
        .to_string()
        .unwrap();
    assert_eq!(result, "Ann: #a #b ");
}
