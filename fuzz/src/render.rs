#![no_main]

use std::collections::BTreeMap;

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use serde::Serialize;

#[derive(Debug, Serialize, Arbitrary)]
enum Value {
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

fuzz_target!(|data: (&str, Vec<(&str, &str)>, Value)| {
    let (root, partials, value) = data;
    let mut engine = whisker::Engine::new();
    engine.set_max_partial_depth(8);
    for (name, source) in partials {
        let _ = engine.add_partial(name, source);
    }
    let Ok(template) = engine.compile(root) else {
        return;
    };
    let _ = template.render(&engine, &value).to_string();
});
