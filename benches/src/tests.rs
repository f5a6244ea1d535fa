use crate::context::{Context, User};
use crate::{Engine, Handlebars, Whisker, TEMPLATE};

fn render<'a, E: Engine<'a>>(source: &'a str, ctx: &Context) -> String {
    let mut engine = E::new();
    engine.add_template("bench", source);
    engine.render("bench", ctx)
}

fn fixture() -> Context {
    Context {
        title: "My awesome webpage!".to_owned(),
        users: vec![
            User {
                name: "Nancy Wheeler".to_owned(),
                age: 17,
                is_disabled: false,
            },
            User {
                name: "Steve Harrington".to_owned(),
                age: 18,
                is_disabled: false,
            },
            User {
                name: "Billy Hargrove".to_owned(),
                age: 19,
                is_disabled: true,
            },
        ],
    }
}

#[test]
fn whisker_renders_fixture() {
    let result = render::<Whisker>(TEMPLATE, &fixture());
    assert_eq!(
        result,
        "<html><head><title>My awesome webpage!</title></head><body><ul>\
         <li>0: Nancy Wheeler (17)</li>\
         <li>1: Steve Harrington (18)</li>\
         <li>2: Billy Hargrove (19) disabled</li>\
         </ul><footer>first: Nancy Wheeler</footer></body></html>"
    );
}

#[test]
fn whisker_matches_handlebars() {
    let ctx = fixture();
    assert_eq!(
        render::<Whisker>(TEMPLATE, &ctx),
        render::<Handlebars>(TEMPLATE, &ctx)
    );
}

#[test]
fn whisker_matches_handlebars_on_empty_list() {
    let ctx = Context {
        title: "empty".to_owned(),
        users: Vec::new(),
    };
    assert_eq!(
        render::<Whisker>(TEMPLATE, &ctx),
        render::<Handlebars>(TEMPLATE, &ctx)
    );
}
