// tests/template.rs

use fanexec::template::{Bindings, CommandTemplate, TemplateError};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn render(template: &str, args: &[&str]) -> Result<String, TemplateError> {
    let args = strings(args);
    let tmpl = CommandTemplate::parse(template)?;
    tmpl.render(Bindings {
        args: &args,
        arg: &args[0],
    })
}

#[test]
fn primary_arg() {
    assert_eq!(render("echo {{.Arg}}", &["host1", "22"]).unwrap(), "echo host1");
}

#[test]
fn full_args_render_as_a_list() {
    assert_eq!(render("echo {{.Args}}", &["a", "b", "c"]).unwrap(), "echo [a b c]");
}

#[test]
fn whitespace_inside_actions_is_ignored() {
    assert_eq!(
        render("ssh {{ .Arg }} -p {{  index .Args 1 }}", &["h", "2222"]).unwrap(),
        "ssh h -p 2222"
    );
}

#[test]
fn join_with_escaped_separator() {
    assert_eq!(render(r#"{{join .Args "-"}}"#, &["a", "b"]).unwrap(), "a-b");
    assert_eq!(render(r#"{{join .Args "\""}}"#, &["a", "b"]).unwrap(), "a\"b");
}

#[test]
fn text_without_actions_is_literal() {
    assert_eq!(render("uptime }} stray", &["x"]).unwrap(), "uptime }} stray");
}

#[test]
fn unclosed_action_is_a_syntax_error() {
    match CommandTemplate::parse("echo {{.Arg") {
        Err(TemplateError::Syntax { offset, message }) => {
            assert_eq!(offset, 5);
            assert!(message.contains("unclosed"));
        }
        other => panic!("Expected syntax error, got: {:?}", other),
    }
}

#[test]
fn join_separator_may_contain_the_closing_braces() {
    assert_eq!(render(r#"{{join .Args "}}"}}"#, &["a", "b"]).unwrap(), "a}}b");
    assert_eq!(
        render(r#"x {{ join .Args "\"}}" }} y {{.Arg}}"#, &["a", "b"]).unwrap(),
        "x a\"}}b y a"
    );
}

#[test]
fn unterminated_join_separator_is_unclosed() {
    match CommandTemplate::parse(r#"{{join .Args "}}"#) {
        Err(TemplateError::Syntax { message, .. }) => assert!(message.contains("unclosed")),
        other => panic!("Expected syntax error, got: {:?}", other),
    }
}

#[test]
fn unknown_field_parses_but_fails_to_bind() {
    let tmpl = CommandTemplate::parse("ssh {{.Host}}").unwrap();
    let args = strings(&["h"]);

    match tmpl.render(Bindings {
        args: &args,
        arg: &args[0],
    }) {
        Err(TemplateError::Binding(msg)) => assert!(msg.contains("Host")),
        other => panic!("Expected binding error, got: {:?}", other),
    }
}

#[test]
fn unknown_action_and_empty_action_are_syntax_errors() {
    assert!(matches!(
        CommandTemplate::parse("{{upper .Arg}}"),
        Err(TemplateError::Syntax { .. })
    ));
    assert!(matches!(
        CommandTemplate::parse("{{ }}"),
        Err(TemplateError::Syntax { .. })
    ));
}

#[test]
fn index_out_of_range_is_a_binding_error() {
    match render("{{index .Args 3}}", &["only"]) {
        Err(TemplateError::Binding(msg)) => assert!(msg.contains("out of range")),
        other => panic!("Expected binding error, got: {:?}", other),
    }
}

#[test]
fn source_is_kept() {
    let tmpl = CommandTemplate::parse("echo {{.Arg}}").unwrap();
    assert_eq!(tmpl.source(), "echo {{.Arg}}");
}
