use pretty_assertions::assert_eq;

use crate::ast::{ConstructorCallKind, Expr, Member, Stmt, TypeKind, Visibility};
use crate::visit;
use crate::{parse, parse_expression_fragment, parse_type_fragment};

fn slice(text: &str, range: jolt_core::TextRange) -> &str {
    &text[range.start..range.end]
}

#[test]
fn parses_class_with_methods_and_params() {
    let text = r#"package p;

import java.util.List;

public class A {
    private int count;

    protected List<String> names(final int a, String... rest) throws java.io.IOException {
        return null;
    }

    A(int x) {
        this.count = x;
    }
}
"#;
    let parse = parse(text);
    assert!(parse.diagnostics().is_empty(), "{:?}", parse.diagnostics());

    let unit = parse.compilation_unit();
    assert_eq!(unit.package_name(), "p");
    assert_eq!(unit.imports.len(), 1);
    assert_eq!(unit.imports[0].simple_name(), Some("List"));

    let class = &unit.types[0];
    assert_eq!(class.kind, TypeKind::Class);
    assert_eq!(class.name.text, "A");
    assert_eq!(class.modifiers.visibility(), Visibility::Public);

    let methods: Vec<_> = class.methods().collect();
    assert_eq!(methods.len(), 2);

    let names = methods[0];
    assert!(!names.is_constructor());
    assert_eq!(names.modifiers.visibility(), Visibility::Protected);
    assert_eq!(names.return_ty.as_ref().map(|ty| ty.text.as_str()), Some("List<String>"));
    assert_eq!(slice(text, names.params.range), "(final int a, String... rest)");
    assert_eq!(slice(text, names.params.params[0].range), "final int a");
    assert!(names.params.params[1].varargs);
    assert_eq!(names.params.params[1].type_text(), "String...");
    let throws = names.throws.as_ref().expect("throws clause");
    assert_eq!(slice(text, throws.range), "throws java.io.IOException");

    let ctor = methods[1];
    assert!(ctor.is_constructor());
    assert_eq!(ctor.modifiers.visibility(), Visibility::Package);
    assert_eq!(class.constructors().count(), 1);
}

#[test]
fn c_style_dimensions_on_parameters() {
    let text = "class A { void m(int a[][], String b) {} }";
    let parse = parse(text);
    assert!(!parse.has_errors());
    let method = parse.compilation_unit().types[0].methods().next().expect("method");
    let param = &method.params.params[0];
    assert_eq!(param.extra_dim_count, 2);
    assert_eq!(param.type_text(), "int[][]");
    assert_eq!(param.extra_dims.map(|range| slice(text, range)), Some("[][]"));
}

#[test]
fn explicit_constructor_calls_are_recognized() {
    let text = "class B extends A { B() { super(1); } B(int x) { this(); } B(String s) { foo(); } }";
    let parse = parse(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let kinds: Vec<_> = parse.compilation_unit().types[0]
        .constructors()
        .map(|ctor| ctor.explicit_constructor_call().map(|call| call.kind))
        .collect();
    assert_eq!(
        kinds,
        vec![
            Some(ConstructorCallKind::Super),
            Some(ConstructorCallKind::This),
            None
        ]
    );
}

#[test]
fn doc_comment_method_references() {
    let text = r#"class A {
    /**
     * Delegates to {@link #m(int, String s)}.
     * @see B#m
     * @see A
     */
    void n() {}
}
"#;
    let parse = parse(text);
    assert!(!parse.has_errors());
    let method = parse.compilation_unit().types[0].methods().next().expect("method");
    let doc = method.doc.as_ref().expect("doc comment");
    assert_eq!(doc.method_refs.len(), 2);

    let first = &doc.method_refs[0];
    assert!(first.qualifier.is_none());
    assert_eq!(first.name.text, "m");
    let params = first.params.as_ref().expect("param list");
    assert_eq!(slice(text, params.range), "(int, String s)");
    assert_eq!(params.params[0].ty.text, "int");
    assert!(params.params[0].name.is_none());
    assert_eq!(params.params[1].name.as_ref().map(|n| n.text.as_str()), Some("s"));

    let second = &doc.method_refs[1];
    assert_eq!(second.qualifier.as_ref().map(|q| q.text.as_str()), Some("B"));
    assert!(second.params.is_none());
}

#[test]
fn enum_constants_with_arguments_and_bodies() {
    let text = "enum E { A(1), B { void x() {} }, C; E(int v) {} E() {} }";
    let parse = parse(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let decl = &parse.compilation_unit().types[0];
    let constants: Vec<_> = decl
        .body
        .members
        .iter()
        .filter_map(|member| match member {
            Member::EnumConstant(constant) => Some(constant),
            _ => None,
        })
        .collect();
    assert_eq!(constants.len(), 3);
    assert_eq!(constants[0].args.as_ref().map(|args| args.args.len()), Some(1));
    assert!(constants[1].args.is_none());
    assert!(constants[1].body.is_some());
    assert_eq!(decl.constructors().count(), 2);
}

#[test]
fn statements_and_expressions_parse_without_errors() {
    let text = r#"class A {
    int m(java.util.List<String> xs, int n) {
        int total = 0, k[] = {1, 2};
        for (int i = 0; i < n; i++) { total += i >> 1; }
        for (String x : xs) total += x.length();
        Runnable r = () -> m(xs, n - 1);
        java.util.function.Function<Integer, Integer> f = v -> v * 2;
        Object o = (Object) xs;
        if (o instanceof String s && !s.isEmpty()) { return s.length(); }
        try (java.io.Reader in = null) { } catch (RuntimeException | Error e) { throw e; } finally { }
        switch (n) { case 1, 2 -> total++; default -> { total--; } }
        int y = switch (n) { case 0: yield 1; default: yield n > 0 ? n : -n; };
        label: while (true) { break label; }
        new Thread(new Runnable() { public void run() {} }).start();
        xs.forEach(System.out::println);
        total >>>= 2;
        return total + y + String.class.hashCode() + int[].class.hashCode();
    }
}
"#;
    let parse = parse(text);
    assert!(parse.diagnostics().is_empty(), "{:?}", parse.diagnostics());
}

#[test]
fn local_and_anonymous_classes_are_reachable_from_the_visitor() {
    let text = r#"class A {
    void m() {
        class Local { void x() {} }
        Object o = new Object() { public String toString() { return ""; } };
    }
}
"#;
    let parse = parse(text);
    assert!(!parse.has_errors(), "{:?}", parse.diagnostics());
    let names: Vec<_> = visit::all_methods(parse.compilation_unit())
        .into_iter()
        .map(|method| method.name.text.as_str())
        .collect();
    assert_eq!(names, vec!["m", "x", "toString"]);
    assert_eq!(visit::all_type_decls(parse.compilation_unit()).len(), 2);
}

#[test]
fn recovers_from_syntax_errors() {
    let parse = parse("class A { void m( { int x = ; } void n() {} }");
    assert!(parse.has_errors());
    let names: Vec<_> = parse.compilation_unit().types[0]
        .methods()
        .map(|method| method.name.text.clone())
        .collect();
    assert!(names.contains(&"m".to_string()));
}

#[test]
fn type_fragments() {
    assert_eq!(parse_type_fragment("int").map(|ty| ty.text), Some("int".to_string()));
    assert_eq!(
        parse_type_fragment("java.util.Map<String, java.util.List<? extends Number>>[]")
            .map(|ty| ty.text),
        Some("java.util.Map<String,java.util.List<? extends Number>>[]".to_string())
    );
    assert_eq!(parse_type_fragment("void").map(|ty| ty.text), Some("void".to_string()));
    assert!(parse_type_fragment("").is_none());
    assert!(parse_type_fragment("int x").is_none());
    assert!(parse_type_fragment("List<").is_none());
    assert!(parse_type_fragment("class").is_none());
}

#[test]
fn expression_fragments() {
    assert!(matches!(parse_expression_fragment("0"), Some(Expr::Literal(_))));
    assert!(matches!(parse_expression_fragment("a + b * 2"), Some(Expr::Binary(_))));
    assert!(matches!(parse_expression_fragment("new java.util.Date()"), Some(Expr::New(_))));
    assert!(matches!(parse_expression_fragment("foo(1, \"x\")"), Some(Expr::MethodCall(_))));
    assert!(parse_expression_fragment("").is_none());
    assert!(parse_expression_fragment("1 +").is_none());
    assert!(parse_expression_fragment("a b").is_none());
    assert!(parse_expression_fragment("\"open").is_none());
}

#[test]
fn node_ids_are_stable_across_reparses() {
    let text = "class A { void m(int a) { m(a); } }";
    let first = parse(text);
    let second = parse(text);
    assert_eq!(first.compilation_unit(), second.compilation_unit());

    let method = first.compilation_unit().types[0].methods().next().expect("method");
    let body = method.body.as_ref().expect("body");
    let Stmt::Expr(stmt) = &body.stmts[0] else {
        panic!("expected expression statement");
    };
    assert!(matches!(&stmt.expr, Expr::MethodCall(call) if call.args.args.len() == 1));
}
