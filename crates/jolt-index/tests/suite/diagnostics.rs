use pretty_assertions::assert_eq;

use super::{diagnostic_codes, single};

#[test]
fn well_formed_code_has_no_diagnostics() {
    let (workspace, file) = single(
        r#"import java.util.ArrayList;
import java.util.List;

class A {
    private final List<String> names = new ArrayList<>();

    int count(String prefix) {
        int total = 0;
        for (String name : names) {
            if (name.startsWith(prefix)) {
                total++;
            }
        }
        return Math.max(total, names.size());
    }
}
"#,
    );
    assert_eq!(diagnostic_codes(&workspace, &file), Vec::<&str>::new());
}

#[test]
fn unresolved_types_methods_and_names() {
    let (workspace, file) = single(
        r#"class A {
    Missing field;
    void m(int x) {}
    int use() {
        m();
        n(1);
        return y;
    }
}
"#,
    );
    assert_eq!(
        diagnostic_codes(&workspace, &file),
        vec!["unresolved-type", "unresolved-method", "unresolved-method", "undefined-name"]
    );
}

#[test]
fn duplicate_methods_and_parameters() {
    let (workspace, file) = single(
        r#"class A {
    void m(int a, int a) {}
    void n(String s) {}
    void n(String t) {}
}
"#,
    );
    assert_eq!(
        diagnostic_codes(&workspace, &file),
        vec!["duplicate-parameter", "duplicate-method"]
    );
}

#[test]
fn calls_to_methods_with_unresolvable_parameter_types() {
    let (workspace, file) = single(
        r#"class A {
    void m(Missing x) {}
    void use() { m(null); }
}
"#,
    );
    assert_eq!(
        diagnostic_codes(&workspace, &file),
        vec!["unresolved-type", "argument-type-not-found"]
    );
}

#[test]
fn library_receivers_are_not_checked_exhaustively() {
    let (workspace, file) = single(
        r#"class A extends Thread {
    void m(String s) {
        s.unknownMethod();
        inheritedFromSomewhere();
    }
}
"#,
    );
    assert_eq!(diagnostic_codes(&workspace, &file), Vec::<&str>::new());
}

#[test]
fn syntax_errors_are_reported() {
    let (workspace, file) = single("class A { void m( { } }");
    assert!(diagnostic_codes(&workspace, &file).contains(&"syntax-error"));
}

#[test]
fn constructors_with_the_wrong_arity_are_reported() {
    let (workspace, file) = single(
        r#"class A {
    A(int x) {}
}
class B {
    Object a = new A();
    Object b = new B(1);
    Object c = new B();
}
"#,
    );
    assert_eq!(
        diagnostic_codes(&workspace, &file),
        vec!["unresolved-method", "unresolved-method"]
    );
}
