use nova_dom::{Node, NodeKind};
use pretty_assertions::assert_eq;

use super::{convert, declaration_of, nodes_of};

const CAPTURING: &str = r#"
import java.util.function.Function;
import java.util.function.Supplier;

class Capture {
    void m(int p) {
        int local = 1;
        Function<Integer, Integer> f = x -> local + p + x + local;
        Supplier<Integer> g = () -> p;
    }
}
"#;

#[test]
fn lambda_binds_to_a_copy_of_the_interface_method() {
    let dom = convert(CAPTURING);
    let lambda = nodes_of(&dom, NodeKind::LambdaExpression)[0];
    let method = dom.resolve_method_binding(lambda).expect("targeted lambda resolves");
    assert!(method.is_lambda());
    assert_eq!(method.name(), format!("lambda${}", dom.start_position(lambda)));
    let params: Vec<String> = method
        .parameter_types()
        .iter()
        .map(|ty| ty.qualified_name())
        .collect();
    assert_eq!(params, vec!["java.lang.Integer"]);
    assert_eq!(
        method.return_type().map(|ty| ty.qualified_name()),
        Some("java.lang.Integer".to_string())
    );

    let target = dom.resolve_type_binding(lambda).unwrap();
    assert_eq!(
        target.qualified_name(),
        "java.util.function.Function<java.lang.Integer,java.lang.Integer>"
    );
    let sam = target.functional_interface_method().unwrap();
    assert_eq!(sam.name(), "apply");
    assert!(!sam.is_lambda());

    assert_eq!(dom.find_declaring_node(&method.into()), Some(lambda));
}

#[test]
fn captured_locals_follow_first_reference_order() {
    let dom = convert(CAPTURING);
    let lambdas = nodes_of(&dom, NodeKind::LambdaExpression);
    let first = dom.resolve_method_binding(lambdas[0]).unwrap();
    let outer = first.synthetic_outer_locals();
    let names: Vec<String> = outer.iter().map(|local| local.name()).collect();
    assert_eq!(names, vec!["val$local", "val$p"]);
    for local in &outer {
        assert!(local.is_synthetic());
        assert_eq!(dom.find_declaring_node(&local.clone().into()), None);
        let declared = local.variable_declaration();
        assert!(!declared.is_synthetic());
        assert_eq!(format!("val${}", declared.name()), local.name());
        assert!(declared.is_effectively_final());
    }
    assert_eq!(
        dom.find_declaring_node(&outer[1].variable_declaration().into()),
        Some(declaration_of(&dom, "p"))
    );

    let second = dom.resolve_method_binding(lambdas[1]).unwrap();
    let names: Vec<String> = second
        .synthetic_outer_locals()
        .iter()
        .map(|local| local.name())
        .collect();
    assert_eq!(names, vec!["val$p"]);
    assert!(!first.is_equal_to(&second));
}

#[test]
fn lambda_parameters_belong_to_the_lambda() {
    let dom = convert(CAPTURING);
    let lambda = nodes_of(&dom, NodeKind::LambdaExpression)[0];
    let Node::LambdaExpression(expression) = dom.node(lambda) else {
        unreachable!()
    };
    assert!(!expression.parentheses);
    let parameter = expression.parameters[0];
    assert_eq!(dom.kind(parameter), NodeKind::VariableDeclarationFragment);
    let x = dom.resolve_variable_binding(parameter).unwrap();
    assert!(x.is_parameter());
    assert!(!x.is_synthetic());
    assert_eq!(x.ty().unwrap().qualified_name(), "java.lang.Integer");
    let owner = x.declaring_method().unwrap();
    assert!(owner.is_lambda());
    assert_eq!(owner, dom.resolve_method_binding(lambda).unwrap());
    assert_eq!(dom.find_declaring_node(&x.into()), Some(parameter));
}

#[test]
fn untargeted_functional_expressions_resolve_to_none() {
    let source = r#"
class Loose {
    Object lambda = () -> 1;
    Object reference = String::length;
    int after = 2;
}
"#;
    let dom = convert(source);
    let lambda = nodes_of(&dom, NodeKind::LambdaExpression)[0];
    assert_eq!(dom.resolve_method_binding(lambda), None);
    assert_eq!(dom.resolve_binding(lambda), None);
    let reference = nodes_of(&dom, NodeKind::TypeMethodReference)
        .into_iter()
        .chain(nodes_of(&dom, NodeKind::ExpressionMethodReference))
        .next()
        .expect("method reference node");
    assert_eq!(dom.resolve_method_binding(reference), None);

    let after = dom.resolve_variable_binding(declaration_of(&dom, "after")).unwrap();
    assert_eq!(after.name(), "after");
    assert!(!dom.is_malformed(lambda));
}

#[test]
fn method_references_bind_to_the_referenced_method() {
    let source = r#"
import java.util.function.Function;

class Refs {
    Function<String, Integer> length = String::length;
}
"#;
    let dom = convert(source);
    let reference = nodes_of(&dom, NodeKind::TypeMethodReference)
        .into_iter()
        .chain(nodes_of(&dom, NodeKind::ExpressionMethodReference))
        .next()
        .expect("method reference node");
    let method = dom.resolve_method_binding(reference).unwrap();
    assert_eq!(method.name(), "length");
    assert_eq!(method.declaring_class().unwrap().qualified_name(), "java.lang.String");
    assert!(!method.is_lambda());
}
