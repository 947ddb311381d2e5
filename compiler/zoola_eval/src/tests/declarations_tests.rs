//! Typed variables, arrays, scripted methods and class declarations.

use super::Script;
use crate::errors::EvalErrorKind;
use crate::value::Value;
use crate::EvalConfig;
use zoola_ir::{AssignOp, AstBuilder, BinaryOp, ClassDecl, Modifiers, NodeId, UnaryOp};

mod variables {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn typed_declarations_convert_and_default() {
        let mut s = Script::new();
        s.ok(|b| {
            let five = b.int(5);
            let l = b.var("long", "l", Some(five));
            let i = b.var("int", "i", None);
            let text = b.var("String", "text", None);
            let c = b.char('z');
            let d = b.var("double", "d", Some(c));
            vec![l, i, text, d]
        });
        assert_eq!(s.get("l"), Value::long(5));
        assert_eq!(s.get("i"), Value::int(0));
        assert_eq!(s.get("text"), Value::Null);
        assert_eq!(s.get("d"), Value::double(122.0));
    }

    #[test]
    fn int_constants_narrow_when_they_fit() {
        let mut s = Script::new();
        s.ok(|b| {
            let small = b.int(100);
            vec![b.var("byte", "small", Some(small))]
        });
        assert_eq!(s.get("small"), Value::byte(100));

        let err = s.fault(|b| {
            let big = b.int(300);
            vec![b.var("byte", "big", Some(big))]
        });
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
        assert_eq!(err.notes, vec!["Typed variable declaration".to_owned()]);
    }

    #[test]
    fn assignment_to_typed_slot_is_checked() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let decl = b.var("int", "x", Some(one));
            let x = b.ident("x");
            let text = b.string("nope");
            vec![decl, b.assign(x, text)]
        });
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
        assert_eq!(s.get("x"), Value::int(1));
    }

    #[test]
    fn void_initializer_is_a_fault() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let nothing = b.ident("nothing");
            vec![b.var("int", "v", Some(nothing))]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidInitializer { .. }));
    }

    #[test]
    fn inner_declaration_shadows_and_plain_assignment_mutates() {
        let mut s = Script::new();
        s.ok(|b| {
            let zero = b.int(0);
            let out = b.ident("out");
            let init_out = b.assign(out, zero);
            let one = b.int(1);
            let outer = b.var("int", "x", Some(one));

            // { int x = 10; out = x; }
            let ten = b.int(10);
            let inner = b.var("int", "x", Some(ten));
            let out = b.ident("out");
            let x = b.ident("x");
            let copy = b.assign(out, x);
            let shadowing = b.block(vec![inner, copy]);

            // { x = 5; }
            let x = b.ident("x");
            let five = b.int(5);
            let set = b.assign(x, five);
            let mutating = b.block(vec![set]);
            vec![init_out, outer, shadowing, mutating]
        });
        assert_eq!(s.get("out"), Value::int(10));
        assert_eq!(s.get("x"), Value::int(5));
    }

    #[test]
    fn redeclaration_in_one_scope_is_a_fault() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let first = b.var("int", "x", Some(one));
            let two = b.int(2);
            let second = b.var("int", "x", Some(two));
            vec![first, second]
        });
        assert!(matches!(err.kind, EvalErrorKind::Redeclared { .. }));
    }

    #[test]
    fn untyped_first_write_declares_locally() {
        let mut s = Script::new();
        s.ok(|b| {
            let x = b.ident("fresh");
            let one = b.int(1);
            let set = b.assign(x, one);
            vec![b.block(vec![set])]
        });
        assert_eq!(s.get("fresh"), Value::Void);
    }

    #[test]
    fn final_slots_take_one_value() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let ty = b.ty("int");
            let decl = b.declarator("k", 0, Some(one));
            let decl = b.var_decl(Modifiers::FINAL, ty, vec![decl]);
            let k = b.ident("k");
            let two = b.int(2);
            vec![decl, b.assign(k, two)]
        });
        assert!(matches!(err.kind, EvalErrorKind::FinalAssignment { .. }));

        let err = s.fault(|b| {
            let ty = b.ty("int");
            let decl = b.declarator("blank", 0, None);
            let decl = b.var_decl(Modifiers::FINAL, ty, vec![decl]);
            let k = b.ident("blank");
            let three = b.int(3);
            let first = b.assign(k, three);
            let k = b.ident("blank");
            let four = b.int(4);
            vec![decl, first, b.assign(k, four)]
        });
        assert!(matches!(err.kind, EvalErrorKind::FinalAssignment { .. }));
        assert_eq!(s.get("blank"), Value::int(3));
    }

    #[test]
    fn declarators_add_their_own_dimensions() {
        let mut s = Script::new();
        s.ok(|b| {
            let ty = b.ty("int");
            let one = b.int(1);
            let scalar = b.declarator("n", 0, Some(one));
            let items = vec![b.int(1), b.int(2)];
            let init = b.array_init(items);
            let array = b.declarator("ns", 1, Some(init));
            vec![b.var_decl(Modifiers::empty(), ty, vec![scalar, array])]
        });
        assert_eq!(s.get("n"), Value::int(1));
        let ns = s.get("ns");
        assert_eq!(
            ns.as_array().map(|a| a.to_vec()),
            Some(vec![Value::int(1), Value::int(2)])
        );
    }

    #[test]
    fn compound_assignment_narrows_to_declared_kind() {
        let mut s = Script::new();
        s.ok(|b| {
            let start = b.int(120);
            let decl = b.var("byte", "b", Some(start));
            let target = b.ident("b");
            let ten = b.int(10);
            vec![decl, b.assign_op(AssignOp::Add, target, ten)]
        });
        assert_eq!(s.get("b"), Value::byte(-126));
    }
}

mod arrays {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `int[][] m = {{1, 2, 3}, {4, 5, 6}};`
    fn matrix(b: &mut AstBuilder) -> NodeId {
        let first = vec![b.int(1), b.int(2), b.int(3)];
        let first = b.array_init(first);
        let second = vec![b.int(4), b.int(5), b.int(6)];
        let second = b.array_init(second);
        let init = b.array_init(vec![first, second]);
        b.var("int[][]", "m", Some(init))
    }

    #[test]
    fn nested_initializer_has_declared_shape() {
        let mut s = Script::new();
        let corner = s.ok(|b| {
            let decl = matrix(b);
            let m = b.ident("m");
            let one = b.int(1);
            let row = b.index(m, one);
            let two = b.int(2);
            let cell = b.index(row, two);
            vec![decl, cell]
        });
        assert_eq!(corner, Value::int(6));
        let m = s.get("m");
        let array = m.as_array().unwrap();
        assert_eq!(array.shape(), vec![2, 3]);
        assert_eq!(array.dimensions(), 2);
    }

    #[test]
    fn length_is_readable_not_assignable() {
        let mut s = Script::new();
        let len = s.ok(|b| {
            let decl = matrix(b);
            let m = b.ident("m");
            vec![decl, b.field(m, "length")]
        });
        assert_eq!(len, Value::int(2));
        let err = s.fault(|b| {
            let m = b.ident("m");
            let length = b.field(m, "length");
            let three = b.int(3);
            vec![b.assign(length, three)]
        });
        assert!(matches!(err.kind, EvalErrorKind::NotAssignable { .. }));
    }

    #[test]
    fn scalar_in_nested_position_is_a_dimension_mismatch() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let items = vec![b.int(1), b.int(2)];
            let init = b.array_init(items);
            vec![b.var("int[][]", "m", Some(init))]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::ArrayDimensionMismatch {
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn initializer_below_two_dimensions_is_misplaced() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let two = b.int(2);
            let inner = b.array_init(vec![two]);
            let init = b.array_init(vec![one, inner]);
            vec![b.var("int[]", "a", Some(init))]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::InitializerLocation { position: 1 }
        ));

        let err = s.fault(|b| {
            let one = b.int(1);
            let init = b.array_init(vec![one]);
            vec![b.var("int", "x", Some(init))]
        });
        assert!(matches!(err.kind, EvalErrorKind::InitializerLocation { .. }));
    }

    #[test]
    fn initializer_elements_are_checked() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let nothing = b.ident("nothing");
            let init = b.array_init(vec![one, nothing]);
            vec![b.var("int[]", "a", Some(init))]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::VoidInArrayInit { position: 1 }
        ));

        let err = s.fault(|b| {
            let text = b.string("s");
            let init = b.array_init(vec![text]);
            vec![b.var("int[]", "a", Some(init))]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::ArrayInitElement { position: 0, .. }
        ));
    }

    #[test]
    fn one_dimensional_elements_are_cast() {
        let mut s = Script::new();
        s.ok(|b| {
            let one = b.int(1);
            let wide = b.int(200);
            let init = b.array_init(vec![one, wide]);
            vec![b.var("byte[]", "bytes", Some(init))]
        });
        let bytes = s.get("bytes");
        assert_eq!(
            bytes.as_array().map(|a| a.to_vec()),
            Some(vec![Value::byte(1), Value::byte(-56)])
        );
    }

    #[test]
    fn allocation_fills_defaults() {
        let mut s = Script::new();
        s.ok(|b| {
            let a = b.ident("grid");
            let two = b.int(2);
            let three = b.int(3);
            let array = b.new_array("int", vec![two, three], 0);
            let grid = b.assign(a, array);
            let r = b.ident("ragged");
            let two = b.int(2);
            let array = b.new_array("String", vec![two], 1);
            let ragged = b.assign(r, array);
            vec![grid, ragged]
        });
        let grid = s.get("grid");
        let grid = grid.as_array().unwrap();
        assert_eq!(grid.shape(), vec![2, 3]);
        let cell = grid.get(1).and_then(|row| row.as_array().and_then(|r| r.get(2)));
        assert_eq!(cell, Some(Value::int(0)));
        let ragged = s.get("ragged");
        assert_eq!(
            ragged.as_array().map(|a| a.to_vec()),
            Some(vec![Value::Null, Value::Null])
        );
    }

    #[test]
    fn dimensions_must_be_integral() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let half = b.double(0.5);
            vec![b.new_array("int", vec![one, half], 0)]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::NonIntegralDimension { position: 1, .. }
        ));
    }

    #[test]
    fn element_assignment_converts_to_component() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let a = b.ident("a");
            let two = b.int(2);
            let array = b.new_array("int", vec![two], 0);
            let init = b.assign(a, array);
            let a = b.ident("a");
            let zero = b.int(0);
            let slot = b.index(a, zero);
            let seven = b.int(7);
            let ok = b.assign(slot, seven);
            let a = b.ident("a");
            let one = b.int(1);
            let slot = b.index(a, one);
            let text = b.string("x");
            vec![init, ok, b.assign(slot, text)]
        });
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
        let a = s.get("a");
        assert_eq!(a.as_array().and_then(|a| a.get(0)), Some(Value::int(7)));
    }
}

mod methods {
    use super::*;
    use pretty_assertions::assert_eq;

    /// `int fact(int n) { if (n <= 1) return 1; return n * fact(n - 1); }`
    fn fact(b: &mut AstBuilder) -> NodeId {
        let n = b.ident("n");
        let one = b.int(1);
        let base = b.binary(BinaryOp::LtEq, n, one);
        let one = b.int(1);
        let ret_one = b.ret(Some(one));
        let guard = b.if_(base, ret_one, None);
        let n = b.ident("n");
        let one = b.int(1);
        let smaller = b.binary(BinaryOp::Sub, n, one);
        let recurse = b.call("fact", vec![smaller]);
        let n = b.ident("n");
        let product = b.binary(BinaryOp::Mul, n, recurse);
        let ret = b.ret(Some(product));
        let body = b.block(vec![guard, ret]);
        let param = b.param("n", Some("int"));
        b.method("fact", Some("int"), vec![param], body)
    }

    #[test]
    fn recursion() {
        let mut s = Script::new();
        let result = s.ok(|b| {
            let decl = fact(b);
            let five = b.int(5);
            vec![decl, b.call("fact", vec![five])]
        });
        assert_eq!(result, Value::int(120));
    }

    #[test]
    fn depth_limit_is_an_evaluation_fault() {
        let mut s = Script::with_config(EvalConfig {
            max_call_depth: Some(16),
            ..EvalConfig::default()
        });
        // f() { return f(); }
        let err = s.fault(|b| {
            let call = b.call("f", vec![]);
            let ret = b.ret(Some(call));
            let body = b.block(vec![ret]);
            let decl = b.method("f", None, vec![], body);
            vec![decl, b.call("f", vec![])]
        });
        assert!(matches!(err.kind, EvalErrorKind::StackOverflow { depth: 16 }));
        assert_eq!(s.interp.call_stack().depth(), 1);

        // The context stays usable.
        let result = s.ok(|b| {
            let decl = fact(b);
            let three = b.int(3);
            vec![decl, b.call("fact", vec![three])]
        });
        assert_eq!(result, Value::int(6));
    }

    #[test]
    fn methods_see_their_declaring_scope() {
        let mut s = Script::new();
        let result = s.ok(|b| {
            let base = b.ident("base");
            let ten = b.int(10);
            let init = b.assign(base, ten);
            let base = b.ident("base");
            let x = b.ident("x");
            let sum = b.binary(BinaryOp::Add, base, x);
            let local = b.ident("local");
            let set_local = b.assign(local, sum);
            let local = b.ident("local");
            let ret = b.ret(Some(local));
            let body = b.block(vec![set_local, ret]);
            let param = b.param("x", Some("int"));
            let decl = b.method("add", Some("int"), vec![param], body);
            let five = b.int(5);
            vec![init, decl, b.call("add", vec![five])]
        });
        assert_eq!(result, Value::int(15));
        assert_eq!(s.get("local"), Value::Void);
    }

    #[test]
    fn argument_checks() {
        let mut s = Script::new();
        let decl = |b: &mut AstBuilder| {
            let x = b.ident("x");
            let ret = b.ret(Some(x));
            let body = b.block(vec![ret]);
            let p = b.param("x", None);
            let q = b.param("y", None);
            b.method("pick", None, vec![p, q], body)
        };
        let err = s.fault(|b| {
            let decl = decl(b);
            let one = b.int(1);
            vec![decl, b.call("pick", vec![one])]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::ArgumentCount {
                expected: 2,
                found: 1,
                ..
            }
        ));

        let err = s.fault(|b| {
            let one = b.int(1);
            let nothing = b.ident("nothing");
            vec![b.call("pick", vec![one, nothing])]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::VoidArgument { position: 1, .. }
        ));
    }

    #[test]
    fn typed_parameters_convert_arguments() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let x = b.ident("x");
            let ret = b.ret(Some(x));
            let body = b.block(vec![ret]);
            let p = b.param("x", Some("int"));
            let decl = b.method("id", None, vec![p], body);
            let text = b.string("s");
            vec![decl, b.call("id", vec![text])]
        });
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn return_type_is_enforced() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let ret = b.ret(Some(one));
            let body = b.block(vec![ret]);
            let decl = b.method("nothing", Some("void"), vec![], body);
            vec![decl, b.call("nothing", vec![])]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidReturn { .. }));

        let err = s.fault(|b| {
            let body = b.block(vec![]);
            let decl = b.method("number", Some("int"), vec![], body);
            vec![decl, b.call("number", vec![])]
        });
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));
    }

    #[test]
    fn methods_declared_in_loop_bodies_do_not_accumulate_scopes() {
        let mut s = Script::new();
        let before = s.interp.scopes().live_count();
        // for (int i = 0; i < 1000; i++) { g() {} }
        s.ok(|b| {
            let zero = b.int(0);
            let init = b.var("int", "i", Some(zero));
            let i = b.ident("i");
            let limit = b.int(1000);
            let cond = b.binary(BinaryOp::Lt, i, limit);
            let i = b.ident("i");
            let step = b.postfix(UnaryOp::Incr, i);
            let empty = b.block(vec![]);
            let decl = b.method("g", None, vec![], empty);
            let body = b.block(vec![decl]);
            vec![b.for_(vec![init], Some(cond), vec![step], Some(body))]
        });
        assert_eq!(s.interp.scopes().live_count(), before);
    }

    #[test]
    fn nested_declarations_are_freed_per_call() {
        let mut s = Script::new();
        // outer() { inner() { return 3; } return inner(); }
        s.ok(|b| {
            let three = b.int(3);
            let ret = b.ret(Some(three));
            let inner_body = b.block(vec![ret]);
            let inner = b.method("inner", None, vec![], inner_body);
            let call = b.call("inner", vec![]);
            let ret = b.ret(Some(call));
            let outer_body = b.block(vec![inner, ret]);
            vec![b.method("outer", None, vec![], outer_body)]
        });
        let before = s.interp.scopes().live_count();
        for _ in 0..100 {
            assert_eq!(s.interp.invoke_method("outer", vec![]).unwrap(), Value::int(3));
        }
        assert_eq!(s.interp.scopes().live_count(), before);
    }

    #[test]
    fn redeclaration_replaces() {
        let mut s = Script::new();
        let result = s.ok(|b| {
            let mut decls = Vec::new();
            for n in [1, 2] {
                let value = b.int(n);
                let ret = b.ret(Some(value));
                let body = b.block(vec![ret]);
                decls.push(b.method("which", None, vec![], body));
            }
            decls.push(b.call("which", vec![]));
            decls
        });
        assert_eq!(result, Value::int(2));
    }

    #[test]
    fn unknown_command_names_the_signature() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let text = b.string("a");
            vec![b.call("missing", vec![one, text])]
        });
        let EvalErrorKind::UndefinedMethod { signature } = &err.kind else {
            panic!("expected an undefined method, got {}", err.kind);
        };
        assert_eq!(signature, "missing(int, java.lang.String)");
    }

    #[test]
    fn host_commands_receive_arguments() {
        let mut s = Script::new();
        s.ok(|b| {
            let text = b.string("sum");
            let two = b.int(2);
            let three = b.int(3);
            let total = b.binary(BinaryOp::Add, two, three);
            vec![b.call("print", vec![text, total])]
        });
        assert_eq!(s.host.output(), vec!["sum 5".to_owned()]);
    }
}

mod strict_mode {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn undeclared_reads_and_writes_fault() {
        let mut s = Script::strict();
        let err = s.fault(|b| vec![b.ident("ghost")]);
        assert!(matches!(err.kind, EvalErrorKind::UndefinedVariable { .. }));

        let err = s.fault(|b| {
            let ghost = b.ident("ghost");
            let one = b.int(1);
            vec![b.assign(ghost, one)]
        });
        assert!(matches!(err.kind, EvalErrorKind::Strict { .. }));
    }

    #[test]
    fn methods_need_declared_types() {
        let mut s = Script::strict();
        let err = s.fault(|b| {
            let body = b.block(vec![]);
            let p = b.param("x", None);
            vec![b.method("loose", Some("void"), vec![p], body)]
        });
        assert!(matches!(err.kind, EvalErrorKind::Strict { .. }));

        let err = s.fault(|b| {
            let body = b.block(vec![]);
            vec![b.method("untyped", None, vec![], body)]
        });
        assert!(matches!(err.kind, EvalErrorKind::Strict { .. }));
    }

    #[test]
    fn typed_code_runs() {
        let mut s = Script::strict();
        let result = s.ok(|b| {
            let one = b.int(1);
            let decl = b.var("int", "x", Some(one));
            let x = b.ident("x");
            let two = b.int(2);
            let add = b.assign_op(AssignOp::Add, x, two);
            let x = b.ident("x");
            vec![decl, add, x]
        });
        assert_eq!(result, Value::int(3));
    }
}

mod classes {
    use super::*;
    use pretty_assertions::assert_eq;

    fn class(b: &mut AstBuilder, name: &str, implements: &[&str]) -> NodeId {
        let decl = ClassDecl {
            name: b.name(name),
            modifiers: Modifiers::PUBLIC,
            is_interface: false,
            extends: None,
            implements: implements.iter().map(|i| b.ty(i)).collect(),
            body: None,
        };
        b.class_decl(decl)
    }

    #[test]
    fn declarations_are_hoisted_and_instantiable() {
        let mut s = Script::new();
        let is_point = s.ok(|b| {
            let p = b.ident("p");
            let new = b.new_object("Point", vec![]);
            let make = b.assign(p, new);
            let decl = class(b, "Point", &["Runnable"]);
            let p = b.ident("p");
            let check = b.instance_of(p, "Runnable");
            vec![make, decl, check]
        });
        assert_eq!(is_point, Value::bool(true));
        assert_eq!(s.host.generated_count(), 1);
    }

    #[test]
    fn generation_happens_once_per_declaration() {
        let mut s = Script::new();
        let mut b = s.builder();
        let decl = class(&mut b, "Once", &[]);
        let root = b.block(vec![decl]);
        let tree = b.finish(root);

        let first = s.interp.eval(&tree).unwrap();
        let second = s.interp.eval(&tree).unwrap();
        let mut sibling = s.sibling();
        let third = sibling.eval(&tree).unwrap();

        assert!(matches!(first, Value::Type(_)));
        assert_eq!(first, second);
        assert_eq!(second, third);
        assert_eq!(s.host.generated_count(), 1);
        assert_eq!(s.runtime().class_cache.len(), 1);
    }

    #[test]
    fn implements_must_name_interfaces() {
        let mut s = Script::new();
        let err = s.fault(|b| vec![class(b, "Broken", &["String"])]);
        assert!(matches!(err.kind, EvalErrorKind::NotInterface { .. }));
        assert_eq!(s.host.generated_count(), 0);
    }
}
