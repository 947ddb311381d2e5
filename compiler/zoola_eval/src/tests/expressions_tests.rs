//! Assignment, short-circuiting, casts and member access through `eval`.

use super::Script;
use crate::errors::EvalErrorKind;
use crate::value::Value;
use zoola_ir::{AssignOp, BinaryOp, UnaryOp};

mod assignment {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn compound_reads_target_before_value() {
        // i = 1; i += i++;
        let mut s = Script::new();
        let result = s.ok(|b| {
            let i = b.ident("i");
            let one = b.int(1);
            let init = b.assign(i, one);
            let i = b.ident("i");
            let operand = b.ident("i");
            let bump = b.postfix(UnaryOp::Incr, operand);
            vec![init, b.assign_op(AssignOp::Add, i, bump)]
        });
        assert_eq!(result, Value::int(2));
        assert_eq!(s.get("i"), Value::int(2));
    }

    #[test]
    fn prefix_and_postfix_results() {
        let mut s = Script::new();
        let pre = s.ok(|b| {
            let n = b.ident("n");
            let five = b.int(5);
            let init = b.assign(n, five);
            let n = b.ident("n");
            vec![init, b.unary(UnaryOp::Incr, n)]
        });
        assert_eq!(pre, Value::int(6));
        let post = s.ok(|b| {
            let n = b.ident("n");
            vec![b.postfix(UnaryOp::Decr, n)]
        });
        assert_eq!(post, Value::int(6));
        assert_eq!(s.get("n"), Value::int(5));
    }

    #[test]
    fn string_plus_equals_appends() {
        let mut s = Script::new();
        s.ok(|b| {
            let text = b.ident("text");
            let a = b.string("a");
            let init = b.assign(text, a);
            let text = b.ident("text");
            let one = b.int(1);
            vec![init, b.assign_op(AssignOp::Add, text, one)]
        });
        assert_eq!(s.get("text").as_str(), Some("a1"));
    }

    #[test]
    fn compound_operand_faults() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let text = b.ident("text");
            let a = b.string("a");
            let init = b.assign(text, a);
            let text = b.ident("text");
            let one = b.int(1);
            vec![init, b.assign_op(AssignOp::Sub, text, one)]
        });
        assert!(matches!(err.kind, EvalErrorKind::StringCompound { op: "-=" }));

        let err = s.fault(|b| {
            let list = b.ident("list");
            let new = b.new_object("ArrayList", vec![]);
            let init = b.assign(list, new);
            let list = b.ident("list");
            let one = b.int(1);
            vec![init, b.assign_op(AssignOp::Add, list, one)]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::NonPrimitiveCompound { op: "+=" }
        ));

        let err = s.fault(|b| {
            let n = b.ident("n");
            let one = b.int(1);
            let init = b.assign(n, one);
            let n = b.ident("n");
            let nothing = b.ident("nothing");
            vec![init, b.assign_op(AssignOp::Mul, n, nothing)]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidAssignment));
    }

    #[test]
    fn void_cannot_be_stored() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let x = b.ident("x");
            let nothing = b.ident("nothing");
            vec![b.assign(x, nothing)]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidAssignment));
        assert_eq!(s.get("x"), Value::Void);
    }

    #[test]
    fn literals_are_not_assignable() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let two = b.int(2);
            vec![b.assign(one, two)]
        });
        assert!(matches!(err.kind, EvalErrorKind::NotAssignable { .. }));
    }
}

mod evaluation_order {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn logical_operators_short_circuit() {
        let mut s = Script::new();
        let result = s.ok(|b| {
            let f = b.bool(false);
            let boom = b.call("boom", vec![]);
            let and = b.binary(BinaryOp::And, f, boom);
            let t = b.bool(true);
            let boom = b.call("boom", vec![]);
            let or = b.binary(BinaryOp::Or, t, boom);
            vec![b.binary(BinaryOp::BitXor, and, or)]
        });
        assert_eq!(result, Value::bool(true));

        let err = s.fault(|b| {
            let t = b.bool(true);
            let boom = b.call("boom", vec![]);
            vec![b.binary(BinaryOp::And, t, boom)]
        });
        assert!(matches!(err.kind, EvalErrorKind::UndefinedMethod { .. }));
    }

    #[test]
    fn ternary_evaluates_one_branch() {
        let mut s = Script::new();
        let result = s.ok(|b| {
            let one = b.int(1);
            let two = b.int(2);
            let cond = b.binary(BinaryOp::Lt, one, two);
            let yes = b.string("yes");
            let boom = b.call("boom", vec![]);
            vec![b.ternary(cond, yes, boom)]
        });
        assert_eq!(result.as_str(), Some("yes"));

        let err = s.fault(|b| {
            let cond = b.int(1);
            let a = b.int(2);
            let c = b.int(3);
            vec![b.ternary(cond, a, c)]
        });
        assert!(matches!(err.kind, EvalErrorKind::ConditionNotBoolean { .. }));
    }
}

mod casts {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn numeric_casts_narrow() {
        let mut s = Script::new();
        let byte = s.ok(|b| {
            let wide = b.int(300);
            vec![b.cast("byte", wide)]
        });
        assert_eq!(byte, Value::byte(44));
        let truncated = s.ok(|b| {
            let d = b.double(3.9);
            vec![b.cast("int", d)]
        });
        assert_eq!(truncated, Value::int(3));
        let code = s.ok(|b| {
            let c = b.char('A');
            vec![b.cast("int", c)]
        });
        assert_eq!(code, Value::int(65));
    }

    #[test]
    fn casting_void_is_a_fault() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let nothing = b.ident("nothing");
            vec![b.cast("int", nothing)]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidOperand { op: "cast" }));
    }

    #[test]
    fn instance_of_checks() {
        let mut s = Script::new();
        let mut check = |value: fn(&mut zoola_ir::AstBuilder) -> zoola_ir::NodeId, ty: &str| {
            let ty = ty.to_owned();
            s.ok(move |b| {
                let v = value(b);
                vec![b.instance_of(v, &ty)]
            })
        };
        assert_eq!(check(|b| b.null(), "String"), Value::bool(false));
        assert_eq!(check(|b| b.string("x"), "String"), Value::bool(true));
        assert_eq!(check(|b| b.string("x"), "Object"), Value::bool(true));
        assert_eq!(check(|b| b.int(5), "Primitive"), Value::bool(true));
        assert_eq!(check(|b| b.int(5), "Integer"), Value::bool(false));
        assert_eq!(
            check(|b| b.new_object("ArrayList", vec![]), "List"),
            Value::bool(true)
        );
    }
}

mod names {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn undefined_reads_are_void_in_loose_mode() {
        let mut s = Script::new();
        assert_eq!(s.ok(|b| vec![b.ident("unset")]), Value::Void);
    }

    #[test]
    fn void_is_not_null() {
        let mut s = Script::new();
        let same = s.ok(|b| {
            let unset = b.ident("unset");
            let null = b.null();
            vec![b.binary(BinaryOp::Eq, unset, null)]
        });
        assert_eq!(same, Value::bool(false));
        let err = s.fault(|b| {
            let unset = b.ident("unset");
            let one = b.int(1);
            vec![b.binary(BinaryOp::Lt, unset, one)]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidOperand { op: "<" }));
    }

    #[test]
    fn member_access_on_null_and_void() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let n = b.ident("n");
            let null = b.null();
            let init = b.assign(n, null);
            let n = b.ident("n");
            vec![init, b.field(n, "size")]
        });
        assert!(matches!(err.kind, EvalErrorKind::NullDereference { .. }));

        let err = s.fault(|b| {
            let unset = b.ident("unset");
            vec![b.field(unset, "size")]
        });
        assert!(matches!(err.kind, EvalErrorKind::VoidDereference { .. }));

        let err = s.fault(|b| {
            let one = b.int(1);
            vec![b.field(one, "size")]
        });
        assert!(matches!(err.kind, EvalErrorKind::PrimitiveDereference { .. }));
    }

    #[test]
    fn qualified_names_reach_static_fields() {
        let mut s = Script::new();
        let max = s.ok(|b| vec![b.qualified("Integer.MAX_VALUE")]);
        assert_eq!(max, Value::int(i32::MAX));
    }

    #[test]
    fn map_properties_read_and_write() {
        let mut s = Script::new();
        let read = s.ok(|b| {
            let m = b.ident("m");
            let new = b.new_object("HashMap", vec![]);
            let init = b.assign(m, new);
            let m = b.ident("m");
            let key = b.string("k");
            let slot = b.property(m, key);
            let three = b.int(3);
            let store = b.assign(slot, three);
            let m = b.ident("m");
            let key = b.string("k");
            vec![init, store, b.property(m, key)]
        });
        assert_eq!(read, Value::int(3));

        let err = s.fault(|b| {
            let m = b.ident("m");
            let key = b.int(1);
            vec![b.property(m, key)]
        });
        assert!(matches!(err.kind, EvalErrorKind::PropertyKey { .. }));
    }

    #[test]
    fn indexing_checks_its_operands() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let one = b.int(1);
            let zero = b.int(0);
            vec![b.index(one, zero)]
        });
        assert!(matches!(err.kind, EvalErrorKind::NotAnArray { .. }));

        let err = s.fault(|b| {
            let a = b.ident("a");
            let two = b.int(2);
            let array = b.new_array("int", vec![two], 0);
            let init = b.assign(a, array);
            let a = b.ident("a");
            let key = b.string("0");
            vec![init, b.index(a, key)]
        });
        assert!(matches!(err.kind, EvalErrorKind::NonIntegralIndex { .. }));
    }
}

mod strings {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn equal_literals_are_one_object() {
        let mut s = Script::new();
        let same = s.ok(|b| {
            let a = b.string("pooled");
            let c = b.string("pooled");
            vec![b.binary(BinaryOp::Eq, a, c)]
        });
        assert_eq!(same, Value::bool(true));

        let fresh = s.ok(|b| {
            let arg = b.string("pooled");
            let built = b.new_object("String", vec![arg]);
            let literal = b.string("pooled");
            vec![b.binary(BinaryOp::Eq, built, literal)]
        });
        assert_eq!(fresh, Value::bool(false));
    }

    #[test]
    fn concatenating_an_array_that_holds_itself() {
        let mut s = Script::new();
        // Object[] a = new Object[1]; a[0] = a; "" + a
        let text = s.ok(|b| {
            let one = b.int(1);
            let array = b.new_array("Object", vec![one], 0);
            let decl = b.var("Object[]", "a", Some(array));
            let a = b.ident("a");
            let zero = b.int(0);
            let slot = b.index(a, zero);
            let a = b.ident("a");
            let store = b.assign(slot, a);
            let empty = b.string("");
            let a = b.ident("a");
            vec![decl, store, b.binary(BinaryOp::Add, empty, a)]
        });
        let rendered = text.as_str().unwrap_or_default().to_owned();
        assert!(rendered.starts_with("[Ljava.lang.Object;@"), "{rendered}");
        let shape = s.get("a").as_array().map(crate::value::ArrayObject::shape);
        assert_eq!(shape, Some(vec![1]));
    }

    #[test]
    fn print_joins_rendered_arguments() {
        let mut s = Script::new();
        s.ok(|b| {
            let label = b.string("n=");
            let one = b.int(1);
            let line = b.binary(BinaryOp::Add, label, one);
            let null = b.null();
            vec![b.call("print", vec![line, null])]
        });
        assert_eq!(s.host.output(), vec!["n=1 null".to_owned()]);
    }
}

mod member_calls {
    use super::*;
    use pretty_assertions::assert_eq;
    use crate::tests::thrown_class;
    use crate::value::TypeRef;

    #[test]
    fn string_methods() {
        let mut s = Script::new();
        let upper = s.ok(|b| {
            let text = b.string("hello");
            vec![b.method_call(text, "toUpperCase", vec![])]
        });
        assert_eq!(upper.as_str(), Some("HELLO"));
        let tail = s.ok(|b| {
            let text = b.string("abc");
            let one = b.int(1);
            vec![b.method_call(text, "substring", vec![one])]
        });
        assert_eq!(tail.as_str(), Some("bc"));
    }

    #[test]
    fn receivers_must_be_references() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let null = b.null();
            vec![b.method_call(null, "length", vec![])]
        });
        assert!(matches!(err.kind, EvalErrorKind::NullDereference { .. }));

        let err = s.fault(|b| {
            let one = b.int(1);
            vec![b.method_call(one, "toString", vec![])]
        });
        assert!(matches!(err.kind, EvalErrorKind::PrimitiveDereference { .. }));

        let err = s.fault(|b| {
            let text = b.string("abc");
            vec![b.method_call(text, "explode", vec![])]
        });
        assert!(matches!(err.kind, EvalErrorKind::UndefinedMethod { .. }));
    }

    #[test]
    fn host_exceptions_surface_as_thrown() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let list = b.new_object("ArrayList", vec![]);
            let five = b.int(5);
            vec![b.method_call(list, "get", vec![five])]
        });
        assert_eq!(thrown_class(&err), "java.lang.IndexOutOfBoundsException");
    }

    #[test]
    fn class_literals_name_types() {
        let mut s = Script::new();
        let ty = s.ok(|b| vec![b.class_literal("String")]);
        assert_eq!(ty, Value::Type(TypeRef::class("java.lang.String")));

        let err = s.fault(|b| vec![b.class_literal("NoSuchType")]);
        assert!(matches!(err.kind, EvalErrorKind::UndefinedName { .. }));
    }

    #[test]
    fn allocation_initializer_must_match_dimensions() {
        let mut s = Script::new();
        let err = s.fault(|b| {
            let items = vec![b.int(1), b.int(2)];
            let init = b.array_init(items);
            vec![b.new_array_init("int", 2, init)]
        });
        assert!(matches!(
            err.kind,
            EvalErrorKind::ArrayDimensionMismatch {
                expected: 2,
                found: 1
            }
        ));

        let values = s.ok(|b| {
            let items = vec![b.int(1), b.int(2)];
            let init = b.array_init(items);
            let array = b.new_array_init("long", 1, init);
            let one = b.int(1);
            vec![b.index(array, one)]
        });
        assert_eq!(values, Value::long(2));
    }
}
