use super::*;
use crate::config::DEFAULT_MAX_CALL_DEPTH;
use zoola_ir::{AstBuilder, BinaryOp, PrimitiveKind};

fn interpreter() -> Interpreter {
    InterpreterBuilder::new().build()
}

mod builder {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults() {
        let interp = interpreter();
        assert!(!interp.config().strict_java);
        assert_eq!(interp.config().max_call_depth, Some(DEFAULT_MAX_CALL_DEPTH));
        assert_eq!(interp.call_stack().depth(), 1);
    }

    #[test]
    fn setters_override_config() {
        let interp = InterpreterBuilder::new()
            .strict_java(true)
            .max_call_depth(None)
            .build();
        assert!(interp.config().strict_java);
        assert_eq!(interp.config().max_call_depth, None);
    }

    #[test]
    fn shared_runtime_wins_over_collaborators() {
        let first = interpreter();
        let second = InterpreterBuilder::new()
            .shared(first.runtime().clone())
            .host(Arc::new(crate::host::BasicHost::new()))
            .build();
        assert!(Arc::ptr_eq(&first.runtime().monitors, &second.runtime().monitors));
        assert!(Arc::ptr_eq(&first.runtime().host, &second.runtime().host));
    }
}

mod scope_guards {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn scoped_releases_its_scope() {
        let mut interp = interpreter();
        let before = interp.scopes().live_count();
        let global = interp.call_stack().top();
        {
            let mut scoped = interp.scoped();
            assert_ne!(scoped.scope(), global);
            assert_eq!(scoped.call_stack().top(), scoped.scope());
            assert_eq!(scoped.scopes().live_count(), before + 1);
            scoped.set_variable("inner", Value::int(1)).unwrap();
            assert_eq!(scoped.get_variable("inner").unwrap(), Some(Value::int(1)));
        }
        assert_eq!(interp.call_stack().top(), global);
        assert_eq!(interp.scopes().live_count(), before);
        assert_eq!(interp.get_variable("inner").unwrap(), None);
    }

    #[test]
    fn nested_block_scopes_unwind_in_order() {
        let mut interp = interpreter();
        let before = interp.scopes().live_count();
        let live = interp.with_block_scope(|outer| {
            outer.with_block_scope(|inner| inner.scopes().live_count())
        });
        assert_eq!(live, before + 2);
        assert_eq!(interp.scopes().live_count(), before);
    }

    #[test]
    fn frame_guard_restores_after_fault() {
        let mut interp = interpreter();
        let mut b = AstBuilder::new(interp.runtime().interner.clone());
        // fail() { return 1 / 0; }
        let one = b.int(1);
        let zero = b.int(0);
        let quotient = b.binary(BinaryOp::Div, one, zero);
        let ret = b.ret(Some(quotient));
        let body = b.block(vec![ret]);
        let decl = b.method("fail", None, vec![], body);
        let root = b.block(vec![decl]);
        interp.eval(&b.finish(root)).unwrap();

        let before = interp.scopes().live_count();
        let err = interp.invoke_method("fail", vec![]).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::Thrown(_)));
        assert_eq!(interp.call_stack().depth(), 1);
        assert_eq!(interp.scopes().live_count(), before);
    }
}

mod variables {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn set_then_get() {
        let mut interp = interpreter();
        assert_eq!(interp.get_variable("x").unwrap(), None);
        interp.set_variable("x", Value::int(3)).unwrap();
        assert_eq!(interp.get_variable("x").unwrap(), Some(Value::int(3)));
    }

    #[test]
    fn declared_type_converts_and_checks() {
        let mut interp = interpreter();
        interp
            .declare_variable("wide", TypeRef::primitive(PrimitiveKind::Long), Value::int(7))
            .unwrap();
        assert_eq!(interp.get_variable("wide").unwrap(), Some(Value::long(7)));

        let err = interp.set_variable("wide", Value::string("seven")).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::TypeMismatch { .. }));

        let err = interp
            .declare_variable("wide", TypeRef::primitive(PrimitiveKind::Long), Value::long(1))
            .unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::Redeclared { .. }));
    }

    #[test]
    fn strict_mode_rejects_undeclared_writes() {
        let mut interp = InterpreterBuilder::new().strict_java(true).build();
        let err = interp.set_variable("x", Value::int(1)).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::Strict { .. }));
    }
}

mod invocation {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn invoke_declared_method() {
        let mut interp = interpreter();
        let mut b = AstBuilder::new(interp.runtime().interner.clone());
        // twice(int n) { return n * 2; }
        let n = b.ident("n");
        let two = b.int(2);
        let product = b.binary(BinaryOp::Mul, n, two);
        let ret = b.ret(Some(product));
        let body = b.block(vec![ret]);
        let param = b.param("n", Some("int"));
        let decl = b.method("twice", None, vec![param], body);
        let root = b.block(vec![decl]);
        interp.eval(&b.finish(root)).unwrap();

        let result = interp.invoke_method("twice", vec![Value::int(21)]).unwrap();
        assert_eq!(result, Value::int(42));
    }

    #[test]
    fn unknown_method() {
        let mut interp = interpreter();
        let err = interp.invoke_method("nope", vec![Value::int(1)]).unwrap_err();
        let EvalErrorKind::UndefinedMethod { signature } = &err.kind else {
            panic!("expected an undefined method, got {}", err.kind);
        };
        assert_eq!(signature, "nope/1");
    }

    #[test]
    fn unit_results() {
        let mut interp = interpreter();
        let mut b = AstBuilder::new(interp.runtime().interner.clone());
        let one = b.int(1);
        let early = b.ret(Some(one));
        let two = b.int(2);
        let root = b.block(vec![early, two]);
        assert_eq!(interp.eval(&b.finish(root)).unwrap(), Value::int(1));

        let mut b = AstBuilder::new(interp.runtime().interner.clone());
        let stray = b.brk();
        let root = b.block(vec![stray]);
        let err = interp.eval(&b.finish(root)).unwrap_err();
        assert!(matches!(err.kind, EvalErrorKind::MisplacedControl { .. }));
    }
}
