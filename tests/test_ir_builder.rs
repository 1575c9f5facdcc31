use csawir::{
    collections::linked_list::LinkedListNodePtr,
    frontend::parse_str,
    ir::{Builder, Context, Func, Inst, Ty, Value},
};

#[test]
fn test_builder_chain_order() {
    let mut ctx = Context::default();
    let num = Ty::num(&mut ctx);
    let ty = Ty::func(&mut ctx, num, vec![], false);
    let func = Func::new(&mut ctx, "main", ty);

    let mut builder = Builder::new();
    builder.start_insert(func, "L");

    let a = Inst::alloc(&mut ctx, num);
    let b = Inst::alloc(&mut ctx, num);
    let c = Inst::ret(&mut ctx, None);
    builder.append(&mut ctx, a).unwrap();
    builder.append(&mut ctx, b).unwrap();
    builder.append(&mut ctx, c).unwrap();

    assert_eq!(func.entry(&ctx), Some(a));
    assert_eq!(func.label_insts(&ctx, "L"), vec![a, b, c]);
    assert_eq!(a.next(&ctx), Some(b));
    assert_eq!(b.next(&ctx), Some(c));
    assert_eq!(c.next(&ctx), None);
    assert_eq!(c.prev(&ctx), Some(b));

    let label = func.label(&ctx, "L").unwrap();
    assert!([a, b, c].iter().all(|inst| inst.label(&ctx) == Some(label)));
}

#[test]
fn test_builder_label_switching() {
    let mut ctx = Context::default();
    let num = Ty::num(&mut ctx);
    let ty = Ty::func(&mut ctx, num, vec![num], false);
    let func = Func::new(&mut ctx, "abs", ty);

    let mut builder = Builder::new();
    builder.start_insert(func, "");

    let zero = builder.create_num(&mut ctx, 0.0);
    let cond = builder.create_num(&mut ctx, 1.0);
    builder.append_cjmp(&mut ctx, cond, "pos", "neg").unwrap();

    builder.set_insert_label("neg");
    let neg = builder.append_ret(&mut ctx, Some(zero)).unwrap();

    builder.set_insert_label("pos");
    let pos = builder.append_ret(&mut ctx, Some(zero)).unwrap();

    // going back to a label keeps appending to its tail
    builder.set_insert_label("neg");
    let tail = builder.append_jmp(&mut ctx, "pos").unwrap();

    assert_eq!(func.label_insts(&ctx, "neg"), vec![neg, tail]);
    assert_eq!(func.label_insts(&ctx, "pos"), vec![pos]);

    let names: Vec<&str> = func.labels(&ctx).iter().map(|l| l.name(&ctx)).collect();
    assert_eq!(names, vec!["", "neg", "pos"]);
}

#[test]
fn test_builder_call_builtin() {
    let mut ctx = Context::default();
    let num = Ty::num(&mut ctx);
    let ty = Ty::func(&mut ctx, num, vec![], false);
    let func = Func::new(&mut ctx, "roll", ty);

    let mut builder = Builder::new();
    builder.start_insert(func, "");

    let random = ctx.resolve_func("random", &[]).unwrap();
    let call = Inst::call(&mut ctx, random, vec![]);
    let value = call.value(&mut ctx);
    builder.append_set(&mut ctx, "x", value).unwrap();

    let floor = ctx.resolve_func("floor", &[num]).unwrap();
    let x = Value::reg(&mut ctx, "x", num);
    let call = builder.append_call(&mut ctx, floor, vec![x]).unwrap();

    assert_eq!(call.result_ty(&ctx), Some(num));
    let text = format!("{}", func.display(&ctx));
    assert_eq!(text, "def num roll\n\t%x call random\n\tcall floor %x num\nenddef");

    let parsed = parse_str(&text).unwrap();
    assert_eq!(format!("{}", parsed.display()), format!("{}", ctx.display()));
}
