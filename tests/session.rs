use deffn::{ErrorKind, Limits, Outcome, Session};

fn value(session: &mut Session, line: &str) -> i64 {
    match session.evaluate(line) {
        Ok(Outcome::Value(value)) => value,
        other => panic!("\"{line}\" gave {other:?}"),
    }
}

fn error_kind(session: &mut Session, line: &str) -> ErrorKind {
    match session.evaluate(line) {
        Err(err) => err.kind(),
        Ok(outcome) => panic!("\"{line}\" unexpectedly gave {outcome}"),
    }
}

#[test]
fn definition_then_call_matches_substitution() {
    let mut session = Session::new();
    session
        .evaluate("deffn poly(a,b,c) = a*a + b*c - (a > b ? c : 1)")
        .unwrap();
    assert_eq!(
        value(&mut session, "poly(3, 2+1, 4)"),
        value(&mut session, "3*3 + (2+1)*4 - (3 > (2+1) ? 4 : 1)")
    );
    assert_eq!(
        value(&mut session, "poly(5, 1, 7)"),
        value(&mut session, "5*5 + 1*7 - (5 > 1 ? 7 : 1)")
    );
}

#[test]
fn undefined_variable_reads_zero_twice() {
    let mut session = Session::new();
    assert_eq!(value(&mut session, "ghost"), 0);
    assert_eq!(value(&mut session, "ghost"), 0);
    assert_eq!(session.variables().get("ghost"), Some(0));
}

#[test]
fn left_associativity_and_precedence() {
    let mut session = Session::new();
    assert_eq!(value(&mut session, "8-3-2"), 3);
    assert_eq!(value(&mut session, "2+3*4"), 14);
    assert_eq!(value(&mut session, "(2+3)*4"), 20);
    assert_eq!(value(&mut session, "100/10/5"), 2);
}

#[test]
fn untaken_branch_is_never_evaluated() {
    let mut session = Session::new();
    assert_eq!(value(&mut session, "1?5:10/0"), 5);
    assert_eq!(error_kind(&mut session, "0?5:10/0"), ErrorKind::ArithmeticFault);
    assert_eq!(value(&mut session, "0?(hit=1):2"), 2);
    assert_eq!(session.variables().get("hit"), None);
}

#[test]
fn recursion() {
    let mut session = Session::new();
    let defined = session
        .evaluate("deffn fact(n)=n<=1?1:n*fact(n-1)")
        .unwrap();
    assert_eq!(defined.to_string(), "Define fact(n)");
    assert_eq!(value(&mut session, "fact(5)"), 120);
    assert_eq!(value(&mut session, "fact(20)"), 2432902008176640000);
}

#[test]
fn implicit_previous_value() {
    let mut session = Session::new();
    assert_eq!(value(&mut session, "7"), 7);
    assert_eq!(value(&mut session, "+5"), 12);
    assert_eq!(value(&mut session, "%5"), 2);
    // A failed request leaves the previous value alone.
    assert_eq!(error_kind(&mut session, "/0"), ErrorKind::ArithmeticFault);
    assert_eq!(value(&mut session, "*10"), 20);
}

#[test]
fn redefinition_replaces_body() {
    let mut session = Session::new();
    session.evaluate("deffn sqr(s)=s*s").unwrap();
    session.evaluate("deffn sqr(s)=s*s*s").unwrap();
    assert_eq!(value(&mut session, "sqr(3)"), 27);
    assert_eq!(session.functions().len(), 1);
}

#[test]
fn call_assignments_stay_local() {
    let mut session = Session::new();
    session.evaluate("deffn setx(v)=x=v").unwrap();
    assert_eq!(value(&mut session, "x=4"), 4);
    assert_eq!(value(&mut session, "setx(9)"), 9);
    assert_eq!(value(&mut session, "x"), 4);

    // `x` bound as a parameter of an enclosing call: the inner call's
    // assignment leaves the outer binding untouched as well.
    session.evaluate("deffn outer(x)=setx(x+1)*100+x").unwrap();
    assert_eq!(value(&mut session, "outer(2)"), 302);
    assert_eq!(value(&mut session, "x"), 4);

    // Assigning a parameter inside its own call only changes the local copy.
    session.evaluate("deffn bump(x)=(x=x+1)+x").unwrap();
    assert_eq!(value(&mut session, "bump(5)"), 12);
    assert_eq!(value(&mut session, "x"), 4);
}

#[test]
fn missing_arguments_default_to_zero() {
    let mut session = Session::new();
    session.evaluate("deffn sum3(x,y,z)=x+y+z+100").unwrap();
    assert_eq!(value(&mut session, "sum3(1)"), 101);
    assert_eq!(value(&mut session, "sum3()"), 100);
    assert_eq!(error_kind(&mut session, "sum3(1,2,3,4)"), ErrorKind::ArityMismatch);
}

#[test]
fn functions_resolve_by_name_at_call_time() {
    let mut session = Session::new();
    session.evaluate("deffn twice(n)=helper(n)*2").unwrap();
    assert_eq!(error_kind(&mut session, "twice(3)"), ErrorKind::UndefinedFunction);
    session.evaluate("deffn helper(n)=n+1").unwrap();
    assert_eq!(value(&mut session, "twice(3)"), 8);
}

#[test]
fn error_kinds() {
    let mut session = Session::new();
    assert_eq!(error_kind(&mut session, "(1+2"), ErrorKind::MalformedSyntax);
    assert_eq!(error_kind(&mut session, "1+2)"), ErrorKind::MalformedSyntax);
    assert_eq!(error_kind(&mut session, "1 @ 2"), ErrorKind::MalformedSyntax);
    assert_eq!(error_kind(&mut session, "(a+1)=5"), ErrorKind::MalformedSyntax);
    assert_eq!(error_kind(&mut session, "nothing(1)"), ErrorKind::UndefinedFunction);
    assert_eq!(error_kind(&mut session, "5%0"), ErrorKind::ArithmeticFault);
    assert_eq!(
        error_kind(&mut session, "deffn f(a,b,c,d,e,f,g,h,i,j,k)=1"),
        ErrorKind::ParameterOrArgumentOverflow
    );
    assert_eq!(
        error_kind(&mut session, "g(1,2,3,4,5,6,7,8,9,10,11)"),
        ErrorKind::ParameterOrArgumentOverflow
    );
    assert!(session.variables().is_empty());
    assert!(session.functions().is_empty());
    // The session keeps accepting requests.
    assert_eq!(value(&mut session, "1+1"), 2);
}

#[test]
fn failed_definition_keeps_previous_one() {
    let mut session = Session::new();
    session.evaluate("deffn sqr(s)=s*s").unwrap();
    assert_eq!(error_kind(&mut session, "deffn sqr(s)=s*"), ErrorKind::MalformedSyntax);
    assert_eq!(value(&mut session, "sqr(4)"), 16);
}

#[test]
fn runaway_recursion_is_reported() {
    let mut session = Session::with_limits(Limits {
        max_call_depth: 32,
        ..Limits::default()
    });
    session.evaluate("deffn forever(n)=forever(n+1)").unwrap();
    assert_eq!(error_kind(&mut session, "forever(0)"), ErrorKind::CallDepthExceeded);
    session.evaluate("deffn count(n)=n<=0?0:1+count(n-1)").unwrap();
    assert_eq!(value(&mut session, "count(31)"), 31);
    assert_eq!(error_kind(&mut session, "count(32)"), ErrorKind::CallDepthExceeded);
}

#[test]
fn chained_assignment_and_conditionals() {
    let mut session = Session::new();
    assert_eq!(value(&mut session, "a=b=5"), 5);
    assert_eq!(session.variables().get("a"), Some(5));
    assert_eq!(session.variables().get("b"), Some(5));
    assert_eq!(value(&mut session, "0?1:0?2:3"), 3);
    assert_eq!(value(&mut session, "0?1:1?2:3"), 2);
    assert_eq!(value(&mut session, "1?0?4:5:6"), 5);
}

#[test]
fn variable_listing() {
    let mut session = Session::new();
    session.evaluate("zed = 3").unwrap();
    session.evaluate("abc = zed * 2").unwrap();
    assert_eq!(session.variables().to_string(), "abc = 6\nzed = 3\n");
}

#[test]
fn redefinition_can_rename_parameters() {
    let mut session = Session::new();
    session.evaluate("deffn f(a)=a").unwrap();
    session.evaluate("deffn f(b)=b*2").unwrap();
    assert_eq!(value(&mut session, "f(3)"), 6);
    assert_eq!(session.functions().to_string(), "f(b)\n");
}

#[test]
fn deeply_nested_input_is_rejected() {
    let mut session = Session::new();
    session.evaluate("keep = 11").unwrap();

    let n = 100_000;
    let parens = format!("{}1{}", "(".repeat(n), ")".repeat(n));
    assert_eq!(error_kind(&mut session, &parens), ErrorKind::MalformedSyntax);
    let sum = format!("1{}", "+1".repeat(200_000));
    assert_eq!(error_kind(&mut session, &sum), ErrorKind::MalformedSyntax);
    let negations = format!("{}1", "-".repeat(100_000));
    assert_eq!(error_kind(&mut session, &negations), ErrorKind::MalformedSyntax);

    assert_eq!(value(&mut session, "1+1"), 2);
    assert_eq!(session.variables().get("keep"), Some(11));
}

#[test]
fn moderately_nested_input_still_evaluates() {
    let mut session = Session::new();
    let parens = format!("{}1{}", "(".repeat(100), ")".repeat(100));
    assert_eq!(value(&mut session, &parens), 1);
    let sum = format!("1{}", "+1".repeat(999));
    assert_eq!(value(&mut session, &sum), 1000);
}

#[test]
fn default_limits_hold_on_any_thread() {
    let mut session = Session::new();
    session.evaluate("deffn forever(n)=n<0?0:forever(n+1)").unwrap();
    assert_eq!(error_kind(&mut session, "forever(0)"), ErrorKind::CallDepthExceeded);
    session.evaluate("deffn sumto(n)=n==0?0:n+sumto(n-1)").unwrap();
    assert_eq!(value(&mut session, "sumto(1000)"), 500500);
    assert_eq!(value(&mut session, "1+1"), 2);
}
