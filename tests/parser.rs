//! Integration tests for fern-parser crate.

use fern_diagnostic::ErrorCode;
use fern_parser::{parse, parse_with_diagnostics};
use fern_syntax::visit::{self, Visitor};
use fern_syntax::{
    Attr, AstArena, BaseType, DimSpec, Expr, ExprKind, Item, StmtKind, TranslationUnit, UnitKind,
};
use pretty_assertions::assert_eq;

fn parse_ok(arena: &mut AstArena, source: &str) -> TranslationUnit {
    match parse(arena, source) {
        Ok(unit) => unit,
        Err(err) => panic!("parse failed: {err} ({:?})", err.diagnostics),
    }
}

fn error_codes(source: &str) -> Vec<ErrorCode> {
    let mut arena = AstArena::new();
    let (_, diagnostics) = parse_with_diagnostics(&mut arena, source);
    diagnostics.iter().filter_map(|d| d.code).collect()
}

#[derive(Default)]
struct NameCounter {
    names: usize,
}

impl<'ast> Visitor<'ast> for NameCounter {
    fn visit_expr(&mut self, expr: &'ast Expr, arena: &'ast AstArena) {
        if let ExprKind::Name(_) = expr.kind {
            self.names += 1;
        }
        visit::walk_expr(self, expr, arena);
    }
}

fn count_names(unit: &TranslationUnit, arena: &AstArena) -> usize {
    let mut counter = NameCounter::default();
    counter.visit_unit(unit, arena);
    counter.names
}

// ============================================================================
// Scale
// ============================================================================

#[test]
fn test_long_product_name_count() {
    let term = "(a*z+3+2*x + 3*y - x/(z**2-4) - x**(y**z))";
    let mut source = term.to_owned();
    for _ in 0..500 {
        source.push_str(" * ");
        source.push_str(term);
    }

    let mut arena = AstArena::new();
    let unit = parse_ok(&mut arena, &source);
    assert_eq!(unit.items.len(), 1);
    assert!(matches!(unit.items[0], Item::Expr(_)));
    assert_eq!(count_names(&unit, &arena), 4509);
    // Identifiers are interned once however often they appear.
    assert_eq!(arena.names.len(), 4);
}

#[test]
fn test_name_count_is_deterministic() {
    let source = "x = a*b + f(c, d(1))\ny = -x**2\n";
    let mut arena = AstArena::new();
    let unit = parse_ok(&mut arena, source);
    let first = count_names(&unit, &arena);
    assert_eq!(first, count_names(&unit, &arena));
    // `f(..)` and `d(..)` are calls or array items, not bare names.
    assert_eq!(first, 6);
}

// ============================================================================
// Program units
// ============================================================================

#[test]
fn test_program_with_declarations() {
    let source = "\
program demo
  implicit none
  integer :: n = 3
  real(8), allocatable :: a(:), b(:, :)
  real, dimension(10) :: c
  allocate(a(n), b(n, n))
  do i = 1, n
    a(i) = 2.0 * i
  end do
  deallocate(a)
end program demo
";
    let mut arena = AstArena::new();
    let unit = parse_ok(&mut arena, source);
    let Item::Unit(program) = &unit.items[0] else {
        panic!("expected a program unit");
    };

    assert_eq!(program.kind, UnitKind::Program);
    assert_eq!(arena.name(program.name.name), "demo");
    assert!(program.implicit_none);
    assert_eq!(program.decls.len(), 3);

    let reals = &program.decls[1];
    assert_eq!(reals.type_spec.base, BaseType::Real);
    assert_eq!(reals.type_spec.kind, Some(8));
    assert!(reals.attrs.iter().any(|a| matches!(a, Attr::Allocatable)));
    let b_dims = reals.entities[1].dims.as_ref().expect("b has dims");
    assert_eq!(b_dims, &vec![DimSpec::Deferred, DimSpec::Deferred]);

    assert_eq!(program.body.len(), 3);
    assert!(matches!(arena.stmt(program.body[0]).kind, StmtKind::Allocate(_)));
    assert!(matches!(arena.stmt(program.body[1]).kind, StmtKind::Do { .. }));
    assert!(matches!(arena.stmt(program.body[2]).kind, StmtKind::Deallocate(_)));
}

#[test]
fn test_function_with_result_and_contains() {
    let source = "\
program host
contains
  function square(x) result(r)
    real, intent(in) :: x
    real :: r
    r = x * x
  end function square
  subroutine hello()
    print *, 'hello', square(2.0)
  end subroutine
end program
";
    let mut arena = AstArena::new();
    let unit = parse_ok(&mut arena, source);
    let Item::Unit(host) = &unit.items[0] else {
        panic!("expected a program unit");
    };
    assert_eq!(host.contains.len(), 2);

    let square = &host.contains[0];
    let UnitKind::Function { result: Some(result) } = square.kind else {
        panic!("expected a function with a result clause");
    };
    assert_eq!(arena.name(result.name), "r");
    assert_eq!(square.args.len(), 1);

    let hello = &host.contains[1];
    assert_eq!(hello.kind, UnitKind::Subroutine);
    assert!(hello.args.is_empty());
    let StmtKind::Print(items) = &arena.stmt(hello.body[0]).kind else {
        panic!("expected print");
    };
    assert_eq!(items.len(), 2);
}

#[test]
fn test_if_else_blocks() {
    let source = "\
program p
  if (x > 0 .and. .not. done) then
    y = 1
  else
    y = 2
    return
  end if
end program
";
    let mut arena = AstArena::new();
    let unit = parse_ok(&mut arena, source);
    let Item::Unit(p) = &unit.items[0] else {
        panic!("expected a program unit");
    };
    let StmtKind::If {
        then_body,
        else_body,
        ..
    } = &arena.stmt(p.body[0]).kind
    else {
        panic!("expected if");
    };
    assert_eq!(then_body.len(), 1);
    assert_eq!(else_body.len(), 2);
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_errors_carry_codes() {
    assert_eq!(error_codes("x = (1 + 2\n"), vec![ErrorCode::UnclosedDelimiter]);
    assert_eq!(
        error_codes("program p\nend subroutine\n"),
        vec![ErrorCode::MismatchedEnd]
    );
}

#[test]
fn test_parse_reports_first_error() {
    let mut arena = AstArena::new();
    let err = parse(&mut arena, "x = = 1\n").expect_err("should fail");
    assert!(!err.diagnostics.is_empty());
    assert_eq!(err.span, err.diagnostics[0].span);
}

#[test]
fn test_recovery_keeps_later_units() {
    let source = "\
program broken
  x = = 1
end program
subroutine fine()
  y = 2
end subroutine
";
    let mut arena = AstArena::new();
    let (unit, diagnostics) = parse_with_diagnostics(&mut arena, source);
    assert!(!diagnostics.is_empty());
    let names: Vec<_> = unit
        .items
        .iter()
        .filter_map(|item| match item {
            Item::Unit(u) => Some(arena.name(u.name.name).to_owned()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["broken", "fine"]);
}

#[test]
fn test_fresh_arena_after_failure() {
    let mut arena = AstArena::new();
    assert!(parse(&mut arena, "program p\n  if (x) then\nend program\n").is_err());

    let mut arena = AstArena::new();
    let unit = parse_ok(&mut arena, "program q\n  x = 1\nend program\n");
    assert_eq!(unit.items.len(), 1);
}
