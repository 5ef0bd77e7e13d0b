//! Integration tests for the deallocation-insertion pass.

use fern_asr::{ArrayDim, Asr, Intent, StmtId, StmtTag, SymbolId, Ttype};
use fern_common::Span;
use fern_pass::{PassManager, PassOptions, pass_insert_deallocate};
use fern_syntax::AstArena;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn lower(source: &str) -> Asr {
    let mut arena = AstArena::new();
    let unit = fern_parser::parse(&mut arena, source).expect("source should parse");
    fern_asr::lower(&arena, &unit).expect("source should lower")
}

fn run_default_passes(asr: &mut Asr) {
    PassManager::with_default_passes(PassOptions { verify: true }).run(asr);
}

/// Names released by the implicit deallocate ending `scope`, if any.
fn implicit_release(asr: &Asr, scope: SymbolId) -> Option<Vec<&str>> {
    let last = *asr.body(scope).last()?;
    let vars = asr.stmt(last).kind.as_implicit_deallocate()?;
    Some(vars.iter().map(|&v| asr.symbol_name(v)).collect())
}

// ============================================================================
// From source
// ============================================================================

#[test]
fn test_program_and_contained_subroutine() {
    let mut asr = lower(
        "\
program main
  implicit none
  real, allocatable :: a(:), b(:)
  integer :: n
  n = 3
  allocate(a(n), b(n))
  deallocate(b)
  call fill(a)
contains
  subroutine fill(x)
    real, allocatable, intent(inout) :: x(:)
    real, allocatable :: tmp(:)
    allocate(tmp(3))
  end subroutine fill
end program main
",
    );
    run_default_passes(&mut asr);

    let main = asr.lookup(asr.global_scope(), "main").unwrap();
    let fill = asr.lookup(asr.scope_symtab(main), "fill").unwrap();
    assert_eq!(implicit_release(&asr, main), Some(vec!["a"]));
    // The dummy argument belongs to the caller.
    assert_eq!(implicit_release(&asr, fill), Some(vec!["tmp"]));
}

#[test]
fn test_release_inside_loop_is_not_counted() {
    let mut asr = lower(
        "\
program p
  real, allocatable :: a(:)
  integer :: i
  allocate(a(2))
  do i = 1, 2
    if (i == 2) deallocate(a)
  end do
end program
",
    );
    run_default_passes(&mut asr);

    let p = asr.lookup(asr.global_scope(), "p").unwrap();
    let tags: Vec<_> = asr
        .body(p)
        .iter()
        .map(|&s| asr.stmt(s).kind.tag())
        .collect();
    assert_eq!(
        tags,
        vec![StmtTag::Allocate, StmtTag::DoLoop, StmtTag::ImplicitDeallocate]
    );
}

#[test]
fn test_scalars_and_fixed_arrays_are_left_alone() {
    let mut asr = lower(
        "\
function f(x) result(r)
  real :: x, r
  real :: fixed(4)
  real, allocatable :: s
  r = x
end function
",
    );
    let before = fern_asr::render(&asr);
    run_default_passes(&mut asr);
    assert_eq!(fern_asr::render(&asr), before);
}

#[test]
fn test_rendered_output() {
    let mut asr = lower(
        "\
program demo
  real, allocatable :: w(:)
  allocate(w(8))
  w(1) = 1.0
end program demo
",
    );
    run_default_passes(&mut asr);
    assert_eq!(
        fern_asr::render(&asr),
        "\
program demo
  variable w: allocatable real(4)(:) [local]
  allocate(w(8))
  w(1) = 1.0
  implicit deallocate(w)
"
    );
}

// ============================================================================
// Properties over generated scopes
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Release {
    Never,
    Direct,
    Nested,
}

#[derive(Debug, Clone)]
struct VarSpec {
    allocatable: bool,
    array: bool,
    intent: Intent,
    release: Release,
}

impl VarSpec {
    fn ttype(&self) -> Ttype {
        let mut ttype = Ttype::DEFAULT_REAL;
        if self.array {
            ttype = Ttype::Array {
                element: Box::new(ttype),
                dims: vec![ArrayDim::Deferred],
            };
        }
        if self.allocatable {
            ttype = Ttype::Allocatable(Box::new(ttype));
        }
        ttype
    }

    fn needs_release(&self) -> bool {
        self.allocatable
            && self.array
            && self.intent == Intent::Local
            && self.release != Release::Direct
    }
}

#[derive(Debug, Clone)]
struct ScopeSpec {
    function: bool,
    vars: Vec<VarSpec>,
    inner: Vec<VarSpec>,
}

fn arb_intent() -> impl Strategy<Value = Intent> {
    prop_oneof![
        4 => Just(Intent::Local),
        1 => Just(Intent::In),
        1 => Just(Intent::Out),
        1 => Just(Intent::InOut),
        1 => Just(Intent::Unspecified),
    ]
}

fn arb_release() -> impl Strategy<Value = Release> {
    prop_oneof![
        Just(Release::Never),
        Just(Release::Direct),
        Just(Release::Nested),
    ]
}

fn arb_var() -> impl Strategy<Value = VarSpec> {
    (any::<bool>(), any::<bool>(), arb_intent(), arb_release()).prop_map(
        |(allocatable, array, intent, release)| VarSpec {
            allocatable,
            array,
            intent,
            // Only allocatables can appear in a deallocate statement.
            release: if allocatable { release } else { Release::Never },
        },
    )
}

fn arb_scope() -> impl Strategy<Value = ScopeSpec> {
    (
        any::<bool>(),
        prop::collection::vec(arb_var(), 0..8),
        prop::collection::vec(arb_var(), 0..4),
    )
        .prop_map(|(function, vars, inner)| ScopeSpec {
            function,
            vars,
            inner,
        })
}

fn arb_unit() -> impl Strategy<Value = Vec<ScopeSpec>> {
    prop::collection::vec(arb_scope(), 1..4)
}

/// Declare `vars` in `scope` and emit their releases. Returns the variables
/// the pass must release, in table order.
fn populate(asr: &mut Asr, scope: SymbolId, vars: &[VarSpec]) -> Vec<SymbolId> {
    let table = asr.scope_symtab(scope);
    let mut expected = Vec::new();
    for (i, spec) in vars.iter().enumerate() {
        let name = format!("v{i}");
        let var = asr.make_variable(table, &name, spec.intent, spec.ttype(), Span::DUMMY);
        match spec.release {
            Release::Never => {}
            Release::Direct => {
                let stmt = asr.make_explicit_deallocate(vec![var], Span::DUMMY);
                asr.append_stmt(scope, stmt);
            }
            Release::Nested => {
                let stmt = asr.make_explicit_deallocate(vec![var], Span::DUMMY);
                let test = asr.make_logical_constant(true, Ttype::DEFAULT_LOGICAL, Span::DUMMY);
                let branch = asr.make_if(test, vec![stmt], Vec::new(), Span::DUMMY);
                asr.append_stmt(scope, branch);
            }
        }
        if spec.needs_release() {
            expected.push(var);
        }
    }
    expected
}

fn build(unit: &[ScopeSpec]) -> (Asr, Vec<(SymbolId, Vec<SymbolId>)>) {
    let mut asr = Asr::new(Span::DUMMY);
    let global = asr.global_scope();
    let mut scopes = Vec::new();

    for (i, spec) in unit.iter().enumerate() {
        let name = format!("s{i}");
        let scope = if spec.function {
            asr.make_function(global, &name, Span::DUMMY)
        } else {
            asr.make_program(global, &name, Span::DUMMY)
        };
        let expected = populate(&mut asr, scope, &spec.vars);
        scopes.push((scope, expected));

        let table = asr.scope_symtab(scope);
        let inner = asr.make_function(table, "inner", Span::DUMMY);
        let expected = populate(&mut asr, inner, &spec.inner);
        scopes.push((inner, expected));
    }
    (asr, scopes)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn prop_release_names_exactly_the_unreleased_locals(unit in arb_unit()) {
        let (mut asr, scopes) = build(&unit);
        let before: Vec<Vec<StmtId>> = scopes
            .iter()
            .map(|(scope, _)| asr.body(*scope).to_vec())
            .collect();

        pass_insert_deallocate(&mut asr, &PassOptions { verify: true });

        for ((scope, expected), before) in scopes.iter().zip(&before) {
            let body = asr.body(*scope);
            let synthetic = body
                .iter()
                .filter(|&&stmt| asr.stmt(stmt).kind.is_a(StmtTag::ImplicitDeallocate))
                .count();
            // Existing statements keep their order.
            prop_assert_eq!(&body[..before.len()], before.as_slice());

            if expected.is_empty() {
                prop_assert_eq!(synthetic, 0);
                prop_assert_eq!(body.len(), before.len());
            } else {
                prop_assert_eq!(synthetic, 1);
                prop_assert_eq!(body.len(), before.len() + 1);
                let last = body[before.len()];
                prop_assert_eq!(asr.stmt(last).kind.implicit_deallocate(), expected.as_slice());
            }
        }
    }

    #[test]
    fn prop_second_run_is_a_no_op(unit in arb_unit()) {
        let (mut asr, _) = build(&unit);
        let options = PassOptions { verify: true };

        pass_insert_deallocate(&mut asr, &options);
        let once = fern_asr::render(&asr);
        let stmts = asr.stmts.len();

        pass_insert_deallocate(&mut asr, &options);
        prop_assert_eq!(fern_asr::render(&asr), once);
        prop_assert_eq!(asr.stmts.len(), stmts);
    }
}
