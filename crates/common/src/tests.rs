use super::*;
use proptest::prelude::*;
use std::cmp::Ordering;
use types::Value;

fn comp_ops() -> [CompOp; 6] {
    [
        CompOp::Eq,
        CompOp::Ne,
        CompOp::Lt,
        CompOp::Le,
        CompOp::Gt,
        CompOp::Ge,
    ]
}

#[test]
fn swap_is_an_involution() {
    for op in comp_ops() {
        assert_eq!(op.swapped().swapped(), op);
    }
}

#[test]
fn swap_maps_relational_pairs() {
    assert_eq!(CompOp::Eq.swapped(), CompOp::Eq);
    assert_eq!(CompOp::Ne.swapped(), CompOp::Ne);
    assert_eq!(CompOp::Lt.swapped(), CompOp::Gt);
    assert_eq!(CompOp::Le.swapped(), CompOp::Ge);
    assert_eq!(CompOp::Gt.swapped(), CompOp::Lt);
    assert_eq!(CompOp::Ge.swapped(), CompOp::Le);
}

#[test]
fn tabcol_equality_ignores_alias() {
    let plain = TabCol::new("t", "a");
    let aliased = TabCol::new("t", "a").with_alias("x");
    assert_eq!(plain, aliased);

    let other = TabCol::new("t", "b");
    assert_ne!(plain, other);
}

#[test]
fn swap_sides_reverses_join_condition() {
    let mut cond = Condition::with_col(TabCol::new("t2", "x"), CompOp::Lt, TabCol::new("t1", "y"));
    cond.swap_sides();

    assert_eq!(cond.lhs, TabCol::new("t1", "y"));
    assert_eq!(cond.op, CompOp::Gt);
    assert_eq!(cond.rhs, Rhs::Col(TabCol::new("t2", "x")));
}

#[test]
fn swap_sides_leaves_single_sided_condition_alone() {
    let mut cond = Condition::with_val(TabCol::new("t", "a"), CompOp::Le, Value::Int(5));
    let before = cond.clone();
    cond.swap_sides();
    assert_eq!(cond, before);
}

#[test]
fn condition_displays_as_sql() {
    let cond = Condition::with_val(TabCol::new("t", "a"), CompOp::Ge, Value::Int(10));
    assert_eq!(cond.to_string(), "t.a >= 10");

    let join = Condition::with_col(TabCol::new("r", "x"), CompOp::Eq, TabCol::new("s", "u"));
    assert_eq!(join.to_string(), "r.x = s.u");
}

#[test]
fn set_knob_flips_the_right_flag() {
    let mut config = PlannerConfig::default();
    config.set_knob(Knob::NestLoop, false);
    assert!(!config.enable_nestedloop_join);
    assert!(config.enable_sortmerge_join);

    config.set_knob(Knob::SortMerge, false);
    assert!(!config.enable_sortmerge_join);
}

proptest! {
    // A op B must agree with B swap(op) A for every ordering of operands.
    #[test]
    fn swapped_operator_preserves_meaning(a in any::<i64>(), b in any::<i64>()) {
        let ord = a.cmp(&b);
        for op in comp_ops() {
            prop_assert_eq!(op.matches(ord), op.swapped().matches(ord.reverse()));
        }
    }

    // Ordering evaluation is exhaustive and consistent with Eq/Ne duality.
    #[test]
    fn eq_and_ne_partition_orderings(a in any::<i64>(), b in any::<i64>()) {
        let ord = a.cmp(&b);
        prop_assert_ne!(CompOp::Eq.matches(ord), CompOp::Ne.matches(ord));
        prop_assert_eq!(CompOp::Le.matches(ord), !CompOp::Gt.matches(ord));
        prop_assert_eq!(CompOp::Ge.matches(ord), !CompOp::Lt.matches(ord));
    }
}

#[test]
fn orderings_evaluate_correctly() {
    assert!(CompOp::Lt.matches(Ordering::Less));
    assert!(CompOp::Le.matches(Ordering::Equal));
    assert!(CompOp::Ge.matches(Ordering::Greater));
    assert!(!CompOp::Eq.matches(Ordering::Less));
}
