//! Outer query conditions / subquery correlation pushdown:
//! `addGlobalCondition(param, columnId, cmpType)` lets an enclosing WHERE
//! push a comparison into this query.

///
/// CompareType
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CompareType {
    Equal,
    NotEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
}

///
/// PushTarget
///
/// Which clause a global condition lands in, per the query's shape.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum PushTarget {
    Where,
    Having,
    Qualify,
}

///
/// QueryShape
///
/// The subset of a query's structure that determines push target: flat
/// queries always push to WHERE; window queries to QUALIFY; group
/// queries push to WHERE when the column is itself a GROUP BY key,
/// otherwise to HAVING.
///

pub enum QueryShape<'a> {
    Flat,
    Window,
    Group { group_by_positions: &'a [usize] },
}

#[must_use]
pub fn resolve_push_target(shape: &QueryShape<'_>, column_id: usize) -> PushTarget {
    match shape {
        QueryShape::Flat => PushTarget::Where,
        QueryShape::Window => PushTarget::Qualify,
        QueryShape::Group { group_by_positions } => {
            if group_by_positions.contains(&column_id) {
                PushTarget::Where
            } else {
                PushTarget::Having
            }
        }
    }
}

///
/// GlobalCondition
///
/// What actually gets pushed. `NoOpBinding` is the safe fallback — a
/// no-op form `? ≡ ?` that still binds the parameter — used when the
/// referenced column expression cannot be compared as a whole-row
/// predicate.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum GlobalCondition {
    Comparison {
        param_index: usize,
        column_id: usize,
        cmp: CompareType,
    },
    NoOpBinding {
        param_index: usize,
    },
}

#[must_use]
pub const fn build_global_condition(
    param_index: usize,
    column_id: usize,
    cmp: CompareType,
    column_is_comparable: bool,
) -> GlobalCondition {
    if column_is_comparable {
        GlobalCondition::Comparison {
            param_index,
            column_id,
            cmp,
        }
    } else {
        GlobalCondition::NoOpBinding { param_index }
    }
}

/// `allowGlobalConditions`: false whenever OFFSET/FETCH or DISTINCT ON
/// would make a pushed-down outer comparison change which rows are
/// selected before the clause gets a chance to apply.
#[must_use]
pub const fn allow_global_conditions(has_offset_or_fetch: bool, has_distinct_on: bool) -> bool {
    !(has_offset_or_fetch || has_distinct_on)
}
