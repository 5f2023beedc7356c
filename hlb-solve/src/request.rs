use crate::llb::State;

/// Options attached to one `Leaf` submission — which exported filenames the
/// caller wants read back out of the result.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SolveOptions {
    pub targets: Vec<String>,
}

/// A tree of work to submit to a `Solver`. `Null` is deliberately not a
/// variant here — it's the identity element for `next`/`peer`, represented
/// by `None` at call sites so it never actually occupies a slot in a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveRequest {
    Leaf { state: State, opts: SolveOptions },
    Sequential(Vec<SolveRequest>),
    Parallel(Vec<SolveRequest>),
}

impl SolveRequest {
    pub fn leaf(state: State, opts: SolveOptions) -> Self {
        SolveRequest::Leaf { state, opts }
    }
}

/// Appends `r` after `acc` in sequence, aborting the remaining tree on first
/// failure at solve time. `acc == None` (the `Null` identity) is replaced by
/// `r` outright; a bare `Leaf`/`Parallel` accumulator is lifted into a
/// one-element `Sequential` before appending.
pub fn next(acc: Option<SolveRequest>, r: SolveRequest) -> SolveRequest {
    match acc {
        None => r,
        Some(SolveRequest::Sequential(mut items)) => {
            items.push(r);
            SolveRequest::Sequential(items)
        }
        Some(other) => SolveRequest::Sequential(vec![other, r]),
    }
}

/// Same shape as `next`, but for concurrent submission — failure of any
/// sibling cancels the others and the aggregate surfaces the first error.
pub fn peer(acc: Option<SolveRequest>, r: SolveRequest) -> SolveRequest {
    match acc {
        None => r,
        Some(SolveRequest::Parallel(mut items)) => {
            items.push(r);
            SolveRequest::Parallel(items)
        }
        Some(other) => SolveRequest::Parallel(vec![other, r]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf() -> SolveRequest {
        SolveRequest::leaf(State::new(), SolveOptions::default())
    }

    #[test]
    fn next_on_null_is_identity() {
        let r = next(None, leaf());
        assert!(matches!(r, SolveRequest::Leaf { .. }));
    }

    #[test]
    fn next_lifts_a_bare_leaf_into_sequential() {
        let r = next(Some(leaf()), leaf());
        match r {
            SolveRequest::Sequential(items) => assert_eq!(items.len(), 2),
            other => panic!("expected Sequential, got {other:?}"),
        }
    }

    #[test]
    fn next_extends_an_existing_sequential_in_place() {
        let r = next(Some(SolveRequest::Sequential(vec![leaf()])), leaf());
        match r {
            SolveRequest::Sequential(items) => assert_eq!(items.len(), 2),
            other => panic!("expected Sequential, got {other:?}"),
        }
    }

    #[test]
    fn peer_lifts_into_parallel() {
        let r = peer(Some(leaf()), leaf());
        assert!(matches!(r, SolveRequest::Parallel(items) if items.len() == 2));
    }

    #[test]
    fn next_and_peer_never_nest_a_lone_leaf_twice() {
        let built = next(next(None, leaf()), leaf());
        let built = next(Some(built), leaf());
        match built {
            SolveRequest::Sequential(items) => assert_eq!(items.len(), 3),
            other => panic!("expected a flat Sequential, got {other:?}"),
        }
    }
}
