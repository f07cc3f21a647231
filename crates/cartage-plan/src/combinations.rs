//! Lexicographic k-subset enumeration.

/// All `select`-element subsets of `0..from_set`, in lexicographic order
/// (first position ascending, then second, and so on):
///
/// ```text
/// combinations(2, 4) = [0,1] [0,2] [0,3] [1,2] [1,3] [2,3]
/// ```
///
/// `select == 0` and `select > from_set` both yield nothing.
pub fn combinations(select: usize, from_set: usize) -> Vec<Vec<usize>> {
    let mut out = Vec::new();
    if select == 0 {
        return out;
    }
    let mut selection = Vec::with_capacity(select);
    generate(select, 0, from_set, &mut selection, &mut out);
    out
}

fn generate(
    select: usize,
    start: usize,
    end: usize,
    selection: &mut Vec<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if select == 0 {
        out.push(selection.clone());
        return;
    }
    let remaining = select - 1;
    // Leave room for the elements still to be chosen.
    for i in start..end.saturating_sub(remaining) {
        selection.push(i);
        generate(remaining, i + 1, end, selection, out);
        selection.pop();
    }
}
