//! Permutation trie over action-sequence orderings.
//!
//! # Shape
//!
//! A slate of N jobs yields 2N slots, indexed so that slot `2k` is job k's
//! first action (pickup or suspend) and slot `2k+1` its second (dropoff or
//! terminator).  The trie holds every ordering of `0..2N` subject to one
//! rule: **an odd index may appear only after its even predecessor** — a
//! dropoff can never precede its own pickup, while actions of different jobs
//! interleave freely.  Full-length paths number `(2N)! / 2^N`.
//!
//! The trie is built once per planner for the maximum slate size and reused
//! for every search; slates with fewer real slots simply skip the nodes whose
//! key is out of range.

/// One node of the permutation trie: place slot `key` here, then continue
/// with any of `children`.
pub struct TrieNode {
    pub key: usize,
    pub children: Vec<TrieNode>,
}

/// Build the full ordering trie over `slot_count` slots.
///
/// The returned vec is the forest of first-position choices (always the even
/// indices, since no odd index can lead).
pub fn build_trie(slot_count: usize) -> Vec<TrieNode> {
    let tail: Vec<usize> = (0..slot_count).collect();
    build(&mut Vec::new(), &tail)
}

fn build(head: &mut Vec<usize>, tail: &[usize]) -> Vec<TrieNode> {
    let mut children = Vec::new();
    for &key in tail {
        // Even slots may go anywhere; odd slots need their even predecessor
        // already placed.
        if key % 2 == 0 || head.contains(&(key - 1)) {
            head.push(key);
            let rest: Vec<usize> = tail.iter().copied().filter(|&k| k != key).collect();
            children.push(TrieNode { key, children: build(head, &rest) });
            head.pop();
        }
    }
    children
}
