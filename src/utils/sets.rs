//! In-memory set algebra over member lists fetched from the backend. Results keep the order in
//! which members were first seen.

use bytes::Bytes;
use itertools::Itertools;
use std::collections::HashSet;

pub fn union(sets: Vec<Vec<Bytes>>) -> Vec<Bytes> {
    sets.into_iter().flatten().unique().collect()
}

pub fn intersection(sets: Vec<Vec<Bytes>>) -> Vec<Bytes> {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return vec![];
    };

    let others: Vec<HashSet<Bytes>> = sets.map(|set| set.into_iter().collect()).collect();

    first
        .into_iter()
        .unique()
        .filter(|member| others.iter().all(|set| set.contains(member)))
        .collect()
}

pub fn difference(sets: Vec<Vec<Bytes>>) -> Vec<Bytes> {
    let mut sets = sets.into_iter();
    let Some(first) = sets.next() else {
        return vec![];
    };

    let others: HashSet<Bytes> = sets.flatten().collect();

    first
        .into_iter()
        .unique()
        .filter(|member| !others.contains(member))
        .collect()
}
