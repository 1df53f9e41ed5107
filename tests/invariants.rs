use std::collections::{HashMap, HashSet};

use abstract_pairs::{
    CrossFieldPool, LabeledPair, PairLabel, PaperRecord, PartitionSizes, SplitFractions,
    build_pairs, mix_across_fields, partition, split,
};

fn records(field: &str, count: usize) -> Vec<PaperRecord> {
    (0..count)
        .map(|idx| {
            PaperRecord::new(
                format!("{field}-{idx}"),
                format!("{field} abstract {idx}"),
                format!("{field} text {idx}"),
            )
        })
        .collect()
}

fn sizes() -> PartitionSizes {
    PartitionSizes {
        same: 6,
        field: 5,
        mix: 4,
    }
}

fn origin(value: &str) -> (&str, &str) {
    let mut parts = value.split(' ');
    let field = parts.next().unwrap();
    (field, parts.last().unwrap())
}

#[test]
fn partition_roles_are_disjoint_for_every_seed() {
    let population = records("art", 23);
    for seed in 0..32 {
        let ids = population.iter().map(|record| record.id.clone());
        let partition = partition("art", ids, sizes(), seed).unwrap();
        assert_eq!(partition.same.len(), 6);
        assert_eq!(partition.field.len(), 5);
        assert_eq!(partition.mix.len(), 4);
        assert_eq!(partition.holdout.len(), 8);

        let mut seen = HashSet::new();
        for id in partition
            .same
            .iter()
            .chain(&partition.field)
            .chain(&partition.mix)
            .chain(&partition.holdout)
        {
            assert!(seen.insert(id.clone()), "seed {seed}: {id} in two roles");
        }
        assert_eq!(seen.len(), population.len());
    }
}

#[test]
fn rotated_pairs_never_match_their_own_text() {
    let population = records("econ", 19);
    for seed in 0..32 {
        let ids = population.iter().map(|record| record.id.clone());
        let partition = partition("econ", ids, sizes(), seed).unwrap();
        let pairs = build_pairs("econ", population.clone().into_iter().map(Ok), &partition)
            .unwrap()
            .labeled_pairs()
            .unwrap();
        assert_eq!(pairs.len(), 11);
        for pair in &pairs {
            let (_, a_idx) = origin(&pair.abstract_text);
            let (_, t_idx) = origin(&pair.text);
            match pair.pair_label() {
                Some(PairLabel::SamePaper) => assert_eq!(a_idx, t_idx),
                Some(PairLabel::SameField) => assert_ne!(a_idx, t_idx),
                other => panic!("seed {seed}: unexpected label {other:?}"),
            }
        }
    }
}

#[test]
fn mixing_preserves_every_held_out_text_and_abstract() {
    let fields = ["art", "econ", "geo", "hist", "phil"];
    let mut pool = CrossFieldPool::new();
    for field in fields {
        pool.push_field(field, records(field, 4));
    }
    for seed in 0..32 {
        let outcome = mix_across_fields(&pool, seed).unwrap();
        assert_eq!(outcome.pairs.len(), 20);
        assert_eq!(outcome.fixed_slots.len() + outcome.moved_groups, fields.len());

        let mut origins = outcome.source_field_for.clone();
        origins.sort_unstable();
        assert_eq!(origins, vec![0, 1, 2, 3, 4]);

        let texts: HashSet<&str> = outcome.pairs.iter().map(|pair| pair.text.as_str()).collect();
        let abstracts: HashSet<&str> = outcome
            .pairs
            .iter()
            .map(|pair| pair.abstract_text.as_str())
            .collect();
        assert_eq!(texts.len(), 20);
        assert_eq!(abstracts.len(), 20);

        for (slot, chunk) in outcome.pairs.chunks(4).enumerate() {
            for (position, pair) in chunk.iter().enumerate() {
                assert_eq!(pair.pair_label(), Some(PairLabel::CrossField));
                let (t_field, t_idx) = origin(&pair.text);
                let (a_field, a_idx) = origin(&pair.abstract_text);
                assert_eq!(t_field, fields[slot]);
                assert_eq!(a_field, fields[outcome.source_field_for[slot]]);
                // Inner order is kept: same position on both sides.
                assert_eq!(t_idx, position.to_string());
                assert_eq!(a_idx, t_idx);
            }
        }
        let moved = outcome
            .source_field_for
            .iter()
            .enumerate()
            .filter(|(slot, origin)| slot != *origin)
            .count();
        assert_eq!(moved, outcome.moved_groups);
    }
}

#[test]
fn split_partitions_the_population_for_every_seed() {
    let population: Vec<LabeledPair> = (0..137)
        .map(|idx| {
            LabeledPair::new(
                format!("abstract {idx}"),
                format!("text {idx}"),
                PairLabel::ALL[idx % 3],
            )
        })
        .collect();
    for seed in 0..16 {
        let splits = split(population.clone(), SplitFractions::default(), seed).unwrap();
        // ceil(13.7) = 14, ceil(12.3) = 13.
        assert_eq!(splits.test.len(), 14);
        assert_eq!(splits.dev.len(), 13);
        assert_eq!(splits.train.len(), 110);

        let mut counts: HashMap<&str, usize> = HashMap::new();
        for pair in splits
            .train
            .iter()
            .chain(&splits.dev)
            .chain(&splits.test)
        {
            *counts.entry(pair.abstract_text.as_str()).or_default() += 1;
            let idx: usize = origin(&pair.text).1.parse().unwrap();
            assert_eq!(pair.pair_label(), Some(PairLabel::ALL[idx % 3]));
        }
        assert_eq!(counts.len(), 137);
        assert!(counts.values().all(|count| *count == 1));
    }
}
