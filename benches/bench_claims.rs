use anagram_thief_core::dictionary::Dictionary;
use anagram_thief_core::engine::claims::{enumerate, ExistingWord};
use anagram_thief_core::ids::{PlayerId, WordId};
use anagram_thief_core::tiles::{Letter, Tile};
use criterion::{criterion_group, criterion_main, Criterion};

fn tiles_for(word: &str) -> Vec<Tile> {
    word.chars().map(|c| Tile::new(Letter::from_char(c).unwrap())).collect()
}

fn bench_enumerate(c: &mut Criterion, name: &str, center_word: &str, existing: &[&str]) {
    let dictionary = Dictionary::builtin();
    let center = tiles_for(center_word);
    let existing_words: Vec<ExistingWord> = existing
        .iter()
        .map(|word| {
            let tile_ids = tiles_for(word).iter().map(|t| t.id).collect();
            ExistingWord {
                word_id: WordId::new(),
                owner_id: PlayerId::new(),
                text: word.to_string(),
                tile_ids,
            }
        })
        .collect();

    c.bench_function(&format!("enumerate.{name}"), |b| {
        b.iter(|| enumerate(&center, &existing_words, &dictionary))
    });
}

fn criterion_benchmark(c: &mut Criterion) {
    bench_enumerate(c, "bare_center", "STARELING", &[]);
}

fn slow_benchmarks(c: &mut Criterion) {
    bench_enumerate(c, "with_steal_targets", "STARELINGCOMPUTED", &["RATE", "STING", "COMPUTE"]);
}

criterion_group! {
    name = benches;
    config = Criterion::default()
        .sample_size(60);
    targets = criterion_benchmark
}

criterion_group! {
    name = slow;
    config = Criterion::default()
        .sample_size(10);
    targets = slow_benchmarks
}

criterion_main!(benches, slow);
