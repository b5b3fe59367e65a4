use criterion::{black_box, criterion_group, criterion_main, Criterion};
use qvote_types::{CandidateId, PollId, Salt};

fn keccak256_bench(c: &mut Criterion) {
    let data = [0xABu8; 128];

    c.bench_function("keccak256_128B", |b| {
        b.iter(|| qvote_crypto::keccak256(black_box(&data)))
    });
}

fn commitment_hash_bench(c: &mut Criterion) {
    let salt = Salt::new([7u8; 32]);

    c.bench_function("commitment_hash", |b| {
        b.iter(|| {
            qvote_crypto::commitment_hash(
                black_box(PollId::new(1)),
                black_box(5),
                black_box(CandidateId::new(2)),
                &salt,
            )
        })
    });
}

fn verify_commitment_bench(c: &mut Criterion) {
    let salt = Salt::new([7u8; 32]);
    let hash = qvote_crypto::commitment_hash(PollId::new(1), 5, CandidateId::new(2), &salt);

    c.bench_function("verify_commitment", |b| {
        b.iter(|| {
            qvote_crypto::verify_commitment(
                black_box(&hash),
                PollId::new(1),
                5,
                CandidateId::new(2),
                &salt,
            )
        })
    });
}

criterion_group!(
    benches,
    keccak256_bench,
    commitment_hash_bench,
    verify_commitment_bench
);
criterion_main!(benches);
