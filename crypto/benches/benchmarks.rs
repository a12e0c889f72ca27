use criterion::{criterion_group, criterion_main, Criterion};
use crypto::{
    decryption::decrypt,
    fixtures::Fixture,
    proofs::{
        verify_blank_proof, verify_individual_proof, verify_overall_proof, verify_signature,
    },
    tally::{tally, tally_parallel},
};

fn bench_verification(c: &mut Criterion) {
    let fixture = Fixture::standard();
    let ballot = &fixture.ballots[0];
    let election = &fixture.election;

    // benchmark config
    let mut group = c.benchmark_group("ballot verification");
    group.sample_size(100);

    group.bench_function("signature", |b| b.iter(|| verify_signature(ballot, election)));
    group.bench_function("blank proofs", |b| {
        b.iter(|| verify_blank_proof(ballot, election))
    });
    group.bench_function("overall proofs", |b| {
        b.iter(|| verify_overall_proof(ballot, election))
    });
    group.bench_function("individual proofs", |b| {
        b.iter(|| verify_individual_proof(ballot, election))
    });

    group.finish();
}

fn bench_tally(c: &mut Criterion) {
    // 10 x the standard votes
    let votes: Vec<Vec<Vec<u64>>> = (0..10).flat_map(|_| Fixture::standard_votes()).collect();
    let fixture = Fixture::new(Fixture::standard_questions(), &votes, 1);
    let election = &fixture.election;

    let mut group = c.benchmark_group("tally");
    group.sample_size(50);

    group.bench_function("sequential", |b| {
        b.iter(|| tally(election, &fixture.ballots))
    });
    group.bench_function("parallel", |b| {
        b.iter(|| tally_parallel(election, &fixture.ballots))
    });
    group.bench_function("decrypt", |b| {
        b.iter_with_setup(
            || tally(election, &fixture.ballots).expect("valid ballots"),
            |encrypted| decrypt(election, &fixture.result, &encrypted),
        )
    });

    group.finish();
}

criterion_group!(benches, bench_verification, bench_tally);
criterion_main!(benches);
