use circlepack_core::{Record, build};
use circlepack_layout::{PackOptions, layout};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use std::time::Duration;

/// Balanced tree with `fanout` children per branch and `depth` levels below the root.
fn balanced_records(fanout: usize, depth: usize) -> Vec<Record> {
    let mut records = vec![Record::branch("root")];
    let mut frontier = vec!["root".to_string()];
    for level in 0..depth {
        let mut next = Vec::with_capacity(frontier.len() * fanout);
        for parent in &frontier {
            for i in 0..fanout {
                let id = format!("{parent}|n{i}");
                if level + 1 == depth {
                    records.push(Record::new(id.clone(), ((i * 7) % 11 + 1) as f64));
                } else {
                    records.push(Record::branch(id.clone()));
                }
                next.push(id);
            }
        }
        frontier = next;
    }
    records
}

fn bench_pack_layout(c: &mut Criterion) {
    let mut group = c.benchmark_group("pack_layout");
    group.measurement_time(Duration::from_secs(5));

    for (fanout, depth) in [(4usize, 3usize), (8, 2), (6, 3), (60, 1), (2000, 1)] {
        let records = balanced_records(fanout, depth);
        let hierarchy = build(&records, "|").expect("valid records");
        let options = PackOptions::default();
        group.bench_with_input(
            BenchmarkId::new(format!("fanout{fanout}_depth{depth}"), records.len()),
            &hierarchy,
            |b, h| b.iter(|| layout(black_box(h), black_box(&options)).expect("layout")),
        );
    }

    group.finish();
}

criterion_group!(benches, bench_pack_layout);
criterion_main!(benches);
