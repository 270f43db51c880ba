use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::{seq::SliceRandom, thread_rng, Rng};

use vikurdistan_booking::booking::{BookingKind, BookingRecord, ContactDetails, Schedule};
use vikurdistan_booking::ledger::{BookingLedger, JsonFileStore, LedgerConfig, MemoryStore};

fn sample_record(rng: &mut impl Rng) -> BookingRecord {
    let first_names = ["Aram", "Berivan", "Chiman", "Dilan", "Lana"];
    let items = [
        "Erbil Heritage Walk",
        "Mountain Adventure Trek",
        "Mountain View Lodge",
        "Riverside Retreat",
    ];
    let kind = if rng.gen_bool(0.5) {
        BookingKind::Tour
    } else {
        BookingKind::Property
    };
    let schedule = match kind {
        BookingKind::Tour => Schedule::Tour {
            date: "2026-09-12".parse().unwrap(),
        },
        BookingKind::Property => Schedule::Stay {
            check_in: "2026-09-12".parse().unwrap(),
            check_out: "2026-09-15".parse().unwrap(),
        },
    };
    let party_size = rng.gen_range(1..=8u32);
    BookingRecord {
        kind,
        contact: ContactDetails {
            first_name: first_names.choose(rng).unwrap().to_string(),
            last_name: "Barzani".to_string(),
            email: "guest@example.com".to_string(),
            phone: "+964 750 000 0000".to_string(),
            special_requests: None,
        },
        selected_item_name: items.choose(rng).unwrap().to_string(),
        schedule,
        party_size,
        total_price: 89.0 * f64::from(party_size),
        created_at: chrono::Utc::now(),
    }
}

// Append/list throughput per store. Every append rewrites the full stored
// sequence, so cost grows with ledger size.
pub fn ledger_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("booking_ledger");

    for size in [10usize, 100, 1000] {
        group.bench_with_input(
            BenchmarkId::new("memory_append_list", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let ledger = BookingLedger::new(MemoryStore::default());
                    let mut rng = thread_rng();
                    for _ in 0..size {
                        ledger.append(sample_record(&mut rng));
                    }
                    black_box(ledger.list_all())
                });
            },
        );
    }

    for size in [10usize, 100] {
        group.bench_with_input(
            BenchmarkId::new("file_append_list", size),
            &size,
            |b, &size| {
                b.iter(|| {
                    let dir = tempfile::tempdir().unwrap();
                    let ledger = BookingLedger::with_config(
                        JsonFileStore::new(dir.path()),
                        LedgerConfig {
                            export_dir: dir.path().to_path_buf(),
                        },
                    );
                    let mut rng = thread_rng();
                    for _ in 0..size {
                        ledger.append(sample_record(&mut rng));
                    }
                    black_box(ledger.list_all())
                });
            },
        );
    }

    group.bench_function("export_all_100", |b| {
        let dir = tempfile::tempdir().unwrap();
        let ledger = BookingLedger::with_config(
            MemoryStore::default(),
            LedgerConfig {
                export_dir: dir.path().to_path_buf(),
            },
        );
        let mut rng = thread_rng();
        for _ in 0..100 {
            ledger.append(sample_record(&mut rng));
        }
        b.iter(|| black_box(ledger.export_all().unwrap()));
    });

    group.finish();
}

criterion_group!(benches, ledger_benchmark);
criterion_main!(benches);
