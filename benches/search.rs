// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Enva-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Enva and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use enva::search::rank;

mod fixtures;
mod profiler;

// Benchmark identity (keep stable):
// - Group name: `search.rank`; case IDs are `<query kind>_<candidate count>`.
fn benches_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search.rank");
    for count in [200usize, 2000] {
        let values = fixtures::resolved_values(count);
        for (kind, query) in [("empty", ""), ("exact", "API_SETTING_1"), ("fuzzy", "dbset"), ("value", "redis.example")] {
            group.bench_function(format!("{kind}_{count}"), |b| {
                b.iter(|| black_box(rank(black_box(&values), black_box(query)).len()))
            });
        }
    }
    group.finish();
}

criterion_group! {
    name = benches;
    config = profiler::criterion();
    targets = benches_search
}
criterion_main!(benches);
