// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Nereid and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::str::FromStr;
use std::time::Duration;

use criterion::Criterion;

use pprof::criterion::{Output, PProfProfiler};

fn env_or<T: FromStr>(name: &str, default: T) -> T {
    std::env::var(name).ok().and_then(|raw| raw.trim().parse::<T>().ok()).unwrap_or(default)
}

/// Criterion with a flamegraph profiler, tuned by `MIRROR_BENCH_*` variables.
pub fn criterion() -> Criterion {
    let frequency = env_or("MIRROR_PROFILE_FREQ", 100_i32).clamp(1, 1000);
    let sample_size = env_or("MIRROR_BENCH_SAMPLE_SIZE", 50_usize).clamp(10, 200);
    let warmup = env_or("MIRROR_BENCH_WARMUP_MS", 1500_u64).clamp(100, 60_000);
    let measurement = env_or("MIRROR_BENCH_MEASUREMENT_MS", 4000_u64).clamp(500, 120_000);

    Criterion::default()
        .sample_size(sample_size)
        .warm_up_time(Duration::from_millis(warmup))
        .measurement_time(Duration::from_millis(measurement))
        .with_profiler(PProfProfiler::new(frequency, Output::Flamegraph(None)))
}
