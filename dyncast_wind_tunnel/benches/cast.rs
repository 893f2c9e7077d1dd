// Copyright 2026 the Dyncast Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wind-tunnel benchmarks for the conversion and iteration hot paths.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};

use dyncast::{
    Dict, Iterable, List, Union, cast_from_handle, declare_iterator, make_iterator,
};
use dynobj::{Object, Runtime};

/// Entry point for `dyncast` wind-tunnel benchmarks.
///
/// Scenarios compare lazy views against eager host conversions and measure the per-element cost
/// of each iteration path (indexed, protocol, host-backed).
fn bench_cast(c: &mut Criterion) {
    bench_view_vs_eager(c);
    bench_list_iteration(c);
    bench_iterable_iteration(c);
    bench_host_iterator(c);
    bench_union_index(c);
    bench_dict_lookup(c);
}

fn int_list(rt: &Runtime, len: usize) -> Object {
    let items: Vec<Object> = (0..len)
        .map(|i| rt.new_int(i64::try_from(i).unwrap()).unwrap())
        .collect();
    rt.new_list(items).unwrap()
}

/// Checking a `List[int]` view is O(1); extracting a `Vec<i64>` converts every element.
fn bench_view_vs_eager(c: &mut Criterion) {
    let mut group = c.benchmark_group("view_vs_eager");
    for &len in &[10_usize, 1_000] {
        let rt = Runtime::new();
        let obj = int_list(&rt, len);
        group.bench_with_input(BenchmarkId::new("view", len), &len, |b, _| {
            b.iter(|| {
                let list: List<i64> = cast_from_handle(&rt, black_box(obj.handle())).unwrap();
                black_box(list.len())
            });
        });
        group.bench_with_input(BenchmarkId::new("eager", len), &len, |b, _| {
            b.iter(|| {
                let v: Vec<i64> = cast_from_handle(&rt, black_box(obj.handle())).unwrap();
                black_box(v.len())
            });
        });
    }
    group.finish();
}

/// Per-element cost of walking a list through the indexed cursor.
fn bench_list_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("list_iter");
    for &len in &[100_usize, 10_000] {
        let rt = Runtime::new();
        let obj = int_list(&rt, len);
        let list: List<i64> = cast_from_handle(&rt, obj.handle()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| list.iter().map(Result::unwrap).sum::<i64>());
        });
    }
    group.finish();
}

/// Same walk through the runtime iteration protocol (a fresh runtime iterator per pass).
fn bench_iterable_iteration(c: &mut Criterion) {
    let mut group = c.benchmark_group("iterable_iter");
    for &len in &[100_usize, 10_000] {
        let rt = Runtime::new();
        let obj = int_list(&rt, len);
        let iterable: Iterable<i64> = cast_from_handle(&rt, obj.handle()).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, _| {
            b.iter(|| iterable.iter().unwrap().map(Result::unwrap).sum::<i64>());
        });
    }
    group.finish();
}

/// A host iterator driven from the runtime side: host call, item allocation, conversion back.
fn bench_host_iterator(c: &mut Criterion) {
    let mut group = c.benchmark_group("host_iterator");
    for &len in &[100_i64, 10_000] {
        let rt = Runtime::new();
        declare_iterator::<core::ops::Range<i64>>(&rt).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            b.iter(|| {
                let obj = make_iterator(&rt, 0..len).unwrap();
                let iterable: Iterable<i64> = cast_from_handle(&rt, obj.handle()).unwrap();
                iterable.iter().unwrap().map(Result::unwrap).sum::<i64>()
            });
        });
    }
    group.finish();
}

/// Two-pass union resolution; the int case only matches (as `bool`) in the conversion pass.
fn bench_union_index(c: &mut Criterion) {
    let mut group = c.benchmark_group("union_index");
    let rt = Runtime::new();
    let cases = [
        ("exact_first", rt.new_str("x").unwrap()),
        ("exact_last", rt.new_float(1.5).unwrap()),
        ("converted", rt.new_int(1).unwrap()),
    ];
    for (name, obj) in &cases {
        group.bench_function(*name, |b| {
            b.iter(|| {
                let u: Union<(String, bool, f64)> =
                    cast_from_handle(&rt, black_box(obj.handle())).unwrap();
                black_box(u.index().unwrap())
            });
        });
    }
    group.finish();
}

/// Keyed lookup with a host key converted to a runtime value per call.
fn bench_dict_lookup(c: &mut Criterion) {
    let mut group = c.benchmark_group("dict_get");
    for &len in &[10_i64, 10_000] {
        let rt = Runtime::new();
        let dict = Dict::<i64, i64>::from_pairs(&rt, (0..len).map(|i| (i, i * 2))).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(len), &len, |b, &len| {
            let mut k = 0_i64;
            b.iter(|| {
                k = (k + 7) % len;
                black_box(dict.get(black_box(k)).unwrap())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, bench_cast);
criterion_main!(benches);
