//! Benchmarks for peephole call-site rewriting.
//!
//! Measures the single-pass rewriter over operation bodies of increasing size:
//! - A body without any matching call-site (pure scan)
//! - A body where every fourth instruction is a matching call-site
//! - The guarded interceptor path, including operand resolution

extern crate cilpatch;

use cilpatch::{
    assembly::{opcodes, InstructionSequence, Operand, SequenceBuilder},
    metadata::{signature::TargetOperation, token::Token},
    patch::{
        catalog::{STARTS_WITH, STARTS_WITH_COMPARISON},
        rewrite::{rewrite, CallSiteRewrite},
        HostIntrospection, Interceptors, OperationHandle, PatchConfig,
    },
};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::hint::black_box;

const STARTS_WITH_TOKEN: Token = Token::member_ref(0x31);
const ORDINAL_STARTS_WITH_TOKEN: Token = Token::member_ref(0x32);

struct StaticHost;

impl HostIntrospection for StaticHost {
    fn resolve(&self, target: &TargetOperation) -> Option<OperationHandle> {
        if *target == STARTS_WITH {
            Some(OperationHandle(STARTS_WITH_TOKEN))
        } else if *target == STARTS_WITH_COMPARISON {
            Some(OperationHandle(ORDINAL_STARTS_WITH_TOKEN))
        } else {
            None
        }
    }
}

/// Builds a body of `groups` four-instruction groups, each ending in `callee`.
fn body(groups: usize, callee: Token) -> InstructionSequence {
    let mut builder = SequenceBuilder::new();
    for i in 0..groups {
        builder = builder
            .ldarg(0)
            .ldstr(Token::new(0x7000_0001 + i as u32))
            .callvirt(callee)
            .op(opcodes::POP, Operand::None);
    }
    builder.ret().build()
}

/// Benchmark scanning bodies that contain no matching call-site.
fn bench_rewrite_no_match(c: &mut Criterion) {
    let rule = CallSiteRewrite::ordinal_starts_with(&StaticHost, 4).unwrap();
    let mut group = c.benchmark_group("rewrite_no_match");

    for groups in [4usize, 64, 1024] {
        let input = body(groups, Token::member_ref(0x99));
        group.bench_with_input(BenchmarkId::from_parameter(groups), &input, |b, input| {
            b.iter(|| {
                let out = rewrite(&rule, black_box(input)).unwrap();
                black_box(out)
            });
        });
    }
    group.finish();
}

/// Benchmark rewriting bodies where every group holds a matching call-site.
fn bench_rewrite_all_match(c: &mut Criterion) {
    let rule = CallSiteRewrite::ordinal_starts_with(&StaticHost, 4).unwrap();
    let mut group = c.benchmark_group("rewrite_all_match");

    for groups in [4usize, 64, 1024] {
        let input = body(groups, STARTS_WITH_TOKEN);
        group.bench_with_input(BenchmarkId::from_parameter(groups), &input, |b, input| {
            b.iter(|| {
                let out = rewrite(&rule, black_box(input)).unwrap();
                black_box(out)
            });
        });
    }
    group.finish();
}

/// Benchmark the guarded interceptor, which resolves both overloads on every call.
fn bench_interceptor(c: &mut Criterion) {
    let interceptors = Interceptors::new(&PatchConfig::default());
    let input = body(2, STARTS_WITH_TOKEN);

    c.bench_function("interceptor_ordinal_starts_with", |b| {
        b.iter(|| {
            let out = interceptors.ordinal_starts_with(&StaticHost, black_box(&input));
            black_box(out)
        });
    });
}

criterion_group!(
    benches,
    bench_rewrite_no_match,
    bench_rewrite_all_match,
    bench_interceptor
);
criterion_main!(benches);
