//! Benchmarks for request payload assembly
//!
//! This benchmark measures:
//! - Payload building from a configuration snapshot
//! - Extra-context merge overhead
//! - Normalization of a typical provider response

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use openrouter_chat::client::build_payload;
use openrouter_chat::structured::normalize;
use openrouter_chat::types::ProviderResponse;
use openrouter_chat::{ModelParameters, ServiceConfiguration, ServiceOptions};
use serde_json::json;

fn config() -> ServiceConfiguration {
    ServiceConfiguration::default()
        .merged(
            ServiceOptions::new()
                .with_model("openai/gpt-4o-mini")
                .with_parameters(ModelParameters::new().presence_penalty(0.3)),
        )
        .expect("valid configuration")
}

fn bench_payload_build(c: &mut Criterion) {
    let config = config();
    let mut group = c.benchmark_group("payload_build");

    for len in [16usize, 1024, 16 * 1024] {
        let message = "a".repeat(len);
        group.throughput(Throughput::Bytes(len as u64));
        group.bench_with_input(BenchmarkId::new("user_message", len), &message, |b, m| {
            b.iter(|| build_payload(black_box(&config), black_box(m), None))
        });
    }

    let extra = json!({
        "temperature": 0.2,
        "user": "user-42",
        "transforms": ["middle-out"],
        "route": "fallback"
    });
    group.bench_function("with_extra_context", |b| {
        b.iter(|| build_payload(black_box(&config), "Suggest a vegan dinner", extra.as_object()))
    });

    group.finish();
}

fn bench_normalize(c: &mut Criterion) {
    let body = json!({
        "id": "gen-1",
        "model": "openai/gpt-4o-mini",
        "choices": [{
            "message": {"role": "assistant", "content": "{\"message\": \"Lentil curry\", \"metadata\": {\"minutes\": 30}}"},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 40, "completion_tokens": 12, "total_tokens": 52}
    });

    c.bench_function("normalize_structured", |b| {
        b.iter(|| {
            let raw = ProviderResponse::from_value(black_box(body.clone()));
            normalize(&raw).map(|n| n.is_structured())
        })
    });
}

criterion_group!(benches, bench_payload_build, bench_normalize);
criterion_main!(benches);
