//! Rule-based detection throughput.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use phishguard_core::features::{extract_content_features, extract_url_features};
use phishguard_core::PhishingDetector;

const URL: &str = "http://secure-login.paypal.account-verify.example.net/webscr?cmd=login";
const MESSAGE: &str = "Urgent: verify your password immediately or your account will be \
    suspended. Click here http://a.test http://b.test to confirm your social security number.";

fn bench_feature_extraction(c: &mut Criterion) {
    c.bench_function("extract_url_features", |b| {
        b.iter(|| extract_url_features(black_box(URL)))
    });
    c.bench_function("extract_content_features", |b| {
        b.iter(|| extract_content_features(black_box(MESSAGE)))
    });
}

fn bench_predict(c: &mut Criterion) {
    let detector = PhishingDetector::rule_based_only();
    c.bench_function("predict_rule_based", |b| {
        b.iter(|| detector.predict(black_box(Some(MESSAGE)), black_box(Some(URL))))
    });
}

criterion_group!(benches, bench_feature_extraction, bench_predict);
criterion_main!(benches);
