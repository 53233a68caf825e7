#![allow(dead_code)]

use criterion::{BatchSize, Criterion, criterion_group, criterion_main};
use nestrow::prelude::*;
use std::hint::black_box;

#[derive(FromRows)]
struct Label {
    id: i64,
    name: String,
}

#[derive(FromRows)]
struct Post {
    id: i64,
    title: String,
    labels: Vec<Label>,
}

#[derive(FromRows)]
struct Blog {
    id: i64,
    name: String,
    posts: Vec<Post>,
}

const COLUMNS: [&str; 6] = [
    "id",
    "name",
    "posts_id",
    "posts_title",
    "posts_labels_id",
    "posts_labels_name",
];

/// `blogs * posts * labels` denormalized join rows.
fn join_rows(blogs: i64, posts: i64, labels: i64) -> RowSet {
    let mut set = RowSet::new(COLUMNS);
    for blog in 0..blogs {
        for post in 0..posts {
            for label in 0..labels {
                let post_id = blog * posts + post;
                set.push(cells![
                    blog,
                    format!("blog {blog}"),
                    post_id,
                    format!("post {post_id}"),
                    label,
                    format!("label {label}"),
                ]);
            }
        }
    }
    set
}

fn bench_map(c: &mut Criterion) {
    let mut group = c.benchmark_group("map");

    let small = join_rows(10, 10, 5);
    let mapper = Mapper::new();
    group.bench_function("cached_schema_500_rows", |b| {
        b.iter(|| {
            let blogs: Vec<Blog> = mapper.map(small.columns(), small.scan()).unwrap();
            black_box(blogs)
        })
    });

    group.bench_function("cold_schema_500_rows", |b| {
        b.iter_batched(
            Mapper::new,
            |mapper| {
                let blogs: Vec<Blog> = mapper.map(small.columns(), small.scan()).unwrap();
                black_box(blogs)
            },
            BatchSize::SmallInput,
        )
    });

    let large = join_rows(50, 20, 10);
    group.bench_function("cached_schema_10000_rows", |b| {
        b.iter(|| {
            let blogs: Vec<Blog> = mapper.map(large.columns(), large.scan()).unwrap();
            black_box(blogs)
        })
    });

    group.finish();
}

fn bench_scalars(c: &mut Criterion) {
    let mut set = RowSet::new(["tag"]);
    for n in 0..1_000 {
        set.push(cells![format!("tag{}", n % 37)]);
    }
    let mapper = Mapper::new();
    c.bench_function("map_scalar_sequence", |b| {
        b.iter(|| {
            let tags: Vec<String> = mapper.map(set.columns(), set.scan()).unwrap();
            black_box(tags)
        })
    });
}

criterion_group!(benches, bench_map, bench_scalars);
criterion_main!(benches);
