use book_catalog::db::{tree, PushIdGenerator};
use book_catalog::services::mirror::decode_books;
use criterion::{criterion_group, criterion_main, Criterion};
use serde_json::{json, Map, Value};
use std::hint::black_box;

fn catalog_snapshot(count: usize) -> Value {
    let ids = PushIdGenerator::new();
    let mut books = Map::new();
    for n in 0..count {
        let id = ids.next_id().expect("Failed to generate id");
        books.insert(
            id,
            json!({
                "name": format!("Book {}", n),
                "author": "Frank Herbert",
                "publicationDate": "1965-08-01",
                "publisher": "Chilton",
                "genre": "SciFi",
            }),
        );
    }
    Value::Object(books)
}

fn benchmark_mirror_updates(c: &mut Criterion) {
    let snapshot = catalog_snapshot(1000);

    let mut group = c.benchmark_group("book_mirror");

    group.bench_function("decode_1000_books", |b| {
        b.iter(|| decode_books(black_box(Some(snapshot.clone()))))
    });

    // A streamed patch to one child, applied to the cached tree
    let mut root = json!({ "books": snapshot.clone() });
    group.bench_function("apply_child_patch", |b| {
        b.iter(|| {
            tree::merge(
                &mut root,
                black_box("books"),
                json!({ "-Zz/genre": "Fantasy" }),
            )
        })
    });

    group.finish();
}

criterion_group!(benches, benchmark_mirror_updates);
criterion_main!(benches);
