use criterion::{Criterion, criterion_group, criterion_main};
use inline_comments_engine::decoration::{comment_ranges, resolve_comment_id};
use inline_comments_engine::{ContentBlock, EntityKey};

/// A long block with many overlapping comments and a link every so often
fn generate_commented_block(comments: usize) -> ContentBlock {
    let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit. ".repeat(comments);
    let mut block = ContentBlock::new("bench", text);
    let len = block.len();
    for i in 0..comments {
        let start = (i * 37) % len;
        let end = (start + 80).min(len);
        block = block.with_style(start..end, &format!("COMMENT-{i}"));
        if i % 5 == 0 {
            let link = (start + 10).min(len)..(start + 20).min(len);
            block = block.with_entity(link, EntityKey(i as u64));
        }
    }
    block
}

fn bench_style_ranges(c: &mut Criterion) {
    let mut group = c.benchmark_group("style_ranges");
    group.sample_size(10);

    let block = generate_commented_block(200);

    group.bench_function("comment_ranges", |b| {
        b.iter(|| {
            let ranges = comment_ranges(std::hint::black_box(&block));
            std::hint::black_box(ranges);
        });
    });

    let ranges = comment_ranges(&block);
    group.bench_function("resolve_overlaps", |b| {
        b.iter(|| {
            for range in &ranges {
                std::hint::black_box(resolve_comment_id(std::hint::black_box(&block), range));
            }
        });
    });

    group.finish();
}

criterion_group!(benches, bench_style_ranges);
criterion_main!(benches);
