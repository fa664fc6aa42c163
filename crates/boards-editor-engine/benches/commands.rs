use boards_editor_engine::editing::{Command, Document, Selection, commands, replace_text};
use criterion::{Criterion, criterion_group, criterion_main};

fn generate_card_text(lines: usize) -> String {
    (0..lines)
        .map(|i| match i % 4 {
            0 => format!("* task {i} with some **bold** words"),
            1 => format!("{i}. numbered step"),
            2 => format!("> quoted reply {i}"),
            _ => format!("plain line {i} mentioning @someone :tada:"),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn select_all(doc: &Document) -> Selection {
    Selection::new(doc.first().key, 0, doc.last().key, doc.last().len())
}

fn bench_command_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("commands");
    group.sample_size(10);

    let doc = Document::from_text(&generate_card_text(200));
    let all = select_all(&doc);
    let caret = doc.end_selection();

    for command in [Command::BulletList, Command::NumberList, Command::Quote] {
        group.bench_function(format!("{command:?}_all_blocks"), |b| {
            b.iter(|| {
                let patch = commands::apply(std::hint::black_box(command), &doc, &all);
                std::hint::black_box(patch);
            });
        });
    }

    group.bench_function("bold_collapsed", |b| {
        b.iter(|| {
            let patch = commands::apply(Command::Bold, &doc, std::hint::black_box(&caret));
            std::hint::black_box(patch);
        });
    });

    group.bench_function("replace_all_blocks", |b| {
        b.iter(|| {
            let patch = replace_text(&doc, &all, std::hint::black_box("x"));
            std::hint::black_box(patch);
        });
    });

    group.finish();
}

criterion_group!(benches, bench_command_operations);
criterion_main!(benches);
