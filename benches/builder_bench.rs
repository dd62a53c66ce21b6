//! Benchmarks for query assembly, validation and template filling
//!
//! Run with: cargo bench

use aql_builder::query::{
    assemble, assemble_multiline, QueryDraft, SortDirection, Table, TimeUnit, TimeWindow,
};
use aql_builder::templates;
use aql_builder::validator::Validator;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};

fn aggregate_draft() -> QueryDraft {
    QueryDraft::new(Table::Events)
        .select(&["sourceip", "username", "COUNT(*) AS failures"])
        .filter("qidname(qid) ILIKE '%failed%'")
        .filter("magnitude >= 5")
        .group_by(&["sourceip", "username"])
        .having("COUNT(*) > 10")
        .order_by(&["failures"], SortDirection::Desc)
        .limit(100)
        .time_window(TimeWindow::last(24, TimeUnit::Hours))
}

fn bench_assemble(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    let draft = aggregate_draft();

    group.bench_function("single_line", |b| {
        b.iter(|| assemble(black_box(&draft)).unwrap())
    });

    group.bench_function("multiline", |b| {
        b.iter(|| assemble_multiline(black_box(&draft)).unwrap())
    });

    for conditions in [1, 10, 50] {
        let mut draft = QueryDraft::new(Table::Flows).select(&["*"]);
        for i in 0..conditions {
            draft.add_condition(format!("destinationport = {}", 1000 + i));
        }

        group.throughput(Throughput::Elements(conditions as u64));
        group.bench_function(format!("conditions_{}", conditions), |b| {
            b.iter(|| assemble(black_box(&draft)).unwrap())
        });
    }

    group.finish();
}

fn bench_validate(c: &mut Criterion) {
    let mut group = c.benchmark_group("validate");
    let validator = Validator::default();

    let clean = assemble(&aggregate_draft()).unwrap();
    group.bench_function("clean_query", |b| {
        b.iter(|| validator.validate(black_box(&clean)))
    });

    let messy = "select * form events where username = \"admin\" and sourceip like '10.0.0.1' \
                 order by starttime group by sourceip limit 0 ;";
    group.bench_function("messy_query", |b| {
        b.iter(|| validator.validate(black_box(messy)))
    });

    let long = format!(
        "SELECT * FROM events WHERE {} LAST 1 HOURS",
        (0..200)
            .map(|i| format!("sourceport = {}", i))
            .collect::<Vec<_>>()
            .join(" OR ")
    );
    group.throughput(Throughput::Bytes(long.len() as u64));
    group.bench_function("long_query", |b| {
        b.iter(|| validator.validate(black_box(&long)))
    });

    group.finish();
}

fn bench_templates(c: &mut Criterion) {
    let mut group = c.benchmark_group("templates");
    let template = templates::get_template("Activity by IP Address").unwrap();

    group.bench_function("render", |b| {
        b.iter(|| template.render(black_box([("ip_address", "10.1.2.3")])))
    });

    group.bench_function("render_with_time", |b| {
        let window = TimeWindow::last(7, TimeUnit::Days);
        b.iter(|| {
            let query = template.render([("ip_address", "10.1.2.3")]);
            templates::with_time_window(black_box(&query), &window)
        })
    });

    group.bench_function("search", |b| {
        b.iter(|| templates::search_templates(black_box("login")))
    });

    group.finish();
}

criterion_group!(benches, bench_assemble, bench_validate, bench_templates);
criterion_main!(benches);
