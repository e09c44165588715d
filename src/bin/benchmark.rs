use booking_engine::config::EngineConfig;
use booking_engine::domain::models::area::ServiceArea;
use booking_engine::domain::models::booking::ExistingBooking;
use booking_engine::domain::models::schedule::{BreakWindow, StaffScheduleEntry};
use booking_engine::domain::models::service::ServiceSpec;
use booking_engine::domain::models::subscription::{Frequency, SubscriptionPlan};
use booking_engine::cache::GeoCache;
use booking_engine::infra::geocoding::cached::CachedGeocoder;
use booking_engine::infra::memory::{
    InMemoryAreaReader, InMemoryBookingReader, InMemoryScheduleReader, StaticGeocoder,
    StaticTravelTimeProvider,
};
use booking_engine::state::Engine;
use chrono::{Days, NaiveDate, NaiveTime, Utc};
use colored::*;
use hdrhistogram::Histogram;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use uuid::Uuid;

const STAFF_COUNT: usize = 40;
const BOOKINGS_PER_STAFF: usize = 6;
const STAGE_SECS: u64 = 5;

#[derive(Clone, Copy)]
enum Operation {
    Availability,
    Matching,
    Recurrence,
}

impl Operation {
    fn name(&self) -> &'static str {
        match self {
            Operation::Availability => "Day Grid (Availability)",
            Operation::Matching => "Coverage Match (Distance)",
            Operation::Recurrence => "Subscription Schedule (Recurrence)",
        }
    }
}

struct BenchContext {
    engine: Engine,
    date: NaiveDate,
    service: ServiceSpec,
    staff_ids: Vec<Uuid>,
    postcodes: Vec<String>,
}

fn t(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

#[tokio::main]
async fn main() {
    println!("{}", "🚀 Booking Engine Benchmark".bold().green());

    let schedules = Arc::new(InMemoryScheduleReader::new());
    let bookings = Arc::new(InMemoryBookingReader::new());
    let areas = Arc::new(InMemoryAreaReader::new());
    let static_geocoder = Arc::new(StaticGeocoder::new());
    let travel = Arc::new(StaticTravelTimeProvider::new());
    let geo_cache = Arc::new(GeoCache::new());

    println!("\n{}", "⚙️  Seeding staff, schedules and coverage...".yellow());

    let date = Utc::now()
        .date_naive()
        .checked_add_days(Days::new(7))
        .expect("benchmark date overflow");
    let service = ServiceSpec::new("Deep clean", 60, 0);

    let mut staff_ids = Vec::with_capacity(STAFF_COUNT);
    let mut postcodes = Vec::with_capacity(STAFF_COUNT);

    for i in 0..STAFF_COUNT {
        let staff_id = Uuid::new_v4();
        staff_ids.push(staff_id);

        // Staff spread north-east out of central London, one postcode each.
        let postcode = format!("BM{}{}AA", i / 10, i % 10);
        let latitude = 51.5 + (i as f64) * 0.005;
        let longitude = -0.13 - (i as f64) * 0.003;
        static_geocoder.insert(&postcode, latitude, longitude).await;
        areas
            .add(ServiceArea::new(staff_id, None, &postcode, 10.0))
            .await;
        postcodes.push(postcode);

        for day in 0..7u8 {
            schedules
                .add(StaffScheduleEntry {
                    staff_id,
                    day_of_week: day,
                    start: t(8, 0),
                    end: t(18, 0),
                    breaks: vec![BreakWindow { start: t(12, 30), end: t(13, 0) }],
                })
                .await;
        }

        for j in 0..BOOKINGS_PER_STAFF {
            let hour = 8 + ((i + j * 2) % 10) as u32;
            let start = date.and_hms_opt(hour, 0, 0).unwrap().and_utc();
            bookings
                .add(ExistingBooking::new(staff_id, service.id, start, 60))
                .await;
        }
    }

    println!(
        "{}",
        format!(
            "✅ Seeded {} staff, {} bookings, {} coverage areas.",
            STAFF_COUNT,
            STAFF_COUNT * BOOKINGS_PER_STAFF,
            STAFF_COUNT
        )
        .green()
    );

    let geocoder = Arc::new(CachedGeocoder::new(static_geocoder, Arc::clone(&geo_cache)));
    let engine = Engine::new(
        EngineConfig::default(),
        geocoder,
        travel,
        schedules,
        bookings,
        areas,
        geo_cache,
    );

    let context = Arc::new(BenchContext { engine, date, service, staff_ids, postcodes });
    let stages = [4usize, 16, 64];

    for op in [Operation::Availability, Operation::Matching, Operation::Recurrence] {
        println!("\n{}", "=".repeat(60));
        println!("Benchmarking: {}", op.name().cyan().bold());
        println!("{}", "=".repeat(60));

        println!(
            "{:<10} | {:<15} | {:<15} | {:<15}",
            "Workers", "Mean (ms)", "P99 (ms)", "Ops/sec"
        );
        println!("{:-<10}-+-{:-<15}-+-{:-<15}-+-{:-<15}", "", "", "", "");

        for &workers in &stages {
            run_stage(Arc::clone(&context), op, workers).await;
        }
    }
}

async fn run_stage(context: Arc<BenchContext>, op: Operation, workers: usize) {
    let (tx, mut rx) = mpsc::channel::<Duration>(100_000);
    let deadline = Instant::now() + Duration::from_secs(STAGE_SECS);

    let mut handles = Vec::with_capacity(workers);
    for worker_id in 0..workers {
        let context = Arc::clone(&context);
        let tx = tx.clone();

        handles.push(tokio::spawn(async move {
            let mut rng = StdRng::seed_from_u64(worker_id as u64);

            while Instant::now() < deadline {
                let postcode = &context.postcodes[rng.gen_range(0..context.postcodes.len())];
                let op_start = Instant::now();

                match op {
                    Operation::Availability => {
                        let offset = rng.gen_range(0..7u64);
                        let date = context.date.checked_add_days(Days::new(offset)).unwrap();
                        let _ = context
                            .engine
                            .availability
                            .slots_for_date(&context.service, date, &context.staff_ids, None)
                            .await;
                    }
                    Operation::Matching => {
                        let _ = context
                            .engine
                            .matcher
                            .match_staff(postcode, Some(context.service.id))
                            .await;
                    }
                    Operation::Recurrence => {
                        let plan = SubscriptionPlan::new(context.date, Frequency::Weekly, 1);
                        let _ = context
                            .engine
                            .recurrence
                            .generate_schedule(&plan, &context.service, postcode)
                            .await;
                    }
                }

                let _ = tx.send(op_start.elapsed()).await;
            }
        }));
    }

    drop(tx);

    let mut histogram = Histogram::<u64>::new(3).unwrap();
    let mut total: u64 = 0;

    while let Some(latency) = rx.recv().await {
        total += 1;
        histogram.record((latency.as_micros() as u64).max(1)).unwrap();
    }
    for handle in handles {
        let _ = handle.await;
    }

    let mean_ms = histogram.mean() / 1000.0;
    let p99_ms = histogram.value_at_quantile(0.99) as f64 / 1000.0;
    let ops_per_sec = total as f64 / STAGE_SECS as f64;

    println!(
        "{:<10} | {:<15.3} | {:<15.3} | {:<15.0}",
        workers, mean_ms, p99_ms, ops_per_sec
    );

    tokio::time::sleep(Duration::from_millis(250)).await;
}
