use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use clap::Subcommand;
use pawmodoro_core::{
    complete_run, Catalog, Config, Database, Event, NoRewards, RewardEngine, SessionRewards,
    ThreadRandom, TimerEngine, UnlockQueue,
};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

use super::{open_collection, print_json, CliResult, DbCollection};

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run the timer in the foreground, printing events as JSON lines
    Run {
        /// Number of work phases (defaults to timer.default_cycles)
        #[arg(long)]
        cycles: Option<u32>,
        /// Work phase length in minutes (defaults to timer.default_work_minutes)
        #[arg(long)]
        work: Option<u32>,
        /// Milliseconds per timer second
        #[arg(long, default_value = "1000")]
        tick_ms: u64,
    },
    /// Print the idle timer state as JSON
    Preview,
}

type RunEngine =
    TimerEngine<Rc<RefCell<Config>>, SessionRewards<DbCollection, ThreadRandom>>;

pub fn run(action: TimerAction) -> CliResult {
    match action {
        TimerAction::Run {
            cycles,
            work,
            tick_ms,
        } => {
            let runtime = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_loop(cycles, work, tick_ms))
        }
        TimerAction::Preview => {
            let config = Config::load();
            let work = config.work_minutes();
            let mut engine = TimerEngine::new(config, NoRewards);
            engine.set_work_minutes(work);
            print_json(&engine.snapshot())?;
            Ok(())
        }
    }
}

fn emit(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Print queued unlock notifications the current phase allows.
fn flush_unlocks(queue: &RefCell<UnlockQueue>, engine: &RunEngine) -> Result<(), serde_json::Error> {
    for def in queue.borrow_mut().drain_presentable(engine.phase()) {
        emit(&Event::collectible_unlocked(&def))?;
    }
    Ok(())
}

async fn run_loop(cycles: Option<u32>, work: Option<u32>, tick_ms: u64) -> CliResult {
    let settings = Rc::new(RefCell::new(Config::load()));
    let cycles = cycles.unwrap_or_else(|| settings.borrow().cycles());
    let work = work.unwrap_or_else(|| settings.borrow().work_minutes());

    let catalog = Arc::new(Catalog::builtin());
    let (db, mut collection) = open_collection(Arc::clone(&catalog))?;
    let queue = Rc::new(RefCell::new(UnlockQueue::new()));
    let sink = Rc::clone(&queue);
    collection.subscribe(move |def| sink.borrow_mut().push(def.clone()));

    let rewards = RewardEngine::new(catalog, ThreadRandom);
    let mut engine: RunEngine =
        TimerEngine::new(Rc::clone(&settings), SessionRewards::new(collection, rewards));

    emit(&engine.start(cycles, work))?;

    let mut interval = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // The first tick completes immediately.
    interval.tick().await;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                info!("interrupted");
                if let Some(event) = engine.stop() {
                    emit(&event)?;
                }
                flush_unlocks(&queue, &engine)?;
                return Ok(());
            }
            _ = interval.tick() => {
                if let Some(event) = engine.tick() {
                    emit(&event)?;

                    if let Event::RunCompleted { total_cycles, work_minutes, .. } = event {
                        return finish_run(&db, &mut engine, &queue, work_minutes, total_cycles);
                    }

                    // Pick up config edits made while the run is in progress.
                    *settings.borrow_mut() = Config::load();
                    engine.reload_settings();
                    debug!(phase = ?engine.phase(), "settings reloaded");
                    flush_unlocks(&queue, &engine)?;
                }
            }
        }
    }
}

fn finish_run(
    db: &Database,
    engine: &mut RunEngine,
    queue: &RefCell<UnlockQueue>,
    work_minutes: u32,
    cycles: u32,
) -> CliResult {
    let hook = engine.hook_mut();
    let summary = complete_run(
        db,
        &mut hook.store,
        &mut hook.rewards,
        work_minutes,
        cycles,
        Local::now(),
    )?;
    flush_unlocks(queue, engine)?;
    print_json(&summary)?;
    Ok(())
}
