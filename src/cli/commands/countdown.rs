//! `countdown`: one-shot evaluation or a live phase stream.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, SecondsFormat, Utc};
use serde_json::json;
use tokio::sync::mpsc;

use crate::cli::args::{CountdownArgs, OutputFormat, Preset};
use crate::error::KeepsakeError;
use crate::observability::{Event, EventEmitter, StopReason, init_metrics};
use crate::phase::scheduler::DEFAULT_PERIOD;
use crate::phase::{
    AnchoredClock, Clock, Evaluation, PhaseScheduler, PhaseTargets, SystemClock,
    coming_new_year, evaluate, new_year_targets, parse_instant, parse_period,
};

/// A resolved schedule ready to evaluate.
#[derive(Debug)]
struct Schedule {
    name: String,
    targets: Arc<PhaseTargets>,
    period: Duration,
}

/// Runs the `countdown` command.
///
/// # Errors
///
/// Returns an error if the schedule cannot be loaded, an instant or tick
/// does not parse, or the metrics endpoint cannot be bound.
pub async fn run(args: &CountdownArgs) -> Result<(), KeepsakeError> {
    let clock: Arc<dyn Clock> = match &args.at {
        Some(text) => Arc::new(AnchoredClock::starting_at(parse_instant(text)?)),
        None => Arc::new(SystemClock),
    };

    let mut schedule = resolve_schedule(args, clock.now())?;
    if let Some(tick) = &args.tick {
        schedule.period = parse_period(tick)?;
    }

    if args.metrics_port.is_some() {
        init_metrics(args.metrics_port)?;
    }

    if args.watch {
        watch(&schedule, clock, args).await
    } else {
        let now = clock.now();
        print_snapshot(&schedule, now, &evaluate(now, &schedule.targets), args.format)
    }
}

fn resolve_schedule(args: &CountdownArgs, now: DateTime<Utc>) -> Result<Schedule, KeepsakeError> {
    if let Some(path) = &args.config {
        let config = super::load_experience(path)?;
        return Ok(Schedule {
            name: config.experience.name.clone(),
            targets: Arc::new(config.to_targets()?),
            period: config.tick_period()?,
        });
    }

    match args.preset {
        Some(Preset::NewYear) => {
            let year = args
                .year
                .unwrap_or_else(|| coming_new_year(&now.with_timezone(&Local)));
            Ok(Schedule {
                name: format!("New Year {year}"),
                targets: Arc::new(new_year_targets(&Local, year)?),
                period: DEFAULT_PERIOD,
            })
        }
        None => Err(KeepsakeError::Usage(
            "pass --config or --preset".to_string(),
        )),
    }
}

// ============================================================================
// One-shot
// ============================================================================

fn print_snapshot(
    schedule: &Schedule,
    now: DateTime<Utc>,
    evaluation: &Evaluation,
    format: OutputFormat,
) -> Result<(), KeepsakeError> {
    let index = evaluation.phase.index();
    let label = schedule.targets.label(index).unwrap_or("?");
    let next = schedule.targets.targets().get(index);

    match format {
        OutputFormat::Json => {
            let value = json!({
                "experience": schedule.name,
                "at": now.to_rfc3339_opts(SecondsFormat::Secs, true),
                "phase": label,
                "phase_index": index,
                "remaining": evaluation.breakdown,
                "total_seconds": evaluation.breakdown.total_seconds(),
                "next": next.map(|t| json!({
                    "name": t.name,
                    "phase": t.phase,
                    "at": t.at.to_rfc3339_opts(SecondsFormat::Secs, true),
                })),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Human => {
            println!("experience: {}", schedule.name);
            println!(
                "phase:      {label} ({}/{})",
                index + 1,
                schedule.targets.phase_count()
            );
            println!("remaining:  {}", evaluation.breakdown);
            if let Some(target) = next {
                println!(
                    "next:       {} -> {} at {}",
                    target.name,
                    target.phase,
                    target.at.with_timezone(&Local).to_rfc3339_opts(SecondsFormat::Secs, false)
                );
            }
        }
    }
    Ok(())
}

// ============================================================================
// Watch
// ============================================================================

async fn watch(
    schedule: &Schedule,
    clock: Arc<dyn Clock>,
    args: &CountdownArgs,
) -> Result<(), KeepsakeError> {
    let emitter = (args.format == OutputFormat::Json).then(EventEmitter::stdout);
    let final_index = schedule.targets.phase_count() - 1;

    let (tx, mut rx) = mpsc::unbounded_channel::<(DateTime<Utc>, Evaluation)>();
    let observer_clock = Arc::clone(&clock);
    let mut scheduler =
        PhaseScheduler::new(Arc::clone(&schedule.targets), clock).with_period(schedule.period);

    if let Some(emitter) = &emitter {
        emitter.emit(Event::SchedulerStarted {
            timestamp: Utc::now(),
            experience: schedule.name.clone(),
            phases: schedule.targets.phase_count(),
            period_ms: u64::try_from(schedule.period.as_millis()).unwrap_or(u64::MAX),
        });
    }

    scheduler.start(move |evaluation| {
        let _ = tx.send((observer_clock.now(), *evaluation));
    });

    let mut publications = 0_u64;
    let mut current_phase = None;
    let reason = loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break StopReason::Interrupted,
            message = rx.recv() => {
                let Some((at, evaluation)) = message else {
                    break StopReason::Closed;
                };
                publications += 1;

                let index = evaluation.phase.index();
                let label = schedule.targets.label(index).unwrap_or("?");
                let entered = current_phase != Some(index);
                current_phase = Some(index);

                match &emitter {
                    Some(emitter) => {
                        if entered {
                            emitter.emit(Event::PhaseEntered {
                                timestamp: at,
                                phase_name: label.to_string(),
                                phase_index: index,
                            });
                        }
                        emitter.emit(Event::Countdown {
                            timestamp: at,
                            phase_name: label.to_string(),
                            phase_index: index,
                            remaining: evaluation.breakdown,
                        });
                    }
                    None => {
                        if entered {
                            println!("== {label}");
                        }
                        println!("{label} {}", evaluation.breakdown);
                    }
                }

                if args.until_final && index == final_index {
                    break StopReason::FinalPhase;
                }
            }
        }
    };

    scheduler.stop();
    tracing::info!(?reason, publications, "countdown finished");

    if let Some(emitter) = &emitter {
        emitter.emit(Event::SchedulerStopped {
            timestamp: Utc::now(),
            reason,
            publications,
        });
    }
    Ok(())
}
