// src/scheduler.rs
//! Built-in daily trigger. Shares the single-flight guard with the HTTP
//! routes, so a manual update and the daily run never overlap in-process.

use chrono::{DateTime, Days, Local, TimeZone};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::api::AppState;

/// Next `hour:00` strictly after `now`, in `now`'s time zone. Skips days
/// where that local time does not exist.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, hour: u32) -> Option<DateTime<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    for offset in 0..3 {
        let day = today.checked_add_days(Days::new(offset))?;
        let naive = day.and_hms_opt(hour, 0, 0)?;
        if let Some(at) = tz.from_local_datetime(&naive).earliest() {
            if at > *now {
                return Some(at);
            }
        }
    }
    None
}

pub fn spawn_daily_update(state: AppState, hour: u32) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!(target: "pipeline", hour, "daily update scheduled");
        loop {
            let now = Local::now();
            let Some(next) = next_run_after(&now, hour) else {
                error!(target: "pipeline", hour, "cannot compute next run; scheduler stopped");
                return;
            };
            let wait = (next.clone() - now).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;

            info!(target: "pipeline", at = %next, "running scheduled news update");
            match state.try_run_cycle().await {
                None => warn!(target: "pipeline", "scheduled run skipped: update already running"),
                Some(Ok(report)) => info!(target: "pipeline", added = report.added, "{}", report.message),
                Some(Err(e)) => error!(target: "pipeline", error = ?e, "scheduled update failed"),
            }
        }
    })
}
