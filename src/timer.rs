//! Timer tick loop driving the engine from a background thread.

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::app::{App, CompletionEvent};
use crate::models::TimerState;
use crate::utils::format_time;

/// How often the loop samples the clock. Deliberately well under a second:
/// the engine accounts whole elapsed seconds itself, so the cadence only
/// bounds display latency.
const TICK_INTERVAL: Duration = Duration::from_millis(250);

/// Message sent from the timer thread to the main thread.
pub enum TimerMessage {
    /// Timer state has changed; the status line needs a redraw.
    StateChanged { line: String },
    /// A session completed; trigger notification/sound.
    Completed(CompletionEvent),
    /// The countdown entered its final seconds; play one tick blip.
    TickSound { volume: u32 },
}

/// Runs the timer loop until the receiving side goes away.
pub fn run_timer_loop(app: Arc<Mutex<App>>, tx: Sender<TimerMessage>) {
    loop {
        thread::sleep(TICK_INTERVAL);

        let messages = {
            let mut app = app.lock().unwrap();
            let tick = app.tick(Instant::now());

            let mut messages = Vec::new();
            if tick.play_tick {
                messages.push(TimerMessage::TickSound {
                    volume: app.settings.get().sound_volume,
                });
            }
            if let Some(event) = tick.completion {
                messages.push(TimerMessage::Completed(event));
            }
            if tick.changed {
                messages.push(TimerMessage::StateChanged {
                    line: format_status_line(&app),
                });
            }
            messages
        };

        for message in messages {
            if tx.send(message).is_err() {
                return;
            }
        }
    }
}

/// Formats the one-line status shown in the terminal.
pub fn format_status_line(app: &App) -> String {
    let remaining = format_time(app.engine.time_remaining());
    let name = app.engine.session_type().display_name();
    let today = app.stats.today_completed();
    let goal = app.stats.get().daily_goal;

    match app.engine.state() {
        TimerState::Idle => {
            format!("■ {remaining} {name} ready · {today}/{goal} today")
        }
        TimerState::Running => {
            let progress = app.engine.progress().round() as u32;
            format!("▶ {remaining} {name} {progress}% · {today}/{goal} today")
        }
        TimerState::Paused => {
            format!("⏸ {remaining} {name} paused · {today}/{goal} today")
        }
    }
}
