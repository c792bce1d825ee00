//! pomoterm - a terminal Pomodoro timer.
//!
//! The timer core is a plain state machine driven by a background tick
//! thread. This binary is the host: it reads commands from stdin, redraws
//! a one-line status display, and plays sounds and shows notifications
//! when the engine reports a completed session.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use chrono::{Local, Timelike};

mod app;
mod audio;
mod engine;
mod models;
mod notifications;
mod persistence;
mod settings;
mod stats;
mod timer;
mod utils;

use app::{App, CompletionEvent};
use audio::AudioPlayer;
use notifications::{session_complete_message, Notifier, SystemNotifier};
use timer::TimerMessage;
use utils::{should_use_night_mode, streak_intensity, StreakIntensity};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let app = Arc::new(Mutex::new(App::new()?));

    // Opened once at startup; machines without an output device run silent.
    let audio = match AudioPlayer::new() {
        Ok(player) => Some(player),
        Err(e) => {
            eprintln!("Audio unavailable: {e}");
            None
        }
    };
    let notifier = SystemNotifier;

    let (timer_tx, timer_rx) = mpsc::channel();
    let timer_app = Arc::clone(&app);
    thread::spawn(move || timer::run_timer_loop(timer_app, timer_tx));

    let (cmd_tx, cmd_rx) = mpsc::channel();
    thread::spawn(move || read_commands(cmd_tx));

    println!("pomoterm - type `help` for commands");
    render_status(&app);

    'outer: loop {
        while let Ok(message) = timer_rx.try_recv() {
            match message {
                TimerMessage::StateChanged { line } => render_line(&app, &line),
                TimerMessage::Completed(event) => handle_completion(&app, &audio, &notifier, event),
                TimerMessage::TickSound { volume } => {
                    if let Some(ref player) = audio {
                        player.play_tick(volume);
                    }
                }
            }
        }

        while let Ok(line) = cmd_rx.try_recv() {
            if handle_command(&app, &notifier, line.trim()) {
                break 'outer;
            }
        }

        thread::sleep(Duration::from_millis(50));
    }

    println!();
    Ok(())
}

/// Forwards stdin lines to the main loop until stdin closes.
fn read_commands(tx: Sender<String>) {
    for line in io::stdin().lock().lines() {
        match line {
            Ok(line) => {
                if tx.send(line).is_err() {
                    return;
                }
            }
            Err(_) => return,
        }
    }
}

/// Dispatches one command line. Returns true when the user quits.
fn handle_command(app: &Arc<Mutex<App>>, notifier: &dyn Notifier, line: &str) -> bool {
    let mut parts = line.split_whitespace();
    match parts.next() {
        None => {}
        Some("s" | "start") => {
            app.lock().unwrap().start(Instant::now());
            render_status(app);
        }
        Some("p" | "pause") => {
            app.lock().unwrap().pause();
            render_status(app);
        }
        Some("r" | "reset") => {
            app.lock().unwrap().reset();
            render_status(app);
        }
        Some("k" | "skip") => {
            let skipped = app.lock().unwrap().skip();
            if let Some(session) = skipped {
                println!("\nSkipped {}", session.session_type.display_name());
            }
            render_status(app);
        }
        Some("stats") => print_stats(&app.lock().unwrap()),
        Some("goal") => match parts.next().and_then(|v| v.parse().ok()) {
            Some(goal) => {
                app.lock().unwrap().update_daily_goal(goal);
                render_status(app);
            }
            None => println!("usage: goal <1-20>"),
        },
        Some("work") => update_duration(app, parts.next(), |s, v| s.work_duration = v),
        Some("short") => update_duration(app, parts.next(), |s, v| s.short_break_duration = v),
        Some("long") => update_duration(app, parts.next(), |s, v| s.long_break_duration = v),
        Some("volume") => match parts.next().and_then(|v| v.parse().ok()) {
            Some(volume) => app.lock().unwrap().update_settings(|s| s.sound_volume = volume),
            None => println!("usage: volume <0-100>"),
        },
        Some("sound") => match parts.next() {
            Some("on") => app.lock().unwrap().update_settings(|s| s.sound_enabled = true),
            Some("off") => app.lock().unwrap().update_settings(|s| s.sound_enabled = false),
            _ => println!("usage: sound on|off"),
        },
        Some("tick") => match parts.next() {
            Some("on") => app
                .lock()
                .unwrap()
                .update_settings(|s| s.tick_sound_enabled = true),
            Some("off") => app
                .lock()
                .unwrap()
                .update_settings(|s| s.tick_sound_enabled = false),
            _ => println!("usage: tick on|off"),
        },
        Some("auto") => match (parts.next(), parts.next()) {
            (Some("breaks"), Some("on")) => {
                app.lock().unwrap().update_settings(|s| s.auto_start_breaks = true)
            }
            (Some("breaks"), Some("off")) => {
                app.lock().unwrap().update_settings(|s| s.auto_start_breaks = false)
            }
            (Some("work"), Some("on")) => {
                app.lock().unwrap().update_settings(|s| s.auto_start_pomodoros = true)
            }
            (Some("work"), Some("off")) => {
                app.lock().unwrap().update_settings(|s| s.auto_start_pomodoros = false)
            }
            _ => println!("usage: auto breaks|work on|off"),
        },
        Some("notify") => match parts.next() {
            Some("on") => {
                if app.lock().unwrap().enable_notifications(notifier) {
                    println!("Notifications enabled");
                } else {
                    println!("Notification permission denied; setting left off");
                }
            }
            Some("off") => app
                .lock()
                .unwrap()
                .update_settings(|s| s.notifications_enabled = false),
            _ => println!("usage: notify on|off"),
        },
        Some("reset-stats") => {
            if parts.next() == Some("confirm") {
                app.lock().unwrap().reset_stats();
                println!("Statistics cleared");
            } else {
                println!("This wipes all statistics. Type `reset-stats confirm` to proceed.");
            }
        }
        Some("h" | "help") => print_help(),
        Some("q" | "quit") => return true,
        Some(other) => println!("Unknown command `{other}`; type `help`"),
    }
    false
}

fn update_duration<F>(app: &Arc<Mutex<App>>, value: Option<&str>, setter: F)
where
    F: FnOnce(&mut models::PomodoroSettings, u32),
{
    match value.and_then(|v| v.parse().ok()) {
        Some(minutes) => {
            app.lock().unwrap().update_settings(|s| setter(s, minutes));
            render_status(app);
        }
        None => println!("usage: work|short|long <minutes>"),
    }
}

fn handle_completion(
    app: &Arc<Mutex<App>>,
    audio: &Option<AudioPlayer>,
    notifier: &dyn Notifier,
    event: CompletionEvent,
) {
    let (sound_enabled, volume, notifications_enabled) = {
        let app = app.lock().unwrap();
        let settings = app.settings.get();
        (
            settings.sound_enabled,
            settings.sound_volume,
            settings.notifications_enabled,
        )
    };

    println!(
        "\n✔ {} finished · next: {}",
        event.session.session_type.display_name(),
        event.next_type.display_name()
    );
    if event.goal_reached && !event.session.session_type.is_break() {
        println!("Daily goal reached!");
    }

    if sound_enabled {
        if let Some(player) = audio {
            player.play_completion(volume);
        }
    }

    if notifications_enabled {
        let (title, body) = session_complete_message(
            event.session.session_type,
            event.next_type,
            event.completed_today,
        );
        notifier.show(&title, &body);
    }

    render_status(app);
}

fn render_status(app: &Arc<Mutex<App>>) {
    let line = {
        let app = app.lock().unwrap();
        timer::format_status_line(&app)
    };
    render_line(app, &line);
}

/// Redraws the status line in place, tinted with the session type color
/// and a moon marker during night hours.
fn render_line(app: &Arc<Mutex<App>>, line: &str) {
    let color = {
        let app = app.lock().unwrap();
        ansi_color(app.engine.session_type().color())
    };
    let night = if should_use_night_mode(Local::now().hour()) {
        "🌙 "
    } else {
        ""
    };
    print!("\r\x1b[2K{night}{color}{line}\x1b[0m");
    let _ = io::stdout().flush();
}

/// Truecolor escape for a `#rrggbb` string; empty on anything malformed.
fn ansi_color(hex: &str) -> String {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return String::new();
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&digits[range], 16).ok();
    match (channel(0..2), channel(2..4), channel(4..6)) {
        (Some(r), Some(g), Some(b)) => format!("\x1b[38;2;{r};{g};{b}m"),
        _ => String::new(),
    }
}

fn print_stats(app: &App) {
    let stats = app.stats.get();
    let intensity = match streak_intensity(stats.current_streak) {
        StreakIntensity::Low => "low",
        StreakIntensity::Medium => "medium",
        StreakIntensity::High => "high",
        StreakIntensity::Blazing => "blazing",
    };

    println!("\nToday: {}/{}", stats.today_completed, stats.daily_goal);
    println!(
        "Total: {} · average {:.1}/day",
        stats.total_completed, stats.average_per_day
    );
    println!(
        "Streak: {} days ({intensity}) · best {}",
        stats.current_streak, stats.best_streak
    );
    let week: Vec<String> = stats
        .weekly_completed
        .iter()
        .map(u32::to_string)
        .collect();
    println!("Last 7 days: {}", week.join(" "));
}

fn print_help() {
    println!("\nCommands:");
    println!("  s, start          start or resume the timer");
    println!("  p, pause          pause the timer");
    println!("  r, reset          reset the current session");
    println!("  k, skip           skip to the next session");
    println!("  stats             show statistics");
    println!("  goal <n>          set the daily goal (1-20)");
    println!("  work <mins>       set the work duration (15-60)");
    println!("  short <mins>      set the short break duration (3-15)");
    println!("  long <mins>       set the long break duration (15-45)");
    println!("  volume <n>        set the sound volume (0-100)");
    println!("  sound on|off      toggle completion sounds");
    println!("  tick on|off       toggle the final-seconds tick");
    println!("  auto breaks|work on|off  auto-start the next session");
    println!("  notify on|off     toggle notifications");
    println!("  reset-stats       clear all statistics");
    println!("  q, quit           exit");
}
