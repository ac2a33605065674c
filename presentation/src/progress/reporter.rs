//! Progress reporting for extraction runs

use colored::Colorize;
use extract_application::ProgressNotifier;
use extract_domain::{AgentStatus, ProviderId, SessionStatus};
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// Reports progress with one spinner per provider under a run bar
pub struct ProgressReporter {
    multi: MultiProgress,
    run_bar: Mutex<Option<ProgressBar>>,
    agent_bars: Mutex<HashMap<ProviderId, ProgressBar>>,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self {
            multi: MultiProgress::new(),
            run_bar: Mutex::new(None),
            agent_bars: Mutex::new(HashMap::new()),
        }
    }

    fn run_style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .map(|style| style.progress_chars("=>-"))
            .unwrap_or_else(|_| ProgressStyle::default_bar())
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("  {spinner:.green} {prefix:.bold} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }

    fn status_mark(status: AgentStatus) -> String {
        match status {
            AgentStatus::Completed => "v".green().to_string(),
            AgentStatus::Failed => "x".red().to_string(),
            _ => "?".yellow().to_string(),
        }
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressNotifier for ProgressReporter {
    fn on_run_start(&self, providers: &[ProviderId]) {
        let bar = self.multi.add(ProgressBar::new(providers.len() as u64));
        bar.set_style(Self::run_style());
        bar.set_prefix("Extracting");
        bar.set_message("Starting...");

        if let Ok(mut run_bar) = self.run_bar.lock() {
            *run_bar = Some(bar);
        }
    }

    fn on_agent_start(&self, provider: &ProviderId) {
        let spinner = self.multi.add(ProgressBar::new_spinner());
        spinner.set_style(Self::spinner_style());
        spinner.set_prefix(provider.to_string());
        spinner.set_message("extracting");
        spinner.enable_steady_tick(Duration::from_millis(100));

        if let Ok(mut bars) = self.agent_bars.lock() {
            bars.insert(provider.clone(), spinner);
        }
    }

    fn on_agent_complete(&self, provider: &ProviderId, status: AgentStatus) {
        let spinner = self
            .agent_bars
            .lock()
            .ok()
            .and_then(|mut bars| bars.remove(provider));
        if let Some(spinner) = spinner {
            spinner.finish_with_message(format!("{} {}", Self::status_mark(status), status));
        }

        if let Ok(run_bar) = self.run_bar.lock()
            && let Some(bar) = run_bar.as_ref()
        {
            bar.set_message(format!("{} {}", Self::status_mark(status), provider));
            bar.inc(1);
        }
    }

    fn on_run_complete(&self, status: SessionStatus) {
        if let Some(bar) = self.run_bar.lock().ok().and_then(|mut bar| bar.take()) {
            let message = match status {
                SessionStatus::Completed => "complete!".green().to_string(),
                SessionStatus::Failed => "all providers failed".red().to_string(),
                _ => status.to_string(),
            };
            bar.finish_with_message(message);
        }
    }
}

/// Simple text-based progress (no fancy UI)
pub struct SimpleProgress;

impl ProgressNotifier for SimpleProgress {
    fn on_run_start(&self, providers: &[ProviderId]) {
        let names: Vec<&str> = providers.iter().map(|p| p.as_str()).collect();
        println!(
            "{} {} ({})",
            "->".cyan(),
            "Extracting".bold(),
            names.join(", ")
        );
    }

    fn on_agent_complete(&self, provider: &ProviderId, status: AgentStatus) {
        match status {
            AgentStatus::Completed => println!("  {} {}", "v".green(), provider),
            _ => println!("  {} {} ({})", "x".red(), provider, status),
        }
    }

    fn on_run_complete(&self, status: SessionStatus) {
        println!("{} {}\n", "->".cyan(), status);
    }
}
